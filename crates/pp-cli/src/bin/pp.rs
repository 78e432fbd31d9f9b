use anyhow::Result;
use pp_cli::{args::CliArgs, init_tracing, run::run};

#[tokio::main]
async fn main() -> Result<()> {
    let config = CliArgs::parse_config()?;
    init_tracing(config.verbosity);
    run(config).await
}
