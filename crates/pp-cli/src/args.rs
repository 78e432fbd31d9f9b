use std::{env, path::PathBuf};

use anyhow::{Context, Result, anyhow};
use clap::{ArgAction, Parser, Subcommand};
use pp_types::{BackendConfig, DEFAULT_LANDING_PATH, ENV_BACKEND_ANON_KEY, ENV_BACKEND_URL};
use secrecy::SecretString;

/// Read instead of prompting when set and not blank.
pub const ENV_PASSWORD: &str = "PP_PASSWORD";

#[derive(Debug, Parser)]
#[command(name = "pp", about = "Project Portfolio from the terminal")]
pub struct CliArgs {
    /// Backend base URL
    #[arg(long, env = "PP_BACKEND_URL", value_name = "URL")]
    url: Option<String>,
    /// Public anonymous API key of the backend
    #[arg(long = "anon-key", env = "PP_BACKEND_ANON_KEY", value_name = "KEY", hide_env_values = true)]
    anon_key: Option<String>,
    /// Storage bucket for uploaded images
    #[arg(long, env = "PP_STORAGE_BUCKET", value_name = "BUCKET")]
    bucket: Option<String>,
    /// Account to sign in as; the password comes from PP_PASSWORD or a prompt
    #[arg(long, value_name = "EMAIL")]
    email: String,
    /// More log output (repeatable)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
    /// Less log output (repeatable)
    #[arg(short, long, action = ArgAction::Count, conflicts_with = "verbose")]
    quiet: u8,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Show the signed-in account and its display profile
    Whoami,
    /// List projects, newest first
    Projects,
    /// Status counts, progress distribution and trend
    Stats,
    /// Write the projects report as CSV
    Export {
        /// Output file; stdout when omitted
        #[arg(long, value_name = "FILE")]
        out: Option<PathBuf>,
    },
}

impl Command {
    /// View the command stands in for when the gate remembers a return location.
    pub fn route(&self) -> &'static str {
        match self {
            Command::Whoami => "/profile",
            Command::Projects => "/projects",
            Command::Stats => DEFAULT_LANDING_PATH,
            Command::Export { .. } => "/reports",
        }
    }
}

#[derive(Debug)]
pub struct CliConfig {
    pub backend: BackendConfig,
    pub email: String,
    /// `None` means ask on the terminal.
    pub password: Option<SecretString>,
    pub command: Command,
    /// Net `-v` minus `-q` count.
    pub verbosity: i32,
}

impl CliArgs {
    pub fn parse_config() -> Result<CliConfig> {
        let args = CliArgs::parse();
        CliConfig::try_from(args)
    }
}

impl TryFrom<CliArgs> for CliConfig {
    type Error = anyhow::Error;

    fn try_from(args: CliArgs) -> Result<Self> {
        let CliArgs {
            url,
            anon_key,
            bucket,
            email,
            verbose,
            quiet,
            command,
        } = args;

        let url = non_blank(url).ok_or_else(|| anyhow!("backend URL missing: pass --url or set {ENV_BACKEND_URL}"))?;
        let anon_key =
            non_blank(anon_key).ok_or_else(|| anyhow!("backend key missing: pass --anon-key or set {ENV_BACKEND_ANON_KEY}"))?;
        let mut backend = BackendConfig::new(url, anon_key).context("invalid backend configuration")?;
        if let Some(bucket) = non_blank(bucket) {
            backend = backend.with_storage_bucket(bucket);
        }

        let email = email.trim().to_string();
        if email.is_empty() {
            return Err(anyhow!("--email must not be empty"));
        }

        let password = non_blank(env::var(ENV_PASSWORD).ok()).map(SecretString::from);

        Ok(Self {
            backend,
            email,
            password,
            command,
            verbosity: i32::from(verbose) - i32::from(quiet),
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
