use std::{env, path::PathBuf, sync::Mutex};

use anyhow::{Result, anyhow};
use clap::{CommandFactory, Parser};
use pp_cli::{
    args::{CliArgs, CliConfig, Command}, run::write_report
};
use secrecy::ExposeSecret;
use serial_test::serial;

static ENV_GUARD: Mutex<()> = Mutex::new(());

const ENV_KEYS: [&str; 4] = ["PP_BACKEND_URL", "PP_BACKEND_ANON_KEY", "PP_STORAGE_BUCKET", "PP_PASSWORD"];

#[test]
#[serial]
fn flags_build_backend_config() {
    let cfg = parse_config(&[
        "--url",
        "https://demo.supabase.co/",
        "--anon-key",
        "anon",
        "--email",
        "ada@example.com",
        "projects",
    ])
    .expect("flags should parse");

    assert_eq!(cfg.backend.url, "https://demo.supabase.co");
    assert_eq!(cfg.backend.anon_key, "anon");
    assert_eq!(cfg.backend.storage_bucket, "project-images");
    assert_eq!(cfg.email, "ada@example.com");
    assert_eq!(cfg.command, Command::Projects);
    assert!(cfg.password.is_none(), "password should be prompted for");
    assert_eq!(cfg.verbosity, 0);
}

#[test]
#[serial]
fn environment_fills_in_missing_flags() {
    let cfg = parse_config_with_env(
        &["--email", "ada@example.com", "whoami"],
        &[
            ("PP_BACKEND_URL", Some("https://env.supabase.co")),
            ("PP_BACKEND_ANON_KEY", Some("env-key")),
            ("PP_STORAGE_BUCKET", Some("covers")),
            ("PP_PASSWORD", Some("hunter2")),
        ],
    )
    .expect("environment should satisfy the backend settings");

    assert_eq!(cfg.backend.url, "https://env.supabase.co");
    assert_eq!(cfg.backend.anon_key, "env-key");
    assert_eq!(cfg.backend.storage_bucket, "covers");
    assert_eq!(cfg.command, Command::Whoami);
    let password = cfg.password.expect("password from environment");
    assert_eq!(password.expose_secret(), "hunter2");
}

#[test]
#[serial]
fn flags_override_environment() {
    let cfg = parse_config_with_env(
        &["--url", "https://flag.supabase.co", "--email", "ada@example.com", "stats"],
        &[
            ("PP_BACKEND_URL", Some("https://env.supabase.co")),
            ("PP_BACKEND_ANON_KEY", Some("env-key")),
        ],
    )
    .expect("config");
    assert_eq!(cfg.backend.url, "https://flag.supabase.co");
    assert_eq!(cfg.command.route(), "/");
}

#[test]
#[serial]
fn blank_password_env_still_prompts() {
    let cfg = parse_config_with_env(&with_backend(&["--email", "a@b.c", "projects"]), &[("PP_PASSWORD", Some("  "))])
        .expect("config");
    assert!(cfg.password.is_none());
}

#[test]
#[serial]
fn missing_backend_settings_error() {
    match parse_config(&["--email", "ada@example.com", "projects"]) {
        Err(err) => assert!(err.to_string().contains("PP_BACKEND_URL"), "unexpected error: {err:?}"),
        Ok(cfg) => panic!("expected missing URL error, got {:?}", cfg.backend),
    }

    match parse_config(&["--url", "https://demo.supabase.co", "--email", "ada@example.com", "projects"]) {
        Err(err) => assert!(err.to_string().contains("PP_BACKEND_ANON_KEY"), "unexpected error: {err:?}"),
        Ok(cfg) => panic!("expected missing key error, got {:?}", cfg.backend),
    }

    match parse_config(&["--url", "demo.supabase.co", "--anon-key", "anon", "--email", "a@b.c", "projects"]) {
        Err(err) => assert!(
            err.to_string().contains("invalid backend configuration"),
            "unexpected error: {err:?}"
        ),
        Ok(cfg) => panic!("expected invalid URL error, got {:?}", cfg.backend),
    }
}

#[test]
#[serial]
fn email_and_command_are_required() {
    assert!(parse_config(&with_backend(&["projects"])).is_err());
    assert!(parse_config(&with_backend(&["--email", "a@b.c"])).is_err());
    match parse_config(&with_backend(&["--email", " ", "projects"])) {
        Err(err) => assert!(err.to_string().contains("--email"), "unexpected error: {err:?}"),
        Ok(cfg) => panic!("expected empty email error, got {:?}", cfg.email),
    }
}

#[test]
#[serial]
fn export_takes_optional_output_file() {
    let cfg = parse_config(&with_backend(&["--email", "a@b.c", "export", "--out", "report.csv"])).expect("config");
    assert_eq!(
        cfg.command,
        Command::Export {
            out: Some(PathBuf::from("report.csv"))
        }
    );
    assert_eq!(cfg.command.route(), "/reports");

    let cfg = parse_config(&with_backend(&["--email", "a@b.c", "export"])).expect("config");
    assert_eq!(cfg.command, Command::Export { out: None });
}

#[test]
#[serial]
fn verbosity_counts_flags() {
    let cfg = parse_config(&with_backend(&["-vv", "--email", "a@b.c", "projects"])).expect("config");
    assert_eq!(cfg.verbosity, 2);
    let cfg = parse_config(&with_backend(&["-q", "--email", "a@b.c", "projects"])).expect("config");
    assert_eq!(cfg.verbosity, -1);
    assert!(parse_config(&with_backend(&["-v", "-q", "--email", "a@b.c", "projects"])).is_err());
}

#[test]
fn help_lists_every_command() {
    let usage = CliArgs::command().render_help().to_string();
    for name in ["whoami", "projects", "stats", "export"] {
        assert!(usage.contains(name), "help should mention {name}");
    }
}

#[test]
fn report_is_written_to_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("projects-report.csv");
    write_report(&path, "Name,Status\nGarden,active\n").expect("write report");
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "Name,Status\nGarden,active\n");

    let missing = dir.path().join("nope").join("report.csv");
    match write_report(&missing, "x") {
        Err(err) => assert!(err.to_string().contains("could not write"), "unexpected error: {err:?}"),
        Ok(()) => panic!("writing into a missing directory should fail"),
    }
}

fn with_backend<'a>(args: &[&'a str]) -> Vec<&'a str> {
    let mut argv = vec!["--url", "https://demo.supabase.co", "--anon-key", "anon"];
    argv.extend_from_slice(args);
    argv
}

fn parse_config(args: &[&str]) -> Result<CliConfig> {
    parse_config_with_env(args, &[])
}

fn parse_config_with_env(args: &[&str], overrides: &[(&str, Option<&str>)]) -> Result<CliConfig> {
    with_clean_env(|| {
        for (key, value) in overrides {
            match value {
                Some(v) => unsafe { env::set_var(key, v) },
                None => unsafe { env::remove_var(key) },
            }
        }
        let mut argv = vec!["pp"];
        argv.extend_from_slice(args);
        let cli = CliArgs::try_parse_from(&argv).map_err(|err| anyhow!(err.to_string()))?;
        CliConfig::try_from(cli)
    })
}

fn with_clean_env<T>(f: impl FnOnce() -> T) -> T {
    let guard = ENV_GUARD.lock().expect("env guard poisoned");
    let previous: Vec<(&str, Option<String>)> = ENV_KEYS.iter().map(|key| (*key, env::var(key).ok())).collect();
    for key in ENV_KEYS {
        unsafe { env::remove_var(key) };
    }
    let result = f();
    for (key, value) in previous {
        match value {
            Some(value) => unsafe { env::set_var(key, value) },
            None => unsafe { env::remove_var(key) },
        }
    }
    drop(guard);
    result
}
