//! Sign in, pass the gate, then run one command against the backend.

use std::{
    fs, io::{self, Write}, path::Path, sync::Arc
};

use anyhow::{Context, Result, anyhow, bail};
use backend_client::BackendClient;
use portfolio_store::{DashboardStats, ProfileLookup, ProjectService, projects_csv};
use pp_types::{DisplayProfile, Identity, Project};
use secrecy::SecretString;
use session_core::{
    Authenticator, Authorized, GateDecision, ProfileResolver, Resolution, SessionContext, StoreProfileResolver
};
use tracing::{debug, info, warn};

use crate::args::{CliConfig, Command};

pub async fn run(config: CliConfig) -> Result<()> {
    let CliConfig {
        backend,
        email,
        password,
        command,
        ..
    } = config;

    let client = Arc::new(BackendClient::new(backend).context("could not set up the backend client")?);
    let password = match password {
        Some(password) => password,
        None => prompt_password(&email)?,
    };

    client
        .sign_in_with_password(&email, &password)
        .await
        .with_context(|| format!("sign-in failed for {email}"))?
        .ok_or_else(|| anyhow!("sign-in for {email} did not open a session"))?;

    let resolver = StoreProfileResolver::new(ProfileLookup::new(client.clone()));
    let context = SessionContext::from_backend(client.clone(), Arc::new(resolver));
    let result = match authorize(&context, command.route()).await {
        Ok(auth) => execute(&context, &client, &auth, &command).await,
        Err(err) => Err(err),
    };

    if let Err(err) = client.sign_out().await {
        warn!(error = %err, "sign-out failed");
    }
    result
}

fn prompt_password(email: &str) -> Result<SecretString> {
    let password = rpassword::prompt_password(format!("Password for {email}: ")).context("could not read password")?;
    Ok(SecretString::from(password))
}

/// Mount a gate for `route`, wait for its first resolution and hand out the proof.
pub async fn authorize(context: &SessionContext, route: &str) -> Result<Authorized> {
    let gate = context.mount_gate(route);
    let mut resolution = gate.watch();
    tokio::select! {
        _ = context.guard(gate.clone()) => {}
        _ = resolution.wait_for(|r| *r != Resolution::Pending) => {}
    }
    let decision = gate.decision();
    let authorized = gate.authorize();
    gate.teardown();

    match (decision, authorized) {
        (GateDecision::Render, Ok(auth)) => {
            debug!(route, user = %auth.user_id(), "gate granted");
            Ok(auth)
        }
        (GateDecision::Redirect(redirect), _) => bail!("not signed in (would redirect to {})", redirect.href()),
        (_, Err(err)) => Err(anyhow!(err)),
        (decision, Ok(_)) => bail!("unexpected gate decision {decision:?}"),
    }
}

async fn execute(context: &SessionContext, client: &Arc<BackendClient>, auth: &Authorized, command: &Command) -> Result<()> {
    let mut stdout = io::stdout();
    match command {
        Command::Whoami => {
            let display = context.profiles.resolve(auth.identity()).await;
            write_whoami(&mut stdout, auth.identity(), &display)?;
        }
        Command::Projects => {
            let projects = services(client).list(auth).await?;
            write_projects(&mut stdout, &projects)?;
        }
        Command::Stats => {
            let projects = services(client).list(auth).await?;
            write_stats(&mut stdout, &DashboardStats::from_projects(&projects))?;
        }
        Command::Export { out } => {
            let projects = services(client).list(auth).await?;
            let csv = projects_csv(&projects);
            match out {
                Some(path) => {
                    write_report(path, &csv)?;
                    info!(path = %path.display(), projects = projects.len(), "report written");
                }
                None => stdout.write_all(csv.as_bytes())?,
            }
        }
    }
    stdout.flush()?;
    Ok(())
}

fn services(client: &Arc<BackendClient>) -> ProjectService {
    ProjectService::new(client.clone(), client.clone())
}

pub fn write_report(path: &Path, csv: &str) -> Result<()> {
    fs::write(path, csv).with_context(|| format!("could not write {}", path.display()))
}

pub fn write_whoami(out: &mut impl Write, identity: &Identity, display: &DisplayProfile) -> io::Result<()> {
    writeln!(out, "id:     {}", identity.id)?;
    writeln!(out, "email:  {}", identity.email.as_deref().unwrap_or("-"))?;
    writeln!(out, "name:   {}", display.display_name.as_deref().unwrap_or("-"))?;
    writeln!(out, "avatar: {}", display.avatar_url.as_deref().unwrap_or("-"))
}

pub fn write_projects(out: &mut impl Write, projects: &[Project]) -> io::Result<()> {
    if projects.is_empty() {
        return writeln!(out, "No projects yet.");
    }
    writeln!(out, "{:<30} {:<10} {:>8}  {}", "NAME", "STATUS", "PROGRESS", "CREATED")?;
    for project in projects {
        writeln!(
            out,
            "{:<30} {:<10} {:>7}%  {}",
            project.name,
            project.status.label(),
            project.progress,
            project.created_at.format("%Y-%m-%d")
        )?;
    }
    Ok(())
}

pub fn write_stats(out: &mut impl Write, stats: &DashboardStats) -> io::Result<()> {
    writeln!(out, "Total projects: {}", stats.total)?;
    writeln!(out, "  active:    {}", stats.counts.active)?;
    writeln!(out, "  paused:    {}", stats.counts.paused)?;
    writeln!(out, "  completed: {}", stats.counts.completed)?;
    writeln!(out, "Progress distribution:")?;
    for (label, count) in stats.distribution_series() {
        writeln!(out, "  {label:<8} {count}")?;
    }
    if !stats.trend.is_empty() {
        writeln!(out, "Recent progress:")?;
        for point in &stats.trend {
            writeln!(out, "  {:<12} {}%", point.label, point.progress)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use pp_types::{ProjectId, ProjectStatus, Session};
    use session_core::{MemorySessionStore, MetadataProfileResolver};

    use super::*;

    fn project(name: &str, status: ProjectStatus, progress: i32) -> Project {
        Project {
            id: ProjectId::new(name),
            name: name.to_string(),
            description: None,
            status,
            progress,
            created_at: Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap(),
            image_url: None,
        }
    }

    fn context(store: Arc<MemorySessionStore>) -> SessionContext {
        SessionContext::from_backend(store, Arc::new(MetadataProfileResolver))
    }

    fn render(f: impl FnOnce(&mut Vec<u8>) -> io::Result<()>) -> String {
        let mut buf = Vec::new();
        f(&mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[tokio::test]
    async fn test_authorize_with_session_hands_out_proof() {
        let store = Arc::new(MemorySessionStore::new());
        store.set_session(Some(Session::new(Identity::new("u-1").with_email("ada@example.com"))));

        let auth = authorize(&context(store.clone()), "/projects").await.unwrap();
        assert_eq!(auth.user_id().as_str(), "u-1");
        assert_eq!(store.subscriber_count(), 0);
    }

    #[tokio::test]
    async fn test_authorize_without_session_reports_redirect() {
        let store = Arc::new(MemorySessionStore::new());
        let err = authorize(&context(store), "/reports").await.unwrap_err();
        assert!(err.to_string().contains("/signin?from=%2Freports"), "unexpected error: {err}");
    }

    #[tokio::test]
    async fn test_authorize_treats_fetch_failure_as_signed_out() {
        let store = Arc::new(MemorySessionStore::new());
        store.set_session(Some(Session::new(Identity::new("u-1"))));
        store.fail_next_fetches(1);
        assert!(authorize(&context(store), "/").await.is_err());
    }

    #[test]
    fn test_write_projects_table() {
        let text = render(|out| write_projects(out, &[project("Garden", ProjectStatus::Paused, 40)]));
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("NAME"));
        assert!(lines[1].starts_with("Garden"));
        assert!(lines[1].contains("Paused"));
        assert!(lines[1].contains("40%"));
        assert!(lines[1].ends_with("2024-03-01"));

        assert_eq!(render(|out| write_projects(out, &[])), "No projects yet.\n");
    }

    #[test]
    fn test_write_stats_lists_every_bucket() {
        let projects = [project("A", ProjectStatus::Active, 10), project("B", ProjectStatus::Completed, 100)];
        let text = render(|out| write_stats(out, &DashboardStats::from_projects(&projects)));
        assert!(text.starts_with("Total projects: 2\n"));
        assert!(text.contains("  completed: 1\n"));
        assert!(text.contains("  0-19%    1\n"));
        assert!(text.contains("  80-100%  1\n"));
        assert!(text.contains("Recent progress:"));
    }

    #[test]
    fn test_write_whoami_falls_back_to_dashes() {
        let identity = Identity::new("u-7");
        let text = render(|out| write_whoami(out, &identity, &DisplayProfile::default()));
        assert!(text.contains("id:     u-7\n"));
        assert!(text.contains("email:  -\n"));
        assert!(text.contains("name:   -\n"));
    }
}
