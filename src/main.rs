use std::process::ExitCode;
use std::rc::Rc;

use clap::{Parser, Subcommand};
use multisport_auth::nav::render_html;
use multisport_auth::{
    AuthConfig, BackendError, ConfigError, NavBar, ProfileOutcome, RecordingNavigator, SessionGate, SupabaseClient,
};

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("config: {0}")]
    Config(#[from] ConfigError),
    #[error("backend: {0}")]
    Backend(#[from] BackendError),
    #[error("invalid JSON output: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Parser, Debug)]
#[command(name = "multisport-auth", about = "Inspect Multisport-Manager sessions, profiles and gates")]
struct Cli {
    /// Session access token; signed out when absent.
    #[arg(long, env = "SUPABASE_ACCESS_TOKEN", hide_env_values = true)]
    access_token: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the signed-in principal.
    Whoami,
    /// Resolve and print the signed-in user's profile.
    Profile,
    /// Run the session gate and report whether it redirects.
    Gate {
        /// Require an administrator instead of any signed-in user.
        #[arg(long)]
        admin: bool,
        /// Redirect target; defaults to the configured login or admin target.
        #[arg(long)]
        redirect: Option<String>,
    },
    /// Print the navigation fragment as rendered for this session.
    Nav,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!(error = %e, "command failed");
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<ExitCode, CliError> {
    let mut config = AuthConfig::from_env()?;
    config.backend.access_token = cli.access_token.filter(|t| !t.trim().is_empty());

    let client = Rc::new(SupabaseClient::new(&config.backend)?);
    let navigator = Rc::new(RecordingNavigator::new());
    let gate = SessionGate::new(client.clone(), client.clone(), navigator.clone(), config.policy);

    match cli.command {
        Command::Whoami => {
            if !client.has_session() {
                println!("signed out (no access token)");
                return Ok(ExitCode::SUCCESS);
            }
            match gate.current_principal().await {
                Some(principal) => println!("{}", serde_json::to_string_pretty(&principal)?),
                None => println!("signed out"),
            }
        }
        Command::Profile => {
            let Some(principal) = gate.current_principal().await else {
                println!("signed out");
                return Ok(ExitCode::SUCCESS);
            };
            let outcome = gate.resolver().resolve(&principal).await;
            let error = match &outcome {
                ProfileOutcome::Failed(e) => Some(e.to_string()),
                ProfileOutcome::Found { .. } | ProfileOutcome::Missing(_) => None,
            };
            let output = serde_json::json!({
                "status": outcome.status(),
                "profile": outcome.profile(),
                "error": error,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        Command::Gate { admin, redirect } => {
            let allowed = if admin {
                let target = redirect.unwrap_or_else(|| gate.admin_redirect().to_owned());
                gate.require_administrator(&target).await.granted
            } else {
                let target = redirect.unwrap_or_else(|| gate.login_redirect().to_owned());
                gate.require_authenticated(&target).await.is_some()
            };
            if !allowed {
                println!("redirect -> {}", navigator.last().unwrap_or_default());
                return Ok(ExitCode::from(2));
            }
            println!("allowed");
        }
        Command::Nav => {
            let visibility = NavBar::new(&gate).visibility().await;
            println!("{}", render_html(visibility));
        }
    }
    Ok(ExitCode::SUCCESS)
}

#[cfg(test)]
#[path = "main_test.rs"]
mod tests;
