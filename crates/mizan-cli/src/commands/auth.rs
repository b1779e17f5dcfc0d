//! Auth command - session status and sign-out
//!
//! The OAuth handshake itself is out of scope: a session exists whenever
//! the token environment variable is set. Sign-out clears the sync state
//! this device recorded, so the next session re-discovers and re-compares
//! from scratch.

use anyhow::Result;
use clap::Subcommand;

use crate::context::{AppContext, TOKEN_ENV};
use crate::output::{get_formatter, OutputFormat};

#[derive(Debug, Subcommand)]
pub enum AuthCommand {
    /// Show whether a session token is available
    Status,
    /// End the session: clear recorded sync state (remote data untouched)
    Signout,
}

impl AuthCommand {
    pub async fn execute(&self, format: OutputFormat, config: Option<&str>) -> Result<()> {
        let formatter = get_formatter(matches!(format, OutputFormat::Json));

        match self {
            AuthCommand::Status => {
                let has_token = AppContext::token_from_env().is_some();
                if matches!(format, OutputFormat::Json) {
                    formatter.print_json(&serde_json::json!({ "session": has_token }));
                } else if has_token {
                    formatter.success("Session token present");
                } else {
                    formatter.info(&format!(
                        "No session. Export {TOKEN_ENV} with a Drive bearer token to sync."
                    ));
                }
                Ok(())
            }
            AuthCommand::Signout => {
                let ctx = AppContext::open(config).await?;
                let (engine, auth) = ctx.build_engine(AppContext::token_from_env());

                engine.sign_out().await;
                auth.sign_out();

                formatter.success(&format!(
                    "Signed out. Unset {TOKEN_ENV} to drop the token from the environment."
                ));
                Ok(())
            }
        }
    }
}
