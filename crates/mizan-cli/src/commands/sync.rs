//! Sync command - reconcile, push, status and conflict resolution
//!
//! `mizan sync now` runs the full reconcile state machine (discovery,
//! timestamp comparison, silent upload or conflict). `push` forces an
//! immediate upload. `resolve` re-runs reconciliation and applies the
//! user's chosen side to a pending conflict.

use anyhow::Result;
use clap::Subcommand;

use mizan_core::domain::sync::SyncMeta;
use mizan_core::ports::local_store::{ILocalStore, SYNC_META_KEY};
use mizan_sync::engine::{ForceSyncOutcome, ReconcileOutcome, ResolutionOutcome};

use crate::context::{AppContext, TOKEN_ENV};
use crate::output::{get_formatter, OutputFormat, OutputFormatter};

#[derive(Debug, Subcommand)]
pub enum SyncCommand {
    /// Reconcile with the cloud copy (session-start semantics)
    Now,
    /// Upload the local ledger immediately
    Push,
    /// Show recorded sync state
    Status,
    /// Resolve a pending conflict
    Resolve {
        /// Keep this device's data, overwriting the cloud copy
        #[arg(long, conflicts_with = "use_cloud")]
        keep_local: bool,
        /// Adopt the cloud copy, replacing this device's data
        #[arg(long)]
        use_cloud: bool,
    },
}

impl SyncCommand {
    pub async fn execute(&self, format: OutputFormat, config: Option<&str>) -> Result<()> {
        let formatter = get_formatter(matches!(format, OutputFormat::Json));
        let ctx = AppContext::open(config).await?;

        match self {
            SyncCommand::Status => {
                let recorded = match ctx.store.get(SYNC_META_KEY).await {
                    Ok(Some(raw)) => SyncMeta::parse_lenient(&raw),
                    _ => None,
                };
                let has_token = AppContext::token_from_env().is_some();

                if matches!(format, OutputFormat::Json) {
                    formatter.print_json(&serde_json::json!({
                        "session": has_token,
                        "last_synced": recorded.map(|m| m.last_modified.to_rfc3339()),
                    }));
                } else {
                    match recorded {
                        Some(meta) => formatter
                            .info(&format!("Last synced: {}", meta.last_modified.to_rfc3339())),
                        None => formatter.info("Never synced from this device"),
                    }
                    if !has_token {
                        formatter.info(&format!("No session ({TOKEN_ENV} not set)"));
                    }
                }
                Ok(())
            }

            SyncCommand::Now => {
                let (engine, _auth) = ctx.build_engine(AppContext::token_from_env());
                match engine.reconcile().await {
                    ReconcileOutcome::NoSession => {
                        formatter.error(&format!("No session. Set {TOKEN_ENV} and retry."));
                    }
                    ReconcileOutcome::Synced => formatter.success("Synced"),
                    ReconcileOutcome::ConflictPending { remote_modified } => {
                        report_conflict(formatter.as_ref(), &remote_modified.to_rfc3339());
                    }
                    ReconcileOutcome::Failed => formatter.error("Sync failed"),
                }
                Ok(())
            }

            SyncCommand::Push => {
                let (engine, auth) = ctx.build_engine(AppContext::token_from_env());
                match engine.force_sync().await {
                    ForceSyncOutcome::SignInRequested => {
                        // The gate recorded the request; in a CLI run the
                        // user satisfies it by supplying a token.
                        let _ = auth.take_sign_in_request();
                        formatter.error(&format!("No session. Set {TOKEN_ENV} and retry."));
                    }
                    ForceSyncOutcome::Synced => {}
                    ForceSyncOutcome::Failed => formatter.error("Upload failed"),
                }
                Ok(())
            }

            SyncCommand::Resolve {
                keep_local,
                use_cloud,
            } => {
                if !keep_local && !use_cloud {
                    formatter.error("Choose a side: --keep-local or --use-cloud");
                    return Ok(());
                }

                let (engine, _auth) = ctx.build_engine(AppContext::token_from_env());
                match engine.reconcile().await {
                    ReconcileOutcome::NoSession => {
                        formatter.error(&format!("No session. Set {TOKEN_ENV} and retry."));
                        return Ok(());
                    }
                    ReconcileOutcome::Synced => {
                        formatter.success("Nothing to resolve; already in sync");
                        return Ok(());
                    }
                    ReconcileOutcome::Failed => {
                        formatter.error("Could not reach cloud storage");
                        return Ok(());
                    }
                    ReconcileOutcome::ConflictPending { .. } => {}
                }

                let outcome = if *keep_local {
                    engine.resolve_keep_local().await
                } else {
                    engine.resolve_use_cloud().await
                };

                match outcome {
                    ResolutionOutcome::Synced => {
                        if *use_cloud {
                            // The adopted ledger is already persisted by the
                            // engine; nothing further to save here.
                            formatter.success("Cloud data adopted");
                        } else {
                            formatter.success("Local data kept and uploaded");
                        }
                    }
                    ResolutionOutcome::Failed => formatter.error("Resolution failed"),
                    ResolutionOutcome::NoConflict => {
                        formatter.success("Nothing to resolve; already in sync")
                    }
                }
                Ok(())
            }
        }
    }
}

fn report_conflict(formatter: &dyn OutputFormatter, remote_modified: &str) {
    formatter.warn(&format!("Cloud data from {remote_modified} is newer."));
    formatter.info("Run 'mizan sync resolve --use-cloud' to adopt the cloud copy,");
    formatter.info("or 'mizan sync resolve --keep-local' to overwrite it with this device's data.");
}
