//! Shared command context
//!
//! Loads configuration, opens the local store, restores the persisted
//! ledger, and wires the sync engine when a session token is available.
//! Every command builds one of these, mutates through it, and lets
//! [`sync_after_edit`](AppContext::sync_after_edit) decide whether the
//! change also goes to the cloud.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context as _, Result};
use tokio::sync::Mutex;
use tracing::{info, warn};

use mizan_core::config::Config;
use mizan_core::domain::ledger::LedgerStore;
use mizan_core::domain::newtypes::BearerToken;
use mizan_core::domain::snapshot::ApplyOutcome;
use mizan_core::ports::auth_gate::IAuthGate;
use mizan_core::ports::local_store::{ILocalStore, LEDGER_KEY};
use mizan_core::ports::notification::INotifier;
use mizan_core::ports::remote_store::IRemoteStore;
use mizan_drive::{DriveClient, DriveRemoteStore, TokenSession};
use mizan_store::{DatabasePool, SqliteLocalStore};
use mizan_sync::engine::{ReconcileOutcome, SyncEngine};

use crate::output::{OutputFormatter, TerminalNotifier};

/// Environment variable supplying the per-run Drive bearer token
///
/// Token acquisition is the host's business; the CLI only consumes the
/// capability.
pub const TOKEN_ENV: &str = "MIZAN_DRIVE_TOKEN";

/// Everything a command needs to run
pub struct AppContext {
    pub config: Config,
    pub store: Arc<SqliteLocalStore>,
    pub ledger: Arc<Mutex<LedgerStore>>,
}

impl AppContext {
    /// Loads configuration, opens the database, restores the ledger
    pub async fn open(config_override: Option<&str>) -> Result<Self> {
        let config_path = config_override
            .map(PathBuf::from)
            .unwrap_or_else(Config::default_path);
        let config = Config::load_or_default(&config_path);
        info!(config_path = %config_path.display(), "Loaded configuration");

        for issue in config.validate() {
            warn!(%issue, "Configuration issue");
        }

        let pool = DatabasePool::new(&config.storage.db_path)
            .await
            .context("Failed to open local database")?;
        let store = Arc::new(SqliteLocalStore::new(pool.pool().clone()));

        let ledger = Self::restore_ledger(&store, &config.export.language).await;

        Ok(Self {
            config,
            store,
            ledger: Arc::new(Mutex::new(ledger)),
        })
    }

    /// Restores the persisted ledger snapshot, starting fresh on problems
    async fn restore_ledger(store: &SqliteLocalStore, language: &str) -> LedgerStore {
        let mut ledger = LedgerStore::new();
        ledger.set_language(language);

        match store.get(LEDGER_KEY).await {
            Ok(Some(raw)) => match serde_json::from_str::<serde_json::Value>(&raw) {
                Ok(value) => match ledger.apply_value(&value) {
                    ApplyOutcome::Applied => {}
                    ApplyOutcome::PartiallyApplied { skipped } => {
                        warn!(?skipped, "Persisted ledger partially restored");
                    }
                    ApplyOutcome::Rejected { reason } => {
                        warn!(%reason, "Persisted ledger rejected, starting fresh");
                    }
                },
                Err(err) => warn!(error = %err, "Persisted ledger is corrupt, starting fresh"),
            },
            Ok(None) => {}
            Err(err) => warn!(error = %err, "Failed to read persisted ledger"),
        }

        ledger
    }

    /// Persists the current ledger snapshot to the local store
    pub async fn save_ledger(&self) -> Result<()> {
        let snapshot = { self.ledger.lock().await.snapshot() };
        let json = serde_json::to_string(&snapshot).context("Failed to serialize ledger")?;
        self.store
            .set(LEDGER_KEY, &json)
            .await
            .context("Failed to persist ledger")?;
        Ok(())
    }

    /// Reads the session token from the environment, if any
    pub fn token_from_env() -> Option<BearerToken> {
        std::env::var(TOKEN_ENV)
            .ok()
            .and_then(|raw| BearerToken::new(raw).ok())
    }

    /// Builds the sync engine against the configured Drive endpoints
    ///
    /// The returned session holds the given token (or none) for the run.
    pub fn build_engine(&self, token: Option<BearerToken>) -> (Arc<SyncEngine>, Arc<TokenSession>) {
        let auth = Arc::new(match token {
            Some(token) => TokenSession::with_token(token),
            None => TokenSession::new(),
        });

        let client = DriveClient::with_base_urls(
            self.config.sync.remote_file_name.clone(),
            self.config.drive.api_base_url.clone(),
            self.config.drive.upload_base_url.clone(),
        );
        let remote = Arc::new(DriveRemoteStore::new(
            client,
            Arc::clone(&auth) as Arc<dyn IAuthGate>,
        ));

        let engine = Arc::new(SyncEngine::new(
            remote as Arc<dyn IRemoteStore>,
            Arc::clone(&self.store) as Arc<dyn ILocalStore>,
            Arc::clone(&self.ledger),
            Arc::clone(&auth) as Arc<dyn IAuthGate>,
            Arc::new(TerminalNotifier) as Arc<dyn INotifier>,
        ));

        (engine, auth)
    }

    /// Saves the ledger and, when a session token is present, reconciles
    /// with the cloud (uploading the fresh edit when local wins)
    pub async fn sync_after_edit(&self, formatter: &dyn OutputFormatter) -> Result<()> {
        self.save_ledger().await?;

        let Some(token) = Self::token_from_env() else {
            formatter.info(&format!(
                "Saved locally. Set {TOKEN_ENV} to sync with Google Drive."
            ));
            return Ok(());
        };

        let (engine, _auth) = self.build_engine(Some(token));
        match engine.reconcile().await {
            ReconcileOutcome::Synced => formatter.success("Saved and synced"),
            ReconcileOutcome::ConflictPending { remote_modified } => {
                formatter.warn(&format!(
                    "Saved locally, but cloud data from {} is newer. \
                     Run 'mizan sync resolve' to choose a side.",
                    remote_modified.to_rfc3339()
                ));
            }
            ReconcileOutcome::Failed => {
                formatter.warn("Saved locally; cloud sync failed (will retry on next edit)");
            }
            ReconcileOutcome::NoSession => {
                formatter.info("Saved locally (session expired)");
            }
        }

        Ok(())
    }
}
