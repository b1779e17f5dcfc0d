//! Domain layer: entities, value types, and validation
//!
//! Contains the ledger model (calculator + tracker), snapshot/import
//! machinery, sync-state values, validated newtypes and domain errors.
//! Nothing in here touches I/O; adapters live behind the port traits.

pub mod errors;
pub mod ledger;
pub mod newtypes;
pub mod snapshot;
pub mod sync;

pub use errors::DomainError;
pub use ledger::{
    Assets, CalculatorState, CustomAsset, Deductions, LedgerStore, Payment, PaymentCategory,
    PaymentUpdate, Prices, TrackerState,
};
pub use newtypes::{BearerToken, CustomAssetId, FileId, PaymentId};
pub use snapshot::{ApplyOutcome, ExportDocument, LedgerSnapshot, RejectReason, SCHEMA_VERSION};
pub use sync::{SyncMeta, SyncStatus};
