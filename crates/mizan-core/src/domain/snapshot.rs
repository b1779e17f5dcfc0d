//! Ledger snapshots and the lenient import merge
//!
//! A [`LedgerSnapshot`] is a point-in-time, schema-versioned copy of the
//! ledger: the payload uploaded to the remote store and persisted locally.
//! The inverse operation, [`LedgerStore::apply_value`], merges an untrusted
//! JSON payload back into the ledger under a deliberately lenient contract:
//!
//! - absent or wrongly-typed groups are skipped, never erased
//! - scalar groups (`prices`, `assets`, `deductions`) are merged per field
//! - `customAssets` and `payments` are replaced wholesale when the incoming
//!   value is an array, and left untouched otherwise (arrays are atomic
//!   collections owned entirely by one side)
//! - nothing in here ever panics or returns an error; the outcome reports
//!   what was skipped instead
//!
//! The only hard gate is the schema version: a payload whose `version` is
//! missing or different is rejected outright, leaving the ledger unchanged.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::ledger::{CalculatorState, CustomAsset, LedgerStore, Payment, TrackerState};
use super::newtypes::{CustomAssetId, PaymentId};

/// Schema version stamped into every snapshot and export
pub const SCHEMA_VERSION: u32 = 1;

// ============================================================================
// Snapshot and export payloads
// ============================================================================

/// A point-in-time, versioned copy of the ledger
///
/// Immutable once produced; a fresh snapshot is built on every upload so the
/// payload always reflects the latest ledger state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerSnapshot {
    pub version: u32,
    pub last_modified: DateTime<Utc>,
    pub calculator: CalculatorState,
    pub tracker: TrackerState,
}

impl LedgerSnapshot {
    /// Serializes the snapshot as the compact JSON upload payload
    pub fn to_payload(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }
}

/// User-facing export file: the sync payload plus export metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportDocument {
    pub version: u32,
    pub exported_at: DateTime<Utc>,
    pub last_modified: DateTime<Utc>,
    pub language: String,
    pub calculator: CalculatorState,
    pub tracker: TrackerState,
}

impl ExportDocument {
    /// Serializes the document pretty-printed for download
    pub fn to_pretty_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

// ============================================================================
// Apply outcome
// ============================================================================

/// Why an import payload was rejected before any merge happened
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectReason {
    /// The payload is not a JSON object
    NotAnObject,
    /// `version` is absent or not the expected schema version
    SchemaVersionMismatch {
        found: Option<u64>,
        expected: u32,
    },
}

impl std::fmt::Display for RejectReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RejectReason::NotAnObject => write!(f, "payload is not a JSON object"),
            RejectReason::SchemaVersionMismatch { found, expected } => match found {
                Some(found) => write!(
                    f,
                    "schema version {found} does not match expected {expected}"
                ),
                None => write!(f, "payload carries no schema version (expected {expected})"),
            },
        }
    }
}

/// Result of merging an import payload into the ledger
///
/// `PartiallyApplied` lists the JSON paths that were skipped because of type
/// mismatches; the rest of the payload was merged normally. `Rejected` means
/// the ledger was left completely untouched.
#[derive(Debug, Clone, PartialEq)]
pub enum ApplyOutcome {
    Applied,
    PartiallyApplied { skipped: Vec<String> },
    Rejected { reason: RejectReason },
}

impl ApplyOutcome {
    /// True unless the payload was rejected outright
    pub fn was_applied(&self) -> bool {
        !matches!(self, ApplyOutcome::Rejected { .. })
    }
}

// ============================================================================
// Merge helpers
// ============================================================================

/// Merges one scalar field: present finite numbers win, anything else skips
fn merge_scalar(
    group: &serde_json::Map<String, Value>,
    key: &str,
    path: &str,
    target: &mut f64,
    skipped: &mut Vec<String>,
) {
    match group.get(key) {
        None => {}
        Some(value) => match value.as_f64() {
            Some(n) if n.is_finite() => *target = n,
            _ => skipped.push(path.to_string()),
        },
    }
}

/// Extracts a string field, defaulting to empty on absence or wrong type
fn lenient_string(obj: &serde_json::Map<String, Value>, key: &str) -> String {
    obj.get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

/// Extracts a numeric field, defaulting to zero on absence or wrong type
fn lenient_amount(obj: &serde_json::Map<String, Value>, key: &str) -> f64 {
    obj.get(key)
        .and_then(Value::as_f64)
        .filter(|n| n.is_finite())
        .unwrap_or(0.0)
}

fn parse_custom_asset(value: &Value) -> Option<CustomAsset> {
    let obj = value.as_object()?;
    let id = obj
        .get("id")
        .and_then(Value::as_str)
        .and_then(|s| CustomAssetId::new(s).ok())
        .unwrap_or_else(CustomAssetId::generate);
    Some(CustomAsset {
        id,
        label: lenient_string(obj, "label"),
        amount: lenient_amount(obj, "amount"),
    })
}

fn parse_payment(value: &Value) -> Option<Payment> {
    let obj = value.as_object()?;
    let id = obj
        .get("id")
        .and_then(Value::as_str)
        .and_then(|s| PaymentId::new(s).ok())
        .unwrap_or_else(PaymentId::generate);
    Some(Payment {
        id,
        date: lenient_string(obj, "date"),
        recipient: lenient_string(obj, "recipient"),
        category: lenient_string(obj, "category"),
        amount: lenient_amount(obj, "amount"),
        notes: lenient_string(obj, "notes"),
    })
}

// ============================================================================
// LedgerStore: snapshot / apply / export
// ============================================================================

impl LedgerStore {
    /// Builds a fresh snapshot of the current state, stamped with `now`
    #[must_use]
    pub fn snapshot(&self) -> LedgerSnapshot {
        LedgerSnapshot {
            version: SCHEMA_VERSION,
            last_modified: Utc::now(),
            calculator: self.calculator.clone(),
            tracker: self.tracker.clone(),
        }
    }

    /// Builds the pretty-printable export document
    #[must_use]
    pub fn export_document(&self) -> ExportDocument {
        let now = Utc::now();
        ExportDocument {
            version: SCHEMA_VERSION,
            exported_at: now,
            last_modified: now,
            language: self.language().to_string(),
            calculator: self.calculator.clone(),
            tracker: self.tracker.clone(),
        }
    }

    /// Merges an untrusted JSON payload into the ledger
    ///
    /// See the module docs for the merge contract. Works for both sync
    /// payloads and export files (extra fields like `exportedAt` are
    /// ignored).
    pub fn apply_value(&mut self, value: &Value) -> ApplyOutcome {
        let Some(root) = value.as_object() else {
            return ApplyOutcome::Rejected {
                reason: RejectReason::NotAnObject,
            };
        };

        let found = root.get("version").and_then(Value::as_u64);
        if found != Some(u64::from(SCHEMA_VERSION)) {
            return ApplyOutcome::Rejected {
                reason: RejectReason::SchemaVersionMismatch {
                    found,
                    expected: SCHEMA_VERSION,
                },
            };
        }

        let mut skipped = Vec::new();

        match root.get("calculator") {
            None => {}
            Some(Value::Object(calc)) => self.merge_calculator(calc, &mut skipped),
            Some(_) => skipped.push("calculator".to_string()),
        }

        match root.get("tracker") {
            None => {}
            Some(Value::Object(tracker)) => self.merge_tracker(tracker, &mut skipped),
            Some(_) => skipped.push("tracker".to_string()),
        }

        if skipped.is_empty() {
            ApplyOutcome::Applied
        } else {
            ApplyOutcome::PartiallyApplied { skipped }
        }
    }

    /// Convenience wrapper applying a typed snapshot (round-trip path)
    pub fn apply_snapshot(&mut self, snapshot: &LedgerSnapshot) -> ApplyOutcome {
        match serde_json::to_value(snapshot) {
            Ok(value) => self.apply_value(&value),
            // A snapshot is plain data; serialization only fails if the
            // schema itself is broken, in which case nothing is applied.
            Err(_) => ApplyOutcome::Rejected {
                reason: RejectReason::NotAnObject,
            },
        }
    }

    fn merge_calculator(
        &mut self,
        calc: &serde_json::Map<String, Value>,
        skipped: &mut Vec<String>,
    ) {
        match calc.get("prices") {
            None => {}
            Some(Value::Object(prices)) => {
                merge_scalar(
                    prices,
                    "gold24PerGram",
                    "calculator.prices.gold24PerGram",
                    &mut self.calculator.prices.gold24_per_gram,
                    skipped,
                );
                merge_scalar(
                    prices,
                    "silverPerGram",
                    "calculator.prices.silverPerGram",
                    &mut self.calculator.prices.silver_per_gram,
                    skipped,
                );
            }
            Some(_) => skipped.push("calculator.prices".to_string()),
        }

        match calc.get("assets") {
            None => {}
            Some(Value::Object(assets)) => {
                let a = &mut self.calculator.assets;
                for (key, path, target) in [
                    ("gold24g", "calculator.assets.gold24g", &mut a.gold24g),
                    ("gold21g", "calculator.assets.gold21g", &mut a.gold21g),
                    ("gold18g", "calculator.assets.gold18g", &mut a.gold18g),
                    ("silverG", "calculator.assets.silverG", &mut a.silver_g),
                    ("cash", "calculator.assets.cash", &mut a.cash),
                    ("inventory", "calculator.assets.inventory", &mut a.inventory),
                    (
                        "receivables",
                        "calculator.assets.receivables",
                        &mut a.receivables,
                    ),
                    (
                        "investments",
                        "calculator.assets.investments",
                        &mut a.investments,
                    ),
                    (
                        "otherAssets",
                        "calculator.assets.otherAssets",
                        &mut a.other_assets,
                    ),
                ] {
                    merge_scalar(assets, key, path, target, skipped);
                }
            }
            Some(_) => skipped.push("calculator.assets".to_string()),
        }

        match calc.get("deductions") {
            None => {}
            Some(Value::Object(deductions)) => {
                merge_scalar(
                    deductions,
                    "immediateDebts",
                    "calculator.deductions.immediateDebts",
                    &mut self.calculator.deductions.immediate_debts,
                    skipped,
                );
                merge_scalar(
                    deductions,
                    "otherLiabilities",
                    "calculator.deductions.otherLiabilities",
                    &mut self.calculator.deductions.other_liabilities,
                    skipped,
                );
            }
            Some(_) => skipped.push("calculator.deductions".to_string()),
        }

        match calc.get("customAssets") {
            None => {}
            Some(Value::Array(rows)) => {
                let mut parsed = Vec::with_capacity(rows.len());
                for (index, row) in rows.iter().enumerate() {
                    match parse_custom_asset(row) {
                        Some(asset) => parsed.push(asset),
                        None => skipped.push(format!("calculator.customAssets[{index}]")),
                    }
                }
                self.calculator.custom_assets = parsed;
            }
            Some(_) => skipped.push("calculator.customAssets".to_string()),
        }
    }

    fn merge_tracker(
        &mut self,
        tracker: &serde_json::Map<String, Value>,
        skipped: &mut Vec<String>,
    ) {
        match tracker.get("payments") {
            None => {}
            Some(Value::Array(rows)) => {
                let mut parsed = Vec::with_capacity(rows.len());
                for (index, row) in rows.iter().enumerate() {
                    match parse_payment(row) {
                        Some(payment) => parsed.push(payment),
                        None => skipped.push(format!("tracker.payments[{index}]")),
                    }
                }
                self.tracker.payments = parsed;
            }
            Some(_) => skipped.push("tracker.payments".to_string()),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
