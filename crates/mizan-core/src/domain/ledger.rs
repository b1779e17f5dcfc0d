//! Ledger domain model
//!
//! The [`LedgerStore`] is the authoritative in-memory representation of the
//! user's declared wealth (calculator side) and recorded disbursements
//! (tracker side). All mutation flows through its methods; the sync engine
//! never assigns fields directly.
//!
//! Derived totals follow the classical rules: gold holdings are weighted by
//! purity (21k = 21/24, 18k = 18/24 of the 24k price), the nisab threshold is
//! the lower of the gold and silver thresholds, and the obligation is 2.5%
//! of net wealth once the threshold is met.

use serde::{Deserialize, Serialize};

use super::errors::DomainError;
use super::newtypes::{CustomAssetId, PaymentId};

/// Grams of gold defining the gold nisab threshold
pub const NISAB_GOLD_GRAMS: f64 = 87.48;

/// Grams of silver defining the silver nisab threshold
pub const NISAB_SILVER_GRAMS: f64 = 612.36;

/// Fraction of net wealth due once nisab is met
pub const ZAKAT_RATE: f64 = 0.025;

/// Coerces a possibly non-finite number to something safe to sum
fn safe_num(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

// ============================================================================
// Calculator state
// ============================================================================

/// Per-gram metal prices in the user's currency
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Prices {
    /// Price of one gram of 24k gold
    pub gold24_per_gram: f64,
    /// Price of one gram of silver
    pub silver_per_gram: f64,
}

impl Default for Prices {
    fn default() -> Self {
        Self {
            gold24_per_gram: 4625.0,
            silver_per_gram: 48.50,
        }
    }
}

/// Declared zakatable holdings
///
/// Metal fields are in grams; monetary fields are in the user's currency.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assets {
    pub gold24g: f64,
    pub gold21g: f64,
    pub gold18g: f64,
    pub silver_g: f64,
    pub cash: f64,
    pub inventory: f64,
    pub receivables: f64,
    pub investments: f64,
    pub other_assets: f64,
}

/// Liabilities deducted from gross assets
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Deductions {
    pub immediate_debts: f64,
    pub other_liabilities: f64,
}

/// A user-defined asset row with a free-form label
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomAsset {
    pub id: CustomAssetId,
    pub label: String,
    pub amount: f64,
}

/// Calculator half of the ledger
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculatorState {
    pub prices: Prices,
    pub assets: Assets,
    pub deductions: Deductions,
    pub custom_assets: Vec<CustomAsset>,
}

// ============================================================================
// Tracker state
// ============================================================================

/// Recipient category keys for tracked payments
///
/// The eight canonical recipient classes plus an organization bucket and a
/// free-form "other". [`Payment::category`] stores the key as a plain string
/// (empty = unset) so lenient imports never lose data; this enum exists for
/// input validation and display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentCategory {
    Faqir,
    Miskin,
    Amil,
    Muallaf,
    Gharim,
    Sabilillah,
    IbnSabil,
    Organization,
    Other,
}

impl PaymentCategory {
    /// All category keys, in display order
    pub const ALL: [PaymentCategory; 9] = [
        PaymentCategory::Faqir,
        PaymentCategory::Miskin,
        PaymentCategory::Amil,
        PaymentCategory::Muallaf,
        PaymentCategory::Gharim,
        PaymentCategory::Sabilillah,
        PaymentCategory::IbnSabil,
        PaymentCategory::Organization,
        PaymentCategory::Other,
    ];

    /// Returns the stable string key used in payloads
    pub fn as_key(&self) -> &'static str {
        match self {
            PaymentCategory::Faqir => "faqir",
            PaymentCategory::Miskin => "miskin",
            PaymentCategory::Amil => "amil",
            PaymentCategory::Muallaf => "muallaf",
            PaymentCategory::Gharim => "gharim",
            PaymentCategory::Sabilillah => "sabilillah",
            PaymentCategory::IbnSabil => "ibnsabil",
            PaymentCategory::Organization => "org",
            PaymentCategory::Other => "other",
        }
    }

    /// Parses a category key
    pub fn from_key(key: &str) -> Result<Self, DomainError> {
        Self::ALL
            .iter()
            .copied()
            .find(|c| c.as_key() == key)
            .ok_or_else(|| DomainError::UnknownCategory(key.to_string()))
    }
}

impl std::fmt::Display for PaymentCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_key())
    }
}

/// A single tracked disbursement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    pub id: PaymentId,
    /// ISO date string, or empty when not yet filled in
    pub date: String,
    pub recipient: String,
    /// Category key from [`PaymentCategory`], or empty when unset
    pub category: String,
    pub amount: f64,
    pub notes: String,
}

impl Payment {
    /// Creates a blank payment row with a fresh id
    #[must_use]
    pub fn blank() -> Self {
        Self {
            id: PaymentId::generate(),
            date: String::new(),
            recipient: String::new(),
            category: String::new(),
            amount: 0.0,
            notes: String::new(),
        }
    }
}

/// Field-level update for a payment row; `None` leaves the field untouched
#[derive(Debug, Clone, Default)]
pub struct PaymentUpdate {
    pub date: Option<String>,
    pub recipient: Option<String>,
    pub category: Option<String>,
    pub amount: Option<f64>,
    pub notes: Option<String>,
}

/// Tracker half of the ledger
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackerState {
    pub payments: Vec<Payment>,
}

// ============================================================================
// Typed field selectors (used by the CLI and tests)
// ============================================================================

/// Selects a field of [`Assets`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetField {
    Gold24g,
    Gold21g,
    Gold18g,
    SilverG,
    Cash,
    Inventory,
    Receivables,
    Investments,
    OtherAssets,
}

impl std::str::FromStr for AssetField {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "gold24g" => Ok(Self::Gold24g),
            "gold21g" => Ok(Self::Gold21g),
            "gold18g" => Ok(Self::Gold18g),
            "silverg" => Ok(Self::SilverG),
            "cash" => Ok(Self::Cash),
            "inventory" => Ok(Self::Inventory),
            "receivables" => Ok(Self::Receivables),
            "investments" => Ok(Self::Investments),
            "other" => Ok(Self::OtherAssets),
            other => Err(DomainError::ValidationFailed(format!(
                "unknown asset field: {other}"
            ))),
        }
    }
}

/// Selects a field of [`Deductions`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeductionField {
    ImmediateDebts,
    OtherLiabilities,
}

impl std::str::FromStr for DeductionField {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "debts" => Ok(Self::ImmediateDebts),
            "liabilities" => Ok(Self::OtherLiabilities),
            other => Err(DomainError::ValidationFailed(format!(
                "unknown deduction field: {other}"
            ))),
        }
    }
}

// ============================================================================
// LedgerStore
// ============================================================================

/// The authoritative in-memory ledger
///
/// Owns the calculator and tracker state plus the export language tag.
/// Snapshots for upload/export are produced by
/// [`snapshot`](LedgerStore::snapshot); remote payloads come back in through
/// [`apply_value`](LedgerStore::apply_value) (both in the snapshot module),
/// preserving the merge invariants regardless of who initiated the change.
#[derive(Debug, Clone, PartialEq)]
pub struct LedgerStore {
    pub(crate) calculator: CalculatorState,
    pub(crate) tracker: TrackerState,
    language: String,
}

impl Default for LedgerStore {
    fn default() -> Self {
        Self {
            calculator: CalculatorState::default(),
            tracker: TrackerState::default(),
            language: "en".to_string(),
        }
    }
}

impl LedgerStore {
    /// Creates an empty ledger with default prices
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // --- Accessors ---

    pub fn calculator(&self) -> &CalculatorState {
        &self.calculator
    }

    pub fn tracker(&self) -> &TrackerState {
        &self.tracker
    }

    /// BCP-47-ish language tag recorded in export documents
    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn set_language(&mut self, language: impl Into<String>) {
        self.language = language.into();
    }

    // --- Calculator mutation ---

    pub fn set_gold_price(&mut self, per_gram: f64) {
        self.calculator.prices.gold24_per_gram = safe_num(per_gram);
    }

    pub fn set_silver_price(&mut self, per_gram: f64) {
        self.calculator.prices.silver_per_gram = safe_num(per_gram);
    }

    pub fn set_asset(&mut self, field: AssetField, value: f64) {
        let value = safe_num(value);
        let a = &mut self.calculator.assets;
        match field {
            AssetField::Gold24g => a.gold24g = value,
            AssetField::Gold21g => a.gold21g = value,
            AssetField::Gold18g => a.gold18g = value,
            AssetField::SilverG => a.silver_g = value,
            AssetField::Cash => a.cash = value,
            AssetField::Inventory => a.inventory = value,
            AssetField::Receivables => a.receivables = value,
            AssetField::Investments => a.investments = value,
            AssetField::OtherAssets => a.other_assets = value,
        }
    }

    pub fn set_deduction(&mut self, field: DeductionField, value: f64) {
        let value = safe_num(value);
        let d = &mut self.calculator.deductions;
        match field {
            DeductionField::ImmediateDebts => d.immediate_debts = value,
            DeductionField::OtherLiabilities => d.other_liabilities = value,
        }
    }

    /// Adds a custom asset row, returning its generated id
    pub fn add_custom_asset(&mut self, label: impl Into<String>, amount: f64) -> CustomAssetId {
        let id = CustomAssetId::generate();
        self.calculator.custom_assets.push(CustomAsset {
            id: id.clone(),
            label: label.into(),
            amount: safe_num(amount),
        });
        id
    }

    /// Updates a custom asset row; returns false if the id is unknown
    pub fn update_custom_asset(
        &mut self,
        id: &CustomAssetId,
        label: Option<String>,
        amount: Option<f64>,
    ) -> bool {
        let Some(row) = self.calculator.custom_assets.iter_mut().find(|c| &c.id == id) else {
            return false;
        };
        if let Some(label) = label {
            row.label = label;
        }
        if let Some(amount) = amount {
            row.amount = safe_num(amount);
        }
        true
    }

    /// Removes a custom asset row; returns false if the id is unknown
    pub fn remove_custom_asset(&mut self, id: &CustomAssetId) -> bool {
        let before = self.calculator.custom_assets.len();
        self.calculator.custom_assets.retain(|c| &c.id != id);
        self.calculator.custom_assets.len() != before
    }

    /// Resets prices, assets, deductions and custom assets to defaults
    pub fn reset_calculator(&mut self) {
        self.calculator = CalculatorState::default();
    }

    // --- Tracker mutation ---

    /// Appends `count` blank payment rows, returning their ids
    pub fn add_payments(&mut self, count: usize) -> Vec<PaymentId> {
        (0..count)
            .map(|_| {
                let payment = Payment::blank();
                let id = payment.id.clone();
                self.tracker.payments.push(payment);
                id
            })
            .collect()
    }

    /// Applies a field-level update to a payment; returns false if unknown
    pub fn update_payment(&mut self, id: &PaymentId, update: PaymentUpdate) -> bool {
        let Some(payment) = self.tracker.payments.iter_mut().find(|p| &p.id == id) else {
            return false;
        };
        if let Some(date) = update.date {
            payment.date = date;
        }
        if let Some(recipient) = update.recipient {
            payment.recipient = recipient;
        }
        if let Some(category) = update.category {
            payment.category = category;
        }
        if let Some(amount) = update.amount {
            payment.amount = safe_num(amount);
        }
        if let Some(notes) = update.notes {
            payment.notes = notes;
        }
        true
    }

    /// Deletes a payment row; returns false if the id is unknown
    pub fn delete_payment(&mut self, id: &PaymentId) -> bool {
        let before = self.tracker.payments.len();
        self.tracker.payments.retain(|p| &p.id != id);
        self.tracker.payments.len() != before
    }

    /// Removes all payment rows
    pub fn clear_payments(&mut self) {
        self.tracker.payments.clear();
    }

    // --- Derived totals ---

    /// Sum of all declared assets, metals weighted by purity
    pub fn gross_assets(&self) -> f64 {
        let p = &self.calculator.prices;
        let a = &self.calculator.assets;
        let metal = a.gold24g * p.gold24_per_gram
            + a.gold21g * p.gold24_per_gram * (21.0 / 24.0)
            + a.gold18g * p.gold24_per_gram * (18.0 / 24.0)
            + a.silver_g * p.silver_per_gram;
        let monetary = a.cash + a.inventory + a.receivables + a.investments + a.other_assets;
        let custom: f64 = self
            .calculator
            .custom_assets
            .iter()
            .map(|c| safe_num(c.amount))
            .sum();
        metal + monetary + custom
    }

    pub fn total_deductions(&self) -> f64 {
        let d = &self.calculator.deductions;
        d.immediate_debts + d.other_liabilities
    }

    /// Gross assets minus deductions, floored at zero
    pub fn net_wealth(&self) -> f64 {
        (self.gross_assets() - self.total_deductions()).max(0.0)
    }

    pub fn nisab_gold(&self) -> f64 {
        NISAB_GOLD_GRAMS * self.calculator.prices.gold24_per_gram
    }

    pub fn nisab_silver(&self) -> f64 {
        NISAB_SILVER_GRAMS * self.calculator.prices.silver_per_gram
    }

    /// The binding threshold: the lower of the two metal thresholds
    pub fn nisab_threshold(&self) -> f64 {
        self.nisab_gold().min(self.nisab_silver())
    }

    pub fn nisab_met(&self) -> bool {
        self.net_wealth() >= self.nisab_threshold()
    }

    /// The obligation: 2.5% of net wealth once nisab is met, else zero
    pub fn zakat_due(&self) -> f64 {
        if self.nisab_met() {
            self.net_wealth() * ZAKAT_RATE
        } else {
            0.0
        }
    }

    pub fn total_paid(&self) -> f64 {
        self.tracker.payments.iter().map(|p| safe_num(p.amount)).sum()
    }

    pub fn remaining(&self) -> f64 {
        (self.zakat_due() - self.total_paid()).max(0.0)
    }

    /// Percentage of the obligation already paid, capped at 100
    pub fn progress_percent(&self) -> f64 {
        let due = self.zakat_due();
        if due <= 0.0 {
            return 0.0;
        }
        ((self.total_paid() / due) * 100.0).min(100.0)
    }

    pub fn is_complete(&self) -> bool {
        let due = self.zakat_due();
        due > 0.0 && self.total_paid() >= due
    }
}

// ============================================================================
// Tests
// ============================================================================
