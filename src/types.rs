use chrono::NaiveDate;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use tabled::Tabled;

pub const FIELD_DATE: &str = "DATE";
pub const FIELD_ROUTE: &str = "ROUTE";
pub const FIELD_TOTAL_ORDERS: &str = "TOTAL_ORDERS";
pub const FIELD_MUNCHIE_COOKIES: &str = "MUNCHIE_COOKIES";
pub const FIELD_LOADING_STATUS: &str = "LOADING_COMPLIANCE_STATUS";
pub const FIELD_DEPARTURE_STATUS: &str = "DEPARTURE_COMPLIANCE_STATUS";

/// The six product-quantity columns of the LOADED worksheet, in sheet order.
pub const LOAF_COLUMNS: [&str; 6] = [
    "BI_WHITE",
    "BI_BROWN",
    "BI_WHOLE_WHEAT",
    "MR_CHINGWA",
    "MRS_CHINGWA",
    "DR_CHINGWA",
];

/// Status value counted as a compliant load.
pub const LOADING_COMPLIANT: &str = "Green";
/// Status value counted as a compliant departure.
pub const DEPARTURE_COMPLIANT: &str = "On-time";

/// A single cell as handed over by the ingestion side.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    Number(f64),
    Date(NaiveDate),
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Text(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::Text(s)
    }
}

impl From<f64> for FieldValue {
    fn from(n: f64) -> Self {
        FieldValue::Number(n)
    }
}

impl From<NaiveDate> for FieldValue {
    fn from(d: NaiveDate) -> Self {
        FieldValue::Date(d)
    }
}

/// One spreadsheet row keyed by its original (un-normalized) header.
pub type RawRecord = BTreeMap<String, FieldValue>;

/// Common view over both datasets used by filtering and grouping.
pub trait DispatchRecord {
    /// Calendar date of the row; `None` when the DATE cell did not parse.
    fn date(&self) -> Option<NaiveDate>;
    fn route(&self) -> &str;
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderRecord {
    pub date: Option<NaiveDate>,
    pub route: String,
    pub total_orders: u64,
    pub munchie_cookies: f64,
}

impl DispatchRecord for OrderRecord {
    fn date(&self) -> Option<NaiveDate> {
        self.date
    }

    fn route(&self) -> &str {
        &self.route
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoadingRecord {
    pub date: Option<NaiveDate>,
    pub route: String,
    pub loading_compliance_status: String,
    pub departure_compliance_status: String,
    /// Quantities in `LOAF_COLUMNS` order.
    pub loaves: [f64; 6],
    pub munchie_cookies: f64,
}

impl LoadingRecord {
    pub fn total_loaves(&self) -> f64 {
        self.loaves.iter().sum()
    }
}

impl DispatchRecord for LoadingRecord {
    fn date(&self) -> Option<NaiveDate> {
        self.date
    }

    fn route(&self) -> &str {
        &self.route
    }
}

/// Inclusive date range plus the routes to keep.
///
/// An empty route set selects nothing. Pre-populating it with every known
/// route is the caller's job (see `filter::known_routes`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterCriteria {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub routes: BTreeSet<String>,
}

/// Per-dataset diagnostics gathered while normalizing raw rows.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SetQuality {
    pub total_rows: usize,
    /// Rows dropped because DATE or ROUTE was absent altogether.
    pub missing_identity: usize,
    /// Rows kept whose DATE did not parse; they never match a date range.
    pub invalid_dates: usize,
    /// Rows where two headers normalized to the same field name.
    pub key_collisions: usize,
}

impl SetQuality {
    pub fn is_clean(&self) -> bool {
        self.missing_identity == 0 && self.invalid_dates == 0 && self.key_collisions == 0
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DataQuality {
    pub orders: SetQuality,
    pub loadings: SetQuality,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteTotal {
    pub route: String,
    pub total: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailyOrders {
    pub date: NaiveDate,
    pub total: u64,
}

/// Headline numbers and breakdowns for one filter application.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KpiSummary {
    pub total_orders: u64,
    pub total_loaded: f64,
    pub loading_compliance_pct: f64,
    pub departure_compliance_pct: f64,
    pub cookies_ordered: f64,
    pub cookies_loaded: f64,
    /// Sorted by total descending, then route name ascending.
    pub route_totals: Vec<RouteTotal>,
    pub loading_status_counts: BTreeMap<String, usize>,
    pub departure_status_counts: BTreeMap<String, usize>,
    /// Chronological.
    pub daily_orders: Vec<DailyOrders>,
    pub data_quality: DataQuality,
}

/// Everything the presentation side needs after one refresh.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dashboard {
    pub summary: KpiSummary,
    pub orders: Vec<OrderRecord>,
    pub loadings: Vec<LoadingRecord>,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct MetricRow {
    #[serde(rename = "Metric")]
    #[tabled(rename = "Metric")]
    pub metric: String,
    #[serde(rename = "Value")]
    #[tabled(rename = "Value")]
    pub value: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct RouteLoadRow {
    #[serde(rename = "Rank")]
    #[tabled(rename = "Rank")]
    pub rank: usize,
    #[serde(rename = "Route")]
    #[tabled(rename = "Route")]
    pub route: String,
    #[serde(rename = "TotalLoaded")]
    #[tabled(rename = "TotalLoaded")]
    pub total_loaded: String,
    #[serde(rename = "SharePct")]
    #[tabled(rename = "SharePct")]
    pub share_pct: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct StatusCountRow {
    #[serde(rename = "Status")]
    #[tabled(rename = "Status")]
    pub status: String,
    #[serde(rename = "Count")]
    #[tabled(rename = "Count")]
    pub count: usize,
    #[serde(rename = "SharePct")]
    #[tabled(rename = "SharePct")]
    pub share_pct: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct DailyOrdersRow {
    #[serde(rename = "Date")]
    #[tabled(rename = "Date")]
    pub date: String,
    #[serde(rename = "TotalOrders")]
    #[tabled(rename = "TotalOrders")]
    pub total_orders: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct CookiesRow {
    #[serde(rename = "Measure")]
    #[tabled(rename = "Measure")]
    pub measure: String,
    #[serde(rename = "Quantity")]
    #[tabled(rename = "Quantity")]
    pub quantity: String,
    #[serde(rename = "SharePct")]
    #[tabled(rename = "SharePct")]
    pub share_pct: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct OrderTableRow {
    #[serde(rename = "DATE")]
    #[tabled(rename = "DATE")]
    pub date: String,
    #[serde(rename = "ROUTE")]
    #[tabled(rename = "ROUTE")]
    pub route: String,
    #[serde(rename = "TOTAL_ORDERS")]
    #[tabled(rename = "TOTAL_ORDERS")]
    pub total_orders: u64,
    #[serde(rename = "MUNCHIE_COOKIES")]
    #[tabled(rename = "MUNCHIE_COOKIES")]
    pub munchie_cookies: f64,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct LoadingTableRow {
    #[serde(rename = "DATE")]
    #[tabled(rename = "DATE")]
    pub date: String,
    #[serde(rename = "ROUTE")]
    #[tabled(rename = "ROUTE")]
    pub route: String,
    #[serde(rename = "BI_WHITE")]
    #[tabled(rename = "BI_WHITE")]
    pub bi_white: f64,
    #[serde(rename = "BI_BROWN")]
    #[tabled(rename = "BI_BROWN")]
    pub bi_brown: f64,
    #[serde(rename = "BI_WHOLE_WHEAT")]
    #[tabled(rename = "BI_WHOLE_WHEAT")]
    pub bi_whole_wheat: f64,
    #[serde(rename = "MR_CHINGWA")]
    #[tabled(rename = "MR_CHINGWA")]
    pub mr_chingwa: f64,
    #[serde(rename = "MRS_CHINGWA")]
    #[tabled(rename = "MRS_CHINGWA")]
    pub mrs_chingwa: f64,
    #[serde(rename = "DR_CHINGWA")]
    #[tabled(rename = "DR_CHINGWA")]
    pub dr_chingwa: f64,
    #[serde(rename = "MUNCHIE_COOKIES")]
    #[tabled(rename = "MUNCHIE_COOKIES")]
    pub munchie_cookies: f64,
    #[serde(rename = "LOADING_COMPLIANCE_STATUS")]
    #[tabled(rename = "LOADING_COMPLIANCE_STATUS")]
    pub loading_compliance_status: String,
    #[serde(rename = "DEPARTURE_COMPLIANCE_STATUS")]
    #[tabled(rename = "DEPARTURE_COMPLIANCE_STATUS")]
    pub departure_compliance_status: String,
}
