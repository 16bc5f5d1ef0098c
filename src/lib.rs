// Despatch KPI engine.
//
// Raw worksheet rows go in, a `Dashboard` (KPI summary plus the filtered
// records) comes out:
//
//   loader -> normalize -> filter -> kpi -> reports / output
pub mod config;
pub mod error;
pub mod filter;
pub mod kpi;
pub mod loader;
pub mod normalize;
pub mod output;
pub mod reports;
pub mod types;
pub mod util;

pub use error::KpiError;
pub use kpi::aggregate;
pub use types::{
    Dashboard, DataQuality, FieldValue, FilterCriteria, KpiSummary, LoadingRecord, OrderRecord,
    RawRecord,
};
