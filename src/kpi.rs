// KPI aggregation over filtered datasets.
//
// Every function here is a pure function of its inputs: no state survives
// between calls and nothing is mutated in place.
use crate::error::KpiError;
use crate::filter;
use crate::normalize::{normalize_loadings, normalize_orders};
use crate::types::{
    DailyOrders, Dashboard, DataQuality, FilterCriteria, KpiSummary, LoadingRecord, OrderRecord,
    RawRecord, RouteTotal, DEPARTURE_COMPLIANT, LOADING_COMPLIANT,
};
use crate::util::percentage;
use chrono::NaiveDate;
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};

/// Saturates at `u64::MAX` rather than overflowing on absurd cells.
pub fn total_orders(orders: &[OrderRecord]) -> u64 {
    orders
        .iter()
        .map(|o| o.total_orders)
        .fold(0u64, u64::saturating_add)
}

/// Sum of all six loaf columns over all rows.
pub fn total_loaded(loadings: &[LoadingRecord]) -> f64 {
    loadings.iter().map(LoadingRecord::total_loaves).sum()
}

fn compliance_pct<F>(loadings: &[LoadingRecord], compliant: F) -> f64
where
    F: Fn(&LoadingRecord) -> bool,
{
    let hits = loadings.iter().filter(|l| compliant(*l)).count();
    percentage(hits as f64, loadings.len() as f64)
}

/// Share of loads marked `Green`, in percent. 0 for an empty set.
pub fn loading_compliance(loadings: &[LoadingRecord]) -> f64 {
    compliance_pct(loadings, |l| l.loading_compliance_status == LOADING_COMPLIANT)
}

/// Share of departures marked `On-time`, in percent. 0 for an empty set.
pub fn departure_compliance(loadings: &[LoadingRecord]) -> f64 {
    compliance_pct(loadings, |l| l.departure_compliance_status == DEPARTURE_COMPLIANT)
}

pub fn cookies_ordered(orders: &[OrderRecord]) -> f64 {
    orders.iter().map(|o| o.munchie_cookies).sum()
}

pub fn cookies_loaded(loadings: &[LoadingRecord]) -> f64 {
    loadings.iter().map(|l| l.munchie_cookies).sum()
}

/// Loaves loaded per route, largest first; equal totals fall back to the
/// route name so the order is stable.
pub fn route_totals(loadings: &[LoadingRecord]) -> Vec<RouteTotal> {
    let mut map: HashMap<&str, f64> = HashMap::new();
    for l in loadings {
        *map.entry(l.route.as_str()).or_insert(0.0) += l.total_loaves();
    }
    let mut totals: Vec<RouteTotal> = map
        .into_iter()
        .map(|(route, total)| RouteTotal {
            route: route.to_string(),
            total,
        })
        .collect();
    totals.sort_by(|a, b| {
        b.total
            .partial_cmp(&a.total)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.route.cmp(&b.route))
    });
    totals
}

/// Occurrences of each distinct value picked out by `status`.
pub fn status_counts<F>(loadings: &[LoadingRecord], status: F) -> BTreeMap<String, usize>
where
    F: Fn(&LoadingRecord) -> &str,
{
    let mut counts = BTreeMap::new();
    for l in loadings {
        *counts.entry(status(l).to_string()).or_insert(0) += 1;
    }
    counts
}

pub fn loading_status_counts(loadings: &[LoadingRecord]) -> BTreeMap<String, usize> {
    status_counts(loadings, |l| l.loading_compliance_status.as_str())
}

pub fn departure_status_counts(loadings: &[LoadingRecord]) -> BTreeMap<String, usize> {
    status_counts(loadings, |l| l.departure_compliance_status.as_str())
}

/// Orders per calendar day, oldest first. Rows without a valid date are
/// left out.
pub fn daily_orders(orders: &[OrderRecord]) -> Vec<DailyOrders> {
    let mut by_day: BTreeMap<NaiveDate, u64> = BTreeMap::new();
    for o in orders {
        if let Some(date) = o.date {
            let total = by_day.entry(date).or_insert(0);
            *total = total.saturating_add(o.total_orders);
        }
    }
    by_day
        .into_iter()
        .map(|(date, total)| DailyOrders { date, total })
        .collect()
}

/// Compute every KPI over already-filtered collections.
pub fn summarize(
    orders: &[OrderRecord],
    loadings: &[LoadingRecord],
    data_quality: DataQuality,
) -> KpiSummary {
    KpiSummary {
        total_orders: total_orders(orders),
        total_loaded: total_loaded(loadings),
        loading_compliance_pct: loading_compliance(loadings),
        departure_compliance_pct: departure_compliance(loadings),
        cookies_ordered: cookies_ordered(orders),
        cookies_loaded: cookies_loaded(loadings),
        route_totals: route_totals(loadings),
        loading_status_counts: loading_status_counts(loadings),
        departure_status_counts: departure_status_counts(loadings),
        daily_orders: daily_orders(orders),
        data_quality,
    }
}

/// Normalize, filter and summarize both datasets in one go.
///
/// The only error is an inverted date range; malformed cells and rows are
/// absorbed and reported through `KpiSummary::data_quality`.
pub fn aggregate(
    raw_orders: &[RawRecord],
    raw_loadings: &[RawRecord],
    criteria: &FilterCriteria,
) -> Result<Dashboard, KpiError> {
    criteria.validate()?;

    let orders = normalize_orders(raw_orders);
    let loadings = normalize_loadings(raw_loadings);
    let filtered_orders = filter::apply(&orders.records, criteria)?;
    let filtered_loadings = filter::apply(&loadings.records, criteria)?;
    log::debug!(
        "filter {}..={} over {} routes kept {} orders, {} loadings",
        criteria.start,
        criteria.end,
        criteria.routes.len(),
        filtered_orders.len(),
        filtered_loadings.len()
    );

    let quality = DataQuality {
        orders: orders.quality,
        loadings: loadings.quality,
    };
    let summary = summarize(&filtered_orders, &filtered_loadings, quality);
    Ok(Dashboard {
        summary,
        orders: filtered_orders,
        loadings: filtered_loadings,
    })
}
