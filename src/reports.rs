// Tabular views of a `KpiSummary`, one per dashboard page.
use crate::types::{
    CookiesRow, DailyOrdersRow, DataQuality, KpiSummary, LoadingRecord, LoadingTableRow,
    MetricRow, OrderRecord, OrderTableRow, RouteLoadRow, SetQuality, StatusCountRow,
};
use crate::util::{format_int, format_number, format_pct, percentage};
use std::collections::BTreeMap;

const BLANK_STATUS: &str = "(blank)";

fn metric(name: &str, value: String) -> MetricRow {
    MetricRow {
        metric: name.to_string(),
        value,
    }
}

/// Headline metric cards of the summary page.
pub fn summary_rows(summary: &KpiSummary) -> Vec<MetricRow> {
    vec![
        metric("Total Orders", format_int(summary.total_orders)),
        metric("Loaves Loaded", format_number(summary.total_loaded.trunc(), 0)),
        metric("Loading Compliance", format_pct(summary.loading_compliance_pct)),
        metric("Departure Compliance", format_pct(summary.departure_compliance_pct)),
        metric("Munchie Cookies Ordered", format_number(summary.cookies_ordered.trunc(), 0)),
        metric("Munchie Cookies Loaded", format_number(summary.cookies_loaded.trunc(), 0)),
    ]
}

pub fn route_load_rows(summary: &KpiSummary) -> Vec<RouteLoadRow> {
    summary
        .route_totals
        .iter()
        .enumerate()
        .map(|(idx, rt)| RouteLoadRow {
            rank: idx + 1,
            route: rt.route.clone(),
            total_loaded: format_number(rt.total, 0),
            share_pct: format_number(percentage(rt.total, summary.total_loaded), 1),
        })
        .collect()
}

/// Status breakdown, most frequent first like a bar chart of value counts.
pub fn status_rows(counts: &BTreeMap<String, usize>) -> Vec<StatusCountRow> {
    let total: usize = counts.values().sum();
    let mut sorted: Vec<(&String, &usize)> = counts.iter().collect();
    sorted.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));
    sorted
        .into_iter()
        .map(|(status, count)| StatusCountRow {
            status: if status.is_empty() {
                BLANK_STATUS.to_string()
            } else {
                status.clone()
            },
            count: *count,
            share_pct: format_number(percentage(*count as f64, total as f64), 1),
        })
        .collect()
}

pub fn daily_order_rows(summary: &KpiSummary) -> Vec<DailyOrdersRow> {
    summary
        .daily_orders
        .iter()
        .map(|d| DailyOrdersRow {
            date: d.date.format("%Y-%m-%d").to_string(),
            total_orders: format_int(d.total),
        })
        .collect()
}

/// Ordered vs loaded cookies; the share column is what the pie chart shows.
pub fn cookie_rows(summary: &KpiSummary) -> Vec<CookiesRow> {
    let both = summary.cookies_ordered + summary.cookies_loaded;
    [
        ("Ordered", summary.cookies_ordered),
        ("Loaded", summary.cookies_loaded),
    ]
    .into_iter()
    .map(|(measure, qty)| CookiesRow {
        measure: measure.to_string(),
        quantity: format_number(qty, 0),
        share_pct: format_number(percentage(qty, both), 1),
    })
    .collect()
}

fn quality_rows(label: &str, q: &SetQuality, rows: &mut Vec<MetricRow>) {
    rows.push(metric(&format!("{} rows", label), format_int(q.total_rows)));
    rows.push(metric(
        &format!("{} rows missing DATE/ROUTE", label),
        format_int(q.missing_identity),
    ));
    rows.push(metric(
        &format!("{} rows with invalid DATE", label),
        format_int(q.invalid_dates),
    ));
    rows.push(metric(
        &format!("{} rows with colliding headers", label),
        format_int(q.key_collisions),
    ));
}

pub fn data_quality_rows(quality: &DataQuality) -> Vec<MetricRow> {
    let mut rows = Vec::new();
    quality_rows("Orders", &quality.orders, &mut rows);
    quality_rows("Loadings", &quality.loadings, &mut rows);
    rows
}

fn date_cell(date: Option<chrono::NaiveDate>) -> String {
    date.map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

/// Flat rows for showing or exporting the filtered orders.
pub fn order_table_rows(orders: &[OrderRecord]) -> Vec<OrderTableRow> {
    orders
        .iter()
        .map(|o| OrderTableRow {
            date: date_cell(o.date),
            route: o.route.clone(),
            total_orders: o.total_orders,
            munchie_cookies: o.munchie_cookies,
        })
        .collect()
}

pub fn loading_table_rows(loadings: &[LoadingRecord]) -> Vec<LoadingTableRow> {
    loadings
        .iter()
        .map(|l| {
            let [bi_white, bi_brown, bi_whole_wheat, mr_chingwa, mrs_chingwa, dr_chingwa] =
                l.loaves;
            LoadingTableRow {
                date: date_cell(l.date),
                route: l.route.clone(),
                bi_white,
                bi_brown,
                bi_whole_wheat,
                mr_chingwa,
                mrs_chingwa,
                dr_chingwa,
                munchie_cookies: l.munchie_cookies,
                loading_compliance_status: l.loading_compliance_status.clone(),
                departure_compliance_status: l.departure_compliance_status.clone(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{DailyOrders, RouteTotal};
    use chrono::NaiveDate;

    fn summary() -> KpiSummary {
        let mut loading_counts = BTreeMap::new();
        loading_counts.insert("Green".to_string(), 3);
        loading_counts.insert("Red".to_string(), 1);
        loading_counts.insert(String::new(), 1);
        KpiSummary {
            total_orders: 12_500,
            total_loaded: 400.0,
            loading_compliance_pct: 60.0,
            departure_compliance_pct: 87.5,
            cookies_ordered: 30.0,
            cookies_loaded: 10.0,
            route_totals: vec![
                RouteTotal { route: "Gweru".into(), total: 300.0 },
                RouteTotal { route: "Kwekwe".into(), total: 100.0 },
            ],
            loading_status_counts: loading_counts,
            departure_status_counts: BTreeMap::new(),
            daily_orders: vec![DailyOrders {
                date: NaiveDate::from_ymd_opt(2024, 1, 5).unwrap(),
                total: 1_250,
            }],
            data_quality: DataQuality::default(),
        }
    }

    #[test]
    fn test_summary_rows() {
        let rows = summary_rows(&summary());
        assert_eq!(rows.len(), 6);
        assert_eq!(rows[0].value, "12,500");
        assert_eq!(rows[2].value, "60.0%");
        assert_eq!(rows[3].value, "87.5%");
    }

    #[test]
    fn test_route_load_rows_rank_and_share() {
        let rows = route_load_rows(&summary());
        assert_eq!(rows[0].rank, 1);
        assert_eq!(rows[0].route, "Gweru");
        assert_eq!(rows[0].share_pct, "75.0");
        assert_eq!(rows[1].share_pct, "25.0");
    }

    #[test]
    fn test_status_rows_most_frequent_first() {
        let rows = status_rows(&summary().loading_status_counts);
        let labels: Vec<&str> = rows.iter().map(|r| r.status.as_str()).collect();
        assert_eq!(labels, vec!["Green", "(blank)", "Red"]);
        assert_eq!(rows[0].share_pct, "60.0");
    }

    #[test]
    fn test_status_rows_empty() {
        assert!(status_rows(&BTreeMap::new()).is_empty());
    }

    #[test]
    fn test_daily_and_cookie_rows() {
        let s = summary();
        let daily = daily_order_rows(&s);
        assert_eq!(daily[0].date, "2024-01-05");
        assert_eq!(daily[0].total_orders, "1,250");
        let cookies = cookie_rows(&s);
        assert_eq!(cookies[0].share_pct, "75.0");
        assert_eq!(cookies[1].quantity, "10");
    }

    #[test]
    fn test_loading_table_rows_unpack_loaves() {
        let l = LoadingRecord {
            date: NaiveDate::from_ymd_opt(2024, 2, 1),
            route: "Masvingo".into(),
            loading_compliance_status: "Green".into(),
            departure_compliance_status: "Late".into(),
            loaves: [1.0, 2.0, 3.0, 4.0, 5.0, 6.0],
            munchie_cookies: 7.0,
        };
        let rows = loading_table_rows(&[l]);
        assert_eq!(rows[0].date, "2024-02-01");
        assert_eq!(rows[0].bi_white, 1.0);
        assert_eq!(rows[0].mrs_chingwa, 5.0);
        assert_eq!(rows[0].dr_chingwa, 6.0);
    }

    #[test]
    fn test_order_table_rows_blank_date() {
        let o = OrderRecord {
            date: None,
            route: "A".into(),
            total_orders: 3,
            munchie_cookies: 0.0,
        };
        assert_eq!(order_table_rows(&[o])[0].date, "");
    }

    #[test]
    fn test_data_quality_rows() {
        let rows = data_quality_rows(&DataQuality::default());
        assert_eq!(rows.len(), 8);
        assert!(rows.iter().all(|r| r.value == "0"));
    }
}
