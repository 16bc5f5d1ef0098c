// Date-range and route-set filtering.
use crate::error::KpiError;
use crate::types::{DispatchRecord, FilterCriteria, LoadingRecord, OrderRecord};
use chrono::NaiveDate;
use std::collections::BTreeSet;

impl FilterCriteria {
    /// Build criteria for the inclusive range `[start, end]`.
    ///
    /// Returns `KpiError::InvalidRange` when `start > end`; bounds are never
    /// swapped.
    pub fn new<I, S>(start: NaiveDate, end: NaiveDate, routes: I) -> Result<Self, KpiError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let criteria = FilterCriteria {
            start,
            end,
            routes: routes.into_iter().map(Into::into).collect(),
        };
        criteria.validate()?;
        Ok(criteria)
    }

    pub fn validate(&self) -> Result<(), KpiError> {
        if self.start > self.end {
            return Err(KpiError::InvalidRange {
                start: self.start,
                end: self.end,
            });
        }
        Ok(())
    }

    /// Rows with an invalid date never match.
    pub fn matches<T: DispatchRecord>(&self, record: &T) -> bool {
        match record.date() {
            Some(d) => d >= self.start && d <= self.end && self.routes.contains(record.route()),
            None => false,
        }
    }
}

/// Keep the records inside the criteria's date range and route set.
pub fn apply<T>(records: &[T], criteria: &FilterCriteria) -> Result<Vec<T>, KpiError>
where
    T: DispatchRecord + Clone,
{
    criteria.validate()?;
    Ok(records
        .iter()
        .filter(|r| criteria.matches(*r))
        .cloned()
        .collect())
}

/// Earliest and latest valid date across both datasets, used as the
/// initial range when the user has not picked one.
pub fn date_bounds(
    orders: &[OrderRecord],
    loadings: &[LoadingRecord],
) -> Option<(NaiveDate, NaiveDate)> {
    let dates = orders
        .iter()
        .filter_map(|r| r.date)
        .chain(loadings.iter().filter_map(|r| r.date));
    dates.fold(None, |acc, d| match acc {
        None => Some((d, d)),
        Some((lo, hi)) => Some((lo.min(d), hi.max(d))),
    })
}

/// Distinct non-blank routes of the loadings, sorted. This is the set a
/// "select all routes" control starts from.
pub fn known_routes(loadings: &[LoadingRecord]) -> Vec<String> {
    loadings
        .iter()
        .map(|r| r.route.as_str())
        .filter(|r| !r.is_empty())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn order(date: Option<NaiveDate>, route: &str, total: u64) -> OrderRecord {
        OrderRecord {
            date,
            route: route.to_string(),
            total_orders: total,
            munchie_cookies: 0.0,
        }
    }

    fn loading(date: Option<NaiveDate>, route: &str) -> LoadingRecord {
        LoadingRecord {
            date,
            route: route.to_string(),
            loading_compliance_status: String::new(),
            departure_compliance_status: String::new(),
            loaves: [0.0; 6],
            munchie_cookies: 0.0,
        }
    }

    fn sample_orders() -> Vec<OrderRecord> {
        vec![
            order(Some(ymd(2024, 1, 1)), "A", 1),
            order(Some(ymd(2024, 1, 2)), "B", 2),
            order(Some(ymd(2024, 1, 3)), "A", 3),
            order(None, "A", 4),
            order(Some(ymd(2024, 1, 5)), "C", 5),
        ]
    }

    #[test]
    fn test_new_rejects_inverted_range() {
        let err = FilterCriteria::new(ymd(2024, 2, 1), ymd(2024, 1, 1), ["A"]).unwrap_err();
        assert!(matches!(err, KpiError::InvalidRange { .. }));
    }

    #[test]
    fn test_new_accepts_single_day() {
        let c = FilterCriteria::new(ymd(2024, 1, 1), ymd(2024, 1, 1), ["A"]).unwrap();
        assert_eq!(c.routes.len(), 1);
    }

    #[test]
    fn test_apply_rejects_inverted_range_built_by_hand() {
        let criteria = FilterCriteria {
            start: ymd(2024, 3, 2),
            end: ymd(2024, 3, 1),
            routes: ["A".to_string()].into_iter().collect(),
        };
        assert!(matches!(
            apply(&sample_orders(), &criteria),
            Err(KpiError::InvalidRange { .. })
        ));
    }

    #[test]
    fn test_invalid_range_only_when_start_after_end() {
        let base = ymd(2024, 1, 10);
        for offset in -5i64..=5 {
            let other = base + chrono::Duration::days(offset);
            let result = FilterCriteria::new(base, other, Vec::<String>::new());
            assert_eq!(result.is_err(), base > other, "offset {}", offset);
        }
    }

    #[test]
    fn test_apply_inclusive_bounds_and_routes() {
        let c = FilterCriteria::new(ymd(2024, 1, 1), ymd(2024, 1, 3), ["A"]).unwrap();
        let kept = apply(&sample_orders(), &c).unwrap();
        let totals: Vec<u64> = kept.iter().map(|o| o.total_orders).collect();
        assert_eq!(totals, vec![1, 3]);
    }

    #[test]
    fn test_apply_empty_route_set_selects_nothing() {
        let c =
            FilterCriteria::new(ymd(2000, 1, 1), ymd(2100, 1, 1), Vec::<String>::new()).unwrap();
        assert!(apply(&sample_orders(), &c).unwrap().is_empty());
    }

    #[test]
    fn test_apply_skips_invalid_dates() {
        let c = FilterCriteria::new(ymd(1900, 1, 1), ymd(2100, 1, 1), ["A", "B", "C"]).unwrap();
        let kept = apply(&sample_orders(), &c).unwrap();
        assert_eq!(kept.len(), 4);
        assert!(kept.iter().all(|o| o.date.is_some()));
    }

    #[test]
    fn test_apply_is_idempotent() {
        let c = FilterCriteria::new(ymd(2024, 1, 2), ymd(2024, 1, 5), ["A", "C"]).unwrap();
        let once = apply(&sample_orders(), &c).unwrap();
        let twice = apply(&once, &c).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_date_bounds() {
        let loadings = vec![loading(Some(ymd(2023, 12, 30)), "A"), loading(None, "B")];
        assert_eq!(
            date_bounds(&sample_orders(), &loadings),
            Some((ymd(2023, 12, 30), ymd(2024, 1, 5)))
        );
        assert_eq!(date_bounds(&[], &[loading(None, "A")]), None);
    }

    #[test]
    fn test_known_routes_sorted_and_distinct() {
        let loadings = vec![
            loading(None, "Mutare"),
            loading(None, "Bulawayo"),
            loading(None, "Mutare"),
            loading(None, ""),
        ];
        assert_eq!(known_routes(&loadings), vec!["Bulawayo", "Mutare"]);
    }
}
