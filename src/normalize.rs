// Raw spreadsheet rows -> typed records.
//
// Header normalization, cell coercion and data-quality accounting all happen
// here. Nothing in this module returns an error to the caller: rows that
// cannot be identified are dropped and counted instead.
use crate::error::KpiError;
use crate::types::{
    DispatchRecord, FieldValue, LoadingRecord, OrderRecord, RawRecord, SetQuality, FIELD_DATE,
    FIELD_DEPARTURE_STATUS, FIELD_LOADING_STATUS, FIELD_MUNCHIE_COOKIES, FIELD_ROUTE,
    FIELD_TOTAL_ORDERS, LOAF_COLUMNS,
};
use crate::util::{coerce_count, coerce_date, coerce_quantity, coerce_text, normalize_key};
use std::collections::BTreeMap;

/// A row after header normalization.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizedRow {
    pub fields: BTreeMap<String, FieldValue>,
    /// Normalized names that more than one raw header mapped onto.
    pub collisions: Vec<String>,
}

/// Typed records of one dataset plus what was lost on the way.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Normalized<T> {
    pub records: Vec<T>,
    pub quality: SetQuality,
}

/// Normalize every header of a raw row.
///
/// When two headers collide (e.g. `Route` and ` ROUTE`), the one that sorts
/// first in the raw row keeps its value and the collision is recorded.
pub fn normalize_keys(raw: &RawRecord) -> NormalizedRow {
    let mut row = NormalizedRow::default();
    for (key, value) in raw {
        let name = normalize_key(key);
        if row.fields.contains_key(&name) {
            log::debug!("header {:?} collides with an earlier column named {}", key, name);
            if !row.collisions.contains(&name) {
                row.collisions.push(name);
            }
            continue;
        }
        row.fields.insert(name, value.clone());
    }
    row
}

fn require<'a>(
    fields: &'a BTreeMap<String, FieldValue>,
    row: usize,
    field: &'static str,
) -> Result<&'a FieldValue, KpiError> {
    fields.get(field).ok_or(KpiError::MissingField { row, field })
}

impl OrderRecord {
    /// Build an order from normalized fields. Fails only when DATE or ROUTE
    /// is absent; every other problem is coerced away.
    pub fn from_fields(
        row: usize,
        fields: &BTreeMap<String, FieldValue>,
    ) -> Result<Self, KpiError> {
        let date = require(fields, row, FIELD_DATE)?;
        let route = require(fields, row, FIELD_ROUTE)?;
        Ok(OrderRecord {
            date: coerce_date(date),
            route: coerce_text(Some(route)),
            total_orders: coerce_count(fields.get(FIELD_TOTAL_ORDERS)),
            munchie_cookies: coerce_quantity(fields.get(FIELD_MUNCHIE_COOKIES)),
        })
    }
}

impl LoadingRecord {
    pub fn from_fields(
        row: usize,
        fields: &BTreeMap<String, FieldValue>,
    ) -> Result<Self, KpiError> {
        let date = require(fields, row, FIELD_DATE)?;
        let route = require(fields, row, FIELD_ROUTE)?;
        let mut loaves = [0.0; 6];
        for (slot, column) in loaves.iter_mut().zip(LOAF_COLUMNS) {
            *slot = coerce_quantity(fields.get(column));
        }
        Ok(LoadingRecord {
            date: coerce_date(date),
            route: coerce_text(Some(route)),
            loading_compliance_status: coerce_text(fields.get(FIELD_LOADING_STATUS)),
            departure_compliance_status: coerce_text(fields.get(FIELD_DEPARTURE_STATUS)),
            loaves,
            munchie_cookies: coerce_quantity(fields.get(FIELD_MUNCHIE_COOKIES)),
        })
    }
}

fn normalize_set<T, F>(raw: &[RawRecord], label: &str, build: F) -> Normalized<T>
where
    T: DispatchRecord,
    F: Fn(usize, &BTreeMap<String, FieldValue>) -> Result<T, KpiError>,
{
    let mut quality = SetQuality {
        total_rows: raw.len(),
        ..SetQuality::default()
    };
    let mut records = Vec::with_capacity(raw.len());

    for (idx, raw_row) in raw.iter().enumerate() {
        let row = normalize_keys(raw_row);
        if !row.collisions.is_empty() {
            quality.key_collisions += 1;
        }
        match build(idx + 1, &row.fields) {
            Ok(record) => {
                if record.date().is_none() {
                    quality.invalid_dates += 1;
                }
                records.push(record);
            }
            Err(e) => {
                log::debug!("{}: {}", label, e);
                quality.missing_identity += 1;
            }
        }
    }

    if !quality.is_clean() {
        log::warn!(
            "{}: {} of {} rows excluded (missing DATE/ROUTE), {} with unparsable dates, \
             {} with colliding headers",
            label,
            quality.missing_identity,
            quality.total_rows,
            quality.invalid_dates,
            quality.key_collisions
        );
    }

    Normalized { records, quality }
}

pub fn normalize_orders(raw: &[RawRecord]) -> Normalized<OrderRecord> {
    normalize_set(raw, "orders", OrderRecord::from_fields)
}

pub fn normalize_loadings(raw: &[RawRecord]) -> Normalized<LoadingRecord> {
    normalize_set(raw, "loadings", LoadingRecord::from_fields)
}
