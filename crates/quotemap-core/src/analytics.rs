use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::coercion::FieldValue;
use crate::mapping::outcome::Record;

/// Key used for records that lack the group-by field.
pub const MISSING_GROUP: &str = "(none)";

/// Aggregates of one numeric field.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldSummary {
    pub field: String,
    /// Number of records with a numeric value for the field.
    pub count: usize,
    #[serde(with = "rust_decimal::serde::float_option")]
    pub sum: Option<Decimal>,
    #[serde(with = "rust_decimal::serde::float_option")]
    pub min: Option<Decimal>,
    #[serde(with = "rust_decimal::serde::float_option")]
    pub max: Option<Decimal>,
    #[serde(with = "rust_decimal::serde::float_option")]
    pub average: Option<Decimal>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupTotal {
    pub key: String,
    /// Records in the group, whether or not they carry a value.
    pub count: usize,
    #[serde(with = "rust_decimal::serde::float")]
    pub sum: Decimal,
}

/// Count, sum, min, max and average of the numeric values of `field`.
///
/// Non-numeric values and records without the field are ignored.
pub fn summarize<'a, I>(records: I, field: &str) -> FieldSummary
where
    I: IntoIterator<Item = &'a Record>,
{
    let mut count = 0usize;
    let mut sum = Decimal::ZERO;
    let mut min: Option<Decimal> = None;
    let mut max: Option<Decimal> = None;

    for value in records
        .into_iter()
        .filter_map(|r| r.get(field).and_then(FieldValue::as_decimal))
    {
        let Some(next) = sum.checked_add(value) else {
            tracing::warn!(field, "sum overflowed; value skipped");
            continue;
        };
        sum = next;
        count += 1;
        min = Some(min.map_or(value, |m| m.min(value)));
        max = Some(max.map_or(value, |m| m.max(value)));
    }

    let (sum, average) = if count == 0 {
        (None, None)
    } else {
        (Some(sum), sum.checked_div(Decimal::from(count)))
    };

    FieldSummary {
        field: field.to_string(),
        count,
        sum,
        min,
        max,
        average,
    }
}

/// Totals of `value_field` grouped by the text of `group_by`, sorted by key.
pub fn group_totals<'a, I>(records: I, group_by: &str, value_field: &str) -> Vec<GroupTotal>
where
    I: IntoIterator<Item = &'a Record>,
{
    let mut groups: BTreeMap<String, (usize, Decimal)> = BTreeMap::new();
    for record in records {
        let key = record
            .get(group_by)
            .map(|v| v.to_string())
            .unwrap_or_else(|| MISSING_GROUP.to_string());
        let entry = groups.entry(key).or_insert((0, Decimal::ZERO));
        entry.0 += 1;
        if let Some(value) = record.get(value_field).and_then(FieldValue::as_decimal) {
            match entry.1.checked_add(value) {
                Some(next) => entry.1 = next,
                None => tracing::warn!(group_by, value_field, "group sum overflowed; value skipped"),
            }
        }
    }

    groups
        .into_iter()
        .map(|(key, (count, sum))| GroupTotal { key, count, sum })
        .collect()
}
