//! HEK result rows.
//!
//! Rows are kept as the JSON objects the service returned. Lookups return
//! `Option` so a missing column is a value, not an error; the VSO bridges
//! ([`HekRow::vso_time`], [`HekRow::vso_instrument`]) are the only places that
//! insist on particular columns.

use crate::attr::Params;
use crate::error::{Result, SolarnetError};
use crate::time::{parse_time, TimeRange};
use crate::vso::{DataAttr, DataQuery};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};
use std::collections::HashSet;
use std::hash::Hash;

/// One HEK event record.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HekRow(Map<String, Value>);

impl HekRow {
    pub fn new(fields: Map<String, Value>) -> Self {
        HekRow(fields)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// A string column, if present and a string.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }

    fn require_str(&self, key: &str) -> Result<&str> {
        self.get_str(key)
            .ok_or_else(|| SolarnetError::Row(format!("missing column '{}'", key)))
    }

    /// The event's time span as a data attribute.
    pub fn vso_time(&self) -> Result<DataAttr> {
        let start = parse_time(self.require_str("event_starttime")?)?;
        let end = parse_time(self.require_str("event_endtime")?)?;
        Ok(DataAttr::Time(TimeRange::new(start, end)?))
    }

    /// The observing instrument as a data attribute. Rows entered by the HEK
    /// itself carry no instrument.
    pub fn vso_instrument(&self) -> Result<DataAttr> {
        match self.require_str("obs_instrument")? {
            "HEK" => Err(SolarnetError::Row("No instrument contained.".into())),
            name => Ok(DataAttr::instrument(name)),
        }
    }

    /// `vso_time & vso_instrument`.
    pub fn vso_all(&self) -> Result<DataQuery> {
        DataQuery::from(self.vso_time()?).and(self.vso_instrument()?.into())
    }

    /// Request parameters that export this event as a VOEvent document.
    pub fn voevent_params(&self) -> Result<Params> {
        let ivorn = self.require_str("kb_archivid")?;
        Ok(Params::from([
            ("cmd".to_string(), "export-voevent".to_string()),
            ("cosec".to_string(), "1".to_string()),
            ("ivorn".to_string(), ivorn.to_string()),
        ]))
    }
}

/// Ordered HEK rows.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HekTable {
    rows: Vec<HekRow>,
}

impl HekTable {
    pub fn new(rows: Vec<HekRow>) -> Self {
        Self { rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&HekRow> {
        self.rows.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, HekRow> {
        self.rows.iter()
    }

    /// One entry per row; `None` where the row lacks the column.
    pub fn column(&self, name: &str) -> Vec<Option<&Value>> {
        self.rows.iter().map(|row| row.get(name)).collect()
    }

    /// Concatenate tables, keeping only the first occurrence of structurally
    /// equal rows.
    pub fn merge<I>(tables: I) -> HekTable
    where
        I: IntoIterator<Item = HekTable>,
    {
        let rows = unique(tables.into_iter().flat_map(|t| t.rows), |row| {
            freeze(&Value::Object(row.0.clone()))
        });
        HekTable { rows }
    }
}

impl IntoIterator for HekTable {
    type Item = HekRow;
    type IntoIter = std::vec::IntoIter<HekRow>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.into_iter()
    }
}

impl<'a> IntoIterator for &'a HekTable {
    type Item = &'a HekRow;
    type IntoIter = std::slice::Iter<'a, HekRow>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

impl FromIterator<HekRow> for HekTable {
    fn from_iter<I: IntoIterator<Item = HekRow>>(iter: I) -> Self {
        HekTable {
            rows: iter.into_iter().collect(),
        }
    }
}

/// Hashable canonical form of a JSON value. Object keys are sorted, so two
/// rows that differ only in key order freeze to the same value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Frozen {
    Null,
    Bool(bool),
    Number(String),
    Str(String),
    List(Vec<Frozen>),
    Map(Vec<(String, Frozen)>),
}

pub fn freeze(value: &Value) -> Frozen {
    match value {
        Value::Null => Frozen::Null,
        Value::Bool(b) => Frozen::Bool(*b),
        Value::Number(n) => Frozen::Number(number_key(n)),
        Value::String(s) => Frozen::Str(s.clone()),
        Value::Array(items) => Frozen::List(items.iter().map(freeze).collect()),
        Value::Object(map) => {
            let mut entries: Vec<(String, Frozen)> =
                map.iter().map(|(k, v)| (k.clone(), freeze(v))).collect();
            entries.sort_by(|a, b| a.0.cmp(&b.0));
            Frozen::Map(entries)
        }
    }
}

/// Integral floats key like the equal integer, so `1.0` and `1` collapse.
fn number_key(n: &Number) -> String {
    match n.as_f64() {
        Some(f) if n.is_f64() && f.fract() == 0.0 && f.abs() < 9_007_199_254_740_992.0 => {
            (f as i64).to_string()
        }
        _ => n.to_string(),
    }
}

/// Items of `iter` whose key has not been seen before, in order.
pub fn unique<T, K, I, F>(iter: I, key: F) -> Vec<T>
where
    I: IntoIterator<Item = T>,
    K: Hash + Eq,
    F: Fn(&T) -> K,
{
    let mut seen = HashSet::new();
    iter.into_iter()
        .filter(|item| seen.insert(key(item)))
        .collect()
}
