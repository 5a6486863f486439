//! # Time Series Factory
//!
//! [`TimeSeriesFactory`] builds a [`TimeSeries`] from column data, routing
//! each call to the source that recognises it. It is a [`ConditionalDispatch`]
//! table with one accepted call shape:
//!
//! ```text
//! TimeSeries(data: map, meta: map | null = null, source: str | null = null)
//! ```
//!
//! Every built-in [`Source`] is a guarded entry: it claims the call when the
//! `source` keyword names it, or, without a keyword, when the `instrume` or
//! `telescop` header identifies it. Anything unclaimed becomes a generic time
//! series.

mod sources;

pub use sources::{Meta, Source};

use crate::dispatch::{ArgType, Args, Bound, Condition, ConditionalDispatch, Handler, Kind, Signature, Value};
use crate::error::{Result, SolarnetError};
use serde::Serialize;
use std::collections::BTreeMap;

pub const GENERIC: &str = "Generic";

/// Named columns of equal length plus a header.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeSeries {
    source: String,
    data: BTreeMap<String, Vec<Value>>,
    meta: Meta,
}

impl TimeSeries {
    fn new(source: &str, data: &BTreeMap<String, Value>, meta: Meta) -> Result<Self> {
        let mut columns = BTreeMap::new();
        let mut len = None;
        for (name, column) in data {
            let values = column.as_list().ok_or_else(|| {
                SolarnetError::TimeSeries(format!("column '{}' is not a list", name))
            })?;
            match len {
                Some(n) if n != values.len() => {
                    return Err(SolarnetError::TimeSeries(format!(
                        "column '{}' has {} rows, expected {}",
                        name,
                        values.len(),
                        n
                    )));
                }
                _ => len = Some(values.len()),
            }
            columns.insert(name.clone(), values.to_vec());
        }
        Ok(Self {
            source: source.to_string(),
            data: columns,
            meta,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn meta(&self) -> &Meta {
        &self.meta
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.data.keys().map(String::as_str)
    }

    pub fn column(&self, name: &str) -> Option<&[Value]> {
        self.data.get(name).map(Vec::as_slice)
    }

    /// Numeric view of a column; non-numeric cells are `None`.
    pub fn numbers(&self, name: &str) -> Option<Vec<Option<f64>>> {
        self.column(name)
            .map(|values| values.iter().map(Value::as_float).collect())
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.data.values().next().map_or(0, Vec::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Clone)]
pub struct TimeSeriesFactory {
    registry: ConditionalDispatch<Result<TimeSeries>>,
}

fn signature() -> Signature {
    Signature::new()
        .param("data")
        .optional("meta", Value::Null)
        .optional("source", Value::Null)
}

fn slot_types() -> Vec<ArgType> {
    vec![
        ArgType::Is(Kind::Map),
        ArgType::OneOf(vec![Kind::Map, Kind::Null]),
        ArgType::OneOf(vec![Kind::Str, Kind::Null]),
    ]
}

fn build(name: &str, bound: &Bound<'_>) -> Result<TimeSeries> {
    let data = bound
        .get("data")
        .and_then(Value::as_map)
        .ok_or_else(|| SolarnetError::TimeSeries("data must be a map of columns".into()))?;
    let meta = bound
        .get("meta")
        .and_then(Value::as_map)
        .cloned()
        .unwrap_or_default();
    TimeSeries::new(name, data, meta)
}

impl TimeSeriesFactory {
    /// Every built-in source plus the generic fallback.
    pub fn new() -> Result<Self> {
        let mut factory = Self {
            registry: ConditionalDispatch::new(),
        };
        for source in Source::ALL {
            factory.register(source.name(), move |name, meta| {
                source.is_datasource_for(name, meta)
            })?;
        }
        factory.registry.register(
            Handler::new(GENERIC, signature(), |bound| build(GENERIC, bound)),
            None,
            Some(slot_types()),
            true,
        )?;
        Ok(factory)
    }

    /// A copy that can be extended without affecting `self`.
    pub fn derive(&self) -> Self {
        Self {
            registry: ConditionalDispatch::derive(&self.registry),
        }
    }

    /// Add a source claiming calls for which `claims(source_kw, meta)` holds.
    /// It is tried after every source registered before it.
    pub fn register<F>(&mut self, name: &str, claims: F) -> Result<()>
    where
        F: Fn(Option<&str>, Option<&Meta>) -> bool + Send + Sync + 'static,
    {
        let condition = Condition::new(signature(), move |bound| {
            let source = bound.get("source").and_then(Value::as_str);
            let meta = bound.get("meta").and_then(Value::as_map);
            claims(source, meta)
        });
        let owned = name.to_string();
        let handler = Handler::new(name, signature(), move |bound| build(&owned, bound));
        self.registry
            .when(condition)
            .types(slot_types())
            .then(handler)?;
        Ok(())
    }

    /// Build a time series from raw call arguments.
    pub fn create(&self, args: &Args) -> Result<TimeSeries> {
        self.registry.invoke(args)?
    }

    /// Convenience over [`create`](Self::create).
    pub fn create_from(
        &self,
        data: BTreeMap<String, Value>,
        meta: Option<Meta>,
        source: Option<&str>,
    ) -> Result<TimeSeries> {
        let mut args = Args::new().arg(Value::Map(data));
        if let Some(meta) = meta {
            args = args.kwarg("meta", Value::Map(meta));
        }
        if let Some(source) = source {
            args = args.kwarg("source", source);
        }
        self.create(&args)
    }

    /// The accepted call shapes, one per entry, each tagged with the source
    /// that handles it.
    pub fn signatures(&self) -> String {
        self.registry.generate_docs("TimeSeries", 0)
    }

    pub fn len(&self) -> usize {
        self.registry.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registry.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn data() -> BTreeMap<String, Value> {
        BTreeMap::from([
            ("xrsa".to_string(), Value::List(vec![1e-8.into(), 2e-8.into()])),
            ("xrsb".to_string(), Value::List(vec![1e-7.into(), 3e-7.into()])),
        ])
    }

    fn header(key: &str, value: &str) -> Meta {
        BTreeMap::from([(key.to_string(), Value::from(value))])
    }

    #[test]
    fn source_keyword_routes() {
        let ts = TimeSeriesFactory::new()
            .unwrap()
            .create_from(data(), None, Some("xrs"))
            .unwrap();
        assert_eq!(ts.source(), "XRS");
        assert_eq!(ts.len(), 2);
    }

    #[test]
    fn header_routes_without_keyword() {
        let ts = TimeSeriesFactory::new()
            .unwrap()
            .create_from(data(), Some(header("TELESCOP", "GOES 15")), None)
            .unwrap();
        assert_eq!(ts.source(), "XRS");
        assert_eq!(ts.meta().len(), 1);
    }

    #[test]
    fn serializes_columns_and_header() {
        let ts = TimeSeriesFactory::new()
            .unwrap()
            .create_from(data(), Some(header("TELESCOP", "GOES 15")), None)
            .unwrap();
        let json = serde_json::to_value(&ts).unwrap();
        assert_eq!(json["source"], "XRS");
        assert_eq!(json["data"]["xrsb"][1], 3e-7);
        assert_eq!(json["meta"]["TELESCOP"], "GOES 15");
    }

    #[test]
    fn unknown_data_becomes_generic() {
        let ts = TimeSeriesFactory::new().unwrap().create_from(data(), None, None).unwrap();
        assert_eq!(ts.source(), GENERIC);
        assert_eq!(ts.numbers("xrsb").unwrap(), vec![Some(1e-7), Some(3e-7)]);
    }

    #[test]
    fn non_map_data_matches_no_signature() {
        let err = TimeSeriesFactory::new()
            .unwrap()
            .create(&Args::new().arg(vec![Value::from(1)]))
            .unwrap_err();
        assert!(matches!(err, SolarnetError::NoMatchingSignature));
    }

    #[test]
    fn ragged_columns_are_rejected() {
        let mut cols = data();
        cols.insert("bad".into(), Value::List(vec![1.into()]));
        let err = TimeSeriesFactory::new().unwrap().create_from(cols, None, None).unwrap_err();
        assert!(matches!(err, SolarnetError::TimeSeries(_)));
    }

    #[test]
    fn derived_factory_extends_independently() {
        let base = TimeSeriesFactory::new().unwrap();
        let mut custom = base.derive();
        custom
            .register("Custom", |source, _| source == Some("custom"))
            .unwrap();

        let ts = custom.create_from(data(), None, Some("custom")).unwrap();
        assert_eq!(ts.source(), "Custom");

        let ts = base.create_from(data(), None, Some("custom")).unwrap();
        assert_eq!(ts.source(), GENERIC);
        assert_eq!(custom.len(), base.len() + 1);
    }

    #[test]
    fn signatures_list_every_source() {
        let docs = TimeSeriesFactory::new().unwrap().signatures();
        assert!(docs.starts_with(
            "TimeSeries(data: map, meta: map | null = null, source: str | null = null) -> EVE"
        ));
        for source in Source::ALL {
            assert!(docs.contains(&format!("-> {}", source.name())));
        }
        assert!(docs.ends_with("-> Generic"));
    }
}
