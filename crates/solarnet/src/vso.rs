//! Data-service attributes.
//!
//! These are the leaves understood by the data retriever clients and produced
//! by [`HekRow::vso_all`](crate::hek::HekRow::vso_all). Every kind is
//! exclusive with itself: a query block cannot ask for two time ranges or two
//! instruments at once. Use OR for that.

use crate::attr::{Attr, Leaf, Params, Walker};
use crate::time::{TimeRange, HEK_TIME_FORMAT};
use once_cell::sync::Lazy;
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum DataAttr {
    Time(TimeRange),
    Instrument(String),
    /// Wavelength range in Angstrom.
    Wavelength { min: f64, max: f64 },
    Level(String),
    /// Sampling interval in seconds.
    Sample(f64),
    /// GOES satellite number.
    SatelliteNumber(u32),
}

pub type DataQuery = Attr<DataAttr>;

impl DataAttr {
    pub fn time(range: TimeRange) -> Self {
        DataAttr::Time(range)
    }

    pub fn instrument(name: impl Into<String>) -> Self {
        DataAttr::Instrument(name.into())
    }

    pub fn wavelength(min: f64, max: f64) -> Self {
        if min <= max {
            DataAttr::Wavelength { min, max }
        } else {
            DataAttr::Wavelength { min: max, max: min }
        }
    }

    pub fn level(level: impl fmt::Display) -> Self {
        DataAttr::Level(level.to_string())
    }
}

impl Leaf for DataAttr {
    fn kind(&self) -> &'static str {
        match self {
            DataAttr::Time(_) => "time",
            DataAttr::Instrument(_) => "instrument",
            DataAttr::Wavelength { .. } => "wavelength",
            DataAttr::Level(_) => "level",
            DataAttr::Sample(_) => "sample",
            DataAttr::SatelliteNumber(_) => "satellitenumber",
        }
    }

    fn collides(&self, other: &Self) -> bool {
        self.kind() == other.kind()
    }
}

/// Keys written by the data walker.
pub mod keys {
    pub const START: &str = "start";
    pub const END: &str = "end";
    pub const INSTRUMENT: &str = "instrument";
    pub const WAVE_MIN: &str = "wavelength_min";
    pub const WAVE_MAX: &str = "wavelength_max";
    pub const LEVEL: &str = "level";
    pub const SAMPLE: &str = "sample";
    pub const SATELLITE: &str = "satellitenumber";
}

static WALKER: Lazy<Walker<DataAttr, ()>> = Lazy::new(|| {
    let mut walker = Walker::with_boolean_rules();
    let kinds = &[
        "time",
        "instrument",
        "wavelength",
        "level",
        "sample",
        "satellitenumber",
    ];
    walker
        .add_applying_creator(kinds)
        .add_applier(kinds, |_, attr, _, params| {
            if let Attr::Leaf(leaf) = attr {
                apply_leaf(leaf, params);
            }
            Ok(())
        });
    walker
});

fn apply_leaf(leaf: &DataAttr, params: &mut Params) {
    match leaf {
        DataAttr::Time(range) => {
            params.insert(keys::START.into(), range.start.format(HEK_TIME_FORMAT).to_string());
            params.insert(keys::END.into(), range.end.format(HEK_TIME_FORMAT).to_string());
        }
        DataAttr::Instrument(name) => {
            params.insert(keys::INSTRUMENT.into(), name.to_lowercase());
        }
        DataAttr::Wavelength { min, max } => {
            params.insert(keys::WAVE_MIN.into(), min.to_string());
            params.insert(keys::WAVE_MAX.into(), max.to_string());
        }
        DataAttr::Level(level) => {
            params.insert(keys::LEVEL.into(), level.clone());
        }
        DataAttr::Sample(secs) => {
            params.insert(keys::SAMPLE.into(), secs.to_string());
        }
        DataAttr::SatelliteNumber(n) => {
            params.insert(keys::SATELLITE.into(), n.to_string());
        }
    }
}

/// Walker compiling data queries into flat key/value blocks.
pub fn walker() -> &'static Walker<DataAttr, ()> {
    &WALKER
}
