//! Instrument-specific time-series sources and how each recognises its data.

use crate::dispatch::Value;
use std::collections::BTreeMap;
use std::fmt;

pub type Meta = BTreeMap<String, Value>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Source {
    Eve,
    Gbm,
    Xrs,
    Lyra,
    NoaaIndices,
    NoaaPredictIndices,
    Norh,
    Rhessi,
}

impl Source {
    pub const ALL: [Source; 8] = [
        Source::Eve,
        Source::Gbm,
        Source::Xrs,
        Source::Lyra,
        Source::NoaaIndices,
        Source::NoaaPredictIndices,
        Source::Norh,
        Source::Rhessi,
    ];

    /// Name accepted by the `source` keyword, compared case-insensitively.
    pub fn name(&self) -> &'static str {
        match self {
            Source::Eve => "EVE",
            Source::Gbm => "GBMSummary",
            Source::Xrs => "XRS",
            Source::Lyra => "LYRA",
            Source::NoaaIndices => "NOAAIndices",
            Source::NoaaPredictIndices => "NOAAPredictIndices",
            Source::Norh => "NoRH",
            Source::Rhessi => "RHESSI",
        }
    }

    pub fn from_name(name: &str) -> Option<Source> {
        Source::ALL
            .iter()
            .copied()
            .find(|s| s.name().eq_ignore_ascii_case(name))
    }

    /// Whether the header identifies this source.
    fn matches_meta(&self, meta: &Meta) -> bool {
        let instrume = meta_str(meta, "instrume");
        let telescop = meta_str(meta, "telescop");
        match self {
            Source::Eve => telescop.is_some_and(|t| t.eq_ignore_ascii_case("SDO/EVE")),
            Source::Gbm => instrume.is_some_and(|i| i.to_ascii_uppercase().starts_with("GBM")),
            Source::Xrs => telescop.is_some_and(|t| t.to_ascii_uppercase().starts_with("GOES")),
            Source::Lyra => instrume.is_some_and(|i| i.eq_ignore_ascii_case("LYRA")),
            Source::Norh => telescop.is_some_and(|t| t.eq_ignore_ascii_case("RADIOHELIOGRAPH")),
            Source::Rhessi => telescop.is_some_and(|t| t.eq_ignore_ascii_case("HESSI")),
            Source::NoaaIndices | Source::NoaaPredictIndices => false,
        }
    }

    /// Whether a call with this `source` keyword and header belongs to us.
    /// An explicit keyword decides on its own.
    pub fn is_datasource_for(&self, source: Option<&str>, meta: Option<&Meta>) -> bool {
        match source {
            Some(name) => self.name().eq_ignore_ascii_case(name),
            None => meta.is_some_and(|m| self.matches_meta(m)),
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Header lookup ignoring key case, as FITS keys come in either.
fn meta_str<'a>(meta: &'a Meta, key: &str) -> Option<&'a str> {
    meta.iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(key))
        .and_then(|(_, v)| v.as_str())
}
