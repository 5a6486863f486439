//! HEK query attributes and their compilation.
//!
//! | Leaf | Keys written |
//! |------|--------------|
//! | [`EventType`] | `event_type` |
//! | `Time` | `event_starttime`, `event_endtime` |
//! | [`SpatialRegion`] | `x1`, `y1`, `x2`, `y2`, `event_coordsys` |
//! | `Contains` | `type=contains`, `event_type` |
//! | [`ParamAttr`] | `paramN`, `opN`, `valueN` |
//!
//! `N` counts relational constraints within one mapping, starting at 0 in
//! merge order. OR branches each restart at 0.

use crate::attr::{Attr, Leaf, NumberParam, ParamAttr, Params, StringParam, Walker};
use crate::error::SolarnetError;
use crate::time::{TimeRange, HEK_TIME_FORMAT};
use once_cell::sync::Lazy;
use std::borrow::Cow;
use std::fmt;

pub type HekQuery = Attr<HekAttr>;

/// An HEK event class code such as `FL` (flare) or `AR` (active region).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventType(Cow<'static, str>);

impl EventType {
    pub fn new(code: impl Into<String>) -> Self {
        EventType(Cow::Owned(code.into().to_lowercase()))
    }

    pub fn code(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

macro_rules! event_types {
    ($($name:ident => $code:literal, $doc:literal;)*) => {
        $(
            #[doc = $doc]
            pub const $name: EventType = EventType(Cow::Borrowed($code));
        )*

        /// Every named event class.
        pub fn all_event_types() -> Vec<EventType> {
            vec![$($name),*]
        }
    };
}

event_types! {
    AR => "ar", "Active region";
    CE => "ce", "Coronal mass ejection";
    CD => "cd", "Coronal dimming";
    CH => "ch", "Coronal hole";
    CW => "cw", "Coronal wave";
    FI => "fi", "Filament";
    FE => "fe", "Filament eruption";
    FA => "fa", "Filament activation";
    FL => "fl", "Flare";
    LP => "lp", "Loop";
    OS => "os", "Oscillation";
    SS => "ss", "Sunspot";
    EF => "ef", "Emerging flux";
    CJ => "cj", "Coronal jet";
    PG => "pg", "Plage";
    OT => "ot", "Other";
    NR => "nr", "Nothing reported";
    SG => "sg", "Sigmoid";
    SP => "sp", "Spray surge";
    CR => "cr", "Coronal rain";
    CC => "cc", "Coronal cavity";
    ER => "er", "Eruption";
    TO => "to", "Topological object";
}

/// A rectangle on the solar disk in the given coordinate system.
#[derive(Debug, Clone, PartialEq)]
pub struct SpatialRegion {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
    pub sys: String,
}

impl SpatialRegion {
    pub fn new(x1: f64, y1: f64, x2: f64, y2: f64, sys: impl Into<String>) -> Self {
        Self {
            x1,
            y1,
            x2,
            y2,
            sys: sys.into(),
        }
    }
}

impl Default for SpatialRegion {
    /// The full disk.
    fn default() -> Self {
        Self::new(-1200.0, -1200.0, 1200.0, 1200.0, "helioprojective")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum HekAttr {
    EventType(EventType),
    Time(TimeRange),
    SpatialRegion(SpatialRegion),
    /// Events whose region contains the searched one.
    Contains(Vec<EventType>),
    Param(ParamAttr),
}

impl Leaf for HekAttr {
    fn kind(&self) -> &'static str {
        match self {
            HekAttr::EventType(_) => "event_type",
            HekAttr::Time(_) => "time",
            HekAttr::SpatialRegion(_) => "spatial_region",
            HekAttr::Contains(_) => "contains",
            HekAttr::Param(_) => "param",
        }
    }

    fn collides(&self, other: &Self) -> bool {
        matches!((self, other), (HekAttr::EventType(_), HekAttr::EventType(_)))
    }

    fn fold_or(&self, other: &Self) -> Option<Self> {
        match (self, other) {
            (HekAttr::EventType(a), HekAttr::EventType(b)) => Some(HekAttr::EventType(
                EventType(Cow::Owned(format!("{},{}", a.code(), b.code()))),
            )),
            _ => None,
        }
    }
}

impl From<EventType> for HekQuery {
    fn from(event: EventType) -> Self {
        Attr::Leaf(HekAttr::EventType(event))
    }
}

impl From<TimeRange> for HekQuery {
    fn from(range: TimeRange) -> Self {
        Attr::Leaf(HekAttr::Time(range))
    }
}

impl From<SpatialRegion> for HekQuery {
    fn from(region: SpatialRegion) -> Self {
        Attr::Leaf(HekAttr::SpatialRegion(region))
    }
}

impl From<ParamAttr> for HekQuery {
    fn from(param: ParamAttr) -> Self {
        Attr::Leaf(HekAttr::Param(param))
    }
}

impl std::ops::BitOr for EventType {
    type Output = HekQuery;

    fn bitor(self, rhs: EventType) -> HekQuery {
        HekQuery::from(self) | HekQuery::from(rhs)
    }
}

/// `Contains` over the given event classes.
pub fn contains<I>(types: I) -> HekQuery
where
    I: IntoIterator<Item = EventType>,
{
    Attr::Leaf(HekAttr::Contains(types.into_iter().collect()))
}

/// Per-mapping walker state.
#[derive(Debug, Clone, Default)]
pub struct HekState {
    /// Next free `paramN` index.
    pub param_count: usize,
}

static WALKER: Lazy<Walker<HekAttr, HekState>> = Lazy::new(|| {
    let mut walker = Walker::with_boolean_rules();
    let leaves = &["event_type", "time", "spatial_region", "contains", "param"];
    walker
        .add_applying_creator(leaves)
        .add_applier(leaves, |_, attr, state, params| match attr {
            Attr::Leaf(leaf) => {
                apply_leaf(leaf, state, params);
                Ok(())
            }
            other => Err(SolarnetError::NoApplier(other.kind().to_string())),
        })
        .add_applying_creator(&["not"])
        .add_applier(&["not"], |_, attr, state, params| {
            let Attr::Not(inner) = attr else {
                return Err(SolarnetError::NoApplier(attr.kind().to_string()));
            };
            match &**inner {
                Attr::Leaf(HekAttr::Param(param)) => {
                    let negated = param
                        .negated()
                        .ok_or_else(|| SolarnetError::UnsupportedNegation(param_label(param)))?;
                    apply_param(&negated, state, params);
                    Ok(())
                }
                other => Err(SolarnetError::UnsupportedNegation(other.kind().to_string())),
            }
        });
    walker
});

/// The walker compiling [`HekQuery`] trees into request mappings.
pub fn walker() -> &'static Walker<HekAttr, HekState> {
    &WALKER
}

fn param_label(param: &ParamAttr) -> String {
    format!("{} {} {}", param.name, param.op, param.value)
}

fn apply_leaf(leaf: &HekAttr, state: &mut HekState, params: &mut Params) {
    match leaf {
        HekAttr::EventType(event) => {
            params.insert("event_type".into(), event.code().to_string());
        }
        HekAttr::Time(range) => {
            params.insert(
                "event_starttime".into(),
                range.start.format(HEK_TIME_FORMAT).to_string(),
            );
            params.insert(
                "event_endtime".into(),
                range.end.format(HEK_TIME_FORMAT).to_string(),
            );
        }
        HekAttr::SpatialRegion(region) => {
            params.insert("x1".into(), region.x1.to_string());
            params.insert("y1".into(), region.y1.to_string());
            params.insert("x2".into(), region.x2.to_string());
            params.insert("y2".into(), region.y2.to_string());
            params.insert("event_coordsys".into(), region.sys.clone());
        }
        HekAttr::Contains(types) => {
            params.insert("type".into(), "contains".into());
            if !types.is_empty() {
                let joined = types
                    .iter()
                    .map(EventType::code)
                    .collect::<Vec<_>>()
                    .join(",");
                params.insert("event_type".into(), joined);
            }
        }
        HekAttr::Param(param) => apply_param(param, state, params),
    }
}

fn apply_param(param: &ParamAttr, state: &mut HekState, params: &mut Params) {
    let n = state.param_count;
    params.insert(format!("param{}", n), param.name.clone());
    params.insert(format!("op{}", n), param.op.as_str().to_string());
    params.insert(format!("value{}", n), param.value.clone());
    state.param_count += 1;
}

/// Commonly searched HEK fields.
pub mod fields {
    use super::{NumberParam, StringParam};

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum FieldType {
        String,
        Number,
    }

    pub const CATALOGUE: &[(&str, FieldType)] = &[
        ("ar_noaanum", FieldType::Number),
        ("ar_noaaclass", FieldType::String),
        ("area_atdiskcenter", FieldType::Number),
        ("cme_angularwidth", FieldType::Number),
        ("cme_radiallinvel", FieldType::Number),
        ("event_probability", FieldType::Number),
        ("event_peaktime", FieldType::String),
        ("event_score", FieldType::Number),
        ("fl_goescls", FieldType::String),
        ("fl_peakflux", FieldType::Number),
        ("frm_humanflag", FieldType::String),
        ("frm_identifier", FieldType::String),
        ("frm_institute", FieldType::String),
        ("frm_name", FieldType::String),
        ("hgc_x", FieldType::Number),
        ("hgc_y", FieldType::Number),
        ("hpc_x", FieldType::Number),
        ("hpc_y", FieldType::Number),
        ("kb_archivid", FieldType::String),
        ("obs_channelid", FieldType::String),
        ("obs_instrument", FieldType::String),
        ("obs_meanwavel", FieldType::Number),
        ("obs_observatory", FieldType::String),
        ("obs_wavelunit", FieldType::String),
        ("search_frm_name", FieldType::String),
        ("search_instrument", FieldType::String),
        ("search_observatory", FieldType::String),
    ];

    pub fn lookup(name: &str) -> Option<FieldType> {
        CATALOGUE
            .iter()
            .find(|(field, _)| field.eq_ignore_ascii_case(name))
            .map(|(_, ty)| *ty)
    }

    pub fn goes_class() -> StringParam {
        StringParam::new("fl_goescls")
    }

    pub fn frm_name() -> StringParam {
        StringParam::new("frm_name")
    }

    pub fn obs_instrument() -> StringParam {
        StringParam::new("obs_instrument")
    }

    pub fn noaa_number() -> NumberParam {
        NumberParam::new("ar_noaanum")
    }

    pub fn event_probability() -> NumberParam {
        NumberParam::new("event_probability")
    }
}
