//! Relational leaf constraints.
//!
//! A [`ParamAttr`] is `(parameter, operator, value)`. The wrappers
//! [`StringParam`] and [`NumberParam`] name a parameter once and build
//! constraints from it:
//!
//! ```ignore
//! let cls = StringParam::new("fl_goescls");
//! let strong = cls.gt("M1");     // fl_goescls > M1
//! let named = cls.like("X%");    // fl_goescls like X%
//! ```

use std::fmt;
use std::str::FromStr;

/// Comparison operator understood by the remote service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    Eq,
    Ne,
    Lt,
    Gt,
    Le,
    Ge,
    Like,
}

impl Op {
    pub const ALL: [Op; 7] = [Op::Eq, Op::Ne, Op::Lt, Op::Gt, Op::Le, Op::Ge, Op::Like];

    pub fn as_str(&self) -> &'static str {
        match self {
            Op::Eq => "=",
            Op::Ne => "!=",
            Op::Lt => "<",
            Op::Gt => ">",
            Op::Le => "<=",
            Op::Ge => ">=",
            Op::Like => "like",
        }
    }

    /// The operator that holds exactly when `self` does not.
    ///
    /// `like` has no complement on the wire.
    pub fn negate(&self) -> Option<Op> {
        match self {
            Op::Eq => Some(Op::Ne),
            Op::Ne => Some(Op::Eq),
            Op::Lt => Some(Op::Ge),
            Op::Ge => Some(Op::Lt),
            Op::Gt => Some(Op::Le),
            Op::Le => Some(Op::Gt),
            Op::Like => None,
        }
    }
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Op {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Op::ALL
            .iter()
            .copied()
            .find(|op| op.as_str().eq_ignore_ascii_case(trimmed))
            .or(match trimmed {
                "==" => Some(Op::Eq),
                "<>" => Some(Op::Ne),
                _ => None,
            })
            .ok_or_else(|| format!("Unknown operator '{}'", s))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParamAttr {
    pub name: String,
    pub op: Op,
    pub value: String,
}

impl ParamAttr {
    pub fn new(name: impl Into<String>, op: Op, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            op,
            value: value.into(),
        }
    }

    /// Same constraint with the complementary operator, if there is one.
    pub fn negated(&self) -> Option<ParamAttr> {
        self.op.negate().map(|op| ParamAttr {
            name: self.name.clone(),
            op,
            value: self.value.clone(),
        })
    }
}

/// Parses `name op value`, e.g. `fl_goescls > M1`. The value is the rest of
/// the line and may contain spaces.
impl FromStr for ParamAttr {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.trim().splitn(3, char::is_whitespace);
        let (Some(name), Some(op), Some(value)) = (parts.next(), parts.next(), parts.next()) else {
            return Err(format!("Expected 'name op value', got '{}'", s));
        };
        let value = value.trim();
        if value.is_empty() {
            return Err(format!("Missing value in '{}'", s));
        }
        Ok(ParamAttr::new(name, op.parse()?, value))
    }
}

/// Builds string-valued constraints on one parameter.
#[derive(Debug, Clone)]
pub struct StringParam {
    name: String,
}

impl StringParam {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    fn build(&self, op: Op, value: impl Into<String>) -> ParamAttr {
        ParamAttr::new(self.name.clone(), op, value)
    }

    pub fn eq(&self, value: impl Into<String>) -> ParamAttr {
        self.build(Op::Eq, value)
    }

    pub fn ne(&self, value: impl Into<String>) -> ParamAttr {
        self.build(Op::Ne, value)
    }

    pub fn lt(&self, value: impl Into<String>) -> ParamAttr {
        self.build(Op::Lt, value)
    }

    pub fn gt(&self, value: impl Into<String>) -> ParamAttr {
        self.build(Op::Gt, value)
    }

    pub fn le(&self, value: impl Into<String>) -> ParamAttr {
        self.build(Op::Le, value)
    }

    pub fn ge(&self, value: impl Into<String>) -> ParamAttr {
        self.build(Op::Ge, value)
    }

    pub fn like(&self, pattern: impl Into<String>) -> ParamAttr {
        self.build(Op::Like, pattern)
    }
}

/// Builds numeric constraints on one parameter. `like` is not offered.
#[derive(Debug, Clone)]
pub struct NumberParam {
    name: String,
}

impl NumberParam {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    fn build(&self, op: Op, value: f64) -> ParamAttr {
        ParamAttr::new(self.name.clone(), op, value.to_string())
    }

    pub fn eq(&self, value: f64) -> ParamAttr {
        self.build(Op::Eq, value)
    }

    pub fn ne(&self, value: f64) -> ParamAttr {
        self.build(Op::Ne, value)
    }

    pub fn lt(&self, value: f64) -> ParamAttr {
        self.build(Op::Lt, value)
    }

    pub fn gt(&self, value: f64) -> ParamAttr {
        self.build(Op::Gt, value)
    }

    pub fn le(&self, value: f64) -> ParamAttr {
        self.build(Op::Le, value)
    }

    pub fn ge(&self, value: f64) -> ParamAttr {
        self.build(Op::Ge, value)
    }
}
