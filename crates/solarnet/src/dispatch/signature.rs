//! Explicit call signatures.
//!
//! Handlers and conditions declare the shape of the calls they accept instead
//! of having it inferred: named parameters (optionally with defaults), an
//! optional variadic positional tail and an optional variadic keyword tail.
//!
//! A signature can be *bound*: its first declared parameter is supplied by
//! whoever owns the handler (a receiver captured in the closure) and is
//! therefore not part of the call. Matching, binding and comparison all skip
//! it.

use super::value::{ArgType, Args, Value};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub name: String,
    pub default: Option<Value>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Signature {
    params: Vec<Param>,
    varargs: Option<String>,
    varkw: Option<String>,
    bound: bool,
}

impl Signature {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a required parameter.
    pub fn param(mut self, name: impl Into<String>) -> Self {
        self.params.push(Param {
            name: name.into(),
            default: None,
        });
        self
    }

    /// Add a parameter that falls back to `default` when not passed.
    pub fn optional(mut self, name: impl Into<String>, default: impl Into<Value>) -> Self {
        self.params.push(Param {
            name: name.into(),
            default: Some(default.into()),
        });
        self
    }

    pub fn varargs(mut self, name: impl Into<String>) -> Self {
        self.varargs = Some(name.into());
        self
    }

    pub fn varkw(mut self, name: impl Into<String>) -> Self {
        self.varkw = Some(name.into());
        self
    }

    /// Mark the first declared parameter as a bound receiver.
    pub fn bound(mut self) -> Self {
        self.bound = true;
        self
    }

    pub fn is_bound(&self) -> bool {
        self.bound
    }

    /// Parameters that take part in a call.
    pub fn params(&self) -> &[Param] {
        if self.bound && !self.params.is_empty() {
            &self.params[1..]
        } else {
            &self.params
        }
    }

    /// Structural equality once bound receivers are discounted.
    pub fn same_shape(&self, other: &Signature) -> bool {
        self.params() == other.params()
            && self.varargs == other.varargs
            && self.varkw == other.varkw
    }

    /// Whether `args` could be bound to this signature.
    pub fn matches(&self, args: &Args) -> bool {
        let params = self.params();
        let n_pos = args.positional.len();

        if self.varargs.is_none() && n_pos > params.len() {
            return false;
        }

        let filled = &params[..n_pos.min(params.len())];
        let rest = &params[n_pos.min(params.len())..];

        for name in args.keywords.keys() {
            // passed both positionally and by keyword
            if filled.iter().any(|p| &p.name == name) {
                return false;
            }
            if self.varkw.is_none() && !rest.iter().any(|p| &p.name == name) {
                return false;
            }
        }

        rest.iter()
            .all(|p| p.default.is_some() || args.keywords.contains_key(&p.name))
    }

    /// Check each slot against its declared type. Slots are ordered as
    /// declared; keywords and defaults fill the slots not passed
    /// positionally. Extra variadic arguments are not checked.
    pub fn matches_types(&self, types: &[ArgType], args: &Args) -> bool {
        match self.bind(args) {
            Some(bound) => bound
                .slots
                .iter()
                .zip(types)
                .all(|((_, value), ty)| ty.accepts(value)),
            None => false,
        }
    }

    /// Resolve `args` against the declared parameters.
    pub fn bind<'a>(&'a self, args: &'a Args) -> Option<Bound<'a>> {
        if !self.matches(args) {
            return None;
        }
        let params = self.params();
        let n_pos = args.positional.len().min(params.len());

        let mut slots = Vec::with_capacity(params.len());
        for (param, value) in params.iter().zip(&args.positional) {
            slots.push((param.name.as_str(), value));
        }
        for param in &params[n_pos..] {
            let value = args.keywords.get(&param.name).or(param.default.as_ref())?;
            slots.push((param.name.as_str(), value));
        }

        let extra_kw = args
            .keywords
            .iter()
            .filter(|(name, _)| !params.iter().any(|p| &p.name == *name))
            .map(|(name, value)| (name.as_str(), value))
            .collect();

        Some(Bound {
            slots,
            extra: &args.positional[n_pos..],
            extra_kw,
        })
    }

    /// Render as `(a, b=1, *rest, **opts)`, dropping the first `skip` params.
    pub fn format(&self, skip: usize) -> String {
        let mut parts: Vec<String> = self
            .params()
            .iter()
            .skip(skip)
            .map(|p| match &p.default {
                Some(default) => format!("{}={}", p.name, default),
                None => p.name.clone(),
            })
            .collect();
        self.push_variadics(&mut parts);
        format!("({})", parts.join(", "))
    }

    /// Render as `(a: int, b: str = "x")`, dropping the first `skip` params
    /// and their types.
    pub fn format_typed(&self, types: &[ArgType], skip: usize) -> String {
        let mut parts: Vec<String> = self
            .params()
            .iter()
            .zip(types)
            .skip(skip)
            .map(|(p, ty)| match &p.default {
                Some(default) => format!("{}: {} = {}", p.name, ty.name(), default),
                None => format!("{}: {}", p.name, ty.name()),
            })
            .collect();
        self.push_variadics(&mut parts);
        format!("({})", parts.join(", "))
    }

    fn push_variadics(&self, parts: &mut Vec<String>) {
        if let Some(name) = &self.varargs {
            parts.push(format!("*{}", name));
        }
        if let Some(name) = &self.varkw {
            parts.push(format!("**{}", name));
        }
    }
}

/// Arguments resolved against a signature.
#[derive(Debug)]
pub struct Bound<'a> {
    slots: Vec<(&'a str, &'a Value)>,
    extra: &'a [Value],
    extra_kw: BTreeMap<&'a str, &'a Value>,
}

impl<'a> Bound<'a> {
    /// Value of a declared parameter, or of a variadic keyword.
    pub fn get(&self, name: &str) -> Option<&'a Value> {
        self.slots
            .iter()
            .find(|(slot, _)| *slot == name)
            .map(|(_, value)| *value)
            .or_else(|| self.extra_kw.get(name).copied())
    }

    /// Value of the `index`-th declared parameter.
    pub fn arg(&self, index: usize) -> Option<&'a Value> {
        self.slots.get(index).map(|(_, value)| *value)
    }

    /// Positional arguments beyond the declared parameters.
    pub fn varargs(&self) -> &'a [Value] {
        self.extra
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}
