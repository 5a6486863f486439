//! # Conditional Dispatch
//!
//! [`ConditionalDispatch`] turns a set of handlers into one polymorphic
//! function. Each handler is registered either with a *condition* (a guarded
//! entry) or without one (a fallback entry, the "else" branch for its shape).
//!
//! ## Resolution
//!
//! On [`ConditionalDispatch::invoke`]:
//!
//! 1. Guarded entries are scanned in registration order. An entry is only
//!    considered if the call fits its condition's [`Signature`] (and declared
//!    slot types, if any). Its condition is then evaluated; the first one to
//!    return `true` wins and its handler runs.
//! 2. Otherwise fallback entries are scanned in order and the first whose
//!    signature fits runs.
//! 3. Otherwise the call fails with [`SolarnetError::NoMatchingCondition`] if
//!    some guarded entry fitted the shape but rejected the input, or with
//!    [`SolarnetError::NoMatchingSignature`] if nothing fitted at all.
//!
//! First match wins, there is no "most specific" resolution. Registrants keep
//! conditions that share a shape mutually exclusive.
//!
//! ## Lifecycle
//!
//! Tables are filled during a registration phase and only read afterwards.
//! Nothing is locked: registering while another thread invokes is not
//! supported. [`ConditionalDispatch::derive`] copies a table so a specialised
//! one can extend a general one without touching it.
//!
//! ```ignore
//! let mut table = ConditionalDispatch::new();
//! let sig = Signature::new().param("x");
//! table
//!     .when(Condition::new(sig.clone(), |b| b.get("x").and_then(Value::as_int).is_some()))
//!     .then(Handler::new("int", sig.clone(), |_| "an int"))?;
//! table.register(Handler::new("other", sig, |_| "something else"), None, None, true)?;
//!
//! assert_eq!(table.invoke(&Args::new().arg(5))?, "an int");
//! ```

pub mod signature;
pub mod value;

pub use signature::{Bound, Param, Signature};
pub use value::{ArgType, Args, Kind, Value};

use crate::error::{Result, SolarnetError};
use std::sync::Arc;

pub type HandlerFn<R> = Arc<dyn Fn(&Bound<'_>) -> R + Send + Sync>;
pub type ConditionFn = Arc<dyn Fn(&Bound<'_>) -> bool + Send + Sync>;

/// A named function with a declared signature.
pub struct Handler<R> {
    name: String,
    signature: Signature,
    func: HandlerFn<R>,
}

impl<R> Handler<R> {
    pub fn new<F>(name: impl Into<String>, signature: Signature, func: F) -> Self
    where
        F: Fn(&Bound<'_>) -> R + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            signature,
            func: Arc::new(func),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    fn call(&self, args: &Args) -> Result<R> {
        let bound = self
            .signature
            .bind(args)
            .ok_or_else(|| SolarnetError::BadCall(self.name.clone()))?;
        Ok((self.func)(&bound))
    }
}

impl<R> Clone for Handler<R> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            signature: self.signature.clone(),
            func: self.func.clone(),
        }
    }
}

/// A predicate with a declared signature.
#[derive(Clone)]
pub struct Condition {
    signature: Signature,
    func: ConditionFn,
}

impl Condition {
    pub fn new<F>(signature: Signature, func: F) -> Self
    where
        F: Fn(&Bound<'_>) -> bool + Send + Sync + 'static,
    {
        Self {
            signature,
            func: Arc::new(func),
        }
    }

    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    fn fits(&self, types: Option<&[ArgType]>, args: &Args) -> bool {
        fits(&self.signature, types, args)
    }

    fn holds(&self, args: &Args) -> bool {
        self.signature
            .bind(args)
            .map(|bound| (self.func)(&bound))
            .unwrap_or(false)
    }
}

fn fits(signature: &Signature, types: Option<&[ArgType]>, args: &Args) -> bool {
    signature.matches(args)
        && types.map_or(true, |types| signature.matches_types(types, args))
}

struct Guarded<R> {
    handler: Handler<R>,
    condition: Condition,
    types: Option<Vec<ArgType>>,
}

impl<R> Clone for Guarded<R> {
    fn clone(&self) -> Self {
        Self {
            handler: self.handler.clone(),
            condition: self.condition.clone(),
            types: self.types.clone(),
        }
    }
}

struct Fallback<R> {
    handler: Handler<R>,
    types: Option<Vec<ArgType>>,
}

impl<R> Clone for Fallback<R> {
    fn clone(&self) -> Self {
        Self {
            handler: self.handler.clone(),
            types: self.types.clone(),
        }
    }
}

pub struct ConditionalDispatch<R> {
    guarded: Vec<Guarded<R>>,
    fallback: Vec<Fallback<R>>,
}

impl<R> Default for ConditionalDispatch<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R> Clone for ConditionalDispatch<R> {
    fn clone(&self) -> Self {
        Self::derive(self)
    }
}

impl<R> ConditionalDispatch<R> {
    pub fn new() -> Self {
        Self {
            guarded: Vec::new(),
            fallback: Vec::new(),
        }
    }

    /// A new table starting with `base`'s entries. Handlers are shared, the
    /// entry lists are not.
    pub fn derive(base: &ConditionalDispatch<R>) -> Self {
        Self {
            guarded: base.guarded.clone(),
            fallback: base.fallback.clone(),
        }
    }

    /// Add `handler`. Without a condition it becomes a fallback entry.
    ///
    /// With `validate`, the condition must declare the same shape as the
    /// handler, or [`SolarnetError::SignatureMismatch`] is returned and nothing
    /// is registered.
    pub fn register(
        &mut self,
        handler: Handler<R>,
        condition: Option<Condition>,
        types: Option<Vec<ArgType>>,
        validate: bool,
    ) -> Result<()> {
        match condition {
            None => {
                tracing::trace!(handler = handler.name(), "registered fallback");
                self.fallback.push(Fallback { handler, types });
            }
            Some(condition) => {
                if validate && !handler.signature.same_shape(&condition.signature) {
                    return Err(SolarnetError::SignatureMismatch(handler.name.clone()));
                }
                tracing::trace!(handler = handler.name(), "registered guarded handler");
                self.guarded.push(Guarded {
                    handler,
                    condition,
                    types,
                });
            }
        }
        Ok(())
    }

    /// Start a guarded registration: condition first, handler via
    /// [`Registration::then`].
    pub fn when(&mut self, condition: Condition) -> Registration<'_, R> {
        Registration {
            table: self,
            condition,
            types: None,
            validate: true,
        }
    }

    /// Register an unconditional entry.
    pub fn otherwise(&mut self, handler: Handler<R>) -> &mut Self {
        self.fallback.push(Fallback {
            handler,
            types: None,
        });
        self
    }

    /// Run the first handler whose signature and condition accept `args`.
    pub fn invoke(&self, args: &Args) -> Result<R> {
        let mut matched = false;

        for entry in &self.guarded {
            if !entry.condition.fits(entry.types.as_deref(), args) {
                continue;
            }
            matched = true;
            if entry.condition.holds(args) {
                tracing::debug!(handler = entry.handler.name(), "dispatching");
                return entry.handler.call(args);
            }
            tracing::trace!(handler = entry.handler.name(), "condition rejected input");
        }

        for entry in &self.fallback {
            if fits(&entry.handler.signature, entry.types.as_deref(), args) {
                tracing::debug!(handler = entry.handler.name(), "dispatching fallback");
                return entry.handler.call(args);
            }
        }

        if matched {
            Err(SolarnetError::NoMatchingCondition)
        } else {
            Err(SolarnetError::NoMatchingSignature)
        }
    }

    /// A closure behaving like [`invoke`](Self::invoke).
    pub fn as_callable(&self) -> impl Fn(&Args) -> Result<R> + '_ {
        move |args| self.invoke(args)
    }

    /// Human-readable call shapes, guarded entries first, each prefixed with
    /// `prefix` and with the first `skip` parameters left out.
    pub fn describe_signatures<'a>(
        &'a self,
        prefix: &'a str,
        skip: usize,
    ) -> impl Iterator<Item = String> + 'a {
        let guarded = self
            .guarded
            .iter()
            .map(move |e| describe(prefix, &e.condition.signature, e.types.as_deref(), skip));
        let fallback = self
            .fallback
            .iter()
            .map(move |e| describe(prefix, &e.handler.signature, e.types.as_deref(), skip));
        guarded.chain(fallback)
    }

    /// One line per entry: `prefix(signature) -> handler`.
    pub fn generate_docs(&self, prefix: &str, skip: usize) -> String {
        let names = self
            .guarded
            .iter()
            .map(|e| e.handler.name())
            .chain(self.fallback.iter().map(|e| e.handler.name()));
        self.describe_signatures(prefix, skip)
            .zip(names)
            .map(|(sig, name)| format!("{} -> {}", sig, name))
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    pub fn len(&self) -> usize {
        self.guarded.len() + self.fallback.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn describe(prefix: &str, sig: &Signature, types: Option<&[ArgType]>, skip: usize) -> String {
    match types {
        Some(types) => format!("{}{}", prefix, sig.format_typed(types, skip)),
        None => format!("{}{}", prefix, sig.format(skip)),
    }
}

/// Pending guarded registration created by [`ConditionalDispatch::when`].
pub struct Registration<'a, R> {
    table: &'a mut ConditionalDispatch<R>,
    condition: Condition,
    types: Option<Vec<ArgType>>,
    validate: bool,
}

impl<'a, R> Registration<'a, R> {
    pub fn types(mut self, types: Vec<ArgType>) -> Self {
        self.types = Some(types);
        self
    }

    /// Skip the handler/condition shape check.
    pub fn unchecked(mut self) -> Self {
        self.validate = false;
        self
    }

    pub fn then(self, handler: Handler<R>) -> Result<&'a mut ConditionalDispatch<R>> {
        self.table
            .register(handler, Some(self.condition), self.types, self.validate)?;
        Ok(self.table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn x() -> Signature {
        Signature::new().param("x")
    }

    fn is_int() -> Condition {
        Condition::new(x(), |b| matches!(b.get("x"), Some(Value::Int(_))))
    }

    fn echo(name: &'static str) -> Handler<String> {
        Handler::new(name, x(), move |b| {
            format!("{}({})", name, b.get("x").map(Value::to_string).unwrap_or_default())
        })
    }

    #[test]
    fn guarded_entry_wins_and_fallback_catches_the_rest() {
        let mut table = ConditionalDispatch::new();
        table.register(echo("h1"), Some(is_int()), None, true).unwrap();
        table.register(echo("h2"), None, None, true).unwrap();

        assert_eq!(table.invoke(&Args::new().arg(5)).unwrap(), "h1(5)");
        assert_eq!(table.invoke(&Args::new().arg("x")).unwrap(), r#"h2("x")"#);
    }

    #[test]
    fn first_true_condition_wins_in_registration_order() {
        let always = || Condition::new(x(), |_| true);
        let mut table = ConditionalDispatch::new();
        table.when(always()).then(echo("first")).unwrap();
        table.when(always()).then(echo("second")).unwrap();
        assert_eq!(table.invoke(&Args::new().arg(1)).unwrap(), "first(1)");
    }

    #[test]
    fn false_condition_falls_through_to_later_guard() {
        let mut table = ConditionalDispatch::new();
        table
            .when(Condition::new(x(), |_| false))
            .then(echo("never"))
            .unwrap()
            .when(is_int())
            .then(echo("int"))
            .unwrap();
        assert_eq!(table.invoke(&Args::new().arg(3)).unwrap(), "int(3)");
    }

    #[test]
    fn mismatched_condition_signature_is_rejected_at_registration() {
        let mut table: ConditionalDispatch<String> = ConditionalDispatch::new();
        let condition = Condition::new(Signature::new().param("y"), |_| true);
        let err = table
            .register(echo("h"), Some(condition), None, true)
            .unwrap_err();
        assert!(matches!(err, SolarnetError::SignatureMismatch(ref n) if n == "h"));
        assert!(table.is_empty());
    }

    #[test]
    fn unchecked_registration_skips_shape_check() {
        let mut table: ConditionalDispatch<String> = ConditionalDispatch::new();
        let condition = Condition::new(Signature::new().param("y"), |_| true);
        table.when(condition).unchecked().then(echo("h")).unwrap();
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn miss_kinds_are_distinguishable() {
        let mut table = ConditionalDispatch::new();
        table.when(is_int()).then(echo("int")).unwrap();

        let rejected = table.invoke(&Args::new().arg("s")).unwrap_err();
        assert!(matches!(rejected, SolarnetError::NoMatchingCondition));

        let shapeless = table.invoke(&Args::new().arg(1).arg(2)).unwrap_err();
        assert!(matches!(shapeless, SolarnetError::NoMatchingSignature));

        assert!(rejected.is_dispatch_miss() && shapeless.is_dispatch_miss());
    }

    #[test]
    fn conditions_only_run_on_structural_match() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let two = Signature::new().param("a").param("b");
        let mut table = ConditionalDispatch::new();
        table
            .when(Condition::new(two.clone(), move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
                true
            }))
            .then(Handler::new("pair", two, |_| "pair".to_string()))
            .unwrap();
        table.otherwise(echo("single"));

        assert_eq!(table.invoke(&Args::new().arg(1)).unwrap(), "single(1)");
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(table.invoke(&Args::new().arg(1).arg(2)).unwrap(), "pair");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn declared_types_gate_structural_match() {
        let mut table = ConditionalDispatch::new();
        table
            .when(Condition::new(x(), |_| true))
            .types(vec![ArgType::Is(Kind::Str)])
            .then(echo("str"))
            .unwrap();
        table
            .register(echo("num"), None, Some(vec![ArgType::number()]), true)
            .unwrap();

        assert_eq!(table.invoke(&Args::new().arg("a")).unwrap(), r#"str("a")"#);
        assert_eq!(table.invoke(&Args::new().arg(2.5)).unwrap(), "num(2.5)");
        let err = table.invoke(&Args::new().arg(true)).unwrap_err();
        assert!(matches!(err, SolarnetError::NoMatchingSignature));
    }

    #[test]
    fn keywords_and_defaults_take_part_in_matching() {
        let sig = Signature::new().param("data").optional("source", Value::Null);
        let mut table = ConditionalDispatch::new();
        table
            .when(Condition::new(sig.clone(), |b| {
                b.get("source").and_then(Value::as_str) == Some("xrs")
            }))
            .then(Handler::new("xrs", sig.clone(), |_| "xrs".to_string()))
            .unwrap();
        table.otherwise(Handler::new("generic", sig, |_| "generic".to_string()));

        let xrs = Args::new().arg(1).kwarg("source", "xrs");
        assert_eq!(table.invoke(&xrs).unwrap(), "xrs");
        assert_eq!(table.invoke(&Args::new().arg(1)).unwrap(), "generic");
    }

    #[test]
    fn derived_table_does_not_touch_base() {
        let mut base = ConditionalDispatch::new();
        base.when(is_int()).then(echo("int")).unwrap();

        let mut derived = ConditionalDispatch::derive(&base);
        derived.otherwise(echo("any"));

        assert_eq!(derived.invoke(&Args::new().arg("s")).unwrap(), r#"any("s")"#);
        assert!(matches!(
            base.invoke(&Args::new().arg("s")),
            Err(SolarnetError::NoMatchingCondition)
        ));
        assert_eq!(base.len(), 1);
        assert_eq!(derived.len(), 2);
    }

    #[test]
    fn callable_forwards_to_invoke() {
        let mut table = ConditionalDispatch::new();
        table.otherwise(echo("any"));
        let call = table.as_callable();
        assert_eq!(call(&Args::new().arg(1)).unwrap(), "any(1)");
    }

    #[test]
    fn signatures_are_described_in_registration_order() {
        let mut table = ConditionalDispatch::new();
        table
            .when(is_int())
            .types(vec![ArgType::Is(Kind::Int)])
            .then(echo("int"))
            .unwrap();
        table.otherwise(Handler::new(
            "generic",
            Signature::new().param("cls").param("x").optional("y", 2),
            |_| String::new(),
        ));

        let sigs: Vec<String> = table.describe_signatures("create", 0).collect();
        assert_eq!(sigs, vec!["create(x: int)", "create(cls, x, y=2)"]);

        let skipped: Vec<String> = table.describe_signatures("", 1).collect();
        assert_eq!(skipped, vec!["()", "(x, y=2)"]);

        let docs = table.generate_docs("create", 0);
        assert_eq!(docs, "create(x: int) -> int\n\ncreate(cls, x, y=2) -> generic");
    }
}
