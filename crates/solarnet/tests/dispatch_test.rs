use solarnet::dispatch::{Args, Condition, ConditionalDispatch, Handler, Signature, Value};
use solarnet::SolarnetError;

fn describe(kind: &'static str) -> Handler<String> {
    Handler::new(kind, Signature::new().param("x"), move |b| {
        format!("{}:{}", kind, b.get("x").map(Value::to_string).unwrap_or_default())
    })
}

fn is_int() -> Condition {
    Condition::new(Signature::new().param("x"), |b| {
        b.get("x").and_then(Value::as_int).is_some()
    })
}

#[test]
fn test_guarded_then_fallback() {
    let mut table = ConditionalDispatch::new();
    table.when(is_int()).then(describe("int")).unwrap();
    table.otherwise(describe("other"));

    assert_eq!(table.invoke(&Args::new().arg(5)).unwrap(), "int:5");
    assert_eq!(table.invoke(&Args::new().arg("x")).unwrap(), "other:\"x\"");
    assert_eq!(
        table.invoke(&Args::new().kwarg("x", 7)).unwrap(),
        "int:7"
    );
}

#[test]
fn test_miss_kinds() {
    let mut table: ConditionalDispatch<String> = ConditionalDispatch::new();
    table.when(is_int()).then(describe("int")).unwrap();

    assert!(matches!(
        table.invoke(&Args::new().arg(1.5)),
        Err(SolarnetError::NoMatchingCondition)
    ));
    assert!(matches!(
        table.invoke(&Args::new()),
        Err(SolarnetError::NoMatchingSignature)
    ));
    assert!(matches!(
        table.invoke(&Args::new().arg(1).kwarg("y", 2)),
        Err(SolarnetError::NoMatchingSignature)
    ));
}

#[test]
fn test_registration_rejects_mismatched_condition() {
    let mut table: ConditionalDispatch<String> = ConditionalDispatch::new();
    let two = Condition::new(Signature::new().param("x").param("y"), |_| true);
    let err = table.when(two).then(describe("int")).err().unwrap();
    assert!(matches!(err, SolarnetError::SignatureMismatch(_)));
    assert!(table.is_empty());
}

#[test]
fn test_bound_receiver_matches_plain_condition() {
    struct Scale(i64);
    let scale = Scale(3);
    let method = Signature::new().param("self").param("x").bound();

    let mut table = ConditionalDispatch::new();
    table
        .when(is_int())
        .then(Handler::new("scale", method, move |b| {
            b.get("x").and_then(Value::as_int).unwrap_or(0) * scale.0
        }))
        .unwrap();

    assert_eq!(table.invoke(&Args::new().arg(4)).unwrap(), 12);
}

#[test]
fn test_variadics_reach_the_handler() {
    let sig = Signature::new().param("first").varargs("rest").varkw("opts");
    let mut table = ConditionalDispatch::new();
    table.otherwise(Handler::new("collect", sig, |b| {
        (b.varargs().len(), b.get("flag").cloned())
    }));

    let (extra, flag) = table
        .invoke(&Args::new().arg(1).arg(2).arg(3).kwarg("flag", true))
        .unwrap();
    assert_eq!(extra, 2);
    assert_eq!(flag, Some(Value::Bool(true)));
}
