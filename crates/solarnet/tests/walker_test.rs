use solarnet::attr::Attr;
use solarnet::hek::attrs::{walker, HekState, FL, SS};
use solarnet::hek::{fields, HekQuery, SpatialRegion};
use solarnet::SolarnetError;

fn compile(q: &HekQuery) -> Result<usize, SolarnetError> {
    walker().create(q, &mut HekState::default()).map(|b| b.len())
}

fn samples() -> Vec<HekQuery> {
    vec![
        HekQuery::from(FL),
        HekQuery::from(fields::goes_class().gt("M1")),
        HekQuery::from(SpatialRegion::new(-100.0, -100.0, 100.0, 100.0, "helioprojective")),
        HekQuery::from(fields::frm_name().eq("A")) | HekQuery::from(fields::frm_name().eq("B")),
        HekQuery::from(SS)
            .and(HekQuery::from(fields::noaa_number().eq(11158.0)))
            .unwrap(),
    ]
}

#[test]
fn test_or_block_count_is_additive() {
    for x in samples() {
        for y in samples() {
            let expected = compile(&x).unwrap() + compile(&y).unwrap();
            let either = Attr::Or(vec![x.clone(), y.clone()]);
            assert_eq!(compile(&either).unwrap(), expected, "{:?} | {:?}", x, y);
        }
    }
}

#[test]
fn test_and_of_leaves_yields_one_block() {
    let q = Attr::and_all([
        HekQuery::from(FL),
        HekQuery::from(fields::goes_class().gt("M1")),
        HekQuery::from(fields::event_probability().ge(0.5)),
    ])
    .unwrap();
    assert_eq!(compile(&q).unwrap(), 1);
}

#[test]
fn test_and_over_or_fans_out_per_branch() {
    let q = HekQuery::from(FL)
        .and(samples()[3].clone())
        .unwrap();
    assert_eq!(compile(&q).unwrap(), 2);
}

#[test]
fn test_dummy_is_a_compilation_error() {
    assert!(matches!(
        compile(&Attr::Dummy),
        Err(SolarnetError::NoCreator(_))
    ));
    let hidden = Attr::And(vec![HekQuery::from(FL), Attr::Dummy]);
    assert!(matches!(compile(&hidden), Err(SolarnetError::NoApplier(_))));
}
