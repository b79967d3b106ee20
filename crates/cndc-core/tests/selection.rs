use cndc_core::selection::{
    distinct_values, filter_entity, filter_periods, period_bounds, PeriodRange,
};
use cndc_core::{CanonicalPeriod, LongDataset, LongRecord};

fn period(year: i32, month: u32) -> CanonicalPeriod {
    CanonicalPeriod::new(year, month).unwrap()
}

fn sample() -> LongDataset {
    let mut dataset = LongDataset::new(
        vec!["AGENTE".to_string(), "EMPRESA".to_string()],
        "Precio Potencia USD/kW",
    );
    for (agent, company, month, value) in [
        ("ELFEC", "DISTRIBUIDORAS", 2, Some(8.3)),
        ("CRE", "DISTRIBUIDORAS", 1, Some(8.1)),
        ("COBEE", "GENERADORAS", 3, None),
        ("CRE", "DISTRIBUIDORAS", 3, Some(8.2)),
    ] {
        dataset.records.push(LongRecord {
            identifiers: vec![agent.to_string(), company.to_string()],
            period: period(2023, month),
            value,
        });
    }
    dataset
}

#[test]
fn bounds_span_all_periods() {
    let bounds = period_bounds(&sample()).unwrap();
    assert_eq!(bounds.start, period(2023, 1));
    assert_eq!(bounds.end, period(2023, 3));

    let empty = LongDataset::new(Vec::new(), "x");
    assert!(period_bounds(&empty).is_none());
}

#[test]
fn period_filter_is_inclusive() {
    let range = PeriodRange::new(period(2023, 3), period(2023, 2));
    assert_eq!(range.start, period(2023, 2));

    let filtered = filter_periods(&sample(), range);
    assert_eq!(filtered.len(), 3);
    assert!(filtered.records.iter().all(|r| range.contains(r.period)));
    assert_eq!(filtered.value_name, "Precio Potencia USD/kW");
}

#[test]
fn entity_filter_matches_exact_value() {
    let filtered = filter_entity(&sample(), "AGENTE", "CRE").unwrap();
    assert_eq!(filtered.len(), 2);
    assert_eq!(filtered.records[0].period, period(2023, 1));

    assert!(filter_entity(&sample(), "AGENTE", "cre").unwrap().is_empty());
    assert!(filter_entity(&sample(), "CENTRAL", "CRE").is_err());
}

#[test]
fn distinct_values_keep_first_seen_order() {
    assert_eq!(
        distinct_values(&sample(), "AGENTE").unwrap(),
        vec!["ELFEC", "CRE", "COBEE"]
    );
    assert_eq!(
        distinct_values(&sample(), "EMPRESA").unwrap(),
        vec!["DISTRIBUIDORAS", "GENERADORAS"]
    );
}
