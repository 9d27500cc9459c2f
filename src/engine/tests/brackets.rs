use super::common::*;
use crate::engine::brackets::{BandSchedule, RegulatoryBand};
use crate::engine::error::{EngineError, ScheduleError};

#[test]
fn three_tier_schedule_levies_only_touched_bands() {
    let schedule = three_tier_schedule();

    let assessment = schedule.evaluate(250_000.0).expect("evaluates");

    assert_close(assessment.total, 5_500.0, 1e-6);
    assert_eq!(assessment.breakdown.len(), 3);
    assert_close(assessment.breakdown[0].amount, 1_000.0, 1e-6);
    assert_close(assessment.breakdown[1].amount, 4_500.0, 1e-6);
    assert_eq!(assessment.breakdown[2].portion, 0.0);
    assert_eq!(assessment.breakdown[2].amount, 0.0);
}

#[test]
fn zero_base_value_levies_nothing() {
    let assessment = three_tier_schedule().evaluate(0.0).expect("evaluates");

    assert_eq!(assessment.total, 0.0);
    assert!(assessment
        .breakdown
        .iter()
        .all(|charge| charge.amount == 0.0 && charge.portion == 0.0));
    assert_eq!(assessment.effective_rate(), 0.0);
}

#[test]
fn top_band_absorbs_values_beyond_finite_bounds() {
    let assessment = three_tier_schedule()
        .evaluate(1_300_000.0)
        .expect("evaluates");

    assert_close(assessment.breakdown[2].portion, 1_000_000.0, 1e-6);
    assert_close(assessment.total, 1_000.0 + 6_000.0 + 50_000.0, 1e-6);
}

#[test]
fn breakdown_sums_to_total_and_total_is_monotonic() {
    let schedule = three_tier_schedule();
    let mut previous_total = 0.0;

    for step in 0..=80 {
        let base_value = f64::from(step) * 7_531.25;
        let assessment = schedule.evaluate(base_value).expect("evaluates");

        let summed: f64 = assessment.breakdown.iter().map(|charge| charge.amount).sum();
        assert_close(summed, assessment.total, 1e-9);
        assert!(
            assessment.total >= previous_total,
            "total decreased at base value {base_value}"
        );
        previous_total = assessment.total;
    }
}

#[test]
fn tier_boundary_fills_lower_band_exactly() {
    let assessment = three_tier_schedule().evaluate(100_000.0).expect("evaluates");

    assert_close(assessment.total, 1_000.0, 1e-9);
    assert_eq!(assessment.breakdown[1].portion, 0.0);
}

#[test]
fn negative_base_value_is_rejected() {
    match three_tier_schedule().evaluate(-1.0) {
        Err(EngineError::InvalidInput { field, .. }) => assert_eq!(field, "base_value"),
        other => panic!("expected invalid base value, got {other:?}"),
    }
}

#[test]
fn schedule_rejects_gaps_and_overlaps() {
    let gap = vec![
        RegulatoryBand::bounded(0.0, 100.0, 0.01, "a"),
        RegulatoryBand::unbounded(150.0, 0.02, "b"),
    ];
    assert!(matches!(
        BandSchedule::new(gap),
        Err(ScheduleError::Gap { .. })
    ));

    let overlap = vec![
        RegulatoryBand::bounded(0.0, 100.0, 0.01, "a"),
        RegulatoryBand::unbounded(80.0, 0.02, "b"),
    ];
    assert!(matches!(
        BandSchedule::new(overlap),
        Err(ScheduleError::Overlap { .. })
    ));
}

#[test]
fn schedule_rejects_structural_mistakes() {
    assert_eq!(BandSchedule::new(Vec::new()), Err(ScheduleError::Empty));

    let offset = vec![RegulatoryBand::unbounded(10.0, 0.01, "offset")];
    assert!(matches!(
        BandSchedule::new(offset),
        Err(ScheduleError::FirstBandNotAtZero { .. })
    ));

    let open_middle = vec![
        RegulatoryBand::unbounded(0.0, 0.01, "open"),
        RegulatoryBand::unbounded(100.0, 0.02, "top"),
    ];
    assert!(matches!(
        BandSchedule::new(open_middle),
        Err(ScheduleError::UnboundedNotLast { .. })
    ));

    let closed_top = vec![RegulatoryBand::bounded(0.0, 100.0, 0.01, "closed")];
    assert!(matches!(
        BandSchedule::new(closed_top),
        Err(ScheduleError::MissingUnboundedTop { .. })
    ));

    let bad_rate = vec![RegulatoryBand::unbounded(0.0, 1.5, "steep")];
    assert!(matches!(
        BandSchedule::new(bad_rate),
        Err(ScheduleError::InvalidRate { .. })
    ));

    let inverted = vec![
        RegulatoryBand::bounded(0.0, 0.0, 0.01, "empty"),
        RegulatoryBand::unbounded(0.0, 0.02, "top"),
    ];
    assert!(matches!(
        BandSchedule::new(inverted),
        Err(ScheduleError::EmptyWidth { .. })
    ));
}
