use crate::engine::brackets::{BandSchedule, RegulatoryBand};
use crate::engine::domain::{ApplicantFinancials, LoanParameters, PropertyType};
use crate::engine::ratios::{NoApplicableRulePolicy, RatioKind, RatioLimitRule, RatioRuleSet};

pub(super) fn three_tier_bands() -> Vec<RegulatoryBand> {
    vec![
        RegulatoryBand::bounded(0.0, 100_000.0, 0.01, "first 100k"),
        RegulatoryBand::bounded(100_000.0, 300_000.0, 0.03, "next 200k"),
        RegulatoryBand::unbounded(300_000.0, 0.05, "above 300k"),
    ]
}

pub(super) fn three_tier_schedule() -> BandSchedule {
    BandSchedule::new(three_tier_bands()).expect("valid three tier schedule")
}

pub(super) fn tdsr_rule() -> RatioLimitRule {
    RatioLimitRule::new("tdsr", RatioKind::TotalDebtService, 0.55, [])
        .expect("valid tdsr rule")
}

pub(super) fn msr_rule() -> RatioLimitRule {
    RatioLimitRule::new(
        "msr",
        RatioKind::MortgageService,
        0.30,
        [PropertyType::HdbFlat, PropertyType::ExecutiveCondominium],
    )
    .expect("valid msr rule")
}

pub(super) fn rule_set() -> RatioRuleSet {
    RatioRuleSet::new(vec![tdsr_rule(), msr_rule()], NoApplicableRulePolicy::Reject)
        .expect("valid rule set")
}

pub(super) fn msr_only_rule_set(fallback: NoApplicableRulePolicy) -> RatioRuleSet {
    RatioRuleSet::new(vec![msr_rule()], fallback).expect("valid rule set")
}

pub(super) fn financials() -> ApplicantFinancials {
    ApplicantFinancials::single(8_000.0, 500.0)
}

pub(super) fn loan_parameters(property_type: PropertyType) -> LoanParameters {
    LoanParameters {
        stress_test_annual_rate_pct: 4.0,
        tenure_years: 25,
        property_type,
    }
}

pub(super) fn assert_close(actual: f64, expected: f64, tolerance: f64) {
    assert!(
        (actual - expected).abs() <= tolerance,
        "expected {expected} within {tolerance}, got {actual}"
    );
}
