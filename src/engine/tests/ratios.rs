use super::common::*;
use crate::engine::domain::{ApplicantFinancials, PropertyType, RuleId};
use crate::engine::error::{EngineError, RuleError};
use crate::engine::ratios::{
    assess_ratios, compute_ratio, resolve_binding, NoApplicableRulePolicy, RatioKind,
    RatioLimitRule, RatioRuleSet,
};

#[test]
fn total_debt_ratio_counts_existing_obligations() {
    let result = compute_ratio(&tdsr_rule(), &financials(), 2_400.0, PropertyType::HdbFlat)
        .expect("computes");

    assert_close(result.computed_ratio, 2_900.0 / 8_000.0, 1e-12);
    assert!(result.is_applicable);
    assert!(result.within_ceiling);
    assert!(!result.is_binding);
    assert_close(result.max_payment, 3_900.0, 1e-9);
}

#[test]
fn mortgage_ratio_excludes_unsecured_debt() {
    let result = compute_ratio(&msr_rule(), &financials(), 2_400.0, PropertyType::HdbFlat)
        .expect("computes");

    assert_close(result.computed_ratio, 0.30, 1e-12);
    assert!(result.within_ceiling);
    assert_close(result.max_payment, 2_400.0, 1e-9);
}

#[test]
fn mortgage_ratio_is_not_applicable_to_private_property() {
    let result = compute_ratio(
        &msr_rule(),
        &financials(),
        2_400.0,
        PropertyType::PrivateCondominium,
    )
    .expect("computes");

    assert!(!result.is_applicable);
}

#[test]
fn zero_income_reports_zero_ratio() {
    let broke = ApplicantFinancials::single(0.0, 300.0);

    for rule in [tdsr_rule(), msr_rule()] {
        let result =
            compute_ratio(&rule, &broke, 1_000.0, PropertyType::HdbFlat).expect("computes");
        assert_eq!(result.computed_ratio, 0.0);
        assert!(result.computed_ratio.is_finite());
        assert!(!result.within_ceiling);
        assert_eq!(result.max_payment, 0.0);
    }
}

#[test]
fn negative_repayment_is_rejected() {
    match compute_ratio(&tdsr_rule(), &financials(), -5.0, PropertyType::HdbFlat) {
        Err(EngineError::InvalidInput { field, .. }) => assert_eq!(field, "proposed_repayment"),
        other => panic!("expected invalid repayment, got {other:?}"),
    }
}

#[test]
fn mortgage_ratio_binds_for_hdb_scenario() {
    let binding = resolve_binding(rule_set().rules(), &financials(), PropertyType::HdbFlat)
        .expect("binding rule");

    assert_eq!(binding.rule, RuleId::new("msr"));
    assert_eq!(binding.kind, RatioKind::MortgageService);
    assert_close(binding.max_payment, 2_400.0, 1e-9);
}

#[test]
fn non_applicable_rules_never_bind() {
    let binding = resolve_binding(
        rule_set().rules(),
        &financials(),
        PropertyType::PrivateCondominium,
    )
    .expect("binding rule");

    assert_eq!(binding.rule, RuleId::new("tdsr"));
    assert_close(binding.max_payment, 3_900.0, 1e-9);
}

#[test]
fn heavy_existing_debt_moves_binding_to_total_debt_ratio() {
    let indebted = ApplicantFinancials::single(8_000.0, 2_000.0);

    let binding = resolve_binding(rule_set().rules(), &indebted, PropertyType::HdbFlat)
        .expect("binding rule");

    assert_eq!(binding.rule, RuleId::new("tdsr"));
    assert_close(binding.max_payment, 2_400.0, 1e-9);
}

#[test]
fn total_debt_headroom_is_floored_at_zero() {
    let swamped = ApplicantFinancials::single(4_000.0, 3_000.0);

    assert_eq!(tdsr_rule().max_payment(&swamped), 0.0);
}

#[test]
fn assessment_flags_exactly_one_binding_rule() {
    let results = assess_ratios(
        rule_set().rules(),
        &financials(),
        2_000.0,
        PropertyType::ExecutiveCondominium,
    )
    .expect("assesses");

    assert_eq!(results.len(), 2);
    let binding: Vec<_> = results.iter().filter(|result| result.is_binding).collect();
    assert_eq!(binding.len(), 1);
    assert_eq!(binding[0].ratio_name, RuleId::new("msr"));
}

#[test]
fn assessment_without_applicable_rules_has_no_binding() {
    let rules = msr_only_rule_set(NoApplicableRulePolicy::Reject);

    let results = assess_ratios(
        rules.rules(),
        &financials(),
        2_000.0,
        PropertyType::LandedHouse,
    )
    .expect("assesses");

    assert!(results
        .iter()
        .all(|result| !result.is_binding && !result.is_applicable));
}

#[test]
fn full_ceiling_allows_all_income() {
    let rule = RatioLimitRule::new("full", RatioKind::MortgageService, 1.0, [])
        .expect("ceiling of one is allowed");

    let result = compute_ratio(&rule, &financials(), 8_000.0, PropertyType::LandedHouse)
        .expect("computes");

    assert_close(result.computed_ratio, 1.0, 1e-12);
    assert!(result.within_ceiling);
}

#[test]
fn rule_validation_rejects_bad_ceilings_and_duplicates() {
    assert!(matches!(
        RatioLimitRule::new("zero", RatioKind::TotalDebtService, 0.0, []),
        Err(RuleError::InvalidCeiling { .. })
    ));
    assert!(matches!(
        RatioLimitRule::new("over", RatioKind::TotalDebtService, 1.01, []),
        Err(RuleError::InvalidCeiling { .. })
    ));
    assert!(matches!(
        RatioLimitRule::new("  ", RatioKind::TotalDebtService, 0.5, []),
        Err(RuleError::BlankName)
    ));
    assert!(matches!(
        RatioRuleSet::new(
            vec![tdsr_rule(), tdsr_rule()],
            NoApplicableRulePolicy::Reject
        ),
        Err(RuleError::Duplicate { .. })
    ));
    assert!(matches!(
        RatioRuleSet::new(
            vec![tdsr_rule()],
            NoApplicableRulePolicy::DefaultCeiling { ceiling: 0.0 }
        ),
        Err(RuleError::InvalidDefaultCeiling { .. })
    ));
}

#[test]
fn overflowing_obligations_are_rejected() {
    let heavy = ApplicantFinancials::single(1.0, 1.7e308);

    assert!(matches!(
        compute_ratio(&tdsr_rule(), &heavy, 1.7e308, PropertyType::LandedHouse),
        Err(EngineError::InvalidInput {
            field: "proposed_repayment",
            ..
        })
    ));
}

#[test]
fn vanishing_income_does_not_produce_infinite_ratio() {
    let tiny_income = ApplicantFinancials::single(1e-310, 0.0);

    assert!(matches!(
        compute_ratio(&msr_rule(), &tiny_income, 1e10, PropertyType::HdbFlat),
        Err(EngineError::InvalidInput {
            field: "gross_monthly_income",
            ..
        })
    ));
}
