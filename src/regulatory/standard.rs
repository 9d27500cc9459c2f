use std::collections::BTreeMap;

use chrono::NaiveDate;

use super::policy::LoanPolicy;
use super::{RegulatoryDocument, BUYER_STAMP_DUTY};
use crate::engine::{
    NoApplicableRulePolicy, PropertyType, RatioKind, RatioLimitRule, RegulatoryBand, RuleId,
};

/// Built-in Singapore residential parameters (buyer's stamp duty from 15 Feb 2023, 2024
/// property tax rates, TDSR 55%, MSR 30% for HDB flats and ECs).
pub fn standard_document() -> RegulatoryDocument {
    let schedules = BTreeMap::from([
        (BUYER_STAMP_DUTY.to_string(), buyer_stamp_duty()),
        (
            "property_tax_owner_occupied".to_string(),
            property_tax_owner_occupied(),
        ),
        (
            "property_tax_non_owner_occupied".to_string(),
            property_tax_non_owner_occupied(),
        ),
    ]);

    RegulatoryDocument {
        effective_from: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap_or_default(),
        schedules,
        schedule_files: BTreeMap::new(),
        ratio_rules: ratio_rules(),
        no_applicable_rule: NoApplicableRulePolicy::Reject,
        loan_policy: loan_policy(),
    }
}

fn buyer_stamp_duty() -> Vec<RegulatoryBand> {
    vec![
        RegulatoryBand::bounded(0.0, 180_000.0, 0.01, "First $180,000"),
        RegulatoryBand::bounded(180_000.0, 360_000.0, 0.02, "Next $180,000"),
        RegulatoryBand::bounded(360_000.0, 1_000_000.0, 0.03, "Next $640,000"),
        RegulatoryBand::bounded(1_000_000.0, 1_500_000.0, 0.04, "Next $500,000"),
        RegulatoryBand::bounded(1_500_000.0, 3_000_000.0, 0.05, "Next $1,500,000"),
        RegulatoryBand::unbounded(3_000_000.0, 0.06, "Remaining amount"),
    ]
}

fn property_tax_owner_occupied() -> Vec<RegulatoryBand> {
    vec![
        RegulatoryBand::bounded(0.0, 8_000.0, 0.0, "First $8,000"),
        RegulatoryBand::bounded(8_000.0, 30_000.0, 0.04, "Next $22,000"),
        RegulatoryBand::bounded(30_000.0, 40_000.0, 0.06, "Next $10,000"),
        RegulatoryBand::bounded(40_000.0, 55_000.0, 0.10, "Next $15,000"),
        RegulatoryBand::bounded(55_000.0, 70_000.0, 0.14, "Next $15,000"),
        RegulatoryBand::bounded(70_000.0, 85_000.0, 0.20, "Next $15,000"),
        RegulatoryBand::bounded(85_000.0, 100_000.0, 0.26, "Next $15,000"),
        RegulatoryBand::unbounded(100_000.0, 0.32, "Above $100,000"),
    ]
}

fn property_tax_non_owner_occupied() -> Vec<RegulatoryBand> {
    vec![
        RegulatoryBand::bounded(0.0, 30_000.0, 0.12, "First $30,000"),
        RegulatoryBand::bounded(30_000.0, 45_000.0, 0.20, "Next $15,000"),
        RegulatoryBand::bounded(45_000.0, 60_000.0, 0.28, "Next $15,000"),
        RegulatoryBand::unbounded(60_000.0, 0.36, "Above $60,000"),
    ]
}

fn ratio_rules() -> Vec<RatioLimitRule> {
    vec![
        RatioLimitRule {
            name: RuleId::new("tdsr"),
            kind: RatioKind::TotalDebtService,
            ceiling: 0.55,
            applicable_property_types: Default::default(),
        },
        RatioLimitRule {
            name: RuleId::new("msr"),
            kind: RatioKind::MortgageService,
            ceiling: 0.30,
            applicable_property_types: [PropertyType::HdbFlat, PropertyType::ExecutiveCondominium]
                .into_iter()
                .collect(),
        },
    ]
}

fn loan_policy() -> LoanPolicy {
    LoanPolicy {
        stress_test_floor_pct: BTreeMap::from([
            (PropertyType::HdbFlat, 3.0),
            (PropertyType::ExecutiveCondominium, 4.0),
            (PropertyType::PrivateCondominium, 4.0),
            (PropertyType::LandedHouse, 4.0),
        ]),
        max_tenure_years: BTreeMap::from([
            (PropertyType::HdbFlat, 25),
            (PropertyType::ExecutiveCondominium, 30),
            (PropertyType::PrivateCondominium, 30),
            (PropertyType::LandedHouse, 30),
        ]),
        max_loan_to_value: 0.75,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::BandSchedule;

    #[test]
    fn stamp_duty_on_one_million() {
        let schedule = BandSchedule::new(buyer_stamp_duty()).expect("valid schedule");

        let assessment = schedule.evaluate(1_000_000.0).expect("evaluates");

        // 1,800 + 3,600 + 19,200
        assert!((assessment.total - 24_600.0).abs() < 1e-6);
    }

    #[test]
    fn owner_occupier_tax_exempts_first_band() {
        let schedule = BandSchedule::new(property_tax_owner_occupied()).expect("valid schedule");

        let assessment = schedule.evaluate(8_000.0).expect("evaluates");
        assert_eq!(assessment.total, 0.0);

        let assessment = schedule.evaluate(36_000.0).expect("evaluates");
        // 22,000 @ 4% + 6,000 @ 6%
        assert!((assessment.total - 1_240.0).abs() < 1e-6);
    }
}
