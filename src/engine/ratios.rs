use std::collections::{BTreeSet, HashSet};

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::domain::{ensure_non_negative, ApplicantFinancials, Money, PropertyType, Rate, RuleId};
use super::error::{EngineError, RuleError};

/// Which obligations a ratio counts against income.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RatioKind {
    /// Existing debt plus the prospective mortgage.
    TotalDebtService,
    /// The prospective mortgage alone.
    MortgageService,
}

impl RatioKind {
    pub const fn label(self) -> &'static str {
        match self {
            Self::TotalDebtService => "Total Debt Servicing Ratio",
            Self::MortgageService => "Mortgage Servicing Ratio",
        }
    }
}

/// Regulatory ceiling on a debt-servicing ratio.
///
/// An empty `applicable_property_types` set means the rule applies to every property type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatioLimitRule {
    pub name: RuleId,
    pub kind: RatioKind,
    pub ceiling: Rate,
    #[serde(default)]
    pub applicable_property_types: BTreeSet<PropertyType>,
}

impl RatioLimitRule {
    pub fn new(
        name: &str,
        kind: RatioKind,
        ceiling: Rate,
        applicable_property_types: impl IntoIterator<Item = PropertyType>,
    ) -> Result<Self, RuleError> {
        let rule = Self {
            name: RuleId::new(name),
            kind,
            ceiling,
            applicable_property_types: applicable_property_types.into_iter().collect(),
        };
        rule.validate()?;
        Ok(rule)
    }

    pub fn validate(&self) -> Result<(), RuleError> {
        if self.name.as_str().trim().is_empty() {
            return Err(RuleError::BlankName);
        }
        if !valid_ceiling(self.ceiling) {
            return Err(RuleError::InvalidCeiling {
                name: self.name.0.clone(),
                ceiling: self.ceiling,
            });
        }
        Ok(())
    }

    pub fn applies_to(&self, property_type: PropertyType) -> bool {
        self.applicable_property_types.is_empty()
            || self.applicable_property_types.contains(&property_type)
    }

    /// Largest monthly mortgage payment this rule allows, never negative.
    pub fn max_payment(&self, financials: &ApplicantFinancials) -> Money {
        let allowance = financials.gross_monthly_income * self.ceiling;
        match self.kind {
            RatioKind::TotalDebtService => {
                (allowance - financials.existing_monthly_debt_obligations).max(0.0)
            }
            RatioKind::MortgageService => allowance,
        }
    }

    fn obligations(&self, financials: &ApplicantFinancials, proposed_repayment: Money) -> Money {
        match self.kind {
            RatioKind::TotalDebtService => {
                financials.existing_monthly_debt_obligations + proposed_repayment
            }
            RatioKind::MortgageService => proposed_repayment,
        }
    }
}

/// What to do when no ratio rule covers the requested property type.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "policy", rename_all = "snake_case")]
pub enum NoApplicableRulePolicy {
    #[default]
    Reject,
    /// Treat the payment as limited by `income × ceiling − existing debt`.
    DefaultCeiling { ceiling: Rate },
}

/// Validated collection of ratio rules plus the policy for uncovered property types.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RatioRuleSet {
    rules: Vec<RatioLimitRule>,
    fallback: NoApplicableRulePolicy,
}

impl RatioRuleSet {
    pub fn new(
        rules: Vec<RatioLimitRule>,
        fallback: NoApplicableRulePolicy,
    ) -> Result<Self, RuleError> {
        let mut seen = HashSet::new();
        for rule in &rules {
            rule.validate()?;
            if !seen.insert(rule.name.clone()) {
                return Err(RuleError::Duplicate {
                    name: rule.name.0.clone(),
                });
            }
        }

        if let NoApplicableRulePolicy::DefaultCeiling { ceiling } = fallback {
            if !valid_ceiling(ceiling) {
                return Err(RuleError::InvalidDefaultCeiling { ceiling });
            }
        }

        Ok(Self { rules, fallback })
    }

    pub fn rules(&self) -> &[RatioLimitRule] {
        &self.rules
    }

    pub fn fallback(&self) -> NoApplicableRulePolicy {
        self.fallback
    }

    pub fn applicable(&self, property_type: PropertyType) -> impl Iterator<Item = &RatioLimitRule> {
        self.rules
            .iter()
            .filter(move |rule| rule.applies_to(property_type))
    }
}

/// Outcome of measuring one rule against a proposed repayment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComputationResult {
    pub ratio_name: RuleId,
    pub kind: RatioKind,
    pub computed_ratio: Rate,
    pub ceiling: Rate,
    pub is_binding: bool,
    pub is_applicable: bool,
    pub within_ceiling: bool,
    pub max_payment: Money,
}

/// The applicable rule leaving the least room for a mortgage payment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BindingConstraint {
    pub rule: RuleId,
    pub kind: RatioKind,
    pub ceiling: Rate,
    pub max_payment: Money,
}

/// Measures a single rule. `is_binding` is always `false` here; see [`assess_ratios`].
pub fn compute_ratio(
    rule: &RatioLimitRule,
    financials: &ApplicantFinancials,
    proposed_repayment: Money,
    property_type: PropertyType,
) -> Result<ComputationResult, EngineError> {
    financials.validate()?;
    ensure_non_negative("proposed_repayment", proposed_repayment)?;

    let income = financials.gross_monthly_income;
    let obligations = rule.obligations(financials, proposed_repayment);
    if !obligations.is_finite() {
        return Err(EngineError::invalid(
            "proposed_repayment",
            "combined monthly obligations must be a finite amount",
        ));
    }

    // Zero income reports a zero ratio; the zero max payment carries the constraint.
    let (computed_ratio, within_ceiling) = if income > 0.0 {
        let ratio = obligations / income;
        if !ratio.is_finite() {
            return Err(EngineError::invalid(
                "gross_monthly_income",
                "too small relative to obligations to form a finite ratio",
            ));
        }
        (ratio, ratio <= rule.ceiling)
    } else {
        (0.0, obligations <= 0.0)
    };

    Ok(ComputationResult {
        ratio_name: rule.name.clone(),
        kind: rule.kind,
        computed_ratio,
        ceiling: rule.ceiling,
        is_binding: false,
        is_applicable: rule.applies_to(property_type),
        within_ceiling,
        max_payment: rule.max_payment(financials),
    })
}

/// Measures every rule and flags the binding one among those that apply.
pub fn assess_ratios(
    rules: &[RatioLimitRule],
    financials: &ApplicantFinancials,
    proposed_repayment: Money,
    property_type: PropertyType,
) -> Result<Vec<ComputationResult>, EngineError> {
    let mut results = rules
        .iter()
        .map(|rule| compute_ratio(rule, financials, proposed_repayment, property_type))
        .collect::<Result<Vec<_>, _>>()?;

    if let Some(binding) = resolve_binding(rules, financials, property_type) {
        if let Some(result) = results
            .iter_mut()
            .find(|result| result.ratio_name == binding.rule)
        {
            result.is_binding = true;
        }
    }

    Ok(results)
}

/// Picks the applicable rule with the smallest maximum payment; earlier rules win ties.
///
/// Returns `None` when no rule applies to `property_type`.
pub fn resolve_binding(
    rules: &[RatioLimitRule],
    financials: &ApplicantFinancials,
    property_type: PropertyType,
) -> Option<BindingConstraint> {
    let binding = rules
        .iter()
        .filter(|rule| rule.applies_to(property_type))
        .map(|rule| BindingConstraint {
            rule: rule.name.clone(),
            kind: rule.kind,
            ceiling: rule.ceiling,
            max_payment: rule.max_payment(financials),
        })
        .min_by(|left, right| left.max_payment.total_cmp(&right.max_payment));

    match &binding {
        Some(constraint) => debug!(
            rule = %constraint.rule,
            max_payment = constraint.max_payment,
            property_type = property_type.label(),
            "resolved binding ratio"
        ),
        None => debug!(
            property_type = property_type.label(),
            "no ratio rule applies"
        ),
    }

    binding
}

fn valid_ceiling(ceiling: Rate) -> bool {
    ceiling > 0.0 && ceiling <= 1.0
}
