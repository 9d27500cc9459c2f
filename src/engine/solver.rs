use serde::{Deserialize, Serialize};
use tracing::debug;

use super::domain::{
    ensure_non_negative, tenure_months, ApplicantFinancials, LoanParameters, Money, Rate, RuleId,
};
use super::error::EngineError;
use super::ratios::{resolve_binding, NoApplicableRulePolicy, RatioRuleSet};

/// Largest principal serviceable under the binding ratio ceiling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaxLoanResult {
    pub max_loan: Money,
    pub max_monthly_payment: Money,
    /// `None` when the payment came from the rule set's default ceiling.
    pub binding_rule: Option<RuleId>,
}

/// Solves for the maximum loan principal.
///
/// The monthly payment is capped by the binding applicable rule (or the rule set's fallback
/// policy when none applies), then converted to principal by inverting the level-payment
/// amortization formula at the stress-tested rate.
pub fn solve_max_loan(
    financials: &ApplicantFinancials,
    params: &LoanParameters,
    rules: &RatioRuleSet,
) -> Result<MaxLoanResult, EngineError> {
    financials.validate()?;
    params.validate()?;
    let months = params.tenure_months()?;

    let (max_monthly_payment, binding_rule) =
        match resolve_binding(rules.rules(), financials, params.property_type) {
            Some(binding) => (binding.max_payment, Some(binding.rule)),
            None => match rules.fallback() {
                NoApplicableRulePolicy::Reject => {
                    return Err(EngineError::NoApplicableRule {
                        property_type: params.property_type,
                    })
                }
                NoApplicableRulePolicy::DefaultCeiling { ceiling } => {
                    let payment = financials.gross_monthly_income * ceiling
                        - financials.existing_monthly_debt_obligations;
                    (payment.max(0.0), None)
                }
            },
        };

    if max_monthly_payment <= 0.0 {
        debug!(
            binding_rule = binding_rule.as_ref().map(RuleId::as_str),
            "no payment headroom, maximum loan is zero"
        );
        return Ok(MaxLoanResult {
            max_loan: 0.0,
            max_monthly_payment: 0.0,
            binding_rule,
        });
    }

    let max_loan = present_value(max_monthly_payment, params.stress_test_annual_rate_pct, months);
    if !max_loan.is_finite() {
        return Err(EngineError::invalid(
            "gross_monthly_income",
            "too large to produce a finite loan amount",
        ));
    }

    Ok(MaxLoanResult {
        max_loan,
        max_monthly_payment,
        binding_rule,
    })
}

/// Level monthly payment that retires `principal` over `tenure_years`.
pub fn monthly_payment(
    principal: Money,
    annual_rate_pct: Rate,
    tenure_years: u32,
) -> Result<Money, EngineError> {
    ensure_non_negative("principal", principal)?;
    ensure_non_negative("annual_rate_pct", annual_rate_pct)?;
    let months = f64::from(tenure_months(tenure_years)?);

    let rate = monthly_rate(annual_rate_pct);
    let payment = match discount_span(rate, months) {
        Some(span) => principal * rate / span,
        None => principal / months,
    };

    if !payment.is_finite() {
        return Err(EngineError::invalid(
            "principal",
            "too large to produce a finite monthly payment",
        ));
    }
    Ok(payment)
}

/// Present value of `tenure_months` level payments. Callers validate inputs.
fn present_value(payment: Money, annual_rate_pct: Rate, tenure_months: u32) -> Money {
    let months = f64::from(tenure_months);
    let rate = monthly_rate(annual_rate_pct);
    match discount_span(rate, months) {
        Some(span) => payment * span / rate,
        None => payment * months,
    }
}

/// `1 − (1 + rate)^−months`, evaluated through `ln_1p`/`exp_m1` so small rates keep their
/// precision. `None` when the rate is too small for the annuity form to be meaningful, in which
/// case the straight-line amount is exact to within rounding.
fn discount_span(rate: Rate, months: f64) -> Option<f64> {
    if rate <= 0.0 {
        return None;
    }
    let span = -(-months * rate.ln_1p()).exp_m1();
    (span.is_normal() && span > 0.0).then_some(span)
}

fn monthly_rate(annual_rate_pct: Rate) -> Rate {
    annual_rate_pct / 100.0 / 12.0
}
