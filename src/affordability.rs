//! Service facade combining cached regulatory parameters with the pure engine.

use std::sync::Arc;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::engine::domain::ensure_non_negative;
use crate::engine::{
    assess_ratios, monthly_payment, solve_max_loan, ApplicantFinancials, ComputationResult,
    EngineError, LevyAssessment, LoanParameters, MaxLoanResult, Money, PropertyType, Rate, RuleId,
};
use crate::regulatory::{RegulatoryConfigCache, RegulatoryConfigProvider, BUYER_STAMP_DUTY};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaxLoanRequest {
    pub financials: ApplicantFinancials,
    pub property_type: PropertyType,
    /// Lender's quoted annual rate in percent; lifted to the regulatory floor when lower.
    pub quoted_annual_rate_pct: Rate,
    pub tenure_years: u32,
    #[serde(default)]
    pub property_price: Option<Money>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaxLoanQuote {
    pub property_type: PropertyType,
    pub stress_test_annual_rate_pct: Rate,
    pub tenure_years: u32,
    pub max_loan: Money,
    pub max_monthly_payment: Money,
    pub binding_rule: Option<RuleId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub purchase: Option<PurchaseQuote>,
    pub regulations_effective_from: NaiveDate,
}

/// Financing picture for a specific purchase price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PurchaseQuote {
    pub property_price: Money,
    pub loan_to_value_cap: Money,
    pub financed_amount: Money,
    pub down_payment: Money,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stamp_duty: Option<LevyAssessment>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatioRequest {
    pub financials: ApplicantFinancials,
    pub property_type: PropertyType,
    pub proposed_repayment: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatioAssessment {
    pub results: Vec<ComputationResult>,
    pub binding_rule: Option<RuleId>,
    pub regulations_effective_from: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepaymentRequest {
    pub principal: Money,
    pub annual_rate_pct: Rate,
    pub tenure_years: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepaymentQuote {
    pub monthly_payment: Money,
    pub total_paid: Money,
    pub total_interest: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleCatalog {
    pub regulations_effective_from: NaiveDate,
    pub schedules: Vec<String>,
    pub ratio_rules: Vec<RuleId>,
}

#[derive(Debug, thiserror::Error)]
pub enum AffordabilityError {
    #[error(transparent)]
    Engine(#[from] EngineError),
    #[error("unknown levy schedule '{0}'")]
    UnknownSchedule(String),
}

/// Runs engine calls against the current regulatory snapshot.
pub struct AffordabilityService<P> {
    regulations: Arc<RegulatoryConfigCache<P>>,
}

impl<P> AffordabilityService<P>
where
    P: RegulatoryConfigProvider + 'static,
{
    pub fn new(regulations: Arc<RegulatoryConfigCache<P>>) -> Self {
        Self { regulations }
    }

    pub fn regulations(&self) -> &RegulatoryConfigCache<P> {
        &self.regulations
    }

    /// Maximum loan under the stress-tested rate, tenure cap, and ratio ceilings.
    pub fn max_loan(&self, request: &MaxLoanRequest) -> Result<MaxLoanQuote, AffordabilityError> {
        let snapshot = self.regulations.snapshot();
        let config = &snapshot.config;
        let policy = config.loan_policy();

        ensure_non_negative("quoted_annual_rate_pct", request.quoted_annual_rate_pct)?;
        policy.check_tenure(request.property_type, request.tenure_years)?;

        let params = LoanParameters {
            stress_test_annual_rate_pct: policy
                .effective_rate(request.property_type, request.quoted_annual_rate_pct),
            tenure_years: request.tenure_years,
            property_type: request.property_type,
        };
        let MaxLoanResult {
            max_loan,
            max_monthly_payment,
            binding_rule,
        } = solve_max_loan(&request.financials, &params, config.ratio_rules())?;

        let purchase = match request.property_price {
            Some(price) => {
                ensure_non_negative("property_price", price)?;
                let loan_to_value_cap = policy.loan_to_value_cap(price);
                let financed_amount = max_loan.min(loan_to_value_cap);
                let stamp_duty = config
                    .schedule(BUYER_STAMP_DUTY)
                    .map(|schedule| schedule.evaluate(price))
                    .transpose()?;

                Some(PurchaseQuote {
                    property_price: price,
                    loan_to_value_cap,
                    financed_amount,
                    down_payment: price - financed_amount,
                    stamp_duty,
                })
            }
            None => None,
        };

        debug!(
            property_type = request.property_type.label(),
            rate = params.stress_test_annual_rate_pct,
            max_loan,
            "max loan quoted"
        );

        Ok(MaxLoanQuote {
            property_type: request.property_type,
            stress_test_annual_rate_pct: params.stress_test_annual_rate_pct,
            tenure_years: request.tenure_years,
            max_loan,
            max_monthly_payment,
            binding_rule,
            purchase,
            regulations_effective_from: config.effective_from(),
        })
    }

    pub fn ratios(&self, request: &RatioRequest) -> Result<RatioAssessment, AffordabilityError> {
        let snapshot = self.regulations.snapshot();
        let results = assess_ratios(
            snapshot.config.ratio_rules().rules(),
            &request.financials,
            request.proposed_repayment,
            request.property_type,
        )?;
        let binding_rule = results
            .iter()
            .find(|result| result.is_binding)
            .map(|result| result.ratio_name.clone());

        Ok(RatioAssessment {
            results,
            binding_rule,
            regulations_effective_from: snapshot.config.effective_from(),
        })
    }

    pub fn levy(
        &self,
        schedule: &str,
        base_value: Money,
    ) -> Result<LevyAssessment, AffordabilityError> {
        let snapshot = self.regulations.snapshot();
        let bands = snapshot
            .config
            .schedule(schedule)
            .ok_or_else(|| AffordabilityError::UnknownSchedule(schedule.to_string()))?;

        Ok(bands.evaluate(base_value)?)
    }

    pub fn repayment(
        &self,
        request: &RepaymentRequest,
    ) -> Result<RepaymentQuote, AffordabilityError> {
        let payment = monthly_payment(
            request.principal,
            request.annual_rate_pct,
            request.tenure_years,
        )?;
        let total_paid = payment * f64::from(request.tenure_years) * 12.0;

        Ok(RepaymentQuote {
            monthly_payment: payment,
            total_paid,
            total_interest: (total_paid - request.principal).max(0.0),
        })
    }

    pub fn catalog(&self) -> ScheduleCatalog {
        let snapshot = self.regulations.snapshot();
        ScheduleCatalog {
            regulations_effective_from: snapshot.config.effective_from(),
            schedules: snapshot
                .config
                .schedule_names()
                .map(str::to_string)
                .collect(),
            ratio_rules: snapshot
                .config
                .ratio_rules()
                .rules()
                .iter()
                .map(|rule| rule.name.clone())
                .collect(),
        }
    }
}
