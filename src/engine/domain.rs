use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use super::error::EngineError;

/// Currency amount in the schedule's own unit. Formatting belongs to the caller.
pub type Money = f64;

/// Fractional rate, e.g. `0.55` for a 55% ceiling.
pub type Rate = f64;

/// Residential property categories recognised by the regulatory rules.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub enum PropertyType {
    HdbFlat,
    ExecutiveCondominium,
    PrivateCondominium,
    LandedHouse,
}

impl PropertyType {
    pub const fn ordered() -> [Self; 4] {
        [
            Self::HdbFlat,
            Self::ExecutiveCondominium,
            Self::PrivateCondominium,
            Self::LandedHouse,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::HdbFlat => "HDB Flat",
            Self::ExecutiveCondominium => "Executive Condominium",
            Self::PrivateCondominium => "Private Condominium",
            Self::LandedHouse => "Landed House",
        }
    }
}

/// Identifier of a ratio limit rule, e.g. `tdsr` or `msr`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RuleId(pub String);

impl RuleId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RuleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Monthly income and obligations for a single (or pre-summed joint) applicant.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ApplicantFinancials {
    pub gross_monthly_income: Money,
    pub existing_monthly_debt_obligations: Money,
    #[serde(default)]
    pub is_joint_application: bool,
}

impl ApplicantFinancials {
    pub fn single(gross_monthly_income: Money, existing_monthly_debt_obligations: Money) -> Self {
        Self {
            gross_monthly_income,
            existing_monthly_debt_obligations,
            is_joint_application: false,
        }
    }

    /// Pre-sums two applicants into the single-applicant shape the engine expects.
    pub fn combine(first: &Self, second: &Self) -> Self {
        Self {
            gross_monthly_income: first.gross_monthly_income + second.gross_monthly_income,
            existing_monthly_debt_obligations: first.existing_monthly_debt_obligations
                + second.existing_monthly_debt_obligations,
            is_joint_application: true,
        }
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        ensure_non_negative("gross_monthly_income", self.gross_monthly_income)?;
        ensure_non_negative(
            "existing_monthly_debt_obligations",
            self.existing_monthly_debt_obligations,
        )
    }
}

/// Loan terms used for affordability testing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LoanParameters {
    pub stress_test_annual_rate_pct: Rate,
    pub tenure_years: u32,
    pub property_type: PropertyType,
}

impl LoanParameters {
    pub fn validate(&self) -> Result<(), EngineError> {
        ensure_non_negative(
            "stress_test_annual_rate_pct",
            self.stress_test_annual_rate_pct,
        )?;
        tenure_months(self.tenure_years)?;
        Ok(())
    }

    pub fn tenure_months(&self) -> Result<u32, EngineError> {
        tenure_months(self.tenure_years)
    }
}

/// Converts a tenure in years to months, rejecting zero and tenures whose month count overflows.
pub(crate) fn tenure_months(tenure_years: u32) -> Result<u32, EngineError> {
    if tenure_years == 0 {
        return Err(EngineError::invalid(
            "tenure_years",
            "must be a positive number of years",
        ));
    }
    tenure_years.checked_mul(12).ok_or_else(|| {
        EngineError::invalid(
            "tenure_years",
            format!("{tenure_years} years is too long to express in months"),
        )
    })
}

pub(crate) fn ensure_non_negative(field: &'static str, value: f64) -> Result<(), EngineError> {
    if !value.is_finite() {
        return Err(EngineError::invalid(field, "must be a finite number"));
    }
    if value < 0.0 {
        return Err(EngineError::invalid(
            field,
            format!("must not be negative (found {value})"),
        ));
    }
    Ok(())
}
