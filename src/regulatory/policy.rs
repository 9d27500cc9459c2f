use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::engine::{EngineError, Money, PropertyType, Rate};

/// Lending rules applied around the ratio solver: stress-test floors, tenure caps, and LTV.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanPolicy {
    /// Minimum annual rate (percent) used for affordability testing, per property type.
    #[serde(default)]
    pub stress_test_floor_pct: BTreeMap<PropertyType, Rate>,
    #[serde(default)]
    pub max_tenure_years: BTreeMap<PropertyType, u32>,
    pub max_loan_to_value: Rate,
}

impl LoanPolicy {
    pub fn validate(&self) -> Result<(), LoanPolicyError> {
        if !(self.max_loan_to_value > 0.0 && self.max_loan_to_value <= 1.0) {
            return Err(LoanPolicyError::LoanToValue {
                value: self.max_loan_to_value,
            });
        }

        for (property_type, floor) in &self.stress_test_floor_pct {
            if !floor.is_finite() || *floor < 0.0 {
                return Err(LoanPolicyError::StressFloor {
                    property_type: *property_type,
                    value: *floor,
                });
            }
        }

        if let Some((property_type, _)) = self
            .max_tenure_years
            .iter()
            .find(|(_, years)| **years == 0)
        {
            return Err(LoanPolicyError::TenureCap {
                property_type: *property_type,
            });
        }

        Ok(())
    }

    /// Stress-tested rate: the quoted rate, lifted to the floor for `property_type`.
    pub fn effective_rate(&self, property_type: PropertyType, quoted_pct: Rate) -> Rate {
        self.stress_test_floor_pct
            .get(&property_type)
            .map_or(quoted_pct, |floor| quoted_pct.max(*floor))
    }

    pub fn check_tenure(
        &self,
        property_type: PropertyType,
        tenure_years: u32,
    ) -> Result<(), EngineError> {
        match self.max_tenure_years.get(&property_type) {
            Some(cap) if tenure_years > *cap => Err(EngineError::InvalidInput {
                field: "tenure_years",
                reason: format!(
                    "{} loans are capped at {} years (requested {})",
                    property_type.label(),
                    cap,
                    tenure_years
                ),
            }),
            _ => Ok(()),
        }
    }

    pub fn loan_to_value_cap(&self, property_price: Money) -> Money {
        property_price * self.max_loan_to_value
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LoanPolicyError {
    #[error("max_loan_to_value {value} must be within (0, 1]")]
    LoanToValue { value: f64 },
    #[error("stress test floor {value} for {} must be a non-negative percentage", .property_type.label())]
    StressFloor {
        property_type: PropertyType,
        value: f64,
    },
    #[error("tenure cap for {} must be positive", .property_type.label())]
    TenureCap { property_type: PropertyType },
}
