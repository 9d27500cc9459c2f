//! Pure regulatory calculations: progressive levy bands, debt-servicing ratios, and maximum loan
//! solving.
//!
//! Nothing in this module performs I/O or holds state between calls. Configuration arrives as
//! validated values ([`BandSchedule`], [`RatioRuleSet`]) built once by the caller.

pub mod brackets;
pub mod domain;
pub mod error;
pub mod ratios;
pub mod solver;

#[cfg(test)]
mod tests;

pub use brackets::{BandCharge, BandSchedule, LevyAssessment, RegulatoryBand};
pub use domain::{ApplicantFinancials, LoanParameters, Money, PropertyType, Rate, RuleId};
pub use error::{EngineError, RuleError, ScheduleError};
pub use ratios::{
    assess_ratios, compute_ratio, resolve_binding, BindingConstraint, ComputationResult,
    NoApplicableRulePolicy, RatioKind, RatioLimitRule, RatioRuleSet,
};
pub use solver::{monthly_payment, solve_max_loan, MaxLoanResult};
