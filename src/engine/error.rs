use super::domain::PropertyType;

/// Failures raised synchronously by engine calls.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EngineError {
    #[error("invalid {field}: {reason}")]
    InvalidInput { field: &'static str, reason: String },
    #[error("no ratio limit rule applies to {}", .property_type.label())]
    NoApplicableRule { property_type: PropertyType },
}

impl EngineError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            field,
            reason: reason.into(),
        }
    }
}

/// Malformed band schedule detected while building a [`super::BandSchedule`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ScheduleError {
    #[error("schedule has no bands")]
    Empty,
    #[error("first band '{label}' must start at 0 (found {lower_bound})")]
    FirstBandNotAtZero { label: String, lower_bound: f64 },
    #[error("band '{label}' has a non-finite or negative bound")]
    InvalidBound { label: String },
    #[error("band '{label}' must have an upper bound above its lower bound")]
    EmptyWidth { label: String },
    #[error("band '{label}' rate {rate} must be within [0, 1]")]
    InvalidRate { label: String, rate: f64 },
    #[error("gap between band '{previous}' and '{next}' ({upper} -> {lower})")]
    Gap {
        previous: String,
        next: String,
        upper: f64,
        lower: f64,
    },
    #[error("band '{next}' overlaps band '{previous}' ({lower} < {upper})")]
    Overlap {
        previous: String,
        next: String,
        upper: f64,
        lower: f64,
    },
    #[error("unbounded band '{label}' must be the last band")]
    UnboundedNotLast { label: String },
    #[error("last band '{label}' must be unbounded")]
    MissingUnboundedTop { label: String },
}

/// Malformed ratio limit rule definitions.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RuleError {
    #[error("rule '{name}' ceiling {ceiling} must be within (0, 1]")]
    InvalidCeiling { name: String, ceiling: f64 },
    #[error("rule name must not be blank")]
    BlankName,
    #[error("rule '{name}' is defined more than once")]
    Duplicate { name: String },
    #[error("default ceiling {ceiling} must be within (0, 1]")]
    InvalidDefaultCeiling { ceiling: f64 },
}
