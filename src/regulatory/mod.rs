//! Regulatory parameters consumed by the engine: levy schedules, ratio ceilings, and loan policy.
//!
//! A [`RegulatoryDocument`] is the serialized form delivered by a provider. It is validated once
//! into a [`RegulatoryConfig`], after which every schedule and rule is known to be well formed.

pub mod cache;
pub mod loader;
pub mod policy;
pub mod provider;
pub mod standard;

use std::collections::BTreeMap;
use std::path::PathBuf;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::engine::{
    BandSchedule, NoApplicableRulePolicy, RatioLimitRule, RatioRuleSet, RegulatoryBand, RuleError,
    ScheduleError,
};

pub use cache::{RegulatoryConfigCache, RegulatorySnapshot, DEFAULT_RETRY_BACKOFF_MINUTES};
pub use loader::{load_config_from_path, read_bands_csv};
pub use policy::{LoanPolicy, LoanPolicyError};
pub use provider::{
    ConfiguredProvider, FileConfigProvider, ProviderError, RegulatoryConfigProvider,
    StandardConfigProvider,
};

/// Schedule name used for the buyer's stamp duty on purchase quotes.
pub const BUYER_STAMP_DUTY: &str = "buyer_stamp_duty";

/// Serialized regulatory parameters as published by a configuration provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegulatoryDocument {
    pub effective_from: NaiveDate,
    #[serde(default)]
    pub schedules: BTreeMap<String, Vec<RegulatoryBand>>,
    /// CSV band files keyed by schedule name, resolved relative to the document.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub schedule_files: BTreeMap<String, PathBuf>,
    pub ratio_rules: Vec<RatioLimitRule>,
    #[serde(default)]
    pub no_applicable_rule: NoApplicableRulePolicy,
    pub loan_policy: LoanPolicy,
}

/// Validated regulatory parameters. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegulatoryConfig {
    effective_from: NaiveDate,
    schedules: BTreeMap<String, BandSchedule>,
    ratio_rules: RatioRuleSet,
    loan_policy: LoanPolicy,
}

impl RegulatoryConfig {
    /// Validates an inline document. Any `schedule_files` must already be merged by the loader.
    pub fn from_document(document: RegulatoryDocument) -> Result<Self, RegulatoryConfigError> {
        if let Some(name) = document.schedule_files.keys().next() {
            return Err(RegulatoryConfigError::UnresolvedScheduleFile { name: name.clone() });
        }

        let schedules = document
            .schedules
            .into_iter()
            .map(|(name, bands)| match BandSchedule::new(bands) {
                Ok(schedule) => Ok((name, schedule)),
                Err(source) => Err(RegulatoryConfigError::Schedule { name, source }),
            })
            .collect::<Result<BTreeMap<_, _>, _>>()?;

        let ratio_rules = RatioRuleSet::new(document.ratio_rules, document.no_applicable_rule)?;
        document.loan_policy.validate()?;

        Ok(Self {
            effective_from: document.effective_from,
            schedules,
            ratio_rules,
            loan_policy: document.loan_policy,
        })
    }

    pub fn standard() -> Result<Self, RegulatoryConfigError> {
        Self::from_document(standard::standard_document())
    }

    pub fn effective_from(&self) -> NaiveDate {
        self.effective_from
    }

    pub fn schedule(&self, name: &str) -> Option<&BandSchedule> {
        self.schedules.get(name)
    }

    pub fn schedule_names(&self) -> impl Iterator<Item = &str> {
        self.schedules.keys().map(String::as_str)
    }

    pub fn ratio_rules(&self) -> &RatioRuleSet {
        &self.ratio_rules
    }

    pub fn loan_policy(&self) -> &LoanPolicy {
        &self.loan_policy
    }
}

/// Configuration-load failures. These are fatal for the document being loaded.
#[derive(Debug, thiserror::Error)]
pub enum RegulatoryConfigError {
    #[error("schedule '{name}' is malformed: {source}")]
    Schedule {
        name: String,
        #[source]
        source: ScheduleError,
    },
    #[error("schedule '{name}' is defined both inline and as a CSV file")]
    DuplicateSchedule { name: String },
    #[error("schedule file for '{name}' was not resolved before validation")]
    UnresolvedScheduleFile { name: String },
    #[error("invalid ratio rules: {0}")]
    Rules(#[from] RuleError),
    #[error("invalid loan policy: {0}")]
    LoanPolicy(#[from] LoanPolicyError),
    #[error("failed to read regulatory file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid regulatory document: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid band CSV for '{name}': {source}")]
    Csv {
        name: String,
        #[source]
        source: csv::Error,
    },
}
