use serde::{Deserialize, Serialize};

use super::domain::{ensure_non_negative, Money, Rate};
use super::error::{EngineError, ScheduleError};

/// One slice of a progressive schedule. `upper_bound: None` marks the open-ended top band.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegulatoryBand {
    pub lower_bound: Money,
    #[serde(default)]
    pub upper_bound: Option<Money>,
    pub rate: Rate,
    pub label: String,
}

impl RegulatoryBand {
    pub fn bounded(lower_bound: Money, upper_bound: Money, rate: Rate, label: &str) -> Self {
        Self {
            lower_bound,
            upper_bound: Some(upper_bound),
            rate,
            label: label.to_string(),
        }
    }

    pub fn unbounded(lower_bound: Money, rate: Rate, label: &str) -> Self {
        Self {
            lower_bound,
            upper_bound: None,
            rate,
            label: label.to_string(),
        }
    }

    pub fn is_unbounded(&self) -> bool {
        self.upper_bound.is_none()
    }

    fn width(&self) -> Option<Money> {
        self.upper_bound.map(|upper| upper - self.lower_bound)
    }
}

/// Charge levied by a single band during an evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BandCharge {
    pub label: String,
    pub rate: Rate,
    pub portion: Money,
    pub amount: Money,
}

/// Result of running a base value through a schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevyAssessment {
    pub base_value: Money,
    pub total: Money,
    pub breakdown: Vec<BandCharge>,
}

impl LevyAssessment {
    /// Average rate across the whole base value; 0 when nothing was assessed.
    pub fn effective_rate(&self) -> Rate {
        if self.base_value > 0.0 {
            self.total / self.base_value
        } else {
            0.0
        }
    }
}

/// Validated progressive schedule: starts at zero, contiguous, ascending, open-ended at the top.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct BandSchedule {
    bands: Vec<RegulatoryBand>,
}

impl BandSchedule {
    pub fn new(bands: Vec<RegulatoryBand>) -> Result<Self, ScheduleError> {
        let first = bands.first().ok_or(ScheduleError::Empty)?;
        if first.lower_bound != 0.0 {
            return Err(ScheduleError::FirstBandNotAtZero {
                label: first.label.clone(),
                lower_bound: first.lower_bound,
            });
        }

        let last_index = bands.len() - 1;
        for (index, band) in bands.iter().enumerate() {
            validate_band(band)?;

            if band.is_unbounded() && index != last_index {
                return Err(ScheduleError::UnboundedNotLast {
                    label: band.label.clone(),
                });
            }

            if let Some(previous) = index.checked_sub(1).map(|prev| &bands[prev]) {
                // Earlier bands are bounded, otherwise UnboundedNotLast fired above.
                let upper = previous.upper_bound.unwrap_or(f64::INFINITY);
                if band.lower_bound > upper {
                    return Err(ScheduleError::Gap {
                        previous: previous.label.clone(),
                        next: band.label.clone(),
                        upper,
                        lower: band.lower_bound,
                    });
                }
                if band.lower_bound < upper {
                    return Err(ScheduleError::Overlap {
                        previous: previous.label.clone(),
                        next: band.label.clone(),
                        upper,
                        lower: band.lower_bound,
                    });
                }
            }
        }

        let last = &bands[last_index];
        if !last.is_unbounded() {
            return Err(ScheduleError::MissingUnboundedTop {
                label: last.label.clone(),
            });
        }

        Ok(Self { bands })
    }

    pub fn bands(&self) -> &[RegulatoryBand] {
        &self.bands
    }

    /// Applies each band's rate to the slice of `base_value` falling inside it.
    ///
    /// Every band appears in the breakdown, in schedule order; bands above the base value carry
    /// a zero portion and amount.
    pub fn evaluate(&self, base_value: Money) -> Result<LevyAssessment, EngineError> {
        ensure_non_negative("base_value", base_value)?;

        let mut remaining = base_value;
        let mut total = 0.0;
        let mut breakdown = Vec::with_capacity(self.bands.len());

        for band in &self.bands {
            let portion = if remaining > 0.0 {
                band.width().map_or(remaining, |width| remaining.min(width))
            } else {
                0.0
            };
            let amount = portion * band.rate;

            total += amount;
            remaining -= portion;
            breakdown.push(BandCharge {
                label: band.label.clone(),
                rate: band.rate,
                portion,
                amount,
            });
        }

        Ok(LevyAssessment {
            base_value,
            total,
            breakdown,
        })
    }
}

impl TryFrom<Vec<RegulatoryBand>> for BandSchedule {
    type Error = ScheduleError;

    fn try_from(bands: Vec<RegulatoryBand>) -> Result<Self, Self::Error> {
        Self::new(bands)
    }
}

fn validate_band(band: &RegulatoryBand) -> Result<(), ScheduleError> {
    let bounds_valid = band.lower_bound.is_finite()
        && band.lower_bound >= 0.0
        && band.upper_bound.map_or(true, |upper| upper.is_finite());
    if !bounds_valid {
        return Err(ScheduleError::InvalidBound {
            label: band.label.clone(),
        });
    }

    if let Some(width) = band.width() {
        if width <= 0.0 {
            return Err(ScheduleError::EmptyWidth {
                label: band.label.clone(),
            });
        }
    }

    if !(0.0..=1.0).contains(&band.rate) {
        return Err(ScheduleError::InvalidRate {
            label: band.label.clone(),
            rate: band.rate,
        });
    }

    Ok(())
}
