use crate::domain::models::{PmSummary, ServiceFrequency};
use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PmSummaryPatch {
    pub service_frequency: Option<ServiceFrequency>,
    pub compliance_percentage: Option<f64>,
    /// `None` leaves the date alone, `Some(None)` clears it.
    #[serde(default, deserialize_with = "clearable")]
    pub next_service_due: Option<Option<NaiveDate>>,
}

/// Maps an explicit `null` to `Some(None)`. A missing field never reaches
/// this and falls back to `None` through `#[serde(default)]`.
fn clearable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum SummaryError {
    #[error("compliance percentage must be between 0 and 100, got {0}")]
    ComplianceOutOfRange(f64),
    #[error("nothing to update")]
    Empty,
}

pub fn validate_compliance(value: f64) -> Result<f64, SummaryError> {
    if value.is_finite() && (0.0..=100.0).contains(&value) {
        Ok(value)
    } else {
        Err(SummaryError::ComplianceOutOfRange(value))
    }
}

impl PmSummaryPatch {
    pub fn validate(&self) -> Result<(), SummaryError> {
        if self.service_frequency.is_none()
            && self.compliance_percentage.is_none()
            && self.next_service_due.is_none()
        {
            return Err(SummaryError::Empty);
        }
        if let Some(value) = self.compliance_percentage {
            validate_compliance(value)?;
        }
        Ok(())
    }

    /// Applies a validated patch. An invalid patch leaves `summary` untouched.
    pub fn apply_to(&self, summary: &mut PmSummary) -> Result<(), SummaryError> {
        self.validate()?;
        if let Some(freq) = self.service_frequency {
            summary.service_frequency = freq;
        }
        if let Some(value) = self.compliance_percentage {
            summary.compliance_percentage = value;
        }
        if let Some(due) = self.next_service_due {
            summary.next_service_due = due;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ComplianceBand {
    Good,
    Warning,
    Poor,
}

pub fn compliance_band(value: f64) -> ComplianceBand {
    if value >= 90.0 {
        ComplianceBand::Good
    } else if value >= 70.0 {
        ComplianceBand::Warning
    } else {
        ComplianceBand::Poor
    }
}
