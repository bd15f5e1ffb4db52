use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::hours::{MAX_DAILY_HOURS, MAX_WEEKLY_HOURS};

/// Candidate entry submitted for rule evaluation. The date stays a string so a
/// malformed one is reported as a rule violation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateTimeEntryInput {
    pub user_id: Option<Uuid>,
    pub date: String,
    pub actual_hours: BigDecimal,
    pub billable_hours: BigDecimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationRules {
    pub max_daily_hours: i64,
    pub max_weekly_hours: i64,
    pub billable_hours_valid: bool,
    pub no_overlap: bool,
}

impl Default for ValidationRules {
    fn default() -> Self {
        Self {
            max_daily_hours: MAX_DAILY_HOURS,
            max_weekly_hours: MAX_WEEKLY_HOURS,
            billable_hours_valid: true,
            no_overlap: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    pub is_valid: bool,
    pub validation_rules: ValidationRules,
    pub errors: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailableHours {
    pub user_id: Uuid,
    pub date: NaiveDate,
    pub available_hours: BigDecimal,
    pub used_hours: BigDecimal,
    pub remaining_hours: BigDecimal,
    pub overtime_hours: BigDecimal,
}
