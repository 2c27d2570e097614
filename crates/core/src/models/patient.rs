use crate::ids::RecordId;
use chrono::NaiveDate;
use clinic_types::{NonEmptyText, PhoneNumber};
use serde::{Deserialize, Serialize};

/// A patient file, keyed for matching by its phone number.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Patient {
    pub id: RecordId,
    pub name: NonEmptyText,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub phone: PhoneNumber,
    /// Most recent entry first.
    #[serde(default)]
    pub history: Vec<ClinicalHistoryEntry>,
}

/// One dated note in a patient's clinical history.
///
/// `session_number` and `total_sessions` are only set when `treatment_id` is.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ClinicalHistoryEntry {
    pub id: RecordId,
    pub date: NaiveDate,
    #[serde(default)]
    pub professional_id: Option<RecordId>,
    pub notes: NonEmptyText,
    #[serde(default)]
    pub medications: Vec<Medication>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub treatment_id: Option<RecordId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_number: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_sessions: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_session_date: Option<NaiveDate>,
}

/// A prescribed medication line.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Medication {
    pub name: NonEmptyText,
    #[serde(default)]
    pub instructions: String,
}
