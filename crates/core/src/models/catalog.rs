//! Reference records: locations, services, staff, treatment protocols and clinic branding.
//!
//! These have no lifecycle beyond create/edit and are referenced by id from appointments.

use crate::ids::RecordId;
use clinic_types::{NonEmptyText, PhoneNumber};
use serde::{Deserialize, Serialize};

/// A clinic location (sede).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Sede {
    pub id: RecordId,
    pub name: NonEmptyText,
    pub address: String,
    pub phone: PhoneNumber,
}

/// A bookable clinical service.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Service {
    pub id: RecordId,
    pub name: NonEmptyText,
    /// Minutes.
    pub duration: u32,
    /// Whole currency units.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<u32>,
    pub category: String,
}

/// A practitioner and the locations they attend.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Professional {
    pub id: RecordId,
    pub name: NonEmptyText,
    pub specialty: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(default)]
    pub sede_ids: Vec<RecordId>,
}

impl Professional {
    pub fn attends(&self, sede_id: &RecordId) -> bool {
        self.sede_ids.contains(sede_id)
    }
}

/// A named multi-session care protocol.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Treatment {
    pub id: RecordId,
    pub name: NonEmptyText,
    /// Total sessions in the protocol, at least one.
    pub sessions: u32,
    /// Whole currency units.
    #[serde(default)]
    pub price: u32,
    #[serde(default)]
    pub description: String,
}

/// Clinic branding shown on the booking portal and dashboard.
///
/// `logo` and `background_image` hold data URIs (or plain URLs); encoding uploaded files is the
/// caller's job.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Company {
    pub id: RecordId,
    pub name: NonEmptyText,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_image: Option<String>,
    pub primary_color: String,
    pub secondary_color: String,
}
