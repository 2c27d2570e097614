use crate::ids::{BookingCode, RecordId};
use chrono::{NaiveDate, NaiveTime};
use clinic_types::{NonEmptyText, PhoneNumber};
use serde::{Deserialize, Serialize};

/// Appointment lifecycle status.
///
/// The nominal flow is Pending → Confirmed → InProgress → Completed, with Cancelled and NoShow
/// reachable from any non-terminal state. The store does not police transitions; the only
/// status with a side effect is Completed (see `ClinicState::edit_appointment`).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AppointmentStatus {
    #[default]
    Pending,
    Confirmed,
    InProgress,
    Completed,
    Cancelled,
    NoShow,
}

impl AppointmentStatus {
    /// Column order of the status board.
    pub const BOARD_ORDER: [AppointmentStatus; 6] = [
        AppointmentStatus::Pending,
        AppointmentStatus::Confirmed,
        AppointmentStatus::InProgress,
        AppointmentStatus::Completed,
        AppointmentStatus::Cancelled,
        AppointmentStatus::NoShow,
    ];

    /// Display label used by the clinic staff.
    pub fn label(self) -> &'static str {
        match self {
            AppointmentStatus::Pending => "Pendiente",
            AppointmentStatus::Confirmed => "Confirmada",
            AppointmentStatus::InProgress => "En Curso",
            AppointmentStatus::Completed => "Completada",
            AppointmentStatus::Cancelled => "Cancelada",
            AppointmentStatus::NoShow => "No Asistió",
        }
    }
}

impl std::fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl std::str::FromStr for AppointmentStatus {
    type Err = crate::ClinicError;

    /// Accepts the wire names (`IN_PROGRESS`) case-insensitively, with `-` or `_`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalised = s.trim().to_ascii_uppercase().replace('-', "_");
        AppointmentStatus::BOARD_ORDER
            .into_iter()
            .find(|status| status.wire_name() == normalised)
            .ok_or_else(|| crate::ClinicError::InvalidInput(format!("unknown status: '{}'", s)))
    }
}

impl AppointmentStatus {
    fn wire_name(self) -> &'static str {
        match self {
            AppointmentStatus::Pending => "PENDING",
            AppointmentStatus::Confirmed => "CONFIRMED",
            AppointmentStatus::InProgress => "IN_PROGRESS",
            AppointmentStatus::Completed => "COMPLETED",
            AppointmentStatus::Cancelled => "CANCELLED",
            AppointmentStatus::NoShow => "NO_SHOW",
        }
    }
}

/// A booked visit.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Appointment {
    pub id: RecordId,
    pub patient_name: NonEmptyText,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patient_email: Option<String>,
    pub patient_phone: PhoneNumber,
    pub service_id: RecordId,
    pub sede_id: RecordId,
    /// `None` until a practitioner is assigned (public bookings arrive unassigned).
    #[serde(default)]
    pub professional_id: Option<RecordId>,
    pub date: NaiveDate,
    #[serde(with = "super::serde_hhmm")]
    #[cfg_attr(feature = "openapi", schema(value_type = String, example = "10:00"))]
    pub time: NaiveTime,
    pub status: AppointmentStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub booking_code: BookingCode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub treatment_id: Option<RecordId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_number: Option<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_uses_screaming_snake_case_on_the_wire() {
        let json = serde_json::to_string(&AppointmentStatus::InProgress).expect("serialize");
        assert_eq!(json, "\"IN_PROGRESS\"");
        let parsed: AppointmentStatus = serde_json::from_str("\"NO_SHOW\"").expect("parse");
        assert_eq!(parsed, AppointmentStatus::NoShow);
    }

    #[test]
    fn status_from_str_is_lenient_about_case_and_dashes() {
        assert_eq!(
            "in-progress".parse::<AppointmentStatus>().expect("valid"),
            AppointmentStatus::InProgress
        );
        assert_eq!(
            "Completed".parse::<AppointmentStatus>().expect("valid"),
            AppointmentStatus::Completed
        );
        assert!("done".parse::<AppointmentStatus>().is_err());
    }

    #[test]
    fn appointment_json_shape() {
        let json = r#"{
            "id": "demo-1",
            "patientName": "Roberto Gomez",
            "patientPhone": "987654321",
            "serviceId": "s1",
            "sedeId": "sd1",
            "professionalId": "p1",
            "date": "2025-05-20",
            "time": "10:00",
            "status": "CONFIRMED",
            "bookingCode": "RGB100"
        }"#;
        let appointment: Appointment = serde_json::from_str(json).expect("parse appointment");
        assert_eq!(appointment.time.format("%H:%M").to_string(), "10:00");
        assert_eq!(appointment.status, AppointmentStatus::Confirmed);

        let value = serde_json::to_value(&appointment).expect("serialize");
        assert_eq!(value["time"], "10:00");
        assert_eq!(value["bookingCode"], "RGB100");
        assert!(value.get("treatmentId").is_none());
    }

    #[test]
    fn appointment_rejects_bad_time() {
        let json = r#"{
            "id": "demo-1", "patientName": "Roberto", "patientPhone": "987654321",
            "serviceId": "s1", "sedeId": "sd1", "date": "2025-05-20", "time": "25:00",
            "status": "PENDING", "bookingCode": "RGB100"
        }"#;
        let err = serde_json::from_str::<Appointment>(json).expect_err("invalid time");
        assert!(err.to_string().contains("HH:MM"));
    }
}
