//! Appointment commands: admin create/edit and the public booking boundary.

use crate::config::{validate_country_code, CoreConfig};
use crate::error::{ClinicError, ClinicResult};
use crate::ids::RecordId;
use crate::models::serde_hhmm;
use crate::models::{Appointment, AppointmentStatus};
use crate::state::{ClinicState, ClinicStore};
use chrono::{NaiveDate, NaiveTime};
use clinic_types::{NonEmptyText, PhoneNumber};
use serde::{Deserialize, Serialize};

/// Fields of the admin appointment form, used for both create and edit.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct AppointmentInput {
    pub patient_name: NonEmptyText,
    pub patient_phone: PhoneNumber,
    #[serde(default)]
    pub patient_email: Option<String>,
    pub date: NaiveDate,
    #[serde(with = "serde_hhmm")]
    #[cfg_attr(feature = "openapi", schema(value_type = String, example = "10:00"))]
    pub time: NaiveTime,
    pub service_id: RecordId,
    pub sede_id: RecordId,
    /// On create, `None` assigns a practitioner automatically; on edit, `None` keeps the
    /// current one.
    #[serde(default)]
    pub professional_id: Option<RecordId>,
    #[serde(default)]
    pub status: AppointmentStatus,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Result of an edit.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct AppointmentEdited {
    pub appointment: Appointment,
    /// True when this edit moved the appointment into Completed; the caller should collect
    /// the consultation record next.
    pub consultation_pending: bool,
}

/// A submission from the public booking portal.
///
/// `phone` is the local number; it is stored as `"<country_code> <phone>"`.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct BookingRequest {
    pub name: NonEmptyText,
    pub phone: String,
    #[serde(default)]
    pub country_code: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    pub date: NaiveDate,
    #[serde(with = "serde_hhmm")]
    #[cfg_attr(feature = "openapi", schema(value_type = String, example = "10:00"))]
    pub time: NaiveTime,
    pub service_id: RecordId,
    pub sede_id: RecordId,
    #[serde(default)]
    pub notes: Option<String>,
}

pub(crate) fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl ClinicState {
    /// Picks the first professional attending `sede_id`, else the first professional at all.
    fn auto_assign_professional(&self, sede_id: &RecordId) -> Option<RecordId> {
        self.professionals
            .iter()
            .find(|p| p.attends(sede_id))
            .or_else(|| self.professionals.first())
            .map(|p| p.id.clone())
    }

    fn check_references(&self, input: &AppointmentInput) -> ClinicResult<()> {
        self.require_service(&input.service_id)?;
        self.require_sede(&input.sede_id)?;
        if let Some(professional_id) = &input.professional_id {
            self.require_professional(professional_id)?;
        }
        Ok(())
    }

    /// Creates an appointment and puts it at the head of the collection.
    ///
    /// # Errors
    ///
    /// Returns `Unknown*` errors for references missing from the catalog, and
    /// [`ClinicError::BookingCodeExhausted`] if no free booking code could be drawn.
    pub fn create_appointment(
        &self,
        input: AppointmentInput,
    ) -> ClinicResult<(ClinicState, Appointment)> {
        self.check_references(&input)?;

        self.transition(|draft| {
            let booking_code = draft.allocate_booking_code()?;
            let professional_id = input
                .professional_id
                .or_else(|| draft.auto_assign_professional(&input.sede_id));

            let appointment = Appointment {
                id: RecordId::generate(),
                patient_name: input.patient_name,
                patient_email: non_blank(input.patient_email),
                patient_phone: input.patient_phone,
                service_id: input.service_id,
                sede_id: input.sede_id,
                professional_id,
                date: input.date,
                time: input.time,
                status: input.status,
                notes: non_blank(input.notes),
                booking_code,
                treatment_id: None,
                session_number: None,
            };

            draft.appointments.insert(0, appointment.clone());
            tracing::info!(
                appointment_id = %appointment.id,
                booking_code = %appointment.booking_code,
                status = ?appointment.status,
                "appointment created"
            );
            Ok(appointment)
        })
    }

    /// Replaces an appointment's form fields in place.
    ///
    /// Identifier, booking code, treatment reference and session number are preserved. Moving
    /// the status into Completed from any other status opens the consultation flow; moving it
    /// out of Completed closes a flow that was still open.
    pub fn edit_appointment(
        &self,
        id: &RecordId,
        input: AppointmentInput,
    ) -> ClinicResult<(ClinicState, AppointmentEdited)> {
        let idx = self
            .appointments
            .iter()
            .position(|a| &a.id == id)
            .ok_or_else(|| ClinicError::AppointmentNotFound(id.clone()))?;
        self.check_references(&input)?;

        self.transition(|draft| {
            let current = &draft.appointments[idx];
            let previous_status = current.status;

            let updated = Appointment {
                id: current.id.clone(),
                patient_name: input.patient_name,
                patient_email: non_blank(input.patient_email),
                patient_phone: input.patient_phone,
                service_id: input.service_id,
                sede_id: input.sede_id,
                professional_id: input
                    .professional_id
                    .or_else(|| current.professional_id.clone()),
                date: input.date,
                time: input.time,
                status: input.status,
                notes: non_blank(input.notes),
                booking_code: current.booking_code.clone(),
                treatment_id: current.treatment_id.clone(),
                session_number: current.session_number,
            };
            draft.appointments[idx] = updated.clone();

            let consultation_pending = updated.status == AppointmentStatus::Completed
                && previous_status != AppointmentStatus::Completed;

            if consultation_pending {
                if !draft.awaiting_consultation.contains(id) {
                    draft.awaiting_consultation.push(id.clone());
                }
            } else if updated.status != AppointmentStatus::Completed {
                draft.awaiting_consultation.retain(|a| a != id);
            }

            tracing::info!(
                appointment_id = %id,
                from = ?previous_status,
                to = ?updated.status,
                consultation_pending,
                "appointment edited"
            );

            Ok(AppointmentEdited {
                appointment: updated,
                consultation_pending,
            })
        })
    }

    /// Accepts a public booking: a Confirmed, unassigned appointment at the head of the list.
    ///
    /// # Errors
    ///
    /// Besides the reference checks of [`ClinicState::create_appointment`], rejects times that
    /// are not offered booking slots ([`ClinicError::UnavailableTimeSlot`]) and malformed
    /// phone numbers or country codes.
    pub fn book(
        &self,
        cfg: &CoreConfig,
        request: BookingRequest,
    ) -> ClinicResult<(ClinicState, Appointment)> {
        if !cfg.offers_slot(request.time) {
            return Err(ClinicError::UnavailableTimeSlot(
                request.time.format("%H:%M").to_string(),
            ));
        }

        let country_code =
            non_blank(request.country_code).unwrap_or_else(|| cfg.default_country_code().into());
        validate_country_code(&country_code)?;
        let phone = PhoneNumber::with_country_code(&country_code, &request.phone)?;

        self.require_service(&request.service_id)?;
        self.require_sede(&request.sede_id)?;

        self.transition(|draft| {
            let appointment = Appointment {
                id: RecordId::generate(),
                patient_name: request.name,
                patient_email: non_blank(request.email),
                patient_phone: phone,
                service_id: request.service_id,
                sede_id: request.sede_id,
                professional_id: None,
                date: request.date,
                time: request.time,
                status: AppointmentStatus::Confirmed,
                notes: non_blank(request.notes),
                booking_code: draft.allocate_booking_code()?,
                treatment_id: None,
                session_number: None,
            };

            draft.appointments.insert(0, appointment.clone());
            tracing::info!(
                appointment_id = %appointment.id,
                booking_code = %appointment.booking_code,
                "booking confirmed"
            );
            Ok(appointment)
        })
    }
}

impl ClinicStore {
    pub fn create_appointment(&mut self, input: AppointmentInput) -> ClinicResult<Appointment> {
        self.commit("create_appointment", |state, _| {
            state.create_appointment(input)
        })
    }

    pub fn edit_appointment(
        &mut self,
        id: &RecordId,
        input: AppointmentInput,
    ) -> ClinicResult<AppointmentEdited> {
        self.commit("edit_appointment", |state, _| {
            state.edit_appointment(id, input)
        })
    }

    pub fn book(&mut self, request: BookingRequest) -> ClinicResult<Appointment> {
        self.commit("book", |state, cfg| state.book(cfg, request))
    }
}
