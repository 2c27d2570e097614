//! Consultation records and treatment plans.
//!
//! Finishing a consultation turns a completed appointment into a clinical history entry on the
//! patient file matched by phone number. It can also start a multi-session treatment plan, which
//! schedules the follow-up visits as Pending appointments.

use crate::error::{ClinicError, ClinicResult};
use crate::ids::RecordId;
use crate::models::{
    Appointment, AppointmentStatus, ClinicalHistoryEntry, Medication, Patient, Treatment,
};
use crate::state::{ClinicState, ClinicStore};
use chrono::NaiveDate;
use clinic_types::NonEmptyText;
use serde::{Deserialize, Serialize};

/// A medication row as typed on the consultation form. Rows with a blank name are dropped.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct MedicationLine {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub instructions: String,
}

fn medications_from_lines(lines: Vec<MedicationLine>) -> Vec<Medication> {
    lines
        .into_iter()
        .filter_map(|line| {
            NonEmptyText::new(&line.name).ok().map(|name| Medication {
                name,
                instructions: line.instructions.trim().to_string(),
            })
        })
        .collect()
}

/// Treatment attached to a consultation.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum TreatmentSelection {
    #[default]
    None,
    /// A protocol already in the catalog.
    #[serde(rename_all = "camelCase")]
    Existing {
        treatment_id: RecordId,
        #[serde(default)]
        session_number: Option<u32>,
    },
    /// A new plan started at this visit. The visit is session 1 and each future date becomes
    /// one follow-up appointment.
    #[serde(rename_all = "camelCase")]
    NewPlan {
        name: NonEmptyText,
        sessions: u32,
        #[serde(default)]
        price: u32,
        #[serde(default)]
        description: String,
        #[serde(default)]
        future_dates: Vec<NaiveDate>,
    },
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ConsultationInput {
    pub notes: NonEmptyText,
    #[serde(default)]
    pub medications: Vec<MedicationLine>,
    #[serde(default)]
    pub next_session_date: Option<NaiveDate>,
    /// `{"kind": "none" | "existing" | "newPlan", ...}`
    #[serde(default)]
    #[cfg_attr(feature = "openapi", schema(value_type = Object))]
    pub treatment: TreatmentSelection,
}

/// What finishing a consultation wrote.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct ConsultationRecorded {
    pub patient_id: RecordId,
    pub entry: ClinicalHistoryEntry,
    /// Set when a new plan was started.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub treatment: Option<Treatment>,
    /// Follow-up appointments scheduled by a new plan, in session order.
    pub follow_ups: Vec<Appointment>,
}

/// Replacement content for a history entry. Date and practitioner are not editable.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct HistoryEntryUpdate {
    pub notes: NonEmptyText,
    #[serde(default)]
    pub medications: Vec<MedicationLine>,
    #[serde(default)]
    pub next_session_date: Option<NaiveDate>,
    #[serde(default)]
    pub session_number: Option<u32>,
    #[serde(default)]
    pub total_sessions: Option<u32>,
}

struct PlanLink {
    treatment_id: RecordId,
    session_number: Option<u32>,
    total_sessions: u32,
}

impl ClinicState {
    /// Writes the consultation record for an appointment awaiting one.
    ///
    /// # Errors
    ///
    /// - [`ClinicError::AppointmentNotFound`] for an unknown appointment.
    /// - [`ClinicError::ConsultationNotPending`] unless the appointment was moved into
    ///   Completed and has no record yet.
    /// - [`ClinicError::UnknownTreatment`] or [`ClinicError::InvalidInput`] for a treatment
    ///   selection that does not fit the catalog or the visit date.
    pub fn finish_consultation(
        &self,
        appointment_id: &RecordId,
        input: ConsultationInput,
    ) -> ClinicResult<(ClinicState, ConsultationRecorded)> {
        let appointment = self
            .appointment(appointment_id)
            .ok_or_else(|| ClinicError::AppointmentNotFound(appointment_id.clone()))?
            .clone();
        if !self.is_awaiting_consultation(appointment_id) {
            return Err(ClinicError::ConsultationNotPending(appointment_id.clone()));
        }
        validate_selection(self, &appointment, &input.treatment)?;

        self.transition(|draft| {
            draft.awaiting_consultation.retain(|a| a != appointment_id);

            let mut next_session_date = input.next_session_date;
            let mut created_treatment = None;
            let mut follow_ups = Vec::new();

            let plan = match input.treatment {
                TreatmentSelection::None => None,
                TreatmentSelection::Existing {
                    treatment_id,
                    session_number,
                } => {
                    let total_sessions = draft.require_treatment(&treatment_id)?.sessions;
                    Some(PlanLink {
                        treatment_id,
                        session_number,
                        total_sessions,
                    })
                }
                TreatmentSelection::NewPlan {
                    name,
                    sessions,
                    price,
                    description,
                    mut future_dates,
                } => {
                    future_dates.sort();
                    let treatment = Treatment {
                        id: RecordId::generate(),
                        name,
                        sessions,
                        price,
                        description: description.trim().to_string(),
                    };
                    draft.treatments.push(treatment.clone());

                    for (offset, date) in future_dates.iter().enumerate() {
                        let follow_up = Appointment {
                            id: RecordId::generate(),
                            date: *date,
                            status: AppointmentStatus::Pending,
                            notes: None,
                            booking_code: draft.allocate_booking_code()?,
                            treatment_id: Some(treatment.id.clone()),
                            session_number: Some(offset as u32 + 2),
                            ..appointment.clone()
                        };
                        draft.appointments.insert(0, follow_up.clone());
                        follow_ups.push(follow_up);
                    }

                    if next_session_date.is_none() {
                        next_session_date = future_dates.first().copied();
                    }

                    if let Some(visit) = draft
                        .appointments
                        .iter_mut()
                        .find(|a| &a.id == appointment_id)
                    {
                        visit.treatment_id = Some(treatment.id.clone());
                        visit.session_number = Some(1);
                    }

                    let link = PlanLink {
                        treatment_id: treatment.id.clone(),
                        session_number: Some(1),
                        total_sessions: treatment.sessions,
                    };
                    created_treatment = Some(treatment);
                    Some(link)
                }
            };

            let entry = ClinicalHistoryEntry {
                id: RecordId::generate(),
                date: appointment.date,
                professional_id: appointment.professional_id.clone(),
                notes: input.notes,
                medications: medications_from_lines(input.medications),
                treatment_id: plan.as_ref().map(|p| p.treatment_id.clone()),
                session_number: plan.as_ref().and_then(|p| p.session_number),
                total_sessions: plan.as_ref().map(|p| p.total_sessions),
                next_session_date,
            };

            let patient_id = draft.upsert_patient_entry(&appointment, entry.clone());

            tracing::info!(
                appointment_id = %appointment_id,
                patient_id = %patient_id,
                entry_id = %entry.id,
                follow_ups = follow_ups.len(),
                "consultation recorded"
            );

            Ok(ConsultationRecorded {
                patient_id,
                entry,
                treatment: created_treatment,
                follow_ups,
            })
        })
    }

    /// Puts `entry` at the head of the history of the patient with the appointment's phone
    /// number, creating the patient file if none matches.
    fn upsert_patient_entry(
        &mut self,
        appointment: &Appointment,
        entry: ClinicalHistoryEntry,
    ) -> RecordId {
        if let Some(patient) = self
            .patients
            .iter_mut()
            .find(|p| p.phone.same_number(&appointment.patient_phone))
        {
            patient.history.insert(0, entry);
            return patient.id.clone();
        }

        let patient = Patient {
            id: RecordId::generate(),
            name: appointment.patient_name.clone(),
            email: appointment.patient_email.clone(),
            phone: appointment.patient_phone.clone(),
            history: vec![entry],
        };
        let id = patient.id.clone();
        tracing::info!(patient_id = %id, "patient file created");
        self.patients.push(patient);
        id
    }

    /// Replaces the editable content of a history entry, wherever it is filed.
    ///
    /// # Errors
    ///
    /// Returns [`ClinicError::HistoryEntryNotFound`] for an unknown entry, and
    /// [`ClinicError::InvalidInput`] for session numbers on an entry without a treatment, or a
    /// session number outside `1..=total`. The total is the one given in the update, else the
    /// linked treatment's session count.
    pub fn edit_history_entry(
        &self,
        entry_id: &RecordId,
        update: HistoryEntryUpdate,
    ) -> ClinicResult<(ClinicState, ClinicalHistoryEntry)> {
        let (patient_idx, entry_idx) = self
            .patients
            .iter()
            .enumerate()
            .find_map(|(pi, p)| {
                p.history
                    .iter()
                    .position(|h| &h.id == entry_id)
                    .map(|hi| (pi, hi))
            })
            .ok_or_else(|| ClinicError::HistoryEntryNotFound(entry_id.clone()))?;

        let current = &self.patients[patient_idx].history[entry_idx];
        let has_sessions = update.session_number.is_some() || update.total_sessions.is_some();
        if has_sessions && current.treatment_id.is_none() {
            return Err(ClinicError::InvalidInput(
                "session numbers require an entry linked to a treatment".into(),
            ));
        }
        if let Some(session) = update.session_number {
            let total = update.total_sessions.or_else(|| {
                current
                    .treatment_id
                    .as_ref()
                    .and_then(|t| self.treatment(t))
                    .map(|t| t.sessions)
            });
            let in_range = session >= 1 && total.map_or(true, |total| session <= total);
            if !in_range {
                return Err(ClinicError::InvalidInput(format!(
                    "session {} is outside 1..={}",
                    session,
                    total.map_or_else(|| "?".to_string(), |t| t.to_string())
                )));
            }
        }

        self.transition(|draft| {
            let entry = &mut draft.patients[patient_idx].history[entry_idx];
            entry.notes = update.notes;
            entry.medications = medications_from_lines(update.medications);
            entry.next_session_date = update.next_session_date;
            entry.session_number = update.session_number;
            entry.total_sessions = update.total_sessions;

            tracing::info!(entry_id = %entry_id, "history entry edited");
            Ok(entry.clone())
        })
    }
}

fn validate_selection(
    state: &ClinicState,
    appointment: &Appointment,
    selection: &TreatmentSelection,
) -> ClinicResult<()> {
    match selection {
        TreatmentSelection::None => Ok(()),
        TreatmentSelection::Existing {
            treatment_id,
            session_number,
        } => {
            let treatment = state.require_treatment(treatment_id)?;
            match session_number {
                Some(n) if *n == 0 || *n > treatment.sessions => {
                    Err(ClinicError::InvalidInput(format!(
                        "session {} is outside 1..={} for treatment {}",
                        n, treatment.sessions, treatment.id
                    )))
                }
                _ => Ok(()),
            }
        }
        TreatmentSelection::NewPlan {
            sessions,
            future_dates,
            ..
        } => {
            if *sessions == 0 {
                return Err(ClinicError::InvalidInput(
                    "a treatment plan needs at least one session".into(),
                ));
            }
            if future_dates.len() as u64 > u64::from(*sessions) - 1 {
                return Err(ClinicError::InvalidInput(format!(
                    "{} future dates given for a plan of {} sessions",
                    future_dates.len(),
                    sessions
                )));
            }
            let mut seen = std::collections::HashSet::new();
            for date in future_dates {
                if *date <= appointment.date {
                    return Err(ClinicError::InvalidInput(format!(
                        "follow-up date {} is not after the visit on {}",
                        date, appointment.date
                    )));
                }
                if !seen.insert(*date) {
                    return Err(ClinicError::InvalidInput(format!(
                        "follow-up date {} is given twice",
                        date
                    )));
                }
            }
            Ok(())
        }
    }
}

impl ClinicStore {
    pub fn finish_consultation(
        &mut self,
        appointment_id: &RecordId,
        input: ConsultationInput,
    ) -> ClinicResult<ConsultationRecorded> {
        self.commit("finish_consultation", |state, _| {
            state.finish_consultation(appointment_id, input)
        })
    }

    pub fn edit_history_entry(
        &mut self,
        entry_id: &RecordId,
        update: HistoryEntryUpdate,
    ) -> ClinicResult<ClinicalHistoryEntry> {
        self.commit("edit_history_entry", |state, _| {
            state.edit_history_entry(entry_id, update)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::appointments::tests::{admin_input, date, id, roberto_booking};
    use crate::state::tests::seeded_store;
    use crate::ClinicStore;

    fn complete(store: &mut ClinicStore, appointment_id: &str, name: &str, phone: &str) {
        let mut input = admin_input(name, phone);
        input.date = date("2025-05-20");
        input.service_id = id("s1");
        input.sede_id = id("sd1");
        input.status = AppointmentStatus::Completed;
        let edited = store
            .edit_appointment(&id(appointment_id), input)
            .expect("edit into completed");
        assert!(edited.consultation_pending);
    }

    fn notes(text: &str) -> ConsultationInput {
        ConsultationInput {
            notes: NonEmptyText::new(text).expect("notes"),
            medications: Vec::new(),
            next_session_date: None,
            treatment: TreatmentSelection::None,
        }
    }

    #[test]
    fn finish_appends_one_entry_to_matching_patient() {
        let mut store = seeded_store();
        complete(&mut store, "demo-2", "Ana Maria Beltran", "955-443-322");

        let mut input = notes("Control de pisada sin dolor.");
        input.medications = vec![
            MedicationLine {
                name: "Crema urea 10%".into(),
                instructions: "Noche".into(),
            },
            MedicationLine::default(),
        ];
        let recorded = store
            .finish_consultation(&id("demo-2"), input)
            .expect("finish");

        assert_eq!(recorded.patient_id, id("pt2"));
        let patient = store.state().patient(&id("pt2")).expect("patient");
        assert_eq!(patient.history.len(), 2);
        assert_eq!(patient.history[0], recorded.entry);
        assert_eq!(recorded.entry.medications.len(), 1);
        assert_eq!(recorded.entry.date, date("2025-05-20"));
        assert_eq!(recorded.entry.professional_id, Some(id("p2")));
        assert_eq!(store.state().patients().len(), 2);
        assert!(!store.state().is_awaiting_consultation(&id("demo-2")));
    }

    #[test]
    fn portal_booking_files_into_existing_patient() {
        let mut store = seeded_store();
        let booked = store.book(roberto_booking()).expect("book");
        assert_eq!(booked.patient_phone.as_str(), "+51 987654321");
        complete(&mut store, booked.id.as_str(), "Roberto Gomez", "+51 987654321");

        let recorded = store
            .finish_consultation(&booked.id, notes("Primera visita desde el portal."))
            .expect("finish");

        assert_eq!(recorded.patient_id, id("pt1"));
        assert_eq!(store.state().patients().len(), 2);
        let roberto = store.state().patient(&id("pt1")).expect("patient");
        assert_eq!(roberto.history[0], recorded.entry);
    }

    #[test]
    fn finish_creates_patient_for_unknown_phone() {
        let mut store = seeded_store();
        complete(&mut store, "demo-1", "Lucia Quispe", "912345678");

        let recorded = store
            .finish_consultation(&id("demo-1"), notes("Primera visita."))
            .expect("finish");

        let patient = store
            .state()
            .patient(&recorded.patient_id)
            .expect("new patient");
        assert_eq!(patient.name.as_str(), "Lucia Quispe");
        assert_eq!(patient.history, vec![recorded.entry]);
        assert_eq!(store.state().patients().len(), 3);
    }

    #[test]
    fn finish_twice_is_rejected() {
        let mut store = seeded_store();
        complete(&mut store, "demo-1", "Roberto Gomez", "987654321");
        store
            .finish_consultation(&id("demo-1"), notes("Primera."))
            .expect("finish");

        let err = store
            .finish_consultation(&id("demo-1"), notes("Segunda."))
            .expect_err("already recorded");
        assert!(matches!(err, ClinicError::ConsultationNotPending(_)));
        let patient = store.state().patient(&id("pt1")).expect("patient");
        assert_eq!(patient.history.len(), 1);
    }

    #[test]
    fn finish_without_completed_transition_is_rejected() {
        let mut store = seeded_store();
        let err = store
            .finish_consultation(&id("demo-1"), notes("Sin cerrar."))
            .expect_err("not pending");
        assert!(matches!(err, ClinicError::ConsultationNotPending(_)));

        let err = store
            .finish_consultation(&id("missing"), notes("x"))
            .expect_err("unknown");
        assert!(err.is_not_found());
    }

    #[test]
    fn existing_treatment_links_entry() {
        let mut store = seeded_store();
        complete(&mut store, "demo-1", "Roberto Gomez", "987654321");
        let mut input = notes("Sesión de láser.");
        input.treatment = TreatmentSelection::Existing {
            treatment_id: id("t1"),
            session_number: Some(3),
        };

        let recorded = store
            .finish_consultation(&id("demo-1"), input)
            .expect("finish");
        assert_eq!(recorded.entry.treatment_id, Some(id("t1")));
        assert_eq!(recorded.entry.session_number, Some(3));
        assert_eq!(recorded.entry.total_sessions, Some(6));
        assert!(recorded.follow_ups.is_empty());
    }

    #[test]
    fn existing_treatment_session_out_of_range_keeps_flow_open() {
        let mut store = seeded_store();
        complete(&mut store, "demo-1", "Roberto Gomez", "987654321");
        let mut input = notes("Sesión.");
        input.treatment = TreatmentSelection::Existing {
            treatment_id: id("t2"),
            session_number: Some(5),
        };

        let err = store
            .finish_consultation(&id("demo-1"), input)
            .expect_err("session beyond plan");
        assert!(matches!(err, ClinicError::InvalidInput(_)));
        assert!(store.state().is_awaiting_consultation(&id("demo-1")));
    }

    #[test]
    fn new_plan_schedules_follow_ups_in_session_order() {
        let mut store = seeded_store();
        complete(&mut store, "demo-1", "Roberto Gomez", "987654321");
        let appointments_before = store.state().appointments().len();

        let mut input = notes("Inicio de tratamiento.");
        input.treatment = TreatmentSelection::NewPlan {
            name: NonEmptyText::new("Plan Hongos").expect("name"),
            sessions: 4,
            price: 400,
            description: String::new(),
            future_dates: vec![date("2025-06-17"), date("2025-06-03")],
        };

        let recorded = store
            .finish_consultation(&id("demo-1"), input)
            .expect("finish");

        let treatment = recorded.treatment.expect("plan created");
        assert_eq!(treatment.sessions, 4);
        assert!(store.state().treatment(&treatment.id).is_some());

        let sessions: Vec<_> = recorded
            .follow_ups
            .iter()
            .map(|a| (a.date, a.session_number))
            .collect();
        assert_eq!(
            sessions,
            vec![
                (date("2025-06-03"), Some(2)),
                (date("2025-06-17"), Some(3)),
            ]
        );
        for follow_up in &recorded.follow_ups {
            assert_eq!(follow_up.status, AppointmentStatus::Pending);
            assert_eq!(follow_up.treatment_id, Some(treatment.id.clone()));
            assert_eq!(follow_up.professional_id, Some(id("p1")));
            assert_ne!(follow_up.booking_code.as_str(), "RGB100");
        }
        assert_ne!(
            recorded.follow_ups[0].booking_code,
            recorded.follow_ups[1].booking_code
        );
        assert_eq!(store.state().appointments().len(), appointments_before + 2);

        let visit = store.state().appointment(&id("demo-1")).expect("visit");
        assert_eq!(visit.session_number, Some(1));
        assert_eq!(visit.treatment_id, Some(treatment.id.clone()));
        assert_eq!(recorded.entry.session_number, Some(1));
        assert_eq!(recorded.entry.next_session_date, Some(date("2025-06-03")));
    }

    #[test]
    fn new_plan_rejects_bad_dates() {
        let mut store = seeded_store();
        complete(&mut store, "demo-1", "Roberto Gomez", "987654321");

        let plan = |sessions: u32, future_dates: Vec<NaiveDate>| {
            let mut input = notes("Plan.");
            input.treatment = TreatmentSelection::NewPlan {
                name: NonEmptyText::new("Plan").expect("name"),
                sessions,
                price: 0,
                description: String::new(),
                future_dates,
            };
            input
        };

        let cases = [
            plan(0, vec![]),
            plan(2, vec![date("2025-06-01"), date("2025-06-08")]),
            plan(3, vec![date("2025-05-20")]),
            plan(3, vec![date("2025-06-01"), date("2025-06-01")]),
        ];
        for input in cases {
            let err = store
                .finish_consultation(&id("demo-1"), input)
                .expect_err("invalid plan");
            assert!(matches!(err, ClinicError::InvalidInput(_)), "{err}");
        }
        assert!(store.state().is_awaiting_consultation(&id("demo-1")));
    }

    #[test]
    fn treatment_selection_json_shape() {
        let json = r#"{"kind":"newPlan","name":"Plan","sessions":3,"futureDates":["2025-06-01"]}"#;
        let parsed: TreatmentSelection = serde_json::from_str(json).expect("parse");
        assert!(matches!(
            parsed,
            TreatmentSelection::NewPlan { sessions: 3, ref future_dates, .. } if future_dates.len() == 1
        ));

        let input: ConsultationInput =
            serde_json::from_str(r#"{"notes":"Ok"}"#).expect("defaults");
        assert_eq!(input.treatment, TreatmentSelection::None);
    }

    #[test]
    fn edit_history_entry_replaces_content() {
        let mut store = seeded_store();
        let update = HistoryEntryUpdate {
            notes: NonEmptyText::new("Dolor resuelto.").expect("notes"),
            medications: vec![],
            next_session_date: Some(date("2025-07-01")),
            session_number: None,
            total_sessions: None,
        };

        let entry = store
            .edit_history_entry(&id("h1"), update)
            .expect("edit entry");
        assert_eq!(entry.notes.as_str(), "Dolor resuelto.");
        assert!(entry.medications.is_empty());
        assert_eq!(entry.date, date("2025-04-02"));
        assert_eq!(entry.professional_id, Some(id("p2")));

        let stored = &store.state().patient(&id("pt2")).expect("patient").history[0];
        assert_eq!(stored, &entry);
    }

    #[test]
    fn edit_history_entry_rejects_sessions_without_treatment() {
        let mut store = seeded_store();
        let update = HistoryEntryUpdate {
            notes: NonEmptyText::new("x").expect("notes"),
            medications: vec![],
            next_session_date: None,
            session_number: Some(2),
            total_sessions: Some(4),
        };
        let err = store
            .edit_history_entry(&id("h1"), update.clone())
            .expect_err("no treatment");
        assert!(matches!(err, ClinicError::InvalidInput(_)));

        let err = store
            .edit_history_entry(&id("h404"), update)
            .expect_err("unknown entry");
        assert!(matches!(err, ClinicError::HistoryEntryNotFound(_)));
    }

    fn linked_entry(store: &mut ClinicStore) -> RecordId {
        complete(store, "demo-1", "Roberto Gomez", "987654321");
        let mut input = notes("Quiropodia, primera sesión.");
        input.treatment = TreatmentSelection::Existing {
            treatment_id: id("t2"),
            session_number: Some(1),
        };
        store
            .finish_consultation(&id("demo-1"), input)
            .expect("finish")
            .entry
            .id
    }

    fn session_update(
        session_number: Option<u32>,
        total_sessions: Option<u32>,
    ) -> HistoryEntryUpdate {
        HistoryEntryUpdate {
            notes: NonEmptyText::new("Segunda sesión.").expect("notes"),
            medications: vec![],
            next_session_date: None,
            session_number,
            total_sessions,
        }
    }

    #[test]
    fn edit_history_entry_checks_session_against_linked_treatment() {
        let mut store = seeded_store();
        let entry_id = linked_entry(&mut store);

        for session in [0, 5, 99] {
            let err = store
                .edit_history_entry(&entry_id, session_update(Some(session), None))
                .expect_err("session outside the 4-session plan");
            assert!(matches!(err, ClinicError::InvalidInput(_)), "{session}");
        }

        let entry = store
            .edit_history_entry(&entry_id, session_update(Some(4), None))
            .expect("last session");
        assert_eq!(entry.session_number, Some(4));
        assert_eq!(entry.total_sessions, None);
    }

    #[test]
    fn edit_history_entry_prefers_explicit_total() {
        let mut store = seeded_store();
        let entry_id = linked_entry(&mut store);

        let entry = store
            .edit_history_entry(&entry_id, session_update(Some(6), Some(8)))
            .expect("extended plan");
        assert_eq!(entry.session_number, Some(6));
        assert_eq!(entry.total_sessions, Some(8));

        let err = store
            .edit_history_entry(&entry_id, session_update(Some(0), Some(8)))
            .expect_err("session zero");
        assert!(matches!(err, ClinicError::InvalidInput(_)));
    }
}
