//! Application state and the store that owns it.
//!
//! [`ClinicState`] is plain data: company branding, the catalogs, patients, the appointment
//! collection (most recent first) and the appointments awaiting a consultation record.
//!
//! Every command is a method on `ClinicState` that takes `&self` and returns the next state
//! together with the command's output. The command runs against a draft copy, so a rejected
//! command leaves the current state untouched. [`ClinicStore`] is the single controller that
//! holds the live state and swaps in each accepted successor.

use crate::config::CoreConfig;
use crate::error::{ClinicError, ClinicResult};
use crate::ids::{BookingCode, RecordId};
use crate::models::{
    Appointment, ClinicalHistoryEntry, Company, Patient, Professional, Sede, Service, Treatment,
};
use crate::seed::SeedData;
use clinic_types::PhoneNumber;
use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;

/// The complete in-memory state of one clinic.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClinicState {
    pub(crate) company: Company,
    pub(crate) sedes: Vec<Sede>,
    pub(crate) services: Vec<Service>,
    pub(crate) professionals: Vec<Professional>,
    pub(crate) treatments: Vec<Treatment>,
    pub(crate) patients: Vec<Patient>,
    pub(crate) appointments: Vec<Appointment>,
    pub(crate) awaiting_consultation: Vec<RecordId>,
}

impl ClinicState {
    /// Builds a state from seed data, checking identifiers and cross-references.
    ///
    /// # Errors
    ///
    /// Returns [`ClinicError::DuplicateId`] when a collection repeats an identifier, and the
    /// matching `Unknown*` error when a record references a catalog entry that does not exist.
    /// A history entry carrying session numbers without a treatment is
    /// [`ClinicError::InvalidInput`].
    pub fn from_seed(seed: SeedData) -> ClinicResult<Self> {
        ensure_unique(seed.sedes.iter().map(|s| &s.id))?;
        ensure_unique(seed.services.iter().map(|s| &s.id))?;
        ensure_unique(seed.professionals.iter().map(|p| &p.id))?;
        ensure_unique(seed.treatments.iter().map(|t| &t.id))?;
        ensure_unique(seed.patients.iter().map(|p| &p.id))?;
        ensure_unique(
            seed.patients
                .iter()
                .flat_map(|p| p.history.iter().map(|h| &h.id)),
        )?;
        ensure_unique(seed.appointments.iter().map(|a| &a.id))?;

        let state = Self {
            company: seed.company,
            sedes: seed.sedes,
            services: seed.services,
            professionals: seed.professionals,
            treatments: seed.treatments,
            patients: seed.patients,
            appointments: seed.appointments,
            awaiting_consultation: Vec::new(),
        };

        for professional in &state.professionals {
            for sede_id in &professional.sede_ids {
                state.require_sede(sede_id)?;
            }
        }

        for appointment in &state.appointments {
            state.require_service(&appointment.service_id)?;
            state.require_sede(&appointment.sede_id)?;
            if let Some(professional_id) = &appointment.professional_id {
                state.require_professional(professional_id)?;
            }
            if let Some(treatment_id) = &appointment.treatment_id {
                state.require_treatment(treatment_id)?;
            }
        }

        for entry in state.patients.iter().flat_map(|p| p.history.iter()) {
            match &entry.treatment_id {
                Some(treatment_id) => {
                    state.require_treatment(treatment_id)?;
                }
                None if entry.session_number.is_some() || entry.total_sessions.is_some() => {
                    return Err(ClinicError::InvalidInput(format!(
                        "history entry {} has session numbers but no treatment",
                        entry.id
                    )));
                }
                None => {}
            }
        }

        Ok(state)
    }

    /// Runs `apply` against a draft copy and returns the draft with the command's output.
    pub(crate) fn transition<T>(
        &self,
        apply: impl FnOnce(&mut ClinicState) -> ClinicResult<T>,
    ) -> ClinicResult<(ClinicState, T)> {
        let mut draft = self.clone();
        let output = apply(&mut draft)?;
        Ok((draft, output))
    }

    pub fn company(&self) -> &Company {
        &self.company
    }

    pub fn sedes(&self) -> &[Sede] {
        &self.sedes
    }

    pub fn services(&self) -> &[Service] {
        &self.services
    }

    pub fn professionals(&self) -> &[Professional] {
        &self.professionals
    }

    pub fn treatments(&self) -> &[Treatment] {
        &self.treatments
    }

    pub fn patients(&self) -> &[Patient] {
        &self.patients
    }

    /// The appointment collection, most recent first.
    pub fn appointments(&self) -> &[Appointment] {
        &self.appointments
    }

    pub fn appointment(&self, id: &RecordId) -> Option<&Appointment> {
        self.appointments.iter().find(|a| &a.id == id)
    }

    pub fn patient(&self, id: &RecordId) -> Option<&Patient> {
        self.patients.iter().find(|p| &p.id == id)
    }

    /// The patient whose phone has the same digits as `phone`.
    pub fn patient_by_phone(&self, phone: &PhoneNumber) -> Option<&Patient> {
        self.patients.iter().find(|p| p.phone.same_number(phone))
    }

    /// Finds a history entry in whichever patient file holds it.
    pub fn history_entry(&self, id: &RecordId) -> Option<(&Patient, &ClinicalHistoryEntry)> {
        self.patients.iter().find_map(|p| {
            p.history
                .iter()
                .find(|h| &h.id == id)
                .map(|entry| (p, entry))
        })
    }

    pub fn sede(&self, id: &RecordId) -> Option<&Sede> {
        self.sedes.iter().find(|s| &s.id == id)
    }

    pub fn service(&self, id: &RecordId) -> Option<&Service> {
        self.services.iter().find(|s| &s.id == id)
    }

    pub fn professional(&self, id: &RecordId) -> Option<&Professional> {
        self.professionals.iter().find(|p| &p.id == id)
    }

    pub fn treatment(&self, id: &RecordId) -> Option<&Treatment> {
        self.treatments.iter().find(|t| &t.id == id)
    }

    /// True while `appointment_id` has been moved into Completed and its consultation record
    /// has not been written yet.
    pub fn is_awaiting_consultation(&self, appointment_id: &RecordId) -> bool {
        self.awaiting_consultation.contains(appointment_id)
    }

    pub fn awaiting_consultation(&self) -> &[RecordId] {
        &self.awaiting_consultation
    }

    pub(crate) fn require_sede(&self, id: &RecordId) -> ClinicResult<&Sede> {
        self.sede(id)
            .ok_or_else(|| ClinicError::UnknownSede(id.clone()))
    }

    pub(crate) fn require_service(&self, id: &RecordId) -> ClinicResult<&Service> {
        self.service(id)
            .ok_or_else(|| ClinicError::UnknownService(id.clone()))
    }

    pub(crate) fn require_professional(&self, id: &RecordId) -> ClinicResult<&Professional> {
        self.professional(id)
            .ok_or_else(|| ClinicError::UnknownProfessional(id.clone()))
    }

    pub(crate) fn require_treatment(&self, id: &RecordId) -> ClinicResult<&Treatment> {
        self.treatment(id)
            .ok_or_else(|| ClinicError::UnknownTreatment(id.clone()))
    }

    /// Draws a booking code not yet used by any appointment.
    pub(crate) fn allocate_booking_code(&self) -> ClinicResult<BookingCode> {
        BookingCode::allocate(BookingCode::random, |code| {
            self.appointments.iter().any(|a| &a.booking_code == code)
        })
    }
}

fn ensure_unique<'a>(ids: impl Iterator<Item = &'a RecordId>) -> ClinicResult<()> {
    let mut seen = HashSet::new();
    for id in ids {
        if !seen.insert(id) {
            return Err(ClinicError::DuplicateId(id.clone()));
        }
    }
    Ok(())
}

/// Single owner of the live [`ClinicState`].
///
/// Command methods delegate to the matching `ClinicState` command and replace the live state
/// only when it succeeds.
#[derive(Clone, Debug)]
pub struct ClinicStore {
    cfg: Arc<CoreConfig>,
    state: ClinicState,
}

impl ClinicStore {
    pub fn new(cfg: Arc<CoreConfig>, state: ClinicState) -> Self {
        Self { cfg, state }
    }

    /// Creates a store from the seed named in `cfg` (or the embedded seed).
    pub fn from_config(cfg: Arc<CoreConfig>) -> ClinicResult<Self> {
        let seed = SeedData::load(cfg.seed_file())?;
        let state = ClinicState::from_seed(seed)?;
        tracing::info!(
            appointments = state.appointments.len(),
            patients = state.patients.len(),
            "clinic store seeded"
        );
        Ok(Self::new(cfg, state))
    }

    pub fn state(&self) -> &ClinicState {
        &self.state
    }

    pub fn config(&self) -> &CoreConfig {
        &self.cfg
    }

    /// Applies a command and, on success, makes its successor the live state.
    pub(crate) fn commit<T>(
        &mut self,
        command: &'static str,
        run: impl FnOnce(&ClinicState, &CoreConfig) -> ClinicResult<(ClinicState, T)>,
    ) -> ClinicResult<T> {
        match run(&self.state, &self.cfg) {
            Ok((next, output)) => {
                self.state = next;
                Ok(output)
            }
            Err(e) => {
                tracing::debug!(command, error = %e, "command rejected");
                Err(e)
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn seeded_store() -> ClinicStore {
        ClinicStore::from_config(Arc::new(CoreConfig::default())).expect("embedded seed")
    }

    #[test]
    fn from_seed_keeps_collection_order() {
        let store = seeded_store();
        let ids: Vec<_> = store
            .state()
            .appointments()
            .iter()
            .map(|a| a.id.as_str())
            .collect();
        assert_eq!(ids, ["demo-1", "demo-2"]);
        assert!(store.state().awaiting_consultation().is_empty());
    }

    #[test]
    fn from_seed_rejects_duplicate_ids() {
        let mut seed = SeedData::embedded().expect("seed");
        let dup = seed.sedes[0].clone();
        seed.sedes.push(dup);
        let err = ClinicState::from_seed(seed).expect_err("duplicate sede");
        assert!(matches!(err, ClinicError::DuplicateId(id) if id.as_str() == "sd1"));
    }

    #[test]
    fn from_seed_rejects_dangling_references() {
        let mut seed = SeedData::embedded().expect("seed");
        seed.appointments[0].service_id = RecordId::parse("nope").expect("valid id");
        let err = ClinicState::from_seed(seed).expect_err("unknown service");
        assert!(matches!(err, ClinicError::UnknownService(_)));

        let mut seed = SeedData::embedded().expect("seed");
        seed.professionals[0]
            .sede_ids
            .push(RecordId::parse("sd404").expect("valid id"));
        let err = ClinicState::from_seed(seed).expect_err("unknown sede");
        assert!(matches!(err, ClinicError::UnknownSede(_)));
    }

    #[test]
    fn from_seed_rejects_sessions_without_treatment() {
        let mut seed = SeedData::embedded().expect("seed");
        let entry = seed
            .patients
            .iter_mut()
            .flat_map(|p| p.history.iter_mut())
            .next()
            .expect("seeded history entry");
        assert!(entry.treatment_id.is_none());
        entry.total_sessions = Some(4);

        let err = ClinicState::from_seed(seed).expect_err("orphan session numbers");
        assert!(matches!(err, ClinicError::InvalidInput(msg) if msg.contains("h1")));
    }

    #[test]
    fn patient_by_phone_ignores_formatting() {
        let store = seeded_store();
        let phone = PhoneNumber::new("955 443 322").expect("valid phone");
        let patient = store.state().patient_by_phone(&phone).expect("match");
        assert_eq!(patient.name.as_str(), "Ana Maria Beltran");
    }

    #[test]
    fn history_entry_is_found_across_patients() {
        let store = seeded_store();
        let h1 = RecordId::parse("h1").expect("valid id");
        let (patient, entry) = store.state().history_entry(&h1).expect("entry");
        assert_eq!(patient.id.as_str(), "pt2");
        assert_eq!(entry.id, h1);
        assert!(store
            .state()
            .history_entry(&RecordId::parse("h2").expect("valid id"))
            .is_none());
    }

    #[test]
    fn failed_transition_leaves_state_untouched() {
        let store = seeded_store();
        let before = store.state().clone();
        let result: ClinicResult<(ClinicState, ())> = store.state().transition(|draft| {
            draft.appointments.clear();
            Err(ClinicError::InvalidInput("boom".into()))
        });
        assert!(result.is_err());
        assert_eq!(store.state(), &before);
    }
}
