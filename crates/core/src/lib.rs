//! # Clinic Core
//!
//! Core business logic for the clinic appointment and clinical-record store.
//!
//! This crate contains pure data operations over an in-memory state:
//! - Appointment booking (public portal) and administration (create, edit, status changes)
//! - The consultation flow that turns a completed appointment into a clinical history entry,
//!   optionally starting a multi-session treatment plan
//! - Catalog maintenance for sedes, services, professionals, treatments and branding
//! - Derived views: month calendar, status board, appointment table, patient search
//!
//! State starts from seed data and is not persisted.
//!
//! **No API concerns**: HTTP servers and command-line parsing belong in `api-rest` and `cli`.

pub mod appointments;
pub mod catalog;
pub mod config;
pub mod constants;
pub mod consultations;
pub mod error;
pub mod ids;
pub mod models;
pub mod seed;
pub mod state;
pub mod summary;
pub mod views;

pub use appointments::{AppointmentEdited, AppointmentInput, BookingRequest};
pub use catalog::{CompanyUpdate, ProfessionalInput, SedeInput, ServiceInput, TreatmentInput};
pub use config::CoreConfig;
pub use consultations::{
    ConsultationInput, ConsultationRecorded, HistoryEntryUpdate, MedicationLine,
    TreatmentSelection,
};
pub use error::{ClinicError, ClinicResult};
pub use ids::{BookingCode, RecordId};
pub use models::{
    Appointment, AppointmentStatus, ClinicalHistoryEntry, Company, Medication, Patient,
    Professional, Sede, Service, Treatment,
};
pub use seed::SeedData;
pub use state::{ClinicState, ClinicStore};
pub use summary::{summarise_best_effort, ConsultationSummariser, SummaryError, SummaryOutcome};
pub use views::{
    AppointmentRow, CalendarCell, CalendarMonth, KanbanColumn, Overview, YearMonth,
};

pub use clinic_types::{NonEmptyText, PhoneNumber, TextError};
