use crate::ids::RecordId;

#[derive(Debug, thiserror::Error)]
pub enum ClinicError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("invalid text: {0}")]
    Text(#[from] clinic_types::TextError),

    #[error("appointment not found: {0}")]
    AppointmentNotFound(RecordId),
    #[error("patient not found: {0}")]
    PatientNotFound(RecordId),
    #[error("clinical history entry not found: {0}")]
    HistoryEntryNotFound(RecordId),

    #[error("unknown service: {0}")]
    UnknownService(RecordId),
    #[error("unknown sede: {0}")]
    UnknownSede(RecordId),
    #[error("unknown professional: {0}")]
    UnknownProfessional(RecordId),
    #[error("unknown treatment: {0}")]
    UnknownTreatment(RecordId),
    #[error("duplicate identifier: {0}")]
    DuplicateId(RecordId),

    #[error("appointment {0} is not awaiting a consultation record")]
    ConsultationNotPending(RecordId),
    #[error("time slot {0} is not offered for online booking")]
    UnavailableTimeSlot(String),
    #[error("failed to allocate a unique booking code after {0} attempts")]
    BookingCodeExhausted(usize),

    #[error("failed to parse seed data: {0}")]
    SeedParse(String),
    #[error("failed to read seed file: {0}")]
    FileRead(std::io::Error),
}

pub type ClinicResult<T> = std::result::Result<T, ClinicError>;

impl ClinicError {
    /// True for errors caused by a reference to a record that does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            ClinicError::AppointmentNotFound(_)
                | ClinicError::PatientNotFound(_)
                | ClinicError::HistoryEntryNotFound(_)
        )
    }

    /// True for errors caused by the caller's input rather than by the process.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            ClinicError::InvalidInput(_)
                | ClinicError::Text(_)
                | ClinicError::UnknownService(_)
                | ClinicError::UnknownSede(_)
                | ClinicError::UnknownProfessional(_)
                | ClinicError::UnknownTreatment(_)
                | ClinicError::UnavailableTimeSlot(_)
        )
    }
}
