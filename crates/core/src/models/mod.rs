//! Data model of the clinic store.
//!
//! All records serialise as camelCase JSON/YAML. Dates use `YYYY-MM-DD`; appointment times use
//! `HH:MM`.

pub mod appointment;
pub mod catalog;
pub mod patient;

pub use appointment::{Appointment, AppointmentStatus};
pub use catalog::{Company, Professional, Sede, Service, Treatment};
pub use patient::{ClinicalHistoryEntry, Medication, Patient};

/// `HH:MM` serde representation for [`chrono::NaiveTime`].
///
/// chrono's default representation carries seconds, which the booking surfaces never use.
pub(crate) mod serde_hhmm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%H:%M";

    pub fn serialize<S>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&time.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        NaiveTime::parse_from_str(s.trim(), FORMAT).map_err(|e| {
            serde::de::Error::custom(format!("expected HH:MM time, got '{}': {}", s, e))
        })
    }
}
