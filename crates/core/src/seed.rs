//! Seed data for a fresh store.
//!
//! The store starts from a YAML document holding the company branding, catalogs, known
//! patients and demo appointments. A copy is embedded in the crate; deployments can point
//! `CLINIC_SEED_FILE` at their own document.
//!
//! Parsing is strict: unknown keys are rejected and schema errors carry the path of the
//! offending field (for example `appointments[1].time`). Cross-references (service, sede,
//! professional and treatment ids) are checked when the seed is turned into a
//! [`ClinicState`](crate::ClinicState).

use crate::constants::EMBEDDED_SEED_YAML;
use crate::error::{ClinicError, ClinicResult};
use crate::models::{Appointment, Company, Patient, Professional, Sede, Service, Treatment};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Parsed contents of a seed document.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SeedData {
    pub company: Company,
    #[serde(default)]
    pub sedes: Vec<Sede>,
    #[serde(default)]
    pub services: Vec<Service>,
    #[serde(default)]
    pub professionals: Vec<Professional>,
    #[serde(default)]
    pub treatments: Vec<Treatment>,
    #[serde(default)]
    pub patients: Vec<Patient>,
    /// Most recent first, the order the appointment list shows.
    #[serde(default)]
    pub appointments: Vec<Appointment>,
}

impl SeedData {
    /// Parse a seed document from YAML text.
    ///
    /// # Errors
    ///
    /// Returns [`ClinicError::SeedParse`] naming the failing path when the YAML does not match
    /// the seed schema.
    pub fn parse(yaml_text: &str) -> ClinicResult<Self> {
        let deserializer = serde_yaml::Deserializer::from_str(yaml_text);

        match serde_path_to_error::deserialize::<_, SeedData>(deserializer) {
            Ok(parsed) => Ok(parsed),
            Err(err) => {
                let path = err.path().to_string();
                let source = err.into_inner();
                let path = if path.is_empty() || path == "." {
                    "<root>"
                } else {
                    path.as_str()
                };
                Err(ClinicError::SeedParse(format!(
                    "seed schema mismatch at {path}: {source}"
                )))
            }
        }
    }

    /// The seed compiled into the crate.
    pub fn embedded() -> ClinicResult<Self> {
        Self::parse(EMBEDDED_SEED_YAML)
    }

    /// Read and parse a seed document from disk.
    pub fn from_file(path: &Path) -> ClinicResult<Self> {
        let text = std::fs::read_to_string(path).map_err(ClinicError::FileRead)?;
        Self::parse(&text)
    }

    /// Load `path` when given, otherwise the embedded seed.
    pub fn load(path: Option<&Path>) -> ClinicResult<Self> {
        match path {
            Some(path) => {
                tracing::info!("loading seed data from {}", path.display());
                Self::from_file(path)
            }
            None => Self::embedded(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn embedded_seed_parses() {
        let seed = SeedData::embedded().expect("embedded seed is valid");
        assert_eq!(seed.company.name.as_str(), "Bee Podología");
        assert_eq!(seed.appointments.len(), 2);
        assert_eq!(seed.appointments[0].booking_code.as_str(), "RGB100");
        assert!(seed
            .patients
            .iter()
            .any(|p| p.name.as_str() == "Ana Maria Beltran"));
    }

    #[test]
    fn unknown_keys_are_rejected_with_path() {
        let input = r##"company:
  id: c1
  name: Test Clinic
  primaryColor: "#000"
  secondaryColor: "#fff"
  slogan: not a field
"##;
        let err = SeedData::parse(input).expect_err("unknown key");
        match err {
            ClinicError::SeedParse(msg) => {
                assert!(msg.contains("company"), "{msg}");
                assert!(msg.contains("slogan"), "{msg}");
            }
            other => panic!("expected SeedParse error, got {other:?}"),
        }
    }

    #[test]
    fn bad_time_reports_field_path() {
        let input = r##"company:
  id: c1
  name: Test Clinic
  primaryColor: "#000"
  secondaryColor: "#fff"
appointments:
  - id: a1
    patientName: Roberto
    patientPhone: "987654321"
    serviceId: s1
    sedeId: sd1
    date: 2025-05-20
    time: "noon"
    status: PENDING
    bookingCode: ABC123
"##;
        let err = SeedData::parse(input).expect_err("bad time");
        match err {
            ClinicError::SeedParse(msg) => assert!(msg.contains("appointments[0].time"), "{msg}"),
            other => panic!("expected SeedParse error, got {other:?}"),
        }
    }

    #[test]
    fn load_reads_seed_file() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        write!(
            file,
            "company:\n  id: c9\n  name: Clinica Norte\n  primaryColor: \"#111\"\n  secondaryColor: \"#222\"\n"
        )
        .expect("write seed");

        let seed = SeedData::load(Some(file.path())).expect("load seed file");
        assert_eq!(seed.company.name.as_str(), "Clinica Norte");
        assert!(seed.appointments.is_empty());
    }

    #[test]
    fn load_missing_file_is_file_read_error() {
        let err = SeedData::load(Some(Path::new("/definitely/not/here.yaml")))
            .expect_err("missing file");
        assert!(matches!(err, ClinicError::FileRead(_)));
    }
}
