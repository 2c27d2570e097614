//! Core runtime configuration.
//!
//! This module defines configuration that should be resolved once at process startup and then
//! passed into the store. Environment variables are read by the binaries only; request handling
//! never consults the process environment.

use crate::constants::{DEFAULT_BOOKING_SLOTS, DEFAULT_COUNTRY_CODE};
use crate::error::{ClinicError, ClinicResult};
use chrono::NaiveTime;
use std::path::{Path, PathBuf};

/// Core configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct CoreConfig {
    default_country_code: String,
    booking_slots: Vec<NaiveTime>,
    seed_file: Option<PathBuf>,
}

impl CoreConfig {
    /// Create a new `CoreConfig`.
    ///
    /// # Errors
    ///
    /// Returns [`ClinicError::InvalidInput`] if the country code is not `+` followed by 1-4
    /// digits, or if no booking slots are given.
    pub fn new(
        default_country_code: String,
        booking_slots: Vec<NaiveTime>,
        seed_file: Option<PathBuf>,
    ) -> ClinicResult<Self> {
        validate_country_code(&default_country_code)?;

        if booking_slots.is_empty() {
            return Err(ClinicError::InvalidInput(
                "at least one booking slot is required".into(),
            ));
        }

        let mut booking_slots = booking_slots;
        booking_slots.sort();
        booking_slots.dedup();

        Ok(Self {
            default_country_code,
            booking_slots,
            seed_file,
        })
    }

    pub fn default_country_code(&self) -> &str {
        &self.default_country_code
    }

    pub fn booking_slots(&self) -> &[NaiveTime] {
        &self.booking_slots
    }

    /// True when `time` is one of the slots offered to the public.
    pub fn offers_slot(&self, time: NaiveTime) -> bool {
        self.booking_slots.binary_search(&time).is_ok()
    }

    pub fn seed_file(&self) -> Option<&Path> {
        self.seed_file.as_deref()
    }
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            default_country_code: DEFAULT_COUNTRY_CODE.to_string(),
            booking_slots: DEFAULT_BOOKING_SLOTS
                .iter()
                .filter_map(|s| NaiveTime::parse_from_str(s, "%H:%M").ok())
                .collect(),
            seed_file: None,
        }
    }
}

pub(crate) fn validate_country_code(code: &str) -> ClinicResult<()> {
    let digits = code.strip_prefix('+').unwrap_or("");
    if digits.is_empty() || digits.len() > 4 || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ClinicError::InvalidInput(format!(
            "country code must be '+' followed by 1-4 digits, got: '{}'",
            code
        )));
    }
    Ok(())
}

/// Parse the default country code from an optional string value.
///
/// If `value` is `None` or empty/whitespace, returns [`DEFAULT_COUNTRY_CODE`].
pub fn country_code_from_env_value(value: Option<String>) -> ClinicResult<String> {
    let value = value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty());

    match value {
        Some(code) => {
            validate_country_code(&code)?;
            Ok(code)
        }
        None => Ok(DEFAULT_COUNTRY_CODE.to_string()),
    }
}

/// Parse the booking slots from an optional comma-separated `HH:MM` list.
///
/// If `value` is `None` or empty/whitespace, returns the default portal slots.
pub fn booking_slots_from_env_value(value: Option<String>) -> ClinicResult<Vec<NaiveTime>> {
    let value = value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty());

    let Some(value) = value else {
        return Ok(CoreConfig::default().booking_slots);
    };

    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            NaiveTime::parse_from_str(s, "%H:%M").map_err(|e| {
                ClinicError::InvalidInput(format!("invalid booking slot '{}': {}", s, e))
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(s: &str) -> NaiveTime {
        NaiveTime::parse_from_str(s, "%H:%M").expect("valid time")
    }

    #[test]
    fn default_config_offers_portal_slots() {
        let cfg = CoreConfig::default();
        assert_eq!(cfg.default_country_code(), "+51");
        assert_eq!(cfg.booking_slots().len(), DEFAULT_BOOKING_SLOTS.len());
        assert!(cfg.offers_slot(t("10:00")));
        assert!(!cfg.offers_slot(t("12:00")));
    }

    #[test]
    fn new_rejects_bad_country_code() {
        for code in ["51", "+", "+12345", "+5a"] {
            let err = CoreConfig::new(code.into(), vec![t("09:00")], None)
                .expect_err("should reject");
            assert!(matches!(err, ClinicError::InvalidInput(_)), "{code}");
        }
    }

    #[test]
    fn new_rejects_empty_slots() {
        let err = CoreConfig::new("+51".into(), vec![], None).expect_err("should reject");
        assert!(matches!(err, ClinicError::InvalidInput(_)));
    }

    #[test]
    fn new_sorts_and_dedups_slots() {
        let cfg = CoreConfig::new(
            "+34".into(),
            vec![t("15:00"), t("09:00"), t("15:00")],
            None,
        )
        .expect("valid");
        assert_eq!(cfg.booking_slots(), &[t("09:00"), t("15:00")]);
    }

    #[test]
    fn country_code_env_value_defaults_when_blank() {
        assert_eq!(country_code_from_env_value(None).expect("ok"), "+51");
        assert_eq!(
            country_code_from_env_value(Some("  ".into())).expect("ok"),
            "+51"
        );
        assert_eq!(
            country_code_from_env_value(Some(" +57 ".into())).expect("ok"),
            "+57"
        );
        assert!(country_code_from_env_value(Some("57".into())).is_err());
    }

    #[test]
    fn booking_slots_env_value_parses_list() {
        let slots =
            booking_slots_from_env_value(Some("08:00, 08:30,".into())).expect("valid list");
        assert_eq!(slots, vec![t("08:00"), t("08:30")]);

        let err = booking_slots_from_env_value(Some("8am".into())).expect_err("invalid");
        assert!(err.to_string().contains("8am"));

        let defaults = booking_slots_from_env_value(None).expect("defaults");
        assert_eq!(defaults.len(), DEFAULT_BOOKING_SLOTS.len());
    }
}
