//! Record identifiers and booking codes.
//!
//! Identifiers generated by the store use the canonical UUID form: **32 lowercase hexadecimal
//! characters** (no hyphens), the same value as `Uuid::new_v4().simple().to_string()`.
//! Identifiers loaded from seed data (`s1`, `sd1`, `demo-1`, ...) are accepted as any non-empty
//! string without surrounding whitespace, so catalog references stay human-readable.
//!
//! Booking codes are short, human-readable confirmation codes shown to the patient. They are
//! drawn from a non-cryptographic RNG and are only unique within one store, which redraws a
//! code that collides with one already issued (see [`BookingCode::allocate`]).

use crate::constants::{BOOKING_CODE_ALPHABET, BOOKING_CODE_LEN, BOOKING_CODE_MAX_ATTEMPTS};
use crate::error::{ClinicError, ClinicResult};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use uuid::Uuid;

/// Identifier of any stored record (appointment, patient, entry, catalog item).
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    /// Generates a fresh identifier in canonical UUID form.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().simple().to_string())
    }

    /// Validates an externally supplied identifier.
    ///
    /// # Errors
    ///
    /// Returns [`ClinicError::InvalidInput`] if `input` is empty or has leading/trailing
    /// whitespace.
    pub fn parse(input: &str) -> ClinicResult<Self> {
        if input.is_empty() || input.trim() != input {
            return Err(ClinicError::InvalidInput(format!(
                "identifier must be non-empty without surrounding whitespace, got: '{}'",
                input
            )));
        }
        Ok(Self(input.to_owned()))
    }

    /// Returns true if `input` is in canonical generated form.
    pub fn is_canonical(input: &str) -> bool {
        input.len() == 32
            && input
                .bytes()
                .all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for RecordId {
    type Err = ClinicError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl<'de> Deserialize<'de> for RecordId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        RecordId::parse(&s).map_err(serde::de::Error::custom)
    }
}

/// A six-character uppercase alphanumeric booking confirmation code.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(transparent)]
pub struct BookingCode(String);

impl BookingCode {
    /// Draws a random code.
    pub fn random() -> Self {
        let mut rng = rand::thread_rng();
        Self::random_with(&mut rng)
    }

    /// Draws a random code from the supplied RNG.
    pub fn random_with<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let code = (0..BOOKING_CODE_LEN)
            .map(|_| {
                let idx = rng.gen_range(0..BOOKING_CODE_ALPHABET.len());
                BOOKING_CODE_ALPHABET[idx] as char
            })
            .collect();
        Self(code)
    }

    /// Draws codes from `code_source` until one is not `taken`.
    ///
    /// Guards against pathological collisions by limiting attempts.
    ///
    /// # Errors
    ///
    /// Returns [`ClinicError::BookingCodeExhausted`] if every attempt collided.
    pub fn allocate(
        mut code_source: impl FnMut() -> BookingCode,
        taken: impl Fn(&BookingCode) -> bool,
    ) -> ClinicResult<Self> {
        for _attempt in 0..BOOKING_CODE_MAX_ATTEMPTS {
            let code = code_source();
            if !taken(&code) {
                return Ok(code);
            }
            tracing::debug!("booking code {} already issued, redrawing", code);
        }
        Err(ClinicError::BookingCodeExhausted(BOOKING_CODE_MAX_ATTEMPTS))
    }

    /// Validates a code supplied from outside (seed data, lookups).
    ///
    /// Seed codes may be any non-empty uppercase alphanumeric string; generated codes are
    /// always [`BOOKING_CODE_LEN`] characters.
    pub fn parse(input: &str) -> ClinicResult<Self> {
        if input.is_empty()
            || !input
                .bytes()
                .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit())
        {
            return Err(ClinicError::InvalidInput(format!(
                "booking code must be uppercase alphanumeric, got: '{}'",
                input
            )));
        }
        Ok(Self(input.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BookingCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for BookingCode {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        BookingCode::parse(&s).map_err(serde::de::Error::custom)
    }
}
