//! Validated text primitives shared by the clinic crates.
//!
//! Values of these types are checked once at construction (or deserialisation), so code that
//! holds one can rely on the invariant without re-validating.

/// Errors that can occur when creating validated text types.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TextError {
    /// The input text was empty or contained only whitespace
    #[error("Text cannot be empty")]
    Empty,
    /// The input did not contain a single digit
    #[error("Phone number must contain at least one digit: '{0}'")]
    PhoneWithoutDigits(String),
    /// The input contained characters that never appear in a dialable number
    #[error("Phone number contains invalid characters: '{0}'")]
    PhoneInvalidCharacters(String),
}

/// A string type that guarantees non-empty content.
///
/// This type wraps a `String` and ensures it contains at least one non-whitespace character.
/// The input is automatically trimmed of leading and trailing whitespace during construction.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct NonEmptyText(String);

impl NonEmptyText {
    /// Creates a new `NonEmptyText` from the given input.
    ///
    /// The input is trimmed of leading and trailing whitespace. If the trimmed
    /// result is empty, an error is returned.
    pub fn new(input: impl AsRef<str>) -> Result<Self, TextError> {
        let trimmed = input.as_ref().trim();
        if trimmed.is_empty() {
            return Err(TextError::Empty);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the inner string as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for NonEmptyText {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for NonEmptyText {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::str::FromStr for NonEmptyText {
    type Err = TextError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl serde::Serialize for NonEmptyText {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> serde::Deserialize<'de> for NonEmptyText {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        NonEmptyText::new(&s).map_err(serde::de::Error::custom)
    }
}

/// A contact phone number as the patient typed it.
///
/// The display form is kept (trimmed) so a number like `+51 987 654 321` renders the way it was
/// entered. Comparisons between numbers go through [`PhoneNumber::digits`], which drops the
/// formatting characters.
///
/// Accepted characters are digits, spaces, `+`, `-`, `.`, `(` and `)`; at least one digit is
/// required.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct PhoneNumber(String);

impl PhoneNumber {
    /// Validates and wraps a phone number.
    pub fn new(input: impl AsRef<str>) -> Result<Self, TextError> {
        let trimmed = input.as_ref().trim();
        if trimmed.is_empty() {
            return Err(TextError::Empty);
        }
        if !trimmed
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, ' ' | '+' | '-' | '.' | '(' | ')'))
        {
            return Err(TextError::PhoneInvalidCharacters(trimmed.to_owned()));
        }
        if !trimmed.chars().any(|c| c.is_ascii_digit()) {
            return Err(TextError::PhoneWithoutDigits(trimmed.to_owned()));
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Builds `"<country_code> <number>"`, the form the booking portal stores.
    pub fn with_country_code(country_code: &str, number: &str) -> Result<Self, TextError> {
        let country_code = country_code.trim();
        if country_code.is_empty() {
            return Self::new(number);
        }
        Self::new(format!("{} {}", country_code, number.trim()))
    }

    /// Returns the number as entered.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns only the ASCII digits of the number.
    pub fn digits(&self) -> String {
        self.0.chars().filter(|c| c.is_ascii_digit()).collect()
    }

    /// Splits off a leading `+<code>` written apart from the rest of the number, as in
    /// `+51 987654321` or `+51-987-654-321`. Returns the country code digits and the digits of
    /// the national number.
    ///
    /// Numbers without a separated country code return `None` and all of their digits.
    pub fn country_and_national(&self) -> (Option<&str>, String) {
        let split = self.0.strip_prefix('+').and_then(|rest| {
            let code_len = rest.find(|c: char| !c.is_ascii_digit())?;
            let (code, national) = rest.split_at(code_len);
            let national: String = national.chars().filter(|c| c.is_ascii_digit()).collect();
            ((1..=4).contains(&code.len()) && !national.is_empty()).then_some((code, national))
        });
        match split {
            Some((code, national)) => (Some(code), national),
            None => (None, self.digits()),
        }
    }

    /// True when both numbers reach the same line.
    ///
    /// Formatting is ignored. A country code on one side only is ignored too, so
    /// `+51 987 654 321` matches `987654321`; two different country codes never match.
    pub fn same_number(&self, other: &PhoneNumber) -> bool {
        if self.digits() == other.digits() {
            return true;
        }
        let (own_code, own_national) = self.country_and_national();
        let (other_code, other_national) = other.country_and_national();
        let codes_agree = match (own_code, other_code) {
            (Some(a), Some(b)) => a == b,
            _ => true,
        };
        codes_agree && own_national == other_national
    }
}

impl std::fmt::Display for PhoneNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for PhoneNumber {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::str::FromStr for PhoneNumber {
    type Err = TextError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl serde::Serialize for PhoneNumber {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> serde::Deserialize<'de> for PhoneNumber {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        PhoneNumber::new(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_empty_text_trims_input() {
        let text = NonEmptyText::new("  Ana Maria  ").expect("valid text");
        assert_eq!(text.as_str(), "Ana Maria");
    }

    #[test]
    fn non_empty_text_rejects_whitespace() {
        assert_eq!(NonEmptyText::new("   \t"), Err(TextError::Empty));
    }

    #[test]
    fn non_empty_text_deserialize_rejects_empty() {
        let err = serde_json::from_str::<NonEmptyText>("\"  \"").expect_err("should reject");
        assert!(err.to_string().contains("empty"));
    }

    #[test]
    fn phone_keeps_display_form_and_exposes_digits() {
        let phone = PhoneNumber::new(" +51 987-654-321 ").expect("valid phone");
        assert_eq!(phone.as_str(), "+51 987-654-321");
        assert_eq!(phone.digits(), "51987654321");
    }

    #[test]
    fn phone_rejects_letters() {
        let err = PhoneNumber::new("98765abc").expect_err("should reject letters");
        assert!(matches!(err, TextError::PhoneInvalidCharacters(_)));
    }

    #[test]
    fn phone_requires_a_digit() {
        let err = PhoneNumber::new("+ ()").expect_err("should reject");
        assert!(matches!(err, TextError::PhoneWithoutDigits(_)));
    }

    #[test]
    fn phone_with_country_code_joins_with_space() {
        let phone = PhoneNumber::with_country_code("+51", "987654321").expect("valid");
        assert_eq!(phone.as_str(), "+51 987654321");

        let bare = PhoneNumber::with_country_code("", "987654321").expect("valid");
        assert_eq!(bare.as_str(), "987654321");
    }

    #[test]
    fn same_number_ignores_formatting() {
        let a = PhoneNumber::new("955 443 322").expect("valid");
        let b = PhoneNumber::new("955-443-322").expect("valid");
        let c = PhoneNumber::new("955443323").expect("valid");
        assert!(a.same_number(&b));
        assert!(!a.same_number(&c));
    }

    #[test]
    fn same_number_ignores_a_one_sided_country_code() {
        let local = PhoneNumber::new("987654321").expect("valid");
        let portal = PhoneNumber::with_country_code("+51", "987654321").expect("valid");
        let dashed = PhoneNumber::new("+51-987-654-321").expect("valid");
        let abroad = PhoneNumber::new("+1 987654321").expect("valid");

        assert!(local.same_number(&portal));
        assert!(portal.same_number(&local));
        assert!(dashed.same_number(&portal));
        assert!(local.same_number(&abroad));
        assert!(!portal.same_number(&abroad));
    }

    #[test]
    fn country_and_national_needs_a_separated_code() {
        let portal = PhoneNumber::new("+51 987 654 321").expect("valid");
        assert_eq!(
            portal.country_and_national(),
            (Some("51"), "987654321".to_string())
        );

        let packed = PhoneNumber::new("+51987654321").expect("valid");
        assert_eq!(packed.country_and_national(), (None, "51987654321".to_string()));

        let local = PhoneNumber::new("955 443 322").expect("valid");
        assert_eq!(local.country_and_national(), (None, "955443322".to_string()));
    }
}
