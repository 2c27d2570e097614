//! Constants used throughout the clinic core crate.

/// Country code prepended to phone numbers submitted through the booking portal when the
/// caller does not pick one.
pub const DEFAULT_COUNTRY_CODE: &str = "+51";

/// Time slots offered by the public booking portal, as `HH:MM`.
pub const DEFAULT_BOOKING_SLOTS: &[&str] = &[
    "09:00", "09:30", "10:00", "10:30", "11:00", "11:30", "15:00", "15:30", "16:00", "16:30",
];

/// Length of a generated booking code.
pub const BOOKING_CODE_LEN: usize = 6;

/// Alphabet booking codes are drawn from.
pub const BOOKING_CODE_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// How many times a colliding booking code is redrawn before giving up.
pub const BOOKING_CODE_MAX_ATTEMPTS: usize = 5;

/// Text shown in place of a consultation summary when the summariser fails.
pub const SUMMARY_PLACEHOLDER: &str = "Error generating summary.";

/// Cells in a month calendar grid (six weeks of seven days).
pub const CALENDAR_CELLS: usize = 42;

/// Years a calendar month may fall in.
pub const CALENDAR_YEARS: std::ops::RangeInclusive<i32> = 1..=9999;

/// Seed data compiled into the binary, used when no seed file is configured.
pub const EMBEDDED_SEED_YAML: &str = include_str!("../seed/clinic.yaml");
