// 🧾 CNPJ - Brazilian company tax identifier
// 14 digits: 8 base + 4 branch + 2 modulo-11 check digits
//
// "11.222.333/0001-81", "11222333000181", " 11 222 333 0001 81 " → same CNPJ
// Punctuation, spaces and stray letters are stripped before any digit math.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::mask::mask_cnpj;

/// Number of digits in a complete CNPJ
pub const CNPJ_LENGTH: usize = 14;

// ============================================================================
// VALIDATION ERROR
// ============================================================================

/// Why a CNPJ was rejected.
///
/// The Display text is the message shown to the user next to the form field.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CnpjError {
    /// After stripping non-digits the value is not 14 digits long
    #[error("O CNPJ deve ter 14 dígitos")]
    WrongLength,

    /// Repeated digits or a check digit mismatch
    #[error("CNPJ inválido")]
    Invalid,
}

// ============================================================================
// CHECKSUM VALIDATOR
// ============================================================================

/// Remove every character that is not an ASCII digit.
pub fn strip_non_digits(input: &str) -> String {
    input.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Validate a CNPJ, tolerating any punctuation around the digits.
///
/// Example:
/// - validate_cnpj("11.222.333/0001-81") = Ok(())
/// - validate_cnpj("1122233300") = Err(CnpjError::WrongLength)
/// - validate_cnpj("11111111111111") = Err(CnpjError::Invalid)
pub fn validate_cnpj(input: &str) -> Result<(), CnpjError> {
    let digits = to_digit_values(&strip_non_digits(input));

    if digits.len() != CNPJ_LENGTH {
        return Err(CnpjError::WrongLength);
    }

    if digits.iter().all(|d| *d == digits[0]) {
        return Err(CnpjError::Invalid);
    }

    if check_digit(&digits[..12]) != digits[12] {
        return Err(CnpjError::Invalid);
    }

    if check_digit(&digits[..13]) != digits[13] {
        return Err(CnpjError::Invalid);
    }

    Ok(())
}

/// Compute the two check digits for a 12-digit base.
///
/// Returns None unless `base` holds exactly 12 digits (punctuation allowed).
pub fn check_digits(base: &str) -> Option<String> {
    let mut digits = to_digit_values(&strip_non_digits(base));
    if digits.len() != 12 {
        return None;
    }

    let first = check_digit(&digits);
    digits.push(first);
    let second = check_digit(&digits);

    Some(format!("{}{}", first, second))
}

/// Weighted modulo-11 check digit over `digits`.
///
/// Weights run from `len - 7` down to 2, then wrap to 9 and keep descending.
/// For 12 digits that is 5,4,3,2,9,8,7,6,5,4,3,2.
fn check_digit(digits: &[u8]) -> u8 {
    let mut pos = digits.len() as u32 - 7;
    let mut sum: u32 = 0;

    for digit in digits {
        sum += *digit as u32 * pos;
        pos -= 1;
        if pos < 2 {
            pos = 9;
        }
    }

    let remainder = sum % 11;
    if remainder < 2 {
        0
    } else {
        (11 - remainder) as u8
    }
}

fn to_digit_values(digits: &str) -> Vec<u8> {
    digits.bytes().map(|b| b - b'0').collect()
}

// ============================================================================
// CNPJ NEWTYPE
// ============================================================================

/// A CNPJ that passed checksum validation.
///
/// Stored in canonical 14-digit form; displayed masked.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Cnpj(String);

impl Cnpj {
    /// Create a CNPJ from masked or raw input.
    pub fn new(value: impl AsRef<str>) -> Result<Self, CnpjError> {
        let value = value.as_ref();
        validate_cnpj(value)?;
        Ok(Self(strip_non_digits(value)))
    }

    /// Canonical 14-digit form (no punctuation).
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Display form: XX.XXX.XXX/XXXX-XX
    pub fn formatted(&self) -> String {
        mask_cnpj(&self.0)
    }

    /// Base (company) part: first 8 digits
    pub fn base(&self) -> &str {
        &self.0[..8]
    }

    /// Branch number: digits 9-12 ("0001" is the headquarters)
    pub fn branch(&self) -> &str {
        &self.0[8..12]
    }

    pub fn is_headquarters(&self) -> bool {
        self.branch() == "0001"
    }
}

impl std::fmt::Display for Cnpj {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.formatted())
    }
}

impl std::str::FromStr for Cnpj {
    type Err = CnpjError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

// Invalid values are rejected at deserialization time, not silently accepted.
impl<'de> Deserialize<'de> for Cnpj {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Self::new(raw).map_err(serde::de::Error::custom)
    }
}

// ============================================================================
// TESTS
// ============================================================================
