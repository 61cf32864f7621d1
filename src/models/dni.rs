use std::fmt;

use crate::validation::ValidationError;

pub const DNI_LENGTH: usize = 8;

/// National identity document number, exactly eight ASCII digits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dni(String);

impl Dni {
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        if input.chars().count() != DNI_LENGTH {
            return Err(ValidationError::DniLength);
        }
        if !input.chars().all(|c| c.is_ascii_digit()) {
            return Err(ValidationError::DniNotNumeric);
        }
        Ok(Self(input.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Dni {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
