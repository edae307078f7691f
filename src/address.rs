use std::fmt;

use serde::{Deserialize, Serialize};

/// Postal address owned by exactly one student.
///
/// An address has no identity of its own: it is stored under its student's
/// id and goes away when the student drops or replaces it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub street: String,
    pub number: String,
    #[serde(default)]
    pub complement: Option<String>,
    pub district: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}", self.street, self.number)?;
        if let Some(complement) = &self.complement {
            write!(f, " ({})", complement)?;
        }
        write!(
            f,
            ", {}, {} - {}, {}",
            self.district, self.city, self.state, self.zip_code
        )
    }
}
