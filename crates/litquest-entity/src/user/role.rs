//! User role enumeration.

use serde::{Deserialize, Serialize};

/// Role carried in the verified credential. This service does not issue
/// credentials; it only consumes the role for auditing and display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    /// A learner.
    Student,
    /// A teacher managing classrooms and content.
    Teacher,
    /// Platform administrator.
    Admin,
}

impl UserRole {
    /// Return the role as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Student => "student",
            Self::Teacher => "teacher",
            Self::Admin => "admin",
        }
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "student" => Ok(Self::Student),
            "teacher" => Ok(Self::Teacher),
            "admin" => Ok(Self::Admin),
            other => Err(format!("Unknown role: '{other}'")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_str() {
        assert_eq!("admin".parse::<UserRole>().unwrap(), UserRole::Admin);
        assert_eq!("STUDENT".parse::<UserRole>().unwrap(), UserRole::Student);
        assert!("invalid".parse::<UserRole>().is_err());
    }
}
