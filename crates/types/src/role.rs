use std::fmt;
use std::str::FromStr;

/// Error type for role parsing.
#[derive(Debug, thiserror::Error)]
pub enum RoleError {
    #[error("unknown role '{0}' (expected 'patient' or 'doctor')")]
    Unknown(String),
}

/// The two party roles in the system.
///
/// This enum is deliberately *closed*: everything role-dependent (allowed
/// views, dashboard queries, delivery direction) dispatches on it rather than
/// on free-form strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Patient,
    Doctor,
}

impl Role {
    /// Returns a human-readable name for this role.
    pub fn display_name(&self) -> &'static str {
        match self {
            Role::Patient => "patient",
            Role::Doctor => "doctor",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for Role {
    type Err = RoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "patient" => Ok(Role::Patient),
            "doctor" => Ok(Role::Doctor),
            other => Err(RoleError::Unknown(other.to_owned())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_case_insensitively() {
        assert_eq!("Patient".parse::<Role>().unwrap(), Role::Patient);
        assert_eq!(" DOCTOR ".parse::<Role>().unwrap(), Role::Doctor);
    }

    #[test]
    fn rejects_unknown_roles() {
        assert!(matches!(
            "admin".parse::<Role>(),
            Err(RoleError::Unknown(_))
        ));
    }
}
