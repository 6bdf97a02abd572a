//! Role value object: who authored a message or is being invoked

use crate::roster::SpecialistName;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Prefix used in the wire form of specialist roles (`assistant-planner`).
pub const ASSISTANT_PREFIX: &str = "assistant-";

/// Author of a message in the panel conversation (Value Object)
///
/// Specialists can only be named through a [`SpecialistName`], which is
/// obtained by resolving text against the configured roster.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Role {
    User,
    Moderator,
    Context,
    Assistant(SpecialistName),
}

impl Role {
    /// Wire identifier (`user`, `moderator`, `context`, `assistant-<name>`)
    pub fn wire_name(&self) -> String {
        match self {
            Role::User => "user".to_string(),
            Role::Moderator => "moderator".to_string(),
            Role::Context => "context".to_string(),
            Role::Assistant(name) => format!("{}{}", ASSISTANT_PREFIX, name),
        }
    }

    /// Human-facing label, e.g. `Assistant (Software Engineer)`
    pub fn label(&self) -> String {
        match self {
            Role::User => "User".to_string(),
            Role::Moderator => "Moderator".to_string(),
            Role::Context => "Context Document".to_string(),
            Role::Assistant(name) => format!("Assistant ({})", name.display_name()),
        }
    }

    pub fn specialist(&self) -> Option<&SpecialistName> {
        match self {
            Role::Assistant(name) => Some(name),
            _ => None,
        }
    }

    pub fn is_user(&self) -> bool {
        matches!(self, Role::User)
    }

    pub fn is_moderator(&self) -> bool {
        matches!(self, Role::Moderator)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.wire_name())
    }
}

/// Parsing from the wire form. Persisted transcripts may name specialists
/// that are no longer on the roster, so this does not consult one.
impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Role::User),
            "moderator" => Ok(Role::Moderator),
            "context" => Ok(Role::Context),
            other => match other.strip_prefix(ASSISTANT_PREFIX) {
                Some(name) if !name.is_empty() => {
                    Ok(Role::Assistant(SpecialistName::from_persisted(name)))
                }
                _ => Err(format!("unknown role '{}'", other)),
            },
        }
    }
}

impl Serialize for Role {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.wire_name())
    }
}

impl<'de> Deserialize<'de> for Role {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_names() {
        assert_eq!(Role::User.wire_name(), "user");
        assert_eq!(Role::Moderator.wire_name(), "moderator");
        assert_eq!(Role::Context.wire_name(), "context");
        let planner = Role::Assistant(SpecialistName::from_persisted("planner"));
        assert_eq!(planner.to_string(), "assistant-planner");
    }

    #[test]
    fn test_parse_assistant_role() {
        let role: Role = "assistant-software-engineer".parse().unwrap();
        assert_eq!(
            role.specialist().map(|n| n.as_str()),
            Some("software-engineer")
        );
        assert!("assistant-".parse::<Role>().is_err());
        assert!("robot".parse::<Role>().is_err());
    }

    #[test]
    fn test_labels() {
        let role: Role = "assistant-software-engineer".parse().unwrap();
        assert_eq!(role.label(), "Assistant (Software Engineer)");
        assert_eq!(Role::Context.label(), "Context Document");
    }

    #[test]
    fn test_serde_as_string() {
        let role: Role = "assistant-mike".parse().unwrap();
        let json = serde_json::to_string(&role).unwrap();
        assert_eq!(json, "\"assistant-mike\"");
        let back: Role = serde_json::from_str(&json).unwrap();
        assert_eq!(back, role);
    }
}
