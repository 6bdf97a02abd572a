//! Specialist roster
//!
//! The roster is the configured set of specialists that may sit on the
//! panel. It is the only place where free text becomes a [`SpecialistName`]:
//! directive arguments are resolved here into a closed [`RoleRef`] so that
//! unknown names are an explicit outcome instead of a dangling string.

use crate::core::error::DomainError;
use crate::core::role::ASSISTANT_PREFIX;
use serde::{Deserialize, Deserializer, Serialize};

/// Normalized name of a specialist (`software-engineer`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct SpecialistName(String);

impl SpecialistName {
    /// Build a name from persisted data without roster validation.
    pub(crate) fn from_persisted(raw: &str) -> Self {
        Self(normalize_role_name(raw))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Title-cased form for display (`Software Engineer`)
    pub fn display_name(&self) -> String {
        self.0
            .split('-')
            .filter(|part| !part.is_empty())
            .map(|part| {
                let mut chars = part.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                    None => String::new(),
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl std::fmt::Display for SpecialistName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl<'de> Deserialize<'de> for SpecialistName {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(Self::from_persisted(&s))
    }
}

/// Canonical form of a role name as typed by a model or a human.
///
/// Strips surrounding braces and trailing punctuation, lower-cases, joins
/// words with `-`, and drops an `assistant-` prefix.
pub fn normalize_role_name(raw: &str) -> String {
    let trimmed = raw
        .trim()
        .trim_start_matches('{')
        .trim_end_matches('}')
        .trim()
        .trim_end_matches(['.', ',', ';', ':', '!'])
        .trim();

    let joined = trimmed
        .split(|c: char| c.is_whitespace() || c == '_' || c == '-')
        .filter(|part| !part.is_empty())
        .map(|part| part.to_lowercase())
        .collect::<Vec<_>>()
        .join("-");

    match joined.strip_prefix(ASSISTANT_PREFIX) {
        Some(rest) if !rest.is_empty() => rest.to_string(),
        _ => joined,
    }
}

/// Outcome of resolving a role name against the roster
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoleRef {
    Known(SpecialistName),
    /// Not on the roster; carries the normalized text for notices
    Unknown(String),
}

impl RoleRef {
    pub fn known(&self) -> Option<&SpecialistName> {
        match self {
            RoleRef::Known(name) => Some(name),
            RoleRef::Unknown(_) => None,
        }
    }
}

/// A panel member and what they are good at
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Specialist {
    pub name: SpecialistName,
    pub specialty: String,
}

/// The configured set of specialists
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Roster {
    specialists: Vec<Specialist>,
}

impl Roster {
    /// Build a roster from `(name, specialty)` pairs.
    ///
    /// Names are normalized; empty or duplicate names are rejected, as are
    /// names that collide with the built-in roles.
    pub fn new<N, S>(entries: impl IntoIterator<Item = (N, S)>) -> Result<Self, DomainError>
    where
        N: AsRef<str>,
        S: Into<String>,
    {
        let mut specialists: Vec<Specialist> = Vec::new();

        for (raw_name, specialty) in entries {
            let normalized = normalize_role_name(raw_name.as_ref());
            if normalized.is_empty() {
                return Err(DomainError::InvalidRoster(
                    "specialist name cannot be empty".to_string(),
                ));
            }
            if matches!(normalized.as_str(), "user" | "moderator" | "context") {
                return Err(DomainError::InvalidRoster(format!(
                    "'{}' is reserved for a built-in role",
                    normalized
                )));
            }
            if specialists.iter().any(|s| s.name.as_str() == normalized) {
                return Err(DomainError::InvalidRoster(format!(
                    "duplicate specialist '{}'",
                    normalized
                )));
            }
            specialists.push(Specialist {
                name: SpecialistName(normalized),
                specialty: specialty.into(),
            });
        }

        Ok(Self { specialists })
    }

    /// Resolve free text (a directive argument) to a roster member.
    pub fn resolve(&self, raw: &str) -> RoleRef {
        let normalized = normalize_role_name(raw);
        match self.specialists.iter().find(|s| s.name.0 == normalized) {
            Some(specialist) => RoleRef::Known(specialist.name.clone()),
            None => RoleRef::Unknown(normalized),
        }
    }

    pub fn contains(&self, name: &SpecialistName) -> bool {
        self.specialists.iter().any(|s| &s.name == name)
    }

    pub fn get(&self, name: &SpecialistName) -> Option<&Specialist> {
        self.specialists.iter().find(|s| &s.name == name)
    }

    pub fn specialists(&self) -> &[Specialist] {
        &self.specialists
    }

    pub fn names(&self) -> impl Iterator<Item = &SpecialistName> {
        self.specialists.iter().map(|s| &s.name)
    }

    pub fn len(&self) -> usize {
        self.specialists.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specialists.is_empty()
    }
}

impl Default for Roster {
    fn default() -> Self {
        let entries = [
            (
                "planner",
                "Breaks goals into milestones, sequences work and tracks dependencies.",
            ),
            (
                "researcher",
                "Gathers background, prior art and data relevant to the question.",
            ),
            (
                "software-engineer",
                "Designs and reviews software architecture, code and tooling.",
            ),
            (
                "mike",
                "Pragmatic generalist who challenges assumptions and keeps answers grounded.",
            ),
            (
                "academician",
                "Brings theoretical depth, citations and rigorous argumentation.",
            ),
            (
                "industrial-engineer",
                "Optimizes processes, capacity, cost and operational workflows.",
            ),
        ];
        Self {
            specialists: entries
                .into_iter()
                .map(|(name, specialty)| Specialist {
                    name: SpecialistName(name.to_string()),
                    specialty: specialty.to_string(),
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_role_name() {
        assert_eq!(normalize_role_name("  Researcher "), "researcher");
        assert_eq!(normalize_role_name("{Planner}"), "planner");
        assert_eq!(normalize_role_name("Software Engineer."), "software-engineer");
        assert_eq!(normalize_role_name("software_engineer"), "software-engineer");
        assert_eq!(normalize_role_name("assistant-mike"), "mike");
        assert_eq!(normalize_role_name(""), "");
    }

    #[test]
    fn test_resolve_known_and_unknown() {
        let roster = Roster::default();
        assert_eq!(
            roster.resolve("{Software Engineer}").known().map(|n| n.as_str()),
            Some("software-engineer")
        );
        assert_eq!(
            roster.resolve("Gardener"),
            RoleRef::Unknown("gardener".to_string())
        );
    }

    #[test]
    fn test_new_rejects_duplicates_and_reserved() {
        assert!(Roster::new([("planner", "a"), ("Planner", "b")]).is_err());
        assert!(Roster::new([("moderator", "a")]).is_err());
        assert!(Roster::new([("  ", "a")]).is_err());

        let roster = Roster::new([("Data Scientist", "stats")]).unwrap();
        assert_eq!(roster.len(), 1);
        assert!(roster.resolve("data scientist").known().is_some());
    }

    #[test]
    fn test_display_name() {
        let roster = Roster::default();
        let name = roster.resolve("industrial-engineer");
        assert_eq!(name.known().unwrap().display_name(), "Industrial Engineer");
    }

    #[test]
    fn test_default_roster_contents() {
        let roster = Roster::default();
        let names: Vec<_> = roster.names().map(|n| n.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "planner",
                "researcher",
                "software-engineer",
                "mike",
                "academician",
                "industrial-engineer"
            ]
        );
    }
}
