//! Roster configuration from TOML (`[roster]` section)

use roundtable_domain::{DomainError, Roster};
use serde::{Deserialize, Serialize};

/// One `[[roster.specialists]]` entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileSpecialistConfig {
    pub name: String,
    #[serde(default)]
    pub specialty: String,
}

/// Raw roster configuration from TOML
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileRosterConfig {
    pub specialists: Vec<FileSpecialistConfig>,
}

impl Default for FileRosterConfig {
    fn default() -> Self {
        Self {
            specialists: Roster::default()
                .specialists()
                .iter()
                .map(|s| FileSpecialistConfig {
                    name: s.name.as_str().to_string(),
                    specialty: s.specialty.clone(),
                })
                .collect(),
        }
    }
}

impl FileRosterConfig {
    /// Build the domain roster; names are normalized there.
    pub fn to_roster(&self) -> Result<Roster, DomainError> {
        Roster::new(
            self.specialists
                .iter()
                .map(|s| (s.name.as_str(), s.specialty.clone())),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_matches_domain_roster() {
        let roster = FileRosterConfig::default().to_roster().unwrap();
        assert_eq!(roster, Roster::default());
    }

    #[test]
    fn test_custom_roster() {
        let toml_str = r#"
[[roster.specialists]]
name = "Data Scientist"
specialty = "Statistics and modelling"

[[roster.specialists]]
name = "lawyer"
"#;
        let config: super::super::FileConfig = toml::from_str(toml_str).unwrap();
        let roster = config.roster.to_roster().unwrap();
        assert_eq!(roster.len(), 2);
        assert!(roster.resolve("data_scientist").known().is_some());
        assert_eq!(roster.specialists()[1].specialty, "");
    }
}
