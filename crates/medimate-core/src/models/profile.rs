use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Patient category that steers the backend's consultation style.
///
/// The wire format is a free-form tag. Known tags get their own variant;
/// anything else is carried through unchanged in `Other`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum PatientProfile {
    #[default]
    Auto,
    Pediatric,
    Chronic,
    Other(String),
}

impl PatientProfile {
    pub fn as_tag(&self) -> &str {
        match self {
            PatientProfile::Auto => "auto",
            PatientProfile::Pediatric => "pediatric",
            PatientProfile::Chronic => "chronic",
            PatientProfile::Other(tag) => tag,
        }
    }

    /// Profiles offered in selectors.
    pub fn known() -> [PatientProfile; 3] {
        [
            PatientProfile::Auto,
            PatientProfile::Pediatric,
            PatientProfile::Chronic,
        ]
    }
}

impl From<&str> for PatientProfile {
    fn from(value: &str) -> Self {
        let trimmed = value.trim();
        match trimmed.to_lowercase().as_str() {
            "auto" | "" => PatientProfile::Auto,
            "pediatric" => PatientProfile::Pediatric,
            "chronic" => PatientProfile::Chronic,
            _ => PatientProfile::Other(trimmed.to_string()),
        }
    }
}

impl FromStr for PatientProfile {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from(s))
    }
}

impl fmt::Display for PatientProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_tag())
    }
}

impl Serialize for PatientProfile {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_tag())
    }
}

impl<'de> Deserialize<'de> for PatientProfile {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let tag = String::deserialize(deserializer)?;
        Ok(PatientProfile::from(tag.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_tags_parse_case_insensitively() {
        assert_eq!(PatientProfile::from("Pediatric"), PatientProfile::Pediatric);
        assert_eq!(PatientProfile::from(" chronic "), PatientProfile::Chronic);
        assert_eq!(PatientProfile::from("AUTO"), PatientProfile::Auto);
        assert_eq!(PatientProfile::from(""), PatientProfile::Auto);
    }

    #[test]
    fn test_unknown_tags_are_preserved() {
        let profile = PatientProfile::from("general");
        assert_eq!(profile, PatientProfile::Other("general".to_string()));
        assert_eq!(profile.as_tag(), "general");
    }

    #[test]
    fn test_serde_uses_plain_tag() {
        let json = serde_json::to_string(&PatientProfile::Chronic).unwrap();
        assert_eq!(json, "\"chronic\"");
        let parsed: PatientProfile = serde_json::from_str("\"geriatric\"").unwrap();
        assert_eq!(parsed.as_tag(), "geriatric");
    }
}
