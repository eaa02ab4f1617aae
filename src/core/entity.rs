//! Entity trait - common interface for persisted inquiry objects

use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Serialize};

use crate::core::identity::EntityId;

/// Common trait for everything stored in a keyed collection
pub trait Entity: Serialize + DeserializeOwned + Clone {
    /// The entity type prefix (e.g., "INQ", "ITEM")
    const PREFIX: &'static str;

    /// Get the entity's unique ID
    fn id(&self) -> &EntityId;

    /// Get the creation timestamp
    fn created(&self) -> DateTime<Utc>;
}

/// How quickly the requester needs a line item quoted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Urgency {
    #[default]
    Standard,
    Urgent,
    VeryUrgent,
}

impl Urgency {
    /// Lenient parse used for imported and manually typed values.
    ///
    /// Anything unrecognized falls back to [`Urgency::Standard`].
    pub fn parse_lenient(s: &str) -> Self {
        s.parse().unwrap_or_default()
    }
}

impl std::fmt::Display for Urgency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Urgency::Standard => write!(f, "standard"),
            Urgency::Urgent => write!(f, "urgent"),
            Urgency::VeryUrgent => write!(f, "very_urgent"),
        }
    }
}

impl std::str::FromStr for Urgency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace(['-', ' '], "_");
        match normalized.as_str() {
            "standard" | "normal" => Ok(Urgency::Standard),
            "urgent" | "high" => Ok(Urgency::Urgent),
            "very_urgent" | "veryurgent" | "critical" => Ok(Urgency::VeryUrgent),
            _ => Err(format!(
                "Invalid urgency: {}. Use standard, urgent, or very_urgent",
                s
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_urgency_synonyms() {
        assert_eq!("very urgent".parse::<Urgency>(), Ok(Urgency::VeryUrgent));
        assert_eq!("Very-Urgent".parse::<Urgency>(), Ok(Urgency::VeryUrgent));
        assert_eq!("URGENT".parse::<Urgency>(), Ok(Urgency::Urgent));
        assert_eq!(" standard ".parse::<Urgency>(), Ok(Urgency::Standard));
    }

    #[test]
    fn test_urgency_lenient_defaults() {
        assert_eq!(Urgency::parse_lenient("asap!!"), Urgency::Standard);
        assert_eq!(Urgency::parse_lenient(""), Urgency::Standard);
    }

    #[test]
    fn test_urgency_serialization() {
        let json = serde_json::to_string(&Urgency::VeryUrgent).unwrap();
        assert_eq!(json, "\"very_urgent\"");
        let back: Urgency = serde_json::from_str("\"urgent\"").unwrap();
        assert_eq!(back, Urgency::Urgent);
    }
}
