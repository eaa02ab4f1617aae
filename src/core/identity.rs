//! Entity identity - prefixed ULID identifiers
//!
//! Every persisted object carries an id of the form `PREFIX-<ULID>`, e.g.
//! `INQ-01HQ3K4N5M6P7Q8R9S0T1V2W3X`. ULIDs sort by creation time, so listing
//! ids lexically also lists them oldest-first.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use ulid::Ulid;

/// Entity type prefixes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EntityPrefix {
    /// Inquiry drafts and submitted inquiry records
    Inq,
    /// Line items inside an inquiry
    Item,
    /// Saved company templates
    Tpl,
}

impl EntityPrefix {
    /// All known prefixes
    pub fn all() -> &'static [EntityPrefix] {
        &[EntityPrefix::Inq, EntityPrefix::Item, EntityPrefix::Tpl]
    }

    /// The prefix as it appears in an id string
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityPrefix::Inq => "INQ",
            EntityPrefix::Item => "ITEM",
            EntityPrefix::Tpl => "TPL",
        }
    }
}

impl fmt::Display for EntityPrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityPrefix {
    type Err = IdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "INQ" => Ok(EntityPrefix::Inq),
            "ITEM" => Ok(EntityPrefix::Item),
            "TPL" => Ok(EntityPrefix::Tpl),
            _ => Err(IdParseError::UnknownPrefix(s.to_string())),
        }
    }
}

/// Errors produced when parsing an id string
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdParseError {
    #[error("Invalid id format: {0} (expected PREFIX-ULID)")]
    InvalidFormat(String),

    #[error("Unknown id prefix: {0}")]
    UnknownPrefix(String),

    #[error("Invalid ULID in id: {0}")]
    InvalidUlid(String),
}

/// A prefixed, time-ordered unique identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId {
    prefix: EntityPrefix,
    ulid: Ulid,
}

impl EntityId {
    /// Generate a fresh id for the given entity type
    pub fn new(prefix: EntityPrefix) -> Self {
        Self {
            prefix,
            ulid: Ulid::new(),
        }
    }

    /// Parse an id string such as `INQ-01HQ3K4N5M6P7Q8R9S0T1V2W3X`
    pub fn parse(s: &str) -> Result<Self, IdParseError> {
        let (prefix, rest) = s
            .split_once('-')
            .ok_or_else(|| IdParseError::InvalidFormat(s.to_string()))?;
        let prefix: EntityPrefix = prefix.parse()?;
        let ulid = Ulid::from_string(rest).map_err(|_| IdParseError::InvalidUlid(s.to_string()))?;
        Ok(Self { prefix, ulid })
    }

    /// The entity type of this id
    pub fn prefix(&self) -> EntityPrefix {
        self.prefix
    }

    /// The underlying ULID
    pub fn ulid(&self) -> Ulid {
        self.ulid
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.prefix, self.ulid)
    }
}

impl FromStr for EntityId {
    type Err = IdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for EntityId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for EntityId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        EntityId::parse(&s).map_err(serde::de::Error::custom)
    }
}
