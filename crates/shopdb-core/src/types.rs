//! Strong type definitions for shopdb.
//!
//! Record identifiers are newtypes so a stock count can never be passed
//! where a key is expected.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// An engine-assigned record key.
///
/// Keys come from a per-collection generator that starts at 1 and only
/// moves forward, so a key is never handed out twice in one collection,
/// even after the record holding it is deleted.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(pub u64);

impl RecordId {
    /// The first key a fresh generator hands out.
    pub const FIRST: Self = Self(1);

    /// Create a new RecordId from a raw key.
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Get the raw key.
    pub const fn get(&self) -> u64 {
        self.0
    }

    /// The key following this one.
    pub const fn next(&self) -> Self {
        Self(self.0.saturating_add(1))
    }
}

impl fmt::Debug for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RecordId({})", self.0)
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for RecordId {
    fn from(raw: u64) -> Self {
        Self(raw)
    }
}

impl From<RecordId> for u64 {
    fn from(id: RecordId) -> Self {
        id.0
    }
}

impl FromStr for RecordId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse().map(Self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_id_display() {
        assert_eq!(format!("{}", RecordId::new(42)), "42");
        assert_eq!(format!("{:?}", RecordId::new(42)), "RecordId(42)");
    }

    #[test]
    fn test_record_id_parse() {
        assert_eq!("7".parse::<RecordId>().unwrap(), RecordId(7));
        assert!("seven".parse::<RecordId>().is_err());
    }

    #[test]
    fn test_record_id_serializes_as_number() {
        let json = serde_json::to_string(&RecordId(3)).unwrap();
        assert_eq!(json, "3");
    }

    #[test]
    fn test_record_id_ordering() {
        assert!(RecordId::FIRST < RecordId::FIRST.next());
        assert_eq!(RecordId(u64::MAX).next(), RecordId(u64::MAX));
    }
}
