//! Collection specs and versioned schemas.
//!
//! A database is opened at a schema version. Going from the stored version
//! to the requested one replays every [`Upgrade`] in between, in ascending
//! order. Each step is idempotent: creating a collection that already
//! exists, or deleting one that does not, is skipped.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};

/// Default key path for collections.
pub const DEFAULT_KEY_PATH: &str = "id";

const MAX_NAME_LEN: usize = 64;

/// Description of one collection: its name and how records are keyed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionSpec {
    pub name: String,
    pub key_path: String,
    pub auto_increment: bool,
}

impl CollectionSpec {
    /// A collection keyed by an auto-incrementing `id`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            key_path: DEFAULT_KEY_PATH.to_string(),
            auto_increment: true,
        }
    }

    /// Use a different key field.
    #[must_use]
    pub fn key_path(mut self, key_path: impl Into<String>) -> Self {
        self.key_path = key_path.into();
        self
    }

    /// Toggle the key generator.
    #[must_use]
    pub fn auto_increment(mut self, enabled: bool) -> Self {
        self.auto_increment = enabled;
        self
    }

    /// Check name and key path.
    pub fn validate(&self) -> Result<()> {
        validate_name(&self.name)?;
        if self.key_path.is_empty() || self.key_path.contains('.') {
            return Err(CoreError::InvalidKeyPath(self.key_path.clone()));
        }
        Ok(())
    }
}

/// Collection names are restricted to `[A-Za-z0-9_-]{1,64}`.
pub fn validate_name(name: &str) -> Result<()> {
    let ok = !name.is_empty()
        && name.len() <= MAX_NAME_LEN
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if ok {
        Ok(())
    } else {
        Err(CoreError::InvalidCollectionName(name.to_string()))
    }
}

/// A single idempotent schema change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum UpgradeStep {
    /// Create the collection unless one with the same name exists.
    CreateCollection(CollectionSpec),
    /// Drop the collection and its records if it exists.
    DeleteCollection(String),
}

/// The steps that bring a database to `version`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Upgrade {
    pub version: u32,
    pub steps: Vec<UpgradeStep>,
}

impl Upgrade {
    pub fn new(version: u32) -> Self {
        Self {
            version,
            steps: Vec::new(),
        }
    }

    #[must_use]
    pub fn create_collection(mut self, spec: CollectionSpec) -> Self {
        self.steps.push(UpgradeStep::CreateCollection(spec));
        self
    }

    #[must_use]
    pub fn delete_collection(mut self, name: impl Into<String>) -> Self {
        self.steps.push(UpgradeStep::DeleteCollection(name.into()));
        self
    }
}

/// A target version plus the ordered upgrades that lead to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    pub version: u32,
    pub upgrades: Vec<Upgrade>,
}

impl Schema {
    pub fn new(version: u32) -> Self {
        Self {
            version,
            upgrades: Vec::new(),
        }
    }

    #[must_use]
    pub fn upgrade(mut self, upgrade: Upgrade) -> Self {
        self.upgrades.push(upgrade);
        self
    }

    /// Check the version is non-zero, upgrades are strictly ascending and
    /// none targets a version past the schema's own, and every step is
    /// well formed.
    pub fn validate(&self) -> Result<()> {
        if self.version == 0 {
            return Err(CoreError::ZeroVersion);
        }

        let mut previous = 0u32;
        for upgrade in &self.upgrades {
            if upgrade.version == 0 {
                return Err(CoreError::ZeroVersion);
            }
            if upgrade.version <= previous {
                return Err(CoreError::UnorderedUpgrades {
                    previous,
                    current: upgrade.version,
                });
            }
            if upgrade.version > self.version {
                return Err(CoreError::UpgradeBeyondSchema {
                    upgrade: upgrade.version,
                    schema: self.version,
                });
            }
            for step in &upgrade.steps {
                match step {
                    UpgradeStep::CreateCollection(spec) => spec.validate()?,
                    UpgradeStep::DeleteCollection(name) => validate_name(name)?,
                }
            }
            previous = upgrade.version;
        }

        Ok(())
    }

    /// Upgrades to replay for a database currently at `stored`.
    pub fn pending(&self, stored: u32) -> impl Iterator<Item = &Upgrade> {
        let target = self.version;
        self.upgrades
            .iter()
            .filter(move |u| u.version > stored && u.version <= target)
    }
}
