//! Organisation unit lookups.
//!
//! Resolving a country name to its uid and hierarchy levels belongs to an
//! external collaborator; [`OrgUnitDirectory`] is the seam. [`StaticOrgUnits`]
//! serves the answers from configuration.

use std::collections::BTreeMap;

use datim_model::LevelType;
use serde::{Deserialize, Serialize};

/// Org unit identifier and level lookups.
pub trait OrgUnitDirectory {
    /// Uid of the named org unit.
    fn org_unit_id(&self, name: &str) -> Option<String>;

    /// Numeric hierarchy level of the given type within the named org unit.
    fn org_level(&self, name: &str, level_type: LevelType) -> Option<u32>;

    /// Display label of a numeric level within the named org unit.
    fn org_level_label(&self, _name: &str, _level: usize) -> Option<String> {
        None
    }
}

/// Level numbers of one org unit, by level type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OrgUnitLevels {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prioritization: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub community: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub facility: Option<u32>,
}

impl OrgUnitLevels {
    #[must_use]
    pub fn get(&self, level_type: LevelType) -> Option<u32> {
        match level_type {
            LevelType::Country => self.country,
            LevelType::Prioritization => self.prioritization,
            LevelType::Community => self.community,
            LevelType::Facility => self.facility,
        }
    }

    pub fn set(&mut self, level_type: LevelType, level: u32) {
        let slot = match level_type {
            LevelType::Country => &mut self.country,
            LevelType::Prioritization => &mut self.prioritization,
            LevelType::Community => &mut self.community,
            LevelType::Facility => &mut self.facility,
        };
        *slot = Some(level);
    }
}

/// Configured facts about one org unit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrgUnitEntry {
    pub uid: String,
    #[serde(default)]
    pub levels: OrgUnitLevels,
    /// Label of hierarchy level `k` at index `k - 1`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub level_labels: Vec<String>,
}

/// In-memory [`OrgUnitDirectory`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StaticOrgUnits {
    units: BTreeMap<String, OrgUnitEntry>,
}

impl StaticOrgUnits {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn from_entries(units: BTreeMap<String, OrgUnitEntry>) -> Self {
        Self { units }
    }

    /// Adds or replaces an org unit uid.
    #[must_use]
    pub fn with_unit(mut self, name: impl Into<String>, uid: impl Into<String>) -> Self {
        self.units.entry(name.into()).or_default().uid = uid.into();
        self
    }

    #[must_use]
    pub fn with_level(mut self, name: impl Into<String>, level_type: LevelType, level: u32) -> Self {
        self.units
            .entry(name.into())
            .or_default()
            .levels
            .set(level_type, level);
        self
    }

    #[must_use]
    pub fn with_level_labels(
        mut self,
        name: impl Into<String>,
        labels: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        self.units.entry(name.into()).or_default().level_labels =
            labels.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }
}

impl OrgUnitDirectory for StaticOrgUnits {
    fn org_unit_id(&self, name: &str) -> Option<String> {
        self.units
            .get(name)
            .map(|unit| unit.uid.clone())
            .filter(|uid| !uid.is_empty())
    }

    fn org_level(&self, name: &str, level_type: LevelType) -> Option<u32> {
        self.units.get(name)?.levels.get(level_type)
    }

    fn org_level_label(&self, name: &str, level: usize) -> Option<String> {
        let index = level.checked_sub(1)?;
        self.units.get(name)?.level_labels.get(index).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nigeria() -> StaticOrgUnits {
        StaticOrgUnits::new()
            .with_unit("Nigeria", "PqlFzhuPcF1")
            .with_level("Nigeria", LevelType::Country, 3)
            .with_level("Nigeria", LevelType::Prioritization, 4)
            .with_level_labels("Nigeria", ["Global", "Region", "Country", "SNU1"])
    }

    #[test]
    fn test_lookup() {
        let units = nigeria();
        assert_eq!(units.org_unit_id("Nigeria").as_deref(), Some("PqlFzhuPcF1"));
        assert_eq!(units.org_level("Nigeria", LevelType::Prioritization), Some(4));
        assert_eq!(units.org_level("Nigeria", LevelType::Facility), None);
        assert_eq!(units.org_unit_id("Kenya"), None);
    }

    #[test]
    fn test_level_labels_are_one_based() {
        let units = nigeria();
        assert_eq!(units.org_level_label("Nigeria", 1).as_deref(), Some("Global"));
        assert_eq!(units.org_level_label("Nigeria", 4).as_deref(), Some("SNU1"));
        assert_eq!(units.org_level_label("Nigeria", 0), None);
        assert_eq!(units.org_level_label("Nigeria", 5), None);
    }

    #[test]
    fn test_level_without_uid_is_not_an_org_unit() {
        let units = StaticOrgUnits::new().with_level("Kenya", LevelType::Country, 3);
        assert_eq!(units.org_unit_id("Kenya"), None);
    }
}
