//! Analytics query request and composed query types.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Dimension holding the value-type items ("MER Targets", "MER Results", ...).
pub const TARGETS_RESULTS_DIMENSION: &str = "Targets / Results";

/// Dimension holding technical-area items ("PLHIV", "TX_CURR", ...).
pub const TECHNICAL_AREA_DIMENSION: &str = "Technical Area";

/// Dimension holding disaggregation-type items ("Age/Sex", ...).
pub const DISAGGREGATION_TYPE_DIMENSION: &str = "Disaggregation Type";

/// Organisation hierarchy level kind, resolved to a numeric level per country.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum LevelType {
    #[default]
    Country,
    Prioritization,
    Community,
    Facility,
}

impl LevelType {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Country => "country",
            Self::Prioritization => "prioritization",
            Self::Community => "community",
            Self::Facility => "facility",
        }
    }
}

impl fmt::Display for LevelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a level type name is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown org level type '{0}' (expected country, prioritization, community or facility)")]
pub struct ParseLevelTypeError(pub String);

impl FromStr for LevelType {
    type Err = ParseLevelTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "country" => Ok(Self::Country),
            "prioritization" | "psnu" => Ok(Self::Prioritization),
            "community" => Ok(Self::Community),
            "facility" => Ok(Self::Facility),
            _ => Err(ParseLevelTypeError(s.to_string())),
        }
    }
}

/// Which display field the server uses when labelling metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisplayProperty {
    Name,
    #[default]
    ShortName,
}

impl DisplayProperty {
    /// Value of the `displayProperty` query parameter.
    #[must_use]
    pub const fn as_param(&self) -> &'static str {
        match self {
            Self::Name => "NAME",
            Self::ShortName => "SHORTNAME",
        }
    }
}

/// The caller's semantic request.
///
/// Built once, then handed to the composer; it is never modified after
/// composition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuerySpec {
    /// Organisation unit name (e.g. "Nigeria").
    pub org_unit: String,
    /// Hierarchy level the values are aggregated to.
    pub level: LevelType,
    /// Period tokens, at least one (e.g. "THIS_FINANCIAL_YEAR", "2024Oct").
    pub periods: Vec<String>,
    /// Single technical-area item name (e.g. "PLHIV").
    pub technical_area: String,
    /// "Targets / Results" item names. Empty selects every item.
    #[serde(default)]
    pub value_types: Vec<String>,
    /// "Disaggregation Type" item names.
    #[serde(default)]
    pub disaggregations: Vec<String>,
    /// Auxiliary dimension names, selected in full. Ignored without
    /// disaggregations.
    #[serde(default)]
    pub dimensions: Vec<String>,
    #[serde(default)]
    pub display_property: DisplayProperty,
    /// Whether the response should carry the metadata dictionary.
    #[serde(default = "default_true")]
    pub include_metadata: bool,
    /// Whether to request and expand the organisation hierarchy.
    #[serde(default)]
    pub hierarchy: bool,
}

fn default_true() -> bool {
    true
}

impl QuerySpec {
    pub fn new(
        org_unit: impl Into<String>,
        technical_area: impl Into<String>,
        periods: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            org_unit: org_unit.into(),
            level: LevelType::default(),
            periods: periods.into_iter().map(Into::into).collect(),
            technical_area: technical_area.into(),
            value_types: Vec::new(),
            disaggregations: Vec::new(),
            dimensions: Vec::new(),
            display_property: DisplayProperty::default(),
            include_metadata: true,
            hierarchy: false,
        }
    }

    #[must_use]
    pub fn with_level(mut self, level: LevelType) -> Self {
        self.level = level;
        self
    }

    #[must_use]
    pub fn with_value_types(mut self, names: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.value_types = names.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_disaggregations(
        mut self,
        names: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        self.disaggregations = names.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_dimensions(mut self, names: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.dimensions = names.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_display_property(mut self, display_property: DisplayProperty) -> Self {
        self.display_property = display_property;
        self
    }

    #[must_use]
    pub fn with_metadata(mut self, include: bool) -> Self {
        self.include_metadata = include;
        self
    }

    #[must_use]
    pub fn with_hierarchy(mut self, hierarchy: bool) -> Self {
        self.hierarchy = hierarchy;
        self
    }
}

/// A fully composed analytics query.
///
/// Sections are kept apart so their order is fixed at rendering time:
/// `core`, `type`, `disaggs`, `dims`, `meta`. The `dims` section only exists
/// when `disaggs` does; [`ComposedQuery::new`] drops it otherwise.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposedQuery {
    core: String,
    type_section: String,
    disaggs: Option<String>,
    dims: Option<String>,
    meta: String,
}

impl ComposedQuery {
    pub fn new(
        core: impl Into<String>,
        type_section: impl Into<String>,
        disaggs: Vec<String>,
        dims: Vec<String>,
        meta: impl Into<String>,
    ) -> Self {
        let disaggs = (!disaggs.is_empty()).then(|| disaggs.join("&"));
        let dims = match &disaggs {
            Some(_) if !dims.is_empty() => Some(dims.join("&")),
            _ => None,
        };
        Self {
            core: core.into(),
            type_section: type_section.into(),
            disaggs,
            dims,
            meta: meta.into(),
        }
    }

    #[must_use]
    pub fn core(&self) -> &str {
        &self.core
    }

    #[must_use]
    pub fn type_section(&self) -> &str {
        &self.type_section
    }

    #[must_use]
    pub fn disaggs(&self) -> Option<&str> {
        self.disaggs.as_deref()
    }

    #[must_use]
    pub fn dims(&self) -> Option<&str> {
        self.dims.as_deref()
    }

    #[must_use]
    pub fn meta(&self) -> &str {
        &self.meta
    }

    /// Sections in emission order, skipping absent ones.
    #[must_use]
    pub fn sections(&self) -> Vec<&str> {
        let mut sections = vec![self.core.as_str(), self.type_section.as_str()];
        sections.extend(self.disaggs.as_deref());
        sections.extend(self.dims.as_deref());
        sections.push(self.meta.as_str());
        sections
    }
}

impl fmt::Display for ComposedQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.sections().join("&"))
    }
}
