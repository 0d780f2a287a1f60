//! Project model - units, their payloads and declared dependencies
//!
//! The engine never interprets payloads. It only reads `depends_on`
//! (and `required` on each entry) plus the `disabled` side table, which is
//! kept solely to produce precise error messages.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{GraphError, Result};

/// When a dependency counts as satisfied for the dependent unit.
///
/// Carried for visitors; the engine itself orders on completion only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DependencyCondition {
    #[default]
    UnitStarted,
    UnitHealthy,
    UnitCompletedSuccessfully,
}

/// A single `depends_on` entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Dependency {
    /// Missing required dependencies fail graph construction;
    /// missing optional ones are dropped.
    pub required: bool,
    pub condition: DependencyCondition,
    /// Restart the dependent when this dependency is restarted
    pub restart: bool,
}

impl Default for Dependency {
    fn default() -> Self {
        Self {
            required: true,
            condition: DependencyCondition::default(),
            restart: false,
        }
    }
}

impl Dependency {
    /// A required dependency with default condition
    pub fn required() -> Self {
        Self::default()
    }

    /// An optional dependency, silently dropped when the target is absent
    pub fn optional() -> Self {
        Self {
            required: false,
            ..Self::default()
        }
    }

    pub fn with_condition(mut self, condition: DependencyCondition) -> Self {
        self.condition = condition;
        self
    }
}

/// Unit definition: opaque payload plus declared dependencies
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(bound(deserialize = "P: Deserialize<'de>"))]
pub struct UnitDef<P> {
    /// Accepts both `[a, b]` and `{a: {required: false}}`
    #[serde(default, deserialize_with = "deserialize_depends_on")]
    pub depends_on: BTreeMap<String, Dependency>,
    #[serde(flatten)]
    pub payload: P,
}

impl<P> UnitDef<P> {
    pub fn new(payload: P) -> Self {
        Self {
            depends_on: BTreeMap::new(),
            payload,
        }
    }

    /// Add a required dependency
    pub fn depends_on(self, name: impl Into<String>) -> Self {
        self.with_dependency(name, Dependency::required())
    }

    /// Add an optional dependency
    pub fn optionally_depends_on(self, name: impl Into<String>) -> Self {
        self.with_dependency(name, Dependency::optional())
    }

    pub fn with_dependency(mut self, name: impl Into<String>, dependency: Dependency) -> Self {
        self.depends_on.insert(name.into(), dependency);
        self
    }
}

/// A unit excluded by its activation condition
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisabledUnit {
    /// Profiles that would enable this unit
    #[serde(default)]
    pub profiles: Vec<String>,
}

impl DisabledUnit {
    pub fn with_profiles<I, S>(profiles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            profiles: profiles.into_iter().map(Into::into).collect(),
        }
    }
}

/// Already-validated project: enabled units plus the disabled side table
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(bound(deserialize = "P: Deserialize<'de>"))]
pub struct Project<P> {
    #[serde(default)]
    pub units: BTreeMap<String, UnitDef<P>>,
    #[serde(default)]
    pub disabled: BTreeMap<String, DisabledUnit>,
}

impl<P> Default for Project<P> {
    fn default() -> Self {
        Self {
            units: BTreeMap::new(),
            disabled: BTreeMap::new(),
        }
    }
}

impl<P> Project<P> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_unit(mut self, name: impl Into<String>, unit: UnitDef<P>) -> Self {
        self.units.insert(name.into(), unit);
        self
    }

    pub fn with_disabled(mut self, name: impl Into<String>, disabled: DisabledUnit) -> Self {
        self.disabled.insert(name.into(), disabled);
        self
    }

    /// Enabled unit names, sorted
    pub fn unit_names(&self) -> impl Iterator<Item = &str> {
        self.units.keys().map(String::as_str)
    }
}

impl<P: DeserializeOwned> Project<P> {
    /// Parse a normalized project document
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).map_err(|e| GraphError::Parse {
            details: e.to_string(),
        })
    }

    /// Read and parse a project file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| GraphError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_yaml_str(&content)
    }
}

fn deserialize_depends_on<'de, D>(
    deserializer: D,
) -> std::result::Result<BTreeMap<String, Dependency>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        List(Vec<String>),
        Map(BTreeMap<String, Dependency>),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::List(names) => names
            .into_iter()
            .map(|name| (name, Dependency::default()))
            .collect(),
        Raw::Map(map) => map,
    })
}
