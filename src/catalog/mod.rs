//! Stage-scoped widget catalog.
//!
//! The catalog answers one question: which widget kinds may the generator
//! emit at a given stage. The optional "implemented-only" restriction keeps
//! the designable catalog and the renderable catalog apart, so the generator
//! never proposes a widget the rendering layer cannot display.

use crate::error::RequestError;
use ahash::{AHashMap, AHashSet};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

mod table;

/// A phase of the user flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Diverge,
    Organize,
    Converge,
    Summary,
}

impl Stage {
    pub const ALL: [Stage; 4] = [
        Stage::Diverge,
        Stage::Organize,
        Stage::Converge,
        Stage::Summary,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Diverge => "diverge",
            Stage::Organize => "organize",
            Stage::Converge => "converge",
            Stage::Summary => "summary",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Stage {
    type Err = RequestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Stage::ALL
            .into_iter()
            .find(|stage| stage.as_str() == s)
            .ok_or_else(|| RequestError::UnknownStage(s.to_string()))
    }
}

/// One catalog entry: what a widget does and how it is configured.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WidgetDescriptor {
    pub id: Cow<'static, str>,
    pub description: Cow<'static, str>,
    pub config_hint: Cow<'static, str>,
}

impl WidgetDescriptor {
    pub fn new(
        id: impl Into<Cow<'static, str>>,
        description: impl Into<Cow<'static, str>>,
        config_hint: impl Into<Cow<'static, str>>,
    ) -> Self {
        Self {
            id: id.into(),
            description: description.into(),
            config_hint: config_hint.into(),
        }
    }
}

/// Eligible widget ids for `stage` in the built-in catalog.
pub fn eligible_widgets(stage: Stage, restrict_to_implemented: bool) -> Vec<&'static str> {
    table::stage_widgets(stage)
        .iter()
        .copied()
        .filter(|id| !restrict_to_implemented || table::IMPLEMENTED.contains(id))
        .collect()
}

/// A stage catalog value. `StageCatalog::default()` is the built-in table;
/// [`StageCatalog::builder`] assembles a custom one.
#[derive(Debug, Clone)]
pub struct StageCatalog {
    widgets: AHashMap<String, WidgetDescriptor>,
    stages: AHashMap<Stage, Vec<String>>,
    implemented: AHashSet<String>,
}

impl Default for StageCatalog {
    fn default() -> Self {
        let mut builder = StageCatalogBuilder::new();
        for descriptor in table::WIDGETS {
            builder = builder.widget(descriptor.clone());
        }
        for stage in Stage::ALL {
            builder = builder.stage(stage, table::stage_widgets(stage).iter().copied());
        }
        builder.implemented(table::IMPLEMENTED.iter().copied()).build()
    }
}

impl StageCatalog {
    pub fn builder() -> StageCatalogBuilder {
        StageCatalogBuilder::new()
    }

    /// Ordered widget ids eligible at `stage`, optionally limited to implemented kinds.
    pub fn eligible_widgets(&self, stage: Stage, restrict_to_implemented: bool) -> Vec<&str> {
        self.stages
            .get(&stage)
            .map(|ids| {
                ids.iter()
                    .filter(|id| !restrict_to_implemented || self.implemented.contains(*id))
                    .map(String::as_str)
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn descriptor(&self, id: &str) -> Option<&WidgetDescriptor> {
        self.widgets.get(id)
    }

    pub fn is_implemented(&self, id: &str) -> bool {
        self.implemented.contains(id)
    }

    /// Renders the textual catalog embedded in generation prompts:
    /// one line per widget with its id, description and configuration hint.
    pub fn describe(&self, ids: &[&str]) -> String {
        ids.iter()
            .map(|id| match self.descriptor(id) {
                Some(d) => format!("- {}: {} (config: {})", d.id, d.description, d.config_hint),
                None => format!("- {}", id),
            })
            .join("\n")
    }
}

/// Builder for custom catalogs.
#[derive(Debug, Default)]
pub struct StageCatalogBuilder {
    widgets: AHashMap<String, WidgetDescriptor>,
    stages: AHashMap<Stage, Vec<String>>,
    implemented: AHashSet<String>,
}

impl StageCatalogBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn widget(mut self, descriptor: WidgetDescriptor) -> Self {
        self.widgets.insert(descriptor.id.to_string(), descriptor);
        self
    }

    /// Sets the ordered eligible ids for a stage, replacing any previous list.
    pub fn stage<I, S>(mut self, stage: Stage, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.stages
            .insert(stage, ids.into_iter().map(Into::into).collect());
        self
    }

    pub fn implemented<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.implemented.extend(ids.into_iter().map(Into::into));
        self
    }

    pub fn build(self) -> StageCatalog {
        StageCatalog {
            widgets: self.widgets,
            stages: self.stages,
            implemented: self.implemented,
        }
    }
}
