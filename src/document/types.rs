use crate::catalog::Stage;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// Descriptive metadata attached to each generated widget.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WidgetMetadata {
    pub timing: String,
    pub versatility: String,
    pub bottleneck: Vec<String>,
    pub description: String,
}

/// One generated widget.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WidgetSpecEntry {
    pub id: String,
    /// Catalog id of the widget kind. Always a member of the stage's eligible set.
    pub component: String,
    pub position: u32,
    pub layout: JsonValue,
    pub config: JsonValue,
    pub inputs: Vec<JsonValue>,
    pub outputs: Vec<JsonValue>,
    pub reactive_bindings: Vec<JsonValue>,
    pub metadata: WidgetMetadata,
}

/// The validated UI specification document returned on a successful generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UiSpecDocument {
    pub session_id: String,
    pub stage: Stage,
    pub oodm: JsonValue,
    pub dependency_graph: JsonValue,
    pub widgets: Vec<WidgetSpecEntry>,
    pub layout: JsonValue,
    pub metadata: JsonValue,
}

impl UiSpecDocument {
    /// Component ids in widget order.
    pub fn components(&self) -> Vec<&str> {
        self.widgets.iter().map(|w| w.component.as_str()).collect()
    }
}
