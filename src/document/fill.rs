use serde_json::{Map, Value as JsonValue, json};

/// Neutral values used for omitted widget metadata.
pub const DEFAULT_TIMING: &str = "any";
pub const DEFAULT_VERSATILITY: &str = "medium";

/// Populates every omitted optional field of a raw document with a fixed default.
///
/// A field counts as omitted when it is absent or `null`. Present values are
/// never touched, so applying the fill twice is the same as applying it once.
/// `sessionId`, `stage`, `widgets` and each widget's `component` are left
/// alone: those are required from the model and checked by validation.
pub fn fill_required_fields(doc: &mut JsonValue) {
    let Some(root) = doc.as_object_mut() else {
        return;
    };

    set_default(root, "oodm", || json!({}));
    set_default(root, "dependencyGraph", || json!({ "nodes": [], "edges": [] }));
    set_default(root, "layout", || json!({ "type": "single" }));
    set_default(root, "metadata", || json!({}));

    if let Some(JsonValue::Array(widgets)) = root.get_mut("widgets") {
        for (index, widget) in widgets.iter_mut().enumerate() {
            if let Some(widget) = widget.as_object_mut() {
                fill_widget(widget, index);
            }
        }
    }
}

fn fill_widget(widget: &mut Map<String, JsonValue>, index: usize) {
    set_default(widget, "id", || json!(format!("widget-{}", index + 1)));
    set_default(widget, "position", || json!(index));
    set_default(widget, "layout", || json!({}));
    set_default(widget, "config", || json!({}));
    set_default(widget, "inputs", || json!([]));
    set_default(widget, "outputs", || json!([]));
    set_default(widget, "reactiveBindings", || json!([]));
    set_default(widget, "metadata", || json!({}));

    if let Some(metadata) = widget.get_mut("metadata").and_then(JsonValue::as_object_mut) {
        set_default(metadata, "timing", || json!(DEFAULT_TIMING));
        set_default(metadata, "versatility", || json!(DEFAULT_VERSATILITY));
        set_default(metadata, "bottleneck", || json!([]));
        set_default(metadata, "description", || json!(""));
    }
}

fn set_default(map: &mut Map<String, JsonValue>, key: &str, default: impl FnOnce() -> JsonValue) {
    match map.get_mut(key) {
        Some(value) if !value.is_null() => {}
        Some(value) => *value = default(),
        None => {
            map.insert(key.to_string(), default());
        }
    }
}
