//! Prompt construction. Only the structure is fixed here: what is embedded and
//! which output shape the model is asked for.

use super::GenerationRequest;
use crate::catalog::Stage;
use crate::document::Violation;
use itertools::Itertools;
use std::fmt::Write;

pub const MIN_WIDGETS: usize = 1;
pub const MAX_WIDGETS: usize = 4;

/// Builds the widget-mode prompt: catalog text, request context and the
/// required output skeleton.
pub fn widget_prompt(request: &GenerationRequest, catalog_text: &str, eligible: &[&str]) -> String {
    let mut prompt = String::new();

    let _ = writeln!(
        prompt,
        "You design the interface for one stage of a structured thinking session."
    );
    let _ = writeln!(prompt, "\nStage: {}", request.stage);
    let _ = writeln!(prompt, "Concern:\n{}", request.concern_text.trim());

    if let Some(factors) = &request.factors {
        let _ = writeln!(prompt, "\nFactors:\n{factors}");
    }
    if let Some(bottleneck) = &request.options.bottleneck_type {
        let _ = writeln!(prompt, "\nPrimary bottleneck: {bottleneck}");
    }

    let _ = writeln!(prompt, "\nAvailable widgets (use only these ids as 'component'):");
    let _ = writeln!(prompt, "{catalog_text}");

    let _ = writeln!(
        prompt,
        "\nSelect between {MIN_WIDGETS} and {MAX_WIDGETS} widgets. Allowed components: {}.",
        eligible.iter().join(", ")
    );
    let _ = writeln!(prompt, "Respond with a single JSON object of this shape:");
    let _ = write!(prompt, "{}", output_skeleton(request));

    prompt
}

fn output_skeleton(request: &GenerationRequest) -> String {
    format!(
        r#"{{
  "sessionId": "{session}",
  "stage": "{stage}",
  "oodm": {{}},
  "dependencyGraph": {{ "nodes": [], "edges": [] }},
  "widgets": [
    {{
      "id": "widget-1",
      "component": "<widget id>",
      "position": 0,
      "layout": {{}},
      "config": {{}},
      "inputs": [],
      "outputs": [],
      "reactiveBindings": [],
      "metadata": {{ "timing": "", "versatility": "", "bottleneck": [], "description": "" }}
    }}
  ],
  "layout": {{ "type": "single" }},
  "metadata": {{}}
}}
"#,
        session = request.session_id,
        stage = request.stage,
    )
}

/// Appends the previous attempt's violations so the model can correct them.
pub fn with_feedback(prompt: &str, violations: &[Violation]) -> String {
    let mut repaired = String::with_capacity(prompt.len() + 256);
    repaired.push_str(prompt);
    let _ = writeln!(
        repaired,
        "\nYour previous answer was rejected for these reasons:"
    );
    for violation in violations {
        let _ = writeln!(repaired, "- {violation}");
    }
    let _ = writeln!(repaired, "Return a corrected JSON object.");
    repaired
}

pub fn stage_instruction(stage: Stage) -> &'static str {
    match stage {
        Stage::Diverge => {
            "Broaden the user's thinking: suggest new ideas, alternative perspectives and questions they have not considered."
        }
        Stage::Organize => {
            "Structure and group the ideas collected so far: name the themes, cluster related points and surface priorities."
        }
        Stage::Converge => {
            "Help the user narrow down: weigh the strongest options against each other and point toward a decision."
        }
        Stage::Summary => {
            "Summarize the session: restate the concern, the key insights and the concrete next steps."
        }
    }
}

/// Builds the free-text prompt used by the text fallback path.
pub fn text_prompt(request: &GenerationRequest) -> String {
    let mut prompt = String::new();
    let _ = writeln!(prompt, "{}", stage_instruction(request.stage));
    let _ = writeln!(prompt, "\nConcern:\n{}", request.concern_text.trim());

    if let Some(previous) = &request.options.previous_stage_results {
        if let Ok(dump) = serde_json::to_string_pretty(previous) {
            let _ = writeln!(prompt, "\nResults from earlier stages:\n{dump}");
        }
    }

    let _ = writeln!(prompt, "\nAnswer in plain prose, without JSON or code blocks.");
    prompt
}
