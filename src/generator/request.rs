use crate::catalog::Stage;
use crate::error::RequestError;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

fn default_restrict_to_implemented() -> bool {
    true
}

/// Per-request switches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationOptions {
    /// Only propose widgets the rendering layer can display. Defaults to `true`.
    #[serde(default = "default_restrict_to_implemented")]
    pub restrict_to_implemented: bool,
    #[serde(default)]
    pub text_only_mode: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_stage_results: Option<JsonValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bottleneck_type: Option<String>,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            restrict_to_implemented: default_restrict_to_implemented(),
            text_only_mode: false,
            previous_stage_results: None,
            bottleneck_type: None,
        }
    }
}

/// A single generation call. Never mutated once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationRequest {
    #[serde(default)]
    pub session_id: String,
    #[serde(default)]
    pub concern_text: String,
    pub stage: Stage,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub factors: Option<JsonValue>,
    #[serde(default)]
    pub options: GenerationOptions,
}

impl GenerationRequest {
    pub fn new(session_id: impl Into<String>, concern_text: impl Into<String>, stage: Stage) -> Self {
        Self {
            session_id: session_id.into(),
            concern_text: concern_text.into(),
            stage,
            factors: None,
            options: GenerationOptions::default(),
        }
    }

    pub fn with_options(mut self, options: GenerationOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_factors(mut self, factors: JsonValue) -> Self {
        self.factors = Some(factors);
        self
    }

    pub fn text_only(mut self) -> Self {
        self.options.text_only_mode = true;
        self
    }

    /// Parses and validates a JSON request body.
    ///
    /// The stage is checked before the rest of the body so that an
    /// unrecognized stage name is reported as such rather than as a generic
    /// shape error.
    pub fn from_json(body: &str) -> Result<Self, RequestError> {
        let raw: JsonValue =
            serde_json::from_str(body).map_err(|e| RequestError::InvalidJson(e.to_string()))?;

        match raw.get("stage") {
            None | Some(JsonValue::Null) => return Err(RequestError::MissingStage),
            Some(JsonValue::String(name)) => {
                name.parse::<Stage>()?;
            }
            Some(other) => return Err(RequestError::UnknownStage(other.to_string())),
        }

        let request: Self =
            serde_json::from_value(raw).map_err(|e| RequestError::InvalidJson(e.to_string()))?;
        request.validate()?;
        Ok(request)
    }

    /// Rejects requests that must never reach the model.
    pub fn validate(&self) -> Result<(), RequestError> {
        if self.session_id.trim().is_empty() {
            return Err(RequestError::MissingSessionId);
        }
        if self.concern_text.trim().is_empty() {
            return Err(RequestError::MissingConcernText);
        }
        Ok(())
    }
}
