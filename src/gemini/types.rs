//! Wire types for the `generateContent` REST endpoint.

use crate::runtime::{Content, Part, Role};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    pub contents: Vec<WireContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_instruction: Option<WireContent>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<WireTool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WireContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub parts: Vec<WirePart>,
}

impl WireContent {
    /// System instructions carry no role.
    pub fn system(text: &str) -> Self {
        Self {
            role: None,
            parts: vec![WirePart::text(text)],
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WirePart {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub function_call: Option<FunctionCall>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub function_response: Option<FunctionResponse>,
    /// Set on reasoning parts; those are never surfaced as answer text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thought: Option<bool>,
}

impl WirePart {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionCall {
    pub name: String,
    #[serde(default)]
    pub args: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionResponse {
    pub name: String,
    pub response: Value,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WireTool {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub function_declarations: Vec<FunctionDeclaration>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub google_search: Option<GoogleSearch>,
}

impl WireTool {
    /// The built-in grounded search tool.
    pub fn google_search() -> Self {
        Self {
            function_declarations: Vec::new(),
            google_search: Some(GoogleSearch {}),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct FunctionDeclaration {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct GoogleSearch {}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<WireContent>,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

impl GenerateContentResponse {
    /// Content of the first candidate, if the model produced any.
    pub fn first_content(&self) -> Option<&WireContent> {
        self.candidates.first().and_then(|c| c.content.as_ref())
    }

    /// Visible text of the first candidate, parts joined in order.
    pub fn text(&self) -> String {
        self.first_content()
            .map(|content| {
                content
                    .parts
                    .iter()
                    .filter(|p| p.thought != Some(true))
                    .filter_map(|p| p.text.as_deref())
                    .collect()
            })
            .unwrap_or_default()
    }
}

impl From<&Content> for WireContent {
    fn from(content: &Content) -> Self {
        let role = match content.role {
            Role::User => "user",
            Role::Model => "model",
        };
        let parts = content
            .parts
            .iter()
            .map(|part| match part {
                Part::Text(text) => WirePart::text(text.clone()),
                Part::FunctionCall { name, args } => WirePart {
                    function_call: Some(FunctionCall {
                        name: name.clone(),
                        args: args.clone(),
                    }),
                    ..WirePart::default()
                },
                Part::FunctionResponse { name, response } => WirePart {
                    function_response: Some(FunctionResponse {
                        name: name.clone(),
                        response: response.clone(),
                    }),
                    ..WirePart::default()
                },
            })
            .collect();
        Self {
            role: Some(role.to_string()),
            parts,
        }
    }
}

impl From<&WireContent> for Content {
    fn from(wire: &WireContent) -> Self {
        let role = match wire.role.as_deref() {
            Some("user") => Role::User,
            _ => Role::Model,
        };
        let parts = wire
            .parts
            .iter()
            .filter(|p| p.thought != Some(true))
            .filter_map(|p| {
                if let Some(call) = &p.function_call {
                    Some(Part::FunctionCall {
                        name: call.name.clone(),
                        args: call.args.clone(),
                    })
                } else if let Some(resp) = &p.function_response {
                    Some(Part::FunctionResponse {
                        name: resp.name.clone(),
                        response: resp.response.clone(),
                    })
                } else {
                    p.text.clone().map(Part::Text)
                }
            })
            .collect();
        Content { role, parts }
    }
}
