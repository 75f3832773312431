use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// Named JSON schema the answer has to follow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseSchema {
    pub name: String,
    pub schema: serde_json::Value,
}

impl ResponseSchema {
    pub fn of<T: JsonSchema>(name: &str) -> Self {
        let root = schemars::schema_for!(T);
        let mut schema = serde_json::to_value(&root).unwrap_or_default();
        if let Some(obj) = schema.as_object_mut() {
            obj.remove("$schema");
            obj.remove("title");
        }
        Self {
            name: name.to_string(),
            schema,
        }
    }
}

/// How the answer's JSON shape is enforced by the service.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnswerFormat {
    /// Strict structured output; keys are emitted in schema order.
    #[default]
    JsonSchema,
    /// Plain JSON mode for models without structured outputs. The key
    /// layout is only carried by the instructions.
    JsonObject,
}

impl AnswerFormat {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "json_schema" => Some(AnswerFormat::JsonSchema),
            "json_object" => Some(AnswerFormat::JsonObject),
            _ => None,
        }
    }
}

/// One completion round trip as seen by the classifier.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    /// Short task name used in logs and errors, e.g. `"claim_type"`.
    pub task: String,
    pub model: String,
    pub temperature: Option<f32>,
    pub messages: Vec<ChatMessage>,
    pub response_schema: ResponseSchema,
    pub answer_format: AnswerFormat,
}

/// Answer shape for the single-label tasks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct LabelAnswer {
    #[schemars(description = "Exactly one label or code from the list given in the instructions")]
    pub answer: String,
}

/// Answer shape for the date task: the reasoning comes first, then the date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct DateAnswer {
    #[serde(rename = "Thinking")]
    #[schemars(description = "Which dates the text mentions and which of them is the date of loss")]
    pub thinking: String,

    #[serde(rename = "Date")]
    #[schemars(description = "Date of loss as TT.MM.JJJJ, or 'None' when it cannot be determined")]
    pub date: String,
}

// OpenAI chat completions wire format.

#[derive(Debug, Clone, Serialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub response_format: ResponseFormat,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ResponseFormat {
    JsonObject,
    JsonSchema { json_schema: JsonSchemaFormat },
}

#[derive(Debug, Clone, Serialize)]
pub struct JsonSchemaFormat {
    pub name: String,
    pub schema: serde_json::Value,
    pub strict: bool,
}

impl From<&CompletionRequest> for ChatCompletionRequest {
    fn from(request: &CompletionRequest) -> Self {
        let response_format = match request.answer_format {
            AnswerFormat::JsonSchema => ResponseFormat::JsonSchema {
                json_schema: JsonSchemaFormat {
                    name: request.response_schema.name.clone(),
                    schema: request.response_schema.schema.clone(),
                    strict: true,
                },
            },
            AnswerFormat::JsonObject => ResponseFormat::JsonObject,
        };

        Self {
            model: request.model.clone(),
            messages: request.messages.clone(),
            response_format,
            temperature: request.temperature,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatCompletionResponse {
    #[serde(default)]
    pub choices: Vec<ChatChoice>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatChoice {
    pub message: AssistantMessage,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AssistantMessage {
    pub content: Option<String>,
}
