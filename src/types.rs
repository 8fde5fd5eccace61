//! Wire types for the assistant session/message API
//!
//! Pure data-transfer shapes: every entity is a value passed by the caller
//! or returned by the service, with no behavior beyond a single round trip.
//! Optional fields are omitted from serialized bodies entirely, never
//! emitted as null placeholders.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Response to a create-session call
///
/// The session identifier is opaque and server-issued; the server expires
/// it after an inactivity window the client cannot observe.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionResponse {
    /// Opaque session identifier for subsequent message/delete calls
    pub session_id: String,
}

/// User input for a message turn
///
/// All fields are optional; an input with only `text` set serializes to
/// `{"text": "..."}`.
///
/// # Examples
///
/// ```
/// use parlance::types::MessageInput;
///
/// let input = MessageInput::text("Hello");
/// assert_eq!(input.text.as_deref(), Some("Hello"));
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MessageInput {
    /// Input type; the service currently defines `"text"`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_type: Option<String>,
    /// The user's utterance
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Caller-resolved intents, bypassing server-side recognition
    #[serde(skip_serializing_if = "Option::is_none")]
    pub intents: Option<Vec<RuntimeIntent>>,
    /// Caller-resolved entities, bypassing server-side recognition
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entities: Option<Vec<RuntimeEntity>>,
    /// Identifier of a suggestion the user picked from a previous turn
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion_id: Option<String>,
    /// Behavior flags for this turn
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<MessageInputOptions>,
}

impl MessageInput {
    /// Creates a text input
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::default()
        }
    }
}

/// Behavior flags for a message turn
///
/// Unset flags are omitted from the request; the service applies its own
/// defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MessageInputOptions {
    /// Include debug information in the response output
    #[serde(skip_serializing_if = "Option::is_none")]
    pub debug: Option<bool>,
    /// Restart the conversation, discarding accumulated dialog state
    #[serde(skip_serializing_if = "Option::is_none")]
    pub restart: Option<bool>,
    /// Return all intent candidates, not just the top match
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alternate_intents: Option<bool>,
    /// Echo the updated context in the response
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_context: Option<bool>,
}

/// A recognized intent with its confidence score
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuntimeIntent {
    /// Intent name
    pub intent: String,
    /// Recognition confidence in `[0, 1]`
    pub confidence: f64,
}

/// A recognized entity with character-offset location in the input text
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuntimeEntity {
    /// Entity name
    pub entity: String,
    /// Zero-based `[start, end)` character offsets into the input text
    pub location: Vec<usize>,
    /// Entity value as recognized by the service
    pub value: String,
    /// Recognition confidence in `[0, 1]`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    /// Service-defined metadata for the entity
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Map<String, Value>>,
    /// Capture groups for pattern-based entities
    #[serde(skip_serializing_if = "Option::is_none")]
    pub groups: Option<Vec<CaptureGroup>>,
}

/// A capture group within a pattern-based entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptureGroup {
    /// Group name
    pub group: String,
    /// Zero-based `[start, end)` character offsets into the input text
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<Vec<usize>>,
}

/// Conversation context, round-tripped between turns
///
/// The client never interprets this data: the `skills` bag is opaque,
/// per-skill state (including each skill's `user_defined` map) that is
/// passed through unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MessageContext {
    /// State shared by all skills
    #[serde(skip_serializing_if = "Option::is_none")]
    pub global: Option<MessageContextGlobal>,
    /// Opaque per-skill state, keyed by skill name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skills: Option<Map<String, Value>>,
}

/// Context state shared by all skills
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MessageContextGlobal {
    /// Server-managed system properties
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<MessageContextGlobalSystem>,
}

/// Server-managed system properties of the global context
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MessageContextGlobalSystem {
    /// IANA time zone applied when interpreting dates in the input
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
    /// Caller-supplied identifier of the end user
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    /// Number of turns taken in the session, maintained by the server
    #[serde(skip_serializing_if = "Option::is_none")]
    pub turn_count: Option<u64>,
}

/// Assistant output for a message turn
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MessageOutput {
    /// Render instructions for a client UI, in presentation order
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generic: Option<Vec<RuntimeResponseGeneric>>,
    /// Recognized intents, sorted by descending confidence
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intents: Option<Vec<RuntimeIntent>>,
    /// Recognized entities
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entities: Option<Vec<RuntimeEntity>>,
    /// Actions the dialog requested the client to perform
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actions: Option<Vec<DialogNodeAction>>,
    /// Debug information, present when requested via input options
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub debug: Option<MessageOutputDebug>,
}

/// A generic render instruction for a client UI
///
/// `response_type` selects which of the optional members are meaningful
/// (`text`, `pause`, `image`, `option`, `suggestion`, ...). Members this
/// client does not model are preserved in the flattened bag so they
/// round-trip unchanged.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuntimeResponseGeneric {
    /// Discriminator for the render instruction
    pub response_type: String,
    /// Text to display (`text`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Pause duration in milliseconds (`pause`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time: Option<u64>,
    /// Whether to show a typing indicator during the pause (`pause`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub typing: Option<bool>,
    /// Media source URL (`image`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    /// Title to show with the response (`image`, `option`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Descriptive text to show with the response (`image`, `option`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Preferred rendering for options (`option`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preference: Option<String>,
    /// Choices to offer the user (`option`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<DialogNodeOutputOptionsElement>>,
    /// Disambiguation suggestions (`suggestion`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestions: Option<Vec<DialogSuggestion>>,
    /// Topic of the disambiguation (`suggestion`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
    /// Members not modeled by this client, round-tripped unchanged
    #[serde(flatten)]
    pub additional: Map<String, Value>,
}

/// One choice within an `option` render instruction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DialogNodeOutputOptionsElement {
    /// Label to show the user
    pub label: String,
    /// Input to send when the user picks this choice
    pub value: DialogNodeOutputOptionsElementValue,
}

/// The input sent when an option choice is picked
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DialogNodeOutputOptionsElementValue {
    /// Message input to send back on selection
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input: Option<MessageInput>,
}

/// One disambiguation suggestion
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DialogSuggestion {
    /// Label to show the user
    pub label: String,
    /// Value to send back when the suggestion is picked
    pub value: Value,
    /// Output to display if the suggestion is picked
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<Map<String, Value>>,
}

/// An action the dialog requested the client to perform
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DialogNodeAction {
    /// Action name
    pub name: String,
    /// Action type (`client`, `server`, ...)
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub action_type: Option<String>,
    /// Parameters to pass to the action
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameters: Option<Map<String, Value>>,
    /// Context variable the result should be stored in
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result_variable: Option<String>,
    /// Name of the credentials to use for the action
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credentials: Option<String>,
}

/// Debug information for a message turn
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MessageOutputDebug {
    /// Dialog nodes visited during processing, in visit order
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nodes_visited: Option<Vec<DialogNodeVisited>>,
    /// Log messages generated during processing
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_messages: Option<Vec<DialogLogMessage>>,
    /// Whether processing left the dialog branch
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch_exited: Option<bool>,
    /// Why the branch was exited (`completed`, `fallback`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch_exited_reason: Option<String>,
}

/// A dialog node visited during processing
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DialogNodeVisited {
    /// Node identifier
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dialog_node: Option<String>,
    /// Node title
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Conditions that triggered the node
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conditions: Option<String>,
}

/// A log message generated during dialog processing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DialogLogMessage {
    /// Severity (`info`, `error`, `warn`)
    pub level: String,
    /// Log message text
    pub message: String,
}

/// Response to a message turn
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    /// Assistant output for this turn
    pub output: MessageOutput,
    /// Updated context, echoed when requested via input options
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<MessageContext>,
}
