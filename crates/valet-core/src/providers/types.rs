//! Provider-agnostic types for the AI routing layer
//!
//! Every adapter, remote or mock, returns these shapes. Wire names are
//! camelCase to match what the structured-output prompts ask the models
//! for, so upstream JSON deserializes straight into them. Date fields are
//! parsed leniently: a malformed date degrades to `None` instead of
//! failing the whole response.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::error::ProviderError;
use crate::intent::Intent;

/// Opaque key/value context supplied by the caller (conversation history,
/// page state, anything the controller wants the model to see)
pub type QueryContext = Map<String, Value>;

/// The user on whose behalf a request is made
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub preferences: Map<String, Value>,
}

impl UserProfile {
    pub fn new(id: impl Into<String>, name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            email: email.into(),
            preferences: Map::new(),
        }
    }
}

/// Which pricing tier a provider belongs to
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CostTier {
    #[default]
    Free,
    Paid,
}

impl std::fmt::Display for CostTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Free => write!(f, "free"),
            Self::Paid => write!(f, "paid"),
        }
    }
}

/// Priority of a meeting, task, or action item
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

/// Normalized result of `generate_response`, identical regardless of which
/// adapter produced it. `provider` and `cost` are stamped by the router.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AssistantReply {
    pub message: String,
    pub intent: Intent,
    pub data: Map<String, Value>,
    pub suggestions: Vec<String>,
    pub requires_follow_up: bool,
    pub follow_up_questions: Vec<String>,
    pub provider: String,
    pub cost: CostTier,
}

/// Intent analysis of a raw query
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct QueryAnalysis {
    pub intent: Intent,
    pub confidence: f64,
    pub requires_follow_up: bool,
    pub follow_up_questions: Vec<String>,
    pub suggested_actions: Vec<String>,
    pub can_automate: bool,
    pub entities: ExtractedEntities,
}

/// Entities pulled out of a query during analysis
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractedEntities {
    pub dates: Vec<String>,
    pub people: Vec<String>,
    pub tasks: Vec<String>,
    pub meetings: Vec<String>,
}

/// Structured summary of a meeting transcript. `provider` is stamped by
/// the router.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MeetingSummary {
    pub summary: String,
    pub key_points: Vec<String>,
    pub decisions: Vec<String>,
    pub action_items: Vec<ActionItem>,
    pub next_steps: Vec<String>,
    pub provider: String,
}

/// A single follow-up item extracted from a transcript
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ActionItem {
    pub description: String,
    pub responsible_person: String,
    #[serde(deserialize_with = "lenient_date")]
    pub deadline: Option<NaiveDate>,
    pub priority: Priority,
}

/// Parsed meeting scheduling request
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MeetingPlan {
    pub title: String,
    pub description: String,
    #[serde(deserialize_with = "lenient_datetimes")]
    pub proposed_times: Vec<DateTime<Utc>>,
    pub duration_minutes: u32,
    pub participants: Vec<String>,
    pub agenda: Vec<String>,
    pub location: String,
    pub priority: Priority,
}

impl Default for MeetingPlan {
    fn default() -> Self {
        Self {
            title: "New Meeting".to_string(),
            description: String::new(),
            proposed_times: Vec::new(),
            duration_minutes: 60,
            participants: Vec::new(),
            agenda: Vec::new(),
            location: "Virtual".to_string(),
            priority: Priority::Medium,
        }
    }
}

/// Parsed task creation request
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TaskPlan {
    pub title: String,
    pub description: String,
    pub assigned_to: String,
    #[serde(deserialize_with = "lenient_date")]
    pub due_date: Option<NaiveDate>,
    pub priority: Priority,
    pub tags: Vec<String>,
    pub estimated_hours: f64,
}

/// Metadata about the meeting a transcript came from
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MeetingContext {
    pub title: Option<String>,
    pub date: Option<String>,
    pub participants: Vec<String>,
}

/// Who authored a chat turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
    System,
}

/// One message in a chat-completion history
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: ChatRole,
    pub content: String,
}

impl ChatTurn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
        }
    }
}

/// Uniform operation set every provider adapter implements.
///
/// Adapters never retry internally and never fall back on their own; every
/// failure is surfaced as a [`ProviderError`] for the router to act on.
#[async_trait]
pub trait AiProvider: Send + Sync {
    /// Stable provider tag used for stamping and logging
    fn name(&self) -> &'static str;

    /// Whether required credentials were present and initialization
    /// succeeded. Checked once at router construction, not per call.
    fn is_available(&self) -> bool {
        true
    }

    /// Answer a free-form user query
    async fn generate_response(
        &self,
        query: &str,
        user: &UserProfile,
        context: &QueryContext,
    ) -> Result<AssistantReply, ProviderError>;

    /// Summarize a meeting transcript into structured form
    async fn meeting_summary(
        &self,
        transcript: &str,
        meeting: &MeetingContext,
    ) -> Result<MeetingSummary, ProviderError>;

    /// Pull action items out of a transcript
    async fn extract_action_items(
        &self,
        transcript: &str,
    ) -> Result<Vec<ActionItem>, ProviderError>;

    /// Parse a natural-language scheduling request into a meeting plan
    async fn schedule_meeting(
        &self,
        prompt: &str,
        user: &UserProfile,
    ) -> Result<MeetingPlan, ProviderError>;

    /// Parse a natural-language request into a task plan
    async fn create_task(
        &self,
        prompt: &str,
        user: &UserProfile,
    ) -> Result<TaskPlan, ProviderError>;

    /// Classify a query without answering it
    async fn analyze_query(
        &self,
        query: &str,
        user: &UserProfile,
        context: &QueryContext,
    ) -> Result<QueryAnalysis, ProviderError>;

    /// Continue a multi-turn conversation
    async fn chat_completion(
        &self,
        history: &[ChatTurn],
        user: &UserProfile,
    ) -> Result<ChatTurn, ProviderError>;
}

/// Accepts a date string, null, or garbage; anything unparseable is None
fn lenient_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.and_then(|s| s.parse::<NaiveDate>().ok()))
}

/// Accepts a list of RFC 3339 strings, silently dropping unparseable ones
fn lenient_datetimes<'de, D>(deserializer: D) -> Result<Vec<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Vec::<String>::deserialize(deserializer)?;
    Ok(raw
        .into_iter()
        .filter_map(|s| DateTime::parse_from_rfc3339(&s).ok())
        .map(|dt| dt.with_timezone(&Utc))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assistant_reply_default() {
        let reply = AssistantReply::default();
        assert_eq!(reply.intent, Intent::GeneralAssistance);
        assert!(!reply.requires_follow_up);
        assert!(reply.provider.is_empty());
        assert_eq!(reply.cost, CostTier::Free);
    }

    #[test]
    fn test_assistant_reply_wire_names_are_camel_case() {
        let reply = AssistantReply {
            message: "hi".to_string(),
            requires_follow_up: true,
            ..Default::default()
        };
        let json = serde_json::to_value(&reply).unwrap();
        assert_eq!(json["requiresFollowUp"], true);
        assert_eq!(json["followUpQuestions"], serde_json::json!([]));
        assert_eq!(json["intent"], "general_assistance");
    }

    #[test]
    fn test_meeting_summary_from_model_output() {
        let json = serde_json::json!({
            "summary": "Planning session for Q3.",
            "keyPoints": ["Budget approved"],
            "decisions": ["Ship in July"],
            "actionItems": [
                {
                    "description": "Draft the launch plan",
                    "responsiblePerson": "sam@example.com",
                    "deadline": "2026-09-01",
                    "priority": "high"
                }
            ],
            "nextSteps": ["Schedule follow-up"]
        });
        let summary: MeetingSummary = serde_json::from_value(json).unwrap();
        assert_eq!(summary.key_points.len(), 1);
        assert_eq!(summary.action_items[0].priority, Priority::High);
        assert_eq!(
            summary.action_items[0].deadline,
            Some(NaiveDate::from_ymd_opt(2026, 9, 1).unwrap())
        );
        assert!(summary.provider.is_empty());
    }

    #[test]
    fn test_action_item_bad_deadline_degrades_to_none() {
        let json = serde_json::json!({
            "description": "Fix it",
            "responsiblePerson": "sam",
            "deadline": "next tuesday",
            "priority": "low"
        });
        let item: ActionItem = serde_json::from_value(json).unwrap();
        assert!(item.deadline.is_none());
        assert_eq!(item.priority, Priority::Low);
    }

    #[test]
    fn test_meeting_plan_defaults_and_lenient_times() {
        let json = serde_json::json!({
            "title": "Standup",
            "proposedTimes": ["2026-09-01T10:00:00Z", "not a time"]
        });
        let plan: MeetingPlan = serde_json::from_value(json).unwrap();
        assert_eq!(plan.title, "Standup");
        assert_eq!(plan.proposed_times.len(), 1);
        assert_eq!(plan.duration_minutes, 60);
        assert_eq!(plan.location, "Virtual");
    }

    #[test]
    fn test_query_analysis_unknown_intent_tag() {
        let json = serde_json::json!({
            "intent": "interpretive_dance",
            "confidence": 0.4,
            "canAutomate": false
        });
        let analysis: QueryAnalysis = serde_json::from_value(json).unwrap();
        assert_eq!(analysis.intent, Intent::GeneralAssistance);
        assert!((analysis.confidence - 0.4).abs() < f64::EPSILON);
    }

    #[test]
    fn test_chat_turn_constructors() {
        assert_eq!(ChatTurn::user("q").role, ChatRole::User);
        assert_eq!(ChatTurn::assistant("a").role, ChatRole::Assistant);
        let json = serde_json::to_value(ChatTurn::user("q")).unwrap();
        assert_eq!(json["role"], "user");
    }
}
