//! Google Gemini adapter
//!
//! Talks to the `generateContent` REST endpoint. Tried first in the default
//! chain because the free tier makes it the cheapest remote option.
//! Structured operations ask for JSON-only replies and parse the first JSON
//! value out of whatever the model actually sends back.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::{Map, Value};
use tracing::debug;

use crate::config::credentials_present;
use crate::error::ProviderError;
use crate::intent::Intent;
use crate::providers::types::{
    ActionItem, AiProvider, AssistantReply, ChatRole, ChatTurn, MeetingContext, MeetingPlan,
    MeetingSummary, QueryAnalysis, QueryContext, TaskPlan, UserProfile,
};
use crate::providers::{extract_json_array, extract_json_object, truncate_chars};

const API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";

// Free-tier input limits are tighter than OpenAI's, so transcripts are
// clipped harder here.
const SUMMARY_TRANSCRIPT_CHARS: usize = 10_000;
const ACTION_ITEM_TRANSCRIPT_CHARS: usize = 8_000;

/// Adapter for the Gemini text-generation API
pub struct GeminiProvider {
    client: Client,
    api_key: String,
    model: String,
}

impl std::fmt::Debug for GeminiProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiProvider")
            .field("api_key", &"[REDACTED]")
            .field("model", &self.model)
            .finish()
    }
}

#[derive(Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content {
    role: &'static str,
    parts: Vec<Part>,
}

impl Content {
    fn user(text: String) -> Self {
        Self {
            role: "user",
            parts: vec![Part { text }],
        }
    }

    fn model(text: String) -> Self {
        Self {
            role: "model",
            parts: vec![Part { text }],
        }
    }
}

#[derive(Serialize)]
struct Part {
    text: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    top_p: f32,
    top_k: u32,
    max_output_tokens: u32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            top_p: 0.8,
            top_k: 40,
            max_output_tokens: 2048,
        }
    }
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    #[serde(default)]
    content: CandidateContent,
}

#[derive(Deserialize, Default)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: Option<String>,
}

/// Shape `generate_response` asks the model to produce. Everything is
/// optional; a prose-only reply still yields a usable result.
#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
struct LooseReply {
    message: String,
    intent: Option<String>,
    data: Map<String, Value>,
    suggestions: Vec<String>,
    requires_follow_up: bool,
    follow_up_questions: Vec<String>,
}

impl GeminiProvider {
    /// Fails with [`ProviderError::Unavailable`] when the key is missing or
    /// still a placeholder. That check happens once, here, not per call.
    pub fn new(
        api_key: impl Into<String>,
        model: impl Into<String>,
    ) -> Result<Self, ProviderError> {
        let api_key = api_key.into();
        if !credentials_present(&api_key) {
            return Err(ProviderError::Unavailable(
                "Gemini API key not configured".to_string(),
            ));
        }
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| ProviderError::Unavailable(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            api_key,
            model: model.into(),
        })
    }

    async fn generate(&self, contents: Vec<Content>) -> Result<String, ProviderError> {
        let url = format!("{API_BASE}/{}:generateContent?key={}", self.model, self.api_key);
        let request = GenerateContentRequest {
            contents,
            generation_config: GenerationConfig::default(),
        };

        debug!(model = %self.model, "gemini generateContent request");

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| ProviderError::RequestFailed(format!("gemini request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            if status == StatusCode::TOO_MANY_REQUESTS
                || body.contains("RESOURCE_EXHAUSTED")
                || body.contains("quota")
            {
                return Err(ProviderError::RateLimited(format!(
                    "gemini quota exhausted ({status})"
                )));
            }
            return Err(ProviderError::RequestFailed(format!(
                "gemini returned {status}: {}",
                truncate_chars(&body, 200)
            )));
        }

        let parsed: GenerateContentResponse = response.json().await.map_err(|e| {
            ProviderError::RequestFailed(format!("malformed gemini response: {e}"))
        })?;

        parsed
            .candidates
            .into_iter()
            .next()
            .map(|c| {
                c.content
                    .parts
                    .into_iter()
                    .filter_map(|p| p.text)
                    .collect::<String>()
            })
            .filter(|text| !text.is_empty())
            .ok_or_else(|| {
                ProviderError::RequestFailed("gemini response contained no text".to_string())
            })
    }

    async fn prompt(&self, text: String) -> Result<String, ProviderError> {
        self.generate(vec![Content::user(text)]).await
    }

    fn parse_object<T: DeserializeOwned>(text: &str) -> Result<T, ProviderError> {
        let json = extract_json_object(text).ok_or_else(|| {
            ProviderError::RequestFailed("gemini reply contained no JSON object".to_string())
        })?;
        serde_json::from_str(json)
            .map_err(|e| ProviderError::RequestFailed(format!("malformed gemini JSON: {e}")))
    }

    fn parse_array<T: DeserializeOwned>(text: &str) -> Result<Vec<T>, ProviderError> {
        let json = extract_json_array(text).ok_or_else(|| {
            ProviderError::RequestFailed("gemini reply contained no JSON array".to_string())
        })?;
        serde_json::from_str(json)
            .map_err(|e| ProviderError::RequestFailed(format!("malformed gemini JSON: {e}")))
    }
}

#[async_trait]
impl AiProvider for GeminiProvider {
    fn name(&self) -> &'static str {
        "gemini"
    }

    async fn generate_response(
        &self,
        query: &str,
        user: &UserProfile,
        context: &QueryContext,
    ) -> Result<AssistantReply, ProviderError> {
        let prompt = format!(
            "You are an AI productivity assistant helping {name}.\n\
             \n\
             USER QUERY: {query}\n\
             CONVERSATION CONTEXT: {context}\n\
             USER PREFERENCES: {preferences}\n\
             \n\
             Respond helpfully and concisely. If the query is about scheduling meetings \
             or creating tasks, ask for any missing details and indicate the action can \
             be automated.\n\
             \n\
             Reply with a JSON object: {{\"message\": string, \"intent\": string tag, \
             \"data\": object, \"suggestions\": [string], \"requiresFollowUp\": bool, \
             \"followUpQuestions\": [string]}}.",
            name = user.name,
            context = Value::Object(context.clone()),
            preferences = Value::Object(user.preferences.clone()),
        );

        let text = self.prompt(prompt).await?;

        // Prose replies are still usable; classify locally and pass them on.
        let parsed =
            extract_json_object(&text).and_then(|json| serde_json::from_str::<LooseReply>(json).ok());
        match parsed {
            Some(parsed) => {
                let intent = parsed
                    .intent
                    .as_deref()
                    .map(Intent::from_tag)
                    .unwrap_or_else(|| Intent::detect(query));
                Ok(AssistantReply {
                    message: if parsed.message.is_empty() {
                        text
                    } else {
                        parsed.message
                    },
                    intent,
                    data: parsed.data,
                    suggestions: parsed.suggestions,
                    requires_follow_up: parsed.requires_follow_up,
                    follow_up_questions: parsed.follow_up_questions,
                    ..Default::default()
                })
            }
            None => {
                let intent = Intent::detect(query);
                Ok(AssistantReply {
                    message: text,
                    intent,
                    suggestions: intent.suggestions(),
                    requires_follow_up: intent.requires_follow_up(),
                    follow_up_questions: intent.follow_up_questions(),
                    ..Default::default()
                })
            }
        }
    }

    async fn meeting_summary(
        &self,
        transcript: &str,
        meeting: &MeetingContext,
    ) -> Result<MeetingSummary, ProviderError> {
        let prompt = format!(
            "Analyze this meeting transcript and generate a structured summary.\n\
             \n\
             MEETING DETAILS:\n\
             Title: {title}\n\
             Date: {date}\n\
             Participants: {participants}\n\
             \n\
             TRANSCRIPT:\n{transcript}\n\
             \n\
             Return ONLY a JSON object with: summary (2-3 sentences), keyPoints \
             [string], decisions [string], actionItems [{{description, \
             responsiblePerson, deadline as YYYY-MM-DD, priority}}], nextSteps [string].",
            title = meeting.title.as_deref().unwrap_or("Meeting"),
            date = meeting.date.as_deref().unwrap_or("Unknown"),
            participants = if meeting.participants.is_empty() {
                "Unknown".to_string()
            } else {
                meeting.participants.join(", ")
            },
            transcript = truncate_chars(transcript, SUMMARY_TRANSCRIPT_CHARS),
        );

        let text = self.prompt(prompt).await?;
        Self::parse_object(&text)
    }

    async fn extract_action_items(
        &self,
        transcript: &str,
    ) -> Result<Vec<ActionItem>, ProviderError> {
        let prompt = format!(
            "Extract action items from this meeting transcript.\n\
             Format as a JSON array: [{{\"description\": \"\", \"responsiblePerson\": \"\", \
             \"deadline\": \"YYYY-MM-DD\", \"priority\": \"low|medium|high\"}}]\n\
             \n\
             Transcript: {}\n\
             \n\
             Return ONLY JSON.",
            truncate_chars(transcript, ACTION_ITEM_TRANSCRIPT_CHARS),
        );

        let text = self.prompt(prompt).await?;
        Self::parse_array(&text)
    }

    async fn schedule_meeting(
        &self,
        prompt: &str,
        user: &UserProfile,
    ) -> Result<MeetingPlan, ProviderError> {
        let request = format!(
            "Parse this meeting scheduling request into structured JSON.\n\
             \n\
             Request: \"{prompt}\"\n\
             Current User: {name} ({email})\n\
             Current Time: {now}\n\
             \n\
             Return ONLY a JSON object with: title, description, proposedTimes \
             [RFC 3339 strings], durationMinutes (default 60), participants [email], \
             agenda [string], location, priority (low|medium|high).",
            name = user.name,
            email = user.email,
            now = chrono::Utc::now().to_rfc3339(),
        );

        let text = self.prompt(request).await?;
        let mut plan: MeetingPlan = Self::parse_object(&text)?;
        if plan.participants.is_empty() {
            plan.participants.push(user.email.clone());
        }
        Ok(plan)
    }

    async fn create_task(
        &self,
        prompt: &str,
        user: &UserProfile,
    ) -> Result<TaskPlan, ProviderError> {
        let request = format!(
            "Parse this task creation request into structured JSON.\n\
             \n\
             Request: \"{prompt}\"\n\
             Current User: {name} ({email})\n\
             \n\
             Return ONLY a JSON object with: title, description, assignedTo (email), \
             dueDate (YYYY-MM-DD), priority (low|medium|high), tags [string], \
             estimatedHours (number).",
            name = user.name,
            email = user.email,
        );

        let text = self.prompt(request).await?;
        let mut task: TaskPlan = Self::parse_object(&text)?;
        if task.assigned_to.is_empty() {
            task.assigned_to = user.email.clone();
        }
        Ok(task)
    }

    async fn analyze_query(
        &self,
        query: &str,
        _user: &UserProfile,
        context: &QueryContext,
    ) -> Result<QueryAnalysis, ProviderError> {
        let prompt = format!(
            "Analyze this user query for intent classification.\n\
             \n\
             Query: \"{query}\"\n\
             User Context: {context}\n\
             \n\
             Classify intent into one of: meeting_schedule, meeting_query, task_create, \
             task_query, reminder_set, data_query, summary_request, general_assistance.\n\
             \n\
             Return ONLY a JSON object with: intent, confidence (0.0-1.0), \
             requiresFollowUp, followUpQuestions [string], suggestedActions [string], \
             canAutomate.",
            context = Value::Object(context.clone()),
        );

        let text = self.prompt(prompt).await?;
        Self::parse_object(&text)
    }

    async fn chat_completion(
        &self,
        history: &[ChatTurn],
        _user: &UserProfile,
    ) -> Result<ChatTurn, ProviderError> {
        let contents: Vec<Content> = history
            .iter()
            .map(|turn| match turn.role {
                ChatRole::Assistant => Content::model(turn.content.clone()),
                // Gemini has no system role; fold system turns into user turns
                ChatRole::User | ChatRole::System => Content::user(turn.content.clone()),
            })
            .collect();

        if contents.is_empty() {
            return Err(ProviderError::RequestFailed(
                "chat history is empty".to_string(),
            ));
        }

        let text = self.generate(contents).await?;
        Ok(ChatTurn::assistant(text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_rejects_missing_or_placeholder_key() {
        assert!(matches!(
            GeminiProvider::new("", "gemini-pro"),
            Err(ProviderError::Unavailable(_))
        ));
        assert!(matches!(
            GeminiProvider::new("your_gemini_api_key_here", "gemini-pro"),
            Err(ProviderError::Unavailable(_))
        ));
        assert!(GeminiProvider::new("real-key", "gemini-pro").is_ok());
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let provider = GeminiProvider::new("super-secret", "gemini-pro").unwrap();
        let debug = format!("{provider:?}");
        assert!(!debug.contains("super-secret"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn test_request_serialization() {
        let request = GenerateContentRequest {
            contents: vec![Content::user("hello".to_string())],
            generation_config: GenerationConfig::default(),
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["contents"][0]["role"], "user");
        assert_eq!(json["contents"][0]["parts"][0]["text"], "hello");
        assert_eq!(json["generationConfig"]["maxOutputTokens"], 2048);
        assert_eq!(json["generationConfig"]["topK"], 40);
    }

    #[test]
    fn test_response_text_extraction_shape() {
        let json = serde_json::json!({
            "candidates": [
                {"content": {"parts": [{"text": "part one "}, {"text": "part two"}]}}
            ]
        });
        let parsed: GenerateContentResponse = serde_json::from_value(json).unwrap();
        let text: String = parsed.candidates[0]
            .content
            .parts
            .iter()
            .filter_map(|p| p.text.clone())
            .collect();
        assert_eq!(text, "part one part two");
    }

    #[test]
    fn test_response_without_candidates() {
        let parsed: GenerateContentResponse =
            serde_json::from_value(serde_json::json!({})).unwrap();
        assert!(parsed.candidates.is_empty());
    }

    #[test]
    fn test_loose_reply_parsing() {
        let text = "Sure! ```json\n{\"message\": \"Booked.\", \"intent\": \"meeting_schedule\", \
                    \"requiresFollowUp\": true, \"followUpQuestions\": [\"When?\"]}\n```";
        let json = extract_json_object(text).unwrap();
        let parsed: LooseReply = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.message, "Booked.");
        assert_eq!(parsed.intent.as_deref(), Some("meeting_schedule"));
        assert!(parsed.requires_follow_up);
        assert_eq!(parsed.follow_up_questions, vec!["When?".to_string()]);
    }

    #[test]
    fn test_parse_object_rejects_prose() {
        let err = GeminiProvider::parse_object::<MeetingSummary>("no json here").unwrap_err();
        assert!(matches!(err, ProviderError::RequestFailed(_)));
    }
}
