//! OpenAI adapter
//!
//! Chat-completions client. Structured operations run in JSON mode
//! (`response_format: json_object`) so the reply body deserializes directly;
//! `generate_response` keeps the original two-step flow of classifying the
//! query first and composing the reply from the analysis.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::{Map, Value};
use tracing::debug;

use crate::config::credentials_present;
use crate::error::ProviderError;
use crate::providers::truncate_chars;
use crate::providers::types::{
    ActionItem, AiProvider, AssistantReply, ChatRole, ChatTurn, MeetingContext, MeetingPlan,
    MeetingSummary, QueryAnalysis, QueryContext, TaskPlan, UserProfile,
};

const API_URL: &str = "https://api.openai.com/v1/chat/completions";

const SUMMARY_TRANSCRIPT_CHARS: usize = 4_000;
const ACTION_ITEM_TRANSCRIPT_CHARS: usize = 3_000;

/// Adapter for the OpenAI chat-completions API
pub struct OpenAiProvider {
    client: Client,
    api_key: String,
    model: String,
}

impl std::fmt::Debug for OpenAiProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiProvider")
            .field("api_key", &"[REDACTED]")
            .field("model", &self.model)
            .finish()
    }
}

#[derive(Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ApiMessage>,
    temperature: f32,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Serialize)]
struct ApiMessage {
    role: &'static str,
    content: String,
}

impl ApiMessage {
    fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system",
            content: content.into(),
        }
    }

    fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user",
            content: content.into(),
        }
    }
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

/// JSON mode always returns an object, so action items arrive wrapped
#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
struct ActionItemsEnvelope {
    action_items: Vec<ActionItem>,
}

impl OpenAiProvider {
    /// Fails with [`ProviderError::Unavailable`] when the key is missing or
    /// still a placeholder. That check happens once, here, not per call.
    pub fn new(
        api_key: impl Into<String>,
        model: impl Into<String>,
    ) -> Result<Self, ProviderError> {
        let api_key = api_key.into();
        if !credentials_present(&api_key) {
            return Err(ProviderError::Unavailable(
                "OpenAI API key not configured".to_string(),
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

    async fn chat(
        &self,
        messages: Vec<ApiMessage>,
        temperature: f32,
        max_tokens: u32,
        json_output: bool,
    ) -> Result<String, ProviderError> {
        let request = ChatCompletionRequest {
            model: self.model.clone(),
            messages,
            temperature,
            max_tokens,
            response_format: json_output.then_some(ResponseFormat {
                kind: "json_object",
            }),
        };

        debug!(model = %self.model, json_output, "openai chat completion request");

        let response = self
            .client
            .post(API_URL)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| ProviderError::RequestFailed(format!("openai request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            if status == StatusCode::TOO_MANY_REQUESTS
                || body.contains("insufficient_quota")
                || body.contains("billing")
            {
                return Err(ProviderError::RateLimited(format!(
                    "openai quota exhausted ({status})"
                )));
            }
            return Err(ProviderError::RequestFailed(format!(
                "openai returned {status}: {}",
                truncate_chars(&body, 200)
            )));
        }

        let parsed: ChatCompletionResponse = response.json().await.map_err(|e| {
            ProviderError::RequestFailed(format!("malformed openai response: {e}"))
        })?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|text| !text.is_empty())
            .ok_or_else(|| {
                ProviderError::RequestFailed("openai response contained no content".to_string())
            })
    }

    async fn complete(
        &self,
        system: &str,
        prompt: String,
        temperature: f32,
        max_tokens: u32,
        json_output: bool,
    ) -> Result<String, ProviderError> {
        self.chat(
            vec![ApiMessage::system(system), ApiMessage::user(prompt)],
            temperature,
            max_tokens,
            json_output,
        )
        .await
    }

    fn parse_json<T: DeserializeOwned>(text: &str) -> Result<T, ProviderError> {
        serde_json::from_str(text)
            .map_err(|e| ProviderError::RequestFailed(format!("malformed openai JSON: {e}")))
    }
}

#[async_trait]
impl AiProvider for OpenAiProvider {
    fn name(&self) -> &'static str {
        "openai"
    }

    async fn generate_response(
        &self,
        query: &str,
        user: &UserProfile,
        context: &QueryContext,
    ) -> Result<AssistantReply, ProviderError> {
        let analysis = self.analyze_query(query, user, context).await?;

        let prompt = format!(
            "Query: \"{query}\"\n\
             Intent: {intent}\n\
             Requires follow-up: {requires_follow_up}\n\
             Missing info: {missing}\n\
             \n\
             User: {name}\n\
             \n\
             Provide a helpful response. {closing}",
            intent = analysis.intent,
            requires_follow_up = analysis.requires_follow_up,
            missing = if analysis.follow_up_questions.is_empty() {
                "None".to_string()
            } else {
                analysis.follow_up_questions.join(", ")
            },
            name = user.name,
            closing = if analysis.requires_follow_up {
                "Ask the follow-up questions."
            } else {
                "Give a complete answer."
            },
        );

        let message = self
            .complete(
                "You are an AI productivity assistant.",
                prompt,
                0.7,
                500,
                false,
            )
            .await?;

        Ok(AssistantReply {
            message,
            intent: analysis.intent,
            data: Map::new(),
            suggestions: analysis.suggested_actions,
            requires_follow_up: analysis.requires_follow_up,
            follow_up_questions: analysis.follow_up_questions,
            ..Default::default()
        })
    }

    async fn meeting_summary(
        &self,
        transcript: &str,
        meeting: &MeetingContext,
    ) -> Result<MeetingSummary, ProviderError> {
        let prompt = format!(
            "Generate a meeting summary from this transcript.\n\
             \n\
             Meeting: {title}\n\
             \n\
             Transcript: {transcript}\n\
             \n\
             Return a JSON object with: summary, keyPoints [string], decisions [string], \
             actionItems [{{description, responsiblePerson, deadline as YYYY-MM-DD, \
             priority}}], nextSteps [string].",
            title = meeting.title.as_deref().unwrap_or("Meeting"),
            transcript = truncate_chars(transcript, SUMMARY_TRANSCRIPT_CHARS),
        );

        let text = self
            .complete("Generate meeting summaries.", prompt, 0.3, 1000, true)
            .await?;
        Self::parse_json(&text)
    }

    async fn extract_action_items(
        &self,
        transcript: &str,
    ) -> Result<Vec<ActionItem>, ProviderError> {
        let prompt = format!(
            "Extract action items from this meeting transcript.\n\
             Return a JSON object: {{\"actionItems\": [{{\"description\": \"\", \
             \"responsiblePerson\": \"\", \"deadline\": \"YYYY-MM-DD\", \
             \"priority\": \"low|medium|high\"}}]}}\n\
             \n\
             Transcript: {}",
            truncate_chars(transcript, ACTION_ITEM_TRANSCRIPT_CHARS),
        );

        let text = self
            .complete("Extract action items.", prompt, 0.2, 500, true)
            .await?;
        let envelope: ActionItemsEnvelope = Self::parse_json(&text)?;
        Ok(envelope.action_items)
    }

    async fn schedule_meeting(
        &self,
        prompt: &str,
        user: &UserProfile,
    ) -> Result<MeetingPlan, ProviderError> {
        let request = format!(
            "Parse this meeting request: \"{prompt}\"\n\
             Current User: {name} ({email})\n\
             Current Time: {now}\n\
             \n\
             Return a JSON object with: title, description, proposedTimes [RFC 3339 \
             strings], durationMinutes, participants [email], agenda [string], \
             location, priority (low|medium|high).",
            name = user.name,
            email = user.email,
            now = chrono::Utc::now().to_rfc3339(),
        );

        let text = self
            .complete("Parse meeting details.", request, 0.1, 500, true)
            .await?;
        let mut plan: MeetingPlan = Self::parse_json(&text)?;
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
            "Parse this task request: \"{prompt}\"\n\
             Current User: {name} ({email})\n\
             \n\
             Return a JSON object with: title, description, assignedTo (email), \
             dueDate (YYYY-MM-DD), priority (low|medium|high), tags [string], \
             estimatedHours (number).",
            name = user.name,
            email = user.email,
        );

        let text = self
            .complete("Parse task details.", request, 0.1, 500, true)
            .await?;
        let mut task: TaskPlan = Self::parse_json(&text)?;
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
            "Analyze this query: \"{query}\"\n\
             Context: {context}\n\
             \n\
             Classify intent into one of: meeting_schedule, meeting_query, task_create, \
             task_query, reminder_set, data_query, summary_request, general_assistance.\n\
             \n\
             Return a JSON object with: intent, confidence (0.0-1.0), requiresFollowUp, \
             followUpQuestions [string], suggestedActions [string], canAutomate.",
            context = Value::Object(context.clone()),
        );

        let text = self
            .complete("Analyze query intent.", prompt, 0.1, 300, true)
            .await?;
        Self::parse_json(&text)
    }

    async fn chat_completion(
        &self,
        history: &[ChatTurn],
        _user: &UserProfile,
    ) -> Result<ChatTurn, ProviderError> {
        let mut messages = vec![ApiMessage::system("You are an AI assistant.")];
        messages.extend(history.iter().map(|turn| ApiMessage {
            role: match turn.role {
                ChatRole::User => "user",
                ChatRole::Assistant => "assistant",
                ChatRole::System => "system",
            },
            content: turn.content.clone(),
        }));

        let text = self.chat(messages, 0.7, 500, false).await?;
        Ok(ChatTurn::assistant(text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_rejects_missing_or_placeholder_key() {
        assert!(matches!(
            OpenAiProvider::new("", "gpt-3.5-turbo"),
            Err(ProviderError::Unavailable(_))
        ));
        assert!(matches!(
            OpenAiProvider::new("your_actual_key_goes_here", "gpt-3.5-turbo"),
            Err(ProviderError::Unavailable(_))
        ));
        assert!(OpenAiProvider::new("sk-real", "gpt-3.5-turbo").is_ok());
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let provider = OpenAiProvider::new("sk-secret", "gpt-3.5-turbo").unwrap();
        let debug = format!("{provider:?}");
        assert!(!debug.contains("sk-secret"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn test_request_omits_response_format_unless_json() {
        let request = ChatCompletionRequest {
            model: "gpt-3.5-turbo".to_string(),
            messages: vec![ApiMessage::user("hi")],
            temperature: 0.7,
            max_tokens: 500,
            response_format: None,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert!(json.get("response_format").is_none());
        assert_eq!(json["messages"][0]["role"], "user");

        let request = ChatCompletionRequest {
            response_format: Some(ResponseFormat {
                kind: "json_object",
            }),
            ..request
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["response_format"]["type"], "json_object");
    }

    #[test]
    fn test_response_content_extraction_shape() {
        let json = serde_json::json!({
            "choices": [
                {"message": {"role": "assistant", "content": "hello there"}}
            ]
        });
        let parsed: ChatCompletionResponse = serde_json::from_value(json).unwrap();
        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content);
        assert_eq!(content.as_deref(), Some("hello there"));
    }

    #[test]
    fn test_action_items_envelope() {
        let json = serde_json::json!({
            "actionItems": [
                {"description": "Ship it", "responsiblePerson": "sam", "priority": "high"}
            ]
        });
        let envelope: ActionItemsEnvelope = serde_json::from_value(json).unwrap();
        assert_eq!(envelope.action_items.len(), 1);
        assert_eq!(envelope.action_items[0].description, "Ship it");
    }

    #[test]
    fn test_parse_json_reports_malformed_body() {
        let err = OpenAiProvider::parse_json::<QueryAnalysis>("not json").unwrap_err();
        assert!(matches!(err, ProviderError::RequestFailed(_)));
    }
}
