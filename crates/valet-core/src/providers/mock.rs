//! Deterministic local adapter, the terminal fallback of the chain
//!
//! No network, no credentials, no failure modes: every operation is pure
//! keyword logic over the input, so the router can always land here when
//! the remote providers are down or unconfigured.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use serde_json::Map;
use tracing::debug;

use crate::error::ProviderError;
use crate::intent::Intent;
use crate::providers::types::{
    ActionItem, AiProvider, AssistantReply, ChatTurn, MeetingContext, MeetingPlan, MeetingSummary,
    Priority, QueryAnalysis, QueryContext, TaskPlan, UserProfile,
};

/// Always-available adapter backed by canned, intent-keyed responses
#[derive(Debug, Default)]
pub struct MockProvider {
    fail_all: bool,
}

impl MockProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fault-injection constructor so tests can exercise the router's
    /// exhaustion path. Never used outside tests; the real mock cannot fail.
    #[cfg(test)]
    pub(crate) fn failing() -> Self {
        Self { fail_all: true }
    }

    fn check_fault(&self) -> Result<(), ProviderError> {
        if self.fail_all {
            Err(ProviderError::RequestFailed(
                "mock fault injection".to_string(),
            ))
        } else {
            Ok(())
        }
    }

    fn canned_reply(intent: Intent, query: &str, user: &UserProfile) -> String {
        match intent {
            Intent::Greeting => format!(
                "Hello {}! I'm your AI assistant. How can I help you today?",
                user.name
            ),
            Intent::MeetingSchedule => {
                "I can help schedule a meeting. What's the meeting about and when would you like to schedule it?"
                    .to_string()
            }
            Intent::TaskCreate => {
                "I can create a task for you. What should I call the task and when is it due?"
                    .to_string()
            }
            Intent::MeetingQuery => {
                "I can check your meetings. What timeframe are you interested in?".to_string()
            }
            Intent::TaskQuery => {
                "I can show your tasks. Would you like to see pending, completed, or all tasks?"
                    .to_string()
            }
            _ => format!(
                "I understand you're asking about: {query}. I can help with scheduling meetings, \
                 creating tasks, setting reminders, and answering questions about your schedule."
            ),
        }
    }

    fn truncate(text: &str, limit: usize) -> String {
        text.chars().take(limit).collect()
    }
}

#[async_trait]
impl AiProvider for MockProvider {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn generate_response(
        &self,
        query: &str,
        user: &UserProfile,
        _context: &QueryContext,
    ) -> Result<AssistantReply, ProviderError> {
        self.check_fault()?;
        let intent = Intent::detect(query);
        debug!(intent = %intent, "mock classified query");

        Ok(AssistantReply {
            message: Self::canned_reply(intent, query, user),
            intent,
            data: Map::new(),
            suggestions: intent.suggestions(),
            requires_follow_up: intent.requires_follow_up(),
            follow_up_questions: if intent.requires_follow_up() {
                intent.follow_up_questions()
            } else {
                Vec::new()
            },
            ..Default::default()
        })
    }

    async fn meeting_summary(
        &self,
        transcript: &str,
        meeting: &MeetingContext,
    ) -> Result<MeetingSummary, ProviderError> {
        self.check_fault()?;
        let title = meeting.title.as_deref().unwrap_or("Meeting");
        Ok(MeetingSummary {
            summary: format!("{title}: {}...", Self::truncate(transcript, 200)),
            key_points: vec![
                "Discussion point 1".to_string(),
                "Discussion point 2".to_string(),
            ],
            decisions: vec!["Decision made".to_string()],
            action_items: vec![ActionItem {
                description: "Follow up on action item".to_string(),
                responsible_person: "team@example.com".to_string(),
                deadline: Some((Utc::now() + Duration::days(1)).date_naive()),
                priority: Priority::Medium,
            }],
            next_steps: vec!["Schedule follow-up".to_string()],
            ..Default::default()
        })
    }

    async fn extract_action_items(
        &self,
        _transcript: &str,
    ) -> Result<Vec<ActionItem>, ProviderError> {
        self.check_fault()?;
        Ok(vec![
            ActionItem {
                description: "Complete the report".to_string(),
                responsible_person: "user@example.com".to_string(),
                deadline: Some((Utc::now() + Duration::days(3)).date_naive()),
                priority: Priority::High,
            },
            ActionItem {
                description: "Schedule follow-up meeting".to_string(),
                responsible_person: "team@example.com".to_string(),
                deadline: Some((Utc::now() + Duration::days(7)).date_naive()),
                priority: Priority::Medium,
            },
        ])
    }

    async fn schedule_meeting(
        &self,
        prompt: &str,
        user: &UserProfile,
    ) -> Result<MeetingPlan, ProviderError> {
        self.check_fault()?;
        Ok(MeetingPlan {
            title: "Team Meeting".to_string(),
            description: format!("Discussion based on: {prompt}"),
            proposed_times: vec![Utc::now() + Duration::days(1), Utc::now() + Duration::days(2)],
            participants: vec![user.email.clone()],
            agenda: vec!["General discussion".to_string()],
            ..Default::default()
        })
    }

    async fn create_task(
        &self,
        prompt: &str,
        user: &UserProfile,
    ) -> Result<TaskPlan, ProviderError> {
        self.check_fault()?;
        Ok(TaskPlan {
            title: "New Task".to_string(),
            description: prompt.to_string(),
            assigned_to: user.email.clone(),
            due_date: Some((Utc::now() + Duration::days(3)).date_naive()),
            priority: Priority::Medium,
            tags: vec!["general".to_string()],
            estimated_hours: 2.0,
        })
    }

    async fn analyze_query(
        &self,
        query: &str,
        _user: &UserProfile,
        _context: &QueryContext,
    ) -> Result<QueryAnalysis, ProviderError> {
        self.check_fault()?;
        let intent = Intent::detect(query);
        Ok(QueryAnalysis {
            intent,
            confidence: 0.8,
            requires_follow_up: intent.requires_follow_up(),
            follow_up_questions: intent.follow_up_questions(),
            suggested_actions: intent.suggestions(),
            can_automate: intent.requires_follow_up(),
            entities: Default::default(),
        })
    }

    async fn chat_completion(
        &self,
        history: &[ChatTurn],
        _user: &UserProfile,
    ) -> Result<ChatTurn, ProviderError> {
        self.check_fault()?;
        let last = history.last().map(|t| t.content.as_str()).unwrap_or("");
        Ok(ChatTurn::assistant(format!(
            "Mock response to: {}...",
            Self::truncate(last, 50)
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> UserProfile {
        UserProfile::new("u1", "Ada", "ada@example.com")
    }

    #[tokio::test]
    async fn test_schedule_query_is_deterministic() {
        let mock = MockProvider::new();
        let reply = mock
            .generate_response(
                "Schedule a team meeting for tomorrow",
                &user(),
                &QueryContext::new(),
            )
            .await
            .unwrap();
        assert_eq!(reply.intent, Intent::MeetingSchedule);
        assert!(reply.requires_follow_up);
        assert!(!reply.follow_up_questions.is_empty());
        // Router, not the adapter, stamps the provider
        assert!(reply.provider.is_empty());
    }

    #[tokio::test]
    async fn test_greeting_uses_user_name() {
        let mock = MockProvider::new();
        let reply = mock
            .generate_response("hello", &user(), &QueryContext::new())
            .await
            .unwrap();
        assert_eq!(reply.intent, Intent::Greeting);
        assert!(reply.message.contains("Ada"));
        assert!(!reply.requires_follow_up);
        assert!(reply.follow_up_questions.is_empty());
    }

    #[tokio::test]
    async fn test_meeting_summary_truncates_transcript() {
        let mock = MockProvider::new();
        let transcript = "x".repeat(500);
        let summary = mock
            .meeting_summary(&transcript, &MeetingContext::default())
            .await
            .unwrap();
        assert!(summary.summary.len() < transcript.len());
        assert!(!summary.action_items.is_empty());
    }

    #[tokio::test]
    async fn test_plans_reference_user_and_prompt() {
        let mock = MockProvider::new();
        let plan = mock
            .schedule_meeting("sync about the launch", &user())
            .await
            .unwrap();
        assert_eq!(plan.participants, vec!["ada@example.com".to_string()]);
        assert!(plan.description.contains("sync about the launch"));
        assert_eq!(plan.proposed_times.len(), 2);

        let task = mock.create_task("write the report", &user()).await.unwrap();
        assert_eq!(task.assigned_to, "ada@example.com");
        assert!(task.due_date.is_some());
    }

    #[tokio::test]
    async fn test_chat_completion_echoes_last_turn() {
        let mock = MockProvider::new();
        let history = vec![ChatTurn::user("first"), ChatTurn::user("second question")];
        let turn = mock.chat_completion(&history, &user()).await.unwrap();
        assert!(turn.content.contains("second question"));
    }

    #[tokio::test]
    async fn test_fault_injection_fails_every_operation() {
        let mock = MockProvider::failing();
        let err = mock
            .generate_response("hi", &user(), &QueryContext::new())
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::RequestFailed(_)));
        assert!(mock.extract_action_items("t").await.is_err());
        assert!(mock.chat_completion(&[], &user()).await.is_err());
    }
}
