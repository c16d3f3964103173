//! Intent classification for user queries
//!
//! Deterministic keyword rules shared by the mock adapter and by the
//! plain-text fallback paths of the remote adapters. Remote providers may
//! return any of these tags from their own classification; unknown tags
//! deserialize as [`Intent::GeneralAssistance`] at the adapter boundary.

use serde::{Deserialize, Deserializer, Serialize};

/// What the user is asking the assistant to do
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    Greeting,
    MeetingSchedule,
    MeetingQuery,
    TaskCreate,
    TaskQuery,
    ReminderSet,
    DataQuery,
    SummaryRequest,
    #[default]
    GeneralAssistance,
}

impl Intent {
    /// Classify a query with keyword rules. Deterministic for a fixed input.
    pub fn detect(query: &str) -> Self {
        let lower = query.to_lowercase();
        let greets = lower
            .split(|c: char| !c.is_alphanumeric())
            .any(|word| matches!(word, "hello" | "hi" | "hey"));

        if greets {
            Self::Greeting
        } else if lower.contains("meeting") && lower.contains("schedule") {
            Self::MeetingSchedule
        } else if lower.contains("meeting") {
            Self::MeetingQuery
        } else if lower.contains("task") || lower.contains("todo") {
            Self::TaskCreate
        } else if lower.contains("remind") {
            Self::ReminderSet
        } else if lower.contains("summar") {
            Self::SummaryRequest
        } else if lower.contains("what") || lower.contains("show") {
            Self::DataQuery
        } else {
            Self::GeneralAssistance
        }
    }

    /// Parse a wire tag, mapping anything unrecognized to general assistance
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "greeting" => Self::Greeting,
            "meeting_schedule" => Self::MeetingSchedule,
            "meeting_query" => Self::MeetingQuery,
            "task_create" => Self::TaskCreate,
            "task_query" => Self::TaskQuery,
            "reminder_set" => Self::ReminderSet,
            "data_query" => Self::DataQuery,
            "summary_request" => Self::SummaryRequest,
            _ => Self::GeneralAssistance,
        }
    }

    /// The snake_case wire tag for this intent
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Greeting => "greeting",
            Self::MeetingSchedule => "meeting_schedule",
            Self::MeetingQuery => "meeting_query",
            Self::TaskCreate => "task_create",
            Self::TaskQuery => "task_query",
            Self::ReminderSet => "reminder_set",
            Self::DataQuery => "data_query",
            Self::SummaryRequest => "summary_request",
            Self::GeneralAssistance => "general_assistance",
        }
    }

    /// Intents that cannot be acted on without more details from the user
    pub fn requires_follow_up(self) -> bool {
        matches!(self, Self::MeetingSchedule | Self::TaskCreate)
    }

    /// Quick-action suggestions shown alongside a reply
    pub fn suggestions(self) -> Vec<String> {
        let items: &[&str] = match self {
            Self::MeetingSchedule => &["Schedule for tomorrow", "Add participants", "Set agenda"],
            Self::TaskCreate => &["Set deadline", "Add description", "Assign to someone"],
            Self::MeetingQuery => &["View upcoming", "Check past meetings", "Export schedule"],
            Self::TaskQuery => &["View pending", "Check completed", "Filter by priority"],
            _ => &[
                "Schedule meeting",
                "Create task",
                "Set reminder",
                "View schedule",
            ],
        };
        items.iter().map(|s| s.to_string()).collect()
    }

    /// Questions the assistant should ask before it can act on the intent
    pub fn follow_up_questions(self) -> Vec<String> {
        let items: &[&str] = match self {
            Self::MeetingSchedule => &[
                "What is the meeting about?",
                "When should we schedule it?",
                "Who should attend?",
            ],
            Self::TaskCreate => &[
                "What is the task title?",
                "When is it due?",
                "What is the priority?",
            ],
            _ => &["Can you provide more details?"],
        };
        items.iter().map(|s| s.to_string()).collect()
    }
}

impl<'de> Deserialize<'de> for Intent {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let tag = String::deserialize(deserializer)?;
        Ok(Self::from_tag(&tag))
    }
}

impl std::fmt::Display for Intent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_meeting_schedule() {
        assert_eq!(
            Intent::detect("Schedule a team meeting for tomorrow"),
            Intent::MeetingSchedule
        );
        assert!(Intent::detect("Schedule a team meeting for tomorrow").requires_follow_up());
    }

    #[test]
    fn test_detect_greeting_is_word_bounded() {
        assert_eq!(Intent::detect("Hello there"), Intent::Greeting);
        assert_eq!(Intent::detect("hi"), Intent::Greeting);
        // "something" contains the letters "hi" but is not a greeting
        assert_ne!(Intent::detect("show me something"), Intent::Greeting);
    }

    #[test]
    fn test_detect_other_intents() {
        assert_eq!(Intent::detect("any meetings today?"), Intent::MeetingQuery);
        assert_eq!(Intent::detect("add a todo for friday"), Intent::TaskCreate);
        assert_eq!(Intent::detect("remind me at 5pm"), Intent::ReminderSet);
        assert_eq!(
            Intent::detect("summarize the standup"),
            Intent::SummaryRequest
        );
        assert_eq!(Intent::detect("what is on my plate"), Intent::DataQuery);
        assert_eq!(Intent::detect("good evening"), Intent::GeneralAssistance);
    }

    #[test]
    fn test_requires_follow_up() {
        assert!(Intent::MeetingSchedule.requires_follow_up());
        assert!(Intent::TaskCreate.requires_follow_up());
        assert!(!Intent::Greeting.requires_follow_up());
        assert!(!Intent::DataQuery.requires_follow_up());
    }

    #[test]
    fn test_serde_tag_matches_as_str() {
        for intent in [
            Intent::Greeting,
            Intent::MeetingSchedule,
            Intent::TaskCreate,
            Intent::GeneralAssistance,
        ] {
            let json = serde_json::to_string(&intent).unwrap();
            assert_eq!(json, format!("\"{}\"", intent.as_str()));
            let parsed: Intent = serde_json::from_str(&json).unwrap();
            assert_eq!(parsed, intent);
        }
    }

    #[test]
    fn test_unknown_tag_parses_as_general_assistance() {
        let parsed: Intent = serde_json::from_str("\"banana\"").unwrap();
        assert_eq!(parsed, Intent::GeneralAssistance);
        assert_eq!(Intent::from_tag("meeting_query"), Intent::MeetingQuery);
    }

    #[test]
    fn test_display_uses_wire_tag() {
        assert_eq!(Intent::MeetingSchedule.to_string(), "meeting_schedule");
        assert_eq!(Intent::GeneralAssistance.to_string(), "general_assistance");
    }
}
