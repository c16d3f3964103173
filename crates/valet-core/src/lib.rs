//! valet-core - multi-provider AI routing for a chat productivity assistant
//!
//! This crate provides:
//! - Adapters for Google Gemini, OpenAI, and a deterministic local mock,
//!   all behind the [`AiProvider`] trait
//! - [`AiRouter`], which tries adapters in priority order (free before
//!   paid, mock always last) and returns the first success
//! - Provider-agnostic result types for chat replies, query analysis,
//!   meeting summaries, action items, and meeting/task plans
//!
//! The router is a plain value meant to be constructed once by the process
//! entry point and handed to whatever controller needs it:
//!
//! ```no_run
//! use valet_core::{AiRouter, QueryContext, RouterConfig, UserProfile};
//!
//! # async fn run() -> Result<(), valet_core::RouterError> {
//! let router = AiRouter::from_config(&RouterConfig::from_env());
//! let user = UserProfile::new("u1", "Ada", "ada@example.com");
//! let reply = router
//!     .generate_response("Schedule a team meeting for tomorrow", &user, &QueryContext::new())
//!     .await?;
//! println!("[{}] {}", reply.provider, reply.message);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod intent;
pub mod providers;

pub use config::RouterConfig;
pub use error::{ProviderError, RouterError};
pub use intent::Intent;
pub use providers::router::{AiRouter, ProviderEntry, ProviderStat};
pub use providers::types::{
    ActionItem, AiProvider, AssistantReply, ChatRole, ChatTurn, CostTier, MeetingContext,
    MeetingPlan, MeetingSummary, Priority, QueryAnalysis, QueryContext, TaskPlan, UserProfile,
};
pub use providers::{GeminiProvider, MockProvider, OpenAiProvider};
