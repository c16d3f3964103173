//! Priority-ordered provider routing with failover
//!
//! The router owns an immutable ordered list of provider entries, built
//! once at startup: free-tier remotes first, paid remotes next, the mock
//! always last. Every operation walks that list and returns the first
//! success; a failing provider is logged and skipped, never retried. Only
//! when the whole chain fails does the caller see an error, and it is a
//! single aggregated one.
//!
//! There is no shared mutable state between calls, so one router instance
//! can serve any number of concurrent callers without locking.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::RouterConfig;
use crate::error::RouterError;
use crate::providers::gemini::GeminiProvider;
use crate::providers::mock::MockProvider;
use crate::providers::openai::OpenAiProvider;
use crate::providers::types::{
    ActionItem, AiProvider, AssistantReply, ChatTurn, CostTier, MeetingContext, MeetingPlan,
    MeetingSummary, QueryAnalysis, QueryContext, TaskPlan, UserProfile,
};

/// One provider in the fallback chain
pub struct ProviderEntry {
    priority: u8,
    cost: CostTier,
    provider: Arc<dyn AiProvider>,
}

impl ProviderEntry {
    pub fn new(priority: u8, cost: CostTier, provider: Arc<dyn AiProvider>) -> Self {
        Self {
            priority,
            cost,
            provider,
        }
    }

    pub fn name(&self) -> &'static str {
        self.provider.name()
    }

    pub fn priority(&self) -> u8 {
        self.priority
    }

    pub fn cost(&self) -> CostTier {
        self.cost
    }
}

impl std::fmt::Debug for ProviderEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderEntry")
            .field("name", &self.name())
            .field("priority", &self.priority)
            .field("cost", &self.cost)
            .finish()
    }
}

/// Snapshot of one entry, for status reporting
#[derive(Debug, Clone, Serialize)]
pub struct ProviderStat {
    pub name: &'static str,
    pub priority: u8,
    pub cost: CostTier,
    pub available: bool,
}

/// Walks provider entries in priority order until one succeeds
#[derive(Debug)]
pub struct AiRouter {
    entries: Vec<ProviderEntry>,
}

impl AiRouter {
    /// Build a router over the given entries, sorted ascending by priority.
    /// The sort is stable, so equal priorities keep insertion order. The
    /// chain is never left empty: with no entries at all, a mock fallback
    /// is added so every call can still produce a result.
    pub fn new(mut entries: Vec<ProviderEntry>) -> Self {
        if entries.is_empty() {
            warn!("router constructed with no providers, adding mock fallback");
            entries.push(ProviderEntry::new(
                u8::MAX,
                CostTier::Free,
                Arc::new(MockProvider::new()),
            ));
        }
        entries.sort_by_key(|e| e.priority());
        info!(
            active = entries[0].name(),
            providers = entries.len(),
            "ai router initialized"
        );
        Self { entries }
    }

    /// Standard chain: Gemini (free) if configured, OpenAI (paid) if
    /// configured, mock always last
    pub fn from_config(config: &RouterConfig) -> Self {
        let mut entries = Vec::new();

        match &config.gemini_api_key {
            Some(key) => match GeminiProvider::new(key.clone(), config.gemini_model.clone()) {
                Ok(provider) => {
                    info!(model = %config.gemini_model, "gemini provider initialized");
                    entries.push(ProviderEntry::new(1, CostTier::Free, Arc::new(provider)));
                }
                Err(err) => warn!(error = %err, "gemini provider unavailable"),
            },
            None => info!("GEMINI_API_KEY not configured, skipping gemini"),
        }

        match &config.openai_api_key {
            Some(key) => match OpenAiProvider::new(key.clone(), config.openai_model.clone()) {
                Ok(provider) => {
                    info!(model = %config.openai_model, "openai provider initialized");
                    entries.push(ProviderEntry::new(2, CostTier::Paid, Arc::new(provider)));
                }
                Err(err) => warn!(error = %err, "openai provider unavailable"),
            },
            None => info!("OPENAI_API_KEY not configured, skipping openai"),
        }

        entries.push(ProviderEntry::new(
            3,
            CostTier::Free,
            Arc::new(MockProvider::new()),
        ));

        Self::new(entries)
    }

    /// Name, priority, cost, and availability of every entry, in try order
    pub fn provider_stats(&self) -> Vec<ProviderStat> {
        self.entries
            .iter()
            .map(|entry| ProviderStat {
                name: entry.name(),
                priority: entry.priority(),
                cost: entry.cost(),
                available: entry.provider.is_available(),
            })
            .collect()
    }

    /// Pin the named provider as first-tried. The rest of the chain keeps
    /// its order, so fallback still works. Returns false for unknown names.
    pub fn switch_provider(&mut self, name: &str) -> bool {
        match self.entries.iter().position(|e| e.name() == name) {
            Some(pos) => {
                let entry = self.entries.remove(pos);
                self.entries.insert(0, entry);
                info!(provider = name, "provider pinned to front of chain");
                true
            }
            None => {
                warn!(provider = name, "cannot switch to unknown provider");
                false
            }
        }
    }

    /// Answer a free-form query. The winning entry's name and cost tier
    /// are stamped on the reply.
    pub async fn generate_response(
        &self,
        query: &str,
        user: &UserProfile,
        context: &QueryContext,
    ) -> Result<AssistantReply, RouterError> {
        let mut attempts = Vec::new();
        for entry in &self.entries {
            debug!(provider = entry.name(), "trying provider");
            match entry.provider.generate_response(query, user, context).await {
                Ok(mut reply) => {
                    reply.provider = entry.name().to_string();
                    reply.cost = entry.cost();
                    info!(provider = entry.name(), cost = %entry.cost(), "response generated");
                    return Ok(reply);
                }
                Err(err) => {
                    warn!(provider = entry.name(), error = %err, "provider failed, falling back");
                    attempts.push((entry.name().to_string(), err));
                }
            }
        }
        Err(RouterError::Exhausted {
            operation: "generate_response",
            attempts,
        })
    }

    /// Summarize a transcript. The winning entry's name is stamped on the
    /// summary.
    pub async fn meeting_summary(
        &self,
        transcript: &str,
        meeting: &MeetingContext,
    ) -> Result<MeetingSummary, RouterError> {
        let mut attempts = Vec::new();
        for entry in &self.entries {
            match entry.provider.meeting_summary(transcript, meeting).await {
                Ok(mut summary) => {
                    summary.provider = entry.name().to_string();
                    info!(provider = entry.name(), "meeting summary generated");
                    return Ok(summary);
                }
                Err(err) => {
                    warn!(provider = entry.name(), error = %err, "provider failed, falling back");
                    attempts.push((entry.name().to_string(), err));
                }
            }
        }
        Err(RouterError::Exhausted {
            operation: "meeting_summary",
            attempts,
        })
    }

    pub async fn extract_action_items(
        &self,
        transcript: &str,
    ) -> Result<Vec<ActionItem>, RouterError> {
        let mut attempts = Vec::new();
        for entry in &self.entries {
            match entry.provider.extract_action_items(transcript).await {
                Ok(items) => {
                    info!(provider = entry.name(), items = items.len(), "action items extracted");
                    return Ok(items);
                }
                Err(err) => {
                    warn!(provider = entry.name(), error = %err, "provider failed, falling back");
                    attempts.push((entry.name().to_string(), err));
                }
            }
        }
        Err(RouterError::Exhausted {
            operation: "extract_action_items",
            attempts,
        })
    }

    pub async fn schedule_meeting(
        &self,
        prompt: &str,
        user: &UserProfile,
    ) -> Result<MeetingPlan, RouterError> {
        let mut attempts = Vec::new();
        for entry in &self.entries {
            match entry.provider.schedule_meeting(prompt, user).await {
                Ok(plan) => {
                    info!(provider = entry.name(), "meeting request parsed");
                    return Ok(plan);
                }
                Err(err) => {
                    warn!(provider = entry.name(), error = %err, "provider failed, falling back");
                    attempts.push((entry.name().to_string(), err));
                }
            }
        }
        Err(RouterError::Exhausted {
            operation: "schedule_meeting",
            attempts,
        })
    }

    pub async fn create_task(
        &self,
        prompt: &str,
        user: &UserProfile,
    ) -> Result<TaskPlan, RouterError> {
        let mut attempts = Vec::new();
        for entry in &self.entries {
            match entry.provider.create_task(prompt, user).await {
                Ok(task) => {
                    info!(provider = entry.name(), "task request parsed");
                    return Ok(task);
                }
                Err(err) => {
                    warn!(provider = entry.name(), error = %err, "provider failed, falling back");
                    attempts.push((entry.name().to_string(), err));
                }
            }
        }
        Err(RouterError::Exhausted {
            operation: "create_task",
            attempts,
        })
    }

    pub async fn analyze_query(
        &self,
        query: &str,
        user: &UserProfile,
        context: &QueryContext,
    ) -> Result<QueryAnalysis, RouterError> {
        let mut attempts = Vec::new();
        for entry in &self.entries {
            match entry.provider.analyze_query(query, user, context).await {
                Ok(analysis) => {
                    info!(provider = entry.name(), intent = %analysis.intent, "query analyzed");
                    return Ok(analysis);
                }
                Err(err) => {
                    warn!(provider = entry.name(), error = %err, "provider failed, falling back");
                    attempts.push((entry.name().to_string(), err));
                }
            }
        }
        Err(RouterError::Exhausted {
            operation: "analyze_query",
            attempts,
        })
    }

    pub async fn chat_completion(
        &self,
        history: &[ChatTurn],
        user: &UserProfile,
    ) -> Result<ChatTurn, RouterError> {
        let mut attempts = Vec::new();
        for entry in &self.entries {
            match entry.provider.chat_completion(history, user).await {
                Ok(turn) => {
                    info!(provider = entry.name(), "chat completion generated");
                    return Ok(turn);
                }
                Err(err) => {
                    warn!(provider = entry.name(), error = %err, "provider failed, falling back");
                    attempts.push((entry.name().to_string(), err));
                }
            }
        }
        Err(RouterError::Exhausted {
            operation: "chat_completion",
            attempts,
        })
    }
}
