//! valet - command-line front end for the AI response router
//!
//! Builds the router from environment configuration and exposes each
//! routed operation as a subcommand. Useful for poking at provider
//! behavior without standing up the rest of the assistant.

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use valet_core::{AiRouter, MeetingContext, QueryContext, RouterConfig, UserProfile};

#[derive(Parser)]
#[command(name = "valet", version, about = "Chat productivity assistant AI router")]
struct Cli {
    /// Try this provider first, keeping the rest as fallback
    #[arg(long, global = true)]
    provider: Option<String>,

    /// Display name of the acting user
    #[arg(long, global = true, default_value = "demo")]
    name: String,

    /// Email of the acting user
    #[arg(long, global = true, default_value = "demo@example.com")]
    email: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show configured providers in try order
    Status,
    /// Ask the assistant a question
    Ask { query: String },
    /// Parse a meeting scheduling request into a structured plan
    Meeting { prompt: String },
    /// Parse a task creation request into a structured plan
    Task { prompt: String },
    /// Summarize a meeting transcript file
    Summarize {
        file: PathBuf,
        /// Meeting title for context
        #[arg(long)]
        title: Option<String>,
    },
    /// Extract action items from a meeting transcript file
    Actions { file: PathBuf },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = RouterConfig::from_env();
    let mut router = AiRouter::from_config(&config);

    if let Some(name) = &cli.provider {
        if !router.switch_provider(name) {
            bail!("unknown provider: {name}");
        }
    }

    let user = UserProfile::new("cli", cli.name.clone(), cli.email.clone());

    match &cli.command {
        Command::Status => {
            println!("{:<10} {:>8} {:>6} {:>10}", "provider", "priority", "cost", "available");
            for stat in router.provider_stats() {
                println!(
                    "{:<10} {:>8} {:>6} {:>10}",
                    stat.name, stat.priority, stat.cost.to_string(), stat.available
                );
            }
        }
        Command::Ask { query } => {
            let reply = router
                .generate_response(query, &user, &QueryContext::new())
                .await?;
            println!("{}", reply.message);
            if !reply.suggestions.is_empty() {
                println!("\nSuggestions: {}", reply.suggestions.join(" | "));
            }
            if reply.requires_follow_up {
                for question in &reply.follow_up_questions {
                    println!("  ? {question}");
                }
            }
            eprintln!("[served by {} ({}), intent {}]", reply.provider, reply.cost, reply.intent);
        }
        Command::Meeting { prompt } => {
            let plan = router.schedule_meeting(prompt, &user).await?;
            println!("{}", serde_json::to_string_pretty(&plan)?);
        }
        Command::Task { prompt } => {
            let plan = router.create_task(prompt, &user).await?;
            println!("{}", serde_json::to_string_pretty(&plan)?);
        }
        Command::Summarize { file, title } => {
            let transcript = std::fs::read_to_string(file)
                .with_context(|| format!("failed to read {}", file.display()))?;
            let meeting = MeetingContext {
                title: title.clone(),
                ..Default::default()
            };
            let summary = router.meeting_summary(&transcript, &meeting).await?;
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        Command::Actions { file } => {
            let transcript = std::fs::read_to_string(file)
                .with_context(|| format!("failed to read {}", file.display()))?;
            let items = router.extract_action_items(&transcript).await?;
            println!("{}", serde_json::to_string_pretty(&items)?);
        }
    }

    Ok(())
}
