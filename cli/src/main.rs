//! CLI entrypoint for llm-council
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use council_application::{
    ChannelSink, ConfigSource, ConfigUpdate, ConversationStore, RunTurnInput, RunTurnUseCase,
};
use council_domain::{ConversationId, Model, Question};
use council_infrastructure::{FileConfigStore, JsonConversationStore, OpenRouterGateway};
use council_presentation::{ConsoleFormatter, SessionState};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "llm-council", version, about = "Ask a council of LLMs")]
struct Cli {
    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to a config file (defaults to the global location)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Directory for stored conversations
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Ask the council a question
    Ask {
        question: String,

        /// Continue an existing conversation by id
        #[arg(short = 'c', long)]
        conversation: Option<String>,

        /// Attach an image as a base64 data URL (repeatable)
        #[arg(short, long = "image")]
        images: Vec<String>,

        /// Print only the final answer
        #[arg(long)]
        final_only: bool,

        /// Suppress progress lines
        #[arg(short, long)]
        quiet: bool,
    },
    /// List stored conversations
    Conversations,
    /// Show or change configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the current configuration
    Show,
    /// Change configuration values and persist them
    Set {
        /// Comma-separated council model ids
        #[arg(long, value_delimiter = ',')]
        council: Option<Vec<String>>,

        /// Chairman model id (must be a council member)
        #[arg(long)]
        chairman: Option<String>,

        /// Default reasoning effort ("none" to clear)
        #[arg(long)]
        reasoning_effort: Option<String>,

        /// Per-request timeout in seconds
        #[arg(long)]
        timeout_secs: Option<u64>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity level
    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"), // -vvv or more
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let config_store = match &cli.config {
        Some(path) => FileConfigStore::open(path)?,
        None => FileConfigStore::open_default()?,
    };

    match cli.command {
        Command::Ask {
            ref question,
            ref conversation,
            ref images,
            final_only,
            quiet,
        } => {
            ask(
                &cli,
                &config_store,
                question.clone(),
                conversation.clone(),
                images.clone(),
                final_only,
                quiet,
            )
            .await
        }
        Command::Conversations => list_conversations(&cli).await,
        Command::Config { action } => run_config(&config_store, action),
    }
}

fn data_dir(cli: &Cli) -> PathBuf {
    cli.data_dir.clone().unwrap_or_else(|| {
        dirs::data_dir()
            .map(|d| d.join("llm-council").join("conversations"))
            .unwrap_or_else(|| PathBuf::from("conversations"))
    })
}

async fn ask(
    cli: &Cli,
    config_store: &FileConfigStore,
    question: String,
    conversation: Option<String>,
    images: Vec<String>,
    final_only: bool,
    quiet: bool,
) -> Result<()> {
    let question =
        Question::try_new(question).ok_or_else(|| anyhow!("Question cannot be empty"))?;

    let gateway = Arc::new(OpenRouterGateway::from_env()?);
    let store = Arc::new(JsonConversationStore::open(data_dir(cli))?);

    let conversation_id = match conversation {
        Some(id) => {
            let id = ConversationId::new(id);
            // Fail early on an unknown id
            store.get(&id).await.context("Unknown conversation")?;
            id
        }
        None => {
            let created = store.create().await?;
            if !quiet {
                println!("Conversation: {}", created.id);
            }
            created.id
        }
    };

    let config = config_store.snapshot();
    info!(
        "Asking {} council members, chairman {}",
        config.council.len(),
        config.chairman
    );

    let input = RunTurnInput::new(conversation_id, question.clone(), config).with_images(images);

    let mut session = SessionState::new();
    session.begin_turn(input.turn);

    let (sink, mut rx) = ChannelSink::new();
    let printer = tokio::spawn(async move {
        while let Some(envelope) = rx.recv().await {
            if session.apply(&envelope) && !quiet {
                if let Some(line) = ConsoleFormatter::event_line(&envelope.event) {
                    println!("{}", line);
                }
            }
        }
    });

    let use_case = RunTurnUseCase::new(gateway, store);
    let result = use_case.execute_with_events(input, &sink).await;
    drop(sink);
    printer.await?;

    let outcome = result?;
    let output = if final_only {
        ConsoleFormatter::format_final_only(question.content(), &outcome)
    } else {
        ConsoleFormatter::format(question.content(), &outcome)
    };
    println!("{}", output);

    Ok(())
}

async fn list_conversations(cli: &Cli) -> Result<()> {
    let store = JsonConversationStore::open(data_dir(cli))?;
    let summaries = store.list().await?;
    print!("{}", ConsoleFormatter::format_summaries(&summaries));
    Ok(())
}

fn run_config(config_store: &FileConfigStore, action: ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Show => {
            print!("{}", ConsoleFormatter::format_config(&config_store.snapshot()));
        }
        ConfigAction::Set {
            council,
            chairman,
            reasoning_effort,
            timeout_secs,
        } => {
            let update = ConfigUpdate {
                council: council.map(|models| models.into_iter().map(Model::new).collect()),
                chairman: chairman.map(Model::new),
                default_reasoning_effort: reasoning_effort.map(|effort| {
                    if effort.eq_ignore_ascii_case("none") {
                        None
                    } else {
                        Some(effort)
                    }
                }),
                reasoning_overrides: None,
                request_timeout_secs: timeout_secs,
            };
            let updated = config_store.update(update)?;
            print!("{}", ConsoleFormatter::format_config(&updated));
        }
    }
    Ok(())
}
