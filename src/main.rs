use std::sync::Arc;

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, BufReader};

use fitcoach::config::CoachConfig;
use fitcoach::dialogue::DialogueController;
use fitcoach::error::TransportError;
use fitcoach::genai::{ContentGenerator, GenerationConfig, OpenAiCompatService};
use fitcoach::plan::PlanEngine;
use fitcoach::scheduler::{InProcessScheduler, JobRunner, JobScheduler};
use fitcoach::store::{MemoryStore, Storage};
use fitcoach::transport::{InboundMessage, OutboundSender, Reply};

/// Prints pushed messages to stdout, standing in for a messaging transport.
struct StdoutSender;

#[async_trait]
impl OutboundSender for StdoutSender {
    async fn send(&self, user_id: &str, reply: Reply) -> Result<(), TransportError> {
        println!("\n[push → {user_id}]\n{}\n", reply.render());
        Ok(())
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let api_key = std::env::var("OPENAI_API_KEY").unwrap_or_else(|_| {
        eprintln!("Error: OPENAI_API_KEY not set");
        eprintln!("  export OPENAI_API_KEY=sk-...");
        std::process::exit(1);
    });

    let config = CoachConfig::from_env();
    eprintln!("💪 fitcoach v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Model: {}", config.model);
    eprintln!("   Endpoint: {}", config.base_url);
    eprintln!("   Type a message and press Enter. /quit to exit.\n");

    let store: Arc<dyn Storage> = Arc::new(MemoryStore::new());
    let service = OpenAiCompatService::new(
        GenerationConfig::new(api_key)
            .with_model(&config.model)
            .with_base_url(&config.base_url)
            .with_timeout(config.generation_timeout),
    )?;
    let generator = ContentGenerator::new(Arc::new(service));
    let engine = PlanEngine::new(Arc::clone(&store), generator.clone());

    let sender: Arc<dyn OutboundSender> = Arc::new(StdoutSender);
    let mut runner = JobRunner::new(
        Arc::clone(&store),
        generator.clone(),
        engine.clone(),
        Arc::clone(&sender),
    );
    runner.motivation_delay = config.motivation_delay;
    let scheduler: Arc<dyn JobScheduler> = InProcessScheduler::start(runner);

    let controller = DialogueController::new(store, generator, engine, scheduler)
        .with_default_language(config.default_language);

    let user_id = std::env::var("FITCOACH_USER").unwrap_or_else(|_| "cli-user".to_string());
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let text = line.trim();
        if text.is_empty() {
            continue;
        }
        if text == "/quit" {
            break;
        }
        let reply = controller
            .handle(InboundMessage::text_now(&user_id, text))
            .await;
        println!("{}", reply.render());
    }

    Ok(())
}
