use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use sable::{AgentLoop, HttpCompleter, LoopOutcome};
use sable_tools::ToolRegistry;

#[derive(Parser, Debug)]
#[command(name = "sable", about = "LLM coding agent driven by pseudo-XML tool tags")]
struct Cli {
    /// Task for the agent to perform
    task: String,

    /// Workspace directory the agent operates in
    #[arg(short, long, default_value = ".")]
    workspace: PathBuf,

    /// Model name
    #[arg(short, long, default_value = "gpt-4o-mini")]
    model: String,

    /// OpenAI-compatible API base URL
    #[arg(long, env = "SABLE_BASE_URL", default_value = "https://api.openai.com/v1")]
    base_url: String,

    /// API key
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    api_key: String,

    /// Maximum loop iterations before giving up
    #[arg(long, default_value_t = sable::MAX_TOOL_ITERATIONS)]
    max_iterations: usize,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let workspace = cli
        .workspace
        .canonicalize()
        .with_context(|| format!("Invalid workspace: {}", cli.workspace.display()))?;
    tracing::info!(workspace = %workspace.display(), model = cli.model, "starting agent");

    let registry = ToolRegistry::new(workspace);
    let completer = HttpCompleter::new(cli.base_url, cli.api_key, cli.model);
    let agent = AgentLoop::new(registry, Box::new(completer)).with_max_iterations(cli.max_iterations);

    match agent.run(&cli.task).await? {
        LoopOutcome::Completed { summary } => {
            println!("{}", summary);
        }
        LoopOutcome::NeedsFollowup { question } => {
            println!("The agent needs more input: {}", question);
        }
        LoopOutcome::IterationLimit => {
            println!("Stopped: iteration limit reached without completion.");
        }
    }
    Ok(())
}
