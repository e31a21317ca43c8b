use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use futures::future::join_all;
use switchboard_agents::{
    IntentRouter, LlmClassifier, ParallelSynthesizer, PromptChain, SearchInformationTool,
    ToolAgent,
};
use switchboard_llm::{LlmClient, LlmConfig, Provider};
use switchboard_observability::{init_tracing, PatternMetrics};

const DEFAULT_REQUESTS: [&str; 3] = [
    "Book me a flight to London.",
    "What is the capital of Italy?",
    "Tell me about quantum physics.",
];

const DEFAULT_TOPIC: &str = "The history of space exploration";

const DEFAULT_AGENT_QUERIES: [&str; 3] = [
    "What is the capital of France?",
    "What's the weather like in London?",
    "Tell me something about dogs.",
];

const DEFAULT_CHAIN_TEXT: &str = "The new laptop model features a 3.5 GHz octa-core processor, 16GB of RAM, and a 1TB NVMe SSD.";

#[derive(Debug, Parser)]
#[command(name = "switchboard")]
#[command(about = "LLM orchestration pattern runner")]
struct Cli {
    /// Model provider: openai or gemini.
    #[arg(long, env = "SWITCHBOARD_PROVIDER")]
    provider: Option<String>,

    #[arg(long, env = "SWITCHBOARD_MODEL")]
    model: Option<String>,

    #[arg(long, env = "SWITCHBOARD_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    #[arg(long, env = "SWITCHBOARD_BASE_URL")]
    base_url: Option<String>,

    /// Print results as JSON instead of plain text.
    #[arg(long, global = true)]
    json: bool,

    /// Print the metrics snapshot after the run.
    #[arg(long, global = true)]
    metrics: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Classify each request and dispatch it to a simulated handler.
    Route { requests: Vec<String> },
    /// Fan out summary/questions/key-terms prompts and synthesize an answer.
    Parallel {
        #[arg(long, default_value = DEFAULT_TOPIC)]
        topic: String,
    },
    /// Run the tool-calling agent; queries run concurrently.
    Agent {
        queries: Vec<String>,
        #[arg(long, default_value_t = switchboard_agents::DEFAULT_MAX_ITERATIONS)]
        max_iterations: usize,
    },
    /// Extract specifications from text and convert them to JSON.
    Chain {
        #[arg(long, default_value = DEFAULT_CHAIN_TEXT)]
        text: String,
    },
    /// Run every pattern with its example inputs.
    Demo,
}

struct Runner {
    model: Arc<LlmClient>,
    metrics: Arc<PatternMetrics>,
    json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_tracing("switchboard_cli");
    let cli = Cli::parse();

    let config = build_config(&cli)?;
    let model = LlmClient::from_config(&config).with_context(|| {
        format!(
            "failed initializing {} client (set SWITCHBOARD_API_KEY)",
            config.provider.as_str()
        )
    })?;
    tracing::info!(provider = config.provider.as_str(), model = %model.model(), "language model initialized");

    let runner = Runner {
        model: Arc::new(model),
        metrics: PatternMetrics::shared(),
        json: cli.json,
    };

    match cli.command {
        Command::Route { requests } => runner.route(&with_defaults(requests, &DEFAULT_REQUESTS)).await?,
        Command::Parallel { topic } => runner.parallel(&topic).await?,
        Command::Agent {
            queries,
            max_iterations,
        } => {
            runner
                .agent(&with_defaults(queries, &DEFAULT_AGENT_QUERIES), max_iterations)
                .await?
        }
        Command::Chain { text } => runner.chain(&text).await?,
        Command::Demo => {
            runner.route(&with_defaults(Vec::new(), &DEFAULT_REQUESTS)).await?;
            runner.parallel(DEFAULT_TOPIC).await?;
            runner
                .agent(
                    &with_defaults(Vec::new(), &DEFAULT_AGENT_QUERIES),
                    switchboard_agents::DEFAULT_MAX_ITERATIONS,
                )
                .await?;
            runner.chain(DEFAULT_CHAIN_TEXT).await?;
        }
    }

    if cli.metrics {
        println!("{}", serde_json::to_string_pretty(&runner.metrics.snapshot())?);
    }

    Ok(())
}

fn build_config(cli: &Cli) -> Result<LlmConfig> {
    let provider = match cli.provider.as_deref() {
        Some(value) => Provider::parse(value)
            .with_context(|| format!("invalid provider '{value}' (expected openai or gemini)"))?,
        None => Provider::from_env(),
    };
    let mut config = LlmConfig::from_env_for(provider);

    if let Some(model) = &cli.model {
        config = config.with_model(model.clone());
    }
    if let Some(api_key) = &cli.api_key {
        config = config.with_api_key(api_key.clone());
    }
    if let Some(base_url) = &cli.base_url {
        config = config.with_base_url(base_url.clone());
    }

    Ok(config)
}

fn with_defaults(values: Vec<String>, defaults: &[&str]) -> Vec<String> {
    if values.is_empty() {
        defaults.iter().map(ToString::to_string).collect()
    } else {
        values
    }
}

impl Runner {
    async fn route(&self, requests: &[String]) -> Result<()> {
        let router: IntentRouter<LlmClassifier<LlmClient>> =
            IntentRouter::simulated(self.model.clone(), self.metrics.clone());

        for request in requests {
            println!("\n--- Routing request: '{request}' ---");
            match router.route_detailed(request).await {
                Ok(outcome) if self.json => {
                    println!("{}", serde_json::to_string_pretty(&outcome)?)
                }
                Ok(outcome) => {
                    println!("Decision: {}", outcome.decision.label);
                    println!("Final Result: {}", outcome.output);
                }
                Err(err) => eprintln!("An error occurred while routing: {err}"),
            }
        }
        Ok(())
    }

    async fn parallel(&self, topic: &str) -> Result<()> {
        println!("\n--- Running parallel example for topic: '{topic}' ---");
        let synthesizer = ParallelSynthesizer::new(self.model.clone(), self.metrics.clone());
        match synthesizer.run(topic).await {
            Ok(report) if self.json => println!("{}", serde_json::to_string_pretty(&report)?),
            Ok(report) => {
                println!("\n--- Final Response ---");
                println!("{}", report.answer);
            }
            Err(err) => eprintln!("An error occurred during parallel execution: {err}"),
        }
        Ok(())
    }

    async fn agent(&self, queries: &[String], max_iterations: usize) -> Result<()> {
        let agent = ToolAgent::new(self.model.clone(), self.metrics.clone())
            .with_tool(SearchInformationTool)
            .with_max_iterations(max_iterations);

        let runs = join_all(queries.iter().map(|query| agent.run(query))).await;
        for (query, result) in queries.iter().zip(runs) {
            println!("\n--- Agent query: '{query}' ---");
            match result {
                Ok(run) if self.json => println!("{}", serde_json::to_string_pretty(&run)?),
                Ok(run) => {
                    for step in &run.steps {
                        println!("Tool {} -> {}", step.tool, step.observation);
                    }
                    println!("Final Agent Response: {}", run.output);
                }
                Err(err) => eprintln!("An error occurred during agent execution: {err}"),
            }
        }
        Ok(())
    }

    async fn chain(&self, text: &str) -> Result<()> {
        let chain = PromptChain::new(self.model.clone(), self.metrics.clone());
        match chain.run(text).await {
            Ok(output) if self.json => println!("{}", serde_json::to_string_pretty(&output)?),
            Ok(output) => {
                println!("\n--- Final JSON Output ---");
                println!("{}", output.json);
            }
            Err(err) => eprintln!("An error occurred during chain execution: {err}"),
        }
        Ok(())
    }
}
