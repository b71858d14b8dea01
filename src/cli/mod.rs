use crate::{config::ModelConfig, timezone::TimezoneResolver, Agent};
use anyhow::Context;
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use std::time::Duration;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn command() -> Command {
    Command::new("weather-time-agent")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Answer weather and local-time questions with a tool-calling LLM agent")
        .arg(
            Arg::new("prompt")
                .help("The prompt to send to the agent")
                .required_unless_present("resolve")
                .index(1),
        )
        .arg(
            Arg::new("resolve")
                .short('r')
                .long("resolve")
                .value_name("QUERY")
                .help("Resolve a city or IANA time zone and print the result, without calling a model")
                .conflicts_with("prompt"),
        )
        .arg(
            Arg::new("model")
                .short('m')
                .long("model")
                .value_name("MODEL")
                .help("Model name (or set LITELLM_MODEL_MODEL_NAME)"),
        )
        .arg(
            Arg::new("api-key")
                .short('k')
                .long("api-key")
                .value_name("KEY")
                .help("API key (or set LITELLM_MODEL_API_KEY)"),
        )
        .arg(
            Arg::new("base-url")
                .short('u')
                .long("base-url")
                .value_name("URL")
                .help("Chat-completions base URL (or set LITELLM_MODEL_API_BASE)"),
        )
        .arg(
            Arg::new("timeout")
                .short('t')
                .long("timeout")
                .value_name("SECONDS")
                .help("Request timeout in seconds")
                .value_parser(value_parser!(u64))
                .default_value("120"),
        )
        .arg(
            Arg::new("max-iterations")
                .short('i')
                .long("max-iterations")
                .value_name("COUNT")
                .help("Maximum agent iterations")
                .value_parser(value_parser!(usize))
                .default_value("10"),
        )
        .arg(
            Arg::new("steps")
                .long("steps")
                .help("Print the execution trace after the answer")
                .action(ArgAction::SetTrue),
        )
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "weather_time_agent=info".into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Environment configuration with command-line overrides applied
fn model_config(matches: &ArgMatches) -> anyhow::Result<ModelConfig> {
    let api_key = matches.get_one::<String>("api-key").cloned();
    let mut config = match ModelConfig::from_env() {
        Ok(config) => config,
        Err(err) => match &api_key {
            Some(key) => ModelConfig::new(key.clone()),
            None => {
                return Err(anyhow::Error::new(err).context("no API key configured; use --api-key"))
            }
        },
    };

    if let Some(key) = api_key {
        config.api_key = key;
    }
    if let Some(model) = matches.get_one::<String>("model") {
        config = config.with_model_name(model.clone());
    }
    if let Some(base_url) = matches.get_one::<String>("base-url") {
        config = config.with_api_base(base_url.clone());
    }
    Ok(config)
}

/// CLI entry point
pub async fn run() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let matches = command().get_matches();

    if let Some(query) = matches.get_one::<String>("resolve") {
        let resolution = TimezoneResolver::system().resolve_time(query);
        println!("{}", serde_json::to_string_pretty(&resolution.to_payload())?);
        return Ok(());
    }

    let prompt = matches
        .get_one::<String>("prompt")
        .context("a prompt is required")?;
    let timeout_seconds = matches.get_one::<u64>("timeout").copied().unwrap_or(120);
    let max_iterations = matches
        .get_one::<usize>("max-iterations")
        .copied()
        .unwrap_or(10);

    let config = model_config(&matches)?;
    info!("Using model: {}", config.model_name);
    info!("Base URL: {}", config.api_base);

    let agent = Agent::weather_time(config)
        .with_timeout(Duration::from_secs(timeout_seconds))
        .with_max_iterations(max_iterations);

    info!("Running agent with prompt: {}", prompt);
    match agent.run_with_steps(prompt).await {
        Ok(result) => {
            println!("\nAgent Response:\n{}", result.output);
            if matches.get_flag("steps") {
                println!("\n{}", result.replay());
            }
            info!(iterations = result.iterations, "Agent execution completed successfully");
            Ok(())
        }
        Err(e) => {
            error!("Agent execution failed: {}", e);
            Err(e.into())
        }
    }
}
