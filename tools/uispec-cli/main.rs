use clap::{Parser, Subcommand};
use std::fs;
use std::io::{self, Read};
use std::sync::Arc;
use std::time::Instant;
use tracing_subscriber::EnvFilter;
use uispec::evaluator::validate_syntax;
use uispec::model::HttpModelClient;
use uispec::prelude::*;

/// Generate stage-scoped UI specifications and check formulas
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the widgets eligible at each stage
    Catalog {
        /// Include widgets that are designed but not implemented yet
        #[arg(long)]
        all: bool,
    },
    /// Validate a formula and print its syntax tree
    Check {
        /// The formula text
        formula: String,
    },
    /// Evaluate a formula against a JSON data record
    Eval {
        /// The formula text
        formula: String,
        /// Path to the data record JSON file; reads stdin when omitted
        #[arg(short, long)]
        data: Option<String>,
        /// Evaluate as a visibility condition (fail-open) instead of a computed value
        #[arg(short, long)]
        condition: bool,
    },
    /// Run one generation request against an OpenAI-compatible endpoint
    Generate {
        /// Path to the request JSON file
        request: String,
        /// Optional generator configuration JSON file
        #[arg(long)]
        config: Option<String>,
        #[arg(long, env = "UISPEC_ENDPOINT", default_value = "http://localhost:11434/v1")]
        endpoint: String,
        #[arg(long, env = "UISPEC_MODEL", default_value = "llama3.1")]
        model: String,
        #[arg(long, env = "UISPEC_API_KEY", hide_env_values = true)]
        api_key: Option<String>,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("uispec=info")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Catalog { all } => run_catalog(!all),
        Command::Check { formula } => run_check(&formula),
        Command::Eval {
            formula,
            data,
            condition,
        } => run_eval(&formula, data.as_deref(), condition),
        Command::Generate {
            request,
            config,
            endpoint,
            model,
            api_key,
        } => run_generate(&request, config.as_deref(), endpoint, model, api_key).await,
    }
}

fn run_catalog(restrict_to_implemented: bool) {
    let catalog = StageCatalog::default();
    for stage in Stage::ALL {
        let eligible = catalog.eligible_widgets(stage, restrict_to_implemented);
        println!("{} ({} widgets)", stage, eligible.len());
        if eligible.is_empty() {
            println!("  -> text fallback");
        } else {
            for line in catalog.describe(&eligible).lines() {
                println!("  {}", line);
            }
        }
    }
}

fn run_check(formula: &str) {
    if let Err(e) = validate_syntax(formula) {
        exit_with_error(&format!("Formula rejected: {}", e));
    }
    let parsed = Formula::parse(formula)
        .unwrap_or_else(|e| exit_with_error(&format!("Formula rejected: {}", e)));

    println!("Formula accepted.");
    print!("{}", ExpressionTree::new(parsed.expression()));

    let mut fields: Vec<_> = parsed.referenced_fields().into_iter().collect();
    fields.sort();
    if !fields.is_empty() {
        println!("Reads fields: {}", fields.join(", "));
    }
}

fn run_eval(formula: &str, data_path: Option<&str>, condition: bool) {
    let raw = match data_path {
        Some(path) => fs::read_to_string(path).unwrap_or_else(|e| {
            exit_with_error(&format!("Failed to read data file '{}': {}", path, e))
        }),
        None => {
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .unwrap_or_else(|e| exit_with_error(&format!("Failed to read stdin: {}", e)));
            buffer
        }
    };
    let data: serde_json::Value = if raw.trim().is_empty() {
        serde_json::json!({})
    } else {
        serde_json::from_str(&raw)
            .unwrap_or_else(|e| exit_with_error(&format!("Failed to parse data JSON: {}", e)))
    };

    // Surface the underlying error before applying the fail-open/closed policy.
    if let Err(e) = evaluate(formula, &data) {
        eprintln!("warning: {}", e);
    }

    if condition {
        println!("{}", evaluate_condition(formula, &data));
    } else {
        match evaluate_expression(formula, &data) {
            Some(value) => println!("{}", serde_json::Value::from(value)),
            None => println!("undefined"),
        }
    }
}

async fn run_generate(
    request_path: &str,
    config_path: Option<&str>,
    endpoint: String,
    model: String,
    api_key: Option<String>,
) {
    let body = fs::read_to_string(request_path).unwrap_or_else(|e| {
        exit_with_error(&format!(
            "Failed to read request file '{}': {}",
            request_path, e
        ))
    });
    let request = GenerationRequest::from_json(&body)
        .unwrap_or_else(|e| exit_with_error(&format!("Invalid request: {}", e)));

    let config = match config_path {
        Some(path) => GeneratorConfig::from_file(path).unwrap_or_else(|e| {
            exit_with_error(&format!("Failed to load config '{}': {}", path, e))
        }),
        None => GeneratorConfig::default(),
    };

    let mut client = HttpModelClient::new(endpoint, model);
    if let Some(key) = api_key {
        client = client.with_api_key(key);
    }

    let generator = SpecificationGenerator::builder(Arc::new(client))
        .config(config)
        .build()
        .unwrap_or_else(|e| exit_with_error(&format!("Invalid configuration: {}", e)));

    let started = Instant::now();
    let result = generator
        .generate(&request)
        .await
        .unwrap_or_else(|e| exit_with_error(&format!("Invalid request: {}", e)));

    let rendered = serde_json::to_string_pretty(&result)
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to serialize result: {}", e)));
    println!("{}", rendered);
    eprintln!("Finished in {:?}", started.elapsed());

    if !result.success {
        std::process::exit(2);
    }
}

fn exit_with_error(message: &str) -> ! {
    eprintln!("\nError: {}", message);
    std::process::exit(1);
}
