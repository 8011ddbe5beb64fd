mod rows;

use std::fs::File;
use std::io::{self, BufReader, Write};
use std::sync::Arc;

use clap::Parser;

use ducktaped_api::function::ScalarFunction;
use ducktaped_engine::Host;
use ducktaped_engine::config::HostConfig;
use ducktaped_js_eval::JsEvalFunction;
use ducktaped_js_eval::config::JsEvalConfig;

#[derive(Parser)]
#[command(name = "ducktaped", about = "Evaluate scalar functions over JSON-lines rows")]
struct Cli {
    /// Path to TOML configuration file. Without it, the built-in js_eval is used.
    #[arg(long, env = "DUCKTAPED_CONFIG")]
    config: Option<String>,

    /// Function to call for every row.
    #[arg(long, default_value = "js_eval")]
    function: String,

    /// JSON-lines input, one array of arguments per line. Reads stdin when absent.
    #[arg(long)]
    input: Option<String>,

    /// Print each result as a JSON string.
    #[arg(long)]
    json: bool,
}

fn main() {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();

    let host = match &cli.config {
        Some(path) => {
            tracing::info!(config = %path, "loading configuration");
            HostConfig::load(path).and_then(|config| Host::bootstrap(&config))
        }
        None => {
            tracing::info!("no configuration given, using built-in js_eval");
            JsEvalFunction::new(JsEvalConfig::default())
                .map_err(Into::into)
                .and_then(|f| Host::with_functions([Arc::new(f) as Arc<dyn ScalarFunction>]))
        }
    };
    let host = match host {
        Ok(h) => h,
        Err(e) => {
            tracing::error!(error = %e, "failed to bootstrap host");
            std::process::exit(1);
        }
    };

    let batch = match &cli.input {
        Some(path) => File::open(path)
            .map_err(Into::into)
            .and_then(|f| rows::read_rows(BufReader::new(f))),
        None => rows::read_rows(io::stdin().lock()),
    };
    let batch = match batch {
        Ok(b) => b,
        Err(e) => {
            tracing::error!(error = %e, "failed to read input rows");
            std::process::exit(1);
        }
    };

    let mut results: Vec<String> = Vec::new();
    if let Err(e) = host.registry().invoke(&cli.function, &batch, &mut results) {
        tracing::error!(error = %e, function = %cli.function, "invocation failed");
        std::process::exit(1);
    }

    let mut stdout = io::stdout().lock();
    for result in &results {
        let written = if cli.json {
            serde_json::to_writer(&mut stdout, result)
                .map_err(io::Error::from)
                .and_then(|()| writeln!(stdout))
        } else {
            writeln!(stdout, "{result}")
        };
        if let Err(e) = written {
            tracing::error!(error = %e, "failed to write output");
            std::process::exit(1);
        }
    }
}
