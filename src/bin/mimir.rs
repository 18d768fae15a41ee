//! mimir — zero-shot classification CLI
//!
//! Resolve model configs, score precomputed logits, or classify text with a
//! local ONNX model.

use std::io::{self, IsTerminal, Read};
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use serde::Deserialize;

use mimir::cli::Settings;
use mimir::{LogitMatrix, ResolvedConfig};

/// Zero-shot text classification over NLI models
#[derive(Parser)]
#[command(name = "mimir")]
#[command(version)]
#[command(about = "Zero-shot classification over NLI models")]
struct Args {
    /// Path to configuration file.
    #[arg(short, long, env = "MIMIR_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show class indices and token-type usage resolved from a model config
    Resolve {
        /// Path to a config.json, or a model directory containing one
        path: PathBuf,
    },

    /// Score precomputed logits (JSON from a file or stdin)
    Score {
        /// Input file (or omit to read from stdin)
        input: Option<PathBuf>,
        /// Model config.json to resolve class indices from
        #[arg(long)]
        model_config: Option<PathBuf>,
    },

    /// Classify text with a local ONNX model
    #[cfg(feature = "local-inference")]
    Classify {
        /// Text to classify (or omit to read from stdin)
        text: Option<String>,
        /// Candidate labels, comma-separated
        #[arg(short, long, value_delimiter = ',', required = true)]
        labels: Vec<String>,
        /// Hypothesis template (default: from config)
        #[arg(short, long)]
        template: Option<String>,
        /// Score each label independently
        #[arg(short, long)]
        multi_label: bool,
        /// HuggingFace repository (overrides config)
        #[arg(long)]
        model: Option<String>,
        /// Local model directory (overrides config)
        #[arg(long)]
        model_dir: Option<PathBuf>,
    },
}

/// Input document for `mimir score`.
#[derive(Deserialize)]
struct ScoreInput {
    #[serde(default)]
    text: String,
    candidates: Vec<String>,
    logits: Vec<Vec<f32>>,
    #[serde(default)]
    multi_label: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialise tracing (default: warn for CLI; override with RUST_LOG).
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let args = Args::parse();
    let settings = Settings::load(args.config.as_deref())?;

    match args.command {
        Command::Resolve { path } => {
            let resolved = resolve_path(&path, &settings);
            println!("{}", serde_json::to_string_pretty(&resolved)?);
        }

        Command::Score {
            input,
            model_config,
        } => {
            let raw = match input {
                Some(path) => std::fs::read_to_string(path)?,
                None => read_stdin("score")?,
            };
            let input: ScoreInput = serde_json::from_str(&raw)?;

            let resolved = match model_config.as_ref().or(settings.model.config.as_ref()) {
                Some(path) => resolve_path(path, &settings),
                None => settings.classifier.defaults(),
            };
            let logits = LogitMatrix::from_rows(&input.logits)?;
            let result = mimir::classifier::rank_logits(
                resolved,
                &input.text,
                &input.candidates,
                &logits,
                input.multi_label,
            )?;
            println!("{}", serde_json::to_string_pretty(&result)?);
        }

        #[cfg(feature = "local-inference")]
        Command::Classify {
            text,
            labels,
            template,
            multi_label,
            model,
            model_dir,
        } => {
            let text = resolve_text(text, "classify")?;
            let classifier = local::build_classifier(&settings, model, model_dir)?;
            let template = template.unwrap_or_else(|| settings.classifier.hypothesis_template.clone());
            let multi_label = multi_label || settings.classifier.multi_label;

            let result = classifier
                .classify(&text, &labels, &template, multi_label)
                .await?;
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
    }

    Ok(())
}

/// Resolve a config file, or the `config.json` inside a directory.
fn resolve_path(path: &std::path::Path, settings: &Settings) -> ResolvedConfig {
    let defaults = settings.classifier.defaults();
    if path.is_dir() {
        ResolvedConfig::from_model_dir(path, defaults)
    } else {
        ResolvedConfig::from_config_file(path, defaults)
    }
}

fn read_stdin(command: &str) -> Result<String, Box<dyn std::error::Error>> {
    if io::stdin().is_terminal() {
        return Err(format!("{command}: no input provided (pass a file or pipe via stdin)").into());
    }
    let mut buf = String::new();
    io::stdin().read_to_string(&mut buf)?;
    Ok(buf)
}

/// Resolve text input from an optional CLI argument and/or stdin.
///
/// - arg only → arg
/// - stdin only → stdin
/// - both → `"{arg}\n\n{stdin}"`
/// - neither → error
#[cfg(feature = "local-inference")]
fn resolve_text(arg: Option<String>, command: &str) -> Result<String, Box<dyn std::error::Error>> {
    let stdin_text = if io::stdin().is_terminal() {
        None
    } else {
        let mut buf = String::new();
        io::stdin().read_to_string(&mut buf)?;
        Some(buf.trim().to_string()).filter(|s| !s.is_empty())
    };

    match (arg, stdin_text) {
        (Some(a), Some(s)) => Ok(format!("{a}\n\n{s}")),
        (Some(a), None) => Ok(a),
        (None, Some(s)) => Ok(s),
        (None, None) => {
            Err(format!("{command}: no input provided (pass text as argument or via stdin)").into())
        }
    }
}

#[cfg(feature = "local-inference")]
mod local {
    use std::path::PathBuf;
    use std::sync::Arc;
    use std::time::Duration;

    use tracing::info;

    use mimir::cli::Settings;
    use mimir::{
        Device, MimirError, ModelSource, NliBackend, OnnxNliBackend, ResolvedConfig,
        TimeoutBackend, ZeroShotClassifier,
    };

    /// Load the ONNX model named by flags or settings and wrap it in a classifier.
    pub fn build_classifier(
        settings: &Settings,
        model: Option<String>,
        model_dir: Option<PathBuf>,
    ) -> mimir::Result<ZeroShotClassifier> {
        let source = match (model_dir.or_else(|| settings.model.dir.clone()), model) {
            (Some(dir), _) => ModelSource::local(dir),
            (None, Some(repo_id)) => ModelSource::huggingface(repo_id),
            (None, None) => match &settings.model.repo_id {
                Some(repo_id) => ModelSource::huggingface(repo_id.clone()),
                None => {
                    return Err(MimirError::Configuration(
                        "no model configured (use --model, --model-dir or [model] in config)"
                            .to_string(),
                    ));
                }
            },
        };

        let device = Device::from_name(&settings.model.device)?;
        let options = &settings.classifier;
        let defaults = options.defaults();
        let backend = match &settings.model.config {
            Some(path) => OnnxNliBackend::with_config(
                &source,
                device,
                ResolvedConfig::from_config_file(path, defaults),
                options.int32,
            )?,
            None => OnnxNliBackend::new(&source, device, defaults, options.int32)?,
        };
        let resolved = backend.resolved_config();
        info!(model = %source.name(), device = device.name(), "model loaded");

        let backend: Arc<dyn NliBackend> = match settings.model.timeout_secs {
            Some(secs) => Arc::new(TimeoutBackend::new(backend, Duration::from_secs(secs))),
            None => Arc::new(backend),
        };

        Ok(ZeroShotClassifier::new(backend, resolved, options.clone()))
    }
}
