//! CLI binary for docsum.
//!
//! A thin shim over the library crate that maps CLI flags
//! to `SummarizeConfig` and prints results.

use anyhow::{Context, Result};
use clap::Parser;
use docsum::config::{DEFAULT_BASE_URL, DEFAULT_MODEL};
use docsum::pipeline::input::resolve_input;
use docsum::{
    ExtractedText, ExtractionMethod, SummarizeConfig, SummarizeError, SummarizeProgressCallback,
    Summarizer, SummaryOutput,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Spinner on stderr: page counter during extraction, then received
/// characters while the summary streams in.
struct CliProgressCallback {
    bar: ProgressBar,
    streamed: AtomicUsize,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new_spinner();
        let style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}  {elapsed:.dim}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);
        bar.set_style(style);
        bar.set_prefix("Reading");
        bar.set_message("Opening document…");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self {
            bar,
            streamed: AtomicUsize::new(0),
        })
    }

    fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

impl SummarizeProgressCallback for CliProgressCallback {
    fn on_extraction_start(&self, total_pages: usize) {
        self.bar.set_prefix("Extracting");
        self.bar.set_message(format!("0/{total_pages} pages"));
    }

    fn on_page_extracted(
        &self,
        page_num: usize,
        total_pages: usize,
        method: ExtractionMethod,
        chars: usize,
    ) {
        let how = match method {
            ExtractionMethod::Native => "text",
            ExtractionMethod::Ocr => "ocr",
            ExtractionMethod::None => "blank",
        };
        self.bar.println(format!(
            "  {} Page {:>3}/{:<3}  {:<5}  {}",
            green("✓"),
            page_num,
            total_pages,
            how,
            dim(&format!("{chars:>6} chars")),
        ));
        self.bar
            .set_message(format!("{page_num}/{total_pages} pages"));
    }

    fn on_summary_start(&self, content_chars: usize) {
        self.bar.set_prefix("Summarising");
        self.bar
            .set_message(format!("sending {content_chars} chars…"));
    }

    fn on_fragment(&self, content_len: usize) {
        let total = self.streamed.fetch_add(content_len, Ordering::SeqCst) + content_len;
        self.bar.set_message(format!("{total} bytes received"));
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Summarise a PDF (text layer, OCR for scanned pages)
  docsum report.pdf

  # Custom instruction
  docsum notes.txt --prompt "List the action items."

  # From a URL, JSON output
  docsum https://arxiv.org/pdf/1706.03762 --json

  # Just show the extracted text (no API key needed)
  docsum --extract-only scanned.pdf

  # Any OpenAI-compatible server
  docsum --base-url http://localhost:11434/v1 --model llama3.1 report.pdf

ENVIRONMENT VARIABLES:
  NVIDIA_API_KEY     API key for the default endpoint
  OPENAI_API_KEY     Fallback API key
  DOCSUM_BASE_URL    Override the endpoint
  DOCSUM_MODEL       Override the model
  PDFIUM_LIB_PATH    Path to libpdfium (file or directory)
  TESSERACT_CMD      Tesseract executable
"#;

/// Summarise plain-text and PDF documents with an LLM.
#[derive(Parser, Debug)]
#[command(
    name = "docsum",
    version,
    about = "Summarise plain-text and PDF documents with an LLM",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Local file path or HTTP/HTTPS URL. Names ending in .pdf are read as PDF.
    input: String,

    /// Summary instruction (system prompt). Default: "Summarize the content."
    #[arg(short, long, env = "DOCSUM_PROMPT")]
    prompt: Option<String>,

    /// Read the instruction from a file.
    #[arg(long, conflicts_with = "prompt")]
    prompt_file: Option<PathBuf>,

    /// Chat model ID.
    #[arg(long, env = "DOCSUM_MODEL", default_value = DEFAULT_MODEL)]
    model: String,

    /// OpenAI-compatible API base URL.
    #[arg(long, env = "DOCSUM_BASE_URL", default_value = DEFAULT_BASE_URL)]
    base_url: String,

    /// API key (falls back to NVIDIA_API_KEY, then OPENAI_API_KEY).
    #[arg(long, env = "DOCSUM_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Use an edgequake-llm provider (openai, anthropic, gemini, ollama, …) instead of --base-url.
    #[arg(long, env = "DOCSUM_PROVIDER")]
    provider: Option<String>,

    /// Tesseract executable.
    #[arg(long, env = "TESSERACT_CMD", default_value = "tesseract")]
    tesseract: PathBuf,

    /// PDF user password for encrypted documents.
    #[arg(long, env = "DOCSUM_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    /// HTTP download timeout in seconds (URL inputs).
    #[arg(long, env = "DOCSUM_DOWNLOAD_TIMEOUT", default_value_t = 120)]
    download_timeout: u64,

    /// Print {"summary": ...} / {"error": ..., "details": ...} JSON.
    #[arg(long)]
    json: bool,

    /// Include extraction/completion stats in the output.
    #[arg(long)]
    stats: bool,

    /// Print the extracted text only; do not call the model.
    #[arg(long)]
    extract_only: bool,

    /// Disable the progress spinner.
    #[arg(long, env = "DOCSUM_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "DOCSUM_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "DOCSUM_QUIET")]
    quiet: bool,
}

enum Outcome {
    Extracted(ExtractedText),
    Summary(SummaryOutput),
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Instruction ──────────────────────────────────────────────────────
    let instruction = match (&cli.prompt, &cli.prompt_file) {
        (Some(p), _) => Some(p.clone()),
        (None, Some(path)) => Some(
            std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read prompt file '{}'", path.display()))?,
        ),
        (None, None) => None,
    };

    // ── Config ───────────────────────────────────────────────────────────
    let progress = (show_progress && !cli.verbose).then(CliProgressCallback::new);

    let mut builder = SummarizeConfig::builder()
        .base_url(&cli.base_url)
        .model(&cli.model)
        .tesseract_cmd(&cli.tesseract)
        .download_timeout_secs(cli.download_timeout);
    if let Some(ref key) = cli.api_key {
        builder = builder.api_key(key);
    }
    if let Some(ref name) = cli.provider {
        builder = builder.provider_name(name);
    }
    if let Some(ref pwd) = cli.password {
        builder = builder.password(pwd);
    }
    if let Some(ref cb) = progress {
        builder = builder.progress_callback(Arc::clone(cb) as Arc<dyn SummarizeProgressCallback>);
    }

    let result = match builder.build() {
        Ok(config) => run(&cli, config, instruction.as_deref()).await,
        Err(e) => Err(e),
    };

    if let Some(ref cb) = progress {
        cb.finish();
    }

    match result {
        Ok(outcome) => {
            print_outcome(&cli, outcome)?;
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            if cli.json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&e.to_body()).context("Failed to serialize error")?
                );
            } else {
                eprintln!("{} {}", red("✘"), e);
            }
            Ok(ExitCode::from(match e.category() {
                docsum::ErrorCategory::Input => 2,
                _ => 1,
            }))
        }
    }
}

async fn run(
    cli: &Cli,
    config: SummarizeConfig,
    instruction: Option<&str>,
) -> Result<Outcome, SummarizeError> {
    let document = resolve_input(&cli.input, config.download_timeout_secs).await?;
    let summarizer = Summarizer::new(config)?;

    if cli.extract_only {
        return summarizer.extract(document).await.map(Outcome::Extracted);
    }
    summarizer
        .summarize(document, instruction)
        .await
        .map(Outcome::Summary)
}

fn print_outcome(cli: &Cli, outcome: Outcome) -> Result<()> {
    match outcome {
        Outcome::Extracted(extracted) => {
            if cli.json {
                let body = if cli.stats {
                    serde_json::to_value(&extracted)?
                } else {
                    serde_json::json!({ "text": extracted.text })
                };
                println!("{}", serde_json::to_string_pretty(&body)?);
            } else {
                print!("{}", extracted.text);
            }
        }
        Outcome::Summary(out) => {
            if cli.json {
                let body = if cli.stats {
                    serde_json::to_value(&out)?
                } else {
                    serde_json::json!({ "summary": out.summary })
                };
                println!("{}", serde_json::to_string_pretty(&body)?);
            } else {
                println!("{}", out.summary);
                if cli.stats && !cli.quiet {
                    let s = &out.stats;
                    eprintln!(
                        "{}",
                        dim(&format!(
                            "{} pages ({} OCR), {} chars in, {} fragments, {}ms extract + {}ms model",
                            s.pages,
                            s.ocr_pages,
                            s.extracted_chars,
                            s.fragments,
                            s.extraction_duration_ms,
                            s.completion_duration_ms
                        ))
                    );
                }
            }
        }
    }
    Ok(())
}
