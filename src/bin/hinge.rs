//! CLI binary for hinge-analysis.
//!
//! A thin shim over the library crate that maps CLI flags to
//! `WorkflowConfig`, submits one file and reports how it settled.

use anyhow::{Context, Result};
use clap::Parser;
use hinge_analysis::pipeline::render::write_html;
use hinge_analysis::{
    Outcome, ProgressCallback, RenderedPlot, UploadTarget, Workflow, WorkflowConfig,
    WorkflowProgressCallback, DEFAULT_API_BASE,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}

const TICKS: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"];

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal callback: a spinner whose message mirrors the status line and
/// whose prefix shows the poll attempt counter.
struct CliProgressCallback {
    bar: ProgressBar,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new_spinner();
        let style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}  {elapsed:.dim}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(TICKS);
        bar.set_style(style);
        bar.set_prefix("Preparing");
        bar.enable_steady_tick(Duration::from_millis(80));
        Arc::new(Self { bar })
    }
}

impl WorkflowProgressCallback for CliProgressCallback {
    fn on_status(&self, status: &str) {
        if !status.is_empty() {
            self.bar.set_message(status.to_string());
        }
    }

    fn on_upload_start(&self, file_name: &str, size_bytes: usize) {
        self.bar.set_prefix("Uploading");
        self.bar
            .println(format!("  {} {file_name} ({size_bytes} bytes)", dim("↑")));
    }

    fn on_upload_accepted(&self) {
        self.bar.println(format!("  {} upload accepted", green("✓")));
    }

    fn on_poll_attempt(&self, attempt: u32, max_attempts: u32) {
        self.bar.set_prefix(format!("Polling {attempt:>2}/{max_attempts}"));
    }

    fn on_rendered(&self, plots: &[RenderedPlot]) {
        for plot in plots {
            self.bar.println(format!(
                "  {} {}  {}",
                green("▣"),
                plot.src,
                dim(plot.caption.as_deref().unwrap_or(""))
            ));
        }
    }

    fn on_settled(&self, _outcome: &Outcome) {
        self.bar.finish_and_clear();
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Upload against the local development server
  hinge ~/Downloads/export/matches.json

  # Another backend, results written as an HTML grid
  hinge --api-base https://analysis.example.org matches.json --html plots.html

  # Machine-readable output
  hinge --json matches.json > plots.json

ENVIRONMENT VARIABLES:
  HINGE_API_BASE          Backend origin (default http://localhost:8000)
  RUST_LOG                Overrides the log filter (e.g. hinge_analysis=debug)

NOTES:
  The backend only accepts a file named exactly `matches.json`.
  Results are polled 30 times, 1.5 s apart, before giving up.
"#;

/// Upload a matches.json export and collect the analysis plots.
#[derive(Parser, Debug)]
#[command(
    name = "hinge",
    version,
    about = "Upload a matches.json export to the hinge analysis backend and collect the plots",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Path to the `matches.json` export.
    file: PathBuf,

    /// Origin of the analysis backend.
    #[arg(long, env = "HINGE_API_BASE", default_value = DEFAULT_API_BASE)]
    api_base: String,

    /// Maximum number of result polls.
    #[arg(long, env = "HINGE_MAX_ATTEMPTS", default_value_t = 30,
          value_parser = clap::value_parser!(u32).range(1..))]
    max_attempts: u32,

    /// Delay between two polls in milliseconds.
    #[arg(long, env = "HINGE_POLL_INTERVAL_MS", default_value_t = 1500)]
    poll_interval_ms: u64,

    /// Per-request timeout in seconds.
    #[arg(long, env = "HINGE_TIMEOUT", default_value_t = 30)]
    timeout: u64,

    /// Write the rendered plots as an HTML fragment to this file.
    #[arg(long)]
    html: Option<PathBuf>,

    /// Print the rendered plots as JSON on stdout.
    #[arg(long)]
    json: bool,

    /// Disable the spinner.
    #[arg(long, env = "HINGE_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "HINGE_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "HINGE_QUIET")]
    quiet: bool,
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

    // ── Build config ─────────────────────────────────────────────────────
    let progress_cb: Option<ProgressCallback> = if show_progress {
        Some(CliProgressCallback::new() as Arc<dyn WorkflowProgressCallback>)
    } else {
        None
    };
    let config = build_config(&cli, progress_cb)?;
    let workflow = Workflow::new(config).context("Failed to set up HTTP client")?;

    // ── Run ──────────────────────────────────────────────────────────────
    let outcome = workflow.submit(UploadTarget::from_path(&cli.file)).await;
    let panel = workflow.panel();

    if let Some(ref path) = cli.html {
        if outcome.is_success() {
            write_html(path, &workflow.to_html())
                .await
                .context("Failed to write HTML output")?;
        }
    }

    if cli.json {
        let json = serde_json::to_string_pretty(&panel.plots)
            .context("Failed to serialise plots")?;
        println!("{json}");
    } else if !show_progress && outcome.is_success() {
        for plot in &panel.plots {
            match plot.caption {
                Some(ref caption) => println!("{}\t{}", plot.src, caption),
                None => println!("{}", plot.src),
            }
        }
    }

    // ── Summary ──────────────────────────────────────────────────────────
    if !cli.quiet {
        match outcome {
            Outcome::Rendered(n) => {
                let target = cli
                    .html
                    .as_ref()
                    .map(|p| format!("  →  {}", bold(&p.display().to_string())))
                    .unwrap_or_default();
                eprintln!("{} {} plots rendered{}", green("✔"), bold(&n.to_string()), target);
            }
            _ => eprintln!("{} {}", red("✘"), panel.status),
        }
    }

    Ok(if outcome.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

/// Map CLI args to `WorkflowConfig`.
fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<WorkflowConfig> {
    let mut builder = WorkflowConfig::builder()
        .api_base(cli.api_base.as_str())
        .max_attempts(cli.max_attempts)
        .poll_interval_ms(cli.poll_interval_ms)
        .request_timeout_secs(cli.timeout);

    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}
