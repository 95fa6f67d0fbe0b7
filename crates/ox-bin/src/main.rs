//! Oxmodal entrypoint: seeds a buffer, replays a key script, hands back the lines.
use anyhow::{Context, Result, bail};
use clap::Parser;
use core_actions::Engine;
use core_config::load_from;
use core_events::{KeyEvent, parse_keys};
use core_state::EngineError;
use std::path::{Path, PathBuf};
use std::sync::Once;
use tracing::{debug, info, warn};
use tracing_appender::non_blocking::WorkerGuard;

const LOG_FILE: &str = "oxmodal.log";

/// CLI arguments.
#[derive(Parser, Debug)]
#[command(name = "oxmodal", version, about = "Headless vi-style modal editing engine")]
struct Args {
    /// UTF-8 text file seeding the buffer. If omitted the buffer starts as one empty line.
    pub path: Option<PathBuf>,
    /// Key script in vi notation, e.g. `d2w<Esc>`.
    #[arg(long = "keys", short = 'k', conflicts_with = "keys_file")]
    pub keys: Option<String>,
    /// Read the key script from a file instead.
    #[arg(long = "keys-file")]
    pub keys_file: Option<PathBuf>,
    /// Optional configuration file path (overrides discovery of `oxmodal.toml`).
    #[arg(long = "config")]
    pub config: Option<PathBuf>,
    /// Write the result back to `path` instead of printing it.
    #[arg(long = "write", short = 'w', requires = "path")]
    pub write: bool,
}

/// Lines of a document plus whether the file ended with a line break.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Document {
    lines: Vec<String>,
    trailing_newline: bool,
}

impl Document {
    fn parse(content: &str) -> Self {
        let trailing_newline = content.ends_with('\n');
        let mut lines: Vec<String> = content.lines().map(str::to_string).collect();
        if lines.is_empty() {
            lines.push(String::new());
        }
        Self {
            lines,
            trailing_newline,
        }
    }

    fn render(&self) -> String {
        let mut out = self.lines.join("\n");
        if self.trailing_newline {
            out.push('\n');
        }
        out
    }
}

/// What a replay surfaced to the host.
#[derive(Debug, Default)]
struct ReplaySummary {
    keys: usize,
    changes: usize,
    notices: Vec<EngineError>,
    submitted: Vec<String>,
}

fn replay(engine: &mut Engine, keys: &[KeyEvent]) -> ReplaySummary {
    let mut summary = ReplaySummary {
        keys: keys.len(),
        ..ReplaySummary::default()
    };
    for (key, result) in keys.iter().zip(engine.handle_keys(keys)) {
        if result.buffer_changed {
            summary.changes += 1;
        }
        if let Some(notice) = result.notice {
            debug!(target: "runtime", %key, %notice, "notice");
            summary.notices.push(notice);
        }
        if let Some(line) = result.command_line {
            // Ex commands are the host's business; this driver only reports them.
            info!(target: "runtime", line = %line, "command_line_submitted");
            summary.submitted.push(line);
        }
    }
    summary
}

struct AppStartup {
    log_guard: Option<WorkerGuard>,
}

impl AppStartup {
    fn new() -> Self {
        Self { log_guard: None }
    }

    fn configure_logging(&mut self) -> Result<()> {
        let log_dir = Path::new(".");
        let log_path = log_dir.join(LOG_FILE);
        if log_path.exists() {
            let _ = std::fs::remove_file(&log_path);
        }

        let file_appender = tracing_appender::rolling::never(log_dir, LOG_FILE);
        let (nb_writer, guard) = tracing_appender::non_blocking(file_appender);
        if tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_writer(nb_writer)
            .try_init()
            .is_ok()
        {
            self.log_guard = Some(guard);
        }
        Ok(())
    }

    fn install_panic_hook() {
        static HOOK: Once = Once::new();
        HOOK.call_once(|| {
            let default_panic = std::panic::take_hook();
            std::panic::set_hook(Box::new(move |info| {
                tracing::error!(target: "runtime.panic", ?info, "panic");
                default_panic(info);
            }));
        });
    }
}

fn load_document(path: Option<&Path>) -> Result<Document> {
    let Some(path) = path else {
        return Ok(Document::parse(""));
    };
    if !path.exists() {
        info!(target: "runtime", file = %path.display(), "new_file");
        return Ok(Document::parse(""));
    }
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    let doc = Document::parse(&content);
    debug!(
        target: "runtime",
        file = %path.display(),
        size_bytes = content.len(),
        line_count = doc.lines.len(),
        "file_read_ok"
    );
    Ok(doc)
}

fn load_script(args: &Args) -> Result<Vec<KeyEvent>> {
    let script = match (&args.keys, &args.keys_file) {
        (Some(keys), _) => keys.clone(),
        (None, Some(file)) => std::fs::read_to_string(file)
            .with_context(|| format!("reading key script {}", file.display()))?
            .trim_end_matches(['\r', '\n'])
            .to_string(),
        (None, None) => String::new(),
    };
    parse_keys(&script).context("parsing key script")
}

fn run(args: Args) -> Result<()> {
    let config = load_from(args.config.clone())?;
    let engine_config = config.engine();
    info!(target: "runtime", config = ?config.path, ?engine_config, "config_loaded");

    let doc = load_document(args.path.as_deref())?;
    let keys = load_script(&args)?;
    let mut engine = Engine::with_config(doc.lines, engine_config);
    let summary = replay(&mut engine, &keys);
    info!(
        target: "runtime",
        keys = summary.keys,
        changes = summary.changes,
        notices = summary.notices.len(),
        submitted = summary.submitted.len(),
        mode = ?engine.mode(),
        "replay_done"
    );
    for line in &summary.submitted {
        eprintln!(":{line}");
    }

    let out = Document {
        lines: engine.lines(),
        trailing_newline: doc.trailing_newline,
    };
    if args.write {
        let Some(path) = args.path.as_ref() else {
            bail!("--write needs a file path");
        };
        std::fs::write(path, out.render())
            .with_context(|| format!("writing {}", path.display()))?;
        info!(target: "runtime", file = %path.display(), "file_written");
    } else {
        print!("{}", out.render());
        if !out.trailing_newline {
            println!();
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    let mut startup = AppStartup::new();
    startup.configure_logging()?;
    AppStartup::install_panic_hook();
    let result = run(args);
    if let Err(err) = &result {
        warn!(target: "runtime", error = %err, "run_failed");
    }
    drop(startup.log_guard.take());
    result
}
