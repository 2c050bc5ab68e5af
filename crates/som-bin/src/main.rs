//! SomMark playground entrypoint.
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use core_config::{Config, load_from};
use core_engine::{Format, ProcessEngine};
use core_events::{EVENT_CHANNEL_CAP, Event, EventSourceRegistry};
use core_input::{CommandSource, SourceFileWatcher};
use core_model::EditorAdapter;
use core_output::DirectorySink;
use core_render::{StyleClass, StyleMap};
use core_state::{JsonFileStore, KeyValueStore, MemoryStore, Session};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Once};
use tokio::sync::mpsc;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;

mod runtime;

use runtime::{CtrlCSource, Playground, PlaygroundParts};

const LOG_FILE_NAME: &str = "sommark-playground.log";
const DEFAULT_SOURCE_FILE: &str = "playground.sml";

/// CLI arguments.
#[derive(Parser, Debug)]
#[command(name = "sommark-playground", version, about = "Live SomMark playground")]
struct Args {
    /// Configuration file path (overrides discovery of `sommark-playground.toml`).
    #[arg(long = "config", global = true)]
    config: Option<PathBuf>,
    /// Output format (html, markdown, mdx, text); overrides the persisted one.
    #[arg(long = "format", global = true)]
    format: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Highlight a file once and print the markup.
    Highlight { path: PathBuf },
    /// Watch a source file and keep the output directory up to date.
    Watch { path: Option<PathBuf> },
}

fn configure_logging() -> Option<WorkerGuard> {
    let log_dir = Path::new(".");
    let log_path = log_dir.join(LOG_FILE_NAME);
    if log_path.exists() {
        let _ = std::fs::remove_file(&log_path);
    }
    let file_appender = tracing_appender::rolling::never(log_dir, LOG_FILE_NAME);
    let (nb_writer, guard) = tracing_appender::non_blocking(file_appender);
    match tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(nb_writer)
        .try_init()
    {
        Ok(()) => Some(guard),
        // Global subscriber already installed; drop guard so the writer shuts down.
        Err(_) => None,
    }
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

/// Class names from `[highlight.classes]`; invalid entries keep the default.
fn style_map(config: &Config) -> StyleMap {
    let mut styles = StyleMap::new();
    for (key, name) in &config.file.highlight.classes {
        let Some(class) = StyleClass::ALL.into_iter().find(|c| c.key() == key.as_str()) else {
            warn!(target: "config", key = key.as_str(), "unknown_highlight_class");
            continue;
        };
        if let Err(e) = styles.set_class_name(class, name) {
            warn!(target: "config", error = %e, "invalid_class_name_ignored");
        }
    }
    styles
}

fn engine_from(config: &Config) -> ProcessEngine {
    ProcessEngine::new(config.file.engine.program.clone(), config.file.engine.args.clone())
}

/// `--format`, then the persisted tag, then the configured default.
fn resolve_format(cli: Option<&str>, persisted: Option<&str>, config: &Config) -> Format {
    if let Some(tag) = cli {
        match Format::try_from_tag(tag) {
            Some(format) => return format,
            None => warn!(target: "runtime.startup", tag, "unknown_cli_format_ignored"),
        }
    }
    let tag = persisted.unwrap_or(config.file.editor.default_format.as_str());
    Format::from_tag(tag)
}

fn open_store(config: &Config) -> Box<dyn KeyValueStore + Send> {
    let Some(path) = config.storage_path() else {
        warn!(target: "state.store", "no_data_dir_state_not_persisted");
        return Box::new(MemoryStore::new());
    };
    match JsonFileStore::open(&path) {
        Ok(store) => Box::new(store),
        Err(e) => {
            warn!(target: "state.store", error = %e, "state_unreadable_starting_fresh");
            Box::new(JsonFileStore::empty(path))
        }
    }
}

fn highlight_once(path: &Path, config: &Config) -> Result<()> {
    let source = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    let engine = engine_from(config);
    let markup = core_render::highlight(&source, &engine, &style_map(config));
    println!("{markup}");
    Ok(())
}

async fn watch(path: Option<PathBuf>, cli_format: Option<&str>, config: Config) -> Result<()> {
    let store = open_store(&config);
    let session = Session::load(&*store);
    let format = resolve_format(cli_format, session.format.as_deref(), &config);

    let path = path.unwrap_or_else(|| PathBuf::from(DEFAULT_SOURCE_FILE));
    let source = match std::fs::read_to_string(&path) {
        Ok(text) => text,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            std::fs::write(&path, &session.source)
                .with_context(|| format!("seeding {}", path.display()))?;
            info!(target: "runtime.startup", path = %path.display(), "source_file_seeded");
            session.source
        }
        Err(e) => return Err(e).with_context(|| format!("reading {}", path.display())),
    };

    let sink = DirectorySink::create(&config.file.output.dir)
        .with_context(|| format!("creating {}", config.file.output.dir.display()))?;
    let engine = Arc::new(engine_from(&config));
    let adapter = EditorAdapter::new((*engine).clone(), Arc::new(style_map(&config)));

    info!(
        target: "runtime.startup",
        path = %path.display(),
        format = format.as_tag(),
        output = %sink.dir().display(),
        debounce_ms = config.effective_debounce_ms,
        config_path = config.path.as_ref().map(|p| p.display().to_string()).as_deref(),
        "bootstrap_complete"
    );

    let (tx, rx) = mpsc::channel::<Event>(EVENT_CHANNEL_CAP);
    let mut registry = EventSourceRegistry::new();
    registry.register(SourceFileWatcher::new(&path, Some(source.clone())));
    registry.register(CommandSource::stdin());
    registry.register(CtrlCSource);
    let source_handles = registry.spawn_all(&tx);

    let parts = PlaygroundParts {
        engine,
        adapter,
        sink,
        store,
        source,
        format,
        debounce: config.debounce(),
    };
    let mut playground = Playground::new(parts, tx, rx, source_handles);
    let reason = playground.run().await?;
    info!(target: "runtime", %reason, "exit");
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let _log_guard = configure_logging();
    install_panic_hook();
    info!(target: "runtime", "startup");

    let args = Args::parse();
    let config = load_from(args.config.clone())?;
    match args.command {
        Command::Highlight { path } => highlight_once(&path, &config),
        Command::Watch { path } => watch(path, args.format.as_deref(), config).await,
    }
}
