//! Playground event loop.
//!
//! One task owns all mutable state and consumes the shared event channel:
//! * `SourceChanged` runs the fast path (re-highlight into the editor pane)
//!   synchronously; the adapter's change handler then feeds the debouncer.
//! * The debounce deadline fires the slow path: a spawned update cycle tagged
//!   with a fresh generation.
//! * `PipelineFinished` is applied only when its generation is newer than the
//!   last applied one; older completions are dropped.
//! * `SetFormat` cancels any pending debounce and updates immediately.

use anyhow::Result;
use core_engine::{Engine, Format, UpdateReport, run_update};
use core_events::{AsyncEventSource, CommandEvent, Event, InputEvent};
use core_lexer::Lexer;
use core_model::{BufferSurface, EditorAdapter, TextSurface};
use core_output::{DisplaySink, OutputPanel, Pane, editor_document, show_panel};
use core_render::Debouncer;
use core_state::{Generation, GenerationGate, KeyValueStore, Session};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, error, info, trace, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownReason {
    CtrlC,
    CommandQuit,
    ChannelClosed,
}

impl ShutdownReason {
    fn as_str(&self) -> &'static str {
        match self {
            ShutdownReason::CtrlC => "ctrl_c",
            ShutdownReason::CommandQuit => "command_quit",
            ShutdownReason::ChannelClosed => "channel_closed",
        }
    }
}

impl fmt::Display for ShutdownReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

enum LoopControl {
    Continue,
    Break(ShutdownReason),
}

/// Turns Ctrl-C into `Event::Shutdown`.
pub struct CtrlCSource;

impl AsyncEventSource for CtrlCSource {
    fn name(&self) -> &'static str {
        "ctrl_c"
    }

    fn spawn(self: Box<Self>, tx: mpsc::Sender<Event>) -> JoinHandle<()> {
        tokio::spawn(async move {
            tokio::select! {
                res = tokio::signal::ctrl_c() => {
                    if let Err(e) = res {
                        warn!(target: "runtime.events", error = %e, "ctrl_c_listen_failed");
                        return;
                    }
                    let _ = tx.send(Event::Shutdown).await;
                }
                _ = tx.closed() => {}
            }
        })
    }
}

/// Everything the loop needs besides the channel.
pub struct PlaygroundParts<E, L, S, K> {
    pub engine: Arc<E>,
    pub adapter: EditorAdapter<L>,
    pub sink: S,
    pub store: K,
    pub source: String,
    pub format: Format,
    pub debounce: Duration,
}

pub struct Playground<E, L, S, K> {
    engine: Arc<E>,
    adapter: EditorAdapter<L>,
    surface: BufferSurface,
    format: Format,
    debouncer: Debouncer<String>,
    gate: GenerationGate,
    panel: OutputPanel,
    sink: S,
    store: K,
    changes: mpsc::UnboundedReceiver<String>,
    rx: mpsc::Receiver<Event>,
    tx: Option<mpsc::Sender<Event>>,
    source_handles: Vec<JoinHandle<()>>,
}

impl<E, L, S, K> Playground<E, L, S, K>
where
    E: Engine + 'static,
    L: Lexer,
    S: DisplaySink,
    K: KeyValueStore,
{
    pub fn new(
        parts: PlaygroundParts<E, L, S, K>,
        tx: mpsc::Sender<Event>,
        rx: mpsc::Receiver<Event>,
        source_handles: Vec<JoinHandle<()>>,
    ) -> Self {
        let PlaygroundParts {
            engine,
            mut adapter,
            sink,
            store,
            source,
            format,
            debounce,
        } = parts;
        let (change_tx, changes) = mpsc::unbounded_channel();
        adapter.subscribe(move |change| {
            let _ = change_tx.send(change.text.clone());
        });
        Self {
            engine,
            adapter,
            surface: BufferSurface::new(source),
            format,
            debouncer: Debouncer::new(debounce),
            gate: GenerationGate::new(),
            panel: OutputPanel::default(),
            sink,
            store,
            changes,
            rx,
            tx: Some(tx),
            source_handles,
        }
    }

    pub async fn run(&mut self) -> Result<ShutdownReason> {
        self.paint_editor();
        let initial = self.surface.plain_text().to_string();
        self.start_update(initial);

        let reason = loop {
            let deadline = self.debouncer.deadline();
            let control = tokio::select! {
                maybe = self.rx.recv() => match maybe {
                    Some(event) => self.handle_event(event),
                    None => LoopControl::Break(ShutdownReason::ChannelClosed),
                },
                _ = until_deadline(deadline) => {
                    if let Some(text) = self.debouncer.poll(now()) {
                        self.start_update(text);
                    }
                    LoopControl::Continue
                }
            };
            if let LoopControl::Break(reason) = control {
                break reason;
            }
        };

        self.rx.close();
        self.finalize_shutdown(reason).await;
        Ok(reason)
    }

    fn handle_event(&mut self, event: Event) -> LoopControl {
        match event {
            Event::Input(InputEvent::SourceChanged(text)) => {
                self.handle_source_changed(text);
                LoopControl::Continue
            }
            Event::Command(CommandEvent::SetFormat(format)) => {
                self.handle_set_format(format);
                LoopControl::Continue
            }
            Event::Command(CommandEvent::Quit) => LoopControl::Break(ShutdownReason::CommandQuit),
            Event::PipelineFinished { generation, report } => {
                self.handle_pipeline_finished(generation, report);
                LoopControl::Continue
            }
            Event::Shutdown => LoopControl::Break(ShutdownReason::CtrlC),
        }
    }

    fn handle_source_changed(&mut self, text: String) {
        if !self.surface.set_text(text) {
            trace!(target: "runtime", "source_unchanged");
            return;
        }
        self.adapter.handle_change(&mut self.surface);
        self.show(Pane::Editor, &editor_document(self.surface.markup(), self.adapter.styles()));
        // Handlers ran synchronously inside handle_change.
        while let Ok(text) = self.changes.try_recv() {
            self.debouncer.submit(text, now());
        }
    }

    fn handle_set_format(&mut self, format: Format) {
        info!(target: "runtime", format = format.as_tag(), "format_changed");
        self.format = format;
        self.debouncer.cancel();
        let text = self.surface.plain_text().to_string();
        self.start_update(text);
    }

    fn handle_pipeline_finished(&mut self, generation: Generation, report: UpdateReport) {
        if !self.gate.accept(generation) {
            return;
        }
        let docs = self.panel.render(&report);
        if let Err(e) = show_panel(&mut self.sink, &docs) {
            warn!(target: "runtime.pipeline", error = %e, "panel_write_failed");
        }
        Session::save_or_warn(&mut self.store, &report.source, report.format.as_tag());
        debug!(
            target: "runtime.pipeline",
            generation = generation.0,
            failed = report.is_failure(),
            "update_applied"
        );
    }

    fn start_update(&mut self, source: String) {
        let Some(tx) = self.tx.clone() else {
            return;
        };
        let generation = self.gate.issue();
        let engine = Arc::clone(&self.engine);
        let format = self.format;
        trace!(
            target: "runtime.pipeline",
            generation = generation.0,
            format = format.as_tag(),
            source_len = source.len(),
            "update_started"
        );
        tokio::spawn(async move {
            let report = run_update(&*engine, &source, format).await;
            if tx
                .send(Event::PipelineFinished { generation, report })
                .await
                .is_err()
            {
                trace!(target: "runtime.pipeline", generation = generation.0, "update_result_orphaned");
            }
        });
    }

    fn paint_editor(&mut self) {
        self.adapter.render(&mut self.surface);
        self.show(Pane::Editor, &editor_document(self.surface.markup(), self.adapter.styles()));
    }

    fn show(&mut self, pane: Pane, document: &str) {
        if let Err(e) = self.sink.show(pane, document) {
            warn!(target: "runtime", pane = ?pane, error = %e, "pane_write_failed");
        }
    }

    async fn finalize_shutdown(&mut self, reason: ShutdownReason) {
        info!(target: "runtime.shutdown", reason = reason.as_str(), stage = "begin", "shutdown_stage");
        drop(self.tx.take());
        while let Some(handle) = self.source_handles.pop() {
            handle.abort();
            match handle.await {
                Ok(()) => trace!(target: "runtime.shutdown", "event_source_task_stopped"),
                Err(err) if err.is_cancelled() => {
                    trace!(target: "runtime.shutdown", "event_source_task_cancelled")
                }
                Err(err) => error!(target: "runtime.shutdown", ?err, "event_source_task_error"),
            }
        }
        info!(
            target: "runtime.shutdown",
            reason = reason.as_str(),
            stage = "complete",
            changes = self.adapter.changes_handled(),
            debounce = ?self.debouncer.metrics().snapshot(),
            stale_discarded = self.gate.discarded(),
            "shutdown_stage"
        );
    }

    pub fn format(&self) -> Format {
        self.format
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn store(&self) -> &K {
        &self.store
    }

    pub fn gate(&self) -> &GenerationGate {
        &self.gate
    }
}

/// Runtime clock as a std instant; follows tokio's paused clock in tests.
fn now() -> std::time::Instant {
    Instant::now().into_std()
}

async fn until_deadline(deadline: Option<std::time::Instant>) {
    match deadline {
        Some(d) => tokio::time::sleep_until(Instant::from_std(d)).await,
        None => std::future::pending().await,
    }
}
