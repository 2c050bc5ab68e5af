//! Source file watcher: the live text surface of the CLI.
//!
//! The parent directory is watched (non-recursive) because editors often
//! replace files by rename, which a watch on the file itself would miss.
//! Every relevant notification re-reads the file; unchanged content and
//! unreadable intermediate states are skipped.

use core_events::{AsyncEventSource, CHANNEL_SEND_FAILURES, Event, InputEvent, SOURCE_CHANGES};
use notify::{Config, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use std::sync::atomic::Ordering;
use tokio::sync::mpsc::{self, Sender};
use tokio::task::JoinHandle;
use tracing::{debug, trace, warn};

/// Suppresses re-delivery of identical content.
#[derive(Debug, Default)]
pub struct ChangeFilter {
    last: Option<String>,
}

impl ChangeFilter {
    pub fn new(initial: Option<String>) -> Self {
        Self { last: initial }
    }

    /// `Some(text)` when `text` differs from what was last accepted.
    pub fn accept(&mut self, text: String) -> Option<String> {
        if self.last.as_deref() == Some(text.as_str()) {
            return None;
        }
        self.last = Some(text.clone());
        Some(text)
    }
}

/// Whether a filesystem notification concerns `target`.
pub fn is_relevant(event: &notify::Event, target: &Path) -> bool {
    let kind_matches = matches!(
        event.kind,
        EventKind::Create(_) | EventKind::Modify(_) | EventKind::Any
    );
    kind_matches
        && event
            .paths
            .iter()
            .any(|p| p == target || p.file_name() == target.file_name())
}

pub struct SourceFileWatcher {
    path: PathBuf,
    initial: Option<String>,
}

impl SourceFileWatcher {
    /// `initial` is the content the runtime already rendered; an identical
    /// first read is not re-sent.
    pub fn new(path: impl Into<PathBuf>, initial: Option<String>) -> Self {
        Self {
            path: path.into(),
            initial,
        }
    }
}

impl AsyncEventSource for SourceFileWatcher {
    fn name(&self) -> &'static str {
        "source_watch"
    }

    fn spawn(self: Box<Self>, tx: Sender<Event>) -> JoinHandle<()> {
        let SourceFileWatcher { path, initial } = *self;
        tokio::spawn(async move {
            let (fs_tx, mut fs_rx) = mpsc::unbounded_channel();
            let watcher = RecommendedWatcher::new(
                move |res: notify::Result<notify::Event>| {
                    let _ = fs_tx.send(res);
                },
                Config::default(),
            );
            let mut watcher = match watcher {
                Ok(w) => w,
                Err(e) => {
                    warn!(target: "input.watch", error = %e, "watcher_create_failed");
                    return;
                }
            };
            let dir = match path.parent() {
                Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
                _ => PathBuf::from("."),
            };
            if let Err(e) = watcher.watch(&dir, RecursiveMode::NonRecursive) {
                warn!(target: "input.watch", error = %e, dir = %dir.display(), "watch_failed");
                return;
            }
            debug!(target: "input.watch", path = %path.display(), "watching_source");

            let mut filter = ChangeFilter::new(initial);
            let canonical = path.canonicalize().unwrap_or_else(|_| path.clone());
            tokio::select! {
                _ = tx.closed() => {}
                _ = async {
                    while let Some(res) = fs_rx.recv().await {
                        let event = match res {
                            Ok(event) => event,
                            Err(e) => {
                                warn!(target: "input.watch", error = %e, "watch_error");
                                continue;
                            }
                        };
                        if !is_relevant(&event, &canonical) {
                            continue;
                        }
                        let text = match tokio::fs::read_to_string(&path).await {
                            Ok(text) => text,
                            Err(e) => {
                                // Mid-save states (file briefly missing) are expected.
                                trace!(target: "input.watch", error = %e, "source_read_skipped");
                                continue;
                            }
                        };
                        let Some(text) = filter.accept(text) else {
                            continue;
                        };
                        SOURCE_CHANGES.fetch_add(1, Ordering::Relaxed);
                        trace!(target: "input.watch", text_len = text.len(), "source_changed");
                        if tx.send(Event::Input(InputEvent::SourceChanged(text))).await.is_err() {
                            CHANNEL_SEND_FAILURES.fetch_add(1, Ordering::Relaxed);
                            break;
                        }
                    }
                } => {}
            }
            drop(watcher);
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::event::{CreateKind, DataChange, ModifyKind, RemoveKind};

    fn event(kind: EventKind, path: &str) -> notify::Event {
        notify::Event::new(kind).add_path(PathBuf::from(path))
    }

    #[test]
    fn filter_skips_duplicates() {
        let mut f = ChangeFilter::new(Some("a".into()));
        assert_eq!(f.accept("a".into()), None);
        assert_eq!(f.accept("b".into()).as_deref(), Some("b"));
        assert_eq!(f.accept("b".into()), None);
        assert_eq!(f.accept("a".into()).as_deref(), Some("a"));
    }

    #[test]
    fn relevance_by_kind_and_path() {
        let target = Path::new("/tmp/doc/page.sml");
        assert!(is_relevant(
            &event(EventKind::Modify(ModifyKind::Data(DataChange::Content)), "/tmp/doc/page.sml"),
            target
        ));
        assert!(is_relevant(
            &event(EventKind::Create(CreateKind::File), "/private/tmp/doc/page.sml"),
            target
        ));
        assert!(!is_relevant(
            &event(EventKind::Modify(ModifyKind::Any), "/tmp/doc/other.sml"),
            target
        ));
        assert!(!is_relevant(
            &event(EventKind::Remove(RemoveKind::File), "/tmp/doc/page.sml"),
            target
        ));
    }
}
