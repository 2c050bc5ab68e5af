//! Where rendered documents go.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Display regions of the playground.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Pane {
    Editor,
    Preview,
    Transpiled,
    Ast,
    Tokens,
}

impl Pane {
    pub const ALL: [Pane; 5] = [Pane::Editor, Pane::Preview, Pane::Transpiled, Pane::Ast, Pane::Tokens];

    pub fn file_name(self) -> &'static str {
        match self {
            Pane::Editor => "editor.html",
            Pane::Preview => "preview.html",
            Pane::Transpiled => "transpiled.html",
            Pane::Ast => "ast.html",
            Pane::Tokens => "tokens.html",
        }
    }
}

pub trait DisplaySink {
    fn show(&mut self, pane: Pane, document: &str) -> io::Result<()>;
}

/// Writes each pane to `<dir>/<pane>.html` (temp file + rename, so viewers
/// never see a half-written document).
#[derive(Debug)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    pub fn create(dir: impl Into<PathBuf>) -> io::Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_of(&self, pane: Pane) -> PathBuf {
        self.dir.join(pane.file_name())
    }
}

impl DisplaySink for DirectorySink {
    fn show(&mut self, pane: Pane, document: &str) -> io::Result<()> {
        let target = self.path_of(pane);
        let tmp = target.with_extension("html.tmp");
        fs::write(&tmp, document)?;
        fs::rename(&tmp, &target)?;
        debug!(target: "output.sink", pane = pane.file_name(), bytes = document.len(), "pane_written");
        Ok(())
    }
}

/// Keeps the latest document per pane plus a write log (tests, embedding).
#[derive(Debug, Default, Clone)]
pub struct MemorySink {
    latest: BTreeMap<Pane, String>,
    writes: Vec<Pane>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, pane: Pane) -> Option<&str> {
        self.latest.get(&pane).map(String::as_str)
    }

    pub fn writes(&self) -> &[Pane] {
        &self.writes
    }
}

impl DisplaySink for MemorySink {
    fn show(&mut self, pane: Pane, document: &str) -> io::Result<()> {
        self.latest.insert(pane, document.to_string());
        self.writes.push(pane);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directory_sink_writes_named_files() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = DirectorySink::create(dir.path().join("out")).unwrap();
        sink.show(Pane::Preview, "<p>1</p>").unwrap();
        sink.show(Pane::Preview, "<p>2</p>").unwrap();
        let written = fs::read_to_string(dir.path().join("out").join("preview.html")).unwrap();
        assert_eq!(written, "<p>2</p>");
        assert!(!dir.path().join("out").join("preview.html.tmp").exists());
    }

    #[test]
    fn memory_sink_keeps_latest() {
        let mut sink = MemorySink::new();
        sink.show(Pane::Ast, "a").unwrap();
        sink.show(Pane::Ast, "b").unwrap();
        assert_eq!(sink.get(Pane::Ast), Some("b"));
        assert_eq!(sink.writes(), &[Pane::Ast, Pane::Ast]);
        assert_eq!(sink.get(Pane::Tokens), None);
    }
}
