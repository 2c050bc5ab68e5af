//! Text surface contract and the in-memory surface used by the runtime.

/// A live text-input region. The plain text is authoritative; markup is a
/// display-only projection written back by the adapter.
pub trait TextSurface {
    /// Current user text. Never contains adapter-produced markup.
    fn plain_text(&self) -> &str;
    /// Replace the rendered projection. Must not touch `plain_text`.
    fn set_markup(&mut self, markup: String);
}

/// Surface holding text and its latest rendered markup in memory.
///
/// `revision` increments on every text replacement so callers can tell a
/// fresh edit from a re-render of the same text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BufferSurface {
    text: String,
    markup: String,
    revision: u64,
}

impl BufferSurface {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            markup: String::new(),
            revision: 0,
        }
    }

    /// Replace the user text (an edit). Returns `false` when unchanged.
    pub fn set_text(&mut self, text: impl Into<String>) -> bool {
        let text = text.into();
        if text == self.text {
            return false;
        }
        self.text = text;
        self.revision += 1;
        true
    }

    pub fn markup(&self) -> &str {
        &self.markup
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }
}

impl TextSurface for BufferSurface {
    fn plain_text(&self) -> &str {
        &self.text
    }

    fn set_markup(&mut self, markup: String) {
        self.markup = markup;
    }
}
