//! Output formats and the mapper each one transpiles with.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Closed set of transpile targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    #[default]
    Html,
    Markdown,
    Mdx,
    Text,
}

/// Mapper handed to the transpiler alongside the format tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MapperRef {
    Html,
    Markdown,
    Mdx,
}

impl Format {
    pub const ALL: [Format; 4] = [Format::Html, Format::Markdown, Format::Mdx, Format::Text];

    /// Parse a tag. Unknown tags fall back to `Html`, matching the mapper
    /// fallback of the transpiler.
    pub fn from_tag(tag: &str) -> Self {
        Self::try_from_tag(tag).unwrap_or_else(|| {
            tracing::debug!(target: "engine.format", tag, "unknown_format_tag_defaulting_html");
            Format::Html
        })
    }

    pub fn try_from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.as_tag() == tag.trim())
    }

    pub fn as_tag(self) -> &'static str {
        match self {
            Format::Html => "html",
            Format::Markdown => "markdown",
            Format::Mdx => "mdx",
            Format::Text => "text",
        }
    }

    /// `None` for plain text: the transpiler runs without a mapper.
    pub fn mapper(self) -> Option<MapperRef> {
        match self {
            Format::Html => Some(MapperRef::Html),
            Format::Markdown => Some(MapperRef::Markdown),
            Format::Mdx => Some(MapperRef::Mdx),
            Format::Text => None,
        }
    }

    /// Markdown-family output is previewed through a markdown converter.
    pub fn is_markdown_family(self) -> bool {
        matches!(self, Format::Markdown | Format::Mdx)
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_tag())
    }
}

impl MapperRef {
    pub fn as_tag(self) -> &'static str {
        match self {
            MapperRef::Html => "HTML",
            MapperRef::Markdown => "MARKDOWN",
            MapperRef::Mdx => "MDX",
        }
    }
}

/// Parse/transpile request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranspileRequest {
    pub source: String,
    pub format: Format,
    pub mapper: Option<MapperRef>,
}

impl TranspileRequest {
    pub fn new(source: impl Into<String>, format: Format) -> Self {
        Self {
            source: source.into(),
            format,
            mapper: format.mapper(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_round_trip_and_unknown_defaults_to_html() {
        for f in Format::ALL {
            assert_eq!(Format::from_tag(f.as_tag()), f);
        }
        assert_eq!(Format::from_tag("latex"), Format::Html);
        assert_eq!(Format::from_tag(" mdx\n"), Format::Mdx);
        assert_eq!(Format::try_from_tag("latex"), None);
    }

    #[test]
    fn mapper_per_format() {
        assert_eq!(TranspileRequest::new("x", Format::Html).mapper, Some(MapperRef::Html));
        assert_eq!(TranspileRequest::new("x", Format::Markdown).mapper, Some(MapperRef::Markdown));
        assert_eq!(TranspileRequest::new("x", Format::Mdx).mapper, Some(MapperRef::Mdx));
        assert_eq!(TranspileRequest::new("x", Format::Text).mapper, None);
    }

    #[test]
    fn serde_uses_lowercase_tags() {
        assert_eq!(serde_json::to_string(&Format::Mdx).unwrap(), "\"mdx\"");
        let f: Format = serde_json::from_str("\"text\"").unwrap();
        assert_eq!(f, Format::Text);
    }
}
