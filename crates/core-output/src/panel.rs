//! Results region: rendered preview plus transpiled, AST and tokens views.

use crate::diagnostic::diagnostic_block;
use crate::highlighter::{PaneLanguage, StaticHighlighter};
use core_engine::{Format, UpdateOutcome, UpdateReport};
use core_render::{StyleClass, StyleMap, escape};
use pulldown_cmark::{Options, Parser};
use serde::Serialize;
use tracing::trace;

const ERROR_STYLE: &str = "body { margin: 0; padding: 20px; font-family: monospace; }\n\
.error-container { background: #101014; border-left: 3px solid #e03131; color: #e0e0e0; \
padding: 16px; white-space: pre-wrap; word-break: break-word; border-radius: 8px; \
font-size: 13px; line-height: 1.5; }";

const MARKDOWN_STYLE: &str = "body { font-family: sans-serif; line-height: 1.6; padding: 20px; color: #333; }\n\
h1, h2, h3 { color: #111; }\n\
pre { background: #f4f4f4; padding: 10px; border-radius: 5px; overflow-x: auto; }\n\
code { background: #f4f4f4; padding: 2px 4px; border-radius: 3px; font-family: monospace; }\n\
blockquote { border-left: 4px solid #ccc; margin: 0; padding-left: 10px; color: #666; }";

const TEXT_STYLE: &str =
    "body { font-family: monospace; white-space: pre-wrap; padding: 20px; color: #333; background: #fff; }";

const PANE_STYLE: &str = "body { margin: 0; background: #101014; color: #e0e0e0; }\n\
pre { margin: 0; padding: 16px; font-family: monospace; white-space: pre-wrap; }\n\
.hl-comment { color: #707070; }\n\
.hl-string { color: #69db7c; }\n\
.hl-constant { color: #fcc419; }\n\
.hl-keyword { color: #f06595; }\n\
.hl-entity, .hl-tag { color: #4dabf7; }\n\
.hl-support, .hl-attribute-name { color: #3bc9db; }";

/// The four result documents produced for one update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanelDocuments {
    pub preview: String,
    pub transpiled: String,
    pub ast: String,
    pub tokens: String,
}

pub struct OutputPanel {
    highlighter: StaticHighlighter,
}

impl Default for OutputPanel {
    fn default() -> Self {
        Self::new(StaticHighlighter::new())
    }
}

impl OutputPanel {
    pub fn new(highlighter: StaticHighlighter) -> Self {
        Self { highlighter }
    }

    pub fn render(&self, report: &UpdateReport) -> PanelDocuments {
        let docs = PanelDocuments {
            preview: preview_document(report),
            transpiled: pane_document(&self.transpiled_view(report)),
            ast: pane_document(&self.highlighter.highlight(&pretty_json(&report.ast()), PaneLanguage::Json)),
            tokens: pane_document(&self.highlighter.highlight(&pretty_json(report.tokens()), PaneLanguage::Json)),
        };
        trace!(
            target: "output.panel",
            format = report.format.as_tag(),
            failed = report.is_failure(),
            preview_len = docs.preview.len(),
            "panel_rendered"
        );
        docs
    }

    /// Raw transpiled markup, highlighted for its format. On failure the
    /// diagnostic block is shown as markup, unhighlighted.
    fn transpiled_view(&self, report: &UpdateReport) -> String {
        match &report.outcome {
            UpdateOutcome::Failure { message } => diagnostic_block(message),
            UpdateOutcome::Success { transpiled, .. } => {
                let language = match report.format {
                    Format::Html => PaneLanguage::Html,
                    Format::Markdown | Format::Mdx => PaneLanguage::Markdown,
                    Format::Text => PaneLanguage::PlainText,
                };
                self.highlighter.highlight(transpiled, language)
            }
        }
    }
}

/// Rendered preview document for `report`.
pub fn preview_document(report: &UpdateReport) -> String {
    match &report.outcome {
        UpdateOutcome::Failure { message } => document(ERROR_STYLE, &diagnostic_block(message)),
        UpdateOutcome::Success { transpiled, .. } => match report.format {
            Format::Html => document("", transpiled),
            Format::Markdown | Format::Mdx => document(MARKDOWN_STYLE, &markdown_to_html(transpiled)),
            Format::Text => document(TEXT_STYLE, &escape(transpiled)),
        },
    }
}

/// Live editor document: reconciled markup plus the token stylesheet.
pub fn editor_document(markup: &str, styles: &StyleMap) -> String {
    let mut css = String::from(
        "body { margin: 0; background: #101014; color: #e0e0e0; }\n\
pre { margin: 0; padding: 16px; font-family: monospace; white-space: pre-wrap; }\n",
    );
    for class in StyleClass::ALL {
        let color = match class {
            StyleClass::Operator => "#f06595",
            StyleClass::Keyword => "#e03131",
            StyleClass::Identifier => "#4dabf7",
            StyleClass::Value => "#69db7c",
            StyleClass::Text => "#e0e0e0",
            StyleClass::Comment => "#707070",
        };
        css.push_str(&format!(".{} {{ color: {color}; }}\n", styles.class_name(class)));
    }
    document(&css, &format!("<pre class=\"editor\">{markup}</pre>"))
}

fn pane_document(body: &str) -> String {
    document(PANE_STYLE, &format!("<pre class=\"output-content\"><code>{body}</code></pre>"))
}

fn document(style: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<style>\n{style}\n</style>\n</head>\n<body>\n{body}\n</body>\n</html>\n"
    )
}

fn markdown_to_html(markdown: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);
    let parser = Parser::new_ext(markdown, options);
    let mut html = String::with_capacity(markdown.len() * 3 / 2);
    pulldown_cmark::html::push_html(&mut html, parser);
    html
}

fn pretty_json<T: Serialize + ?Sized>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| "null".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_lexer::{Token, TokenKind};
    use serde_json::json;

    fn success(format: Format, transpiled: &str) -> UpdateReport {
        UpdateReport {
            source: "src".into(),
            format,
            outcome: UpdateOutcome::Success {
                transpiled: transpiled.into(),
                ast: json!({"type": "Document"}),
                tokens: vec![Token::new(TokenKind::Text, "src", 1, 1)],
            },
        }
    }

    #[test]
    fn html_preview_is_verbatim() {
        let doc = preview_document(&success(Format::Html, "<h1>Hi</h1>"));
        assert!(doc.contains("<h1>Hi</h1>"));
    }

    #[test]
    fn markdown_preview_is_converted() {
        for format in [Format::Markdown, Format::Mdx] {
            let doc = preview_document(&success(format, "# Title\n\n**bold**"));
            assert!(doc.contains("<h1>Title</h1>"), "{doc}");
            assert!(doc.contains("<strong>bold</strong>"));
            assert!(doc.contains("blockquote {"));
        }
    }

    #[test]
    fn text_preview_is_escaped() {
        let doc = preview_document(&success(Format::Text, "a <b> & c"));
        assert!(doc.contains("a &lt;b&gt; &amp; c"));
        assert!(doc.contains("pre-wrap"));
    }

    #[test]
    fn failure_preview_shows_diagnostic() {
        let report = UpdateReport {
            source: "[x".into(),
            format: Format::Markdown,
            outcome: UpdateOutcome::Failure {
                message: "Unexpected <EOF>".into(),
            },
        };
        let doc = preview_document(&report);
        assert!(doc.contains("<div class=\"error-container\">Unexpected &lt;EOF&gt;</div>"));
        assert!(doc.contains(".error-container {"));
    }

    #[test]
    fn editor_document_uses_configured_classes() {
        let mut styles = StyleMap::new();
        styles.set_class_name(StyleClass::Keyword, "kw").unwrap();
        let doc = editor_document("<span class=\"kw\">end</span>", &styles);
        assert!(doc.contains(".kw { color"));
        assert!(doc.contains(".token-operator { color"));
        assert!(doc.contains("<pre class=\"editor\"><span class=\"kw\">end</span></pre>"));
    }
}
