//! Text renderer: description trees to LaTeX fragments

use crate::config::{ConvertConfig, Escaping};
use crate::types::{DocElement, DocNode, Tag};

/// Separator between sibling paragraphs
pub const PARA_SEP: &str = "\\\\[2mm]\n";

/// Converts description nodes into markup
pub trait Render {
    /// Escape raw text for the target markup
    fn escape(&self, text: &str) -> String;

    /// Render one element and everything below it
    fn render_element(&self, element: &DocElement) -> String;

    /// Render an optional node, trimmed; absent nodes render as ""
    fn render(&self, node: Option<&DocElement>) -> String {
        node.map(|n| self.render_element(n).trim().to_string())
            .unwrap_or_default()
    }
}

/// LaTeX renderer for the HSA reference manual macros
#[derive(Debug, Clone)]
pub struct TexRenderer {
    escaping: Escaping,
    api_prefix: String,
    type_suffixes: Vec<String>,
}

impl TexRenderer {
    pub fn new(config: &ConvertConfig) -> Self {
        Self {
            escaping: config.escaping,
            api_prefix: config.api_prefix.clone(),
            type_suffixes: config.type_suffixes.clone(),
        }
    }

    fn is_function_name(&self, text: &str) -> bool {
        text.starts_with(&self.api_prefix)
            && !self.type_suffixes.iter().any(|s| text.ends_with(s.as_str()))
    }

    /// Text carried directly by the element, formatted according to its tag
    fn render_own_text(&self, element: &DocElement, text: &str) -> String {
        let escaped = self.escape(text);
        match &element.tag {
            Tag::Emphasis | Tag::ComputerOutput => format!("\\textit{{{}}}", escaped),
            Tag::Ref { refid } => {
                let label = if self.is_function_name(text) {
                    format!("\\reffun{{{}}}", escaped)
                } else {
                    escaped
                };
                format!("\\hyperlink{{{}}}{{{}}}", refid, label)
            }
            _ => escaped,
        }
    }

    fn render_list(&self, element: &DocElement) -> String {
        let mut items = String::new();
        for item in element.elements() {
            items.push_str("\\item ");
            items.push_str(&self.render_element(item));
            items.push('\n');
        }
        format!("\\begin{{itemize}}{}\\end{{itemize}}", items)
    }
}

impl Render for TexRenderer {
    fn escape(&self, text: &str) -> String {
        match self.escaping {
            Escaping::Hyphenate => text.replace('_', "_\\-"),
            Escaping::Literal => text.to_string(),
        }
    }

    fn render_element(&self, element: &DocElement) -> String {
        let mut out = String::new();

        let leading = element.leading_text();
        if !leading.is_empty() {
            out.push_str(&self.render_own_text(element, &leading));
        }

        let paras: Vec<&DocElement> = element.elements().filter(|e| e.tag == Tag::Para).collect();
        if !paras.is_empty() {
            let rendered: Vec<String> = paras.iter().map(|p| self.render_element(p)).collect();
            out.push_str(&rendered.join(PARA_SEP));
            return out;
        }

        match element.tag {
            Tag::ItemizedList => {
                out.push_str(&self.render_list(element));
                return out;
            }
            Tag::Infinity => {
                out.push_str("$\\infty$");
                return out;
            }
            _ => {}
        }

        let first_element = element
            .children
            .iter()
            .position(|c| matches!(c, DocNode::Element(_)))
            .unwrap_or(element.children.len());
        for child in &element.children[first_element..] {
            match child {
                DocNode::Element(e) => out.push_str(&self.render_element(e)),
                DocNode::Text(tail) => out.push_str(&self.escape(tail)),
            }
        }
        out
    }
}
