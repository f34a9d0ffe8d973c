//! Entity processors
//!
//! One processor per declaration kind. Each appends its markup to the group
//! buffer and registers the names it declares in the shared [`Context`].

mod compound;
mod enumeration;
mod function;
mod typedef;

pub use compound::process_compound;
pub use enumeration::process_enum;
pub use function::process_function;
pub use typedef::process_typedef;

use serde::Serialize;

use crate::config::ConvertConfig;
use crate::deprecation::{DeprecatedCategory, DeprecatedEntry, Deprecation};
use crate::registry::Registry;
use crate::render::{Render, TexRenderer, PARA_SEP};
use crate::types::DocElement;

/// Opening of every declaration box
const BOX_BEGIN: &str = "\\vspace{-2.5mm}\\begin{mylongtable}{p{\\columnwidth}}\n";
const BOX_END: &str = "\\end{mylongtable}";
/// Spacing emitted before a brief description
const BRIEF_SPACING: &str = "\\vspace{-2.5mm}";

/// Number of entities rendered, per kind
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EntityCounts {
    pub typedefs: usize,
    pub structs: usize,
    pub enums: usize,
    pub functions: usize,
}

/// State shared by all processors for the whole run
pub struct Context<'c> {
    pub config: &'c ConvertConfig,
    pub renderer: TexRenderer,
    pub registry: Registry,
    /// Every documented function name, for the listings keyword file
    pub functions: Vec<String>,
    pub deprecated: Vec<DeprecatedEntry>,
    pub counts: EntityCounts,
}

impl<'c> Context<'c> {
    pub fn new(config: &'c ConvertConfig) -> Self {
        Self {
            config,
            renderer: TexRenderer::new(config),
            registry: Registry::new(config),
            functions: Vec::new(),
            deprecated: Vec::new(),
            counts: EntityCounts::default(),
        }
    }

    pub fn escape(&self, text: &str) -> String {
        self.renderer.escape(text)
    }

    pub fn render(&self, node: Option<&DocElement>) -> String {
        self.renderer.render(node)
    }

    /// Look for a deprecation notice; if found, write its banner and record
    /// the declaration for the deprecation report
    fn deprecation(
        &mut self,
        detailed: Option<&DocElement>,
        category: DeprecatedCategory,
        name: &str,
        out: &mut String,
    ) -> Option<Deprecation> {
        let deprecation = Deprecation::detect(detailed, &self.renderer)?;
        out.push_str(&deprecation.banner());
        let entry = DeprecatedEntry {
            category,
            name: self.escape(name),
            explanation: deprecation.explanation.clone(),
        };
        self.deprecated.push(entry);
        Some(deprecation)
    }

    /// `\textbf{Description}` section; nothing when there are no paragraphs
    fn description(&self, paras: &[&DocElement], heading: &str, out: &mut String) {
        let rendered: Vec<String> = paras.iter().map(|p| self.render(Some(*p))).collect();
        if rendered.is_empty() {
            return;
        }
        out.push_str(heading);
        out.push_str(&rendered.join(PARA_SEP));
    }
}

fn section_title(out: &mut String, title: &str) {
    out.push_str(&format!("\\subsubsection{{{}}}\n", title));
}

fn self_anchor(id: &str, text: &str) -> String {
    format!("\\hypertarget{{{}}}{{\\textbf{{{}}}}}", id, text)
}
