//! Identifier registry and cross-reference resolution
//!
//! Every documented name is registered with the anchor of its declaration as
//! the declaration is rendered. The registry then serves two purposes: linking
//! type names inside later definitions, and producing the `\hsaref` command
//! that resolves any identifier to a hyperlink at typesetting time.

use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;
use std::collections::{HashMap, HashSet};

use crate::config::ConvertConfig;
use crate::error::{ConvertError, Result};
use crate::render::Render;

lazy_static! {
    /// C identifiers
    static ref IDENTIFIER_PATTERN: Regex = Regex::new(r"[A-Za-z_][A-Za-z0-9_]*").unwrap();
}

/// Dummy first branch of the dispatch chain
const DISPATCH_SENTINEL: &str = "hsaref@sentinel";

/// Kind of a registered identifier; selects the link macro
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RefKind {
    Type,
    Field,
    EnumValue,
    Function,
}

impl RefKind {
    pub fn macro_name(&self) -> &'static str {
        match self {
            RefKind::Type => "reftyp",
            RefKind::Field => "reffld",
            RefKind::EnumValue => "refenu",
            RefKind::Function => "reffun",
        }
    }
}

/// A registered identifier
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Entry {
    pub kind: RefKind,
    /// Qualified name; fields use `<type>.<field>`
    pub name: String,
    pub anchor: String,
}

impl Entry {
    /// Text shown for the link: fields show only their own name
    pub fn display_name(&self) -> &str {
        match self.kind {
            RefKind::Field => self
                .name
                .split_once('.')
                .map(|(_, field)| field)
                .unwrap_or(&self.name),
            _ => &self.name,
        }
    }
}

/// Result of a registration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Registration {
    Added,
    /// Same name, kind and anchor were already present
    Unchanged,
}

/// Map from documented names to anchor ids, in registration order
#[derive(Debug, Clone)]
pub struct Registry {
    entries: Vec<Entry>,
    index: HashMap<String, usize>,
    type_prefix: String,
    type_suffixes: Vec<String>,
}

impl Registry {
    pub fn new(config: &ConvertConfig) -> Self {
        Self {
            entries: Vec::new(),
            index: HashMap::new(),
            type_prefix: config.api_prefix.clone(),
            type_suffixes: config.type_suffixes.clone(),
        }
    }

    pub fn register(&mut self, kind: RefKind, name: &str, anchor: &str) -> Result<Registration> {
        if let Some(&idx) = self.index.get(name) {
            let existing = &self.entries[idx];
            if existing.kind == kind && existing.anchor == anchor {
                return Ok(Registration::Unchanged);
            }
            return Err(ConvertError::DuplicateIdentifier {
                name: name.to_string(),
                existing: existing.anchor.clone(),
                anchor: anchor.to_string(),
            });
        }
        self.index.insert(name.to_string(), self.entries.len());
        self.entries.push(Entry {
            kind,
            name: name.to_string(),
            anchor: anchor.to_string(),
        });
        Ok(Registration::Added)
    }

    pub fn resolve(&self, name: &str) -> Result<&Entry> {
        self.index
            .get(name)
            .map(|&idx| &self.entries[idx])
            .ok_or_else(|| ConvertError::UnresolvedReference {
                name: name.to_string(),
            })
    }

    pub fn anchor(&self, name: &str) -> Option<&str> {
        self.index.get(name).map(|&idx| self.entries[idx].anchor.as_str())
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn is_type_name(&self, name: &str) -> bool {
        name.starts_with(&self.type_prefix)
            && self.type_suffixes.iter().any(|s| name.ends_with(s.as_str()))
    }

    /// Escape raw definition text, turning the first occurrence of every
    /// registered type name into a hyperlink
    pub fn linkify(&self, text: &str, renderer: &dyn Render) -> String {
        self.linkify_tracked(text, renderer, &mut HashSet::new())
    }

    /// Like [`Registry::linkify`], for a definition rendered in several
    /// pieces; `linked` carries the names already linked by earlier pieces
    pub fn linkify_tracked(&self, text: &str, renderer: &dyn Render, linked: &mut HashSet<String>) -> String {
        let mut out = String::new();
        let mut last = 0;
        for m in IDENTIFIER_PATTERN.find_iter(text) {
            let name = m.as_str();
            if !self.is_type_name(name) || linked.contains(name) {
                continue;
            }
            let Some(anchor) = self.anchor(name) else {
                continue;
            };
            out.push_str(&renderer.escape(&text[last..m.start()]));
            out.push_str(&format!("\\hyperlink{{{}}}{{{}}}", anchor, renderer.escape(name)));
            last = m.end();
            linked.insert(name.to_string());
        }
        out.push_str(&renderer.escape(&text[last..]));
        out
    }

    /// "Go to definition" hyperlink for a registered identifier
    pub fn link(&self, name: &str, renderer: &dyn Render) -> Result<String> {
        let entry = self.resolve(name)?;
        Ok(format!(
            "\\hyperlink{{{}}}{{\\{}{{{}}}}}",
            entry.anchor,
            entry.kind.macro_name(),
            renderer.escape(entry.display_name())
        ))
    }

    /// `\hsaref{name}` command: a chain of string comparisons mapping every
    /// registered name to its link, failing on unknown names
    pub fn dispatch_table(&self, renderer: &dyn Render) -> Result<String> {
        let mut tex = String::from("\\makeatletter\n\\newcommand{\\hsaref}[1]{");
        tex.push_str(&format!(
            "\\ifnum\\pdf@strcmp{{#1}}{{{0}}}=0 {0}\n",
            DISPATCH_SENTINEL
        ));
        for entry in &self.entries {
            tex.push_str(&format!(
                "\\else\\ifnum\\pdf@strcmp{{#1}}{{{}}}=0{}\n",
                entry.name,
                self.link(&entry.name, renderer)?
            ));
        }
        tex.push_str("\\else\\errmessage{Unknown reference: #1. Declaration not found}\n");
        tex.push_str(&"\\fi".repeat(self.entries.len() + 1));
        tex.push_str("}\n\\makeatother\n");
        Ok(tex)
    }

    /// Registry contents as JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.entries)?)
    }
}
