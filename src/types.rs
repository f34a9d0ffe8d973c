//! Core types for hsa-xml2tex
//!
//! Declaration nodes are built once by the parser and never mutated by the
//! conversion pass.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Element tag of a description node
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Tag {
    /// `<para>`
    Para,
    /// `<emphasis>` (Doxygen `@a`)
    Emphasis,
    /// `<computeroutput>` (Doxygen `@p`)
    ComputerOutput,
    /// `<ref refid="...">`
    Ref { refid: String },
    /// `<itemizedlist>`
    ItemizedList,
    /// `<infin/>`
    Infinity,
    /// Any other element, traversed structurally
    Other(String),
}

impl Tag {
    pub fn from_xml(name: &str, refid: Option<&str>) -> Self {
        match name {
            "para" => Tag::Para,
            "emphasis" => Tag::Emphasis,
            "computeroutput" => Tag::ComputerOutput,
            "ref" => Tag::Ref {
                refid: refid.unwrap_or_default().to_string(),
            },
            "itemizedlist" => Tag::ItemizedList,
            "infin" => Tag::Infinity,
            other => Tag::Other(other.to_string()),
        }
    }

    /// XML element name
    pub fn name(&self) -> &str {
        match self {
            Tag::Para => "para",
            Tag::Emphasis => "emphasis",
            Tag::ComputerOutput => "computeroutput",
            Tag::Ref { .. } => "ref",
            Tag::ItemizedList => "itemizedlist",
            Tag::Infinity => "infin",
            Tag::Other(name) => name,
        }
    }
}

/// A node of a description tree: either text or a nested element
#[derive(Debug, Clone, PartialEq)]
pub enum DocNode {
    Text(String),
    Element(DocElement),
}

/// An element of a description tree
#[derive(Debug, Clone, PartialEq)]
pub struct DocElement {
    pub tag: Tag,
    pub attributes: BTreeMap<String, String>,
    pub children: Vec<DocNode>,
}

impl DocElement {
    pub fn new(tag: Tag) -> Self {
        Self {
            tag,
            attributes: BTreeMap::new(),
            children: Vec::new(),
        }
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.children.push(DocNode::Text(text.into()));
        self
    }

    pub fn with_child(mut self, child: DocElement) -> Self {
        self.children.push(DocNode::Element(child));
        self
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(|s| s.as_str())
    }

    /// Text preceding the first child element
    pub fn leading_text(&self) -> String {
        self.children
            .iter()
            .map_while(|c| match c {
                DocNode::Text(t) => Some(t.as_str()),
                DocNode::Element(_) => None,
            })
            .collect()
    }

    /// Concatenated text of this element and all its descendants
    pub fn plain_text(&self) -> String {
        let mut out = String::new();
        collect_text(self, &mut out);
        out
    }

    /// Child elements, in document order
    pub fn elements(&self) -> impl Iterator<Item = &DocElement> {
        self.children.iter().filter_map(|c| match c {
            DocNode::Element(e) => Some(e),
            DocNode::Text(_) => None,
        })
    }

    /// Check whether this element matches a path step such as `para` or
    /// `simplesect[@kind='return']`
    fn matches_step(&self, step: &str) -> bool {
        let (name, predicate) = match step.find('[') {
            Some(idx) => (&step[..idx], Some(&step[idx..])),
            None => (step, None),
        };
        if self.tag.name() != name {
            return false;
        }
        match predicate {
            None => true,
            Some(pred) => {
                let inner = pred.trim_start_matches("[@").trim_end_matches(']');
                match inner.split_once('=') {
                    Some((attr, value)) => {
                        let value = value.trim_matches(|c| c == '\'' || c == '"');
                        self.attribute(attr) == Some(value)
                    }
                    None => self.attribute(inner).is_some(),
                }
            }
        }
    }

    /// All elements reached by following a `/`-separated path of child steps
    pub fn find_all(&self, path: &str) -> Vec<&DocElement> {
        let mut current = vec![self];
        for step in path.split('/').filter(|s| !s.is_empty()) {
            current = current
                .into_iter()
                .flat_map(|e| e.elements().filter(move |c| c.matches_step(step)))
                .collect();
        }
        current
    }

    /// First element reached by a path of child steps
    pub fn find(&self, path: &str) -> Option<&DocElement> {
        self.find_all(path).into_iter().next()
    }

    /// All descendant elements matching a single step, in document order
    pub fn descendants(&self, step: &str) -> Vec<&DocElement> {
        let mut found = Vec::new();
        collect_descendants(self, step, &mut found);
        found
    }

    /// Descendants matching `step`, then the relative `path` below each
    pub fn find_descendants(&self, step: &str, path: &str) -> Vec<&DocElement> {
        self.descendants(step)
            .into_iter()
            .flat_map(|e| e.find_all(path))
            .collect()
    }
}

fn collect_text(element: &DocElement, out: &mut String) {
    for child in &element.children {
        match child {
            DocNode::Text(t) => out.push_str(t),
            DocNode::Element(e) => collect_text(e, out),
        }
    }
}

fn collect_descendants<'a>(element: &'a DocElement, step: &str, found: &mut Vec<&'a DocElement>) {
    for child in element.elements() {
        if child.matches_step(step) {
            found.push(child);
        }
        collect_descendants(child, step, found);
    }
}

/// Source location of a declaration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    /// Header the declaration comes from
    pub file: String,
    /// Line number within that header
    pub line: usize,
}

/// Kind of a Doxygen `memberdef`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MemberKind {
    Typedef,
    Enum,
    Function,
    Variable,
    Other(String),
}

impl MemberKind {
    pub fn from_xml(kind: &str) -> Self {
        match kind {
            "typedef" => Self::Typedef,
            "enum" => Self::Enum,
            "function" => Self::Function,
            "variable" => Self::Variable,
            other => Self::Other(other.to_string()),
        }
    }
}

/// Direction of a documented function parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    In,
    Out,
    InOut,
}

impl Direction {
    pub fn from_xml(value: &str) -> Option<Self> {
        match value {
            "in" => Some(Self::In),
            "out" => Some(Self::Out),
            "inout" => Some(Self::InOut),
            _ => None,
        }
    }

    /// Prefix placed before the first paragraph of the parameter description
    pub fn prefix(&self) -> &'static str {
        match self {
            Self::In => "(in) ",
            Self::Out => "(out) ",
            Self::InOut => "(in, out) ",
        }
    }
}

/// A parameter in a function signature
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub type_node: Option<DocElement>,
    pub declname: String,
    pub array: String,
}

/// An enumerator of an enum declaration
#[derive(Debug, Clone, PartialEq)]
pub struct EnumValue {
    pub id: String,
    pub name: String,
    pub initializer: Option<DocElement>,
    pub brief: Option<DocElement>,
    pub detailed: Option<DocElement>,
}

/// Members of a struct or union, stored by Doxygen in a separate file
#[derive(Debug, Clone, PartialEq)]
pub struct Compound {
    pub id: String,
    pub brief: Option<DocElement>,
    pub detailed: Option<DocElement>,
    pub fields: Vec<MemberDef>,
}

/// One documented C entity
#[derive(Debug, Clone, PartialEq)]
pub struct MemberDef {
    pub id: String,
    pub kind: MemberKind,
    pub name: String,
    pub type_node: Option<DocElement>,
    pub definition: String,
    pub argsstring: String,
    pub bitfield: Option<String>,
    pub params: Vec<Param>,
    pub enum_values: Vec<EnumValue>,
    pub brief: Option<DocElement>,
    pub detailed: Option<DocElement>,
    pub location: Location,
    /// Id of the compound that holds the members of a struct/union typedef
    pub compound_ref: Option<String>,
    pub compound: Option<Compound>,
}

impl MemberDef {
    pub fn new(id: impl Into<String>, kind: MemberKind, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind,
            name: name.into(),
            type_node: None,
            definition: String::new(),
            argsstring: String::new(),
            bitfield: None,
            params: Vec::new(),
            enum_values: Vec::new(),
            brief: None,
            detailed: None,
            location: Location::default(),
            compound_ref: None,
            compound: None,
        }
    }

    /// Text of the type, including any nested references
    pub fn type_text(&self) -> String {
        self.type_node
            .as_ref()
            .map(|t| t.plain_text())
            .unwrap_or_default()
    }

    /// True for typedefs of a struct or union
    pub fn is_compound_typedef(&self) -> bool {
        let ty = self.type_text();
        let ty = ty.trim_start();
        self.kind == MemberKind::Typedef && (ty.starts_with("struct") || ty.starts_with("union"))
    }

    /// Paragraphs directly under the detailed description
    pub fn detailed_paras(&self) -> Vec<&DocElement> {
        self.detailed
            .as_ref()
            .map(|d| d.find_all("para"))
            .unwrap_or_default()
    }
}

/// A parsed `group__*.xml` file
#[derive(Debug, Clone)]
pub struct GroupFile {
    pub path: PathBuf,
    /// Location of the first declaration in the file
    pub first_location: Option<Location>,
    pub members: Vec<MemberDef>,
}
