//! Deprecation notices
//!
//! Doxygen turns `@deprecated` into an `xrefsect` titled "Deprecated" inside
//! the first paragraph of the detailed description.

use crate::render::Render;
use crate::types::DocElement;

const DEPRECATED_TITLE: &str = "Deprecated";

/// A deprecation notice found on a declaration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deprecation {
    /// Rendered explanation, possibly empty
    pub explanation: String,
}

impl Deprecation {
    /// Look for the notice in a detailed description
    pub fn detect(detailed: Option<&DocElement>, renderer: &dyn Render) -> Option<Self> {
        let first = detailed?.find("para")?;
        let title = first.find("xrefsect/xreftitle")?;
        if title.plain_text().trim() != DEPRECATED_TITLE {
            return None;
        }
        Some(Self {
            explanation: renderer.render(first.find("xrefsect/xrefdescription/para")),
        })
    }

    fn warning(&self) -> String {
        let mut text = String::from("\\danger\\:\\textit{Deprecated");
        if !self.explanation.is_empty() {
            text.push_str(": ");
            text.push_str(&self.explanation);
        }
        text.push('}');
        text
    }

    /// Warning block placed before a declaration
    pub fn banner(&self) -> String {
        format!("\\vspace{{-2.5mm}}{}\n", self.warning())
    }

    /// Warning line inside an enumerator description, followed by `rest`
    pub fn inline(&self, rest: &str) -> String {
        if rest.is_empty() {
            self.warning()
        } else {
            format!("{}\\\\[1mm]{}", self.warning(), rest)
        }
    }
}

/// Paragraphs of the detailed description, minus the consumed notice
pub fn remaining_paras<'a>(detailed: Option<&'a DocElement>, deprecation: Option<&Deprecation>) -> Vec<&'a DocElement> {
    let paras = detailed.map(|d| d.find_all("para")).unwrap_or_default();
    let skip = if deprecation.is_some() { 1 } else { 0 };
    paras.into_iter().skip(skip).collect()
}

/// Kind of declaration listed in the deprecation report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeprecatedCategory {
    Enumeration,
    EnumerationConstant,
    Function,
    StructOrUnion,
    Typedef,
}

impl DeprecatedCategory {
    pub const ALL: [DeprecatedCategory; 5] = [
        DeprecatedCategory::Enumeration,
        DeprecatedCategory::EnumerationConstant,
        DeprecatedCategory::Function,
        DeprecatedCategory::StructOrUnion,
        DeprecatedCategory::Typedef,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            Self::Enumeration => "Enumerations",
            Self::EnumerationConstant => "Enumeration Constants",
            Self::Function => "Functions",
            Self::StructOrUnion => "Structs and Unions",
            Self::Typedef => "Type Definitions",
        }
    }
}

/// One entry of the deprecation report
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeprecatedEntry {
    pub category: DeprecatedCategory,
    /// Escaped display name
    pub name: String,
    pub explanation: String,
}
