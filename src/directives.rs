//! Replacement directives
//!
//! Doxygen drops preprocessor conditionals, so struct fields declared under
//! `#ifdef`/`#elif`/`#else` arms come out as a flat list. A directive names
//! the affected fields and a template that rebuilds the conditional text from
//! the rendered field lines.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::{ConvertError, Result};

/// One element of a directive template
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TemplatePiece {
    /// Rendered text of the n-th field named by the directive
    Field(usize),
    /// Markup inserted verbatim
    Literal(String),
}

/// Rule rebuilding conditional text around a fixed set of fields
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplacementDirective {
    /// Qualified field keys, `<type>.<field>`
    pub fields: Vec<String>,
    pub template: Vec<TemplatePiece>,
}

impl ReplacementDirective {
    pub fn new(fields: &[&str], template: Vec<TemplatePiece>) -> Self {
        Self {
            fields: fields.iter().map(|f| f.to_string()).collect(),
            template,
        }
    }

    /// Expand the template; `texts` holds one entry per field, in order
    pub fn apply(&self, texts: &[String]) -> String {
        self.template
            .iter()
            .map(|piece| match piece {
                TemplatePiece::Field(idx) => texts.get(*idx).map(|s| s.as_str()).unwrap_or(""),
                TemplatePiece::Literal(s) => s.as_str(),
            })
            .collect()
    }
}

fn ifdef(var: &str) -> String {
    format!("\\#ifdef {}\\\\", var)
}

fn elif(cond: &str) -> String {
    format!("\\#elif {}\\\\", cond)
}

/// The large-model/endianness split used by 64-bit address fields
fn address_split(typename: &str, address: &str, reserved: &str) -> ReplacementDirective {
    use TemplatePiece::{Field, Literal};
    let first = format!("{}.{}", typename, address);
    let second = format!("{}.{}", typename, reserved);
    ReplacementDirective::new(
        &[first.as_str(), second.as_str()],
        vec![
            Literal(format!("\\\\[-2mm]{}", ifdef("HSA_LARGE_MODEL"))),
            Field(0),
            Literal(elif(" defined HSA_LITTLE_ENDIAN")),
            Field(0),
            Field(1),
            Literal("\\#else\\\\".to_string()),
            Field(1),
            Field(0),
            Literal("\\#endif\\\\[2mm]".to_string()),
        ],
    )
}

/// Directives for the HSA runtime headers
pub fn default_directives() -> Vec<ReplacementDirective> {
    vec![
        address_split("hsa_queue_t", "base_address", "reserved0"),
        address_split("hsa_kernel_dispatch_packet_t", "kernarg_address", "reserved1"),
        address_split("hsa_agent_dispatch_packet_t", "return_address", "reserved1"),
    ]
}

/// Outcome of feeding one field into a [`DirectiveBuffer`]
#[derive(Debug, PartialEq, Eq)]
pub enum Feed {
    /// The field is not covered by any directive; emit it unchanged
    Emit(String),
    /// The field was buffered until its directive is complete
    Buffered,
    /// The directive collected all its fields; emit the expansion
    Replaced(String),
}

/// Per-declaration buffer of field texts awaiting their directive
pub struct DirectiveBuffer<'a> {
    directives: &'a [ReplacementDirective],
    pending: BTreeMap<usize, Vec<String>>,
}

impl<'a> DirectiveBuffer<'a> {
    pub fn new(directives: &'a [ReplacementDirective]) -> Self {
        Self {
            directives,
            pending: BTreeMap::new(),
        }
    }

    pub fn feed(&mut self, field_key: &str, text: String) -> Feed {
        let Some(idx) = self
            .directives
            .iter()
            .position(|d| d.fields.iter().any(|f| f == field_key))
        else {
            return Feed::Emit(text);
        };

        let directive = &self.directives[idx];
        let texts = self.pending.entry(idx).or_default();
        texts.push(text);
        if texts.len() == directive.fields.len() {
            let texts = self.pending.remove(&idx).unwrap_or_default();
            Feed::Replaced(directive.apply(&texts))
        } else {
            Feed::Buffered
        }
    }

    /// Fail if a directive saw only part of its fields
    pub fn finish(self, typename: &str) -> Result<()> {
        match self.pending.keys().next() {
            None => Ok(()),
            Some(&idx) => Err(ConvertError::IncompleteDirective {
                typename: typename.to_string(),
                fields: self.directives[idx].fields.clone(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directives_shape() {
        let directives = default_directives();
        assert_eq!(directives[0].fields, vec!["hsa_queue_t.base_address", "hsa_queue_t.reserved0"]);
        let expanded = directives[0].apply(&["A;".to_string(), "B;".to_string()]);
        assert_eq!(
            expanded,
            "\\\\[-2mm]\\#ifdef HSA_LARGE_MODEL\\\\A;\\#elif  defined HSA_LITTLE_ENDIAN\\\\A;B;\\#else\\\\B;A;\\#endif\\\\[2mm]"
        );
    }

    #[test]
    fn test_buffer_fires_when_complete() {
        let directives = default_directives();
        let mut buffer = DirectiveBuffer::new(&directives);

        assert_eq!(buffer.feed("hsa_queue_t.type", "T;".into()), Feed::Emit("T;".into()));
        assert_eq!(buffer.feed("hsa_queue_t.base_address", "A;".into()), Feed::Buffered);
        match buffer.feed("hsa_queue_t.reserved0", "R;".into()) {
            Feed::Replaced(text) => {
                assert!(text.contains("\\#ifdef HSA_LARGE_MODEL"));
                assert!(text.ends_with("\\#endif\\\\[2mm]"));
            }
            other => panic!("unexpected {:?}", other),
        }
        assert!(buffer.finish("hsa_queue_t").is_ok());
    }

    #[test]
    fn test_buffer_incomplete_is_error() {
        let directives = default_directives();
        let mut buffer = DirectiveBuffer::new(&directives);
        buffer.feed("hsa_queue_t.base_address", "A;".into());

        let err = buffer.finish("hsa_queue_t").unwrap_err();
        assert!(matches!(err, ConvertError::IncompleteDirective { .. }));
    }

    #[test]
    fn test_template_json_round_trip() {
        let directive = ReplacementDirective::new(
            &["t.a"],
            vec![TemplatePiece::Literal("x".into()), TemplatePiece::Field(0)],
        );
        let json = serde_json::to_string(&directive).unwrap();
        assert_eq!(json, r#"{"fields":["t.a"],"template":["x",0]}"#);
        let back: ReplacementDirective = serde_json::from_str(&json).unwrap();
        assert_eq!(back, directive);
    }
}
