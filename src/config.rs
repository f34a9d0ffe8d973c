//! Conversion settings
//!
//! Defaults reproduce the conventions of the HSA runtime headers. A JSON file
//! may override any subset of them.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::directives::{default_directives, ReplacementDirective};
use crate::error::{ConvertError, Result};

/// How underscores are written into the markup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Escaping {
    /// `_` becomes `_\-`, giving LaTeX a hyphenation point
    #[default]
    Hyphenate,
    /// Underscores are emitted as-is (the document loads a package that
    /// treats them literally)
    Literal,
}

impl std::str::FromStr for Escaping {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "hyphenate" => Ok(Self::Hyphenate),
            "literal" => Ok(Self::Literal),
            _ => Err(format!("Unknown escaping: {}", s)),
        }
    }
}

/// Offset applied to the groups of a secondary header so they sort after
/// every group of the primary header
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderOffset {
    pub header: String,
    pub offset: usize,
}

/// Settings for a conversion run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConvertConfig {
    /// Directory holding the Doxygen XML output
    pub input_dir: PathBuf,
    /// Directory receiving the LaTeX fragments
    pub output_dir: PathBuf,
    pub escaping: Escaping,
    /// Prefix shared by every API name
    pub api_prefix: String,
    /// Prefix of extension functions (indexed separately)
    pub ext_prefix: String,
    /// Suffixes marking a name as a type rather than a function
    pub type_suffixes: Vec<String>,
    /// File name prefix of declaration-group files
    pub group_prefix: String,
    pub secondary_headers: Vec<HeaderOffset>,
    /// Enums allowed to declare the same initializer twice
    pub initializer_allow_list: Vec<String>,
    /// Typedefs that are not rendered
    pub skipped_typedefs: Vec<String>,
    /// Macros Doxygen leaves in function return types
    pub stripped_macros: Vec<String>,
    /// Memory-order suffixes used to group function variants
    pub memory_orders: Vec<String>,
    pub directives: Vec<ReplacementDirective>,
}

impl Default for ConvertConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("xml"),
            output_dir: PathBuf::from("altlatex"),
            escaping: Escaping::Hyphenate,
            api_prefix: "hsa_".to_string(),
            ext_prefix: "hsa_ext_".to_string(),
            type_suffixes: vec!["_t".to_string(), "_s".to_string()],
            group_prefix: "group__".to_string(),
            secondary_headers: vec![HeaderOffset {
                header: "hsa_ext.h".to_string(),
                offset: 100_000,
            }],
            initializer_allow_list: vec![
                "hsa_packet_header_t".to_string(),
                "hsa_packet_header_width_t".to_string(),
            ],
            skipped_typedefs: vec!["hsa_signal_value_t".to_string()],
            stripped_macros: vec!["HSA_API".to_string()],
            memory_orders: [
                "_scacq_screl",
                "_scacquire",
                "_screlease",
                "_acq_rel",
                "_acquire",
                "_release",
                "_relaxed",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            directives: default_directives(),
        }
    }
}

impl ConvertConfig {
    /// Load settings from a JSON file; missing keys keep their defaults
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| ConvertError::io(path, e))?;
        serde_json::from_str(&content).map_err(|e| ConvertError::Config {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Line offset for groups declared in `header`
    pub fn header_offset(&self, header: &str) -> usize {
        let base = Path::new(header)
            .file_name()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| header.to_string());
        self.secondary_headers
            .iter()
            .find(|h| h.header == base)
            .map(|h| h.offset)
            .unwrap_or(0)
    }

    /// Type name minus its trailing type suffix (`hsa_queue_t` -> `hsa_queue`)
    pub fn strip_type_suffix<'a>(&self, name: &'a str) -> &'a str {
        self.type_suffixes
            .iter()
            .find_map(|s| name.strip_suffix(s.as_str()))
            .unwrap_or(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = ConvertConfig::default();
        assert_eq!(config.input_dir, PathBuf::from("xml"));
        assert_eq!(config.output_dir, PathBuf::from("altlatex"));
        assert_eq!(config.escaping, Escaping::Hyphenate);
        assert_eq!(config.directives.len(), 3);
    }

    #[test]
    fn test_header_offset() {
        let config = ConvertConfig::default();
        assert_eq!(config.header_offset("/src/inc/hsa_ext.h"), 100_000);
        assert_eq!(config.header_offset("hsa.h"), 0);
    }

    #[test]
    fn test_naming_helpers() {
        let config = ConvertConfig::default();
        assert_eq!(config.strip_type_suffix("hsa_queue_t"), "hsa_queue");
        assert_eq!(config.strip_type_suffix("hsa_queue_s"), "hsa_queue");
        assert_eq!(config.strip_type_suffix("plain"), "plain");
    }

    #[test]
    fn test_escaping_from_str() {
        assert_eq!("literal".parse::<Escaping>().unwrap(), Escaping::Literal);
        assert_eq!("Hyphenate".parse::<Escaping>().unwrap(), Escaping::Hyphenate);
        assert!("bogus".parse::<Escaping>().is_err());
    }

    #[test]
    fn test_from_file_partial_override() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("xml2tex.json");
        fs::write(
            &path,
            r#"{ "escaping": "literal", "output_dir": "out", "skipped_typedefs": [] }"#,
        )
        .unwrap();

        let config = ConvertConfig::from_file(&path).unwrap();
        assert_eq!(config.escaping, Escaping::Literal);
        assert_eq!(config.output_dir, PathBuf::from("out"));
        assert!(config.skipped_typedefs.is_empty());
        assert_eq!(config.api_prefix, "hsa_");
    }

    #[test]
    fn test_from_file_invalid() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.json");
        fs::write(&path, "{ not json").unwrap();

        let err = ConvertConfig::from_file(&path).unwrap_err();
        assert!(matches!(err, ConvertError::Config { .. }));
    }
}
