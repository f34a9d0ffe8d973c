//! Output files

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::deprecation::{DeprecatedCategory, DeprecatedEntry};
use crate::error::{ConvertError, Result};
use crate::registry::Registry;
use crate::render::Render;

pub const COMMANDS_FILE: &str = "commands.tex";
pub const LISTINGS_FILE: &str = "listings.tex";
pub const DEPRECATED_FILE: &str = "deprecated.tex";
pub const IDENTIFIERS_FILE: &str = "identifiers.json";

/// Writer for everything placed in the output directory
pub struct OutputWriter {
    output_dir: PathBuf,
}

impl OutputWriter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    /// Create the output directory if absent
    pub fn prepare(&self) -> Result<()> {
        fs::create_dir_all(&self.output_dir).map_err(|e| ConvertError::io(&self.output_dir, e))
    }

    /// Write the fragment of one group file; returns the written path
    pub fn write_group(&self, group_path: &Path, content: &str) -> Result<PathBuf> {
        let path = self.output_dir.join(tex_file_name(group_path));
        self.write_file(&path, content)?;
        Ok(path)
    }

    /// `\hsaref` dispatch table
    pub fn write_commands(&self, registry: &Registry, renderer: &dyn Render) -> Result<()> {
        let content = registry.dispatch_table(renderer)?;
        self.write_file(&self.output_dir.join(COMMANDS_FILE), &content)
    }

    pub fn write_listings(&self, functions: &[String]) -> Result<()> {
        self.write_file(&self.output_dir.join(LISTINGS_FILE), &render_listings(functions))
    }

    pub fn write_deprecated(&self, entries: &[DeprecatedEntry]) -> Result<()> {
        self.write_file(&self.output_dir.join(DEPRECATED_FILE), &render_deprecated(entries))
    }

    pub fn write_identifiers(&self, registry: &Registry) -> Result<()> {
        self.write_file(&self.output_dir.join(IDENTIFIERS_FILE), &registry.to_json()?)
    }

    fn write_file(&self, path: &Path, content: &str) -> Result<()> {
        let mut file = File::create(path).map_err(|e| ConvertError::io(path, e))?;
        file.write_all(content.as_bytes())
            .map_err(|e| ConvertError::io(path, e))
    }
}

/// `group__queue.xml` -> `group-queue.tex`
pub fn tex_file_name(group_path: &Path) -> String {
    let stem = group_path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    format!("{}.tex", stem).replace("__", "-")
}

/// Keyword list highlighting function names in code listings
pub fn render_listings(functions: &[String]) -> String {
    format!("\\lstset{{emph={{{}}}}}", functions.join(","))
}

/// Deprecation report, one section per kind of declaration
pub fn render_deprecated(entries: &[DeprecatedEntry]) -> String {
    let mut tex = String::new();
    for category in DeprecatedCategory::ALL {
        tex.push_str(&format!("\\section{{{}}}\n", category.title()));
        let items: Vec<&DeprecatedEntry> = entries.iter().filter(|e| e.category == category).collect();
        if items.is_empty() {
            tex.push_str("None.\n");
            continue;
        }
        tex.push_str("\\begin{itemize}\n");
        for item in items {
            tex.push_str(&format!("\\item {}\\\\{}\n", item.name, item.explanation));
        }
        tex.push_str("\\end{itemize}\n");
    }
    tex
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConvertConfig;
    use crate::registry::RefKind;
    use crate::render::TexRenderer;
    use tempfile::TempDir;

    #[test]
    fn test_tex_file_name() {
        assert_eq!(tex_file_name(Path::new("xml/group__queue.xml")), "group-queue.tex");
        assert_eq!(
            tex_file_name(Path::new("group__signals__wait.xml")),
            "group-signals-wait.tex"
        );
    }

    #[test]
    fn test_render_listings() {
        let funcs = vec!["hsa_init".to_string(), "hsa_shut_down".to_string()];
        assert_eq!(render_listings(&funcs), "\\lstset{emph={hsa_init,hsa_shut_down}}");
        assert_eq!(render_listings(&[]), "\\lstset{emph={}}");
    }

    #[test]
    fn test_render_deprecated() {
        let entries = vec![DeprecatedEntry {
            category: DeprecatedCategory::Function,
            name: "hsa_\\-old".to_string(),
            explanation: "use hsa_\\-new".to_string(),
        }];
        let tex = render_deprecated(&entries);
        assert!(tex.starts_with("\\section{Enumerations}\nNone.\n"));
        assert!(tex.contains("\\section{Functions}\n\\begin{itemize}\n\\item hsa_\\-old\\\\use hsa_\\-new\n\\end{itemize}\n"));
        assert!(tex.contains("\\section{Type Definitions}"));
    }

    #[test]
    fn test_writer_creates_files() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("altlatex");
        let writer = OutputWriter::new(&out);
        writer.prepare().unwrap();

        let config = ConvertConfig::default();
        let mut registry = Registry::new(&config);
        registry.register(RefKind::Function, "hsa_init", "f1").unwrap();
        writer.write_commands(&registry, &TexRenderer::new(&config)).unwrap();
        writer.write_identifiers(&registry).unwrap();
        let path = writer.write_group(Path::new("group__init.xml"), "body").unwrap();

        assert_eq!(fs::read_to_string(path).unwrap(), "body");
        assert!(fs::read_to_string(out.join(COMMANDS_FILE)).unwrap().contains("\\reffun{hsa_\\-init}"));
        assert!(out.join(IDENTIFIERS_FILE).exists());
    }
}
