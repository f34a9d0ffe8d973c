//! HSA Doxygen XML to LaTeX converter
//!
//! Converts the Doxygen XML output of the HSA runtime headers into the LaTeX
//! fragments included by the HSA Runtime Programmer's Reference Manual.
//!
//! # Outputs
//!
//! - One fragment per declaration group (`group__queue.xml` -> `group-queue.tex`)
//! - `commands.tex`: the `\hsaref{name}` command resolving any documented name
//! - `listings.tex`: function names highlighted in code listings
//! - `deprecated.tex`: every deprecated declaration
//! - `identifiers.json`: the identifier registry
//!
//! # Example
//!
//! ```no_run
//! use hsa_xml2tex::{convert, ConvertConfig};
//!
//! let config = ConvertConfig::default();
//! let summary = convert(&config, |_| {}).unwrap();
//! println!("{} groups", summary.groups);
//! ```

pub mod config;
pub mod declarator;
pub mod deprecation;
pub mod directives;
pub mod emit;
pub mod error;
pub mod generator;
pub mod parser;
pub mod registry;
pub mod render;
pub mod types;
pub mod variants;

pub use config::{ConvertConfig, Escaping};
pub use emit::{Context, EntityCounts};
pub use error::{ConvertError, Result};
pub use generator::OutputWriter;
pub use parser::DoxygenParser;
pub use registry::Registry;

use log::{debug, info};
use serde::Serialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use types::{GroupFile, MemberDef, MemberKind};
use variants::group_functions;

/// Progress notifications emitted by [`convert`]
#[derive(Debug, Clone, Copy)]
pub enum Progress<'a> {
    /// A group file is about to be processed
    Started(&'a Path),
    /// The group's fragment was written
    Finished(&'a Path),
}

/// Totals for a completed run
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub groups: usize,
    pub counts: EntityCounts,
    pub identifiers: usize,
    pub deprecated: usize,
    pub output_dir: PathBuf,
}

/// Convert every group file of `config.input_dir`
///
/// Stops at the first group with errors; fragments of earlier groups stay on
/// disk.
pub fn convert<F>(config: &ConvertConfig, mut on_progress: F) -> Result<RunSummary>
where
    F: FnMut(Progress),
{
    let parser = DoxygenParser::new(&config.input_dir);
    let files = ordered_group_files(config, &parser)?;
    info!("Found {} group files in {}", files.len(), config.input_dir.display());

    let writer = OutputWriter::new(&config.output_dir);
    writer.prepare()?;

    let mut ctx = Context::new(config);
    for path in &files {
        on_progress(Progress::Started(path));
        let group = parser.load_group(path)?;

        let mut out = String::new();
        let errors = convert_group(&group, &mut ctx, &mut out);
        if !errors.is_empty() {
            return Err(ConvertError::Group {
                file: path.clone(),
                errors,
            });
        }

        let written = writer.write_group(path, &out)?;
        debug!("Wrote {}", written.display());
        on_progress(Progress::Finished(path));
    }

    writer.write_commands(&ctx.registry, &ctx.renderer)?;
    writer.write_listings(&ctx.functions)?;
    writer.write_deprecated(&ctx.deprecated)?;
    writer.write_identifiers(&ctx.registry)?;
    info!("Registered {} identifiers", ctx.registry.len());

    Ok(RunSummary {
        groups: files.len(),
        counts: ctx.counts.clone(),
        identifiers: ctx.registry.len(),
        deprecated: ctx.deprecated.len(),
        output_dir: config.output_dir.clone(),
    })
}

/// Group files ordered by the header line of their first declaration
fn ordered_group_files(config: &ConvertConfig, parser: &DoxygenParser) -> Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = WalkDir::new(&config.input_dir)
        .max_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter(|e| {
            let name = e.file_name().to_string_lossy();
            name.starts_with(&config.group_prefix) && name.ends_with(".xml")
        })
        .map(|e| e.into_path())
        .collect();

    if files.is_empty() {
        return Err(ConvertError::NoGroupFiles {
            dir: config.input_dir.clone(),
            prefix: config.group_prefix.clone(),
        });
    }

    let mut keyed = Vec::with_capacity(files.len());
    for path in files.drain(..) {
        let key = parser
            .group_location(&path)?
            .map(|loc| loc.line + config.header_offset(&loc.file))
            .unwrap_or(0);
        keyed.push((key, path));
    }
    keyed.sort();
    Ok(keyed.into_iter().map(|(_, path)| path).collect())
}

/// Render one group into `out`, collecting every error instead of stopping
/// at the first
pub fn convert_group(group: &GroupFile, ctx: &mut Context, out: &mut String) -> Vec<ConvertError> {
    info!("Processing {}", group.path.display());

    // Doxygen groups members by kind; restore header order
    let mut members: Vec<&MemberDef> = group.members.iter().collect();
    members.sort_by_key(|m| m.location.line);

    let functions: Vec<&MemberDef> = members
        .iter()
        .copied()
        .filter(|m| m.kind == MemberKind::Function)
        .collect();
    let function_groups = group_functions(&functions, &ctx.config.memory_orders);
    let mut rendered_functions: HashSet<&str> = HashSet::new();

    let mut errors = Vec::new();
    for member in members {
        let result = match member.kind {
            MemberKind::Typedef if member.is_compound_typedef() => {
                out.push_str("\n\n");
                emit::process_compound(member, ctx, out)
            }
            MemberKind::Typedef => {
                out.push_str("\n\n");
                emit::process_typedef(member, ctx, out)
            }
            MemberKind::Enum => {
                out.push_str("\n\n");
                emit::process_enum(member, ctx, out)
            }
            MemberKind::Function if !rendered_functions.contains(member.id.as_str()) => {
                let Some(function_group) = function_groups
                    .iter()
                    .find(|g| g.members.iter().any(|f| f.id == member.id))
                else {
                    continue;
                };
                rendered_functions.extend(function_group.members.iter().map(|f| f.id.as_str()));
                out.push_str("\n\n");
                emit::process_function(function_group, ctx, out)
            }
            _ => continue,
        };
        if let Err(e) = result {
            errors.push(e);
        }
    }
    errors
}
