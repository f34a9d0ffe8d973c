//! Struct and union typedefs

use log::debug;
use std::collections::BTreeSet;
use std::path::PathBuf;

use super::{section_title, self_anchor, Context, BOX_BEGIN, BOX_END, BRIEF_SPACING};
use crate::deprecation::{remaining_paras, DeprecatedCategory};
use crate::directives::{DirectiveBuffer, Feed};
use crate::error::{ConvertError, Result};
use crate::registry::RefKind;
use crate::render::PARA_SEP;
use crate::types::{Compound, DocElement, MemberDef};

const DATA_FIELDS_HEADING: &str =
    "\\noindent\\textbf{Data Fields}\\\\[-7mm]\n\\begin{longtable}{@{}>{\\hangindent=2em}p{\\textwidth}}\n";
const DESCRIPTION_HEADING: &str = "\\vspace{-4mm}\\noindent\\textbf{Description}\\\\[1mm]\n";

pub fn process_compound(member: &MemberDef, ctx: &mut Context, out: &mut String) -> Result<()> {
    let compound = member
        .compound
        .as_ref()
        .ok_or_else(|| ConvertError::MissingElement {
            path: PathBuf::from(&member.location.file),
            element: format!("member file of {}", member.name),
        })?;
    debug!("struct/union {} ({} fields)", member.name, compound.fields.len());

    check_field_refs(member, compound)?;

    let config = ctx.config;
    let name = ctx.escape(&member.name);
    section_title(out, &name);
    let deprecation = ctx.deprecation(
        member.detailed.as_ref(),
        DeprecatedCategory::StructOrUnion,
        &member.name,
        out,
    );

    let type_node = member.type_node.as_ref();
    let keyword = type_node.map(|t| t.leading_text()).unwrap_or_default();
    let tag_name = type_node
        .and_then(|t| t.find("ref"))
        .map(|r| r.plain_text())
        .unwrap_or_default();
    out.push_str(BOX_BEGIN);
    out.push_str(&format!(
        "\\rule{{0pt}}{{3ex}}typedef {} {} \\{{\\\\\n",
        keyword.trim(),
        ctx.escape(&tag_name)
    ));

    let mut buffer = DirectiveBuffer::new(&config.directives);
    let mut descriptions = Vec::with_capacity(compound.fields.len());
    for field in &compound.fields {
        let key = format!("{}.{}", member.name, field.name);
        let field_name = ctx.escape(&field.name);

        let mut row = format!(
            "\\hspace{{1.7em}}{} \\reffld{{{}}}{}",
            ctx.render(field.type_node.as_ref()),
            field_name,
            ctx.escape(&field.argsstring)
        );
        if let Some(bits) = &field.bitfield {
            row.push_str(&format!(" : {}", bits.trim()));
        }
        row.push_str(";\\\\\n");
        match buffer.feed(&key, row) {
            Feed::Emit(text) | Feed::Replaced(text) => out.push_str(&text),
            Feed::Buffered => {}
        }

        ctx.registry.register(RefKind::Field, &key, &key)?;

        let paras: Vec<String> = field
            .detailed_paras()
            .iter()
            .map(|p| format!("\\hspace{{2em}}{}", ctx.render(Some(*p))))
            .collect();
        descriptions.push(format!(
            "\\hypertarget{{{}}}{{\\reffld{{{}}}}}\\\\{}",
            key,
            field_name,
            paras.join("\\\\[1.25mm]\n")
        ));
    }
    buffer.finish(&member.name)?;

    out.push_str(&format!(
        "\\}} {}\\rule[-2ex]{{0pt}}{{0pt}}\n{}\n\n",
        self_anchor(&member.id, &name),
        BOX_END
    ));
    ctx.registry.register(RefKind::Type, &member.name, &member.id)?;

    // the typedef usually carries the brief; fall back to the struct's own
    let mut brief = ctx.render(member.brief.as_ref().and_then(|b| b.find("para")));
    if brief.is_empty() {
        brief = ctx.render(compound.brief.as_ref().and_then(|b| b.find("para")));
    }
    out.push_str(BRIEF_SPACING);
    out.push_str(&brief);
    out.push_str("\n\n");

    if !descriptions.is_empty() {
        out.push_str(DATA_FIELDS_HEADING);
        out.push_str(&descriptions.join(PARA_SEP));
        out.push_str("\n\\end{longtable}\n\n");
    }

    let rest = remaining_paras(member.detailed.as_ref(), deprecation.as_ref());
    ctx.description(&rest, DESCRIPTION_HEADING, out);

    ctx.counts.structs += 1;
    Ok(())
}

fn emphasis_texts(node: Option<&DocElement>, refs: &mut BTreeSet<String>) {
    if let Some(node) = node {
        refs.extend(node.descendants("emphasis").iter().map(|e| e.plain_text()));
    }
}

/// Every `@a` reference in the struct's documentation must name one of its
/// fields
fn check_field_refs(member: &MemberDef, compound: &Compound) -> Result<()> {
    let mut refs = BTreeSet::new();
    emphasis_texts(member.brief.as_ref(), &mut refs);
    emphasis_texts(member.detailed.as_ref(), &mut refs);
    emphasis_texts(compound.brief.as_ref(), &mut refs);
    emphasis_texts(compound.detailed.as_ref(), &mut refs);
    for field in &compound.fields {
        emphasis_texts(field.brief.as_ref(), &mut refs);
        emphasis_texts(field.detailed.as_ref(), &mut refs);
    }

    let unknown: Vec<String> = refs
        .into_iter()
        .filter(|r| !compound.fields.iter().any(|f| f.name == *r))
        .collect();
    if unknown.is_empty() {
        Ok(())
    } else {
        Err(ConvertError::UnknownFieldRefs {
            typename: member.name.clone(),
            names: unknown,
        })
    }
}
