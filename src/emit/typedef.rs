//! Plain and pointer-to-function typedefs

use log::{debug, warn};
use std::collections::HashSet;

use super::{section_title, self_anchor, Context, BOX_BEGIN, BOX_END, BRIEF_SPACING};
use crate::declarator::parse_fn_pointer_typedef;
use crate::deprecation::{remaining_paras, DeprecatedCategory};
use crate::error::Result;
use crate::registry::RefKind;
use crate::types::{DocElement, MemberDef};

const DESCRIPTION_HEADING: &str = "\\vspace{-4mm}\\noindent\\textbf{Description}\\\\[1mm]\n";

pub fn process_typedef(member: &MemberDef, ctx: &mut Context, out: &mut String) -> Result<()> {
    if ctx.config.skipped_typedefs.iter().any(|s| *s == member.name) {
        warn!("Typedef {} is in the skip list, not rendered", member.name);
        return Ok(());
    }
    debug!("typedef {}", member.name);

    let name = ctx.escape(&member.name);
    section_title(out, &name);
    let deprecation = ctx.deprecation(member.detailed.as_ref(), DeprecatedCategory::Typedef, &member.name, out);

    out.push_str(BOX_BEGIN);
    if member.argsstring.trim().is_empty() {
        out.push_str(&plain_definition(member, ctx));
    } else {
        out.push_str(&fn_pointer_definition(member, ctx)?);
    }
    out.push_str(BOX_END);
    out.push('\n');

    // multi-paragraph briefs end up in a parblock of the detailed description
    let parblock = member
        .detailed
        .as_ref()
        .map(|d| d.find_all("para/parblock/para"))
        .unwrap_or_default();
    let brief = if parblock.is_empty() {
        member.brief.as_ref().map(|b| b.find_all("para")).unwrap_or_default()
    } else {
        parblock
    };
    let brief: Vec<String> = brief.iter().map(|p| ctx.render(Some(*p))).collect();
    out.push_str(BRIEF_SPACING);
    out.push_str(&brief.join("\n\\\\[2mm]"));
    out.push_str("\n\n");

    let rest: Vec<&DocElement> = remaining_paras(member.detailed.as_ref(), deprecation.as_ref())
        .into_iter()
        .filter(|p| p.find("parblock").is_none())
        .collect();
    ctx.description(&rest, DESCRIPTION_HEADING, out);

    ctx.registry.register(RefKind::Type, &member.name, &member.id)?;
    ctx.counts.typedefs += 1;
    Ok(())
}

fn plain_definition(member: &MemberDef, ctx: &Context) -> String {
    let name = ctx.escape(&member.name);
    let definition = ctx
        .registry
        .linkify(&member.definition, &ctx.renderer)
        .replacen(&name, &self_anchor(&member.id, &name), 1);
    format!("\\rule{{0pt}}{{3ex}}\\rule[-2.5ex]{{0pt}}{{0pt}}{};\n", definition)
}

/// One row per parameter, the parameter name set in argument style
fn fn_pointer_definition(member: &MemberDef, ctx: &Context) -> Result<String> {
    let decl = parse_fn_pointer_typedef(&member.definition)?;
    let mut linked = HashSet::new();

    let mut text = ctx
        .registry
        .linkify_tracked(&decl.return_prefix, &ctx.renderer, &mut linked);
    text.push_str(&format!(
        " ({}{})(\\rule{{0pt}}{{3ex}}\\\\\n",
        "*".repeat(decl.stars),
        self_anchor(&member.id, &ctx.escape(&decl.name))
    ));

    let mut rows = Vec::with_capacity(decl.params.len());
    for param in &decl.params {
        let mut row = String::from("\\hspace{1.7em}");
        row.push_str(&ctx.registry.linkify_tracked(&param.before, &ctx.renderer, &mut linked));
        if let Some(name) = &param.name {
            row.push_str(&format!("\\refarg{{{}}}", ctx.escape(name)));
        }
        row.push_str(&ctx.escape(&param.after));
        rows.push(row);
    }
    text.push_str(&rows.join(",\\\\\n"));
    text.push_str("\\rule[-2ex]{0pt}{0pt});\n");
    Ok(text)
}
