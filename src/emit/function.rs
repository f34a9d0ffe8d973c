//! Functions and groups of memory-order variants

use log::debug;
use std::collections::BTreeSet;

use super::{section_title, self_anchor, Context, BOX_BEGIN, BOX_END, BRIEF_SPACING};
use crate::declarator::inline_declarator_name;
use crate::deprecation::{remaining_paras, DeprecatedCategory};
use crate::error::{ConvertError, Result};
use crate::registry::RefKind;
use crate::render::PARA_SEP;
use crate::types::{DocElement, Direction, MemberDef};
use crate::variants::FunctionGroup;

const PARAMETERS_HEADING: &str = "\\hspace*{-.3mm}\\textbf{Parameters}\\\\[-7mm]\n\
\\noindent\\begin{longtable}{@{}>{\\hangindent=2em}p{\\textwidth}}\n";
const RETURN_VALUES_HEADING: &str = "\\textbf{Return Values}\\\\[-7mm]\n\
\\noindent\\begin{longtable}{@{}>{\\hangindent=2em}p{\\linewidth}}\n";
const RETURNS_HEADING: &str = "\\noindent\\textbf{Returns}\\\\[1mm]\n";
const DESCRIPTION_HEADING: &str = "\\noindent\\textbf{Description}\\\\[1.5mm]\n";
const TABLE_END: &str = "\n\\end{longtable}\n\\vspace{-2mm}";
const INDENT: &str = "\\hspace{2em}";

/// Render a function group: every variant's signature, one set of sections
/// taken from the first variant
pub fn process_function(group: &FunctionGroup, ctx: &mut Context, out: &mut String) -> Result<()> {
    let func = group.representative();
    debug!("function {} ({} variant(s))", group.title(), group.members.len());

    for variant in &group.members {
        register_function(variant, ctx, out)?;
    }
    section_title(out, &ctx.escape(group.title()));

    check_argument_refs(func)?;

    let deprecation = ctx.deprecation(
        func.detailed.as_ref(),
        DeprecatedCategory::Function,
        group.title(),
        out,
    );

    let signatures: Vec<String> = group.members.iter().map(|f| signature(f, ctx)).collect();
    out.push_str(BOX_BEGIN);
    out.push_str(&signatures.join("\\\\[4mm]\n"));
    out.push_str(BOX_END);
    out.push('\n');

    out.push_str(BRIEF_SPACING);
    out.push_str(&ctx.render(func.brief.as_ref().and_then(|b| b.find("para"))));
    out.push_str("\n\n");

    if let Some(detailed) = func.detailed.as_ref() {
        parameters(detailed, ctx, out);
        return_values(detailed, ctx, out);
        if let Some(returns) = detailed.find("para/simplesect[@kind='return']") {
            out.push_str(RETURNS_HEADING);
            out.push_str(&ctx.render(Some(returns)));
            out.push_str("\n\n");
        }
    }

    // parameter and return documentation was consumed above
    let rest: Vec<&DocElement> = remaining_paras(func.detailed.as_ref(), deprecation.as_ref())
        .into_iter()
        .filter(|p| p.find("parameterlist").is_none() && p.find("simplesect[@kind='return']").is_none())
        .collect();
    ctx.description(&rest, DESCRIPTION_HEADING, out);
    out.push_str(" \n");

    ctx.counts.functions += group.members.len();
    Ok(())
}

/// Index entry, listings keyword and registry entry for one function
fn register_function(func: &MemberDef, ctx: &mut Context, out: &mut String) -> Result<()> {
    ctx.registry.register(RefKind::Function, &func.name, &func.id)?;
    let index = if func.name.starts_with(&ctx.config.ext_prefix) {
        "ext"
    } else {
        "api"
    };
    out.push_str(&format!("\\index[{}]{{{}}}", index, func.name));
    ctx.functions.push(func.name.clone());
    Ok(())
}

/// `@p` references and documented parameter names must match the declared
/// parameters
fn check_argument_refs(func: &MemberDef) -> Result<()> {
    let declared: BTreeSet<&str> = func.params.iter().map(|p| p.declname.as_str()).collect();

    let mut refs = BTreeSet::new();
    for description in [func.brief.as_ref(), func.detailed.as_ref()].into_iter().flatten() {
        refs.extend(description.descendants("computeroutput").iter().map(|e| e.plain_text()));
        refs.extend(
            description
                .find_descendants("parameterlist[@kind='param']", "parameteritem/parameternamelist/parametername")
                .iter()
                .map(|e| e.plain_text().trim().to_string()),
        );
    }

    let unknown: Vec<String> = refs
        .into_iter()
        .filter(|r| !declared.contains(r.as_str()))
        .collect();
    if unknown.is_empty() {
        Ok(())
    } else {
        Err(ConvertError::UnknownArgumentRefs {
            function: func.name.clone(),
            names: unknown,
        })
    }
}

fn signature(func: &MemberDef, ctx: &Context) -> String {
    let mut return_type = ctx.render(func.type_node.as_ref());
    for stripped in &ctx.config.stripped_macros {
        return_type = return_type.replace(&format!(" {}", ctx.escape(stripped)), "");
    }

    let mut text = format!(
        "\n\\pbox{{\\textwidth}}{{\\hspace{{1mm}}\\\\[1mm]{} {}(",
        return_type.trim(),
        self_anchor(&func.id, &ctx.escape(&func.name))
    );
    let params: Vec<String> = func
        .params
        .iter()
        .map(|param| {
            let ty = ctx.render(param.type_node.as_ref());
            let mut arg = String::from("\\hspace*{1.7em}");
            if param.declname.is_empty() {
                arg.push_str(&ty);
            } else {
                let name = format!("\\refarg{{{}}}", ctx.escape(&param.declname));
                match inline_declarator_name(&ty, &name) {
                    Some(inlined) => arg.push_str(&inlined),
                    None if ty.ends_with('*') => arg.push_str(&format!("{}{}", ty, name)),
                    None => arg.push_str(&format!("{} {}", ty, name)),
                }
            }
            arg.push_str(&ctx.escape(&param.array));
            arg
        })
        .collect();
    if !params.is_empty() {
        text.push_str("\\\\");
        text.push_str(&params.join(",\\\\"));
    }
    text.push_str(");\\\\}");
    text
}

fn parameters(detailed: &DocElement, ctx: &Context, out: &mut String) {
    let items = detailed.find_descendants("parameterlist[@kind='param']", "parameteritem");
    if items.is_empty() {
        return;
    }

    let mut entries = Vec::with_capacity(items.len());
    for item in items {
        let name_node = item.find("parameternamelist/parametername");
        let mut entry = format!("\\refarg{{{}}}\\\\", ctx.render(name_node));

        let direction = name_node
            .and_then(|n| n.attribute("direction"))
            .and_then(Direction::from_xml)
            .map(|d| d.prefix())
            .unwrap_or("");

        // several paragraphs are wrapped in a single parblock
        let mut paras = item.find_all("parameterdescription/para/parblock/para");
        if paras.is_empty() {
            paras = item.find_all("parameterdescription/para");
        }
        let rendered: Vec<String> = paras
            .iter()
            .enumerate()
            .map(|(i, p)| {
                let prefix = if i == 0 { direction } else { "" };
                format!("{}{}{}", INDENT, prefix, ctx.render(Some(*p)))
            })
            .collect();
        entry.push_str(&rendered.join(PARA_SEP));
        entries.push(entry);
    }

    out.push_str(PARAMETERS_HEADING);
    out.push_str(&entries.join(PARA_SEP));
    out.push_str(TABLE_END);
}

fn return_values(detailed: &DocElement, ctx: &Context, out: &mut String) {
    let items = detailed.find_descendants("parameterlist[@kind='retval']", "parameteritem");
    if items.is_empty() {
        return;
    }

    let entries: Vec<String> = items
        .iter()
        .map(|item| {
            let name = item
                .find("parameternamelist/parametername/ref")
                .or_else(|| item.find("parameternamelist/parametername"));
            let mut entry = ctx.render(name);
            let description = ctx.render(item.find("parameterdescription"));
            if !description.is_empty() {
                entry.push_str("\\\\");
                entry.push_str(INDENT);
                entry.push_str(&description);
            }
            entry
        })
        .collect();

    out.push_str(RETURN_VALUES_HEADING);
    out.push_str(&entries.join(PARA_SEP));
    out.push_str(TABLE_END);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConvertConfig;
    use crate::types::{MemberKind, Param, Tag};
    use crate::variants::group_functions;
    use pretty_assertions::assert_eq;

    fn elem(name: &str) -> DocElement {
        DocElement::new(Tag::Other(name.into()))
    }

    fn param(ty: &str, name: &str) -> Param {
        Param {
            type_node: Some(elem("type").with_text(ty)),
            declname: name.to_string(),
            array: String::new(),
        }
    }

    fn param_item(name: &str, direction: Option<&str>, text: &str) -> DocElement {
        let mut param_name = elem("parametername").with_text(name);
        if let Some(dir) = direction {
            param_name = param_name.with_attribute("direction", dir);
        }
        elem("parameteritem")
            .with_child(elem("parameternamelist").with_child(param_name))
            .with_child(elem("parameterdescription").with_child(DocElement::new(Tag::Para).with_text(text)))
    }

    fn function(name: &str, items: Vec<DocElement>) -> MemberDef {
        let mut func = MemberDef::new(format!("id_{}", name), MemberKind::Function, name);
        func.type_node = Some(elem("type").with_text("hsa_status_t HSA_API"));
        func.params = vec![param("hsa_signal_t", "signal"), param("void *", "data")];
        func.brief = Some(elem("briefdescription").with_child(DocElement::new(Tag::Para).with_text("Brief.")));
        let mut list = elem("parameterlist").with_attribute("kind", "param");
        for item in items {
            list = list.with_child(item);
        }
        func.detailed = Some(
            elem("detaileddescription")
                .with_child(DocElement::new(Tag::Para).with_child(list))
                .with_child(DocElement::new(Tag::Para).with_text("Details.")),
        );
        func
    }

    fn render_group(funcs: &[&MemberDef], ctx: &mut Context) -> Result<String> {
        let groups = group_functions(funcs, &ctx.config.memory_orders);
        let mut out = String::new();
        for group in &groups {
            process_function(group, ctx, &mut out)?;
        }
        Ok(out)
    }

    #[test]
    fn test_signature() {
        let config = ConvertConfig::default();
        let ctx = Context::new(&config);
        let func = function("hsa_signal_wait", vec![]);
        assert_eq!(
            signature(&func, &ctx),
            "\n\\pbox{\\textwidth}{\\hspace{1mm}\\\\[1mm]hsa_\\-status_\\-t \\hypertarget{id_hsa_signal_wait}{\\textbf{hsa_\\-signal_\\-wait}}(\\\\\
\\hspace*{1.7em}hsa_\\-signal_\\-t \\refarg{signal},\\\\\\hspace*{1.7em}void *\\refarg{data});\\\\}"
        );
    }

    #[test]
    fn test_function_pointer_parameter_inlined() {
        let config = ConvertConfig::default();
        let ctx = Context::new(&config);
        let mut func = function("hsa_iterate", vec![]);
        func.params = vec![param("hsa_status_t(*)(void *data)", "callback")];
        let sig = signature(&func, &ctx);
        assert!(sig.contains("\\hspace*{1.7em}hsa_\\-status_\\-t (*\\refarg{callback})(void *data));"));
    }

    #[test]
    fn test_direction_prefixes() {
        let config = ConvertConfig::default();
        let mut ctx = Context::new(&config);
        let func = function(
            "hsa_signal_wait",
            vec![
                param_item("signal", Some("inout"), "Signal."),
                param_item("data", None, "Data."),
            ],
        );
        let out = render_group(&[&func], &mut ctx).unwrap();
        assert!(out.contains("\\refarg{signal}\\\\\\hspace{2em}(in, out) Signal."));
        assert!(out.contains("\\refarg{data}\\\\\\hspace{2em}Data."));
        assert!(out.contains("\\textbf{Description}\\\\[1.5mm]\nDetails. \n"));
        assert!(out.starts_with("\\index[api]{hsa_signal_wait}\\subsubsection{hsa_\\-signal_\\-wait}\n"));
    }

    #[test]
    fn test_variants_render_once() {
        let config = ConvertConfig::default();
        let mut ctx = Context::new(&config);
        let acquire = function("foo_acquire", vec![param_item("signal", Some("in"), "Signal.")]);
        let release = function("foo_release", vec![param_item("signal", Some("in"), "Signal.")]);
        let out = render_group(&[&acquire, &release], &mut ctx).unwrap();

        assert_eq!(out.matches("\\subsubsection{").count(), 1);
        assert!(out.contains("\\subsubsection{foo}\n"));
        assert!(out.contains("\\textbf{foo_\\-acquire}"));
        assert!(out.contains("\\textbf{foo_\\-release}"));
        assert_eq!(out.matches("\\textbf{Parameters}").count(), 1);
        assert_eq!(out.matches("\\textbf{Description}").count(), 1);
        assert_eq!(out.matches("Brief.").count(), 1);
        assert_eq!(ctx.functions, vec!["foo_acquire".to_string(), "foo_release".to_string()]);
        assert_eq!(ctx.counts.functions, 2);
    }

    #[test]
    fn test_unknown_argument_reference() {
        let config = ConvertConfig::default();
        let mut ctx = Context::new(&config);
        let mut func = function("hsa_signal_wait", vec![param_item("timeout", Some("in"), "T.")]);
        func.brief = Some(
            elem("briefdescription").with_child(
                DocElement::new(Tag::Para)
                    .with_text("Wait on ")
                    .with_child(DocElement::new(Tag::ComputerOutput).with_text("sig")),
            ),
        );
        match render_group(&[&func], &mut ctx) {
            Err(ConvertError::UnknownArgumentRefs { function, names }) => {
                assert_eq!(function, "hsa_signal_wait");
                assert_eq!(names, vec!["sig".to_string(), "timeout".to_string()]);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_return_values_and_returns() {
        let config = ConvertConfig::default();
        let mut ctx = Context::new(&config);
        let mut func = function("hsa_init", vec![]);
        func.params.clear();
        let retvals = elem("parameterlist")
            .with_attribute("kind", "retval")
            .with_child(
                elem("parameteritem")
                    .with_child(elem("parameternamelist").with_child(
                        elem("parametername").with_child(
                            DocElement::new(Tag::Ref { refid: "s0".into() }).with_text("HSA_STATUS_SUCCESS"),
                        ),
                    ))
                    .with_child(elem("parameterdescription").with_child(DocElement::new(Tag::Para).with_text("Ok."))),
            )
            .with_child(
                elem("parameteritem")
                    .with_child(elem("parameternamelist").with_child(
                        elem("parametername").with_child(
                            DocElement::new(Tag::Ref { refid: "s1".into() }).with_text("HSA_STATUS_ERROR"),
                        ),
                    ))
                    .with_child(elem("parameterdescription")),
            );
        let returns = elem("simplesect")
            .with_attribute("kind", "return")
            .with_child(DocElement::new(Tag::Para).with_text("Status."));
        func.detailed = Some(
            elem("detaileddescription")
                .with_child(DocElement::new(Tag::Para).with_child(retvals))
                .with_child(DocElement::new(Tag::Para).with_child(returns)),
        );

        let out = render_group(&[&func], &mut ctx).unwrap();
        assert!(out.contains(
            "\\hyperlink{s0}{HSA_\\-STATUS_\\-SUCCESS}\\\\\\hspace{2em}Ok.\\\\[2mm]\n\\hyperlink{s1}{HSA_\\-STATUS_\\-ERROR}\n\\end{longtable}"
        ));
        assert!(out.contains("\\textbf{Returns}\\\\[1mm]\nStatus.\n\n"));
        assert!(!out.contains("\\textbf{Description}"));
        assert!(out.contains("\\hypertarget{id_hsa_init}{\\textbf{hsa_\\-init}}();\\\\}"));
    }

    #[test]
    fn test_extension_index() {
        let config = ConvertConfig::default();
        let mut ctx = Context::new(&config);
        let func = function("hsa_ext_program_create", vec![]);
        let out = render_group(&[&func], &mut ctx).unwrap();
        assert!(out.starts_with("\\index[ext]{hsa_ext_program_create}"));
    }
}
