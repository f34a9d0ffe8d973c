//! Enumerations and their constants

use log::{debug, warn};

use super::{section_title, self_anchor, Context, BOX_BEGIN, BOX_END, BRIEF_SPACING};
use crate::deprecation::{remaining_paras, DeprecatedCategory, DeprecatedEntry, Deprecation};
use crate::error::{ConvertError, Result};
use crate::registry::RefKind;
use crate::render::{Render, PARA_SEP};
use crate::types::{EnumValue, MemberDef};

const VALUES_HEADING: &str =
    "\\noindent\\textbf{Values}\\\\[-7mm]\n\\begin{longtable}{@{\\hspace{2em}}p{\\linewidth-2em}}\n";

pub fn process_enum(member: &MemberDef, ctx: &mut Context, out: &mut String) -> Result<()> {
    // Doxygen names anonymous enums @0, @1, ...
    let anonymous = member.name.starts_with('@');
    debug!("enum {}", member.name);

    let title = if anonymous {
        let remark = [member.brief.as_ref(), member.detailed.as_ref()]
            .into_iter()
            .flatten()
            .flat_map(|d| d.find_descendants("simplesect[@kind='remark']", "para"))
            .next();
        ctx.render(remark)
    } else {
        ctx.escape(&member.name)
    };
    section_title(out, &title);

    let expected_prefix = format!(
        "{}_",
        ctx.config.strip_type_suffix(&member.name).to_uppercase()
    );
    let duplicates_allowed = ctx.config.initializer_allow_list.contains(&member.name);

    let mut rows = Vec::with_capacity(member.enum_values.len());
    let mut descriptions = Vec::with_capacity(member.enum_values.len());
    let mut initializers: Vec<String> = Vec::new();
    let mut empty_descriptions = 0;
    for value in &member.enum_values {
        if !anonymous && !value.name.starts_with(&expected_prefix) {
            return Err(ConvertError::NamingMismatch {
                enumeration: member.name.clone(),
                value: value.name.clone(),
                expected_prefix,
            });
        }
        ctx.registry.register(RefKind::EnumValue, &value.name, &value.id)?;

        let initializer = ctx.render(value.initializer.as_ref());
        if !initializer.is_empty() && !duplicates_allowed && initializers.contains(&initializer) {
            return Err(ConvertError::DuplicateInitializer {
                enumeration: member.name.clone(),
                initializer,
            });
        }

        let value_name = ctx.escape(&value.name);
        let row = format!(
            "\\hspace{{1.7em}}\\hypertarget{{{}}}{{\\refenu{{{}}}}} {}",
            value.id, value_name, initializer
        );
        rows.push(row.trim_end().to_string());

        let description = match Deprecation::detect(value.detailed.as_ref(), &ctx.renderer) {
            Some(deprecation) => {
                ctx.deprecated.push(DeprecatedEntry {
                    category: DeprecatedCategory::EnumerationConstant,
                    name: value_name.clone(),
                    explanation: deprecation.explanation.clone(),
                });
                deprecation.inline(&value_rest(value, &deprecation, ctx))
            }
            None => {
                if !initializer.is_empty() {
                    initializers.push(initializer);
                }
                ctx.render(value.detailed.as_ref())
            }
        };

        let mut entry = format!("\\hspace{{-2em}}\\refenu{{{}}}", value_name);
        if description.is_empty() {
            empty_descriptions += 1;
        } else {
            entry.push_str("\\\\");
            entry.push_str(&description);
        }
        descriptions.push(entry);
    }

    ctx.deprecation(
        member.detailed.as_ref(),
        DeprecatedCategory::Enumeration,
        &member.name,
        out,
    );

    out.push_str(BOX_BEGIN);
    out.push_str("\\rule{0pt}{3ex}");
    let shown_name = if anonymous {
        out.push_str("enum \\{\\\\");
        String::new()
    } else {
        out.push_str("typedef enum \\{\\\\");
        ctx.registry.register(RefKind::Type, &member.name, &member.id)?;
        ctx.escape(&member.name)
    };
    out.push_str(&rows.join(",\\\\\n"));
    out.push_str("\\\\\n");
    out.push_str(&format!(
        "\\}} {};\\rule[-2ex]{{0pt}}{{0pt}}{}",
        self_anchor(&member.id, &shown_name),
        BOX_END
    ));

    out.push_str(BRIEF_SPACING);
    out.push_str(&ctx.render(member.brief.as_ref().and_then(|b| b.find("para"))));
    out.push_str("\n\n");

    ctx.counts.enums += 1;
    if empty_descriptions == member.enum_values.len() {
        warn!(
            "Values section omitted in enum {} (all descriptions are empty)",
            member.name
        );
        return Ok(());
    }
    out.push_str(VALUES_HEADING);
    out.push_str(&descriptions.join(PARA_SEP));
    out.push_str("\n\\end{longtable}");
    Ok(())
}

/// Description of a deprecated constant after its notice
fn value_rest(value: &EnumValue, deprecation: &Deprecation, ctx: &Context) -> String {
    remaining_paras(value.detailed.as_ref(), Some(deprecation))
        .first()
        .map(|p| ctx.renderer.render(Some(*p)))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConvertConfig;
    use crate::types::{DocElement, MemberKind, Tag};
    use pretty_assertions::assert_eq;

    fn detailed(text: &str) -> Option<DocElement> {
        Some(
            DocElement::new(Tag::Other("detaileddescription".into()))
                .with_child(DocElement::new(Tag::Para).with_text(text)),
        )
    }

    fn value(name: &str, initializer: Option<&str>, description: &str) -> EnumValue {
        EnumValue {
            id: format!("v_{}", name),
            name: name.to_string(),
            initializer: initializer
                .map(|i| DocElement::new(Tag::Other("initializer".into())).with_text(i)),
            brief: None,
            detailed: if description.is_empty() { None } else { detailed(description) },
        }
    }

    fn enumeration(name: &str, values: Vec<EnumValue>) -> MemberDef {
        let mut member = MemberDef::new(format!("e_{}", name), MemberKind::Enum, name);
        member.enum_values = values;
        member
    }

    #[test]
    fn test_values_rendered_and_registered() {
        let config = ConvertConfig::default();
        let mut ctx = Context::new(&config);
        let mut out = String::new();
        let member = enumeration(
            "xyz_t",
            vec![
                value("XYZ_A", Some("= 0"), "First."),
                value("XYZ_B", Some("= 1"), ""),
            ],
        );
        process_enum(&member, &mut ctx, &mut out).unwrap();

        assert!(out.contains(
            "typedef enum \\{\\\\\\hspace{1.7em}\\hypertarget{v_XYZ_A}{\\refenu{XYZ_\\-A}} = 0,\\\\\n"
        ));
        assert!(out.contains("\\} \\hypertarget{e_xyz_t}{\\textbf{xyz_\\-t}};"));
        assert!(out.ends_with(
            "\\hspace{-2em}\\refenu{XYZ_\\-A}\\\\First.\\\\[2mm]\n\\hspace{-2em}\\refenu{XYZ_\\-B}\n\\end{longtable}"
        ));
        assert_eq!(ctx.registry.anchor("XYZ_B"), Some("v_XYZ_B"));
        assert_eq!(ctx.registry.anchor("xyz_t"), Some("e_xyz_t"));
    }

    #[test]
    fn test_naming_mismatch() {
        let config = ConvertConfig::default();
        let mut ctx = Context::new(&config);
        let mut out = String::new();
        let member = enumeration("xyz_t", vec![value("ABC_FOO", None, "")]);
        match process_enum(&member, &mut ctx, &mut out) {
            Err(ConvertError::NamingMismatch {
                value,
                expected_prefix,
                ..
            }) => {
                assert_eq!(value, "ABC_FOO");
                assert_eq!(expected_prefix, "XYZ_");
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_prefix_requires_separator() {
        let config = ConvertConfig::default();
        let mut ctx = Context::new(&config);
        let mut out = String::new();
        let member = enumeration("xyz_t", vec![value("XYZA", None, "")]);
        assert!(process_enum(&member, &mut ctx, &mut out).is_err());
    }

    #[test]
    fn test_duplicate_initializer() {
        let config = ConvertConfig::default();
        let mut ctx = Context::new(&config);
        let mut out = String::new();
        let member = enumeration(
            "xyz_t",
            vec![value("XYZ_A", Some("= 1"), ""), value("XYZ_B", Some("= 1"), "")],
        );
        assert!(matches!(
            process_enum(&member, &mut ctx, &mut out),
            Err(ConvertError::DuplicateInitializer { .. })
        ));
    }

    #[test]
    fn test_allow_listed_duplicates() {
        let config = ConvertConfig::default();
        let mut ctx = Context::new(&config);
        let mut out = String::new();
        let member = enumeration(
            "hsa_packet_header_t",
            vec![
                value("HSA_PACKET_HEADER_TYPE", Some("= 0"), "Type."),
                value("HSA_PACKET_HEADER_BARRIER", Some("= 8"), "Barrier."),
                value("HSA_PACKET_HEADER_ACQUIRE_FENCE_SCOPE", Some("= 9"), "Acquire."),
                value("HSA_PACKET_HEADER_SCACQUIRE_FENCE_SCOPE", Some("= 9"), "Acquire."),
            ],
        );
        process_enum(&member, &mut ctx, &mut out).unwrap();
    }

    #[test]
    fn test_values_without_initializer_never_collide() {
        let config = ConvertConfig::default();
        let mut ctx = Context::new(&config);
        let mut out = String::new();
        let member = enumeration("xyz_t", vec![value("XYZ_A", None, ""), value("XYZ_B", None, "")]);
        process_enum(&member, &mut ctx, &mut out).unwrap();
        assert!(!out.contains("Values"));
    }

    #[test]
    fn test_anonymous_enum() {
        let config = ConvertConfig::default();
        let mut ctx = Context::new(&config);
        let mut out = String::new();
        let mut member = enumeration("@0", vec![value("HSA_ANY_NAME", Some("= 1"), "Any.")]);
        member.detailed = Some(
            DocElement::new(Tag::Other("detaileddescription".into())).with_child(
                DocElement::new(Tag::Para).with_child(
                    DocElement::new(Tag::Other("simplesect".into()))
                        .with_attribute("kind", "remark")
                        .with_child(DocElement::new(Tag::Para).with_text("Queue limits")),
                ),
            ),
        );
        process_enum(&member, &mut ctx, &mut out).unwrap();

        assert!(out.starts_with("\\subsubsection{Queue limits}\n"));
        assert!(out.contains("enum \\{\\\\"));
        assert!(!out.contains("typedef enum"));
        assert!(ctx.registry.anchor("@0").is_none());
        assert!(ctx.registry.anchor("HSA_ANY_NAME").is_some());
    }

    #[test]
    fn test_deprecated_value() {
        let config = ConvertConfig::default();
        let mut ctx = Context::new(&config);
        let mut out = String::new();
        let notice = DocElement::new(Tag::Other("detaileddescription".into()))
            .with_child(
                DocElement::new(Tag::Para).with_child(
                    DocElement::new(Tag::Other("xrefsect".into()))
                        .with_child(DocElement::new(Tag::Other("xreftitle".into())).with_text("Deprecated")),
                ),
            )
            .with_child(DocElement::new(Tag::Para).with_text("Old."));
        let mut old = value("XYZ_OLD", Some("= 1"), "");
        old.detailed = Some(notice);
        let member = enumeration("xyz_t", vec![old, value("XYZ_NEW", Some("= 1"), "New.")]);
        process_enum(&member, &mut ctx, &mut out).unwrap();

        assert!(out.contains("\\refenu{XYZ_\\-OLD}\\\\\\danger\\:\\textit{Deprecated}\\\\[1mm]Old."));
        assert_eq!(ctx.deprecated.len(), 1);
        assert_eq!(ctx.deprecated[0].category, DeprecatedCategory::EnumerationConstant);
    }
}
