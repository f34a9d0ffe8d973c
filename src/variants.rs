//! Memory-order variants of functions
//!
//! Functions such as `hsa_signal_load_scacquire` and `hsa_signal_load_relaxed`
//! differ only in their memory-ordering suffix and are documented together.

use crate::types::MemberDef;

/// Name without its memory-order suffix, if it carries one
pub fn strip_memory_order<'a>(name: &'a str, orders: &[String]) -> Option<&'a str> {
    let mut sorted: Vec<&String> = orders.iter().collect();
    sorted.sort_by_key(|s| std::cmp::Reverse(s.len()));
    sorted
        .into_iter()
        .find_map(|suffix| name.strip_suffix(suffix.as_str()))
        .filter(|base| !base.is_empty())
}

/// Functions documented as one entity
#[derive(Debug, Clone)]
pub struct FunctionGroup<'a> {
    /// Base name shared by the variants; `None` for a function without suffix
    pub base: Option<String>,
    /// Variants in file order; the first one supplies the documentation
    pub members: Vec<&'a MemberDef>,
}

impl<'a> FunctionGroup<'a> {
    pub fn representative(&self) -> &'a MemberDef {
        self.members[0]
    }

    /// Section title: the plain name for a single function, the base name
    /// for a group of variants
    pub fn title(&self) -> &str {
        match (&self.base, self.members.len()) {
            (Some(base), n) if n > 1 => base,
            _ => &self.members[0].name,
        }
    }
}

/// Cluster functions by base name, preserving the order of first appearance
pub fn group_functions<'a>(functions: &[&'a MemberDef], orders: &[String]) -> Vec<FunctionGroup<'a>> {
    let mut groups: Vec<FunctionGroup<'a>> = Vec::new();
    for &func in functions {
        match strip_memory_order(&func.name, orders) {
            Some(base) => {
                if let Some(group) = groups
                    .iter_mut()
                    .find(|g| g.base.as_deref() == Some(base))
                {
                    group.members.push(func);
                } else {
                    groups.push(FunctionGroup {
                        base: Some(base.to_string()),
                        members: vec![func],
                    });
                }
            }
            None => groups.push(FunctionGroup {
                base: None,
                members: vec![func],
            }),
        }
    }
    groups
}
