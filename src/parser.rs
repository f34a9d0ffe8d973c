//! Parser for Doxygen XML output

use roxmltree::{Document, Node};
use std::path::{Path, PathBuf};

use crate::error::{ConvertError, Result};
use crate::types::*;

/// Parser for Doxygen group and compound files
pub struct DoxygenParser {
    xml_dir: PathBuf,
}

impl DoxygenParser {
    pub fn new(xml_dir: impl Into<PathBuf>) -> Self {
        Self {
            xml_dir: xml_dir.into(),
        }
    }

    /// Read a group file and resolve the member files of its structs and unions
    pub fn load_group(&self, path: &Path) -> Result<GroupFile> {
        let source = read(path)?;
        let mut group = parse_group(&source, path)?;
        for member in &mut group.members {
            if let Some(refid) = member.compound_ref.clone() {
                let compound_path = self.xml_dir.join(format!("{}.xml", refid));
                let compound_source = read(&compound_path)?;
                member.compound = Some(parse_compound(&compound_source, &compound_path)?);
            }
        }
        Ok(group)
    }

    /// Location of the first declaration in a group file
    pub fn group_location(&self, path: &Path) -> Result<Option<Location>> {
        let source = read(path)?;
        let doc = parse_document(&source, path)?;
        Ok(doc
            .descendants()
            .find(|n| n.has_tag_name("location"))
            .map(|n| parse_location(&n)))
    }
}

fn read(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|e| ConvertError::io(path, e))
}

fn parse_document<'a>(source: &'a str, path: &Path) -> Result<Document<'a>> {
    Document::parse(source).map_err(|e| ConvertError::Xml {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Parse the contents of a `group__*.xml` file
pub fn parse_group(source: &str, path: &Path) -> Result<GroupFile> {
    let doc = parse_document(source, path)?;

    let first_location = doc
        .descendants()
        .find(|n| n.has_tag_name("location"))
        .map(|n| parse_location(&n));

    let members = doc
        .descendants()
        .filter(|n| n.has_tag_name("memberdef"))
        .map(|n| parse_memberdef(&n, path))
        .collect::<Result<Vec<_>>>()?;

    Ok(GroupFile {
        path: path.to_path_buf(),
        first_location,
        members,
    })
}

/// Parse a struct/union compound file
pub fn parse_compound(source: &str, path: &Path) -> Result<Compound> {
    let doc = parse_document(source, path)?;
    let def = doc
        .descendants()
        .find(|n| n.has_tag_name("compounddef"))
        .ok_or_else(|| ConvertError::MissingElement {
            path: path.to_path_buf(),
            element: "compounddef".to_string(),
        })?;

    let fields = def
        .descendants()
        .filter(|n| n.has_tag_name("memberdef") && n.attribute("kind") == Some("variable"))
        .map(|n| parse_memberdef(&n, path))
        .collect::<Result<Vec<_>>>()?;

    Ok(Compound {
        id: def.attribute("id").unwrap_or_default().to_string(),
        brief: child_element(&def, "briefdescription"),
        detailed: child_element(&def, "detaileddescription"),
        fields,
    })
}

fn parse_memberdef(node: &Node, path: &Path) -> Result<MemberDef> {
    let id = node.attribute("id").ok_or_else(|| ConvertError::MissingElement {
        path: path.to_path_buf(),
        element: "memberdef@id".to_string(),
    })?;
    let kind = MemberKind::from_xml(node.attribute("kind").unwrap_or_default());

    let mut member = MemberDef::new(id, kind, child_text(node, "name"));
    member.type_node = child_element(node, "type");
    member.definition = child_text(node, "definition");
    member.argsstring = child_text(node, "argsstring");
    member.bitfield = child(node, "bitfield").map(|n| element_text(&n));
    member.brief = child_element(node, "briefdescription");
    member.detailed = child_element(node, "detaileddescription");
    member.location = child(node, "location")
        .map(|n| parse_location(&n))
        .unwrap_or_default();

    member.params = node
        .children()
        .filter(|n| n.has_tag_name("param"))
        .map(|p| Param {
            type_node: child_element(&p, "type"),
            declname: child_text(&p, "declname"),
            array: child_text(&p, "array"),
        })
        .collect();

    member.enum_values = node
        .children()
        .filter(|n| n.has_tag_name("enumvalue"))
        .map(|v| EnumValue {
            id: v.attribute("id").unwrap_or_default().to_string(),
            name: child_text(&v, "name"),
            initializer: child_element(&v, "initializer"),
            brief: child_element(&v, "briefdescription"),
            detailed: child_element(&v, "detaileddescription"),
        })
        .collect();

    if member.is_compound_typedef() {
        member.compound_ref = child(node, "type")
            .and_then(|t| t.children().find(|c| c.has_tag_name("ref")))
            .and_then(|r| r.attribute("refid"))
            .map(|s| s.to_string());
    }

    Ok(member)
}

fn parse_location(node: &Node) -> Location {
    Location {
        file: node.attribute("file").unwrap_or_default().to_string(),
        line: node
            .attribute("line")
            .and_then(|l| l.parse().ok())
            .unwrap_or(0),
    }
}

fn child<'a, 'input>(node: &Node<'a, 'input>, name: &str) -> Option<Node<'a, 'input>> {
    node.children().find(|n| n.has_tag_name(name))
}

fn child_text(node: &Node, name: &str) -> String {
    child(node, name).map(|n| element_text(&n)).unwrap_or_default()
}

fn child_element(node: &Node, name: &str) -> Option<DocElement> {
    child(node, name).map(|n| to_doc_element(&n))
}

/// All text below an element
fn element_text(node: &Node) -> String {
    node.descendants()
        .filter(|n| n.is_text())
        .filter_map(|n| n.text())
        .collect()
}

/// Convert an XML element into a description tree
pub fn to_doc_element(node: &Node) -> DocElement {
    let mut element = DocElement::new(Tag::from_xml(node.tag_name().name(), node.attribute("refid")));
    for attr in node.attributes() {
        element.attributes.insert(attr.name().to_string(), attr.value().to_string());
    }
    for child in node.children() {
        if child.is_element() {
            element.children.push(DocNode::Element(to_doc_element(&child)));
        } else if let Some(text) = child.text().filter(|_| child.is_text()) {
            element.children.push(DocNode::Text(text.to_string()));
        }
    }
    element
}
