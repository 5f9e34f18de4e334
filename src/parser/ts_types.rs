//! TypeScript prop types: resolving the props type of a component to its
//! members and describing each member's type.

use super::docblock::leading_docblock;
use super::syntax::{children, has_keyword, named_children, node_text, property_key};
use crate::types::TypeDescriptor;
use serde_json::Value;
use tree_sitter::Node;

/// One member of a props type
#[derive(Debug, Clone, PartialEq)]
pub struct TsMember {
    pub name: String,
    pub ty: TypeDescriptor,
    pub optional: bool,
    pub description: Option<String>,
}

/// Describe a type node (`type_annotation` nodes are unwrapped)
pub fn describe_ts_type(node: Node, source: &str) -> TypeDescriptor {
    let text = node_text(node, source);
    match node.kind() {
        "type_annotation" | "parenthesized_type" => match node.named_child(0) {
            Some(inner) => describe_ts_type(inner, source),
            None => TypeDescriptor::named(text),
        },
        "predefined_type" | "type_identifier" | "nested_type_identifier" => {
            TypeDescriptor::named(text)
        }
        "literal_type" => TypeDescriptor::named("literal").with_value(Value::String(text)),
        "union_type" => {
            let mut elements = Vec::new();
            flatten_union(node, source, &mut elements);
            TypeDescriptor::named("union")
                .with_raw(text)
                .with_elements(elements)
        }
        "array_type" => {
            let elements = node
                .named_child(0)
                .map(|inner| vec![describe_ts_type(inner, source)])
                .unwrap_or_default();
            TypeDescriptor::named("Array")
                .with_raw(text)
                .with_elements(elements)
        }
        "generic_type" => {
            let name = node
                .child_by_field_name("name")
                .map(|n| node_text(n, source))
                .unwrap_or_else(|| text.clone());
            let elements: Vec<TypeDescriptor> = node
                .child_by_field_name("type_arguments")
                .map(|args| {
                    named_children(args)
                        .into_iter()
                        .map(|arg| describe_ts_type(arg, source))
                        .collect()
                })
                .unwrap_or_default();
            TypeDescriptor::named(name)
                .with_raw(text)
                .with_elements(elements)
        }
        "function_type" => TypeDescriptor::named("signature")
            .with_value(Value::String("function".to_string()))
            .with_raw(text),
        "object_type" => TypeDescriptor::named("signature")
            .with_value(Value::String("object".to_string()))
            .with_raw(text),
        _ => TypeDescriptor::named(text),
    }
}

fn flatten_union(node: Node, source: &str, out: &mut Vec<TypeDescriptor>) {
    for child in named_children(node) {
        if child.kind() == "union_type" {
            flatten_union(child, source, out);
        } else {
            out.push(describe_ts_type(child, source));
        }
    }
}

/// Members of a props type. `type_node` may be an annotation, an inline object
/// type, an intersection, or a reference to a top-level interface / type alias.
pub fn props_members(type_node: Node, program: Node, source: &str) -> Vec<TsMember> {
    let mut members = Vec::new();
    collect_members(type_node, program, source, &mut members, 0);
    members
}

fn collect_members(
    node: Node,
    program: Node,
    source: &str,
    out: &mut Vec<TsMember>,
    depth: usize,
) {
    // Guards against `type A = B; type B = A;`
    if depth > 8 {
        return;
    }

    match node.kind() {
        "type_annotation" | "parenthesized_type" => {
            if let Some(inner) = node.named_child(0) {
                collect_members(inner, program, source, out, depth + 1);
            }
        }
        "object_type" | "interface_body" => {
            for member in named_children(node) {
                if let Some(m) = describe_member(member, source) {
                    out.push(m);
                }
            }
        }
        "intersection_type" => {
            for part in named_children(node) {
                collect_members(part, program, source, out, depth + 1);
            }
        }
        "type_identifier" | "generic_type" => {
            let name = if node.kind() == "generic_type" {
                node.child_by_field_name("name")
                    .map(|n| node_text(n, source))
                    .unwrap_or_default()
            } else {
                node_text(node, source)
            };
            if let Some(decl) = find_type_declaration(program, &name, source) {
                collect_declaration(decl, program, source, out, depth + 1);
            }
        }
        _ => {}
    }
}

fn collect_declaration(
    decl: Node,
    program: Node,
    source: &str,
    out: &mut Vec<TsMember>,
    depth: usize,
) {
    match decl.kind() {
        "interface_declaration" => {
            // Inherited members first so own members override them
            for child in children(decl) {
                if child.kind() == "extends_type_clause" {
                    for parent in named_children(child) {
                        collect_members(parent, program, source, out, depth + 1);
                    }
                }
            }
            if let Some(body) = decl.child_by_field_name("body") {
                collect_members(body, program, source, out, depth + 1);
            }
        }
        "type_alias_declaration" => {
            if let Some(value) = decl.child_by_field_name("value") {
                collect_members(value, program, source, out, depth + 1);
            }
        }
        _ => {}
    }
}

fn describe_member(member: Node, source: &str) -> Option<TsMember> {
    match member.kind() {
        "property_signature" => {
            let name = property_key(member.child_by_field_name("name")?, source)?;
            let ty = member
                .child_by_field_name("type")
                .map(|t| describe_ts_type(t, source))
                .unwrap_or_else(|| TypeDescriptor::named("any"));
            Some(TsMember {
                name,
                ty,
                optional: has_keyword(member, "?"),
                description: leading_docblock(member, source),
            })
        }
        "method_signature" => {
            let name = property_key(member.child_by_field_name("name")?, source)?;
            Some(TsMember {
                name,
                ty: TypeDescriptor::named("signature")
                    .with_value(Value::String("function".to_string()))
                    .with_raw(node_text(member, source)),
                optional: has_keyword(member, "?"),
                description: leading_docblock(member, source),
            })
        }
        _ => None,
    }
}

/// Find a top-level `interface Name` or `type Name = ...`, exported or not
pub fn find_type_declaration<'a>(program: Node<'a>, name: &str, source: &str) -> Option<Node<'a>> {
    for node in named_children(program) {
        let decl = if node.kind() == "export_statement" {
            match node.child_by_field_name("declaration") {
                Some(decl) => decl,
                None => continue,
            }
        } else {
            node
        };

        if matches!(decl.kind(), "interface_declaration" | "type_alias_declaration") {
            let declared = decl
                .child_by_field_name("name")
                .map(|n| node_text(n, source));
            if declared.as_deref() == Some(name) {
                return Some(decl);
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tree_sitter::Parser;

    fn parse(source: &str) -> tree_sitter::Tree {
        let mut parser = Parser::new();
        parser
            .set_language(&tree_sitter_typescript::LANGUAGE_TSX.into())
            .unwrap();
        parser.parse(source, None).unwrap()
    }

    #[test]
    fn test_interface_members() {
        let source = r#"
interface BaseProps {
  id: string;
}

export interface ButtonProps extends BaseProps {
  /** Text shown inside the button */
  label: string;
  size?: 'sm' | 'md' | 'lg';
  onClick?(): void;
}
"#;
        let tree = parse(source);
        let program = tree.root_node();
        let decl = find_type_declaration(program, "ButtonProps", source).unwrap();
        let mut members = Vec::new();
        collect_declaration(decl, program, source, &mut members, 0);

        let names: Vec<_> = members.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["id", "label", "size", "onClick"]);

        let label = &members[1];
        assert!(!label.optional);
        assert_eq!(label.ty, TypeDescriptor::named("string"));
        assert_eq!(label.description.as_deref(), Some("Text shown inside the button"));

        let size = &members[2];
        assert!(size.optional);
        assert_eq!(size.ty.name, "union");
        let elements = size.ty.elements.as_ref().unwrap();
        assert_eq!(elements.len(), 3);
        assert_eq!(elements[0].value, Some(json!("'sm'")));

        assert_eq!(members[3].ty.name, "signature");
        assert!(members[3].optional);
    }

    #[test]
    fn test_type_alias_intersection() {
        let source = r#"
type A = { a: number };
type Props = A & { b?: string[] };
"#;
        let tree = parse(source);
        let program = tree.root_node();
        let decl = find_type_declaration(program, "Props", source).unwrap();
        let mut members = Vec::new();
        collect_declaration(decl, program, source, &mut members, 0);

        assert_eq!(members.len(), 2);
        assert_eq!(members[0].name, "a");
        assert_eq!(members[1].name, "b");
        assert_eq!(members[1].ty.name, "Array");
        assert_eq!(members[1].ty.elements.as_ref().unwrap()[0].name, "string");
    }

    #[test]
    fn test_recursive_aliases_terminate() {
        let source = "type A = B;\ntype B = A;\n";
        let tree = parse(source);
        let program = tree.root_node();
        let decl = find_type_declaration(program, "A", source).unwrap();
        let mut members = Vec::new();
        collect_declaration(decl, program, source, &mut members, 0);
        assert!(members.is_empty());
    }
}
