//! Small tree-sitter helpers used across the analyzer.

use tree_sitter::{Node, Point};

pub fn node_text(node: Node, source: &str) -> String {
    source[node.start_byte()..node.end_byte()].to_string()
}

/// Field lookup that tolerates grammar differences between the JavaScript and
/// TypeScript grammars (e.g. `property` vs `name` on class fields).
pub fn field<'a>(node: Node<'a>, names: &[&str]) -> Option<Node<'a>> {
    names.iter().find_map(|name| node.child_by_field_name(name))
}

pub fn named_children(node: Node) -> Vec<Node> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor).collect()
}

pub fn children(node: Node) -> Vec<Node> {
    let mut cursor = node.walk();
    node.children(&mut cursor).collect()
}

/// True when `node` has an anonymous keyword child such as `static` or `async`
pub fn has_keyword(node: Node, keyword: &str) -> bool {
    children(node)
        .into_iter()
        .any(|child| !child.is_named() && child.kind() == keyword)
}

/// Strip wrappers that do not change what a value is
pub fn unwrap_expression(node: Node) -> Node {
    let mut current = node;
    loop {
        match current.kind() {
            "parenthesized_expression" | "as_expression" | "satisfies_expression"
            | "non_null_expression" => match current.named_child(0) {
                Some(inner) => current = inner,
                None => return current,
            },
            // `<T>value`: type_arguments come first, the expression last
            "type_assertion" => {
                match current.named_child(current.named_child_count().saturating_sub(1)) {
                    Some(inner) => current = inner,
                    None => return current,
                }
            }
            _ => return current,
        }
    }
}

/// Text of a string literal without quotes
pub fn string_value(node: Node, source: &str) -> Option<String> {
    match node.kind() {
        "string" => {
            let text = node_text(node, source);
            Some(text[1..text.len().saturating_sub(1).max(1)].to_string())
        }
        "template_string" if named_children(node).iter().all(|c| c.kind() != "template_substitution") => {
            let text = node_text(node, source);
            Some(text.trim_matches('`').to_string())
        }
        _ => None,
    }
}

/// Name of an object key: identifiers, string and number keys
pub fn property_key(node: Node, source: &str) -> Option<String> {
    match node.kind() {
        "property_identifier" | "identifier" | "number" | "private_property_identifier" => {
            Some(node_text(node, source))
        }
        "string" => string_value(node, source),
        _ => None,
    }
}

/// Whether a default value expression is a literal (`computed: false`)
pub fn is_literal(node: Node) -> bool {
    let node = unwrap_expression(node);
    match node.kind() {
        "string" | "number" | "true" | "false" | "null" | "undefined" | "regex" | "object"
        | "array" | "arrow_function" | "function_expression" | "function" => true,
        "template_string" => named_children(node)
            .iter()
            .all(|c| c.kind() != "template_substitution"),
        "unary_expression" => node
            .child_by_field_name("argument")
            .map(|arg| arg.kind() == "number")
            .unwrap_or(false),
        _ => false,
    }
}

/// Position of the first syntax error in the tree, 1-based
pub fn first_error(root: Node) -> Option<Point> {
    if !root.has_error() {
        return None;
    }
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        if node.is_error() || node.is_missing() {
            let pos = node.start_position();
            return Some(Point::new(pos.row + 1, pos.column + 1));
        }
        if node.has_error() {
            // Reverse so the leftmost child is visited first
            let mut kids = children(node);
            kids.reverse();
            stack.extend(kids);
        }
    }
    let pos = root.start_position();
    Some(Point::new(pos.row + 1, pos.column + 1))
}

/// Recursively check if node or its descendants render something:
/// JSX elements or `createElement` calls.
pub fn renders_elements(node: Node, source: &str) -> bool {
    match node.kind() {
        "jsx_element" | "jsx_self_closing_element" | "jsx_fragment" => return true,
        "call_expression" => {
            if let Some(callee) = node.child_by_field_name("function") {
                let name = match callee.kind() {
                    "identifier" => Some(node_text(callee, source)),
                    "member_expression" => callee
                        .child_by_field_name("property")
                        .map(|p| node_text(p, source)),
                    _ => None,
                };
                if name.as_deref() == Some("createElement") {
                    return true;
                }
            }
        }
        // Nested classes render on their own behalf
        "class_declaration" | "class" => return false,
        _ => {}
    }

    children(node)
        .into_iter()
        .any(|child| renders_elements(child, source))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tree_sitter::Parser;

    fn parse(source: &str) -> tree_sitter::Tree {
        let mut parser = Parser::new();
        parser
            .set_language(&tree_sitter_javascript::LANGUAGE.into())
            .unwrap();
        parser.parse(source, None).unwrap()
    }

    #[test]
    fn test_first_error_reports_position() {
        let source = "const a = 1;\nexport default function Broken( {\n";
        let tree = parse(source);
        let pos = first_error(tree.root_node()).expect("syntax error");
        assert!(pos.row >= 2, "error should be on line 2 or later, got {pos:?}");
    }

    #[test]
    fn test_first_error_none_for_valid_source() {
        let tree = parse("export const x = <div />;\n");
        assert!(first_error(tree.root_node()).is_none());
    }

    #[test]
    fn test_renders_elements() {
        let source = "function A() { return <div />; }\nfunction B() { return React.createElement('div'); }\nfunction C() { return 1; }\n";
        let tree = parse(source);
        let root = tree.root_node();
        let funcs = named_children(root);
        assert!(renders_elements(funcs[0], source));
        assert!(renders_elements(funcs[1], source));
        assert!(!renders_elements(funcs[2], source));
    }

    #[test]
    fn test_string_value_strips_quotes() {
        let source = "x = 'md';";
        let tree = parse(source);
        let stmt = tree.root_node().named_child(0).unwrap();
        let assign = stmt.named_child(0).unwrap();
        let right = assign.child_by_field_name("right").unwrap();
        assert_eq!(string_value(right, source).as_deref(), Some("md"));
        assert!(is_literal(right));
    }
}
