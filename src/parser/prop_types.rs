//! Conversion of PropTypes validator expressions into type descriptors.
//!
//! Handles both the namespaced form (`PropTypes.string.isRequired`) and named
//! imports from `prop-types` (`string.isRequired`).

use super::docblock::leading_docblock;
use super::syntax::{is_literal, named_children, node_text, property_key, unwrap_expression};
use crate::types::TypeDescriptor;
use serde_json::{json, Map, Value};
use tree_sitter::Node;

const PRIMITIVES: &[&str] = &[
    "any",
    "array",
    "bigint",
    "bool",
    "element",
    "elementType",
    "func",
    "node",
    "number",
    "object",
    "string",
    "symbol",
];

/// Describe a validator, returning the descriptor and whether it ends in `.isRequired`
pub fn resolve_prop_type(node: Node, source: &str) -> (TypeDescriptor, bool) {
    let node = unwrap_expression(node);
    if let Some(inner) = strip_is_required(node, source) {
        return (describe(inner, source), true);
    }
    (describe(node, source), false)
}

fn strip_is_required<'a>(node: Node<'a>, source: &str) -> Option<Node<'a>> {
    if node.kind() != "member_expression" {
        return None;
    }
    let property = node.child_by_field_name("property")?;
    if node_text(property, source) != "isRequired" {
        return None;
    }
    node.child_by_field_name("object")
}

/// Name of the validator: `string` for both `PropTypes.string` and `string`
fn validator_name(node: Node, source: &str) -> Option<String> {
    match node.kind() {
        "identifier" => Some(node_text(node, source)),
        "member_expression" => node
            .child_by_field_name("property")
            .map(|p| node_text(p, source)),
        _ => None,
    }
}

fn custom(node: Node, source: &str) -> TypeDescriptor {
    TypeDescriptor::named("custom").with_raw(node_text(node, source))
}

fn describe(node: Node, source: &str) -> TypeDescriptor {
    let node = unwrap_expression(node);
    match node.kind() {
        "identifier" | "member_expression" => match validator_name(node, source) {
            Some(name) if PRIMITIVES.contains(&name.as_str()) => TypeDescriptor::named(name),
            _ => custom(node, source),
        },
        "call_expression" => describe_call(node, source).unwrap_or_else(|| custom(node, source)),
        _ => custom(node, source),
    }
}

fn describe_call(node: Node, source: &str) -> Option<TypeDescriptor> {
    let callee = node.child_by_field_name("function")?;
    let name = validator_name(callee, source)?;
    let argument = node
        .child_by_field_name("arguments")
        .and_then(|args| args.named_child(0))
        .map(unwrap_expression);

    let descriptor = match (name.as_str(), argument) {
        ("oneOf", Some(arg)) if arg.kind() == "array" => {
            let members: Vec<Value> = named_children(arg)
                .into_iter()
                .filter(|el| el.kind() != "comment")
                .map(|el| {
                    json!({
                        "value": node_text(el, source),
                        "computed": !is_literal(el),
                    })
                })
                .collect();
            TypeDescriptor::named("enum").with_value(Value::Array(members))
        }
        // oneOf(SOME_CONSTANT): the member list is not statically known
        ("oneOf", Some(arg)) => TypeDescriptor::named("enum")
            .with_value(Value::String(node_text(arg, source)))
            .with_raw(node_text(node, source)),
        ("oneOfType", Some(arg)) if arg.kind() == "array" => {
            let members: Vec<Value> = named_children(arg)
                .into_iter()
                .filter(|el| el.kind() != "comment")
                .map(|el| describe(el, source).to_value())
                .collect();
            TypeDescriptor::named("union").with_value(Value::Array(members))
        }
        ("arrayOf" | "objectOf", Some(arg)) => {
            let (inner, required) = resolve_prop_type(arg, source);
            let mut value = inner.to_value();
            if required {
                value["required"] = Value::Bool(true);
            }
            TypeDescriptor::named(name.clone()).with_value(value)
        }
        ("shape" | "exact", Some(arg)) if arg.kind() == "object" => {
            TypeDescriptor::named(name.clone()).with_value(Value::Object(shape_members(arg, source)))
        }
        ("instanceOf", Some(arg)) => {
            TypeDescriptor::named("instanceOf").with_value(Value::String(node_text(arg, source)))
        }
        _ => return None,
    };

    Some(descriptor)
}

fn shape_members(object: Node, source: &str) -> Map<String, Value> {
    let mut members = Map::new();
    for pair in named_children(object) {
        if pair.kind() != "pair" {
            continue;
        }
        let (Some(key), Some(value)) = (
            pair.child_by_field_name("key"),
            pair.child_by_field_name("value"),
        ) else {
            continue;
        };
        let Some(key) = property_key(key, source) else {
            continue;
        };

        let (descriptor, required) = resolve_prop_type(value, source);
        let mut entry = descriptor.to_value();
        entry["required"] = Value::Bool(required);
        if let Some(doc) = leading_docblock(pair, source) {
            entry["description"] = Value::String(doc);
        }
        members.insert(key, entry);
    }
    members
}

#[cfg(test)]
mod tests {
    use super::*;
    use tree_sitter::Parser;

    /// Parse `x = <expr>;` and return the descriptor of `<expr>`
    fn describe_source(expr: &str) -> (TypeDescriptor, bool) {
        let source = format!("x = {expr};");
        let mut parser = Parser::new();
        parser
            .set_language(&tree_sitter_javascript::LANGUAGE.into())
            .unwrap();
        let tree = parser.parse(&source, None).unwrap();
        let stmt = tree.root_node().named_child(0).unwrap();
        let assign = stmt.named_child(0).unwrap();
        let right = assign.child_by_field_name("right").unwrap();
        resolve_prop_type(right, &source)
    }

    #[test]
    fn test_primitive_required() {
        let (ty, required) = describe_source("PropTypes.string.isRequired");
        assert_eq!(ty, TypeDescriptor::named("string"));
        assert!(required);

        let (ty, required) = describe_source("bool");
        assert_eq!(ty, TypeDescriptor::named("bool"));
        assert!(!required);
    }

    #[test]
    fn test_one_of_literal_members() {
        let (ty, required) = describe_source("PropTypes.oneOf(['sm', 'md', SIZE])");
        assert_eq!(ty.name, "enum");
        assert!(!required);
        assert_eq!(
            ty.value.unwrap(),
            json!([
                {"value": "'sm'", "computed": false},
                {"value": "'md'", "computed": false},
                {"value": "SIZE", "computed": true},
            ])
        );
    }

    #[test]
    fn test_one_of_constant_is_opaque() {
        let (ty, _) = describe_source("PropTypes.oneOf(SIZES)");
        assert_eq!(ty.name, "enum");
        assert_eq!(ty.value.unwrap(), json!("SIZES"));
    }

    #[test]
    fn test_nested_validators() {
        let (ty, required) =
            describe_source("PropTypes.arrayOf(PropTypes.oneOfType([PropTypes.string, PropTypes.number])).isRequired");
        assert!(required);
        assert_eq!(ty.name, "arrayOf");
        assert_eq!(
            ty.value.unwrap(),
            json!({"name": "union", "value": [{"name": "string"}, {"name": "number"}]})
        );
    }

    #[test]
    fn test_shape_members() {
        let (ty, _) = describe_source(
            "PropTypes.shape({\n  /** User id */\n  id: PropTypes.number.isRequired,\n  name: PropTypes.string,\n})",
        );
        assert_eq!(ty.name, "shape");
        assert_eq!(
            ty.value.unwrap(),
            json!({
                "id": {"name": "number", "required": true, "description": "User id"},
                "name": {"name": "string", "required": false},
            })
        );
    }

    #[test]
    fn test_unknown_validator_is_custom() {
        let (ty, required) = describe_source("customValidator");
        assert_eq!(ty.name, "custom");
        assert_eq!(ty.raw.as_deref(), Some("customValidator"));
        assert!(!required);

        let (ty, _) = describe_source("PropTypes.instanceOf(Date)");
        assert_eq!(ty.name, "instanceOf");
        assert_eq!(ty.value.unwrap(), json!("Date"));
    }
}
