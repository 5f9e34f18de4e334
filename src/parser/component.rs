//! @dose
//! purpose: Builds the ComponentDoc for a resolved definition: description, displayName,
//!     methods, and the property table assembled from PropTypes, TypeScript types and
//!     default values.
//!
//! when-editing:
//!     - !Application order matters: PropTypes, then TypeScript members, then destructured
//!       parameter defaults, then defaultProps (later sources override earlier defaults)
//!     - !PropTypes decide `required` when present; TypeScript optionality only fills the gap
//!     - Statics are gathered from class bodies, createReactClass objects and `X.prop = ...`
//!       assignments on every module-scope name of the component
//!
//! invariants:
//!     - Output is a pure function of the source text (no IO, no global state)
//!     - Lifecycle methods and private `#methods` are never listed
//!
//! gotchas:
//!     - propTypes/defaultProps may be identifiers bound to module-scope objects
//!     - `...Other.propTypes` spreads record the import specifier of Other in `composes`

use super::docblock::leading_docblock;
use super::prop_types::resolve_prop_type;
use super::resolver::{ComponentDefinition, DefinitionKind, Scope};
use super::syntax::{
    children, field, has_keyword, is_literal, named_children, node_text, property_key,
    string_value, unwrap_expression,
};
use super::ts_types::props_members;
use crate::types::{ComponentDoc, DefaultValue, MethodDoc, MethodParam, TypeDescriptor};
use tree_sitter::Node;

const LIFECYCLE: &[&str] = &[
    "constructor",
    "render",
    "componentDidMount",
    "componentDidUpdate",
    "componentWillUnmount",
    "shouldComponentUpdate",
    "getSnapshotBeforeUpdate",
    "componentDidCatch",
    "getDerivedStateFromProps",
    "getDerivedStateFromError",
    "componentWillMount",
    "componentWillReceiveProps",
    "componentWillUpdate",
    "UNSAFE_componentWillMount",
    "UNSAFE_componentWillReceiveProps",
    "UNSAFE_componentWillUpdate",
    "getDefaultProps",
    "getInitialState",
    "getChildContext",
];

/// Members with meaning to React rather than to callers
const STATIC_KEYS: &[&str] = &[
    "propTypes",
    "defaultProps",
    "displayName",
    "contextTypes",
    "childContextTypes",
    "contextType",
    "mixins",
    "statics",
];

/// Higher-order types whose first type argument is the props type
const COMPONENT_TYPES: &[&str] = &[
    "FC",
    "FunctionComponent",
    "VFC",
    "VoidFunctionComponent",
    "ComponentType",
];

const MAX_SPREAD_DEPTH: usize = 4;

#[derive(Default)]
struct Statics<'a> {
    prop_types: Vec<Node<'a>>,
    default_props: Vec<Node<'a>>,
    display_name: Option<String>,
}

impl<'a> Statics<'a> {
    fn record(&mut self, key: &str, value: Node<'a>, source: &str) {
        match key {
            "propTypes" => self.prop_types.push(value),
            "defaultProps" => self.default_props.push(value),
            "displayName" => {
                if let Some(name) = string_value(unwrap_expression(value), source) {
                    self.display_name = Some(name);
                }
            }
            _ => {}
        }
    }
}

/// Document a resolved component definition
pub fn document_component(
    program: Node,
    def: &ComponentDefinition,
    scope: &Scope,
    source: &str,
) -> ComponentDoc {
    let mut doc = ComponentDoc {
        description: leading_docblock(def.node, source).unwrap_or_default(),
        ..Default::default()
    };
    let mut statics = Statics::default();

    match def.kind {
        DefinitionKind::Class => {
            collect_class_statics(def.node, source, &mut statics);
            doc.methods = class_methods(def.node, source);
        }
        DefinitionKind::CreateClass => {
            if let Some(class_object) = create_class_object(def.node) {
                collect_object_statics(class_object, source, &mut statics);
                doc.methods = object_methods(class_object, source);
            }
        }
        DefinitionKind::Function => {}
    }
    collect_assigned_statics(program, &def.names, source, &mut statics);

    doc.display_name = statics
        .display_name
        .clone()
        .or_else(|| def.identifier(source));

    for value in &statics.prop_types {
        if let Some(object) = resolve_object(*value, scope, source) {
            apply_prop_types(&mut doc, object, scope, source, 0);
        }
    }

    if let Some(props_type) = props_type_node(def, source) {
        for member in props_members(props_type, program, source) {
            let prop = doc.prop_mut(&member.name);
            if prop.prop_type.is_none() {
                prop.required = !member.optional;
            }
            prop.ts_type = Some(member.ty);
            if prop.description.is_empty() {
                if let Some(description) = member.description {
                    prop.description = description;
                }
            }
        }
    }

    if def.kind == DefinitionKind::Function {
        apply_parameter_defaults(&mut doc, def.node, source);
    }

    for value in &statics.default_props {
        if let Some(object) = resolve_object(*value, scope, source) {
            apply_default_props(&mut doc, object, source);
        }
    }

    doc
}

/// The object literal a value stands for: the literal itself or a module-scope
/// binding to one
fn resolve_object<'a>(node: Node<'a>, scope: &Scope<'a>, source: &str) -> Option<Node<'a>> {
    let node = unwrap_expression(node);
    match node.kind() {
        "object" => Some(node),
        "identifier" => {
            let binding = scope.lookup(&node_text(node, source))?;
            let value = unwrap_expression(binding.value);
            (value.kind() == "object").then_some(value)
        }
        _ => None,
    }
}

/// Object returned by a function or method (`getDefaultProps() { return {...} }`)
fn returned_object(function: Node) -> Option<Node> {
    let body = function.child_by_field_name("body")?;
    if body.kind() != "statement_block" {
        // Arrow function with expression body: () => ({ ... })
        let value = unwrap_expression(body);
        return (value.kind() == "object").then_some(value);
    }
    named_children(body)
        .into_iter()
        .filter(|stmt| stmt.kind() == "return_statement")
        .find_map(|stmt| {
            let value = unwrap_expression(stmt.named_child(0)?);
            (value.kind() == "object").then_some(value)
        })
}

fn class_member_name(member: Node, source: &str) -> Option<String> {
    property_key(field(member, &["name", "property"])?, source)
}

fn collect_class_statics<'a>(class: Node<'a>, source: &str, statics: &mut Statics<'a>) {
    let Some(body) = class.child_by_field_name("body") else {
        return;
    };
    for member in named_children(body) {
        if !has_keyword(member, "static") {
            continue;
        }
        let Some(name) = class_member_name(member, source) else {
            continue;
        };
        match member.kind() {
            "field_definition" | "public_field_definition" => {
                if let Some(value) = member.child_by_field_name("value") {
                    statics.record(&name, value, source);
                }
            }
            // static get propTypes() { return {...} }
            "method_definition" if has_keyword(member, "get") => {
                if let Some(object) = returned_object(member) {
                    statics.record(&name, object, source);
                }
            }
            _ => {}
        }
    }
}

fn create_class_object(call: Node) -> Option<Node> {
    let class_object = unwrap_expression(call.child_by_field_name("arguments")?.named_child(0)?);
    (class_object.kind() == "object").then_some(class_object)
}

fn collect_object_statics<'a>(class_object: Node<'a>, source: &str, statics: &mut Statics<'a>) {
    for member in named_children(class_object) {
        let Some(key) = field(member, &["key", "name"]).and_then(|k| property_key(k, source))
        else {
            continue;
        };
        match (member.kind(), key.as_str()) {
            ("method_definition", "getDefaultProps") => {
                if let Some(object) = returned_object(member) {
                    statics.default_props.push(object);
                }
            }
            ("pair", "getDefaultProps") => {
                if let Some(object) = member
                    .child_by_field_name("value")
                    .and_then(|f| returned_object(unwrap_expression(f)))
                {
                    statics.default_props.push(object);
                }
            }
            ("pair", _) => {
                if let Some(value) = member.child_by_field_name("value") {
                    statics.record(&key, value, source);
                }
            }
            _ => {}
        }
    }
}

fn collect_assigned_statics<'a>(
    program: Node<'a>,
    names: &[String],
    source: &str,
    statics: &mut Statics<'a>,
) {
    for stmt in named_children(program) {
        if stmt.kind() != "expression_statement" {
            continue;
        }
        let Some(assign) = stmt.named_child(0) else {
            continue;
        };
        if assign.kind() != "assignment_expression" {
            continue;
        }
        let (Some(left), Some(right)) = (
            assign.child_by_field_name("left"),
            assign.child_by_field_name("right"),
        ) else {
            continue;
        };
        if left.kind() != "member_expression" {
            continue;
        }
        let (Some(object), Some(property)) = (
            left.child_by_field_name("object"),
            left.child_by_field_name("property"),
        ) else {
            continue;
        };
        if object.kind() == "identifier" && names.contains(&node_text(object, source)) {
            statics.record(&node_text(property, source), right, source);
        }
    }
}

fn apply_prop_types(
    doc: &mut ComponentDoc,
    object: Node,
    scope: &Scope,
    source: &str,
    depth: usize,
) {
    for member in named_children(object) {
        match member.kind() {
            "pair" => {
                let (Some(key), Some(value)) = (
                    member.child_by_field_name("key"),
                    member.child_by_field_name("value"),
                ) else {
                    continue;
                };
                let Some(name) = property_key(key, source) else {
                    continue;
                };
                let (prop_type, required) = resolve_prop_type(value, source);
                let prop = doc.prop_mut(&name);
                prop.prop_type = Some(prop_type);
                prop.required = required;
                if let Some(description) = leading_docblock(member, source) {
                    prop.description = description;
                }
            }
            "shorthand_property_identifier" => {
                let name = node_text(member, source);
                let prop = doc.prop_mut(&name);
                prop.prop_type = Some(TypeDescriptor::named("custom").with_raw(name.clone()));
            }
            "spread_element" => {
                let Some(argument) = member.named_child(0).map(unwrap_expression) else {
                    continue;
                };
                apply_spread(doc, argument, scope, source, depth);
            }
            _ => {}
        }
    }
}

fn apply_spread(doc: &mut ComponentDoc, argument: Node, scope: &Scope, source: &str, depth: usize) {
    if depth >= MAX_SPREAD_DEPTH {
        return;
    }
    match argument.kind() {
        // ...Other.propTypes
        "member_expression" => {
            let Some(object) = argument.child_by_field_name("object") else {
                return;
            };
            if object.kind() != "identifier" {
                return;
            }
            if let Some(module) = scope.imports.get(&node_text(object, source)) {
                if !doc.composes.contains(module) {
                    doc.composes.push(module.clone());
                }
            }
        }
        // ...sharedPropTypes
        "identifier" => {
            if let Some(object) = resolve_object(argument, scope, source) {
                apply_prop_types(doc, object, scope, source, depth + 1);
            } else if let Some(module) = scope.imports.get(&node_text(argument, source)) {
                if !doc.composes.contains(module) {
                    doc.composes.push(module.clone());
                }
            }
        }
        _ => {}
    }
}

fn apply_default_props(doc: &mut ComponentDoc, object: Node, source: &str) {
    for member in named_children(object) {
        match member.kind() {
            "pair" => {
                let (Some(key), Some(value)) = (
                    member.child_by_field_name("key"),
                    member.child_by_field_name("value"),
                ) else {
                    continue;
                };
                if let Some(name) = property_key(key, source) {
                    doc.prop_mut(&name).default_value = Some(default_value(value, source));
                }
            }
            "shorthand_property_identifier" => {
                let name = node_text(member, source);
                doc.prop_mut(&name).default_value = Some(DefaultValue {
                    value: name.clone(),
                    computed: true,
                });
            }
            _ => {}
        }
    }
}

fn default_value(value: Node, source: &str) -> DefaultValue {
    DefaultValue {
        value: node_text(value, source),
        computed: !is_literal(value),
    }
}

fn first_parameter(function: Node) -> Option<Node> {
    if let Some(param) = function.child_by_field_name("parameter") {
        return Some(param);
    }
    let params = function.child_by_field_name("parameters")?;
    named_children(params)
        .into_iter()
        .find(|p| p.kind() != "comment")
}

/// Defaults written in the destructured props parameter: `({ size = 'md' })`
fn apply_parameter_defaults(doc: &mut ComponentDoc, function: Node, source: &str) {
    let Some(mut pattern) = first_parameter(function) else {
        return;
    };
    if matches!(pattern.kind(), "required_parameter" | "optional_parameter") {
        match pattern.child_by_field_name("pattern") {
            Some(inner) => pattern = inner,
            None => return,
        }
    }
    if pattern.kind() == "assignment_pattern" {
        match pattern.child_by_field_name("left") {
            Some(left) => pattern = left,
            None => return,
        }
    }
    if pattern.kind() != "object_pattern" {
        return;
    }

    for member in named_children(pattern) {
        match member.kind() {
            "object_assignment_pattern" => {
                let (Some(left), Some(right)) = (
                    member.child_by_field_name("left"),
                    member.child_by_field_name("right"),
                ) else {
                    continue;
                };
                let name = node_text(left, source);
                doc.prop_mut(&name).default_value = Some(default_value(right, source));
            }
            // { size: s = 'md' }
            "pair_pattern" => {
                let (Some(key), Some(value)) = (
                    member.child_by_field_name("key"),
                    member.child_by_field_name("value"),
                ) else {
                    continue;
                };
                if value.kind() != "assignment_pattern" {
                    continue;
                }
                let (Some(name), Some(right)) =
                    (property_key(key, source), value.child_by_field_name("right"))
                else {
                    continue;
                };
                doc.prop_mut(&name).default_value = Some(default_value(right, source));
            }
            _ => {}
        }
    }
}

/// Where the props type of a component is written, if anywhere
fn props_type_node<'a>(def: &ComponentDefinition<'a>, source: &str) -> Option<Node<'a>> {
    match def.kind {
        DefinitionKind::Function => {
            let annotated = first_parameter(def.node)
                .filter(|p| matches!(p.kind(), "required_parameter" | "optional_parameter"))
                .and_then(|p| p.child_by_field_name("type"));
            annotated.or_else(|| {
                // const Button: React.FC<ButtonProps> = ...
                let annotation = def.declarator?.child_by_field_name("type")?;
                let ty = annotation.named_child(0)?;
                if ty.kind() != "generic_type" {
                    return None;
                }
                let name = node_text(ty.child_by_field_name("name")?, source);
                let base = name.rsplit('.').next().unwrap_or(&name);
                if !COMPONENT_TYPES.contains(&base) {
                    return None;
                }
                ty.child_by_field_name("type_arguments")?.named_child(0)
            })
        }
        // class Button extends React.Component<ButtonProps, State>
        DefinitionKind::Class => children(def.node)
            .into_iter()
            .find(|c| c.kind() == "class_heritage")
            .and_then(find_type_arguments)
            .and_then(|args| args.named_child(0)),
        DefinitionKind::CreateClass => None,
    }
}

fn find_type_arguments(node: Node) -> Option<Node> {
    if node.kind() == "type_arguments" {
        return Some(node);
    }
    children(node).into_iter().find_map(find_type_arguments)
}

fn class_methods(class: Node, source: &str) -> Vec<MethodDoc> {
    let Some(body) = class.child_by_field_name("body") else {
        return Vec::new();
    };

    let mut methods = Vec::new();
    for member in named_children(body) {
        let Some(name) = class_member_name(member, source) else {
            continue;
        };
        if !is_documentable(&name) {
            continue;
        }
        match member.kind() {
            "method_definition" => methods.push(method_doc(name, member, member, source)),
            // handleClick = () => { ... }
            "field_definition" | "public_field_definition" => {
                let Some(value) = member.child_by_field_name("value").map(unwrap_expression) else {
                    continue;
                };
                if matches!(value.kind(), "arrow_function" | "function_expression" | "function") {
                    methods.push(method_doc(name, member, value, source));
                }
            }
            _ => {}
        }
    }
    methods
}

fn object_methods(class_object: Node, source: &str) -> Vec<MethodDoc> {
    let mut methods = Vec::new();
    for member in named_children(class_object) {
        let Some(name) = field(member, &["name", "key"]).and_then(|k| property_key(k, source))
        else {
            continue;
        };
        if !is_documentable(&name) {
            continue;
        }
        match member.kind() {
            "method_definition" => methods.push(method_doc(name, member, member, source)),
            "pair" => {
                let Some(value) = member.child_by_field_name("value").map(unwrap_expression) else {
                    continue;
                };
                if matches!(value.kind(), "arrow_function" | "function_expression" | "function") {
                    methods.push(method_doc(name, member, value, source));
                }
            }
            _ => {}
        }
    }
    methods
}

fn is_documentable(name: &str) -> bool {
    !name.starts_with('#') && !LIFECYCLE.contains(&name) && !STATIC_KEYS.contains(&name)
}

/// `member` carries modifiers and docs, `function` carries the parameters
fn method_doc(name: String, member: Node, function: Node, source: &str) -> MethodDoc {
    let mut modifiers = Vec::new();
    for keyword in ["static", "async", "get", "set"] {
        if has_keyword(member, keyword) || has_keyword(function, keyword) {
            modifiers.push(keyword.to_string());
        }
    }
    if has_keyword(member, "*") {
        modifiers.push("generator".to_string());
    }

    MethodDoc {
        name,
        description: leading_docblock(member, source),
        modifiers,
        params: method_params(function, source),
    }
}

fn method_params(function: Node, source: &str) -> Vec<MethodParam> {
    if let Some(param) = function.child_by_field_name("parameter") {
        return vec![MethodParam {
            name: node_text(param, source),
            optional: false,
        }];
    }
    let Some(params) = function.child_by_field_name("parameters") else {
        return Vec::new();
    };

    named_children(params)
        .into_iter()
        .filter_map(|param| {
            let (name, optional) = match param.kind() {
                "identifier" | "rest_pattern" | "object_pattern" | "array_pattern" => {
                    (node_text(param, source), false)
                }
                "assignment_pattern" => (node_text(param.child_by_field_name("left")?, source), true),
                "required_parameter" => (
                    node_text(param.child_by_field_name("pattern")?, source),
                    param.child_by_field_name("value").is_some(),
                ),
                "optional_parameter" => {
                    (node_text(param.child_by_field_name("pattern")?, source), true)
                }
                _ => return None,
            };
            Some(MethodParam { name, optional })
        })
        .collect()
}
