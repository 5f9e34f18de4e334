//! @dose
//! purpose: Locates the component definition a source file exports. The default strategy,
//!     FindExportedComponent, follows export statements and CommonJS assignments back to
//!     their module-scope definitions, unwrapping memo/forwardRef and other HOC calls.
//!
//! when-editing:
//!     - !A definition exported under several names (named + default) counts once
//!     - !Resolution must terminate: identifier chains are depth-limited
//!     - New strategies implement ComponentResolver; the extractor takes &dyn ComponentResolver
//!
//! invariants:
//!     - resolve() returns exactly one definition or an ExtractionError
//!     - Re-exports with a `from` clause never contribute definitions
//!
//! gotchas:
//!     - Classes count as components when they extend (Pure)Component or declare render()
//!     - Function components are recognised by rendering JSX or calling createElement
//!     - Unknown call wrappers are resolved through their last argument (withRouter(Button))

use super::syntax::{children, field, named_children, node_text, renders_elements, unwrap_expression};
use super::ExtractionError;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::{HashMap, HashSet};
use tree_sitter::Node;

const WRAPPERS: &[&str] = &["memo", "forwardRef"];
const CREATE_CLASS: &[&str] = &["createReactClass", "createClass"];
const MAX_DEPTH: usize = 16;

static COMPONENT_SUPERCLASS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\bextends\s+(?:React\s*\.\s*)?(?:Pure)?Component\b").unwrap()
});

/// How a component is defined
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefinitionKind {
    /// `class X extends React.Component`
    Class,
    /// Function declaration, function expression or arrow function
    Function,
    /// `createReactClass({ ... })`
    CreateClass,
}

/// A resolved component definition
#[derive(Debug, Clone)]
pub struct ComponentDefinition<'a> {
    /// The class, function or createReactClass call node
    pub node: Node<'a>,
    pub kind: DefinitionKind,
    /// Module-scope names bound to this component, outermost first
    pub names: Vec<String>,
    /// Variable declarator the definition is bound through, if any
    pub declarator: Option<Node<'a>>,
}

impl ComponentDefinition<'_> {
    /// Identifier of the definition itself (`function Button`), else the
    /// innermost module-scope name bound to it
    pub fn identifier(&self, source: &str) -> Option<String> {
        self.node
            .child_by_field_name("name")
            .map(|n| node_text(n, source))
            .or_else(|| self.names.last().cloned())
    }
}

/// A module-scope binding
#[derive(Debug, Clone, Copy)]
pub struct Binding<'a> {
    pub value: Node<'a>,
    pub declarator: Option<Node<'a>>,
}

/// Module-scope names: definitions and imports
#[derive(Debug, Default)]
pub struct Scope<'a> {
    pub bindings: HashMap<String, Binding<'a>>,
    /// Local import name -> module specifier
    pub imports: HashMap<String, String>,
}

impl<'a> Scope<'a> {
    pub fn from_program(program: Node<'a>, source: &str) -> Self {
        let mut scope = Scope::default();
        for node in named_children(program) {
            match node.kind() {
                "export_statement" => {
                    if let Some(decl) = node.child_by_field_name("declaration") {
                        scope.bind_declaration(decl, source);
                    }
                }
                "import_statement" => scope.bind_import(node, source),
                _ => scope.bind_declaration(node, source),
            }
        }
        scope
    }

    fn bind_declaration(&mut self, node: Node<'a>, source: &str) {
        match node.kind() {
            "function_declaration" | "generator_function_declaration" | "class_declaration" => {
                if let Some(name) = node.child_by_field_name("name") {
                    self.bindings.insert(
                        node_text(name, source),
                        Binding {
                            value: node,
                            declarator: None,
                        },
                    );
                }
            }
            "lexical_declaration" | "variable_declaration" => {
                for declarator in named_children(node) {
                    if declarator.kind() != "variable_declarator" {
                        continue;
                    }
                    let (Some(name), Some(value)) = (
                        declarator.child_by_field_name("name"),
                        declarator.child_by_field_name("value"),
                    ) else {
                        continue;
                    };
                    if name.kind() == "identifier" {
                        self.bindings.insert(
                            node_text(name, source),
                            Binding {
                                value,
                                declarator: Some(declarator),
                            },
                        );
                    }
                }
            }
            _ => {}
        }
    }

    fn bind_import(&mut self, node: Node<'a>, source: &str) {
        let Some(specifier) = node
            .child_by_field_name("source")
            .map(|s| {
                node_text(s, source)
                    .trim_matches(|c: char| c == '"' || c == '\'')
                    .to_string()
            })
        else {
            return;
        };
        let mut stack = named_children(node);
        while let Some(child) = stack.pop() {
            match child.kind() {
                "identifier" => {
                    self.imports.insert(node_text(child, source), specifier.clone());
                }
                "import_specifier" => {
                    if let Some(local) = field(child, &["alias", "name"]) {
                        self.imports.insert(node_text(local, source), specifier.clone());
                    }
                }
                "namespace_import" => {
                    if let Some(local) = named_children(child).into_iter().next() {
                        self.imports.insert(node_text(local, source), specifier.clone());
                    }
                }
                "import_clause" | "named_imports" => stack.extend(named_children(child)),
                _ => {}
            }
        }
    }

    pub fn lookup(&self, name: &str) -> Option<Binding<'a>> {
        self.bindings.get(name).copied()
    }
}

/// Strategy for locating the single component definition in a module
pub trait ComponentResolver: Send + Sync {
    fn resolve<'a>(
        &self,
        program: Node<'a>,
        scope: &Scope<'a>,
        source: &str,
    ) -> Result<ComponentDefinition<'a>, ExtractionError>;
}

/// Resolves the one component the module exports (ES module or CommonJS).
#[derive(Debug, Clone, Copy, Default)]
pub struct FindExportedComponent;

impl ComponentResolver for FindExportedComponent {
    fn resolve<'a>(
        &self,
        program: Node<'a>,
        scope: &Scope<'a>,
        source: &str,
    ) -> Result<ComponentDefinition<'a>, ExtractionError> {
        let mut found: Vec<ComponentDefinition<'a>> = Vec::new();
        let mut seen = HashSet::new();

        for (expr, name, declarator) in exported_values(program, scope, source) {
            let names = name.into_iter().collect();
            if let Some(def) = resolve_definition(expr, names, declarator, scope, source, 0) {
                if seen.insert(def.node.id()) {
                    found.push(def);
                }
            }
        }

        match found.len() {
            0 => Err(ExtractionError::NoComponent),
            1 => Ok(found.remove(0)),
            n => Err(ExtractionError::MultipleComponents(n)),
        }
    }
}

type Exported<'a> = (Node<'a>, Option<String>, Option<Node<'a>>);

/// Every exported value with the name and declarator it was exported through
fn exported_values<'a>(program: Node<'a>, scope: &Scope<'a>, source: &str) -> Vec<Exported<'a>> {
    let mut exported = Vec::new();

    for node in named_children(program) {
        match node.kind() {
            "export_statement" => {
                // `export { x } from './x'` re-exports another module
                if node.child_by_field_name("source").is_some() {
                    continue;
                }
                if let Some(decl) = node.child_by_field_name("declaration") {
                    exported.extend(declared_values(decl, source));
                } else if let Some(value) = node.child_by_field_name("value") {
                    exported.push((value, None, None));
                } else {
                    for clause in children(node) {
                        if clause.kind() != "export_clause" {
                            continue;
                        }
                        for item in named_children(clause) {
                            let Some(local) = item.child_by_field_name("name") else {
                                continue;
                            };
                            let local = node_text(local, source);
                            if let Some(binding) = scope.lookup(&local) {
                                exported.push((binding.value, Some(local), binding.declarator));
                            }
                        }
                    }
                }
            }
            "expression_statement" => {
                let Some(assign) = node.named_child(0) else {
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
                if is_commonjs_export(left, source) {
                    exported.push((right, None, None));
                }
            }
            _ => {}
        }
    }

    exported
}

fn declared_values<'a>(decl: Node<'a>, source: &str) -> Vec<Exported<'a>> {
    match decl.kind() {
        "function_declaration" | "generator_function_declaration" | "class_declaration" => {
            let name = decl.child_by_field_name("name").map(|n| node_text(n, source));
            vec![(decl, name, None)]
        }
        "lexical_declaration" | "variable_declaration" => named_children(decl)
            .into_iter()
            .filter(|d| d.kind() == "variable_declarator")
            .filter_map(|d| {
                let value = d.child_by_field_name("value")?;
                let name = d.child_by_field_name("name").map(|n| node_text(n, source));
                Some((value, name, Some(d)))
            })
            .collect(),
        _ => Vec::new(),
    }
}

/// `module.exports`, `module.exports.X`, `exports.X`
fn is_commonjs_export(left: Node, source: &str) -> bool {
    let text = node_text(left, source);
    text == "module.exports" || text.starts_with("module.exports.") || text.starts_with("exports.")
}

fn resolve_definition<'a>(
    node: Node<'a>,
    mut names: Vec<String>,
    declarator: Option<Node<'a>>,
    scope: &Scope<'a>,
    source: &str,
    depth: usize,
) -> Option<ComponentDefinition<'a>> {
    if depth > MAX_DEPTH {
        return None;
    }
    let node = unwrap_expression(node);

    match node.kind() {
        "identifier" => {
            let name = node_text(node, source);
            let binding = scope.lookup(&name)?;
            if !names.contains(&name) {
                names.push(name);
            }
            resolve_definition(
                binding.value,
                names,
                binding.declarator.or(declarator),
                scope,
                source,
                depth + 1,
            )
        }
        "function_declaration" | "function_expression" | "function" | "arrow_function"
        | "generator_function_declaration" => {
            renders_elements(node, source).then_some(ComponentDefinition {
                node,
                kind: DefinitionKind::Function,
                names,
                declarator,
            })
        }
        "class_declaration" | "class" => {
            is_component_class(node, source).then_some(ComponentDefinition {
                node,
                kind: DefinitionKind::Class,
                names,
                declarator,
            })
        }
        "call_expression" => {
            let callee = node.child_by_field_name("function")?;
            let callee_name = match callee.kind() {
                "identifier" => node_text(callee, source),
                "member_expression" => callee
                    .child_by_field_name("property")
                    .map(|p| node_text(p, source))
                    .unwrap_or_default(),
                // compose(a, b)(Button)
                "call_expression" => String::new(),
                _ => return None,
            };

            if CREATE_CLASS.contains(&callee_name.as_str()) {
                return Some(ComponentDefinition {
                    node,
                    kind: DefinitionKind::CreateClass,
                    names,
                    declarator,
                });
            }

            let args = named_children(node.child_by_field_name("arguments")?);
            let target = if WRAPPERS.contains(&callee_name.as_str()) {
                args.first().copied()
            } else {
                args.last().copied()
            }?;
            resolve_definition(target, names, declarator, scope, source, depth + 1)
        }
        _ => None,
    }
}

/// Extends (React.)Component / (React.)PureComponent, or declares render()
pub fn is_component_class(node: Node, source: &str) -> bool {
    let extends_component = children(node)
        .into_iter()
        .filter(|c| c.kind() == "class_heritage")
        .any(|heritage| COMPONENT_SUPERCLASS.is_match(&node_text(heritage, source)));
    if extends_component {
        return true;
    }

    node.child_by_field_name("body")
        .map(|body| {
            named_children(body).into_iter().any(|member| {
                member.kind() == "method_definition"
                    && member
                        .child_by_field_name("name")
                        .map(|n| node_text(n, source) == "render")
                        .unwrap_or(false)
            })
        })
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tree_sitter::{Parser, Tree};

    fn parse(source: &str) -> Tree {
        let mut parser = Parser::new();
        parser
            .set_language(&tree_sitter_javascript::LANGUAGE.into())
            .unwrap();
        parser.parse(source, None).unwrap()
    }

    fn resolve(source: &str) -> Result<(DefinitionKind, Option<String>), ExtractionError> {
        let tree = parse(source);
        let program = tree.root_node();
        let scope = Scope::from_program(program, source);
        FindExportedComponent
            .resolve(program, &scope, source)
            .map(|def| (def.kind, def.identifier(source)))
    }

    #[test]
    fn test_default_exported_function() {
        let source = "export default function Button() { return <button />; }\n";
        let (kind, name) = resolve(source).unwrap();
        assert_eq!(kind, DefinitionKind::Function);
        assert_eq!(name.as_deref(), Some("Button"));
    }

    #[test]
    fn test_identifier_export_through_memo() {
        let source = r#"
import React from 'react';
const Card = (props) => <div>{props.children}</div>;
export default React.memo(Card);
"#;
        let (kind, name) = resolve(source).unwrap();
        assert_eq!(kind, DefinitionKind::Function);
        assert_eq!(name.as_deref(), Some("Card"));
    }

    #[test]
    fn test_named_and_default_export_count_once() {
        let source = r#"
export class Modal extends React.Component { render() { return <div />; } }
export default Modal;
"#;
        let (kind, name) = resolve(source).unwrap();
        assert_eq!(kind, DefinitionKind::Class);
        assert_eq!(name.as_deref(), Some("Modal"));
    }

    #[test]
    fn test_commonjs_create_class() {
        let source = r#"
var Legacy = createReactClass({ render: function() { return <div />; } });
module.exports = Legacy;
"#;
        let (kind, name) = resolve(source).unwrap();
        assert_eq!(kind, DefinitionKind::CreateClass);
        assert_eq!(name.as_deref(), Some("Legacy"));
    }

    #[test]
    fn test_hoc_wrapped_export() {
        let source = r#"
function Profile() { return <section />; }
export default withRouter(connect(mapState)(Profile));
"#;
        let (_, name) = resolve(source).unwrap();
        assert_eq!(name.as_deref(), Some("Profile"));
    }

    #[test]
    fn test_export_clause() {
        let source = "const Tag = () => <span />;\nexport { Tag };\n";
        let (_, name) = resolve(source).unwrap();
        assert_eq!(name.as_deref(), Some("Tag"));
    }

    #[test]
    fn test_no_component() {
        let source = "export const add = (a, b) => a + b;\nexport default 42;\n";
        assert!(matches!(resolve(source), Err(ExtractionError::NoComponent)));

        // Unexported components do not count
        let source = "function Hidden() { return <div />; }\n";
        assert!(matches!(resolve(source), Err(ExtractionError::NoComponent)));
    }

    #[test]
    fn test_multiple_components() {
        let source = r#"
export const A = () => <a />;
export const B = () => <b />;
"#;
        assert!(matches!(
            resolve(source),
            Err(ExtractionError::MultipleComponents(2))
        ));
    }

    #[test]
    fn test_reexport_ignored() {
        let source = "export { default } from './Button';\nexport const Local = () => <i />;\n";
        let (_, name) = resolve(source).unwrap();
        assert_eq!(name.as_deref(), Some("Local"));
    }

    #[test]
    fn test_component_superclass() {
        for source in [
            "export default class A extends Component {}\n",
            "export default class A extends React.PureComponent {}\n",
            "export default class A extends Base { render() { return null; } }\n",
        ] {
            assert!(resolve(source).is_ok(), "{source}");
        }

        let source = "export default class Store extends ComponentRegistry {}\n";
        assert!(matches!(resolve(source), Err(ExtractionError::NoComponent)));
    }

    #[test]
    fn test_scope_imports() {
        let source = "import React, { Component as Base } from 'react';\nimport * as Shared from './shared';\n";
        let tree = parse(source);
        let scope = Scope::from_program(tree.root_node(), source);
        assert_eq!(scope.imports.get("React").map(String::as_str), Some("react"));
        assert_eq!(scope.imports.get("Base").map(String::as_str), Some("react"));
        assert_eq!(scope.imports.get("Shared").map(String::as_str), Some("./shared"));
    }
}
