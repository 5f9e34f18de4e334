//! Doc comment handling shared by the component and prop extraction passes.
//!
//! Only `/** ... */` blocks count as documentation; line comments and plain
//! `/* */` blocks are ignored.

use tree_sitter::Node;

/// Strip the comment delimiters and leading `*` gutters from a JSDoc block.
/// Returns None when the comment is not a doc block.
pub fn parse_docblock(comment: &str) -> Option<String> {
    let body = comment.trim().strip_prefix("/**")?.strip_suffix("*/")?;

    let lines: Vec<&str> = body
        .lines()
        .map(|line| {
            let trimmed = line.trim();
            let trimmed = trimmed.strip_prefix('*').unwrap_or(trimmed);
            trimmed.strip_prefix(' ').unwrap_or(trimmed).trim_end()
        })
        .collect();

    // Drop blank leading/trailing lines, keep inner paragraph breaks
    let start = lines.iter().position(|l| !l.is_empty()).unwrap_or(lines.len());
    let end = lines
        .iter()
        .rposition(|l| !l.is_empty())
        .map(|i| i + 1)
        .unwrap_or(start);

    Some(lines[start..end].join("\n"))
}

/// Doc block attached to `node`: the comment immediately preceding it, skipping
/// nothing but whitespace. Walks out through wrapping statements (export,
/// variable declaration, expression statement) so the comment above
/// `export const Button = ...` documents the arrow function inside.
pub fn leading_docblock(node: Node, source: &str) -> Option<String> {
    let mut current = node;
    loop {
        if let Some(doc) = preceding_doc(current, source) {
            return Some(doc);
        }
        let parent = current.parent()?;
        match parent.kind() {
            "export_statement"
            | "lexical_declaration"
            | "variable_declaration"
            | "variable_declarator"
            | "expression_statement"
            | "assignment_expression"
            | "call_expression"
            | "arguments"
            | "parenthesized_expression" => current = parent,
            _ => return None,
        }
    }
}

fn preceding_doc(node: Node, source: &str) -> Option<String> {
    let prev = node.prev_sibling()?;
    if prev.kind() != "comment" {
        return None;
    }
    // Only blank space may separate the comment from the node
    let between = source.get(prev.end_byte()..node.start_byte())?;
    if !between.trim().is_empty() {
        return None;
    }
    parse_docblock(&source[prev.start_byte()..prev.end_byte()])
}
