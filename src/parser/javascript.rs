//! @dose
//! purpose: Analyzer for JavaScript and JSX component modules, backed by the tree-sitter
//!     JavaScript grammar (which parses JSX natively).
//!
//! when-editing:
//!     - !The grammar is the same for .js and .jsx; extension only decides candidacy
//!
//! invariants:
//!     - A source with any syntax error yields ExtractionError::Syntax
//!
//! do-not:
//!     - Never panic on parse errors; return ExtractionError instead

use super::{analyze_with, ComponentAnalyzer, ComponentResolver, ExtractionError};
use crate::types::ComponentDoc;
use std::path::Path;
use tree_sitter::Parser;

/// Analyzer for JavaScript / JSX files
#[derive(Clone)]
pub struct JavaScriptAnalyzer {
    // Tree-sitter parser is not Clone, so we create it on demand
}

impl JavaScriptAnalyzer {
    pub fn new() -> Self {
        Self {}
    }

    fn create_parser(&self) -> Result<Parser, ExtractionError> {
        let mut parser = Parser::new();
        parser
            .set_language(&tree_sitter_javascript::LANGUAGE.into())
            .map_err(|e| ExtractionError::Parser(e.to_string()))?;
        Ok(parser)
    }
}

impl Default for JavaScriptAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl ComponentAnalyzer for JavaScriptAnalyzer {
    fn language_name(&self) -> &'static str {
        "javascript"
    }

    fn file_extensions(&self) -> &[&'static str] {
        &["js", "jsx", "mjs", "cjs"]
    }

    fn analyze(
        &self,
        source: &str,
        _file_path: &Path,
        resolver: &dyn ComponentResolver,
    ) -> Result<ComponentDoc, ExtractionError> {
        let mut parser = self.create_parser()?;
        analyze_with(&mut parser, source, resolver)
    }
}
