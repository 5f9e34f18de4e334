//! @dose
//! purpose: Analyzer for TypeScript and TSX component modules. Props are read from
//!     TypeScript annotations in addition to PropTypes and defaults.
//!
//! when-editing:
//!     - !The tree-sitter language selection depends on file extension (tsx vs ts)
//!
//! invariants:
//!     - A source with any syntax error yields ExtractionError::Syntax
//!
//! gotchas:
//!     - TSX files need the tsx language variant for JSX support
//!     - `<T>value` casts are only legal in .ts, which is why .ts does not use the tsx grammar

use super::{analyze_with, ComponentAnalyzer, ComponentResolver, ExtractionError};
use crate::types::ComponentDoc;
use std::path::Path;
use tree_sitter::Parser;

/// Analyzer for TypeScript / TSX files
#[derive(Clone)]
pub struct TypeScriptAnalyzer {}

impl TypeScriptAnalyzer {
    pub fn new() -> Self {
        Self {}
    }

    fn create_parser(&self, is_tsx: bool) -> Result<Parser, ExtractionError> {
        let mut parser = Parser::new();
        let language = if is_tsx {
            tree_sitter_typescript::LANGUAGE_TSX.into()
        } else {
            tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into()
        };
        parser
            .set_language(&language)
            .map_err(|e| ExtractionError::Parser(e.to_string()))?;
        Ok(parser)
    }

    fn is_tsx(path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .map(|ext| ext == "tsx")
            .unwrap_or(false)
    }
}

impl Default for TypeScriptAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl ComponentAnalyzer for TypeScriptAnalyzer {
    fn language_name(&self) -> &'static str {
        "typescript"
    }

    fn file_extensions(&self) -> &[&'static str] {
        &["ts", "tsx"]
    }

    fn analyze(
        &self,
        source: &str,
        file_path: &Path,
        resolver: &dyn ComponentResolver,
    ) -> Result<ComponentDoc, ExtractionError> {
        let mut parser = self.create_parser(Self::is_tsx(file_path))?;
        analyze_with(&mut parser, source, resolver)
    }
}
