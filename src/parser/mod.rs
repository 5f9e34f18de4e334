//! @dose
//! purpose: This module is the static extractor. It defines the ComponentAnalyzer trait that
//!     language analyzers implement, the AnalyzerFactory that selects one by file extension,
//!     and extract_component, which reads a file and returns its ComponentDoc or an
//!     ExtractionError.
//!
//! when-editing:
//!     - !When adding an analyzer, register it in AnalyzerFactory::new()
//!     - !Analyzers must reject sources with syntax errors instead of documenting a partial tree
//!     - Each analyzer is stored as Arc<dyn ComponentAnalyzer> for sharing across threads
//!
//! invariants:
//!     - Every file extension maps to exactly one analyzer
//!     - Extraction is deterministic: the same text always gives the same result or error
//!     - The only side effect of extract_component is reading the file
//!
//! gotchas:
//!     - tree-sitter recovers from syntax errors, so error nodes are checked explicitly
//!     - Extensions are stored without the leading dot (e.g., "jsx" not ".jsx")
//!
//! flows:
//!     - Extract: read file -> pick analyzer -> parse -> resolve definition -> document

mod component;
mod docblock;
mod javascript;
mod prop_types;
pub mod resolver;
mod syntax;
mod ts_types;
mod typescript;

use crate::types::ComponentDoc;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;
use tree_sitter::Parser;

pub use javascript::JavaScriptAnalyzer;
pub use resolver::{ComponentResolver, FindExportedComponent};
pub use typescript::TypeScriptAnalyzer;

#[derive(Error, Debug)]
pub enum ExtractionError {
    #[error("Failed to read file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Syntax error at line {line}, column {column}")]
    Syntax { line: usize, column: usize },
    #[error("No suitable component definition found")]
    NoComponent,
    #[error("Multiple exported component definitions found ({0})")]
    MultipleComponents(usize),
    #[error("Unsupported language for extension: {0}")]
    UnsupportedLanguage(String),
    #[error("Failed to parse source: {0}")]
    Parser(String),
}

/// Static analyzer for one family of source languages
pub trait ComponentAnalyzer: Send + Sync {
    /// Returns the language name (e.g., "javascript", "typescript")
    fn language_name(&self) -> &'static str;

    /// Returns file extensions this analyzer handles
    fn file_extensions(&self) -> &[&'static str];

    /// Extract the documentation of the component `source` exports
    fn analyze(
        &self,
        source: &str,
        file_path: &Path,
        resolver: &dyn ComponentResolver,
    ) -> Result<ComponentDoc, ExtractionError>;
}

/// Parse with a configured parser, reject syntax errors, resolve and document
fn analyze_with(
    parser: &mut Parser,
    source: &str,
    resolver: &dyn ComponentResolver,
) -> Result<ComponentDoc, ExtractionError> {
    let tree = parser
        .parse(source, None)
        .ok_or_else(|| ExtractionError::Parser("Failed to parse source".to_string()))?;
    let program = tree.root_node();

    if let Some(pos) = syntax::first_error(program) {
        return Err(ExtractionError::Syntax {
            line: pos.row,
            column: pos.column,
        });
    }

    let scope = resolver::Scope::from_program(program, source);
    let definition = resolver.resolve(program, &scope, source)?;
    Ok(component::document_component(
        program,
        &definition,
        &scope,
        source,
    ))
}

/// Factory for selecting analyzers by extension
pub struct AnalyzerFactory {
    analyzers: HashMap<String, Arc<dyn ComponentAnalyzer>>,
}

impl AnalyzerFactory {
    pub fn new() -> Self {
        let mut analyzers: HashMap<String, Arc<dyn ComponentAnalyzer>> = HashMap::new();

        let js: Arc<dyn ComponentAnalyzer> = Arc::new(JavaScriptAnalyzer::new());
        for ext in js.file_extensions() {
            analyzers.insert(ext.to_string(), Arc::clone(&js));
        }

        let ts: Arc<dyn ComponentAnalyzer> = Arc::new(TypeScriptAnalyzer::new());
        for ext in ts.file_extensions() {
            analyzers.insert(ext.to_string(), Arc::clone(&ts));
        }

        Self { analyzers }
    }

    /// Get analyzer for a file path based on extension
    pub fn get_analyzer(&self, file_path: &Path) -> Option<&dyn ComponentAnalyzer> {
        let ext = file_path.extension()?.to_str()?;
        self.analyzers.get(ext).map(|a| a.as_ref())
    }

    /// Check if an extension (without dot) is supported
    pub fn supports_extension(&self, ext: &str) -> bool {
        self.analyzers.contains_key(ext)
    }

    /// Get all supported extensions, sorted
    pub fn supported_extensions(&self) -> Vec<&str> {
        let mut exts: Vec<&str> = self.analyzers.keys().map(|s| s.as_str()).collect();
        exts.sort_unstable();
        exts
    }
}

impl Default for AnalyzerFactory {
    fn default() -> Self {
        Self::new()
    }
}

/// Read `path` and extract the documentation of the component it exports
pub fn extract_component(
    path: &Path,
    factory: &AnalyzerFactory,
    resolver: &dyn ComponentResolver,
) -> Result<ComponentDoc, ExtractionError> {
    let analyzer = factory.get_analyzer(path).ok_or_else(|| {
        ExtractionError::UnsupportedLanguage(
            path.extension()
                .map(|e| e.to_string_lossy().to_string())
                .unwrap_or_default(),
        )
    })?;
    let source = fs::read_to_string(path)?;
    analyzer.analyze(&source, path, resolver)
}
