//! @dose
//! purpose: This is the library crate root for compdoc, exposing the extractor, the annotation
//!     registry and the doc aggregator for use both by the generate-docs binary and as a
//!     library. It re-exports the types most callers need.
//!
//! when-editing:
//!     - !All public modules must be declared here with pub mod
//!     - !Re-exports should include commonly used types and functions
//!     - Keep the re-export list organized by module
//!
//! invariants:
//!     - All analyzers are reachable through AnalyzerFactory
//!     - The binary uses nothing that is not reachable from this crate root
//!
//! gotchas:
//!     - The lib.rs is separate from main.rs - library consumers get lib, CLI gets main
//!     - Logging is only initialized by the binary; library callers install their own subscriber

pub mod annotation;
pub mod candidates;
pub mod cli;
pub mod commands;
pub mod config;
pub mod parser;
pub mod types;

// Re-export main types for convenience
pub use annotation::{
    AnnotationRecord, AnnotationRegistry, ComponentRef, LoadError, MetadataReader, ModuleId,
};
pub use cli::{Cli, GenerateArgs, LoggingArgs};
pub use commands::{
    generate, run_generate, FileOutcome, FileStatus, GenerateError, GenerateOptions,
    GenerateReport,
};
pub use config::Config;
pub use parser::{
    extract_component, AnalyzerFactory, ComponentAnalyzer, ComponentResolver, ExtractionError,
    FindExportedComponent,
};
pub use types::{
    ComponentDoc, ComponentDocRecord, DefaultValue, MethodDoc, PropDescriptor, TypeDescriptor,
};
