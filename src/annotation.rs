//! @dose
//! purpose: Runtime metadata for components. Metadata is attached through an explicit
//!     AnnotationRegistry, either in code (doc / with_doc) or from an annotation manifest,
//!     and is looked up per candidate file through the MetadataReader trait.
//!
//! when-editing:
//!     - !Records are keyed by ModuleId, the candidate's name relative to the input directory
//!     - !The derived `name` key is inserted after the caller's metadata and replaces it
//!     - Registration takes &self so a shared registry can be filled by decorator closures
//!
//! invariants:
//!     - read() never executes code and never blocks on anything but the registry lock
//!     - A module with nothing registered reads as Ok(None), not an error
//!     - ModuleId always uses forward slashes, whatever the host separator
//!
//! do-not:
//!     - Never key records by display name; two files may export the same name
//!
//! gotchas:
//!     - Registering the same module twice keeps the last record
//!     - Manifest `module` values may start with "./"; the prefix is dropped
//!
//! flows:
//!     - Manifest: read file -> parse TOML or JSON -> with_doc per [[component]] entry
//!     - Lookup: candidate path -> ModuleId::from_path -> MetadataReader::read

use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::{Component, Path, PathBuf};
use std::sync::{PoisonError, RwLock};
use thiserror::Error;
use tracing::debug;

/// Name used when a component has neither a display name nor a definition name
pub const UNNAMED_COMPONENT: &str = "UnnamedComponent";

/// Reserved annotation key carrying the component's derived name
pub const NAME_KEY: &str = "name";

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Cannot derive a module identifier for {}", path.display())]
    Unresolvable { path: PathBuf },
    #[error("Failed to load annotation manifest {}: {message}", path.display())]
    Manifest { path: PathBuf, message: String },
}

/// Identifier of a candidate module: its path relative to the input directory
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModuleId(String);

impl ModuleId {
    pub fn new(id: impl AsRef<str>) -> Self {
        let id = id.as_ref().replace('\\', "/");
        let id = id.strip_prefix("./").unwrap_or(&id);
        Self(id.to_string())
    }

    /// Derive the identifier of `path` relative to `root`
    pub fn from_path(root: &Path, path: &Path) -> Result<Self, LoadError> {
        let unresolvable = || LoadError::Unresolvable {
            path: path.to_path_buf(),
        };

        let relative = path.strip_prefix(root).map_err(|_| unresolvable())?;
        let mut parts = Vec::new();
        for component in relative.components() {
            match component {
                Component::Normal(part) => parts.push(part.to_str().ok_or_else(unresolvable)?),
                _ => return Err(unresolvable()),
            }
        }
        if parts.is_empty() {
            return Err(unresolvable());
        }

        Ok(Self(parts.join("/")))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ModuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Handle to a component definition that metadata is attached to
#[derive(Debug, Clone, PartialEq)]
pub struct ComponentRef {
    pub module: ModuleId,
    /// Explicit display name, if the component sets one
    pub display_name: Option<String>,
    /// Definition identifier (function or class name)
    pub name: Option<String>,
}

impl ComponentRef {
    pub fn new(module: ModuleId) -> Self {
        Self {
            module,
            display_name: None,
            name: None,
        }
    }

    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = Some(display_name.into());
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Display name, else definition name, else the unnamed sentinel
    pub fn derived_name(&self) -> &str {
        self.display_name
            .as_deref()
            .filter(|n| !n.is_empty())
            .or(self.name.as_deref().filter(|n| !n.is_empty()))
            .unwrap_or(UNNAMED_COMPONENT)
    }
}

/// Metadata attached to one component
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AnnotationRecord {
    fields: Map<String, Value>,
}

impl AnnotationRecord {
    pub fn new(meta: Map<String, Value>, component: &ComponentRef) -> Self {
        let mut fields = meta;
        fields.insert(
            NAME_KEY.to_string(),
            Value::String(component.derived_name().to_string()),
        );
        Self { fields }
    }

    pub fn name(&self) -> Option<&str> {
        self.fields.get(NAME_KEY).and_then(Value::as_str)
    }

    pub fn into_fields(self) -> Map<String, Value> {
        self.fields
    }
}

/// Source of runtime metadata for candidate modules
pub trait MetadataReader: Send + Sync {
    /// Metadata registered for `module`, or None when nothing is attached
    fn read(&self, module: &ModuleId) -> Result<Option<AnnotationRecord>, LoadError>;
}

/// In-memory registry of annotation records keyed by module
#[derive(Debug, Default)]
pub struct AnnotationRegistry {
    records: RwLock<HashMap<ModuleId, AnnotationRecord>>,
}

impl AnnotationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a decorator that attaches `meta` to the component it is applied to
    /// and hands the component back unchanged.
    pub fn doc(&self, meta: Map<String, Value>) -> impl Fn(ComponentRef) -> ComponentRef + '_ {
        move |component| self.with_doc(meta.clone(), component)
    }

    /// Attach `meta` to `component`
    pub fn with_doc(&self, meta: Map<String, Value>, component: ComponentRef) -> ComponentRef {
        let record = AnnotationRecord::new(meta, &component);
        debug!(module = %component.module, name = ?record.name(), "registered annotation");
        self.records
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(component.module.clone(), record);
        component
    }

    pub fn len(&self) -> usize {
        self.records
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Build a registry from a manifest file (TOML for `.toml`, JSON otherwise)
    pub fn from_manifest(path: &Path) -> Result<Self, LoadError> {
        let manifest_error = |message: String| LoadError::Manifest {
            path: path.to_path_buf(),
            message,
        };

        let content = fs::read_to_string(path).map_err(|e| manifest_error(e.to_string()))?;
        let is_toml = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|ext| ext.eq_ignore_ascii_case("toml"))
            .unwrap_or(false);

        let manifest: Manifest = if is_toml {
            toml::from_str(&content).map_err(|e| manifest_error(e.to_string()))?
        } else {
            serde_json::from_str(&content).map_err(|e| manifest_error(e.to_string()))?
        };

        let registry = Self::new();
        for entry in manifest.component {
            if entry.module.trim().is_empty() {
                return Err(manifest_error("component entry has an empty module".to_string()));
            }
            let mut component = ComponentRef::new(ModuleId::new(&entry.module));
            component.display_name = entry.display_name;
            component.name = entry.name;
            registry.with_doc(entry.meta, component);
        }

        Ok(registry)
    }
}

impl MetadataReader for AnnotationRegistry {
    fn read(&self, module: &ModuleId) -> Result<Option<AnnotationRecord>, LoadError> {
        Ok(self
            .records
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(module)
            .cloned())
    }
}

#[derive(Debug, Deserialize)]
struct Manifest {
    #[serde(default)]
    component: Vec<ManifestEntry>,
}

#[derive(Debug, Deserialize)]
struct ManifestEntry {
    module: String,
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    meta: Map<String, Value>,
}
