//! Remote asset specifications and the resolver seam.
//!
//! Asset-backed nodes need to know, at construction time, what function a
//! remote asset exposes and which params that function declares. That lookup
//! goes through the [`AssetResolver`] trait so the catalog source is
//! swappable: [`CatalogResolver`] serves specs from memory (tests, pinned
//! catalogs), while an HTTP-backed catalog client lives outside this crate.

use crate::designer::DataType;
use crate::error::{DesignError, Result};
use std::collections::HashMap;

/// Broad category of the function an asset implements.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FunctionKind {
    /// A general AI function (translation, speech recognition, ...).
    Ai,
    /// Splits an input into fragments for parallel processing.
    Segmentor,
    /// Reassembles segmented results into one output.
    Reconstructor,
    /// A utility function (format conversion, glue logic).
    Utility,
    /// A scoring/evaluation function.
    Metric,
}

impl FunctionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            FunctionKind::Ai => "ai",
            FunctionKind::Segmentor => "segmentor",
            FunctionKind::Reconstructor => "reconstructor",
            FunctionKind::Utility => "utility",
            FunctionKind::Metric => "metric",
        }
    }
}

/// One param declared by an asset's function signature.
#[derive(Debug, Clone)]
pub struct ParamSpec {
    /// Param code, unique within its direction.
    pub code: String,
    /// Declared data type, if the function pins one.
    pub data_type: Option<DataType>,
    /// Whether a run must supply this param.
    pub required: bool,
    /// Default literal value, if any.
    pub default_value: Option<String>,
}

/// The resolved description of a remote asset.
///
/// Built either by an external catalog client or by hand for tests:
///
/// ```
/// use modelflow::designer::{AssetSpec, DataType};
///
/// let spec = AssetSpec::new("6239efa4822d7a13b8e20454", "translation")
///     .with_supplier("acme")
///     .with_input("text", Some(DataType::Text), true)
///     .with_output("data", Some(DataType::Text));
/// assert_eq!(spec.inputs.len(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct AssetSpec {
    /// Platform identifier of the asset.
    pub id: String,
    /// Function the asset exposes (e.g. `"translation"`).
    pub function: String,
    /// Supplier code.
    pub supplier: String,
    /// Asset version.
    pub version: String,
    /// Category of the function.
    pub function_kind: FunctionKind,
    /// Params the function consumes.
    pub inputs: Vec<ParamSpec>,
    /// Params the function produces.
    pub outputs: Vec<ParamSpec>,
}

impl AssetSpec {
    /// Create a spec with empty param lists and placeholder supplier/version.
    pub fn new(id: impl Into<String>, function: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            function: function.into(),
            supplier: "platform".into(),
            version: "1.0".into(),
            function_kind: FunctionKind::Ai,
            inputs: Vec::new(),
            outputs: Vec::new(),
        }
    }

    pub fn with_supplier(mut self, supplier: impl Into<String>) -> Self {
        self.supplier = supplier.into();
        self
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    pub fn with_kind(mut self, kind: FunctionKind) -> Self {
        self.function_kind = kind;
        self
    }

    /// Declare an input param on the function signature.
    pub fn with_input(mut self, code: impl Into<String>, data_type: Option<DataType>, required: bool) -> Self {
        self.inputs.push(ParamSpec {
            code: code.into(),
            data_type,
            required,
            default_value: None,
        });
        self
    }

    /// Declare an output param on the function signature.
    pub fn with_output(mut self, code: impl Into<String>, data_type: Option<DataType>) -> Self {
        self.outputs.push(ParamSpec {
            code: code.into(),
            data_type,
            required: false,
            default_value: None,
        });
        self
    }
}

/// Synchronous lookup of asset specs by identifier.
///
/// Injected into asset-node construction; implementors must not block on
/// anything slower than a local cache, since node construction is synchronous
/// by contract.
pub trait AssetResolver {
    /// Resolve an asset id to its spec, or fail with
    /// [`DesignError::UnknownAsset`].
    fn resolve(&self, id: &str) -> Result<AssetSpec>;
}

/// An [`AssetResolver`] backed by an in-memory map.
#[derive(Debug, Default)]
pub struct CatalogResolver {
    specs: HashMap<String, AssetSpec>,
}

impl CatalogResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a spec, keyed by its id.
    pub fn with(mut self, spec: AssetSpec) -> Self {
        self.specs.insert(spec.id.clone(), spec);
        self
    }

    /// Register a spec on an existing resolver.
    pub fn insert(&mut self, spec: AssetSpec) {
        self.specs.insert(spec.id.clone(), spec);
    }
}

impl AssetResolver for CatalogResolver {
    fn resolve(&self, id: &str) -> Result<AssetSpec> {
        self.specs
            .get(id)
            .cloned()
            .ok_or_else(|| DesignError::UnknownAsset(id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_resolver_hit() {
        let resolver = CatalogResolver::new().with(AssetSpec::new("mt-1", "translation"));
        let spec = resolver.resolve("mt-1").unwrap();
        assert_eq!(spec.function, "translation");
        assert_eq!(spec.supplier, "platform");
    }

    #[test]
    fn test_catalog_resolver_miss() {
        let resolver = CatalogResolver::new();
        let err = resolver.resolve("nope").unwrap_err();
        assert_eq!(err, DesignError::UnknownAsset("nope".into()));
    }

    #[test]
    fn test_spec_builder_accumulates_params() {
        let spec = AssetSpec::new("asr-1", "speech-recognition")
            .with_kind(FunctionKind::Ai)
            .with_input("source_audio", Some(DataType::Audio), true)
            .with_input("language", Some(DataType::Label), false)
            .with_output("data", Some(DataType::Text));
        assert_eq!(spec.inputs.len(), 2);
        assert_eq!(spec.outputs.len(), 1);
        assert!(spec.inputs[0].required);
        assert!(!spec.inputs[1].required);
    }
}
