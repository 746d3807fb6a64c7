//! Nodes and their typed params.
//!
//! A [`Node`] is a typed vertex: a kind, an ordered set of input/output
//! [`Param`]s, and a kind-specific body. Nodes are built standalone and only
//! gain a position (and a derived label) when attached to a
//! [`Pipeline`](crate::designer::Pipeline).

use crate::designer::asset::{AssetResolver, FunctionKind};
use crate::designer::route::Route;
use crate::error::{DesignError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Data types a param can carry on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    Audio,
    Float,
    Image,
    Integer,
    Label,
    Tensor,
    Text,
    Video,
    Embedding,
    Number,
    Boolean,
}

impl DataType {
    pub fn as_str(self) -> &'static str {
        match self {
            DataType::Audio => "audio",
            DataType::Float => "float",
            DataType::Image => "image",
            DataType::Integer => "integer",
            DataType::Label => "label",
            DataType::Tensor => "tensor",
            DataType::Text => "text",
            DataType::Video => "video",
            DataType::Embedding => "embedding",
            DataType::Number => "number",
            DataType::Boolean => "boolean",
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether a param is consumed or produced by its node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamDirection {
    Input,
    Output,
}

/// A named, directional, typed slot on a node.
///
/// Params are owned by exactly one node and addressed by `code` within a
/// direction. They never point back at their node; links reference them by
/// node position plus code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Param {
    /// Code, unique within the node and direction.
    pub code: String,
    /// Declared data type, if known. Missing types can be inferred at link
    /// time from the opposite end of the mapping.
    pub data_type: Option<DataType>,
    /// Literal value, for params fed directly rather than via a link.
    pub value: Option<String>,
    /// Direction on the owning node.
    pub direction: ParamDirection,
    /// Whether validation demands the param be set or linked.
    pub required: bool,
}

impl Param {
    /// An input param with no value.
    pub fn input(code: impl Into<String>, data_type: Option<DataType>) -> Self {
        Self {
            code: code.into(),
            data_type,
            value: None,
            direction: ParamDirection::Input,
            required: false,
        }
    }

    /// An output param.
    pub fn output(code: impl Into<String>, data_type: Option<DataType>) -> Self {
        Self {
            code: code.into(),
            data_type,
            value: None,
            direction: ParamDirection::Output,
            required: false,
        }
    }

    /// Mark the param as required for validation.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Set a literal value.
    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }
}

/// The kind of a node, matching the wire `type` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Asset,
    Input,
    Output,
    Script,
    Router,
    Decision,
    Segmentor,
    Reconstructor,
}

impl NodeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            NodeKind::Asset => "ASSET",
            NodeKind::Input => "INPUT",
            NodeKind::Output => "OUTPUT",
            NodeKind::Script => "SCRIPT",
            NodeKind::Router => "ROUTER",
            NodeKind::Decision => "DECISION",
            NodeKind::Segmentor => "SEGMENTOR",
            NodeKind::Reconstructor => "RECONSTRUCTOR",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fields carried by asset-backed nodes, filled from the resolved spec.
#[derive(Debug, Clone)]
pub struct AssetFields {
    pub asset_id: String,
    pub function: String,
    pub supplier: String,
    pub version: String,
}

/// Kind-specific payload of a node.
#[derive(Debug, Clone)]
pub enum NodeBody {
    /// Asset, Segmentor and Reconstructor nodes.
    Asset(AssetFields),
    /// Input and Output nodes: accumulated data types plus, for inputs, an
    /// optional literal/link payload.
    Io {
        data_types: Vec<DataType>,
        data: Option<String>,
    },
    /// Script nodes reference an uploaded file.
    Script { file_id: String },
    /// Router and Decision nodes carry their branch table.
    Routing { routes: Vec<Route> },
}

/// A typed vertex in the execution graph.
#[derive(Debug, Clone)]
pub struct Node {
    pub(crate) kind: NodeKind,
    pub(crate) body: NodeBody,
    pub(crate) position: Option<usize>,
    pub(crate) label: Option<String>,
    pub(crate) inputs: Vec<Param>,
    pub(crate) outputs: Vec<Param>,
}

impl Node {
    fn bare(kind: NodeKind, body: NodeBody) -> Self {
        Self {
            kind,
            body,
            position: None,
            label: None,
            inputs: Vec::new(),
            outputs: Vec::new(),
        }
    }

    /// An input node. Exposes one output param named `input`.
    pub fn input() -> Self {
        let mut node = Self::bare(
            NodeKind::Input,
            NodeBody::Io {
                data_types: Vec::new(),
                data: None,
            },
        );
        node.outputs.push(Param::output("input", None));
        node
    }

    /// An output node. Exposes one input param named `output`.
    pub fn output() -> Self {
        let mut node = Self::bare(
            NodeKind::Output,
            NodeBody::Io {
                data_types: Vec::new(),
                data: None,
            },
        );
        node.inputs.push(Param::input("output", None));
        node
    }

    /// A script node referencing an already-uploaded script file.
    pub fn script(file_id: impl Into<String>) -> Result<Self> {
        let file_id = file_id.into();
        if file_id.is_empty() {
            return Err(DesignError::Precondition(
                "script node requires a file id".into(),
            ));
        }
        Ok(Self::bare(NodeKind::Script, NodeBody::Script { file_id }))
    }

    /// A router node with the given branch table.
    ///
    /// Routers expose one input param and one output param, both named
    /// `input`; the fan-out lives entirely in the routes.
    pub fn router(routes: Vec<Route>) -> Self {
        let mut node = Self::bare(NodeKind::Router, NodeBody::Routing { routes });
        node.inputs.push(Param::input("input", None));
        node.outputs.push(Param::output("input", None));
        node
    }

    /// A decision node: router behavior plus the distinguished `comparison`
    /// and `passthrough` inputs.
    pub fn decision(routes: Vec<Route>) -> Self {
        let mut node = Self::bare(NodeKind::Decision, NodeBody::Routing { routes });
        node.inputs.push(Param::input("input", None));
        node.inputs.push(Param::input("comparison", None));
        node.inputs.push(Param::input("passthrough", None));
        node.outputs.push(Param::output("input", None));
        node
    }

    /// An asset node accepting whatever function the asset exposes.
    pub fn asset(resolver: &dyn AssetResolver, asset_id: &str) -> Result<Self> {
        Self::from_spec(resolver, asset_id, NodeKind::Asset, None)
    }

    /// An asset node that demands a specific function, failing with
    /// [`DesignError::AssetMismatch`] when the resolved asset exposes a
    /// different one.
    pub fn asset_expecting(
        resolver: &dyn AssetResolver,
        asset_id: &str,
        function: &str,
    ) -> Result<Self> {
        Self::from_spec(resolver, asset_id, NodeKind::Asset, Some(function))
    }

    /// A segmentor node. The resolved asset must be a segmentor function.
    pub fn segmentor(resolver: &dyn AssetResolver, asset_id: &str) -> Result<Self> {
        let mut node = Self::from_kind_checked(resolver, asset_id, NodeKind::Segmentor, FunctionKind::Segmentor)?;
        // Segmented fragments come back on a dedicated audio port.
        node.push_param(Param::output("audio", Some(DataType::Audio)))?;
        Ok(node)
    }

    /// A reconstructor node. The resolved asset must be a reconstructor
    /// function.
    pub fn reconstructor(resolver: &dyn AssetResolver, asset_id: &str) -> Result<Self> {
        Self::from_kind_checked(resolver, asset_id, NodeKind::Reconstructor, FunctionKind::Reconstructor)
    }

    fn from_kind_checked(
        resolver: &dyn AssetResolver,
        asset_id: &str,
        kind: NodeKind,
        expected: FunctionKind,
    ) -> Result<Self> {
        let spec = resolver.resolve(asset_id)?;
        if spec.function_kind != expected {
            return Err(DesignError::AssetMismatch {
                asset_id: asset_id.to_string(),
                expected: expected.as_str().to_string(),
                actual: spec.function_kind.as_str().to_string(),
            });
        }
        Self::populate(kind, spec)
    }

    fn from_spec(
        resolver: &dyn AssetResolver,
        asset_id: &str,
        kind: NodeKind,
        expected_function: Option<&str>,
    ) -> Result<Self> {
        let spec = resolver.resolve(asset_id)?;
        if let Some(expected) = expected_function {
            if spec.function != expected {
                return Err(DesignError::AssetMismatch {
                    asset_id: asset_id.to_string(),
                    expected: expected.to_string(),
                    actual: spec.function.clone(),
                });
            }
        }
        Self::populate(kind, spec)
    }

    /// Build the node from a resolved spec: asset fields plus one param per
    /// declared input/output. Fails before anything is attached.
    fn populate(kind: NodeKind, spec: crate::designer::AssetSpec) -> Result<Self> {
        let mut node = Self::bare(
            kind,
            NodeBody::Asset(AssetFields {
                asset_id: spec.id,
                function: spec.function,
                supplier: spec.supplier,
                version: spec.version,
            }),
        );
        for item in spec.inputs {
            let mut param = Param::input(item.code, item.data_type);
            param.required = item.required;
            param.value = item.default_value;
            node.push_param(param)?;
        }
        for item in spec.outputs {
            node.push_param(Param::output(item.code, item.data_type))?;
        }
        Ok(node)
    }

    /// Override the derived label.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Accumulate declared data types on an Input/Output node.
    pub fn with_data_types(mut self, types: &[DataType]) -> Self {
        if let NodeBody::Io { data_types, .. } = &mut self.body {
            for t in types {
                if !data_types.contains(t) {
                    data_types.push(*t);
                }
            }
        }
        self
    }

    /// Set the literal/link payload of an Input node.
    pub fn with_data(mut self, data: impl Into<String>) -> Self {
        if let NodeBody::Io { data: slot, .. } = &mut self.body {
            *slot = Some(data.into());
        }
        self
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    pub fn body(&self) -> &NodeBody {
        &self.body
    }

    /// Position inside the owning pipeline, once attached.
    pub fn position(&self) -> Option<usize> {
        self.position
    }

    /// The label shown in validation messages; falls back to the kind for
    /// nodes that were never attached.
    pub fn display_label(&self) -> String {
        match (&self.label, self.position) {
            (Some(label), _) => label.clone(),
            (None, Some(position)) => format!("{}-{}", self.kind, position),
            (None, None) => self.kind.to_string(),
        }
    }

    /// Ordered input params.
    pub fn inputs(&self) -> &[Param] {
        &self.inputs
    }

    /// Ordered output params.
    pub fn outputs(&self) -> &[Param] {
        &self.outputs
    }

    /// Keyed lookup of an input param.
    pub fn input(&self, code: &str) -> Option<&Param> {
        self.inputs.iter().find(|p| p.code == code)
    }

    /// Keyed lookup of an output param.
    pub fn output(&self, code: &str) -> Option<&Param> {
        self.outputs.iter().find(|p| p.code == code)
    }

    pub(crate) fn input_mut(&mut self, code: &str) -> Option<&mut Param> {
        self.inputs.iter_mut().find(|p| p.code == code)
    }

    pub(crate) fn output_mut(&mut self, code: &str) -> Option<&mut Param> {
        self.outputs.iter_mut().find(|p| p.code == code)
    }

    /// Append an input param, rejecting duplicate codes in that direction.
    pub fn add_input_param(&mut self, code: impl Into<String>, data_type: Option<DataType>) -> Result<()> {
        self.push_param(Param::input(code, data_type))
    }

    /// Append an output param, rejecting duplicate codes in that direction.
    pub fn add_output_param(&mut self, code: impl Into<String>, data_type: Option<DataType>) -> Result<()> {
        self.push_param(Param::output(code, data_type))
    }

    pub(crate) fn push_param(&mut self, param: Param) -> Result<()> {
        let set = match param.direction {
            ParamDirection::Input => &mut self.inputs,
            ParamDirection::Output => &mut self.outputs,
        };
        if set.iter().any(|p| p.code == param.code) {
            return Err(DesignError::DuplicateParam {
                node: self.display_label(),
                code: param.code,
            });
        }
        set.push(param);
        Ok(())
    }

    /// Record the data type inferred for an Input/Output node at link time.
    pub(crate) fn note_data_type(&mut self, data_type: DataType) {
        if let NodeBody::Io { data_types, .. } = &mut self.body {
            if !data_types.contains(&data_type) {
                data_types.push(data_type);
            }
        }
    }

    /// Assign the position and derived label; positions are assigned exactly
    /// once.
    pub(crate) fn attach(&mut self, position: usize) -> Result<()> {
        if self.position.is_some() {
            return Err(DesignError::Precondition(format!(
                "node '{}' is already attached",
                self.display_label()
            )));
        }
        self.position = Some(position);
        if self.label.is_none() {
            self.label = Some(format!("{}-{}", self.kind, position));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::designer::asset::{AssetSpec, CatalogResolver};

    fn resolver() -> CatalogResolver {
        CatalogResolver::new()
            .with(
                AssetSpec::new("mt-en-fr", "translation")
                    .with_input("text", Some(DataType::Text), true)
                    .with_output("data", Some(DataType::Text)),
            )
            .with(
                AssetSpec::new("seg-1", "audio-segmentation")
                    .with_kind(FunctionKind::Segmentor)
                    .with_input("source_audio", Some(DataType::Audio), true)
                    .with_output("data", Some(DataType::Text)),
            )
    }

    #[test]
    fn test_input_node_exposes_single_output_param() {
        let node = Node::input();
        assert_eq!(node.kind(), NodeKind::Input);
        assert_eq!(node.outputs().len(), 1);
        assert!(node.output("input").is_some());
        assert!(node.inputs().is_empty());
    }

    #[test]
    fn test_output_node_exposes_single_input_param() {
        let node = Node::output();
        assert!(node.input("output").is_some());
        assert!(node.outputs().is_empty());
    }

    #[test]
    fn test_asset_node_populates_params_from_spec() {
        let node = Node::asset(&resolver(), "mt-en-fr").unwrap();
        assert_eq!(node.kind(), NodeKind::Asset);
        assert!(node.input("text").is_some());
        assert!(node.output("data").is_some());
        assert!(node.input("text").unwrap().required);
        match node.body() {
            NodeBody::Asset(fields) => {
                assert_eq!(fields.function, "translation");
                assert_eq!(fields.asset_id, "mt-en-fr");
            }
            other => panic!("unexpected body {:?}", other),
        }
    }

    #[test]
    fn test_asset_expecting_mismatch_fails_fast() {
        let err = Node::asset_expecting(&resolver(), "mt-en-fr", "speech-recognition").unwrap_err();
        assert_eq!(
            err,
            DesignError::AssetMismatch {
                asset_id: "mt-en-fr".into(),
                expected: "speech-recognition".into(),
                actual: "translation".into(),
            }
        );
    }

    #[test]
    fn test_segmentor_requires_segmentor_function() {
        let err = Node::segmentor(&resolver(), "mt-en-fr").unwrap_err();
        assert!(matches!(err, DesignError::AssetMismatch { .. }));

        let node = Node::segmentor(&resolver(), "seg-1").unwrap();
        assert_eq!(node.kind(), NodeKind::Segmentor);
        // The extra fragment port comes after the spec-declared outputs.
        assert_eq!(node.outputs().last().unwrap().code, "audio");
    }

    #[test]
    fn test_unknown_asset_fails_construction() {
        let err = Node::asset(&resolver(), "missing").unwrap_err();
        assert_eq!(err, DesignError::UnknownAsset("missing".into()));
    }

    #[test]
    fn test_duplicate_param_rejected() {
        let mut node = Node::input();
        node.add_input_param("language", Some(DataType::Label)).unwrap();
        let err = node.add_input_param("language", Some(DataType::Label)).unwrap_err();
        assert!(matches!(err, DesignError::DuplicateParam { .. }));
        // Same code in the other direction is fine: `input` already exists
        // as an output, but an input named `input` is a distinct slot.
        node.add_input_param("input", None).unwrap();
    }

    #[test]
    fn test_script_requires_file_id() {
        assert!(Node::script("").is_err());
        assert!(Node::script("file-123").is_ok());
    }

    #[test]
    fn test_decision_params() {
        let node = Node::decision(Vec::new());
        assert!(node.input("input").is_some());
        assert!(node.input("comparison").is_some());
        assert!(node.input("passthrough").is_some());
        assert!(node.output("input").is_some());
    }

    #[test]
    fn test_display_label_fallbacks() {
        let mut node = Node::input();
        assert_eq!(node.display_label(), "INPUT");
        node.attach(3).unwrap();
        assert_eq!(node.display_label(), "INPUT-3");

        let named = Node::output().with_label("final");
        assert_eq!(named.display_label(), "final");
    }

    #[test]
    fn test_attach_twice_is_a_precondition_error() {
        let mut node = Node::input();
        node.attach(0).unwrap();
        assert!(matches!(node.attach(1), Err(DesignError::Precondition(_))));
        assert_eq!(node.position(), Some(0));
    }
}
