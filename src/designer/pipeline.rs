//! The pipeline graph container.
//!
//! [`Pipeline`] owns every node and link, hands out [`NodeHandle`]s on
//! attachment, and is the single writer for all graph mutation. Validation
//! is pure and re-runnable; serialization renders the wire JSON the backend
//! expects without touching the graph.

use crate::designer::asset::AssetResolver;
use crate::designer::link::{Link, ParamMapping};
use crate::designer::node::{DataType, Node, NodeBody, NodeKind, Param};
use crate::designer::route::Route;
use crate::error::{DesignError, Result};
use serde_json::{json, Value};
use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_PIPELINE_ID: AtomicU64 = AtomicU64::new(1);

/// A stable reference to a node inside one specific pipeline.
///
/// Handles are issued on attachment and never invalidated (there is no
/// detach). A handle carries the owning pipeline's identity tag, so feeding
/// it to a different pipeline fails with
/// [`DesignError::UnattachedNode`] instead of silently addressing the wrong
/// node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeHandle {
    pipeline: u64,
    position: usize,
}

impl NodeHandle {
    /// The node's zero-based position, which is also its wire `number`.
    pub fn position(&self) -> usize {
        self.position
    }
}

/// The owning container of nodes and links; the unit of validation,
/// serialization and submission.
///
/// # Example
///
/// ```
/// use modelflow::designer::{AssetSpec, CatalogResolver, DataType, Pipeline};
///
/// # fn main() -> Result<(), modelflow::DesignError> {
/// let catalog = CatalogResolver::new().with(
///     AssetSpec::new("mt-en-fr", "translation")
///         .with_input("text", Some(DataType::Text), true)
///         .with_output("data", Some(DataType::Text)),
/// );
///
/// let mut pipeline = Pipeline::new();
/// let input = pipeline.input()?;
/// let model = pipeline.asset(&catalog, "mt-en-fr")?;
/// pipeline.link(input, model)?;
/// pipeline.use_output(model, "data")?;
/// pipeline.validate()?;
/// let wire = pipeline.serialize();
/// assert_eq!(wire["nodes"].as_array().unwrap().len(), 3);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Pipeline {
    id: u64,
    nodes: Vec<Node>,
    links: Vec<Link>,
    remote_handle: Option<String>,
}

impl Pipeline {
    /// Create an empty pipeline.
    pub fn new() -> Self {
        Self {
            id: NEXT_PIPELINE_ID.fetch_add(1, Ordering::Relaxed),
            nodes: Vec::new(),
            links: Vec::new(),
            remote_handle: None,
        }
    }

    /// Attach a node: assigns the next position, derives the label if unset,
    /// and appends the node in attachment order.
    ///
    /// Re-attaching a node that already carries a position is a
    /// [`DesignError::Precondition`] failure.
    pub fn add_node(&mut self, mut node: Node) -> Result<NodeHandle> {
        if node.position().is_some() {
            return Err(DesignError::Precondition(format!(
                "node '{}' is already attached to a pipeline",
                node.display_label()
            )));
        }
        let position = self.nodes.len();
        node.attach(position)?;
        self.nodes.push(node);
        Ok(NodeHandle {
            pipeline: self.id,
            position,
        })
    }

    /// Attach several nodes in order.
    pub fn add_nodes(&mut self, nodes: impl IntoIterator<Item = Node>) -> Result<Vec<NodeHandle>> {
        nodes.into_iter().map(|n| self.add_node(n)).collect()
    }

    /// Append a pre-built link after bounds-checking both endpoints.
    pub fn add_link(&mut self, link: Link) -> Result<()> {
        for position in [link.from_node, link.to_node] {
            if position >= self.nodes.len() {
                return Err(DesignError::UnattachedNode(format!("#{}", position)));
            }
        }
        self.links.push(link);
        Ok(())
    }

    // --- node builder shortcuts ---

    /// Attach a fresh input node.
    pub fn input(&mut self) -> Result<NodeHandle> {
        self.add_node(Node::input())
    }

    /// Attach a fresh output node.
    pub fn output(&mut self) -> Result<NodeHandle> {
        self.add_node(Node::output())
    }

    /// Attach an asset node resolved through `resolver`.
    pub fn asset(&mut self, resolver: &dyn AssetResolver, asset_id: &str) -> Result<NodeHandle> {
        self.add_node(Node::asset(resolver, asset_id)?)
    }

    /// Attach a script node.
    pub fn script(&mut self, file_id: impl Into<String>) -> Result<NodeHandle> {
        self.add_node(Node::script(file_id)?)
    }

    /// Attach a router whose branch table dispatches on data type: one
    /// `checkType`/`equal` route per `(data type, target)` pair.
    pub fn router(&mut self, routes: &[(DataType, NodeHandle)]) -> Result<NodeHandle> {
        let routes = routes
            .iter()
            .map(|(data_type, target)| {
                self.check_handle(*target)?;
                Route::check_type(*data_type, std::slice::from_ref(target))
            })
            .collect::<Result<Vec<_>>>()?;
        self.add_node(Node::router(routes))
    }

    /// Attach a decision node with an explicit branch table.
    pub fn decision(&mut self, routes: Vec<Route>) -> Result<NodeHandle> {
        self.add_node(Node::decision(routes))
    }

    /// Attach a segmentor node resolved through `resolver`.
    pub fn segmentor(&mut self, resolver: &dyn AssetResolver, asset_id: &str) -> Result<NodeHandle> {
        self.add_node(Node::segmentor(resolver, asset_id)?)
    }

    /// Attach a reconstructor node resolved through `resolver`.
    pub fn reconstructor(&mut self, resolver: &dyn AssetResolver, asset_id: &str) -> Result<NodeHandle> {
        self.add_node(Node::reconstructor(resolver, asset_id)?)
    }

    // --- linking ---

    /// Full-node pass-through link (empty param mapping). Returns `to` so
    /// chains read left to right.
    pub fn link(&mut self, from: NodeHandle, to: NodeHandle) -> Result<NodeHandle> {
        self.link_with(from, to, None, None)
    }

    /// Link one named output param to one named input param.
    pub fn link_params(
        &mut self,
        from: NodeHandle,
        from_param: &str,
        to: NodeHandle,
        to_param: &str,
    ) -> Result<NodeHandle> {
        self.link_with(from, to, Some(from_param), Some(to_param))
    }

    /// The underlying link operation.
    ///
    /// `from_param`/`to_param` must be supplied together or not at all;
    /// naming only one is [`DesignError::AsymmetricMapping`]. Named params
    /// are resolved on the source's outputs and the destination's inputs;
    /// when exactly one end declares a data type the other end inherits it,
    /// and Input/Output endpoints record the type in their `dataType` lists.
    /// Links leaving a decision node re-derive the decision's output type
    /// from its `passthrough` input before returning.
    pub fn link_with(
        &mut self,
        from: NodeHandle,
        to: NodeHandle,
        from_param: Option<&str>,
        to_param: Option<&str>,
    ) -> Result<NodeHandle> {
        self.check_handle(from)?;
        self.check_handle(to)?;

        let param_mapping = match (from_param, to_param) {
            (None, None) => Vec::new(),
            (Some(from_code), Some(to_code)) => {
                self.map_params(from.position, from_code, to.position, to_code)?;
                vec![ParamMapping {
                    from_param: from_code.to_string(),
                    to_param: to_code.to_string(),
                }]
            }
            _ => return Err(DesignError::AsymmetricMapping),
        };

        self.links.push(Link {
            from_node: from.position,
            to_node: to.position,
            param_mapping,
        });

        // Decision outputs mirror whatever flows through `passthrough`; the
        // copy happens here, not at serialization time.
        if self.nodes[from.position].kind() == NodeKind::Decision {
            let passthrough = self.nodes[from.position]
                .input("passthrough")
                .and_then(|p| p.data_type);
            if let Some(out) = self.nodes[from.position].output_mut("input") {
                out.data_type = passthrough;
            }
        }

        Ok(to)
    }

    /// Resolve both ends of an explicit mapping and run data-type inference.
    fn map_params(
        &mut self,
        from_position: usize,
        from_code: &str,
        to_position: usize,
        to_code: &str,
    ) -> Result<()> {
        let from_type = {
            let node = &self.nodes[from_position];
            node.output(from_code)
                .ok_or_else(|| DesignError::ParamNotFound {
                    node: node.display_label(),
                    code: from_code.to_string(),
                })?
                .data_type
        };
        let to_type = {
            let node = &self.nodes[to_position];
            node.input(to_code)
                .ok_or_else(|| DesignError::ParamNotFound {
                    node: node.display_label(),
                    code: to_code.to_string(),
                })?
                .data_type
        };

        // Router/decision outputs are structural pass-throughs; their type is
        // evaluated per-branch by the backend, so inference stops there.
        if matches!(
            self.nodes[from_position].kind(),
            NodeKind::Router | NodeKind::Decision
        ) {
            return Ok(());
        }

        let inferred = match (from_type, to_type) {
            (Some(a), Some(b)) if a != b => {
                return Err(DesignError::DataTypeMismatch { from: a, to: b })
            }
            (a, b) => a.or(b),
        };

        if let Some(data_type) = inferred {
            if let Some(p) = self.nodes[from_position].output_mut(from_code) {
                p.data_type = Some(data_type);
            }
            if let Some(p) = self.nodes[to_position].input_mut(to_code) {
                p.data_type = Some(data_type);
            }
            self.nodes[from_position].note_data_type(data_type);
            self.nodes[to_position].note_data_type(data_type);
        }
        Ok(())
    }

    /// Fan the caller's `input` output across a fresh router.
    ///
    /// Each target is `(node, input param code)`; the param's declared data
    /// type becomes a `checkType` route whose single-element path is that
    /// node. The caller is linked to the router and the router to every
    /// target.
    pub fn route(&mut self, from: NodeHandle, targets: &[(NodeHandle, &str)]) -> Result<NodeHandle> {
        self.check_handle(from)?;
        {
            let node = &self.nodes[from.position];
            if node.output("input").is_none() {
                return Err(DesignError::ParamNotFound {
                    node: node.display_label(),
                    code: "input".to_string(),
                });
            }
        }

        let mut table = Vec::with_capacity(targets.len());
        for (target, code) in targets {
            self.check_handle(*target)?;
            let node = &self.nodes[target.position];
            let param = node.input(code).ok_or_else(|| DesignError::ParamNotFound {
                node: node.display_label(),
                code: code.to_string(),
            })?;
            let data_type = param.data_type.ok_or_else(|| {
                DesignError::Precondition(format!(
                    "route target param '{}' on node '{}' must declare a data type",
                    code,
                    node.display_label()
                ))
            })?;
            table.push((data_type, *target, code.to_string()));
        }

        let routes = table
            .iter()
            .map(|(data_type, target, _)| Route::check_type(*data_type, std::slice::from_ref(target)))
            .collect::<Result<Vec<_>>>()?;
        let router = self.add_node(Node::router(routes))?;

        self.link_params(from, "input", router, "input")?;
        for (_, target, code) in &table {
            self.link_params(router, "input", *target, code)?;
        }
        Ok(router)
    }

    /// Wire a named output param into a fresh terminal output node.
    ///
    /// Creates exactly one output node per call.
    pub fn use_output(&mut self, from: NodeHandle, param: &str) -> Result<NodeHandle> {
        self.check_handle(from)?;
        {
            let node = &self.nodes[from.position];
            if node.output(param).is_none() {
                return Err(DesignError::ParamNotFound {
                    node: node.display_label(),
                    code: param.to_string(),
                });
            }
        }
        let out = self.output()?;
        self.link_params(from, param, out, "output")?;
        Ok(out)
    }

    // --- params ---

    /// Set a literal value on a node's input param.
    pub fn set_param(&mut self, handle: NodeHandle, code: &str, value: impl Into<String>) -> Result<()> {
        self.check_handle(handle)?;
        let node = &mut self.nodes[handle.position];
        let label = node.display_label();
        match node.input_mut(code) {
            Some(param) => {
                param.value = Some(value.into());
                Ok(())
            }
            None => Err(DesignError::ParamNotFound {
                node: label,
                code: code.to_string(),
            }),
        }
    }

    /// Add an input param to an attached node (scripting nodes, mostly).
    pub fn add_input_param(
        &mut self,
        handle: NodeHandle,
        code: impl Into<String>,
        data_type: Option<DataType>,
    ) -> Result<()> {
        self.check_handle(handle)?;
        self.nodes[handle.position].add_input_param(code, data_type)
    }

    /// Add an output param to an attached node.
    pub fn add_output_param(
        &mut self,
        handle: NodeHandle,
        code: impl Into<String>,
        data_type: Option<DataType>,
    ) -> Result<()> {
        self.check_handle(handle)?;
        self.nodes[handle.position].add_output_param(code, data_type)
    }

    // --- accessors ---

    /// The node behind a handle.
    pub fn node(&self, handle: NodeHandle) -> Result<&Node> {
        self.check_handle(handle)?;
        Ok(&self.nodes[handle.position])
    }

    /// All nodes, in attachment order.
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// All links, in creation order.
    pub fn links(&self) -> &[Link] {
        &self.links
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn link_count(&self) -> usize {
        self.links.len()
    }

    /// The opaque reference acquired by a successful save/submission.
    pub fn remote_handle(&self) -> Option<&str> {
        self.remote_handle.as_deref()
    }

    /// Record the reference returned by the backend.
    pub fn set_remote_handle(&mut self, handle: impl Into<String>) {
        self.remote_handle = Some(handle.into());
    }

    fn check_handle(&self, handle: NodeHandle) -> Result<()> {
        if handle.pipeline != self.id || handle.position >= self.nodes.len() {
            return Err(DesignError::UnattachedNode(format!("#{}", handle.position)));
        }
        Ok(())
    }

    // --- validation ---

    /// Check graph completeness. Pure and re-runnable.
    ///
    /// Every input node must be linked out, every output node linked in, and
    /// every other node both; the first offending node aborts the check with
    /// its label in the error. Required input params must be set to a
    /// literal, explicitly mapped, or covered by a pass-through link into
    /// their node.
    pub fn validate(&self) -> Result<()> {
        let sources: HashSet<usize> = self.links.iter().map(|l| l.from_node).collect();
        let destinations: HashSet<usize> = self.links.iter().map(|l| l.to_node).collect();

        for (position, node) in self.nodes.iter().enumerate() {
            match node.kind() {
                NodeKind::Input => {
                    if !sources.contains(&position) {
                        return Err(DesignError::DanglingInput {
                            label: node.display_label(),
                        });
                    }
                }
                NodeKind::Output => {
                    if !destinations.contains(&position) {
                        return Err(DesignError::DanglingOutput {
                            label: node.display_label(),
                        });
                    }
                }
                _ => {
                    if !sources.contains(&position) || !destinations.contains(&position) {
                        return Err(DesignError::DisconnectedNode {
                            label: node.display_label(),
                        });
                    }
                }
            }

            if let NodeBody::Routing { routes } = node.body() {
                for route in routes {
                    for &target in &route.path {
                        if target >= self.nodes.len() {
                            return Err(DesignError::Precondition(format!(
                                "route on node '{}' references unknown position {}",
                                node.display_label(),
                                target
                            )));
                        }
                    }
                }
            }
        }

        for (position, node) in self.nodes.iter().enumerate() {
            for param in node.inputs() {
                if param.required && param.value.is_none() && !self.param_linked(position, &param.code) {
                    return Err(DesignError::MissingRequiredParam {
                        node: node.display_label(),
                        code: param.code.clone(),
                    });
                }
            }
        }

        Ok(())
    }

    /// [`validate`](Self::validate) plus the composition check a submission
    /// needs: at least one input, one output, and one asset or script node.
    pub fn ensure_runnable(&self) -> Result<()> {
        self.validate()?;
        let has_input = self.nodes.iter().any(|n| n.kind() == NodeKind::Input);
        let has_output = self.nodes.iter().any(|n| n.kind() == NodeKind::Output);
        let has_worker = self.nodes.iter().any(|n| {
            matches!(
                n.kind(),
                NodeKind::Asset | NodeKind::Script | NodeKind::Segmentor | NodeKind::Reconstructor
            )
        });
        if !(has_input && has_output && has_worker) {
            return Err(DesignError::IncompletePipeline);
        }
        Ok(())
    }

    /// A required param counts as linked when a link maps into it by name, or
    /// when its node receives a whole-node pass-through link.
    fn param_linked(&self, position: usize, code: &str) -> bool {
        self.links.iter().any(|link| {
            link.to_node == position
                && (link.param_mapping.is_empty()
                    || link.param_mapping.iter().any(|m| m.to_param == code))
        })
    }

    // --- serialization ---

    /// Render the wire object: `{"nodes": [...], "links": [...]}` in exact
    /// insertion order. Never mutates the pipeline.
    pub fn serialize(&self) -> Value {
        json!({
            "nodes": self.nodes.iter().map(node_wire).collect::<Vec<_>>(),
            "links": self.links.iter().map(link_wire).collect::<Vec<_>>(),
        })
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new()
    }
}

fn param_wire(param: &Param) -> Value {
    json!({
        "code": param.code,
        "dataType": param.data_type.map(DataType::as_str),
        "value": param.value,
    })
}

fn link_wire(link: &Link) -> Value {
    json!({
        "from": link.from_node,
        "to": link.to_node,
        "paramMapping": link
            .param_mapping
            .iter()
            .map(|m| json!({"from": m.from_param, "to": m.to_param}))
            .collect::<Vec<_>>(),
    })
}

fn node_wire(node: &Node) -> Value {
    let mut wire = json!({
        "number": node.position(),
        "label": node.display_label(),
        "type": node.kind().as_str(),
        "inputValues": node.inputs().iter().map(param_wire).collect::<Vec<_>>(),
        "outputValues": node.outputs().iter().map(param_wire).collect::<Vec<_>>(),
    });
    match node.body() {
        NodeBody::Asset(fields) => {
            wire["assetId"] = json!(fields.asset_id);
            wire["function"] = json!(fields.function);
            wire["supplier"] = json!(fields.supplier);
            wire["version"] = json!(fields.version);
        }
        NodeBody::Io { data_types, data } => {
            wire["dataType"] = json!(data_types);
            if let Some(data) = data {
                wire["data"] = json!(data);
            }
        }
        NodeBody::Script { file_id } => {
            wire["fileId"] = json!(file_id);
        }
        NodeBody::Routing { routes } => {
            wire["routes"] = Value::Array(routes.iter().map(Route::wire).collect());
        }
    }
    wire
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::designer::asset::{AssetSpec, CatalogResolver, FunctionKind};
    use crate::designer::link::Link;

    fn catalog() -> CatalogResolver {
        CatalogResolver::new()
            .with(
                AssetSpec::new("mt-en-fr", "translation")
                    .with_supplier("acme")
                    .with_version("2.1")
                    .with_input("text", Some(DataType::Text), true)
                    .with_input("language", Some(DataType::Label), false)
                    .with_output("data", Some(DataType::Text)),
            )
            .with(
                AssetSpec::new("asr-en", "speech-recognition")
                    .with_input("source_audio", Some(DataType::Audio), true)
                    .with_output("data", Some(DataType::Text)),
            )
            .with(
                AssetSpec::new("seg-audio", "audio-segmentation")
                    .with_kind(FunctionKind::Segmentor)
                    .with_input("source_audio", Some(DataType::Audio), true)
                    .with_output("data", Some(DataType::Text)),
            )
    }

    #[test]
    fn test_positions_follow_attachment_order() {
        // Positions are exactly 0..N-1 in attachment order, whatever the kinds.
        let mut pipeline = Pipeline::new();
        let a = pipeline.input().unwrap();
        let b = pipeline.output().unwrap();
        let c = pipeline.script("file-1").unwrap();
        let d = pipeline.decision(Vec::new()).unwrap();
        assert_eq!(
            vec![a.position(), b.position(), c.position(), d.position()],
            vec![0, 1, 2, 3]
        );
        for (idx, node) in pipeline.nodes().iter().enumerate() {
            assert_eq!(node.position(), Some(idx));
        }
    }

    #[test]
    fn test_labels_derived_from_kind_and_position() {
        let mut pipeline = Pipeline::new();
        let input = pipeline.input().unwrap();
        assert_eq!(pipeline.node(input).unwrap().display_label(), "INPUT-0");

        let named = pipeline.add_node(Node::output().with_label("result")).unwrap();
        assert_eq!(pipeline.node(named).unwrap().display_label(), "result");
    }

    #[test]
    fn test_reattaching_an_attached_node_fails() {
        let mut pipeline = Pipeline::new();
        let input = pipeline.input().unwrap();
        let detached_copy = pipeline.node(input).unwrap().clone();
        let err = pipeline.add_node(detached_copy).unwrap_err();
        assert!(matches!(err, DesignError::Precondition(_)));
        assert_eq!(pipeline.node_count(), 1);
    }

    #[test]
    fn test_asymmetric_mapping_rejected() {
        // One-sided param naming always fails; two-sided never does.
        let mut pipeline = Pipeline::new();
        let input = pipeline.input().unwrap();
        let output = pipeline.output().unwrap();

        let err = pipeline.link_with(input, output, Some("input"), None).unwrap_err();
        assert_eq!(err, DesignError::AsymmetricMapping);
        let err = pipeline.link_with(input, output, None, Some("output")).unwrap_err();
        assert_eq!(err, DesignError::AsymmetricMapping);
        assert_eq!(pipeline.link_count(), 0);

        pipeline
            .link_with(input, output, Some("input"), Some("output"))
            .unwrap();
        assert_eq!(pipeline.link_count(), 1);
    }

    #[test]
    fn test_link_unknown_param_fails() {
        let mut pipeline = Pipeline::new();
        let input = pipeline.input().unwrap();
        let output = pipeline.output().unwrap();
        let err = pipeline.link_params(input, "nope", output, "output").unwrap_err();
        assert_eq!(
            err,
            DesignError::ParamNotFound {
                node: "INPUT-0".into(),
                code: "nope".into(),
            }
        );
    }

    #[test]
    fn test_foreign_handle_rejected() {
        let mut first = Pipeline::new();
        let mut second = Pipeline::new();
        let a = first.input().unwrap();
        let b = second.output().unwrap();
        let err = first.link(a, b).unwrap_err();
        assert!(matches!(err, DesignError::UnattachedNode(_)));
    }

    #[test]
    fn test_link_returns_target_for_chaining() {
        let mut pipeline = Pipeline::new();
        let input = pipeline.input().unwrap();
        let model = pipeline.asset(&catalog(), "mt-en-fr").unwrap();
        let returned = pipeline.link(input, model).unwrap();
        assert_eq!(returned, model);
    }

    #[test]
    fn test_link_infers_missing_data_type() {
        let mut pipeline = Pipeline::new();
        let input = pipeline.input().unwrap();
        let model = pipeline.asset(&catalog(), "mt-en-fr").unwrap();

        // Input's `input` param has no type; the asset's `text` does.
        pipeline.link_params(input, "input", model, "text").unwrap();

        let node = pipeline.node(input).unwrap();
        assert_eq!(node.output("input").unwrap().data_type, Some(DataType::Text));
        match node.body() {
            NodeBody::Io { data_types, .. } => assert_eq!(data_types, &[DataType::Text]),
            other => panic!("unexpected body {:?}", other),
        }
    }

    #[test]
    fn test_link_data_type_mismatch_fails() {
        let mut pipeline = Pipeline::new();
        let mt = pipeline.asset(&catalog(), "mt-en-fr").unwrap();
        let asr = pipeline.asset(&catalog(), "asr-en").unwrap();
        // translation output is text; asr input wants audio
        let err = pipeline.link_params(mt, "data", asr, "source_audio").unwrap_err();
        assert_eq!(
            err,
            DesignError::DataTypeMismatch {
                from: DataType::Text,
                to: DataType::Audio,
            }
        );
        assert_eq!(pipeline.link_count(), 0);
    }

    #[test]
    fn test_validation_dangling_input() {
        // A lone input node fails; any outgoing link fixes it.
        let mut pipeline = Pipeline::new();
        let input = pipeline.input().unwrap();
        let err = pipeline.validate().unwrap_err();
        assert_eq!(err, DesignError::DanglingInput { label: "INPUT-0".into() });

        let output = pipeline.output().unwrap();
        pipeline.link(input, output).unwrap();
        assert!(pipeline.validate().is_ok());
        // validation is pure: running it again gives the same answer
        assert!(pipeline.validate().is_ok());
    }

    #[test]
    fn test_validation_dangling_output_and_disconnected() {
        let mut pipeline = Pipeline::new();
        let input = pipeline.input().unwrap();
        let output = pipeline.output().unwrap();
        pipeline.link(input, output).unwrap();
        let orphan = pipeline.output().unwrap();
        let err = pipeline.validate().unwrap_err();
        assert_eq!(err, DesignError::DanglingOutput { label: "OUTPUT-2".into() });

        // wire the orphan in, then break an asset instead
        pipeline.link(input, orphan).unwrap();
        let model = pipeline.asset(&catalog(), "asr-en").unwrap();
        pipeline.link(input, model).unwrap();
        let err = pipeline.validate().unwrap_err();
        assert_eq!(
            err,
            DesignError::DisconnectedNode { label: "ASSET-3".into() }
        );
    }

    #[test]
    fn test_validation_required_param() {
        let mut pipeline = Pipeline::new();
        let input = pipeline.input().unwrap();
        let model = pipeline.asset(&catalog(), "mt-en-fr").unwrap();
        let output = pipeline.output().unwrap();
        // map into the optional param only; the required `text` stays dry
        pipeline.link_params(input, "input", model, "language").unwrap();
        pipeline.link_params(model, "data", output, "output").unwrap();
        let err = pipeline.validate().unwrap_err();
        assert_eq!(
            err,
            DesignError::MissingRequiredParam {
                node: "ASSET-1".into(),
                code: "text".into(),
            }
        );

        // a literal satisfies it
        pipeline.set_param(model, "text", "Bonjour").unwrap();
        assert!(pipeline.validate().is_ok());
    }

    #[test]
    fn test_ensure_runnable_wants_a_worker_node() {
        let mut pipeline = Pipeline::new();
        let input = pipeline.input().unwrap();
        let output = pipeline.output().unwrap();
        pipeline.link(input, output).unwrap();
        assert!(pipeline.validate().is_ok());
        assert_eq!(pipeline.ensure_runnable().unwrap_err(), DesignError::IncompletePipeline);
    }

    #[test]
    fn test_translation_scenario_serializes_pass_through() {
        // Input → Asset(translation) → Output with pass-through links.
        let mut pipeline = Pipeline::new();
        let input = pipeline.input().unwrap();
        let model = pipeline.asset(&catalog(), "mt-en-fr").unwrap();
        let output = pipeline.output().unwrap();
        pipeline.link(input, model).unwrap();
        pipeline.link(model, output).unwrap();

        assert!(pipeline.validate().is_ok());
        assert!(pipeline.ensure_runnable().is_ok());

        let wire = pipeline.serialize();
        let links = wire["links"].as_array().unwrap();
        assert_eq!(links.len(), 2);
        assert_eq!(links[0]["from"], 0);
        assert_eq!(links[0]["to"], 1);
        assert_eq!(links[0]["paramMapping"].as_array().unwrap().len(), 0);

        let nodes = wire["nodes"].as_array().unwrap();
        assert_eq!(nodes.len(), 3);
        assert_eq!(nodes[1]["type"], "ASSET");
        assert_eq!(nodes[1]["assetId"], "mt-en-fr");
        assert_eq!(nodes[1]["function"], "translation");
        assert_eq!(nodes[1]["supplier"], "acme");
        assert_eq!(nodes[1]["version"], "2.1");
        assert_eq!(nodes[1]["number"], 1);
    }

    #[test]
    fn test_serialization_round_trip_counts_and_order() {
        // Re-hydrating the wire object preserves counts and link order.
        let mut pipeline = Pipeline::new();
        let input = pipeline.input().unwrap();
        let model = pipeline.asset(&catalog(), "mt-en-fr").unwrap();
        let output = pipeline.output().unwrap();
        pipeline.link_params(input, "input", model, "text").unwrap();
        pipeline.link_params(model, "data", output, "output").unwrap();

        let wire = pipeline.serialize();
        let nodes = wire["nodes"].as_array().unwrap();
        let links: Vec<Link> = serde_json::from_value(wire["links"].clone()).unwrap();

        assert_eq!(nodes.len(), pipeline.node_count());
        assert_eq!(links.len(), pipeline.link_count());
        for (rehydrated, original) in links.iter().zip(pipeline.links()) {
            assert_eq!(rehydrated, original);
        }

        // serialize() is read-only: a second pass is identical
        assert_eq!(pipeline.serialize(), wire);
    }

    #[test]
    fn test_route_builds_router_and_branches() {
        let mut pipeline = Pipeline::new();
        let input = pipeline.input().unwrap();
        let mt = pipeline.asset(&catalog(), "mt-en-fr").unwrap();
        let asr = pipeline.asset(&catalog(), "asr-en").unwrap();

        let router = pipeline
            .route(input, &[(mt, "text"), (asr, "source_audio")])
            .unwrap();

        let node = pipeline.node(router).unwrap();
        assert_eq!(node.kind(), NodeKind::Router);
        assert_eq!(node.outputs().len(), 1);
        assert!(node.output("input").is_some());
        match node.body() {
            NodeBody::Routing { routes } => {
                assert_eq!(routes.len(), 2);
                assert_eq!(routes[0].path, vec![mt.position()]);
                assert_eq!(routes[1].path, vec![asr.position()]);
            }
            other => panic!("unexpected body {:?}", other),
        }

        // input→router plus router→each target
        assert_eq!(pipeline.link_count(), 3);
        assert_eq!(pipeline.links()[0].from_node, input.position());
        assert_eq!(pipeline.links()[0].to_node, router.position());
    }

    #[test]
    fn test_use_output_creates_single_terminal_node() {
        let mut pipeline = Pipeline::new();
        let model = pipeline.asset(&catalog(), "mt-en-fr").unwrap();
        let before = pipeline.node_count();
        let out = pipeline.use_output(model, "data").unwrap();
        assert_eq!(pipeline.node_count(), before + 1);
        assert_eq!(pipeline.node(out).unwrap().kind(), NodeKind::Output);
        assert_eq!(pipeline.links().last().unwrap().param_mapping[0].to_param, "output");

        // unknown param leaves the graph untouched
        let err = pipeline.use_output(model, "missing").unwrap_err();
        assert!(matches!(err, DesignError::ParamNotFound { .. }));
        assert_eq!(pipeline.node_count(), before + 1);
    }

    #[test]
    fn test_decision_output_copies_passthrough_type() {
        let mut pipeline = Pipeline::new();
        let mt = pipeline.asset(&catalog(), "mt-en-fr").unwrap();
        let decision = pipeline.decision(Vec::new()).unwrap();
        let output = pipeline.output().unwrap();

        // typed source flows into passthrough, typing it as text
        pipeline.link_params(mt, "data", decision, "passthrough").unwrap();
        assert_eq!(
            pipeline.node(decision).unwrap().input("passthrough").unwrap().data_type,
            Some(DataType::Text)
        );
        // the decision's output is untyped until a link leaves it
        assert_eq!(
            pipeline.node(decision).unwrap().output("input").unwrap().data_type,
            None
        );

        pipeline.link_params(decision, "input", output, "output").unwrap();
        assert_eq!(
            pipeline.node(decision).unwrap().output("input").unwrap().data_type,
            Some(DataType::Text)
        );
    }

    #[test]
    fn test_add_link_bounds_checked() {
        let mut pipeline = Pipeline::new();
        let _ = pipeline.input().unwrap();
        let err = pipeline
            .add_link(Link {
                from_node: 0,
                to_node: 7,
                param_mapping: Vec::new(),
            })
            .unwrap_err();
        assert!(matches!(err, DesignError::UnattachedNode(_)));
    }

    #[test]
    fn test_remote_handle_lifecycle() {
        let mut pipeline = Pipeline::new();
        assert!(pipeline.remote_handle().is_none());
        pipeline.set_remote_handle("https://platform.example.com/poll/abc123");
        assert_eq!(
            pipeline.remote_handle(),
            Some("https://platform.example.com/poll/abc123")
        );
    }
}
