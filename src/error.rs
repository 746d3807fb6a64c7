use crate::designer::DataType;
use thiserror::Error;

/// Errors raised while building or validating a pipeline graph.
///
/// All of these are local and synchronous: they abort the offending builder
/// call and leave the pipeline's previously valid state untouched. Failures
/// observed while *running* a graph live in
/// [`PlatformError`](crate::classifier::PlatformError) instead.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DesignError {
    /// A builder call was made out of order (e.g. attaching a node twice,
    /// or building a route with an empty path).
    #[error("precondition violated: {0}")]
    Precondition(String),

    /// A param with the same code already exists in that direction.
    #[error("node '{node}' already defines param '{code}'")]
    DuplicateParam { node: String, code: String },

    /// A remote asset does not expose the function the node subtype expects.
    #[error("asset '{asset_id}' exposes function '{actual}', expected '{expected}'")]
    AssetMismatch {
        asset_id: String,
        expected: String,
        actual: String,
    },

    /// The asset resolver has no spec for the given identifier.
    #[error("unknown asset '{0}'")]
    UnknownAsset(String),

    /// A param code could not be resolved on the node's input/output set.
    #[error("param '{code}' not found on node '{node}'")]
    ParamNotFound { node: String, code: String },

    /// Exactly one side of a param mapping was named; both or neither.
    #[error("from_param and to_param must be supplied together")]
    AsymmetricMapping,

    /// A node handle does not belong to this pipeline.
    #[error("node '{0}' is not attached to this pipeline")]
    UnattachedNode(String),

    /// Both ends of a link declare data types and they disagree.
    #[error("data type mismatch: cannot link {from} to {to}")]
    DataTypeMismatch { from: DataType, to: DataType },

    /// An input node has no outgoing link.
    #[error("input node '{label}' is not linked out")]
    DanglingInput { label: String },

    /// An output node has no incoming link.
    #[error("output node '{label}' is not linked in")]
    DanglingOutput { label: String },

    /// A processing node is missing an incoming or outgoing link.
    #[error("node '{label}' needs both an incoming and an outgoing link")]
    DisconnectedNode { label: String },

    /// The graph lacks one of: an input node, an output node, an asset or
    /// script node.
    #[error("pipeline needs at least one input, one output and one asset or script node")]
    IncompletePipeline,

    /// A required input param is neither set to a literal nor linked.
    #[error("required param '{code}' of node '{node}' is neither set nor linked")]
    MissingRequiredParam { node: String, code: String },
}

pub type Result<T> = std::result::Result<T, DesignError>;
