//! Error types for the engine and the adapter boundary.

use quire_tree::TreeError;
use thiserror::Error;

/// Boxed error carried from plugin, command and sink code.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors raised by an [`Adapter`](crate::Adapter).
#[derive(Error, Debug)]
pub enum AdapterError {
    /// The document could not be turned into blocks.
    #[error("parse error: {0}")]
    Parse(String),

    /// The blocks could not be turned into a document.
    #[error("serialize error: {0}")]
    Serialize(String),

    /// The adapter has no definition for this block type.
    #[error("unknown block type: {0}")]
    UnknownBlockType(String),
}

/// Errors returned by [`Engine`](crate::Engine) operations.
///
/// Any error means nothing was committed: the tree, history, selection and
/// focus are exactly as they were before the call.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error(transparent)]
    Tree(#[from] TreeError),

    #[error(transparent)]
    Adapter(#[from] AdapterError),

    /// A plugin hook rejected the operation.
    #[error("plugin {plugin} rejected the operation: {source}")]
    Plugin {
        plugin: String,
        #[source]
        source: BoxError,
    },

    #[error("plugin already registered: {0}")]
    DuplicatePlugin(String),

    #[error("unknown command: {0}")]
    UnknownCommand(String),

    /// The command's guard returned false.
    #[error("command not available: {0}")]
    CommandUnavailable(String),

    /// A command body failed.
    #[error("command {command} failed: {source}")]
    Command {
        command: String,
        #[source]
        source: BoxError,
    },

    /// Converting would strand children in a type without regions.
    #[error("cannot convert {block_id} to {new_type}: block has children but {new_type} declares no regions")]
    IncompatibleConversion { block_id: String, new_type: String },

    /// The document sink failed to persist the serialized document.
    #[error("sink error: {0}")]
    Sink(#[source] BoxError),

    #[error("config error: {0}")]
    Config(String),
}

impl EngineError {
    pub(crate) fn plugin(plugin: &str, source: anyhow::Error) -> Self {
        Self::Plugin {
            plugin: plugin.to_string(),
            source: source.into(),
        }
    }
}

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, EngineError>;
