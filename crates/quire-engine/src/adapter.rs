//! The adapter boundary.
//!
//! An [`Adapter`] converts between a concrete document format and the block
//! tree, and is the only place that knows what a block `type` means. The
//! engine asks it for block definitions, fresh blocks and validation, but
//! never interprets content itself.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use quire_types::{Block, Fields};

use crate::commands::{CommandContext, CommandEffect};
use crate::error::AdapterError;

/// One content field of a block type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDefinition {
    pub name: String,
    /// Holds a string that split/merge may operate on.
    #[serde(default)]
    pub text: bool,
    #[serde(default)]
    pub required: bool,
    /// Value given to freshly created blocks.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
}

impl FieldDefinition {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            text: false,
            required: false,
            default: None,
        }
    }

    /// A text field defaulting to the empty string.
    pub fn text(name: impl Into<String>) -> Self {
        Self {
            text: true,
            default: Some(Value::String(String::new())),
            ..Self::new(name)
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn with_default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }
}

/// What an adapter knows about one block type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockDefinition {
    #[serde(rename = "type")]
    pub block_type: String,
    pub label: String,
    #[serde(default)]
    pub fields: Vec<FieldDefinition>,
    /// Region names this type may hold children in. Empty = leaf type.
    #[serde(default)]
    pub regions: Vec<String>,
}

impl BlockDefinition {
    pub fn new(block_type: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            block_type: block_type.into(),
            label: label.into(),
            fields: Vec::new(),
            regions: Vec::new(),
        }
    }

    pub fn with_field(mut self, field: FieldDefinition) -> Self {
        self.fields.push(field);
        self
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.regions.push(region.into());
        self
    }

    pub fn supports_regions(&self) -> bool {
        !self.regions.is_empty()
    }

    pub fn has_region(&self, region: &str) -> bool {
        self.regions.iter().any(|r| r == region)
    }

    pub fn field(&self, name: &str) -> Option<&FieldDefinition> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Content map for a fresh block: field defaults overlaid by `initial`.
    pub fn initial_content(&self, initial: Option<Fields>) -> Fields {
        let mut content: Fields = self
            .fields
            .iter()
            .filter_map(|f| f.default.clone().map(|v| (f.name.clone(), v)))
            .collect();
        if let Some(initial) = initial {
            content.extend(initial);
        }
        content
    }
}

/// A non-fatal problem reported by [`Adapter::validate_block`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationIssue {
    pub block_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    pub message: String,
}

impl ValidationIssue {
    pub fn new(block_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            block_id: block_id.into(),
            field: None,
            message: message.into(),
        }
    }

    pub fn for_field(
        block_id: impl Into<String>,
        field: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            field: Some(field.into()),
            ..Self::new(block_id, message)
        }
    }
}

/// Document format and block-type knowledge.
#[async_trait]
pub trait Adapter: Send + Sync {
    /// Adapter name, for logs.
    fn name(&self) -> &str;

    /// Turn a document into a block tree.
    async fn parse(&self, document: &str) -> Result<Vec<Block>, AdapterError>;

    /// Turn a block tree into a document.
    async fn serialize(&self, blocks: &[Block]) -> Result<String, AdapterError>;

    /// Every block type this adapter knows.
    fn available_blocks(&self) -> Vec<BlockDefinition>;

    /// Definition of one block type, if known.
    fn block_definition(&self, block_type: &str) -> Option<BlockDefinition>;

    /// Build a fresh block of `block_type`, optionally seeded with content.
    async fn create_block(
        &self,
        block_type: &str,
        initial: Option<Fields>,
    ) -> Result<Block, AdapterError>;

    /// Check one block (not its children). An empty list means valid.
    async fn validate_block(&self, block: &Block) -> Vec<ValidationIssue>;

    /// Handle a command id the engine does not know.
    ///
    /// `Ok(None)` means the adapter does not know it either.
    async fn execute_command(
        &self,
        command: &str,
        ctx: &CommandContext<'_>,
    ) -> anyhow::Result<Option<CommandEffect>> {
        let _ = (command, ctx);
        Ok(None)
    }
}
