//! Reference adapter: documents are JSON arrays of blocks.
//!
//! The block catalog is data. [`JsonAdapter::new`] ships a small default set
//! (paragraph, heading, quote, columns, image); hosts add or replace types with
//! [`JsonAdapter::with_definition`].

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde_json::Value;

use quire_tree::validate_tree;
use quire_types::{Block, Fields};

use crate::adapter::{Adapter, BlockDefinition, FieldDefinition, ValidationIssue};
use crate::error::AdapterError;

/// JSON document adapter with a configurable block catalog.
#[derive(Debug, Clone)]
pub struct JsonAdapter {
    catalog: BTreeMap<String, BlockDefinition>,
    pretty: bool,
}

impl Default for JsonAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl JsonAdapter {
    /// Adapter with the default catalog.
    pub fn new() -> Self {
        let defaults = [
            BlockDefinition::new("paragraph", "Paragraph").with_field(FieldDefinition::text("text")),
            BlockDefinition::new("heading", "Heading")
                .with_field(FieldDefinition::text("text"))
                .with_field(FieldDefinition::new("level").with_default(1)),
            BlockDefinition::new("quote", "Quote")
                .with_field(FieldDefinition::text("text"))
                .with_region("body"),
            BlockDefinition::new("columns", "Columns")
                .with_region("left")
                .with_region("right"),
            BlockDefinition::new("image", "Image")
                .with_field(FieldDefinition::new("src").required())
                .with_field(FieldDefinition::text("caption")),
        ];
        Self::empty().with_definitions(defaults)
    }

    /// Adapter that knows no block types.
    pub fn empty() -> Self {
        Self {
            catalog: BTreeMap::new(),
            pretty: true,
        }
    }

    /// Add or replace one block type.
    pub fn with_definition(mut self, definition: BlockDefinition) -> Self {
        self.catalog
            .insert(definition.block_type.clone(), definition);
        self
    }

    pub fn with_definitions(self, definitions: impl IntoIterator<Item = BlockDefinition>) -> Self {
        definitions
            .into_iter()
            .fold(self, |adapter, def| adapter.with_definition(def))
    }

    /// Emit compact JSON instead of pretty-printed.
    pub fn compact(mut self) -> Self {
        self.pretty = false;
        self
    }
}

#[async_trait]
impl Adapter for JsonAdapter {
    fn name(&self) -> &str {
        "json"
    }

    async fn parse(&self, document: &str) -> Result<Vec<Block>, AdapterError> {
        if document.trim().is_empty() {
            return Ok(Vec::new());
        }
        let blocks: Vec<Block> =
            serde_json::from_str(document).map_err(|e| AdapterError::Parse(e.to_string()))?;
        validate_tree(&blocks).map_err(|e| AdapterError::Parse(e.to_string()))?;
        Ok(blocks)
    }

    async fn serialize(&self, blocks: &[Block]) -> Result<String, AdapterError> {
        let text = if self.pretty {
            serde_json::to_string_pretty(blocks)
        } else {
            serde_json::to_string(blocks)
        };
        text.map_err(|e| AdapterError::Serialize(e.to_string()))
    }

    fn available_blocks(&self) -> Vec<BlockDefinition> {
        self.catalog.values().cloned().collect()
    }

    fn block_definition(&self, block_type: &str) -> Option<BlockDefinition> {
        self.catalog.get(block_type).cloned()
    }

    async fn create_block(
        &self,
        block_type: &str,
        initial: Option<Fields>,
    ) -> Result<Block, AdapterError> {
        let definition = self
            .catalog
            .get(block_type)
            .ok_or_else(|| AdapterError::UnknownBlockType(block_type.to_string()))?;
        let mut block = Block::new(block_type);
        block.content = definition.initial_content(initial);
        Ok(block)
    }

    async fn validate_block(&self, block: &Block) -> Vec<ValidationIssue> {
        let Some(definition) = self.catalog.get(&block.block_type) else {
            return vec![ValidationIssue::new(
                &block.id,
                format!("unknown block type {:?}", block.block_type),
            )];
        };

        let mut issues = Vec::new();
        for field in &definition.fields {
            match block.content.get(&field.name) {
                None | Some(Value::Null) if field.required => {
                    issues.push(ValidationIssue::for_field(&block.id, &field.name, "required field is missing"));
                }
                Some(value) if field.text && !value.is_string() && !value.is_null() => {
                    issues.push(ValidationIssue::for_field(&block.id, &field.name, "expected text"));
                }
                _ => {}
            }
        }
        for (region, _) in block.regions_iter() {
            if !definition.has_region(region) {
                issues.push(ValidationIssue::new(
                    &block.id,
                    format!("{} does not allow region {region:?}", block.block_type),
                ));
            }
        }
        issues
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_parse_and_serialize() {
        let adapter = JsonAdapter::new();
        let doc = r#"[
            {"id": "a", "type": "paragraph", "content": {"text": "hi"}},
            {"id": "q", "type": "quote", "regions": {"body": [
                {"id": "n", "type": "paragraph", "content": {"text": "inner"}}
            ]}}
        ]"#;

        let blocks = adapter.parse(doc).await.unwrap();
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[1].children("body")[0].id, "n");

        let text = adapter.serialize(&blocks).await.unwrap();
        assert_eq!(adapter.parse(&text).await.unwrap(), blocks);
    }

    #[tokio::test]
    async fn test_parse_empty_document() {
        let adapter = JsonAdapter::new();
        assert!(adapter.parse("  \n").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_parse_rejects_bad_json_and_duplicates() {
        let adapter = JsonAdapter::new();
        assert!(matches!(adapter.parse("{nope").await, Err(AdapterError::Parse(_))));

        let dup = r#"[{"id": "a", "type": "paragraph"}, {"id": "a", "type": "paragraph"}]"#;
        let err = adapter.parse(dup).await.unwrap_err();
        assert!(err.to_string().contains("duplicate block id"));
    }

    #[tokio::test]
    async fn test_create_block_uses_defaults() {
        let adapter = JsonAdapter::new();
        let mut initial = Fields::new();
        initial.insert("text".into(), json!("Title"));

        let block = adapter.create_block("heading", Some(initial)).await.unwrap();
        assert_eq!(block.block_type, "heading");
        assert_eq!(block.content["text"], json!("Title"));
        assert_eq!(block.content["level"], json!(1));
        assert!(!block.id.is_empty());

        let err = adapter.create_block("video", None).await.unwrap_err();
        assert!(matches!(err, AdapterError::UnknownBlockType(t) if t == "video"));
    }

    #[tokio::test]
    async fn test_validate_block() {
        let adapter = JsonAdapter::new();

        let ok = Block::with_id("q", "quote").text("x").child("body", Block::with_id("p", "paragraph"));
        assert!(adapter.validate_block(&ok).await.is_empty());

        let image = Block::with_id("i", "image").field("caption", 5);
        let issues = adapter.validate_block(&image).await;
        let fields: Vec<_> = issues.iter().filter_map(|i| i.field.as_deref()).collect();
        assert_eq!(fields, vec!["src", "caption"]);

        let stray = Block::with_id("p", "paragraph").child("body", Block::with_id("c", "paragraph"));
        assert_eq!(adapter.validate_block(&stray).await.len(), 1);

        let unknown = Block::with_id("u", "video");
        assert_eq!(adapter.validate_block(&unknown).await[0].block_id, "u");
    }

    #[test]
    fn test_catalog_is_extensible() {
        let adapter = JsonAdapter::empty()
            .with_definition(BlockDefinition::new("callout", "Callout").with_region("body"));
        assert_eq!(adapter.available_blocks().len(), 1);
        assert!(adapter.block_definition("callout").unwrap().supports_regions());
        assert!(adapter.block_definition("paragraph").is_none());
        assert_eq!(JsonAdapter::new().available_blocks().len(), 5);
    }
}
