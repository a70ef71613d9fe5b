//! The recursive block node.
//!
//! A [`Block`] is a typed node of document content. Its `type` tag decides how
//! `content` and `config` are interpreted, but that knowledge lives entirely
//! in the adapter: nothing in quire looks inside those maps except the text
//! operations (split/merge), which address a single named string field.
//!
//! Container blocks hold children in named **regions**. Each block owns its
//! region vectors by value, so a block can only ever live in one place.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{new_block_id, now_millis};

/// Type-dependent field map used for `content` and `config`.
pub type Fields = serde_json::Map<String, serde_json::Value>;

/// Named child slots. `BTreeMap` gives the canonical (sorted) region order
/// used by every traversal.
pub type Regions = BTreeMap<String, Vec<Block>>;

/// Creation/update bookkeeping for a block.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockMetadata {
    /// Unix millis when the block was created.
    pub created_at: u64,
    /// Unix millis of the last content/config mutation.
    pub updated_at: u64,
    /// Incremented on every content/config mutation. Starts at 1.
    pub version: u64,
}

impl BlockMetadata {
    /// Fresh metadata stamped with the current time.
    pub fn new() -> Self {
        let now = now_millis();
        Self {
            created_at: now,
            updated_at: now,
            version: 1,
        }
    }

    /// Record a mutation: bump the version and the update timestamp.
    pub fn touch(&mut self) {
        self.version += 1;
        self.updated_at = now_millis().max(self.updated_at);
    }
}

impl Default for BlockMetadata {
    fn default() -> Self {
        Self::new()
    }
}

/// A node in the document tree.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Block {
    /// Unique across the whole tree, at every depth and in every region.
    pub id: String,
    /// Variant tag, interpreted by the adapter.
    #[serde(rename = "type")]
    pub block_type: String,
    /// Type-dependent content fields.
    #[serde(default)]
    pub content: Fields,
    /// Presentation/behavior settings.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<Fields>,
    /// Child blocks by region name. `None` (or all-empty) means leaf.
    /// Empty regions are never written out.
    #[serde(
        default,
        skip_serializing_if = "no_children",
        serialize_with = "serialize_regions"
    )]
    pub regions: Option<Regions>,
    #[serde(default)]
    pub metadata: BlockMetadata,
}

fn no_children(regions: &Option<Regions>) -> bool {
    regions
        .as_ref()
        .is_none_or(|regions| regions.values().all(Vec::is_empty))
}

fn serialize_regions<S: serde::Serializer>(
    regions: &Option<Regions>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_map(
        regions
            .iter()
            .flat_map(|regions| regions.iter())
            .filter(|(_, children)| !children.is_empty()),
    )
}

impl Block {
    /// Create an empty block of the given type with a freshly minted id.
    pub fn new(block_type: impl Into<String>) -> Self {
        Self::with_id(new_block_id(), block_type)
    }

    /// Create an empty block with an explicit id.
    pub fn with_id(id: impl Into<String>, block_type: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            block_type: block_type.into(),
            content: Fields::new(),
            config: None,
            regions: None,
            metadata: BlockMetadata::new(),
        }
    }

    /// Set one content field.
    pub fn field(mut self, name: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.content.insert(name.into(), value.into());
        self
    }

    /// Set the conventional `text` content field.
    pub fn text(self, text: impl Into<String>) -> Self {
        self.field("text", text.into())
    }

    /// Set one config field.
    pub fn config_field(
        mut self,
        name: impl Into<String>,
        value: impl Into<serde_json::Value>,
    ) -> Self {
        self.config
            .get_or_insert_with(Fields::new)
            .insert(name.into(), value.into());
        self
    }

    /// Append a child to the named region, creating the region if needed.
    pub fn child(mut self, region: impl Into<String>, child: Block) -> Self {
        self.region_mut(region).push(child);
        self
    }

    /// Read a string content field.
    pub fn text_field(&self, field: &str) -> Option<&str> {
        self.content.get(field).and_then(|v| v.as_str())
    }

    /// Children of a region (empty if the region does not exist).
    pub fn children(&self, region: &str) -> &[Block] {
        self.regions
            .as_ref()
            .and_then(|regions| regions.get(region))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Mutable access to a region, creating it (and the region map) if absent.
    pub fn region_mut(&mut self, region: impl Into<String>) -> &mut Vec<Block> {
        self.regions
            .get_or_insert_with(Regions::new)
            .entry(region.into())
            .or_default()
    }

    /// Iterate non-empty regions in canonical order.
    pub fn regions_iter(&self) -> impl Iterator<Item = (&String, &Vec<Block>)> {
        self.regions
            .iter()
            .flat_map(|regions| regions.iter())
            .filter(|(_, children)| !children.is_empty())
    }

    /// True if the block holds no children in any region.
    pub fn is_leaf(&self) -> bool {
        self.regions_iter().next().is_none()
    }

    /// Number of blocks in this subtree, including `self`.
    pub fn subtree_len(&self) -> usize {
        1 + self
            .regions_iter()
            .flat_map(|(_, children)| children.iter())
            .map(Block::subtree_len)
            .sum::<usize>()
    }

    /// Copy of this block without its regions.
    pub fn shell(&self) -> Block {
        Block {
            id: self.id.clone(),
            block_type: self.block_type.clone(),
            content: self.content.clone(),
            config: self.config.clone(),
            regions: None,
            metadata: self.metadata,
        }
    }

    /// Compare everything except regions.
    pub fn fields_eq(&self, other: &Block) -> bool {
        self.id == other.id
            && self.block_type == other.block_type
            && self.content == other.content
            && self.config == other.config
            && self.metadata == other.metadata
    }
}

/// Document equality: an empty region and a missing region hold the same
/// (zero) children, so they compare equal.
impl PartialEq for Block {
    fn eq(&self, other: &Self) -> bool {
        if !self.fields_eq(other) {
            return false;
        }
        let mut ours = self.regions_iter();
        let mut theirs = other.regions_iter();
        loop {
            match (ours.next(), theirs.next()) {
                (None, None) => return true,
                (Some((a_name, a)), Some((b_name, b))) => {
                    if a_name != b_name || a != b {
                        return false;
                    }
                }
                _ => return false,
            }
        }
    }
}

/// Partial content/config for a shallow merge.
///
/// Fields present in the patch overwrite the block's fields of the same name;
/// everything else is left as it was.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BlockPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<Fields>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<Fields>,
}

impl BlockPatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one content field to the patch.
    pub fn content_field(
        mut self,
        name: impl Into<String>,
        value: impl Into<serde_json::Value>,
    ) -> Self {
        self.content
            .get_or_insert_with(Fields::new)
            .insert(name.into(), value.into());
        self
    }

    /// Add one config field to the patch.
    pub fn config_field(
        mut self,
        name: impl Into<String>,
        value: impl Into<serde_json::Value>,
    ) -> Self {
        self.config
            .get_or_insert_with(Fields::new)
            .insert(name.into(), value.into());
        self
    }

    /// Shallow-merge this patch into a block. Does not touch metadata.
    pub fn apply_to(&self, block: &mut Block) {
        if let Some(content) = &self.content {
            for (name, value) in content {
                block.content.insert(name.clone(), value.clone());
            }
        }
        if let Some(config) = &self.config {
            let target = block.config.get_or_insert_with(Fields::new);
            for (name, value) in config {
                target.insert(name.clone(), value.clone());
            }
        }
    }
}
