//! Plugins and the hook chain.
//!
//! A plugin sees every mutation before it happens. Per-operation hooks run in
//! registration order; each receives the previous hook's output and may
//! transform it or reject the whole operation by returning an error. The
//! first rejection stops the chain and nothing is committed.

use std::sync::Arc;

use async_trait::async_trait;

use quire_types::{Block, BlockPatch, MoveRequest};

use crate::commands::Command;
use crate::error::{EngineError, Result};

/// Editor extension. Every hook has a pass-through default.
#[async_trait]
pub trait Plugin: Send + Sync {
    /// Unique plugin id.
    fn id(&self) -> &str;

    async fn on_editor_mount(&self) -> anyhow::Result<()> {
        Ok(())
    }

    async fn on_editor_unmount(&self) -> anyhow::Result<()> {
        Ok(())
    }

    /// A block is about to be inserted.
    async fn on_block_create(&self, block: Block) -> anyhow::Result<Block> {
        Ok(block)
    }

    /// A block is about to be patched.
    async fn on_block_update(&self, block_id: &str, patch: BlockPatch) -> anyhow::Result<BlockPatch> {
        let _ = block_id;
        Ok(patch)
    }

    /// A block (with its subtree) is about to be removed.
    async fn on_block_delete(&self, block: &Block) -> anyhow::Result<()> {
        let _ = block;
        Ok(())
    }

    /// A block is about to be moved.
    async fn on_block_move(&self, request: MoveRequest) -> anyhow::Result<MoveRequest> {
        Ok(request)
    }

    /// A freshly parsed document is about to replace the tree.
    async fn on_document_load(&self, blocks: Vec<Block>) -> anyhow::Result<Vec<Block>> {
        Ok(blocks)
    }

    /// The tree is about to be serialized for saving.
    async fn on_document_save(&self, blocks: Vec<Block>) -> anyhow::Result<Vec<Block>> {
        Ok(blocks)
    }

    /// Commands this plugin contributes while registered.
    fn commands(&self) -> Vec<Arc<dyn Command>> {
        Vec::new()
    }
}

/// Ordered plugin list with the fold over each hook kind.
///
/// Cloning is cheap and shares the plugins, which is how the auto-save task
/// gets its own copy for `on_document_save`.
#[derive(Clone, Default)]
pub struct PluginChain {
    plugins: Vec<Arc<dyn Plugin>>,
}

impl std::fmt::Debug for PluginChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.ids()).finish()
    }
}

impl PluginChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a plugin; ids must be unique.
    pub fn add(&mut self, plugin: Arc<dyn Plugin>) -> Result<()> {
        if self.get(plugin.id()).is_some() {
            return Err(EngineError::DuplicatePlugin(plugin.id().to_string()));
        }
        self.plugins.push(plugin);
        Ok(())
    }

    pub fn remove(&mut self, id: &str) -> Option<Arc<dyn Plugin>> {
        let index = self.plugins.iter().position(|p| p.id() == id)?;
        Some(self.plugins.remove(index))
    }

    pub fn get(&self, id: &str) -> Option<&Arc<dyn Plugin>> {
        self.plugins.iter().find(|p| p.id() == id)
    }

    pub fn ids(&self) -> Vec<&str> {
        self.plugins.iter().map(|p| p.id()).collect()
    }

    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &Arc<dyn Plugin>> {
        self.plugins.iter()
    }

    pub async fn block_create(&self, mut block: Block) -> Result<Block> {
        for plugin in &self.plugins {
            block = plugin
                .on_block_create(block)
                .await
                .map_err(|e| rejected(&**plugin, "create", e))?;
        }
        Ok(block)
    }

    pub async fn block_update(&self, block_id: &str, mut patch: BlockPatch) -> Result<BlockPatch> {
        for plugin in &self.plugins {
            patch = plugin
                .on_block_update(block_id, patch)
                .await
                .map_err(|e| rejected(&**plugin, "update", e))?;
        }
        Ok(patch)
    }

    pub async fn block_delete(&self, block: &Block) -> Result<()> {
        for plugin in &self.plugins {
            plugin
                .on_block_delete(block)
                .await
                .map_err(|e| rejected(&**plugin, "delete", e))?;
        }
        Ok(())
    }

    pub async fn block_move(&self, mut request: MoveRequest) -> Result<MoveRequest> {
        for plugin in &self.plugins {
            request = plugin
                .on_block_move(request)
                .await
                .map_err(|e| rejected(&**plugin, "move", e))?;
        }
        Ok(request)
    }

    pub async fn document_load(&self, mut blocks: Vec<Block>) -> Result<Vec<Block>> {
        for plugin in &self.plugins {
            blocks = plugin
                .on_document_load(blocks)
                .await
                .map_err(|e| rejected(&**plugin, "load", e))?;
        }
        Ok(blocks)
    }

    pub async fn document_save(&self, mut blocks: Vec<Block>) -> Result<Vec<Block>> {
        for plugin in &self.plugins {
            blocks = plugin
                .on_document_save(blocks)
                .await
                .map_err(|e| rejected(&**plugin, "save", e))?;
        }
        Ok(blocks)
    }
}

fn rejected(plugin: &dyn Plugin, hook: &str, error: anyhow::Error) -> EngineError {
    tracing::debug!(plugin = plugin.id(), hook, error = %error, "plugin rejected operation");
    EngineError::plugin(plugin.id(), error)
}
