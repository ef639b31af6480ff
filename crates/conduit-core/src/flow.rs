//! A flow: an ordered sequence of named blocks plus an optional return
//! transform applied once every block has completed.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use serde_json::Value;

use crate::block::FlowBlock;
use crate::context::FlowContext;
use crate::errors::FlowError;

pub trait ReturnTransform: Send + Sync {
    fn apply(&self, ctx: &FlowContext) -> Result<Value, FlowError>;
}

impl<F> ReturnTransform for F
where
    F: Fn(&FlowContext) -> Result<Value, FlowError> + Send + Sync,
{
    fn apply(&self, ctx: &FlowContext) -> Result<Value, FlowError> {
        self(ctx)
    }
}

#[derive(Clone)]
pub struct Flow {
    pub name: String,
    pub block_order: Vec<String>,
    pub blocks: IndexMap<String, FlowBlock>,
    pub return_transform: Option<Arc<dyn ReturnTransform>>,
}

impl fmt::Debug for Flow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Flow")
            .field("name", &self.name)
            .field("block_order", &self.block_order)
            .finish()
    }
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum FlowDefinitionError {
    #[error("block order references unknown block {0}")]
    UnknownBlock(String),
    #[error("block order is missing block {0}")]
    MissingFromOrder(String),
    #[error("block order must not be empty")]
    Empty,
}

impl Flow {
    pub fn builder(name: impl Into<String>) -> FlowBuilder {
        FlowBuilder { name: name.into(), block_order: Vec::new(), blocks: IndexMap::new(), return_transform: None }
    }

    pub fn block_at(&self, name: &str) -> Option<&FlowBlock> {
        self.blocks.get(name)
    }

    pub fn validate(&self) -> Result<(), FlowDefinitionError> {
        if self.block_order.is_empty() {
            return Err(FlowDefinitionError::Empty);
        }
        for name in &self.block_order {
            if !self.blocks.contains_key(name) {
                return Err(FlowDefinitionError::UnknownBlock(name.clone()));
            }
        }
        for name in self.blocks.keys() {
            if !self.block_order.contains(name) {
                return Err(FlowDefinitionError::MissingFromOrder(name.clone()));
            }
        }
        Ok(())
    }
}

pub struct FlowBuilder {
    name: String,
    block_order: Vec<String>,
    blocks: IndexMap<String, FlowBlock>,
    return_transform: Option<Arc<dyn ReturnTransform>>,
}

impl FlowBuilder {
    pub fn block(mut self, name: impl Into<String>, block: FlowBlock) -> Self {
        let name = name.into();
        self.block_order.push(name.clone());
        self.blocks.insert(name, block);
        self
    }

    pub fn return_transform(mut self, transform: Arc<dyn ReturnTransform>) -> Self {
        self.return_transform = Some(transform);
        self
    }

    pub fn build(self) -> Result<Flow, FlowDefinitionError> {
        let flow = Flow {
            name: self.name,
            block_order: self.block_order,
            blocks: self.blocks,
            return_transform: self.return_transform,
        };
        flow.validate()?;
        Ok(flow)
    }
}
