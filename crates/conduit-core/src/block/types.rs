//! Declarative flow block kinds.
//!
//! Every block kind shares a header (label, description) and is either
//! interactive (must suspend the session until the caller supplies input) or
//! non-interactive (runs to completion in a single pass).

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::context::FlowContext;
use crate::errors::FlowError;
use crate::templated::Templated;

#[derive(Debug, Clone)]
pub struct BlockHeader {
    pub label: String,
    pub description: Option<String>,
}

impl BlockHeader {
    pub fn new(label: impl Into<String>) -> Self {
        Self { label: label.into(), description: None }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    Text,
    Email,
    Number,
    Url,
    Password,
    Tel,
}

#[derive(Debug, Clone)]
pub struct FormField {
    pub name: String,
    pub label: String,
    pub field_type: FieldType,
    pub required: bool,
    pub default_value: Option<Value>,
    pub placeholder: Option<String>,
}

impl FormField {
    pub fn new(name: impl Into<String>, label: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
            field_type,
            required: true,
            default_value: None,
            placeholder: None,
        }
    }

    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl HttpMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
        }
    }
}

/// Pure, non-interactive computation over the context (e.g. reshaping an
/// earlier HTTP response into the value a later block needs).
pub trait TransformFn: Send + Sync {
    fn call(&self, ctx: &FlowContext) -> Result<Value, FlowError>;
}

impl<F> TransformFn for F
where
    F: Fn(&FlowContext) -> Result<Value, FlowError> + Send + Sync,
{
    fn call(&self, ctx: &FlowContext) -> Result<Value, FlowError> {
        self(ctx)
    }
}

/// Connector-specific OAuth exchange. `start` produces whatever the caller
/// needs to render (typically an authorization URL); `complete` exchanges
/// the caller-supplied redirect payload for tokens.
#[async_trait]
pub trait OAuthHandler: Send + Sync {
    async fn start(&self, ctx: &FlowContext) -> Result<Value, FlowError>;
    async fn complete(&self, ctx: &FlowContext, provided: &Value) -> Result<Value, FlowError>;
}

#[derive(Clone)]
pub enum FlowBlock {
    Form {
        header: BlockHeader,
        fields: Vec<FormField>,
    },
    Confirm {
        header: BlockHeader,
        title: Templated<String>,
        message: Templated<String>,
    },
    Display {
        header: BlockHeader,
        title: Templated<String>,
        content: Templated<String>,
    },
    OAuth {
        header: BlockHeader,
        handler: Arc<dyn OAuthHandler>,
    },
    Http {
        header: BlockHeader,
        method: HttpMethod,
        url: Templated<String>,
        headers: Templated<Vec<(String, String)>>,
        body: Option<Templated<Value>>,
        timeout: Duration,
    },
    Transform {
        header: BlockHeader,
        transform: Arc<dyn TransformFn>,
    },
    Delay {
        header: BlockHeader,
        duration: Duration,
    },
    Log {
        header: BlockHeader,
        message: Templated<String>,
    },
}

impl FlowBlock {
    pub fn header(&self) -> &BlockHeader {
        match self {
            FlowBlock::Form { header, .. }
            | FlowBlock::Confirm { header, .. }
            | FlowBlock::Display { header, .. }
            | FlowBlock::OAuth { header, .. }
            | FlowBlock::Http { header, .. }
            | FlowBlock::Transform { header, .. }
            | FlowBlock::Delay { header, .. }
            | FlowBlock::Log { header, .. } => header,
        }
    }

    /// Whether this kind suspends the session until the caller supplies
    /// input. Form, Confirm, Display and OAuth all surface something to the
    /// caller and wait for an acknowledgement or answer; the rest run
    /// straight through.
    pub fn requires_interaction(&self) -> bool {
        matches!(self, FlowBlock::Form { .. } | FlowBlock::Confirm { .. } | FlowBlock::Display { .. } | FlowBlock::OAuth { .. })
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            FlowBlock::Form { .. } => "form",
            FlowBlock::Confirm { .. } => "confirm",
            FlowBlock::Display { .. } => "display",
            FlowBlock::OAuth { .. } => "oauth",
            FlowBlock::Http { .. } => "http",
            FlowBlock::Transform { .. } => "transform",
            FlowBlock::Delay { .. } => "delay",
            FlowBlock::Log { .. } => "log",
        }
    }
}

impl fmt::Debug for FlowBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FlowBlock")
            .field("kind", &self.kind_name())
            .field("label", &self.header().label)
            .finish()
    }
}
