//! Uniform run contract for flow blocks.
//!
//! Every block kind is driven through the same entry point: call it once
//! with `provided = None`. Interactive kinds answer with `AwaitingInput`
//! carrying a render payload for the caller to display; call it again with
//! the caller's answer in `provided` to obtain `Complete`. Non-interactive
//! kinds always resolve to `Complete` on the first call.

use std::time::Duration;

use serde_json::Value;

use super::types::{FlowBlock, HttpMethod};
use crate::context::FlowContext;
use crate::errors::FlowError;

#[derive(Debug, Clone)]
pub struct RenderPayload {
    pub kind: &'static str,
    pub label: String,
    pub description: Option<String>,
    pub data: Value,
}

#[derive(Debug, Clone)]
pub enum BlockOutcome {
    Complete(Value),
    AwaitingInput(RenderPayload),
}

#[async_trait::async_trait]
pub trait HttpClient: Send + Sync {
    async fn send(
        &self,
        method: HttpMethod,
        url: &str,
        headers: &[(String, String)],
        body: Option<&Value>,
        timeout: Duration,
    ) -> Result<Value, FlowError>;
}

/// `reqwest`-backed client used outside of tests.
pub struct ReqwestHttpClient {
    client: reqwest::Client,
}

impl ReqwestHttpClient {
    pub fn new() -> Self {
        Self { client: reqwest::Client::new() }
    }
}

impl Default for ReqwestHttpClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl HttpClient for ReqwestHttpClient {
    async fn send(
        &self,
        method: HttpMethod,
        url: &str,
        headers: &[(String, String)],
        body: Option<&Value>,
        timeout: Duration,
    ) -> Result<Value, FlowError> {
        let mut req = self
            .client
            .request(
                reqwest::Method::from_bytes(method.as_str().as_bytes()).map_err(|e| FlowError::Internal(e.to_string()))?,
                url,
            )
            .timeout(timeout);
        for (k, v) in headers {
            req = req.header(k, v);
        }
        if let Some(b) = body {
            req = req.json(b);
        }
        let resp = req.send().await.map_err(|e| FlowError::Upstream(e.to_string()))?;
        let status = resp.status();
        let value = resp.json::<Value>().await.unwrap_or(Value::Null);
        if !status.is_success() {
            return Err(FlowError::Upstream(format!("http {status}: {value}")));
        }
        Ok(value)
    }
}

pub async fn run_block(
    block: &FlowBlock,
    ctx: &FlowContext,
    provided: Option<&Value>,
    http: &dyn HttpClient,
) -> Result<BlockOutcome, FlowError> {
    match block {
        FlowBlock::Form { header, fields } => match provided {
            None => Ok(BlockOutcome::AwaitingInput(RenderPayload {
                kind: "form",
                label: header.label.clone(),
                description: header.description.clone(),
                data: serde_json::json!({
                    "fields": fields.iter().map(|f| serde_json::json!({
                        "name": f.name,
                        "label": f.label,
                        "required": f.required,
                        "placeholder": f.placeholder,
                        "defaultValue": f.default_value,
                    })).collect::<Vec<_>>(),
                }),
            })),
            Some(answers) => {
                for field in fields.iter().filter(|f| f.required) {
                    if answers.get(&field.name).is_none() {
                        return Err(FlowError::InvalidArgument(format!("missing required field {}", field.name)));
                    }
                }
                Ok(BlockOutcome::Complete(answers.clone()))
            }
        },
        FlowBlock::Confirm { header, title, message } => match provided {
            None => Ok(BlockOutcome::AwaitingInput(RenderPayload {
                kind: "confirm",
                label: header.label.clone(),
                description: header.description.clone(),
                data: serde_json::json!({"title": title.resolve(ctx), "message": message.resolve(ctx)}),
            })),
            Some(answer) => {
                let confirmed = answer.get("confirmed").and_then(Value::as_bool).unwrap_or(false);
                Ok(BlockOutcome::Complete(serde_json::json!({"confirmed": confirmed})))
            }
        },
        FlowBlock::Display { header, title, content } => match provided {
            None => Ok(BlockOutcome::AwaitingInput(RenderPayload {
                kind: "display",
                label: header.label.clone(),
                description: header.description.clone(),
                data: serde_json::json!({"title": title.resolve(ctx), "content": content.resolve(ctx)}),
            })),
            Some(_) => Ok(BlockOutcome::Complete(Value::Null)),
        },
        FlowBlock::OAuth { header, handler } => match provided {
            None => {
                let render = handler.start(ctx).await?;
                Ok(BlockOutcome::AwaitingInput(RenderPayload {
                    kind: "oauth",
                    label: header.label.clone(),
                    description: header.description.clone(),
                    data: render,
                }))
            }
            Some(answer) => Ok(BlockOutcome::Complete(handler.complete(ctx, answer).await?)),
        },
        FlowBlock::Http { method, url, headers, body, timeout, .. } => {
            let url = url.resolve(ctx);
            let headers = headers.resolve(ctx);
            let body = body.as_ref().map(|b| b.resolve(ctx));
            let result = http.send(*method, &url, &headers, body.as_ref(), *timeout).await?;
            Ok(BlockOutcome::Complete(result))
        }
        FlowBlock::Transform { transform, .. } => Ok(BlockOutcome::Complete(transform.call(ctx)?)),
        FlowBlock::Delay { duration, .. } => {
            tokio::time::sleep(*duration).await;
            Ok(BlockOutcome::Complete(Value::Null))
        }
        FlowBlock::Log { header, message } => {
            tracing::info!(block = %header.label, message = %message.resolve(ctx), "flow log block");
            Ok(BlockOutcome::Complete(Value::Null))
        }
    }
}
