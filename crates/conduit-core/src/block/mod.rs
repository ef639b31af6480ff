mod runner;
mod types;

pub use runner::{run_block, BlockOutcome, HttpClient, ReqwestHttpClient, RenderPayload};
pub use types::{BlockHeader, FieldType, FlowBlock, FormField, HttpMethod, OAuthHandler, TransformFn};
