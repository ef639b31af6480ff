//! conduit-connectors: illustrative connectors exercising the flow block
//! library and execution core end to end.
//!
//! `api_key` is a minimal non-interactive-auth REST connector; `oauth` is
//! a fuller OAuth2 connector (authorize, exchange, refresh) in the shape of
//! a typical CRM integration.

pub mod api_key;
pub mod oauth;
