//! Public facade crate for `toolpipe`.
//!
//! Re-exports the backend-agnostic types from `toolpipe-core` and provides
//! [`ToolHost`], the in-process host for embedding the dispatcher directly in
//! an agent runtime (the stdio MCP server lives in `toolpipe-mcp`).

pub use toolpipe_core::*;

mod host;
pub use host::ToolHost;
