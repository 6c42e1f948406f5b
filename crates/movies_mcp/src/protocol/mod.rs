//! Protocol Codec: line-framed JSON-RPC 2.0 envelope, MCP message shapes,
//! and the mapping from domain/storage errors onto wire error codes.

mod envelope;
mod error;
mod mcp;

pub use envelope::{ErrorCode, JsonRpcError, JsonRpcRequest, JsonRpcResponse, RequestId, JSONRPC_VERSION};
pub use error::AppError;
pub use mcp::{
    methods, ClientInfo, ContentBlock, InitializeParams, InitializeResult, PromptArgument,
    PromptDescriptor, PromptGetParams, PromptGetResult, PromptMessage, PromptsListResult,
    ResourceContents, ResourceDescriptor, ResourceReadParams, ResourcesListResult,
    ResourcesReadResult, ServerCapabilities, ServerInfo, ToolCallParams, ToolCallResult,
    ToolDescriptor, ToolsListResult, MCP_PROTOCOL_VERSION,
};
