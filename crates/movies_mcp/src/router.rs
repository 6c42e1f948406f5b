//! Method dispatch (spec.md §4.9): one router instance per connection,
//! tracking the three-state handshake explicitly rather than in scattered
//! booleans (spec.md §9).

use std::sync::Arc;

use serde_json::{json, Value};
use tokio::sync::{watch, Mutex};
use tracing::error;

use crate::protocol::{
    methods, AppError, ContentBlock, ErrorCode, InitializeResult, JsonRpcError, JsonRpcRequest,
    JsonRpcResponse, PromptGetParams, PromptGetResult, PromptMessage, PromptsListResult,
    RequestId, ResourceContents, ResourceReadParams, ResourcesListResult, ResourcesReadResult,
    ServerCapabilities, ServerInfo, ToolCallParams, ToolCallResult, ToolsListResult,
    JSONRPC_VERSION, MCP_PROTOCOL_VERSION,
};
use crate::registry::Registry;
use crate::schema::validate;
use crate::AppState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ProtocolState {
    Uninitialized,
    Initialized,
    Active,
    Closed,
}

pub struct Router {
    registry: Arc<Registry>,
    state: Arc<AppState>,
    protocol_state: Mutex<ProtocolState>,
}

impl Router {
    pub fn new(registry: Arc<Registry>, state: Arc<AppState>) -> Self {
        Self {
            registry,
            state,
            protocol_state: Mutex::new(ProtocolState::Uninitialized),
        }
    }

    /// Marks the connection closed. Called once `codec::listen` observes EOF.
    pub async fn close(&self) {
        *self.protocol_state.lock().await = ProtocolState::Closed;
    }

    pub async fn dispatch(
        &self,
        request: JsonRpcRequest,
        _cancel: watch::Receiver<bool>,
    ) -> Option<JsonRpcResponse> {
        let id = request.id.clone().unwrap_or(RequestId::Null);

        let Some(method) = request.method.as_deref() else {
            return Some(error_response(id, ErrorCode::InvalidRequest, "request is missing \"method\""));
        };
        if request.jsonrpc.is_none() {
            return Some(error_response(id, ErrorCode::InvalidRequest, "request is missing \"jsonrpc\""));
        }

        let params = request.params.unwrap_or(Value::Null);

        match method {
            methods::INITIALIZE => Some(self.handle_initialize(id).await),
            methods::INITIALIZED => {
                *self.protocol_state.lock().await = ProtocolState::Active;
                None
            }
            methods::TOOLS_LIST => Some(self.handle_tools_list(id)),
            methods::TOOLS_CALL => Some(self.handle_tools_call(id, params).await),
            methods::RESOURCES_LIST => Some(self.handle_resources_list(id)),
            methods::RESOURCES_READ => Some(self.handle_resources_read(id, params).await),
            methods::RESOURCE_TEMPLATES_LIST => Some(success_response(id, json!({"resourceTemplates": []}))),
            methods::PROMPTS_LIST => Some(self.handle_prompts_list(id)),
            methods::PROMPTS_GET => Some(self.handle_prompts_get(id, params).await),
            methods::COMPLETION_COMPLETE => Some(error_response(
                id,
                ErrorCode::MethodNotFound,
                "completion/complete is not supported",
            )),
            methods::LOGGING_SET_LEVEL => Some(success_response(id, Value::Null)),
            other => Some(error_response(id, ErrorCode::MethodNotFound, format!("unknown method {other}"))),
        }
    }

    async fn handle_initialize(&self, id: RequestId) -> JsonRpcResponse {
        *self.protocol_state.lock().await = ProtocolState::Initialized;
        let result = InitializeResult {
            protocol_version: MCP_PROTOCOL_VERSION.to_string(),
            capabilities: ServerCapabilities::default(),
            server_info: ServerInfo {
                name: self.state.server_name().to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
        };
        success_response(id, serde_json::to_value(result).expect("InitializeResult always serializes"))
    }

    fn handle_tools_list(&self, id: RequestId) -> JsonRpcResponse {
        let result = ToolsListResult {
            tools: self.registry.tool_descriptors(),
        };
        success_response(id, serde_json::to_value(result).expect("ToolsListResult always serializes"))
    }

    async fn handle_tools_call(&self, id: RequestId, params: Value) -> JsonRpcResponse {
        let call: ToolCallParams = match serde_json::from_value(params) {
            Ok(call) => call,
            Err(e) => return error_response(id, ErrorCode::InvalidParams, format!("malformed tools/call params: {e}")),
        };

        let Some(handler) = self.registry.get_tool(&call.name) else {
            return error_response(id, ErrorCode::MethodNotFound, format!("unknown tool {}", call.name));
        };

        let schema = handler.input_schema();
        let violations = validate(&schema, &call.arguments, "");
        if !violations.is_empty() {
            return JsonRpcResponse::error(
                id,
                JsonRpcError::with_data(
                    ErrorCode::InvalidParams,
                    format!("invalid arguments for tool {}", call.name),
                    json!({"errors": violations}),
                ),
            );
        }

        let state = Arc::clone(&self.state);
        let arguments = call.arguments;
        let outcome = tokio::spawn(async move { handler.call(&state, arguments).await }).await;

        match outcome {
            Ok(Ok(value)) => {
                let result = ToolCallResult {
                    content: vec![ContentBlock::text(value.to_string())],
                    is_error: false,
                };
                success_response(id, serde_json::to_value(result).expect("ToolCallResult always serializes"))
            }
            Ok(Err(app_err)) => JsonRpcResponse::error(id, JsonRpcError::from(app_err)),
            Err(join_err) => {
                error!(error = %join_err, tool = %call.name, "tool handler panicked");
                error_response(id, ErrorCode::InternalError, format!("tool {} panicked", call.name))
            }
        }
    }

    fn handle_resources_list(&self, id: RequestId) -> JsonRpcResponse {
        let result = ResourcesListResult {
            resources: self.registry.resource_descriptors(),
        };
        success_response(id, serde_json::to_value(result).expect("ResourcesListResult always serializes"))
    }

    async fn handle_resources_read(&self, id: RequestId, params: Value) -> JsonRpcResponse {
        let read: ResourceReadParams = match serde_json::from_value(params) {
            Ok(read) => read,
            Err(e) => return error_response(id, ErrorCode::InvalidParams, format!("malformed resources/read params: {e}")),
        };

        if let Some(handler) = self.registry.get_resource(&read.uri) {
            return self.run_resource_read(id, read.uri, move |state| {
                let handler = Arc::clone(&handler);
                async move { handler.read(&state).await }
            })
            .await;
        }

        if let Some((handler, param)) = self.registry.match_resource_template(&read.uri) {
            let uri = read.uri.clone();
            return self
                .run_resource_read(id, uri, move |state| {
                    let handler = Arc::clone(&handler);
                    let param = param.clone();
                    async move { handler.read(&state, &param).await }
                })
                .await;
        }

        error_response(id, ErrorCode::MethodNotFound, format!("unknown resource {}", read.uri))
    }

    async fn run_resource_read<F, Fut>(&self, id: RequestId, uri: String, build: F) -> JsonRpcResponse
    where
        F: FnOnce(Arc<AppState>) -> Fut,
        Fut: std::future::Future<Output = Result<Value, AppError>> + Send + 'static,
    {
        let state = Arc::clone(&self.state);
        let outcome = tokio::spawn(build(state)).await;

        match outcome {
            Ok(Ok(value)) => {
                let contents = shape_resource_contents(&uri, value);
                let result = ResourcesReadResult { contents: vec![contents] };
                success_response(id, serde_json::to_value(result).expect("ResourcesReadResult always serializes"))
            }
            Ok(Err(app_err)) => JsonRpcResponse::error(id, JsonRpcError::from(app_err)),
            Err(join_err) => {
                error!(error = %join_err, uri = %uri, "resource handler panicked");
                error_response(id, ErrorCode::InternalError, format!("resource {uri} panicked"))
            }
        }
    }

    fn handle_prompts_list(&self, id: RequestId) -> JsonRpcResponse {
        let result = PromptsListResult {
            prompts: self.registry.prompt_descriptors(),
        };
        success_response(id, serde_json::to_value(result).expect("PromptsListResult always serializes"))
    }

    async fn handle_prompts_get(&self, id: RequestId, params: Value) -> JsonRpcResponse {
        let get: PromptGetParams = match serde_json::from_value(params) {
            Ok(get) => get,
            Err(e) => return error_response(id, ErrorCode::InvalidParams, format!("malformed prompts/get params: {e}")),
        };

        let Some(handler) = self.registry.get_prompt(&get.name) else {
            return error_response(id, ErrorCode::MethodNotFound, format!("unknown prompt {}", get.name));
        };

        let arguments = get.arguments;
        let outcome = tokio::spawn(async move { handler.render(arguments).await }).await;

        match outcome {
            Ok(Ok(text)) => {
                let result = PromptGetResult {
                    description: None,
                    messages: vec![PromptMessage {
                        role: "user".to_string(),
                        content: ContentBlock::text(text),
                    }],
                };
                success_response(id, serde_json::to_value(result).expect("PromptGetResult always serializes"))
            }
            Ok(Err(app_err)) => JsonRpcResponse::error(id, JsonRpcError::from(app_err)),
            Err(join_err) => {
                error!(error = %join_err, prompt = %get.name, "prompt handler panicked");
                error_response(id, ErrorCode::InternalError, format!("prompt {} panicked", get.name))
            }
        }
    }
}

/// Binary poster reads carry a `blob`; everything else is serialized JSON text.
fn shape_resource_contents(uri: &str, value: Value) -> ResourceContents {
    if let Some(blob) = value.get("blob").and_then(Value::as_str) {
        return ResourceContents {
            uri: uri.to_string(),
            mime_type: value
                .get("mimeType")
                .and_then(Value::as_str)
                .unwrap_or("image/jpeg")
                .to_string(),
            text: None,
            blob: Some(blob.to_string()),
        };
    }

    ResourceContents {
        uri: uri.to_string(),
        mime_type: "application/json".to_string(),
        text: Some(value.to_string()),
        blob: None,
    }
}

fn success_response(id: RequestId, payload: Value) -> JsonRpcResponse {
    JsonRpcResponse::success(id, payload)
}

fn error_response(id: RequestId, code: ErrorCode, message: impl Into<String>) -> JsonRpcResponse {
    JsonRpcResponse::error(id, JsonRpcError::new(code, message))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn jsonrpc_version_constant_is_two_point_zero() {
        assert_eq!(JSONRPC_VERSION, "2.0");
    }
}
