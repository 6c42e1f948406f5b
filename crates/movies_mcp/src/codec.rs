//! Line-framed JSON-RPC 2.0 transport (spec.md §4.7).
//!
//! One JSON object per line in, one JSON object per line out. Whitespace-only
//! lines are ignored. Every parsed line with an `id` is dispatched to its own
//! task so independent calls can proceed concurrently (spec.md §5); writes to
//! the output stream are serialised by a mutex so response lines never
//! interleave.

use std::future::Future;
use std::sync::Arc;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::{watch, Mutex};
use tracing::{debug, warn};

use crate::protocol::{ErrorCode, JsonRpcError, JsonRpcRequest, JsonRpcResponse, RequestId};

/// Writes one JSON-RPC response as a single line, flushing immediately so
/// the caller on the other end of the pipe observes it promptly.
pub async fn send_response<W: AsyncWrite + Unpin>(
    writer: &Mutex<W>,
    response: &JsonRpcResponse,
) -> std::io::Result<()> {
    let line = serde_json::to_string(response).expect("JsonRpcResponse always serializes");
    let mut writer = writer.lock().await;
    writer.write_all(line.as_bytes()).await?;
    writer.write_all(b"\n").await?;
    writer.flush().await
}

pub async fn send_result<W: AsyncWrite + Unpin>(
    writer: &Mutex<W>,
    id: RequestId,
    payload: serde_json::Value,
) -> std::io::Result<()> {
    send_response(writer, &JsonRpcResponse::success(id, payload)).await
}

pub async fn send_error<W: AsyncWrite + Unpin>(
    writer: &Mutex<W>,
    id: RequestId,
    error: JsonRpcError,
) -> std::io::Result<()> {
    send_response(writer, &JsonRpcResponse::error(id, error)).await
}

/// Parses one input line into a request, or a parse-error response to send
/// back verbatim (spec.md: malformed JSON yields `id: null` and -32700).
fn parse_line(line: &str) -> Result<JsonRpcRequest, JsonRpcResponse> {
    serde_json::from_str(line).map_err(|e| {
        JsonRpcResponse::error(
            RequestId::Null,
            JsonRpcError::new(ErrorCode::ParseError, format!("invalid JSON: {e}")),
        )
    })
}

/// Reads lines from `reader` until EOF, handing each parsed request to
/// `handler` on its own task. `handler` returns `None` for notifications
/// (no response line emitted) and `Some(response)` otherwise. Returns once
/// EOF is observed and every spawned task has completed.
pub async fn listen<R, W, H, Fut>(
    mut reader: R,
    writer: Arc<Mutex<W>>,
    shutdown: watch::Sender<bool>,
    handler: H,
) -> std::io::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin + Send + 'static,
    H: Fn(JsonRpcRequest, watch::Receiver<bool>) -> Fut + Clone + Send + 'static,
    Fut: Future<Output = Option<JsonRpcResponse>> + Send + 'static,
{
    let mut line = String::new();
    let mut tasks = Vec::new();

    loop {
        line.clear();
        let bytes_read = reader.read_line(&mut line).await?;
        if bytes_read == 0 {
            break;
        }

        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        debug!(line = trimmed, "received request line");

        let writer = Arc::clone(&writer);
        let handler = handler.clone();
        let cancel = shutdown.subscribe();
        let owned_line = trimmed.to_string();

        let task = tokio::spawn(async move {
            let response = match parse_line(&owned_line) {
                Ok(request) => {
                    let is_notification = request.is_notification();
                    match handler(request, cancel).await {
                        Some(response) if !is_notification => Some(response),
                        _ => None,
                    }
                }
                Err(parse_error_response) => Some(parse_error_response),
            };

            if let Some(response) = response {
                if let Err(e) = send_response(&writer, &response).await {
                    warn!(error = %e, "failed to write response");
                }
            }
        });
        tasks.push(task);
    }

    let _ = shutdown.send(true);
    for task in tasks {
        let _ = task.await;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[tokio::test]
    async fn malformed_json_yields_parse_error_with_null_id() {
        let input = tokio::io::BufReader::new(Cursor::new(b"not json\n".to_vec()));
        let output: Vec<u8> = Vec::new();
        let writer = Arc::new(Mutex::new(output));
        let (tx, _rx) = watch::channel(false);

        listen(input, Arc::clone(&writer), tx, |req, _cancel| async move {
            Some(JsonRpcResponse::success(req.id.unwrap_or(RequestId::Null), serde_json::json!(null)))
        })
        .await
        .unwrap();

        let bytes = writer.lock().await;
        let text = String::from_utf8(bytes.clone()).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(text.trim()).unwrap();
        assert_eq!(parsed["error"]["code"], -32700);
        assert_eq!(parsed["id"], serde_json::Value::Null);
    }

    #[tokio::test]
    async fn notification_produces_no_response_line() {
        let input = tokio::io::BufReader::new(Cursor::new(br#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#.to_vec()));
        let output: Vec<u8> = Vec::new();
        let writer = Arc::new(Mutex::new(output));
        let (tx, _rx) = watch::channel(false);

        listen(input, Arc::clone(&writer), tx, |_req, _cancel| async move {
            Some(JsonRpcResponse::success(RequestId::Null, serde_json::json!(null)))
        })
        .await
        .unwrap();

        let bytes = writer.lock().await;
        assert!(bytes.is_empty());
    }

    #[tokio::test]
    async fn blank_lines_are_ignored() {
        let input = tokio::io::BufReader::new(Cursor::new(b"\n   \n{\"jsonrpc\":\"2.0\",\"id\":1,\"method\":\"ping\"}\n".to_vec()));
        let output: Vec<u8> = Vec::new();
        let writer = Arc::new(Mutex::new(output));
        let (tx, _rx) = watch::channel(false);

        listen(input, Arc::clone(&writer), tx, |req, _cancel| async move {
            Some(JsonRpcResponse::success(req.id.unwrap(), serde_json::json!({})))
        })
        .await
        .unwrap();

        let bytes = writer.lock().await;
        let text = String::from_utf8(bytes.clone()).unwrap();
        assert_eq!(text.lines().count(), 1);
    }
}
