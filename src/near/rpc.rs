//! Read-only access to a NEAR contract through JSON-RPC `call_function` queries.

use crate::feed::SourceError;
use crate::util::validate_endpoint;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use futures::StreamExt;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;

/// Maximum accepted response body (1MB).
pub(crate) const MAX_RESPONSE_SIZE: usize = 1024 * 1024;

/// Client for view calls against a single contract.
#[derive(Clone)]
pub struct RpcClient {
    client: reqwest::Client,
    endpoint: url::Url,
    contract_id: String,
    timeout: Duration,
}

#[derive(Deserialize)]
struct RpcResponse {
    result: Option<CallResult>,
    error: Option<Value>,
}

#[derive(Deserialize)]
struct CallResult {
    #[serde(default)]
    result: Option<Vec<u8>>,
    /// Older nodes report contract panics here instead of in `error`.
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    block_height: Option<u64>,
}

impl RpcClient {
    /// Build a client for `contract_id` on the node at `rpc_url`.
    ///
    /// Fails if the URL is not HTTPS (plain HTTP is allowed for localhost).
    pub fn new(
        client: reqwest::Client,
        rpc_url: &str,
        contract_id: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, crate::util::UrlValidationError> {
        Ok(Self {
            client,
            endpoint: validate_endpoint(rpc_url)?,
            contract_id: contract_id.into(),
            timeout,
        })
    }

    pub fn contract_id(&self) -> &str {
        &self.contract_id
    }

    /// Call view method `method` with JSON `args` and decode its JSON result.
    pub async fn view<T: DeserializeOwned>(
        &self,
        method: &str,
        args: &Value,
    ) -> Result<T, SourceError> {
        let args_json = serde_json::to_vec(args)
            .map_err(|e| SourceError::InvalidResponse(format!("unencodable args: {e}")))?;
        let body = json!({
            "jsonrpc": "2.0",
            "id": "guestbook",
            "method": "query",
            "params": {
                "request_type": "call_function",
                "finality": "final",
                "account_id": self.contract_id,
                "method_name": method,
                "args_base64": BASE64.encode(args_json),
            }
        });

        let request = self.client.post(self.endpoint.clone()).json(&body);
        let response = tokio::time::timeout(self.timeout, request.send())
            .await
            .map_err(|_| SourceError::Timeout)?
            .map_err(SourceError::Network)?;

        if !response.status().is_success() {
            return Err(SourceError::HttpStatus(response.status().as_u16()));
        }

        let bytes = tokio::time::timeout(
            self.timeout,
            read_limited_bytes(response, MAX_RESPONSE_SIZE),
        )
        .await
        .map_err(|_| SourceError::Timeout)??;

        let parsed: RpcResponse = serde_json::from_slice(&bytes)
            .map_err(|e| SourceError::InvalidResponse(format!("malformed JSON-RPC body: {e}")))?;

        if let Some(error) = parsed.error {
            return Err(SourceError::Rpc(describe_rpc_error(&error)));
        }
        let result = parsed
            .result
            .ok_or_else(|| SourceError::InvalidResponse("missing result".to_string()))?;
        if let Some(error) = result.error {
            return Err(SourceError::Rpc(error));
        }
        let raw = result
            .result
            .ok_or_else(|| SourceError::InvalidResponse("missing call result bytes".to_string()))?;

        tracing::trace!(
            method,
            block_height = result.block_height,
            bytes = raw.len(),
            "View call returned"
        );

        serde_json::from_slice(&raw).map_err(|e| {
            SourceError::InvalidResponse(format!("unexpected result from {method}: {e}"))
        })
    }
}

/// Prefer the most specific message the node gives us.
fn describe_rpc_error(error: &Value) -> String {
    let cause = error
        .pointer("/cause/name")
        .and_then(Value::as_str)
        .or_else(|| error.get("name").and_then(Value::as_str));
    let detail = error
        .get("data")
        .and_then(Value::as_str)
        .or_else(|| error.get("message").and_then(Value::as_str));

    match (cause, detail) {
        (Some(cause), Some(detail)) => format!("{cause}: {detail}"),
        (Some(only), None) | (None, Some(only)) => only.to_string(),
        (None, None) => error.to_string(),
    }
}

/// Read a response body, failing once it grows past `limit` bytes.
pub(crate) async fn read_limited_bytes(
    response: reqwest::Response,
    limit: usize,
) -> Result<Vec<u8>, SourceError> {
    if let Some(len) = response.content_length() {
        if len > limit as u64 {
            return Err(SourceError::ResponseTooLarge(limit));
        }
    }

    let mut bytes = Vec::new();
    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(SourceError::Network)?;
        if bytes.len().saturating_add(chunk.len()) > limit {
            return Err(SourceError::ResponseTooLarge(limit));
        }
        bytes.extend_from_slice(&chunk);
    }
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, method};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn call_result(value: Value) -> Value {
        json!({
            "jsonrpc": "2.0",
            "id": "guestbook",
            "result": {
                "result": serde_json::to_vec(&value).unwrap(),
                "logs": [],
                "block_height": 1234,
                "block_hash": "abc"
            }
        })
    }

    fn client_for(server: &MockServer) -> RpcClient {
        RpcClient::new(
            reqwest::Client::new(),
            &server.uri(),
            "guestbook.testnet",
            Duration::from_secs(5),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_view_decodes_result_bytes() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_partial_json(json!({
                "method": "query",
                "params": {
                    "request_type": "call_function",
                    "account_id": "guestbook.testnet",
                    "method_name": "total_messages",
                    "args_base64": "e30="
                }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(call_result(json!(42))))
            .mount(&server)
            .await;

        let total: u64 = client_for(&server)
            .view("total_messages", &json!({}))
            .await
            .unwrap();
        assert_eq!(total, 42);
    }

    #[tokio::test]
    async fn test_rpc_error_object() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "jsonrpc": "2.0",
                "id": "guestbook",
                "error": {
                    "name": "HANDLER_ERROR",
                    "cause": { "name": "UNKNOWN_ACCOUNT", "info": {} },
                    "code": -32000,
                    "message": "Server error",
                    "data": "account guestbook.testnet does not exist"
                }
            })))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .view::<u64>("total_messages", &json!({}))
            .await
            .unwrap_err();
        match err {
            SourceError::Rpc(msg) => {
                assert!(msg.starts_with("UNKNOWN_ACCOUNT"));
                assert!(msg.contains("does not exist"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_contract_panic_in_result() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "jsonrpc": "2.0",
                "id": "guestbook",
                "result": { "error": "wasm execution failed", "logs": [] }
            })))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .view::<u64>("total_messages", &json!({}))
            .await
            .unwrap_err();
        assert!(matches!(err, SourceError::Rpc(msg) if msg == "wasm execution failed"));
    }

    #[tokio::test]
    async fn test_http_500() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .view::<u64>("total_messages", &json!({}))
            .await
            .unwrap_err();
        assert!(matches!(err, SourceError::HttpStatus(500)));
    }

    #[tokio::test]
    async fn test_unexpected_result_shape() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(call_result(json!("nope"))))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .view::<u64>("total_messages", &json!({}))
            .await
            .unwrap_err();
        assert!(matches!(err, SourceError::InvalidResponse(_)));
    }

    #[tokio::test]
    async fn test_oversized_response_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200).set_body_string("x".repeat(MAX_RESPONSE_SIZE + 1)),
            )
            .mount(&server)
            .await;

        let err = client_for(&server)
            .view::<u64>("total_messages", &json!({}))
            .await
            .unwrap_err();
        assert!(matches!(err, SourceError::ResponseTooLarge(_)));
    }

    #[test]
    fn test_remote_http_endpoint_rejected() {
        let result = RpcClient::new(
            reqwest::Client::new(),
            "http://rpc.example.com",
            "guestbook.testnet",
            Duration::from_secs(5),
        );
        assert!(result.is_err());
    }
}
