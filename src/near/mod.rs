//! NEAR guest book contract access.
//!
//! - [`rpc`] - JSON-RPC view calls (`total_messages`, `get_messages`)
//! - [`signer`] - `add_message` through a wallet signer relay
//! - [`amount`] - NEAR to yoctoNEAR conversion for attached donations
//!
//! [`Guestbook`] ties them together as a [`FeedSource`].

mod amount;
mod rpc;
mod signer;

pub use amount::{parse_near_amount, AmountError, NEAR_NOMINATION_EXP};
pub use rpc::RpcClient;
pub use signer::{SignerClient, DEFAULT_GAS};

use crate::feed::{FeedSource, Message, SourceError};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

/// One message as stored by the contract.
#[derive(Debug, Deserialize)]
struct PostedMessage {
    #[serde(default)]
    premium: bool,
    sender: String,
    text: String,
}

/// The guest book contract: reads through RPC, writes through the signer.
///
/// Without a signer the feed is read-only and `append` fails with
/// [`SourceError::NotSignedIn`].
pub struct Guestbook {
    rpc: RpcClient,
    signer: Option<SignerClient>,
}

impl Guestbook {
    pub fn new(rpc: RpcClient, signer: Option<SignerClient>) -> Self {
        Self { rpc, signer }
    }

    pub fn contract_id(&self) -> &str {
        self.rpc.contract_id()
    }

    /// Account that signs submissions, if any.
    pub fn account_id(&self) -> Option<&str> {
        self.signer.as_ref().map(SignerClient::account_id)
    }
}

#[async_trait]
impl FeedSource for Guestbook {
    async fn count(&self) -> Result<u64, SourceError> {
        self.rpc.view("total_messages", &json!({})).await
    }

    async fn range(&self, from: u64, limit: u64) -> Result<Vec<Message>, SourceError> {
        // U64 arguments travel as decimal strings
        let args = json!({
            "from_index": from.to_string(),
            "limit": limit.to_string(),
        });
        let posted: Vec<PostedMessage> = self.rpc.view("get_messages", &args).await?;
        if posted.len() as u64 > limit {
            return Err(SourceError::InvalidResponse(format!(
                "get_messages returned {} entries for limit {}",
                posted.len(),
                limit
            )));
        }

        Ok(posted
            .into_iter()
            .zip(from..)
            .map(|(m, index)| Message {
                index,
                sender: Arc::from(m.sender),
                text: Arc::from(m.text),
                premium: m.premium,
            })
            .collect())
    }

    async fn append(&self, text: &str, deposit: u128) -> Result<(), SourceError> {
        let signer = self.signer.as_ref().ok_or(SourceError::NotSignedIn)?;
        signer
            .call(
                self.rpc.contract_id(),
                "add_message",
                json!({ "text": text }),
                deposit,
            )
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::Value;
    use std::time::Duration;
    use wiremock::matchers::{body_partial_json, method};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn call_result(value: Value) -> Value {
        json!({
            "jsonrpc": "2.0",
            "id": "guestbook",
            "result": { "result": serde_json::to_vec(&value).unwrap(), "logs": [] }
        })
    }

    fn guestbook_for(server: &MockServer) -> Guestbook {
        let rpc = RpcClient::new(
            reqwest::Client::new(),
            &server.uri(),
            "guestbook.testnet",
            Duration::from_secs(5),
        )
        .unwrap();
        Guestbook::new(rpc, None)
    }

    #[tokio::test]
    async fn test_range_assigns_global_indices() {
        let server = MockServer::start().await;
        let args = base64::Engine::encode(
            &base64::engine::general_purpose::STANDARD,
            br#"{"from_index":"30","limit":"2"}"#,
        );
        Mock::given(method("POST"))
            .and(body_partial_json(json!({
                "params": { "method_name": "get_messages", "args_base64": args }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(call_result(json!([
                { "premium": false, "sender": "alice.testnet", "text": "first" },
                { "premium": true, "sender": "bob.testnet", "text": "second" }
            ]))))
            .mount(&server)
            .await;

        let messages = guestbook_for(&server).range(30, 2).await.unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].index, 30);
        assert_eq!(&*messages[0].sender, "alice.testnet");
        assert_eq!(messages[1].index, 31);
        assert!(messages[1].premium);
    }

    #[tokio::test]
    async fn test_count() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(call_result(json!(130))))
            .mount(&server)
            .await;

        assert_eq!(guestbook_for(&server).count().await.unwrap(), 130);
    }

    #[tokio::test]
    async fn test_overlong_window_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(call_result(json!([
                { "sender": "a.testnet", "text": "1" },
                { "sender": "b.testnet", "text": "2" }
            ]))))
            .mount(&server)
            .await;

        let err = guestbook_for(&server).range(0, 1).await.unwrap_err();
        assert!(matches!(err, SourceError::InvalidResponse(_)));
    }

    #[tokio::test]
    async fn test_append_without_signer() {
        let server = MockServer::start().await;
        let err = guestbook_for(&server).append("hi", 0).await.unwrap_err();
        assert!(matches!(err, SourceError::NotSignedIn));
    }
}
