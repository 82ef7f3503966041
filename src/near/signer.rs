//! State-changing calls through a wallet signer relay.
//!
//! The relay holds the account's keys; we send it the function call to sign
//! and broadcast and wait for the final outcome.

use super::rpc::{read_limited_bytes, MAX_RESPONSE_SIZE};
use crate::feed::SourceError;
use crate::util::validate_endpoint;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

/// Gas attached to function calls (30 TGas).
pub const DEFAULT_GAS: u64 = 30_000_000_000_000;

/// Longest error text from the relay kept in [`SourceError::Rejected`].
const MAX_ERROR_LEN: usize = 200;

#[derive(Serialize)]
struct FunctionCall<'a> {
    signer_id: &'a str,
    receiver_id: &'a str,
    method_name: &'a str,
    args: Value,
    /// yoctoNEAR as a decimal string; u128 does not fit a JSON number.
    deposit: String,
    gas: String,
}

#[derive(Deserialize, Default)]
struct CallOutcome {
    #[serde(default)]
    transaction_hash: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// Signs function calls for one account via an HTTP relay.
pub struct SignerClient {
    client: reqwest::Client,
    call_url: url::Url,
    account_id: String,
    token: Option<SecretString>,
    timeout: Duration,
}

impl std::fmt::Debug for SignerClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignerClient")
            .field("call_url", &self.call_url.as_str())
            .field("account_id", &self.account_id)
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

impl SignerClient {
    pub fn new(
        client: reqwest::Client,
        signer_url: &str,
        account_id: impl Into<String>,
        token: Option<SecretString>,
        timeout: Duration,
    ) -> Result<Self, crate::util::UrlValidationError> {
        let mut base = validate_endpoint(signer_url)?;
        // join() replaces the last segment unless the path ends in '/'
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        let call_url = base.join("call")?;
        Ok(Self {
            client,
            call_url,
            account_id: account_id.into(),
            token,
            timeout,
        })
    }

    pub fn account_id(&self) -> &str {
        &self.account_id
    }

    /// Sign and send `method_name(args)` on `receiver_id` with `deposit` yoctoNEAR.
    pub async fn call(
        &self,
        receiver_id: &str,
        method_name: &str,
        args: Value,
        deposit: u128,
    ) -> Result<(), SourceError> {
        let payload = FunctionCall {
            signer_id: &self.account_id,
            receiver_id,
            method_name,
            args,
            deposit: deposit.to_string(),
            gas: DEFAULT_GAS.to_string(),
        };

        let mut request = self.client.post(self.call_url.clone()).json(&payload);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token.expose_secret());
        }

        let response = tokio::time::timeout(self.timeout, request.send())
            .await
            .map_err(|_| SourceError::Timeout)?
            .map_err(SourceError::Network)?;
        let status = response.status();
        let body = tokio::time::timeout(
            self.timeout,
            read_limited_bytes(response, MAX_RESPONSE_SIZE),
        )
        .await
        .map_err(|_| SourceError::Timeout)??;

        if status.is_server_error() {
            return Err(SourceError::HttpStatus(status.as_u16()));
        }

        let outcome: CallOutcome = serde_json::from_slice(&body).unwrap_or_default();
        if !status.is_success() {
            let reason = outcome
                .error
                .unwrap_or_else(|| String::from_utf8_lossy(&body).into_owned());
            return Err(SourceError::Rejected(clip(&reason, status.as_u16())));
        }
        if let Some(error) = outcome.error {
            return Err(SourceError::Rejected(clip(&error, status.as_u16())));
        }

        tracing::info!(
            signer = %self.account_id,
            receiver = receiver_id,
            method = method_name,
            tx = outcome.transaction_hash.as_deref().unwrap_or("unknown"),
            "Function call accepted"
        );
        Ok(())
    }
}

fn clip(reason: &str, status: u16) -> String {
    let reason = reason.trim();
    if reason.is_empty() {
        return format!("status {status}");
    }
    match reason.char_indices().nth(MAX_ERROR_LEN) {
        Some((idx, _)) => format!("{}...", &reason[..idx]),
        None => reason.to_string(),
    }
}
