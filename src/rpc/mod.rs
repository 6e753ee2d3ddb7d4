use ethers_core::types::U256;
use log::debug;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicU64, Ordering};
use thiserror::Error;

use crate::abi::{self, sel, AbiError, UserRecord};

#[derive(Debug, Error)]
pub enum RpcError {
    /// Network/HTTP failure reaching the endpoint, or a non-JSON body.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    /// Well-formed JSON-RPC error response; carries the server's message.
    #[error("rpc error: {0}")]
    Rpc(String),
    #[error(transparent)]
    Codec(#[from] AbiError),
}

/// JSON-RPC-over-HTTP client for read-only `eth_*` calls.
///
/// The client owns its endpoint and its request-id counter, so there is no
/// ambient global state: every call site holds a reference to the one client
/// value. Ids start at 1 and are handed out by atomic increment, so
/// concurrently dispatched requests never share an id, and ids are never
/// reused even when a request fails.
///
/// This layer performs no retries; a failed call surfaces immediately to the
/// orchestrator, which aborts the whole snapshot.
pub struct RpcClient {
    http: reqwest::Client,
    endpoint: String,
    next_id: AtomicU64,
}

impl RpcClient {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint: endpoint.into(),
            next_id: AtomicU64::new(1),
        }
    }

    /// Rebinds the endpoint for all subsequent calls. The id counter keeps
    /// counting; ids stay unique across the rebind.
    pub fn set_endpoint(&mut self, endpoint: impl Into<String>) {
        self.endpoint = endpoint.into();
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Issues one JSON-RPC request and returns the `result` field verbatim.
    pub async fn call(&self, method: &str, params: Value) -> Result<Value, RpcError> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let envelope = json!({
            "jsonrpc": "2.0",
            "method": method,
            "params": params,
            "id": id,
        });
        debug!("rpc #{id} -> {method}");

        let response = self.http.post(&self.endpoint).json(&envelope).send().await?;
        let reply: Value = response.json().await?;

        if let Some(err) = reply.get("error") {
            let message = err
                .get("message")
                .and_then(Value::as_str)
                .map(str::to_owned)
                .unwrap_or_else(|| err.to_string());
            return Err(RpcError::Rpc(message));
        }
        Ok(reply.get("result").cloned().unwrap_or(Value::Null))
    }

    /// As `call`, for the common case of a hex-string result.
    async fn call_str(&self, method: &str, params: Value) -> Result<String, RpcError> {
        let result = self.call(method, params).await?;
        result
            .as_str()
            .map(str::to_owned)
            .ok_or_else(|| {
                AbiError::MalformedResponse(format!("{method} result is not a string: {result}"))
                    .into()
            })
    }

    pub async fn eth_get_balance(&self, address: &str) -> Result<U256, RpcError> {
        let hex = self
            .call_str("eth_getBalance", json!([address, "latest"]))
            .await?;
        Ok(abi::decode_uint(&hex)?)
    }

    pub async fn eth_call(&self, to: &str, data: &str) -> Result<String, RpcError> {
        self.call_str("eth_call", json!([{ "to": to, "data": data }, "latest"]))
            .await
    }

    pub async fn balance_of(&self, token: &str, holder: &str) -> Result<U256, RpcError> {
        let data = abi::build_calldata(sel::BALANCE_OF, &[abi::encode_address_arg(holder)?]);
        let hex = self.eth_call(token, &data).await?;
        Ok(abi::decode_uint(&hex)?)
    }

    pub async fn users(&self, vault: &str, holder: &str) -> Result<UserRecord, RpcError> {
        let data = abi::build_calldata(sel::USERS, &[abi::encode_address_arg(holder)?]);
        let hex = self.eth_call(vault, &data).await?;
        Ok(abi::decode_user_record(&hex)?)
    }

    pub async fn pending_yield(&self, vault: &str, holder: &str) -> Result<U256, RpcError> {
        let data = abi::build_calldata(sel::PENDING_YIELD, &[abi::encode_address_arg(holder)?]);
        let hex = self.eth_call(vault, &data).await?;
        Ok(abi::decode_uint(&hex)?)
    }

    pub async fn get_price(&self, router: &str, token: &str) -> Result<U256, RpcError> {
        let data = abi::build_calldata(sel::GET_PRICE, &[abi::encode_address_arg(token)?]);
        let hex = self.eth_call(router, &data).await?;
        Ok(abi::decode_uint(&hex)?)
    }

    /// A no-argument read: the calldata is the bare selector. Returns the
    /// raw hex word so the caller can decode it per-field.
    pub async fn read_no_args(&self, contract: &str, selector: &str) -> Result<String, RpcError> {
        self.eth_call(contract, selector).await
    }
}
