use std::sync::Arc;

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::{Calldata, ContractAddress, Felt};

/// What a call carries to the provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CallPayload {
    /// Already encoded; forwarded untouched.
    Calldata(Calldata),
    /// Positional typed arguments, left for the provider's calldata codec to encode.
    Arguments(Vec<Value>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallRequest {
    pub contract_address: ContractAddress,
    pub entrypoint: String,
    pub payload: CallPayload,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockId {
    #[default]
    Latest,
    Pending,
    Number(u64),
    Hash(Felt),
}

/// Options of a read-only call. The toggles only affect how the request and response are
/// processed, never what gets executed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallOptions {
    pub parse_request: bool,
    pub parse_response: bool,
    pub block: BlockId,
}

impl Default for CallOptions {
    fn default() -> Self {
        Self {
            parse_request: true,
            parse_response: true,
            block: BlockId::Latest,
        }
    }
}

/// Options of a state-changing submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvokeOptions {
    pub parse_request: bool,
    pub max_fee: Option<Felt>,
    pub nonce: Option<Felt>,
}

impl Default for InvokeOptions {
    fn default() -> Self {
        Self {
            parse_request: true,
            max_fee: None,
            nonce: None,
        }
    }
}

/// Acknowledgment of a submitted state-changing call. It says nothing about the call's outcome.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InvocationHandle {
    pub transaction_hash: Felt,
}

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("the call was rejected: {0}")]
    Rejected(String),
    #[error("failed to encode call arguments: {0}")]
    Encode(#[source] serde_json::Error),
    #[error("failed to decode call result: {0}")]
    Decode(#[source] serde_json::Error),
    #[error("transport failure")]
    Transport(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// The collaborator that actually talks to the network. Encoding of [`CallPayload::Arguments`],
/// retries, timeouts and cancellation all live behind this trait.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Executes a read-only call and returns its decoded result.
    async fn call(&self, request: CallRequest, options: CallOptions)
        -> Result<Value, ProviderError>;

    /// Submits a state-changing call.
    async fn invoke(
        &self,
        request: CallRequest,
        options: InvokeOptions,
    ) -> Result<InvocationHandle, ProviderError>;
}

#[async_trait]
impl<P: Provider + ?Sized> Provider for Arc<P> {
    async fn call(
        &self,
        request: CallRequest,
        options: CallOptions,
    ) -> Result<Value, ProviderError> {
        (**self).call(request, options).await
    }

    async fn invoke(
        &self,
        request: CallRequest,
        options: InvokeOptions,
    ) -> Result<InvocationHandle, ProviderError> {
        (**self).invoke(request, options).await
    }
}

/// Converts a typed argument into the value handed to the provider.
pub fn encode<T: Serialize>(value: &T) -> Result<Value, ProviderError> {
    serde_json::to_value(value).map_err(ProviderError::Encode)
}

/// Converts a provider result into the typed return value.
pub fn decode<T: DeserializeOwned>(value: Value) -> Result<T, ProviderError> {
    serde_json::from_value(value).map_err(ProviderError::Decode)
}
