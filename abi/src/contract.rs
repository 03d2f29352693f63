//! Dynamic binding of a contract's functions, driven by its declaration table.
//!
//! Every function offers three entry points that end up in the same provider call:
//! pre-encoded calldata, typed [`Args`], and typed [`Args`] with per-call options. Read-only
//! functions resolve to the decoded result; state-changing functions resolve to an
//! [`InvocationHandle`].

use std::collections::{btree_map, BTreeMap};
use std::fmt;
use std::sync::Arc;

use ca_builtins::{
    CallOptions, CallPayload, CallRequest, Calldata, ContractAddress, InvocationHandle,
    InvokeOptions, Provider, Value,
};
use tracing::debug;

use crate::{
    declaration::Mutability,
    error::CallError,
    signature::{ArgumentConvention, FunctionSignature},
    table::DeclarationTable,
};

/// Typed arguments of a call.
#[derive(Debug, Clone, PartialEq)]
pub enum Args {
    Empty,
    /// The argument of a function with exactly one input.
    Bare(Value),
    Positional(Vec<Value>),
}

impl Args {
    fn describe(&self) -> String {
        match self {
            Self::Empty => "no arguments".to_string(),
            Self::Bare(_) => "a single bare argument".to_string(),
            Self::Positional(values) => format!("{} positional arguments", values.len()),
        }
    }

    /// Checks the argument form against the convention. Values themselves are not inspected.
    fn into_values(
        self,
        function: &str,
        convention: ArgumentConvention,
    ) -> Result<Vec<Value>, CallError> {
        match (convention, self) {
            (ArgumentConvention::Empty, Self::Empty) => Ok(Vec::new()),
            (ArgumentConvention::Empty, Self::Positional(values)) if values.is_empty() => {
                Ok(values)
            }
            (ArgumentConvention::Bare, Self::Bare(value)) => Ok(vec![value]),
            (ArgumentConvention::Positional(n), Self::Positional(values)) if values.len() == n => {
                Ok(values)
            }
            (expected, args) => Err(CallError::ArgumentMismatch {
                function: function.to_string(),
                expected,
                found: args.describe(),
            }),
        }
    }
}

impl From<Vec<Value>> for Args {
    fn from(values: Vec<Value>) -> Self {
        Self::Positional(values)
    }
}

impl From<Value> for Args {
    fn from(value: Value) -> Self {
        Self::Bare(value)
    }
}

impl From<()> for Args {
    fn from(_: ()) -> Self {
        Self::Empty
    }
}

#[derive(Clone)]
struct Target {
    signature: FunctionSignature,
    address: ContractAddress,
    provider: Arc<dyn Provider>,
}

impl Target {
    fn request(&self, payload: CallPayload) -> CallRequest {
        CallRequest {
            contract_address: self.address.clone(),
            entrypoint: self.signature.name.clone(),
            payload,
        }
    }

    fn typed(&self, args: Args) -> Result<CallRequest, CallError> {
        let values = args.into_values(&self.signature.name, self.signature.convention())?;
        Ok(self.request(CallPayload::Arguments(values)))
    }
}

impl fmt::Debug for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Target")
            .field("signature", &self.signature)
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}

/// A read-only function.
#[derive(Debug, Clone)]
pub struct ViewFunction(Target);

impl ViewFunction {
    pub fn signature(&self) -> &FunctionSignature {
        &self.0.signature
    }

    pub async fn call_with_calldata(&self, calldata: Calldata) -> Result<Value, CallError> {
        let request = self.0.request(CallPayload::Calldata(calldata));
        self.dispatch(request, CallOptions::default()).await
    }

    pub async fn call(&self, args: Args) -> Result<Value, CallError> {
        self.call_with_options(args, CallOptions::default()).await
    }

    pub async fn call_with_options(
        &self,
        args: Args,
        options: CallOptions,
    ) -> Result<Value, CallError> {
        let request = self.0.typed(args)?;
        self.dispatch(request, options).await
    }

    async fn dispatch(
        &self,
        request: CallRequest,
        options: CallOptions,
    ) -> Result<Value, CallError> {
        debug!(entrypoint = %request.entrypoint, ?options, "call");
        Ok(self.0.provider.call(request, options).await?)
    }
}

/// A state-changing function.
#[derive(Debug, Clone)]
pub struct ExternalFunction(Target);

impl ExternalFunction {
    pub fn signature(&self) -> &FunctionSignature {
        &self.0.signature
    }

    pub async fn call_with_calldata(
        &self,
        calldata: Calldata,
    ) -> Result<InvocationHandle, CallError> {
        let request = self.0.request(CallPayload::Calldata(calldata));
        self.dispatch(request, InvokeOptions::default()).await
    }

    pub async fn call(&self, args: Args) -> Result<InvocationHandle, CallError> {
        self.call_with_options(args, InvokeOptions::default()).await
    }

    pub async fn call_with_options(
        &self,
        args: Args,
        options: InvokeOptions,
    ) -> Result<InvocationHandle, CallError> {
        let request = self.0.typed(args)?;
        self.dispatch(request, options).await
    }

    async fn dispatch(
        &self,
        request: CallRequest,
        options: InvokeOptions,
    ) -> Result<InvocationHandle, CallError> {
        debug!(entrypoint = %request.entrypoint, ?options, "invoke");
        Ok(self.0.provider.invoke(request, options).await?)
    }
}

#[derive(Debug, Clone)]
pub enum FunctionBinding {
    View(ViewFunction),
    External(ExternalFunction),
}

impl FunctionBinding {
    pub fn signature(&self) -> &FunctionSignature {
        match self {
            Self::View(function) => function.signature(),
            Self::External(function) => function.signature(),
        }
    }

    pub fn name(&self) -> &str {
        &self.signature().name
    }

    pub fn as_view(&self) -> Option<&ViewFunction> {
        match self {
            Self::View(function) => Some(function),
            Self::External(_) => None,
        }
    }

    pub fn as_external(&self) -> Option<&ExternalFunction> {
        match self {
            Self::External(function) => Some(function),
            Self::View(_) => None,
        }
    }
}

/// Every function of a contract, keyed by name.
#[derive(Debug, Clone, Default)]
pub struct ContractFunctions(BTreeMap<String, FunctionBinding>);

impl ContractFunctions {
    pub fn get(&self, name: &str) -> Option<&FunctionBinding> {
        self.0.get(name)
    }

    pub fn view(&self, name: &str) -> Option<&ViewFunction> {
        self.get(name).and_then(FunctionBinding::as_view)
    }

    pub fn external(&self, name: &str) -> Option<&ExternalFunction> {
        self.get(name).and_then(FunctionBinding::as_external)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, FunctionBinding> {
        self.0.iter()
    }
}

impl<'a> IntoIterator for &'a ContractFunctions {
    type Item = (&'a String, &'a FunctionBinding);
    type IntoIter = btree_map::Iter<'a, String, FunctionBinding>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// A deployed contract: its declarations, its address and the provider calls go through.
#[derive(Clone)]
pub struct Contract {
    table: Arc<DeclarationTable>,
    address: ContractAddress,
    provider: Arc<dyn Provider>,
}

impl Contract {
    pub fn new(
        table: Arc<DeclarationTable>,
        address: ContractAddress,
        provider: Arc<dyn Provider>,
    ) -> Self {
        Self {
            table,
            address,
            provider,
        }
    }

    pub fn table(&self) -> &DeclarationTable {
        &self.table
    }

    pub fn address(&self) -> &ContractAddress {
        &self.address
    }

    pub fn function(&self, name: &str) -> Option<FunctionBinding> {
        self.table.signature(name).map(|signature| self.bind(signature))
    }

    pub fn functions(&self) -> ContractFunctions {
        ContractFunctions(
            self.table
                .signatures()
                .into_iter()
                .map(|signature| (signature.name.clone(), self.bind(signature)))
                .collect(),
        )
    }

    fn bind(&self, signature: FunctionSignature) -> FunctionBinding {
        let mutability = signature.mutability;
        let target = Target {
            signature,
            address: self.address.clone(),
            provider: Arc::clone(&self.provider),
        };
        match mutability {
            Mutability::ReadOnly => FunctionBinding::View(ViewFunction(target)),
            Mutability::StateChanging => FunctionBinding::External(ExternalFunction(target)),
        }
    }
}

impl fmt::Debug for Contract {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Contract")
            .field("address", &self.address)
            .field("functions", &self.table.functions().len())
            .finish_non_exhaustive()
    }
}
