use std::sync::Arc;

use async_trait::async_trait;
use ca_abi::{
    Abi, Args, ArgumentConvention, CallError, Contract, DeclarationTable, PrimitiveKind,
    ResolvedType, ReturnShape,
};
use ca_builtins::{
    CallOptions, CallPayload, CallRequest, Calldata, ContractAddress, Felt, InvocationHandle,
    InvokeOptions, Provider, ProviderError, Value,
};
use serde_json::json;
use tokio::sync::Mutex;

#[derive(Debug, Clone, PartialEq)]
enum Recorded {
    Call(CallRequest, CallOptions),
    Invoke(CallRequest, InvokeOptions),
}

/// Records every request. Calls echo their first typed argument back; invocations are
/// acknowledged with a fixed transaction hash.
#[derive(Default)]
struct RecordingProvider {
    requests: Mutex<Vec<Recorded>>,
}

#[async_trait]
impl Provider for RecordingProvider {
    async fn call(&self, request: CallRequest, options: CallOptions) -> Result<Value, ProviderError> {
        let result = match &request.payload {
            CallPayload::Arguments(args) => args.first().cloned().unwrap_or(Value::Null),
            CallPayload::Calldata(_) => Value::Null,
        };
        self.requests
            .lock()
            .await
            .push(Recorded::Call(request, options));
        Ok(result)
    }

    async fn invoke(
        &self,
        request: CallRequest,
        options: InvokeOptions,
    ) -> Result<InvocationHandle, ProviderError> {
        self.requests
            .lock()
            .await
            .push(Recorded::Invoke(request, options));
        Ok(InvocationHandle {
            transaction_hash: Felt::from(0xabcu32),
        })
    }
}

fn contract(abi: Value) -> (Contract, Arc<RecordingProvider>) {
    let table = Abi::from_value(abi).unwrap().into_table();
    let provider = Arc::new(RecordingProvider::default());
    let contract = Contract::new(
        Arc::new(table),
        ContractAddress::new("0x1234"),
        provider.clone(),
    );
    (contract, provider)
}

#[tokio::test]
async fn typed_and_raw_calls_reach_the_same_submission() {
    let (contract, provider) = contract(json!([{
        "type": "function",
        "name": "fn_x",
        "inputs": [{"name": "x", "type": "core::integer::u8"}],
        "outputs": [],
        "state_mutability": "external"
    }]));
    let functions = contract.functions();
    let fn_x = functions.external("fn_x").unwrap();
    assert_eq!(fn_x.signature().convention(), ArgumentConvention::Bare);

    let typed = fn_x.call(Args::Bare(json!(5))).await.unwrap();
    let raw = fn_x
        .call_with_calldata(Calldata::from(["0x5"]))
        .await
        .unwrap();
    assert_eq!(typed, raw);

    let requests = provider.requests.lock().await;
    assert_eq!(requests.len(), 2);
    for recorded in requests.iter() {
        let Recorded::Invoke(request, _) = recorded else {
            panic!("expected an invocation, got {recorded:?}");
        };
        assert_eq!(request.entrypoint, "fn_x");
        assert_eq!(request.contract_address, ContractAddress::new("0x1234"));
    }
    assert!(matches!(
        &requests[0],
        Recorded::Invoke(CallRequest { payload: CallPayload::Arguments(args), .. }, _) if args == &[json!(5)]
    ));
    assert!(matches!(
        &requests[1],
        Recorded::Invoke(CallRequest { payload: CallPayload::Calldata(data), .. }, _) if data.0 == ["0x5"]
    ));
}

#[tokio::test]
async fn view_returns_decoded_value() {
    let (contract, _) = contract(json!([
        {"type": "struct", "name": "S", "members": [
            {"name": "a", "type": "core::felt252"},
            {"name": "b", "type": "core::integer::u8"}
        ]},
        {"type": "function", "name": "fn_s",
            "inputs": [{"name": "s", "type": "S"}],
            "outputs": [{"type": "S"}],
            "state_mutability": "view"}
    ]));
    let functions = contract.functions();
    let fn_s = functions.view("fn_s").unwrap();

    let ReturnShape::Value(output) = &fn_s.signature().output else {
        panic!("fn_s returns a value");
    };
    assert_eq!(
        output.field("b"),
        Some(&ResolvedType::Primitive(PrimitiveKind::SmallInt { bits: 8 }))
    );

    let value = fn_s.call(Args::Bare(json!({"a": 1, "b": 2}))).await.unwrap();
    assert_eq!(value, json!({"a": 1, "b": 2}));
}

#[tokio::test]
async fn options_are_forwarded() {
    let (contract, provider) = contract(json!([
        {"type": "function", "name": "get", "inputs": [], "outputs": [{"type": "core::felt252"}], "state_mutability": "view"},
        {"type": "function", "name": "set", "inputs": [
            {"name": "a", "type": "core::felt252"},
            {"name": "b", "type": "core::bool"}
        ], "outputs": [], "state_mutability": "external"}
    ]));
    let functions = contract.functions();
    let call_options = CallOptions {
        parse_response: false,
        ..CallOptions::default()
    };
    functions
        .view("get")
        .unwrap()
        .call_with_options(Args::Empty, call_options.clone())
        .await
        .unwrap();

    let invoke_options = InvokeOptions {
        nonce: Some(Felt::from(7u8)),
        ..InvokeOptions::default()
    };
    functions
        .external("set")
        .unwrap()
        .call_with_options(Args::Positional(vec![json!(1), json!(true)]), invoke_options.clone())
        .await
        .unwrap();

    let requests = provider.requests.lock().await;
    assert!(matches!(&requests[0], Recorded::Call(_, options) if options == &call_options));
    assert!(matches!(&requests[1], Recorded::Invoke(_, options) if options == &invoke_options));
}

#[tokio::test]
async fn wrong_argument_form_never_reaches_the_provider() {
    let (contract, provider) = contract(json!([
        {"type": "function", "name": "none", "inputs": [], "outputs": [], "state_mutability": "view"}
    ]));
    let binding = contract.function("none").unwrap();
    let view = binding.as_view().unwrap();
    assert!(matches!(
        view.call(Args::Bare(json!(1))).await,
        Err(CallError::ArgumentMismatch { .. })
    ));
    assert!(view.call(Args::Empty).await.is_ok());
    assert_eq!(provider.requests.lock().await.len(), 1);
}

#[tokio::test]
async fn functions_are_keyed_by_name_across_interfaces() {
    let (contract, _) = contract(json!([
        {"type": "impl", "name": "ExampleImpl", "interface_name": "example::IExample"},
        {"type": "interface", "name": "example::IExample", "items": [
            {"type": "function", "name": "b_view", "inputs": [], "outputs": [], "state_mutability": "view"},
            {"type": "function", "name": "a_write", "inputs": [], "outputs": [], "state_mutability": "external"}
        ]},
        {"type": "l1_handler", "name": "ignored", "inputs": [], "outputs": [], "state_mutability": "external"}
    ]));
    let functions = contract.functions();
    let names: Vec<_> = functions.names().collect();
    assert_eq!(names, ["a_write", "b_view"]);
    assert!(functions.view("a_write").is_none());
    assert!(functions.external("a_write").is_some());
}

#[test]
fn descriptor_properties() {
    let table: DeclarationTable = Abi::new(Vec::new()).into_table();
    let p = ResolvedType::Primitive(PrimitiveKind::Felt);

    assert_eq!(
        table.resolve("core::array::Array::<core::option::Option::<core::felt252>>"),
        ResolvedType::array(ResolvedType::Option(Box::new(p.clone())))
    );
    assert_eq!(
        table.resolve("core::option::Option::<core::option::Option::<core::felt252>>"),
        table.resolve("core::option::Option::<core::felt252>")
    );
    assert_eq!(table.resolve("()"), ResolvedType::Tuple(vec![]));
    assert_eq!(table.resolve("(core::felt252)"), ResolvedType::Tuple(vec![p.clone()]));
    assert_eq!(
        table.resolve("(core::felt252, core::bool, core::integer::u128)"),
        ResolvedType::Tuple(vec![
            p,
            ResolvedType::Primitive(PrimitiveKind::Bool),
            ResolvedType::Primitive(PrimitiveKind::WideInt { bits: 128 }),
        ])
    );
    assert!(table.try_resolve("(").is_err());
    assert_eq!(table.resolve("not::Declared"), ResolvedType::Unknown);
}
