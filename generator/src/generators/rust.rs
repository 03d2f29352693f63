use std::collections::HashSet;

use quote::{format_ident, quote};
use syn::{
    Attribute, Field, FieldMutability, Fields, Ident, ImplItemFn, Item, Type, Variant,
    __private::Span, parse_quote,
};

use ca_abi::{
    declaration::{EnumDecl, EventBody, EventDecl, FunctionDecl, Mutability, StructDecl},
    DeclarationTable, PrimitiveKind,
};

use super::common::{walk, DeclarationVisitor, GeneratorContext, TypeRef};

use check_keyword::CheckKeyword;
use heck::{ToPascalCase, ToSnakeCase};

/// Parameter names the generated method bodies use themselves.
const RESERVED_PARAMETERS: [&str; 5] = ["options", "calldata", "request", "value", "arguments"];

/// Methods of the generated contract that do not come from the ABI.
const RESERVED_METHODS: [&str; 2] = ["new", "request"];

struct RustVisitor {
    output_items: Vec<Item>,
    method_names: HashSet<String>,
}

impl RustVisitor {
    fn new() -> Self {
        Self {
            output_items: Vec::new(),
            method_names: RESERVED_METHODS.iter().map(|m| m.to_string()).collect(),
        }
    }

    /// Picks the snake case base name of a function's three methods, suffixing it with a
    /// counter while any of them is already taken.
    fn method_base(&mut self, function: &str) -> String {
        let mut base = function.to_snake_case();
        if ["crate", "self", "super"].contains(&base.as_str()) {
            base.push('_');
        }
        let methods = |base: &str| {
            [
                base.to_string(),
                format!("{base}_with_calldata"),
                format!("{base}_with_options"),
            ]
        };
        let mut candidate = base.clone();
        let mut n = 1;
        while methods(&candidate).iter().any(|m| self.method_names.contains(m)) {
            n += 1;
            candidate = format!("{base}_{n}");
        }
        self.method_names.extend(methods(&candidate));
        candidate
    }

    fn name_to_ident(name: &str) -> Ident {
        if ["crate", "self", "super", "Self"].contains(&name) {
            // These are keywords that are not allowed as raw identifiers
            Ident::new(&format!("{}_", name), Span::call_site())
        } else if name.is_keyword() {
            Ident::new_raw(name, Span::call_site())
        } else {
            Ident::new(name, Span::call_site())
        }
    }

    fn type_ident(ctx: &GeneratorContext, declared: &str) -> Ident {
        match ctx.names.get(declared) {
            Some(name) => Self::name_to_ident(name),
            None => Self::name_to_ident(&declared.to_pascal_case()),
        }
    }

    fn parameter_ident(name: &str) -> Ident {
        let name = name.to_snake_case();
        if RESERVED_PARAMETERS.contains(&name.as_str()) {
            Self::name_to_ident(&format!("{name}_arg"))
        } else {
            Self::name_to_ident(&name)
        }
    }

    fn primitive_type(kind: PrimitiveKind) -> Type {
        match kind {
            PrimitiveKind::Felt => parse_quote!(ca_builtins::Felt),
            PrimitiveKind::Bool => parse_quote!(bool),
            PrimitiveKind::Unit => parse_quote!(()),
            PrimitiveKind::FunctionSelector => parse_quote!(u64),
            PrimitiveKind::SmallInt { bits: 8 } => parse_quote!(u8),
            PrimitiveKind::SmallInt { bits: 16 } => parse_quote!(u16),
            PrimitiveKind::SmallInt { .. } => parse_quote!(u32),
            PrimitiveKind::WideInt { bits: 64 } => parse_quote!(u64),
            PrimitiveKind::WideInt { .. } => parse_quote!(u128),
            PrimitiveKind::U256 => parse_quote!(ca_builtins::U256),
            PrimitiveKind::ContractAddress => parse_quote!(ca_builtins::ContractAddress),
            PrimitiveKind::ClassHash => parse_quote!(ca_builtins::ClassHash),
        }
    }

    /// `boxed` puts cyclic named types behind a `Box` unless a `Vec` already provides the
    /// indirection.
    fn rust_type(ty: &TypeRef, boxed: bool) -> Type {
        match ty {
            TypeRef::Primitive(kind) => Self::primitive_type(*kind),
            TypeRef::Option(inner) => {
                let inner = Self::rust_type(inner, boxed);
                parse_quote!(Option<#inner>)
            }
            TypeRef::Array(inner) => {
                let inner = Self::rust_type(inner, false);
                parse_quote!(Vec<#inner>)
            }
            TypeRef::Tuple(elements) => {
                let elements = elements.iter().map(|e| Self::rust_type(e, boxed));
                parse_quote!((#(#elements,)*))
            }
            TypeRef::Named { name, cyclic } => {
                let name = Self::name_to_ident(name);
                if boxed && *cyclic {
                    parse_quote!(Box<#name>)
                } else {
                    parse_quote!(#name)
                }
            }
            TypeRef::Unknown => parse_quote!(ca_builtins::Value),
        }
    }

    fn rename_attr(ident: &Ident, serde_name: &str) -> Option<Attribute> {
        let printed = ident.to_string();
        let printed = printed.strip_prefix("r#").unwrap_or(&printed);
        (printed != serde_name).then(|| parse_quote!(#[serde(rename = #serde_name)]))
    }

    fn emit_untyped(&mut self, ctx: &GeneratorContext, declared: &str) {
        let name = Self::type_ident(ctx, declared);
        let doc = format!("`{declared}` contains itself without indirection");
        self.output_items.push(parse_quote! {
            #[doc = #doc]
            pub type #name = ca_builtins::Value;
        });
    }

    fn emit_struct<'m>(
        &mut self,
        ctx: &GeneratorContext,
        declared: &str,
        members: impl Iterator<Item = (&'m str, &'m str)>,
    ) {
        if ctx.is_self_referential(declared) {
            self.emit_untyped(ctx, declared);
            return;
        }
        let name = Self::type_ident(ctx, declared);
        let fields = members.map(|(member, descriptor)| {
            let ident = Self::name_to_ident(&member.to_snake_case());
            let attrs = Self::rename_attr(&ident, member).into_iter().collect();
            Field {
                attrs,
                vis: parse_quote!(pub),
                ident: Some(ident),
                colon_token: None,
                ty: Self::rust_type(&ctx.type_ref(descriptor), true),
                mutability: FieldMutability::None,
            }
        });
        self.output_items.push(parse_quote! {
            #[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
            pub struct #name {
                #(#fields),*
            }
        });
    }

    fn emit_enum<'m>(
        &mut self,
        ctx: &GeneratorContext,
        declared: &str,
        variants: impl Iterator<Item = (&'m str, &'m str)>,
    ) {
        let name = Self::type_ident(ctx, declared);
        let variants = variants.map(|(variant, descriptor)| {
            let ident = Self::name_to_ident(&variant.to_pascal_case());
            let attrs = Self::rename_attr(&ident, variant).into_iter().collect();
            let ty = Self::rust_type(&ctx.type_ref(descriptor), true);
            Variant {
                attrs,
                ident,
                fields: Fields::Unnamed(parse_quote! { (#ty) }),
                discriminant: None,
            }
        });
        self.output_items.push(parse_quote! {
            #[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
            pub enum #name {
                #(#variants),*
            }
        });
    }
}

impl DeclarationVisitor for RustVisitor {
    type StructValue = ();
    fn visit_struct(&mut self, ctx: &mut GeneratorContext, decl: &StructDecl) {
        let members = decl.members.iter().map(|m| (m.name.as_str(), m.ty.as_str()));
        self.emit_struct(ctx, &decl.name, members);
    }

    type EnumValue = ();
    fn visit_enum(&mut self, ctx: &mut GeneratorContext, decl: &EnumDecl) {
        let variants = decl.variants.iter().map(|v| (v.name.as_str(), v.ty.as_str()));
        self.emit_enum(ctx, &decl.name, variants);
    }

    type EventValue = ();
    fn visit_event(&mut self, ctx: &mut GeneratorContext, decl: &EventDecl) {
        let entries = decl.entries().iter().map(|m| (m.name.as_str(), m.ty.as_str()));
        match decl.body {
            EventBody::Struct { .. } => self.emit_struct(ctx, &decl.name, entries),
            EventBody::Enum { .. } => self.emit_enum(ctx, &decl.name, entries),
        }
    }

    type FunctionValue = Vec<ImplItemFn>;
    fn visit_function(&mut self, ctx: &mut GeneratorContext, decl: &FunctionDecl) -> Vec<ImplItemFn> {
        let fn_name = self.method_base(&decl.name);
        let call = Self::name_to_ident(&fn_name);
        let with_calldata = format_ident!("{}_with_calldata", fn_name);
        let with_options = format_ident!("{}_with_options", fn_name);
        let entrypoint = &decl.name;

        let (names, types): (Vec<Ident>, Vec<Type>) = decl
            .inputs
            .iter()
            .map(|input| {
                let ty = Self::rust_type(&ctx.type_ref(&input.ty), false);
                (Self::parameter_ident(&input.name), ty)
            })
            .unzip();

        match decl.mutability {
            Mutability::ReadOnly => {
                let output = decl
                    .outputs
                    .first()
                    .map(|output| ctx.type_ref(&output.ty))
                    .filter(|ty| *ty != TypeRef::Tuple(Vec::new()));
                let (ret, finish): (Type, _) = match output {
                    Some(ty) => (Self::rust_type(&ty, false), quote!(ca_builtins::decode(value))),
                    None => (parse_quote!(()), quote!({
                        let _ = value;
                        Ok(())
                    })),
                };
                vec![
                    parse_quote! {
                        pub async fn #call(&self, #(#names: #types),*) -> Result<#ret, ca_builtins::ProviderError> {
                            self.#with_options(#(#names,)* ca_builtins::CallOptions::default()).await
                        }
                    },
                    parse_quote! {
                        pub async fn #with_calldata(&self, calldata: ca_builtins::Calldata) -> Result<#ret, ca_builtins::ProviderError> {
                            let request = self.request(#entrypoint, ca_builtins::CallPayload::Calldata(calldata));
                            let value = self.provider.call(request, ca_builtins::CallOptions::default()).await?;
                            #finish
                        }
                    },
                    parse_quote! {
                        pub async fn #with_options(&self, #(#names: #types,)* options: ca_builtins::CallOptions) -> Result<#ret, ca_builtins::ProviderError> {
                            let arguments = vec![#(ca_builtins::encode(&#names)?),*];
                            let request = self.request(#entrypoint, ca_builtins::CallPayload::Arguments(arguments));
                            let value = self.provider.call(request, options).await?;
                            #finish
                        }
                    },
                ]
            }
            Mutability::StateChanging => vec![
                parse_quote! {
                    pub async fn #call(&self, #(#names: #types),*) -> Result<ca_builtins::InvocationHandle, ca_builtins::ProviderError> {
                        self.#with_options(#(#names,)* ca_builtins::InvokeOptions::default()).await
                    }
                },
                parse_quote! {
                    pub async fn #with_calldata(&self, calldata: ca_builtins::Calldata) -> Result<ca_builtins::InvocationHandle, ca_builtins::ProviderError> {
                        let request = self.request(#entrypoint, ca_builtins::CallPayload::Calldata(calldata));
                        self.provider.invoke(request, ca_builtins::InvokeOptions::default()).await
                    }
                },
                parse_quote! {
                    pub async fn #with_options(&self, #(#names: #types,)* options: ca_builtins::InvokeOptions) -> Result<ca_builtins::InvocationHandle, ca_builtins::ProviderError> {
                        let arguments = vec![#(ca_builtins::encode(&#names)?),*];
                        let request = self.request(#entrypoint, ca_builtins::CallPayload::Arguments(arguments));
                        self.provider.invoke(request, options).await
                    }
                },
            ],
        }
    }
}

fn contract_ident(contract_name: &str) -> Ident {
    let name = contract_name.to_pascal_case();
    if name.ends_with("Contract") {
        format_ident!("{}", name)
    } else {
        format_ident!("{}Contract", name)
    }
}

pub fn generate(table: &DeclarationTable, contract_name: &str) -> String {
    let mut ctx = GeneratorContext::new(table, contract_name);
    let mut visitor = RustVisitor::new();

    let methods = walk(&mut visitor, &mut ctx).into_iter().flatten();

    let contract = contract_ident(&ctx.contract_name);
    visitor.output_items.push(parse_quote! {
        pub struct #contract<P: ca_builtins::Provider> {
            pub address: ca_builtins::ContractAddress,
            provider: P,
        }
    });
    visitor.output_items.push(parse_quote! {
        impl<P: ca_builtins::Provider> #contract<P> {
            pub fn new(address: ca_builtins::ContractAddress, provider: P) -> Self {
                Self { address, provider }
            }

            fn request(&self, entrypoint: &str, payload: ca_builtins::CallPayload) -> ca_builtins::CallRequest {
                ca_builtins::CallRequest {
                    contract_address: self.address.clone(),
                    entrypoint: entrypoint.to_string(),
                    payload,
                }
            }

            #(#methods)*
        }
    });

    let doc_comment = concat!(
        "Generated by ",
        env!("CARGO_PKG_NAME"),
        " ",
        env!("CARGO_PKG_VERSION")
    );
    let root = syn::File {
        shebang: None,
        attrs: vec![
            parse_quote!(#![doc = #doc_comment]),
            parse_quote!(#![allow(dead_code, unused_imports)]),
        ],
        items: visitor.output_items,
    };
    prettyplease::unparse(&root)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ca_abi::Abi;
    use serde_json::json;

    fn generated(abi: serde_json::Value) -> String {
        let table = Abi::from_value(abi).unwrap().into_table();
        let output = generate(&table, "example");
        syn::parse_file(&output).expect("generated code parses");
        output
    }

    #[test]
    fn structs_and_enums() {
        let output = generated(json!([
            {"type": "struct", "name": "example::Point", "members": [
                {"name": "x", "type": "core::felt252"},
                {"name": "maybe", "type": "core::option::Option::<core::option::Option::<core::felt252>>"},
                {"name": "camelCase", "type": "(core::integer::u8,)"},
                {"name": "type", "type": "core::integer::u256"}
            ]},
            {"type": "enum", "name": "example::E", "variants": [
                {"name": "A", "type": "core::felt252"},
                {"name": "B", "type": "()"}
            ]}
        ]));
        assert!(output.contains("pub struct Point {"));
        assert!(output.contains("pub x: ca_builtins::Felt,"));
        assert!(output.contains("pub maybe: Option<ca_builtins::Felt>,"));
        assert!(output.contains("#[serde(rename = \"camelCase\")]"));
        assert!(output.contains("pub camel_case: (u8,),"));
        assert!(output.contains("pub r#type: ca_builtins::U256,"));
        assert!(output.contains("pub enum E {"));
        assert!(output.contains("A(ca_builtins::Felt),"));
        assert!(output.contains("B(()),"));
    }

    #[test]
    fn recursive_declarations() {
        let output = generated(json!([
            {"type": "struct", "name": "example::Node", "members": [
                {"name": "next", "type": "core::option::Option::<example::Node>"},
                {"name": "children", "type": "core::array::Array::<example::Node>"}
            ]},
            {"type": "struct", "name": "example::Loop", "members": [
                {"name": "me", "type": "example::Loop"}
            ]},
            {"type": "struct", "name": "example::Holder", "members": [
                {"name": "node", "type": "example::Node"}
            ]},
            {"type": "struct", "name": "example::Outer", "members": [
                {"name": "holder", "type": "core::option::Option::<example::Holder>"}
            ]}
        ]));
        assert!(output.contains("pub next: Option<Box<Node>>,"));
        assert!(output.contains("pub node: Box<Node>,"));
        assert!(output.contains("pub holder: Option<Holder>,"));
        assert!(output.contains("pub children: Vec<Node>,"));
        assert!(output.contains("pub type Loop = ca_builtins::Value;"));
    }

    #[test]
    fn contract_methods() {
        let output = generated(json!([
            {"type": "function", "name": "fn_felt", "inputs": [
                {"name": "felt", "type": "core::felt252"}
            ], "outputs": [{"type": "core::bool"}], "state_mutability": "view"},
            {"type": "function", "name": "set_options", "inputs": [
                {"name": "options", "type": "core::felt252"}
            ], "outputs": [], "state_mutability": "external"},
            {"type": "function", "name": "unknown_out", "inputs": [], "outputs": [
                {"type": "example::Missing"}
            ], "state_mutability": "view"}
        ]));
        assert!(output.contains("pub struct ExampleContract<P: ca_builtins::Provider>"));
        assert!(output.contains("pub async fn fn_felt("));
        assert!(output.contains("pub async fn fn_felt_with_calldata("));
        assert!(output.contains("pub async fn fn_felt_with_options("));
        assert!(output.contains("ca_builtins::InvocationHandle"));
        assert!(output.contains("options_arg: ca_builtins::Felt"));
        assert!(output.contains("Result<ca_builtins::Value, ca_builtins::ProviderError>"));
    }

    #[test]
    fn colliding_method_names_are_suffixed() {
        let output = generated(json!([
            {"type": "function", "name": "new", "inputs": [], "outputs": [], "state_mutability": "external"},
            {"type": "function", "name": "request", "inputs": [], "outputs": [], "state_mutability": "external"},
            {"type": "function", "name": "getBalance", "inputs": [], "outputs": [
                {"type": "core::felt252"}
            ], "state_mutability": "view"},
            {"type": "function", "name": "get_balance", "inputs": [], "outputs": [
                {"type": "core::felt252"}
            ], "state_mutability": "view"}
        ]));
        assert_eq!(output.matches("pub fn new(").count(), 1);
        assert!(output.contains("pub async fn new_2("));
        assert!(output.contains("pub async fn request_2_with_calldata("));
        assert_eq!(output.matches("pub async fn get_balance(").count(), 1);
        assert!(output.contains("pub async fn get_balance_2_with_options("));
        assert!(output.contains("\"getBalance\""));
        assert!(output.contains("\"get_balance\""));
    }

    #[test]
    fn events() {
        let output = generated(json!([
            {"type": "event", "name": "example::Transfer", "kind": "struct", "members": [
                {"name": "amount", "type": "core::integer::u128", "kind": "data"}
            ]},
            {"type": "event", "name": "example::Event", "kind": "enum", "variants": [
                {"name": "Transfer", "type": "example::Transfer", "kind": "nested"}
            ]}
        ]));
        assert!(output.contains("pub struct Transfer {"));
        assert!(output.contains("pub amount: u128,"));
        assert!(output.contains("Transfer(Transfer),"));
    }

    #[test]
    fn contract_ident_suffix() {
        assert_eq!(contract_ident("erc20").to_string(), "Erc20Contract");
        assert_eq!(contract_ident("Contract").to_string(), "Contract");
    }
}
