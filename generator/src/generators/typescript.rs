use std::fmt::Write;

use ca_abi::{
    declaration::{EnumDecl, EventBody, EventDecl, FunctionDecl, Mutability, StructDecl},
    DeclarationTable, PrimitiveKind,
};
use heck::ToPascalCase;

use super::common::{walk, DeclarationVisitor, GeneratorContext, TypeRef};

const PRELUDE: &str = "\
export type BigNumberish = string | number | bigint;
export type Uint256 = BigNumberish | { low: BigNumberish; high: BigNumberish };
export type Calldata = string[];
export type BlockIdentifier = 'latest' | 'pending' | number | string;

export interface CallOptions {
  parseRequest?: boolean;
  parseResponse?: boolean;
  blockIdentifier?: BlockIdentifier;
}

export interface InvokeOptions {
  parseRequest?: boolean;
  maxFee?: BigNumberish;
  nonce?: BigNumberish;
}

export interface InvocationHandle {
  transaction_hash: string;
}
";

#[derive(Default)]
struct TypescriptVisitor {
    output: String,
}

impl TypescriptVisitor {
    fn primitive_type(kind: PrimitiveKind) -> &'static str {
        match kind {
            PrimitiveKind::Felt => "BigNumberish",
            PrimitiveKind::Bool => "boolean",
            PrimitiveKind::Unit => "void",
            PrimitiveKind::FunctionSelector => "number",
            PrimitiveKind::SmallInt { .. } | PrimitiveKind::WideInt { .. } => "number | bigint",
            PrimitiveKind::U256 => "Uint256",
            PrimitiveKind::ContractAddress | PrimitiveKind::ClassHash => "string",
        }
    }

    fn ts_type(ty: &TypeRef) -> String {
        match ty {
            TypeRef::Primitive(kind) => Self::primitive_type(*kind).to_string(),
            TypeRef::Option(inner) => format!("{} | undefined", Self::ts_type(inner)),
            TypeRef::Array(inner) => match inner.as_ref() {
                TypeRef::Primitive(PrimitiveKind::SmallInt { .. } | PrimitiveKind::WideInt { .. })
                | TypeRef::Option(_) => format!("({})[]", Self::ts_type(inner)),
                inner => format!("{}[]", Self::ts_type(inner)),
            },
            TypeRef::Tuple(elements) if elements.is_empty() => "void".to_string(),
            TypeRef::Tuple(elements) => {
                let elements: Vec<_> = elements.iter().map(Self::ts_type).collect();
                format!("[{}]", elements.join(", "))
            }
            TypeRef::Named { name, .. } => name.clone(),
            TypeRef::Unknown => "unknown".to_string(),
        }
    }

    fn type_name(ctx: &GeneratorContext, declared: &str) -> String {
        ctx.names
            .get(declared)
            .map(str::to_string)
            .unwrap_or_else(|| declared.to_pascal_case())
    }

    fn emit_record<'m>(
        &mut self,
        ctx: &GeneratorContext,
        declared: &str,
        members: impl Iterator<Item = (&'m str, &'m str)>,
    ) {
        let name = Self::type_name(ctx, declared);
        if ctx.is_self_referential(declared) {
            let _ = writeln!(self.output, "\n/** `{declared}` contains itself without indirection */");
            let _ = writeln!(self.output, "export type {name} = unknown;");
            return;
        }
        let _ = writeln!(self.output, "\nexport type {name} = {{");
        for (member, descriptor) in members {
            let ty = Self::ts_type(&ctx.type_ref(descriptor));
            let _ = writeln!(self.output, "  {member}: {ty};");
        }
        let _ = writeln!(self.output, "}};");
    }

    /// Exactly one variant key is present in a value.
    fn emit_union<'m>(
        &mut self,
        ctx: &GeneratorContext,
        declared: &str,
        variants: impl Iterator<Item = (&'m str, &'m str)>,
    ) {
        let name = Self::type_name(ctx, declared);
        let alternatives: Vec<_> = variants
            .map(|(variant, descriptor)| {
                let ty = Self::ts_type(&ctx.type_ref(descriptor));
                format!("{{ {variant}: {ty} }}")
            })
            .collect();
        let body = if alternatives.is_empty() {
            "never".to_string()
        } else {
            alternatives.join("\n  | ")
        };
        let _ = writeln!(self.output, "\nexport type {name} =\n  | {body};");
    }
}

impl DeclarationVisitor for TypescriptVisitor {
    type StructValue = ();
    fn visit_struct(&mut self, ctx: &mut GeneratorContext, decl: &StructDecl) {
        let members = decl.members.iter().map(|m| (m.name.as_str(), m.ty.as_str()));
        self.emit_record(ctx, &decl.name, members);
    }

    type EnumValue = ();
    fn visit_enum(&mut self, ctx: &mut GeneratorContext, decl: &EnumDecl) {
        let variants = decl.variants.iter().map(|v| (v.name.as_str(), v.ty.as_str()));
        self.emit_union(ctx, &decl.name, variants);
    }

    type EventValue = ();
    fn visit_event(&mut self, ctx: &mut GeneratorContext, decl: &EventDecl) {
        let entries = decl.entries().iter().map(|m| (m.name.as_str(), m.ty.as_str()));
        match decl.body {
            EventBody::Struct { .. } => self.emit_record(ctx, &decl.name, entries),
            EventBody::Enum { .. } => self.emit_union(ctx, &decl.name, entries),
        }
    }

    /// The three overloads of one function, as interface members.
    type FunctionValue = String;
    fn visit_function(&mut self, ctx: &mut GeneratorContext, decl: &FunctionDecl) -> String {
        let params: Vec<_> = decl
            .inputs
            .iter()
            .map(|input| format!("{}: {}", input.name, Self::ts_type(&ctx.type_ref(&input.ty))))
            .collect();
        let (ret, options) = match decl.mutability {
            Mutability::ReadOnly => {
                let ret = decl
                    .outputs
                    .first()
                    .map(|output| Self::ts_type(&ctx.type_ref(&output.ty)))
                    .unwrap_or_else(|| "void".to_string());
                (ret, "CallOptions")
            }
            Mutability::StateChanging => ("InvocationHandle".to_string(), "InvokeOptions"),
        };
        let name = &decl.name;
        let mut with_options = params.clone();
        with_options.push(format!("options: {options}"));

        let mut overloads = String::new();
        let _ = writeln!(overloads, "  {name}({}): Promise<{ret}>;", params.join(", "));
        let _ = writeln!(overloads, "  {name}(calldata: Calldata): Promise<{ret}>;");
        let _ = writeln!(overloads, "  {name}({}): Promise<{ret}>;", with_options.join(", "));
        overloads
    }
}

pub fn generate(table: &DeclarationTable, contract_name: &str) -> String {
    let mut ctx = GeneratorContext::new(table, contract_name);
    let mut visitor = TypescriptVisitor::default();

    let mut output = format!(
        "// Generated by {} {}\n\n{PRELUDE}",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION")
    );
    let overloads = walk(&mut visitor, &mut ctx);
    output.push_str(&visitor.output);

    let _ = writeln!(
        output,
        "\nexport interface {} {{",
        ctx.contract_name.to_pascal_case()
    );
    for function in overloads {
        output.push_str(&function);
    }
    output.push_str("}\n");
    output
}
