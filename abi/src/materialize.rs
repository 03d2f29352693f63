//! Turns struct, enum and event declarations into records and tagged unions.

use tracing::warn;

use crate::{
    declaration::{EnumDecl, EventBody, EventDecl, EventMember, Member, StructDecl},
    error::ResolveError,
    resolved::{Field, ResolvedType, Variant},
    resolver::Resolver,
    table::NamedDeclaration,
};

impl<'t> Resolver<'t> {
    pub(crate) fn materialize(
        &mut self,
        declaration: NamedDeclaration<'t>,
    ) -> Result<ResolvedType, ResolveError> {
        match declaration {
            NamedDeclaration::Struct(decl) => self.record(decl),
            NamedDeclaration::Enum(decl) => Ok(self.tagged_union(decl)),
            NamedDeclaration::Event(decl) => self.event(decl),
        }
    }

    fn record(&mut self, decl: &StructDecl) -> Result<ResolvedType, ResolveError> {
        check_direct_self_reference(&decl.name, decl.members.iter().map(member_slot))?;
        let fields = decl
            .members
            .iter()
            .map(|member| Field {
                name: member.name.clone(),
                ty: self.resolve_member(&decl.name, &member.name, &member.ty),
            })
            .collect();
        Ok(ResolvedType::Record(fields))
    }

    fn tagged_union(&mut self, decl: &EnumDecl) -> ResolvedType {
        let variants = decl
            .variants
            .iter()
            .map(|variant| Variant {
                name: variant.name.clone(),
                payload: self.resolve_member(&decl.name, &variant.name, &variant.ty),
            })
            .collect();
        ResolvedType::TaggedUnion(variants)
    }

    /// Member kinds (`key`, `data`, `nested`, `flat`) do not affect the shape.
    fn event(&mut self, decl: &EventDecl) -> Result<ResolvedType, ResolveError> {
        match &decl.body {
            EventBody::Struct { members } => {
                check_direct_self_reference(&decl.name, members.iter().map(event_slot))?;
                let fields = members
                    .iter()
                    .map(|member| Field {
                        name: member.name.clone(),
                        ty: self.resolve_member(&decl.name, &member.name, &member.ty),
                    })
                    .collect();
                Ok(ResolvedType::Record(fields))
            }
            EventBody::Enum { variants } => {
                let variants = variants
                    .iter()
                    .map(|variant| Variant {
                        name: variant.name.clone(),
                        payload: self.resolve_member(&decl.name, &variant.name, &variant.ty),
                    })
                    .collect();
                Ok(ResolvedType::TaggedUnion(variants))
            }
        }
    }
}

fn member_slot(member: &Member) -> (&str, &str) {
    (&member.name, &member.ty)
}

fn event_slot(member: &EventMember) -> (&str, &str) {
    (&member.name, &member.ty)
}

/// Rejects a member typed, with no enclosing wrapper, as the declaration that contains it.
fn check_direct_self_reference<'a>(
    name: &str,
    mut members: impl Iterator<Item = (&'a str, &'a str)>,
) -> Result<(), ResolveError> {
    match members.find(|(_, ty)| ty.trim() == name) {
        Some((member, _)) => {
            warn!(name, member, "direct self-reference");
            Err(ResolveError::DirectSelfReference {
                name: name.to_string(),
                member: member.to_string(),
            })
        }
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        declaration::{Abi, EventMemberKind},
        error::ResolveError,
        primitives::PrimitiveKind,
        resolved::{Field, ResolvedType, Variant},
        table::DeclarationTable,
    };
    use serde_json::json;

    fn table(declarations: serde_json::Value) -> DeclarationTable {
        Abi::from_value(declarations).unwrap().into_table()
    }

    fn felt() -> ResolvedType {
        ResolvedType::Primitive(PrimitiveKind::Felt)
    }

    #[test]
    fn point_fields_in_order() {
        let table = table(json!([{
            "type": "struct",
            "name": "Point",
            "members": [
                {"name": "x", "type": "core::felt252"},
                {"name": "y", "type": "core::felt252"}
            ]
        }]));
        let names: Vec<_> = match table.resolve("Point") {
            ResolvedType::Record(fields) => fields.into_iter().map(|f| f.name).collect(),
            other => panic!("expected a record, got {other}"),
        };
        assert_eq!(names, ["x", "y"]);
    }

    #[test]
    fn enum_is_tagged_union() {
        let table = table(json!([{
            "type": "enum",
            "name": "E",
            "variants": [
                {"name": "A", "type": "core::felt252"},
                {"name": "B", "type": "()"}
            ]
        }]));
        let union = table.resolve("E");
        assert_eq!(
            union,
            ResolvedType::TaggedUnion(vec![
                Variant {
                    name: "A".into(),
                    payload: felt(),
                },
                Variant {
                    name: "B".into(),
                    payload: ResolvedType::unit(),
                },
            ])
        );
        let value = json!({"B": []});
        let (variant, _) = union.select_variant(&value).unwrap();
        assert_eq!(variant.name, "B");
        assert!(union.select_variant(&json!({"A": 1, "B": []})).is_none());
    }

    #[test]
    fn direct_self_reference_is_rejected_without_touching_siblings() {
        let table = table(json!([
            {"type": "struct", "name": "Loop", "members": [
                {"name": "ok", "type": "core::felt252"},
                {"name": "me", "type": "Loop"}
            ]},
            {"type": "struct", "name": "Sibling", "members": [
                {"name": "x", "type": "core::felt252"}
            ]}
        ]));
        assert_eq!(
            table.try_resolve("Loop"),
            Err(ResolveError::DirectSelfReference {
                name: "Loop".into(),
                member: "me".into()
            })
        );
        assert_eq!(table.resolve("Loop"), ResolvedType::Unknown);
        assert_eq!(
            table.resolve("Sibling"),
            ResolvedType::Record(vec![Field {
                name: "x".into(),
                ty: felt(),
            }])
        );
    }

    #[test]
    fn bad_member_is_local() {
        let table = table(json!([{
            "type": "struct",
            "name": "S",
            "members": [
                {"name": "bad", "type": "(core::felt252"},
                {"name": "good", "type": "core::bool"}
            ]
        }]));
        assert_eq!(
            table.resolve("S"),
            ResolvedType::Record(vec![
                Field {
                    name: "bad".into(),
                    ty: ResolvedType::Unknown,
                },
                Field {
                    name: "good".into(),
                    ty: ResolvedType::Primitive(PrimitiveKind::Bool),
                },
            ])
        );
    }

    #[test]
    fn events_ignore_member_kinds() {
        let table = table(json!([
            {"type": "event", "name": "Transfer", "kind": "struct", "members": [
                {"name": "from", "type": "core::starknet::contract_address::ContractAddress", "kind": "key"},
                {"name": "amount", "type": "core::integer::u256", "kind": "data"}
            ]},
            {"type": "event", "name": "Event", "kind": "enum", "variants": [
                {"name": "Transfer", "type": "Transfer", "kind": "nested"}
            ]}
        ]));
        let event = table.event_decl("Transfer").unwrap();
        assert_eq!(event.entries()[0].kind, EventMemberKind::Key);

        let transfer = table.resolve("Transfer");
        assert_eq!(
            transfer.field("from"),
            Some(&ResolvedType::Primitive(PrimitiveKind::ContractAddress))
        );
        assert_eq!(
            transfer.field("amount"),
            Some(&ResolvedType::Primitive(PrimitiveKind::U256))
        );
        assert_eq!(table.resolve("Event").variant("Transfer"), Some(&transfer));
    }
}
