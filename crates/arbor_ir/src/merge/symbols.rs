//! Symbol keys used to unify types and declarations across stores.

use crate::error::{IrError, IrResult};
use crate::fields::Qualifiers;
use crate::ids::NodeId;
use crate::node::Node;
use crate::store::NodeStore;
use std::collections::HashMap;

/// Name space a type name lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeNamespace {
    /// Typedef names and built-in type names.
    Ordinary,
    /// `struct` tags.
    Struct,
    /// `union` tags.
    Union,
    /// `enum` tags.
    Enum,
}

/// Which variant of a named type a key designates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeVariant {
    /// The type as named.
    Named,
    /// A typedef name whose type records an unqualified main variant.
    TypedefUnqualified,
    /// The unqualified main variant behind such a typedef, which may itself
    /// be anonymous.
    MainOfTypedef,
}

/// Key of a named type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeKey {
    /// Name space.
    pub namespace: TypeNamespace,
    /// Type name.
    pub name: String,
    /// Qualifiers, for typedef-named types.
    pub quals: Qualifiers,
    /// Variant designated.
    pub variant: TypeVariant,
}

/// Scope part of a declaration key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ScopeKey {
    /// File or namespace scope, non-function.
    Global,
    /// The function name space.
    Functions,
    /// Member of a named record.
    Record {
        /// Record or typedef name.
        name: String,
        /// Qualifiers of a typedef-named record.
        quals: Qualifiers,
        /// Named through a typedef.
        typedef: bool,
        /// The member is a function.
        member_function: bool,
    },
    /// Member of an anonymous record reached through a typedef.
    Anonymous(TypeKey),
}

/// Key of a declaration: its linkage name and scope.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DeclKey {
    /// Mangled name, or plain name with the builtin prefix stripped.
    pub name: String,
    /// Enclosing scope.
    pub scope: ScopeKey,
}

fn scoped_in_function(store: &NodeStore, scope: Option<NodeId>) -> bool {
    scope
        .and_then(|s| store.try_get(s))
        .is_some_and(|s| matches!(s, Node::FunctionDecl(_)))
}

/// Text of a type's name and whether it goes through a `type_decl`.
fn type_name(store: &NodeStore, name: NodeId) -> IrResult<Option<(String, bool)>> {
    match store.resolve(name, "merge symbol table")? {
        Node::Identifier(_) => Ok(store.identifier_text(name).map(|t| (t.to_string(), false))),
        Node::TypeDecl(decl) => Ok(decl
            .decl
            .name
            .and_then(|n| store.identifier_text(n))
            .map(|t| (t.to_string(), true))),
        other => Err(IrError::InvariantViolation(format!(
            "type name {name} is a `{}`",
            other.kind()
        ))),
    }
}

/// Key of a named type, or `None` for anonymous and function-local types.
pub fn type_key(store: &NodeStore, node: &Node) -> IrResult<Option<TypeKey>> {
    let Some(ty) = node.type_fields() else {
        return Ok(None);
    };
    let Some(name_id) = ty.name else {
        return Ok(None);
    };
    if scoped_in_function(store, ty.scpe) {
        return Ok(None);
    }
    let Some((name, via_typedef)) = type_name(store, name_id)? else {
        return Ok(None);
    };
    if via_typedef || ty.unql.is_some() {
        let variant = if ty.qual.is_empty() && ty.unql.is_some() {
            TypeVariant::TypedefUnqualified
        } else {
            TypeVariant::Named
        };
        return Ok(Some(TypeKey {
            namespace: TypeNamespace::Ordinary,
            name,
            quals: ty.qual,
            variant,
        }));
    }
    let namespace = match node {
        Node::RecordType(_) => TypeNamespace::Struct,
        Node::UnionType(_) => TypeNamespace::Union,
        Node::EnumeralType(_) => TypeNamespace::Enum,
        _ => TypeNamespace::Ordinary,
    };
    Ok(Some(TypeKey {
        namespace,
        name,
        quals: Qualifiers::default(),
        variant: TypeVariant::Named,
    }))
}

/// For an unqualified typedef'd record or union, the id of its main variant
/// and the key that variant is registered under.
pub fn main_variant_key(store: &NodeStore, node: &Node) -> IrResult<Option<(NodeId, TypeKey)>> {
    let namespace = match node {
        Node::RecordType(_) => TypeNamespace::Struct,
        Node::UnionType(_) => TypeNamespace::Union,
        _ => return Ok(None),
    };
    let Some(ty) = node.type_fields() else {
        return Ok(None);
    };
    let Some(unql) = ty.unql else {
        return Ok(None);
    };
    if !ty.qual.is_empty() {
        return Ok(None);
    }
    let Some(key) = type_key(store, node)? else {
        return Ok(None);
    };
    Ok(Some((
        unql,
        TypeKey {
            namespace,
            name: key.name,
            quals: Qualifiers::default(),
            variant: TypeVariant::MainOfTypedef,
        },
    )))
}

/// Key of a declaration, or `None` when it never enters a symbol table:
/// unnamed, parameters and results, function-local, or a member of an
/// anonymous record that no typedef names.
pub fn decl_key(
    store: &NodeStore,
    node: &Node,
    main_variants: &HashMap<NodeId, TypeKey>,
    builtin_prefix: &str,
) -> IrResult<Option<DeclKey>> {
    let Some(decl) = node.decl() else {
        return Ok(None);
    };
    if matches!(node, Node::ParmDecl(_) | Node::ResultDecl(_)) {
        return Ok(None);
    }
    let Some(name_id) = decl.name else {
        return Ok(None);
    };
    let is_function = matches!(node, Node::FunctionDecl(_));
    let scope = decl.scpe.and_then(|s| store.try_get(s).map(|n| (s, n)));

    let scope_key = match scope {
        Some((_, Node::FunctionDecl(_))) => return Ok(None),
        Some((scope_id, scope_node)) => match scope_node.type_fields() {
            Some(ty) => match ty.name {
                Some(type_name_id) => {
                    if scoped_in_function(store, ty.scpe) {
                        return Ok(None);
                    }
                    let Some((name, typedef)) = type_name(store, type_name_id)? else {
                        return Ok(None);
                    };
                    ScopeKey::Record {
                        name,
                        quals: if typedef { ty.qual } else { Qualifiers::default() },
                        typedef,
                        member_function: is_function,
                    }
                }
                None => match main_variants.get(&scope_id) {
                    Some(key) => ScopeKey::Anonymous(key.clone()),
                    None if is_function => ScopeKey::Functions,
                    None => return Ok(None),
                },
            },
            None if is_function => ScopeKey::Functions,
            None => ScopeKey::Global,
        },
        None if is_function => ScopeKey::Functions,
        None => ScopeKey::Global,
    };

    let strip = |text: &str| text.strip_prefix(builtin_prefix).unwrap_or(text).to_string();
    let builtin = matches!(node, Node::FunctionDecl(f) if f.builtin);
    let name = match decl.mngl {
        Some(mngl) if !builtin => store.identifier_text(mngl).map(str::to_string),
        _ => store.identifier_text(name_id).map(strip),
    };
    Ok(name.map(|name| DeclKey {
        name,
        scope: scope_key,
    }))
}
