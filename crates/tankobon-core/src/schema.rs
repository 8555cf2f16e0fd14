// SPDX-FileCopyrightText: 2026 Tankobon Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Name-indexed schema registry.
//!
//! The registry describes the queryable shape of the snapshot: a map of
//! object types, each with named, string-typed fields. It is built once
//! from the snapshot's root declaration, handed to every plugin's schema
//! hook exactly once, then frozen for the host's lifetime. The HTTP
//! server exposes it verbatim for introspection.

use std::collections::BTreeMap;

use serde::Serialize;

/// A single field on an object type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldSpec {
    /// Type name, e.g. `String`, `Int`, `[Chapter]`.
    pub ty: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl FieldSpec {
    pub fn new(ty: impl Into<String>) -> Self {
        Self {
            ty: ty.into(),
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// An object type with named fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ObjectType {
    pub name: String,
    pub fields: BTreeMap<String, FieldSpec>,
}

impl ObjectType {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: BTreeMap::new(),
        }
    }

    /// Add or replace a field. Plugins use this from their schema hook
    /// to attach derived fields to existing types.
    pub fn set_field(&mut self, name: impl Into<String>, spec: FieldSpec) -> &mut Self {
        self.fields.insert(name.into(), spec);
        self
    }

    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.get(name)
    }
}

/// Registry of object types keyed by type name.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SchemaRegistry {
    types: BTreeMap<String, ObjectType>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an object type, replacing any previous type of the same name.
    pub fn insert_type(&mut self, ty: ObjectType) {
        self.types.insert(ty.name.clone(), ty);
    }

    pub fn get(&self, name: &str) -> Option<&ObjectType> {
        self.types.get(name)
    }

    /// Mutable access to an existing type, for schema-hook extension.
    pub fn type_mut(&mut self, name: &str) -> Option<&mut ObjectType> {
        self.types.get_mut(name)
    }

    pub fn types(&self) -> impl Iterator<Item = &ObjectType> {
        self.types.values()
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}
