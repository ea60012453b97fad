use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use dagsync_types::Hash;

use crate::codec;
use crate::error::ObjectResult;
use crate::tag::{self, Reference};

/// Declared type of a schema field.
///
/// The type fixes the field's encoded layout, which is what lets
/// [`codec::decode_field`] step over preceding fields without decoding them.
///
/// Variant order is part of the stored schema format.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldType {
    Bool,
    U8,
    U16,
    U32,
    U64,
    I8,
    I16,
    I32,
    I64,
    F32,
    F64,
    String,
    Bytes,
    /// A single [`Hash`].
    Reference,
    /// An ordered sequence of [`Hash`] values.
    References,
    /// An inline [`DynamicRef`].
    Dynamic,
    Option(Box<FieldType>),
    List(Box<FieldType>),
    /// An embedded struct encoded inline, field after field.
    Struct(Vec<Field>),
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool => write!(f, "bool"),
            Self::U8 => write!(f, "u8"),
            Self::U16 => write!(f, "u16"),
            Self::U32 => write!(f, "u32"),
            Self::U64 => write!(f, "u64"),
            Self::I8 => write!(f, "i8"),
            Self::I16 => write!(f, "i16"),
            Self::I32 => write!(f, "i32"),
            Self::I64 => write!(f, "i64"),
            Self::F32 => write!(f, "f32"),
            Self::F64 => write!(f, "f64"),
            Self::String => write!(f, "string"),
            Self::Bytes => write!(f, "bytes"),
            Self::Reference => write!(f, "reference"),
            Self::References => write!(f, "references"),
            Self::Dynamic => write!(f, "dynamic"),
            Self::Option(inner) => write!(f, "option<{inner}>"),
            Self::List(inner) => write!(f, "list<{inner}>"),
            Self::Struct(fields) => write!(f, "struct({} fields)", fields.len()),
        }
    }
}

/// One field of a [`Schema`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    pub kind: FieldType,
    /// Comma-separated tag tokens, e.g. `"href,schema=User"`.
    pub tag: String,
}

impl Field {
    pub fn new(name: impl Into<String>, kind: FieldType, tag: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind,
            tag: tag.into(),
        }
    }

    /// Resolve the field's tag and declared type into a reference
    /// descriptor.
    ///
    /// Returns `Ok(None)` for fields whose tag lacks the `href` token.
    pub fn reference(&self) -> ObjectResult<Option<Reference>> {
        tag::resolve(self)
    }
}

/// Structural description of a stored type.
///
/// Schemas are stored like any other entry and addressed by the hash of
/// their encoding, so each version of a type is its own DAG node.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    pub name: String,
    /// Fields in encoding order.
    pub fields: Vec<Field>,
}

impl Schema {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    /// Append a field.
    pub fn field(mut self, name: impl Into<String>, kind: FieldType, tag: impl Into<String>) -> Self {
        self.fields.push(Field::new(name, kind, tag));
        self
    }

    pub fn get(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn encode(&self) -> ObjectResult<Vec<u8>> {
        codec::encode(self)
    }

    /// Content hash of the encoded schema.
    pub fn hash(&self) -> ObjectResult<Hash> {
        Ok(Hash::sum(&self.encode()?))
    }

    /// Every reference field with its resolved descriptor.
    pub fn references(&self) -> ObjectResult<Vec<(&Field, Reference)>> {
        let mut refs = Vec::new();
        for field in &self.fields {
            if let Some(reference) = field.reference()? {
                refs.push((field, reference));
            }
        }
        Ok(refs)
    }
}

/// A reference that carries its target's schema inline.
///
/// The all-null pair means "no reference".
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DynamicRef {
    pub schema: Hash,
    pub object: Hash,
}

impl DynamicRef {
    pub fn new(schema: Hash, object: Hash) -> Self {
        Self { schema, object }
    }

    pub fn is_empty(&self) -> bool {
        self.schema.is_null() && self.object.is_null()
    }
}

/// A storable type that describes its own schema.
///
/// The schema's fields must list the type's serialized fields in
/// declaration order with matching types.
pub trait Object: Serialize + DeserializeOwned {
    fn schema() -> Schema;
}
