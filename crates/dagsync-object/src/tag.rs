//! Field tag parsing.
//!
//! A tag is a comma-separated list of tokens. The literal token `href` marks
//! a reference field; a `schema=<name>` token names the registry entry that
//! describes the referenced objects. Dynamic references carry their schema
//! inline and need no name.

use crate::error::{ObjectError, ObjectResult};
use crate::schema::{Field, FieldType};

/// Token marking a reference field.
pub const HREF: &str = "href";

const SCHEMA_PREFIX: &str = "schema=";

/// How a reference field points at other entries.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Reference {
    /// One hash; its schema is looked up by name.
    Plain { schema: String },
    /// A sequence of hashes sharing one schema looked up by name.
    Array { schema: String },
    /// An inline `{schema, object}` pair.
    Dynamic,
}

fn tokens(tag: &str) -> impl Iterator<Item = &str> {
    tag.split(',').map(str::trim)
}

/// Returns `true` if the tag contains the `href` token.
pub fn is_reference_tag(tag: &str) -> bool {
    tokens(tag).any(|t| t == HREF)
}

/// Extract `<name>` from the tag's `schema=<name>` token.
pub fn tag_schema_name(tag: &str) -> ObjectResult<&str> {
    let Some(token) = tokens(tag).find(|t| t.starts_with(SCHEMA_PREFIX)) else {
        return Err(ObjectError::MissingSchemaName(tag.to_string()));
    };
    let parts: Vec<&str> = token.split('=').collect();
    match parts.as_slice() {
        [_, name] if !name.is_empty() => Ok(*name),
        _ => Err(ObjectError::MalformedTag(token.to_string())),
    }
}

pub(crate) fn resolve(field: &Field) -> ObjectResult<Option<Reference>> {
    if !is_reference_tag(&field.tag) {
        return Ok(None);
    }
    let reference = match field.kind {
        FieldType::Reference => Reference::Plain {
            schema: tag_schema_name(&field.tag)?.to_string(),
        },
        FieldType::References => Reference::Array {
            schema: tag_schema_name(&field.tag)?.to_string(),
        },
        FieldType::Dynamic => Reference::Dynamic,
        ref other => {
            return Err(ObjectError::SchemaTagMismatch {
                field: field.name.clone(),
                kind: other.to_string(),
            })
        }
    };
    Ok(Some(reference))
}
