use dagsync_store::StoreError;
use dagsync_types::Hash;

/// Errors from schema, root, and want-set operations.
#[derive(Debug, thiserror::Error)]
pub enum ObjectError {
    /// The operation needs a current root but none is held.
    #[error("missing root object")]
    MissingRoot,

    /// A reference tag has no `schema=<name>` token.
    #[error("missing schema name in tag {0:?}")]
    MissingSchemaName(String),

    /// A `schema=` token could not be parsed.
    #[error("malformed tag: {0:?}")]
    MalformedTag(String),

    /// The schema name is not in the current root's registry.
    #[error("unregistered schema: {0}")]
    UnregisteredSchema(String),

    /// A field is tagged as a reference but its type cannot hold one.
    #[error("unexpected href tag on field {field} of type {kind}")]
    SchemaTagMismatch { field: String, kind: String },

    /// Untrusted bytes could not be decoded into a root.
    #[error("malformed root: {0}")]
    Decode(String),

    /// The requested object has not been received yet.
    #[error("missing object: {0}")]
    MissingObject(Hash),

    /// A schema does not declare the requested field.
    #[error("no such field: {0}")]
    MissingField(String),

    /// Encoded bytes do not match the layout their schema describes.
    #[error("codec error: {0}")]
    Codec(String),

    /// Reference nesting went deeper than the configured bound.
    #[error("reference depth exceeded {0}")]
    DepthExceeded(usize),

    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

pub type ObjectResult<T> = Result<T, ObjectError>;
