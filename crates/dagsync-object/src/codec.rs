//! Deterministic encoding and single-field extraction.
//!
//! Values are encoded with bincode's default options: fixed-width little
//! endian integers, `u64` length prefixes, enum variants as `u32`. The same
//! value always yields the same bytes as long as it holds no `HashMap`.
//!
//! [`decode_field`] uses a schema's declared field types to step over the
//! encoded fields that precede the requested one, then decodes only that
//! field.
//!
//! Schemas arrive from peers, so nesting of `Option`, `List` and `Struct`
//! types is capped at [`MAX_NESTING`] both when a schema is decoded and when
//! its types drive a skip.

use serde::de::DeserializeOwned;
use serde::Serialize;

use dagsync_types::hash::HASH_LEN;

use crate::error::{ObjectError, ObjectResult};
use crate::schema::{Field, FieldType, Schema};

/// Deepest `Option`/`List`/`Struct` nesting accepted in a field type.
pub const MAX_NESTING: usize = 64;

// `FieldType` variant indices as bincode writes them.
const FIRST_COMPOSITE: u32 = 16;
const OPTION: u32 = 16;
const LIST: u32 = 17;
const STRUCT: u32 = 18;

/// Encode a value.
pub fn encode<T: Serialize + ?Sized>(value: &T) -> ObjectResult<Vec<u8>> {
    bincode::serialize(value).map_err(|e| ObjectError::Codec(e.to_string()))
}

/// Decode a whole value.
pub fn decode<T: DeserializeOwned>(data: &[u8]) -> ObjectResult<T> {
    bincode::deserialize(data).map_err(|e| ObjectError::Codec(e.to_string()))
}

/// Decode a stored schema.
///
/// The raw layout is checked first, so a schema nested past [`MAX_NESTING`]
/// is a `Codec` error before serde recurses into it.
pub fn decode_schema(data: &[u8]) -> ObjectResult<Schema> {
    Cursor::new(data).check_schema()?;
    decode(data)
}

/// Decode the field `name` of an object encoded with `fields`.
pub fn decode_field<T: DeserializeOwned>(
    data: &[u8],
    fields: &[Field],
    name: &str,
) -> ObjectResult<T> {
    let mut cursor = Cursor::new(data);
    for field in fields {
        if field.name == name {
            return decode(cursor.rest());
        }
        cursor.skip(&field.kind, 0)?;
    }
    Err(ObjectError::MissingField(name.to_string()))
}

fn too_deep() -> ObjectError {
    ObjectError::Codec(format!("field types nested deeper than {MAX_NESTING}"))
}

/// Whether values of `kind` encode to zero bytes.
fn is_zero_width(kind: &FieldType, depth: usize) -> ObjectResult<bool> {
    if depth > MAX_NESTING {
        return Err(too_deep());
    }
    match kind {
        FieldType::Struct(fields) => {
            for field in fields {
                if !is_zero_width(&field.kind, depth + 1)? {
                    return Ok(false);
                }
            }
            Ok(true)
        }
        _ => Ok(false),
    }
}

struct Cursor<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    fn rest(&self) -> &'a [u8] {
        &self.data[self.pos..]
    }

    fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    fn take(&mut self, n: usize) -> ObjectResult<&'a [u8]> {
        let end = self
            .pos
            .checked_add(n)
            .filter(|end| *end <= self.data.len())
            .ok_or_else(|| {
                ObjectError::Codec(format!(
                    "unexpected end of data: need {n} bytes at offset {}, have {}",
                    self.pos,
                    self.remaining()
                ))
            })?;
        let slice = &self.data[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    fn read_len(&mut self) -> ObjectResult<usize> {
        let bytes = self.take(8)?;
        let mut arr = [0u8; 8];
        arr.copy_from_slice(bytes);
        usize::try_from(u64::from_le_bytes(arr))
            .map_err(|_| ObjectError::Codec("length prefix overflows usize".into()))
    }

    fn read_variant(&mut self) -> ObjectResult<u32> {
        let bytes = self.take(4)?;
        let mut arr = [0u8; 4];
        arr.copy_from_slice(bytes);
        Ok(u32::from_le_bytes(arr))
    }

    fn skip_seq(&mut self, width: usize) -> ObjectResult<()> {
        let len = self.read_len()?;
        let total = len
            .checked_mul(width)
            .ok_or_else(|| ObjectError::Codec("sequence length overflow".into()))?;
        self.take(total).map(|_| ())
    }

    // -----------------------------------------------------------------
    // Schema layout check
    // -----------------------------------------------------------------

    fn check_schema(&mut self) -> ObjectResult<()> {
        self.skip_seq(1)?;
        let count = self.read_len()?;
        for _ in 0..count {
            self.check_field(0)?;
        }
        Ok(())
    }

    fn check_field(&mut self, depth: usize) -> ObjectResult<()> {
        self.skip_seq(1)?;
        self.check_type(depth)?;
        self.skip_seq(1)
    }

    fn check_type(&mut self, depth: usize) -> ObjectResult<()> {
        if depth > MAX_NESTING {
            return Err(too_deep());
        }
        match self.read_variant()? {
            v if v < FIRST_COMPOSITE => Ok(()),
            OPTION | LIST => self.check_type(depth + 1),
            STRUCT => {
                let count = self.read_len()?;
                for _ in 0..count {
                    self.check_field(depth + 1)?;
                }
                Ok(())
            }
            other => Err(ObjectError::Codec(format!("unknown field type {other}"))),
        }
    }

    // -----------------------------------------------------------------
    // Object layout skip
    // -----------------------------------------------------------------

    fn skip(&mut self, kind: &FieldType, depth: usize) -> ObjectResult<()> {
        if depth > MAX_NESTING {
            return Err(too_deep());
        }
        match kind {
            FieldType::Bool | FieldType::U8 | FieldType::I8 => self.take(1).map(|_| ()),
            FieldType::U16 | FieldType::I16 => self.take(2).map(|_| ()),
            FieldType::U32 | FieldType::I32 | FieldType::F32 => self.take(4).map(|_| ()),
            FieldType::U64 | FieldType::I64 | FieldType::F64 => self.take(8).map(|_| ()),
            FieldType::String | FieldType::Bytes => self.skip_seq(1),
            FieldType::Reference => self.take(HASH_LEN).map(|_| ()),
            FieldType::References => self.skip_seq(HASH_LEN),
            FieldType::Dynamic => self.take(2 * HASH_LEN).map(|_| ()),
            FieldType::Option(inner) => match self.take(1)?[0] {
                0 => Ok(()),
                1 => self.skip(inner, depth + 1),
                tag => Err(ObjectError::Codec(format!("invalid option tag {tag}"))),
            },
            FieldType::List(inner) => {
                let len = self.read_len()?;
                if is_zero_width(inner, depth + 1)? {
                    return Ok(());
                }
                // Any other element type takes at least one byte.
                if len > self.remaining() {
                    return Err(ObjectError::Codec(format!(
                        "list of {len} elements exceeds {} remaining bytes",
                        self.remaining()
                    )));
                }
                for _ in 0..len {
                    self.skip(inner, depth + 1)?;
                }
                Ok(())
            }
            FieldType::Struct(fields) => {
                for field in fields {
                    self.skip(&field.kind, depth + 1)?;
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::DynamicRef;
    use dagsync_types::Hash;
    use serde::Deserialize;

    #[derive(Serialize, Deserialize, Debug, PartialEq)]
    struct Inner {
        id: u16,
        label: String,
    }

    #[derive(Serialize, Deserialize, Debug, PartialEq)]
    struct Sample {
        flag: bool,
        small: i8,
        count: u32,
        ratio: f64,
        title: String,
        blob: Vec<u8>,
        maybe: Option<u64>,
        nothing: Option<String>,
        tags: Vec<String>,
        inner: Inner,
        single: Hash,
        many: Vec<Hash>,
        dynamic: DynamicRef,
        tail: i64,
    }

    fn sample_fields() -> Vec<Field> {
        Schema::new("Sample")
            .field("flag", FieldType::Bool, "")
            .field("small", FieldType::I8, "")
            .field("count", FieldType::U32, "")
            .field("ratio", FieldType::F64, "")
            .field("title", FieldType::String, "")
            .field("blob", FieldType::Bytes, "")
            .field("maybe", FieldType::Option(Box::new(FieldType::U64)), "")
            .field("nothing", FieldType::Option(Box::new(FieldType::String)), "")
            .field("tags", FieldType::List(Box::new(FieldType::String)), "")
            .field(
                "inner",
                FieldType::Struct(vec![
                    Field::new("id", FieldType::U16, ""),
                    Field::new("label", FieldType::String, ""),
                ]),
                "",
            )
            .field("single", FieldType::Reference, "href,schema=X")
            .field("many", FieldType::References, "href,schema=X")
            .field("dynamic", FieldType::Dynamic, "href")
            .field("tail", FieldType::I64, "")
            .fields
    }

    fn sample() -> Sample {
        Sample {
            flag: true,
            small: -3,
            count: 42,
            ratio: 0.5,
            title: "hello".into(),
            blob: vec![1, 2, 3, 4],
            maybe: Some(7),
            nothing: None,
            tags: vec!["a".into(), "bcd".into()],
            inner: Inner {
                id: 9,
                label: "inner".into(),
            },
            single: Hash::sum(b"single"),
            many: vec![Hash::sum(b"m1"), Hash::sum(b"m2")],
            dynamic: DynamicRef::new(Hash::sum(b"schema"), Hash::sum(b"object")),
            tail: -99,
        }
    }

    #[test]
    fn encode_is_deterministic() {
        assert_eq!(encode(&sample()).unwrap(), encode(&sample()).unwrap());
    }

    #[test]
    fn decode_field_after_every_layout_kind() {
        let data = encode(&sample()).unwrap();
        let fields = sample_fields();
        let s = sample();

        let flag: bool = decode_field(&data, &fields, "flag").unwrap();
        assert!(flag);
        let title: String = decode_field(&data, &fields, "title").unwrap();
        assert_eq!(title, s.title);
        let nothing: Option<String> = decode_field(&data, &fields, "nothing").unwrap();
        assert_eq!(nothing, None);
        let tags: Vec<String> = decode_field(&data, &fields, "tags").unwrap();
        assert_eq!(tags, s.tags);
        let inner: Inner = decode_field(&data, &fields, "inner").unwrap();
        assert_eq!(inner, s.inner);
        let single: Hash = decode_field(&data, &fields, "single").unwrap();
        assert_eq!(single, s.single);
        let many: Vec<Hash> = decode_field(&data, &fields, "many").unwrap();
        assert_eq!(many, s.many);
        let dynamic: DynamicRef = decode_field(&data, &fields, "dynamic").unwrap();
        assert_eq!(dynamic, s.dynamic);
        let tail: i64 = decode_field(&data, &fields, "tail").unwrap();
        assert_eq!(tail, -99);
    }

    #[test]
    fn decode_field_unknown_name() {
        let data = encode(&sample()).unwrap();
        let err = decode_field::<u32>(&data, &sample_fields(), "absent").unwrap_err();
        assert!(matches!(err, ObjectError::MissingField(n) if n == "absent"));
    }

    #[test]
    fn decode_field_truncated_data() {
        let data = encode(&sample()).unwrap();
        let err = decode_field::<i64>(&data[..20], &sample_fields(), "tail").unwrap_err();
        assert!(matches!(err, ObjectError::Codec(_)));
    }

    #[test]
    fn decode_field_bad_option_tag() {
        let fields = vec![
            Field::new("opt", FieldType::Option(Box::new(FieldType::U8)), ""),
            Field::new("after", FieldType::U8, ""),
        ];
        let err = decode_field::<u8>(&[5, 0, 0], &fields, "after").unwrap_err();
        assert!(matches!(err, ObjectError::Codec(m) if m.contains("option tag")));
    }

    #[test]
    fn decode_field_huge_length_prefix() {
        let fields = vec![
            Field::new("refs", FieldType::References, ""),
            Field::new("after", FieldType::U8, ""),
        ];
        let data = u64::MAX.to_le_bytes();
        let err = decode_field::<u8>(&data, &fields, "after").unwrap_err();
        assert!(matches!(err, ObjectError::Codec(_)));
    }

    #[test]
    fn decode_field_list_longer_than_data() {
        let fields = vec![
            Field::new("xs", FieldType::List(Box::new(FieldType::U8)), ""),
            Field::new("after", FieldType::U8, ""),
        ];
        let mut data = u64::MAX.to_le_bytes().to_vec();
        data.push(7);
        let err = decode_field::<u8>(&data, &fields, "after").unwrap_err();
        assert!(matches!(err, ObjectError::Codec(m) if m.contains("remaining")));
    }

    #[test]
    fn decode_field_huge_list_of_empty_structs() {
        let fields = vec![
            Field::new("xs", FieldType::List(Box::new(FieldType::Struct(vec![]))), ""),
            Field::new("after", FieldType::U8, ""),
        ];
        let mut data = u64::MAX.to_le_bytes().to_vec();
        data.push(7);
        assert_eq!(decode_field::<u8>(&data, &fields, "after").unwrap(), 7);
    }

    // -----------------------------------------------------------------------
    // Nesting limit
    // -----------------------------------------------------------------------

    fn nested_option(levels: usize) -> FieldType {
        (0..levels).fold(FieldType::Bool, |kind, _| FieldType::Option(Box::new(kind)))
    }

    /// Encoded schema `S { x: Option<Option<...<bool>>> }` built byte by byte.
    fn nested_option_schema_bytes(levels: usize) -> Vec<u8> {
        let mut data = Vec::new();
        data.extend_from_slice(&1u64.to_le_bytes());
        data.push(b'S');
        data.extend_from_slice(&1u64.to_le_bytes());
        data.extend_from_slice(&1u64.to_le_bytes());
        data.push(b'x');
        for _ in 0..levels {
            data.extend_from_slice(&OPTION.to_le_bytes());
        }
        data.extend_from_slice(&0u32.to_le_bytes());
        data.extend_from_slice(&0u64.to_le_bytes());
        data
    }

    #[test]
    fn hand_built_schema_bytes_match_encoder() {
        let schema = Schema::new("S").field("x", nested_option(3), "");
        assert_eq!(nested_option_schema_bytes(3), schema.encode().unwrap());
    }

    #[test]
    fn decode_schema_accepts_nesting_up_to_limit() {
        let schema = Schema::new("S").field("x", nested_option(MAX_NESTING), "");
        let decoded = decode_schema(&schema.encode().unwrap()).unwrap();
        assert_eq!(decoded, schema);
    }

    #[test]
    fn decode_schema_rejects_deep_nesting() {
        let data = nested_option_schema_bytes(MAX_NESTING + 1);
        assert!(matches!(decode_schema(&data), Err(ObjectError::Codec(_))));

        let data = nested_option_schema_bytes(100_000);
        let err = decode_schema(&data).unwrap_err();
        assert!(matches!(err, ObjectError::Codec(m) if m.contains("nested")));
    }

    #[test]
    fn decode_schema_rejects_deep_struct_nesting() {
        let kind = (0..MAX_NESTING + 1).fold(FieldType::Bool, |kind, i| {
            FieldType::Struct(vec![Field::new(format!("f{i}"), kind, "")])
        });
        let data = Schema::new("S").field("x", kind, "").encode().unwrap();
        assert!(matches!(decode_schema(&data), Err(ObjectError::Codec(_))));
    }

    #[test]
    fn decode_schema_rejects_unknown_type() {
        let mut data = nested_option_schema_bytes(0);
        let kind_at = 8 + 1 + 8 + 8 + 1;
        data[kind_at..kind_at + 4].copy_from_slice(&99u32.to_le_bytes());
        let err = decode_schema(&data).unwrap_err();
        assert!(matches!(err, ObjectError::Codec(m) if m.contains("unknown field type")));
    }

    #[test]
    fn decode_field_rejects_deep_local_type() {
        let fields = vec![
            Field::new("deep", nested_option(MAX_NESTING + 1), ""),
            Field::new("after", FieldType::U8, ""),
        ];
        let data = vec![1u8; 2 * MAX_NESTING];
        let err = decode_field::<u8>(&data, &fields, "after").unwrap_err();
        assert!(matches!(err, ObjectError::Codec(m) if m.contains("nested")));
    }

    #[test]
    fn schema_roundtrip() {
        let schema = Schema {
            name: "Sample".into(),
            fields: sample_fields(),
        };
        let decoded = decode_schema(&schema.encode().unwrap()).unwrap();
        assert_eq!(decoded, schema);
    }

    #[test]
    fn decode_schema_rejects_garbage() {
        assert!(matches!(
            decode_schema(&[0xff; 3]),
            Err(ObjectError::Codec(_))
        ));
    }
}
