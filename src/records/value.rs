//! Typed field values and their wire type codes.

use std::fmt;

/// Wire type byte for a null field.
pub const TYPE_NULL: u8 = 0;
/// Wire type byte for a 1-byte integer field.
pub const TYPE_INT8: u8 = 1;
/// Wire type byte for a 2-byte integer field.
pub const TYPE_INT16: u8 = 2;
/// Wire type byte for a 4-byte integer field.
pub const TYPE_INT32: u8 = 4;
/// Base of the text tag range: a text field of `len` bytes is tagged
/// `2 * len + TEXT_TAG_BASE`. Always odd, always >= 13.
pub const TEXT_TAG_BASE: u32 = 13;

/// One field of a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Null,
    Int8(i8),
    Int16(i16),
    Int32(i32),
    Text(String),
}

impl Value {
    pub fn field_type(&self) -> FieldType {
        match self {
            Value::Null => FieldType::Null,
            Value::Int8(_) => FieldType::Int8,
            Value::Int16(_) => FieldType::Int16,
            Value::Int32(_) => FieldType::Int32,
            Value::Text(_) => FieldType::Text,
        }
    }

    /// Bytes this field occupies in the data segment.
    pub fn data_len(&self) -> usize {
        match self {
            Value::Null => 0,
            Value::Int8(_) => 1,
            Value::Int16(_) => 2,
            Value::Int32(_) => 4,
            Value::Text(s) => s.len(),
        }
    }

    /// Bytes this field's entry occupies in the record header.
    pub fn header_entry_len(&self) -> usize {
        match self {
            Value::Text(_) => 4,
            _ => 1,
        }
    }
}

/// The type of a field, without its value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    Null,
    Int8,
    Int16,
    Int32,
    Text,
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FieldType::Null => "null",
            FieldType::Int8 => "int8",
            FieldType::Int16 => "int16",
            FieldType::Int32 => "int32",
            FieldType::Text => "text",
        };
        f.write_str(name)
    }
}
