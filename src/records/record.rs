//! The owned record type and its pack/unpack codec.

use eyre::{bail, ensure, Result};

use crate::config::MAX_RECORD_HEADER;
use crate::encoding::{read_u16, read_u32, read_varint32, write_u16, write_u32, write_varint32};
use crate::records::value::{
    FieldType, Value, TEXT_TAG_BASE, TYPE_INT16, TYPE_INT32, TYPE_INT8, TYPE_NULL,
};

/// An ordered list of typed fields, fixed at creation time.
///
/// Field access is type-checked: asking for an integer at a text field is
/// an error, not undefined behavior. Check [`Record::field_type`] first
/// when the shape is not known statically.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    fields: Vec<Value>,
}

impl Record {
    pub fn new(fields: Vec<Value>) -> Self {
        Self { fields }
    }

    /// Builds a record from a compact type-spec string and matching
    /// values. `"|s|0|i1|i2|i4|"` means text, null, int8, int16, int32.
    /// Arity or type mismatches are errors.
    pub fn from_spec(spec: &str, values: &[Value]) -> Result<Self> {
        let mut expected = Vec::new();
        for token in spec.split('|').filter(|t| !t.is_empty()) {
            let field_type = match token {
                "s" => FieldType::Text,
                "0" => FieldType::Null,
                "i1" => FieldType::Int8,
                "i2" => FieldType::Int16,
                "i4" => FieldType::Int32,
                other => bail!("unknown field spec token '{}'", other),
            };
            expected.push(field_type);
        }
        ensure!(
            expected.len() == values.len(),
            "spec '{}' lists {} fields but {} values were given",
            spec,
            expected.len(),
            values.len()
        );
        for (i, (want, value)) in expected.iter().zip(values).enumerate() {
            ensure!(
                value.field_type() == *want,
                "field {}: spec says {}, value is {}",
                i,
                want,
                value.field_type()
            );
        }
        Ok(Self::new(values.to_vec()))
    }

    pub fn fields(&self) -> &[Value] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn field_type(&self, i: usize) -> Result<FieldType> {
        Ok(self.field(i)?.field_type())
    }

    pub fn is_null(&self, i: usize) -> Result<bool> {
        Ok(matches!(self.field(i)?, Value::Null))
    }

    pub fn get_int8(&self, i: usize) -> Result<i8> {
        match self.field(i)? {
            Value::Int8(v) => Ok(*v),
            other => bail!("field {} is {}, not int8", i, other.field_type()),
        }
    }

    pub fn get_int16(&self, i: usize) -> Result<i16> {
        match self.field(i)? {
            Value::Int16(v) => Ok(*v),
            other => bail!("field {} is {}, not int16", i, other.field_type()),
        }
    }

    pub fn get_int32(&self, i: usize) -> Result<i32> {
        match self.field(i)? {
            Value::Int32(v) => Ok(*v),
            other => bail!("field {} is {}, not int32", i, other.field_type()),
        }
    }

    pub fn get_text(&self, i: usize) -> Result<&str> {
        match self.field(i)? {
            Value::Text(s) => Ok(s),
            other => bail!("field {} is {}, not text", i, other.field_type()),
        }
    }

    pub fn text_len(&self, i: usize) -> Result<usize> {
        Ok(self.get_text(i)?.len())
    }

    /// Packed size of this record (header plus data segment).
    pub fn packed_len(&self) -> usize {
        let header: usize = 1 + self.fields.iter().map(Value::header_entry_len).sum::<usize>();
        let data: usize = self.fields.iter().map(Value::data_len).sum();
        header + data
    }

    /// Serializes the record into its wire form.
    pub fn pack(&self) -> Result<Vec<u8>> {
        let header_len =
            1 + self.fields.iter().map(Value::header_entry_len).sum::<usize>();
        ensure!(
            header_len <= MAX_RECORD_HEADER,
            "record header of {} bytes exceeds the {}-byte limit",
            header_len,
            MAX_RECORD_HEADER
        );
        let mut buf = vec![0u8; self.packed_len()];
        buf[0] = header_len as u8;
        let mut entry_pos = 1;
        let mut data_pos = header_len;
        for value in &self.fields {
            match value {
                Value::Null => {
                    buf[entry_pos] = TYPE_NULL;
                    entry_pos += 1;
                }
                Value::Int8(v) => {
                    buf[entry_pos] = TYPE_INT8;
                    entry_pos += 1;
                    buf[data_pos] = *v as u8;
                    data_pos += 1;
                }
                Value::Int16(v) => {
                    buf[entry_pos] = TYPE_INT16;
                    entry_pos += 1;
                    write_u16(&mut buf, data_pos, *v as u16)?;
                    data_pos += 2;
                }
                Value::Int32(v) => {
                    buf[entry_pos] = TYPE_INT32;
                    entry_pos += 1;
                    write_u32(&mut buf, data_pos, *v as u32)?;
                    data_pos += 4;
                }
                Value::Text(s) => {
                    let tag = 2 * s.len() as u64 + TEXT_TAG_BASE as u64;
                    ensure!(
                        u32::try_from(tag).is_ok(),
                        "text field of {} bytes does not fit a varint32 tag",
                        s.len()
                    );
                    write_varint32(&mut buf, entry_pos, tag as u32)?;
                    entry_pos += 4;
                    buf[data_pos..data_pos + s.len()].copy_from_slice(s.as_bytes());
                    data_pos += s.len();
                }
            }
        }
        Ok(buf)
    }

    /// Parses a packed record. Bytes beyond the described record are
    /// ignored.
    pub fn unpack(raw: &[u8]) -> Result<Self> {
        ensure!(!raw.is_empty(), "record is empty");
        let header_len = raw[0] as usize;
        ensure!(
            header_len >= 1 && header_len <= raw.len(),
            "record header of {} bytes does not fit the {} available",
            header_len,
            raw.len()
        );

        // First pass: walk the header, collecting per-field types and the
        // text lengths encoded in their tags.
        let mut types = Vec::new();
        let mut entry_pos = 1;
        while entry_pos < header_len {
            let byte = raw[entry_pos];
            if byte & 0x80 != 0 {
                ensure!(
                    entry_pos + 4 <= header_len,
                    "text tag at offset {} overruns the record header",
                    entry_pos
                );
                let tag = read_varint32(raw, entry_pos)?;
                ensure!(
                    tag >= TEXT_TAG_BASE && (tag - TEXT_TAG_BASE) % 2 == 0,
                    "invalid text tag {}",
                    tag
                );
                types.push((FieldType::Text, ((tag - TEXT_TAG_BASE) / 2) as usize));
                entry_pos += 4;
            } else {
                let field_type = match byte {
                    TYPE_NULL => FieldType::Null,
                    TYPE_INT8 => FieldType::Int8,
                    TYPE_INT16 => FieldType::Int16,
                    TYPE_INT32 => FieldType::Int32,
                    other => bail!("invalid field type byte 0x{:02x}", other),
                };
                types.push((field_type, 0));
                entry_pos += 1;
            }
        }

        // Second pass: slice the data segment at the accumulated offsets.
        let mut fields = Vec::with_capacity(types.len());
        let mut data_pos = header_len;
        for (field_type, text_len) in types {
            let width = match field_type {
                FieldType::Null => 0,
                FieldType::Int8 => 1,
                FieldType::Int16 => 2,
                FieldType::Int32 => 4,
                FieldType::Text => text_len,
            };
            ensure!(
                data_pos + width <= raw.len(),
                "record data segment truncated at offset {} ({} bytes needed)",
                data_pos,
                width
            );
            let value = match field_type {
                FieldType::Null => Value::Null,
                FieldType::Int8 => Value::Int8(raw[data_pos] as i8),
                FieldType::Int16 => Value::Int16(read_u16(raw, data_pos)? as i16),
                FieldType::Int32 => Value::Int32(read_u32(raw, data_pos)? as i32),
                FieldType::Text => {
                    let bytes = raw[data_pos..data_pos + width].to_vec();
                    let text = String::from_utf8(bytes)
                        .map_err(|_| eyre::eyre!("text field at offset {} is not valid utf-8", data_pos))?;
                    Value::Text(text)
                }
            };
            fields.push(value);
            data_pos += width;
        }
        Ok(Self { fields })
    }

    fn field(&self, i: usize) -> Result<&Value> {
        self.fields
            .get(i)
            .ok_or_else(|| eyre::eyre!("field {} out of range (record has {})", i, self.fields.len()))
    }
}
