//! Append-style record construction.

use crate::records::record::Record;
use crate::records::value::Value;

/// Accumulates fields one at a time, for callers that assemble a row
/// left to right rather than all at once.
///
/// ```
/// use shaledb::records::RecordBuilder;
///
/// let record = RecordBuilder::new()
///     .append_text("alice")
///     .append_int32(30)
///     .append_null()
///     .finish();
/// assert_eq!(record.len(), 3);
/// ```
#[derive(Debug, Default)]
pub struct RecordBuilder {
    fields: Vec<Value>,
}

impl RecordBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append_null(mut self) -> Self {
        self.fields.push(Value::Null);
        self
    }

    pub fn append_int8(mut self, value: i8) -> Self {
        self.fields.push(Value::Int8(value));
        self
    }

    pub fn append_int16(mut self, value: i16) -> Self {
        self.fields.push(Value::Int16(value));
        self
    }

    pub fn append_int32(mut self, value: i32) -> Self {
        self.fields.push(Value::Int32(value));
        self
    }

    pub fn append_text(mut self, value: &str) -> Self {
        self.fields.push(Value::Text(value.to_owned()));
        self
    }

    pub fn finish(self) -> Record {
        Record::new(self.fields)
    }
}
