//! Table data file format for TallyDB
//!
//! Layout (all integers little-endian):
//!
//! ```text
//! magic "TDB1" | u32 column count | u64 row count | rows...
//! value := u8 tag, then i64 (Integer) | u32 len + UTF-8 (Text) | u8 (Boolean)
//! ```
//!
//! Values are written in schema column order. Decoding checks the column count
//! and every value's tag against the schema.

use super::heap::RowHeap;
use super::tuple::{Row, Value};
use crate::catalog::{DataType, TableSchema};
use crate::error::{Error, Result};
use byteorder::{LittleEndian, ReadBytesExt};
use bytes::{BufMut, Bytes, BytesMut};
use std::io::Read;
use std::path::{Path, PathBuf};

const MAGIC: &[u8; 4] = b"TDB1";

/// Encode every row of a table
pub fn encode_table(schema: &TableSchema, heap: &RowHeap) -> Bytes {
    let mut buf = BytesMut::with_capacity(16 + heap.len() * schema.column_count() * 9);
    buf.put_slice(MAGIC);
    buf.put_u32_le(schema.column_count() as u32);
    buf.put_u64_le(heap.len() as u64);

    for row in heap.rows() {
        for value in row {
            encode_value(&mut buf, value);
        }
    }

    buf.freeze()
}

fn encode_value(buf: &mut BytesMut, value: &Value) {
    buf.put_u8(value.data_type().tag());
    match value {
        Value::Integer(i) => buf.put_i64_le(*i),
        Value::Text(s) => {
            buf.put_u32_le(s.len() as u32);
            buf.put_slice(s.as_bytes());
        }
        Value::Boolean(b) => buf.put_u8(u8::from(*b)),
    }
}

/// Decode a table file written by [`encode_table`]
pub fn decode_table(schema: &TableSchema, path: &Path, data: &[u8]) -> Result<Vec<Row>> {
    let mut decoder = Decoder {
        path: path.to_path_buf(),
        reader: data,
    };

    let mut magic = [0u8; 4];
    decoder
        .reader
        .read_exact(&mut magic)
        .map_err(|_| decoder.corrupted("missing file header"))?;
    if &magic != MAGIC {
        return Err(decoder.corrupted("bad magic number"));
    }

    let column_count = decoder.read(|r| r.read_u32::<LittleEndian>())? as usize;
    if column_count != schema.column_count() {
        return Err(decoder.corrupted(format!(
            "file has {} column(s), schema of '{}' has {}",
            column_count,
            schema.name(),
            schema.column_count()
        )));
    }

    let row_count = decoder.read(|r| r.read_u64::<LittleEndian>())?;
    let mut rows = Vec::with_capacity(row_count.min(4096) as usize);
    for _ in 0..row_count {
        let mut values = Vec::with_capacity(column_count);
        for column in schema.columns() {
            values.push(decoder.read_value(&column.name, column.data_type)?);
        }
        rows.push(Row::new(values));
    }

    if !decoder.reader.is_empty() {
        return Err(decoder.corrupted(format!(
            "{} trailing byte(s) after last row",
            decoder.reader.len()
        )));
    }

    Ok(rows)
}

struct Decoder<'a> {
    path: PathBuf,
    reader: &'a [u8],
}

impl<'a> Decoder<'a> {
    fn corrupted(&self, reason: impl Into<String>) -> Error {
        Error::Corrupted {
            path: self.path.clone(),
            reason: reason.into(),
        }
    }

    fn read<T>(&mut self, f: impl FnOnce(&mut &'a [u8]) -> std::io::Result<T>) -> Result<T> {
        f(&mut self.reader).map_err(|_| self.corrupted("unexpected end of file"))
    }

    fn read_value(&mut self, column: &str, expected: DataType) -> Result<Value> {
        let tag = self.read(|r| r.read_u8())?;
        if tag != expected.tag() {
            return Err(self.corrupted(format!(
                "column '{}' expects {} but file has type tag {}",
                column, expected, tag
            )));
        }

        let value = match expected {
            DataType::Integer => Value::Integer(self.read(|r| r.read_i64::<LittleEndian>())?),
            DataType::Text => {
                let len = self.read(|r| r.read_u32::<LittleEndian>())? as usize;
                if len > self.reader.len() {
                    return Err(self.corrupted("text value runs past end of file"));
                }
                let (bytes, rest) = self.reader.split_at(len);
                self.reader = rest;
                let text = String::from_utf8(bytes.to_vec())
                    .map_err(|_| self.corrupted(format!("invalid UTF-8 in column '{}'", column)))?;
                Value::Text(text)
            }
            DataType::Boolean => match self.read(|r| r.read_u8())? {
                0 => Value::Boolean(false),
                1 => Value::Boolean(true),
                other => {
                    return Err(
                        self.corrupted(format!("invalid boolean byte {} in '{}'", other, column))
                    )
                }
            },
        };
        Ok(value)
    }
}
