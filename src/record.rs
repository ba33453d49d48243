//! Record batch inner codec (spec §3, §4.6): the self-delimited varint-length record format
//! embedded in produce/fetch bodies.
//!
//! Grounded on `original_source/record.go`'s `Record.encode`/`decode`, including the
//! varint-signed header count where a negative value means "no headers allocated" (distinct
//! from zero, which means "headers were allocated but there are none").

use crate::cursor::{varint_size, ReadCursor, WriteCursor};
use crate::decode::DecodeResult;
use crate::encode::EncodeResult;
use crate::macros::cast_length;
use crate::shapes;
use crate::traits::corrupt_frame_err;

const NAME: &str = "Record";

/// One `(key, value)` pair riding along on a [`Record`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordHeader {
    pub key: Option<Vec<u8>>,
    pub value: Option<Vec<u8>>,
}

fn varint_bytes_size(value: Option<&[u8]>) -> usize {
    match value {
        None => varint_size(-1),
        Some(b) => varint_size(b.len() as i64) + b.len(),
    }
}

/// One record inside a [`RecordBatch`]: attributes, delta-coded timestamp and offset, a
/// varint-length key and value, and an optional varint-length header list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub attributes: i8,
    pub timestamp_delta: i64,
    pub offset_delta: i64,
    pub key: Option<Vec<u8>>,
    pub value: Option<Vec<u8>>,
    /// `None` means "no headers allocated" (the wire's negative header count); `Some(vec![])`
    /// means a header list was present but empty.
    pub headers: Option<Vec<RecordHeader>>,
}

impl Record {
    /// The size of the record's body, i.e. everything *after* the leading varint length
    /// field. This is what gets written as that length.
    fn body_size(&self) -> usize {
        let mut size = 1 // attributes
            + varint_size(self.timestamp_delta)
            + varint_size(self.offset_delta)
            + varint_bytes_size(self.key.as_deref())
            + varint_bytes_size(self.value.as_deref());
        size += match &self.headers {
            None => varint_size(-1),
            Some(headers) => {
                varint_size(headers.len() as i64)
                    + headers
                        .iter()
                        .map(|h| varint_bytes_size(h.key.as_deref()) + varint_bytes_size(h.value.as_deref()))
                        .sum::<usize>()
            }
        };
        size
    }

    /// Total size including the leading varint length field.
    pub fn size(&self) -> usize {
        let body_size = self.body_size();
        varint_size(body_size as i64) + body_size
    }

    pub fn encode(&self, dst: &mut WriteCursor<'_>) -> EncodeResult<()> {
        let body_size = self.body_size();
        dst.write_varint(body_size as i64)?;
        let start = dst.pos();

        dst.write_i8(self.attributes)?;
        dst.write_varint(self.timestamp_delta)?;
        dst.write_varint(self.offset_delta)?;
        shapes::write_varint_bytes(dst, self.key.as_deref())?;
        shapes::write_varint_bytes(dst, self.value.as_deref())?;
        match &self.headers {
            None => {
                dst.write_varint(-1)?;
            }
            Some(headers) => {
                let count: i64 = cast_length!(NAME, "header count", headers.len())?;
                dst.write_varint(count)?;
                for header in headers {
                    shapes::write_varint_bytes(dst, header.key.as_deref())?;
                    shapes::write_varint_bytes(dst, header.value.as_deref())?;
                }
            }
        }

        debug_assert_eq!(dst.pos() - start, body_size, "record sizing/writing mismatch");
        Ok(())
    }

    pub fn decode(src: &mut ReadCursor<'_>) -> DecodeResult<Self> {
        let declared_len = src.read_varint()?;
        if declared_len < 0 {
            return Err(corrupt_frame_err(NAME, "negative record length"));
        }
        let start = src.pos();

        let attributes = src.read_i8()?;
        let timestamp_delta = src.read_varint()?;
        let offset_delta = src.read_varint()?;
        let key = shapes::read_varint_bytes(src)?;
        let value = shapes::read_varint_bytes(src)?;

        let header_count = src.read_varint()?;
        let headers = if header_count < 0 {
            None
        } else {
            let mut headers = Vec::with_capacity((header_count as usize).min(4096));
            for _ in 0..header_count {
                let key = shapes::read_varint_bytes(src)?;
                let value = shapes::read_varint_bytes(src)?;
                headers.push(RecordHeader { key, value });
            }
            Some(headers)
        };

        let consumed = (src.pos() - start) as i64;
        if consumed != declared_len {
            return Err(corrupt_frame_err(NAME, "declared length does not match bytes consumed"));
        }

        Ok(Self {
            attributes,
            timestamp_delta,
            offset_delta,
            key,
            value,
            headers,
        })
    }
}

/// A self-delimited sequence of [`Record`]s: a varint count followed by that many records.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RecordBatch {
    pub records: Vec<Record>,
}

impl RecordBatch {
    pub fn size(&self) -> usize {
        varint_size(self.records.len() as i64) + self.records.iter().map(Record::size).sum::<usize>()
    }

    pub fn encode(&self, dst: &mut WriteCursor<'_>) -> EncodeResult<()> {
        let count: i64 = cast_length!("RecordBatch", "record count", self.records.len())?;
        dst.write_varint(count)?;
        for record in &self.records {
            record.encode(dst)?;
        }
        Ok(())
    }

    pub fn decode(src: &mut ReadCursor<'_>) -> DecodeResult<Self> {
        let count = src.read_varint()?;
        if count < 0 {
            return Err(corrupt_frame_err("RecordBatch", "negative record count"));
        }
        let mut records = Vec::with_capacity((count as usize).min(4096));
        for _ in 0..count {
            records.push(Record::decode(src)?);
        }
        Ok(Self { records })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_with_one_header_round_trips_and_length_matches() {
        let record = Record {
            attributes: 0,
            timestamp_delta: 5,
            offset_delta: 0,
            key: Some(b"k".to_vec()),
            value: Some(b"v".to_vec()),
            headers: Some(vec![RecordHeader {
                key: Some(b"h1".to_vec()),
                value: Some(b"v1".to_vec()),
            }]),
        };

        let mut buf = vec![0u8; record.size()];
        record.encode(&mut WriteCursor::new(&mut buf)).unwrap();

        let mut src = ReadCursor::new(&buf);
        let declared_len = src.read_varint().unwrap();
        let start = src.pos();
        let decoded = Record::decode(&mut ReadCursor::new(&buf)).unwrap();
        assert_eq!(decoded, record);
        assert_eq!((buf.len() - start) as i64, declared_len);
    }

    #[test]
    fn no_headers_allocated_round_trips_as_none() {
        let record = Record {
            attributes: 0,
            timestamp_delta: 0,
            offset_delta: 0,
            key: None,
            value: None,
            headers: None,
        };
        let mut buf = vec![0u8; record.size()];
        record.encode(&mut WriteCursor::new(&mut buf)).unwrap();
        let decoded = Record::decode(&mut ReadCursor::new(&buf)).unwrap();
        assert_eq!(decoded.headers, None);
    }

    #[test]
    fn empty_but_allocated_headers_round_trip_distinctly_from_none() {
        let record = Record {
            attributes: 0,
            timestamp_delta: 0,
            offset_delta: 0,
            key: None,
            value: None,
            headers: Some(Vec::new()),
        };
        let mut buf = vec![0u8; record.size()];
        record.encode(&mut WriteCursor::new(&mut buf)).unwrap();
        let decoded = Record::decode(&mut ReadCursor::new(&buf)).unwrap();
        assert_eq!(decoded.headers, Some(Vec::new()));
    }

    #[test]
    fn batch_round_trips() {
        let batch = RecordBatch {
            records: vec![
                Record {
                    attributes: 0,
                    timestamp_delta: 0,
                    offset_delta: 0,
                    key: None,
                    value: Some(b"a".to_vec()),
                    headers: None,
                },
                Record {
                    attributes: 0,
                    timestamp_delta: 1,
                    offset_delta: 1,
                    key: Some(b"k".to_vec()),
                    value: Some(b"b".to_vec()),
                    headers: None,
                },
            ],
        };
        let mut buf = vec![0u8; batch.size()];
        batch.encode(&mut WriteCursor::new(&mut buf)).unwrap();
        let decoded = RecordBatch::decode(&mut ReadCursor::new(&buf)).unwrap();
        assert_eq!(decoded, batch);
    }
}
