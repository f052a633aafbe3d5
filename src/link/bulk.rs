//! Chunking for the bulk-data sub-protocol
//!
//! A bulk payload travels as a BulkSetup message announcing the total length,
//! followed by one BulkData message per 16-byte chunk. Each chunk frame is
//! `[size:1][offset:2 LE][data...]`, kept small enough that the full wire
//! packet (kind byte included) fits the 20-byte notification MTU. The chunk
//! arithmetic lives here as a plain iterator so it can be checked without a
//! transport.

use bytes::{BufMut, Bytes, BytesMut};

use crate::core::{BULK_CHUNK_SIZE, MAX_BULK_PAYLOAD, Error, Result};

/// One bounded-size fragment of a bulk payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BulkChunk<'a> {
    /// Byte offset of this chunk within the whole payload
    pub offset: u16,
    /// The chunk's payload bytes (at most [`BULK_CHUNK_SIZE`])
    pub data: &'a [u8],
}

impl BulkChunk<'_> {
    /// Number of payload bytes in this chunk
    pub fn size(&self) -> u8 {
        self.data.len() as u8
    }

    /// Builds the BulkData message payload: `[size:1][offset:2 LE][data...]`
    pub fn frame(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(3 + self.data.len());
        buf.put_u8(self.size());
        buf.put_u16_le(self.offset);
        buf.extend_from_slice(self.data);
        buf.freeze()
    }
}

/// Splits a payload into sequential MTU-sized chunks
///
/// Offsets increase strictly by each chunk's size; the final offset plus the
/// final chunk size equals the total length.
pub struct BulkChunks<'a> {
    data: &'a [u8],
    offset: usize,
}

impl<'a> BulkChunks<'a> {
    /// Validates the payload and prepares the chunk sequence
    ///
    /// Empty payloads and payloads beyond the u16 offset domain are rejected
    /// before any I/O happens.
    pub fn new(data: &'a [u8]) -> Result<Self> {
        if data.is_empty() {
            return Err(Error::precondition("bulk payload is empty"));
        }
        if data.len() > MAX_BULK_PAYLOAD {
            return Err(Error::precondition(format!(
                "bulk payload of {} bytes exceeds the {} byte transfer limit",
                data.len(),
                MAX_BULK_PAYLOAD
            )));
        }
        Ok(BulkChunks { data, offset: 0 })
    }

    /// Total payload length, as announced in the BulkSetup message
    pub fn total_len(&self) -> u16 {
        self.data.len() as u16
    }
}

impl<'a> Iterator for BulkChunks<'a> {
    type Item = BulkChunk<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let remaining = self.data.len() - self.offset;
        if remaining == 0 {
            return None;
        }
        let size = remaining.min(BULK_CHUNK_SIZE);
        let chunk = BulkChunk {
            offset: self.offset as u16,
            data: &self.data[self.offset..self.offset + size],
        };
        self.offset += size;
        Some(chunk)
    }
}
