/*!
 Contains logic to build and read `TLV8` data.

 A `TLV8` stream is a sequence of records, each made of a one byte tag, a one byte length,
 and up to 255 bytes of value. Values longer than 255 bytes are split into consecutive
 records that share the same tag; readers reassemble them with [`copy_data`].
*/

/// Initial capacity of a [`TlvBuffer`]; the buffer also grows in multiples of this size
pub const TLV_BUF_BLOCK: usize = 1024;
/// Longest value a single record can hold
pub const TLV_MAX_CHUNK: usize = 255;

/// An append-only buffer of `TLV8` records
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TlvBuffer {
    data: Vec<u8>,
}

impl Default for TlvBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl TlvBuffer {
    pub fn new() -> Self {
        Self {
            data: Vec::with_capacity(TLV_BUF_BLOCK),
        }
    }

    /// Number of bytes needed to store a value of `length` bytes, including record headers
    pub fn encoded_len(length: usize) -> usize {
        length + 2 * length.div_ceil(TLV_MAX_CHUNK)
    }

    /// Append `value` under `tag`, splitting it into 255 byte records as needed
    ///
    /// An empty value does not produce a record.
    pub fn append(&mut self, tag: u8, value: &[u8]) {
        let required = Self::encoded_len(value.len());
        if self.data.len() + required > self.data.capacity() {
            let grow = (required / TLV_BUF_BLOCK + 1) * TLV_BUF_BLOCK;
            self.data
                .reserve_exact(self.data.capacity() + grow - self.data.len());
        }

        for chunk in value.chunks(TLV_MAX_CHUNK) {
            self.data.push(tag);
            self.data.push(chunk.len() as u8);
            self.data.extend_from_slice(chunk);
        }
    }

    /// The encoded records
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.data.capacity()
    }

    /// Iterate over the records in this buffer
    pub fn records(&self) -> TlvRecords<'_> {
        records(&self.data)
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.data
    }
}

/// A single record read from `TLV8` data
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TlvRecord<'a> {
    pub tag: u8,
    pub value: &'a [u8],
}

/// Iterator over the records in some `TLV8` data
///
/// Iteration stops at the first record whose declared length runs past the end of the data.
#[derive(Debug, Clone)]
pub struct TlvRecords<'a> {
    data: &'a [u8],
    idx: usize,
}

impl<'a> Iterator for TlvRecords<'a> {
    type Item = TlvRecord<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let tag = *self.data.get(self.idx)?;
        let length = *self.data.get(self.idx + 1)? as usize;
        let start = self.idx + 2;
        match self.data.get(start..start + length) {
            Some(value) => {
                self.idx = start + length;
                Some(TlvRecord { tag, value })
            }
            None => {
                self.idx = self.data.len();
                None
            }
        }
    }
}

/// Iterate over the records in `data`
pub fn records(data: &[u8]) -> TlvRecords<'_> {
    TlvRecords { data, idx: 0 }
}

/// Get the value of the first record with a matching tag
///
/// Values that were split across several records are not recombined; use [`copy_data`] for that.
pub fn get_data(data: &[u8], tag: u8) -> Option<&[u8]> {
    if data.len() < 2 {
        return None;
    }
    records(data)
        .find(|record| record.tag == tag)
        .map(|record| record.value)
}

/// Read the first record with a matching tag as a little-endian unsigned integer
///
/// Only records of length 1, 2, 4, or 8 are integers.
pub fn get_uint(data: &[u8], tag: u8) -> Option<u64> {
    let value = get_data(data, tag)?;
    match value.len() {
        1 => Some(value[0] as u64),
        2 => Some(u16::from_le_bytes(value.try_into().ok()?) as u64),
        4 => Some(u32::from_le_bytes(value.try_into().ok()?) as u64),
        8 => Some(u64::from_le_bytes(value.try_into().ok()?)),
        _ => None,
    }
}

/// Read the first record with a matching tag as a single byte
pub fn get_uint8(data: &[u8], tag: u8) -> Option<u8> {
    match get_data(data, tag)? {
        [byte] => Some(*byte),
        _ => None,
    }
}

/// Concatenate the values of every record with a matching tag
///
/// Returns `None` if no record has the tag.
pub fn copy_data(data: &[u8], tag: u8) -> Option<Vec<u8>> {
    if data.len() < 2 {
        return None;
    }
    let mut matches = records(data).filter(|record| record.tag == tag).peekable();
    matches.peek()?;
    Some(matches.flat_map(|record| record.value).copied().collect())
}
