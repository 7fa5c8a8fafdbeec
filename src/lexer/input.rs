//! Source accessors.
//!
//! A parse reads its input once, front to back, into a contiguous shared
//! buffer. Hosts that keep text in ropes or piece tables implement
//! [`TextInput`] instead of materialising a string themselves.

use crate::base::Point;

/// Largest input a tree can address; end of input needs one more offset.
pub(crate) const MAX_SOURCE_LEN: usize = u32::MAX as usize - 1;

/// Chunked source accessor
pub trait TextInput {
    /// Bytes starting at `offset` (whose position is `point`). An empty
    /// slice ends the input. Reads are sequential, so accessors may ignore
    /// both arguments.
    fn read(&mut self, offset: usize, point: Point) -> &[u8];
}

impl TextInput for &[u8] {
    fn read(&mut self, offset: usize, _point: Point) -> &[u8] {
        self.get(offset..).unwrap_or(&[])
    }
}

/// Adapts an iterator of chunks into a [`TextInput`]
///
/// Empty chunks are skipped; the input ends when the iterator does.
#[derive(Debug)]
pub struct ChunkedInput<I> {
    chunks: I,
    current: Vec<u8>,
}

impl<I> ChunkedInput<I> {
    pub fn new(chunks: I) -> Self {
        Self {
            chunks,
            current: Vec::new(),
        }
    }
}

impl<I, B> TextInput for ChunkedInput<I>
where
    I: Iterator<Item = B>,
    B: AsRef<[u8]>,
{
    fn read(&mut self, _offset: usize, _point: Point) -> &[u8] {
        self.current.clear();
        for chunk in self.chunks.by_ref() {
            if !chunk.as_ref().is_empty() {
                self.current.extend_from_slice(chunk.as_ref());
                break;
            }
        }
        &self.current
    }
}

/// Drain `input` into one buffer of at most `limit` bytes. The flag is set
/// when input was left over.
pub(crate) fn read_all(input: &mut dyn TextInput, limit: usize) -> (Vec<u8>, bool) {
    let mut buffer = Vec::new();
    let mut point = Point::default();
    loop {
        let chunk = input.read(buffer.len(), point);
        if chunk.is_empty() {
            return (buffer, false);
        }
        let room = limit - buffer.len();
        if chunk.len() > room {
            buffer.extend_from_slice(&chunk[..room]);
            tracing::warn!("[PARSE] input truncated at {} bytes", limit);
            return (buffer, true);
        }
        point = point.advance(chunk);
        buffer.extend_from_slice(chunk);
    }
}
