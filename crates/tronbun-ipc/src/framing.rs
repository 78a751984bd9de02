//! Newline framing for the helper's output stream.

/// Accumulates raw bytes and yields complete lines.
///
/// The trailing unterminated fragment stays buffered until its newline
/// arrives. Splitting happens on bytes, so a multi-byte character cut in half
/// by a read boundary is reassembled before decoding.
#[derive(Debug, Default)]
pub struct LineBuffer {
    buf: Vec<u8>,
}

impl LineBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a chunk and return every line it completed, without terminators.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.buf.extend_from_slice(chunk);

        let mut lines = Vec::new();
        let mut start = 0;
        while let Some(offset) = self.buf[start..].iter().position(|b| *b == b'\n') {
            let end = start + offset;
            let mut line = &self.buf[start..end];
            if let Some((b'\r', rest)) = line.split_last() {
                line = rest;
            }
            lines.push(String::from_utf8_lossy(line).into_owned());
            start = end + 1;
        }
        self.buf.drain(..start);
        lines
    }

    /// Bytes received since the last newline.
    pub fn remainder(&self) -> &[u8] {
        &self.buf
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }
}
