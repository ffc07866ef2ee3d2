//! HTTP Client Factory
//!
//! Provides a factory function for building reqwest clients shared by the
//! provider implementations, plus the byte-level line splitter their SSE
//! loops feed chunks through.

use std::time::Duration;

/// Build a `reqwest::Client` for provider traffic.
///
/// Connect timeout is bounded; no overall request timeout is set because
/// streaming responses stay open for the duration of the completion.
pub fn build_http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .connect_timeout(Duration::from_secs(10))
        .build()
        .expect("failed to build reqwest client")
}

/// Accumulates raw stream bytes and yields complete lines.
///
/// Splits on byte boundaries before decoding, so a multi-byte UTF-8
/// character straddling two network chunks is reassembled rather than
/// replaced during decode. Trailing `\r` is stripped (SSE uses CRLF or LF).
#[derive(Default)]
pub struct LineBuffer {
    buf: Vec<u8>,
}

impl LineBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a chunk, returning every complete line it closes.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.buf.extend_from_slice(chunk);

        let mut lines = Vec::new();
        while let Some(pos) = self.buf.iter().position(|&b| b == b'\n') {
            let rest = self.buf.split_off(pos + 1);
            let mut line = std::mem::replace(&mut self.buf, rest);
            line.pop();
            if line.last() == Some(&b'\r') {
                line.pop();
            }
            lines.push(String::from_utf8_lossy(&line).into_owned());
        }
        lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_http_client() {
        let _client = build_http_client();
    }

    #[test]
    fn test_line_buffer_holds_partial_lines() {
        let mut buffer = LineBuffer::new();
        assert!(buffer.push(b"data: {\"par").is_empty());
        assert_eq!(buffer.push(b"tial\"}\n"), vec!["data: {\"partial\"}"]);
    }

    #[test]
    fn test_line_buffer_multiple_lines_per_chunk() {
        let mut buffer = LineBuffer::new();
        assert_eq!(
            buffer.push(b"data: one\r\n\r\ndata: two\n"),
            vec!["data: one", "", "data: two"]
        );
    }

    #[test]
    fn test_multibyte_char_split_across_chunks_survives() {
        // "héllo" with the two-byte é split between chunks
        let bytes = "data: héllo\n".as_bytes();
        let mut buffer = LineBuffer::new();
        assert!(buffer.push(&bytes[..8]).is_empty());
        assert_eq!(buffer.push(&bytes[8..]), vec!["data: héllo"]);
    }
}
