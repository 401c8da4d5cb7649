//! Minimal SSE decoding for the streaming endpoint.
//!
//! The endpoint emits `data: {json}` lines separated by newlines. HTTP chunk
//! boundaries fall anywhere, including inside a multi-byte character, so the
//! decoder buffers raw bytes and only converts complete lines.

/// Incremental decoder from HTTP body chunks to SSE data payloads.
#[derive(Debug, Default)]
pub struct SseDecoder {
    buf: Vec<u8>,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one body chunk; returns the `data:` payloads of every line that
    /// became complete.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<String> {
        self.buf.extend_from_slice(chunk);

        let mut out = Vec::new();
        while let Some(pos) = self.buf.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.buf.drain(..=pos).collect();
            let line = String::from_utf8_lossy(&line);
            let line = line.trim_end_matches(['\r', '\n']);

            let Some(data) = line.strip_prefix("data:") else {
                // event:/comment/blank lines carry nothing we need
                continue;
            };
            let data = data.strip_prefix(' ').unwrap_or(data);
            if !data.is_empty() && data != "[DONE]" {
                out.push(data.to_string());
            }
        }
        out
    }
}
