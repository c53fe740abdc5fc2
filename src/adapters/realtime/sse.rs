//! Incremental decoder for server-sent event frames.
//!
//! The streaming transport receives the body as arbitrary byte chunks. An
//! event may be split across chunks (or a multi-byte character may be), so
//! the decoder buffers until a blank line closes the event.
//!
//! ```text
//! event: receiveMessage
//! data: {"id":"m1", ...}
//!
//! : keep-alive comment
//!
//! ```
//!
//! An event without an `event:` line is read as a full
//! `{"event": ..., "data": ...}` envelope in its data.

use crate::ports::{TransportError, TransportFrame};

/// Largest incomplete event held before the buffer is discarded.
pub const MAX_PENDING_BYTES: usize = 1024 * 1024;

/// Buffers bytes and yields complete frames.
#[derive(Debug)]
pub struct SseDecoder {
    buffer: Vec<u8>,
    /// Prefix of `buffer` already known to hold no blank line.
    scanned: usize,
    max_pending: usize,
}

impl Default for SseDecoder {
    fn default() -> Self {
        Self::with_max_pending(MAX_PENDING_BYTES)
    }
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_pending(max_pending: usize) -> Self {
        Self {
            buffer: Vec::new(),
            scanned: 0,
            max_pending,
        }
    }

    /// Feeds a chunk and returns every frame it completed.
    ///
    /// An event still incomplete after `max_pending` bytes is dropped with a
    /// decode error and decoding restarts on the next chunk.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<Result<TransportFrame, TransportError>> {
        self.buffer.extend(chunk.iter().copied().filter(|b| *b != b'\r'));

        let mut frames = Vec::new();
        while let Some(end) = self.next_blank_line() {
            let block: Vec<u8> = self.buffer.drain(..end + 2).collect();
            self.scanned = 0;
            let text = String::from_utf8_lossy(&block[..end]);
            if let Some(frame) = parse_block(&text) {
                frames.push(frame);
            }
        }
        self.scanned = self.buffer.len();

        if self.buffer.len() > self.max_pending {
            let dropped = self.buffer.len();
            self.buffer.clear();
            self.scanned = 0;
            frames.push(Err(TransportError::decode(format!(
                "event exceeds {} bytes ({} pending), discarded",
                self.max_pending, dropped
            ))));
        }
        frames
    }

    /// Bytes received but not yet forming a complete event.
    pub fn pending(&self) -> usize {
        self.buffer.len()
    }

    fn next_blank_line(&self) -> Option<usize> {
        // Step back one byte so a "\n\n" split across chunks is found.
        let from = self.scanned.saturating_sub(1);
        self.buffer[from..]
            .windows(2)
            .position(|w| w == b"\n\n")
            .map(|offset| from + offset)
    }
}

fn parse_block(block: &str) -> Option<Result<TransportFrame, TransportError>> {
    let mut event: Option<String> = None;
    let mut data_lines: Vec<&str> = Vec::new();

    for line in block.lines() {
        if line.starts_with(':') {
            continue;
        }
        let (field, value) = match line.split_once(':') {
            Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
            None => (line, ""),
        };
        match field {
            "event" => event = Some(value.to_string()),
            "data" => data_lines.push(value),
            _ => {}
        }
    }

    if event.is_none() && data_lines.is_empty() {
        return None;
    }

    let data = data_lines.join("\n");
    let parsed = match event {
        Some(event) => {
            let value = if data.trim().is_empty() {
                Ok(serde_json::Value::Null)
            } else {
                serde_json::from_str(&data)
            };
            value.map(|data| TransportFrame::new(event, data))
        }
        None => serde_json::from_str::<TransportFrame>(&data),
    };

    Some(parsed.map_err(|e| TransportError::decode(format!("invalid event data: {}", e))))
}
