//! Streaming response assembler.
//!
//! Turns the chunked body of a chat completion into text fragments.
//! The body is newline-delimited JSON; every line is one of
//!
//! - `{"chunk": "..."}`: an incremental fragment
//! - `{"success": true, "data": {"response" | "content": "..."}}`: a complete reply
//! - `{"error": ...}`: a failure reported by the service
//!
//! Lines are parsed per decoded chunk. Text after the last newline of a
//! chunk is tried as-is and dropped if it does not parse; it is not
//! carried into the next chunk, so a frame split across two chunks is lost.

use futures::{Stream, StreamExt};
use serde::Deserialize;
use serde_json::Value;

use assistant_types::{AssistantError, Result, error::describe_error_payload};

/// Returned when a stream ends without a single fragment
pub const FALLBACK_GREETING: &str = "我是AI财经助手，很高兴为您服务。请问有什么可以帮助您的？";

// ─── UTF-8 decoding ──────────────────────────────────────────

/// Incremental UTF-8 decoder.
///
/// Holds back an incomplete multi-byte sequence at the end of a chunk until
/// the rest arrives. Invalid sequences decode to U+FFFD.
#[derive(Debug, Default)]
pub struct Utf8StreamDecoder {
    pending: Vec<u8>,
}

impl Utf8StreamDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn decode(&mut self, chunk: &[u8]) -> String {
        let mut buf = std::mem::take(&mut self.pending);
        buf.extend_from_slice(chunk);

        let mut out = String::with_capacity(buf.len());
        let mut rest = buf.as_slice();
        loop {
            match std::str::from_utf8(rest) {
                Ok(text) => {
                    out.push_str(text);
                    break;
                }
                Err(e) => {
                    let (valid, after) = rest.split_at(e.valid_up_to());
                    out.push_str(&String::from_utf8_lossy(valid));
                    match e.error_len() {
                        Some(len) => {
                            out.push(char::REPLACEMENT_CHARACTER);
                            rest = &after[len..];
                        }
                        None => {
                            self.pending = after.to_vec();
                            break;
                        }
                    }
                }
            }
        }
        out
    }

    /// Bytes still waiting for the rest of their character
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }
}

// ─── Frames ──────────────────────────────────────────────────

/// A recognised line of the response body
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamFrame {
    /// Incremental fragment
    Delta(String),
    /// Whole reply delivered in one record
    Complete(String),
    /// Failure reported by the service
    Failure(String),
    /// Well-formed but carries no text (e.g. the trailing bookkeeping record)
    Ignored,
}

impl StreamFrame {
    pub fn fragment(&self) -> Option<&str> {
        match self {
            StreamFrame::Delta(text) | StreamFrame::Complete(text) => Some(text),
            _ => None,
        }
    }
}

#[derive(Deserialize)]
struct RawFrame {
    #[serde(default)]
    chunk: Option<Value>,
    #[serde(default)]
    success: Option<bool>,
    #[serde(default)]
    data: Option<Value>,
    #[serde(default)]
    error: Option<Value>,
}

/// Parse one line. `None` means the line is not a JSON object.
pub fn parse_frame(line: &str) -> Option<StreamFrame> {
    let raw: RawFrame = serde_json::from_str(line).ok()?;

    if let Some(text) = raw.chunk.as_ref().and_then(Value::as_str) {
        if !text.is_empty() {
            return Some(StreamFrame::Delta(text.to_string()));
        }
    }

    if raw.success == Some(true) {
        let text = raw.data.as_ref().and_then(|data| {
            ["response", "content"]
                .iter()
                .filter_map(|key| data.get(*key).and_then(Value::as_str))
                .find(|text| !text.is_empty())
        });
        return Some(match text {
            Some(text) => StreamFrame::Complete(text.to_string()),
            None => StreamFrame::Ignored,
        });
    }

    if let Some(error) = raw.error.as_ref().filter(|e| !e.is_null()) {
        return Some(StreamFrame::Failure(describe_error_payload(error)));
    }

    Some(StreamFrame::Ignored)
}

// ─── Assembler ───────────────────────────────────────────────

/// Accumulates fragments out of raw body chunks.
#[derive(Debug, Default)]
pub struct StreamAssembler {
    decoder: Utf8StreamDecoder,
    accumulated: String,
    fragments: usize,
}

impl StreamAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one body chunk, forwarding every extracted fragment to `on_delta`.
    pub fn feed<F>(&mut self, chunk: &[u8], on_delta: &mut F) -> Result<()>
    where
        F: FnMut(&str),
    {
        let text = self.decoder.decode(chunk);
        for line in text.split('\n') {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            match parse_frame(line) {
                Some(StreamFrame::Failure(message)) => {
                    return Err(AssistantError::Service(message));
                }
                Some(frame) => {
                    if let Some(fragment) = frame.fragment() {
                        self.accumulated.push_str(fragment);
                        self.fragments += 1;
                        on_delta(fragment);
                    }
                }
                None => log::debug!("Dropping unparseable stream frame ({} bytes)", line.len()),
            }
        }
        Ok(())
    }

    /// Text received so far
    pub fn accumulated(&self) -> &str {
        &self.accumulated
    }

    pub fn fragment_count(&self) -> usize {
        self.fragments
    }

    /// Final reply, or [`FALLBACK_GREETING`] if nothing arrived.
    pub fn finish(self) -> String {
        if self.decoder.pending_len() > 0 {
            log::debug!(
                "Stream ended inside a character, {} bytes dropped",
                self.decoder.pending_len()
            );
        }
        if self.accumulated.is_empty() {
            log::info!("Stream carried no text, using fallback greeting");
            return FALLBACK_GREETING.to_string();
        }
        self.accumulated
    }
}

/// Drain `source` to completion.
///
/// Each fragment is passed to `on_delta` as soon as it is decoded. Returns
/// the concatenation of all fragments. An error from `source` is returned
/// as-is and the partial text is discarded.
pub async fn assemble<S, F>(mut source: S, mut on_delta: F) -> Result<String>
where
    S: Stream<Item = Result<Vec<u8>>> + Unpin,
    F: FnMut(&str),
{
    let mut assembler = StreamAssembler::new();
    while let Some(chunk) = source.next().await {
        let chunk = chunk?;
        assembler.feed(&chunk, &mut on_delta)?;
    }
    Ok(assembler.finish())
}
