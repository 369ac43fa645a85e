//! Incremental decoding of streamed chat responses.
//!
//! Upstreams deliver their output in arbitrary read-sized chunks. A chunk may
//! end in the middle of a line, or in the middle of a UTF-8 sequence. The
//! decoder buffers at most one incomplete record and yields frames strictly
//! in arrival order, so the reconstructed text never depends on where the
//! chunk boundaries fell.

use serde::Deserialize;

/// Canned upstream filler that must never reach the conversation.
pub const DEFAULT_FILTERS: &[&str] = &[
    "I apologize, but I cannot provide a response to that query due to content guidelines. Please try rephrasing your question.",
];

/// One decoded unit of a response stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    /// A text fragment to append to the assistant message
    Text(String),
    /// Bot metadata (event-stream upstreams only)
    Metadata {
        bot_name: Option<String>,
        admin_name: Option<String>,
    },
    /// The upstream signalled completion
    Done,
}

/// Wire format of a response body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameFormat {
    /// Plain text, relayed verbatim
    RawText,
    /// Server-sent events: `data: {"type": ..., "chunk": ...}`
    EventStream,
    /// Newline-delimited JSON: `{"response": ..., "done": ...}`
    NdJson,
    /// One JSON document `{"response": ...}`
    Json,
}

impl FrameFormat {
    pub fn from_content_type(content_type: Option<&str>) -> Self {
        let ct = content_type.unwrap_or("").to_ascii_lowercase();
        if ct.contains("text/event-stream") {
            FrameFormat::EventStream
        } else if ct.contains("ndjson") {
            FrameFormat::NdJson
        } else if ct.contains("application/json") {
            FrameFormat::Json
        } else {
            FrameFormat::RawText
        }
    }
}

// ─── Line buffering ──────────────────────────────────────────

/// Splits a byte stream into complete `\n`-terminated lines and keeps the
/// trailing partial line for the next push.
///
/// Splitting happens on bytes, so a multi-byte character can never be cut
/// inside a complete line.
#[derive(Debug, Default)]
pub struct LineBuffer {
    pending: Vec<u8>,
}

impl LineBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a chunk and return every line it completed (without `\r\n`).
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.pending.extend_from_slice(chunk);

        let mut lines = Vec::new();
        let mut start = 0;
        while let Some(pos) = self.pending[start..].iter().position(|b| *b == b'\n') {
            let end = start + pos;
            lines.push(decode_line(&self.pending[start..end]));
            start = end + 1;
        }
        self.pending.drain(..start);
        lines
    }

    /// Flush the trailing partial line, if any.
    pub fn finish(&mut self) -> Option<String> {
        if self.pending.is_empty() {
            return None;
        }
        let line = decode_line(&self.pending);
        self.pending.clear();
        Some(line)
    }

    #[cfg(test)]
    pub fn has_partial(&self) -> bool {
        !self.pending.is_empty()
    }
}

fn decode_line(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes)
        .trim_end_matches('\r')
        .to_string()
}

// ─── UTF-8 carry-over ────────────────────────────────────────

/// Incremental UTF-8 decoding for raw text bodies: an incomplete sequence at
/// the end of a chunk is held back until the next chunk completes it.
#[derive(Debug, Default)]
struct Utf8Carry {
    tail: Vec<u8>,
}

impl Utf8Carry {
    fn push(&mut self, chunk: &[u8]) -> String {
        let mut buf = std::mem::take(&mut self.tail);
        buf.extend_from_slice(chunk);

        let mut out = String::new();
        let mut rest = &buf[..];
        loop {
            match std::str::from_utf8(rest) {
                Ok(s) => {
                    out.push_str(s);
                    break;
                }
                Err(e) => {
                    let valid = e.valid_up_to();
                    out.push_str(&String::from_utf8_lossy(&rest[..valid]));
                    match e.error_len() {
                        Some(len) => {
                            out.push(char::REPLACEMENT_CHARACTER);
                            rest = &rest[valid + len..];
                        }
                        None => {
                            self.tail = rest[valid..].to_vec();
                            break;
                        }
                    }
                }
            }
        }
        out
    }

    fn finish(&mut self) -> String {
        let tail = std::mem::take(&mut self.tail);
        String::from_utf8_lossy(&tail).into_owned()
    }
}

// ─── Decoder ─────────────────────────────────────────────────

#[derive(Deserialize)]
struct EventFrame {
    #[serde(rename = "type", default)]
    kind: String,
    #[serde(default)]
    chunk: Option<String>,
    #[serde(default)]
    bot_name: Option<String>,
    #[serde(default)]
    admin_name: Option<String>,
}

#[derive(Deserialize)]
struct NdJsonFrame {
    #[serde(default)]
    response: String,
    #[serde(default)]
    done: bool,
}

/// Turns response chunks into [`Frame`]s. One decoder per response; it is
/// not reusable once [`FrameDecoder::finish`] has been called.
#[derive(Debug)]
pub struct FrameDecoder {
    format: FrameFormat,
    lines: LineBuffer,
    utf8: Utf8Carry,
    body: Vec<u8>,
    filters: Vec<String>,
    done: bool,
}

impl FrameDecoder {
    pub fn new(format: FrameFormat) -> Self {
        Self {
            format,
            lines: LineBuffer::new(),
            utf8: Utf8Carry::default(),
            body: Vec::new(),
            filters: DEFAULT_FILTERS.iter().map(|f| f.to_string()).collect(),
            done: false,
        }
    }

    /// Replace the boilerplate filters applied to event-stream chunks.
    #[cfg(test)]
    pub fn with_filters(mut self, filters: Vec<String>) -> Self {
        self.filters = filters;
        self
    }

    pub fn format(&self) -> FrameFormat {
        self.format
    }

    /// True once a [`Frame::Done`] has been produced. Later input is ignored.
    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Feed one chunk, returning the frames it completed.
    pub fn decode(&mut self, chunk: &[u8]) -> Vec<Frame> {
        let mut frames = Vec::new();
        if self.done {
            return frames;
        }

        match self.format {
            FrameFormat::RawText => {
                let text = self.utf8.push(chunk);
                if !text.is_empty() {
                    frames.push(Frame::Text(text));
                }
            }
            FrameFormat::Json => self.body.extend_from_slice(chunk),
            FrameFormat::EventStream | FrameFormat::NdJson => {
                for line in self.lines.push(chunk) {
                    self.parse_line(&line, &mut frames);
                    if self.done {
                        break;
                    }
                }
            }
        }
        frames
    }

    /// Flush whatever is still buffered at end of stream.
    pub fn finish(&mut self) -> Vec<Frame> {
        let mut frames = Vec::new();
        if self.done {
            return frames;
        }

        match self.format {
            FrameFormat::RawText => {
                let text = self.utf8.finish();
                if !text.is_empty() {
                    frames.push(Frame::Text(text));
                }
            }
            FrameFormat::Json => {
                let body = std::mem::take(&mut self.body);
                self.parse_document(&body, &mut frames);
            }
            FrameFormat::EventStream | FrameFormat::NdJson => {
                if let Some(line) = self.lines.finish() {
                    self.parse_line(&line, &mut frames);
                }
            }
        }
        frames
    }

    fn parse_line(&mut self, line: &str, out: &mut Vec<Frame>) {
        match self.format {
            FrameFormat::EventStream => self.parse_event_line(line, out),
            FrameFormat::NdJson => self.parse_ndjson_line(line, out),
            FrameFormat::RawText | FrameFormat::Json => {}
        }
    }

    fn parse_event_line(&mut self, line: &str, out: &mut Vec<Frame>) {
        let Some(payload) = line.strip_prefix("data:") else {
            return;
        };
        let payload = payload.trim();
        if payload.is_empty() {
            return;
        }

        let frame: EventFrame = match serde_json::from_str(payload) {
            Ok(f) => f,
            Err(e) => {
                log::warn!("Stream parse error: {} in {:?}", e, line);
                return;
            }
        };

        match frame.kind.as_str() {
            "metadata" => out.push(Frame::Metadata {
                bot_name: frame.bot_name,
                admin_name: frame.admin_name,
            }),
            "response" => {
                let chunk = self.strip_boilerplate(frame.chunk.as_deref().unwrap_or(""));
                if !chunk.is_empty() {
                    out.push(Frame::Text(chunk));
                }
            }
            other => log::debug!("Ignoring stream frame of type {:?}", other),
        }
    }

    fn parse_ndjson_line(&mut self, line: &str, out: &mut Vec<Frame>) {
        let line = line.trim();
        if line.is_empty() {
            return;
        }

        match serde_json::from_str::<NdJsonFrame>(line) {
            Ok(frame) => {
                if !frame.response.is_empty() {
                    out.push(Frame::Text(frame.response));
                }
                if frame.done {
                    self.done = true;
                    out.push(Frame::Done);
                }
            }
            Err(e) => log::warn!("Failed to parse line {:?}: {}", line, e),
        }
    }

    fn parse_document(&mut self, body: &[u8], out: &mut Vec<Frame>) {
        if body.iter().all(u8::is_ascii_whitespace) {
            return;
        }
        match serde_json::from_slice::<serde_json::Value>(body) {
            Ok(doc) => {
                if let Some(text) = doc.get("response").and_then(|v| v.as_str()) {
                    if !text.is_empty() {
                        out.push(Frame::Text(text.to_string()));
                    }
                } else if let Some(err) = doc.get("error").and_then(|v| v.as_str()) {
                    log::warn!("Relay reported an error in a success body: {}", err);
                }
            }
            Err(e) => log::warn!("Failed to parse JSON reply: {}", e),
        }
    }

    fn strip_boilerplate(&self, chunk: &str) -> String {
        self.filters
            .iter()
            .fold(chunk.to_string(), |acc, f| acc.replace(f.as_str(), ""))
    }
}
