//! Line-buffered decoding of streamed completions.
//!
//! Upstreams send either SSE (`data: {...}` / `data: [DONE]`) or raw JSON
//! lines. Chunks may split a line, or a multi-byte character, anywhere; only
//! complete lines are decoded and the trailing fragment waits for the next
//! chunk.

use crate::types::{ByteStream, FrameStream, StreamFrame};
use crate::wire::stream_frames;
use futures::stream::{self, StreamExt};
use std::collections::VecDeque;
use std::time::Duration;

/// Accumulates bytes and yields complete lines.
#[derive(Debug, Default)]
pub struct LineBuffer {
    pending: Vec<u8>,
}

impl LineBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a chunk and drain every complete line, without the newline.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.pending.extend_from_slice(chunk);
        let mut lines = Vec::new();
        while let Some(pos) = self.pending.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.pending.drain(..=pos).collect();
            lines.push(String::from_utf8_lossy(&line[..pos]).into_owned());
        }
        lines
    }

    /// Whatever is left once the stream has closed.
    pub fn finish(&mut self) -> Option<String> {
        if self.pending.is_empty() {
            return None;
        }
        let rest = std::mem::take(&mut self.pending);
        Some(String::from_utf8_lossy(&rest).into_owned())
    }
}

/// Decode one line. Blank lines, SSE comments and non-data SSE fields yield nothing.
pub fn parse_stream_line(line: &str) -> Result<Vec<StreamFrame>, serde_json::Error> {
    let line = line.trim();
    if line.is_empty() || line.starts_with(':') {
        return Ok(Vec::new());
    }
    let payload = match line.strip_prefix("data:") {
        Some(rest) => rest.trim_start(),
        None if line.starts_with('{') => line,
        None => return Ok(Vec::new()),
    };
    if payload == "[DONE]" {
        return Ok(vec![StreamFrame::Done { finish_reason: None }]);
    }
    stream_frames(payload)
}

struct DecodeState {
    model: String,
    bytes: ByteStream,
    buffer: LineBuffer,
    pending: VecDeque<StreamFrame>,
    idle: Duration,
    saw_done: bool,
    finished: bool,
}

impl DecodeState {
    fn ingest(&mut self, line: &str) {
        if self.finished {
            return;
        }
        match parse_stream_line(line) {
            Ok(frames) => {
                for frame in frames {
                    let done = matches!(frame, StreamFrame::Done { .. });
                    self.pending.push_back(frame);
                    if done {
                        self.saw_done = true;
                        self.finished = true;
                        return;
                    }
                }
            }
            Err(e) => {
                tracing::debug!(model = %self.model, error = %e, "skipping malformed stream line");
            }
        }
    }

    /// Connection closed: decode the trailing line and close with `Done`
    /// if the upstream never sent one.
    fn close(&mut self) {
        if let Some(rest) = self.buffer.finish() {
            self.ingest(&rest);
        }
        if !self.saw_done {
            self.pending.push_back(StreamFrame::Done { finish_reason: None });
        }
        self.finished = true;
    }

    fn fail(&mut self, message: String) {
        tracing::warn!(model = %self.model, error = %message, "upstream stream failed");
        self.pending.push_back(StreamFrame::Error(message));
        self.finished = true;
    }
}

/// Turn an upstream byte stream into content/done frames.
///
/// Ends after the first `Done`. A clean close without one still yields
/// `Done`. A transport error, or no bytes for `idle`, yields `Error` and ends
/// the stream. Dropping the returned stream releases the upstream connection.
pub fn decode_stream(model: impl Into<String>, bytes: ByteStream, idle: Duration) -> FrameStream {
    let state = DecodeState {
        model: model.into(),
        bytes,
        buffer: LineBuffer::new(),
        pending: VecDeque::new(),
        idle,
        saw_done: false,
        finished: false,
    };
    stream::unfold(state, |mut st| async move {
        loop {
            if let Some(frame) = st.pending.pop_front() {
                return Some((frame, st));
            }
            if st.finished {
                return None;
            }
            match tokio::time::timeout(st.idle, st.bytes.next()).await {
                Ok(Some(Ok(chunk))) => {
                    for line in st.buffer.push(&chunk) {
                        st.ingest(&line);
                    }
                }
                Ok(Some(Err(e))) => st.fail(e.to_string()),
                Ok(None) => st.close(),
                Err(_) => {
                    let message = format!("no data from upstream for {}ms", st.idle.as_millis());
                    st.fail(message);
                }
            }
        }
    })
    .boxed()
}
