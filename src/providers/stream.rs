/*!
 * Turning a streamed HTTP body into text fragments.
 *
 * Both supported wire formats are line framed (Server-Sent Events and JSON
 * lines). `LineBuffer` cuts the raw byte chunks into complete lines, which
 * keeps multi-byte characters intact when a chunk boundary falls inside one,
 * and a `LineProtocol` turns each line into fragments.
 */

use bytes::Bytes;
use futures::stream::{self, BoxStream, StreamExt};
use std::collections::VecDeque;

use crate::errors::ProviderError;
use crate::providers::FragmentStream;

/// Raw response body chunks
pub type ByteStream = BoxStream<'static, Result<Bytes, ProviderError>>;

/// What a protocol extracted from one line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decoded {
    /// A piece of generated text
    Fragment(String),
    /// The backend signalled the end of the completion
    Done,
}

/// A line-oriented wire protocol
pub trait LineProtocol: Send + 'static {
    /// Handle one complete line, without its terminator
    fn on_line(&mut self, line: &str) -> Result<Vec<Decoded>, ProviderError>;

    /// Handle the end of the body. Called only if `Done` was never produced.
    fn on_end(&mut self) -> Result<Vec<Decoded>, ProviderError>;
}

/// Accumulates bytes and releases complete lines
#[derive(Debug, Default)]
pub struct LineBuffer {
    pending: Vec<u8>,
}

impl LineBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a chunk and return every line completed by it
    pub fn push(&mut self, chunk: &[u8]) -> Result<Vec<String>, ProviderError> {
        self.pending.extend_from_slice(chunk);

        let mut lines = Vec::new();
        while let Some(pos) = self.pending.iter().position(|b| *b == b'\n') {
            let mut line: Vec<u8> = self.pending.drain(..=pos).collect();
            line.pop();
            if line.last() == Some(&b'\r') {
                line.pop();
            }
            lines.push(Self::decode(line)?);
        }
        Ok(lines)
    }

    /// Return the unterminated tail, if any
    pub fn finish(&mut self) -> Result<Option<String>, ProviderError> {
        if self.pending.is_empty() {
            return Ok(None);
        }
        let mut tail = std::mem::take(&mut self.pending);
        if tail.last() == Some(&b'\r') {
            tail.pop();
        }
        Self::decode(tail).map(Some)
    }

    fn decode(bytes: Vec<u8>) -> Result<String, ProviderError> {
        String::from_utf8(bytes)
            .map_err(|e| ProviderError::ParseError(format!("Stream is not valid UTF-8: {}", e)))
    }
}

struct DecodeState<P> {
    body: ByteStream,
    lines: LineBuffer,
    protocol: P,
    queue: VecDeque<Result<String, ProviderError>>,
    finished: bool,
}

impl<P: LineProtocol> DecodeState<P> {
    // Queue fragments until `Done` or the first error; both end the stream.
    fn absorb(&mut self, decoded: Result<Vec<Decoded>, ProviderError>) {
        match decoded {
            Ok(items) => {
                for item in items {
                    match item {
                        Decoded::Fragment(text) => self.queue.push_back(Ok(text)),
                        Decoded::Done => {
                            self.finished = true;
                            return;
                        }
                    }
                }
            }
            Err(e) => {
                self.queue.push_back(Err(e));
                self.finished = true;
            }
        }
    }

    fn absorb_lines(&mut self, lines: Result<Vec<String>, ProviderError>) {
        match lines {
            Ok(lines) => {
                for line in lines {
                    if self.finished {
                        return;
                    }
                    let decoded = self.protocol.on_line(&line);
                    self.absorb(decoded);
                }
            }
            Err(e) => {
                self.queue.push_back(Err(e));
                self.finished = true;
            }
        }
    }

    fn absorb_end(&mut self) {
        match self.lines.finish() {
            Ok(Some(tail)) => self.absorb_lines(Ok(vec![tail])),
            Ok(None) => {}
            Err(e) => self.absorb_lines(Err(e)),
        }
        if !self.finished {
            let decoded = self.protocol.on_end();
            self.absorb(decoded);
            self.finished = true;
        }
    }
}

/// Decode a streamed body into fragments using the given protocol.
///
/// The stream ends after the protocol reports `Done`, or right after the
/// first error item.
pub fn decode_fragments<P: LineProtocol>(body: ByteStream, protocol: P) -> FragmentStream {
    let state = DecodeState {
        body,
        lines: LineBuffer::new(),
        protocol,
        queue: VecDeque::new(),
        finished: false,
    };

    stream::unfold(state, |mut state| async move {
        loop {
            if let Some(item) = state.queue.pop_front() {
                return Some((item, state));
            }
            if state.finished {
                return None;
            }
            match state.body.next().await {
                Some(Ok(chunk)) => {
                    let lines = state.lines.push(&chunk);
                    state.absorb_lines(lines);
                }
                Some(Err(e)) => {
                    state.queue.push_back(Err(e));
                    state.finished = true;
                }
                None => state.absorb_end(),
            }
        }
    })
    .boxed()
}

/// Adapt a reqwest response body into a `ByteStream`
pub fn response_bytes(response: reqwest::Response) -> ByteStream {
    stream::unfold(Some(response), |response| async move {
        let mut response = response?;
        match response.chunk().await {
            Ok(Some(chunk)) => Some((Ok(chunk), Some(response))),
            Ok(None) => None,
            Err(e) => Some((
                Err(ProviderError::ConnectionError(format!("Stream interrupted: {}", e))),
                None,
            )),
        }
    })
    .boxed()
}
