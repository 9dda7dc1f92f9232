//! Byte chunks to text lines.
//!
//! Network reads split the body at arbitrary points, including inside a line
//! or inside a multi-byte UTF-8 sequence. Bytes are held until a terminator
//! (`\n`, `\r\n` or a lone `\r`) arrives, then decoded as one line.

use std::collections::VecDeque;

use futures::{stream, Stream, StreamExt};

/// Incremental splitter; feed chunks with [`push`](Self::push), then call
/// [`finish`](Self::finish) once the source is exhausted.
#[derive(Debug, Default)]
pub struct LineSplitter {
    buf: Vec<u8>,
    pending_cr: bool,
}

impl LineSplitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Consume a chunk and return every line it completed, terminators stripped.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        let mut lines = Vec::new();
        for &byte in chunk {
            if self.pending_cr {
                self.pending_cr = false;
                if byte == b'\n' {
                    continue;
                }
            }
            match byte {
                b'\n' => lines.push(self.take_line()),
                b'\r' => {
                    lines.push(self.take_line());
                    self.pending_cr = true;
                }
                _ => self.buf.push(byte),
            }
        }
        lines
    }

    /// Return the unterminated tail, if any.
    pub fn finish(&mut self) -> Option<String> {
        self.pending_cr = false;
        if self.buf.is_empty() {
            None
        } else {
            Some(self.take_line())
        }
    }

    fn take_line(&mut self) -> String {
        let bytes = std::mem::take(&mut self.buf);
        match String::from_utf8(bytes) {
            Ok(line) => line,
            Err(err) => String::from_utf8_lossy(err.as_bytes()).into_owned(),
        }
    }
}

struct LineState<S> {
    chunks: S,
    splitter: LineSplitter,
    ready: VecDeque<String>,
    exhausted: bool,
}

/// Adapt a stream of byte chunks into a stream of lines.
///
/// A chunk error is yielded once and ends the stream.
pub fn into_lines<S, B, E>(chunks: S) -> impl Stream<Item = Result<String, E>>
where
    S: Stream<Item = Result<B, E>> + Unpin,
    B: AsRef<[u8]>,
{
    let state = LineState {
        chunks,
        splitter: LineSplitter::new(),
        ready: VecDeque::new(),
        exhausted: false,
    };

    stream::unfold(state, |mut st| async move {
        loop {
            if let Some(line) = st.ready.pop_front() {
                return Some((Ok(line), st));
            }
            if st.exhausted {
                return None;
            }
            match st.chunks.next().await {
                Some(Ok(chunk)) => st.ready.extend(st.splitter.push(chunk.as_ref())),
                Some(Err(err)) => {
                    st.exhausted = true;
                    return Some((Err(err), st));
                }
                None => {
                    st.exhausted = true;
                    st.ready.extend(st.splitter.finish());
                }
            }
        }
    })
}
