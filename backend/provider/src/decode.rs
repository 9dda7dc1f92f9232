//! Lines in, reply fragments out.
//!
//! Two drivers share the same per-event logic: [`Fragments`] pulls from any
//! iterator of lines, [`decode_stream`] from an async line stream. Both stop
//! reading as soon as `[DONE]` arrives and flush a half-read event when the
//! source ends early.

use futures::{stream, Stream, StreamExt};
use tracing::debug;

use streamchat_core::FragmentFilter;

use crate::chunk::{interpret_payload, Payload};
use crate::sse::{SseDecoder, SseEvent};

/// How a decoded stream ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamEnd {
    /// The server sent `[DONE]`.
    Done,
    /// The line source ran out.
    Closed,
}

fn event_payload(event: &SseEvent, filter: &FragmentFilter) -> Payload {
    if let Some(name) = &event.event {
        debug!(event = %name, id = ?event.id, "SSE event");
    }
    interpret_payload(&event.data, filter)
}

/// Synchronous fragment iterator over a line source.
///
/// Not reusable: once it returns `None` the reason is in [`end`](Self::end).
pub struct Fragments<I> {
    lines: I,
    decoder: SseDecoder,
    filter: FragmentFilter,
    end: Option<StreamEnd>,
}

impl<I> Fragments<I> {
    pub fn with_filter(mut self, filter: FragmentFilter) -> Self {
        self.filter = filter;
        self
    }

    /// Why iteration stopped, or `None` while fragments may still follow.
    pub fn end(&self) -> Option<StreamEnd> {
        self.end
    }
}

impl<I, S> Iterator for Fragments<I>
where
    I: Iterator<Item = S>,
    S: AsRef<str>,
{
    type Item = String;

    fn next(&mut self) -> Option<String> {
        while self.end.is_none() {
            let event = match self.lines.next() {
                Some(line) => self.decoder.push_line(line.as_ref()),
                None => {
                    self.end = Some(StreamEnd::Closed);
                    self.decoder.finish()
                }
            };
            let Some(event) = event else { continue };

            match event_payload(&event, &self.filter) {
                Payload::Done => self.end = Some(StreamEnd::Done),
                Payload::Fragment(text) => return Some(text),
                Payload::Skip => {}
            }
        }
        None
    }
}

/// Decode an iterator of lines (terminators already stripped).
pub fn decode_lines<L>(lines: L) -> Fragments<L::IntoIter>
where
    L: IntoIterator,
    L::Item: AsRef<str>,
{
    Fragments {
        lines: lines.into_iter(),
        decoder: SseDecoder::new(),
        filter: FragmentFilter::default(),
        end: None,
    }
}

struct DecodeState<S> {
    lines: S,
    decoder: SseDecoder,
    filter: FragmentFilter,
    finished: bool,
}

/// Decode an async line stream.
///
/// A line-source error is yielded once and ends the stream; anything
/// decoded before it has already been yielded.
pub fn decode_stream<S, E>(lines: S, filter: FragmentFilter) -> impl Stream<Item = Result<String, E>>
where
    S: Stream<Item = Result<String, E>> + Unpin,
{
    let state = DecodeState {
        lines,
        decoder: SseDecoder::new(),
        filter,
        finished: false,
    };

    stream::unfold(state, |mut st| async move {
        loop {
            if st.finished {
                return None;
            }
            let event = match st.lines.next().await {
                Some(Ok(line)) => st.decoder.push_line(&line),
                Some(Err(err)) => {
                    st.finished = true;
                    return Some((Err(err), st));
                }
                None => {
                    debug!(pending = st.decoder.is_pending(), "Line source closed");
                    st.finished = true;
                    st.decoder.finish()
                }
            };
            let Some(event) = event else { continue };

            match event_payload(&event, &st.filter) {
                Payload::Done => {
                    debug!("Received [DONE]");
                    st.finished = true;
                }
                Payload::Fragment(text) => return Some((Ok(text), st)),
                Payload::Skip => {}
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn content(text: &str) -> String {
        format!("data: {}", serde_json::json!({"choices": [{"delta": {"content": text}}]}))
    }

    #[test]
    fn end_to_end_fragments() {
        let lines = vec![
            r#"data: {"choices":[{"delta":{"content":"Hi"}}]}"#,
            "",
            r#"data: {"choices":[{"delta":{"content":" there"}}]}"#,
            "",
            "data: [DONE]",
            "",
        ];
        let mut fragments = decode_lines(lines);
        let out: Vec<String> = fragments.by_ref().collect();
        assert_eq!(out, vec!["Hi", " there"]);
        assert_eq!(fragments.end(), Some(StreamEnd::Done));
    }

    #[test]
    fn done_stops_consuming_input() {
        let lines = vec![content("a"), String::new(), "data: [DONE]".into(), String::new()];
        let mut source = lines
            .into_iter()
            .chain(vec![content("after"), String::new()]);

        let out: Vec<String> = decode_lines(source.by_ref()).collect();
        assert_eq!(out, vec!["a"]);
        // the lines after the sentinel were never pulled
        assert_eq!(source.next(), Some(content("after")));
    }

    #[test]
    fn comments_never_reach_output() {
        let lines = vec![
            ": heartbeat".to_string(),
            content("x"),
            ": data: {\"choices\":[{\"delta\":{\"content\":\"bogus\"}}]}".into(),
            String::new(),
            ":".into(),
            String::new(),
        ];
        let out: Vec<String> = decode_lines(lines).collect();
        assert_eq!(out, vec!["x"]);
    }

    #[test]
    fn multi_line_data_is_one_payload() {
        let lines = vec![
            "data: {\"choices\":",
            "data: [{\"delta\":{\"content\":\"joined\"}}]}",
            "",
        ];
        let out: Vec<String> = decode_lines(lines).collect();
        assert_eq!(out, vec!["joined"]);
    }

    #[test]
    fn close_without_blank_line_flushes_last_event() {
        let lines = vec![content("one"), String::new(), content("two")];
        let mut fragments = decode_lines(lines);
        let out: Vec<String> = fragments.by_ref().collect();
        assert_eq!(out, vec!["one", "two"]);
        assert_eq!(fragments.end(), Some(StreamEnd::Closed));
    }

    #[test]
    fn malformed_payloads_are_skipped() {
        let lines = vec![
            "data: {not json".to_string(),
            String::new(),
            r#"data: {"choices":[]}"#.into(),
            String::new(),
            content("ok"),
            String::new(),
        ];
        let out: Vec<String> = decode_lines(lines).collect();
        assert_eq!(out, vec!["ok"]);
    }

    #[test]
    fn filter_applies_to_lines() {
        let lines = vec![content("first chunk"), String::new(), content("real"), String::new()];
        let out: Vec<String> = decode_lines(lines.clone())
            .with_filter(FragmentFilter::placeholder())
            .collect();
        assert_eq!(out, vec!["real"]);

        let out: Vec<String> = decode_lines(lines).collect();
        assert_eq!(out, vec!["first chunk", "real"]);
    }

    #[test]
    fn empty_source_ends_closed() {
        let mut fragments = decode_lines(Vec::<String>::new());
        assert_eq!(fragments.next(), None);
        assert_eq!(fragments.end(), Some(StreamEnd::Closed));
    }

    #[tokio::test]
    async fn async_stream_matches_iterator() {
        let lines = vec![
            Ok::<_, String>(content("Hi")),
            Ok(String::new()),
            Ok(content(" there")),
            Ok(String::new()),
            Ok("data: [DONE]".into()),
            Ok(String::new()),
            Ok(content("ignored")),
        ];
        let out: Vec<_> = decode_stream(stream::iter(lines), FragmentFilter::none())
            .collect()
            .await;
        assert_eq!(out, vec![Ok("Hi".to_string()), Ok(" there".to_string())]);
    }

    #[tokio::test]
    async fn async_stream_error_is_terminal() {
        let lines = vec![
            Ok(content("partial")),
            Ok(String::new()),
            Err("connection reset".to_string()),
            Ok(content("never")),
            Ok(String::new()),
        ];
        let out: Vec<_> = decode_stream(stream::iter(lines), FragmentFilter::none())
            .collect()
            .await;
        assert_eq!(
            out,
            vec![Ok("partial".to_string()), Err("connection reset".to_string())]
        );
    }

    #[tokio::test]
    async fn async_stream_flushes_on_close() {
        let lines = vec![Ok::<_, String>(content("tail"))];
        let out: Vec<_> = decode_stream(stream::iter(lines), FragmentFilter::none())
            .collect()
            .await;
        assert_eq!(out, vec![Ok("tail".to_string())]);
    }
}
