//! Server-Sent Events framing.
//!
//! Lines are grouped into blank-line-delimited events. Only the `data`,
//! `event` and `id` fields are recognised; comments (`:`) and any other line
//! are dropped without touching the in-flight event.

/// One dispatched event. `data` holds the `data:` lines joined with `\n`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SseEvent {
    pub event: Option<String>,
    pub id: Option<String>,
    pub data: String,
}

/// Accumulator for the event currently being read.
#[derive(Debug, Default)]
pub struct SseDecoder {
    data_lines: Vec<String>,
    event: Option<String>,
    id: Option<String>,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one line. Returns an event when the line closes one.
    pub fn push_line(&mut self, line: &str) -> Option<SseEvent> {
        let line = line.trim_end_matches(['\r', '\n']);

        if line.is_empty() {
            return self.dispatch();
        }
        if line.starts_with(':') {
            return None;
        }

        if let Some(value) = field_value(line, "data") {
            self.data_lines.push(value.to_string());
        } else if let Some(value) = field_value(line, "event") {
            self.event = Some(value.to_string());
        } else if let Some(value) = field_value(line, "id") {
            self.id = Some(value.to_string());
        }
        None
    }

    /// Flush the in-flight event when the source ends without a blank line.
    pub fn finish(&mut self) -> Option<SseEvent> {
        self.dispatch()
    }

    /// Whether anything has been accumulated since the last boundary.
    pub fn is_pending(&self) -> bool {
        !self.data_lines.is_empty() || self.event.is_some() || self.id.is_some()
    }

    fn dispatch(&mut self) -> Option<SseEvent> {
        if !self.is_pending() {
            return None;
        }
        let data = self.data_lines.join("\n");
        self.data_lines.clear();
        Some(SseEvent {
            event: self.event.take(),
            id: self.id.take(),
            data,
        })
    }
}

/// `field:value` with at most one leading space removed from the value.
fn field_value<'a>(line: &'a str, field: &str) -> Option<&'a str> {
    let rest = line.strip_prefix(field)?.strip_prefix(':')?;
    Some(rest.strip_prefix(' ').unwrap_or(rest))
}
