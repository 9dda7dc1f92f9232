//! Terminal output utilities: ANSI styling and incremental reply writing.

use std::io::{self, Write};

pub const RESET: &str = "\x1b[0m";
pub const BOLD: &str = "\x1b[1m";
pub const DIM: &str = "\x1b[2m";
pub const RED: &str = "\x1b[31m";
pub const GREEN: &str = "\x1b[32m";
pub const CYAN: &str = "\x1b[36m";

/// Check if the terminal supports color output.
pub fn supports_color() -> bool {
    std::env::var("NO_COLOR").is_err()
        && (std::env::var("COLORTERM").is_ok()
            || std::env::var("TERM")
                .map(|t| t != "dumb")
                .unwrap_or(false))
}

fn paint(style: &str, text: &str) -> String {
    if supports_color() {
        format!("{style}{text}{RESET}")
    } else {
        text.to_string()
    }
}

/// Print a failed request to stderr.
pub fn print_error(message: &str) {
    eprintln!("{}", paint(RED, &format!("❌ {message}")));
}

pub fn print_success(message: &str) {
    eprintln!("{}", paint(GREEN, &format!("✅ {message}")));
}

pub fn print_dim(message: &str) {
    eprintln!("{}", paint(DIM, message));
}

pub fn prompt_label(label: &str) -> String {
    paint(&format!("{BOLD}{CYAN}"), label)
}

/// Writes reply fragments as they arrive, flushing after each one.
pub struct StreamWriter<W: Write> {
    out: W,
    written: usize,
}

impl StreamWriter<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> StreamWriter<W> {
    pub fn new(out: W) -> Self {
        Self { out, written: 0 }
    }

    /// Write one fragment. Write errors (e.g. a closed pipe) are dropped so a
    /// broken terminal never aborts the request mid-stream.
    pub fn fragment(&mut self, text: &str) {
        let _ = self.out.write_all(text.as_bytes());
        let _ = self.out.flush();
        self.written += text.len();
    }

    /// End the reply with a newline if anything was written.
    pub fn finish(&mut self) {
        if self.written > 0 {
            let _ = self.out.write_all(b"\n");
            let _ = self.out.flush();
        }
        self.written = 0;
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.out
    }
}
