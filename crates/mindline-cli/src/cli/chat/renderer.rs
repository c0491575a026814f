//! Terminal rendering for chat output.
//!
//! During streaming, fragments are printed raw as they arrive; completed
//! replies replayed from history are rendered as markdown via `termimad`.

use std::io::Write;

use termimad::MadSkin;

/// Terminal renderer for assistant output.
pub struct ChatRenderer {
    skin: MadSkin,
}

impl ChatRenderer {
    pub fn new() -> Self {
        let mut skin = MadSkin::default_dark();
        skin.inline_code
            .set_fg(termimad::crossterm::style::Color::Yellow);
        Self { skin }
    }

    /// Render a complete markdown reply for display.
    pub fn render_final(&self, markdown: &str) -> String {
        format!("{}", self.skin.term_text(markdown))
    }

    /// Print a single streaming fragment (raw, no formatting).
    pub fn print_streaming_fragment(&self, fragment: &str) {
        print!("{fragment}");
        let _ = std::io::stdout().flush();
    }

    /// Print the stats footer after a reply.
    ///
    /// Format: "| {time}s . {model}"
    pub fn print_stats_footer(&self, response_ms: u64, model: &str) {
        let seconds = response_ms as f64 / 1000.0;
        println!(
            "\n  {} {:.1}s {} {}",
            console::style("|").dim(),
            console::style(seconds).dim(),
            console::style("\u{00b7}").dim(),
            console::style(model).dim(),
        );
    }
}

impl Default for ChatRenderer {
    fn default() -> Self {
        Self::new()
    }
}
