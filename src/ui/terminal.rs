//! Line-oriented console input.

use crate::ui::render::Renderer;
use std::io::{self, BufRead};

/// Source of interactive answers.
///
/// `Ok(None)` means the input stream is closed (EOF or Ctrl-D); callers treat
/// that as the user walking away.
pub trait Console {
    fn read_line(&mut self, prompt: &str) -> io::Result<Option<String>>;
}

/// Console backed by the process stdin, prompting on stderr.
pub struct StdinConsole {
    renderer: Renderer,
}

impl StdinConsole {
    pub fn new(renderer: Renderer) -> Self {
        Self { renderer }
    }
}

impl Console for StdinConsole {
    fn read_line(&mut self, prompt: &str) -> io::Result<Option<String>> {
        self.renderer.prompt(prompt);
        let mut line = String::new();
        let read = io::stdin().lock().read_line(&mut line)?;
        if read == 0 {
            eprintln!();
            return Ok(None);
        }
        Ok(Some(strip_line_ending(line)))
    }
}

fn strip_line_ending(mut line: String) -> String {
    while line.ends_with('\n') || line.ends_with('\r') {
        line.pop();
    }
    line
}
