//! Rendering contract and the default terminal renderer.
//!
//! `RenderSink` is the UI contract consumed by the review loop and the retry
//! wrapper. `Renderer` writes styled status output to stderr; tests substitute
//! a recording sink.

use crate::ui::settings;
use crossterm::style::{Print, PrintStyledContent, Stylize};
use crossterm::terminal;
use crossterm::QueueableCommand;
use std::io::{self, Write};

/// Injectable rendering interface used by orchestration code.
pub trait RenderSink: Send + Sync {
    /// Render the startup header line.
    fn header(&self, model: &str);
    /// Render a warning line.
    fn warn(&self, msg: &str);
    /// Render a titled section divider.
    fn section(&self, title: &str);
    /// Render activity/lifecycle text.
    fn activity(&self, text: &str);
    /// Render one key/value field row.
    fn field(&self, key: &str, value: &str);
    /// Render additional detail text.
    fn detail(&self, text: &str);
    /// Render an error line.
    fn error(&self, msg: &str);
    /// Render one numbered plan line.
    fn plan_line(&self, line: &str);
    /// Render multi-line text (listings, raw model output) as a tinted
    /// block, wrapped to the terminal width.
    fn response_block(&self, text: &str);
}

/// Handles all terminal output formatting.
#[derive(Debug, Clone, Copy)]
pub struct Renderer {
    /// Whether ANSI color/style output is enabled.
    color: bool,
}

impl Renderer {
    pub fn new(color: bool) -> Self {
        Self { color }
    }

    /// Print the interactive prompt indicator and question (to stderr).
    pub fn prompt(&self, question: &str) {
        if self.color {
            eprint!(
                "\r{} {}",
                settings::PROMPT_SYMBOL
                    .with(settings::COLOR_PROMPT_SYMBOL)
                    .bold(),
                question.with(settings::COLOR_PROMPT_TEXT)
            );
        } else {
            eprint!("\r{} {question}", settings::PROMPT_SYMBOL);
        }
        let _ = io::stderr().flush();
    }

    fn render_block(&self, text: &str) {
        let width = block_content_width();
        let rows = block_rows(text, width);
        if rows.is_empty() {
            return;
        }

        let mut stderr = io::stderr().lock();
        if self.write_block(&mut stderr, &rows, width).is_err() {
            // Plain fallback if queued writes fail.
            for row in &rows {
                eprintln!("{}{row}", settings::INDENT_1);
            }
        }
    }

    fn write_block<W: Write + QueueableCommand>(
        &self,
        out: &mut W,
        rows: &[String],
        width: usize,
    ) -> io::Result<()> {
        out.queue(Print("\r\n"))?;
        for row in rows {
            out.queue(Print("\r"))?;
            out.queue(Print(settings::INDENT_1))?;
            if self.color {
                let pad = width.saturating_sub(row.chars().count());
                out.queue(PrintStyledContent(
                    format!("{row}{}", " ".repeat(pad))
                        .with(settings::COLOR_BLOCK_TEXT)
                        .on(settings::COLOR_BLOCK_BG),
                ))?;
            } else {
                out.queue(Print(row))?;
            }
            out.queue(Print("\r\n"))?;
        }
        out.queue(Print("\r\n"))?;
        out.flush()
    }
}

impl RenderSink for Renderer {
    fn header(&self, model: &str) {
        if self.color {
            eprintln!(
                "\r{} {}",
                settings::LABEL_APP
                    .with(settings::COLOR_APP_LABEL)
                    .bold(),
                model.with(settings::COLOR_MODEL_NAME),
            );
        } else {
            eprintln!("\r{} ({model})", settings::LABEL_APP);
        }
    }

    fn warn(&self, msg: &str) {
        if self.color {
            eprintln!(
                "\r{} {msg}",
                settings::LABEL_WARNING.with(settings::COLOR_WARNING).bold()
            );
        } else {
            eprintln!("\r{} {msg}", settings::LABEL_WARNING);
        }
    }

    fn section(&self, title: &str) {
        if self.color {
            eprintln!(
                "\r{} {}",
                settings::GLYPH_SECTION_BULLET.with(settings::COLOR_SECTION_BULLET),
                title.with(settings::COLOR_SECTION_TITLE).bold()
            );
        } else {
            eprintln!("\r{title}:");
        }
    }

    fn activity(&self, text: &str) {
        if self.color {
            eprintln!(
                "\r{} {}",
                settings::GLYPH_SECTION_BULLET.with(settings::COLOR_SECTION_BULLET),
                text.with(settings::COLOR_ACTIVITY_TEXT).bold()
            );
        } else {
            eprintln!("\r{text}");
        }
    }

    fn field(&self, key: &str, value: &str) {
        if self.color {
            eprintln!(
                "\r{}{} {}",
                settings::INDENT_1,
                format!("{key}:").with(settings::COLOR_FIELD_KEY),
                value.with(settings::COLOR_FIELD_VALUE),
            );
        } else {
            eprintln!("\r{}{key}: {value}", settings::INDENT_1);
        }
    }

    fn detail(&self, text: &str) {
        if self.color {
            eprintln!(
                "\r{}{}",
                settings::INDENT_1,
                text.with(settings::COLOR_FIELD_VALUE)
            );
        } else {
            eprintln!("\r{}{text}", settings::INDENT_1);
        }
    }

    fn error(&self, msg: &str) {
        if self.color {
            eprintln!(
                "\r{} {msg}",
                settings::LABEL_ERROR.with(settings::COLOR_ERROR).bold()
            );
        } else {
            eprintln!("\r{} {msg}", settings::LABEL_ERROR);
        }
    }

    fn plan_line(&self, line: &str) {
        if self.color {
            eprintln!(
                "\r{}{} {}",
                settings::INDENT_1,
                settings::GLYPH_PLAN_ITEM.with(settings::COLOR_PLAN_GLYPH),
                line.with(settings::COLOR_PLAN_TEXT),
            );
        } else {
            eprintln!(
                "\r{}{} {line}",
                settings::INDENT_1,
                settings::GLYPH_PLAN_ITEM_PLAIN
            );
        }
    }

    fn response_block(&self, text: &str) {
        self.render_block(text);
    }
}

fn block_content_width() -> usize {
    let cols = terminal::size()
        .map(|(w, _)| w as usize)
        .unwrap_or(settings::BLOCK_FALLBACK_COLUMNS);
    let indent = settings::INDENT_1.chars().count();
    cols.saturating_sub(indent + settings::BLOCK_RIGHT_MARGIN)
        .max(1)
}

fn block_rows(text: &str, width: usize) -> Vec<String> {
    text.lines()
        .flat_map(|line| wrap_to_width(line, width))
        .collect()
}

/// Split `text` into rows of at most `width` characters. Nothing is dropped;
/// an empty line stays one empty row.
fn wrap_to_width(text: &str, width: usize) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    if chars.is_empty() {
        return vec![String::new()];
    }
    chars
        .chunks(width.max(1))
        .map(|chunk| chunk.iter().collect())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrapping_keeps_every_character() {
        assert_eq!(wrap_to_width("abc", 5), vec!["abc"]);
        assert_eq!(wrap_to_width("abcdefghij", 4), vec!["abcd", "efgh", "ij"]);
        assert_eq!(wrap_to_width("äöüß", 4), vec!["äöüß"]);
        assert_eq!(wrap_to_width("", 4), vec![""]);
    }

    #[test]
    fn long_replies_are_not_cut_short() {
        let reply: String = (1..=120).map(|n| format!("line {n}\n")).collect();
        let rows = block_rows(&reply, 80);
        assert_eq!(rows.len(), 120);
        assert_eq!(rows.last().map(String::as_str), Some("line 120"));
    }

    #[test]
    fn block_width_is_never_zero() {
        assert!(block_content_width() >= 1);
    }
}
