//! Centralized, hardcoded UI settings for the terminal interface.
//!
//! This is the single place to tweak prompt strings, glyphs, colors and
//! indentation.

use crossterm::style::Color;

// ---------------------------------------------------------------------------
// Layout / indentation
// ---------------------------------------------------------------------------

pub const INDENT_1: &str = "  ";
pub const BLOCK_FALLBACK_COLUMNS: usize = 100;
pub const BLOCK_RIGHT_MARGIN: usize = 2;

// ---------------------------------------------------------------------------
// Prompt strings
// ---------------------------------------------------------------------------

pub const PROMPT_TARGET_DIR: &str = "Enter the full path of the directory to organize: ";
pub const PROMPT_CONTEXT: &str =
    "Optional: describe how you'd like the files organized (press Enter to skip): ";
pub const PROMPT_DECISION: &str =
    "Approve this plan? (yes / no / or describe changes you want): ";
pub const PROMPT_SYMBOL: &str = ">";

// ---------------------------------------------------------------------------
// Sections / labels
// ---------------------------------------------------------------------------

pub const LABEL_APP: &str = "tidy";
pub const LABEL_WARNING: &str = "warning:";
pub const LABEL_ERROR: &str = "error:";

pub const GLYPH_SECTION_BULLET: &str = "•";
pub const GLYPH_PLAN_ITEM: &str = "▶";
pub const GLYPH_PLAN_ITEM_PLAIN: &str = ">";

// ---------------------------------------------------------------------------
// Colors
// ---------------------------------------------------------------------------

pub const COLOR_APP_LABEL: Color = Color::Green;
pub const COLOR_MODEL_NAME: Color = Color::DarkGrey;
pub const COLOR_PROMPT_SYMBOL: Color = Color::White;
pub const COLOR_PROMPT_TEXT: Color = Color::Yellow;

pub const COLOR_ACTIVITY_TEXT: Color = Color::DarkGrey;
pub const COLOR_WARNING: Color = Color::Yellow;
pub const COLOR_ERROR: Color = Color::Red;

pub const COLOR_SECTION_BULLET: Color = Color::DarkGrey;
pub const COLOR_SECTION_TITLE: Color = Color::Cyan;
pub const COLOR_FIELD_KEY: Color = Color::DarkGrey;
pub const COLOR_FIELD_VALUE: Color = Color::White;

pub const COLOR_PLAN_GLYPH: Color = Color::DarkYellow;
pub const COLOR_PLAN_TEXT: Color = Color::Yellow;

pub const COLOR_BLOCK_BG: Color = Color::Rgb {
    r: 30,
    g: 50,
    b: 39,
};
pub const COLOR_BLOCK_TEXT: Color = Color::Rgb {
    r: 184,
    g: 191,
    b: 186,
};
