//! Deterministic extraction of operations from a free-text model reply.
//!
//! The reply is scanned left to right for the two tool names. Each occurrence
//! that is followed by a well-formed argument list becomes one operation;
//! every other byte of the reply is ignored. Two argument shapes are
//! recognized:
//!
//! ```text
//! call form:  create_directory('Photos')
//!             move_file('a.jpg', 'Photos/a.jpg')
//!             move_file(source="a.jpg", destination="Photos/a.jpg")
//! line form:  call tool 'create_directory' with args { 'path': 'Images' }
//!             call tool 'move_file' with args { 'source': 'x', 'destination': 'y' }
//! ```
//!
//! Strings are single- or double-quoted. A `\` escapes the active quote or
//! another `\`; any other backslash is kept literally.
//! Keys may be bare or quoted and are separated from values by `:` or `=`.
//! Positional and named arguments can be mixed; named ones win.

use super::{Plan, PlannedOperation, CREATE_DIRECTORY_TOOL, MOVE_FILE_TOOL};

const PATH_KEYS: &[&str] = &["path", "directory", "dir"];
const SOURCE_KEYS: &[&str] = &["source", "src", "from"];
const DESTINATION_KEYS: &[&str] = &["destination", "dest", "target", "to"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ToolKind {
    CreateDirectory,
    MoveFile,
}

impl ToolKind {
    fn name(self) -> &'static str {
        match self {
            Self::CreateDirectory => CREATE_DIRECTORY_TOOL,
            Self::MoveFile => MOVE_FILE_TOOL,
        }
    }

    fn build(self, args: &Arguments) -> Option<PlannedOperation> {
        match self {
            Self::CreateDirectory => {
                let path = args.named(PATH_KEYS).or_else(|| args.positional(0))?;
                Some(PlannedOperation::create_directory(path))
            }
            Self::MoveFile => {
                let from = args.named(SOURCE_KEYS).or_else(|| args.positional(0))?;
                let to = args
                    .named(DESTINATION_KEYS)
                    .or_else(|| args.positional(1))?;
                Some(PlannedOperation::move_entry(from, to))
            }
        }
    }
}

/// Parse every recognizable operation out of `text`, in order of appearance.
///
/// Never fails: text with nothing recognizable yields an empty plan.
pub fn extract(text: &str) -> Plan {
    let mut operations = Vec::new();
    let mut cursor = 0;
    while let Some((start, kind)) = next_tool_name(text, cursor) {
        let after_name = start + kind.name().len();
        let mut scanner = Scanner::new(&text[after_name..]);
        match parse_invocation(&mut scanner) {
            Some(args) => {
                if let Some(op) = kind.build(&args) {
                    operations.push(op);
                }
                cursor = after_name + scanner.pos;
            }
            None => cursor = after_name,
        }
    }
    Plan::new(operations)
}

/// Find the next standalone tool name at or after `from`.
fn next_tool_name(text: &str, from: usize) -> Option<(usize, ToolKind)> {
    let mut search_from = from;
    loop {
        let rest = text.get(search_from..)?;
        let (offset, kind) = [ToolKind::CreateDirectory, ToolKind::MoveFile]
            .into_iter()
            .filter_map(|kind| rest.find(kind.name()).map(|pos| (pos, kind)))
            .min_by_key(|(pos, _)| *pos)?;
        let start = search_from + offset;
        let end = start + kind.name().len();

        let before_ok = text[..start]
            .chars()
            .next_back()
            .map_or(true, |c| !is_ident_char(c));
        let after_ok = text[end..]
            .chars()
            .next()
            .map_or(true, |c| !is_ident_char(c));
        if before_ok && after_ok {
            return Some((start, kind));
        }
        search_from = end;
    }
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

#[derive(Debug, Default)]
struct Arguments {
    positional: Vec<String>,
    named: Vec<(String, String)>,
}

impl Arguments {
    fn named(&self, keys: &[&str]) -> Option<String> {
        self.named
            .iter()
            .find(|(key, _)| keys.iter().any(|k| key.eq_ignore_ascii_case(k)))
            .map(|(_, value)| value.clone())
    }

    fn positional(&self, idx: usize) -> Option<String> {
        self.positional.get(idx).cloned()
    }
}

/// Parse what follows a tool name: either `(...)` or `with args {...}`.
fn parse_invocation(scanner: &mut Scanner<'_>) -> Option<Arguments> {
    // Closing quote of the `'create_directory'` spelling.
    if matches!(scanner.peek(), Some('\'' | '"' | '`')) {
        scanner.bump();
    }
    scanner.skip_whitespace();
    match scanner.peek()? {
        '(' => {
            scanner.bump();
            parse_argument_list(scanner, ')')
        }
        _ => {
            scanner.expect_word("with")?;
            scanner.skip_whitespace();
            scanner.expect_word("args")?;
            scanner.skip_whitespace();
            if matches!(scanner.peek(), Some(':' | '=')) {
                scanner.bump();
                scanner.skip_whitespace();
            }
            let close = match scanner.bump()? {
                '{' => '}',
                '(' => ')',
                _ => return None,
            };
            parse_argument_list(scanner, close)
        }
    }
}

fn parse_argument_list(scanner: &mut Scanner<'_>, close: char) -> Option<Arguments> {
    let mut args = Arguments::default();
    loop {
        scanner.skip_whitespace();
        if scanner.peek()? == close {
            scanner.bump();
            return Some(args);
        }

        let head = match scanner.peek()? {
            '\'' | '"' => Token::Quoted(scanner.quoted()?),
            c if is_ident_char(c) => Token::Bare(scanner.identifier()),
            _ => return None,
        };
        scanner.skip_whitespace();
        if matches!(scanner.peek(), Some(':' | '=')) {
            scanner.bump();
            scanner.skip_whitespace();
            let value = scanner.quoted()?;
            args.named.push((head.into_text(), value));
        } else {
            match head {
                Token::Quoted(value) => args.positional.push(value),
                // A bare word must be a key.
                Token::Bare(_) => return None,
            }
        }

        scanner.skip_whitespace();
        match scanner.peek()? {
            ',' => {
                scanner.bump();
            }
            c if c == close => {}
            _ => return None,
        }
    }
}

enum Token {
    Quoted(String),
    Bare(String),
}

impl Token {
    fn into_text(self) -> String {
        match self {
            Self::Quoted(text) | Self::Bare(text) => text,
        }
    }
}

/// Byte-position cursor over a `&str`.
struct Scanner<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Scanner<'a> {
    fn new(src: &'a str) -> Self {
        Self { src, pos: 0 }
    }

    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.bump();
        }
    }

    fn identifier(&mut self) -> String {
        let start = self.pos;
        while self.peek().is_some_and(is_ident_char) {
            self.bump();
        }
        self.src[start..self.pos].to_string()
    }

    fn expect_word(&mut self, word: &str) -> Option<()> {
        let rest = &self.src[self.pos..];
        let head = rest.get(..word.len())?;
        if !head.eq_ignore_ascii_case(word) {
            return None;
        }
        let after = rest[word.len()..].chars().next();
        if after.is_some_and(is_ident_char) {
            return None;
        }
        self.pos += word.len();
        Some(())
    }

    /// Read a quoted string starting at the current quote character.
    fn quoted(&mut self) -> Option<String> {
        let quote = match self.bump()? {
            q @ ('\'' | '"') => q,
            _ => return None,
        };
        let mut out = String::new();
        loop {
            match self.bump()? {
                '\\' => match self.peek() {
                    Some(next) if next == quote || next == '\\' => {
                        self.bump();
                        out.push(next);
                    }
                    // Anything else keeps the backslash, e.g. `Docs\Reports`.
                    _ => out.push('\\'),
                },
                c if c == quote => return Some(out),
                // Arguments never span lines; an unterminated quote is prose.
                '\n' => return None,
                c => out.push(c),
            }
        }
    }
}


#[cfg(all(test, feature = "fuzz-tests"))]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn path() -> impl Strategy<Value = String> {
        "[A-Za-z0-9 ._-]{1,12}(/[A-Za-z0-9._-]{1,8}){0,2}"
    }

    fn operation() -> impl Strategy<Value = PlannedOperation> {
        prop_oneof![
            path().prop_map(PlannedOperation::create_directory),
            (path(), path()).prop_map(|(a, b)| PlannedOperation::move_entry(a, b)),
        ]
    }

    fn render(op: &PlannedOperation, line_form: bool) -> String {
        match (op, line_form) {
            (PlannedOperation::CreateDirectory { path }, true) => {
                format!("call tool 'create_directory' with args {{ 'path': '{path}' }}")
            }
            (PlannedOperation::MoveEntry { from, to }, true) => format!(
                "call tool 'move_file' with args {{ 'source': '{from}', 'destination': '{to}' }}"
            ),
            (op, false) => op.to_string(),
        }
    }

    proptest! {
        #[test]
        fn extraction_preserves_emission_order(
            items in proptest::collection::vec((operation(), any::<bool>(), "[a-z .,]{0,20}"), 0..12)
        ) {
            let mut text = String::new();
            for (op, line_form, prose) in &items {
                text.push_str(prose);
                text.push('\n');
                text.push_str(&render(op, *line_form));
                text.push('\n');
            }
            let expected: Vec<_> = items.into_iter().map(|(op, _, _)| op).collect();
            prop_assert_eq!(extract(&text).operations(), expected.as_slice());
        }

        #[test]
        fn text_without_tool_names_is_always_empty(text in "[^_]{0,200}") {
            prop_assert!(extract(&text).is_empty());
        }
    }
}
