//! Tokenization for placeholder scalars
//!
//! Splits a scalar into literal runs and `{path}` tokens in a single forward pass.

/// Reserved sigil for engine-owned tokens (`{@items}`)
pub const SIGIL: char = '@';

/// Prefix for positional variables injected per item (`{$index}`)
pub const POSITIONAL_PREFIX: char = '$';

/// A single `{...}` token with its position in the scalar
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token<'a> {
    /// Token content without braces (`title`, `author.name`, `@items`)
    pub name: &'a str,
    /// Byte offset of the opening `{`
    pub start: usize,
    /// Total length in bytes including both braces
    pub length: usize,
}

impl Token<'_> {
    /// Whether the token carries the reserved sigil
    pub fn is_sigil(&self) -> bool {
        self.name.starts_with(SIGIL)
    }

    /// Placeholder text as written in the template
    pub fn raw(&self) -> String {
        format!("{{{}}}", self.name)
    }
}

/// One piece of a tokenized scalar
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment<'a> {
    Literal(&'a str),
    Token(Token<'a>),
}

/// Scanner state (explicit for testability)
///
/// ```text
/// Normal ──{──> InToken ──}──> [valid name? yield Token : literal] → Normal
///                  │
///                  └── non-name byte ──> literal, rescan from byte → Normal
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ScanState {
    Normal,
    InToken { start: usize },
}

/// Iterator over the segments of a scalar
///
/// Braces that do not enclose a valid name (`{a b}`, `{}`, an unterminated `{x`)
/// stay literal text, so prose and inline JSON pass through untouched.
pub struct TokenStream<'a> {
    text: &'a str,
    pos: usize,
    state: ScanState,
}

impl<'a> TokenStream<'a> {
    pub fn new(text: &'a str) -> Self {
        Self {
            text,
            pos: 0,
            state: ScanState::Normal,
        }
    }
}

impl<'a> Iterator for TokenStream<'a> {
    type Item = Segment<'a>;

    fn next(&mut self) -> Option<Segment<'a>> {
        let bytes = self.text.as_bytes();
        if self.pos >= bytes.len() {
            return None;
        }

        let literal_start = self.pos;
        let mut scan = self.pos;

        while scan < bytes.len() {
            let byte = bytes[scan];
            match self.state {
                ScanState::Normal => {
                    if byte == b'{' {
                        self.state = ScanState::InToken { start: scan };
                    }
                    scan += 1;
                }
                ScanState::InToken { start } => {
                    if byte == b'}' {
                        self.state = ScanState::Normal;
                        let name = &self.text[start + 1..scan];
                        if !is_valid_name(name) {
                            scan += 1;
                            continue;
                        }
                        if start > literal_start {
                            // Emit pending literal first, token comes on the next call
                            self.pos = start;
                            return Some(Segment::Literal(&self.text[literal_start..start]));
                        }
                        self.pos = scan + 1;
                        return Some(Segment::Token(Token {
                            name,
                            start,
                            length: scan + 1 - start,
                        }));
                    } else if byte == b'{' {
                        self.state = ScanState::InToken { start: scan };
                        scan += 1;
                    } else if is_name_byte(byte) {
                        scan += 1;
                    } else {
                        self.state = ScanState::Normal;
                        scan += 1;
                    }
                }
            }
        }

        self.state = ScanState::Normal;
        self.pos = bytes.len();
        Some(Segment::Literal(&self.text[literal_start..]))
    }
}

/// Collect all segments of a scalar
pub fn tokenize(text: &str) -> Vec<Segment<'_>> {
    TokenStream::new(text).collect()
}

/// If the whole scalar is exactly one token, return it
pub fn exact_token(text: &str) -> Option<Token<'_>> {
    let mut stream = TokenStream::new(text);
    match (stream.next(), stream.next()) {
        (Some(Segment::Token(token)), None) => Some(token),
        _ => None,
    }
}

/// Iterate over the tokens of a scalar, skipping literal runs
pub fn tokens(text: &str) -> impl Iterator<Item = Token<'_>> {
    TokenStream::new(text).filter_map(|segment| match segment {
        Segment::Token(token) => Some(token),
        Segment::Literal(_) => None,
    })
}

fn is_name_byte(byte: u8) -> bool {
    byte.is_ascii_alphanumeric()
        || matches!(byte, b'_' | b'-' | b'.')
        || byte == SIGIL as u8
        || byte == POSITIONAL_PREFIX as u8
}

/// `[@|$]segment(.segment)*` where segments are `[A-Za-z0-9_-]+`
fn is_valid_name(name: &str) -> bool {
    let body = name
        .strip_prefix(SIGIL)
        .or_else(|| name.strip_prefix(POSITIONAL_PREFIX))
        .unwrap_or(name);

    !body.is_empty()
        && body.split('.').all(|segment| {
            !segment.is_empty()
                && segment
                    .bytes()
                    .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-')
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token(name: &str, start: usize) -> Segment<'_> {
        Segment::Token(Token {
            name,
            start,
            length: name.len() + 2,
        })
    }

    #[test]
    fn test_single_token() {
        assert_eq!(tokenize("{title}"), vec![token("title", 0)]);
    }

    #[test]
    fn test_token_between_literals() {
        assert_eq!(
            tokenize("n={count}!"),
            vec![
                Segment::Literal("n="),
                token("count", 2),
                Segment::Literal("!")
            ]
        );
    }

    #[test]
    fn test_adjacent_tokens() {
        assert_eq!(
            tokenize("{a}{b.c}"),
            vec![token("a", 0), token("b.c", 3)]
        );
    }

    #[test]
    fn test_sigil_and_positional_names() {
        let names: Vec<_> = tokens("{@items} {$index} {@other}").map(|t| t.name).collect();
        assert_eq!(names, vec!["@items", "$index", "@other"]);
        assert!(exact_token("{@items}").unwrap().is_sigil());
        assert!(!exact_token("{$first}").unwrap().is_sigil());
    }

    #[test]
    fn test_invalid_names_stay_literal() {
        for text in ["{}", "{a b}", "{a..b}", "{.a}", "{@}", r#"{"k": 1}"#] {
            assert_eq!(tokenize(text), vec![Segment::Literal(text)], "{}", text);
        }
    }

    #[test]
    fn test_unterminated_brace_stays_literal() {
        assert_eq!(tokenize("Count: {@items"), vec![Segment::Literal("Count: {@items")]);
    }

    #[test]
    fn test_nested_open_brace_restarts_token() {
        assert_eq!(
            tokenize("{{name}}"),
            vec![
                Segment::Literal("{"),
                token("name", 1),
                Segment::Literal("}")
            ]
        );
    }

    #[test]
    fn test_exact_token_rejects_surrounding_text() {
        assert!(exact_token("{count}").is_some());
        assert!(exact_token(" {count}").is_none());
        assert!(exact_token("{a}{b}").is_none());
        assert!(exact_token("").is_none());
    }

    #[test]
    fn test_non_ascii_literal() {
        assert_eq!(
            tokenize("héllo {name} wörld"),
            vec![
                Segment::Literal("héllo "),
                token("name", 7),
                Segment::Literal(" wörld")
            ]
        );
    }
}
