// ==============================================================================
// Source Scanner: Logical Lines and Line Tokens
// ==============================================================================
//
// Thrift documents are read line by line. The scanner hands out "meaningful"
// lines (comments stripped, surrounding whitespace and trailing list
// separators trimmed, blank results skipped) through a single forward cursor.
// The line number of the most recently delivered line is the coordinate for
// every declaration and diagnostic produced next.
//
// `tokenize` splits one logical line into the tokens the definition grammar
// works on.

/// Forward-only cursor over a document's raw lines.
pub struct Scanner<'a> {
    lines: &'a [String],
    /// Index of the next raw line to inspect.
    next: usize,
    /// Index of the last line returned by `next_meaningful_line`.
    current: Option<usize>,
}

impl<'a> Scanner<'a> {
    pub fn new(lines: &'a [String]) -> Self {
        Scanner {
            lines,
            next: 0,
            current: None,
        }
    }

    /// Return the next line that is neither blank nor comment-only, cleaned
    /// of comments, surrounding whitespace, and trailing `,`/`;`. Returns
    /// `None` once all lines are exhausted.
    pub fn next_meaningful_line(&mut self) -> Option<&'a str> {
        while let Some(raw) = self.lines.get(self.next) {
            let index = self.next;
            self.next += 1;
            let line = clean_line(raw);
            if !line.is_empty() {
                self.current = Some(index);
                return Some(line);
            }
        }
        None
    }

    /// Step back so the most recently returned line is delivered again.
    pub fn rewind(&mut self) {
        if let Some(current) = self.current.take() {
            self.next = current;
        }
    }

    /// Zero-based number of the most recently returned line. Before the first
    /// line is returned (or at the end of an empty document) this is the last
    /// line of the document.
    pub fn line_number(&self) -> usize {
        self.current
            .unwrap_or_else(|| self.next.min(self.lines.len()).saturating_sub(1))
    }
}

/// Strip comments and trim whitespace plus trailing list separators.
fn clean_line(raw: &str) -> &str {
    strip_comment(raw)
        .trim()
        .trim_end_matches([',', ';'])
        .trim_end()
}

/// Cut `raw` at the first `//` or `#` that is not inside a quoted literal.
fn strip_comment(raw: &str) -> &str {
    let mut quote: Option<char> = None;
    let mut escaped = false;
    let mut chars = raw.char_indices().peekable();
    while let Some((i, c)) = chars.next() {
        if let Some(q) = quote {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == q {
                quote = None;
            }
            continue;
        }
        match c {
            '"' | '\'' => quote = Some(c),
            '#' => return &raw[..i],
            '/' if chars.peek().is_some_and(|&(_, n)| n == '/') => return &raw[..i],
            _ => {}
        }
    }
    raw
}

// ==============================================================================
// Tokens
// ==============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    /// Keywords, identifiers, types (including generic types such as
    /// `map<string,i32>`), numbers, and bracketed list literals.
    Word,
    /// A quoted string literal, quotes included.
    Literal,
    /// One of `{ } ( ) = : , ;`.
    Punct(char),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    /// Zero-based line the token was read from.
    pub line: usize,
}

impl Token {
    pub fn is_punct(&self, c: char) -> bool {
        self.kind == TokenKind::Punct(c)
    }

    pub fn is_word(&self) -> bool {
        self.kind == TokenKind::Word
    }

    pub fn is_separator(&self) -> bool {
        self.is_punct(',') || self.is_punct(';')
    }
}

const PUNCTUATION: [char; 8] = ['{', '}', '(', ')', '=', ':', ',', ';'];

/// Split a logical line into tokens.
///
/// Whitespace separates words except inside `<...>` (dropped, so
/// `map<string, i32>` becomes `map<string,i32>`) and `[...]` (kept
/// verbatim). An unterminated string literal extends to the end of the line.
pub fn tokenize(line: &str, line_number: usize) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut chars = line.chars().peekable();

    while let Some(&c) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
            continue;
        }

        if PUNCTUATION.contains(&c) {
            chars.next();
            tokens.push(Token {
                kind: TokenKind::Punct(c),
                text: c.to_string(),
                line: line_number,
            });
            continue;
        }

        if c == '"' || c == '\'' {
            chars.next();
            let mut text = String::from(c);
            let mut escaped = false;
            for n in chars.by_ref() {
                text.push(n);
                if escaped {
                    escaped = false;
                } else if n == '\\' {
                    escaped = true;
                } else if n == c {
                    break;
                }
            }
            tokens.push(Token {
                kind: TokenKind::Literal,
                text,
                line: line_number,
            });
            continue;
        }

        let mut text = String::new();
        let mut nesting: Vec<char> = Vec::new();
        while let Some(&n) = chars.peek() {
            if nesting.is_empty()
                && (n.is_whitespace() || PUNCTUATION.contains(&n) || n == '"' || n == '\'')
            {
                break;
            }
            chars.next();
            match n {
                '<' | '[' => nesting.push(n),
                '>' if nesting.last() == Some(&'<') => {
                    nesting.pop();
                }
                ']' if nesting.last() == Some(&'[') => {
                    nesting.pop();
                }
                _ if n.is_whitespace() && nesting.last() == Some(&'<') => continue,
                _ => {}
            }
            text.push(n);
        }
        tokens.push(Token {
            kind: TokenKind::Word,
            text,
            line: line_number,
        });
    }

    tokens
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(src: &str) -> Vec<String> {
        src.lines().map(str::to_string).collect()
    }

    fn texts(tokens: &[Token]) -> Vec<&str> {
        tokens.iter().map(|t| t.text.as_str()).collect()
    }

    // =========================================================================
    // Scanner
    // =========================================================================

    #[test]
    fn skips_blank_and_comment_lines() {
        let src = lines("\n// header comment\n   # hash comment\nconst i32 A = 1 // trailing\n\n");
        let mut scanner = Scanner::new(&src);
        assert_eq!(scanner.next_meaningful_line(), Some("const i32 A = 1"));
        assert_eq!(scanner.line_number(), 3);
        assert_eq!(scanner.next_meaningful_line(), None);
    }

    #[test]
    fn trims_trailing_separators() {
        let src = lines("  Red,\n  1: i32 x;\n");
        let mut scanner = Scanner::new(&src);
        assert_eq!(scanner.next_meaningful_line(), Some("Red"));
        assert_eq!(scanner.next_meaningful_line(), Some("1: i32 x"));
    }

    #[test]
    fn comment_markers_inside_literals_are_kept() {
        let src = lines(r#"const string URL = "http://example.com/#top" # real comment"#);
        let mut scanner = Scanner::new(&src);
        assert_eq!(
            scanner.next_meaningful_line(),
            Some(r#"const string URL = "http://example.com/#top""#)
        );
    }

    #[test]
    fn rewind_redelivers_last_line() {
        let src = lines("namespace go x\n\nstruct S {\n}");
        let mut scanner = Scanner::new(&src);
        scanner.next_meaningful_line();
        assert_eq!(scanner.next_meaningful_line(), Some("struct S {"));
        scanner.rewind();
        assert_eq!(scanner.next_meaningful_line(), Some("struct S {"));
        assert_eq!(scanner.line_number(), 2);
    }

    #[test]
    fn line_number_before_any_line_points_at_end() {
        let src = lines("// only a comment\n\n");
        let mut scanner = Scanner::new(&src);
        assert_eq!(scanner.next_meaningful_line(), None);
        assert_eq!(scanner.line_number(), 1);
        assert_eq!(Scanner::new(&[]).line_number(), 0);
    }

    // =========================================================================
    // Tokenizer
    // =========================================================================

    #[test]
    fn splits_punctuation_from_words() {
        let tokens = tokenize("enum Color { Red, Green=5, Blue }", 0);
        assert_eq!(
            texts(&tokens),
            vec!["enum", "Color", "{", "Red", ",", "Green", "=", "5", ",", "Blue", "}"]
        );
        assert!(tokens[2].is_punct('{'));
        assert!(tokens[1].is_word());
    }

    #[test]
    fn generic_types_are_single_words() {
        let tokens = tokenize("1: optional map<string, list<i32>> scores", 4);
        assert_eq!(
            texts(&tokens),
            vec!["1", ":", "optional", "map<string,list<i32>>", "scores"]
        );
        assert!(tokens.iter().all(|t| t.line == 4));
    }

    #[test]
    fn string_literals_are_single_tokens() {
        let tokens = tokenize(r#"const string G = "hello, world""#, 0);
        assert_eq!(tokens.len(), 5);
        assert_eq!(tokens[4].kind, TokenKind::Literal);
        assert_eq!(tokens[4].text, r#""hello, world""#);
    }

    #[test]
    fn bracketed_lists_keep_their_contents() {
        let tokens = tokenize("const list<i32> L = [1, 2, 3]", 0);
        assert_eq!(
            texts(&tokens),
            vec!["const", "list<i32>", "L", "=", "[1, 2, 3]"]
        );
    }

    #[test]
    fn negative_numbers_are_words() {
        let tokens = tokenize("Minus = -1", 0);
        assert_eq!(texts(&tokens), vec!["Minus", "=", "-1"]);
    }
}
