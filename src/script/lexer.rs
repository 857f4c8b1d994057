//! Tokenizer for script source.
//!
//! Words are returned raw; the parser decides which ones are keywords, so
//! that `in:` can still be used as an argument name. String literals are
//! split into text pieces and the raw source of each `{...}`
//! interpolation, which the parser parses recursively.

use crate::core::config::DEFAULT_MAX_CALL_DEPTH;
use crate::core::{ScriptError, ScriptResult};

/// Piece of a string literal.
#[derive(Clone, Debug, PartialEq)]
pub enum StrPiece {
    Text(String),
    /// Source of an interpolation and its byte offset in the script.
    Code(String, usize),
}

#[derive(Clone, Debug, PartialEq)]
pub enum Token {
    Int(i64),
    Double(f64),
    Str(Vec<StrPiece>),
    Word(String),
    LParen,
    RParen,
    LBracket,
    RBracket,
    LBrace,
    RBrace,
    Comma,
    Colon,
    Assign,
    Dot,
    Semicolon,
    Newline,
    Plus,
    Minus,
    Star,
    Slash,
    Caret,
    EqEq,
    NotEq,
    Lt,
    Gt,
    Le,
    Ge,
    Eof,
}

impl Token {
    /// Human readable form for error messages.
    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            Token::Int(i) => i.to_string(),
            Token::Double(d) => d.to_string(),
            Token::Str(_) => "string".to_string(),
            Token::Word(w) => format!("'{w}'"),
            Token::Newline => "end of line".to_string(),
            Token::Eof => "end of input".to_string(),
            other => format!("'{}'", other.symbol()),
        }
    }

    fn symbol(&self) -> &'static str {
        match self {
            Token::LParen => "(",
            Token::RParen => ")",
            Token::LBracket => "[",
            Token::RBracket => "]",
            Token::LBrace => "{",
            Token::RBrace => "}",
            Token::Comma => ",",
            Token::Colon => ":",
            Token::Assign => ":=",
            Token::Dot => ".",
            Token::Semicolon => ";",
            Token::Plus => "+",
            Token::Minus => "-",
            Token::Star => "*",
            Token::Slash => "/",
            Token::Caret => "^",
            Token::EqEq => "==",
            Token::NotEq => "!=",
            Token::Lt => "<",
            Token::Gt => ">",
            Token::Le => "<=",
            Token::Ge => ">=",
            _ => "?",
        }
    }
}

/// A token and the byte offset it starts at.
#[derive(Clone, Debug, PartialEq)]
pub struct Spanned {
    pub token: Token,
    pub pos: usize,
}

/// Split `source` into tokens. `base` is added to every reported offset.
pub fn tokenize(source: &str, base: usize) -> ScriptResult<Vec<Spanned>> {
    Lexer {
        src: source,
        pos: 0,
        base,
        nesting: 0,
    }
    .run()
}

/// Split template text (a string body without quotes) into pieces.
pub fn template_pieces(text: &str, base: usize) -> ScriptResult<Vec<StrPiece>> {
    Lexer {
        src: text,
        pos: 0,
        base,
        nesting: 0,
    }
    .string(0, false)
}

struct Lexer<'a> {
    src: &'a str,
    pos: usize,
    base: usize,
    /// Strings inside interpolations inside strings.
    nesting: usize,
}

impl<'a> Lexer<'a> {
    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn peek_at(&self, n: usize) -> Option<char> {
        self.src[self.pos..].chars().nth(n)
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn error(&self, message: impl Into<String>, pos: usize) -> ScriptError {
        ScriptError::parse_at(message, self.base + pos)
    }

    fn run(mut self) -> ScriptResult<Vec<Spanned>> {
        let mut out = Vec::new();
        while let Some(c) = self.peek() {
            let start = self.pos;
            let token = match c {
                ' ' | '\t' | '\r' => {
                    self.bump();
                    continue;
                }
                '#' => {
                    while !matches!(self.peek(), None | Some('\n')) {
                        self.bump();
                    }
                    continue;
                }
                '\n' => {
                    self.bump();
                    Token::Newline
                }
                '0'..='9' => self.number()?,
                '"' => {
                    self.bump();
                    Token::Str(self.string(start, true)?)
                }
                c if c.is_alphabetic() || c == '_' => self.word(),
                _ => self.punct(start)?,
            };
            out.push(Spanned {
                token,
                pos: self.base + start,
            });
        }
        out.push(Spanned {
            token: Token::Eof,
            pos: self.base + self.pos,
        });
        Ok(out)
    }

    fn number(&mut self) -> ScriptResult<Token> {
        let start = self.pos;
        while matches!(self.peek(), Some('0'..='9')) {
            self.bump();
        }
        let is_double =
            self.peek() == Some('.') && matches!(self.peek_at(1), Some('0'..='9'));
        if is_double {
            self.bump();
            while matches!(self.peek(), Some('0'..='9')) {
                self.bump();
            }
        }
        let text = &self.src[start..self.pos];
        if is_double {
            text.parse::<f64>()
                .map(Token::Double)
                .map_err(|_| self.error(format!("invalid number '{text}'"), start))
        } else {
            text.parse::<i64>()
                .map(Token::Int)
                .map_err(|_| self.error(format!("integer '{text}' out of range"), start))
        }
    }

    fn word(&mut self) -> Token {
        let start = self.pos;
        while matches!(self.peek(), Some(c) if c.is_alphanumeric() || c == '_') {
            self.bump();
        }
        Token::Word(self.src[start..self.pos].to_string())
    }

    /// Body of a string literal, after the opening quote.
    ///
    /// Unquoted bodies (templates) run to the end of the input.
    fn string(&mut self, start: usize, quoted: bool) -> ScriptResult<Vec<StrPiece>> {
        let mut pieces = Vec::new();
        let mut text = String::new();
        loop {
            let Some(c) = self.bump() else {
                if quoted {
                    return Err(self.error("unterminated string", start));
                }
                break;
            };
            match c {
                '"' if quoted => break,
                '\\' => match self.bump() {
                    Some('n') => text.push('\n'),
                    Some('t') => text.push('\t'),
                    Some(c @ ('"' | '\\' | '{' | '}')) => text.push(c),
                    // unknown escapes stay verbatim, regexes rely on this
                    Some(c) => {
                        text.push('\\');
                        text.push(c);
                    }
                    None => return Err(self.error("unterminated string", start)),
                },
                '{' => {
                    if !text.is_empty() {
                        pieces.push(StrPiece::Text(std::mem::take(&mut text)));
                    }
                    let code_start = self.pos;
                    self.skip_interpolation(start)?;
                    let code = self.src[code_start..self.pos - 1].to_string();
                    pieces.push(StrPiece::Code(code, self.base + code_start));
                }
                c => text.push(c),
            }
        }
        if !text.is_empty() || pieces.is_empty() {
            pieces.push(StrPiece::Text(text));
        }
        Ok(pieces)
    }

    /// Skip to just past the `}` closing an interpolation, honouring
    /// nested braces and nested string literals.
    fn skip_interpolation(&mut self, start: usize) -> ScriptResult<()> {
        let mut depth = 1usize;
        while let Some(c) = self.bump() {
            match c {
                '{' => depth += 1,
                '}' => {
                    depth -= 1;
                    if depth == 0 {
                        return Ok(());
                    }
                }
                '"' => {
                    let inner = self.pos - 1;
                    if self.nesting == DEFAULT_MAX_CALL_DEPTH {
                        return Err(self.error("strings nested too deeply", inner));
                    }
                    self.nesting += 1;
                    let result = self.string(inner, true);
                    self.nesting -= 1;
                    result?;
                }
                _ => {}
            }
        }
        Err(self.error("unterminated '{' in string", start))
    }

    fn punct(&mut self, start: usize) -> ScriptResult<Token> {
        let c = self.bump().unwrap_or_default();
        let next = self.peek();
        let two = |lexer: &mut Self, t: Token| {
            lexer.bump();
            t
        };
        Ok(match (c, next) {
            (':', Some('=')) => two(self, Token::Assign),
            ('=', Some('=')) => two(self, Token::EqEq),
            ('!', Some('=')) => two(self, Token::NotEq),
            ('<', Some('=')) => two(self, Token::Le),
            ('>', Some('=')) => two(self, Token::Ge),
            ('(', _) => Token::LParen,
            (')', _) => Token::RParen,
            ('[', _) => Token::LBracket,
            (']', _) => Token::RBracket,
            ('{', _) => Token::LBrace,
            ('}', _) => Token::RBrace,
            (',', _) => Token::Comma,
            (':', _) => Token::Colon,
            ('.', _) => Token::Dot,
            (';', _) => Token::Semicolon,
            ('+', _) => Token::Plus,
            ('-', _) => Token::Minus,
            ('*', _) => Token::Star,
            ('/', _) => Token::Slash,
            ('^', _) => Token::Caret,
            ('<', _) => Token::Lt,
            ('>', _) => Token::Gt,
            (c, _) => return Err(self.error(format!("unexpected character '{c}'"), start)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(src: &str) -> Vec<Token> {
        tokenize(src, 0)
            .unwrap()
            .into_iter()
            .map(|s| s.token)
            .collect()
    }

    #[test]
    fn test_basic_tokens() {
        assert_eq!(
            tokens("x := 1 + 2.5"),
            vec![
                Token::Word("x".into()),
                Token::Assign,
                Token::Int(1),
                Token::Plus,
                Token::Double(2.5),
                Token::Eof
            ]
        );
    }

    #[test]
    fn test_member_after_number_is_not_double() {
        assert_eq!(
            tokens("1.x"),
            vec![Token::Int(1), Token::Dot, Token::Word("x".into()), Token::Eof]
        );
    }

    #[test]
    fn test_comparisons_and_comments() {
        assert_eq!(
            tokens("a <= b # trailing\n"),
            vec![
                Token::Word("a".into()),
                Token::Le,
                Token::Word("b".into()),
                Token::Newline,
                Token::Eof
            ]
        );
    }

    #[test]
    fn test_string_interpolation() {
        let toks = tokenize(r#""a{x + "}"}b\{""#, 0).unwrap();
        assert_eq!(
            toks[0].token,
            Token::Str(vec![
                StrPiece::Text("a".into()),
                StrPiece::Code(r#"x + "}""#.into(), 3),
                StrPiece::Text("b{".into()),
            ])
        );
    }

    #[test]
    fn test_template_pieces() {
        assert_eq!(
            template_pieces(r#"Draw {param1} "cards""#, 0).unwrap(),
            vec![
                StrPiece::Text("Draw ".into()),
                StrPiece::Code("param1".into(), 6),
                StrPiece::Text(" \"cards\"".into()),
            ]
        );
    }

    #[test]
    fn test_unknown_escape_kept() {
        assert_eq!(
            tokens(r#""\d+""#)[0],
            Token::Str(vec![StrPiece::Text("\\d+".into())])
        );
    }

    #[test]
    fn test_errors() {
        assert!(matches!(
            tokenize("\"abc", 0),
            Err(ScriptError::Parse { position: 0, .. })
        ));
        assert!(tokenize("a @ b", 0).is_err());
    }
}
