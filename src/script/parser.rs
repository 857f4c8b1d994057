//! Recursive descent parser.
//!
//! ## Precedence (loosest first)
//!
//! 1. `;` and newlines separate a sequence
//! 2. `name := value`
//! 3. `or`, `xor`
//! 4. `and`
//! 5. `not`
//! 6. `==` `!=` `<` `>` `<=` `>=`
//! 7. `+` `-`
//! 8. `*` `/` `div` `mod`
//! 9. unary `-`
//! 10. `^` (right associative)
//! 11. calls `f(...)`, members `a.b`, indexing `a[i]`
//!
//! Newlines are insignificant inside `(...)` and `[...]`, and after an
//! operator that still needs its right operand.

use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::core::config::DEFAULT_MAX_CALL_DEPTH;
use crate::core::{ScriptError, ScriptResult};

use super::ast::{BinaryOp, CallArg, Expr, TemplatePart, UnaryOp};
use super::function::INPUT;
use super::lexer::{template_pieces, tokenize, Spanned, StrPiece, Token};
use super::value::Value;

const KEYWORDS: &[&str] = &[
    "if", "then", "else", "for", "each", "in", "do", "from", "to", "and", "or", "xor", "not",
    "div", "mod", "nil", "true", "false",
];

/// Script name for a source identifier.
///
/// Underscores stand for spaces (`to_upper` names `to upper`), except in
/// identifiers that start with an underscore, such as the capture
/// variables `_1`, `_2`.
#[must_use]
pub fn ident_name(word: &str) -> String {
    if word.starts_with('_') {
        word.to_string()
    } else {
        word.replace('_', " ")
    }
}

/// Parse a complete script, nesting at most [`DEFAULT_MAX_CALL_DEPTH`]
/// levels deep.
pub fn parse(source: &str) -> ScriptResult<Expr> {
    parse_with_depth(source, DEFAULT_MAX_CALL_DEPTH)
}

/// Parse a complete script. Expressions nested more than `max_depth`
/// levels deep are a parse error.
pub fn parse_with_depth(source: &str, max_depth: usize) -> ScriptResult<Expr> {
    parse_at(source, 0, 0, max_depth)
}

fn parse_at(source: &str, base: usize, depth: usize, max_depth: usize) -> ScriptResult<Expr> {
    let tokens = tokenize(source, base)?;
    let mut parser = Parser {
        tokens,
        pos: 0,
        skip_newlines: 0,
        depth,
        max_depth,
    };
    let expr = parser.sequence()?;
    match parser.peek() {
        Token::Eof => Ok(expr),
        other => Err(parser.error(format!("unexpected {}", other.describe()))),
    }
}

struct Parser {
    tokens: Vec<Spanned>,
    pos: usize,
    /// Greater than zero inside parentheses and brackets.
    skip_newlines: usize,
    depth: usize,
    max_depth: usize,
}

impl Parser {
    // === Token access ===

    fn index_of_next(&self) -> usize {
        let mut i = self.pos;
        if self.skip_newlines > 0 {
            while self.tokens[i].token == Token::Newline {
                i += 1;
            }
        }
        i
    }

    fn peek(&self) -> &Token {
        &self.tokens[self.index_of_next()].token
    }

    fn peek_nth(&self, n: usize) -> &Token {
        let i = (self.index_of_next() + n).min(self.tokens.len() - 1);
        &self.tokens[i].token
    }

    /// The next token that is not a newline, regardless of mode.
    fn peek_past_newlines(&self) -> &Token {
        let mut i = self.pos;
        while self.tokens[i].token == Token::Newline {
            i += 1;
        }
        &self.tokens[i].token
    }

    fn advance(&mut self) -> Token {
        let i = self.index_of_next();
        let token = self.tokens[i].token.clone();
        if token != Token::Eof {
            self.pos = i + 1;
        } else {
            self.pos = i;
        }
        token
    }

    fn eat_newlines(&mut self) {
        while self.tokens[self.pos].token == Token::Newline {
            self.pos += 1;
        }
    }

    fn position(&self) -> usize {
        self.tokens[self.index_of_next()].pos
    }

    fn error(&self, message: impl Into<String>) -> ScriptError {
        ScriptError::parse_at(message, self.position())
    }

    fn expect(&mut self, token: &Token) -> ScriptResult<()> {
        if self.peek() == token {
            self.advance();
            Ok(())
        } else {
            Err(self.error(format!(
                "expected {}, found {}",
                token.describe(),
                self.peek().describe()
            )))
        }
    }

    fn at_word(&self, word: &str) -> bool {
        matches!(self.peek(), Token::Word(w) if w == word)
    }

    fn expect_word(&mut self, word: &str) -> ScriptResult<()> {
        self.eat_newlines();
        if self.at_word(word) {
            self.advance();
            self.eat_newlines();
            Ok(())
        } else {
            Err(self.error(format!(
                "expected '{word}', found {}",
                self.peek().describe()
            )))
        }
    }

    /// A non-keyword identifier.
    fn identifier(&mut self) -> ScriptResult<String> {
        match self.peek().clone() {
            Token::Word(w) if !KEYWORDS.contains(&w.as_str()) => {
                self.advance();
                Ok(ident_name(&w))
            }
            other => Err(self.error(format!(
                "expected identifier, found {}",
                other.describe()
            ))),
        }
    }

    /// Run `f` with newline skipping switched on or off.
    fn with_newlines<T>(&mut self, skip: bool, f: impl FnOnce(&mut Self) -> T) -> T {
        let saved = self.skip_newlines;
        self.skip_newlines = if skip { saved + 1 } else { 0 };
        let result = f(self);
        self.skip_newlines = saved;
        result
    }

    /// Run `f` one nesting level deeper.
    fn nested<T>(&mut self, f: impl FnOnce(&mut Self) -> ScriptResult<T>) -> ScriptResult<T> {
        if self.depth >= self.max_depth {
            return Err(self.error(format!("expression nested more than {} levels deep", self.max_depth)));
        }
        self.depth += 1;
        let result = f(self);
        self.depth -= 1;
        result
    }

    // === Grammar ===

    fn at_sequence_end(&self) -> bool {
        matches!(
            self.peek(),
            Token::Eof | Token::RBrace | Token::RParen | Token::RBracket
        )
    }

    fn sequence(&mut self) -> ScriptResult<Expr> {
        let mut items = Vec::new();
        loop {
            while matches!(self.tokens[self.pos].token, Token::Newline | Token::Semicolon) {
                self.pos += 1;
            }
            if self.at_sequence_end() {
                break;
            }
            items.push(self.statement()?);
            match self.tokens[self.pos].token {
                Token::Newline | Token::Semicolon => {}
                _ => break,
            }
        }
        Ok(match items.len() {
            0 => Expr::Literal(Value::Default),
            1 => items.pop().unwrap_or(Expr::Literal(Value::Default)),
            _ => Expr::Sequence(items),
        })
    }

    fn statement(&mut self) -> ScriptResult<Expr> {
        let target = match (self.peek(), self.peek_nth(1)) {
            (Token::Word(w), Token::Assign) => Some(w.clone()),
            _ => None,
        };
        if let Some(w) = target {
            if KEYWORDS.contains(&w.as_str()) {
                return Err(self.error(format!("can not assign to '{w}'")));
            }
            self.advance();
            self.advance();
            self.eat_newlines();
            let value = self.nested(Self::statement)?;
            return Ok(Expr::Assign(ident_name(&w), Box::new(value)));
        }
        self.or_expr()
    }

    fn binary_rhs(&mut self, next: fn(&mut Self) -> ScriptResult<Expr>) -> ScriptResult<Expr> {
        self.eat_newlines();
        next(self)
    }

    fn or_expr(&mut self) -> ScriptResult<Expr> {
        let mut left = self.and_expr()?;
        loop {
            let op = if self.at_word("or") {
                BinaryOp::Or
            } else if self.at_word("xor") {
                BinaryOp::Xor
            } else {
                return Ok(left);
            };
            self.advance();
            let right = self.binary_rhs(Self::and_expr)?;
            left = Expr::Binary(op, Box::new(left), Box::new(right));
        }
    }

    fn and_expr(&mut self) -> ScriptResult<Expr> {
        let mut left = self.not_expr()?;
        while self.at_word("and") {
            self.advance();
            let right = self.binary_rhs(Self::not_expr)?;
            left = Expr::Binary(BinaryOp::And, Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn not_expr(&mut self) -> ScriptResult<Expr> {
        if self.at_word("not") {
            self.advance();
            let operand = self.nested(Self::not_expr)?;
            return Ok(Expr::Unary(UnaryOp::Not, Box::new(operand)));
        }
        self.comparison()
    }

    fn comparison(&mut self) -> ScriptResult<Expr> {
        let mut left = self.additive()?;
        loop {
            let op = match self.peek() {
                Token::EqEq => BinaryOp::Eq,
                Token::NotEq => BinaryOp::Ne,
                Token::Lt => BinaryOp::Lt,
                Token::Gt => BinaryOp::Gt,
                Token::Le => BinaryOp::Le,
                Token::Ge => BinaryOp::Ge,
                _ => return Ok(left),
            };
            self.advance();
            let right = self.binary_rhs(Self::additive)?;
            left = Expr::Binary(op, Box::new(left), Box::new(right));
        }
    }

    fn additive(&mut self) -> ScriptResult<Expr> {
        let mut left = self.multiplicative()?;
        loop {
            let op = match self.peek() {
                Token::Plus => BinaryOp::Add,
                Token::Minus => BinaryOp::Sub,
                _ => return Ok(left),
            };
            self.advance();
            let right = self.binary_rhs(Self::multiplicative)?;
            left = Expr::Binary(op, Box::new(left), Box::new(right));
        }
    }

    fn multiplicative(&mut self) -> ScriptResult<Expr> {
        let mut left = self.unary()?;
        loop {
            let op = match self.peek() {
                Token::Star => BinaryOp::Mul,
                Token::Slash => BinaryOp::Div,
                Token::Word(w) if w == "div" => BinaryOp::IntDiv,
                Token::Word(w) if w == "mod" => BinaryOp::Mod,
                _ => return Ok(left),
            };
            self.advance();
            let right = self.binary_rhs(Self::unary)?;
            left = Expr::Binary(op, Box::new(left), Box::new(right));
        }
    }

    /// Every nested expression passes through here, so this is where the
    /// nesting depth is counted.
    fn unary(&mut self) -> ScriptResult<Expr> {
        self.nested(Self::unary_inner)
    }

    fn unary_inner(&mut self) -> ScriptResult<Expr> {
        if self.peek() == &Token::Minus {
            self.advance();
            let operand = self.unary()?;
            return Ok(match operand {
                Expr::Literal(Value::Int(i)) => Expr::Literal(Value::Int(-i)),
                Expr::Literal(Value::Double(d)) => Expr::Literal(Value::Double(-d)),
                other => Expr::Unary(UnaryOp::Neg, Box::new(other)),
            });
        }
        self.power()
    }

    fn power(&mut self) -> ScriptResult<Expr> {
        let base = self.postfix()?;
        if self.peek() == &Token::Caret {
            self.advance();
            let exponent = self.binary_rhs(Self::unary)?;
            return Ok(Expr::Binary(BinaryOp::Pow, Box::new(base), Box::new(exponent)));
        }
        Ok(base)
    }

    fn postfix(&mut self) -> ScriptResult<Expr> {
        let mut expr = self.primary()?;
        loop {
            match self.peek() {
                Token::LParen => {
                    self.advance();
                    let args = self.with_newlines(true, Self::call_args)?;
                    expr = Expr::Call {
                        callee: Box::new(expr),
                        args,
                    };
                }
                Token::Dot => {
                    self.advance();
                    let member = match self.advance() {
                        Token::Word(w) => ident_name(&w),
                        Token::Int(i) => i.to_string(),
                        other => {
                            return Err(self.error(format!(
                                "expected member name, found {}",
                                other.describe()
                            )))
                        }
                    };
                    expr = Expr::Member(Box::new(expr), member);
                }
                Token::LBracket => {
                    self.advance();
                    let index = self.with_newlines(true, |p| {
                        let index = p.statement()?;
                        p.expect(&Token::RBracket)?;
                        Ok(index)
                    })?;
                    expr = Expr::Index(Box::new(expr), Box::new(index));
                }
                _ => return Ok(expr),
            }
        }
    }

    /// Arguments after the opening parenthesis, through the closing one.
    fn call_args(&mut self) -> ScriptResult<Vec<CallArg>> {
        let mut args = Vec::new();
        let mut unnamed = false;
        while self.peek() != &Token::RParen {
            let named = match (self.peek(), self.peek_nth(1)) {
                (Token::Word(w), Token::Colon) => Some(ident_name(w)),
                _ => None,
            };
            let name = match named {
                Some(name) => {
                    self.advance();
                    self.advance();
                    name
                }
                None => {
                    if unnamed {
                        return Err(self.error("only one unnamed argument is allowed"));
                    }
                    unnamed = true;
                    INPUT.to_string()
                }
            };
            let value = self.statement()?;
            args.push(CallArg { name, value });
            if self.peek() == &Token::Comma {
                self.advance();
            } else if self.peek() != &Token::RParen {
                return Err(self.error(format!(
                    "expected ',' or ')', found {}",
                    self.peek().describe()
                )));
            }
        }
        self.advance();
        Ok(args)
    }

    fn primary(&mut self) -> ScriptResult<Expr> {
        let start = self.position();
        match self.advance() {
            Token::Int(i) => Ok(Expr::Literal(Value::Int(i))),
            Token::Double(d) => Ok(Expr::Literal(Value::Double(d))),
            Token::Str(pieces) => string_literal(pieces, self.depth, self.max_depth),
            Token::LParen => self.with_newlines(true, |p| {
                let inner = p.sequence()?;
                p.expect(&Token::RParen)?;
                Ok(inner)
            }),
            Token::LBracket => self.with_newlines(true, |p| {
                let mut items = Vec::new();
                while p.peek() != &Token::RBracket {
                    items.push(p.statement()?);
                    if p.peek() == &Token::Comma {
                        p.advance();
                    } else {
                        break;
                    }
                }
                p.expect(&Token::RBracket)?;
                Ok(Expr::List(items))
            }),
            Token::LBrace => self.with_newlines(false, |p| {
                let body = p.sequence()?;
                p.expect(&Token::RBrace)?;
                Ok(Expr::Closure(Rc::new(body)))
            }),
            Token::Word(w) => match w.as_str() {
                "true" => Ok(Expr::Literal(Value::Bool(true))),
                "false" => Ok(Expr::Literal(Value::Bool(false))),
                "nil" => Ok(Expr::Literal(Value::Default)),
                "if" => self.if_expr(),
                "for" => self.for_expr(),
                kw if KEYWORDS.contains(&kw) => {
                    Err(ScriptError::parse_at(format!("unexpected '{kw}'"), start))
                }
                _ => Ok(Expr::Var(ident_name(&w))),
            },
            other => Err(ScriptError::parse_at(
                format!("unexpected {}", other.describe()),
                start,
            )),
        }
    }

    fn if_expr(&mut self) -> ScriptResult<Expr> {
        self.eat_newlines();
        let cond = self.statement()?;
        self.expect_word("then")?;
        let then = self.statement()?;
        let otherwise = if matches!(self.peek_past_newlines(), Token::Word(w) if w == "else") {
            self.expect_word("else")?;
            Some(Box::new(self.statement()?))
        } else {
            None
        };
        Ok(Expr::If {
            cond: Box::new(cond),
            then: Box::new(then),
            otherwise,
        })
    }

    fn for_expr(&mut self) -> ScriptResult<Expr> {
        if self.at_word("each") {
            self.advance();
            let var = self.identifier()?;
            self.expect_word("in")?;
            let items = self.statement()?;
            self.expect_word("do")?;
            let body = self.statement()?;
            return Ok(Expr::ForEach {
                var,
                items: Box::new(items),
                body: Box::new(body),
            });
        }
        let var = self.identifier()?;
        self.expect_word("from")?;
        let from = self.statement()?;
        self.expect_word("to")?;
        let to = self.statement()?;
        self.expect_word("do")?;
        let body = self.statement()?;
        Ok(Expr::ForRange {
            var,
            from: Box::new(from),
            to: Box::new(to),
            body: Box::new(body),
        })
    }
}

/// Parse template text: literal text with `{...}` interpolations, as in
/// the body of a string literal.
pub fn parse_template(text: &str) -> ScriptResult<Expr> {
    string_literal(template_pieces(text, 0)?, 0, DEFAULT_MAX_CALL_DEPTH)
}

fn string_literal(pieces: Vec<StrPiece>, depth: usize, max_depth: usize) -> ScriptResult<Expr> {
    if let [StrPiece::Text(text)] = pieces.as_slice() {
        return Ok(Expr::Literal(Value::string(text)));
    }
    let parts = pieces
        .into_iter()
        .map(|piece| match piece {
            StrPiece::Text(text) => Ok(TemplatePart::Text(text)),
            StrPiece::Code(code, offset) => {
                parse_at(&code, offset, depth, max_depth).map(TemplatePart::Code)
            }
        })
        .collect::<ScriptResult<Vec<_>>>()?;
    Ok(Expr::Template(parts))
}

/// Parsed script together with its source text.
///
/// Serializes as the source text and is re-parsed on deserialization.
#[derive(Clone)]
pub struct Script {
    source: String,
    expr: Rc<Expr>,
}

impl Script {
    /// Parse `source`.
    pub fn parse(source: impl Into<String>) -> ScriptResult<Self> {
        let source = source.into();
        let expr = parse(&source)?;
        Ok(Self {
            source,
            expr: Rc::new(expr),
        })
    }

    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    #[must_use]
    pub fn expr(&self) -> &Rc<Expr> {
        &self.expr
    }
}

impl fmt::Debug for Script {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Script({:?})", self.source)
    }
}

impl PartialEq for Script {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

impl Eq for Script {}

impl Serialize for Script {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.source)
    }
}

impl<'de> Deserialize<'de> for Script {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let source = String::deserialize(deserializer)?;
        Script::parse(source).map_err(serde::de::Error::custom)
    }
}
