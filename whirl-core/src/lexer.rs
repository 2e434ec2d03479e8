//! Lexer for Whirl source.
//!
//! The lexer is pull-based: the parser asks for one token at a time and
//! may look at most one token ahead through [`Lexer::peek`].

use std::fmt;

use crate::error::CoreError;
use crate::span::Position;

/// Kind of a token produced by the lexer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // Special
    Eof,

    // Identifiers and literals
    Ident,
    IntLiteral,
    StringLiteral,
    CharLiteral,
    BoolLiteral, // true / false

    // Keywords
    If,
    Let,
    Until,
    Iter,
    Else,
    Proc,
    Continue,
    Escape,
    Break,
    Struct,
    In,
    Import,
    As,

    // Comparison and logic
    LessEqual,    // <=
    GreaterEqual, // >=
    EqualEqual,   // ==
    BangEqual,    // !=
    AndAnd,       // &&
    OrOr,         // ||
    Less,         // <
    Greater,      // >
    Bang,         // !

    // Punctuation
    DoubleColon, // ::
    Colon,       // :
    Comma,       // ,
    Semi,        // ;
    Equal,       // =
    LParen,      // (
    RParen,      // )
    LBrace,      // {
    RBrace,      // }
    LBracket,    // [
    RBracket,    // ]
    Dot,         // .

    // Arithmetic
    Plus,    // +
    Minus,   // -
    Star,    // *
    Slash,   // /
    Percent, // %

    // Primitive types
    Bool,
    Char,
    Void,
    Int,
    String,
}

/// Keywords, matched only when followed by a separator byte.
pub const KEYWORDS: &[TokenKind] = &[
    TokenKind::If,
    TokenKind::Let,
    TokenKind::Until,
    TokenKind::Iter,
    TokenKind::Else,
    TokenKind::Proc,
    TokenKind::Continue,
    TokenKind::Escape,
    TokenKind::Break,
    TokenKind::Struct,
    TokenKind::In,
    TokenKind::Import,
    TokenKind::As,
];

/// Operators and punctuation in match order. Every multi-byte spelling
/// precedes the shorter spellings that are its prefix.
pub const OPERATORS: &[TokenKind] = &[
    TokenKind::LessEqual,
    TokenKind::GreaterEqual,
    TokenKind::EqualEqual,
    TokenKind::BangEqual,
    TokenKind::AndAnd,
    TokenKind::OrOr,
    TokenKind::DoubleColon,
    TokenKind::Less,
    TokenKind::Greater,
    TokenKind::Bang,
    TokenKind::Colon,
    TokenKind::Comma,
    TokenKind::Semi,
    TokenKind::Equal,
    TokenKind::LParen,
    TokenKind::RParen,
    TokenKind::LBrace,
    TokenKind::RBrace,
    TokenKind::LBracket,
    TokenKind::RBracket,
    TokenKind::Dot,
    TokenKind::Plus,
    TokenKind::Minus,
    TokenKind::Star,
    TokenKind::Slash,
    TokenKind::Percent,
];

/// Primitive type names, separator-guarded like keywords.
pub const TYPES: &[TokenKind] = &[
    TokenKind::Bool,
    TokenKind::Char,
    TokenKind::Void,
    TokenKind::Int,
    TokenKind::String,
];

const BOOLEANS: &[&str] = &["false", "true"];

impl TokenKind {
    /// Fixed source spelling, for kinds that have one.
    pub const fn spelling(self) -> Option<&'static str> {
        use TokenKind::*;
        let text = match self {
            Eof | Ident | IntLiteral | StringLiteral | CharLiteral | BoolLiteral => return None,
            If => "if",
            Let => "let",
            Until => "until",
            Iter => "iter",
            Else => "else",
            Proc => "proc",
            Continue => "continue",
            Escape => "escape",
            Break => "break",
            Struct => "struct",
            In => "in",
            Import => "import",
            As => "as",
            LessEqual => "<=",
            GreaterEqual => ">=",
            EqualEqual => "==",
            BangEqual => "!=",
            AndAnd => "&&",
            OrOr => "||",
            Less => "<",
            Greater => ">",
            Bang => "!",
            DoubleColon => "::",
            Colon => ":",
            Comma => ",",
            Semi => ";",
            Equal => "=",
            LParen => "(",
            RParen => ")",
            LBrace => "{",
            RBrace => "}",
            LBracket => "[",
            RBracket => "]",
            Dot => ".",
            Plus => "+",
            Minus => "-",
            Star => "*",
            Slash => "/",
            Percent => "%",
            Bool => "bool",
            Char => "char",
            Void => "void",
            Int => "int",
            String => "string",
        };
        Some(text)
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.spelling() {
            Some(text) => write!(f, "'{text}'"),
            None => f.write_str(match self {
                TokenKind::Eof => "end of input",
                TokenKind::Ident => "identifier",
                TokenKind::IntLiteral => "integer literal",
                TokenKind::StringLiteral => "string literal",
                TokenKind::CharLiteral => "character literal",
                _ => "boolean literal",
            }),
        }
    }
}

/// A single token with its kind, source text and position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    /// Literal source text: identifier name, literal text including its
    /// quotes, or the keyword/operator spelling.
    pub value: String,
    pub position: Position,
}

impl Token {
    pub fn new(kind: TokenKind, value: impl Into<String>, position: Position) -> Self {
        Self {
            kind,
            value: value.into(),
            position,
        }
    }

    pub fn is(&self, kind: TokenKind) -> bool {
        self.kind == kind
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            TokenKind::Ident
            | TokenKind::IntLiteral
            | TokenKind::StringLiteral
            | TokenKind::CharLiteral
            | TokenKind::BoolLiteral => write!(f, "{} `{}`", self.kind, self.value),
            _ => fmt::Display::fmt(&self.kind, f),
        }
    }
}

/// Token iterator over one source buffer.
pub struct Lexer<'src> {
    source: &'src [u8],
    position: Position,
    /// Lookahead slot filled by `peek` and drained by `next_token`.
    pending: Option<Token>,
}

impl<'src> Lexer<'src> {
    pub fn new(source: &'src [u8]) -> Self {
        Self {
            source,
            position: Position::start(),
            pending: None,
        }
    }

    /// The buffer being lexed, for reading bytes a token's text cannot hold.
    pub fn source(&self) -> &'src [u8] {
        self.source
    }

    /// Consume and return the next token. Yields `Eof` forever once the
    /// input is exhausted.
    pub fn next_token(&mut self) -> Result<Token, CoreError> {
        match self.pending.take() {
            Some(token) => Ok(token),
            None => self.scan(),
        }
    }

    /// Return the next token without consuming it.
    pub fn peek(&mut self) -> Result<&Token, CoreError> {
        let token = match self.pending.take() {
            Some(token) => token,
            None => self.scan()?,
        };
        Ok(self.pending.insert(token))
    }

    fn scan(&mut self) -> Result<Token, CoreError> {
        self.skip_trivia();

        let start = self.position;
        let rest = self.rest();
        let Some(&first) = rest.first() else {
            return Ok(Token::new(TokenKind::Eof, "", start));
        };

        for &kind in KEYWORDS {
            if let Some(token) = self.lex_word(kind) {
                return Ok(token);
            }
        }

        for &kind in OPERATORS {
            if let Some(spelling) = kind.spelling() {
                if rest.starts_with(spelling.as_bytes()) {
                    return Ok(self.take(kind, spelling.len()));
                }
            }
        }

        for &kind in TYPES {
            if let Some(token) = self.lex_word(kind) {
                return Ok(token);
            }
        }

        for word in BOOLEANS {
            if self.word_at(word) {
                return Ok(self.take(TokenKind::BoolLiteral, word.len()));
            }
        }

        match first {
            b'"' => self.lex_string(),
            b'\'' if rest.len() >= 3 && rest[2] == b'\'' => Ok(self.take(TokenKind::CharLiteral, 3)),
            b'0'..=b'9' => {
                let len = rest.iter().take_while(|b| b.is_ascii_digit()).count();
                Ok(self.take(TokenKind::IntLiteral, len))
            }
            _ if is_ident_start(first) => {
                let len = rest.iter().take_while(|&&b| is_ident_continue(b)).count();
                Ok(self.take(TokenKind::Ident, len))
            }
            _ => Err(CoreError::Lex {
                position: start,
                message: format!("unknown symbol '{}'", first.escape_ascii()),
            }),
        }
    }

    fn lex_word(&mut self, kind: TokenKind) -> Option<Token> {
        let spelling = kind.spelling()?;
        if self.word_at(spelling) {
            Some(self.take(kind, spelling.len()))
        } else {
            None
        }
    }

    /// Whether `word` starts at the cursor and is followed by a separator
    /// byte or the end of input.
    fn word_at(&self, word: &str) -> bool {
        let rest = self.rest();
        rest.starts_with(word.as_bytes())
            && rest
                .get(word.len())
                .is_none_or(|&next| !is_ident_continue(next))
    }

    fn lex_string(&mut self) -> Result<Token, CoreError> {
        let rest = self.rest();
        match rest[1..].iter().position(|&b| b == b'"') {
            Some(close) => Ok(self.take(TokenKind::StringLiteral, close + 2)),
            None => Err(CoreError::Lex {
                position: self.position,
                message: "unterminated string literal".to_string(),
            }),
        }
    }

    fn take(&mut self, kind: TokenKind, len: usize) -> Token {
        let start = self.position;
        let bytes = &self.source[start.offset..start.offset + len];
        for &byte in bytes {
            self.position = self.position.advance(byte);
        }
        Token::new(kind, String::from_utf8_lossy(bytes), start)
    }

    fn skip_trivia(&mut self) {
        while let Some(&byte) = self.rest().first() {
            match byte {
                b' ' | b'\t' | b'\n' | b'\r' => self.position = self.position.advance(byte),
                b'#' => {
                    while let Some(&byte) = self.rest().first() {
                        if byte == b'\n' {
                            break;
                        }
                        self.position = self.position.advance(byte);
                    }
                }
                _ => break,
            }
        }
    }

    fn rest(&self) -> &'src [u8] {
        &self.source[self.position.offset..]
    }
}

/// Lex a whole buffer, including the trailing `Eof` token.
pub fn tokenize(source: &[u8]) -> Result<Vec<Token>, CoreError> {
    let mut lexer = Lexer::new(source);
    let mut tokens = Vec::new();
    loop {
        let token = lexer.next_token()?;
        let done = token.is(TokenKind::Eof);
        tokens.push(token);
        if done {
            return Ok(tokens);
        }
    }
}

fn is_ident_start(ch: u8) -> bool {
    ch.is_ascii_alphabetic() || ch == b'_'
}

fn is_ident_continue(ch: u8) -> bool {
    is_ident_start(ch) || ch.is_ascii_digit()
}
