use std::collections::HashMap;
use std::fmt::{self, Display};

use once_cell::sync::Lazy;

/// (line, column) of the first character of a token. Lines start at 0 and
/// are bumped on every newline, columns restart at 0 after a newline.
pub type Position = (usize, usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Illegal,
    Eof,

    // Identifiers + literals
    Ident,
    Int,
    Float,
    String,
    Rune,
    Comment,

    // Operators
    Assign,
    Eq,
    NotEq,
    Plus,
    Minus,
    Asterisk,
    Slash,
    Bang,
    Lt,
    Gt,
    Lte,
    Gte,
    Inc,
    Dec,
    And,
    Or,

    // Delimiters
    Comma,
    Semicolon,
    Colon,
    DQuote,
    SQuote,
    LParen,
    RParen,
    LBrace,
    RBrace,
    LBracket,
    RBracket,

    // Keywords
    Function,
    Let,
    True,
    False,
    Return,
    If,
    Else,
    For,
    Magic,
}

impl Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            TokenKind::Illegal => "ILLEGAL",
            TokenKind::Eof => "EOF",
            TokenKind::Ident => "IDENT",
            TokenKind::Int => "INT",
            TokenKind::Float => "FLOAT",
            TokenKind::String => "STRING",
            TokenKind::Rune => "RUNE",
            TokenKind::Comment => "COMMENT",
            TokenKind::Assign => "=",
            TokenKind::Eq => "==",
            TokenKind::NotEq => "!=",
            TokenKind::Plus => "+",
            TokenKind::Minus => "-",
            TokenKind::Asterisk => "*",
            TokenKind::Slash => "/",
            TokenKind::Bang => "!",
            TokenKind::Lt => "<",
            TokenKind::Gt => ">",
            TokenKind::Lte => "<=",
            TokenKind::Gte => ">=",
            TokenKind::Inc => "++",
            TokenKind::Dec => "--",
            TokenKind::And => "&&",
            TokenKind::Or => "||",
            TokenKind::Comma => ",",
            TokenKind::Semicolon => ";",
            TokenKind::Colon => ":",
            TokenKind::DQuote => "\"",
            TokenKind::SQuote => "'",
            TokenKind::LParen => "(",
            TokenKind::RParen => ")",
            TokenKind::LBrace => "{",
            TokenKind::RBrace => "}",
            TokenKind::LBracket => "[",
            TokenKind::RBracket => "]",
            TokenKind::Function => "FUNCTION",
            TokenKind::Let => "LET",
            TokenKind::True => "TRUE",
            TokenKind::False => "FALSE",
            TokenKind::Return => "RETURN",
            TokenKind::If => "IF",
            TokenKind::Else => "ELSE",
            TokenKind::For => "FOR",
            TokenKind::Magic => "MAGIC",
        };
        f.write_str(repr)
    }
}

static KEYWORDS: Lazy<HashMap<&'static str, TokenKind>> = Lazy::new(|| {
    let mut m = HashMap::new();

    m.insert("fn", TokenKind::Function);
    m.insert("let", TokenKind::Let);
    m.insert("true", TokenKind::True);
    m.insert("false", TokenKind::False);
    m.insert("return", TokenKind::Return);
    m.insert("if", TokenKind::If);
    m.insert("else", TokenKind::Else);
    m.insert("for", TokenKind::For);
    m.insert("magic", TokenKind::Magic);

    m
});

/// Classify an identifier-shaped lexeme as either a keyword or an `Ident`.
pub fn lookup_ident(ident: &str) -> TokenKind {
    KEYWORDS.get(ident).copied().unwrap_or(TokenKind::Ident)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub literal: String,
    pub position: Position,
}

impl Token {
    pub fn new(kind: TokenKind, literal: impl Into<String>, position: Position) -> Self {
        Self {
            kind,
            literal: literal.into(),
            position,
        }
    }

    /// The token every synthesized AST node carries when it has no source
    /// counterpart (e.g. literals spliced in by `unquote`).
    pub fn synthesized(kind: TokenKind, literal: impl Into<String>) -> Self {
        Self::new(kind, literal, (0, 0))
    }
}
