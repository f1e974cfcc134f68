// flux lexer -- tokenizer for the TypeScript subset the language service reads.

mod cursor;

use cursor::Cursor;
use flux_common::error::{LexError, LexErrorKind};
use flux_common::span::Span;
use flux_common::token::{keyword_from_str, Token, TokenKind};

/// The flux lexer. Converts source text into a stream of tokens.
///
/// Whitespace and comments are emitted as trivia tokens rather than dropped,
/// so a parser that re-emits every token produces a lossless tree whose
/// offsets equal source offsets. Implements `Iterator<Item = Token>` so
/// callers can consume tokens lazily or collect them into a `Vec`.
pub struct Lexer<'src> {
    cursor: Cursor<'src>,
    /// Whether we have already emitted the `Eof` token.
    emitted_eof: bool,
    /// Errors collected during lexing (never aborts the token stream).
    errors: Vec<LexError>,
}

impl<'src> Lexer<'src> {
    /// Create a new lexer for the given source text.
    pub fn new(source: &'src str) -> Self {
        Self {
            cursor: Cursor::new(source),
            emitted_eof: false,
            errors: Vec::new(),
        }
    }

    /// Convenience: tokenize the entire source into a `Vec<Token>`.
    ///
    /// The returned vector includes the final `Eof` token.
    pub fn tokenize(source: &str) -> Vec<Token> {
        Lexer::new(source).collect()
    }

    /// Tokenize and also return the collected lexer errors.
    pub fn tokenize_with_errors(source: &str) -> (Vec<Token>, Vec<LexError>) {
        let mut lexer = Lexer::new(source);
        let mut tokens = Vec::new();
        while let Some(token) = lexer.next() {
            tokens.push(token);
        }
        (tokens, lexer.errors)
    }

    /// Produce the next token from the source.
    fn next_token(&mut self) -> Token {
        let start = self.cursor.pos();

        let Some(c) = self.cursor.peek() else {
            return Token::new(TokenKind::Eof, start, start);
        };

        match c {
            // ── Trivia ───────────────────────────────────────────────────
            ' ' | '\t' | '\r' | '\n' => {
                self.cursor
                    .eat_while(|c| c == ' ' || c == '\t' || c == '\r' || c == '\n');
                Token::new(TokenKind::Whitespace, start, self.cursor.pos())
            }

            // ── Single-character delimiters ──────────────────────────────
            '(' => self.single_char_token(TokenKind::LParen, start),
            ')' => self.single_char_token(TokenKind::RParen, start),
            '[' => self.single_char_token(TokenKind::LBracket, start),
            ']' => self.single_char_token(TokenKind::RBracket, start),
            '{' => self.single_char_token(TokenKind::LBrace, start),
            '}' => self.single_char_token(TokenKind::RBrace, start),
            ',' => self.single_char_token(TokenKind::Comma, start),
            ';' => self.single_char_token(TokenKind::Semicolon, start),
            ':' => self.single_char_token(TokenKind::Colon, start),
            '%' => self.single_char_token(TokenKind::Percent, start),
            '*' => self.single_char_token(TokenKind::Star, start),

            // ── Multi-character operators ────────────────────────────────
            '=' => self.lex_eq(start),
            '!' => self.lex_bang(start),
            '<' => self.lex_lt(start),
            '>' => self.lex_gt(start),
            '&' => self.lex_amp(start),
            '|' => self.lex_pipe(start),
            '+' => self.single_char_token(TokenKind::Plus, start),
            '-' => self.single_char_token(TokenKind::Minus, start),
            '?' => self.single_char_token(TokenKind::Question, start),
            '.' => self.lex_dot(start),

            // ── Comments or division ─────────────────────────────────────
            '/' => self.lex_slash(start),

            // ── Literals ─────────────────────────────────────────────────
            '0'..='9' => self.lex_number(start),
            '\'' | '"' => self.lex_string(start, c),

            // ── Identifiers and keywords ─────────────────────────────────
            c if is_ident_start(c) => self.lex_ident(start),

            // ── Unknown character (error recovery) ───────────────────────
            _ => {
                self.cursor.advance();
                let span = Span::new(start, self.cursor.pos());
                self.errors
                    .push(LexError::new(LexErrorKind::UnexpectedCharacter(c), span));
                Token::new(TokenKind::Error, start, self.cursor.pos())
            }
        }
    }

    // ── Helpers ──────────────────────────────────────────────────────────

    /// Consume one character and return a token of the given kind.
    fn single_char_token(&mut self, kind: TokenKind, start: u32) -> Token {
        self.cursor.advance();
        Token::new(kind, start, self.cursor.pos())
    }

    /// `=` -> `Eq`, `==` -> `EqEq`, `===` -> `EqEqEq`, `=>` -> `FatArrow`
    fn lex_eq(&mut self, start: u32) -> Token {
        self.cursor.advance(); // consume '='
        match self.cursor.peek() {
            Some('=') => {
                self.cursor.advance();
                if self.cursor.peek() == Some('=') {
                    self.cursor.advance();
                    Token::new(TokenKind::EqEqEq, start, self.cursor.pos())
                } else {
                    Token::new(TokenKind::EqEq, start, self.cursor.pos())
                }
            }
            Some('>') => {
                self.cursor.advance();
                Token::new(TokenKind::FatArrow, start, self.cursor.pos())
            }
            _ => Token::new(TokenKind::Eq, start, self.cursor.pos()),
        }
    }

    /// `!` -> `Bang`, `!=` -> `NotEq`, `!==` -> `NotEqEq`
    fn lex_bang(&mut self, start: u32) -> Token {
        self.cursor.advance(); // consume '!'
        if self.cursor.peek() == Some('=') {
            self.cursor.advance();
            if self.cursor.peek() == Some('=') {
                self.cursor.advance();
                Token::new(TokenKind::NotEqEq, start, self.cursor.pos())
            } else {
                Token::new(TokenKind::NotEq, start, self.cursor.pos())
            }
        } else {
            Token::new(TokenKind::Bang, start, self.cursor.pos())
        }
    }

    /// `<` -> `Lt`, `<=` -> `LtEq`
    fn lex_lt(&mut self, start: u32) -> Token {
        self.cursor.advance(); // consume '<'
        if self.cursor.peek() == Some('=') {
            self.cursor.advance();
            Token::new(TokenKind::LtEq, start, self.cursor.pos())
        } else {
            Token::new(TokenKind::Lt, start, self.cursor.pos())
        }
    }

    /// `>` -> `Gt`, `>=` -> `GtEq`
    fn lex_gt(&mut self, start: u32) -> Token {
        self.cursor.advance(); // consume '>'
        if self.cursor.peek() == Some('=') {
            self.cursor.advance();
            Token::new(TokenKind::GtEq, start, self.cursor.pos())
        } else {
            Token::new(TokenKind::Gt, start, self.cursor.pos())
        }
    }

    /// `&&` -> `AmpAmp`, single `&` -> `Amp` (intersection types)
    fn lex_amp(&mut self, start: u32) -> Token {
        self.cursor.advance(); // consume '&'
        if self.cursor.peek() == Some('&') {
            self.cursor.advance();
            Token::new(TokenKind::AmpAmp, start, self.cursor.pos())
        } else {
            Token::new(TokenKind::Amp, start, self.cursor.pos())
        }
    }

    /// `||` -> `PipePipe`, single `|` -> `Bar` (union types)
    fn lex_pipe(&mut self, start: u32) -> Token {
        self.cursor.advance(); // consume '|'
        if self.cursor.peek() == Some('|') {
            self.cursor.advance();
            Token::new(TokenKind::PipePipe, start, self.cursor.pos())
        } else {
            Token::new(TokenKind::Bar, start, self.cursor.pos())
        }
    }

    /// `.` -> `Dot`, `...` -> `DotDotDot`
    fn lex_dot(&mut self, start: u32) -> Token {
        self.cursor.advance(); // consume '.'
        if self.cursor.peek() == Some('.') && self.cursor.peek_next() == Some('.') {
            self.cursor.advance();
            self.cursor.advance();
            Token::new(TokenKind::DotDotDot, start, self.cursor.pos())
        } else {
            Token::new(TokenKind::Dot, start, self.cursor.pos())
        }
    }

    /// `//` line comment, `/* */` block comment, or `/` division.
    fn lex_slash(&mut self, start: u32) -> Token {
        self.cursor.advance(); // consume '/'
        match self.cursor.peek() {
            Some('/') => {
                self.cursor.eat_while(|c| c != '\n');
                Token::new(TokenKind::Comment, start, self.cursor.pos())
            }
            Some('*') => {
                self.cursor.advance(); // consume '*'
                let mut closed = false;
                while let Some(c) = self.cursor.advance() {
                    if c == '*' && self.cursor.peek() == Some('/') {
                        self.cursor.advance();
                        closed = true;
                        break;
                    }
                }
                if !closed {
                    self.errors.push(LexError::new(
                        LexErrorKind::UnterminatedBlockComment,
                        Span::new(start, self.cursor.pos()),
                    ));
                }
                Token::new(TokenKind::Comment, start, self.cursor.pos())
            }
            _ => Token::new(TokenKind::Slash, start, self.cursor.pos()),
        }
    }

    /// Numeric literal: digits with optional fraction and exponent.
    fn lex_number(&mut self, start: u32) -> Token {
        self.cursor.eat_while(|c| c.is_ascii_digit());
        if self.cursor.peek() == Some('.')
            && self.cursor.peek_next().is_some_and(|c| c.is_ascii_digit())
        {
            self.cursor.advance(); // consume '.'
            self.cursor.eat_while(|c| c.is_ascii_digit());
        }
        if matches!(self.cursor.peek(), Some('e') | Some('E')) {
            if let Some(next) = self.cursor.peek_next() {
                if next.is_ascii_digit() || next == '+' || next == '-' {
                    self.cursor.advance(); // consume 'e'
                    if matches!(self.cursor.peek(), Some('+') | Some('-')) {
                        self.cursor.advance();
                    }
                    self.cursor.eat_while(|c| c.is_ascii_digit());
                }
            }
        }
        Token::new(TokenKind::Number, start, self.cursor.pos())
    }

    /// String literal delimited by `quote`. The token text includes the
    /// quotes. Unterminated strings end at the newline or EOF and are
    /// recorded as errors but still produce a String token, so a half-typed
    /// line keeps parsing.
    fn lex_string(&mut self, start: u32, quote: char) -> Token {
        self.cursor.advance(); // consume opening quote
        let mut closed = false;
        while let Some(c) = self.cursor.peek() {
            if c == '\n' {
                break;
            }
            self.cursor.advance();
            if c == '\\' {
                // Escape: consume the escaped character blindly.
                self.cursor.advance();
                continue;
            }
            if c == quote {
                closed = true;
                break;
            }
        }
        if !closed {
            self.errors.push(LexError::new(
                LexErrorKind::UnterminatedString,
                Span::new(start, self.cursor.pos()),
            ));
        }
        Token::new(TokenKind::String, start, self.cursor.pos())
    }

    /// Identifier or keyword.
    fn lex_ident(&mut self, start: u32) -> Token {
        self.cursor.eat_while(is_ident_continue);
        let text = self.cursor.slice(start, self.cursor.pos());
        let kind = keyword_from_str(text).unwrap_or(TokenKind::Ident);
        Token::new(kind, start, self.cursor.pos())
    }
}

impl<'src> Iterator for Lexer<'src> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        if self.emitted_eof {
            return None;
        }
        let token = self.next_token();
        if token.kind == TokenKind::Eof {
            self.emitted_eof = true;
        }
        Some(token)
    }
}

/// Whether a character can start an identifier.
fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_' || c == '$'
}

/// Whether a character can continue an identifier.
fn is_ident_continue(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}
