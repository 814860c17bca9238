//! SQL Lexer (Tokenizer)
//!
//! This module converts SQL strings into a stream of tokens. The individual
//! token shapes are small `nom` parsers; the lexer tries them in turn at each
//! position after skipping whitespace and `--` comments.

use super::token::Token;
use crate::error::{Error, Result};
use nom::{
    branch::alt,
    bytes::complete::{tag, take_till},
    character::complete::{alpha1, alphanumeric1, char, digit1, multispace1, none_of},
    combinator::{map, opt, recognize, value},
    multi::{many0, many0_count},
    sequence::{delimited, pair},
    IResult,
};

/// Longest input excerpt quoted in a lexical error
const FRAGMENT_LEN: usize = 16;

/// SQL Lexer
pub struct Lexer<'a> {
    /// Remaining input
    input: &'a str,
}

impl<'a> Lexer<'a> {
    /// Create a new lexer for the given input
    pub fn new(input: &'a str) -> Self {
        Self { input }
    }

    /// Tokenize the entire input. The result always ends with [`Token::Eof`].
    pub fn tokenize(&mut self) -> Result<Vec<Token>> {
        let mut tokens = Vec::new();

        loop {
            let token = self.next_token()?;
            if token == Token::Eof {
                tokens.push(token);
                break;
            }
            tokens.push(token);
        }

        Ok(tokens)
    }

    /// Get the next token from the input
    pub fn next_token(&mut self) -> Result<Token> {
        if let Ok((rest, _)) = trivia(self.input) {
            self.input = rest;
        }

        let input = self.input;
        let Some(ch) = input.chars().next() else {
            return Ok(Token::Eof);
        };

        let (rest, token) = if ch == '\'' {
            string_literal(input)
                .map(|(rest, s)| (rest, Token::StringLiteral(s)))
                .map_err(|_| Error::syntax("unterminated string literal", fragment(input)))?
        } else if starts_number(input) {
            let (rest, digits) = integer(input)
                .map_err(|_| Error::syntax("invalid integer literal", fragment(input)))?;
            let n = digits
                .parse::<i64>()
                .map_err(|_| Error::syntax("invalid integer literal", digits))?;
            (rest, Token::IntegerLiteral(n))
        } else if let Ok((rest, text)) = word(input) {
            let token = Token::from_keyword(text)
                .unwrap_or_else(|| Token::Identifier(text.to_string()));
            (rest, token)
        } else if let Ok((rest, token)) = symbol(input) {
            (rest, token)
        } else {
            return Err(Error::syntax("unexpected character", ch.to_string()));
        };

        self.input = rest;
        Ok(token)
    }
}

/// Whitespace and `--` line comments
fn trivia(input: &str) -> IResult<&str, usize> {
    many0_count(alt((
        multispace1,
        recognize(pair(tag("--"), take_till(|c| c == '\n'))),
    )))(input)
}

/// Single-quoted string with `''` as an escaped quote
fn string_literal(input: &str) -> IResult<&str, String> {
    delimited(
        char('\''),
        map(
            many0(alt((value('\'', tag("''")), none_of("'")))),
            |chars: Vec<char>| chars.into_iter().collect(),
        ),
        char('\''),
    )(input)
}

fn starts_number(input: &str) -> bool {
    let mut chars = input.chars();
    match chars.next() {
        Some(c) if c.is_ascii_digit() => true,
        Some('-') => chars.next().map_or(false, |c| c.is_ascii_digit()),
        _ => false,
    }
}

fn integer(input: &str) -> IResult<&str, &str> {
    recognize(pair(opt(char('-')), digit1))(input)
}

/// `[A-Za-z_][A-Za-z0-9_]*`
fn word(input: &str) -> IResult<&str, &str> {
    recognize(pair(
        alt((alpha1, tag("_"))),
        many0_count(alt((alphanumeric1, tag("_")))),
    ))(input)
}

fn symbol(input: &str) -> IResult<&str, Token> {
    alt((
        value(Token::Lte, tag("<=")),
        value(Token::Gte, tag(">=")),
        value(Token::Neq, tag("<>")),
        value(Token::Neq, tag("!=")),
        value(Token::Lt, char('<')),
        value(Token::Gt, char('>')),
        value(Token::Eq, char('=')),
        value(Token::Asterisk, char('*')),
        value(Token::LParen, char('(')),
        value(Token::RParen, char(')')),
        value(Token::Comma, char(',')),
        value(Token::Semicolon, char(';')),
        value(Token::Dot, char('.')),
    ))(input)
}

fn fragment(input: &str) -> String {
    input.chars().take(FRAGMENT_LEN).collect()
}
