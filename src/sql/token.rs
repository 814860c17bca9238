//! SQL Token definitions
//!
//! This module defines all tokens that can appear in SQL statements.
//! Some reserved keywords are never accepted by the parser; they are
//! recognized so the parser can reject them with a precise message.
//!
//! Words such as `KEY`, `ORDER` or `LEFT` are contextual: they lex as
//! identifiers, so they remain usable as table and column names, and the parser
//! matches them by position with [`Token::is_word`].

use std::fmt;

/// SQL Token types
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    // ========== Keywords ==========
    // DDL Keywords
    Create,
    Drop,
    Table,

    // DML Keywords
    Select,
    Insert,
    Update,
    Delete,
    Into,
    Values,
    Set,
    From,
    Where,

    // Joins
    On,
    Join,
    Inner,

    // Constraints
    Primary,
    Unique,

    // Unsupported clauses and connectives
    And,
    Or,
    Not,
    Null,

    // Boolean Literals
    True,
    False,

    // ========== Literals ==========
    /// Integer literal
    IntegerLiteral(i64),
    /// String literal (single-quoted)
    StringLiteral(String),
    /// Identifier (table name, column name, type name)
    Identifier(String),

    // ========== Operators ==========
    /// =
    Eq,
    /// <> or !=
    Neq,
    /// <
    Lt,
    /// >
    Gt,
    /// <=
    Lte,
    /// >=
    Gte,
    /// *
    Asterisk,

    // ========== Delimiters ==========
    /// (
    LParen,
    /// )
    RParen,
    /// ,
    Comma,
    /// ;
    Semicolon,
    /// .
    Dot,

    // ========== Special ==========
    /// End of input
    Eof,
}

impl Token {
    /// Check for a contextual keyword, case-insensitively
    pub fn is_word(&self, keyword: &str) -> bool {
        matches!(self, Token::Identifier(word) if word.eq_ignore_ascii_case(keyword))
    }

    /// Try to parse a keyword from a string
    pub fn from_keyword(s: &str) -> Option<Token> {
        match s.to_uppercase().as_str() {
            // DDL
            "CREATE" => Some(Token::Create),
            "DROP" => Some(Token::Drop),
            "TABLE" => Some(Token::Table),

            // DML
            "SELECT" => Some(Token::Select),
            "INSERT" => Some(Token::Insert),
            "UPDATE" => Some(Token::Update),
            "DELETE" => Some(Token::Delete),
            "INTO" => Some(Token::Into),
            "VALUES" => Some(Token::Values),
            "SET" => Some(Token::Set),
            "FROM" => Some(Token::From),
            "WHERE" => Some(Token::Where),

            // Joins
            "ON" => Some(Token::On),
            "JOIN" => Some(Token::Join),
            "INNER" => Some(Token::Inner),

            // Constraints
            "PRIMARY" => Some(Token::Primary),
            "UNIQUE" => Some(Token::Unique),

            "AND" => Some(Token::And),
            "OR" => Some(Token::Or),
            "NOT" => Some(Token::Not),
            "NULL" => Some(Token::Null),

            // Boolean Literals
            "TRUE" => Some(Token::True),
            "FALSE" => Some(Token::False),

            _ => None,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Create => write!(f, "CREATE"),
            Token::Drop => write!(f, "DROP"),
            Token::Table => write!(f, "TABLE"),
            Token::Select => write!(f, "SELECT"),
            Token::Insert => write!(f, "INSERT"),
            Token::Update => write!(f, "UPDATE"),
            Token::Delete => write!(f, "DELETE"),
            Token::Into => write!(f, "INTO"),
            Token::Values => write!(f, "VALUES"),
            Token::Set => write!(f, "SET"),
            Token::From => write!(f, "FROM"),
            Token::Where => write!(f, "WHERE"),
            Token::On => write!(f, "ON"),
            Token::Join => write!(f, "JOIN"),
            Token::Inner => write!(f, "INNER"),
            Token::Primary => write!(f, "PRIMARY"),
            Token::Unique => write!(f, "UNIQUE"),
            Token::And => write!(f, "AND"),
            Token::Or => write!(f, "OR"),
            Token::Not => write!(f, "NOT"),
            Token::Null => write!(f, "NULL"),
            Token::True => write!(f, "TRUE"),
            Token::False => write!(f, "FALSE"),
            Token::IntegerLiteral(n) => write!(f, "{}", n),
            Token::StringLiteral(s) => write!(f, "'{}'", s),
            Token::Identifier(s) => write!(f, "{}", s),
            Token::Eq => write!(f, "="),
            Token::Neq => write!(f, "<>"),
            Token::Lt => write!(f, "<"),
            Token::Gt => write!(f, ">"),
            Token::Lte => write!(f, "<="),
            Token::Gte => write!(f, ">="),
            Token::Asterisk => write!(f, "*"),
            Token::LParen => write!(f, "("),
            Token::RParen => write!(f, ")"),
            Token::Comma => write!(f, ","),
            Token::Semicolon => write!(f, ";"),
            Token::Dot => write!(f, "."),
            Token::Eof => write!(f, "end of input"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyword_parsing() {
        assert_eq!(Token::from_keyword("SELECT"), Some(Token::Select));
        assert_eq!(Token::from_keyword("select"), Some(Token::Select));
        assert_eq!(Token::from_keyword("SeLeCt"), Some(Token::Select));
        assert_eq!(Token::from_keyword("users"), None);
        // Type names stay identifiers
        assert_eq!(Token::from_keyword("INT"), None);
    }

    #[test]
    fn test_contextual_words() {
        assert_eq!(Token::from_keyword("key"), None);
        assert_eq!(Token::from_keyword("ORDER"), None);

        let word = Token::Identifier("Key".to_string());
        assert!(word.is_word("KEY"));
        assert!(!word.is_word("KEYS"));
        assert!(!Token::Primary.is_word("PRIMARY"));
    }
}
