//! SQL front end
//!
//! Lexer, parser and AST for the statement grammar.

pub mod ast;
pub mod lexer;
pub mod parser;
pub mod token;

pub use ast::{
    Assignment, ColumnRef, CreateTableStatement, DeleteStatement, DropTableStatement,
    InsertStatement, JoinSelectStatement, Predicate, Projection, SelectStatement, Statement,
    UpdateStatement,
};
pub use lexer::Lexer;
pub use parser::{parse, Parser};
pub use token::Token;
