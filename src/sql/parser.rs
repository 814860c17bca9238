//! SQL Parser
//!
//! This module parses SQL tokens into an AST. The grammar is deliberately
//! small:
//!
//! ```text
//! CREATE TABLE t (col TYPE [PRIMARY KEY] [UNIQUE], ...)
//! DROP TABLE t
//! INSERT INTO t VALUES (v, ...)
//! UPDATE t SET col = v, ... WHERE col = v
//! DELETE FROM t WHERE col = v
//! SELECT * | col, ... FROM t [WHERE col = v]
//! SELECT * | col, ... FROM a [INNER] JOIN b ON x = y [WHERE col = v]
//! ```
//!
//! Each may end with a single `;`. No schema lookups happen here.

use super::ast::*;
use super::lexer::Lexer;
use super::token::Token;
use crate::catalog::ColumnDefinition;
use crate::error::{Error, Result};
use crate::storage::Value;

/// Parse one statement from SQL text
pub fn parse(sql: &str) -> Result<Statement> {
    Parser::new(sql)?.parse()
}

/// SQL Parser
pub struct Parser {
    tokens: Vec<Token>,
    position: usize,
}

impl Parser {
    /// Create a new parser from a SQL string
    pub fn new(sql: &str) -> Result<Self> {
        let mut lexer = Lexer::new(sql);
        let tokens = lexer.tokenize()?;

        Ok(Self {
            tokens,
            position: 0,
        })
    }

    /// Parse a single SQL statement, requiring the input to end after it
    pub fn parse(&mut self) -> Result<Statement> {
        let stmt = self.parse_statement()?;

        // Consume optional semicolon
        if self.check(&Token::Semicolon) {
            self.advance();
        }

        if !self.is_at_end() {
            return Err(self.error("end of statement"));
        }

        Ok(stmt)
    }

    /// Parse a single statement
    fn parse_statement(&mut self) -> Result<Statement> {
        match self.current() {
            Token::Create => self.parse_create_table().map(Statement::CreateTable),
            Token::Drop => self.parse_drop_table().map(Statement::DropTable),
            Token::Insert => self.parse_insert().map(Statement::Insert),
            Token::Update => self.parse_update().map(Statement::Update),
            Token::Delete => self.parse_delete().map(Statement::Delete),
            Token::Select => self.parse_select(),
            _ => Err(self.error("CREATE, DROP, INSERT, UPDATE, DELETE or SELECT")),
        }
    }

    // ========== DDL Statements ==========

    fn parse_create_table(&mut self) -> Result<CreateTableStatement> {
        self.expect(&Token::Create)?;
        self.expect(&Token::Table)?;
        let table_name = self.expect_identifier("table name")?;

        self.expect(&Token::LParen)?;
        let mut columns = vec![self.parse_column_def()?];
        while self.check(&Token::Comma) {
            self.advance();
            columns.push(self.parse_column_def()?);
        }
        self.expect(&Token::RParen)?;

        Ok(CreateTableStatement {
            table_name,
            columns,
        })
    }

    fn parse_column_def(&mut self) -> Result<ColumnDefinition> {
        let name = self.expect_identifier("column name")?;
        let type_name = self.expect_identifier("type name")?;

        // Length suffix such as VARCHAR(100) is accepted and ignored
        if self.check(&Token::LParen) {
            self.advance();
            self.expect_integer()?;
            self.expect(&Token::RParen)?;
        }

        let mut column = ColumnDefinition::new(name, type_name);
        loop {
            match self.current() {
                Token::Primary => {
                    self.advance();
                    self.expect_word("KEY")?;
                    column = column.primary_key(true);
                }
                Token::Unique => {
                    self.advance();
                    column = column.unique(true);
                }
                Token::Comma | Token::RParen => break,
                _ => return Err(self.error("PRIMARY KEY, UNIQUE, ',' or ')'")),
            }
        }

        Ok(column)
    }

    fn parse_drop_table(&mut self) -> Result<DropTableStatement> {
        self.expect(&Token::Drop)?;
        self.expect(&Token::Table)?;
        let table_name = self.expect_identifier("table name")?;
        Ok(DropTableStatement { table_name })
    }

    // ========== DML Statements ==========

    fn parse_insert(&mut self) -> Result<InsertStatement> {
        self.expect(&Token::Insert)?;
        self.expect(&Token::Into)?;
        let table_name = self.expect_identifier("table name")?;
        self.expect(&Token::Values)?;

        self.expect(&Token::LParen)?;
        let mut values = vec![self.parse_literal()?];
        while self.check(&Token::Comma) {
            self.advance();
            values.push(self.parse_literal()?);
        }
        self.expect(&Token::RParen)?;

        Ok(InsertStatement { table_name, values })
    }

    fn parse_update(&mut self) -> Result<UpdateStatement> {
        self.expect(&Token::Update)?;
        let table_name = self.expect_identifier("table name")?;
        self.expect(&Token::Set)?;

        let mut assignments: Vec<Assignment> = Vec::new();
        loop {
            let column = self.parse_column_ref()?;
            if assignments
                .iter()
                .any(|a| a.column.column == column.column)
            {
                return Err(Error::syntax(
                    format!("column '{}' is assigned more than once", column.column),
                    column.to_string(),
                ));
            }
            self.expect_equals()?;
            let value = self.parse_literal()?;
            assignments.push(Assignment { column, value });

            if !self.check(&Token::Comma) {
                break;
            }
            self.advance();
        }

        let predicate = self.parse_required_where()?;

        Ok(UpdateStatement {
            table_name,
            assignments,
            predicate,
        })
    }

    fn parse_delete(&mut self) -> Result<DeleteStatement> {
        self.expect(&Token::Delete)?;
        self.expect(&Token::From)?;
        let table_name = self.expect_identifier("table name")?;
        let predicate = self.parse_required_where()?;
        Ok(DeleteStatement {
            table_name,
            predicate,
        })
    }

    // ========== SELECT Statement ==========

    fn parse_select(&mut self) -> Result<Statement> {
        self.expect(&Token::Select)?;
        let projection = self.parse_projection()?;
        self.expect(&Token::From)?;
        let table_name = self.expect_identifier("table name")?;

        if self.check(&Token::Inner) || self.check(&Token::Join) {
            let (right_table, left_column, right_column) = self.parse_join()?;
            let predicate = self.parse_optional_where()?;
            return Ok(Statement::SelectJoin(JoinSelectStatement {
                left_table: table_name,
                right_table,
                left_column,
                right_column,
                projection,
                predicate,
            }));
        }

        let predicate = self.parse_optional_where()?;
        Ok(Statement::Select(SelectStatement {
            table_name,
            projection,
            predicate,
        }))
    }

    fn parse_projection(&mut self) -> Result<Projection> {
        if self.check(&Token::Asterisk) {
            self.advance();
            return Ok(Projection::All);
        }

        let mut columns = vec![self.parse_column_ref()?];
        while self.check(&Token::Comma) {
            self.advance();
            columns.push(self.parse_column_ref()?);
        }
        Ok(Projection::Columns(columns))
    }

    /// `[INNER] JOIN table ON col = col`
    fn parse_join(&mut self) -> Result<(String, ColumnRef, ColumnRef)> {
        if self.check(&Token::Inner) {
            self.advance();
        }
        self.expect(&Token::Join)?;
        let right_table = self.expect_identifier("table name")?;
        self.expect(&Token::On)?;
        let left_column = self.parse_column_ref()?;
        self.expect_equals()?;
        let right_column = self.parse_column_ref()?;
        Ok((right_table, left_column, right_column))
    }

    // ========== Predicates ==========

    fn parse_required_where(&mut self) -> Result<Predicate> {
        self.expect(&Token::Where)?;
        self.parse_predicate()
    }

    fn parse_optional_where(&mut self) -> Result<Option<Predicate>> {
        if self.check(&Token::Where) {
            self.advance();
            return self.parse_predicate().map(Some);
        }
        Ok(None)
    }

    /// `column = literal`
    fn parse_predicate(&mut self) -> Result<Predicate> {
        let column = self.parse_column_ref()?;
        self.expect_equals()?;
        let value = self.parse_literal()?;
        Ok(Predicate { column, value })
    }

    fn parse_column_ref(&mut self) -> Result<ColumnRef> {
        let first = self.expect_identifier("column name")?;
        if self.check(&Token::Dot) {
            self.advance();
            let column = self.expect_identifier("column name")?;
            return Ok(ColumnRef::qualified(first, column));
        }
        Ok(ColumnRef::new(first))
    }

    fn parse_literal(&mut self) -> Result<Value> {
        let value = match self.current() {
            Token::IntegerLiteral(n) => Value::Integer(*n),
            Token::StringLiteral(s) => Value::Text(s.clone()),
            Token::True => Value::Boolean(true),
            Token::False => Value::Boolean(false),
            _ => return Err(self.error("literal value")),
        };
        self.advance();
        Ok(value)
    }

    // ========== Helpers ==========

    fn current(&self) -> &Token {
        self.tokens.get(self.position).unwrap_or(&Token::Eof)
    }

    fn advance(&mut self) {
        if self.position < self.tokens.len() {
            self.position += 1;
        }
    }

    fn is_at_end(&self) -> bool {
        matches!(self.current(), Token::Eof)
    }

    fn check(&self, token: &Token) -> bool {
        std::mem::discriminant(self.current()) == std::mem::discriminant(token)
    }

    fn expect(&mut self, token: &Token) -> Result<()> {
        if self.check(token) {
            self.advance();
            Ok(())
        } else {
            Err(self.error(&token.to_string()))
        }
    }

    fn expect_word(&mut self, keyword: &str) -> Result<()> {
        if self.current().is_word(keyword) {
            self.advance();
            Ok(())
        } else {
            Err(self.error(keyword))
        }
    }

    fn expect_equals(&mut self) -> Result<()> {
        self.expect(&Token::Eq)
    }

    fn expect_identifier(&mut self, what: &str) -> Result<String> {
        match self.current().clone() {
            Token::Identifier(name) => {
                self.advance();
                Ok(name)
            }
            _ => Err(self.error(what)),
        }
    }

    fn expect_integer(&mut self) -> Result<i64> {
        match self.current().clone() {
            Token::IntegerLiteral(n) => {
                self.advance();
                Ok(n)
            }
            _ => Err(self.error("integer")),
        }
    }

    /// Syntax error at the current token. Tokens outside the grammar get a
    /// message naming the unsupported feature instead of what was expected.
    fn error(&self, expected: &str) -> Error {
        let found = self.current();
        let message = match found {
            Token::And | Token::Or | Token::Not => {
                "boolean connectives are not supported".to_string()
            }
            Token::Null => "NULL values are not supported".to_string(),
            Token::Neq | Token::Lt | Token::Gt | Token::Lte | Token::Gte => {
                "only '=' comparisons are supported".to_string()
            }
            Token::Identifier(word) => match word.to_ascii_uppercase().as_str() {
                "LEFT" | "RIGHT" | "FULL" | "OUTER" | "CROSS" => {
                    "only INNER JOIN is supported".to_string()
                }
                clause @ ("ORDER" | "GROUP" | "LIMIT") => {
                    format!("{} clauses are not supported", clause)
                }
                _ => format!("expected {}", expected),
            },
            _ => format!("expected {}", expected),
        };
        Error::syntax(message, found.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn syntax_message(sql: &str) -> String {
        let err = parse(sql).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Syntax, "{}", err);
        err.to_string()
    }

    #[test]
    fn test_parse_create_table() {
        let stmt =
            parse("CREATE TABLE users (id INT PRIMARY KEY, email TEXT UNIQUE, name VARCHAR(64));")
                .unwrap();

        match stmt {
            Statement::CreateTable(s) => {
                assert_eq!(s.table_name, "users");
                assert_eq!(
                    s.columns,
                    vec![
                        ColumnDefinition::new("id", "INT").primary_key(true),
                        ColumnDefinition::new("email", "TEXT").unique(true),
                        ColumnDefinition::new("name", "VARCHAR"),
                    ]
                );
            }
            _ => panic!("Expected CREATE TABLE statement"),
        }
    }

    #[test]
    fn test_parse_create_keeps_unknown_type() {
        // Type names are resolved by the catalog, not the parser
        let stmt = parse("CREATE TABLE t (id FLOAT PRIMARY KEY)").unwrap();
        match stmt {
            Statement::CreateTable(s) => assert_eq!(s.columns[0].type_name, "FLOAT"),
            _ => panic!("Expected CREATE TABLE statement"),
        }
    }

    #[test]
    fn test_parse_drop_table() {
        assert_eq!(
            parse("drop table users").unwrap(),
            Statement::DropTable(DropTableStatement {
                table_name: "users".to_string()
            })
        );
    }

    #[test]
    fn test_parse_insert() {
        let stmt = parse("INSERT INTO users VALUES (1, 'Ann', TRUE, -5)").unwrap();
        assert_eq!(
            stmt,
            Statement::Insert(InsertStatement {
                table_name: "users".to_string(),
                values: vec![
                    Value::Integer(1),
                    Value::from("Ann"),
                    Value::Boolean(true),
                    Value::Integer(-5),
                ],
            })
        );
    }

    #[test]
    fn test_parse_update() {
        let stmt = parse("UPDATE users SET name = 'Bo', active = false WHERE id = 2").unwrap();

        match stmt {
            Statement::Update(s) => {
                assert_eq!(s.table_name, "users");
                assert_eq!(s.assignments.len(), 2);
                assert_eq!(s.assignments[0].column, ColumnRef::new("name"));
                assert_eq!(s.assignments[1].value, Value::Boolean(false));
                assert_eq!(
                    s.predicate,
                    Predicate {
                        column: ColumnRef::new("id"),
                        value: Value::Integer(2),
                    }
                );
            }
            _ => panic!("Expected UPDATE statement"),
        }
    }

    #[test]
    fn test_parse_delete() {
        let stmt = parse("DELETE FROM users WHERE email = 'a@x';").unwrap();
        match stmt {
            Statement::Delete(s) => {
                assert_eq!(s.table_name, "users");
                assert_eq!(s.predicate.value, Value::from("a@x"));
            }
            _ => panic!("Expected DELETE statement"),
        }
    }

    #[test]
    fn test_parse_select() {
        assert_eq!(
            parse("SELECT * FROM users").unwrap(),
            Statement::Select(SelectStatement {
                table_name: "users".to_string(),
                projection: Projection::All,
                predicate: None,
            })
        );

        let stmt = parse("SELECT name, users.id FROM users WHERE id = 1").unwrap();
        match stmt {
            Statement::Select(s) => {
                assert_eq!(
                    s.projection,
                    Projection::Columns(vec![
                        ColumnRef::new("name"),
                        ColumnRef::qualified("users", "id"),
                    ])
                );
                assert!(s.predicate.is_some());
            }
            _ => panic!("Expected SELECT statement"),
        }
    }

    #[test]
    fn test_parse_join() {
        let stmt =
            parse("SELECT * FROM orders INNER JOIN users ON user_id = users.id WHERE id = 3")
                .unwrap();

        match stmt {
            Statement::SelectJoin(s) => {
                assert_eq!(s.left_table, "orders");
                assert_eq!(s.right_table, "users");
                assert_eq!(s.left_column, ColumnRef::new("user_id"));
                assert_eq!(s.right_column, ColumnRef::qualified("users", "id"));
                assert!(s.predicate.is_some());
            }
            _ => panic!("Expected join SELECT statement"),
        }

        // INNER is optional
        assert!(matches!(
            parse("SELECT * FROM a JOIN b ON x = y").unwrap(),
            Statement::SelectJoin(_)
        ));
    }

    #[test]
    fn test_unknown_statement() {
        let msg = syntax_message("EXPLAIN SELECT * FROM t");
        assert!(msg.contains("expected CREATE, DROP"), "{}", msg);
        assert!(msg.contains("near 'EXPLAIN'"), "{}", msg);

        let msg = syntax_message("");
        assert!(msg.contains("near 'end of input'"), "{}", msg);
    }

    #[test]
    fn test_where_with_connective() {
        let msg = syntax_message("SELECT * FROM t WHERE a = 1 AND b = 2");
        assert_eq!(
            msg,
            "Syntax error: boolean connectives are not supported near 'AND'"
        );
    }

    #[test]
    fn test_non_equality_comparison() {
        let msg = syntax_message("DELETE FROM t WHERE a > 1");
        assert!(msg.contains("only '=' comparisons"), "{}", msg);
    }

    #[test]
    fn test_update_and_delete_require_where() {
        let msg = syntax_message("DELETE FROM t");
        assert!(msg.contains("expected WHERE"), "{}", msg);

        let msg = syntax_message("UPDATE t SET a = 1");
        assert!(msg.contains("expected WHERE"), "{}", msg);
    }

    #[test]
    fn test_duplicate_set_column() {
        let msg = syntax_message("UPDATE t SET a = 1, a = 2 WHERE id = 1");
        assert!(msg.contains("assigned more than once"), "{}", msg);
    }

    #[test]
    fn test_unsupported_clauses() {
        assert!(syntax_message("SELECT * FROM a LEFT JOIN b ON x = y").contains("INNER JOIN"));
        assert!(syntax_message("SELECT * FROM t ORDER BY id").contains("ORDER clauses"));
        assert!(syntax_message("INSERT INTO t VALUES (NULL)").contains("NULL values"));
    }

    #[test]
    fn test_contextual_keywords_as_names() {
        let stmt = parse("CREATE TABLE left (key INT PRIMARY key, Order TEXT)").unwrap();
        match stmt {
            Statement::CreateTable(s) => {
                assert_eq!(s.table_name, "left");
                assert_eq!(
                    s.columns,
                    vec![
                        ColumnDefinition::new("key", "INT").primary_key(true),
                        ColumnDefinition::new("Order", "TEXT"),
                    ]
                );
            }
            _ => panic!("Expected CREATE TABLE statement"),
        }

        let stmt = parse("SELECT limit FROM left JOIN t ON left.key = t.id").unwrap();
        assert!(matches!(stmt, Statement::SelectJoin(_)));

        let msg = syntax_message("CREATE TABLE t (id INT PRIMARY)");
        assert!(msg.contains("expected KEY"), "{}", msg);
    }

    #[test]
    fn test_trailing_input() {
        let msg = syntax_message("DROP TABLE t; DROP TABLE u");
        assert!(msg.contains("expected end of statement near 'DROP'"), "{}", msg);
    }

    #[test]
    fn test_where_requires_literal() {
        let msg = syntax_message("SELECT * FROM t WHERE a = b");
        assert!(msg.contains("expected literal value near 'b'"), "{}", msg);
    }
}
