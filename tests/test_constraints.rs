use tallydb::{Database, EngineConfig, Error, ErrorKind, Row, Value};
use tempfile::TempDir;

fn open(dir: &TempDir) -> Database {
    Database::open(EngineConfig::new().data_dir(dir.path()).sync_writes(false)).unwrap()
}

fn users_db(dir: &TempDir) -> Database {
    let mut db = open(dir);
    db.execute("CREATE TABLE Users (id INT PRIMARY KEY, email TEXT UNIQUE, name TEXT);")
        .unwrap();
    db.execute("INSERT INTO Users VALUES (1, 'a@x', 'Ann');")
        .unwrap();
    db.execute("INSERT INTO Users VALUES (2, 'b@x', 'Bob');")
        .unwrap();
    db
}

fn count(db: &mut Database, table: &str) -> usize {
    db.execute(&format!("SELECT * FROM {}", table))
        .unwrap()
        .rows
        .len()
}

#[test]
fn test_duplicate_primary_key_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let mut db = users_db(&dir);

    let err = db
        .execute("INSERT INTO Users VALUES (1, 'c@x', 'Cy')")
        .unwrap_err();
    match err {
        Error::ConstraintViolation { column, value } => {
            assert_eq!(column, "id");
            assert_eq!(value, "1");
        }
        other => panic!("Expected constraint violation, got {:?}", other),
    }

    assert_eq!(count(&mut db, "Users"), 2);
    // The rejected email was never indexed
    db.execute("INSERT INTO Users VALUES (3, 'c@x', 'Cy')").unwrap();
}

#[test]
fn test_insert_then_select_returns_row() {
    let dir = tempfile::tempdir().unwrap();
    let mut db = open(&dir);
    db.execute("CREATE TABLE Flags (id INT PRIMARY KEY, label TEXT, enabled BOOLEAN)")
        .unwrap();

    let result = db
        .execute("INSERT INTO Flags VALUES (-4, 'it''s', TRUE)")
        .unwrap();
    assert_eq!(result.affected_rows, 1);
    assert_eq!(result.message.as_deref(), Some("1 row(s) inserted"));

    let result = db.execute("SELECT * FROM Flags").unwrap();
    assert_eq!(result.columns, vec!["id", "label", "enabled"]);
    assert_eq!(
        result.rows,
        vec![Row::new(vec![
            Value::Integer(-4),
            Value::from("it's"),
            Value::Boolean(true),
        ])]
    );
}

#[test]
fn test_contextual_keywords_as_names() {
    let dir = tempfile::tempdir().unwrap();
    let mut db = open(&dir);
    db.execute("CREATE TABLE Log (key INT PRIMARY KEY, order TEXT UNIQUE, limit INT)")
        .unwrap();
    db.execute("INSERT INTO Log VALUES (1, 'first', 10)").unwrap();

    let result = db.execute("SELECT order, limit FROM Log WHERE key = 1").unwrap();
    assert_eq!(result.columns, vec!["order", "limit"]);
    assert_eq!(
        result.rows,
        vec![Row::new(vec![Value::from("first"), Value::Integer(10)])]
    );

    let err = db
        .execute("INSERT INTO Log VALUES (2, 'first', 20)")
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ConstraintViolation);

    // Reserved words are still rejected as names
    let err = db
        .execute("CREATE TABLE Flags (id INT PRIMARY KEY, on BOOL)")
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Syntax);
}

#[test]
fn test_unique_update_collision_leaves_row_unchanged() {
    let dir = tempfile::tempdir().unwrap();
    let mut db = users_db(&dir);

    let err = db
        .execute("UPDATE Users SET email = 'b@x' WHERE id = 1")
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ConstraintViolation);

    let result = db.execute("SELECT email FROM Users WHERE id = 1").unwrap();
    assert_eq!(result.rows, vec![Row::new(vec![Value::from("a@x")])]);

    // Index still points at the original holder
    let result = db.execute("SELECT id FROM Users WHERE email = 'b@x'").unwrap();
    assert_eq!(result.rows, vec![Row::new(vec![Value::Integer(2)])]);
}

#[test]
fn test_update_primary_key() {
    let dir = tempfile::tempdir().unwrap();
    let mut db = users_db(&dir);

    db.execute("UPDATE Users SET id = 10 WHERE email = 'a@x'")
        .unwrap();
    assert!(db
        .execute("SELECT * FROM Users WHERE id = 1")
        .unwrap()
        .rows
        .is_empty());
    db.execute("INSERT INTO Users VALUES (1, 'n@x', 'New')").unwrap();

    let err = db
        .execute("UPDATE Users SET id = 2 WHERE id = 10")
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ConstraintViolation);
}

#[test]
fn test_delete_without_match() {
    let dir = tempfile::tempdir().unwrap();
    let mut db = users_db(&dir);

    let result = db.execute("DELETE FROM Users WHERE id=999").unwrap();
    assert_eq!(result.affected_rows, 0);
    assert_eq!(count(&mut db, "Users"), 2);
}

#[test]
fn test_type_mismatch_in_where() {
    let dir = tempfile::tempdir().unwrap();
    let mut db = users_db(&dir);

    for sql in [
        "SELECT * FROM Users WHERE id = 'one'",
        "DELETE FROM Users WHERE name = 5",
        "UPDATE Users SET name = 'x' WHERE email = TRUE",
    ] {
        let err = db.execute(sql).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TypeMismatch, "{}", sql);
    }
    assert_eq!(count(&mut db, "Users"), 2);
}

#[test]
fn test_unknown_names() {
    let dir = tempfile::tempdir().unwrap();
    let mut db = users_db(&dir);

    let err = db.execute("SELECT * FROM Nobody").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::TableNotFound);

    let err = db.execute("SELECT age FROM Users").unwrap_err();
    assert_eq!(
        err.to_string(),
        "Catalog error: column 'age' not found in table 'Users'"
    );

    let err = db.execute("DROP TABLE Nobody").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::TableNotFound);
}

#[test]
fn test_rejected_statements_change_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let mut db = users_db(&dir);

    for sql in [
        "DELETE FROM Users WHERE id = 1 OR id = 2",
        "DELETE FROM Users",
        "UPDATE Users SET name = 'x' WHERE id > 0",
        "INSERT INTO Users VALUES (3, NULL, 'x')",
        "DROP TABLE Users extra",
        "SELECT * FROM Users LEFT JOIN Users ON id = id",
        "TRUNCATE Users",
        "INSERT INTO Users VALUES (3, 'unterminated",
    ] {
        let err = db.execute(sql).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Syntax, "{}", sql);
    }

    assert_eq!(db.list_tables(), vec!["Users"]);
    assert_eq!(count(&mut db, "Users"), 2);
}
