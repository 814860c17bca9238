//! TallyDB - CLI Client

use anyhow::{bail, Context};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::env;
use tracing_subscriber::EnvFilter;

use tallydb::output::{format_error, format_result, OutputFormat};
use tallydb::{Database, EngineConfig};

/// Print welcome banner
fn print_banner(config: &EngineConfig) {
    println!(
        r#"
 TallyDB - a small relational database engine in Rust
 Data directory: {}
 Type '.help' for help, '.quit' to exit
"#,
        config.data_dir.display()
    );
}

/// Print help message
fn print_help() {
    println!(
        r#"
Commands:
  .help               Show this help message
  .quit, .exit        Exit TallyDB
  .tables             List all tables
  .schema [table]     Show table schema
  .mode table|json    Set output format

SQL Commands (end each with ';'):
  CREATE TABLE t (col TYPE [PRIMARY KEY] [UNIQUE], ...)
  DROP TABLE t
  INSERT INTO t VALUES (v, ...)
  UPDATE t SET col = v, ... WHERE col = v
  DELETE FROM t WHERE col = v
  SELECT * | col, ... FROM t [WHERE col = v]
  SELECT * | col, ... FROM a [INNER] JOIN b ON x = y [WHERE col = v]

Types: INT, TEXT, BOOL

Examples:
  CREATE TABLE users (id INT PRIMARY KEY, email TEXT UNIQUE, name TEXT);
  INSERT INTO users VALUES (1, 'ann@example.com', 'Ann');
  SELECT name FROM users WHERE id = 1;
"#
    );
}

/// Parse command line flags into an engine config
fn parse_args(args: &[String]) -> anyhow::Result<EngineConfig> {
    let mut config = EngineConfig::new();
    let mut iter = args.iter().skip(1);

    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--data-dir" | "-d" => {
                let dir = iter.next().context("--data-dir needs a path")?;
                config = config.data_dir(dir);
            }
            "--no-sync" => config = config.sync_writes(false),
            "--help" | "-h" => {
                println!("Usage: tallydb [--data-dir <path>] [--no-sync]");
                std::process::exit(0);
            }
            other => bail!("unknown argument '{}'", other),
        }
    }

    Ok(config)
}

/// Interactive session state
struct Session {
    db: Database,
    format: OutputFormat,
}

impl Session {
    /// Execute a SQL statement and print its outcome
    fn execute_sql(&mut self, sql: &str) {
        let sql = sql.trim();
        if sql.is_empty() {
            return;
        }

        match self.db.execute(sql) {
            Ok(result) => print!("{}", format_result(&result, self.format)),
            Err(e) => eprint!("{}", format_error(&e, self.format)),
        }
    }

    /// Handle special dot commands. Returns false when the session should end.
    fn handle_special_command(&mut self, cmd: &str) -> bool {
        let parts: Vec<&str> = cmd.split_whitespace().collect();

        match parts.first().copied() {
            Some(".help") => print_help(),
            Some(".quit") | Some(".exit") => return false,
            Some(".tables") => {
                let tables = self.db.list_tables();
                if tables.is_empty() {
                    println!("No tables found.");
                } else {
                    for table in tables {
                        println!("  {}", table);
                    }
                }
            }
            Some(".schema") => {
                let tables = match parts.get(1) {
                    Some(table) => vec![table.to_string()],
                    None => self.db.list_tables(),
                };
                for table in tables {
                    match self.db.describe_table(&table) {
                        Ok(info) => println!("{}", info),
                        Err(e) => eprint!("{}", format_error(&e, self.format)),
                    }
                }
            }
            Some(".mode") => match parts.get(1).and_then(|m| OutputFormat::from_name(m)) {
                Some(format) => {
                    self.format = format;
                    println!("Output mode set to {:?}", format);
                }
                None => eprintln!("Usage: .mode table|json"),
            },
            Some(cmd) => {
                eprintln!("Unknown command: {}", cmd);
                eprintln!("Type '.help' for available commands.");
            }
            None => {}
        }
        true
    }
}

/// Main REPL loop
fn run_repl(config: EngineConfig) -> anyhow::Result<()> {
    let db = Database::open(config.clone()).with_context(|| {
        format!(
            "failed to open database in '{}'",
            config.data_dir.display()
        )
    })?;
    let mut session = Session {
        db,
        format: OutputFormat::Table,
    };
    let mut editor = DefaultEditor::new().context("failed to initialise line editor")?;

    print_banner(&config);

    let mut input_buffer = String::new();

    loop {
        let prompt = if input_buffer.is_empty() {
            "tallydb> "
        } else {
            "    ...> "
        };

        let line = match editor.readline(prompt) {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) => {
                input_buffer.clear();
                continue;
            }
            Err(ReadlineError::Eof) => break,
            Err(e) => return Err(anyhow::anyhow!("failed to read input: {}", e)),
        };

        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        let _ = editor.add_history_entry(trimmed);

        if input_buffer.is_empty() && trimmed.starts_with('.') {
            if !session.handle_special_command(trimmed) {
                break;
            }
            continue;
        }

        input_buffer.push_str(&line);
        input_buffer.push('\n');

        // Statement is complete once it ends with a semicolon
        if trimmed.ends_with(';') {
            let sql = std::mem::take(&mut input_buffer);
            session.execute_sql(&sql);
        }
    }

    println!("Goodbye!");
    Ok(())
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_target(false)
        .init();

    let args: Vec<String> = env::args().collect();
    let config = parse_args(&args)?;
    run_repl(config)
}
