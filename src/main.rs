use std::io::Write;

use kopi::{error_string, storage::database::Database};
use rustyline::{DefaultEditor, Result, error::ReadlineError};

fn read_multiline_command(rl: &mut DefaultEditor) -> Result<String> {
    let mut input = String::new();
    let mut prompt = "kopi> ".to_string();

    loop {
        let readline = rl.readline(&prompt);
        match readline {
            Ok(line) => {
                let trimmed_line = line.trim_end();

                // Backslash at end of line continues the statement
                if trimmed_line.ends_with('\\') {
                    let mut line_without_backslash = trimmed_line.to_string();
                    line_without_backslash.pop();
                    input.push_str(&line_without_backslash);
                    input.push(' ');

                    prompt = "   -> ".to_string();
                } else {
                    input.push_str(trimmed_line);
                    break;
                }
            }
            Err(err) => return Err(err),
        }
    }

    Ok(input)
}

fn run_sql(db: &mut Database, sql: &str) {
    if sql
        .split_whitespace()
        .next()
        .is_some_and(|kw| kw.eq_ignore_ascii_case("SELECT"))
    {
        let mut printed_header = false;
        let mut row_count = 0u64;
        let result = db.query(sql, |columns, values| {
            if !printed_header {
                println!("{}", columns.join(" | "));
                printed_header = true;
            }
            println!("{}", values.join(" | "));
            row_count += 1;
        });
        match result {
            Ok(()) => println!("({} rows)", row_count),
            Err(err) => println!("{}: {}", error_string(err.code()), err),
        }
    } else {
        match db.exec(sql) {
            Ok(()) => println!("OK"),
            Err(err) => println!("{}: {}", error_string(err.code()), err),
        }
    }
}

fn process_command(db: &mut Database, command: &str) -> bool {
    let cmd = command.trim();

    match cmd.to_lowercase().as_str() {
        "exit" | "quit" | "q" => {
            println!("Goodbye!");
            return false;
        }
        "help" | "h" => {
            println!(
                r#"
Available commands:
  help, h          - Show this help message
  tables           - List tables in the catalog
  clear, ctrl + l  - Clear the screen
  exit, quit, q    - Exit the database

Use '\' at the end of a line for multiline input.
Use Up/Down arrows to navigate command history.
"#
            );
        }
        "tables" => {
            for name in db.table_names() {
                println!("{}", name);
            }
        }
        "clear" => {
            print!("\x1B[2J\x1B[1;1H");
            std::io::stdout().flush().unwrap();
        }
        "" => {}
        _ => run_sql(db, cmd),
    }

    true
}

fn main() -> Result<()> {
    let path = std::env::args().nth(1).unwrap_or_else(|| "kopi.db".to_string());
    println!("kopi {} (type 'help' for commands)", kopi::version());

    let mut db = Database::open(&path).expect("Failed to open database");

    let mut rl = DefaultEditor::new()?;
    let _ = rl.load_history("history.txt");

    loop {
        match read_multiline_command(&mut rl) {
            Ok(input) => {
                let command = input.trim().to_string();

                if !command.is_empty() {
                    rl.add_history_entry(&command)?;
                    if !process_command(&mut db, &command) {
                        break;
                    }
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("Interrupted");
                break;
            }
            Err(ReadlineError::Eof) => {
                println!("EOF");
                break;
            }
            Err(err) => {
                println!("Error: {:?}", err);
                break;
            }
        }
    }

    let _ = rl.save_history("history.txt");
    if let Err(err) = db.close() {
        println!("Error closing database: {}", err);
    }

    Ok(())
}
