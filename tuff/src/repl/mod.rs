//! REPL (Read-Eval-Print Loop) for Tuff

use crate::interp::Interpreter;
use crate::lexer::tokenize;
use crate::parser::parse;
use rustyline::error::ReadlineError;
use rustyline::{DefaultEditor, Result as RlResult};
use std::path::PathBuf;

const PROMPT: &str = "> ";
const HISTORY_FILE: &str = ".tuff_history";

/// REPL state
pub struct Repl {
    editor: DefaultEditor,
    interpreter: Interpreter,
    history_path: Option<PathBuf>,
}

impl Repl {
    /// Create a new REPL
    pub fn new() -> RlResult<Self> {
        let editor = DefaultEditor::new()?;
        let interpreter = Interpreter::new();

        let history_path = home_dir().map(|h| h.join(HISTORY_FILE));

        let mut repl = Repl {
            editor,
            interpreter,
            history_path,
        };

        if let Some(ref path) = repl.history_path {
            let _ = repl.editor.load_history(path);
        }

        Ok(repl)
    }

    /// Run the REPL
    pub fn run(&mut self) -> RlResult<()> {
        println!("Tuff REPL");
        println!("Type :help for help, :quit to exit.\n");

        loop {
            match self.editor.readline(PROMPT) {
                Ok(line) => {
                    let line = line.trim();

                    if line.is_empty() {
                        continue;
                    }

                    let _ = self.editor.add_history_entry(line);

                    if line.starts_with(':') {
                        if self.handle_command(line) {
                            break;
                        }
                        continue;
                    }

                    self.eval_input(line);
                }
                Err(ReadlineError::Interrupted) => {
                    println!("^C");
                    continue;
                }
                Err(ReadlineError::Eof) => {
                    println!("Goodbye!");
                    break;
                }
                Err(err) => {
                    eprintln!("Error: {err}");
                    break;
                }
            }
        }

        if let Some(ref path) = self.history_path {
            let _ = self.editor.save_history(path);
        }

        Ok(())
    }

    /// Handle REPL commands (starting with :)
    fn handle_command(&mut self, cmd: &str) -> bool {
        match cmd {
            ":quit" | ":q" | ":exit" => {
                println!("Goodbye!");
                true
            }
            ":help" | ":h" | ":?" => {
                self.print_help();
                false
            }
            ":clear" => {
                print!("\x1B[2J\x1B[1;1H");
                false
            }
            _ => {
                println!("Unknown command: {cmd}");
                println!("Type :help for help.");
                false
            }
        }
    }

    fn print_help(&self) {
        println!("Tuff REPL Commands:");
        println!("  :help, :h, :?   Show this help");
        println!("  :quit, :q       Exit the REPL");
        println!("  :clear          Clear the screen");
        println!();
        println!("You can enter:");
        println!("  - Expressions: 1 + 2, if (true) 1 else 2");
        println!("  - Declarations: let mut x = 0; fn add(a, b) => a + b;");
        println!("  - Function calls: add(1, 2)");
        println!();
        println!("Extern functions (declare before use):");
        println!("  extern fn print(value);");
        println!("  extern fn createArray<T>(length: USize): [T];");
    }

    /// Evaluate one line; definitions persist between lines
    fn eval_input(&mut self, input: &str) {
        let tokens = match tokenize(input) {
            Ok(tokens) => tokens,
            Err(e) => {
                eprintln!("{e}");
                return;
            }
        };
        let program = match parse(tokens) {
            Ok(program) => program,
            Err(e) => {
                eprintln!("{e}");
                return;
            }
        };
        match self.interpreter.run(&program) {
            Ok(value) => {
                let output = self.interpreter.take_output();
                if !output.is_empty() {
                    println!("{output}");
                } else {
                    let rendered = value.render();
                    if !rendered.is_empty() {
                        println!("{rendered}");
                    }
                }
            }
            Err(e) => {
                let _ = self.interpreter.take_output();
                eprintln!("{e}");
            }
        }
    }
}

fn home_dir() -> Option<PathBuf> {
    std::env::var_os("HOME").map(PathBuf::from)
}
