//! Tuff CLI

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "tuff", version, about = "Tuff - a small expression language")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Interpret a Tuff source file and print its result
    Run {
        /// Source file to run
        file: PathBuf,
    },
    /// Parse and dump AST (debug)
    Parse {
        /// Source file to parse
        file: PathBuf,
    },
    /// Tokenize and dump tokens (debug)
    Tokens {
        /// Source file to tokenize
        file: PathBuf,
    },
    /// Start an interactive session
    Repl,
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Run { file } => run_file(&file),
        Command::Parse { file } => parse_file(&file),
        Command::Tokens { file } => tokenize_file(&file),
        Command::Repl => run_repl(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn run_file(path: &PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    let source = std::fs::read_to_string(path)?;
    let filename = path.display().to_string();

    match tuff::interpret(&source) {
        Ok(result) => {
            if result.ends_with('\n') {
                print!("{result}");
            } else {
                println!("{result}");
            }
            Ok(())
        }
        Err(tuff::Error::Compile(e)) => {
            tuff::error::report_error(&filename, &source, &e);
            std::process::exit(1);
        }
        Err(e) => Err(Box::new(e)),
    }
}

fn parse_file(path: &PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    let source = std::fs::read_to_string(path)?;
    let filename = path.display().to_string();

    let tokens = match tuff::lexer::tokenize(&source) {
        Ok(tokens) => tokens,
        Err(e) => {
            tuff::error::report_error(&filename, &source, &e);
            std::process::exit(1);
        }
    };
    let program = match tuff::parser::parse(tokens) {
        Ok(program) => program,
        Err(e) => {
            tuff::error::report_error(&filename, &source, &e);
            std::process::exit(1);
        }
    };

    println!("{}", serde_json::to_string_pretty(&program)?);
    Ok(())
}

fn tokenize_file(path: &PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    let source = std::fs::read_to_string(path)?;

    let tokens = tuff::lexer::tokenize(&source)?;
    for (token, span) in &tokens {
        println!("{:?} @ {}..{}", token, span.start, span.end);
    }

    Ok(())
}

fn run_repl() -> Result<(), Box<dyn std::error::Error>> {
    let mut repl = tuff::repl::Repl::new()?;
    repl.run()?;
    Ok(())
}
