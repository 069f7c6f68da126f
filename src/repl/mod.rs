use std::fs;
use std::io::{self, BufRead, Write};
use std::path::Path;

use colored::Colorize;
use log::debug;

use crate::interpreter::environment::Env;
use crate::interpreter::macros::{define_macros, expand_macros};
use crate::interpreter::object::Value;
use crate::interpreter::eval_program;
use crate::lexer::Lexer;
use crate::parser::{ParseError, Parser};

const PROMPT: &str = ">> ";

/// The interactive prompt loop. Every line is parsed, macro-expanded and
/// evaluated against the same pair of environments, so definitions persist
/// across inputs. Parse errors are printed and the loop continues; EOF ends
/// the session.
pub fn start(input: impl BufRead, mut output: impl Write) -> io::Result<()> {
    let env = Env::new();
    let macro_env = Env::new();

    let mut lines = input.lines();

    loop {
        write!(output, "{PROMPT}")?;
        output.flush()?;

        let Some(line) = lines.next().transpose()? else {
            return Ok(());
        };

        match run_source(&line, &env, &macro_env) {
            Ok(value) => {
                let rendered = value.to_string();
                let colored = match value {
                    Value::Null => rendered.bright_black(),
                    _ => rendered.yellow(),
                };
                writeln!(output, "{colored}")?;
            }
            Err(errors) => {
                for error in errors {
                    writeln!(output, "{error}")?;
                }
            }
        }
    }
}

/// Runs a source file once. Parse errors and a surfaced runtime error are
/// printed; everything else stays silent.
pub fn run_file(path: &Path) -> io::Result<()> {
    let source = fs::read_to_string(path)?;

    match run_source(&source, &Env::new(), &Env::new()) {
        Ok(value) => {
            if value.is_error() {
                println!("{value}");
            }
        }
        Err(errors) => {
            for error in errors {
                println!("{error}");
            }
        }
    }

    Ok(())
}

fn run_source(source: &str, env: &Env, macro_env: &Env) -> Result<Value, Vec<ParseError>> {
    let mut parser = Parser::new(Lexer::new(source));
    let mut program = parser.parse_program();

    if !parser.errors().is_empty() {
        return Err(parser.errors().to_vec());
    }

    debug!("evaluating {} statements", program.statements.len());

    define_macros(&mut program, macro_env);
    let program = expand_macros(program, macro_env);

    Ok(eval_program(&program, env))
}
