extern crate slang;

use clap::Parser as CParser;
use log::error;

use slang::repl;

#[derive(CParser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// Source file to run; starts the interactive prompt when omitted.
    file: Option<std::path::PathBuf>,
}

fn main() {
    simple_logger::init_with_level(log::Level::Warn).unwrap();
    let args = Cli::parse();

    if let Some(file) = args.file {
        if let Err(err) = repl::run_file(&file) {
            error!("could not read file '{}': {err}", file.to_string_lossy());
            std::process::exit(1);
        }
        return;
    }

    let username = std::env::var("USER")
        .or_else(|_| std::env::var("USERNAME"))
        .unwrap_or_else(|_| "there".to_owned());

    println!("Hello {username}! This is the Slang programming language!");
    println!("Feel free to type in commands");

    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    if let Err(err) = repl::start(stdin.lock(), stdout.lock()) {
        error!("repl terminated: {err}");
        std::process::exit(1);
    }
}
