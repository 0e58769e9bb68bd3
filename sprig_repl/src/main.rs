use std::{path::PathBuf, process::ExitCode};

use clap::{Parser, ValueEnum};
use codesnake::{Block, CodeWidth, Label, LineIndex};
use sprig::{compile_with, Error, Program, ReadError, ReaderOptions};
use tracing_subscriber::EnvFilter;
use yansi::Paint;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Emit {
    /// Function listing followed by the top-level stream
    Opcodes,
    /// A JavaScript program for the stack interpreter
    Js,
}

#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Compile this file and exit instead of starting the REPL
    file: Option<PathBuf>,
    #[arg(long, value_enum, default_value_t = Emit::Opcodes)]
    emit: Emit,
    /// Leave n-ary arithmetic as written
    #[arg(long)]
    no_desugar: bool,
}

impl Args {
    fn reader_options(&self) -> ReaderOptions {
        ReaderOptions {
            desugar_arithmetic: !self.no_desugar,
        }
    }
}

fn render(program: &Program, emit: Emit) -> anyhow::Result<String> {
    Ok(match emit {
        Emit::Opcodes => program.to_string(),
        Emit::Js => program.to_javascript()?,
    })
}

fn read_error_block<'a>(idx: &'a LineIndex, err: &ReadError) -> Option<Block<&'a str, String>> {
    Block::new(
        idx,
        [Label::new(err.span())
            .with_text(err.to_string().red().to_string())
            .with_style(|s| s.red().to_string())],
    )
}

fn report(name: &str, source: &str, err: &Error) {
    match err {
        Error::Read(err) => {
            println!("{}: {err}", "error[read]".red().bold());
            let idx = LineIndex::new(source);
            if let Some(block) = read_error_block(&idx, err) {
                let block = block.map_code(|c| CodeWidth::new(c, c.len()));
                println!("{}[{name}]", block.prologue());
                print!("{block}");
                println!("{}", block.epilogue());
            }
        }
        Error::Compile(err) => {
            let class = format!("error[{}]", err.class());
            println!("{}: {err}", class.red().bold());
        }
    }
}

fn run_file(path: &PathBuf, args: &Args) -> anyhow::Result<ExitCode> {
    let source = std::fs::read_to_string(path)?;
    tracing::debug!(path = %path.display(), bytes = source.len(), "compiling file");

    match compile_with(&source, args.reader_options()) {
        Ok(program) => {
            println!("{}", render(&program, args.emit)?);
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => {
            report(&path.display().to_string(), &source, &err);
            Ok(ExitCode::FAILURE)
        }
    }
}

fn run_repl(args: &Args) -> anyhow::Result<ExitCode> {
    let mut readline = rustyline::DefaultEditor::new()?;

    while let Ok(input) = readline.readline(">> ") {
        if input.trim().is_empty() {
            continue;
        }
        readline.add_history_entry(input.as_str())?;

        match compile_with(&input, args.reader_options()) {
            Ok(program) => println!("{}", render(&program, args.emit)?),
            Err(err) => report("repl", &input, &err),
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn main() -> anyhow::Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    match &args.file {
        Some(path) => run_file(path, &args),
        None => run_repl(&args),
    }
}
