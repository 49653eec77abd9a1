use std::{
    env::{self, args_os},
    fmt::Display,
    fs,
    io::{self, stdin, stdout, IsTerminal},
    path::Path,
    process::ExitCode,
};

use rustyline::validate::MatchingBracketValidator;
use rustyline::Editor;
use rustyline::{
    error::ReadlineError, Cmd, ConditionalEventHandler, Event, EventContext, EventHandler,
    Highlighter, KeyEvent, Movement, RepeatCount,
};
use rustyline::{Completer, Helper, Hinter, Validator};
use std::error::Error;

use wabbit::ast::Stmt;
use wabbit::error::ErrorKind;
use wabbit::format::format_program;
use wabbit::parser::Parser;
use wabbit::scanner;
use wabbit::treewalk::interpreter::{InterpretErr, Interpreter};
use wabbit::vm::{chunk::Chunk, compiler::compile, machine::Vm};

const USAGE: &str = "usage: wabbit [run|format|tokens|vm|disasm <file>]";

fn main() -> ExitCode {
    init_tracing();

    let args: Vec<_> = args_os().skip(1).collect();
    let result = match args.as_slice() {
        [] if !stdin().is_terminal() => run_piped(),
        [] => {
            return if let Err(err) = run_prompt() {
                eprintln!("error: {err}");
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
        }
        [mode, path] => match mode.to_str() {
            Some(mode @ ("run" | "format" | "tokens" | "vm" | "disasm")) => {
                run_mode(mode, Path::new(path))
            }
            _ => Err(Failure::Usage),
        },
        _ => Err(Failure::Usage),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(Failure::Usage) => {
            eprintln!("{USAGE}");
            ExitCode::FAILURE
        }
        Err(Failure::Error(kind, message)) => {
            eprintln!("error[{kind}]: {message}");
            ExitCode::FAILURE
        }
    }
}

/// Installs a stderr subscriber, but only if `RUST_LOG` asks for one.
fn init_tracing() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    if env::var_os("RUST_LOG").is_some() {
        tracing_subscriber::registry()
            .with(fmt::layer().with_writer(io::stderr))
            .with(EnvFilter::from_default_env())
            .init();
    }
}

enum Failure {
    Usage,
    Error(ErrorKind, String),
}

impl Failure {
    fn new(kind: ErrorKind, err: impl Display) -> Self {
        Failure::Error(kind, err.to_string())
    }
}

impl From<InterpretErr> for Failure {
    fn from(err: InterpretErr) -> Self {
        Failure::new(err.kind(), err)
    }
}

fn run_mode(mode: &str, path: &Path) -> Result<(), Failure> {
    let content = fs::read_to_string(path).map_err(|err| {
        Failure::new(ErrorKind::IoError, format!("{}: {err}", path.display()))
    })?;

    match mode {
        "run" => Interpreter::new().run(&content)?,
        "format" => print!("{}", format_program(&parse(&content)?)),
        "tokens" => {
            for token in scanner::scan(&content) {
                println!("{token}");
            }
        }
        "vm" => {
            let chunk = compile_source(&content)?;
            Vm::new(&chunk)
                .run(&mut stdout().lock())
                .map_err(|err| Failure::new(err.kind(), err))?;
        }
        "disasm" => print!("{}", compile_source(&content)?.disassemble()),
        _ => return Err(Failure::Usage),
    }
    Ok(())
}

/// Runs a whole program read from a non-interactive stdin.
fn run_piped() -> Result<(), Failure> {
    let content = io::read_to_string(stdin().lock())
        .map_err(|err| Failure::new(ErrorKind::IoError, format!("stdin: {err}")))?;
    Interpreter::new().run(&content)?;
    Ok(())
}

fn parse(content: &str) -> Result<Vec<Stmt>, Failure> {
    let tokens = scanner::scan(content);
    scanner::check(&tokens).map_err(InterpretErr::from)?;
    Ok(Parser::new(&tokens).parse().map_err(InterpretErr::from)?)
}

fn compile_source(content: &str) -> Result<Chunk, Failure> {
    compile(&parse(content)?).map_err(|err| Failure::new(err.kind(), err))
}

struct TabEventHandler;
impl ConditionalEventHandler for TabEventHandler {
    fn handle(&self, _: &Event, _n: RepeatCount, _: bool, _: &EventContext) -> Option<Cmd> {
        Some(Cmd::Indent(Movement::WholeLine))
    }
}

#[derive(Helper, Completer, Hinter, Highlighter, Validator)]
struct PromptHelper {
    #[rustyline(Completer)]
    completer: (),
    #[rustyline(Validator)]
    validator: MatchingBracketValidator,
}

fn report(err: &InterpretErr) {
    eprintln!("error[{}]: {err}", err.kind());
}

fn run_prompt() -> Result<(), Box<dyn Error>> {
    let mut interpreter = Interpreter::new();
    let h = PromptHelper {
        completer: (),
        validator: MatchingBracketValidator::new(),
    };
    let mut rl = Editor::new()?;
    rl.set_helper(Some(h));
    rl.bind_sequence(
        KeyEvent::from('\t'),
        EventHandler::Conditional(Box::new(TabEventHandler)),
    );

    loop {
        match rl.readline("> ") {
            Ok(line) => {
                let _ = rl.add_history_entry(line.as_str());
                if let Err(err) = interpreter.run(&line) {
                    report(&err);
                }
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => return Ok(()),
            Err(err) => break Err(Box::new(err)),
        }
    }
}
