//! CLI tool to inspect and check Eidos scripts.

use std::fs;
use std::process::ExitCode;

use eidos_syntax::{Script, ScriptOptions};
use tracing_subscriber::EnvFilter;

fn usage() -> ExitCode {
    eprintln!("Usage: eidos <command> [--keep] [--verbose] [files...]");
    eprintln!();
    eprintln!("Commands:");
    eprintln!("  tokens    Print the token stream of each script");
    eprintln!("  ast       Print the syntax tree of each script");
    eprintln!("  check     Check if script(s) parse");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --keep        Keep whitespace and comment tokens");
    eprintln!("  -v, --verbose Log every stage to stderr");
    eprintln!();
    eprintln!("Examples:");
    eprintln!("  eidos check model.eidos");
    eprintln!("  eidos tokens --keep model.eidos");
    eprintln!("  RUST_LOG=eidos_syntax=trace eidos ast model.eidos");
    ExitCode::from(2)
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 || args[1] == "--help" || args[1] == "-h" {
        return usage();
    }

    let command = args[1].as_str();
    if !matches!(command, "tokens" | "ast" | "check") {
        eprintln!("Unknown command: {command}");
        return ExitCode::from(2);
    }

    let mut keep = false;
    let mut verbose = false;
    let mut files = Vec::new();
    for arg in &args[2..] {
        match arg.as_str() {
            "--keep" => keep = true,
            "--verbose" | "-v" => verbose = true,
            flag if flag.starts_with('-') => {
                eprintln!("Unknown option: {flag}");
                return ExitCode::from(2);
            }
            path => files.push(path),
        }
    }

    if files.is_empty() {
        eprintln!("Error: no files specified");
        return ExitCode::from(2);
    }

    init_logging(verbose);

    let options = ScriptOptions {
        keep_nonsignificant: keep && command == "tokens",
        ..ScriptOptions::default()
    };
    let mut had_error = false;

    for path in files {
        let content = match fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("{path}: {e}");
                had_error = true;
                continue;
            }
        };

        let mut script = Script::new(content, 0);

        match command {
            "tokens" => match script.tokenize(options.keep_nonsignificant) {
                Ok(()) => println!("{}", script.token_dump()),
                Err(e) => {
                    report(path, &script, &e);
                    had_error = true;
                }
            },
            "ast" => match script.compile(options) {
                Ok(root) => print!("{}", root.dump()),
                Err(e) => {
                    report(path, &script, &e);
                    had_error = true;
                }
            },
            _ => match script.compile(options) {
                Ok(root) => {
                    let statements = root.children.len();
                    eprintln!("{path}: valid ({statements} statement(s))");
                }
                Err(e) => {
                    report(path, &script, &e);
                    had_error = true;
                }
            },
        }
    }

    if had_error {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

fn report(path: &str, script: &Script, err: &eidos_syntax::Error) {
    eprintln!("{path}: {err}");
    let near = err.span().and_then(|span| script.text_for_span(span));
    if let Some(text) = near.filter(|t| !t.trim().is_empty()) {
        eprintln!("  near: {text}");
    }
}
