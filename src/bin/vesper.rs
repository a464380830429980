//! CLI wrapper for the vesper polyglot bridge.
//!
//! Usage:
//!   vesper <file>               # Evaluate a guest snippet stored in a file
//!   vesper -e "code"            # Evaluate a guest snippet
//!   vesper                      # Start REPL (interactive mode)

use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process;

use clap::Parser;
use tracing::{debug, error};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use vesper::parser::parse_to_token_tree;
use vesper::runner::ds::state::State;
use vesper::runner::ds::value::Value;
use vesper::runner::plugin::config::RuntimeConfig;
use vesper::runner::plugin::types::EvalContext;
use vesper::runner::polyglot::ForeignEval;

#[derive(Parser)]
#[command(name = "vesper", version, about = "Evaluate guest-language snippets through the context bridge")]
struct Cli {
    /// Snippet to evaluate
    #[arg(short, long, conflicts_with = "file")]
    eval: Option<String>,

    /// File containing a snippet to evaluate
    file: Option<PathBuf>,

    /// Guest language of the snippet (defaults to the configured language)
    #[arg(short, long)]
    language: Option<String>,

    /// Runtime configuration file (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print the parse tree of a `calc` snippet instead of evaluating it
    #[arg(long)]
    tokens: bool,

    /// Enable verbose logging (use multiple times for increased verbosity)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    let config = match &cli.config {
        Some(path) => match RuntimeConfig::load(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Configuration error: {}", e);
                process::exit(1);
            }
        },
        None => RuntimeConfig::default(),
    };
    let language = cli
        .language
        .clone()
        .unwrap_or_else(|| config.polyglot.default_language.clone());
    let mut ctx = EvalContext::with_config(config);

    match (&cli.eval, &cli.file) {
        (Some(code), _) => exit_on_error(run_once(&mut ctx, &language, code, cli.tokens)),
        (None, Some(path)) => {
            let source = match fs::read_to_string(path) {
                Ok(content) => content,
                Err(e) => {
                    eprintln!("Error reading file '{}': {}", path.display(), e);
                    process::exit(1);
                }
            };
            exit_on_error(run_once(&mut ctx, &language, source.trim(), cli.tokens))
        }
        (None, None) => run_repl(&mut ctx, &language),
    }
}

fn setup_logging(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    let formatter = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(io::stderr)
        .with_level(true);
    tracing_subscriber::registry()
        .with(formatter)
        .with(filter)
        .init();
}

fn exit_on_error(result: Result<(), String>) {
    if let Err(message) = result {
        eprintln!("{}", message);
        process::exit(1);
    }
}

fn run_once(ctx: &mut EvalContext, language: &str, code: &str, tokens: bool) -> Result<(), String> {
    if tokens {
        let tree = parse_to_token_tree(code).map_err(|e| format!("Parse error: {}", e))?;
        println!("{}", tree);
        return Ok(());
    }
    let value = evaluate(ctx, language, code, State::empty())?.1;
    println!("{}", value);
    Ok(())
}

fn evaluate(
    ctx: &mut EvalContext,
    language: &str,
    code: &str,
    state: State,
) -> Result<(State, Value), String> {
    let snippet = ForeignEval::new(language, code, &[]);
    debug!(site = %snippet.id(), "evaluating snippet");
    match snippet.execute(ctx, state, vec![]) {
        Ok(result) => Ok((result.state, result.value)),
        Err(e) => {
            error!(?e, "evaluation failed");
            Err(format!("Runtime error: {}", e))
        }
    }
}

fn run_repl(ctx: &mut EvalContext, language: &str) {
    println!("vesper v{} - {} snippets", env!("CARGO_PKG_VERSION"), language);
    println!("Type an expression and press Enter. Type .exit to quit.");
    println!();

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut state = State::empty();

    loop {
        print!("> ");
        if stdout.flush().is_err() {
            break;
        }

        let mut input = String::new();
        match stdin.read_line(&mut input) {
            Ok(0) => break,
            Ok(_) => {}
            Err(e) => {
                eprintln!("Error reading input: {}", e);
                break;
            }
        }

        let input = input.trim();
        if input == ".exit" || input == ".quit" {
            break;
        }
        if input.is_empty() {
            continue;
        }

        match evaluate(ctx, language, input, state.clone()) {
            Ok((next, value)) => {
                state = next;
                println!("{}", value);
            }
            Err(message) => eprintln!("{}", message),
        }
    }

    println!("Goodbye!");
}
