//! Tideway CLI entry point.

use std::env;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use tideway_runtime::Console;
use tideway_script::standard_registry;

/// CLI configuration parsed from arguments.
#[derive(Default)]
struct CliConfig {
    files: Vec<PathBuf>,
    batch_mode: bool,
    show_help: bool,
    show_version: bool,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt::init();

    let args: Vec<String> = env::args().collect();

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("\x1b[31mError: {e}\x1b[0m");
            ExitCode::FAILURE
        }
    }
}

fn parse_args(args: Vec<String>) -> Result<CliConfig, Box<dyn std::error::Error>> {
    let mut config = CliConfig::default();

    for arg in args.into_iter().skip(1) {
        match arg.as_str() {
            "-h" | "--help" => config.show_help = true,
            "-V" | "--version" => config.show_version = true,
            "-b" | "--batch" => config.batch_mode = true,
            other if other.starts_with('-') => {
                return Err(format!("unknown option: {other}").into());
            }
            path => config.files.push(PathBuf::from(path)),
        }
    }

    Ok(config)
}

fn run(args: Vec<String>) -> Result<(), Box<dyn std::error::Error>> {
    let config = parse_args(args)?;

    if config.show_help {
        print_help();
        return Ok(());
    }

    if config.show_version {
        println!("tideway {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    let registry = Arc::new(standard_registry());
    let mut console = Console::new(registry)?;

    for file in &config.files {
        console.eval_file(file)?;
    }

    if config.batch_mode {
        // Print the final stack so batch runs produce output
        for (level, value) in console.machine().stack().iter().rev().enumerate() {
            println!("{level}: {value}");
        }
        return Ok(());
    }

    if !config.files.is_empty() {
        console = console.without_banner();
    }

    console.run()?;
    Ok(())
}

fn print_help() {
    println!(
        "\x1b[1mTideway\x1b[0m - Stack-based script execution engine

\x1b[1mUSAGE:\x1b[0m
    tideway [OPTIONS] [FILES...]

\x1b[1mARGUMENTS:\x1b[0m
    [FILES...]    Script files to evaluate before starting the console

\x1b[1mOPTIONS:\x1b[0m
    -h, --help       Print help information
    -V, --version    Print version information
    -b, --batch      Evaluate files and exit (no console)

\x1b[1mEXAMPLES:\x1b[0m
    tideway                  Start the interactive console
    tideway setup.tw         Evaluate setup.tw, then start the console
    tideway -b script.tw     Evaluate script.tw and print the final stack

\x1b[1mCONSOLE:\x1b[0m
    1 2 +                Push values, apply words
    <% ... %>            Capture a macro
    'name' EXPORT        Request a symbol export
    Ctrl+D               Exit"
    );
}
