// SPDX-License-Identifier: MIT OR Apache-2.0
//! apl CLI entry point.

use std::process::ExitCode;

use apl_runtime::{Outcome, Session, SessionConfig, StructuredOutcome};
use apl_shell::{
    cli::{Cli, OutputFormat},
    to_json, CommandResult, Shell, ShellConfig,
};
use clap::Parser;
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    // RUST_LOG wins when set; otherwise only warnings reach stderr.
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("apl_runtime=warn,apl_shell=warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run_command(shell: &mut Shell, line: &str, format: OutputFormat) -> ExitCode {
    match format {
        OutputFormat::Json => {
            let structured = StructuredOutcome::from_result(&shell.session_mut().eval(line));
            println!("{}", to_json(&structured));
            if structured.is_ok() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            }
        },
        OutputFormat::Text => match shell.execute(line) {
            CommandResult::Error(text) => {
                eprintln!("{text}");
                ExitCode::FAILURE
            },
            result => {
                let _ = Shell::process_result(&result);
                ExitCode::SUCCESS
            },
        },
    }
}

fn run_script(shell: &mut Shell, cli: &Cli, path: &std::path::Path) -> ExitCode {
    let result = shell.session_mut().run_file(path).map(Outcome::FileExecuted);
    match cli.output_format {
        OutputFormat::Json => println!("{}", to_json(&StructuredOutcome::from_result(&result))),
        OutputFormat::Text => match &result {
            Ok(outcome) => {
                if !cli.quiet {
                    println!("{outcome}");
                }
            },
            Err(err) => eprintln!("Error: {}", err.render()),
        },
    }
    if result.is_ok() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing();

    let session_config = match SessionConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::from(2);
        },
    };
    let defaults = ShellConfig::default();
    let shell_config = ShellConfig {
        history_file: if cli.no_history {
            None
        } else {
            defaults.history_file
        },
        quiet: cli.quiet,
        ..defaults
    };
    let mut shell = Shell::with_session(Session::with_config(session_config), shell_config);

    if let Some(line) = cli.command.as_deref() {
        return run_command(&mut shell, line, cli.output_format);
    }
    if let Some(path) = cli.file.as_deref() {
        return run_script(&mut shell, &cli, path);
    }

    match shell.run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{e}");
            ExitCode::FAILURE
        },
    }
}
