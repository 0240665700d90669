use anyhow::Result;

use scholarz_ratings::cli::Command;
use scholarz_ratings::{
    handle_import, handle_init, handle_recompute, handle_show, handle_submit, interpret,
};

fn main() {
    setup_logging();
    parse_and_execute().unwrap_or_else(|e| {
        eprintln!("Error: {e}");
        std::process::exit(1);
    });
}

fn setup_logging() {
    sensible_env_logger::init!();
}

fn parse_and_execute() -> Result<()> {
    let command = interpret();
    execute_command(&command)
}

fn execute_command(command: &Command) -> Result<()> {
    match command {
        Command::Init => handle_init(),
        Command::Import { file, kind } => handle_import(file, kind),
        Command::Submit {
            subject,
            rater,
            rater_name,
            score,
            comment,
        } => handle_submit(
            subject,
            rater,
            rater_name.as_deref(),
            *score,
            comment.as_deref(),
        ),
        Command::Recompute { subject } => handle_recompute(subject.as_deref()),
        Command::Show { subject } => handle_show(subject),
    }
}
