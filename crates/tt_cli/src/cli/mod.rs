use clap::{Parser, Subcommand};
use std::collections::HashMap;
use std::path::PathBuf;
use tt_core::error::AppError;
use tt_core::model::TaskId;

#[derive(Parser, Debug)]
#[command(name = "tt", author, version, about = "Track what you are working on", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Output JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Read and write this task file instead of the configured one
    #[arg(long, value_name = "PATH", global = true)]
    pub store: Option<PathBuf>,

    /// Override configuration values (format KEY=VALUE)
    #[arg(long = "config-override", value_name = "KEY=VALUE", global = true)]
    pub config_override: Vec<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Add a new task
    ///
    /// Example: tt add "Write report"
    /// Without a name, the next input line is used.
    Add { name: Option<String> },
    /// List all tasks
    ///
    /// Example: tt list
    /// Example: tt list --table
    List {
        #[arg(long)]
        table: bool,
    },
    /// Show one task
    ///
    /// Example: tt show 1
    Show { id: TaskId },
    /// Make a task the active one
    ///
    /// Example: tt start 1
    Start { id: TaskId },
    /// Clear the active task
    ///
    /// Example: tt stop
    Stop,
    /// Mark a task as finished
    ///
    /// Example: tt done 1
    Done { id: TaskId },
    /// Mark a finished task as open again
    ///
    /// Example: tt reopen 1
    Reopen { id: TaskId },
    /// Delete a task
    ///
    /// Example: tt delete 1
    Delete { id: TaskId },
    /// Print the task file as stored
    ///
    /// Example: tt raw
    Raw,
}

/// Splits an interactive command line into arguments. Double quotes group
/// words; inside quotes `\"` and `\\` are escapes.
pub fn split_command_line(line: &str) -> Result<Vec<String>, AppError> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut quoted = false;
    let mut escape = false;

    for ch in line.chars() {
        if escape {
            if ch != '"' && ch != '\\' {
                current.push('\\');
            }
            current.push(ch);
            escape = false;
            continue;
        }

        if in_quotes && ch == '\\' {
            escape = true;
            continue;
        }

        if ch == '"' {
            in_quotes = !in_quotes;
            quoted = true;
            continue;
        }

        if ch.is_whitespace() && !in_quotes {
            if !current.is_empty() || quoted {
                args.push(std::mem::take(&mut current));
                quoted = false;
            }
            continue;
        }

        current.push(ch);
    }

    if in_quotes {
        return Err(AppError::invalid_input("unterminated quote in command"));
    }

    if !current.is_empty() || quoted {
        args.push(current);
    }

    Ok(args)
}

/// Replaces a leading alias with its configured expansion.
pub fn expand_alias(
    args: Vec<String>,
    aliases: &HashMap<String, String>,
) -> Result<Vec<String>, AppError> {
    let Some(expansion) = args.first().and_then(|first| aliases.get(first)) else {
        return Ok(args);
    };

    let mut expanded = split_command_line(expansion)?;
    expanded.extend(args.into_iter().skip(1));
    Ok(expanded)
}
