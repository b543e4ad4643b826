use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};
use std::io::{self, BufRead};
use std::path::PathBuf;
use tabled::settings::Style;
use tabled::{Table, Tabled};
use tracing::debug;
use tt_cli::cli::{Cli, Command, expand_alias, split_command_line};
use tt_core::config::{self, Config, ConfigOverrides, Palette};
use tt_core::error::AppError;
use tt_core::model::{Task, TaskId, TaskList};
use tt_core::render;
use tt_core::storage::text_store;
use tt_core::task_api;
use time::UtcOffset;

struct Output {
    json: bool,
    palette: Palette,
    offset: UtcOffset,
}

#[derive(Tabled)]
struct TaskRow {
    #[tabled(rename = "ID")]
    id: TaskId,
    #[tabled(rename = "State")]
    state: &'static str,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Started")]
    started: String,
    #[tabled(rename = "Finished")]
    finished: String,
}

fn state_label(task: &Task) -> &'static str {
    match (task.is_active(), task.is_finished()) {
        (true, true) => "active, finished",
        (true, false) => "active",
        (false, true) => "finished",
        (false, false) => "open",
    }
}

impl Output {
    fn paint(&self, task: &Task, text: &str) -> String {
        if task.is_active() {
            self.palette.paint_active(text)
        } else if task.is_finished() {
            self.palette.paint_finished(text)
        } else {
            text.to_string()
        }
    }

    fn task(&self, verb: &str, task: &Task) -> Result<(), AppError> {
        if self.json {
            println!("{}", to_json(task)?);
        } else {
            println!("{verb} task: {} ({})", task.name(), task.id());
        }
        Ok(())
    }

    fn list(&self, list: &TaskList) -> Result<(), AppError> {
        if self.json {
            let tasks: Vec<&Task> = list.iter().collect();
            println!("{}", to_json(&tasks)?);
            return Ok(());
        }

        if list.is_empty() {
            println!("No tasks.");
            return Ok(());
        }

        for task in list.iter() {
            let line = format!("{:>3} {}", task.id(), render::human_line(task, self.offset)?);
            println!("{}", self.paint(task, &line));
        }
        Ok(())
    }

    fn table(&self, list: &TaskList) -> Result<(), AppError> {
        let mut rows = Vec::with_capacity(list.len());
        for task in list.iter() {
            rows.push(TaskRow {
                id: task.id(),
                state: state_label(task),
                name: task.name().to_string(),
                started: render::format_timestamp(task.start(), self.offset)?,
                finished: match task.end() {
                    Some(end) => render::format_timestamp(end, self.offset)?,
                    None => "-".to_string(),
                },
            });
        }
        println!("{}", Table::new(rows).with(Style::sharp()));
        Ok(())
    }

    fn details(&self, task: &Task) -> Result<(), AppError> {
        if self.json {
            println!("{}", to_json(task)?);
            return Ok(());
        }

        let finished = match task.end() {
            Some(end) => render::format_timestamp(end, self.offset)?,
            None => "-".to_string(),
        };
        println!("ID: {}", task.id());
        println!("Name: {}", self.paint(task, task.name()));
        println!("State: {}", state_label(task));
        println!(
            "Started: {}",
            render::format_timestamp(task.start(), self.offset)?
        );
        println!("Finished: {finished}");
        Ok(())
    }
}

fn to_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<String, AppError> {
    serde_json::to_string(value).map_err(|err| AppError::invalid_data(err.to_string()))
}

fn normalize_parse_error(err: clap::Error) -> AppError {
    let rendered = err.to_string();
    let first_line = rendered.lines().next().unwrap_or("invalid command").trim();
    let message = first_line
        .strip_prefix("error: ")
        .unwrap_or(first_line)
        .to_string();
    AppError::invalid_input(message)
}

fn is_informational(err: &clap::Error) -> bool {
    matches!(
        err.kind(),
        ErrorKind::DisplayHelp
            | ErrorKind::DisplayVersion
            | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand
    )
}

fn print_help() {
    let mut cmd = Cli::command();
    let help = cmd.render_help();
    println!("{help}");
}

fn read_name(input: &mut impl BufRead) -> Result<String, AppError> {
    eprint!("Task name: ");
    let mut line = String::new();
    input
        .read_line(&mut line)
        .map_err(|err| AppError::io(err.to_string()))?;
    Ok(line.trim().to_string())
}

/// Applies `--config-override` and `--store` on top of the loaded config.
fn resolve(base: &Config, cli: &Cli) -> Result<(Config, PathBuf), AppError> {
    let mut overrides = ConfigOverrides::default();
    for raw in &cli.config_override {
        overrides.apply(raw)?;
    }
    let config = config::merge_overrides(base, &overrides);

    let path = match cli.store.as_ref() {
        Some(path) => path.clone(),
        None => text_store::store_path(config.store_path.as_deref())?,
    };
    debug!(path = %path.display(), "using store");
    Ok((config, path))
}

/// In interactive mode every change is followed by the updated list.
fn run_command(
    cli: Cli,
    base: &Config,
    input: &mut impl BufRead,
    interactive: bool,
) -> Result<(), AppError> {
    let (config, path) = resolve(base, &cli)?;
    let output = Output {
        json: cli.json,
        palette: config::palette_for_theme(config.theme.as_deref()),
        offset: render::local_offset(),
    };

    let changed = match cli.command {
        Command::Add { name } => {
            let name = match name {
                Some(value) => value,
                None => read_name(input)?,
            };
            let task = task_api::add_task(&path, &name)?;
            output.task("Added", &task)?;
            true
        }
        Command::List { table } => {
            let list = task_api::list_tasks(&path)?;
            if table && !output.json {
                output.table(&list)?;
            } else {
                output.list(&list)?;
            }
            false
        }
        Command::Show { id } => {
            let task = task_api::get_task(&path, id)?;
            output.details(&task)?;
            false
        }
        Command::Start { id } => {
            let task = task_api::start_task(&path, id)?;
            output.task("Started", &task)?;
            true
        }
        Command::Stop => {
            let task = task_api::stop_task(&path)?;
            output.task("Stopped", &task)?;
            true
        }
        Command::Done { id } => {
            let task = task_api::finish_task(&path, id)?;
            output.task("Finished", &task)?;
            true
        }
        Command::Reopen { id } => {
            let task = task_api::reopen_task(&path, id)?;
            output.task("Reopened", &task)?;
            true
        }
        Command::Delete { id } => {
            let task = task_api::delete_task(&path, id)?;
            output.task("Deleted", &task)?;
            true
        }
        Command::Raw => {
            let list = task_api::list_tasks(&path)?;
            print!("{}", list.format());
            false
        }
    };

    if changed && interactive && !output.json {
        output.list(&task_api::list_tasks(&path)?)?;
    }

    Ok(())
}

fn parse_args(args: Vec<String>, config: &Config) -> Result<Result<Cli, clap::Error>, AppError> {
    let args = expand_alias(args, &config.aliases)?;
    let mut argv = Vec::with_capacity(args.len() + 1);
    argv.push("tt".to_string());
    argv.extend(args);
    Ok(Cli::try_parse_from(argv))
}

fn run_interactive(config: &Config) -> Result<(), AppError> {
    let mut input = String::new();
    let stdin = io::stdin();
    let mut stdin_lock = stdin.lock();

    loop {
        input.clear();
        let bytes = stdin_lock
            .read_line(&mut input)
            .map_err(|err| AppError::io(err.to_string()))?;

        if bytes == 0 {
            break;
        }

        let line = input.trim();
        if line.is_empty() {
            continue;
        }

        if line.eq_ignore_ascii_case("exit") || line.eq_ignore_ascii_case("quit") {
            break;
        }

        if line == "help" || line == "?" {
            print_help();
            continue;
        }

        let args = match split_command_line(line) {
            Ok(args) => args,
            Err(err) => {
                eprintln!("ERROR: {}", err);
                continue;
            }
        };

        if args.is_empty() {
            continue;
        }

        let cli = match parse_args(args, config) {
            Ok(Ok(cli)) => cli,
            Ok(Err(err)) if is_informational(&err) => {
                println!("{err}");
                continue;
            }
            Ok(Err(err)) => {
                eprintln!("ERROR: {}", normalize_parse_error(err));
                continue;
            }
            Err(err) => {
                eprintln!("ERROR: {}", err);
                continue;
            }
        };

        if let Err(err) = run_command(cli, config, &mut stdin_lock, true) {
            eprintln!("ERROR: {}", err);
        }
    }

    Ok(())
}

fn init_tracing() {
    if std::env::var("TT_DEBUG").is_ok() {
        tracing_subscriber::fmt()
            .with_env_filter("tt_core=debug,tt=debug")
            .with_writer(io::stderr)
            .init();
    }
}

fn main() {
    init_tracing();
    let config = config::load_config_or_default();

    let args: Vec<String> = std::env::args_os()
        .skip(1)
        .map(|arg| arg.to_string_lossy().into_owned())
        .collect();

    if args.is_empty() {
        if let Err(err) = run_interactive(&config) {
            eprintln!("ERROR: {}", err);
            std::process::exit(1);
        }
        return;
    }

    let cli = match parse_args(args, &config) {
        Ok(Ok(cli)) => cli,
        Ok(Err(err)) if is_informational(&err) => err.exit(),
        Ok(Err(err)) => {
            eprintln!("ERROR: {}", normalize_parse_error(err));
            std::process::exit(1);
        }
        Err(err) => {
            eprintln!("ERROR: {}", err);
            std::process::exit(1);
        }
    };

    let stdin = io::stdin();
    if let Err(err) = run_command(cli, &config, &mut stdin.lock(), false) {
        eprintln!("ERROR: {}", err);
        std::process::exit(1);
    }
}
