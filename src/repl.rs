//! Line-oriented command driver.
//!
//! Commands are read on a separate thread and handed over a channel, so the
//! sheet's debounce and teardown timers keep firing while the input is idle.
//! On end of input every pending timer is flushed before returning.

use livesheet_core::{CellId, Sheet, Storage};
use livesheet_engine::engine::format_value;
use std::io::{BufRead, Write};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread;
use std::time::Instant;

use crate::error::{CliError, Result};

const HELP: &[&str] = &[
    "add                    create a cell and print its id",
    "name <id> <text>       edit a cell's name",
    "formula <id> <text>    edit a cell's formula",
    "remove <id>            remove a cell",
    "list                   print every cell: id, name, formula, value",
    "get <name>             print the value published under a name",
    "flush                  apply pending edits now",
    "help                   show this help",
    "quit                   flush and exit",
];

#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    Add,
    Name(CellId, String),
    Formula(CellId, String),
    Remove(CellId),
    List,
    Get(String),
    Flush,
    Help,
    Quit,
}

/// Parse one input line. Blank lines and `#` comments parse to `None`.
pub fn parse_command(line: &str) -> Result<Option<Command>> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }

    let (word, rest) = split_word(line);
    let command = match word {
        "add" => Command::Add,
        "name" => {
            let (id, text) = split_word(rest);
            Command::Name(parse_id(id, "name <id> <text>")?, text.to_string())
        }
        "formula" => {
            let (id, text) = split_word(rest);
            Command::Formula(parse_id(id, "formula <id> <text>")?, text.to_string())
        }
        "remove" | "rm" => Command::Remove(parse_id(rest, "remove <id>")?),
        "list" | "ls" => Command::List,
        "get" => {
            if rest.is_empty() {
                return Err(CliError::Usage("get <name>"));
            }
            Command::Get(rest.to_string())
        }
        "flush" => Command::Flush,
        "help" | "?" => Command::Help,
        "quit" | "exit" => Command::Quit,
        other => return Err(CliError::UnknownCommand(other.to_string())),
    };
    Ok(Some(command))
}

fn split_word(s: &str) -> (&str, &str) {
    match s.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim_start()),
        None => (s, ""),
    }
}

fn parse_id(text: &str, usage: &'static str) -> Result<CellId> {
    if text.is_empty() {
        return Err(CliError::Usage(usage));
    }
    text.parse::<usize>()
        .map(CellId::new)
        .map_err(|_| CliError::InvalidCellId(text.to_string()))
}

/// Apply one command. Returns false when the driver should stop.
pub fn execute<S: Storage, W: Write>(
    sheet: &mut Sheet<S>,
    command: Command,
    now: Instant,
    out: &mut W,
) -> Result<bool> {
    match command {
        Command::Add => {
            let id = sheet.add_cell();
            writeln!(out, "{}", id)?;
        }
        Command::Name(id, text) => sheet.edit_name(id, text, now)?,
        Command::Formula(id, text) => sheet.edit_formula(id, text, now)?,
        Command::Remove(id) => sheet.remove_cell(id, now)?,
        Command::List => {
            for row in sheet.rows() {
                writeln!(
                    out,
                    "{}\t{}\t{}\t{}",
                    row.id,
                    row.name.as_deref().unwrap_or(""),
                    row.formula.as_deref().unwrap_or(""),
                    format_value(row.value)
                )?;
            }
        }
        Command::Get(name) => writeln!(out, "{}", format_value(sheet.value_of(&name)))?,
        Command::Flush => sheet.flush(),
        Command::Help => {
            for line in HELP {
                writeln!(out, "{}", line)?;
            }
        }
        Command::Quit => return Ok(false),
    }
    Ok(true)
}

fn spawn_reader<R: BufRead + Send + 'static>(input: R) -> Receiver<String> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        for line in input.lines() {
            let Ok(line) = line else { break };
            if tx.send(line).is_err() {
                break;
            }
        }
    });
    rx
}

/// Drive `sheet` from `input` until `quit` or end of input.
///
/// Command errors are reported on `out` and do not stop the driver.
pub fn run<S, R, W>(sheet: &mut Sheet<S>, input: R, out: &mut W) -> Result<()>
where
    S: Storage,
    R: BufRead + Send + 'static,
    W: Write,
{
    let lines = spawn_reader(input);

    loop {
        let received = match sheet.next_deadline() {
            Some(deadline) => {
                lines.recv_timeout(deadline.saturating_duration_since(Instant::now()))
            }
            None => lines.recv().map_err(|_| RecvTimeoutError::Disconnected),
        };

        let keep_going = match received {
            Ok(line) => match parse_command(&line)
                .and_then(|command| match command {
                    Some(command) => execute(sheet, command, Instant::now(), out),
                    None => Ok(true),
                }) {
                Ok(keep_going) => keep_going,
                Err(CliError::Io(e)) => return Err(CliError::Io(e)),
                Err(e) => {
                    writeln!(out, "error: {}", e)?;
                    true
                }
            },
            Err(RecvTimeoutError::Timeout) => true,
            Err(RecvTimeoutError::Disconnected) => false,
        };

        sheet.advance(Instant::now());
        // Already logged when reported.
        sheet.take_diagnostics();
        out.flush()?;

        if !keep_going {
            break;
        }
    }

    sheet.flush();
    sheet.take_diagnostics();
    Ok(())
}
