//! Line-oriented interactive session.
//!
//! Mirrors the label window: load a spreadsheet, pick a reference, look at the
//! listing, and export. Prompts stand in for the file and message dialogs.

use crate::app::{AppState, ExportSettings};
use crate::error::Result;
use crate::reader;
use crate::writer::{self, ListingConfig};
use crate::OutputFormat;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

const HELP: &str = "\
commands:
  load <path>      load an .xlsx spreadsheet
  refs             list the references in the loaded table
  select [ref]     filter by reference (no argument clears the filter)
  list             show the current listing
  export [path]    generate the PDF for the current listing
  help             show this help
  quit             leave the session";

enum Command<'a> {
    Load(&'a str),
    Refs,
    Select(Option<&'a str>),
    List,
    Export(Option<&'a str>),
    Help,
    Quit,
    Unknown(&'a str),
    Empty,
}

fn parse_command(line: &str) -> Command<'_> {
    let line = line.trim();
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((w, r)) => (w, r.trim()),
        None => (line, ""),
    };
    let arg = (!rest.is_empty()).then_some(rest);

    match word {
        "" => Command::Empty,
        "load" => match arg {
            Some(path) => Command::Load(path),
            None => Command::Unknown(line),
        },
        "refs" => Command::Refs,
        "select" => Command::Select(arg),
        "list" => Command::List,
        "export" => Command::Export(arg),
        "help" | "?" => Command::Help,
        "quit" | "exit" => Command::Quit,
        _ => Command::Unknown(line),
    }
}

pub struct Session<R, W> {
    state: AppState,
    settings: ExportSettings,
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Session<R, W> {
    pub fn new(state: AppState, settings: ExportSettings, input: R, output: W) -> Self {
        Self {
            state,
            settings,
            input,
            output,
        }
    }

    #[cfg(test)]
    pub fn into_state(self) -> AppState {
        self.state
    }

    /// Run until `quit` or end of input.
    pub fn run(&mut self) -> Result<()> {
        writeln!(self.output, "Label generator. Type `help` for commands.")?;
        if let Some(source) = self.state.source() {
            let count = self.state.table().len();
            writeln!(self.output, "{} records loaded from {}", count, source.display())?;
        }

        loop {
            write!(self.output, "> ")?;
            self.output.flush()?;

            let Some(line) = self.read_line()? else {
                break;
            };
            match parse_command(&line) {
                Command::Quit => break,
                command => {
                    if let Err(e) = self.dispatch(command) {
                        writeln!(self.output, "error: {}", e)?;
                    }
                }
            }
        }
        Ok(())
    }

    fn read_line(&mut self) -> Result<Option<String>> {
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
    }

    fn dispatch(&mut self, command: Command<'_>) -> Result<()> {
        match command {
            Command::Load(path) => self.load(Path::new(path)),
            Command::Refs => {
                let refs = self.state.references();
                writer::write_references(&refs, &mut self.output)
            }
            Command::Select(reference) => {
                let view = self.state.set_selection(reference);
                let config = ListingConfig {
                    format: OutputFormat::Tsv,
                };
                writer::write_listing(&view, &mut self.output, &config)
            }
            Command::List => {
                let view = self.state.view();
                let config = ListingConfig {
                    format: OutputFormat::Tsv,
                };
                writer::write_listing(&view, &mut self.output, &config)
            }
            Command::Export(path) => self.export(path),
            Command::Help => {
                writeln!(self.output, "{}", HELP)?;
                Ok(())
            }
            Command::Unknown(line) => {
                writeln!(self.output, "unknown command: {} (try `help`)", line)?;
                Ok(())
            }
            Command::Empty | Command::Quit => Ok(()),
        }
    }

    fn load(&mut self, path: &Path) -> Result<()> {
        reader::check_workbook_path(path)?;
        let count = self.state.load_file(path).len();
        writeln!(self.output, "{} records loaded from {}", count, path.display())?;
        Ok(())
    }

    fn export(&mut self, path: Option<&str>) -> Result<()> {
        let Self {
            state,
            settings,
            input,
            output,
        } = self;

        let outcome = state.export(settings, || match path {
            Some(p) => Ok(Some(PathBuf::from(p))),
            None => prompt_destination(&mut *input, &mut *output),
        })?;
        debug!(?outcome, "export finished");

        if let Some(notice) = outcome.notice() {
            writeln!(output, "{}", notice)?;
        }
        Ok(())
    }
}

/// Ask for a destination. An empty answer or closed input cancels.
fn prompt_destination<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
) -> Result<Option<PathBuf>> {
    write!(output, "Save PDF as: ")?;
    output.flush()?;

    let mut line = String::new();
    input.read_line(&mut line)?;
    let answer = line.trim();
    Ok((!answer.is_empty()).then(|| PathBuf::from(answer)))
}
