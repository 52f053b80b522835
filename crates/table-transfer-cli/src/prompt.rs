//! Operator prompts.
//!
//! Interactive terminals get dialoguer inputs; piped stdin is read one line per
//! prompt so answers can be scripted. Both prompt on stdout.

use std::io::{self, BufRead, Write};

use dialoguer::console::Term;
use dialoguer::Input;
use table_transfer::TransferRequest;

pub const SOURCE_PROMPT: &str = "Enter the source connection string";
pub const DESTINATION_PROMPT: &str = "Enter the destination connection string";
pub const TABLE_PROMPT: &str = "Enter the table name to transfer";
pub const DEST_TABLE_PROMPT: &str =
    "Enter destination table name (leave blank to match source table name)";
pub const NOT_EMPTY_WARNING: &str =
    "Warning: The destination table is not empty. Do you want to continue? (yes/no)";

/// Something that can put a question to the operator.
pub trait Ask {
    fn ask(&mut self, prompt: &str) -> io::Result<String>;
}

/// Prompts on an interactive terminal.
pub struct TerminalPrompter {
    term: Term,
}

impl TerminalPrompter {
    /// Prompt on stdout, the stream piped prompts and status lines use.
    pub fn stdout() -> Self {
        Self {
            term: Term::stdout(),
        }
    }
}

impl Ask for TerminalPrompter {
    fn ask(&mut self, prompt: &str) -> io::Result<String> {
        Input::<String>::new()
            .with_prompt(prompt)
            .allow_empty(true)
            .interact_text_on(&self.term)
            .map_err(io::Error::other)
    }
}

/// Writes each prompt on its own line and reads one answer line.
///
/// End of input reads as an empty answer.
pub struct LinePrompter<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> LinePrompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }
}

impl<R: BufRead, W: Write> Ask for LinePrompter<R, W> {
    fn ask(&mut self, prompt: &str) -> io::Result<String> {
        writeln!(self.output, "{}", prompt)?;
        self.output.flush()?;

        let mut line = String::new();
        self.input.read_line(&mut line)?;
        Ok(line.trim_end_matches(['\r', '\n']).to_string())
    }
}

/// Answers supplied up front on the command line.
#[derive(Debug, Default, Clone)]
pub struct Preset {
    pub source: Option<String>,
    pub destination: Option<String>,
    pub table: Option<String>,
    pub dest_table: Option<String>,
}

/// Ask for every answer the preset leaves open, in prompt order.
pub fn collect_request(ask: &mut dyn Ask, preset: Preset) -> io::Result<TransferRequest> {
    let source = answer(ask, preset.source, SOURCE_PROMPT)?;
    let destination = answer(ask, preset.destination, DESTINATION_PROMPT)?;
    let table = answer(ask, preset.table, TABLE_PROMPT)?;
    let dest_table = answer(ask, preset.dest_table, DEST_TABLE_PROMPT)?;

    Ok(TransferRequest::new(
        source,
        destination,
        table,
        Some(dest_table.as_str()),
    ))
}

fn answer(ask: &mut dyn Ask, preset: Option<String>, prompt: &str) -> io::Result<String> {
    match preset {
        Some(value) => Ok(value),
        None => ask.ask(prompt),
    }
}

/// Only a case-insensitive "yes" continues.
pub fn confirms(answer: &str) -> bool {
    answer.eq_ignore_ascii_case("yes")
}
