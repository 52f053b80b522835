//! In-place console progress line.

use std::io::{self, Write};

use crossterm::cursor::MoveToColumn;
use crossterm::queue;
use crossterm::style::Print;
use crossterm::terminal::{Clear, ClearType};
use table_transfer::{ProgressSink, TransferProgress};
use tracing::debug;

/// Width of the fill bar in cells.
pub const BAR_WIDTH: usize = 20;

/// Render the progress line without cursor control.
pub fn render(progress: &TransferProgress) -> String {
    let filled = progress.filled_cells(BAR_WIDTH);
    format!(
        "Progress: [{}{}] {}/{} rows transferred",
        "#".repeat(filled),
        " ".repeat(BAR_WIDTH - filled),
        progress.rows_transferred,
        progress.total_rows
    )
}

/// Redraws a single stdout line after every page.
pub struct ConsoleProgress<W: Write> {
    out: W,
    drawn: bool,
}

impl ConsoleProgress<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> ConsoleProgress<W> {
    pub fn new(out: W) -> Self {
        Self { out, drawn: false }
    }

    fn redraw(&mut self, line: &str) -> io::Result<()> {
        queue!(
            self.out,
            MoveToColumn(0),
            Clear(ClearType::CurrentLine),
            Print(line)
        )?;
        self.out.flush()
    }

    /// End the progress line so later output starts on a fresh line.
    pub fn finish(&mut self) -> io::Result<()> {
        if self.drawn {
            writeln!(self.out)?;
            self.out.flush()?;
            self.drawn = false;
        }
        Ok(())
    }
}

impl<W: Write> ProgressSink for ConsoleProgress<W> {
    fn report(&mut self, progress: &TransferProgress) {
        let line = render(progress);
        match self.redraw(&line) {
            Ok(()) => self.drawn = true,
            Err(e) => debug!("Failed to draw progress: {}", e),
        }
    }
}
