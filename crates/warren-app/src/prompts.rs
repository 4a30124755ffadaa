//! Bottom-line input widgets: text edit box and y/n confirm.
//!
//! These implement [`SessionUi`], the pull-based collaborator interface
//! the session controller calls when a command needs user input.

use std::io::{self, Write};

use crossterm::cursor::{Hide, MoveTo, Show};
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use crossterm::queue;
use crossterm::style::Print;
use crossterm::terminal::{Clear, ClearType};
use warren_core::SessionUi;
use warren_types::Result as WarrenResult;

use crate::open;

pub struct TermUi<'a, W: Write> {
    out: &'a mut W,
    width: u16,
    height: u16,
}

impl<'a, W: Write> TermUi<'a, W> {
    pub fn new(out: &'a mut W, width: u16, height: u16) -> Self {
        Self { out, width, height }
    }

    fn bottom_row(&self) -> u16 {
        self.height.saturating_sub(1)
    }

    /// Single-line editor on the bottom row. Enter accepts, Esc cancels.
    fn editbox(&mut self, prompt: &str, init: &str) -> io::Result<Option<String>> {
        let mut buf: Vec<char> = init.chars().collect();
        let mut index = buf.len();
        let row = self.bottom_row();
        let prompt_width = prompt.chars().count() as u16;

        loop {
            let text: String = buf.iter().collect();
            queue!(
                self.out,
                MoveTo(0, row),
                Clear(ClearType::CurrentLine),
                Print(prompt),
                Print(&text),
                MoveTo(prompt_width + index as u16, row),
                Show,
            )?;
            self.out.flush()?;

            let Event::Key(key) = event::read()? else {
                continue;
            };
            if key.kind == KeyEventKind::Release {
                continue;
            }
            match key.code {
                KeyCode::Enter => {
                    queue!(self.out, Hide)?;
                    return Ok(Some(buf.iter().collect()));
                },
                KeyCode::Esc => {
                    queue!(self.out, Hide)?;
                    return Ok(None);
                },
                KeyCode::Char(c) => {
                    buf.insert(index, c);
                    index += 1;
                },
                KeyCode::Left if index > 0 => index -= 1,
                KeyCode::Right if index < buf.len() => index += 1,
                KeyCode::Backspace if index > 0 => {
                    buf.remove(index - 1);
                    index -= 1;
                },
                KeyCode::Delete if index < buf.len() => {
                    buf.remove(index);
                },
                KeyCode::Home => index = 0,
                KeyCode::End => index = buf.len(),
                _ => {},
            }
        }
    }

    /// Yes/no question on the bottom row.
    pub fn confirm(&mut self, question: &str) -> io::Result<bool> {
        let row = self.bottom_row();
        loop {
            queue!(
                self.out,
                MoveTo(0, row),
                Clear(ClearType::CurrentLine),
                Print(question),
                Print(" (y/n)"),
            )?;
            self.out.flush()?;

            let Event::Key(key) = event::read()? else {
                continue;
            };
            if key.kind == KeyEventKind::Release {
                continue;
            }
            match key.code {
                KeyCode::Char('y') | KeyCode::Char('Y') => return Ok(true),
                KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => return Ok(false),
                _ => {},
            }
        }
    }

    /// Prompt errors cancel the command rather than crashing the loop.
    fn prompt(&mut self, label: &str, init: &str) -> Option<String> {
        match self.editbox(label, init) {
            Ok(answer) => answer,
            Err(e) => {
                log::warn!("prompt failed: {e}");
                None
            },
        }
    }
}

impl<W: Write> SessionUi for TermUi<'_, W> {
    fn prompt_query(&mut self) -> Option<String> {
        self.prompt("Query: ", "")
    }

    fn prompt_address(&mut self) -> Option<String> {
        self.prompt("Address: ", "")
    }

    fn prompt_save_path(&mut self, suggested: &str) -> Option<String> {
        self.prompt("Save as: ", suggested)
    }

    fn open_external(&mut self, target: &str) -> WarrenResult<()> {
        open::open_detached(target)?;
        Ok(())
    }

    fn busy(&mut self, status: &str) {
        let row = self.bottom_row();
        let col = self
            .width
            .saturating_sub(status.chars().count() as u16);
        let shown = queue!(
            self.out,
            MoveTo(0, row),
            Clear(ClearType::CurrentLine),
            MoveTo(col, row),
            Print(status),
        )
        .and_then(|()| self.out.flush());
        if let Err(e) = shown {
            log::warn!("could not show status: {e}");
        }
    }
}
