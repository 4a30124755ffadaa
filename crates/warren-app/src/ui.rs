//! Crossterm renderer: menu rows, text viewport, status line.

use std::io::{self, Write};

use crossterm::cursor::MoveTo;
use crossterm::queue;
use crossterm::style::{Attribute, Color, Print, ResetColor, SetAttribute, SetForegroundColor};
use crossterm::terminal::{Clear, ClearType};
use warren_core::{ItemType, Menu, Page, Snapshot, TextDocument};

/// Column where menu entry text starts (after marker and label).
const TEXT_COLUMN: u16 = 8;

/// Label column.
const LABEL_COLUMN: u16 = 2;

pub fn draw<W: Write>(
    out: &mut W,
    snap: &Snapshot<'_>,
    width: u16,
    height: u16,
) -> io::Result<()> {
    // The last row is reserved for the status line.
    let rows = height.saturating_sub(1) as usize;
    queue!(out, crossterm::cursor::Hide, Clear(ClearType::All))?;

    match snap.page {
        Some(Page::Menu(menu)) => draw_menu(out, menu, snap.cursor, rows, width)?,
        Some(Page::Text(doc)) => draw_text(out, doc, snap.cursor, rows, width)?,
        None => {},
    }

    draw_status_line(out, snap, width, height)?;
    out.flush()
}

/// Menus keep the highlighted entry centered where possible.
fn draw_menu(
    out: &mut impl Write,
    menu: &Menu,
    cursor: usize,
    rows: usize,
    width: u16,
) -> io::Result<()> {
    let offset = center_offset(cursor, menu.len(), rows);
    for (row, index) in (offset..menu.len()).take(rows).enumerate() {
        let entry = &menu.entries[index];
        let highlighted = index == cursor;
        let entry_color = if entry.item_type == ItemType::Info {
            Color::White
        } else {
            Color::Green
        };

        if highlighted {
            queue!(out, SetAttribute(Attribute::Bold))?;
            queue!(
                out,
                MoveTo(0, row as u16),
                SetForegroundColor(entry_color),
                Print(">"),
            )?;
        }
        queue!(
            out,
            MoveTo(LABEL_COLUMN, row as u16),
            ResetColor,
            Print(entry.display_label()),
            MoveTo(TEXT_COLUMN, row as u16),
            SetForegroundColor(entry_color),
            Print(truncated(&entry.display, width.saturating_sub(TEXT_COLUMN))),
            ResetColor,
        )?;
        if highlighted {
            queue!(out, SetAttribute(Attribute::Reset))?;
        }
    }
    Ok(())
}

/// Text documents scroll with the cursor as the top-of-viewport line,
/// pulled back so the last screenful always fills the viewport.
fn draw_text(
    out: &mut impl Write,
    doc: &TextDocument,
    cursor: usize,
    rows: usize,
    width: u16,
) -> io::Result<()> {
    let offset = cursor.min(doc.len().saturating_sub(rows));
    for (row, line) in doc.lines.iter().skip(offset).take(rows).enumerate() {
        queue!(
            out,
            MoveTo(0, row as u16),
            Print(truncated(line, width)),
        )?;
    }
    Ok(())
}

fn draw_status_line(
    out: &mut impl Write,
    snap: &Snapshot<'_>,
    width: u16,
    height: u16,
) -> io::Result<()> {
    let row = height.saturating_sub(1);
    let status_color = if snap.is_error {
        Color::Red
    } else {
        Color::Cyan
    };
    queue!(
        out,
        MoveTo(0, row),
        Clear(ClearType::CurrentLine),
        SetForegroundColor(Color::Yellow),
        SetAttribute(Attribute::Bold),
        Print(truncated(snap.title, width)),
    )?;

    let status = truncated(&snap.status, width);
    let col = width.saturating_sub(status.chars().count() as u16);
    queue!(
        out,
        MoveTo(col, row),
        SetForegroundColor(status_color),
        Print(status),
        SetAttribute(Attribute::Reset),
        ResetColor,
    )?;
    Ok(())
}

/// Keep the cursor centered: start half a viewport above it, but never
/// scroll past the end or before the start.
fn center_offset(cursor: usize, content_len: usize, rows: usize) -> usize {
    let half = rows / 2;
    let desired = cursor.saturating_sub(half);
    desired.min(content_len.saturating_sub(rows))
}

fn truncated(text: &str, width: u16) -> String {
    text.chars().take(width as usize).collect()
}
