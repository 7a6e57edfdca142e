//! Screen drawing with crossterm.
//!
//! Layout, top to bottom: title bar, bordered log area, key-hint footer.

use std::io::Write;

use crossterm::style::{Attribute, Color, Print, ResetColor, SetAttribute, SetForegroundColor};
use crossterm::terminal::{Clear, ClearType};
use crossterm::{cursor::MoveTo, queue};

use super::view::{LogView, fit};

const FOOTER: &str = " q Quit  \u{2191}/\u{2193} Scroll  PgUp/PgDn Page  Home/End Jump";

/// Rows taken by the title, the two borders and the footer.
const CHROME_ROWS: u16 = 4;

/// Height of the log area for a terminal of `rows` rows.
pub const fn log_area_height(rows: u16) -> usize {
    rows.saturating_sub(CHROME_ROWS) as usize
}

/// Draw one full frame.
pub fn draw<W: Write>(
    out: &mut W,
    view: &mut LogView,
    title: &str,
    (cols, rows): (u16, u16),
) -> std::io::Result<()> {
    queue!(out, Clear(ClearType::All))?;

    let width = usize::from(cols);
    queue!(
        out,
        MoveTo(0, 0),
        SetAttribute(Attribute::Reverse),
        Print(fit(&format!(" {title}"), width)),
        SetAttribute(Attribute::Reset)
    )?;

    if rows < CHROME_ROWS || cols < 2 {
        return out.flush();
    }

    let inner_width = width - 2;
    let height = log_area_height(rows);
    view.set_page(height);

    let follow_marker = if view.is_following() { "" } else { " [scrolled] " };
    let rule = "\u{2500}".repeat(inner_width.saturating_sub(follow_marker.chars().count()));
    queue!(
        out,
        MoveTo(0, 1),
        SetForegroundColor(Color::Green),
        Print(format!("\u{250c}{rule}{follow_marker}\u{2510}")),
    )?;

    let mut visible = view.visible(height);
    for row in 0..height {
        let line = visible.next().unwrap_or("");
        // `row < height <= u16::MAX`, so the cast cannot truncate.
        #[allow(clippy::cast_possible_truncation)]
        let y = row as u16 + 2;
        queue!(
            out,
            MoveTo(0, y),
            SetForegroundColor(Color::Green),
            Print("\u{2502}"),
            ResetColor,
            Print(fit(line, inner_width)),
            SetForegroundColor(Color::Green),
            Print("\u{2502}"),
        )?;
    }

    queue!(
        out,
        MoveTo(0, rows - 2),
        Print(format!("\u{2514}{}\u{2518}", "\u{2500}".repeat(inner_width))),
        ResetColor,
        MoveTo(0, rows - 1),
        SetAttribute(Attribute::Dim),
        Print(fit(FOOTER, width)),
        SetAttribute(Attribute::Reset)
    )?;

    out.flush()
}
