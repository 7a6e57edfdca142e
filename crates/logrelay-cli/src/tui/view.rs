//! Scrollable log view state.
//!
//! Pure state: no terminal I/O, so scrolling and clipping are unit-tested
//! without a TTY.

use std::collections::VecDeque;

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

/// Result of handling a key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewAction {
    Quit,
    Redraw,
    Ignore,
}

/// Lines shown in the log area plus the scroll position.
#[derive(Debug, Default)]
pub struct LogView {
    lines: VecDeque<String>,
    max_lines: Option<usize>,
    /// Index of the first visible line when not following the tail.
    top: usize,
    /// Stick to the newest line as entries arrive.
    follow: bool,
    /// Log area height from the last render, used for paging.
    page: usize,
}

impl LogView {
    pub fn new(max_lines: Option<usize>) -> Self {
        Self {
            lines: VecDeque::new(),
            max_lines: max_lines.map(|n| n.max(1)),
            top: 0,
            follow: true,
            page: 1,
        }
    }

    /// Append display lines, evicting the oldest beyond the limit.
    pub fn extend<I>(&mut self, lines: I)
    where
        I: IntoIterator<Item = String>,
    {
        for line in lines {
            self.lines.push_back(sanitize(&line));
            if let Some(max) = self.max_lines
                && self.lines.len() > max
            {
                self.lines.pop_front();
                self.top = self.top.saturating_sub(1);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub const fn is_following(&self) -> bool {
        self.follow
    }

    /// First visible index for a log area of `height` rows.
    pub fn first_visible(&self, height: usize) -> usize {
        let bottom = self.lines.len().saturating_sub(height);
        if self.follow {
            bottom
        } else {
            self.top.min(bottom)
        }
    }

    /// Lines to draw in a log area of `height` rows.
    pub fn visible(&self, height: usize) -> impl Iterator<Item = &str> {
        let start = self.first_visible(height);
        self.lines.iter().skip(start).take(height).map(String::as_str)
    }

    /// Remember the log area height for paging.
    pub fn set_page(&mut self, height: usize) {
        self.page = height.max(1);
    }

    pub fn scroll_up(&mut self, n: usize) {
        let current = self.first_visible(self.page);
        self.top = current.saturating_sub(n);
        self.follow = false;
    }

    pub fn scroll_down(&mut self, n: usize) {
        let bottom = self.lines.len().saturating_sub(self.page);
        let target = self.first_visible(self.page).saturating_add(n);
        if target >= bottom {
            self.follow = true;
        } else {
            self.top = target;
        }
    }

    pub fn scroll_to_top(&mut self) {
        self.top = 0;
        self.follow = false;
    }

    pub fn scroll_to_bottom(&mut self) {
        self.follow = true;
    }

    /// Apply a key press.
    pub fn handle_key(&mut self, key: KeyEvent) -> ViewAction {
        if key.kind != KeyEventKind::Press {
            return ViewAction::Ignore;
        }
        match key.code {
            KeyCode::Char('q') => ViewAction::Quit,
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                ViewAction::Quit
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.scroll_up(1);
                ViewAction::Redraw
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.scroll_down(1);
                ViewAction::Redraw
            }
            KeyCode::PageUp => {
                self.scroll_up(self.page);
                ViewAction::Redraw
            }
            KeyCode::PageDown => {
                self.scroll_down(self.page);
                ViewAction::Redraw
            }
            KeyCode::Home | KeyCode::Char('g') => {
                self.scroll_to_top();
                ViewAction::Redraw
            }
            KeyCode::End | KeyCode::Char('G') => {
                self.scroll_to_bottom();
                ViewAction::Redraw
            }
            _ => ViewAction::Ignore,
        }
    }
}

/// Replace control characters so peers cannot inject terminal escapes.
pub fn sanitize(line: &str) -> String {
    line.chars()
        .map(|c| match c {
            '\t' => ' ',
            c if c.is_control() => '\u{fffd}',
            c => c,
        })
        .collect()
}

/// Clip `line` to `width` columns and pad it with spaces.
///
/// Columns are counted per `char`; wide glyphs may overhang.
pub fn fit(line: &str, width: usize) -> String {
    let mut out: String = line.chars().take(width).collect();
    let used = out.chars().count();
    out.extend(std::iter::repeat_n(' ', width - used));
    out
}
