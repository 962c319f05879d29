//! A GRUB-like text menu that reacts to navigation keystrokes.

use super::event::MockEvent;
use crate::config::Keystrokes;

/// What selecting a menu item does.
#[derive(Debug, Clone)]
pub enum MenuAction {
    /// Nothing happens; the menu is drawn again.
    Redraw,
    /// Open a nested menu with these items.
    Open(Vec<MenuItem>),
    /// Leave the menu and play these events.
    Emit(Vec<MockEvent>),
}

/// One line of a mock menu.
#[derive(Debug, Clone)]
pub struct MenuItem {
    /// Text shown for the entry.
    pub label: String,
    /// Effect of selecting it.
    pub action: MenuAction,
}

impl MenuItem {
    /// An entry that does nothing when selected.
    pub fn inert(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            action: MenuAction::Redraw,
        }
    }

    /// An entry that opens a nested menu.
    pub fn submenu(label: impl Into<String>, items: Vec<Self>) -> Self {
        Self {
            label: label.into(),
            action: MenuAction::Open(items),
        }
    }

    /// An entry that boots something.
    pub fn emit(label: impl Into<String>, events: Vec<MockEvent>) -> Self {
        Self {
            label: label.into(),
            action: MenuAction::Emit(events),
        }
    }
}

/// Menu state machine driven by the session's keystrokes.
///
/// Every redraw prints the banner and all entries of the current level, with
/// the entry under the cursor prefixed by `*`, the way a serial GRUB console
/// renders its highlight.
#[derive(Debug, Clone)]
pub struct MockMenu {
    banner: String,
    top: Vec<u8>,
    down: Vec<u8>,
    select: Vec<u8>,
    levels: Vec<Vec<MenuItem>>,
    cursor: usize,
    redraws: usize,
}

impl MockMenu {
    /// A menu listening to the keystrokes in `keys`.
    #[must_use]
    pub fn new(keys: &Keystrokes, items: Vec<MenuItem>) -> Self {
        Self {
            banner: "GNU GRUB  version 2.06".to_string(),
            top: keys.menu_top.as_bytes().to_vec(),
            down: keys.menu_down.as_bytes().to_vec(),
            select: keys.select.as_bytes().to_vec(),
            levels: vec![items],
            cursor: 0,
            redraws: 0,
        }
    }

    /// Replace the banner line.
    #[must_use]
    pub fn banner(mut self, banner: impl Into<String>) -> Self {
        self.banner = banner.into();
        self
    }

    /// The first full drawing, as shown when the menu appears.
    #[must_use]
    pub fn render(&self) -> String {
        let mut out = format!("\x1b[2J\x1b[H    {}\r\n\r\n", self.banner);
        if let Some(items) = self.levels.last() {
            for (i, item) in items.iter().enumerate() {
                let mark = if i == self.cursor { '*' } else { ' ' };
                out.push(mark);
                out.push_str(&item.label);
                out.push_str("\r\n");
            }
        }
        out
    }

    /// Number of redraws caused by keystrokes so far.
    #[must_use]
    pub const fn redraws(&self) -> usize {
        self.redraws
    }

    /// React to one write; `None` when it is not a menu key.
    pub fn handle(&mut self, data: &[u8]) -> Option<Vec<MockEvent>> {
        let len = self.levels.last().map_or(0, Vec::len);
        if data == self.top.as_slice() {
            self.cursor = 0;
        } else if data == self.down.as_slice() {
            self.cursor = (self.cursor + 1).min(len.saturating_sub(1));
        } else if data == self.select.as_slice() {
            let action = self
                .levels
                .last()
                .and_then(|items| items.get(self.cursor))
                .map(|item| item.action.clone())?;
            match action {
                MenuAction::Redraw => {}
                MenuAction::Open(items) => {
                    self.levels.push(items);
                    self.cursor = 0;
                }
                MenuAction::Emit(events) => return Some(events),
            }
        } else {
            return None;
        }

        self.redraws += 1;
        Some(vec![MockEvent::output_str(&self.render())])
    }
}
