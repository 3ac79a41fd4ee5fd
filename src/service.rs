//! Full-page feature screens driven by the App.

use color_eyre::Result;
use crossterm::event::KeyEvent;
use ratatui::Frame;
use ratatui::layout::Rect;

use crate::Theme;
use crate::commands::Command;
use crate::navigation::Navigation;
use crate::ui::{EventResult, Keybinding};

pub enum ServiceMsg {
    /// No action needed
    Idle,
    /// Run one or more commands
    Run(Vec<Box<dyn Command>>),
    /// Leave the current page, e.g. a hard navigation to another route
    Navigate(Navigation),
    /// Close this service
    Close,
}

impl<T: Command> From<T> for ServiceMsg {
    fn from(value: T) -> Self {
        Self::Run(vec![Box::new(value)])
    }
}

impl ServiceMsg {
    /// Merge two results; navigation and close win over commands.
    pub fn merge(self, other: Self) -> Self {
        match (self, other) {
            (Self::Idle, other) => other,
            (this, Self::Idle) => this,
            (Self::Run(mut a), Self::Run(b)) => {
                a.extend(b);
                Self::Run(a)
            }
            (Self::Run(_), other) => other,
            (this, _) => this,
        }
    }
}

/// A store dashboard page.
///
/// Services manage their own internal state and message queue. The App calls
/// methods in this order:
///
/// 1. `init()` - once when the service becomes active
/// 2. `update()` - immediately after init to process startup messages
/// 3. For each event:
///    - `handle_tick()` if tick event
///    - `handle_key()` if key event, then `update()` if consumed
///    - `handle_paste()` if paste event, then `update()` if consumed
/// 4. When a command completes: `update()`
/// 5. `destroy()` - when the service is torn down
pub trait Service {
    /// Queue startup message(s).
    fn init(&mut self) {}

    fn destroy(&mut self) {}

    fn handle_tick(&mut self) {}

    fn handle_key(&mut self, key: KeyEvent) -> EventResult<()>;

    /// Pasted text; `update()` follows if consumed.
    fn handle_paste(&mut self, text: &str) -> EventResult<()> {
        _ = text;
        EventResult::Ignored
    }

    /// Process all queued messages.
    ///
    /// # Errors
    /// The App shows the error in a dialog; the service stays active.
    fn update(&mut self) -> Result<ServiceMsg>;

    fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme);

    /// Breadcrumb segments for the status bar.
    fn breadcrumbs(&self) -> Vec<String>;

    fn keybindings(&self) -> Vec<Keybinding> {
        vec![]
    }
}
