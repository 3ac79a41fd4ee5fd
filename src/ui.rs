pub mod components;

mod error_dialog;
mod status_bar;
mod toast;

use crossterm::event::KeyEvent;
use ratatui::Frame;
use ratatui::layout::Rect;

pub use color_eyre::Result;

use crate::Theme;

pub use components::{
    ColumnDef, ConfirmDialog, ConfirmEvent, Spinner, Table, TableEvent, TableRow, TextInput,
    TextInputEvent,
};
pub use error_dialog::{ErrorDialog, ErrorDialogEvent};
pub use status_bar::StatusBar;
pub use toast::{Toast, ToastManager, ToastType};

/// Result of handling an input event.
///
/// - `Ignored` - The handler didn't recognize or handle this input
/// - `Consumed` - The input was handled but produced no message, the input will not be propagated further
/// - `Event(E)` - The input was handled and produced a message, the input will not be propagated further
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventResult<E> {
    /// Input was not handled, parent should process it.
    Ignored,
    /// Input was consumed but produced no event.
    Consumed,
    /// Input was consumed and produced an event.
    Event(E),
}

impl<E> EventResult<E> {
    pub const fn is_consumed(&self) -> bool {
        !matches!(self, Self::Ignored)
    }
}

impl<E> From<E> for EventResult<E> {
    fn from(event: E) -> Self {
        Self::Event(event)
    }
}

/// A key hint shown in the status bar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Keybinding {
    pub key: String,
    pub description: &'static str,
}

impl Keybinding {
    pub fn new(key: impl Into<String>, description: &'static str) -> Self {
        Self {
            key: key.into(),
            description,
        }
    }
}

/// Interactive UI building block.
///
/// Components are reusable widgets that handle input events and emit
/// generic outputs. They know nothing about the store backend.
///
/// # Examples
///
/// - `Table` - Selectable table with search/filter
/// - `TextInput` - Single-line text field
/// - `ConfirmDialog` - Yes/no prompt
pub trait Component {
    /// The output type produced by this component.
    type Output;

    /// Handle a key event.
    ///
    /// Returns `Ok(EventResult::...)` where:
    /// - `Ignored` - key was not handled, parent should process it
    /// - `Consumed` - key was handled but produced no output
    /// - `Event(output)` - key was handled and produced an output
    fn handle_key(&mut self, key: KeyEvent) -> Result<EventResult<Self::Output>> {
        _ = key;
        Ok(EventResult::Ignored)
    }

    /// Handle text pasted into the terminal.
    fn handle_paste(&mut self, text: &str) -> Result<EventResult<Self::Output>> {
        _ = text;
        Ok(EventResult::Ignored)
    }

    /// Called on each tick for animations and time-based updates.
    fn handle_tick(&mut self) {}

    /// Render the component to the frame.
    fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme);
}

/// Full-page view that orchestrates components.
///
/// Screens translate component events into domain messages.
///
/// # Examples
///
/// - `ColorListScreen` - colors table, emits `ColorMsg`
/// - `ColorFormScreen` - create/edit form, emits `ColorMsg`
pub trait Screen {
    /// The message type produced by this screen.
    type Output;

    fn handle_key(&mut self, key: KeyEvent) -> Result<EventResult<Self::Output>>;

    fn handle_paste(&mut self, text: &str) -> Result<EventResult<Self::Output>> {
        _ = text;
        Ok(EventResult::Ignored)
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme);

    fn handle_tick(&mut self) {}

    /// Breadcrumb segments for navigation context.
    fn breadcrumbs(&self) -> Vec<String> {
        vec![]
    }

    fn keybindings(&self) -> Vec<Keybinding> {
        vec![]
    }
}
