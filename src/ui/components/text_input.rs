use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Paragraph};

use crate::Theme;
use crate::ui::{Component, EventResult, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextInputEvent {
    /// The value was edited.
    Changed(String),
    Submitted(String),
    Cancelled,
}

/// Single-line labelled text field with an optional validation message.
///
/// The cursor is tracked in characters, not bytes.
pub struct TextInput {
    label: String,
    value: String,
    cursor: usize,
    placeholder: Option<String>,
    error: Option<String>,
    focused: bool,
    disabled: bool,
}

impl TextInput {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: String::new(),
            cursor: 0,
            placeholder: None,
            error: None,
            focused: true,
            disabled: false,
        }
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.set_value(value);
        self
    }

    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        let placeholder = placeholder.into();
        self.placeholder = (!placeholder.is_empty()).then_some(placeholder);
        self
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn set_value(&mut self, value: impl Into<String>) {
        self.value = value.into();
        self.cursor = self.len();
    }

    pub fn set_error(&mut self, error: Option<impl Into<String>>) {
        self.error = error.map(Into::into);
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub const fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }

    pub const fn set_disabled(&mut self, disabled: bool) {
        self.disabled = disabled;
    }

    /// Rows needed to render the field including its message line.
    pub const fn height() -> u16 {
        4
    }

    fn len(&self) -> usize {
        self.value.chars().count()
    }

    fn byte_index(&self, char_index: usize) -> usize {
        self.value
            .char_indices()
            .nth(char_index)
            .map_or(self.value.len(), |(idx, _)| idx)
    }

    fn insert_char(&mut self, c: char) {
        let idx = self.byte_index(self.cursor);
        self.value.insert(idx, c);
        self.cursor += 1;
    }

    fn delete_char_before_cursor(&mut self) -> bool {
        if self.cursor == 0 {
            return false;
        }
        self.cursor -= 1;
        let idx = self.byte_index(self.cursor);
        self.value.remove(idx);
        true
    }

    fn delete_char_at_cursor(&mut self) -> bool {
        if self.cursor >= self.len() {
            return false;
        }
        let idx = self.byte_index(self.cursor);
        self.value.remove(idx);
        true
    }

    fn delete_word_before_cursor(&mut self) -> bool {
        let chars: Vec<char> = self.value.chars().collect();
        let mut pos = self.cursor;
        while pos > 0 && chars[pos - 1] == ' ' {
            pos -= 1;
        }
        while pos > 0 && chars[pos - 1] != ' ' {
            pos -= 1;
        }
        if pos == self.cursor {
            return false;
        }
        let start = self.byte_index(pos);
        let end = self.byte_index(self.cursor);
        self.value.drain(start..end);
        self.cursor = pos;
        true
    }

    fn changed(&self, edited: bool) -> EventResult<TextInputEvent> {
        if edited {
            TextInputEvent::Changed(self.value.clone()).into()
        } else {
            EventResult::Consumed
        }
    }
}

impl Component for TextInput {
    type Output = TextInputEvent;

    fn handle_key(&mut self, key: KeyEvent) -> Result<EventResult<Self::Output>> {
        if self.disabled {
            return Ok(EventResult::Consumed);
        }

        Ok(match (key.code, key.modifiers) {
            (KeyCode::Enter, _) => TextInputEvent::Submitted(self.value.clone()).into(),
            (KeyCode::Esc, _) => TextInputEvent::Cancelled.into(),

            (KeyCode::Backspace, KeyModifiers::ALT)
            | (KeyCode::Char('w'), KeyModifiers::CONTROL) => {
                let edited = self.delete_word_before_cursor();
                self.changed(edited)
            }
            (KeyCode::Backspace, _) => {
                let edited = self.delete_char_before_cursor();
                self.changed(edited)
            }
            (KeyCode::Delete, _) => {
                let edited = self.delete_char_at_cursor();
                self.changed(edited)
            }
            (KeyCode::Char('u'), KeyModifiers::CONTROL) => {
                let edited = !self.value.is_empty();
                self.value.clear();
                self.cursor = 0;
                self.changed(edited)
            }

            (KeyCode::Left, _) => {
                self.cursor = self.cursor.saturating_sub(1);
                EventResult::Consumed
            }
            (KeyCode::Right, _) => {
                self.cursor = (self.cursor + 1).min(self.len());
                EventResult::Consumed
            }
            (KeyCode::Home, _) | (KeyCode::Char('a'), KeyModifiers::CONTROL) => {
                self.cursor = 0;
                EventResult::Consumed
            }
            (KeyCode::End, _) | (KeyCode::Char('e'), KeyModifiers::CONTROL) => {
                self.cursor = self.len();
                EventResult::Consumed
            }

            (KeyCode::Char(c), KeyModifiers::NONE | KeyModifiers::SHIFT) => {
                self.insert_char(c);
                self.changed(true)
            }

            // Focus movement and shortcuts belong to the parent.
            _ => EventResult::Ignored,
        })
    }

    /// Insert pasted text at the cursor. Line breaks end the pasted line.
    fn handle_paste(&mut self, text: &str) -> Result<EventResult<Self::Output>> {
        if self.disabled {
            return Ok(EventResult::Consumed);
        }
        let line = text.lines().next().unwrap_or_default();
        let mut edited = false;
        for c in line.chars().filter(|c| !c.is_control()) {
            self.insert_char(c);
            edited = true;
        }
        Ok(self.changed(edited))
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let [label_area, input_area, message_area] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .areas(area);

        let label_style = if self.error.is_some() {
            Style::default().fg(theme.red()).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(theme.subtext1()).add_modifier(Modifier::BOLD)
        };
        frame.render_widget(Paragraph::new(self.label.as_str()).style(label_style), label_area);

        let text_style = if self.disabled {
            Style::default().fg(theme.overlay0())
        } else {
            Style::default().fg(theme.text())
        };
        let cursor_style = Style::default()
            .fg(theme.base())
            .bg(theme.text())
            .add_modifier(Modifier::BOLD);
        let show_cursor = self.focused && !self.disabled;

        let line = if self.value.is_empty() {
            let placeholder = Span::styled(
                self.placeholder.clone().unwrap_or_default(),
                Style::default().fg(theme.overlay0()),
            );
            if show_cursor {
                Line::from(vec![Span::styled(" ", cursor_style), placeholder])
            } else {
                Line::from(placeholder)
            }
        } else if show_cursor {
            let before: String = self.value.chars().take(self.cursor).collect();
            let at = self.value.chars().nth(self.cursor).unwrap_or(' ');
            let after: String = self.value.chars().skip(self.cursor + 1).collect();
            Line::from(vec![
                Span::styled(before, text_style),
                Span::styled(at.to_string(), cursor_style),
                Span::styled(after, text_style),
            ])
        } else {
            Line::from(Span::styled(self.value.clone(), text_style))
        };

        let border_color = if self.error.is_some() {
            theme.red()
        } else if self.focused {
            theme.border_focused()
        } else {
            theme.border()
        };
        let block = Block::default()
            .borders(Borders::LEFT)
            .border_type(BorderType::Thick)
            .border_style(Style::default().fg(border_color));
        frame.render_widget(Paragraph::new(line).block(block), input_area);

        if let Some(error) = self.error() {
            frame.render_widget(
                Paragraph::new(error).style(Style::default().fg(theme.red())),
                message_area,
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn type_str(input: &mut TextInput, text: &str) {
        for c in text.chars() {
            input.handle_key(key(KeyCode::Char(c))).unwrap();
        }
    }

    #[test]
    fn test_typing_emits_changes() {
        let mut input = TextInput::new("Name");
        let result = input.handle_key(key(KeyCode::Char('R'))).unwrap();
        assert_eq!(result, EventResult::Event(TextInputEvent::Changed("R".to_string())));
        type_str(&mut input, "ed");
        assert_eq!(input.value(), "Red");
        assert_eq!(
            input.handle_key(key(KeyCode::Enter)).unwrap(),
            EventResult::Event(TextInputEvent::Submitted("Red".to_string()))
        );
    }

    #[test]
    fn test_multibyte_editing() {
        let mut input = TextInput::new("Name").with_value("Café");
        input.handle_key(key(KeyCode::Left)).unwrap();
        input.handle_key(key(KeyCode::Backspace)).unwrap();
        assert_eq!(input.value(), "Caé");
        input.handle_key(key(KeyCode::End)).unwrap();
        type_str(&mut input, "s");
        assert_eq!(input.value(), "Caés");
    }

    #[test]
    fn test_delete_word() {
        let mut input = TextInput::new("Name").with_value("My Shop ");
        input
            .handle_key(KeyEvent::new(KeyCode::Backspace, KeyModifiers::ALT))
            .unwrap();
        assert_eq!(input.value(), "My ");
    }

    #[test]
    fn test_disabled_input_ignores_edits() {
        let mut input = TextInput::new("Name").with_value("Red");
        input.set_disabled(true);
        assert_eq!(
            input.handle_key(key(KeyCode::Char('x'))).unwrap(),
            EventResult::Consumed
        );
        assert_eq!(input.value(), "Red");
    }

    #[test]
    fn test_paste_inserts_at_cursor() {
        let mut input = TextInput::new("Value").with_value("#");
        let result = input.handle_paste("FF0000\n").unwrap();
        assert_eq!(result, EventResult::Event(TextInputEvent::Changed("#FF0000".to_string())));

        input.handle_key(key(KeyCode::Home)).unwrap();
        input.handle_paste("a\tb\nignored").unwrap();
        assert_eq!(input.value(), "ab#FF0000");
    }

    #[test]
    fn test_paste_into_disabled_input() {
        let mut input = TextInput::new("Value");
        input.set_disabled(true);
        assert_eq!(input.handle_paste("#FF0000").unwrap(), EventResult::Consumed);
        assert_eq!(input.value(), "");
    }

    #[test]
    fn test_focus_keys_bubble_up() {
        let mut input = TextInput::new("Name");
        assert_eq!(input.handle_key(key(KeyCode::Tab)).unwrap(), EventResult::Ignored);
    }
}
