use std::sync::Arc;

use crossterm::event::KeyEvent;
use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Clear, Paragraph, Wrap};

use crate::Theme;
use crate::config::{DialogAction, KeyResolver};
use crate::ui::{Component, EventResult, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmEvent {
    Confirmed,
    Cancelled,
}

/// Yes/no gate shown before destructive operations.
///
/// While loading, the dialog stays open and swallows every key so the
/// operation cannot be confirmed twice or cancelled halfway.
pub struct ConfirmDialog {
    title: String,
    message: String,
    confirm_text: String,
    cancel_text: String,
    danger: bool,
    loading: bool,
    resolver: Arc<KeyResolver>,
}

impl ConfirmDialog {
    pub fn new(message: impl Into<String>, resolver: Arc<KeyResolver>) -> Self {
        Self {
            title: "Are you sure?".to_string(),
            message: message.into(),
            confirm_text: "Continue".to_string(),
            cancel_text: "Cancel".to_string(),
            danger: false,
            loading: false,
            resolver,
        }
    }

    pub fn with_confirm_text(mut self, text: impl Into<String>) -> Self {
        self.confirm_text = text.into();
        self
    }

    pub const fn danger(mut self) -> Self {
        self.danger = true;
        self
    }

    pub const fn set_loading(&mut self, loading: bool) {
        self.loading = loading;
    }
}

impl Component for ConfirmDialog {
    type Output = ConfirmEvent;

    fn handle_key(&mut self, key: KeyEvent) -> Result<EventResult<Self::Output>> {
        if self.loading {
            return Ok(EventResult::Consumed);
        }
        if self.resolver.matches_dialog(&key, DialogAction::Confirm) {
            return Ok(ConfirmEvent::Confirmed.into());
        }
        if self.resolver.matches_dialog(&key, DialogAction::Cancel) {
            return Ok(ConfirmEvent::Cancelled.into());
        }
        Ok(EventResult::Consumed)
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let popup_area = area.centered(Constraint::Percentage(50), Constraint::Length(8));
        frame.render_widget(Clear, popup_area);

        let accent = if self.danger { theme.red() } else { theme.mauve() };
        let key_style = Style::default()
            .fg(theme.peach())
            .add_modifier(Modifier::BOLD);
        let disabled_style = Style::default().fg(theme.overlay0());

        let actions = if self.loading {
            Line::from(Span::styled("Working...", disabled_style))
        } else {
            Line::from(vec![
                Span::styled(
                    format!("[{}]", self.resolver.display_dialog(DialogAction::Confirm)),
                    key_style,
                ),
                Span::raw(" "),
                Span::styled(
                    self.confirm_text.clone(),
                    Style::default().fg(accent).add_modifier(Modifier::BOLD),
                ),
                Span::raw("    "),
                Span::styled(
                    format!("[{}]", self.resolver.display_dialog(DialogAction::Cancel)),
                    key_style,
                ),
                Span::raw(" "),
                Span::styled(self.cancel_text.clone(), Style::default().fg(theme.overlay1())),
            ])
        };

        let lines = vec![
            Line::from(""),
            Line::from(Span::styled(self.message.clone(), Style::default().fg(theme.text()))),
            Line::from(""),
            actions,
        ];

        let block = Block::default()
            .title(format!(" {} ", self.title))
            .title_style(Style::default().fg(accent).add_modifier(Modifier::BOLD))
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(accent))
            .style(Style::default().bg(theme.base()));

        let paragraph = Paragraph::new(lines)
            .block(block)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true });

        frame.render_widget(paragraph, popup_area);
    }
}

#[cfg(test)]
mod tests {
    use crossterm::event::{KeyCode, KeyModifiers};

    use super::*;
    use crate::config::KeybindingsConfig;

    fn dialog() -> ConfirmDialog {
        let resolver = Arc::new(KeyResolver::new(Arc::new(KeybindingsConfig::default())));
        ConfirmDialog::new("This action cannot be undone.", resolver)
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_confirm_and_cancel() {
        let mut dialog = dialog();
        assert_eq!(
            dialog.handle_key(key(KeyCode::Char('y'))).unwrap(),
            EventResult::Event(ConfirmEvent::Confirmed)
        );
        assert_eq!(
            dialog.handle_key(key(KeyCode::Esc)).unwrap(),
            EventResult::Event(ConfirmEvent::Cancelled)
        );
        assert_eq!(
            dialog.handle_key(key(KeyCode::Char('x'))).unwrap(),
            EventResult::Consumed
        );
    }

    #[test]
    fn test_loading_swallows_keys() {
        let mut dialog = dialog();
        dialog.set_loading(true);
        assert_eq!(
            dialog.handle_key(key(KeyCode::Char('y'))).unwrap(),
            EventResult::Consumed
        );
        assert_eq!(dialog.handle_key(key(KeyCode::Esc)).unwrap(), EventResult::Consumed);
    }
}
