use std::collections::VecDeque;
use std::time::{Duration, Instant};

use ratatui::Frame;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::widgets::{Block, BorderType, Borders, Clear, Paragraph, Wrap};

use crate::Theme;
use crate::ui::Component;

const TOAST_HEIGHT: u16 = 3;
const TOAST_WIDTH: u16 = 56;
const MAX_VISIBLE: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastType {
    Success,
    Error,
    Info,
}

impl ToastType {
    const fn lifetime(self) -> Duration {
        match self {
            Self::Error => Duration::from_secs(5),
            Self::Success | Self::Info => Duration::from_secs(3),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Toast {
    message: String,
    toast_type: ToastType,
    created_at: Instant,
    duration: Duration,
}

impl Toast {
    pub fn new(message: impl Into<String>, toast_type: ToastType) -> Self {
        Self {
            message: message.into(),
            toast_type,
            created_at: Instant::now(),
            duration: toast_type.lifetime(),
        }
    }

    fn is_expired(&self) -> bool {
        self.created_at.elapsed() >= self.duration
    }
}

/// Transient notifications stacked in the bottom-right corner.
#[derive(Default)]
pub struct ToastManager {
    toasts: VecDeque<Toast>,
}

impl ToastManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn show(&mut self, toast: Toast) {
        self.toasts.push_back(toast);
        while self.toasts.len() > MAX_VISIBLE {
            self.toasts.pop_front();
        }
    }
}

impl Component for ToastManager {
    type Output = ();

    fn handle_tick(&mut self) {
        self.toasts.retain(|t| !t.is_expired());
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let width = TOAST_WIDTH.min(area.width.saturating_sub(4));
        let x = area.x + area.width.saturating_sub(width + 2);

        // Newest toast sits at the bottom
        for (i, toast) in self.toasts.iter().rev().enumerate() {
            let offset = u16::try_from(i).unwrap_or(u16::MAX).saturating_mul(TOAST_HEIGHT + 1);
            let Some(y) = (area.y + area.height).checked_sub(TOAST_HEIGHT + offset + 1) else {
                break;
            };
            if y < area.y {
                break;
            }
            let toast_area = Rect::new(x, y, width, TOAST_HEIGHT);

            let (color, icon) = match toast.toast_type {
                ToastType::Success => (theme.green(), "✓"),
                ToastType::Error => (theme.red(), "✗"),
                ToastType::Info => (theme.blue(), "ℹ"),
            };

            frame.render_widget(Clear, toast_area);
            let block = Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(color))
                .style(Style::default().bg(theme.surface0()));
            let paragraph = Paragraph::new(format!("{icon} {}", toast.message))
                .block(block)
                .style(Style::default().fg(theme.text()).add_modifier(Modifier::BOLD))
                .alignment(Alignment::Center)
                .wrap(Wrap { trim: true });
            frame.render_widget(paragraph, toast_area);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keeps_newest_toasts() {
        let mut manager = ToastManager::new();
        for i in 0..5 {
            manager.show(Toast::new(format!("toast {i}"), ToastType::Success));
        }
        let messages: Vec<_> = manager.toasts.iter().map(|t| t.message.as_str()).collect();
        assert_eq!(messages, ["toast 2", "toast 3", "toast 4"]);
    }

    #[test]
    fn test_expired_toasts_are_dropped() {
        let mut manager = ToastManager::new();
        let mut toast = Toast::new("Something went wrong.", ToastType::Error);
        toast.duration = Duration::ZERO;
        manager.show(toast);
        manager.show(Toast::new("Color created.", ToastType::Success));
        manager.handle_tick();
        let remaining: Vec<_> = manager.toasts.iter().map(|t| t.toast_type).collect();
        assert_eq!(remaining, [ToastType::Success]);
    }
}
