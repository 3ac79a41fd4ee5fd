use std::sync::Arc;

use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Paragraph};

use crate::Theme;
use crate::config::{GlobalAction, KeyResolver};
use crate::model::StoreId;
use crate::ui::Keybinding;

const LABEL_WIDTH: usize = 8;

/// Bottom panel: active store and backend on the left, key hints on the right.
pub struct StatusBar {
    store: Option<StoreId>,
    api_url: String,
    resolver: Arc<KeyResolver>,
}

impl StatusBar {
    pub fn new(api_url: impl Into<String>, resolver: Arc<KeyResolver>) -> Self {
        Self {
            store: None,
            api_url: api_url.into(),
            resolver,
        }
    }

    pub fn set_store(&mut self, store: Option<StoreId>) {
        self.store = store;
    }

    /// Rows needed: one per info line plus the border.
    pub const fn height() -> u16 {
        5
    }

    pub fn render_with_keybindings(
        &self,
        frame: &mut Frame,
        area: Rect,
        theme: &Theme,
        breadcrumbs: &[String],
        local_keybindings: &[Keybinding],
    ) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(theme.surface1()));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let [info_area, keys_area] =
            Layout::horizontal([Constraint::Length(44), Constraint::Min(20)]).areas(inner);

        self.render_info(frame, info_area, theme, breadcrumbs);
        self.render_keybindings(frame, keys_area, theme, local_keybindings);
    }

    fn render_info(&self, frame: &mut Frame, area: Rect, theme: &Theme, breadcrumbs: &[String]) {
        let width = area.width as usize;
        let label = Style::default().fg(theme.overlay1());
        let value = Style::default().fg(theme.text());

        let store_line = self.store.as_ref().map_or_else(
            || {
                Line::from(Span::styled(
                    "No store selected",
                    Style::default().fg(theme.overlay0()).add_modifier(Modifier::BOLD),
                ))
            },
            |store| {
                Line::from(Span::styled(
                    truncate_str(&format!("store {store}"), width),
                    Style::default().fg(theme.lavender()).add_modifier(Modifier::BOLD),
                ))
            },
        );

        let lines = vec![
            store_line,
            status_line("api", &self.api_url, width, label, value),
            status_line("path", &breadcrumbs.join(" › "), width, label, value),
        ];
        frame.render_widget(Paragraph::new(lines), area);
    }

    fn render_keybindings(
        &self,
        frame: &mut Frame,
        area: Rect,
        theme: &Theme,
        local_keybindings: &[Keybinding],
    ) {
        let global = self.global_keybindings();
        let hints: Vec<&Keybinding> = local_keybindings.iter().chain(global.iter()).collect();
        if hints.is_empty() || area.height == 0 {
            return;
        }

        let key_width = hints.iter().map(|kb| kb.key.chars().count()).max().unwrap_or(1);
        let desc_width = hints.iter().map(|kb| kb.description.len()).max().unwrap_or(1);
        let col_width = u16::try_from(key_width + 3 + desc_width + 2).unwrap_or(u16::MAX);
        let num_cols = (area.width / col_width).max(1) as usize;
        let num_rows = area.height as usize;

        // Fill column by column
        let mut columns: Vec<Vec<Line>> = vec![Vec::new(); num_cols];
        for (i, kb) in hints.iter().enumerate() {
            let col = i / num_rows;
            if col >= num_cols {
                break;
            }
            columns[col].push(Line::from(vec![
                Span::styled(
                    format!("{:>key_width$}", kb.key),
                    Style::default().fg(theme.peach()),
                ),
                Span::styled(" │ ", Style::default().fg(theme.surface1())),
                Span::styled(kb.description, Style::default().fg(theme.subtext0())),
            ]));
        }

        let col_areas =
            Layout::horizontal(vec![Constraint::Length(col_width); num_cols]).split(area);
        for (lines, col_area) in columns.into_iter().zip(col_areas.iter()) {
            frame.render_widget(Paragraph::new(lines), *col_area);
        }
    }

    pub fn global_keybindings(&self) -> Vec<Keybinding> {
        vec![
            Keybinding::new(self.resolver.display_global(GlobalAction::Back), "Back"),
            Keybinding::new(self.resolver.display_global(GlobalAction::NewStore), "New store"),
            Keybinding::new(self.resolver.display_global(GlobalAction::Quit), "Quit"),
        ]
    }
}

fn status_line<'a>(
    label: &'a str,
    value: &str,
    max_width: usize,
    label_style: Style,
    value_style: Style,
) -> Line<'a> {
    let available = max_width.saturating_sub(LABEL_WIDTH + 1);
    Line::from(vec![
        Span::styled(format!("{label:>LABEL_WIDTH$}"), label_style),
        Span::raw(" "),
        Span::styled(truncate_str(value, available), value_style),
    ])
}

/// Truncate to `max_width` characters, ending in "..." when cut.
fn truncate_str(s: &str, max_width: usize) -> String {
    if s.chars().count() <= max_width {
        s.to_string()
    } else if max_width > 3 {
        let kept: String = s.chars().take(max_width - 3).collect();
        format!("{kept}...")
    } else {
        s.chars().take(max_width).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_str() {
        assert_eq!(truncate_str("Summer Sale", 20), "Summer Sale");
        assert_eq!(truncate_str("Summer Sale", 8), "Summe...");
        assert_eq!(truncate_str("Ümlaut", 2), "Üm");
    }
}
