use std::sync::Arc;

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::widgets::{
    Block, BorderType, Borders, Cell, Paragraph, Row, Table as TableWidget, TableState,
};

use crate::Theme;
use crate::config::{KeyResolver, NavAction, SearchAction};
use crate::ui::{Component, EventResult, Result};

const PAGE_STEP: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableEvent<T> {
    Activated(T),
    SearchChanged(String),
}

pub struct ColumnDef {
    pub header: &'static str,
    pub constraint: Constraint,
}

impl ColumnDef {
    pub const fn new(header: &'static str, constraint: Constraint) -> Self {
        Self { header, constraint }
    }
}

pub trait TableRow {
    fn columns() -> &'static [ColumnDef];

    fn render_cells(&self, theme: &Theme) -> Vec<Cell<'static>>;

    /// Stable identity used to keep the selection across reloads.
    fn key(&self) -> &str;

    /// Return true if this row matches the search query.
    fn matches(&self, query: &str) -> bool;
}

/// Selectable table with incremental search.
pub struct Table<T: TableRow + Clone> {
    items: Vec<T>,
    visible: Vec<usize>,
    state: TableState,
    title: Option<String>,
    empty_message: &'static str,
    searching: bool,
    query: String,
    resolver: Arc<KeyResolver>,
}

impl<T: TableRow + Clone> Table<T> {
    pub fn new(items: Vec<T>, resolver: Arc<KeyResolver>) -> Self {
        let mut table = Self {
            items: Vec::new(),
            visible: Vec::new(),
            state: TableState::default(),
            title: None,
            empty_message: "No results.",
            searching: false,
            query: String::new(),
            resolver,
        };
        table.set_items(items);
        table
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = Some(title.into());
    }

    pub const fn with_empty_message(mut self, message: &'static str) -> Self {
        self.empty_message = message;
        self
    }

    /// Replace the rows, keeping the selected row selected if it still exists.
    pub fn set_items(&mut self, items: Vec<T>) {
        let selected_key = self.selected_item().map(|item| item.key().to_string());
        self.items = items;
        self.apply_filter();
        if let Some(key) = selected_key
            && let Some(position) = self
                .visible
                .iter()
                .position(|&idx| self.items[idx].key() == key)
        {
            self.state.select(Some(position));
        }
    }

    pub fn selected_item(&self) -> Option<&T> {
        let selected = self.state.selected()?;
        let idx = *self.visible.get(selected)?;
        self.items.get(idx)
    }

    fn apply_filter(&mut self) {
        self.visible = self
            .items
            .iter()
            .enumerate()
            .filter(|(_, item)| self.query.is_empty() || item.matches(&self.query))
            .map(|(i, _)| i)
            .collect();

        if self.visible.is_empty() {
            self.state.select(None);
        } else if self
            .state
            .selected()
            .is_none_or(|i| i >= self.visible.len())
        {
            self.state.select(Some(0));
        }
    }

    fn select(&mut self, index: usize) {
        if !self.visible.is_empty() {
            self.state.select(Some(index.min(self.visible.len() - 1)));
        }
    }

    fn handle_search_key(&mut self, key: KeyEvent) -> EventResult<TableEvent<T>> {
        if self.resolver.matches_search(&key, SearchAction::Exit) {
            self.searching = false;
            let had_query = !self.query.is_empty();
            self.query.clear();
            self.apply_filter();
            return if had_query {
                TableEvent::SearchChanged(String::new()).into()
            } else {
                EventResult::Consumed
            };
        }

        // Keep the filter, leave search mode
        if self.resolver.matches_nav(&key, NavAction::Select) {
            self.searching = false;
            return EventResult::Consumed;
        }

        match key.code {
            KeyCode::Backspace => {
                self.query.pop();
                self.apply_filter();
                TableEvent::SearchChanged(self.query.clone()).into()
            }
            KeyCode::Char(c) => {
                self.query.push(c);
                self.apply_filter();
                TableEvent::SearchChanged(self.query.clone()).into()
            }
            _ => EventResult::Consumed,
        }
    }

    fn handle_navigation_key(&mut self, key: KeyEvent) -> EventResult<TableEvent<T>> {
        let current = self.state.selected().unwrap_or(0);
        let last = self.visible.len().saturating_sub(1);

        let target = if self.resolver.matches_nav(&key, NavAction::Down) {
            Some(current + 1)
        } else if self.resolver.matches_nav(&key, NavAction::Up) {
            Some(current.saturating_sub(1))
        } else if self.resolver.matches_nav(&key, NavAction::Home) {
            Some(0)
        } else if self.resolver.matches_nav(&key, NavAction::End) {
            Some(last)
        } else if self.resolver.matches_nav(&key, NavAction::PageDown) {
            Some(current + PAGE_STEP)
        } else if self.resolver.matches_nav(&key, NavAction::PageUp) {
            Some(current.saturating_sub(PAGE_STEP))
        } else {
            None
        };
        if let Some(target) = target {
            self.select(target);
            return EventResult::Consumed;
        }

        if self.resolver.matches_nav(&key, NavAction::Select) {
            return self
                .selected_item()
                .cloned()
                .map_or(EventResult::Ignored, |item| TableEvent::Activated(item).into());
        }
        if self.resolver.matches_search(&key, SearchAction::Toggle) {
            self.searching = true;
            return EventResult::Consumed;
        }
        if self.resolver.matches_search(&key, SearchAction::Exit) && !self.query.is_empty() {
            self.query.clear();
            self.apply_filter();
            return TableEvent::SearchChanged(String::new()).into();
        }

        EventResult::Ignored
    }
}

impl<T: TableRow + Clone> Component for Table<T> {
    type Output = TableEvent<T>;

    fn handle_key(&mut self, key: KeyEvent) -> Result<EventResult<Self::Output>> {
        Ok(if self.searching {
            self.handle_search_key(key)
        } else {
            self.handle_navigation_key(key)
        })
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let has_search_bar = self.searching || !self.query.is_empty();
        let (table_area, search_area) = if has_search_bar {
            let [table_area, search_area] =
                Layout::vertical([Constraint::Min(0), Constraint::Length(1)]).areas(area);
            (table_area, Some(search_area))
        } else {
            (area, None)
        };

        let columns = T::columns();
        let header = Row::new(columns.iter().map(|c| {
            Cell::from(c.header).style(
                Style::default()
                    .fg(theme.header())
                    .add_modifier(Modifier::BOLD),
            )
        }))
        .style(Style::default().bg(theme.surface0()));

        let rows: Vec<Row> = self
            .visible
            .iter()
            .map(|&idx| {
                Row::new(self.items[idx].render_cells(theme))
                    .style(Style::default().fg(theme.text()))
            })
            .collect();

        let mut block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(theme.border()));
        if let Some(title) = &self.title {
            block = block.title(title.as_str()).title_style(
                Style::default()
                    .fg(theme.mauve())
                    .add_modifier(Modifier::BOLD),
            );
        }

        if rows.is_empty() {
            let inner = block.inner(table_area);
            frame.render_widget(block, table_area);
            frame.render_widget(
                Paragraph::new(self.empty_message).style(Style::default().fg(theme.overlay1())),
                inner.centered(
                    Constraint::Length(u16::try_from(self.empty_message.len()).unwrap_or(u16::MAX)),
                    Constraint::Length(1),
                ),
            );
        } else {
            let table = TableWidget::new(rows, columns.iter().map(|c| c.constraint))
                .header(header)
                .block(block)
                .row_highlight_style(
                    Style::default()
                        .bg(theme.selection_bg())
                        .fg(theme.lavender())
                        .add_modifier(Modifier::BOLD),
                )
                .highlight_symbol("▶ ");
            frame.render_stateful_widget(table, table_area, &mut self.state);
        }

        if let Some(search_area) = search_area {
            let (text, style) = if self.searching {
                (format!("/{}_", self.query), Style::default().fg(theme.yellow()))
            } else {
                (
                    format!("/{} ({} matches)", self.query, self.visible.len()),
                    Style::default().fg(theme.subtext0()),
                )
            };
            frame.render_widget(Paragraph::new(text).style(style), search_area);
        }
    }
}

#[cfg(test)]
mod tests {
    use crossterm::event::KeyModifiers;

    use super::*;
    use crate::config::KeybindingsConfig;

    #[derive(Debug, Clone, PartialEq, Eq)]
    struct Row(&'static str);

    impl TableRow for Row {
        fn columns() -> &'static [ColumnDef] {
            static COLUMNS: &[ColumnDef] = &[ColumnDef::new("Name", Constraint::Min(10))];
            COLUMNS
        }

        fn render_cells(&self, _theme: &Theme) -> Vec<Cell<'static>> {
            vec![Cell::from(self.0)]
        }

        fn key(&self) -> &str {
            self.0
        }

        fn matches(&self, query: &str) -> bool {
            self.0.contains(query)
        }
    }

    fn table(rows: &[&'static str]) -> Table<Row> {
        let resolver = Arc::new(KeyResolver::new(Arc::new(KeybindingsConfig::default())));
        Table::new(rows.iter().copied().map(Row).collect(), resolver)
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_navigation_and_activation() {
        let mut table = table(&["red", "green", "blue"]);
        table.handle_key(key(KeyCode::Down)).unwrap();
        table.handle_key(key(KeyCode::Down)).unwrap();
        table.handle_key(key(KeyCode::Down)).unwrap();
        assert_eq!(table.selected_item(), Some(&Row("blue")));
        assert_eq!(
            table.handle_key(key(KeyCode::Enter)).unwrap(),
            EventResult::Event(TableEvent::Activated(Row("blue")))
        );
    }

    #[test]
    fn test_search_filters_rows() {
        let mut table = table(&["red", "green", "blue"]);
        table.handle_key(key(KeyCode::Char('/'))).unwrap();
        table.handle_key(key(KeyCode::Char('e'))).unwrap();
        table.handle_key(key(KeyCode::Char('e'))).unwrap();
        assert_eq!(table.selected_item(), Some(&Row("green")));

        // Enter keeps the filter
        table.handle_key(key(KeyCode::Enter)).unwrap();
        assert!(!table.searching);
        assert_eq!(table.selected_item(), Some(&Row("green")));

        // Esc outside search mode clears it
        assert_eq!(
            table.handle_key(key(KeyCode::Esc)).unwrap(),
            EventResult::Event(TableEvent::SearchChanged(String::new()))
        );
        assert_eq!(table.visible.len(), 3);
    }

    #[test]
    fn test_reload_keeps_selection() {
        let mut table = table(&["red", "green", "blue"]);
        table.handle_key(key(KeyCode::Char('j'))).unwrap();
        table.set_items(vec![Row("amber"), Row("green")]);
        assert_eq!(table.selected_item(), Some(&Row("green")));
        table.set_items(vec![Row("amber")]);
        assert_eq!(table.selected_item(), Some(&Row("amber")));
    }

    #[test]
    fn test_empty_table_ignores_select() {
        let mut table = table(&[]);
        assert_eq!(table.handle_key(key(KeyCode::Enter)).unwrap(), EventResult::Ignored);
    }
}
