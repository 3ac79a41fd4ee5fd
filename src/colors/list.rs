use std::sync::Arc;

use async_trait::async_trait;
use color_eyre::Result;
use crossterm::event::KeyEvent;
use ratatui::Frame;
use ratatui::layout::{Constraint, Rect};
use ratatui::style::{Color as TermColor, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Cell;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{info, warn};

use super::{ColorManager, ColorMsg};
use crate::Theme;
use crate::api::{ApiError, ResourceApi};
use crate::app::AppMessage;
use crate::commands::{Command, CopyToClipboardCmd};
use crate::config::{KeyResolver, ListAction, NavAction, SearchAction};
use crate::model::{Color, ColorId, StoreId, display_date};
use crate::navigation::{Navigation, Route};
use crate::search::Matcher;
use crate::service::ServiceMsg;
use crate::ui::{
    ColumnDef, Component, EventResult, Keybinding, Screen, Table, TableEvent, TableRow,
};

const COPIED: &str = "Color ID copied to clipboard.";

// === Models ===

impl TableRow for Color {
    fn columns() -> &'static [ColumnDef] {
        static COLUMNS: &[ColumnDef] = &[
            ColumnDef::new("Name", Constraint::Min(20)),
            ColumnDef::new("Value", Constraint::Length(14)),
            ColumnDef::new("Date", Constraint::Length(20)),
        ];
        COLUMNS
    }

    fn render_cells(&self, _theme: &Theme) -> Vec<Cell<'static>> {
        let mut value = vec![Span::raw(self.value.clone())];
        if let Some((r, g, b)) = self.swatch() {
            value.insert(0, Span::styled("■ ", Style::default().fg(TermColor::Rgb(r, g, b))));
        }

        vec![
            Cell::from(self.name.clone()),
            Cell::from(Line::from(value)),
            Cell::from(display_date(self.created_at.as_ref())),
        ]
    }

    fn key(&self) -> &str {
        self.id.as_str()
    }

    fn matches(&self, query: &str) -> bool {
        Matcher::new().matches_any([self.name.as_str(), self.value.as_str()], query)
    }
}

// === Messages ===

#[derive(Debug)]
pub(super) enum ListMsg {
    Load,
    Loaded(Result<Vec<Color>, ApiError>),
    New,
    Edit(ColorId),
    CopyId(ColorId),
}

impl From<ListMsg> for ColorMsg {
    fn from(msg: ListMsg) -> Self {
        Self::List(msg)
    }
}

impl From<ListMsg> for EventResult<ColorMsg> {
    fn from(msg: ListMsg) -> Self {
        Self::Event(ColorMsg::List(msg))
    }
}

// === Screens ===

pub(super) struct ColorListScreen {
    table: Table<Color>,
    resolver: Arc<KeyResolver>,
}

impl ColorListScreen {
    pub(super) fn new(colors: Vec<Color>, resolver: Arc<KeyResolver>) -> Self {
        let title = title(colors.len());
        Self {
            table: Table::new(colors, resolver.clone())
                .with_title(title)
                .with_empty_message("No colors yet. Press n to add one."),
            resolver,
        }
    }

    pub(super) fn set_colors(&mut self, colors: Vec<Color>) {
        self.table.set_title(title(colors.len()));
        self.table.set_items(colors);
    }
}

fn title(count: usize) -> String {
    format!(" Colors ({count}) ")
}

impl Screen for ColorListScreen {
    type Output = ColorMsg;

    fn handle_key(&mut self, key: KeyEvent) -> Result<EventResult<Self::Output>> {
        match self.table.handle_key(key)? {
            EventResult::Event(TableEvent::Activated(color)) => {
                return Ok(ListMsg::Edit(color.id).into());
            }
            EventResult::Ignored => {}
            EventResult::Consumed | EventResult::Event(_) => return Ok(EventResult::Consumed),
        }

        if self.resolver.matches_list(&key, ListAction::New) {
            return Ok(ListMsg::New.into());
        }
        if self.resolver.matches_list(&key, ListAction::Reload) {
            return Ok(ListMsg::Load.into());
        }
        if self.resolver.matches_list(&key, ListAction::Copy)
            && let Some(color) = self.table.selected_item()
        {
            return Ok(ListMsg::CopyId(color.id.clone()).into());
        }
        Ok(EventResult::Ignored)
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
        self.table.render(frame, area, theme);
    }

    fn keybindings(&self) -> Vec<Keybinding> {
        vec![
            Keybinding::new(self.resolver.display_nav(NavAction::Select), "Edit"),
            Keybinding::new(self.resolver.display_list(ListAction::New), "New"),
            Keybinding::new(self.resolver.display_list(ListAction::Copy), "Copy ID"),
            Keybinding::new(self.resolver.display_list(ListAction::Reload), "Reload"),
            Keybinding::new(self.resolver.display_search(SearchAction::Toggle), "Search"),
        ]
    }
}

// === Update Logic ===

pub(super) fn update(state: &mut ColorManager, msg: ListMsg) -> Result<ServiceMsg> {
    match msg {
        ListMsg::Load => {
            state.spinner.set_label("Loading colors...");
            Ok(state.fetch_colors())
        }

        ListMsg::Loaded(Ok(colors)) => {
            info!("Loaded {} colors for store {}", colors.len(), state.store);
            state.colors_loaded(Some(colors))
        }

        ListMsg::Loaded(Err(err)) => {
            warn!("Failed to load colors for store {}: {err}", state.store);
            state.colors_loaded(None)
        }

        ListMsg::New => state.navigate(Navigation::Push(Route::NewColor(state.store.clone()))),

        ListMsg::Edit(id) => state.navigate(Navigation::Push(Route::EditColor(
            state.store.clone(),
            id,
        ))),

        ListMsg::CopyId(id) => Ok(CopyToClipboardCmd::new(id.to_string(), COPIED).into()),
    }
}

// === Commands ===

pub(super) struct FetchColorsCmd {
    pub(super) api: Arc<dyn ResourceApi<Color>>,
    pub(super) store: StoreId,
    pub(super) tx: UnboundedSender<ColorMsg>,
}

#[async_trait]
impl Command for FetchColorsCmd {
    fn name(&self) -> String {
        format!("Loading colors for store {}", self.store)
    }

    async fn execute(self: Box<Self>, _app_tx: UnboundedSender<AppMessage>) -> Result<()> {
        // Failures are reported as a message so waiting forms can still move on
        let result = self.api.list(&self.store).await;
        self.tx.send(ListMsg::Loaded(result).into())?;
        Ok(())
    }
}
