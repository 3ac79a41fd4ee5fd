use std::sync::Arc;

use async_trait::async_trait;
use color_eyre::Result;
use color_eyre::eyre::eyre;
use crossterm::event::KeyEvent;
use ratatui::Frame;
use ratatui::layout::{Constraint, Rect};
use ratatui::style::Style;
use ratatui::widgets::Cell;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{info, warn};

use crate::Theme;
use crate::api::{ApiError, StoreDirectory};
use crate::app::AppMessage;
use crate::commands::Command;
use crate::config::{GlobalAction, KeyResolver, ListAction, NavAction, SearchAction};
use crate::context::AppContext;
use crate::model::{Store, display_date};
use crate::navigation::{Navigation, Route};
use crate::search::Matcher;
use crate::service::{Service, ServiceMsg};
use crate::ui::{
    ColumnDef, Component, EventResult, Keybinding, Screen, Spinner, Table, TableEvent, TableRow,
};

// === Models ===

impl TableRow for Store {
    fn columns() -> &'static [ColumnDef] {
        static COLUMNS: &[ColumnDef] = &[
            ColumnDef::new("Name", Constraint::Min(24)),
            ColumnDef::new("Created", Constraint::Length(20)),
            ColumnDef::new("ID", Constraint::Min(28)),
        ];
        COLUMNS
    }

    fn render_cells(&self, theme: &Theme) -> Vec<Cell<'static>> {
        vec![
            Cell::from(self.name.clone()),
            Cell::from(display_date(self.created_at.as_ref())),
            Cell::from(self.id.to_string()).style(Style::default().fg(theme.overlay1())),
        ]
    }

    fn key(&self) -> &str {
        self.id.as_str()
    }

    fn matches(&self, query: &str) -> bool {
        Matcher::new().matches_any([self.name.as_str(), self.id.as_str()], query)
    }
}

// === Messages ===

#[derive(Debug)]
pub(crate) enum StoresMsg {
    Load,
    Loaded(Result<Vec<Store>, ApiError>),
    Open(Store),
    Create,
}

// === Screens ===

pub(crate) struct StoreListScreen {
    table: Table<Store>,
    resolver: Arc<KeyResolver>,
}

impl StoreListScreen {
    pub(crate) fn new(stores: Vec<Store>, resolver: Arc<KeyResolver>) -> Self {
        Self {
            table: Table::new(stores, resolver.clone())
                .with_title(" Stores ")
                .with_empty_message("No stores yet."),
            resolver,
        }
    }
}

impl Screen for StoreListScreen {
    type Output = StoresMsg;

    fn handle_key(&mut self, key: KeyEvent) -> Result<EventResult<Self::Output>> {
        match self.table.handle_key(key)? {
            EventResult::Event(TableEvent::Activated(store)) => {
                return Ok(StoresMsg::Open(store).into());
            }
            EventResult::Ignored => {}
            EventResult::Consumed | EventResult::Event(_) => return Ok(EventResult::Consumed),
        }

        if self.resolver.matches_list(&key, ListAction::New) {
            return Ok(StoresMsg::Create.into());
        }
        if self.resolver.matches_list(&key, ListAction::Reload) {
            return Ok(StoresMsg::Load.into());
        }
        Ok(EventResult::Ignored)
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
        self.table.render(frame, area, theme);
    }

    fn keybindings(&self) -> Vec<Keybinding> {
        vec![
            Keybinding::new(self.resolver.display_nav(NavAction::Select), "Open"),
            Keybinding::new(self.resolver.display_list(ListAction::New), "New"),
            Keybinding::new(self.resolver.display_list(ListAction::Reload), "Reload"),
            Keybinding::new(self.resolver.display_search(SearchAction::Toggle), "Search"),
        ]
    }
}

// === Service ===

enum State {
    Loading,
    List(StoreListScreen),
}

/// Landing page: pick a store to manage or create the first one.
pub struct StoreSelector {
    ctx: AppContext,
    state: State,
    spinner: Spinner,
    msg_tx: UnboundedSender<StoresMsg>,
    msg_rx: UnboundedReceiver<StoresMsg>,
}

impl StoreSelector {
    pub fn new(ctx: AppContext) -> Self {
        let (msg_tx, msg_rx) = mpsc::unbounded_channel();
        Self {
            ctx,
            state: State::Loading,
            spinner: Spinner::new().with_label("Loading stores..."),
            msg_tx,
            msg_rx,
        }
    }

    fn queue(&self, msg: StoresMsg) {
        let _ = self.msg_tx.send(msg);
    }

    fn process_message(&mut self, msg: StoresMsg) -> Result<ServiceMsg> {
        match msg {
            StoresMsg::Load => {
                self.state = State::Loading;
                Ok(FetchStoresCmd {
                    stores: self.ctx.stores.clone(),
                    tx: self.msg_tx.clone(),
                }
                .into())
            }
            StoresMsg::Loaded(Ok(stores)) => {
                info!("Loaded {} stores", stores.len());
                // Nothing to pick from: go straight to creating one
                if stores.is_empty() {
                    self.ctx.store_modal.open();
                }
                self.show_list(stores);
                Ok(ServiceMsg::Idle)
            }
            StoresMsg::Loaded(Err(err)) => {
                warn!("Failed to load stores: {err}");
                self.show_list(Vec::new());
                Err(eyre!("Failed to load stores: {err}"))
            }
            StoresMsg::Open(store) => Ok(ServiceMsg::Navigate(Navigation::Hard(Route::Store(
                store.id,
            )))),
            StoresMsg::Create => {
                self.ctx.store_modal.open();
                Ok(ServiceMsg::Idle)
            }
        }
    }

    fn show_list(&mut self, stores: Vec<Store>) {
        if let State::List(screen) = &mut self.state {
            screen.table.set_items(stores);
        } else {
            self.state = State::List(StoreListScreen::new(stores, self.ctx.resolver.clone()));
        }
    }
}

impl Service for StoreSelector {
    fn init(&mut self) {
        self.queue(StoresMsg::Load);
    }

    fn handle_tick(&mut self) {
        if matches!(self.state, State::Loading) {
            self.spinner.handle_tick();
        }
    }

    fn handle_key(&mut self, key: KeyEvent) -> EventResult<()> {
        let State::List(screen) = &mut self.state else {
            return EventResult::Ignored;
        };
        match screen.handle_key(key) {
            Ok(EventResult::Event(msg)) => {
                self.queue(msg);
                EventResult::Consumed
            }
            Ok(EventResult::Consumed) => EventResult::Consumed,
            Ok(EventResult::Ignored) | Err(_) => {
                // Esc on the landing page has nowhere to go
                if self.ctx.resolver.matches_global(&key, GlobalAction::Back) {
                    EventResult::Consumed
                } else {
                    EventResult::Ignored
                }
            }
        }
    }

    fn update(&mut self) -> Result<ServiceMsg> {
        let mut result = ServiceMsg::Idle;
        while let Ok(msg) = self.msg_rx.try_recv() {
            result = result.merge(self.process_message(msg)?);
        }
        Ok(result)
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
        match &mut self.state {
            State::Loading => self.spinner.render(frame, area, theme),
            State::List(screen) => screen.render(frame, area, theme),
        }
    }

    fn breadcrumbs(&self) -> Vec<String> {
        vec!["Stores".to_string()]
    }

    fn keybindings(&self) -> Vec<Keybinding> {
        match &self.state {
            State::Loading => vec![],
            State::List(screen) => screen.keybindings(),
        }
    }
}

// === Commands ===

struct FetchStoresCmd {
    stores: Arc<dyn StoreDirectory>,
    tx: UnboundedSender<StoresMsg>,
}

#[async_trait]
impl Command for FetchStoresCmd {
    fn name(&self) -> String {
        "Loading stores".to_string()
    }

    async fn execute(self: Box<Self>, _app_tx: UnboundedSender<AppMessage>) -> Result<()> {
        let result = self.stores.list_stores().await;
        self.tx.send(StoresMsg::Loaded(result))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use crossterm::event::{KeyCode, KeyModifiers};

    use super::*;
    use crate::api::ResourceApi;
    use crate::config::{AppConfig, KeybindingsConfig};
    use crate::modal::ModalVisibility;
    use crate::model::{Color, ColorId, ColorInput, StoreId, StoreInput};

    struct FakeDirectory {
        stores: Vec<Store>,
        fail: bool,
        lists: Mutex<usize>,
    }

    impl FakeDirectory {
        fn new(stores: Vec<Store>) -> Self {
            Self {
                stores,
                fail: false,
                lists: Mutex::new(0),
            }
        }
    }

    #[async_trait]
    impl StoreDirectory for FakeDirectory {
        async fn list_stores(&self) -> Result<Vec<Store>, ApiError> {
            *self.lists.lock().unwrap() += 1;
            if self.fail {
                return Err(ApiError::Network {
                    detail: "connection refused".to_string(),
                });
            }
            Ok(self.stores.clone())
        }

        async fn create_store(&self, _input: &StoreInput) -> Result<Store, ApiError> {
            Err(ApiError::Network {
                detail: "unused".to_string(),
            })
        }
    }

    struct NoColors;

    #[async_trait]
    impl ResourceApi<Color> for NoColors {
        async fn list(&self, _store: &StoreId) -> Result<Vec<Color>, ApiError> {
            Ok(Vec::new())
        }

        async fn create(&self, _store: &StoreId, _input: &ColorInput) -> Result<(), ApiError> {
            Ok(())
        }

        async fn update(
            &self,
            _store: &StoreId,
            _id: &ColorId,
            _input: &ColorInput,
        ) -> Result<(), ApiError> {
            Ok(())
        }

        async fn delete(&self, _store: &StoreId, _id: &ColorId) -> Result<(), ApiError> {
            Ok(())
        }
    }

    fn store(id: &str, name: &str) -> Store {
        Store {
            id: StoreId::new(id),
            name: name.to_string(),
            created_at: None,
            updated_at: None,
        }
    }

    struct Harness {
        selector: StoreSelector,
        directory: Arc<FakeDirectory>,
        modal: ModalVisibility,
        app_tx: UnboundedSender<AppMessage>,
        _app_rx: UnboundedReceiver<AppMessage>,
    }

    impl Harness {
        fn new(directory: FakeDirectory) -> Self {
            let directory = Arc::new(directory);
            let (app_tx, app_rx) = mpsc::unbounded_channel();
            let modal = ModalVisibility::new();
            let ctx = AppContext {
                config: Arc::new(AppConfig::default()),
                resolver: Arc::new(KeyResolver::new(Arc::new(KeybindingsConfig::default()))),
                stores: directory.clone(),
                colors: Arc::new(NoColors),
                store_modal: modal.clone(),
                app_tx: app_tx.clone(),
            };
            let mut selector = StoreSelector::new(ctx);
            selector.init();
            Self {
                selector,
                directory,
                modal,
                app_tx,
                _app_rx: app_rx,
            }
        }

        /// Run queued work until the selector has nothing left to do.
        async fn settle(&mut self) -> Result<ServiceMsg> {
            loop {
                match self.selector.update()? {
                    ServiceMsg::Run(commands) => {
                        for command in commands {
                            command.execute(self.app_tx.clone()).await?;
                        }
                    }
                    other => return Ok(other),
                }
            }
        }

        fn press(&mut self, code: KeyCode) -> EventResult<()> {
            self.selector.handle_key(KeyEvent::new(code, KeyModifiers::NONE))
        }
    }

    #[tokio::test]
    async fn test_empty_listing_opens_modal() {
        let mut h = Harness::new(FakeDirectory::new(vec![]));
        assert!(matches!(h.settle().await.unwrap(), ServiceMsg::Idle));

        assert!(h.modal.is_open());
        assert!(matches!(h.selector.state, State::List(_)));
    }

    #[tokio::test]
    async fn test_enter_opens_store_with_hard_navigation() {
        let mut h = Harness::new(FakeDirectory::new(vec![
            store("s1", "My Shop"),
            store("s2", "Outlet"),
        ]));
        h.settle().await.unwrap();
        assert!(!h.modal.is_open());

        h.press(KeyCode::Down);
        assert!(h.press(KeyCode::Enter).is_consumed());
        let result = h.settle().await.unwrap();

        assert!(matches!(
            result,
            ServiceMsg::Navigate(Navigation::Hard(Route::Store(id))) if id.as_str() == "s2"
        ));
    }

    #[tokio::test]
    async fn test_failed_load_is_reported() {
        let mut directory = FakeDirectory::new(vec![]);
        directory.fail = true;
        let mut h = Harness::new(directory);

        let Err(err) = h.settle().await else {
            panic!("expected the load failure to be reported");
        };

        assert!(err.to_string().contains("connection refused"));
        assert!(matches!(h.selector.state, State::List(_)));
        assert!(!h.modal.is_open());
    }

    #[tokio::test]
    async fn test_list_keys() {
        let mut h = Harness::new(FakeDirectory::new(vec![store("s1", "My Shop")]));
        h.settle().await.unwrap();

        h.press(KeyCode::Char('n'));
        h.settle().await.unwrap();
        assert!(h.modal.is_open());

        h.press(KeyCode::Char('r'));
        h.settle().await.unwrap();
        assert_eq!(*h.directory.lists.lock().unwrap(), 2);

        // The landing page has nothing to go back to
        assert!(h.press(KeyCode::Esc).is_consumed());
        assert!(matches!(h.settle().await.unwrap(), ServiceMsg::Idle));
    }
}
