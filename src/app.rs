//! Application shell.
//!
//! Owns the active [`Service`], the global overlays (store modal, error
//! dialog, toasts) and the status bar, and runs commands on the tokio runtime.

use std::sync::Arc;

use color_eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::layout::{Constraint, Layout, Rect};
use tokio::sync::mpsc::{self, UnboundedReceiver};
use tracing::{debug, error, info, warn};

use crate::Theme;
use crate::api::{ApiError, HttpClient};
use crate::colors::ColorManager;
use crate::commands::Command;
use crate::config::{self, AppConfig, GlobalAction, KeyResolver};
use crate::context::AppContext;
use crate::form::FormEffect;
use crate::modal::ModalVisibility;
use crate::model::Store;
use crate::navigation::{Navigation, Route};
use crate::service::{Service, ServiceMsg};
use crate::stores::{CreateStoreCmd, StoreModal, StoreModalEvent, StoreSelector};
use crate::tui::{Event, Tui};
use crate::ui::{
    Component, ErrorDialog, ErrorDialogEvent, EventResult, StatusBar, Toast, ToastManager,
    ToastType,
};

const FRAME_RATE: f64 = 30.0;
const TICK_RATE: f64 = 8.0;

/// Messages sent to the App from commands and services.
#[derive(Debug)]
pub enum AppMessage {
    ShowToast {
        message: String,
        toast_type: ToastType,
    },
    /// Result of the store modal's create request.
    StoreCreated(Result<Store, ApiError>),
    /// A command finished; the active service should process its queue.
    CommandCompleted,
    CommandFailed {
        name: String,
        error: String,
    },
}

pub struct App {
    ctx: AppContext,
    theme: Theme,
    route: Route,
    service: Box<dyn Service>,
    /// Mounted while the store modal's visibility flag is open.
    store_modal: Option<StoreModal>,
    error_dialog: Option<ErrorDialog>,
    toasts: ToastManager,
    status_bar: StatusBar,
    should_quit: bool,
    should_suspend: bool,
    app_rx: UnboundedReceiver<AppMessage>,
}

impl App {
    pub fn new(config: Arc<AppConfig>, client: HttpClient, theme: Theme, route: Route) -> Self {
        let (app_tx, app_rx) = mpsc::unbounded_channel();
        let resolver = Arc::new(KeyResolver::new(Arc::new(config.keybindings.clone())));
        let client = Arc::new(client);
        let status_bar = StatusBar::new(client.base_url().as_str(), resolver.clone());

        let ctx = AppContext {
            config,
            resolver,
            stores: client.clone(),
            colors: client,
            store_modal: ModalVisibility::new(),
            app_tx,
        };

        Self::with_context(ctx, app_rx, theme, route, status_bar)
    }

    fn with_context(
        ctx: AppContext,
        app_rx: UnboundedReceiver<AppMessage>,
        theme: Theme,
        route: Route,
        status_bar: StatusBar,
    ) -> Self {
        let service = build_service(&ctx, &route);
        Self {
            ctx,
            theme,
            route,
            service,
            store_modal: None,
            error_dialog: None,
            toasts: ToastManager::new(),
            status_bar,
            should_quit: false,
            should_suspend: false,
            app_rx,
        }
    }

    pub async fn run(&mut self) -> Result<()> {
        let mut tui = Tui::new(FRAME_RATE, TICK_RATE)?;
        tui.enter()?;
        self.start_service();
        let mut modal_rx = self.ctx.store_modal.subscribe();

        loop {
            tokio::select! {
                event = tui.next_event() => match event {
                    Some(event) => self.handle_event(event, &mut tui)?,
                    None => break,
                },
                Some(message) = self.app_rx.recv() => self.handle_message(message),
                Ok(()) = modal_rx.changed() => self.sync_modal(),
            }

            if self.should_suspend {
                tui.suspend()?;
                self.should_suspend = false;
                tui.resume()?;
                tui.clear()?;
            } else if self.should_quit {
                break;
            }
        }

        self.service.destroy();
        tui.exit()?;
        Ok(())
    }

    fn handle_event(&mut self, event: Event, tui: &mut Tui) -> Result<()> {
        match event {
            Event::Quit => self.should_quit = true,
            Event::Tick => self.handle_tick(),
            Event::Render => self.render(tui)?,
            Event::Resize(width, height) => {
                tui.resize(Rect::new(0, 0, width, height))?;
                self.render(tui)?;
            }
            Event::Key(key) => self.handle_key(key),
            Event::Paste(text) => self.handle_paste(&text),
            Event::Error(err) => warn!("Terminal event error: {err}"),
        }
        Ok(())
    }

    fn handle_tick(&mut self) {
        self.service.handle_tick();
        self.toasts.handle_tick();
    }

    /// Keys go to the topmost layer first: error dialog, store modal, the
    /// active service, then the global bindings.
    fn handle_key(&mut self, key: KeyEvent) {
        if let Some(dialog) = &mut self.error_dialog {
            if let Ok(EventResult::Event(ErrorDialogEvent::Dismissed)) = dialog.handle_key(key) {
                self.error_dialog = None;
            }
            return;
        }

        self.sync_modal();
        if let Some(modal) = &mut self.store_modal {
            match modal.handle_key(key) {
                Ok(EventResult::Event(StoreModalEvent::Submit(input))) => {
                    self.spawn_commands(vec![Box::new(CreateStoreCmd::new(
                        self.ctx.stores.clone(),
                        input,
                    ))]);
                }
                Ok(_) => {}
                Err(err) => self.show_error(format!("Store form failed: {err}")),
            }
            self.sync_modal();
            return;
        }

        if self.service.handle_key(key).is_consumed() {
            self.update_service();
            return;
        }

        let resolver = self.ctx.resolver.clone();
        if resolver.matches_global(&key, GlobalAction::Quit) {
            self.should_quit = true;
        } else if resolver.matches_global(&key, GlobalAction::NewStore) {
            self.ctx.store_modal.open();
            self.sync_modal();
        } else if key.code == KeyCode::Char('z') && key.modifiers == KeyModifiers::CONTROL {
            self.should_suspend = true;
        }
    }

    /// Pastes follow the same layering as keys but have no global meaning.
    fn handle_paste(&mut self, text: &str) {
        if self.error_dialog.is_some() {
            return;
        }

        self.sync_modal();
        if let Some(modal) = &mut self.store_modal {
            if let Err(err) = modal.handle_paste(text) {
                warn!("Paste into store form failed: {err}");
            }
            return;
        }

        if self.service.handle_paste(text).is_consumed() {
            self.update_service();
        }
    }

    fn handle_message(&mut self, message: AppMessage) {
        match message {
            AppMessage::ShowToast {
                message,
                toast_type,
            } => self.toasts.show(Toast::new(message, toast_type)),
            AppMessage::StoreCreated(result) => {
                let effects = match &mut self.store_modal {
                    Some(modal) => modal.complete(result),
                    None => {
                        warn!("Store created without an open modal");
                        return;
                    }
                };
                self.sync_modal();
                self.apply_effects(effects);
            }
            AppMessage::CommandCompleted => self.update_service(),
            AppMessage::CommandFailed { name, error } => {
                error!("Command '{name}' failed: {error}");
                self.show_error(format!("{name} failed: {error}"));
            }
        }
    }

    fn apply_effects(&mut self, effects: Vec<FormEffect>) {
        for effect in effects {
            match effect {
                FormEffect::Notify(toast_type, message) => {
                    self.toasts.show(Toast::new(message, toast_type));
                }
                FormEffect::Navigate(navigation) => self.navigate(navigation),
                // The next service loads fresh data on its own
                FormEffect::Refresh => {}
            }
        }
    }

    /// Mount or unmount the store modal to match its visibility flag.
    fn sync_modal(&mut self) {
        let open = self.ctx.store_modal.is_open();
        match &self.store_modal {
            None if open => {
                self.store_modal = Some(StoreModal::new(
                    self.ctx.store_modal.clone(),
                    self.ctx.resolver.clone(),
                ));
            }
            Some(modal) if !open && !modal.is_busy() => self.store_modal = None,
            _ => {}
        }
    }

    fn show_error(&mut self, message: impl Into<String>) {
        self.error_dialog = Some(ErrorDialog::new(message, self.ctx.resolver.clone()));
    }

    fn start_service(&mut self) {
        info!("Opening {}", self.route);
        self.status_bar.set_store(self.route.store().cloned());
        self.service.init();
        self.update_service();
    }

    fn update_service(&mut self) {
        match self.service.update() {
            Ok(msg) => self.handle_service_msg(msg),
            Err(err) => {
                error!("Service update failed: {err}");
                self.show_error(err.to_string());
            }
        }
    }

    fn handle_service_msg(&mut self, msg: ServiceMsg) {
        match msg {
            ServiceMsg::Idle => {}
            ServiceMsg::Run(commands) => self.spawn_commands(commands),
            ServiceMsg::Navigate(navigation) => self.navigate(navigation),
            ServiceMsg::Close => {
                if self.route.store().is_some() {
                    self.navigate(Navigation::Hard(Route::Stores));
                } else {
                    self.should_quit = true;
                }
            }
        }
    }

    /// Rebuild everything below the App for the new route.
    ///
    /// Pushes reach the App only when they leave the active service, so both
    /// kinds are handled as a full rebuild here.
    fn navigate(&mut self, navigation: Navigation) {
        let route = navigation.route().clone();
        info!("Navigating to {route}");

        self.service.destroy();
        self.error_dialog = None;
        self.route = route;
        self.service = build_service(&self.ctx, &self.route);

        if let Some(store) = self.route.store()
            && let Err(err) = config::save_last_store(store.as_str())
        {
            warn!("Failed to remember store {store}: {err}");
        }
        self.start_service();
    }

    fn spawn_commands(&self, commands: Vec<Box<dyn Command>>) {
        for command in commands {
            let app_tx = self.ctx.app_tx.clone();
            let name = command.name();
            debug!("Running command: {name}");
            tokio::spawn(async move {
                if let Err(err) = command.execute(app_tx.clone()).await {
                    let _ = app_tx.send(AppMessage::CommandFailed {
                        name,
                        error: err.to_string(),
                    });
                }
                let _ = app_tx.send(AppMessage::CommandCompleted);
            });
        }
    }

    fn render(&mut self, tui: &mut Tui) -> Result<()> {
        self.sync_modal();
        let breadcrumbs = self.service.breadcrumbs();
        let keybindings = if self.store_modal.is_some() || self.error_dialog.is_some() {
            Vec::new()
        } else {
            self.service.keybindings()
        };

        tui.draw(|frame| {
            let area = frame.area();
            let [main_area, status_area] =
                Layout::vertical([Constraint::Min(0), Constraint::Length(StatusBar::height())])
                    .areas(area);

            self.service.render(frame, main_area, &self.theme);
            self.status_bar.render_with_keybindings(
                frame,
                status_area,
                &self.theme,
                &breadcrumbs,
                &keybindings,
            );
            if let Some(modal) = &mut self.store_modal {
                modal.render(frame, main_area, &self.theme);
            }
            self.toasts.render(frame, main_area, &self.theme);
            if let Some(dialog) = &mut self.error_dialog {
                dialog.render(frame, area, &self.theme);
            }
        })?;
        Ok(())
    }
}

fn build_service(ctx: &AppContext, route: &Route) -> Box<dyn Service> {
    match route.store() {
        None => Box::new(StoreSelector::new(ctx.clone())),
        Some(store) => Box::new(ColorManager::new(ctx.clone(), store.clone(), route.clone())),
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::*;
    use crate::api::{ResourceApi, StoreDirectory};
    use crate::config::{ApiConfig, KeybindingsConfig};
    use crate::model::{Color, ColorId, ColorInput, StoreId, StoreInput};

    struct EmptyBackend;

    #[async_trait]
    impl StoreDirectory for EmptyBackend {
        async fn list_stores(&self) -> Result<Vec<Store>, ApiError> {
            Ok(Vec::new())
        }

        async fn create_store(&self, input: &StoreInput) -> Result<Store, ApiError> {
            Ok(Store {
                id: StoreId::new("s1"),
                name: input.name.clone(),
                created_at: None,
                updated_at: None,
            })
        }
    }

    #[async_trait]
    impl ResourceApi<Color> for EmptyBackend {
        async fn list(&self, _store: &StoreId) -> Result<Vec<Color>, ApiError> {
            Ok(Vec::new())
        }

        async fn create(&self, _store: &StoreId, _input: &ColorInput) -> Result<(), ApiError> {
            Err(ApiError::Network {
                detail: "unused".to_string(),
            })
        }

        async fn update(
            &self,
            _store: &StoreId,
            _id: &ColorId,
            _input: &ColorInput,
        ) -> Result<(), ApiError> {
            Err(ApiError::Network {
                detail: "unused".to_string(),
            })
        }

        async fn delete(&self, _store: &StoreId, _id: &ColorId) -> Result<(), ApiError> {
            Ok(())
        }
    }

    fn app(route: Route) -> App {
        let (app_tx, app_rx) = mpsc::unbounded_channel();
        let resolver = Arc::new(KeyResolver::new(Arc::new(KeybindingsConfig::default())));
        let backend = Arc::new(EmptyBackend);
        let ctx = AppContext {
            config: Arc::new(AppConfig {
                api: ApiConfig::default(),
                ..AppConfig::default()
            }),
            resolver: resolver.clone(),
            stores: backend.clone(),
            colors: backend,
            store_modal: ModalVisibility::new(),
            app_tx,
        };
        let status_bar = StatusBar::new("http://localhost:3000", resolver);
        App::with_context(ctx, app_rx, Theme::default(), route, status_bar)
    }

    fn key(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, modifiers)
    }

    #[test]
    fn test_route_selects_service() {
        let app = app(Route::Colors(StoreId::new("s1")));
        assert_eq!(app.service.breadcrumbs(), vec!["Colors".to_string()]);

        let app = self::app(Route::Stores);
        assert_eq!(app.service.breadcrumbs(), vec!["Stores".to_string()]);
    }

    #[test]
    fn test_new_store_shortcut_mounts_modal() {
        let mut app = app(Route::Stores);
        app.handle_key(key(KeyCode::Char('n'), KeyModifiers::CONTROL));
        assert!(app.ctx.store_modal.is_open());
        assert!(app.store_modal.is_some());

        app.handle_key(key(KeyCode::Esc, KeyModifiers::NONE));
        assert!(!app.ctx.store_modal.is_open());
        assert!(app.store_modal.is_none());
    }

    #[test]
    fn test_modal_flag_opened_elsewhere_is_observed() {
        let mut app = app(Route::Stores);
        let handle = app.ctx.store_modal.clone();
        handle.open();
        app.sync_modal();
        assert!(app.store_modal.is_some());
    }

    #[test]
    fn test_command_failure_shows_error_dialog() {
        let mut app = app(Route::Stores);
        app.handle_message(AppMessage::CommandFailed {
            name: "Loading stores".to_string(),
            error: "connection refused".to_string(),
        });
        let dialog = app.error_dialog.as_ref().expect("dialog shown");
        assert_eq!(dialog.message(), "Loading stores failed: connection refused");

        app.handle_key(key(KeyCode::Enter, KeyModifiers::NONE));
        assert!(app.error_dialog.is_none());
    }

    #[test]
    fn test_quit_key() {
        let mut app = app(Route::Stores);
        app.handle_key(key(KeyCode::Char('q'), KeyModifiers::NONE));
        assert!(app.should_quit);
    }
}
