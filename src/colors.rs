//! Color listing and create/edit form for one store.

mod form;
mod list;

use color_eyre::Result;
use color_eyre::eyre::eyre;
use crossterm::event::KeyEvent;
use ratatui::Frame;
use ratatui::layout::Rect;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, warn};

use crate::Theme;
use crate::app::AppMessage;
use crate::config::GlobalAction;
use crate::context::AppContext;
use crate::form::{FieldSpec, FormEffect, Resource, Rule, SubmitPhase};
use crate::model::{Color, ColorId, ColorInput, StoreId};
use crate::navigation::{Navigation, Route};
use crate::service::{Service, ServiceMsg};
use crate::ui::{Component, EventResult, Keybinding, Screen, Spinner};

use form::{ColorFormScreen, FormMsg};
use list::{ColorListScreen, ListMsg};

// === Models ===

const NAME: FieldSpec =
    FieldSpec::new("name", "Name", &[Rule::Required]).with_placeholder("Color name");

const VALUE: FieldSpec = FieldSpec::new(
    "value",
    "Value",
    &[
        Rule::MinLength(4),
        Rule::Prefix {
            prefix: "#",
            message: "String must be a valid hex code",
        },
    ],
)
.with_placeholder("Color value");

static FIELDS: [FieldSpec; 2] = [NAME, VALUE];

impl Resource for Color {
    type Id = ColorId;
    type Input = ColorInput;

    const SEGMENT: &'static str = "colors";
    const NOUN: &'static str = "Color";
    const DELETE_BLOCKED: &'static str =
        "Make sure you removed all products using this color first.";

    fn fields() -> &'static [FieldSpec] {
        &FIELDS
    }

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn values(&self) -> Vec<String> {
        vec![self.name.clone(), self.value.clone()]
    }

    fn input(values: &[String]) -> Self::Input {
        let field = |index: usize| values.get(index).cloned().unwrap_or_default();
        ColorInput {
            name: field(0),
            value: field(1),
        }
    }

    fn listing(store: &StoreId) -> Route {
        Route::Colors(store.clone())
    }
}

// === Messages ===

#[derive(Debug)]
enum ColorMsg {
    List(ListMsg),
    Form(FormMsg),
    /// Leave the store.
    Close,
}

// === Service ===

enum State {
    Loading,
    List(ColorListScreen),
    Form(Box<ColorFormScreen>),
}

/// Colors of one store: a searchable listing plus the create/edit form.
///
/// Push navigation between `/{store}/colors`, `/{store}/colors/new` and
/// `/{store}/colors/{id}` is handled here; anything outside the store is
/// handed back to the App as a hard navigation.
pub struct ColorManager {
    ctx: AppContext,
    store: StoreId,
    /// Last fetched listing, used to resolve edit routes.
    colors: Vec<Color>,
    /// Route to open once the first listing arrives.
    pending: Option<Route>,
    state: State,
    spinner: Spinner,
    msg_tx: UnboundedSender<ColorMsg>,
    msg_rx: UnboundedReceiver<ColorMsg>,
}

impl ColorManager {
    pub fn new(ctx: AppContext, store: StoreId, route: Route) -> Self {
        let (msg_tx, msg_rx) = mpsc::unbounded_channel();
        Self {
            ctx,
            store,
            colors: Vec::new(),
            pending: Some(route),
            state: State::Loading,
            spinner: Spinner::new().with_label("Loading colors..."),
            msg_tx,
            msg_rx,
        }
    }

    fn queue(&self, msg: ColorMsg) {
        let _ = self.msg_tx.send(msg);
    }

    fn get_msg_sender(&self) -> UnboundedSender<ColorMsg> {
        self.msg_tx.clone()
    }

    fn form_screen_mut(&mut self) -> Option<&mut ColorFormScreen> {
        match &mut self.state {
            State::Form(screen) => Some(screen.as_mut()),
            _ => None,
        }
    }

    /// Whether the form is waiting for the listing to reload before leaving.
    fn is_refreshing(&self) -> bool {
        matches!(&self.state, State::Form(screen) if screen.phase() == SubmitPhase::Refreshing)
    }

    fn process_message(&mut self, msg: ColorMsg) -> Result<ServiceMsg> {
        match msg {
            ColorMsg::List(msg) => list::update(self, msg),
            ColorMsg::Form(msg) => form::update(self, msg),
            ColorMsg::Close => Ok(ServiceMsg::Close),
        }
    }

    /// Reload the listing. The spinner replaces the list unless a form is open.
    fn fetch_colors(&mut self) -> ServiceMsg {
        if !matches!(self.state, State::Form(_)) {
            self.state = State::Loading;
        }
        list::FetchColorsCmd {
            api: self.ctx.colors.clone(),
            store: self.store.clone(),
            tx: self.msg_tx.clone(),
        }
        .into()
    }

    /// Store a freshly loaded listing and move on to whatever was waiting for it.
    fn colors_loaded(&mut self, colors: Option<Vec<Color>>) -> Result<ServiceMsg> {
        let failed = colors.is_none();
        if let Some(colors) = colors {
            self.colors = colors;
        }

        if self.is_refreshing() {
            let effect = self
                .form_screen_mut()
                .and_then(|screen| screen.refresh_settled());
            return self.apply_effects(effect.into_iter().collect());
        }

        let next = match self.pending.take() {
            Some(route) => self.open_route(route)?,
            None => {
                self.show_list();
                ServiceMsg::Idle
            }
        };

        if failed {
            return Err(eyre!("Failed to load colors for store {}", self.store));
        }
        Ok(next)
    }

    fn navigate(&mut self, navigation: Navigation) -> Result<ServiceMsg> {
        match navigation {
            Navigation::Push(route) => self.open_route(route),
            hard @ Navigation::Hard(_) => Ok(ServiceMsg::Navigate(hard)),
        }
    }

    fn open_route(&mut self, route: Route) -> Result<ServiceMsg> {
        if route.store() != Some(&self.store) {
            return Ok(ServiceMsg::Navigate(Navigation::Hard(route)));
        }
        debug!("Opening {route}");

        match route {
            Route::Stores | Route::Store(_) | Route::Colors(_) => self.show_list(),
            Route::NewColor(_) => self.show_form(None),
            Route::EditColor(_, id) => {
                // Unknown ids fall back to an empty create form
                let initial = self.colors.iter().find(|color| color.id == id).cloned();
                if initial.is_none() {
                    warn!("Color {id} not found in store {}", self.store);
                }
                self.show_form(initial.as_ref());
            }
        }
        Ok(ServiceMsg::Idle)
    }

    fn show_list(&mut self) {
        if let State::List(screen) = &mut self.state {
            screen.set_colors(self.colors.clone());
        } else {
            self.state = State::List(ColorListScreen::new(
                self.colors.clone(),
                self.ctx.resolver.clone(),
            ));
        }
    }

    fn show_form(&mut self, initial: Option<&Color>) {
        self.state = State::Form(Box::new(ColorFormScreen::new(
            self.store.clone(),
            initial,
            self.ctx.resolver.clone(),
        )));
    }

    /// Carry out form side effects in order.
    fn apply_effects(&mut self, effects: Vec<FormEffect>) -> Result<ServiceMsg> {
        let mut result = ServiceMsg::Idle;
        for effect in effects {
            let next = match effect {
                FormEffect::Notify(toast_type, message) => {
                    self.ctx.app_tx.send(AppMessage::ShowToast {
                        message,
                        toast_type,
                    })?;
                    ServiceMsg::Idle
                }
                FormEffect::Refresh => self.fetch_colors(),
                FormEffect::Navigate(navigation) => self.navigate(navigation)?,
            };
            result = result.merge(next);
        }
        Ok(result)
    }
}

impl Service for ColorManager {
    fn init(&mut self) {
        self.queue(ColorMsg::List(ListMsg::Load));
    }

    fn handle_tick(&mut self) {
        match &mut self.state {
            State::Loading => self.spinner.handle_tick(),
            State::Form(screen) => screen.handle_tick(),
            State::List(_) => {}
        }
    }

    fn handle_key(&mut self, key: KeyEvent) -> EventResult<()> {
        let result = match &mut self.state {
            State::Loading => Ok(EventResult::Ignored),
            State::List(screen) => screen.handle_key(key),
            State::Form(screen) => screen.handle_key(key),
        };

        match result {
            Ok(EventResult::Event(msg)) => {
                self.queue(msg);
                EventResult::Consumed
            }
            Ok(EventResult::Consumed) => EventResult::Consumed,
            Ok(EventResult::Ignored) => {
                if matches!(self.state, State::List(_))
                    && self.ctx.resolver.matches_global(&key, GlobalAction::Back)
                {
                    self.queue(ColorMsg::Close);
                    EventResult::Consumed
                } else {
                    EventResult::Ignored
                }
            }
            Err(err) => {
                warn!("Key handling failed: {err}");
                EventResult::Consumed
            }
        }
    }

    fn handle_paste(&mut self, text: &str) -> EventResult<()> {
        let State::Form(screen) = &mut self.state else {
            return EventResult::Ignored;
        };
        match screen.handle_paste(text) {
            Ok(EventResult::Event(msg)) => {
                self.queue(msg);
                EventResult::Consumed
            }
            Ok(EventResult::Consumed) => EventResult::Consumed,
            Ok(EventResult::Ignored) => EventResult::Ignored,
            Err(err) => {
                warn!("Paste handling failed: {err}");
                EventResult::Consumed
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
            State::Form(screen) => screen.render(frame, area, theme),
        }
    }

    fn breadcrumbs(&self) -> Vec<String> {
        let mut breadcrumbs = vec!["Colors".to_string()];
        if let State::Form(screen) = &self.state {
            breadcrumbs.extend(screen.breadcrumbs());
        }
        breadcrumbs
    }

    fn keybindings(&self) -> Vec<Keybinding> {
        match &self.state {
            State::Loading => vec![],
            State::List(screen) => screen.keybindings(),
            State::Form(screen) => screen.keybindings(),
        }
    }
}
