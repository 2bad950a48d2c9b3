use std::io::stdout;
use std::panic;

use crossterm::{
    cursor::SetCursorStyle,
    event::{self, Event as TermEvent, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use ratatui::{backend::CrosstermBackend, style::Style, Terminal};
use reqwest::Client;
use tokio::sync::mpsc;
use tui_textarea::TextArea;
use uuid::Uuid;

use crate::catalog::Catalog;
use crate::clipboard::ClipboardProvider;
use crate::config::{load_config, Config};
use crate::devices::{self, DeviceRecord};
use crate::explorer::{CredentialField, Effect, Event, Explorer};
use crate::form::{build_form, Control, FormField, SelectOption};
use crate::http::{self, ResponseData};
use crate::storage::{CredentialStore, Credentials, FileCredentialStore};
use crate::{snippet::SnippetLang, ui};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputMode {
    #[default]
    Normal,
    Insert,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Panel {
    Catalog,
    #[default]
    Request,
    Snippet,
    Response,
}

/// Focusable slots inside the request panel, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestField {
    Key,
    Secret,
    Param(usize),
    Body,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct FocusState {
    pub panel: Panel,
    pub request_index: usize,
}

/// Open dropdown for a closed-selection parameter.
pub struct SelectPopup {
    pub param: String,
    pub options: Vec<SelectOption>,
    pub index: usize,
}

/// Completions coming back from spawned network tasks.
enum NetMessage {
    Completed {
        token: Uuid,
        result: Result<ResponseData, String>,
    },
    Devices(Result<Vec<DeviceRecord>, String>),
}

pub struct App {
    running: bool,
    pub config: Config,
    pub catalog: Catalog,
    pub selected_endpoint: usize,
    pub explorer: Explorer,
    pub focus: FocusState,
    pub input_mode: InputMode,
    pub body_editor: TextArea<'static>,
    pub select_popup: Option<SelectPopup>,
    pub show_help: bool,
    pub sidebar_visible: bool,
    pub status_message: Option<String>,
    pub loading_tick: u8,
    pub response_scroll: u16,
    pub snippet_scroll: u16,
    client: Client,
    store: Box<dyn CredentialStore>,
    clipboard: ClipboardProvider,
    net_tx: mpsc::Sender<NetMessage>,
    net_rx: mpsc::Receiver<NetMessage>,
}

fn body_editor_for(body: &str) -> TextArea<'static> {
    let mut editor = TextArea::new(body.lines().map(str::to_string).collect());
    editor.set_cursor_line_style(Style::default());
    editor
}

impl App {
    pub fn new() -> Result<Self, String> {
        let config = load_config()?;
        let catalog = Catalog::load()?;
        let store = Box::new(FileCredentialStore::default_location()?);
        Self::with_store(config, catalog, store)
    }

    /// Construction with an injected credential store.
    pub fn with_store(
        config: Config,
        catalog: Catalog,
        store: Box<dyn CredentialStore>,
    ) -> Result<Self, String> {
        let endpoint = catalog
            .endpoints
            .first()
            .cloned()
            .ok_or("Endpoint catalog is empty")?;

        let client = http::build_client(&config)?;

        let mut status_message = None;
        let credentials = match store.load() {
            Ok(credentials) => credentials,
            Err(err) => {
                status_message = Some(err);
                Credentials::default()
            }
        };

        let explorer = Explorer::new(
            endpoint,
            &config.api.base_url,
            credentials,
            config.default_language(),
        );
        let body_editor = body_editor_for(&explorer.body);
        let (net_tx, net_rx) = mpsc::channel::<NetMessage>(8);

        let mut app = Self {
            running: true,
            config,
            catalog,
            selected_endpoint: 0,
            explorer,
            focus: FocusState::default(),
            input_mode: InputMode::Normal,
            body_editor,
            select_popup: None,
            show_help: false,
            sidebar_visible: true,
            status_message,
            loading_tick: 0,
            response_scroll: 0,
            snippet_scroll: 0,
            client,
            store,
            clipboard: ClipboardProvider::new(),
            net_tx,
            net_rx,
        };

        let effects = app.explorer.apply(Event::Mounted);
        app.run_effects(effects);
        Ok(app)
    }

    pub async fn run(&mut self) -> anyhow::Result<()> {
        self.install_panic_hook();
        self.setup_terminal()?;

        let result = self.event_loop().await;

        self.restore_terminal()?;
        result
    }

    fn install_panic_hook(&self) {
        let original_hook = panic::take_hook();
        panic::set_hook(Box::new(move |panic_info| {
            let _ = disable_raw_mode();
            let _ = stdout().execute(LeaveAlternateScreen);
            original_hook(panic_info);
        }));
    }

    fn setup_terminal(&self) -> anyhow::Result<()> {
        enable_raw_mode()?;
        stdout().execute(EnterAlternateScreen)?;
        Ok(())
    }

    fn restore_terminal(&self) -> anyhow::Result<()> {
        disable_raw_mode()?;
        stdout().execute(LeaveAlternateScreen)?;
        Ok(())
    }

    async fn event_loop(&mut self) -> anyhow::Result<()> {
        let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;

        while self.running {
            terminal.draw(|frame| {
                ui::render(frame, self);
            })?;

            while let Ok(message) = self.net_rx.try_recv() {
                self.handle_net_message(message);
            }

            if self.explorer.is_loading() {
                self.loading_tick = self.loading_tick.wrapping_add(1);
            }

            if event::poll(std::time::Duration::from_millis(50))? {
                if let TermEvent::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key(key);
                    }
                }
            }
        }

        Ok(())
    }

    fn handle_net_message(&mut self, message: NetMessage) {
        match message {
            NetMessage::Completed { token, result } => {
                self.explorer.apply(Event::RequestCompleted { token, result });
                self.response_scroll = 0;
            }
            NetMessage::Devices(Ok(devices)) => {
                self.explorer.apply(Event::DevicesLoaded(devices));
            }
            NetMessage::Devices(Err(err)) => {
                self.status_message = Some(format!("Device list unavailable: {}", err));
            }
        }
    }

    // --- Effects ---

    fn run_effects(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::PersistCredentials(credentials) => {
                    if let Err(err) = self.store.save(&credentials) {
                        self.status_message = Some(err);
                    }
                }
                Effect::Execute { token, request } => {
                    let client = self.client.clone();
                    let tx = self.net_tx.clone();
                    tokio::spawn(async move {
                        let result = http::execute(&client, &request).await;
                        let _ = tx.send(NetMessage::Completed { token, result }).await;
                    });
                }
                Effect::FetchDevices => {
                    let client = self.client.clone();
                    let base_url = self.explorer.base_url.clone();
                    let credentials = self.explorer.credentials.clone();
                    let tx = self.net_tx.clone();
                    tokio::spawn(async move {
                        let result = devices::fetch_devices(&client, &base_url, &credentials).await;
                        let _ = tx.send(NetMessage::Devices(result)).await;
                    });
                }
            }
        }
    }

    fn dispatch(&mut self, event: Event) {
        let effects = self.explorer.apply(event);
        self.run_effects(effects);
    }

    // --- Focus helpers ---

    pub fn request_fields(&self) -> Vec<RequestField> {
        let mut fields = Vec::new();
        if self.explorer.endpoint.requires_auth {
            fields.push(RequestField::Key);
            fields.push(RequestField::Secret);
        }
        for index in 0..self.explorer.endpoint.parameters.len() {
            fields.push(RequestField::Param(index));
        }
        if self.explorer.endpoint.method.sends_body() {
            fields.push(RequestField::Body);
        }
        fields
    }

    pub fn focused_field(&self) -> Option<RequestField> {
        if self.focus.panel != Panel::Request {
            return None;
        }
        self.request_fields().get(self.focus.request_index).copied()
    }

    pub fn form_fields(&self) -> Vec<FormField> {
        build_form(&self.explorer.endpoint, &self.explorer.devices)
    }

    fn field_is_editable_text(&self, field: RequestField) -> bool {
        match field {
            RequestField::Key | RequestField::Secret | RequestField::Body => true,
            RequestField::Param(index) => {
                let fields = self.form_fields();
                matches!(fields.get(index).map(|f| &f.control), Some(Control::Text { .. }))
            }
        }
    }

    // --- Key handling ---

    fn handle_key(&mut self, key: KeyEvent) {
        match self.input_mode {
            InputMode::Normal => self.handle_normal_mode(key),
            InputMode::Insert => self.handle_insert_mode(key),
        }
    }

    fn handle_normal_mode(&mut self, key: KeyEvent) {
        if self.select_popup.is_some() {
            self.handle_popup_key(key);
            return;
        }

        if self.show_help {
            if matches!(key.code, KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q')) {
                self.show_help = false;
            }
            return;
        }

        // Ctrl+E toggles the endpoint sidebar
        if key.code == KeyCode::Char('e') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.sidebar_visible = !self.sidebar_visible;
            if !self.sidebar_visible && self.focus.panel == Panel::Catalog {
                self.focus.panel = Panel::Request;
            }
            return;
        }

        match key.code {
            KeyCode::Char('?') => {
                self.show_help = true;
                return;
            }
            KeyCode::Char('q') | KeyCode::Esc => {
                self.running = false;
                return;
            }
            KeyCode::Tab => {
                self.cycle_panel();
                return;
            }
            _ => {}
        }

        match self.focus.panel {
            Panel::Catalog => self.handle_catalog_key(key),
            Panel::Request => self.handle_request_key(key),
            Panel::Snippet => self.handle_snippet_key(key),
            Panel::Response => self.handle_response_key(key),
        }
    }

    fn handle_popup_key(&mut self, key: KeyEvent) {
        let popup = self.select_popup.as_mut().expect("popup checked above");
        match key.code {
            KeyCode::Down | KeyCode::Char('j') => {
                popup.index = (popup.index + 1) % popup.options.len();
            }
            KeyCode::Up | KeyCode::Char('k') => {
                popup.index = if popup.index == 0 {
                    popup.options.len() - 1
                } else {
                    popup.index - 1
                };
            }
            KeyCode::Enter => {
                let name = popup.param.clone();
                let value = popup.options[popup.index].value.clone();
                self.select_popup = None;
                self.dispatch(Event::ParamChanged { name, value });
            }
            KeyCode::Esc => {
                self.select_popup = None;
            }
            _ => {}
        }
    }

    fn handle_catalog_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Down | KeyCode::Char('j') => {
                if self.selected_endpoint + 1 < self.catalog.endpoints.len() {
                    self.selected_endpoint += 1;
                }
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.selected_endpoint = self.selected_endpoint.saturating_sub(1);
            }
            KeyCode::Enter => {
                self.open_endpoint(self.selected_endpoint);
                self.focus.panel = Panel::Request;
            }
            _ => {}
        }
    }

    fn handle_request_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Down | KeyCode::Char('j') => self.next_field(),
            KeyCode::Up | KeyCode::Char('k') => self.prev_field(),
            KeyCode::Char('i') => {
                if let Some(field) = self.focused_field() {
                    if self.field_is_editable_text(field) {
                        self.input_mode = InputMode::Insert;
                        let _ = stdout().execute(SetCursorStyle::SteadyUnderScore);
                    }
                }
            }
            KeyCode::Enter => {
                if let Some(RequestField::Param(index)) = self.focused_field() {
                    let fields = self.form_fields();
                    if let Some(FormField {
                        name,
                        control: Control::Select { options },
                        ..
                    }) = fields.into_iter().nth(index)
                    {
                        if options.is_empty() {
                            return;
                        }
                        let current = self.explorer.value(&name);
                        let index = options
                            .iter()
                            .position(|option| option.value == current)
                            .unwrap_or(0);
                        self.select_popup = Some(SelectPopup {
                            param: name,
                            options,
                            index,
                        });
                        return;
                    }
                }
                self.submit();
            }
            _ => {}
        }
    }

    fn handle_snippet_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Left | KeyCode::Char('h') => self.cycle_language(false),
            KeyCode::Right | KeyCode::Char('l') => self.cycle_language(true),
            KeyCode::Down | KeyCode::Char('j') => {
                self.snippet_scroll = self.snippet_scroll.saturating_add(1);
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.snippet_scroll = self.snippet_scroll.saturating_sub(1);
            }
            KeyCode::Char('y') => self.copy_snippet(),
            _ => {}
        }
    }

    fn handle_response_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Down | KeyCode::Char('j') => {
                self.response_scroll = self.response_scroll.saturating_add(1);
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.response_scroll = self.response_scroll.saturating_sub(1);
            }
            _ => {}
        }
    }

    fn handle_insert_mode(&mut self, key: KeyEvent) {
        let Some(field) = self.focused_field() else {
            self.leave_insert_mode();
            return;
        };

        if key.code == KeyCode::Esc {
            self.leave_insert_mode();
            return;
        }

        if field == RequestField::Body {
            self.body_editor.input(tui_textarea::Input::from(key));
            let text = self.body_editor.lines().join("\n");
            self.dispatch(Event::BodyChanged(text));
            return;
        }

        match key.code {
            KeyCode::Enter => self.leave_insert_mode(),
            KeyCode::Char(c) => self.edit_text_field(field, |text| text.push(c)),
            KeyCode::Backspace => self.edit_text_field(field, |text| {
                text.pop();
            }),
            _ => {}
        }
    }

    fn leave_insert_mode(&mut self) {
        self.input_mode = InputMode::Normal;
        let _ = stdout().execute(SetCursorStyle::DefaultUserShape);
    }

    fn edit_text_field(&mut self, field: RequestField, edit: impl FnOnce(&mut String)) {
        match field {
            RequestField::Key => {
                let mut value = self.explorer.credentials.key.clone();
                edit(&mut value);
                self.dispatch(Event::CredentialChanged {
                    field: CredentialField::Key,
                    value,
                });
            }
            RequestField::Secret => {
                let mut value = self.explorer.credentials.secret.clone();
                edit(&mut value);
                self.dispatch(Event::CredentialChanged {
                    field: CredentialField::Secret,
                    value,
                });
            }
            RequestField::Param(index) => {
                let Some(name) = self
                    .explorer
                    .endpoint
                    .parameters
                    .get(index)
                    .map(|p| p.name.clone())
                else {
                    return;
                };
                let mut value = self.explorer.value(&name).to_string();
                edit(&mut value);
                self.dispatch(Event::ParamChanged { name, value });
            }
            RequestField::Body => {}
        }
    }

    // --- Actions ---

    fn submit(&mut self) {
        self.response_scroll = 0;
        self.dispatch(Event::SubmitRequested);
    }

    fn cycle_language(&mut self, forward: bool) {
        let all = SnippetLang::ALL;
        let current = all
            .iter()
            .position(|lang| *lang == self.explorer.language)
            .unwrap_or(0);
        let next = if forward {
            (current + 1) % all.len()
        } else {
            (current + all.len() - 1) % all.len()
        };
        self.snippet_scroll = 0;
        self.dispatch(Event::LanguageTabSelected(all[next]));
    }

    fn copy_snippet(&mut self) {
        let snippet = self.explorer.snippet();
        self.status_message = match self.clipboard.set_text(snippet) {
            Ok(()) => Some("Snippet copied to clipboard".to_string()),
            Err(err) => Some(err),
        };
    }

    fn open_endpoint(&mut self, index: usize) {
        let Some(endpoint) = self.catalog.endpoints.get(index).cloned() else {
            return;
        };
        let credentials = self.explorer.credentials.clone();
        let language = self.explorer.language;
        self.explorer = Explorer::new(endpoint, &self.config.api.base_url, credentials, language);
        self.body_editor = body_editor_for(&self.explorer.body);
        self.focus.request_index = 0;
        self.response_scroll = 0;
        self.snippet_scroll = 0;
        let effects = self.explorer.apply(Event::Mounted);
        self.run_effects(effects);
    }

    fn cycle_panel(&mut self) {
        self.focus.panel = match self.focus.panel {
            Panel::Catalog => Panel::Request,
            Panel::Request => Panel::Snippet,
            Panel::Snippet => Panel::Response,
            Panel::Response => {
                if self.sidebar_visible {
                    Panel::Catalog
                } else {
                    Panel::Request
                }
            }
        };
    }

    fn next_field(&mut self) {
        let count = self.request_fields().len();
        if count == 0 {
            return;
        }
        self.focus.request_index = (self.focus.request_index + 1) % count;
    }

    fn prev_field(&mut self) {
        let count = self.request_fields().len();
        if count == 0 {
            return;
        }
        self.focus.request_index = (self.focus.request_index + count - 1) % count;
    }
}
