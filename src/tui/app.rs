use crate::core::models::{ExecuteRequest, ExecuteResponse, UploadResponse};
use crate::core::pagination::PageNav;
use crate::core::state::StateEvent;
use crate::core::types::ToastLevel;
use crate::render::render_report_html;
use crate::services::{ApiError, Session};
use crate::tui::components::{
    ConfirmChoice, ConfirmDialog, HelpPanel, InstructionBar, PathPrompt, PathPurpose, RegexChips,
    ResultsTable, ToastStack,
};
use crate::tui::{Action, Component, Focusable, KeyBindings, RenderContext, Theme};
use color_eyre::Result;
use crossterm::event::{Event, EventStream, KeyCode, KeyEvent, KeyEventKind};
use futures::StreamExt;
use ratatui::{
    Frame, Terminal,
    backend::Backend,
    layout::{Constraint, Direction, Layout},
    text::{Line, Span},
    widgets::Paragraph,
};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};
use tracing::{debug, error, info};

const TICK: Duration = Duration::from_millis(250);

/// Completions reported back to the UI loop by spawned request tasks
#[derive(Debug)]
pub enum AppEvent {
    UploadFinished(Result<UploadResponse, ApiError>),
    ExecuteFinished {
        request: ExecuteRequest,
        result: Result<ExecuteResponse, ApiError>,
    },
    DownloadFinished {
        dest: PathBuf,
        result: Result<usize, ApiError>,
    },
}

/// Terminal front end
///
/// Owns the session and all components. Network calls run on tokio tasks
/// and report back over a channel; state is only mutated on the UI loop.
pub struct App {
    session: Session,
    keybindings: KeyBindings,
    theme: Theme,

    instruction_bar: InstructionBar,
    results_table: ResultsTable,
    regex_chips: RegexChips,
    toast_stack: ToastStack,
    confirm_dialog: ConfirmDialog,
    help_panel: HelpPanel,
    path_prompt: Option<PathPrompt>,

    tx: UnboundedSender<AppEvent>,
    rx: UnboundedReceiver<AppEvent>,

    should_quit: bool,
}

impl App {
    pub fn new(session: Session, keybindings: KeyBindings, theme: Theme, toast_ticks: u64) -> Self {
        let (tx, rx) = unbounded_channel();
        let mut app = Self {
            session,
            keybindings,
            theme,
            instruction_bar: InstructionBar::new(),
            results_table: ResultsTable::new(),
            regex_chips: RegexChips::new(),
            toast_stack: ToastStack::new(toast_ticks),
            confirm_dialog: ConfirmDialog::new(),
            help_panel: HelpPanel::new(),
            path_prompt: None,
            tx,
            rx,
            should_quit: false,
        };
        let initial = app.session.state.instruction.clone();
        app.instruction_bar.set_text(&initial);
        app.flush_toasts();
        app
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    pub fn keybindings(&self) -> &KeyBindings {
        &self.keybindings
    }

    /// Main loop: input, request completions and ticks
    pub async fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<()> {
        let mut events = EventStream::new();
        let mut ticker = tokio::time::interval(TICK);

        while !self.should_quit {
            terminal.draw(|frame| self.render(frame))?;

            tokio::select! {
                maybe_event = events.next() => match maybe_event {
                    Some(Ok(Event::Key(key))) => self.handle_key_event(key)?,
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        error!("Terminal event error: {}", e);
                        return Err(e.into());
                    }
                    None => self.should_quit = true,
                },
                Some(event) = self.rx.recv() => self.handle_app_event(event),
                _ = ticker.tick() => self.tick()?,
            }
        }
        Ok(())
    }

    pub fn handle_key_event(&mut self, key: KeyEvent) -> Result<()> {
        if key.kind != KeyEventKind::Press {
            return Ok(());
        }

        // Modal prompts take raw input first
        if let Some(prompt) = &mut self.path_prompt {
            match key.code {
                KeyCode::Enter => self.submit_path_prompt(),
                KeyCode::Esc => self.path_prompt = None,
                _ => {
                    prompt.handle_key(&key);
                }
            }
            return Ok(());
        }

        if self.session.state.pending_confirmation.is_some() {
            if let Some(action) = self.keybindings.get_action(&key) {
                self.confirm_dialog.handle_action(action)?;
            }
            match self.confirm_dialog.take_choice() {
                Some(ConfirmChoice::Accept) => {
                    self.session.state.apply(StateEvent::ConfirmationResolved(true))
                }
                Some(ConfirmChoice::Decline) => {
                    self.session.state.apply(StateEvent::ConfirmationResolved(false))
                }
                None => {}
            }
            self.flush_toasts();
            return Ok(());
        }

        if self.instruction_bar.is_focused() {
            match key.code {
                KeyCode::Enter => {
                    self.start_execute();
                    return Ok(());
                }
                KeyCode::Tab | KeyCode::Esc => {
                    self.set_table_focus(true);
                    return Ok(());
                }
                _ => {
                    if self.instruction_bar.handle_key(&key) {
                        let text = self.instruction_bar.text().to_string();
                        self.session.state.apply(StateEvent::InstructionChanged(text));
                        return Ok(());
                    }
                }
            }
        }

        if let Some(action) = self.keybindings.get_action(&key) {
            self.handle_action(action)?;
        }
        Ok(())
    }

    fn handle_action(&mut self, action: Action) -> Result<()> {
        if self.help_panel.handle_action(action)? {
            return Ok(());
        }

        match action {
            Action::Quit => self.should_quit = true,
            Action::Upload => self.open_prompt(PathPurpose::Upload),
            Action::Execute => self.set_table_focus(false),
            Action::RemoveFile => {
                self.session.state.apply(StateEvent::FileRemoved);
                self.results_table.reset_cursor();
            }
            Action::Download => {
                let available = self
                    .session
                    .state
                    .result
                    .as_ref()
                    .and_then(|r| r.download_url())
                    .is_some();
                if available {
                    self.open_prompt(PathPurpose::Download);
                } else {
                    self.session
                        .state
                        .push_toast(ToastLevel::Warning, "No download available yet");
                }
            }
            Action::Export => self.open_prompt(PathPurpose::Export),
            Action::SaveReport => self.open_prompt(PathPurpose::Report),
            Action::ToggleHitsOnly => {
                self.session.state.apply(StateEvent::ShowHitsOnlyToggled);
                self.results_table.reset_cursor();
            }
            Action::ToggleRegexInfo => self.session.state.apply(StateEvent::RegexInfoToggled),
            Action::ToggleAutoChain => {
                let enable = !self.session.state.auto_chain;
                self.session.state.apply(StateEvent::AutoChainRequested(enable));
            }
            Action::FirstPage => self.navigate(PageNav::First),
            Action::PrevPage => self.navigate(PageNav::Prev),
            Action::NextPage => self.navigate(PageNav::Next),
            Action::LastPage => self.navigate(PageNav::Last),
            Action::CyclePageSize => {
                self.session.state.apply(StateEvent::PageSizeCycled);
                self.results_table.reset_cursor();
            }
            Action::FocusNext => {
                let table_focused = self.results_table.is_focused();
                self.set_table_focus(!table_focused);
            }
            Action::MoveUp | Action::MoveDown => {
                self.results_table.handle_action(action)?;
            }
            Action::ToggleHelp | Action::Confirm | Action::Cancel => {}
        }
        self.flush_toasts();
        Ok(())
    }

    fn navigate(&mut self, nav: PageNav) {
        self.session.state.apply(StateEvent::Page(nav));
        self.results_table.reset_cursor();
    }

    fn set_table_focus(&mut self, table: bool) {
        self.results_table.set_focused(table);
        self.instruction_bar.set_focused(!table);
    }

    fn open_prompt(&mut self, purpose: PathPurpose) {
        if purpose == PathPurpose::Upload && self.session.state.is_busy() {
            self.session
                .state
                .push_toast(ToastLevel::Warning, "A request is already running");
            return;
        }
        self.path_prompt = Some(PathPrompt::new(purpose));
    }

    fn submit_path_prompt(&mut self) {
        let Some(prompt) = &mut self.path_prompt else {
            return;
        };
        let Some(path) = prompt.submit() else {
            return;
        };
        let purpose = prompt.purpose();
        self.path_prompt = None;
        match purpose {
            PathPurpose::Upload => self.start_upload(path),
            PathPurpose::Download => self.start_download(path),
            PathPurpose::Export => self.export_preview(&path),
            PathPurpose::Report => self.save_report(&path),
        }
        self.flush_toasts();
    }

    /// Begin an upload on a background task
    pub fn start_upload(&mut self, path: PathBuf) {
        if !self.session.begin_upload() {
            return;
        }
        let client = self.session.client().clone();
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let result = client.upload(&path).await;
            let _ = tx.send(AppEvent::UploadFinished(result));
        });
    }

    /// Send the current instruction on a background task
    pub fn start_execute(&mut self) {
        let text = self.instruction_bar.text().to_string();
        let Some(request) = self.session.begin_execute(&text) else {
            self.flush_toasts();
            return;
        };
        self.set_table_focus(true);
        let client = self.session.client().clone();
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let result = client.execute(&request).await;
            let _ = tx.send(AppEvent::ExecuteFinished { request, result });
        });
    }

    fn start_download(&mut self, dest: PathBuf) {
        let Some(link) = self
            .session
            .state
            .result
            .as_ref()
            .and_then(|r| r.download_url())
            .map(str::to_string)
        else {
            return;
        };
        let client = self.session.client().clone();
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let result = client.download(&link, &dest).await;
            let _ = tx.send(AppEvent::DownloadFinished { dest, result });
        });
    }

    fn export_preview(&mut self, dest: &Path) {
        match self.session.export_preview_csv(dest) {
            Ok(n) => self
                .session
                .state
                .push_toast(ToastLevel::Success, format!("Exported {} rows to {}", n, dest.display())),
            Err(e) => {
                error!("Export failed: {:?}", e);
                self.session.state.push_toast(ToastLevel::Error, "Export failed");
            }
        }
    }

    fn save_report(&mut self, dest: &Path) {
        let html = render_report_html(&self.session.state);
        match std::fs::write(dest, html) {
            Ok(()) => {
                info!("Wrote report to {}", dest.display());
                self.session
                    .state
                    .push_toast(ToastLevel::Success, format!("Saved {}", dest.display()));
            }
            Err(e) => {
                error!("Could not write report {}: {}", dest.display(), e);
                self.session.state.push_toast(ToastLevel::Error, "Could not save report");
            }
        }
    }

    pub fn handle_app_event(&mut self, event: AppEvent) {
        debug!("App event: {:?}", event);
        match event {
            AppEvent::UploadFinished(result) => self.session.finish_upload(result),
            AppEvent::ExecuteFinished { request, result } => {
                self.session.finish_execute(request, result)
            }
            AppEvent::DownloadFinished { dest, result } => match result {
                Ok(bytes) => self.session.state.push_toast(
                    ToastLevel::Success,
                    format!("Downloaded {} bytes to {}", bytes, dest.display()),
                ),
                Err(e) => {
                    error!("Download failed: {}", e);
                    self.session.state.push_toast(ToastLevel::Error, "Download failed");
                }
            },
        }
        self.results_table.reset_cursor();
        self.flush_toasts();
    }

    fn tick(&mut self) -> Result<()> {
        self.toast_stack.update()
    }

    fn flush_toasts(&mut self) {
        for toast in self.session.state.drain_toasts() {
            self.toast_stack.push(toast);
        }
    }

    fn status_line(&self) -> Line<'static> {
        let hints = [
            (Action::ToggleHelp, "help"),
            (Action::Upload, "upload"),
            (Action::Execute, "instruction"),
            (Action::ToggleAutoChain, "auto-chain"),
            (Action::NextPage, "next page"),
            (Action::Quit, "quit"),
        ];
        let mut spans = Vec::new();
        for (action, label) in hints {
            if let Some(key) = self.keybindings.get_keys_for_action(action).first() {
                spans.push(Span::styled(format!(" {} ", key), self.theme.selected_style()));
                spans.push(Span::styled(format!(" {}  ", label), self.theme.muted_style()));
            }
        }
        Line::from(spans)
    }

    pub fn render(&mut self, frame: &mut Frame) {
        let area = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(RegexChips::height(&self.session.state)),
                Constraint::Length(3),
                Constraint::Min(3),
                Constraint::Length(1),
            ])
            .split(area);

        let ctx = RenderContext {
            state: &self.session.state,
            theme: &self.theme,
            keybindings: &self.keybindings,
        };
        self.regex_chips.render(frame, chunks[0], &ctx);
        self.instruction_bar.render(frame, chunks[1], &ctx);
        self.results_table.render(frame, chunks[2], &ctx);
        frame.render_widget(Paragraph::new(self.status_line()), chunks[3]);

        self.toast_stack.render(frame, chunks[2], &ctx);
        self.confirm_dialog.render(frame, area, &ctx);
        if let Some(prompt) = &mut self.path_prompt {
            prompt.render(frame, area, &ctx);
        }
        self.help_panel.render(frame, area, &ctx);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::state::ViewState;
    use crate::core::types::FileId;
    use crate::services::{ApiClient, ApiConfig};
    use crossterm::event::KeyModifiers;
    use ratatui::backend::TestBackend;

    fn app() -> App {
        let client = ApiClient::new(&ApiConfig::default()).unwrap();
        let session = Session::new(client, ViewState::default());
        App::new(session, KeyBindings::default(), Theme::default(), 8)
    }

    fn press(app: &mut App, code: KeyCode) {
        app.handle_key_event(KeyEvent::new(code, KeyModifiers::NONE)).unwrap();
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            press(app, KeyCode::Char(c));
        }
    }

    #[test]
    fn test_quit_key() {
        let mut app = app();
        press(&mut app, KeyCode::Char('q'));
        assert!(app.should_quit());
    }

    #[test]
    fn test_typing_goes_to_instruction_bar() {
        let mut app = app();
        press(&mut app, KeyCode::Char('i'));
        type_text(&mut app, "quit now");
        assert!(!app.should_quit());
        assert_eq!(app.session().state.instruction, "quit now");
        press(&mut app, KeyCode::Esc);
        press(&mut app, KeyCode::Char('q'));
        assert!(app.should_quit());
    }

    #[test]
    fn test_execute_without_upload_warns() {
        let mut app = app();
        press(&mut app, KeyCode::Char('i'));
        type_text(&mut app, "find emails");
        press(&mut app, KeyCode::Enter);
        assert!(!app.session().state.is_busy());
        let messages: Vec<&str> = app.toast_stack.visible().map(|t| t.message.as_str()).collect();
        assert_eq!(messages, vec!["Upload a file before running an instruction"]);
    }

    #[test]
    fn test_auto_chain_confirmation_flow() {
        let mut app = app();
        press(&mut app, KeyCode::Char('a'));
        assert!(app.session().state.pending_confirmation.is_some());
        press(&mut app, KeyCode::Char('q'));
        assert!(!app.should_quit());
        press(&mut app, KeyCode::Char('y'));
        assert!(app.session().state.auto_chain);
        assert!(app.session().state.pending_confirmation.is_none());

        press(&mut app, KeyCode::Char('a'));
        assert!(!app.session().state.auto_chain);
        assert!(app.session().state.pending_confirmation.is_none());
    }

    #[test]
    fn test_declined_confirmation_changes_nothing() {
        let mut app = app();
        press(&mut app, KeyCode::Char('a'));
        press(&mut app, KeyCode::Esc);
        assert!(!app.session().state.auto_chain);
        assert!(app.session().state.pending_confirmation.is_none());
    }

    #[test]
    fn test_path_prompt_captures_keys() {
        let mut app = app();
        press(&mut app, KeyCode::Char('o'));
        assert!(app.path_prompt.is_some());
        type_text(&mut app, "q");
        assert!(!app.should_quit());
        press(&mut app, KeyCode::Enter);
        assert!(app.path_prompt.is_some());
        press(&mut app, KeyCode::Esc);
        assert!(app.path_prompt.is_none());
    }

    #[test]
    fn test_download_without_result_warns() {
        let mut app = app();
        press(&mut app, KeyCode::Char('d'));
        assert!(app.path_prompt.is_none());
        assert!(!app.toast_stack.is_empty());
    }

    #[test]
    fn test_upload_event_updates_state() {
        let mut app = app();
        assert!(app.session.begin_upload());
        app.handle_app_event(AppEvent::UploadFinished(Ok(UploadResponse {
            file_id: FileId::Int(5),
            filename: "data.csv".to_string(),
            is_excel: false,
            columns: vec!["a".to_string()],
            head: Vec::new(),
        })));
        assert!(!app.session().state.is_busy());
        assert_eq!(
            app.session().state.upload.as_ref().map(|u| u.file_id.clone()),
            Some(FileId::Int(5))
        );
        let messages: Vec<&str> = app.toast_stack.visible().map(|t| t.message.as_str()).collect();
        assert_eq!(messages, vec!["Uploaded data.csv"]);
    }

    #[test]
    fn test_render_smoke() {
        let mut app = app();
        press(&mut app, KeyCode::Char('?'));
        let mut terminal = Terminal::new(TestBackend::new(100, 40)).unwrap();
        terminal.draw(|frame| app.render(frame)).unwrap();
        let screen: String = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect();
        assert!(screen.contains("Help"));
        assert!(screen.contains("Instruction"));
    }
}
