//! Main Application
//!
//! The App struct manages the TUI lifecycle as a thin display client:
//! - Event loop (keyboard, resize, completions, ticks)
//! - Key routing into whichever surface is running
//! - Handing the surface's requests to the [`Dispatcher`]
//!
//! All view state lives in `policybot-core`. The App only decides which
//! key means what and when to redraw.

use crossterm::event::{Event, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use futures::StreamExt;
use ratatui::backend::Backend;
use ratatui::Terminal;
use std::time::Duration;
use tokio::sync::mpsc;

use policybot_core::{
    ChatAndDocsApp, Dispatcher, DocumentManager, Envelope, Request, Tab, Theme, Ticket, UiSettings,
};

use crate::render;
use crate::widgets::TranscriptState;

/// Redraw interval for the busy spinner
const TICK: Duration = Duration::from_millis(120);

/// Lines per PageUp/PageDown
const PAGE: isize = 10;

/// Which surface the App is running
#[derive(Debug)]
pub enum Surface {
    /// Chat, upload and document sidebar
    Chat(ChatAndDocsApp),
    /// Standalone document manager
    Manager(DocumentManager),
}

/// Main application state
#[derive(Debug)]
pub struct App {
    /// The running surface
    surface: Surface,
    /// Is the app still running?
    running: bool,
    /// Chat transcript scroll
    transcript: TranscriptState,
    /// Theme for the manager, which has no toggle of its own
    manager_theme: Theme,
    /// Spinner frame counter
    tick: usize,
}

impl App {
    /// Run the chat surface
    #[must_use]
    pub fn chat(ui: &UiSettings) -> Self {
        Self::with_surface(Surface::Chat(ChatAndDocsApp::new(ui)), ui.theme)
    }

    /// Run the document manager
    #[must_use]
    pub fn manager(ui: &UiSettings) -> Self {
        Self::with_surface(Surface::Manager(DocumentManager::new()), ui.theme)
    }

    fn with_surface(surface: Surface, theme: Theme) -> Self {
        Self {
            surface,
            running: true,
            transcript: TranscriptState::default(),
            manager_theme: theme,
            tick: 0,
        }
    }

    /// The running surface
    #[must_use]
    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    /// Whether the event loop should keep going
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Active theme
    #[must_use]
    pub fn theme(&self) -> Theme {
        match &self.surface {
            Surface::Chat(app) => app.theme(),
            Surface::Manager(_) => self.manager_theme,
        }
    }

    /// Spinner frame counter
    #[must_use]
    pub fn tick_count(&self) -> usize {
        self.tick
    }

    /// The chat surface together with its transcript scroll, if running
    pub(crate) fn chat_and_transcript(
        &mut self,
    ) -> Option<(&ChatAndDocsApp, &mut TranscriptState)> {
        match &self.surface {
            Surface::Chat(chat) => Some((chat, &mut self.transcript)),
            Surface::Manager(_) => None,
        }
    }

    /// Mount the surface
    pub fn mount(&mut self) -> Vec<(Ticket, Request)> {
        match &mut self.surface {
            Surface::Chat(app) => app.mount(),
            Surface::Manager(manager) => manager.mount(),
        }
    }

    /// Unmount the surface
    pub fn unmount(&mut self) {
        match &mut self.surface {
            Surface::Chat(app) => app.unmount(),
            Surface::Manager(manager) => manager.unmount(),
        }
    }

    /// Apply a completion to the surface
    pub fn apply(&mut self, envelope: Envelope) -> Vec<(Ticket, Request)> {
        match &mut self.surface {
            Surface::Chat(app) => {
                let before = app.chat().messages().len();
                let follow_up = app.apply(envelope);
                if app.chat().messages().len() != before {
                    self.transcript.scroll_to_bottom();
                }
                follow_up
            }
            Surface::Manager(manager) => manager.apply(envelope),
        }
    }

    /// Main event loop
    ///
    /// # Errors
    ///
    /// Returns an error if drawing to the terminal fails.
    pub async fn run<B: Backend>(
        &mut self,
        terminal: &mut Terminal<B>,
        dispatcher: &Dispatcher,
        completions: &mut mpsc::UnboundedReceiver<Envelope>,
    ) -> anyhow::Result<()> {
        let mut event_stream = EventStream::new();
        let mut ticker = tokio::time::interval(TICK);

        let requests = self.mount();
        dispatch_all(dispatcher, requests);

        // Render initial frame immediately so user sees UI
        terminal.draw(|frame| render::draw(frame, self))?;

        while self.running {
            tokio::select! {
                // Terminal events first
                biased;

                maybe_event = event_stream.next() => match maybe_event {
                    Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => {
                        let requests = self.handle_key(key);
                        dispatch_all(dispatcher, requests);
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => tracing::warn!(error = %e, "Terminal event error"),
                    None => self.running = false,
                },

                Some(envelope) = completions.recv() => {
                    let requests = self.apply(envelope);
                    dispatch_all(dispatcher, requests);
                }

                _ = ticker.tick() => {
                    self.tick = self.tick.wrapping_add(1);
                }
            }

            terminal.draw(|frame| render::draw(frame, self))?;
        }

        self.unmount();
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Keys
    // ------------------------------------------------------------------------

    /// Handle one key press; returns requests to dispatch
    pub fn handle_key(&mut self, key: KeyEvent) -> Vec<(Ticket, Request)> {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

        if ctrl && key.code == KeyCode::Char('c') {
            self.running = false;
            return Vec::new();
        }

        if matches!(self.surface, Surface::Chat(_)) {
            self.handle_chat_key(key, ctrl)
        } else {
            self.handle_manager_key(key, ctrl)
        }
    }

    fn handle_chat_key(&mut self, key: KeyEvent, ctrl: bool) -> Vec<(Ticket, Request)> {
        let Surface::Chat(app) = &mut self.surface else {
            return Vec::new();
        };

        // The delete prompt blocks everything else
        if app.documents().pending_confirmation().is_some() {
            match key.code {
                KeyCode::Char('y' | 'Y') | KeyCode::Enter => return app.confirm_delete(),
                KeyCode::Char('n' | 'N') | KeyCode::Esc => app.cancel_delete(),
                _ => {}
            }
            return Vec::new();
        }

        match key.code {
            KeyCode::Esc => self.running = false,
            KeyCode::F(5) => return app.refresh(),
            KeyCode::Tab => app.next_tab(),
            KeyCode::Char('t') if ctrl => app.toggle_theme(),
            KeyCode::Char('b') if ctrl => app.toggle_sidebar(),
            KeyCode::Char('u') if ctrl => return app.submit_upload(),
            // The document list only takes keys while it is on screen
            KeyCode::Char('d') if ctrl && app.sidebar_visible() => {
                app.documents_mut().request_delete_selected();
            }
            KeyCode::Delete if app.sidebar_visible() => {
                app.documents_mut().request_delete_selected();
            }
            KeyCode::Up if app.sidebar_visible() => app.documents_mut().select_previous(),
            KeyCode::Down if app.sidebar_visible() => app.documents_mut().select_next(),
            KeyCode::PageUp => self.transcript.scroll(PAGE),
            KeyCode::PageDown => self.transcript.scroll(-PAGE),
            KeyCode::End if ctrl => self.transcript.scroll_to_bottom(),
            KeyCode::Char(_) if ctrl => {}
            code => {
                return match app.tab() {
                    Tab::Chat => chat_input_key(app, code),
                    Tab::Upload => upload_input_key(app, code),
                };
            }
        }
        Vec::new()
    }

    fn handle_manager_key(&mut self, key: KeyEvent, ctrl: bool) -> Vec<(Ticket, Request)> {
        let Surface::Manager(manager) = &mut self.surface else {
            return Vec::new();
        };

        // Alerts are modal and dismissed with Enter or Esc
        if manager.alert().is_some() {
            if matches!(key.code, KeyCode::Enter | KeyCode::Esc) {
                manager.dismiss_alert();
            }
            return Vec::new();
        }

        if manager.documents().pending_confirmation().is_some() {
            match key.code {
                KeyCode::Char('y' | 'Y') | KeyCode::Enter => return manager.confirm_delete(),
                KeyCode::Char('n' | 'N') | KeyCode::Esc => manager.cancel_delete(),
                _ => {}
            }
            return Vec::new();
        }

        match key.code {
            KeyCode::Esc => self.running = false,
            KeyCode::F(5) => return manager.refresh(),
            KeyCode::Char('t') if ctrl => self.manager_theme = self.manager_theme.toggled(),
            KeyCode::Char('u') if ctrl => return manager.submit_upload(),
            KeyCode::Char('d') if ctrl => {
                manager.documents_mut().request_delete_selected();
            }
            KeyCode::Delete => {
                manager.documents_mut().request_delete_selected();
            }
            KeyCode::Up => manager.documents_mut().select_previous(),
            KeyCode::Down => manager.documents_mut().select_next(),
            KeyCode::Enter => {
                if manager.upload().path_input().trim().is_empty() {
                    return manager.submit_upload();
                }
                manager.upload_mut().select_typed_path();
            }
            KeyCode::Backspace => manager.upload_mut().backspace(),
            KeyCode::Char(c) if !ctrl => manager.upload_mut().push_char(c),
            _ => {}
        }
        Vec::new()
    }
}

fn chat_input_key(app: &mut ChatAndDocsApp, code: KeyCode) -> Vec<(Ticket, Request)> {
    match code {
        KeyCode::Enter => return app.submit_question(),
        KeyCode::Backspace => app.chat_mut().backspace(),
        KeyCode::Char(c) => app.chat_mut().push_char(c),
        _ => {}
    }
    Vec::new()
}

fn upload_input_key(app: &mut ChatAndDocsApp, code: KeyCode) -> Vec<(Ticket, Request)> {
    match code {
        KeyCode::Enter => {
            if app.upload().path_input().trim().is_empty() {
                return app.submit_upload();
            }
            app.upload_mut().select_typed_path();
        }
        KeyCode::Backspace => app.upload_mut().backspace(),
        KeyCode::Char(c) => app.upload_mut().push_char(c),
        _ => {}
    }
    Vec::new()
}

fn dispatch_all(dispatcher: &Dispatcher, requests: Vec<(Ticket, Request)>) {
    for (ticket, request) in requests {
        dispatcher.dispatch(ticket, request);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use policybot_core::{Completion, Document, UploadSelection};
    use pretty_assertions::assert_eq;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ctrl(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            assert!(app.handle_key(key(KeyCode::Char(c))).is_empty());
        }
    }

    fn chat_app() -> (App, Vec<(Ticket, Request)>) {
        let mut app = App::chat(&UiSettings::default());
        let requests = app.mount();
        (app, requests)
    }

    fn chat(app: &App) -> &ChatAndDocsApp {
        match app.surface() {
            Surface::Chat(chat) => chat,
            Surface::Manager(_) => panic!("expected chat surface"),
        }
    }

    fn manager(app: &App) -> &DocumentManager {
        match app.surface() {
            Surface::Manager(manager) => manager,
            Surface::Chat(_) => panic!("expected manager surface"),
        }
    }

    #[test]
    fn test_typing_and_enter_asks() {
        let (mut app, _) = chat_app();
        type_text(&mut app, "sick leave?");

        let requests = app.handle_key(key(KeyCode::Enter));

        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].1, Request::Ask("sick leave?".to_string()));
        assert!(chat(&app).chat().is_loading());
    }

    #[test]
    fn test_quit_keys() {
        let (mut app, _) = chat_app();
        app.handle_key(ctrl('c'));
        assert!(!app.is_running());

        let (mut app, _) = chat_app();
        app.handle_key(key(KeyCode::Esc));
        assert!(!app.is_running());
    }

    #[test]
    fn test_chrome_keys() {
        let (mut app, _) = chat_app();
        app.handle_key(ctrl('t'));
        assert_eq!(app.theme(), Theme::Dark);
        app.handle_key(ctrl('b'));
        assert!(!chat(&app).sidebar_visible());
        app.handle_key(key(KeyCode::Tab));
        assert_eq!(chat(&app).tab(), Tab::Upload);
    }

    #[test]
    fn test_upload_tab_selects_then_uploads() {
        let (mut app, _) = chat_app();
        app.handle_key(key(KeyCode::Tab));
        type_text(&mut app, "/tmp/handbook.pdf");

        assert!(app.handle_key(key(KeyCode::Enter)).is_empty());
        assert_eq!(
            chat(&app).upload().selection().map(|s| s.name.as_str()),
            Some("handbook.pdf")
        );

        let requests = app.handle_key(key(KeyCode::Enter));
        assert!(matches!(requests[0].1, Request::Upload(_)));
    }

    #[test]
    fn test_delete_prompt_blocks_other_keys() {
        let (mut app, requests) = chat_app();
        let (ticket, _) = requests[0];
        app.apply(Envelope {
            ticket,
            completion: Completion::History(Ok(vec![Document::new(4, "a.pdf")])),
        });

        app.handle_key(key(KeyCode::Delete));
        assert!(chat(&app).documents().pending_confirmation().is_some());

        type_text(&mut app, "x");
        assert!(chat(&app).chat().input().is_empty());
        assert!(app.is_running());

        let requests = app.handle_key(key(KeyCode::Char('y')));
        assert_eq!(requests[0].1, Request::Delete(Document::new(4, "a.pdf")));
    }

    #[test]
    fn test_manager_alert_is_modal() {
        let mut app = App::manager(&UiSettings::default());
        app.mount();

        // Nothing selected: Enter raises the alert
        assert!(app.handle_key(key(KeyCode::Enter)).is_empty());
        assert!(manager(&app).alert().is_some());

        type_text(&mut app, "abc");
        assert!(manager(&app).upload().path_input().is_empty());

        app.handle_key(key(KeyCode::Esc));
        assert!(manager(&app).alert().is_none());
        assert!(app.is_running(), "Esc dismissed the alert, not the app");
    }

    #[test]
    fn test_manager_upload_flow() {
        let mut app = App::manager(&UiSettings::default());
        app.mount();
        type_text(&mut app, "/srv/policies/travel.pdf");
        app.handle_key(key(KeyCode::Enter));

        let requests = app.handle_key(ctrl('u'));
        assert_eq!(
            requests[0].1,
            Request::Upload(UploadSelection::from_path("/srv/policies/travel.pdf").unwrap())
        );
    }

    #[test]
    fn test_hidden_sidebar_ignores_list_keys() {
        let (mut app, requests) = chat_app();
        let (ticket, _) = requests[0];
        app.apply(Envelope {
            ticket,
            completion: Completion::History(Ok(vec![
                Document::new(1, "a.pdf"),
                Document::new(2, "b.pdf"),
            ])),
        });
        app.handle_key(ctrl('b'));
        assert!(!chat(&app).sidebar_visible());

        app.handle_key(key(KeyCode::Down));
        assert_eq!(chat(&app).documents().cursor(), 0);
        app.handle_key(key(KeyCode::Delete));
        app.handle_key(ctrl('d'));
        assert!(chat(&app).documents().pending_confirmation().is_none());

        app.handle_key(ctrl('b'));
        app.handle_key(key(KeyCode::Delete));
        assert!(chat(&app).documents().pending_confirmation().is_some());
    }

    #[test]
    fn test_unbound_ctrl_chars_are_not_typed() {
        let (mut app, _) = chat_app();
        app.handle_key(ctrl('x'));
        assert!(chat(&app).chat().input().is_empty());

        app.handle_key(key(KeyCode::Tab));
        app.handle_key(ctrl('x'));
        assert!(chat(&app).upload().path_input().is_empty());

        let mut app = App::manager(&UiSettings::default());
        app.mount();
        app.handle_key(ctrl('x'));
        assert!(manager(&app).upload().path_input().is_empty());
    }
}
