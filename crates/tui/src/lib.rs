use std::io::{self, Stdout};
use std::sync::Arc;

use browseql_core::config::BrowserConfig;
use browseql_core::dispatcher::{LoadDispatcher, LoadEvent, LoadRequest};
use browseql_core::gateway::StorageGateway;
use browseql_core::query_input::EditKey;
use browseql_core::session::{Action, Session};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use thiserror::Error;
use tokio::runtime::Handle;
use tokio::sync::mpsc::UnboundedReceiver;

mod render;

pub use render::{render, Theme};

#[derive(Debug, Error)]
pub enum TuiError {
    #[error("i/o error: {0}")]
    Io(#[from] io::Error),
}

/// Owns the session and routes input and load results through it.
#[derive(Debug)]
struct App<G: StorageGateway + 'static> {
    session: Session,
    dispatcher: LoadDispatcher<G>,
    events: UnboundedReceiver<LoadEvent>,
}

impl<G: StorageGateway + 'static> App<G> {
    fn new(runtime: Handle, gateway: Arc<G>, config: &BrowserConfig) -> Self {
        let (session, initial) = Session::new(config);
        let (dispatcher, events) = LoadDispatcher::channel(runtime, gateway, config.row_limit);
        let app = Self {
            session,
            dispatcher,
            events,
        };
        app.dispatch(initial);
        app
    }

    fn session(&self) -> &Session {
        &self.session
    }

    fn handle_action(&mut self, action: Action) {
        if let Some(request) = self.session.handle(action) {
            self.dispatch(request);
        }
    }

    fn drain_events(&mut self) {
        while let Ok(event) = self.events.try_recv() {
            self.session.apply(event);
        }
    }

    fn dispatch(&self, request: LoadRequest) {
        // Completion is observed through the event channel, not the handle.
        drop(self.dispatcher.dispatch(request));
    }

    #[cfg(test)]
    async fn next_event(&mut self) {
        if let Some(event) = self.events.recv().await {
            self.session.apply(event);
        }
    }
}

pub fn run<G: StorageGateway + 'static>(
    runtime: Handle,
    gateway: Arc<G>,
    config: &BrowserConfig,
    database_label: &str,
) -> Result<(), TuiError> {
    let mut terminal = setup_terminal()?;
    let run_result = run_loop(&mut terminal, runtime, gateway, config, database_label);
    let restore_result = restore_terminal(&mut terminal);

    if let Err(error) = run_result {
        restore_result?;
        return Err(error);
    }

    restore_result?;
    Ok(())
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>, TuiError> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;
    Ok(terminal)
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<(), TuiError> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

fn run_loop<G: StorageGateway + 'static>(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    runtime: Handle,
    gateway: Arc<G>,
    config: &BrowserConfig,
    database_label: &str,
) -> Result<(), TuiError> {
    let theme = Theme::default();
    let tick_rate = config.tick_rate();
    let mut app = App::new(runtime, gateway, config);

    let size = terminal.size()?;
    app.handle_action(Action::Resize {
        width: size.width,
        height: size.height,
    });

    loop {
        terminal.draw(|frame| render(frame, app.session(), &theme, database_label))?;

        if event::poll(tick_rate)? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    if let Some(action) = map_key_event(key, app.session().accepts_text()) {
                        app.handle_action(action);
                    }
                }
                Event::Resize(width, height) => app.handle_action(Action::Resize { width, height }),
                _ => {}
            }
        }

        app.drain_events();

        if app.session().is_terminated() {
            tracing::info!("session ended by user");
            break;
        }
    }

    Ok(())
}

/// Maps a key press to a session action. `text_input` selects the query
/// editor bindings, where printable keys edit the buffer.
fn map_key_event(key: KeyEvent, text_input: bool) -> Option<Action> {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return match key.code {
            KeyCode::Char('c') => Some(Action::Quit),
            KeyCode::Char('u') if text_input => Some(Action::Edit(EditKey::ClearLine)),
            _ => None,
        };
    }

    if text_input {
        return match key.code {
            KeyCode::Enter => Some(Action::Select),
            KeyCode::Esc => Some(Action::Back),
            KeyCode::Backspace => Some(Action::Edit(EditKey::Backspace)),
            KeyCode::Delete => Some(Action::Edit(EditKey::Delete)),
            KeyCode::Left => Some(Action::Edit(EditKey::Left)),
            KeyCode::Right => Some(Action::Edit(EditKey::Right)),
            KeyCode::Home => Some(Action::Edit(EditKey::Home)),
            KeyCode::End => Some(Action::Edit(EditKey::End)),
            KeyCode::Char(ch) => Some(Action::Edit(EditKey::Insert(ch))),
            _ => None,
        };
    }

    match key.code {
        KeyCode::Char('q') => Some(Action::Quit),
        KeyCode::Up | KeyCode::Char('k') => Some(Action::Up),
        KeyCode::Down | KeyCode::Char('j') => Some(Action::Down),
        KeyCode::PageUp => Some(Action::PageUp),
        KeyCode::PageDown => Some(Action::PageDown),
        KeyCode::Home | KeyCode::Char('g') => Some(Action::Top),
        KeyCode::End | KeyCode::Char('G') => Some(Action::Bottom),
        KeyCode::Enter | KeyCode::Char(' ') => Some(Action::Select),
        KeyCode::Esc => Some(Action::Back),
        KeyCode::Char(':') => Some(Action::EnterQuery),
        KeyCode::Char('r') => Some(Action::Refresh),
        _ => None,
    }
}
