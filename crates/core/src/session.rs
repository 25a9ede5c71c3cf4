use crate::config::BrowserConfig;
use crate::dispatcher::{LoadEvent, LoadRequest, ResultSource};
use crate::formatter::grid_lines;
use crate::gateway::ResultSet;
use crate::query_input::{EditKey, QueryInput};

/// Terminal rows that never show grid content: header and footer panes
/// (three rows each) plus the workspace border.
pub const VIEWPORT_CHROME_ROWS: u16 = 8;

const DEFAULT_TERMINAL_WIDTH: u16 = 80;
const DEFAULT_TERMINAL_HEIGHT: u16 = 24;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Quit,
    Up,
    Down,
    PageUp,
    PageDown,
    Top,
    Bottom,
    Select,
    Back,
    EnterQuery,
    Refresh,
    Edit(EditKey),
    Resize { width: u16, height: u16 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultView {
    source: ResultSource,
    result: ResultSet,
    grid: Vec<String>,
    viewport_offset: usize,
}

impl ResultView {
    fn new(source: ResultSource, result: ResultSet, max_column_width: usize) -> Self {
        let grid = grid_lines(&result.headers, &result.rows, max_column_width);
        Self {
            source,
            result,
            grid,
            viewport_offset: 0,
        }
    }

    #[must_use]
    pub fn source(&self) -> &ResultSource {
        &self.source
    }

    #[must_use]
    pub fn headers(&self) -> &[String] {
        &self.result.headers
    }

    #[must_use]
    pub fn rows(&self) -> &[Vec<String>] {
        &self.result.rows
    }

    #[must_use]
    pub fn grid(&self) -> &[String] {
        &self.grid
    }

    #[must_use]
    pub fn viewport_offset(&self) -> usize {
        self.viewport_offset
    }

    #[must_use]
    pub fn visible_lines(&self, height: usize) -> &[String] {
        let start = self.viewport_offset.min(self.grid.len());
        let end = (start + height).min(self.grid.len());
        &self.grid[start..end]
    }

    fn max_offset(&self, viewport_height: usize) -> usize {
        self.grid.len().saturating_sub(viewport_height)
    }

    fn scroll_to(&mut self, offset: usize, viewport_height: usize) {
        self.viewport_offset = offset.min(self.max_offset(viewport_height));
    }

    fn scroll_by(&mut self, delta: isize, viewport_height: usize) {
        let target = self.viewport_offset.saturating_add_signed(delta);
        self.scroll_to(target, viewport_height);
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    Tables,
    Data(ResultView),
    Query,
}

impl Mode {
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Tables => "tables",
            Self::Data(_) => "data",
            Self::Query => "query",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Overlay {
    #[default]
    None,
    Loading,
    Error(String),
}

#[derive(Debug, Clone)]
pub struct Session {
    mode: Mode,
    overlay: Overlay,
    tables: Vec<String>,
    cursor: usize,
    query: QueryInput,
    width: u16,
    height: u16,
    max_column_width: usize,
    terminated: bool,
}

impl Session {
    #[must_use]
    pub fn new(config: &BrowserConfig) -> (Self, LoadRequest) {
        let session = Self {
            mode: Mode::Tables,
            overlay: Overlay::Loading,
            tables: Vec::new(),
            cursor: 0,
            query: QueryInput::new(),
            width: DEFAULT_TERMINAL_WIDTH,
            height: DEFAULT_TERMINAL_HEIGHT,
            max_column_width: config.max_column_width,
            terminated: false,
        };
        (session, LoadRequest::Tables)
    }

    #[must_use]
    pub fn mode(&self) -> &Mode {
        &self.mode
    }

    #[must_use]
    pub fn overlay(&self) -> &Overlay {
        &self.overlay
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        matches!(self.overlay, Overlay::Loading)
    }

    #[must_use]
    pub fn last_error(&self) -> Option<&str> {
        match &self.overlay {
            Overlay::Error(message) => Some(message),
            Overlay::None | Overlay::Loading => None,
        }
    }

    #[must_use]
    pub fn tables(&self) -> &[String] {
        &self.tables
    }

    #[must_use]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    #[must_use]
    pub fn query(&self) -> &QueryInput {
        &self.query
    }

    #[must_use]
    pub fn result_view(&self) -> Option<&ResultView> {
        match &self.mode {
            Mode::Data(view) => Some(view),
            Mode::Tables | Mode::Query => None,
        }
    }

    #[must_use]
    pub fn selected_table(&self) -> Option<&str> {
        self.result_view().and_then(|view| view.source.table())
    }

    #[must_use]
    pub fn viewport_offset(&self) -> usize {
        self.result_view().map_or(0, ResultView::viewport_offset)
    }

    #[must_use]
    pub fn dimensions(&self) -> (u16, u16) {
        (self.width, self.height)
    }

    #[must_use]
    pub fn viewport_height(&self) -> usize {
        usize::from(self.height.saturating_sub(VIEWPORT_CHROME_ROWS).max(1))
    }

    #[must_use]
    pub fn is_terminated(&self) -> bool {
        self.terminated
    }

    /// True when keystrokes should edit the query buffer rather than navigate.
    #[must_use]
    pub fn accepts_text(&self) -> bool {
        matches!(self.mode, Mode::Query) && matches!(self.overlay, Overlay::None)
    }

    pub fn handle(&mut self, action: Action) -> Option<LoadRequest> {
        if self.terminated {
            return None;
        }

        match action {
            Action::Quit => {
                tracing::debug!(mode = self.mode.name(), "session terminated");
                self.terminated = true;
                return None;
            }
            Action::Resize { width, height } => {
                self.resize(width, height);
                return None;
            }
            _ => {}
        }

        match self.overlay {
            Overlay::Loading => return None,
            Overlay::Error(_) => {
                self.overlay = Overlay::None;
                return None;
            }
            Overlay::None => {}
        }

        match self.mode {
            Mode::Tables => self.handle_tables(action),
            Mode::Data(_) => self.handle_data(action),
            Mode::Query => self.handle_query(action),
        }
    }

    pub fn apply(&mut self, event: LoadEvent) {
        if self.terminated {
            tracing::debug!("discarding load result after session end");
            return;
        }

        match event {
            LoadEvent::TablesLoaded(tables) => {
                self.tables = tables;
                self.cursor = self.cursor.min(self.tables.len().saturating_sub(1));
                self.overlay = Overlay::None;
            }
            LoadEvent::RowsLoaded { source, result } => {
                let view = ResultView::new(source, result, self.max_column_width);
                self.set_mode(Mode::Data(view));
                self.overlay = Overlay::None;
            }
            LoadEvent::LoadFailed(error) => {
                self.overlay = Overlay::Error(error.to_string());
            }
        }
    }

    fn handle_tables(&mut self, action: Action) -> Option<LoadRequest> {
        let last = self.tables.len().saturating_sub(1);
        let page = self.viewport_height();
        match action {
            Action::Up => self.cursor = self.cursor.saturating_sub(1),
            Action::Down => self.cursor = (self.cursor + 1).min(last),
            Action::PageUp => self.cursor = self.cursor.saturating_sub(page),
            Action::PageDown => self.cursor = (self.cursor + page).min(last),
            Action::Top => self.cursor = 0,
            Action::Bottom => self.cursor = last,
            Action::Select => {
                let table = self.tables.get(self.cursor)?.clone();
                return self.begin_load(LoadRequest::Rows { table });
            }
            Action::Refresh => return self.begin_load(LoadRequest::Tables),
            Action::EnterQuery => {
                self.query.clear();
                self.set_mode(Mode::Query);
            }
            _ => {}
        }
        None
    }

    fn handle_data(&mut self, action: Action) -> Option<LoadRequest> {
        let page = self.viewport_height();
        let Mode::Data(view) = &mut self.mode else {
            return None;
        };

        let signed_page = isize::try_from(page).unwrap_or(isize::MAX);
        match action {
            Action::Up => view.scroll_by(-1, page),
            Action::Down => view.scroll_by(1, page),
            Action::PageUp => view.scroll_by(-signed_page, page),
            Action::PageDown => view.scroll_by(signed_page, page),
            Action::Top => view.scroll_to(0, page),
            Action::Bottom => view.scroll_to(usize::MAX, page),
            Action::Refresh => {
                let table = view.source.table()?.to_string();
                return self.begin_load(LoadRequest::Rows { table });
            }
            Action::Back => self.set_mode(Mode::Tables),
            _ => {}
        }
        None
    }

    fn handle_query(&mut self, action: Action) -> Option<LoadRequest> {
        match action {
            Action::Edit(key) => self.query.apply(key),
            Action::Select => {
                if self.query.text().trim().is_empty() {
                    return None;
                }
                let sql = self.query.take().trim().to_string();
                return self.begin_load(LoadRequest::Statement { sql });
            }
            Action::Back => {
                self.query.clear();
                self.set_mode(Mode::Tables);
            }
            _ => {}
        }
        None
    }

    fn begin_load(&mut self, request: LoadRequest) -> Option<LoadRequest> {
        self.overlay = Overlay::Loading;
        Some(request)
    }

    fn set_mode(&mut self, mode: Mode) {
        tracing::debug!(from = self.mode.name(), to = mode.name(), "mode transition");
        self.mode = mode;
    }

    fn resize(&mut self, width: u16, height: u16) {
        self.width = width;
        self.height = height;
        let page = self.viewport_height();
        if let Mode::Data(view) = &mut self.mode {
            view.scroll_to(view.viewport_offset, page);
        }
    }
}
