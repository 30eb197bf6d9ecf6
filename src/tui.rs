//! TUI layer using ratatui and crossterm
//!
//! Draws the line picker and feeds key presses into the session one at a time.

use crate::diff::LineKind;
use crate::session::{Action, Persist, Session};
use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame, Terminal,
};
use std::io;

const HELP_LINES: [&str; 5] = [
    " Select the differences (-/+) that you want to carry over to the new file",
    "   Navigate with arrows or 'j' and 'k'",
    "   Press 'space' to select/deselect",
    "   Press 'ctrl+s' to save and quit, 'q' to quit without saving",
    "   Apply the result using patch, ie. `patch new_file < diff.pin`",
];

/// Application state
pub struct App<'a> {
    session: Session,
    sink: &'a mut dyn Persist,
    show_help: bool,
    message: Option<String>,
    /// Rows of the line list seen on the last draw
    page_rows: usize,
}

impl<'a> App<'a> {
    pub fn new(session: Session, sink: &'a mut dyn Persist, show_help: bool) -> Self {
        let message = if session.model().is_empty() {
            Some(" Input contained no lines. Press q to quit.".to_string())
        } else {
            None
        };

        Self {
            session,
            sink,
            show_help,
            message,
            page_rows: 1,
        }
    }

    pub fn into_session(self) -> Session {
        self.session
    }

    /// Feeds one key press into the session. Returns true once the session
    /// has terminated.
    pub fn handle_input(&mut self, key: KeyEvent) -> bool {
        if key.kind != KeyEventKind::Press {
            return false;
        }

        // Clear message on any input
        if !self.session.model().is_empty() {
            self.message = None;
        }

        let action = action_for(key, self.page_rows);
        if action == Action::Toggle && !self.session.model().is_empty() {
            let cursor = self.session.model().cursor();
            let verb = if self.session.model().is_selected(cursor) {
                "Unpinned"
            } else {
                "Pinned"
            };
            self.message = Some(format!(" {} line {}", verb, cursor + 1));
        }

        self.session.handle(action, self.sink);
        self.session.is_terminated()
    }
}

/// Maps a key press to a session action. `page` is the number of rows
/// PageUp/PageDown move by.
pub fn action_for(key: KeyEvent, page: usize) -> Action {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

    match key.code {
        KeyCode::Char('c') if ctrl => Action::Quit,
        KeyCode::Char('s') if ctrl => Action::Commit,
        _ if ctrl => Action::Ignore,

        KeyCode::Char('q') | KeyCode::Esc => Action::Quit,

        // Navigation
        KeyCode::Char('k') | KeyCode::Up => Action::MoveUp,
        KeyCode::Char('j') | KeyCode::Down => Action::MoveDown,
        KeyCode::Char('g') | KeyCode::Home => Action::Top,
        KeyCode::Char('G') | KeyCode::End => Action::Bottom,
        KeyCode::PageUp => Action::PageUp(page),
        KeyCode::PageDown => Action::PageDown(page),

        KeyCode::Char(' ') | KeyCode::Enter => Action::Toggle,

        _ => Action::Ignore,
    }
}

/// Runs the TUI application until the session terminates
pub fn run(session: Session, sink: &mut dyn Persist, show_help: bool) -> Result<Session> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(session, sink, show_help);

    let result = run_app(&mut terminal, &mut app);

    // Restore terminal
    restore()?;
    terminal.show_cursor()?;

    result.map(|()| app.into_session())
}

/// Leaves raw mode and the alternate screen
pub fn restore() -> Result<()> {
    disable_raw_mode()?;
    execute!(io::stdout(), LeaveAlternateScreen)?;
    Ok(())
}

fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<()> {
    loop {
        terminal.draw(|f| ui(f, app))?;

        if let Event::Key(key) = event::read()? {
            if app.handle_input(key) {
                return Ok(());
            }
        }
    }
}

fn ui(f: &mut Frame, app: &mut App) {
    let header_height = if app.show_help {
        HELP_LINES.len() as u16 + 2
    } else {
        0
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(header_height), // Instructions
            Constraint::Min(0),                // Lines
            Constraint::Length(3),             // Status
        ])
        .split(f.area());

    if app.show_help {
        render_header(f, chunks[0]);
    }

    render_lines(f, app, chunks[1]);

    render_status(f, app, chunks[2]);
}

fn render_header(f: &mut Frame, area: Rect) {
    let header = Paragraph::new(HELP_LINES.join("\n"))
        .style(Style::default().fg(Color::Cyan))
        .block(Block::default().borders(Borders::ALL).title(" diffpin "));

    f.render_widget(header, area);
}

fn render_lines(f: &mut Frame, app: &mut App, area: Rect) {
    let model = app.session.model();
    let visible_height = (area.height as usize).saturating_sub(2).max(1); // Account for borders

    // Keep the cursor on screen
    let scroll_offset = if model.cursor() >= visible_height {
        model.cursor() - visible_height + 1
    } else {
        0
    };

    let items: Vec<ListItem> = model
        .lines()
        .iter()
        .enumerate()
        .skip(scroll_offset)
        .take(visible_height)
        .filter_map(|(idx, line)| model.row(idx).map(|row| (idx, row, line)))
        .map(|(idx, row, line)| {
            let style = match LineKind::of(line) {
                LineKind::FileHeader => Style::default().add_modifier(Modifier::BOLD),
                LineKind::HunkHeader => Style::default().fg(Color::Cyan),
                LineKind::Addition => Style::default().fg(Color::Green),
                LineKind::Deletion => Style::default().fg(Color::Red),
                LineKind::Context => Style::default(),
            };

            // Highlight current line
            let style = if idx == model.cursor() {
                style.add_modifier(Modifier::REVERSED)
            } else {
                style
            };

            ListItem::new(Line::from(vec![Span::styled(row, style)]))
        })
        .collect();

    let title = format!(" {} ", app.session.mode());
    let list = List::new(items).block(Block::default().borders(Borders::ALL).title(title));

    f.render_widget(list, area);
    app.page_rows = visible_height;
}

fn render_status(f: &mut Frame, app: &App, area: Rect) {
    let model = app.session.model();
    let content = match &app.message {
        Some(msg) => msg.clone(),
        None => format!(
            " {} pinned | line {}/{} | j/k: navigate | space: toggle | ctrl+s: save | q: quit",
            model.selected_count(),
            model.cursor() + 1,
            model.len()
        ),
    };

    let status = Paragraph::new(content)
        .style(Style::default().fg(Color::Yellow))
        .block(Block::default().borders(Borders::ALL));

    f.render_widget(status, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff::Mode;
    use crate::selection::SelectionModel;
    use crate::session::{Outcome, State};
    use ratatui::backend::TestBackend;

    #[derive(Default)]
    struct NullSink {
        writes: Vec<String>,
    }

    impl Persist for NullSink {
        fn describe(&self) -> String {
            "null".to_string()
        }

        fn write(&mut self, text: &str) -> Result<()> {
            self.writes.push(text.to_string());
            Ok(())
        }
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ctrl(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    fn screen(terminal: &Terminal<TestBackend>) -> String {
        let buffer = terminal.backend().buffer();
        let width = buffer.area.width as usize;
        buffer
            .content()
            .chunks(width)
            .map(|row| row.iter().map(|c| c.symbol()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn test_key_mapping() {
        assert_eq!(action_for(key(KeyCode::Up), 5), Action::MoveUp);
        assert_eq!(action_for(key(KeyCode::Char('k')), 5), Action::MoveUp);
        assert_eq!(action_for(key(KeyCode::Down), 5), Action::MoveDown);
        assert_eq!(action_for(key(KeyCode::Char('j')), 5), Action::MoveDown);
        assert_eq!(action_for(key(KeyCode::Char(' ')), 5), Action::Toggle);
        assert_eq!(action_for(key(KeyCode::Enter), 5), Action::Toggle);
        assert_eq!(action_for(key(KeyCode::PageDown), 5), Action::PageDown(5));
        assert_eq!(action_for(ctrl('s'), 5), Action::Commit);
        assert_eq!(action_for(ctrl('c'), 5), Action::Quit);
        assert_eq!(action_for(key(KeyCode::Char('q')), 5), Action::Quit);
        assert_eq!(action_for(key(KeyCode::Char('s')), 5), Action::Ignore);
        assert_eq!(action_for(ctrl('x'), 5), Action::Ignore);
        assert_eq!(action_for(key(KeyCode::F(2)), 5), Action::Ignore);
    }

    #[test]
    fn test_handle_input_drives_session() {
        let mut sink = NullSink::default();
        let session = Session::new(SelectionModel::load("a\nb\nc"), Mode::Filter);
        let mut app = App::new(session, &mut sink, true);

        assert!(!app.handle_input(key(KeyCode::Char('j'))));
        assert!(!app.handle_input(key(KeyCode::Char(' '))));
        assert_eq!(app.message.as_deref(), Some(" Pinned line 2"));
        assert!(app.handle_input(ctrl('s')));

        let session = app.into_session();
        assert_eq!(session.state(), State::Terminated);
        assert!(matches!(session.outcome(), Some(Outcome::Saved { bytes: 2, .. })));
        assert_eq!(sink.writes, vec!["b\n".to_string()]);
    }

    #[test]
    fn test_key_release_is_ignored() {
        let mut sink = NullSink::default();
        let session = Session::new(SelectionModel::load("a\nb"), Mode::Filter);
        let mut app = App::new(session, &mut sink, false);

        let mut release = key(KeyCode::Char('q'));
        release.kind = KeyEventKind::Release;

        assert!(!app.handle_input(release));
        assert_eq!(app.session.state(), State::Editing);
    }

    #[test]
    fn test_render_shows_rows_and_status() {
        let mut sink = NullSink::default();
        let session = Session::new(SelectionModel::load("--- old\n-x\n+y"), Mode::HunkAware);
        let mut app = App::new(session, &mut sink, true);
        app.handle_input(key(KeyCode::Down));
        app.handle_input(key(KeyCode::Char(' ')));
        app.handle_input(key(KeyCode::Down));

        let mut terminal = Terminal::new(TestBackend::new(100, 20)).unwrap();
        terminal.draw(|f| ui(f, &mut app)).unwrap();
        let text = screen(&terminal);

        assert!(text.contains("Navigate with arrows"));
        assert!(text.contains("hunk-aware"));
        assert!(text.contains("  [ ] --- old"));
        assert!(text.contains("  [x] -x"));
        assert!(text.contains("> [ ] +y"));
        assert!(text.contains("1 pinned | line 3/3"));
    }

    #[test]
    fn test_render_scrolls_to_cursor() {
        let mut sink = NullSink::default();
        let input: Vec<String> = (1..=50).map(|n| format!("line{}", n)).collect();
        let session = Session::new(SelectionModel::load(&input.join("\n")), Mode::Filter);
        let mut app = App::new(session, &mut sink, false);

        let mut terminal = Terminal::new(TestBackend::new(60, 12)).unwrap();
        terminal.draw(|f| ui(f, &mut app)).unwrap();
        // 12 rows minus status (3) minus list borders (2)
        assert_eq!(app.page_rows, 7);

        app.handle_input(key(KeyCode::End));
        terminal.draw(|f| ui(f, &mut app)).unwrap();
        let text = screen(&terminal);

        assert!(text.contains("> [ ] line50"));
        assert!(!text.contains("line1 "));
    }

    #[test]
    fn test_empty_input_notice() {
        let mut sink = NullSink::default();
        let session = Session::new(SelectionModel::load(""), Mode::HunkAware);
        let mut app = App::new(session, &mut sink, false);

        app.handle_input(key(KeyCode::Down));
        assert_eq!(
            app.message.as_deref(),
            Some(" Input contained no lines. Press q to quit.")
        );

        assert!(app.handle_input(key(KeyCode::Char('q'))));
        assert!(sink.writes.is_empty());
    }
}
