//! App: terminal init, main loop, cascade pacing and key handling.

use crate::GameConfig;
use crate::input::{Action, key_to_action};
use crate::progress::Progress;
use crate::theme::Theme;
use crate::ui::{self, PopFx, View};
use anyhow::Result;
use crossterm::event::{self, Event as TermEvent, KeyEventKind};
use matchtui::event::settle_time;
use matchtui::{Engine, Event, Outcome, Phase, Pos, RejectReason, Step, SwapOutcome};
use ratatui::DefaultTerminal;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Render at roughly 60 FPS.
const FRAME: Duration = Duration::from_millis(16);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    LevelSelect,
    Playing,
    Won,
    Lost,
    QuitMenu,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuitOption {
    Resume,
    Levels,
    Exit,
}

fn direction(action: Action) -> Option<(isize, isize)> {
    match action {
        Action::Up => Some((-1, 0)),
        Action::Down => Some((1, 0)),
        Action::Left => Some((0, -1)),
        Action::Right => Some((0, 1)),
        _ => None,
    }
}

pub struct App {
    engine: Engine,
    config: GameConfig,
    theme: Theme,
    progress: Progress,
    screen: Screen,
    cursor: Pos,
    selected: Option<Pos>,
    level_cursor: usize,
    quit_selected: QuitOption,
    /// Earliest time the next cascade step may run, so each step can be seen.
    next_step_at: Option<Instant>,
    pop: PopFx,
    /// One-line message under the board.
    notice: Option<String>,
    outcome: Option<Outcome>,
}

impl App {
    pub fn new(engine: Engine, config: GameConfig, theme: Theme) -> Result<Self> {
        let progress = config
            .progress_path
            .as_deref()
            .map(Progress::load)
            .unwrap_or_default();
        let last_level = engine.levels().len().saturating_sub(1);
        let mut app = Self {
            level_cursor: progress.unlocked.saturating_sub(1).min(last_level),
            engine,
            config,
            theme,
            progress,
            screen: Screen::LevelSelect,
            cursor: Pos::new(0, 0),
            selected: None,
            quit_selected: QuitOption::Resume,
            next_step_at: None,
            pop: PopFx::default(),
            notice: None,
            outcome: None,
        };
        app.engine.set_best_score(app.progress.best_score);

        if let Some(level) = app.config.start_level {
            app.engine.load_level(level, None)?;
            app.enter_play();
        } else if !app.config.fresh {
            if let Some(saved) = app.progress.saved.take() {
                let level = saved.state.index;
                match app.engine.load_level(level, Some(saved)) {
                    Ok(()) => app.enter_play(),
                    Err(e) => warn!(level, error = %e, "discarding saved level"),
                }
            }
        }
        // events of the initial board nobody is playing yet
        if app.screen == Screen::LevelSelect {
            app.engine.drain_events().for_each(drop);
        }
        Ok(app)
    }

    /// Show the engine's current level; resumed levels may already be over.
    fn enter_play(&mut self) {
        let size = self.engine.board().size();
        self.cursor = Pos::new(size / 2, size / 2);
        self.selected = None;
        self.notice = None;
        self.outcome = None;
        self.next_step_at = None;
        self.screen = Screen::Playing;
        self.level_cursor = self.engine.state().index;
        self.absorb_events();
    }

    /// React to engine events; returns how long they take to play out.
    fn absorb_events(&mut self) -> Duration {
        let events: Vec<Event> = self.engine.drain_events().collect();
        for event in &events {
            match event {
                Event::BoardReset { .. } => {
                    self.pop.clear();
                    self.next_step_at = None;
                }
                Event::SwapRejected {
                    reason: RejectReason::NoMatch,
                    ..
                } => self.notice = Some("No match".to_string()),
                Event::CellsCleared(cells) if !self.config.no_animation => {
                    self.pop.start(cells.iter().map(|c| c.pos).collect());
                }
                Event::Finished(outcome) => self.finish(*outcome),
                _ => {}
            }
        }
        settle_time(&events)
    }

    fn finish(&mut self, outcome: Outcome) {
        let (level, score) = (self.engine.state().index, self.engine.state().score);
        self.progress.record_score(score);
        self.progress.saved = None;
        match outcome {
            Outcome::Won { stars } => {
                self.progress
                    .record_win(level, stars, self.engine.levels().len());
                self.screen = Screen::Won;
            }
            Outcome::Lost => self.screen = Screen::Lost,
        }
        self.selected = None;
        self.outcome = Some(outcome);
        self.save_progress();
    }

    /// Remember the level in play so it can be resumed.
    fn checkpoint(&mut self) {
        if self.engine.phase() == Phase::Idle {
            self.progress.saved = Some(self.engine.saved());
            self.progress.record_score(self.engine.state().score);
            self.save_progress();
        }
    }

    fn save_progress(&self) {
        let Some(path) = &self.config.progress_path else {
            return;
        };
        if let Err(e) = self.progress.save(path) {
            warn!(path = %path.display(), error = %e, "could not save progress");
        }
    }

    /// Run due cascade steps. With animation off the whole move resolves at once.
    fn advance(&mut self, now: Instant) {
        while self.engine.phase() == Phase::Busy {
            if self.next_step_at.is_some_and(|t| now < t) {
                return;
            }
            let Some(step) = self.engine.step() else {
                return;
            };
            let wait = self.absorb_events();
            if let Step::Settled(phase) = step {
                self.next_step_at = None;
                if phase == Phase::Idle {
                    self.checkpoint();
                }
                return;
            }
            if !self.config.no_animation {
                self.next_step_at = Some(now + wait);
                return;
            }
        }
    }

    fn try_swap(&mut self, a: Pos, b: Pos, now: Instant) {
        self.notice = None;
        let outcome = self.engine.request_swap(a, b);
        let wait = self.absorb_events();
        match outcome {
            SwapOutcome::Accepted if !self.config.no_animation => {
                self.next_step_at = Some(now + wait);
            }
            SwapOutcome::Accepted | SwapOutcome::Reverted => {}
            SwapOutcome::Rejected(reason) => debug!(?reason, "swap ignored"),
        }
    }

    fn start_level(&mut self, level: usize) {
        let saved = self
            .progress
            .saved
            .take()
            .filter(|s| s.state.index == level);
        let loaded = match self.engine.load_level(level, saved) {
            Err(e) => {
                warn!(level, error = %e, "saved level rejected, starting fresh");
                self.engine.load_level(level, None)
            }
            ok => ok,
        };
        match loaded {
            Ok(()) => self.enter_play(),
            Err(e) => warn!(level, error = %e, "could not start level"),
        }
    }

    fn restart(&mut self) {
        match self.engine.restart_level() {
            Ok(()) => self.enter_play(),
            Err(e) => warn!(error = %e, "could not restart level"),
        }
    }

    fn open_levels(&mut self) {
        self.checkpoint();
        self.level_cursor = self.engine.state().index;
        self.screen = Screen::LevelSelect;
    }

    /// Leave the game, finishing any move in flight so progress is consistent.
    fn exit(&mut self) {
        if self.engine.phase() == Phase::Busy {
            self.engine.resolve();
            self.absorb_events();
        }
        if matches!(self.screen, Screen::Playing | Screen::QuitMenu) {
            self.checkpoint();
        }
        self.save_progress();
    }

    fn on_playing(&mut self, action: Action, now: Instant) {
        let size = self.engine.board().size();
        match action {
            Action::Quit => {
                self.screen = Screen::QuitMenu;
                self.quit_selected = QuitOption::Resume;
            }
            Action::Restart => self.restart(),
            Action::Levels => self.open_levels(),
            Action::Select => match self.selected {
                Some(s) if s == self.cursor => self.selected = None,
                Some(s) if s.is_adjacent(self.cursor) => {
                    self.selected = None;
                    self.try_swap(s, self.cursor, now);
                }
                _ => self.selected = Some(self.cursor),
            },
            _ => {
                let Some((dr, dc)) = direction(action) else {
                    return;
                };
                match self.selected.take() {
                    Some(from) => {
                        if let Some(to) = from.offset(dr, dc, size) {
                            self.cursor = to;
                            self.try_swap(from, to, now);
                        }
                    }
                    None => {
                        if let Some(to) = self.cursor.offset(dr, dc, size) {
                            self.cursor = to;
                        }
                    }
                }
            }
        }
    }

    fn on_level_select(&mut self, action: Action) -> bool {
        let last = self
            .progress
            .unlocked
            .min(self.engine.levels().len())
            .saturating_sub(1);
        match action {
            Action::Quit => return false,
            Action::Up | Action::Left => self.level_cursor = self.level_cursor.saturating_sub(1),
            Action::Down | Action::Right => self.level_cursor = (self.level_cursor + 1).min(last),
            Action::Select => self.start_level(self.level_cursor.min(last)),
            _ => {}
        }
        true
    }

    fn on_result(&mut self, action: Action) -> bool {
        match action {
            Action::Quit => return false,
            Action::Restart => self.restart(),
            Action::Levels => self.open_levels(),
            Action::Next | Action::Select
                if self.screen == Screen::Won && self.engine.has_next_level() =>
            {
                match self.engine.next_level() {
                    Ok(()) => self.enter_play(),
                    Err(e) => warn!(error = %e, "could not start next level"),
                }
            }
            _ => {}
        }
        true
    }

    fn on_quit_menu(&mut self, action: Action) -> bool {
        match action {
            Action::Down | Action::Right => {
                self.quit_selected = match self.quit_selected {
                    QuitOption::Resume => QuitOption::Levels,
                    QuitOption::Levels => QuitOption::Exit,
                    QuitOption::Exit => QuitOption::Resume,
                };
            }
            Action::Up | Action::Left => {
                self.quit_selected = match self.quit_selected {
                    QuitOption::Resume => QuitOption::Exit,
                    QuitOption::Levels => QuitOption::Resume,
                    QuitOption::Exit => QuitOption::Levels,
                };
            }
            Action::Select => match self.quit_selected {
                QuitOption::Resume => self.screen = Screen::Playing,
                QuitOption::Levels => self.open_levels(),
                QuitOption::Exit => return false,
            },
            Action::Quit => self.screen = Screen::Playing,
            _ => {}
        }
        true
    }

    /// Returns `false` when the app should exit.
    fn on_action(&mut self, action: Action, now: Instant) -> bool {
        match self.screen {
            Screen::LevelSelect => self.on_level_select(action),
            Screen::Playing => {
                self.on_playing(action, now);
                true
            }
            Screen::Won | Screen::Lost => self.on_result(action),
            Screen::QuitMenu => self.on_quit_menu(action),
        }
    }

    pub fn run(&mut self) -> Result<()> {
        use crossterm::{
            execute,
            terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
        };

        enable_raw_mode()?;
        let mut stdout = std::io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let mut terminal = DefaultTerminal::new(ratatui::backend::CrosstermBackend::new(stdout))?;

        let result = self.run_loop(&mut terminal);
        self.exit();

        execute!(std::io::stdout(), LeaveAlternateScreen)?;
        disable_raw_mode()?;
        result
    }

    fn run_loop(&mut self, terminal: &mut DefaultTerminal) -> Result<()> {
        loop {
            let now = Instant::now();
            self.advance(now);

            let view = View {
                screen: self.screen,
                engine: &self.engine,
                theme: &self.theme,
                progress: &self.progress,
                cursor: self.cursor,
                selected: self.selected,
                level_cursor: self.level_cursor,
                quit_selected: self.quit_selected,
                notice: self.notice.as_deref(),
                outcome: self.outcome,
            };
            let pop = &mut self.pop;
            terminal.draw(|f| ui::draw(f, &view, pop, now))?;

            let timeout = FRAME.saturating_sub(now.elapsed());
            if event::poll(timeout)? {
                while event::poll(Duration::ZERO)? {
                    if let TermEvent::Key(key) = event::read()? {
                        if key.kind != KeyEventKind::Press {
                            continue;
                        }
                        if !self.on_action(key_to_action(key), Instant::now()) {
                            return Ok(());
                        }
                    }
                }
            }
        }
    }
}
