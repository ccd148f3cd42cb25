//! Layout and drawing: level list, board, sidebar, result and quit overlays, pop effect.

use crate::app::{QuitOption, Screen};
use crate::progress::Progress;
use crate::theme::Theme;
use matchtui::event::{FALL_MS, POP_MS};
use matchtui::{Engine, Outcome, Pos, Shortfall, Special};
use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Position, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, Borders, Gauge, Paragraph, Widget};
use std::collections::HashSet;
use std::time::Instant;
use tachyonfx::{
    CellFilter, Duration as TfxDuration, Effect, EffectRenderer, Interpolation, fx, ref_count,
};

/// Terminal columns and rows per board cell.
const CELL_W: u16 = 4;
const CELL_H: u16 = 2;
const SIDEBAR_WIDTH: u16 = 26;
const POP_FADE_MS: u32 = (POP_MS + FALL_MS) as u32;

/// Everything a frame needs, borrowed from the app.
pub struct View<'a> {
    pub screen: Screen,
    pub engine: &'a Engine,
    pub theme: &'a Theme,
    pub progress: &'a Progress,
    pub cursor: Pos,
    pub selected: Option<Pos>,
    pub level_cursor: usize,
    pub quit_selected: QuitOption,
    pub notice: Option<&'a str>,
    pub outcome: Option<Outcome>,
}

/// Fade-in for cells refilled after a clear.
#[derive(Default)]
pub struct PopFx {
    cells: Vec<Pos>,
    effect: Option<Effect>,
    last: Option<Instant>,
}

impl PopFx {
    /// Restart the effect on a new set of cells.
    pub fn start(&mut self, cells: Vec<Pos>) {
        *self = Self {
            cells,
            effect: None,
            last: None,
        };
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

fn board_pixel_size(size: usize) -> (u16, u16) {
    let n = size as u16;
    (n * CELL_W + 2, n * CELL_H + 2)
}

fn stars_label(stars: u8) -> String {
    let stars = usize::from(stars.min(3));
    format!("{}{}", "★".repeat(stars), "☆".repeat(3 - stars))
}

/// Draw the current screen. Board screens also run the pop effect unless disabled.
pub fn draw(frame: &mut Frame, view: &View<'_>, pop: &mut PopFx, now: Instant) {
    let area = frame.area();
    match view.screen {
        Screen::LevelSelect => draw_level_select(frame, view, area),
        Screen::Playing | Screen::Won | Screen::Lost | Screen::QuitMenu => {
            let board_rect = draw_game(frame, view, area);
            if !pop.cells.is_empty() {
                apply_pop_effect(frame, view.theme, board_rect, pop, now);
            }
            match view.screen {
                Screen::Won | Screen::Lost => draw_result(frame, view, area),
                Screen::QuitMenu => draw_quit_menu(frame, view.theme, view.quit_selected),
                _ => {}
            }
        }
    }
}

/// Buffer positions covered by the given board cells.
fn cell_buffer_positions(board_rect: Rect, cells: &[Pos]) -> HashSet<(u16, u16)> {
    cells
        .iter()
        .flat_map(|p| {
            let x0 = board_rect.x + p.col as u16 * CELL_W;
            let y0 = board_rect.y + p.row as u16 * CELL_H;
            (0..CELL_H).flat_map(move |dy| (0..CELL_W).map(move |dx| (x0 + dx, y0 + dy)))
        })
        .collect()
}

fn apply_pop_effect(frame: &mut Frame, theme: &Theme, board_rect: Rect, pop: &mut PopFx, now: Instant) {
    let delta = pop
        .last
        .map(|t| now.saturating_duration_since(t))
        .unwrap_or(std::time::Duration::ZERO);
    let tfx_delta = TfxDuration::from_millis(delta.as_millis().min(u128::from(u32::MAX)) as u32);
    pop.last = Some(now);

    if pop.effect.is_none() {
        let cells = cell_buffer_positions(board_rect, &pop.cells);
        let filter = CellFilter::PositionFn(ref_count(move |pos: Position| {
            cells.contains(&(pos.x, pos.y))
        }));
        let effect = fx::fade_from(theme.bg, theme.bg, (POP_FADE_MS, Interpolation::QuadOut))
            .with_filter(filter)
            .with_area(board_rect);
        pop.effect = Some(effect);
    }

    if let Some(effect) = &mut pop.effect {
        frame.render_effect(effect, board_rect, tfx_delta);
        if effect.done() {
            pop.clear();
        }
    }
}

/// Board on the left, sidebar on the right, centred. Returns the board's cell area.
fn draw_game(frame: &mut Frame, view: &View<'_>, area: Rect) -> Rect {
    let (pw, ph) = board_pixel_size(view.engine.board().size());
    let horiz = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Fill(1),
            Constraint::Length(pw + SIDEBAR_WIDTH),
            Constraint::Fill(1),
        ])
        .split(area);
    let vert = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Fill(1), Constraint::Length(ph), Constraint::Fill(1)])
        .split(horiz[1]);
    let inner = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(pw), Constraint::Length(SIDEBAR_WIDTH)])
        .split(vert[1]);

    let board_rect = draw_board(frame, view, inner[0]);
    draw_sidebar(frame, view, inner[1]);
    board_rect
}

fn special_symbol(special: Special) -> &'static str {
    match special {
        Special::RowClear => "━",
        Special::ColumnClear => "┃",
        Special::AreaBomb => "✚",
        Special::ColorBomb => "◆",
    }
}

fn draw_board(frame: &mut Frame, view: &View<'_>, area: Rect) -> Rect {
    let theme = view.theme;
    let state = view.engine.state();
    let mut block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.div_line).bg(theme.bg))
        .title(Span::styled(
            format!(" Matchtui  Level {} ", state.index + 1),
            theme.title,
        ));
    if let Some(notice) = view.notice {
        block = block.title_bottom(Span::styled(format!(" {notice} "), theme.main_fg));
    }
    let inner = block.inner(area);
    block.render(area, frame.buffer_mut());

    let board = view.engine.board();
    let board_rect = Rect {
        x: inner.x,
        y: inner.y,
        width: (board.size() as u16 * CELL_W).min(inner.width),
        height: (board.size() as u16 * CELL_H).min(inner.height),
    };
    let buf = frame.buffer_mut();
    let fits = |x: u16, y: u16| x < board_rect.right() && y < board_rect.bottom();

    for pos in board.positions() {
        let x0 = board_rect.x + pos.col as u16 * CELL_W;
        let y0 = board_rect.y + pos.row as u16 * CELL_H;
        let ice = board.ice(pos);
        let cell_bg = if ice > 0 { theme.ice } else { theme.bg };
        let tile = board.tile(pos);

        for dy in 0..CELL_H {
            for dx in 0..CELL_W {
                let (x, y) = (x0 + dx, y0 + dy);
                if !fits(x, y) {
                    continue;
                }
                let body = dx == 1 || dx == 2;
                let (symbol, style) = match tile {
                    Some(t) if body => {
                        let color = theme.tile_color(t.kind);
                        match t.special {
                            Some(s) => (
                                special_symbol(s),
                                Style::default()
                                    .fg(if s == Special::ColorBomb { Color::White } else { theme.bg })
                                    .bg(color)
                                    .add_modifier(Modifier::BOLD),
                            ),
                            None => ("█", Style::default().fg(color).bg(cell_bg)),
                        }
                    }
                    _ => (" ", Style::default().bg(cell_bg)),
                };
                buf[(x, y)].set_symbol(symbol).set_style(style);
            }
        }

        // remaining ice layers in the top-left corner
        if ice > 0 && fits(x0, y0) {
            let layers = if ice > 9 { "+".to_string() } else { ice.to_string() };
            buf[(x0, y0)]
                .set_symbol(&layers)
                .set_style(Style::default().fg(theme.main_fg).bg(cell_bg));
        }

        let outline = if view.selected == Some(pos) {
            Some(theme.selected)
        } else if view.cursor == pos && view.screen == Screen::Playing {
            Some(theme.cursor)
        } else {
            None
        };
        if let Some(color) = outline {
            let style = Style::default().fg(color).bg(cell_bg).add_modifier(Modifier::BOLD);
            for dy in 0..CELL_H {
                let (left, right) = if dy == 0 { ("▛", "▜") } else { ("▙", "▟") };
                if fits(x0 + CELL_W - 1, y0 + dy) {
                    buf[(x0, y0 + dy)].set_symbol(left).set_style(style);
                    buf[(x0 + CELL_W - 1, y0 + dy)].set_symbol(right).set_style(style);
                }
            }
        }
    }
    board_rect
}

fn draw_sidebar(frame: &mut Frame, view: &View<'_>, area: Rect) {
    let theme = view.theme;
    let state = view.engine.state();
    let title_style = Style::default().fg(theme.title);
    let fg_style = Style::default().fg(theme.main_fg);
    let border_style = Style::default().fg(theme.div_line).bg(theme.bg);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(7), // Stats (border + score, target, best, moves)
            Constraint::Length(1), // gap
            Constraint::Length(3), // Moves gauge
            Constraint::Length(1), // gap
            Constraint::Min(4),    // Objectives
        ])
        .split(area);

    let stats_block = Block::default().borders(Borders::ALL).border_style(border_style);
    let stats_inner = stats_block.inner(chunks[0]);
    stats_block.render(chunks[0], frame.buffer_mut());
    let row = |label: &'static str, value: String| {
        Line::from(vec![Span::styled(label, title_style), Span::styled(value, fg_style)])
    };
    let stats = vec![
        row("Level: ", format!("{} / {}", state.index + 1, view.engine.levels().len())),
        row("Score: ", state.score.to_string()),
        row("Target: ", state.target_score.to_string()),
        row("Best: ", view.engine.best_score().max(view.progress.best_score).to_string()),
        row("Moves: ", format!("{} / {}", state.moves_left, state.move_budget)),
    ];
    Paragraph::new(Text::from(stats)).render(stats_inner, frame.buffer_mut());

    let moves_block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style)
        .title(Span::styled("Moves", title_style));
    let moves_inner = moves_block.inner(chunks[2]);
    moves_block.render(chunks[2], frame.buffer_mut());
    let ratio = if state.move_budget > 0 {
        (f64::from(state.moves_left) / f64::from(state.move_budget)).min(1.0)
    } else {
        0.0
    };
    let bar_color = if ratio > 0.4 {
        Color::Green
    } else if ratio > 0.2 {
        Color::Yellow
    } else {
        Color::Red
    };
    Gauge::default()
        .ratio(ratio)
        .label(stars_label(matchtui::level::star_rating(state.moves_left, state.move_budget)))
        .gauge_style(Style::default().fg(bar_color))
        .render(moves_inner, frame.buffer_mut());

    let goals_block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style)
        .title(Span::styled("Objectives", title_style));
    let goals_inner = goals_block.inner(chunks[4]);
    goals_block.render(chunks[4], frame.buffer_mut());
    let done = |finished: bool| if finished { " ✓" } else { "" };
    let mut goals: Vec<Line> = vec![Line::from(vec![
        Span::styled("Score ", title_style),
        Span::styled(
            format!("{}{}", state.target_score, done(state.score >= state.target_score)),
            fg_style,
        ),
    ])];
    goals.extend(state.collect.iter().map(|(&kind, &left)| {
        Line::from(vec![
            Span::styled("██", Style::default().fg(theme.tile_color(kind))),
            Span::styled(format!(" x {left}{}", done(left == 0)), fg_style),
        ])
    }));
    if view.engine.levels().get(state.index).is_ok_and(|d| d.ice_cell_count > 0) {
        goals.push(Line::from(vec![
            Span::styled("  ", Style::default().bg(theme.ice)),
            Span::styled(format!(" ice {}{}", state.ice_left, done(state.ice_left == 0)), fg_style),
        ]));
    }
    Paragraph::new(Text::from(goals)).render(goals_inner, frame.buffer_mut());
}

fn popup_rect(area: Rect, width: u16, height: u16) -> Rect {
    Rect {
        x: area.x + area.width.saturating_sub(width) / 2,
        y: area.y + area.height.saturating_sub(height) / 2,
        width: width.min(area.width),
        height: height.min(area.height),
    }
}

fn fill_background(frame: &mut Frame, rect: Rect, bg: Color) {
    for y in rect.top()..rect.bottom() {
        for x in rect.left()..rect.right() {
            frame.buffer_mut()[(x, y)].set_symbol(" ").set_style(Style::default().bg(bg));
        }
    }
}

fn draw_level_select(frame: &mut Frame, view: &View<'_>, area: Rect) {
    let theme = view.theme;
    let levels = view.engine.levels();
    let height = (levels.len() as u16 + 7).min(area.height);
    let rect = popup_rect(area, 44, height);
    fill_background(frame, rect, theme.bg);

    let mut lines = vec![Line::from("")];
    for i in 0..levels.len() {
        let Ok(level) = levels.get(i) else { continue };
        let unlocked = view.progress.is_unlocked(i);
        let label = if unlocked {
            format!(
                " Level {:<2} {}  {:>2} moves  {:>5} pts ",
                i + 1,
                stars_label(view.progress.stars_for(i)),
                level.move_budget,
                level.target_score
            )
        } else {
            format!(" Level {:<2} locked ", i + 1)
        };
        let style = if i == view.level_cursor {
            Style::default().fg(theme.bg).bg(theme.title).add_modifier(Modifier::BOLD)
        } else if unlocked {
            Style::default().fg(theme.main_fg)
        } else {
            Style::default().fg(theme.inactive_fg)
        };
        lines.push(Line::from(Span::styled(label, style)));
    }
    lines.push(Line::from(""));
    if let Some(saved) = &view.progress.saved {
        lines.push(Line::from(Span::styled(
            format!(" Level {} in progress ", saved.state.index + 1),
            Style::default().fg(theme.inactive_fg),
        )));
    }
    lines.push(Line::from(Span::styled(
        " Enter  Play    Q  Quit ",
        Style::default().fg(theme.main_fg),
    )));
    Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme.div_line).bg(theme.bg))
                .title(Span::styled(" Matchtui ", theme.title)),
        )
        .render(rect, frame.buffer_mut());
}

fn draw_result(frame: &mut Frame, view: &View<'_>, area: Rect) {
    let theme = view.theme;
    let state = view.engine.state();
    let rect = popup_rect(area, 30, 11 + state.shortfalls().len() as u16);
    fill_background(frame, rect, theme.bg);

    let (title, banner) = match view.outcome {
        Some(Outcome::Won { stars }) => (
            format!(" Level {} clear! ", state.index + 1),
            Span::styled(
                format!(" {} ", stars_label(stars)),
                Style::default().fg(theme.title).add_modifier(Modifier::BOLD),
            ),
        ),
        _ => (
            " Out of moves ".to_string(),
            Span::styled(" Level failed ", Style::default().fg(Color::White).bg(Color::Red)),
        ),
    };
    let fg = Style::default().fg(theme.main_fg);
    let mut lines = vec![
        Line::from(""),
        Line::from(banner),
        Line::from(""),
        Line::from(Span::styled(format!(" Score: {} ", state.score), fg)),
        Line::from(Span::styled(
            format!(" Best: {} ", view.engine.best_score().max(view.progress.best_score)),
            fg,
        )),
    ];
    let won = matches!(view.outcome, Some(Outcome::Won { .. }));
    if !won {
        lines.extend(state.shortfalls().into_iter().map(|s| match s {
            Shortfall::Score { missing } => {
                Line::from(Span::styled(format!(" {missing} points short "), fg))
            }
            Shortfall::Collect { kind, remaining } => Line::from(vec![
                Span::styled("██", Style::default().fg(theme.tile_color(kind))),
                Span::styled(format!(" {remaining} left "), fg),
            ]),
            Shortfall::Ice { remaining } => Line::from(vec![
                Span::styled("  ", Style::default().bg(theme.ice)),
                Span::styled(format!(" {remaining} ice left "), fg),
            ]),
        }));
    }
    lines.push(Line::from(""));
    if won && view.engine.has_next_level() {
        lines.push(Line::from(Span::styled(" N  Next level ", fg)));
    }
    lines.push(Line::from(Span::styled(" R  Retry    M  Levels ", fg)));
    lines.push(Line::from(Span::styled(" Q  Quit ", fg)));
    Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme.div_line).bg(theme.bg))
                .title(Span::styled(title, theme.title)),
        )
        .render(rect, frame.buffer_mut());
}

pub fn draw_quit_menu(frame: &mut Frame, theme: &Theme, selected: QuitOption) {
    let quit_rect = popup_rect(frame.area(), 24, 8);
    fill_background(frame, quit_rect, theme.bg);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.title))
        .title(" Quit? ");
    let inner = block.inner(quit_rect);
    block.render(quit_rect, frame.buffer_mut());

    let options = [
        (QuitOption::Resume, " Resume "),
        (QuitOption::Levels, " Levels "),
        (QuitOption::Exit, " Exit "),
    ];
    for (i, (opt, label)) in options.iter().enumerate() {
        let style = if *opt == selected {
            Style::default().fg(theme.bg).bg(theme.title).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(theme.title)
        };
        let rx = inner.x + inner.width.saturating_sub(label.len() as u16) / 2;
        let ry = inner.y + 1 + i as u16 * 2;
        if ry < inner.bottom() {
            frame.buffer_mut().set_string(rx, ry, label, style);
        }
    }
}
