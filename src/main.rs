//! Matchtui — match-3 puzzle game in the terminal.

mod app;
mod input;
mod progress;
mod theme;
mod ui;

use anyhow::{Context, Result};
use app::App;
use clap::{Parser, ValueEnum};
use matchtui::{Engine, LevelPack};
use std::fs::File;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

/// Options derived from CLI that affect how the game plays out on screen.
#[derive(Debug, Clone)]
pub struct GameConfig {
    /// Zero-based level to start on, skipping the level list.
    pub start_level: Option<usize>,
    /// Apply cascade steps immediately instead of pacing them for animation.
    pub no_animation: bool,
    /// Ignore the saved level in play.
    pub fresh: bool,
    /// Where progress lives; `None` keeps it in memory only.
    pub progress_path: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();
    if let Some(path) = &args.log_file {
        init_logging(path)?;
    }
    let theme = theme::Theme::load(args.theme.as_deref(), args.palette).unwrap_or_default();
    let levels = match &args.levels {
        Some(path) => LevelPack::load(path)
            .with_context(|| format!("loading level pack {}", path.display()))?,
        None => LevelPack::builtin(),
    };
    let engine = Engine::new(levels, args.seed).context("invalid level pack")?;
    let config = GameConfig {
        start_level: args.level.map(|n| n.saturating_sub(1) as usize),
        no_animation: args.no_animation,
        fresh: args.fresh,
        progress_path: (!args.no_save).then(progress::config_path),
    };
    let mut app = App::new(engine, config, theme)?;
    app.run()?;
    Ok(())
}

/// Logs go to a file: the terminal belongs to the game. Verbosity follows `RUST_LOG`,
/// defaulting to `info`.
fn init_logging(path: &std::path::Path) -> Result<()> {
    let file = File::create(path).with_context(|| format!("creating log file {}", path.display()))?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

/// Match-3 puzzle game in the terminal.
#[derive(Debug, Parser)]
#[command(
    name = "matchtui",
    version,
    about = "Match-3 puzzle in the terminal. Swap neighbouring tiles to line up three or more; longer lines and corners leave special tiles behind.",
    long_about = "Matchtui is a terminal match-3 puzzle game.\n\n\
        Swap two neighbouring tiles to line up three or more of the same colour. Four in a \
        line leaves a row or column clear, five a colour bomb, an L or T an area bomb. \
        Cleared tiles fall and refill from the top, and new lines clear in a cascade.\n\n\
        Each level has a move budget, a target score, tiles to collect and ice to break.\n\n\
        CONTROLS:\n  Arrows / hjkl  Move cursor    Enter / Space  Select or drop tile\n  \
        Arrow with a tile selected  Swap in that direction\n  R  Restart    M / Tab  Levels    \
        N  Next level    Q / Esc  Quit\n\n\
        Use --theme to load a btop-style theme (e.g. onedark.theme)."
)]
pub struct Args {
    /// Start on this level (1-based) instead of the level list.
    #[arg(short, long, value_name = "N", value_parser = clap::value_parser!(u32).range(1..))]
    pub level: Option<u32>,

    /// JSON level pack: an array of {moveBudget, targetScore, collectibles, iceCellCount, iceStrength}.
    #[arg(long, value_name = "FILE")]
    pub levels: Option<PathBuf>,

    /// Seed for boards and refills; the same seed and moves replay the same game.
    #[arg(long, value_name = "SEED")]
    pub seed: Option<u64>,

    /// Disable clear animation (cascade steps resolve instantly).
    #[arg(long)]
    pub no_animation: bool,

    /// Path to theme file (btop-style theme[key]=\"value\"). Uses One Dark if not set.
    #[arg(short, long, value_name = "FILE")]
    pub theme: Option<PathBuf>,

    /// Colour palette: normal (theme), high-contrast, or colorblind.
    #[arg(long, default_value = "normal")]
    pub palette: Palette,

    /// Start fresh instead of resuming the saved level.
    #[arg(long)]
    pub fresh: bool,

    /// Do not read or write progress.
    #[arg(long)]
    pub no_save: bool,

    /// Write tracing output to this file (filter with RUST_LOG).
    #[arg(long, value_name = "FILE")]
    pub log_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Palette {
    #[default]
    Normal,

    #[value(alias = "highcontrast", alias = "contrast")]
    HighContrast,

    #[value(alias = "colourblind")]
    Colorblind,
}
