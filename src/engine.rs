//! Resolution loop: owns the board and level state, validates swaps and resolves the
//! resulting cascade one step at a time so a presenter can animate between steps.

use crate::board::{Board, BoardSnapshot, GRID_SIZE, Pos, Special, TILE_KINDS};
use crate::bonus::{self, Bonus};
use crate::error::{ConfigError, LoadError, SnapshotError};
use crate::event::{ClearCause, ClearedCell, Event, MatchedGroup, Outcome, RejectReason};
use crate::level::{LevelDescriptor, LevelPack, LevelState, step_score};
use crate::matcher::{self, Group};
use crate::special;
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::collections::vec_deque::Drain;
use tracing::{debug, info, instrument, trace};

/// Engine state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    /// Waiting for a swap.
    Idle,
    /// A swap was accepted and its cascade is resolving; call [`Engine::step`].
    Busy,
    Won,
    Lost,
}

impl Phase {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Won | Self::Lost)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwapOutcome {
    /// A move was spent; resolve it with [`Engine::step`].
    Accepted,
    /// The swap formed nothing and was undone.
    Reverted,
    Rejected(RejectReason),
}

/// Everything needed to resume a level exactly where it was left.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedLevel {
    pub state: LevelState,
    pub board: BoardSnapshot,
}

/// What one cascade step will do, computed from a board snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StepPlan {
    pub bonuses: Vec<Bonus>,
    pub clear: BTreeMap<Pos, ClearCause>,
    pub activated: Vec<(Pos, Special)>,
    pub score: u32,
}

/// Plan a cascade step: pick bonus survivors, collect the clear-set from every group
/// plus any `seeds` (swapped color bombs), chain specials, then score the result.
#[instrument(level = "trace", skip_all, fields(groups = groups.len(), seeds = seeds.len()))]
pub fn plan_step(
    board: &Board,
    groups: &[Group],
    swap: Option<(Pos, Pos)>,
    seeds: &[Pos],
) -> StepPlan {
    let seeded: BTreeSet<Pos> = seeds.iter().copied().collect();
    let bonuses: Vec<Bonus> = groups
        .iter()
        .filter_map(|g| bonus::generate(g, swap, &seeded))
        .collect();
    let keep: BTreeSet<Pos> = bonuses.iter().map(|b| b.pos).collect();

    let mut clear = BTreeMap::new();
    for &cell in groups.iter().flat_map(|g| &g.cells) {
        if !keep.contains(&cell) {
            clear.insert(cell, ClearCause::Match);
        }
    }
    for &cell in seeds {
        if !keep.contains(&cell) {
            clear.entry(cell).or_insert(ClearCause::Chain);
        }
    }

    let expansion = special::expand(board, clear, &keep, swap);
    let score = step_score(expansion.clear.len(), groups.len());
    StepPlan {
        bonuses,
        clear: expansion.clear,
        activated: expansion.activated,
        score,
    }
}

/// Outcome of one applied cascade step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CascadeReport {
    /// 1 for the step triggered by the swap itself, 2 for the first cascade, ...
    pub chain: u32,
    pub groups: Vec<MatchedGroup>,
    pub bonuses: Vec<Bonus>,
    pub activated: Vec<(Pos, Special)>,
    pub cleared: Vec<ClearedCell>,
    pub score: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    Cascade(CascadeReport),
    /// No matches remain; the move is over and the engine is in this phase.
    Settled(Phase),
}

#[derive(Debug, Clone, Default)]
struct PendingMove {
    swap: Option<(Pos, Pos)>,
    /// Swapped color bombs that fire in the first step even without a match.
    seeds: Vec<Pos>,
    chain: u32,
}

/// A match-3 session: one level pack, one board, one level in play.
#[derive(Debug, Clone)]
pub struct Engine {
    levels: LevelPack,
    board: Board,
    state: LevelState,
    phase: Phase,
    best_score: u32,
    rng: StdRng,
    pending: Option<PendingMove>,
    events: VecDeque<Event>,
}

/// Clear every match without scoring and refill until the board is quiet. Returns the
/// number of passes needed.
fn settle_quietly(board: &mut Board, rng: &mut StdRng) -> usize {
    let mut passes = 0;
    loop {
        let groups = matcher::find_groups(board);
        if groups.is_empty() {
            return passes;
        }
        for &cell in groups.iter().flat_map(|g| &g.cells) {
            board.clear(cell);
        }
        board.collapse_and_refill(rng);
        passes += 1;
    }
}

fn build_board(descriptor: &LevelDescriptor, rng: &mut StdRng) -> Board {
    let mut board = Board::generate(GRID_SIZE, TILE_KINDS, rng);
    let passes = settle_quietly(&mut board, rng);
    if passes > 0 {
        debug!(passes, "removed latent matches from a fresh board");
    }
    board.place_ice(
        descriptor.ice_cell_count as usize,
        descriptor.ice_strength,
        rng,
    );
    board
}

impl Engine {
    /// Validate `levels` and start its first level. `seed` makes every board and refill
    /// reproducible; `None` seeds from the OS.
    pub fn new(levels: LevelPack, seed: Option<u64>) -> Result<Self, ConfigError> {
        levels.validate(TILE_KINDS, GRID_SIZE * GRID_SIZE)?;
        let mut rng = seed.map_or_else(StdRng::from_os_rng, StdRng::seed_from_u64);
        let descriptor = levels.get(0)?;
        let state = LevelState::new(0, descriptor);
        let board = build_board(descriptor, &mut rng);
        let mut engine = Self {
            levels,
            board,
            state,
            phase: Phase::Idle,
            best_score: 0,
            rng,
            pending: None,
            events: VecDeque::new(),
        };
        engine.announce_level();
        Ok(engine)
    }

    /// Start level `index`, either fresh or from a saved board and level state.
    ///
    /// A resumed board is settled before play; a resumed level that already meets its
    /// objectives is won, one without moves is lost.
    #[instrument(level = "debug", skip(self, saved), fields(resume = saved.is_some()))]
    pub fn load_level(&mut self, index: usize, saved: Option<SavedLevel>) -> Result<(), LoadError> {
        let descriptor = self.levels.get(index)?;
        match saved {
            None => {
                self.board = build_board(descriptor, &mut self.rng);
                self.state = LevelState::new(index, descriptor);
            }
            Some(saved) => {
                if saved.state.index != index {
                    return Err(SnapshotError::LevelMismatch {
                        saved: saved.state.index,
                        requested: index,
                    }
                    .into());
                }
                let mut board = Board::from_snapshot(&saved.board, GRID_SIZE, TILE_KINDS)?;
                settle_quietly(&mut board, &mut self.rng);
                self.board = board;
                self.state = saved.state;
            }
        }
        self.pending = None;
        self.best_score = self.best_score.max(self.state.score);
        self.phase = self.evaluate();
        debug!(level = index, phase = ?self.phase, "level loaded");
        self.announce_level();
        Ok(())
    }

    /// Rebuild the current level with a fresh board and score.
    pub fn restart_level(&mut self) -> Result<(), LoadError> {
        self.load_level(self.state.index, None)
    }

    pub fn has_next_level(&self) -> bool {
        self.state.index + 1 < self.levels.len()
    }

    pub fn next_level(&mut self) -> Result<(), LoadError> {
        self.load_level(self.state.index + 1, None)
    }

    fn announce_level(&mut self) {
        self.events.push_back(Event::BoardReset {
            level: self.state.index,
        });
        self.events
            .push_back(Event::ObjectivesChanged(self.state.clone()));
        self.push_outcome();
    }

    fn push_outcome(&mut self) {
        match self.phase {
            Phase::Won => {
                let stars = self.state.stars();
                info!(level = self.state.index, score = self.state.score, stars, "level won");
                self.events.push_back(Event::Finished(Outcome::Won { stars }));
            }
            Phase::Lost => {
                info!(level = self.state.index, score = self.state.score, "level lost");
                self.events.push_back(Event::Finished(Outcome::Lost));
            }
            Phase::Idle | Phase::Busy => {}
        }
    }

    fn evaluate(&self) -> Phase {
        if self.state.is_objective_complete() {
            Phase::Won
        } else if self.state.is_out_of_moves() {
            Phase::Lost
        } else {
            Phase::Idle
        }
    }

    fn reject(&mut self, a: Pos, b: Pos, reason: RejectReason) -> SwapOutcome {
        debug!(?a, ?b, ?reason, "swap rejected");
        self.events.push_back(Event::SwapRejected { a, b, reason });
        SwapOutcome::Rejected(reason)
    }

    /// Try to swap two adjacent cells.
    ///
    /// The swap is kept only if it forms a match or moves a color bomb; otherwise the
    /// board is restored and no move is spent.
    pub fn request_swap(&mut self, a: Pos, b: Pos) -> SwapOutcome {
        if self.phase != Phase::Idle {
            return self.reject(a, b, RejectReason::NotIdle);
        }
        if self.state.is_out_of_moves() {
            return self.reject(a, b, RejectReason::OutOfMoves);
        }
        if !self.board.contains(a) || !self.board.contains(b) {
            return self.reject(a, b, RejectReason::OutOfBounds);
        }
        if !a.is_adjacent(b) {
            return self.reject(a, b, RejectReason::NotAdjacent);
        }

        self.board.swap(a, b);
        let seeds: Vec<Pos> = [a, b]
            .into_iter()
            .filter(|&p| self.board.special(p) == Some(Special::ColorBomb))
            .collect();
        if seeds.is_empty() && !matcher::has_match(&self.board) {
            self.board.swap(a, b);
            debug!(?a, ?b, "swap formed no match, reverted");
            self.events.push_back(Event::SwapRejected {
                a,
                b,
                reason: RejectReason::NoMatch,
            });
            return SwapOutcome::Reverted;
        }

        self.state.spend_move();
        self.phase = Phase::Busy;
        debug!(?a, ?b, moves_left = self.state.moves_left, bombs = seeds.len(), "swap accepted");
        self.pending = Some(PendingMove {
            swap: Some((a, b)),
            seeds,
            chain: 0,
        });
        self.events.push_back(Event::SwapAccepted { a, b });
        self.events
            .push_back(Event::ObjectivesChanged(self.state.clone()));
        SwapOutcome::Accepted
    }

    /// Resolve one cascade step. Returns `None` unless the engine is [`Phase::Busy`].
    pub fn step(&mut self) -> Option<Step> {
        if self.phase != Phase::Busy {
            return None;
        }
        let mut pending = self.pending.take().unwrap_or_default();
        let groups = matcher::find_groups(&self.board);
        if groups.is_empty() && pending.seeds.is_empty() {
            return Some(Step::Settled(self.finish_move()));
        }
        pending.chain += 1;
        let report = self.apply_step(&pending, &groups);
        pending.seeds.clear();
        self.pending = Some(pending);
        Some(Step::Cascade(report))
    }

    /// Step until the move settles, returning every cascade step applied.
    pub fn resolve(&mut self) -> Vec<CascadeReport> {
        let mut reports = Vec::new();
        while let Some(step) = self.step() {
            match step {
                Step::Cascade(report) => reports.push(report),
                Step::Settled(_) => break,
            }
        }
        reports
    }

    fn apply_step(&mut self, pending: &PendingMove, groups: &[Group]) -> CascadeReport {
        let plan = plan_step(&self.board, groups, pending.swap, &pending.seeds);

        let matched: Vec<MatchedGroup> = groups
            .iter()
            .map(|g| MatchedGroup {
                kind: g.kind,
                cells: g.cells.clone(),
                shape: g.shape,
                bonus: plan
                    .bonuses
                    .iter()
                    .find(|b| g.contains(b.pos))
                    .map(|b| b.special),
            })
            .collect();
        if !matched.is_empty() {
            self.events.push_back(Event::GroupsMatched(matched.clone()));
        }
        for bonus in &plan.bonuses {
            self.board.set_special(bonus.pos, Some(bonus.special));
            self.events.push_back(Event::BonusCreated {
                pos: bonus.pos,
                special: bonus.special,
            });
        }
        for &(pos, special) in &plan.activated {
            self.events
                .push_back(Event::SpecialActivated { pos, special });
        }

        self.state.add_score(plan.score);
        let mut cleared = Vec::with_capacity(plan.clear.len());
        for (&pos, &cause) in &plan.clear {
            if let Some(tile) = self.board.clear(pos) {
                self.state.collect_tile(tile.kind);
                cleared.push(ClearedCell { pos, tile, cause });
            }
            if let Some(remaining) = self.board.decrement_ice(pos) {
                if remaining == 0 {
                    self.state.melt_ice();
                }
                self.events
                    .push_back(Event::IceCracked { pos, remaining });
            }
        }
        self.events.push_back(Event::CellsCleared(cleared.clone()));

        let refills = self.board.collapse_and_refill(&mut self.rng);
        self.events.push_back(Event::Refilled(refills));
        self.events
            .push_back(Event::ObjectivesChanged(self.state.clone()));

        trace!(
            chain = pending.chain,
            groups = groups.len(),
            cleared = cleared.len(),
            specials = plan.activated.len(),
            gain = plan.score,
            score = self.state.score,
            "cascade step"
        );
        CascadeReport {
            chain: pending.chain,
            groups: matched,
            bonuses: plan.bonuses,
            activated: plan.activated,
            cleared,
            score: plan.score,
        }
    }

    fn finish_move(&mut self) -> Phase {
        self.pending = None;
        self.best_score = self.best_score.max(self.state.score);
        self.phase = self.evaluate();
        self.push_outcome();
        self.phase
    }

    /// Take every event emitted since the last drain, oldest first.
    pub fn drain_events(&mut self) -> Drain<'_, Event> {
        self.events.drain(..)
    }

    /// Board and level state in persistable form.
    pub fn saved(&self) -> SavedLevel {
        SavedLevel {
            state: self.state.clone(),
            board: self.board.snapshot(),
        }
    }

    #[inline]
    pub fn board(&self) -> &Board {
        &self.board
    }

    #[inline]
    pub fn state(&self) -> &LevelState {
        &self.state
    }

    #[inline]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    #[inline]
    pub fn levels(&self) -> &LevelPack {
        &self.levels
    }

    #[inline]
    pub fn best_score(&self) -> u32 {
        self.best_score
    }

    /// Seed the best score from persisted progress.
    pub fn set_best_score(&mut self, best: u32) {
        self.best_score = self.best_score.max(best);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Tile;

    /// (2r + c) mod 6: no two neighbours share a type in either direction.
    fn quiet_board() -> Board {
        let rows: Vec<String> = (0..GRID_SIZE)
            .map(|r| {
                (0..GRID_SIZE)
                    .map(|c| char::from(b'0' + ((2 * r + c) % 6) as u8))
                    .collect()
            })
            .collect();
        let rows: Vec<&str> = rows.iter().map(String::as_str).collect();
        Board::from_rows(&rows).unwrap()
    }

    fn pack() -> LevelPack {
        LevelPack::new(vec![LevelDescriptor {
            move_budget: 10,
            target_score: 5000,
            collectibles: [(5, 3)].into(),
            ice_cell_count: 0,
            ice_strength: 1,
        }])
    }

    fn engine_with(board: &Board) -> Engine {
        let mut engine = Engine::new(pack(), Some(11)).unwrap();
        let state = engine.state().clone();
        engine
            .load_level(
                0,
                Some(SavedLevel {
                    state,
                    board: board.snapshot(),
                }),
            )
            .unwrap();
        engine.drain_events().for_each(drop);
        engine
    }

    /// Row 0 reads 5 5 2 ..., with a 5 at (1, 2): swapping (0, 2)/(1, 2) makes 555.
    fn three_setup() -> Board {
        let mut b = quiet_board();
        for pos in [Pos::new(0, 0), Pos::new(0, 1), Pos::new(1, 2)] {
            b.set_tile(pos, Tile::plain(5));
        }
        b
    }

    #[test]
    fn test_new_engine_is_idle_and_quiet() {
        let engine = Engine::new(LevelPack::builtin(), Some(3)).unwrap();
        assert_eq!(engine.phase(), Phase::Idle);
        assert!(engine.board().is_full());
        assert!(!matcher::has_match(engine.board()));
        assert_eq!(engine.board().frozen_cells(), 8);
        assert_eq!(engine.state().moves_left, 20);
    }

    #[test]
    fn test_new_engine_rejects_empty_pack() {
        assert_eq!(
            Engine::new(LevelPack::new(Vec::new()), Some(1)).unwrap_err(),
            ConfigError::EmptyLevelPack
        );
    }

    #[test]
    fn test_invalid_swaps_are_rejected_without_change() {
        let mut engine = engine_with(&three_setup());
        let before = engine.board().clone();
        assert_eq!(
            engine.request_swap(Pos::new(0, 0), Pos::new(2, 0)),
            SwapOutcome::Rejected(RejectReason::NotAdjacent)
        );
        assert_eq!(
            engine.request_swap(Pos::new(0, 7), Pos::new(0, 8)),
            SwapOutcome::Rejected(RejectReason::OutOfBounds)
        );
        assert_eq!(
            engine.request_swap(Pos::new(3, 3), Pos::new(3, 3)),
            SwapOutcome::Rejected(RejectReason::NotAdjacent)
        );
        assert_eq!(engine.board(), &before);
        assert_eq!(engine.state().moves_left, 10);
    }

    #[test]
    fn test_swap_without_match_is_reverted() {
        let mut engine = engine_with(&quiet_board());
        let before = engine.board().clone();
        assert_eq!(
            engine.request_swap(Pos::new(0, 0), Pos::new(0, 1)),
            SwapOutcome::Reverted
        );
        assert_eq!(engine.board(), &before);
        assert_eq!(engine.state().moves_left, 10);
        assert_eq!(engine.phase(), Phase::Idle);
        let events: Vec<Event> = engine.drain_events().collect();
        assert!(matches!(
            events.as_slice(),
            [Event::SwapRejected {
                reason: RejectReason::NoMatch,
                ..
            }]
        ));
    }

    #[test]
    fn test_accepted_swap_spends_one_move_and_blocks_input() {
        let mut engine = engine_with(&three_setup());
        assert_eq!(
            engine.request_swap(Pos::new(0, 2), Pos::new(1, 2)),
            SwapOutcome::Accepted
        );
        assert_eq!(engine.phase(), Phase::Busy);
        assert_eq!(engine.state().moves_left, 9);
        assert_eq!(
            engine.request_swap(Pos::new(5, 5), Pos::new(5, 6)),
            SwapOutcome::Rejected(RejectReason::NotIdle)
        );

        let Some(Step::Cascade(first)) = engine.step() else {
            panic!("expected a cascade step");
        };
        assert_eq!(first.chain, 1);
        assert_eq!(first.groups.len(), 1);
        assert_eq!(first.cleared.len(), 3);
        assert_eq!(first.score, 30);
        assert!(first.bonuses.is_empty());
        assert!(engine.board().is_full());

        engine.resolve();
        assert_eq!(engine.phase(), Phase::Idle);
        assert!(!matcher::has_match(engine.board()));
        // cascades never spend moves
        assert_eq!(engine.state().moves_left, 9);
        assert!(engine.state().score >= 30);
    }

    #[test]
    fn test_collectibles_count_cleared_tiles() {
        let mut engine = engine_with(&three_setup());
        engine.request_swap(Pos::new(0, 2), Pos::new(1, 2));
        engine.step();
        assert_eq!(engine.state().collect[&5], 0);
    }

    #[test]
    fn test_four_in_a_row_leaves_row_clear_on_swapped_cell() {
        let mut b = three_setup();
        b.set_tile(Pos::new(0, 3), Tile::plain(5));
        let mut engine = engine_with(&b);
        assert_eq!(
            engine.request_swap(Pos::new(0, 2), Pos::new(1, 2)),
            SwapOutcome::Accepted
        );
        let Some(Step::Cascade(first)) = engine.step() else {
            panic!("expected a cascade step");
        };
        assert_eq!(
            first.bonuses,
            vec![Bonus {
                pos: Pos::new(0, 2),
                special: Special::RowClear
            }]
        );
        assert_eq!(first.groups[0].bonus, Some(Special::RowClear));
        assert_eq!(first.cleared.len(), 3);
        assert_eq!(first.score, 30);
        // column 2 lost nothing, so the survivor did not move
        assert_eq!(
            engine.board().tile(Pos::new(0, 2)),
            Some(Tile::with_special(5, Special::RowClear))
        );
    }

    #[test]
    fn test_swapped_color_bomb_fires_without_a_match() {
        let mut b = quiet_board();
        b.set_special(Pos::new(0, 0), Some(Special::ColorBomb));
        let mut engine = engine_with(&b);
        assert_eq!(
            engine.request_swap(Pos::new(0, 0), Pos::new(0, 1)),
            SwapOutcome::Accepted
        );
        let Some(Step::Cascade(first)) = engine.step() else {
            panic!("expected a cascade step");
        };
        assert!(first.groups.is_empty());
        assert_eq!(first.activated, vec![(Pos::new(0, 1), Special::ColorBomb)]);
        // eleven 1s plus the bomb
        assert_eq!(first.cleared.len(), 12);
        assert_eq!(first.score, 120);
        assert!(
            first
                .cleared
                .iter()
                .all(|c| c.tile.kind == 1 || c.pos == Pos::new(0, 1))
        );
    }

    #[test]
    fn test_plan_step_scores_extra_groups() {
        let mut b = quiet_board();
        for col in 0..3 {
            b.set_tile(Pos::new(7, col), Tile::plain(4));
        }
        for col in 2..5 {
            b.set_tile(Pos::new(0, col), Tile::plain(0));
        }
        let groups = matcher::find_groups(&b);
        assert_eq!(groups.len(), 2);
        let plan = plan_step(&b, &groups, None, &[]);
        assert_eq!(plan.clear.len(), 6);
        assert_eq!(plan.score, 6 * 10 + 20);
    }

    #[test]
    fn test_plan_step_scores_post_expansion_set() {
        let mut b = three_setup();
        b.swap(Pos::new(0, 2), Pos::new(1, 2));
        b.set_special(Pos::new(0, 1), Some(Special::ColumnClear));
        let groups = matcher::find_groups(&b);
        let plan = plan_step(&b, &groups, None, &[]);
        // three matched + seven more in column 1
        assert_eq!(plan.clear.len(), 10);
        assert_eq!(plan.score, 100);
    }

    #[test]
    fn test_ice_cracks_on_clear() {
        let mut b = three_setup();
        b.set_ice(Pos::new(0, 0), 2);
        b.set_ice(Pos::new(0, 1), 1);
        let mut engine = engine_with(&b);
        engine.state.ice_left = 2;
        engine.request_swap(Pos::new(0, 2), Pos::new(1, 2));
        engine.step();
        assert_eq!(engine.board().ice(Pos::new(0, 0)), 1);
        assert_eq!(engine.board().ice(Pos::new(0, 1)), 0);
        assert_eq!(engine.state().ice_left, 1);
        let cracked: Vec<(Pos, u8)> = engine
            .drain_events()
            .filter_map(|e| match e {
                Event::IceCracked { pos, remaining } => Some((pos, remaining)),
                _ => None,
            })
            .collect();
        assert_eq!(cracked, vec![(Pos::new(0, 0), 1), (Pos::new(0, 1), 0)]);
    }

    #[test]
    fn test_restart_resets_score_and_moves() {
        let mut engine = engine_with(&three_setup());
        engine.request_swap(Pos::new(0, 2), Pos::new(1, 2));
        engine.resolve();
        let best = engine.best_score();
        assert!(best >= 30);
        engine.restart_level().unwrap();
        assert_eq!(engine.state().score, 0);
        assert_eq!(engine.state().moves_left, 10);
        assert_eq!(engine.phase(), Phase::Idle);
        assert_eq!(engine.best_score(), best);
    }

    #[test]
    fn test_resume_rejects_wrong_level() {
        let mut engine = Engine::new(LevelPack::builtin(), Some(5)).unwrap();
        let saved = engine.saved();
        assert_eq!(
            engine.load_level(1, Some(saved)),
            Err(LoadError::Snapshot(SnapshotError::LevelMismatch {
                saved: 0,
                requested: 1
            }))
        );
        assert_eq!(
            engine.load_level(9, None),
            Err(LoadError::Config(ConfigError::NoSuchLevel { index: 9, len: 3 }))
        );
    }

    #[test]
    fn test_next_level() {
        let mut engine = Engine::new(LevelPack::builtin(), Some(5)).unwrap();
        assert!(engine.has_next_level());
        engine.next_level().unwrap();
        assert_eq!(engine.state().index, 1);
        assert_eq!(engine.state().moves_left, 22);
        assert_eq!(engine.board().frozen_cells(), 12);
        engine.next_level().unwrap();
        assert!(!engine.has_next_level());
        assert!(engine.next_level().is_err());
    }
}
