//! Beat-by-beat simulation
//!
//! One call to [`Engine::step`] is one beat:
//! 1. Movement. On "off" beats Green, Blue, Yellow and White move in that
//!    order; Red moves on every beat, always last. The very first beat of a
//!    run is an "on" beat, so only Red moves.
//! 2. Collisions. Cells are claimed in `Color::ALL` order; a token landing
//!    on an already claimed cell fails.
//! 3. Checkpoint capture for every color that has one.
//! 4. Win check: every active color on its own target cell, and every
//!    checkpoint captured, in the same beat.
//!
//! A movement failure (leaving the grid, entering a danger cell) skips the
//! remaining movers and phases 2-4 for that beat.

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use glam::IVec2;
use serde::{Deserialize, Serialize};

use super::board::Board;
use super::cell::Role;
use super::events::{AudioCue, AudioSink, BoardEvent, PresentationSink};
use super::token::Color;
use crate::error::InvalidOperation;

/// Colors that sit out the first beat, in movement order
const DEFERRED_MOVERS: [Color; 4] = [Color::Green, Color::Blue, Color::Yellow, Color::White];

/// Engine state machine: Idle -> Running -> Succeeded | Failed -> Idle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SimPhase {
    #[default]
    Idle,
    Running,
    Succeeded,
    Failed,
}

impl SimPhase {
    pub fn is_terminal(self) -> bool {
        matches!(self, SimPhase::Succeeded | SimPhase::Failed)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FailKind {
    /// Token would have left the grid; the cell is the one it stood on
    OutOfBounds,
    /// Token entered a cell Green had vacated; the cell is the one it came
    /// from, the entered cell carries the fail marker
    Danger,
    /// Token landed on a cell claimed by an earlier color
    Collision,
}

/// Proximate cause of a failed beat
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Failure {
    pub color: Color,
    pub cell: IVec2,
    pub kind: FailKind,
}

/// What happened during one beat
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BeatReport {
    /// 0-based beat index within the run
    pub beat: u64,
    /// Engine phase after the beat
    pub phase: SimPhase,
    /// Colors that moved, in movement order
    pub moved: Vec<Color>,
    /// Checkpoints captured this beat
    pub captured: Vec<Color>,
    pub failures: Vec<Failure>,
}

impl BeatReport {
    fn new(beat: u64) -> Self {
        Self {
            beat,
            phase: SimPhase::Running,
            moved: Vec::new(),
            captured: Vec::new(),
            failures: Vec::new(),
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.phase.is_terminal()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Engine {
    phase: SimPhase,
    /// True on beats where only Red moves
    first_beat: bool,
    beat: u64,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine {
    pub fn new() -> Self {
        Self {
            phase: SimPhase::Idle,
            first_beat: true,
            beat: 0,
        }
    }

    pub fn phase(&self) -> SimPhase {
        self.phase
    }

    /// Beats executed in the current run
    pub fn beat(&self) -> u64 {
        self.beat
    }

    pub fn is_first_beat(&self) -> bool {
        self.first_beat
    }

    /// Idle -> Running
    pub fn start(&mut self) -> Result<(), InvalidOperation> {
        match self.phase {
            SimPhase::Idle => {
                self.phase = SimPhase::Running;
                self.first_beat = true;
                self.beat = 0;
                Ok(())
            }
            SimPhase::Running => Err(InvalidOperation::AlreadyRunning),
            SimPhase::Succeeded | SimPhase::Failed => Err(InvalidOperation::OutcomePending),
        }
    }

    /// Back to Idle from any phase.
    pub fn reset(&mut self) {
        self.phase = SimPhase::Idle;
        self.first_beat = true;
        self.beat = 0;
    }

    /// Advance the board by one beat.
    ///
    /// Rejected without touching the board unless the engine is Running.
    pub fn step(
        &mut self,
        board: &mut Board,
        view: &mut dyn PresentationSink,
        audio: &mut dyn AudioSink,
    ) -> Result<BeatReport, InvalidOperation> {
        if self.phase != SimPhase::Running {
            return Err(InvalidOperation::NotRunning);
        }

        let mut report = BeatReport::new(self.beat);
        self.beat += 1;

        let mut movers: Vec<Color> = Vec::with_capacity(5);
        if !self.first_beat {
            movers.extend(DEFERRED_MOVERS);
        }
        movers.push(Color::Red);

        for color in movers {
            if !board.is_active(color) {
                continue;
            }
            if let Err(failure) = move_token(board, color, view, audio, &mut report) {
                report.failures.push(failure);
                break;
            }
        }
        if !report.failures.is_empty() {
            return Ok(self.finish(SimPhase::Failed, report, view));
        }

        detect_collisions(board, view, &mut report);
        capture_checkpoints(board, view, &mut report);

        if !report.failures.is_empty() {
            return Ok(self.finish(SimPhase::Failed, report, view));
        }
        if is_win(board) {
            return Ok(self.finish(SimPhase::Succeeded, report, view));
        }

        self.first_beat = !self.first_beat;
        log::debug!("Beat {} done, moved {:?}", report.beat, report.moved);
        Ok(report)
    }

    fn finish(
        &mut self,
        phase: SimPhase,
        mut report: BeatReport,
        view: &mut dyn PresentationSink,
    ) -> BeatReport {
        self.phase = phase;
        report.phase = phase;
        view.on_event(&BoardEvent::PhaseChanged { phase });
        match phase {
            SimPhase::Failed => log::info!(
                "Run failed on beat {}: {:?}",
                report.beat,
                report.failures
            ),
            _ => log::info!("Run succeeded on beat {}", report.beat),
        }
        report
    }
}

fn mark_fail(board: &mut Board, pos: IVec2, view: &mut dyn PresentationSink) {
    if let Some(cell) = board.cell_mut(pos) {
        cell.is_fail = true;
        view.on_event(&BoardEvent::FailMarked { pos });
    }
}

/// Move one token a single cell and apply its color's side effect.
fn move_token(
    board: &mut Board,
    color: Color,
    view: &mut dyn PresentationSink,
    audio: &mut dyn AudioSink,
    report: &mut BeatReport,
) -> Result<(), Failure> {
    let Some(from) = board.token(color).map(|t| t.pos) else {
        return Ok(());
    };
    let arrow = board.cell(from).and_then(|c| c.arrow);
    let Some(to) = board.token_mut(color).map(|t| t.advance(arrow)) else {
        return Ok(());
    };

    if !board.in_bounds(to) {
        mark_fail(board, from, view);
        return Err(Failure {
            color,
            cell: from,
            kind: FailKind::OutOfBounds,
        });
    }

    if let Some(token) = board.token_mut(color) {
        token.pos = to;
    }
    report.moved.push(color);
    audio.cue(AudioCue::TokenStep(color));
    view.on_event(&BoardEvent::TokenMoved { color, from, to });

    let entered_danger = board.cell(to).is_some_and(|c| c.is_danger);

    // Side effects land even when the move itself is fatal
    match color {
        Color::Green => {
            board.cell_at_mut(from).is_danger = true;
            view.on_event(&BoardEvent::DangerMarked { pos: from });
        }
        Color::Yellow => {
            if board.cell_at_mut(to).flip_arrow() {
                view.on_event(&BoardEvent::CellChanged { pos: to });
            }
        }
        Color::White => {
            if board.cell_at_mut(to).clear_arrow() {
                view.on_event(&BoardEvent::CellChanged { pos: to });
            }
        }
        Color::Blue | Color::Red => {}
    }

    if entered_danger {
        mark_fail(board, to, view);
        return Err(Failure {
            color,
            cell: from,
            kind: FailKind::Danger,
        });
    }
    Ok(())
}

/// First color to land on a cell owns it; any later arrival fails there.
fn detect_collisions(board: &mut Board, view: &mut dyn PresentationSink, report: &mut BeatReport) {
    let mut claimed: HashMap<IVec2, Color> = HashMap::new();
    let mut collisions = Vec::new();
    for token in board.tokens() {
        match claimed.entry(token.pos) {
            Entry::Occupied(_) => collisions.push(Failure {
                color: token.color,
                cell: token.pos,
                kind: FailKind::Collision,
            }),
            Entry::Vacant(slot) => {
                slot.insert(token.color);
            }
        }
    }
    for failure in collisions {
        mark_fail(board, failure.cell, view);
        report.failures.push(failure);
    }
}

fn capture_checkpoints(board: &mut Board, view: &mut dyn PresentationSink, report: &mut BeatReport) {
    let active: Vec<Color> = board.active_colors().collect();
    for color in active {
        let Some(pos) = board.token(color).map(|t| t.pos) else {
            continue;
        };
        let Some(flag) = board.checkpoint_mut(color) else {
            continue;
        };
        if flag.try_capture(pos) {
            report.captured.push(color);
            view.on_event(&BoardEvent::CheckpointCaptured { color, pos });
        }
    }
}

/// A level with no active colors never wins.
fn is_win(board: &Board) -> bool {
    let mut any_active = false;
    for token in board.tokens() {
        any_active = true;
        let on_target = board
            .cell(token.pos)
            .is_some_and(|c| c.role == Role::Target(token.color));
        let flag_held = !token.color.has_checkpoint()
            || board.checkpoint(token.color).is_some_and(|f| f.captured);
        if !(on_target && flag_held) {
            return false;
        }
    }
    any_active
}
