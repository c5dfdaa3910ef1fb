//! Control surface for one play session
//!
//! Wires the board, engine and beat clock together and forwards events to
//! the injected presentation and audio sinks. The host calls
//! [`Session::update`] from its own loop; `&mut self` guarantees a beat
//! never starts while another is still running.

use crate::clock::{BeatClock, Countdown};
use crate::error::{GameError, InvalidOperation};
use crate::level::{Campaign, LevelConfig};
use crate::settings::Settings;
use crate::sim::{
    AudioCue, AudioSink, BeatReport, Board, BoardEvent, Direction, EditOutcome, Engine,
    PresentationSink, SimPhase,
};

pub struct Session<V: PresentationSink, A: AudioSink> {
    level: Option<LevelConfig>,
    board: Option<Board>,
    engine: Engine,
    clock: BeatClock,
    /// Delay between a terminal beat and `OutcomeRevealed`
    reveal: Countdown,
    reveal_delay: f32,
    view: V,
    audio: A,
}

impl<V: PresentationSink, A: AudioSink> Session<V, A> {
    pub fn new(settings: &Settings, view: V, audio: A) -> Self {
        Self {
            level: None,
            board: None,
            engine: Engine::new(),
            clock: BeatClock::new(settings.bpm),
            reveal: Countdown::default(),
            reveal_delay: settings.terminal_delay_secs,
            view,
            audio,
        }
    }

    // === Accessors ===

    pub fn level(&self) -> Option<&LevelConfig> {
        self.level.as_ref()
    }

    pub fn board(&self) -> Option<&Board> {
        self.board.as_ref()
    }

    pub fn phase(&self) -> SimPhase {
        self.engine.phase()
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    pub fn clock(&self) -> &BeatClock {
        &self.clock
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut V {
        &mut self.view
    }

    pub fn audio_mut(&mut self) -> &mut A {
        &mut self.audio
    }

    pub fn set_bpm(&mut self, bpm: u32) {
        self.clock.set_bpm(bpm);
    }

    /// Whether the loaded level has been solved
    pub fn is_completed(&self) -> bool {
        self.level.as_ref().is_some_and(|l| l.completed)
    }

    // === Commands ===

    /// Replace the current level. On error the previous level stays loaded.
    pub fn load_level(&mut self, config: LevelConfig) -> Result<(), GameError> {
        let board = Board::load(&config)?;
        log::info!(
            "Level '{}' loaded",
            config.name.as_deref().unwrap_or("unnamed")
        );
        self.board = Some(board);
        self.level = Some(config);
        self.engine.reset();
        self.clock.stop();
        self.reveal.cancel();
        self.view.on_event(&BoardEvent::BoardReset);
        Ok(())
    }

    /// Load the campaign's current level.
    pub fn load_current(&mut self, campaign: &Campaign) -> Result<(), GameError> {
        let level = campaign
            .current()
            .ok_or(InvalidOperation::NoLevelLoaded)?
            .clone();
        self.load_level(level)
    }

    /// Record a solved level in the campaign it came from.
    pub fn report_progress(&self, campaign: &mut Campaign) {
        if self.is_completed() {
            campaign.mark_current_completed();
        }
    }

    /// Record progress, then move the campaign on and load its next level.
    /// Returns `false` when the current level was the last one.
    pub fn next_level(&mut self, campaign: &mut Campaign) -> Result<bool, GameError> {
        if self.engine.phase() == SimPhase::Running {
            return Err(InvalidOperation::AlreadyRunning.into());
        }
        self.report_progress(campaign);
        if campaign.advance().is_none() {
            return Ok(false);
        }
        self.load_current(campaign)?;
        log::info!("Advanced to {}", campaign.display_name());
        Ok(true)
    }

    pub fn toggle_arrow_at(&mut self, x: i32, y: i32) -> Result<EditOutcome, GameError> {
        let board = self.editable_board(x, y)?;
        let outcome = board.toggle_arrow(x, y);
        self.announce_edit(x, y, outcome);
        Ok(outcome)
    }

    pub fn rotate_arrow_at(&mut self, x: i32, y: i32) -> Result<EditOutcome, GameError> {
        let board = self.editable_board(x, y)?;
        let outcome = board.rotate_arrow(x, y);
        self.announce_edit(x, y, outcome);
        Ok(outcome)
    }

    /// Point the arrow at `(x, y)` in `dir`, placing one if needed.
    pub fn set_arrow_at(
        &mut self,
        x: i32,
        y: i32,
        dir: Direction,
    ) -> Result<EditOutcome, GameError> {
        let board = self.editable_board(x, y)?;
        let outcome = board.set_arrow(x, y, dir);
        self.announce_edit(x, y, outcome);
        Ok(outcome)
    }

    fn editable_board(&mut self, x: i32, y: i32) -> Result<&mut Board, InvalidOperation> {
        match self.engine.phase() {
            SimPhase::Running => return Err(InvalidOperation::EditWhileRunning),
            SimPhase::Succeeded | SimPhase::Failed => return Err(InvalidOperation::OutcomePending),
            SimPhase::Idle => {}
        }
        let board = self.board.as_mut().ok_or(InvalidOperation::NoLevelLoaded)?;
        if !board.in_bounds(glam::IVec2::new(x, y)) {
            return Err(InvalidOperation::CellOutOfBounds { x, y });
        }
        Ok(board)
    }

    fn announce_edit(&mut self, x: i32, y: i32, outcome: EditOutcome) {
        let cue = match outcome {
            EditOutcome::Placed => AudioCue::ArrowPlaced,
            EditOutcome::Removed => AudioCue::ArrowRemoved,
            EditOutcome::Rotated(_) => AudioCue::ArrowRotated,
            EditOutcome::Ignored => return,
        };
        self.audio.cue(cue);
        self.view.on_event(&BoardEvent::CellChanged {
            pos: glam::IVec2::new(x, y),
        });
    }

    /// Idle -> Running. Locks edits and starts the beat clock.
    pub fn start_simulation(&mut self) -> Result<(), GameError> {
        let board = self.board.as_mut().ok_or(InvalidOperation::NoLevelLoaded)?;
        self.engine.start()?;
        board.lock_edits();
        self.clock.start();
        self.audio.cue(AudioCue::SimulationStart);
        self.view.on_event(&BoardEvent::PhaseChanged {
            phase: SimPhase::Running,
        });
        log::info!("Simulation started at {:.2}s per beat", self.clock.interval());
        Ok(())
    }

    /// Abandon the current run (running or finished) and reset the board.
    pub fn stop_simulation(&mut self) -> Result<(), GameError> {
        if self.board.is_none() {
            return Err(InvalidOperation::NoLevelLoaded.into());
        }
        if self.engine.phase() == SimPhase::Idle {
            return Err(InvalidOperation::NotRunning.into());
        }
        self.audio.cue(AudioCue::SimulationStop);
        self.return_to_idle();
        log::info!("Simulation stopped");
        Ok(())
    }

    /// Reset tokens, markers and captures. Not allowed mid-run.
    pub fn reset_board(&mut self) -> Result<(), GameError> {
        if self.board.is_none() {
            return Err(InvalidOperation::NoLevelLoaded.into());
        }
        if self.engine.phase() == SimPhase::Running {
            return Err(InvalidOperation::AlreadyRunning.into());
        }
        self.audio.cue(AudioCue::BoardReset);
        self.return_to_idle();
        Ok(())
    }

    /// Reset after a finished run.
    pub fn replay(&mut self) -> Result<(), GameError> {
        if !self.engine.phase().is_terminal() {
            return Err(InvalidOperation::NotTerminal.into());
        }
        self.reset_board()
    }

    fn return_to_idle(&mut self) {
        let was = self.engine.phase();
        self.clock.stop();
        self.reveal.cancel();
        self.engine.reset();
        if let Some(board) = self.board.as_mut() {
            for checkpoint in board.checkpoints().filter(|c| c.captured) {
                self.view.on_event(&BoardEvent::CheckpointReleased {
                    color: checkpoint.color,
                    pos: checkpoint.pos,
                });
            }
            board.reset();
        }
        self.view.on_event(&BoardEvent::BoardReset);
        if was != SimPhase::Idle {
            self.view.on_event(&BoardEvent::PhaseChanged {
                phase: SimPhase::Idle,
            });
        }
    }

    /// Run one beat now, regardless of the clock.
    pub fn step_beat(&mut self) -> Result<BeatReport, GameError> {
        let board = self.board.as_mut().ok_or(InvalidOperation::NoLevelLoaded)?;
        let report = self.engine.step(board, &mut self.view, &mut self.audio)?;
        if report.is_terminal() {
            self.clock.stop();
            board.unlock_edits();
            self.reveal.arm(self.reveal_delay);
            self.audio.cue(AudioCue::SimulationStop);
            if report.phase == SimPhase::Succeeded {
                if let Some(level) = self.level.as_mut() {
                    level.completed = true;
                }
            }
        }
        Ok(report)
    }

    /// Advance wall-clock time. Runs at most one beat and returns its report.
    pub fn update(&mut self, dt: f32) -> Option<BeatReport> {
        if self.reveal.update(dt) {
            let phase = self.engine.phase();
            log::debug!("Revealing outcome {:?}", phase);
            self.view.on_event(&BoardEvent::OutcomeRevealed { phase });
        }
        if !self.clock.update(dt) {
            return None;
        }
        match self.step_beat() {
            Ok(report) => Some(report),
            Err(e) => {
                log::warn!("Beat skipped: {e}");
                self.clock.stop();
                None
            }
        }
    }
}
