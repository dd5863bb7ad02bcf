//! The reversible execution journal. A builder drives the interpreter
//! through one bounded run, capturing the pre- and post-value of every
//! write; the finished timeline owns the only live [`MachineState`] and
//! moves it to any step index by replaying or undoing the recorded diffs.

use smallvec::SmallVec;

use crate::machine::command::Command;
use crate::machine::config::RunConfig;
use crate::machine::interp::{Interpreter, Recorder, StepOutcome};
use crate::machine::resolve::{LabelResolver, ResolveResult, ResolvedProgram, SymbolTable};
use crate::machine::state::{Location, MachineState};
use crate::machine::trace::UpdateListener;
use crate::machine::word::{Word, mask_address};

/// One recorded write, carrying both its pre- and post-value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Update {
    pub location: Location,
    pub old_value: Word,
    pub new_value: Word,
}

// An instruction performs one or two writes, so the per-step list almost
// never spills to the heap.
type StepUpdates = SmallVec<[Update; 2]>;

/// How the build phase ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// The program reached `HALT` or an unmapped code point.
    Halted,
    /// The configured step bound cut the run short; the program may not
    /// terminate.
    StepLimitReached,
}

/// Resolves `commands` and journals one bounded run under `config`.
pub fn build_timeline(commands: Vec<Command>, config: &RunConfig) -> ResolveResult<Timeline> {
    let program = LabelResolver::resolve(commands)?;
    Ok(TimelineBuilder::new(program, config).run())
}

/// Drives the interpreter and captures every write of the run.
///
/// The builder is the interpreter's [`Recorder`]: each `set` journals an
/// [`Update`] before mutating the state, and each executed instruction
/// commits its updates as one step.
pub struct TimelineBuilder {
    commands: Vec<Command>,
    symbols: SymbolTable,
    state: MachineState,
    steps: Vec<StepUpdates>,
    pending: StepUpdates,
    max_steps: usize,
}

impl Recorder for TimelineBuilder {
    fn get(&self, location: Location) -> Word {
        self.state.get(location)
    }

    fn set(&mut self, location: Location, value: Word) {
        self.pending.push(Update {
            location,
            old_value: self.state.get(location),
            new_value: value,
        });
        self.state.set(location, value);
    }
}

impl TimelineBuilder {
    /// Encodes the program image, applies the configured presets, and
    /// points the IAR at the start label (address 0 if the label is not
    /// defined). Presets happen before the first step and are therefore
    /// not journaled: position 0 already reflects them.
    pub fn new(program: ResolvedProgram, config: &RunConfig) -> Self {
        let ResolvedProgram { commands, symbols } = program;
        let mut state = MachineState::from_program(&commands);
        for &(location, value) in config.presets() {
            state.set(location, value);
        }
        let start = match symbols.lookup(config.start_label_name()) {
            Some(Location::Mem(address)) => address,
            _ => 0,
        };
        state.set(Location::Iar, start);
        Self {
            commands,
            symbols,
            state,
            steps: Vec::new(),
            pending: StepUpdates::new(),
            max_steps: config.max_steps(),
        }
    }

    /// Live state, for inspection between construction and [`run`](Self::run).
    pub fn state(&self) -> &MachineState {
        &self.state
    }

    pub fn recorded_steps(&self) -> usize {
        self.steps.len()
    }

    fn commit(&mut self) {
        self.steps.push(std::mem::take(&mut self.pending));
    }

    /// Runs until the program halts or the step bound is reached, then
    /// hands the journal over. The terminal condition performs no writes
    /// and records no step, so every recorded step is non-empty.
    pub fn run(mut self) -> Timeline {
        let outcome = loop {
            if self.steps.len() >= self.max_steps {
                break RunOutcome::StepLimitReached;
            }
            match Interpreter::step(&mut self) {
                StepOutcome::Continue => self.commit(),
                StepOutcome::Halted => break RunOutcome::Halted,
            }
        };
        let position = self.steps.len();
        Timeline {
            commands: self.commands,
            symbols: self.symbols,
            state: self.state,
            steps: self.steps,
            position,
            outcome,
            listeners: Vec::new(),
        }
    }
}

/// Materialized journal of one run, seekable to any step index.
///
/// The timeline owns the only live machine state; once built, the state
/// is mutated exclusively by the apply/undo walk below, which keeps it
/// equal to a replay of steps `[0, position)` from the initial image.
pub struct Timeline {
    commands: Vec<Command>,
    symbols: SymbolTable,
    state: MachineState,
    steps: Vec<StepUpdates>,
    position: usize,
    outcome: RunOutcome,
    listeners: Vec<Box<dyn UpdateListener>>,
}

impl std::fmt::Debug for Timeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Timeline")
            .field("commands", &self.commands)
            .field("symbols", &self.symbols)
            .field("state", &self.state)
            .field("steps", &self.steps)
            .field("position", &self.position)
            .field("outcome", &self.outcome)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl Timeline {
    pub fn get(&self, location: Location) -> Word {
        self.state.get(location)
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn step_count(&self) -> usize {
        self.steps.len()
    }

    pub fn outcome(&self) -> RunOutcome {
        self.outcome
    }

    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    pub fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    /// Updates recorded for one step, oldest first.
    pub fn step_updates(&self, step: usize) -> Option<&[Update]> {
        self.steps.get(step).map(|updates| updates.as_slice())
    }

    /// The command occupying the cell the IAR currently points at, for
    /// source highlighting.
    pub fn current_command(&self) -> Option<&Command> {
        let iar = mask_address(self.state.get(Location::Iar));
        self.commands.iter().find(|command| command.address == iar)
    }

    /// Registers an observer for every write applied by future seeks.
    pub fn add_listener(&mut self, listener: Box<dyn UpdateListener>) {
        self.listeners.push(listener);
    }

    /// Moves to step index `position`, clamped to `[0, step_count]`.
    ///
    /// The walk is stepwise: forward applies each intervening step's
    /// post-values in recorded order, backward applies pre-values in
    /// reverse order. Cost is proportional to the distance traveled; a
    /// seek to the current position applies nothing.
    pub fn set_position(&mut self, position: usize) {
        let target = position.min(self.steps.len());
        while self.position < target {
            self.apply_forward();
        }
        while self.position > target {
            self.apply_backward();
        }
    }

    /// Signed relative seek, clamped at both boundaries.
    pub fn add_to_position(&mut self, offset: isize) {
        let target = (self.position as isize).saturating_add(offset).max(0);
        self.set_position(target as usize);
    }

    /// Diagnostic dump of registers and labeled cells at the current
    /// position.
    pub fn write_summary<W: std::io::Write>(&self, out: &mut W) -> std::io::Result<()> {
        self.state.write_summary(&self.symbols, out)
    }

    fn apply_forward(&mut self) {
        let updates = std::mem::take(&mut self.steps[self.position]);
        for update in &updates {
            self.write(update.location, update.new_value);
        }
        self.steps[self.position] = updates;
        self.position += 1;
    }

    fn apply_backward(&mut self) {
        self.position -= 1;
        let updates = std::mem::take(&mut self.steps[self.position]);
        for update in updates.iter().rev() {
            self.write(update.location, update.old_value);
        }
        self.steps[self.position] = updates;
    }

    fn write(&mut self, location: Location, value: Word) {
        self.state.set(location, value);
        for listener in &mut self.listeners {
            listener.memory_changed(location, value);
        }
    }
}
