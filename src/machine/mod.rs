//! The machine core: fixed-width words, two-pass symbol resolution,
//! program-image encoding, the single-step interpreter, and the
//! reversible execution journal that ties them together.

pub mod command;
pub mod config;
pub mod interp;
pub mod opcode;
pub mod resolve;
pub mod state;
pub mod timeline;
pub mod trace;
pub mod word;

pub use command::{Command, SourceSpan};
pub use config::RunConfig;
pub use interp::{Interpreter, Recorder, StepOutcome};
pub use opcode::{Opcode, describe};
pub use resolve::{
    LabelResolver,
    ResolveError,
    ResolveResult,
    ResolvedProgram,
    SymbolTable,
};
pub use state::{Location, MachineState};
pub use timeline::{RunOutcome, Timeline, TimelineBuilder, Update, build_timeline};
pub use trace::{UpdateListener, UpdatePrinter};
pub use word::{Address, Word};
