//! Observer side-channel for navigation: a timeline reports every applied
//! write to its registered listeners so a display can refresh the touched
//! cells instead of re-rendering two megawords of memory.

use std::io::Write;

use crate::machine::state::Location;
use crate::machine::word::Word;

/// Receives one callback per write applied during navigation.
///
/// Notification is synchronous and in-process. A listener must not seek
/// the timeline from inside its own callback.
pub trait UpdateListener {
    fn memory_changed(&mut self, location: Location, value: Word);
}

/// Listener that prints each write to a sink, one line per mutation.
pub struct UpdatePrinter<W: Write> {
    writer: W,
}

impl<W: Write> UpdatePrinter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }
}

impl UpdatePrinter<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write> UpdateListener for UpdatePrinter<W> {
    fn memory_changed(&mut self, location: Location, value: Word) {
        let _ = writeln!(self.writer, "[Write]   {location} <- 0x{value:06x}");
    }
}
