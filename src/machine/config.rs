//! Per-run configuration, passed explicitly into the build call. There is
//! no ambient process-wide configuration anywhere in the core.

use crate::machine::state::Location;
use crate::machine::word::{START_LABEL, Word, mask_value};

/// Settings for one bounded run.
///
/// The step bound is mandatory: it is the only guard against journaling a
/// non-terminating program.
#[derive(Debug, Clone)]
pub struct RunConfig {
    max_steps: usize,
    start_label: String,
    presets: Vec<(Location, Word)>,
}

impl RunConfig {
    pub fn new(max_steps: usize) -> Self {
        Self {
            max_steps,
            start_label: START_LABEL.to_string(),
            presets: Vec::new(),
        }
    }

    /// Uses `label` instead of the default `START` entry point.
    pub fn start_label(mut self, label: impl Into<String>) -> Self {
        self.start_label = label.into();
        self
    }

    /// Seeds `location` with `value` before the first step is built.
    /// Presets overwrite the encoded program image and are not journaled.
    pub fn preset(mut self, location: Location, value: Word) -> Self {
        self.presets.push((location, mask_value(value)));
        self
    }

    pub fn max_steps(&self) -> usize {
        self.max_steps
    }

    pub fn start_label_name(&self) -> &str {
        &self.start_label
    }

    pub fn presets(&self) -> &[(Location, Word)] {
        &self.presets
    }
}
