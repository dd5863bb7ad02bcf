//! Program lines as delivered by a textual front end: one command per
//! occupied memory cell, possibly carrying a defining label and a symbolic
//! argument that resolution later replaces with a concrete address.

use crate::machine::word::{Address, Word};

/// Position of a command in the source text. Only carried through for
/// editor integrations; the core never interprets it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SourceSpan {
    pub line: u32,
    pub column: u32,
}

impl SourceSpan {
    pub fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }
}

/// One parsed program line.
///
/// A line with a label but no mnemonic defines the label for the address
/// and owns no storage; resolution drops such lines from the executable
/// list. Every surviving command occupies exactly one memory cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    pub address: Address,
    pub label: Option<String>,
    pub mnemonic: Option<String>,
    pub symbol_arg: Option<String>,
    pub value_arg: Word,
    pub span: Option<SourceSpan>,
}

impl Command {
    /// A label-only line: defines `label` at `address`, executes nothing.
    pub fn label_only(address: Address, label: impl Into<String>) -> Self {
        Self {
            address,
            label: Some(label.into()),
            mnemonic: None,
            symbol_arg: None,
            value_arg: 0,
            span: None,
        }
    }

    pub fn new(address: Address, mnemonic: impl Into<String>) -> Self {
        Self {
            address,
            label: None,
            mnemonic: Some(mnemonic.into()),
            symbol_arg: None,
            value_arg: 0,
            span: None,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_symbol_arg(mut self, symbol: impl Into<String>) -> Self {
        self.symbol_arg = Some(symbol.into());
        self
    }

    pub fn with_value_arg(mut self, value: Word) -> Self {
        self.value_arg = value;
        self
    }

    pub fn with_span(mut self, span: SourceSpan) -> Self {
        self.span = Some(span);
        self
    }

    /// Copy of this command with the numeric argument replaced, used when
    /// resolution substitutes a symbolic argument.
    pub fn resolved_to(&self, value: Word) -> Self {
        let mut resolved = self.clone();
        resolved.value_arg = value;
        resolved
    }
}
