//! Two-pass symbol resolution over a parsed command list: collect label
//! definitions first, then substitute every symbolic argument. Forward
//! references are fine; redefinitions and dangling references are not.

use std::fmt;

use ahash::AHashMap;

use crate::machine::command::{Command, SourceSpan};
use crate::machine::state::Location;

/// Label name → resolved location.
///
/// Built once by [`LabelResolver::resolve`] and read-only afterwards,
/// except that verification tooling may [`define`](SymbolTable::define)
/// synthetic register aliases (conventionally `_iar` and `_accu`) before
/// a run so presets and assertions can address the registers by name.
#[derive(Debug, Default, Clone)]
pub struct SymbolTable {
    entries: AHashMap<String, Location>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces an entry.
    pub fn define(&mut self, name: impl Into<String>, location: Location) {
        self.entries.insert(name.into(), location);
    }

    pub fn lookup(&self, name: &str) -> Option<Location> {
        self.entries.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Location)> {
        self.entries.iter().map(|(name, loc)| (name.as_str(), *loc))
    }
}

/// Failure of a resolve call. Either variant aborts the whole resolution;
/// the span, when the front end supplied one, points at the offending
/// line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    DuplicateSymbol {
        name: String,
        span: Option<SourceSpan>,
    },
    UnknownSymbol {
        name: String,
        span: Option<SourceSpan>,
    },
}

impl ResolveError {
    pub fn symbol(&self) -> &str {
        match self {
            ResolveError::DuplicateSymbol { name, .. } => name,
            ResolveError::UnknownSymbol { name, .. } => name,
        }
    }

    pub fn span(&self) -> Option<SourceSpan> {
        match self {
            ResolveError::DuplicateSymbol { span, .. } => *span,
            ResolveError::UnknownSymbol { span, .. } => *span,
        }
    }
}

impl fmt::Display for ResolveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolveError::DuplicateSymbol { name, .. } => {
                write!(f, "symbol '{name}' already defined")
            }
            ResolveError::UnknownSymbol { name, .. } => write!(f, "unknown label '{name}'"),
        }
    }
}

impl std::error::Error for ResolveError {}

pub type ResolveResult<T> = Result<T, ResolveError>;

/// Output of resolution: only executable commands remain, every symbolic
/// argument carries its resolved address, and the symbol table maps each
/// label to the cell it named.
#[derive(Debug, Clone)]
pub struct ResolvedProgram {
    pub commands: Vec<Command>,
    pub symbols: SymbolTable,
}

pub struct LabelResolver;

impl LabelResolver {
    /// Resolves a parsed command list.
    ///
    /// Pass 1 records every label definition, rejecting duplicates, and
    /// filters label-only lines into a fresh list. Pass 2 substitutes
    /// symbolic arguments. Resolving an already-resolved list reproduces
    /// it unchanged.
    pub fn resolve(commands: Vec<Command>) -> ResolveResult<ResolvedProgram> {
        let mut symbols = SymbolTable::new();
        let mut executable = Vec::with_capacity(commands.len());
        for command in commands {
            if let Some(label) = command.label.as_deref() {
                if symbols.contains(label) {
                    return Err(ResolveError::DuplicateSymbol {
                        name: label.to_string(),
                        span: command.span,
                    });
                }
                symbols.define(label, Location::Mem(command.address));
            }
            if command.mnemonic.is_some() {
                executable.push(command);
            }
        }

        let commands = executable
            .into_iter()
            .map(|command| match command.symbol_arg.as_deref() {
                Some(symbol) => match symbols.lookup(symbol) {
                    Some(Location::Mem(address)) => Ok(command.resolved_to(address)),
                    // Register aliases name no memory cell and cannot be
                    // an instruction argument.
                    _ => Err(ResolveError::UnknownSymbol {
                        name: symbol.to_string(),
                        span: command.span,
                    }),
                },
                None => Ok(command),
            })
            .collect::<ResolveResult<Vec<_>>>()?;

        Ok(ResolvedProgram { commands, symbols })
    }
}
