//! Compilation units and sessions.
//!
//! A [`CompileUnit`] is one independent set of records. A [`Session`]
//! compiles its units one after another; a failing unit yields its error
//! and the remaining units still compile. Runs for several option sets
//! share no state and execute on scoped threads.

use std::thread;

use ormeta_engine::{DescriptorSet, compile};
use ormeta_foundation::{CompileOptions, Error, ErrorKind, Result};
use ormeta_model::TypeRecord;
use tracing::{info, warn};

/// A named set of records compiled as a whole.
#[derive(Clone, Debug)]
pub struct CompileUnit {
    /// Unit name, unique within a session.
    pub name: String,
    /// Records in input order.
    pub records: Vec<TypeRecord>,
}

impl CompileUnit {
    /// Creates a unit.
    #[must_use]
    pub fn new(name: impl Into<String>, records: Vec<TypeRecord>) -> Self {
        Self {
            name: name.into(),
            records,
        }
    }
}

/// The result of compiling one unit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnitOutcome {
    /// Unit name.
    pub unit: String,
    /// Descriptors, or the error that aborted the unit.
    pub result: Result<DescriptorSet>,
}

impl UnitOutcome {
    /// Returns true if the unit compiled.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }

    /// Returns the descriptors of a compiled unit.
    #[must_use]
    pub fn descriptors(&self) -> Option<&DescriptorSet> {
        self.result.as_ref().ok()
    }

    /// Returns the error of a failed unit.
    #[must_use]
    pub fn error(&self) -> Option<&Error> {
        self.result.as_ref().err()
    }
}

/// An ordered collection of compilation units sharing one option set.
#[derive(Clone, Debug, Default)]
pub struct Session {
    options: CompileOptions,
    units: Vec<CompileUnit>,
}

impl Session {
    /// Creates an empty session.
    #[must_use]
    pub fn new(options: CompileOptions) -> Self {
        Self {
            options,
            units: Vec::new(),
        }
    }

    /// Returns the session options.
    #[must_use]
    pub const fn options(&self) -> &CompileOptions {
        &self.options
    }

    /// Returns the units in insertion order.
    #[must_use]
    pub fn units(&self) -> &[CompileUnit] {
        &self.units
    }

    /// Number of units.
    #[must_use]
    pub fn len(&self) -> usize {
        self.units.len()
    }

    /// Returns true if the session has no units.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Adds a unit.
    ///
    /// # Errors
    ///
    /// Returns a value error if a unit of the same name exists.
    pub fn add_unit(&mut self, unit: CompileUnit) -> Result<()> {
        if self.units.iter().any(|u| u.name == unit.name) {
            return Err(Error::invalid_value(
                "session",
                "unit",
                unit.name,
                "unit declared twice",
            ));
        }
        self.units.push(unit);
        Ok(())
    }

    /// Compiles every unit with the session options.
    #[must_use]
    pub fn compile(&self) -> Vec<UnitOutcome> {
        compile_units(&self.units, &self.options)
    }

    /// Compiles every unit once per option set, one thread per set.
    ///
    /// Results are returned in the order of `option_sets`.
    #[must_use]
    pub fn compile_with(&self, option_sets: &[CompileOptions]) -> Vec<Vec<UnitOutcome>> {
        thread::scope(|scope| {
            let handles: Vec<_> = option_sets
                .iter()
                .map(|options| scope.spawn(move || compile_units(&self.units, options)))
                .collect();
            handles
                .into_iter()
                .map(|handle| {
                    handle.join().unwrap_or_else(|_| {
                        self.units
                            .iter()
                            .map(|unit| UnitOutcome {
                                unit: unit.name.clone(),
                                result: Err(Error::new(ErrorKind::Internal(
                                    "compilation thread panicked".to_string(),
                                ))),
                            })
                            .collect()
                    })
                })
                .collect()
        })
    }
}

fn compile_units(units: &[CompileUnit], options: &CompileOptions) -> Vec<UnitOutcome> {
    units
        .iter()
        .map(|unit| {
            let result = compile(&unit.records, options);
            match &result {
                Ok(set) => info!(
                    unit = %unit.name,
                    entities = set.entities.len(),
                    warnings = set.warnings.len(),
                    "compiled unit"
                ),
                Err(err) => warn!(unit = %unit.name, error = %err, "unit failed"),
            }
            UnitOutcome {
                unit: unit.name.clone(),
                result,
            }
        })
        .collect()
}
