//! Descriptor snapshots using `MessagePack`.
//!
//! A snapshot is the encoded form of a [`DescriptorSet`]; the emitters read
//! snapshots instead of re-running the compiler. Encoding is deterministic,
//! so two compilations of the same records yield identical bytes.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use ormeta_engine::DescriptorSet;
use ormeta_foundation::{Error, ErrorKind, Result};
use serde::{Deserialize, Serialize};

use crate::session::UnitOutcome;

/// The descriptor set of one successfully compiled unit.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitSnapshot {
    /// Unit name.
    pub unit: String,
    /// Compiled descriptors.
    pub descriptors: DescriptorSet,
}

/// Serializes a descriptor set to bytes using `MessagePack` format.
///
/// Uses named serialization to preserve struct field names.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn to_snapshot(set: &DescriptorSet) -> Result<Vec<u8>> {
    rmp_serde::to_vec_named(set)
        .map_err(|e| Error::new(ErrorKind::SerializationError(e.to_string())))
}

/// Deserializes a descriptor set from `MessagePack` bytes.
///
/// # Errors
///
/// Returns an error if deserialization fails.
pub fn from_snapshot(bytes: &[u8]) -> Result<DescriptorSet> {
    rmp_serde::from_slice(bytes)
        .map_err(|e| Error::new(ErrorKind::SerializationError(e.to_string())))
}

/// Serializes the successful units of a session run.
///
/// Failed units are skipped; their errors are reported by the session.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn units_to_snapshot(outcomes: &[UnitOutcome]) -> Result<Vec<u8>> {
    let units: Vec<UnitSnapshot> = outcomes
        .iter()
        .filter_map(|outcome| {
            outcome.descriptors().map(|descriptors| UnitSnapshot {
                unit: outcome.unit.clone(),
                descriptors: descriptors.clone(),
            })
        })
        .collect();
    rmp_serde::to_vec_named(&units)
        .map_err(|e| Error::new(ErrorKind::SerializationError(e.to_string())))
}

/// Deserializes unit snapshots written by [`units_to_snapshot`].
///
/// # Errors
///
/// Returns an error if deserialization fails.
pub fn units_from_snapshot(bytes: &[u8]) -> Result<Vec<UnitSnapshot>> {
    rmp_serde::from_slice(bytes)
        .map_err(|e| Error::new(ErrorKind::SerializationError(e.to_string())))
}

/// Saves a descriptor set to a file using `MessagePack` format.
///
/// Creates the file if it doesn't exist, or overwrites it if it does.
///
/// # Errors
///
/// Returns an error if the file cannot be created or written to,
/// or if serialization fails.
pub fn save_snapshot<P: AsRef<Path>>(set: &DescriptorSet, path: P) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path).map_err(|e| {
        Error::new(ErrorKind::IoError(format!(
            "failed to create file '{}': {e}",
            path.display()
        )))
    })?;

    let mut writer = BufWriter::new(file);
    let bytes = to_snapshot(set)?;

    writer.write_all(&bytes).map_err(|e| {
        Error::new(ErrorKind::IoError(format!(
            "failed to write to file '{}': {e}",
            path.display()
        )))
    })?;

    writer.flush().map_err(|e| {
        Error::new(ErrorKind::IoError(format!(
            "failed to flush file '{}': {e}",
            path.display()
        )))
    })
}

/// Loads a descriptor set from a `MessagePack` file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or if deserialization fails.
pub fn load_snapshot<P: AsRef<Path>>(path: P) -> Result<DescriptorSet> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| {
        Error::new(ErrorKind::IoError(format!(
            "failed to open file '{}': {e}",
            path.display()
        )))
    })?;

    let mut bytes = Vec::new();
    BufReader::new(file).read_to_end(&mut bytes).map_err(|e| {
        Error::new(ErrorKind::IoError(format!(
            "failed to read file '{}': {e}",
            path.display()
        )))
    })?;

    from_snapshot(&bytes)
}
