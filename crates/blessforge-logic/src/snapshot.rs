//! Session snapshots.
//!
//! Binary encode/decode of a session's mutable state (ledger + group
//! states) with bincode. Group configurations are not part of a snapshot
//! — they are immutable content the host reloads from the same source it
//! loaded at startup. Durability is the host's problem; the engine only
//! provides the codec.

use std::collections::BTreeMap;
use std::fmt;
use std::io::{Read, Write};

use serde::{Deserialize, Serialize};

use crate::ledger::Ledger;
use crate::session::Session;
use crate::state::GroupState;

/// Snapshot format version (increment when the layout changes).
pub const SNAPSHOT_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct SnapshotData {
    version: u32,
    ledger: Ledger,
    groups: BTreeMap<String, GroupState>,
}

/// A snapshot failure. Encode/decode problems carry the underlying
/// bincode message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SnapshotError {
    Encode(String),
    Decode(String),
    /// The snapshot was written by an incompatible engine version.
    VersionMismatch { found: u32, expected: u32 },
}

impl fmt::Display for SnapshotError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SnapshotError::Encode(msg) => write!(f, "snapshot encode failed: {msg}"),
            SnapshotError::Decode(msg) => write!(f, "snapshot decode failed: {msg}"),
            SnapshotError::VersionMismatch { found, expected } => {
                write!(f, "snapshot version {found}, expected {expected}")
            }
        }
    }
}

impl std::error::Error for SnapshotError {}

/// Write a session's mutable state to `writer`.
pub fn save_session<W: Write>(session: &Session, writer: W) -> Result<(), SnapshotError> {
    let data = SnapshotData {
        version: SNAPSHOT_VERSION,
        ledger: session.ledger.clone(),
        groups: session.groups.clone(),
    };
    bincode::serialize_into(writer, &data).map_err(|e| SnapshotError::Encode(e.to_string()))
}

/// Replace a session's mutable state with a previously saved snapshot.
/// The session keeps its loaded configurations.
pub fn load_session<R: Read>(session: &mut Session, reader: R) -> Result<(), SnapshotError> {
    let data: SnapshotData =
        bincode::deserialize_from(reader).map_err(|e| SnapshotError::Decode(e.to_string()))?;
    if data.version != SNAPSHOT_VERSION {
        return Err(SnapshotError::VersionMismatch {
            found: data.version,
            expected: SNAPSHOT_VERSION,
        });
    }
    session.ledger = data.ledger;
    session.groups = data.groups;
    Ok(())
}
