//! Wrappers for the structured events the protocol core emits.
//!
//! Each function emits one kind of event under its own target: `PDU` for
//! PDUs crossing the codec, `NNST` for forwarding table changes and `LIMITS`
//! for admission gates.

use crate::{face::FaceId, name::Name, pdus::PduType};
use std::{
    fs::{create_dir_all, OpenOptions},
    io,
    path::Path,
    sync::Arc,
};
use tracing::{event, Level};
use tracing_subscriber::FmtSubscriber;

/// Installs a JSON subscriber that appends every event to
/// `dir/debug-<date>.log`. Only call this once, when the simulation starts.
pub fn init_events(dir: impl AsRef<Path>) -> io::Result<()> {
    let dir = dir.as_ref();
    create_dir_all(dir)?;
    let file_path = dir.join(format!(
        "debug-{}.log",
        chrono::offset::Local::now().format("%y-%m-%d")
    ));
    let file = OpenOptions::new()
        .append(true)
        .create(true)
        .open(file_path)?;
    let subscriber = FmtSubscriber::builder()
        .with_writer(Arc::new(file))
        .json()
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| io::Error::new(io::ErrorKind::AlreadyExists, e))
}

/// Which way a PDU crossed the codec.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Direction {
    Encoded,
    Decoded,
}

/// A PDU was turned into bytes or parsed from them.
pub(crate) fn pdu_event(direction: Direction, pdu: PduType, octets: usize, cached: bool) {
    event!(
        target: "PDU",
        Level::TRACE,
        direction = ?direction,
        pdu = %pdu,
        octets,
        cached
    );
}

/// The forwarding table of `node` changed the entry for `name`.
pub(crate) fn nnst_event(node: u64, operation: &'static str, name: &Name, faces: usize) {
    event!(
        target: "NNST",
        Level::DEBUG,
        node,
        operation,
        name = %name,
        faces
    );
}

/// The admission gate on `face` changed state.
pub(crate) fn limit_event(face: FaceId, transition: &'static str, level: f64, limit: f64) {
    event!(
        target: "LIMITS",
        Level::TRACE,
        face = face.0,
        transition,
        level,
        limit
    );
}
