//! The protocol core of NNN, the Name-based Network of Networks, as used by
//! the simulator's NNN nodes.
//!
//! NNN nodes are addressed by hierarchical [`Name`]s rather than fixed
//! addresses. Nodes enroll into the network to obtain a name, renew and give
//! up their names over time, and route data to each other by name. This crate
//! contains everything such a node needs that does not depend on the
//! simulation runtime itself.
//!
//! # Organization
//! - [`Name`] and [`Address`] are the value types every PDU carries
//! - [`pdus`] models each control-plane and data PDU, with [`Pdu`] as the sum
//!   over all of them
//! - [`wire`] turns PDUs into bytes and back, byte-exact with other peers
//! - [`nnst`] is the name-keyed forwarding table consulted before forwarding
//! - [`limits`] gates how many requests a face may have outstanding
//! - [`scheduler`] is the seam through which timed work reaches the
//!   simulator's event loop
//!
//! # Data flow
//!
//! Inbound bytes are decoded with [`Pdu::from_wire`]. The name carried by the
//! PDU is looked up with [`Nnst::closest_sector`] to find the next hop. The
//! outbound PDU is re-encoded with [`Pdu::to_wire`], which hands back the
//! cached encoding when nothing has changed since the last call, and is
//! passed on to the link layer.

mod logging;
pub use logging::init_events;

pub mod config;
pub use config::{LimitsConfig, NnstConfig, PduDefaults};

pub mod name;
pub use name::{Label, Name};

pub mod address;
pub use address::Address;

mod face;
pub use face::FaceId;

pub mod pdus;
pub use pdus::{NnnPdu, Pdu, PduType};

pub mod wire;
pub use wire::WireFormat;

pub mod nnst;
pub use nnst::Nnst;

pub mod limits;
pub use limits::Limits;

pub mod scheduler;
pub use scheduler::Scheduler;
