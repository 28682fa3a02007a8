//! Track-subsystem error type.
//!
//! Only lookups and explicit signal placement are fallible.  Degenerate edit
//! requests are rejected with `None`, and broken invariants panic.

use thiserror::Error;

use rn_core::{NodeId, SegmentId, SignalId};

/// Errors produced by `rn-track`.
#[derive(Debug, Error)]
pub enum TrackError {
    #[error("node {0} not found in graph")]
    NodeNotFound(NodeId),

    #[error("segment {0} not found in graph")]
    SegmentNotFound(SegmentId),

    #[error("signal {0} not found in graph")]
    SignalNotFound(SignalId),

    #[error("node {0} has been removed from the network")]
    NodeRetired(NodeId),

    #[error("segment {0} has been removed from the network")]
    SegmentRemoved(SegmentId),

    #[error("node {node} already hosts {signal}")]
    SignalExists { node: NodeId, signal: SignalId },
}

pub type TrackResult<T> = Result<T, TrackError>;
