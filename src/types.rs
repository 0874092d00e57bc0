//! Core type definitions for the simulation framework.
//!
//! This module defines the fundamental types used throughout the simulation engine.

/// Simulation time (simulated minutes).
///
/// Time is a non-negative real scalar that only moves forward as events are
/// processed. It has no relation to wall-clock time.
pub type SimTime = f64;

/// Unique identifier for a process managed by a [`Simulation`](crate::Simulation).
///
/// Identifiers are assigned in spawn order starting at 1 and are never reused
/// within a run.
pub type ProcessId = u64;

/// Identifier for a resource pool, its index in the context's pool table.
pub type PoolId = usize;

/// Unique identifier for a resource request within one run.
pub type RequestId = u64;

/// Identifier for a vessel, assigned by the arrival generator starting at 1.
pub type VesselId = u64;
