//! Reports computed from a player's stored matches and champion aggregates.
//!
//! Every generator here is a pure function of the records handed to it; loading
//! them is up to the caller.

pub mod draft;
pub mod label;
pub mod performance;
pub mod role;
pub mod smurf;
pub mod stats;
pub mod tilt;

#[cfg(test)]
pub(crate) mod fixture;
