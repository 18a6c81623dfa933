//! Core library for `msync`
//!
//! `msync` copies a file or directory tree to N hosts with pairwise rsync
//! transfers scheduled by recursive doubling: each round, every host that
//! already holds the data copies to one host that does not, so coverage
//! grows exponentially and the fleet is synced in O(log N) rounds.

pub mod dispatch;
pub mod errors;
pub mod path;
pub mod planner;
pub mod pool;
pub mod roster;
pub mod sync;

#[cfg(test)]
pub(crate) mod testutils;
