//! Engine modules: the pure logic that decides what to do with a volume.
//!
//! The engine layer sits between discovery (what a volume looks like now) and
//! execution (which calls the region worker issues). It never talks to a
//! provider.

pub mod decision;

pub use decision::{Decision, DecisionPolicy, Rule, decide, evaluate};
