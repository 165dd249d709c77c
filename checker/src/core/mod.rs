//! Deterministic, pure logic shared by the checker.
//!
//! Core modules must be free of I/O side effects. They operate on in-memory
//! data structures and return deterministic outputs suitable for tests.

pub mod inputs;
pub mod outcome;
pub mod reference;
pub mod shape;
pub mod types;
