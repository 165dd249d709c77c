//! Homework checker for the sum-of-products workflow tutorial.
//!
//! The checker sanity-checks a user-authored workflow definition, then runs it
//! through an external workflow engine several times with randomized inputs,
//! comparing what the workflow computed against an independently computed
//! reference value. The architecture keeps a strict separation:
//!
//! - **[`core`]**: Pure, deterministic logic (reference calculator, input
//!   generation, workflow shape rules). No I/O, fully testable in isolation.
//! - **[`io`]**: Side-effecting operations (config files, workflow loading,
//!   process execution, on-disk artifacts). Isolated behind traits so tests can
//!   substitute scripted fakes.
//!
//! Orchestration modules ([`validate`], [`execute`], [`trial`]) coordinate core
//! logic with I/O to implement the `check-homework` command.

pub mod core;
pub mod error;
pub mod execute;
pub mod exit_codes;
pub mod io;
pub mod logging;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
pub mod trial;
pub mod validate;
