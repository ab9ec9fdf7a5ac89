//! Latency and correctness benchmark for the equal-split all-to-all collective.
//!
//! - Payload: every rank builds a distinct, strictly increasing range of elements
//! - Exchange: one all-to-all through an injected `MPIEngine`, followed by a synchronization step
//! - Timer: a barrier in front of every measured exchange
//! - Verifier: spot-checks the first and last few output elements against closed-form values
//! - Driver: single-shot and repeated-iteration runs built from the pieces above
//!
//! Every rank must run the same configuration. Validation happens before the first collective,
//! so a bad configuration fails on all ranks instead of leaving some of them blocked.

mod config;
mod driver;
mod element;
mod errors;
mod exchange;
mod launch;
mod payload;
mod report;
mod timer;
mod verifier;

pub use config::*;
pub use driver::*;
pub use element::*;
pub use errors::*;
pub use exchange::*;
pub use launch::*;
pub use payload::*;
pub use timer::*;
pub use verifier::*;

#[cfg(test)]
mod tests;
