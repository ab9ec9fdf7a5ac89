//! Byte-valued key-value store used alongside the benchmark harness.
//!
//! `MemoryStore` keeps entries in process and `store-server` exposes one over HTTP;
//! `HttpStore` talks to such a server. `spawn_eviction` runs periodic regex eviction against
//! either until its `CancellationToken` is cancelled.

mod client;
mod errors;
mod eviction;
mod server;
mod smoke;
mod store;

pub use client::*;
pub use errors::*;
pub use eviction::*;
pub use server::*;
pub use smoke::*;
pub use store::*;

#[cfg(test)]
mod tests;
