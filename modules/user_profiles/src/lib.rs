// === PUBLIC CONTRACT ===
// Other crates consume the record type, the capability traits and the client API.
pub mod contract;

pub use contract::{capabilities, client, error, model};

// === INTERNAL MODULES ===
// Exposed for wiring (CLI) and for comprehensive testing.
// Consumers that only need records should stick to `contract`.
pub mod config;
#[doc(hidden)]
pub mod domain;
#[doc(hidden)]
pub mod gateways;
#[doc(hidden)]
pub mod infra;
