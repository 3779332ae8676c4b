//! Settings loader, schema types and write-back.
//!
//! Settings are layered: the base file (embedded defaults or an explicit
//! path), then the optional override file, then `BUZZQUIZ__` environment
//! variables. The merged result is one immutable snapshot; only the fields
//! the operator can change during a session are written back at teardown.

mod load;
mod save;
mod schema;

pub use load::*;
pub use save::persist_overrides;
pub use schema::*;

#[cfg(test)]
mod tests;
