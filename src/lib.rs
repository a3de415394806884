//! Qaboom (workspace facade crate).
//!
//! Re-exports the workspace crates under one name so the runner, benches and
//! integration tests can use `qaboom::{core,input,term,types}`.

pub use qaboom_core as core;
pub use qaboom_input as input;
pub use qaboom_term as term;
pub use qaboom_types as types;
