//! The five pipeline stages, each an `impl` block on the engine.

mod check;
mod expand;
mod search;
mod structure;
mod write;
