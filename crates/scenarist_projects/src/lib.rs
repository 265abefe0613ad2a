//! Project ownership, sharing and access control.
//!
//! [`ProjectService`] applies the access rules on top of any
//! [`ProjectStore`](scenarist_interface::ProjectStore): owners always hold
//! `WRITE`, other users hold whatever their `project_access` row grants, and
//! only owners may share or delete. It also keeps project folders on disk in
//! step with the rows that describe them.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod memory;
mod service;

pub use memory::InMemoryProjectStore;
pub use service::ProjectService;
