//! Core data types for the Scenarist script-writing pipeline.
//!
//! This crate provides the request/response types exchanged with LLM drivers,
//! the script domain types persisted as JSON artifacts, and the small enums
//! (stages, fact-finding algorithms, permission levels) shared by every layer.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod algorithm;
mod attachment;
mod permission;
mod request;
mod script;
mod stage;

pub use algorithm::FactsAlgorithm;
pub use attachment::{Attachment, AttachmentMime};
pub use permission::PermissionLevel;
pub use request::{GenerateRequest, GenerateRequestBuilder, GenerateResponse, TokenUsage};
pub use script::{
    ChapterStructure, ChapterStructureWithId, ChapterText, ScenarioStructure, ScriptStructure,
    ScriptStructureWithId, normalize_structures, script_structure_schema,
};
pub use stage::Stage;
