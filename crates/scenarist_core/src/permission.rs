//! Project permission levels.

use serde::{Deserialize, Serialize};

/// Access level granted on a project.
///
/// Levels are ordered: `Read < Write < Admin`, so a user holding a level
/// satisfies every requirement at or below it.
///
/// # Examples
///
/// ```
/// use scenarist_core::PermissionLevel;
/// use std::str::FromStr;
///
/// let level = PermissionLevel::from_str("WRITE").unwrap();
/// assert!(level.satisfies(PermissionLevel::Read));
/// assert!(!level.satisfies(PermissionLevel::Admin));
/// assert_eq!(level.to_string(), "WRITE");
/// ```
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Default,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
    strum::AsRefStr,
)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
pub enum PermissionLevel {
    /// May read project files
    #[default]
    Read,
    /// May run stages and edit files
    Write,
    /// Full control
    Admin,
}

impl PermissionLevel {
    /// True when this level is at least `required`.
    pub fn satisfies(self, required: PermissionLevel) -> bool {
        self >= required
    }
}
