//! Script domain types persisted as JSON artifacts.
//!
//! Field names are part of the on-disk contract shared with the companion UI
//! (`STRUCTURE/script_structure.json`, `SCENARIO/scenario.json`), so they keep
//! the `serie_*` spelling.

use serde::{Deserialize, Serialize};
use serde_json::json;

/// Outline of a single chapter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChapterStructure {
    /// 1-based position inside the series
    pub chapter_number: u32,
    /// Chapter title
    pub chapter_name: String,
    /// What happens in the chapter
    pub chapter_description: String,
}

/// Chapter outline with a stable identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChapterStructureWithId {
    /// 1-based position inside the series
    pub chapter_number: u32,
    /// Chapter title
    pub chapter_name: String,
    /// What happens in the chapter
    pub chapter_description: String,
    /// UUID v4 string
    pub chapter_id: String,
}

/// Outline of one series (episode) as returned by the structure stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptStructure {
    /// 1-based series number
    pub serie_number: u32,
    /// Series title
    pub serie_name: String,
    /// Chapters in order
    pub content: Vec<ChapterStructure>,
}

/// Series outline with identifiers, as stored in `script_structure.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptStructureWithId {
    /// 1-based series number
    pub serie_number: u32,
    /// Series title
    pub serie_name: String,
    /// Chapters in order
    pub content: Vec<ChapterStructureWithId>,
    /// UUID v4 string
    pub serie_id: String,
}

/// Chapter outline together with its written text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChapterText {
    /// 1-based position inside the series
    pub chapter_number: u32,
    /// Chapter title
    pub chapter_name: String,
    /// What happens in the chapter
    pub chapter_description: String,
    /// Written text; empty until the chapter has been generated
    #[serde(default)]
    pub text: String,
}

/// A written series, as stored in `scenario.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioStructure {
    /// 1-based series number
    pub serie_number: u32,
    /// Series title
    pub serie_name: String,
    /// Chapters with text
    pub content: Vec<ChapterText>,
}

impl ChapterStructure {
    /// Attaches a freshly generated identifier.
    pub fn with_id(self) -> ChapterStructureWithId {
        ChapterStructureWithId {
            chapter_number: self.chapter_number,
            chapter_name: self.chapter_name,
            chapter_description: self.chapter_description,
            chapter_id: uuid::Uuid::new_v4().to_string(),
        }
    }
}

impl ScriptStructure {
    /// Attaches identifiers to the series and every chapter.
    pub fn with_ids(self) -> ScriptStructureWithId {
        ScriptStructureWithId {
            serie_number: self.serie_number,
            serie_name: self.serie_name,
            content: self
                .content
                .into_iter()
                .map(ChapterStructure::with_id)
                .collect(),
            serie_id: uuid::Uuid::new_v4().to_string(),
        }
    }
}

impl From<&ChapterStructureWithId> for ChapterText {
    fn from(chapter: &ChapterStructureWithId) -> Self {
        Self {
            chapter_number: chapter.chapter_number,
            chapter_name: chapter.chapter_name.clone(),
            chapter_description: chapter.chapter_description.clone(),
            text: String::new(),
        }
    }
}

impl From<&ScriptStructureWithId> for ScenarioStructure {
    fn from(serie: &ScriptStructureWithId) -> Self {
        Self {
            serie_number: serie.serie_number,
            serie_name: serie.serie_name.clone(),
            content: serie.content.iter().map(ChapterText::from).collect(),
        }
    }
}

impl ScenarioStructure {
    /// True when every chapter has text.
    pub fn is_complete(&self) -> bool {
        self.content.iter().all(|c| !c.text.trim().is_empty())
    }
}

/// Sorts series by number and renumbers chapters `1..=n` inside each series.
///
/// # Examples
///
/// ```
/// use scenarist_core::{ChapterStructure, ScriptStructure, normalize_structures};
///
/// let chapter = |n: u32| ChapterStructure {
///     chapter_number: n,
///     chapter_name: format!("Chapter {n}"),
///     chapter_description: String::new(),
/// };
/// let series = vec![
///     ScriptStructure { serie_number: 2, serie_name: "Aftermath".into(), content: vec![chapter(7)] },
///     ScriptStructure { serie_number: 1, serie_name: "Origins".into(), content: vec![chapter(3), chapter(9)] },
/// ];
///
/// let normalized = normalize_structures(series);
/// assert_eq!(normalized[0].serie_name, "Origins");
/// assert_eq!(normalized[0].content[1].chapter_number, 2);
/// assert_eq!(normalized[1].content[0].chapter_number, 1);
/// ```
pub fn normalize_structures(mut series: Vec<ScriptStructure>) -> Vec<ScriptStructure> {
    series.sort_by_key(|s| s.serie_number);
    for serie in &mut series {
        for (index, chapter) in serie.content.iter_mut().enumerate() {
            chapter.chapter_number = index as u32 + 1;
        }
    }
    series
}

/// Response schema for a list of [`ScriptStructure`], in the OpenAPI subset
/// accepted by the Gemini `responseSchema` field.
pub fn script_structure_schema() -> serde_json::Value {
    json!({
        "type": "ARRAY",
        "items": {
            "type": "OBJECT",
            "properties": {
                "serie_number": { "type": "INTEGER" },
                "serie_name": { "type": "STRING" },
                "content": {
                    "type": "ARRAY",
                    "items": {
                        "type": "OBJECT",
                        "properties": {
                            "chapter_number": { "type": "INTEGER" },
                            "chapter_name": { "type": "STRING" },
                            "chapter_description": { "type": "STRING" }
                        },
                        "required": ["chapter_number", "chapter_name", "chapter_description"],
                        "propertyOrdering": ["chapter_number", "chapter_name", "chapter_description"]
                    }
                }
            },
            "required": ["serie_number", "serie_name", "content"],
            "propertyOrdering": ["serie_number", "serie_name", "content"]
        }
    })
}
