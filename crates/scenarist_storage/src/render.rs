//! Markdown rendering of written series.

use crate::{ArtifactStore, ProjectLayout};
use scenarist_core::ScenarioStructure;
use scenarist_error::ScenaristResult;
use std::fmt::Write as _;
use std::path::PathBuf;

/// Render one series as Markdown.
///
/// ```
/// use scenarist_core::{ChapterText, ScenarioStructure};
/// use scenarist_storage::render_series_markdown;
///
/// let serie = ScenarioStructure {
///     serie_number: 1,
///     serie_name: "Departure".to_string(),
///     content: vec![ChapterText {
///         chapter_number: 1,
///         chapter_name: "Reykjavik".to_string(),
///         chapter_description: "The convoy gathers.".to_string(),
///         text: "Fog over Hvalfjordur.".to_string(),
///     }],
/// };
///
/// let md = render_series_markdown(&serie);
/// assert!(md.starts_with("# 1. Departure\n"));
/// assert!(md.contains("## 1. Reykjavik\n\n*The convoy gathers.*\n\nFog over Hvalfjordur.\n"));
/// ```
pub fn render_series_markdown(serie: &ScenarioStructure) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "# {}. {}", serie.serie_number, serie.serie_name);

    for chapter in &serie.content {
        let _ = write!(
            out,
            "\n## {}. {}\n\n",
            chapter.chapter_number, chapter.chapter_name
        );
        let description = chapter.chapter_description.trim();
        if !description.is_empty() {
            let _ = write!(out, "*{}*\n\n", description);
        }
        let _ = writeln!(out, "{}", chapter.text.trim_end());
    }
    out
}

/// Write `SCENARIO/Serie_<n>_<name>.md` for every series; returns the paths.
#[tracing::instrument(skip(store, layout, scenario), fields(root = %layout.root().display(), series = scenario.len()))]
pub async fn write_scenario_documents<S: ArtifactStore + ?Sized>(
    store: &S,
    layout: &ProjectLayout,
    scenario: &[ScenarioStructure],
) -> ScenaristResult<Vec<PathBuf>> {
    let mut paths = Vec::with_capacity(scenario.len());
    for serie in scenario {
        let path = layout.serie_markdown(serie.serie_number, &serie.serie_name);
        store
            .write_text(&path, &render_series_markdown(serie))
            .await?;
        paths.push(path);
    }
    tracing::info!(documents = paths.len(), "Rendered scenario documents");
    Ok(paths)
}
