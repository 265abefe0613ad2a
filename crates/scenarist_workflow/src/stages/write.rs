use crate::{StageReport, WorkflowEngine, WriteOptions};
use scenarist_core::{ScenarioStructure, ScriptStructureWithId, Stage};
use scenarist_error::{ScenaristResult, WorkflowError, WorkflowErrorKind};
use scenarist_interface::LlmDriver;
use scenarist_storage::{ArtifactStore, ArtifactStoreExt, ProjectLayout, write_scenario_documents};
use std::fmt::Write as _;

const FIRST_CHAPTER: &str = "This is the first chapter of the episode.";

impl<D: LlmDriver, S: ArtifactStore> WorkflowEngine<D, S> {
    /// Stage 5: write every chapter of `script_structure.json`.
    ///
    /// `SCENARIO/scenario.json` is checkpointed after each chapter. Chapters
    /// that already have text there are kept, so a failed run resumes where
    /// it stopped. Finishes with `scenario.txt` and one Markdown file per
    /// series.
    #[tracing::instrument(skip(self, layout, options), fields(project = %layout.root().display()))]
    pub async fn write_script_text(
        &self,
        layout: &ProjectLayout,
        options: &WriteOptions,
    ) -> ScenaristResult<StageReport> {
        let mut report = StageReport::new(Stage::Write, None);
        let structure_path = layout.structure_json();
        self.require(&structure_path, "write", "structure").await?;

        let structure: Vec<ScriptStructureWithId> = self.store.read_json(&structure_path).await?;
        if structure.iter().all(|s| s.content.is_empty()) {
            return Err(WorkflowError::new(WorkflowErrorKind::EmptyStructure).into());
        }

        let scenario_path = layout.scenario_json();
        let mut scenario: Vec<ScenarioStructure> =
            structure.iter().map(ScenarioStructure::from).collect();
        if let Some(previous) = self.previous_scenario(layout).await? {
            let restored = restore_written(&mut scenario, &previous);
            tracing::info!(restored, "Resuming from existing scenario");
        }

        let checked = self.checked_attachments(layout).await?;
        let temperature = options
            .temperature
            .unwrap_or(*self.config.write_temperature());
        let max_output_tokens = options
            .max_output_tokens
            .unwrap_or(*self.config.max_output_tokens());
        let continuity_chars = *self.config.continuity_chars();

        for serie_index in 0..scenario.len() {
            let outline = serie_outline(&scenario[serie_index]);
            for chapter_index in 0..scenario[serie_index].content.len() {
                let serie = &scenario[serie_index];
                let chapter = &serie.content[chapter_index];
                if !chapter.text.trim().is_empty() {
                    continue;
                }

                let previous_text = match chapter_index.checked_sub(1) {
                    Some(prev) => tail_chars(&serie.content[prev].text, continuity_chars),
                    None => FIRST_CHAPTER.to_string(),
                };
                let serie_number = serie.serie_number.to_string();
                let chapter_number = chapter.chapter_number.to_string();
                let prompt = self.prompts.render(
                    "write_chapter",
                    &[
                        ("serie_number", serie_number.as_str()),
                        ("serie_name", serie.serie_name.as_str()),
                        ("serie_outline", outline.as_str()),
                        ("chapter_number", chapter_number.as_str()),
                        ("chapter_name", chapter.chapter_name.as_str()),
                        ("chapter_description", chapter.chapter_description.as_str()),
                        ("previous_text", previous_text.as_str()),
                    ],
                )?;

                let mut builder = self.request(prompt, checked.clone(), temperature, max_output_tokens);
                if let Some(model) = &options.model {
                    builder.model(Some(model.clone()));
                }
                let request = builder.build()?;

                let response = self.call_llm(&request).await?;
                report.record_call(response.usage);
                tracing::info!(
                    serie = %serie_number,
                    chapter = %chapter_number,
                    tokens = response.usage.total_tokens,
                    "Chapter written"
                );

                scenario[serie_index].content[chapter_index].text = response.text;
                self.store.write_json(&scenario_path, &scenario).await?;
            }
        }

        self.store.write_json(&scenario_path, &scenario).await?;
        report.outputs.push(scenario_path);

        let txt_path = layout.scenario_txt();
        self.store
            .write_text(&txt_path, &render_plain_text(&scenario))
            .await?;
        report.outputs.push(txt_path);

        let documents = write_scenario_documents(&self.store, layout, &scenario).await?;
        report.outputs.extend(documents);
        Ok(report)
    }

    async fn previous_scenario(
        &self,
        layout: &ProjectLayout,
    ) -> ScenaristResult<Option<Vec<ScenarioStructure>>> {
        let path = layout.scenario_json();
        if !self.store.exists(&path).await? {
            return Ok(None);
        }
        match self.store.read_json(&path).await {
            Ok(previous) => Ok(Some(previous)),
            Err(e) => {
                tracing::warn!(error = %e, "Ignoring unreadable scenario checkpoint");
                Ok(None)
            }
        }
    }
}

/// Copy text of chapters whose series number, chapter number and name still
/// match the structure. Returns the number of chapters restored.
fn restore_written(scenario: &mut [ScenarioStructure], previous: &[ScenarioStructure]) -> usize {
    let mut restored = 0;
    for serie in scenario.iter_mut() {
        let Some(old) = previous
            .iter()
            .find(|p| p.serie_number == serie.serie_number)
        else {
            continue;
        };
        for chapter in serie.content.iter_mut() {
            let written = old.content.iter().find(|c| {
                c.chapter_number == chapter.chapter_number
                    && c.chapter_name == chapter.chapter_name
                    && !c.text.trim().is_empty()
            });
            if let Some(written) = written {
                chapter.text = written.text.clone();
                restored += 1;
            }
        }
    }
    restored
}

fn serie_outline(serie: &ScenarioStructure) -> String {
    let mut out = String::new();
    for chapter in &serie.content {
        let _ = writeln!(
            out,
            "{}. {}: {}",
            chapter.chapter_number, chapter.chapter_name, chapter.chapter_description
        );
    }
    out.trim_end().to_string()
}

/// Last `max_chars` characters of `text`, cut on a char boundary.
fn tail_chars(text: &str, max_chars: usize) -> String {
    let text = text.trim_end();
    let count = text.chars().count();
    if count <= max_chars {
        return text.to_string();
    }
    text.chars().skip(count - max_chars).collect()
}

fn render_plain_text(scenario: &[ScenarioStructure]) -> String {
    let mut out = String::new();
    for serie in scenario {
        let _ = writeln!(out, "Serie {}. {}", serie.serie_number, serie.serie_name);
        for chapter in &serie.content {
            let _ = write!(
                out,
                "\nChapter {}. {}\n{}\n\n{}\n",
                chapter.chapter_number,
                chapter.chapter_name,
                chapter.chapter_description,
                chapter.text.trim_end()
            );
        }
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tail_respects_char_boundaries() {
        assert_eq!(tail_chars("Привет мир", 3), "мир");
        assert_eq!(tail_chars("short\n", 100), "short");
    }

    #[test]
    fn plain_text_lists_every_chapter() {
        let scenario = vec![ScenarioStructure {
            serie_number: 1,
            serie_name: "Origins".into(),
            content: vec![scenarist_core::ChapterText {
                chapter_number: 1,
                chapter_name: "Harbour".into(),
                chapter_description: "Ships gather.".into(),
                text: "Narration.".into(),
            }],
        }];
        assert_eq!(
            render_plain_text(&scenario),
            "Serie 1. Origins\n\nChapter 1. Harbour\nShips gather.\n\nNarration.\n\n"
        );
    }
}
