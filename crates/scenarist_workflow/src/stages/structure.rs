use crate::engine::check_series_count;
use crate::{StageReport, WorkflowEngine};
use scenarist_core::{
    Attachment, FactsAlgorithm, ScriptStructure, ScriptStructureWithId, Stage,
    normalize_structures, script_structure_schema,
};
use scenarist_error::{ScenaristResult, WorkflowError, WorkflowErrorKind};
use scenarist_interface::LlmDriver;
use scenarist_storage::{ArtifactStore, ArtifactStoreExt, ProjectLayout};
use strum::IntoEnumIterator;

impl<D: LlmDriver, S: ArtifactStore> WorkflowEngine<D, S> {
    /// Stage 4: outline `num_series` episodes as `STRUCTURE/script_structure.json`.
    ///
    /// The raw model text is always kept in `script_structure.txt`, even
    /// when it fails to parse.
    #[tracing::instrument(skip(self, layout), fields(project = %layout.root().display()))]
    pub async fn build_script_structure(
        &self,
        layout: &ProjectLayout,
        num_series: u32,
    ) -> ScenaristResult<StageReport> {
        check_series_count(num_series)?;
        let mut report = StageReport::new(Stage::Structure, None);

        let checked = self.checked_attachments(layout).await?;
        if checked.is_empty() {
            self.require(
                &layout.checked_file(FactsAlgorithm::Main),
                "structure",
                "check",
            )
            .await?;
        }
        let mut attachments = self.source_attachments(layout).await?;
        attachments.extend(checked);

        let num_series_text = num_series.to_string();
        let prompt = self
            .prompts
            .render("structure", &[("num_series", num_series_text.as_str())])?;
        let schema = script_structure_schema();
        let request = self
            .request(
                prompt,
                attachments,
                *self.config.structure_temperature(),
                *self.config.structure_max_output_tokens(),
            )
            .build()?;

        let response = self.structured_call_llm(&request, &schema).await?;
        report.record_call(response.usage);

        let raw_path = layout.structure_txt();
        self.store.write_text(&raw_path, &response.text).await?;
        report.outputs.push(raw_path);

        let parsed = response.parsed.ok_or_else(|| invalid("response is not valid JSON"))?;
        let series: Vec<ScriptStructure> =
            serde_json::from_value(parsed).map_err(|e| invalid(&e.to_string()))?;
        if series.iter().all(|s| s.content.is_empty()) {
            return Err(WorkflowError::new(WorkflowErrorKind::EmptyStructure).into());
        }
        if series.len() != num_series as usize {
            tracing::warn!(
                requested = num_series,
                received = series.len(),
                "Series count differs from request"
            );
        }

        let structure: Vec<ScriptStructureWithId> = normalize_structures(series)
            .into_iter()
            .map(ScriptStructure::with_ids)
            .collect();
        let json_path = layout.structure_json();
        self.store.write_json(&json_path, &structure).await?;

        let chapters: usize = structure.iter().map(|s| s.content.len()).sum();
        tracing::info!(series = structure.len(), chapters, "Script structure saved");

        report.outputs.push(json_path);
        Ok(report)
    }

    /// `checked.txt` of every algorithm that has one.
    pub(crate) async fn checked_attachments(
        &self,
        layout: &ProjectLayout,
    ) -> ScenaristResult<Vec<Attachment>> {
        let mut attachments = Vec::new();
        for algorithm in FactsAlgorithm::iter() {
            let path = layout.checked_file(algorithm);
            if let Some(content) = self.store.read_optional_text(&path).await? {
                let name = format!("checked_{}.txt", algorithm.stage_suffix());
                attachments.push(Attachment::text(name, content));
            }
        }
        Ok(attachments)
    }
}

fn invalid(message: &str) -> WorkflowError {
    WorkflowError::new(WorkflowErrorKind::StructuredOutputInvalid {
        stage: Stage::Structure.to_string(),
        message: message.to_string(),
    })
}
