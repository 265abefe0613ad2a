use crate::{StageReport, WorkflowEngine};
use scenarist_core::Stage;
use scenarist_error::ScenaristResult;
use scenarist_interface::LlmDriver;
use scenarist_storage::{ArtifactStore, ProjectLayout};

impl<D: LlmDriver, S: ArtifactStore> WorkflowEngine<D, S> {
    /// Stage 1: extend the source database into `FACTS/db_extension.txt`.
    ///
    /// Every `DB/` document is attached to a single free-text call.
    #[tracing::instrument(skip(self, layout), fields(project = %layout.root().display()))]
    pub async fn expand_database(&self, layout: &ProjectLayout) -> ScenaristResult<StageReport> {
        let mut report = StageReport::new(Stage::Expand, None);
        let attachments = self.source_attachments(layout).await?;

        let prompt = self.prompts.render("expand", &[])?;
        let request = self
            .request(
                prompt,
                attachments,
                *self.config.expand_temperature(),
                *self.config.max_output_tokens(),
            )
            .build()?;

        let response = self.call_llm(&request).await?;
        report.record_call(response.usage);

        let output = layout.db_extension();
        self.store.write_text(&output, &response.text).await?;
        tracing::info!(
            chars = response.text.len(),
            tokens = response.usage.total_tokens,
            "Expanded source database"
        );

        report.outputs.push(output);
        Ok(report)
    }
}
