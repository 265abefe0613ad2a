use crate::{StageReport, WorkflowEngine};
use scenarist_core::{FactsAlgorithm, Stage};
use scenarist_error::ScenaristResult;
use scenarist_interface::LlmDriver;
use scenarist_storage::{ArtifactStore, ProjectLayout};

impl<D: LlmDriver, S: ArtifactStore> WorkflowEngine<D, S> {
    /// Stage 3: verify merged hypotheses with web search into `CHECK/checked.txt`.
    #[tracing::instrument(
        skip(self, layout),
        fields(project = %layout.root().display(), algorithm = %algorithm)
    )]
    pub async fn check_hypotheses(
        &self,
        layout: &ProjectLayout,
        algorithm: FactsAlgorithm,
    ) -> ScenaristResult<StageReport> {
        let mut report = StageReport::new(Stage::Check, Some(algorithm));
        let hypotheses = layout.hypotheses_file(algorithm);
        self.require(&hypotheses, "check", "search").await?;

        let attachment = self.text_attachment(&hypotheses, "hypotheses.txt").await?;
        let prompt = self
            .prompts
            .render(&format!("check_{}", algorithm.prompt_key()), &[])?;
        let request = self
            .request(
                prompt,
                vec![attachment],
                *self.config.check_temperature(),
                *self.config.max_output_tokens(),
            )
            .web_search(true)
            .thinking(true)
            .build()?;

        let response = self.call_llm(&request).await?;
        report.record_call(response.usage);

        let output = layout.checked_file(algorithm);
        self.store.write_text(&output, &response.text).await?;
        tracing::info!(tokens = response.usage.total_tokens, "Checked hypotheses");

        report.outputs.push(output);
        Ok(report)
    }
}
