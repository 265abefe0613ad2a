use crate::{HypothesisSet, StageReport, WorkflowEngine};
use scenarist_core::{FactsAlgorithm, Stage};
use scenarist_error::ScenaristResult;
use scenarist_interface::LlmDriver;
use scenarist_storage::{ArtifactStore, ProjectLayout};

const NO_FINDINGS: &str = "None yet.";

impl<D: LlmDriver, S: ArtifactStore> WorkflowEngine<D, S> {
    /// Stage 2: multi-lens hypothesis search.
    ///
    /// Lens `i` sees the expanded database plus the merged findings of lenses
    /// `1..i`. Each lens output lands in `HYP/lens_NN.txt` as soon as it
    /// returns, and `HYP/hypotheses.txt` is rewritten after every lens. With
    /// `resume` set, existing lens files are reused instead of re-queried.
    #[tracing::instrument(
        skip(self, layout),
        fields(project = %layout.root().display(), algorithm = %algorithm)
    )]
    pub async fn find_connections(
        &self,
        layout: &ProjectLayout,
        algorithm: FactsAlgorithm,
    ) -> ScenaristResult<StageReport> {
        let mut report = StageReport::new(Stage::Search, Some(algorithm));
        let db_extension = layout.db_extension();
        self.require(&db_extension, "search", "expand").await?;
        let database = self
            .text_attachment(&db_extension, "db_extension.txt")
            .await?;

        let prompt_key = format!("search_{}", algorithm.prompt_key());
        let lens_count = self.config.lens_count(algorithm);
        let lens_count_text = lens_count.to_string();
        let hypotheses_path = layout.hypotheses_file(algorithm);
        let mut merged = HypothesisSet::new();

        for lens in 1..=lens_count {
            let lens_path = layout.lens_file(algorithm, lens);

            let existing = if *self.config.resume() {
                self.store.read_optional_text(&lens_path).await?
            } else {
                None
            };

            let output = match existing {
                Some(text) => {
                    tracing::info!(lens, "Reusing existing lens output");
                    text
                }
                None => {
                    let findings = if merged.is_empty() {
                        NO_FINDINGS.to_string()
                    } else {
                        merged.render()
                    };
                    let lens_text = lens.to_string();
                    let prompt = self.prompts.render(
                        &prompt_key,
                        &[
                            ("lens_number", lens_text.as_str()),
                            ("lens_count", lens_count_text.as_str()),
                            ("lens_focus", self.prompts.lens_focus(algorithm, lens)),
                            ("previous_findings", findings.as_str()),
                        ],
                    )?;
                    let request = self
                        .request(
                            prompt,
                            vec![database.clone()],
                            *self.config.search_temperature(),
                            *self.config.max_output_tokens(),
                        )
                        .thinking(true)
                        .build()?;

                    let response = self.call_llm(&request).await?;
                    report.record_call(response.usage);
                    self.store.write_text(&lens_path, &response.text).await?;
                    report.outputs.push(lens_path);
                    response.text
                }
            };

            let added = merged.merge(&output);
            self.store
                .write_text(&hypotheses_path, &merged.render())
                .await?;
            tracing::info!(lens, added, total = merged.len(), "Lens merged");
        }

        report.outputs.push(hypotheses_path);
        Ok(report)
    }
}
