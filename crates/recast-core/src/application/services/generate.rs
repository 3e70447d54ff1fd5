//! Generate a project from a template source.

use std::path::Path;

use tracing::{info, instrument, warn};

use crate::{
    application::{
        ApplicationError,
        services::{
            GenerateOptions, GenerateReport, GeneratedFile, ProjectService, WriteAction,
            answers::AnswerOptions,
        },
    },
    domain::{DataContext, PROVENANCE_FILE, ProvenanceRecord, RenderedTree},
    error::RecastResult,
};

impl ProjectService {
    /// Render `source` into `destination`.
    ///
    /// Fails fast. On failure nothing is recorded, and a destination that
    /// did not exist beforehand is removed again.
    #[instrument(
        skip_all,
        fields(
            source = %source.display(),
            destination = %destination.display(),
            pretend = options.pretend,
        )
    )]
    pub fn generate(
        &self,
        source: &Path,
        destination: &Path,
        data: &DataContext,
        options: &GenerateOptions,
    ) -> RecastResult<GenerateReport> {
        let template = self.load_template(source)?;
        info!(template = %template.id, "Generating project");

        let provenance_path = destination.join(PROVENANCE_FILE);
        if !options.force && self.filesystem.exists(&provenance_path) {
            return Err(ApplicationError::DestinationConflict {
                path: destination.to_path_buf(),
                reason: "already generated by recast; use `recast update`".into(),
            }
            .into());
        }

        let answers = self.resolve_answers(
            &template,
            &DataContext::new(),
            data,
            AnswerOptions {
                use_defaults: options.use_defaults,
                strict: options.strict,
            },
        )?;

        let ctx = Self::render_context(&template, &answers);
        let tree = self.render_tree(&template, &ctx)?;
        let files = self.plan_writes(destination, &tree, options.force)?;

        let record = ProvenanceRecord::new(&template, &answers, tree.hashes());
        let report = GenerateReport {
            template: template.id.name().to_string(),
            version: template.id.version().to_string(),
            destination: destination.to_path_buf(),
            pretend: options.pretend,
            files,
            answers: record.answers.clone(),
        };

        if options.pretend {
            info!(files = report.files.len(), "Pretend mode, nothing written");
            return Ok(report);
        }

        let existed = self.filesystem.exists(destination);
        match self.write_generated(destination, &tree, &report.files, &record) {
            Ok(()) => {
                info!(files = report.files.len(), "Project generated");
                Ok(report)
            }
            Err(e) => {
                if existed {
                    warn!("Write failed; destination existed before, leaving it in place");
                } else {
                    warn!("Write failed, attempting rollback");
                    self.rollback(destination);
                }
                Err(e)
            }
        }
    }

    /// Classify each rendered file against what is already at the destination.
    fn plan_writes(
        &self,
        destination: &Path,
        tree: &RenderedTree,
        force: bool,
    ) -> RecastResult<Vec<GeneratedFile>> {
        let mut files = Vec::with_capacity(tree.file_count());

        for (path, file) in tree.files() {
            let target = path.under(destination);

            if self.filesystem.is_dir(&target) {
                return Err(ApplicationError::DestinationConflict {
                    path: target,
                    reason: "a directory is in the way of a generated file".into(),
                }
                .into());
            }

            let action = match self.filesystem.read_file(&target)? {
                None => WriteAction::Created,
                Some(existing) if existing == file.content => WriteAction::Identical,
                Some(_) if force => WriteAction::Overwritten,
                Some(_) => {
                    return Err(ApplicationError::DestinationConflict {
                        path: target,
                        reason: "file exists with different content (use --force)".into(),
                    }
                    .into());
                }
            };

            files.push(GeneratedFile {
                path: path.to_string(),
                action,
            });
        }

        Ok(files)
    }

    fn write_generated(
        &self,
        destination: &Path,
        tree: &RenderedTree,
        planned: &[GeneratedFile],
        record: &ProvenanceRecord,
    ) -> RecastResult<()> {
        self.filesystem.create_dir_all(destination)?;

        for dir in tree.directories() {
            self.filesystem.create_dir_all(&dir.under(destination))?;
        }

        for ((path, file), plan) in tree.files().zip(planned) {
            if plan.action == WriteAction::Identical {
                continue;
            }
            self.write_one(&path.under(destination), &file.content, file.permissions)?;
        }

        // Last: its presence marks a complete generation.
        let text = record.to_toml()?;
        self.filesystem
            .write_file(&destination.join(PROVENANCE_FILE), text.as_bytes())?;

        Ok(())
    }

    /// Best-effort rollback on failure.
    fn rollback(&self, root: &Path) {
        if let Err(e) = self.filesystem.remove_dir_all(root) {
            warn!(
                error = %e,
                path = %root.display(),
                "Rollback failed"
            );
        } else {
            info!("Rollback successful");
        }
    }
}
