//! Update a generated project to the current template.

use std::path::{Path, PathBuf};

use tracing::{info, instrument, warn};

use crate::{
    application::{
        ApplicationError,
        services::{
            PreservedUserChange, ProjectService, UpdateOptions, UpdateReport, UpdatedFile,
            answers::AnswerOptions,
        },
    },
    domain::{
        ConflictMode, DataContext, FileAction, PROVENANCE_FILE, PreserveReason, ProvenanceRecord,
        RenderedTree, UpdatePlan,
    },
    error::RecastResult,
};

const REJ_SUFFIX: &str = ".rej";

impl ProjectService {
    /// Re-render the project's template and reconcile it with the tree.
    ///
    /// Files the user changed are never written. All checks run before the
    /// first write; provenance is rewritten last and only if it changed.
    #[instrument(
        skip_all,
        fields(project = %project.display(), pretend = options.pretend)
    )]
    pub fn update(
        &self,
        project: &Path,
        data: &DataContext,
        options: &UpdateOptions,
    ) -> RecastResult<UpdateReport> {
        let record = self.read_provenance(project)?;
        let recorded_id = record.template_id()?;

        let source = match (&options.source, &record.template.source) {
            (Some(explicit), _) => explicit.clone(),
            (None, Some(recorded)) => PathBuf::from(recorded),
            (None, None) => {
                return Err(ApplicationError::TemplateNotFound {
                    path: project.to_path_buf(),
                    reason: "provenance records no template source; pass --source".into(),
                }
                .into());
            }
        };

        let template = self.load_template(&source)?;
        template.check_upgrade_from(&recorded_id)?;
        info!(from = %recorded_id, to = %template.id, "Updating project");

        // Answers for variables the template no longer declares are dropped.
        let recorded: DataContext = record
            .answers
            .iter()
            .filter(|(name, _)| template.variable(name).is_some())
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();

        let answers = self.resolve_answers(
            &template,
            &recorded,
            data,
            AnswerOptions {
                use_defaults: options.use_defaults,
                strict: options.strict,
            },
        )?;

        let ctx = Self::render_context(&template, &answers);
        let tree = self.render_tree(&template, &ctx)?;

        let plan = UpdatePlan::build(&record.files, &tree, |path| {
            self.filesystem.read_file(&path.under(project))
        })?;

        let rejects = self.plan_rejects(project, &plan, options.conflict)?;

        let new_record = ProvenanceRecord::new(&template, &answers, plan.baselines());
        let new_text = new_record.to_toml()?;
        let provenance_changed = self
            .filesystem
            .read_file(&project.join(PROVENANCE_FILE))?
            .is_none_or(|bytes| bytes != new_text.as_bytes());

        let report = UpdateReport {
            template: template.id.name().to_string(),
            from_version: recorded_id.version().to_string(),
            to_version: template.id.version().to_string(),
            pretend: options.pretend,
            files: plan
                .files
                .iter()
                .map(|f| UpdatedFile {
                    path: f.path.to_string(),
                    status: f.status,
                    action: f.action.label(),
                })
                .collect(),
            advisories: plan
                .files
                .iter()
                .filter_map(|f| match &f.action {
                    FileAction::Preserve { reason, .. } => Some(PreservedUserChange {
                        path: f.path.to_string(),
                        reason: *reason,
                        rej: rejects
                            .iter()
                            .find(|r| r.path == f.path.as_str())
                            .map(|r| r.rej_path.clone()),
                    }),
                    _ => None,
                })
                .collect(),
            provenance_changed,
        };

        for advisory in &report.advisories {
            warn!(path = %advisory.path, reason = %advisory.reason, "Preserved user change");
        }

        if options.pretend {
            info!("Pretend mode, nothing written");
            return Ok(report);
        }

        self.apply_plan(project, &plan, &tree, &rejects)?;

        if provenance_changed {
            self.filesystem
                .write_file(&project.join(PROVENANCE_FILE), new_text.as_bytes())?;
        }

        info!(
            updated = report.count("updated"),
            created = report.count("created"),
            removed = report.count("removed"),
            preserved = report.advisories.len(),
            "Update complete"
        );
        Ok(report)
    }

    /// Decide which `.rej` sidecars to write, failing on stale ones.
    fn plan_rejects(
        &self,
        project: &Path,
        plan: &UpdatePlan,
        mode: ConflictMode,
    ) -> RecastResult<Vec<Reject>> {
        if mode == ConflictMode::Skip {
            return Ok(Vec::new());
        }

        let mut rejects = Vec::new();
        for planned in plan.preserved() {
            // A file the user deleted stays deleted, with no sidecar either.
            let FileAction::Preserve {
                reason: PreserveReason::Edited | PreserveReason::Untracked,
                incoming: Some(incoming),
            } = &planned.action
            else {
                continue;
            };

            let rej = planned.path.with_suffix(REJ_SUFFIX);
            let write = match self.filesystem.read_file(&rej.under(project))? {
                None => true,
                Some(existing) if existing == *incoming => false,
                Some(_) => {
                    return Err(ApplicationError::MergeConflict {
                        path: planned.path.to_string(),
                        rej: rej.to_string(),
                    }
                    .into());
                }
            };

            rejects.push(Reject {
                path: planned.path.to_string(),
                rej_path: rej.to_string(),
                target: rej.under(project),
                content: incoming.clone(),
                write,
            });
        }

        Ok(rejects)
    }

    fn apply_plan(
        &self,
        project: &Path,
        plan: &UpdatePlan,
        tree: &RenderedTree,
        rejects: &[Reject],
    ) -> RecastResult<()> {
        for dir in tree.directories() {
            self.filesystem.create_dir_all(&dir.under(project))?;
        }

        for planned in &plan.files {
            let target = planned.path.under(project);
            match &planned.action {
                FileAction::Overwrite {
                    file,
                    changed: true,
                }
                | FileAction::Create { file } => {
                    self.write_one(&target, &file.content, file.permissions)?;
                }
                FileAction::Remove => {
                    self.filesystem.remove_file(&target)?;
                    self.prune_empty_parents(project, &planned.path)?;
                }
                FileAction::Overwrite { changed: false, .. }
                | FileAction::Adopt
                | FileAction::Preserve { .. } => {}
            }
        }

        for reject in rejects.iter().filter(|r| r.write) {
            self.filesystem.write_file(&reject.target, &reject.content)?;
        }

        Ok(())
    }
}

/// A `.rej` sidecar for a preserved file.
struct Reject {
    path: String,
    rej_path: String,
    target: PathBuf,
    content: Vec<u8>,
    write: bool,
}
