//! Read-only comparison of a project against its provenance baseline.

use std::path::Path;

use tracing::{debug, instrument};

use crate::{
    application::services::{FileStatusReport, ProjectService, StatusReport},
    domain::FileStatus,
    error::RecastResult,
};

impl ProjectService {
    #[instrument(skip_all, fields(project = %project.display()))]
    pub fn status(&self, project: &Path) -> RecastResult<StatusReport> {
        let record = self.read_provenance(project)?;

        let mut files = Vec::with_capacity(record.files.len());
        let mut pending_rej = Vec::new();

        for (path, baseline) in &record.files {
            let current = self.filesystem.read_file(&path.under(project))?;
            let status = FileStatus::classify(Some(baseline), current.as_deref());

            let rej = path.with_suffix(".rej");
            if self.filesystem.exists(&rej.under(project)) {
                pending_rej.push(rej.to_string());
            }

            files.push(FileStatusReport {
                path: path.to_string(),
                status,
            });
        }

        debug!(tracked = files.len(), pending = pending_rej.len(), "Status computed");
        Ok(StatusReport {
            template: record.template.id.clone(),
            version: record.template.version.to_string(),
            files,
            pending_rej,
        })
    }
}
