//! Rendering a template into a [`RenderedTree`], and the small filesystem
//! routines generate and update share.

use std::path::Path;

use tracing::{debug, trace};

use crate::{
    application::{ApplicationError, services::ProjectService},
    domain::{
        DomainValidator, Permissions, RelativePath, RenderContext, RenderedTree, Template,
        TemplateContent, TemplateNode,
    },
    error::RecastResult,
};

impl ProjectService {
    /// Render every included node.
    ///
    /// A node is skipped when any of its conditions is false or when any
    /// path segment renders empty. Directory-level conditions were already
    /// pushed down onto each node by the loader, so skipping is total.
    pub(super) fn render_tree(
        &self,
        template: &Template,
        ctx: &RenderContext,
    ) -> RecastResult<RenderedTree> {
        let mut tree = RenderedTree::new();

        for node in &template.tree.nodes {
            if !self.conditions_hold(node, ctx)? {
                trace!(path = %node.path(), "Excluded by condition");
                continue;
            }

            let Some(path) = self.render_path(node.path(), ctx)? else {
                trace!(path = %node.path(), "Excluded by empty path segment");
                continue;
            };

            match node {
                TemplateNode::File(spec) => {
                    let content = match &spec.content {
                        TemplateContent::Literal(bytes) => bytes.clone(),
                        TemplateContent::Parameterized(body) => self
                            .renderer
                            .render_str(spec.path.as_str(), body, ctx)?
                            .into_bytes(),
                    };
                    tree.add_file(path, content, spec.permissions)?;
                }
                TemplateNode::Directory(_) => tree.add_directory(path)?,
            }
        }

        debug!(files = tree.file_count(), "Template rendered");
        Ok(tree)
    }

    fn conditions_hold(&self, node: &TemplateNode, ctx: &RenderContext) -> RecastResult<bool> {
        for cond in node.conditions() {
            if !self.renderer.evaluate(cond, ctx)? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// `None` when a segment renders to nothing.
    fn render_path(
        &self,
        raw: &RelativePath,
        ctx: &RenderContext,
    ) -> RecastResult<Option<RelativePath>> {
        let mut segments = Vec::new();
        for segment in raw.segments() {
            if !segment.contains("{{") {
                segments.push(segment.to_string());
                continue;
            }
            let rendered = self.renderer.render_str(raw.as_str(), segment, ctx)?;
            let rendered = rendered.trim();
            if rendered.is_empty() {
                return Ok(None);
            }
            segments.push(rendered.to_string());
        }

        let joined = segments.join("/");
        DomainValidator::validate_rendered_path(&joined)
            .map(Some)
            .map_err(|e| {
                ApplicationError::RenderingFailed {
                    item: raw.to_string(),
                    reason: e.to_string(),
                }
                .into()
            })
    }

    /// Write one file, creating parents, then apply permissions.
    pub(super) fn write_one(
        &self,
        target: &Path,
        content: &[u8],
        permissions: Permissions,
    ) -> RecastResult<()> {
        if let Some(parent) = target.parent() {
            self.filesystem.create_dir_all(parent)?;
        }
        self.filesystem.write_file(target, content)?;
        if permissions.is_executable() {
            self.filesystem.set_permissions(target, true)?;
        }
        Ok(())
    }

    /// Remove now-empty directories from `path`'s parent up to (not
    /// including) `root`.
    pub(super) fn prune_empty_parents(&self, root: &Path, path: &RelativePath) -> RecastResult<()> {
        let mut dir = path.parent();
        while let Some(rel) = dir {
            if !self.filesystem.remove_dir_if_empty(&rel.under(root))? {
                break;
            }
            trace!(dir = %rel, "Pruned empty directory");
            dir = rel.parent();
        }
        Ok(())
    }
}
