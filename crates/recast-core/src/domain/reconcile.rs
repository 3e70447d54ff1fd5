//! Three-way reconciliation of one file.
//!
//! Inputs per path: the baseline hash from provenance, what is on disk now,
//! and what the template renders now. The outcome is one [`FileAction`];
//! there are no other transitions.
//!
//! | Baseline | On disk | New render | Status | Action |
//! |---|---|---|---|---|
//! | hash | equal to baseline | present | Unchanged | Overwrite |
//! | hash | equal to baseline | absent | Unchanged | Remove |
//! | none | absent | present | Absent | Create |
//! | hash | differs | any | Modified | Preserve |
//! | hash | missing | any | Deleted | Preserve |
//! | none | present | equal to render | Untracked | Adopt |
//! | none | present | differs | Untracked | Preserve |

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use crate::domain::entities::common::RelativePath;
use crate::domain::entities::project_structure::{RenderedFile, RenderedTree};
use crate::domain::value_objects::ContentHash;

/// How the on-disk file relates to its last-known baseline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FileStatus {
    Unchanged,
    Modified,
    Deleted,
    /// On disk, never rendered by us.
    Untracked,
    /// Neither tracked nor on disk.
    Absent,
}

impl FileStatus {
    pub fn classify(baseline: Option<&ContentHash>, current: Option<&[u8]>) -> Self {
        match (baseline, current) {
            (Some(hash), Some(bytes)) if hash.matches(bytes) => Self::Unchanged,
            (Some(_), Some(_)) => Self::Modified,
            (Some(_), None) => Self::Deleted,
            (None, Some(_)) => Self::Untracked,
            (None, None) => Self::Absent,
        }
    }

    /// Did the user touch this file since the last render?
    pub fn is_user_change(&self) -> bool {
        matches!(self, Self::Modified | Self::Deleted | Self::Untracked)
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Unchanged => "unchanged",
            Self::Modified => "modified",
            Self::Deleted => "deleted",
            Self::Untracked => "untracked",
            Self::Absent => "absent",
        }
    }
}

impl fmt::Display for FileStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PreserveReason {
    Edited,
    Deleted,
    Untracked,
}

impl fmt::Display for PreserveReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Edited => "edited",
            Self::Deleted => "deleted",
            Self::Untracked => "not generated by recast",
        })
    }
}

/// What update does with one path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileAction {
    /// Unchanged by the user; take the new render. `changed` is false when
    /// the render is byte-identical and no write is needed.
    Overwrite { file: RenderedFile, changed: bool },
    /// Unchanged by the user and no longer rendered.
    Remove,
    /// New in the template.
    Create { file: RenderedFile },
    /// An untracked file that already equals the render; start tracking it.
    Adopt,
    /// User change wins. `incoming` is the render when it differs from
    /// what is on disk.
    Preserve {
        reason: PreserveReason,
        incoming: Option<Vec<u8>>,
    },
}

impl FileAction {
    /// Does this action touch the working tree?
    pub fn writes(&self) -> bool {
        match self {
            Self::Overwrite { changed, .. } => *changed,
            Self::Remove | Self::Create { .. } => true,
            Self::Adopt | Self::Preserve { .. } => false,
        }
    }

    pub const fn label(&self) -> &'static str {
        match self {
            Self::Overwrite { changed: true, .. } => "updated",
            Self::Overwrite { changed: false, .. } => "identical",
            Self::Remove => "removed",
            Self::Create { .. } => "created",
            Self::Adopt => "adopted",
            Self::Preserve { .. } => "preserved",
        }
    }
}

/// Decide the action for one path; `None` means the path is none of our
/// business (untracked and not rendered, or absent everywhere).
pub fn reconcile(
    baseline: Option<&ContentHash>,
    current: Option<&[u8]>,
    rendered: Option<&RenderedFile>,
) -> Option<(FileStatus, FileAction)> {
    let status = FileStatus::classify(baseline, current);

    let action = match (status, rendered) {
        (FileStatus::Unchanged, Some(file)) => FileAction::Overwrite {
            changed: current != Some(file.content.as_slice()),
            file: file.clone(),
        },
        (FileStatus::Unchanged, None) => FileAction::Remove,
        (FileStatus::Absent, Some(file)) => FileAction::Create { file: file.clone() },
        (FileStatus::Absent, None) => return None,
        (FileStatus::Untracked, None) => return None,
        (FileStatus::Untracked, Some(file)) if current == Some(file.content.as_slice()) => {
            FileAction::Adopt
        }
        (FileStatus::Untracked, Some(file)) => FileAction::Preserve {
            reason: PreserveReason::Untracked,
            incoming: Some(file.content.clone()),
        },
        // Only a template-side change is worth offering; otherwise the edit
        // is simply the user's.
        (FileStatus::Modified, rendered) => FileAction::Preserve {
            reason: PreserveReason::Edited,
            incoming: rendered
                .filter(|f| current != Some(f.content.as_slice()))
                .filter(|f| baseline.is_none_or(|b| !b.matches(&f.content)))
                .map(|f| f.content.clone()),
        },
        (FileStatus::Deleted, rendered) => FileAction::Preserve {
            reason: PreserveReason::Deleted,
            incoming: rendered.map(|f| f.content.clone()),
        },
    };

    Some((status, action))
}

/// Baseline to record after `action` has been applied.
///
/// Preserved files keep the old baseline so the user's change keeps being
/// recognized as theirs. A user deletion of a file the template also
/// dropped leaves nothing to track.
pub fn next_baseline(
    old: Option<&ContentHash>,
    action: &FileAction,
    rendered: Option<&RenderedFile>,
) -> Option<ContentHash> {
    match action {
        FileAction::Overwrite { file, .. } | FileAction::Create { file } => Some(file.hash()),
        FileAction::Adopt => rendered.map(RenderedFile::hash),
        FileAction::Remove => None,
        FileAction::Preserve {
            reason: PreserveReason::Untracked,
            ..
        } => None,
        FileAction::Preserve {
            reason: PreserveReason::Deleted,
            ..
        } if rendered.is_none() => None,
        FileAction::Preserve { .. } => old.copied(),
    }
}

/// One reconciled path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedFile {
    pub path: RelativePath,
    pub status: FileStatus,
    pub action: FileAction,
    pub next_baseline: Option<ContentHash>,
}

/// Reconciliation of a whole project.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdatePlan {
    pub files: Vec<PlannedFile>,
}

impl UpdatePlan {
    /// Reconcile every path that is tracked, rendered, or both.
    ///
    /// `read_current` is asked once per candidate path and returns the file's
    /// bytes if it exists on disk.
    pub fn build<E>(
        baselines: &BTreeMap<RelativePath, ContentHash>,
        rendered: &RenderedTree,
        mut read_current: impl FnMut(&RelativePath) -> Result<Option<Vec<u8>>, E>,
    ) -> Result<Self, E> {
        let mut paths: Vec<&RelativePath> = baselines.keys().chain(rendered.paths()).collect();
        paths.sort();
        paths.dedup();

        let mut files = Vec::with_capacity(paths.len());
        for path in paths {
            let baseline = baselines.get(path);
            let current = read_current(path)?;
            let new = rendered.get(path);

            if let Some((status, action)) = reconcile(baseline, current.as_deref(), new) {
                let next_baseline = next_baseline(baseline, &action, new);
                files.push(PlannedFile {
                    path: path.clone(),
                    status,
                    action,
                    next_baseline,
                });
            }
        }

        Ok(Self { files })
    }

    /// Provenance `[files]` table after the plan is applied.
    pub fn baselines(&self) -> BTreeMap<RelativePath, ContentHash> {
        self.files
            .iter()
            .filter_map(|f| f.next_baseline.map(|h| (f.path.clone(), h)))
            .collect()
    }

    pub fn preserved(&self) -> impl Iterator<Item = &PlannedFile> {
        self.files
            .iter()
            .filter(|f| matches!(f.action, FileAction::Preserve { .. }))
    }

    pub fn is_noop(&self) -> bool {
        self.files.iter().all(|f| !f.action.writes())
    }

    pub fn count(&self, label: &str) -> usize {
        self.files.iter().filter(|f| f.action.label() == label).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::common::Permissions;

    fn file(s: &str) -> RenderedFile {
        RenderedFile {
            content: s.as_bytes().to_vec(),
            permissions: Permissions::read_write(),
        }
    }

    fn hash(s: &str) -> ContentHash {
        ContentHash::of(s.as_bytes())
    }

    #[test]
    fn classify_covers_all_states() {
        let h = hash("a");
        assert_eq!(FileStatus::classify(Some(&h), Some(b"a")), FileStatus::Unchanged);
        assert_eq!(FileStatus::classify(Some(&h), Some(b"b")), FileStatus::Modified);
        assert_eq!(FileStatus::classify(Some(&h), None), FileStatus::Deleted);
        assert_eq!(FileStatus::classify(None, Some(b"a")), FileStatus::Untracked);
        assert_eq!(FileStatus::classify(None, None), FileStatus::Absent);
    }

    #[test]
    fn unchanged_and_rendered_overwrites() {
        let (status, action) =
            reconcile(Some(&hash("old")), Some(b"old"), Some(&file("new"))).unwrap();
        assert_eq!(status, FileStatus::Unchanged);
        assert!(matches!(action, FileAction::Overwrite { changed: true, .. }));
        assert!(action.writes());
    }

    #[test]
    fn identical_render_is_not_a_write() {
        let (_, action) = reconcile(Some(&hash("same")), Some(b"same"), Some(&file("same"))).unwrap();
        assert!(matches!(action, FileAction::Overwrite { changed: false, .. }));
        assert!(!action.writes());
    }

    #[test]
    fn unchanged_and_dropped_is_removed() {
        let (_, action) = reconcile(Some(&hash("x")), Some(b"x"), None).unwrap();
        assert_eq!(action, FileAction::Remove);
        assert_eq!(next_baseline(Some(&hash("x")), &action, None), None);
    }

    #[test]
    fn new_file_is_created() {
        let (status, action) = reconcile(None, None, Some(&file("hi"))).unwrap();
        assert_eq!(status, FileStatus::Absent);
        assert!(matches!(action, FileAction::Create { .. }));
        assert_eq!(
            next_baseline(None, &action, Some(&file("hi"))),
            Some(hash("hi"))
        );
    }

    #[test]
    fn edited_file_is_preserved_with_old_baseline() {
        let old = hash("base");
        let (status, action) =
            reconcile(Some(&old), Some(b"base\n# User change\n"), Some(&file("new"))).unwrap();
        assert_eq!(status, FileStatus::Modified);
        assert_eq!(
            action,
            FileAction::Preserve {
                reason: PreserveReason::Edited,
                incoming: Some(b"new".to_vec()),
            }
        );
        assert!(!action.writes());
        assert_eq!(next_baseline(Some(&old), &action, Some(&file("new"))), Some(old));
    }

    #[test]
    fn edited_file_equal_to_render_has_no_incoming() {
        let (_, action) = reconcile(Some(&hash("base")), Some(b"new"), Some(&file("new"))).unwrap();
        assert_eq!(
            action,
            FileAction::Preserve {
                reason: PreserveReason::Edited,
                incoming: None,
            }
        );
    }

    #[test]
    fn edited_file_with_unchanged_template_has_no_incoming() {
        let old = hash("base");
        let (status, action) =
            reconcile(Some(&old), Some(b"base\n# User change\n"), Some(&file("base"))).unwrap();
        assert_eq!(status, FileStatus::Modified);
        assert_eq!(
            action,
            FileAction::Preserve {
                reason: PreserveReason::Edited,
                incoming: None,
            }
        );
        assert_eq!(next_baseline(Some(&old), &action, Some(&file("base"))), Some(old));
    }

    #[test]
    fn deletion_is_kept() {
        let old = hash("x");
        let (status, action) = reconcile(Some(&old), None, Some(&file("x2"))).unwrap();
        assert_eq!(status, FileStatus::Deleted);
        assert!(matches!(
            action,
            FileAction::Preserve {
                reason: PreserveReason::Deleted,
                ..
            }
        ));
        assert_eq!(next_baseline(Some(&old), &action, Some(&file("x2"))), Some(old));
        assert_eq!(next_baseline(Some(&old), &action, None), None);
    }

    #[test]
    fn untracked_identical_is_adopted() {
        let (status, action) = reconcile(None, Some(b"same"), Some(&file("same"))).unwrap();
        assert_eq!(status, FileStatus::Untracked);
        assert_eq!(action, FileAction::Adopt);
        assert_eq!(
            next_baseline(None, &action, Some(&file("same"))),
            Some(hash("same"))
        );
    }

    #[test]
    fn untracked_different_is_preserved_untracked() {
        let (_, action) = reconcile(None, Some(b"mine"), Some(&file("theirs"))).unwrap();
        assert!(matches!(
            action,
            FileAction::Preserve {
                reason: PreserveReason::Untracked,
                ..
            }
        ));
        assert_eq!(next_baseline(None, &action, Some(&file("theirs"))), None);
    }

    #[test]
    fn foreign_files_are_ignored() {
        assert!(reconcile(None, Some(b"user"), None).is_none());
        assert!(reconcile(None, None, None).is_none());
    }

    #[test]
    fn plan_over_project() {
        let p = |s: &str| RelativePath::try_new(s).unwrap();

        let mut baselines = BTreeMap::new();
        baselines.insert(p("README.md"), hash("readme"));
        baselines.insert(p("old.txt"), hash("old"));
        baselines.insert(p("keep.txt"), hash("keep"));

        let rendered = RenderedTree::new()
            .with_file("README.md", "readme v2")
            .and_then(|t| t.with_file("keep.txt", "keep v2"))
            .and_then(|t| t.with_file("new.txt", "new"))
            .unwrap();

        let disk: BTreeMap<&str, &str> = [
            ("README.md", "readme"),
            ("old.txt", "old"),
            ("keep.txt", "keep + user"),
        ]
        .into_iter()
        .collect();

        let plan = UpdatePlan::build(&baselines, &rendered, |path| {
            Ok::<_, ()>(disk.get(path.as_str()).map(|s| s.as_bytes().to_vec()))
        })
        .unwrap();

        let labels: Vec<_> = plan
            .files
            .iter()
            .map(|f| (f.path.as_str(), f.action.label()))
            .collect();
        assert_eq!(
            labels,
            [
                ("README.md", "updated"),
                ("keep.txt", "preserved"),
                ("new.txt", "created"),
                ("old.txt", "removed"),
            ]
        );

        let next = plan.baselines();
        assert_eq!(next[&p("README.md")], hash("readme v2"));
        assert_eq!(next[&p("keep.txt")], hash("keep"));
        assert_eq!(next[&p("new.txt")], hash("new"));
        assert!(!next.contains_key(&p("old.txt")));
        assert_eq!(plan.preserved().count(), 1);
        assert!(!plan.is_noop());
    }
}
