use std::io;
use std::path::Path;

use serde::Serialize;

use crate::backend::CommitContext;
use crate::backend::TagInfo;
use crate::backend::Vcs;
use crate::backend::commit_with;
use crate::error::VcsError;
use crate::run;

// -----------------------------------------------------------------------------
// Types

/// Working-copy location relative to a `branches`/`trunk` repository layout,
/// derived from the checkout's reported URL. Recomputed on every call,
/// never cached.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RepoUrls {
    /// URL truncated just before the layout marker.
    pub base: Option<String>,
    /// URL truncated just after the layout marker.
    pub root: Option<String>,
    /// The checkout's URL as reported by the tool.
    pub current: Option<String>,
}

/// Path segments that mark the branch level of a repository layout.
const LAYOUT_MARKERS: &[&str] = &["branches", "branch", "trunk"];

// -----------------------------------------------------------------------------
// Subversion

/// Subversion backend, driven through the `svn` CLI.
///
/// There is no cheap "is this the right tool" command; usability is derived
/// from whether the checkout URL sits under a recognized branch layout.
/// Tags are copies of the branch root under a sibling `tags/` directory.
pub struct Subversion;

impl Subversion {
    const COMMIT_COMMAND: &'static [&'static str] = &["svn", "commit", "--file"];

    /// The checkout's URL as reported by `svn info`, if any.
    fn current_url(&self) -> Result<Option<String>, VcsError> {
        let output = run::run(&["svn", "info"], &[], None)?;
        Ok(parse_info_url(&String::from_utf8_lossy(&output)))
    }

    /// Derive the branch layout around the current checkout URL.
    ///
    /// A failing `svn info` (no working copy here, tool not installed)
    /// leaves every field unset; only unexpected OS errors propagate.
    pub fn repo_urls(&self) -> Result<RepoUrls, VcsError> {
        let current = match self.current_url() {
            Ok(url) => url,
            Err(VcsError::CommandFailed { .. }) => None,
            Err(VcsError::Io(err)) if run::is_expected_absence(&err) => None,
            Err(err) => return Err(err),
        };
        Ok(derive_repo_urls(current))
    }
}

impl Vcs for Subversion {
    fn name(&self) -> &'static str {
        "Subversion"
    }

    fn is_usable(&self) -> Result<bool, VcsError> {
        let urls = self.repo_urls()?;
        Ok(urls.base.as_deref().is_some_and(|base| !base.is_empty()))
    }

    fn assert_nondirty(&self) -> Result<(), VcsError> {
        // -q keeps untracked files out of the listing entirely.
        let output = run::run(&["svn", "status", "-q"], &[], None)?;
        let changes: Vec<String> = String::from_utf8_lossy(&output)
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect();

        if !changes.is_empty() {
            return Err(VcsError::WorkingDirectoryDirty {
                name: self.name(),
                changes,
            });
        }
        Ok(())
    }

    fn latest_tag_info(&self) -> TagInfo {
        TagInfo::default()
    }

    fn commit(
        &self,
        message: &str,
        context: &CommitContext,
        extra_args: &[String],
    ) -> Result<(), VcsError> {
        commit_with(Self::COMMIT_COMMAND, message, context, extra_args, &[])
    }

    fn tag(&self, _sign: bool, name: &str, message: &str) -> Result<(), VcsError> {
        let urls = self.repo_urls()?;
        let (Some(base), Some(root)) = (urls.base, urls.root) else {
            return Err(VcsError::Io(io::Error::other(
                "checkout URL has no branch layout marker",
            )));
        };

        let target = format!("{base}/tags/{name}");
        // svn requires the --message value to be present even when empty.
        run::run(&["svn", "copy", &root, &target, "--message", message], &[], None)?;
        Ok(())
    }

    fn add_path(&self, _path: &Path) -> Result<(), VcsError> {
        // Commits cover the whole working copy; nothing to stage.
        Ok(())
    }
}

// -----------------------------------------------------------------------------
// URL derivation

/// Pick the `URL:` line out of `svn info` output.
fn parse_info_url(info: &str) -> Option<String> {
    info.lines()
        .find_map(|line| line.strip_prefix("URL:"))
        .map(|url| url.trim().to_string())
}

/// Split `current` around the rightmost layout marker it contains.
///
/// At equal positions the longest marker wins, so a `branches` segment is
/// never truncated to `branch`. No marker leaves `base` and `root` unset.
fn derive_repo_urls(current: Option<String>) -> RepoUrls {
    let Some(url) = current else {
        return RepoUrls::default();
    };

    let marker = LAYOUT_MARKERS
        .iter()
        .filter_map(|marker| url.rfind(marker).map(|idx| (idx, marker.len())))
        .max_by_key(|&(idx, len)| (idx, len));

    let (base, root) = match marker {
        Some((idx, len)) => (
            Some(url[..idx.saturating_sub(1)].to_string()),
            Some(url[..idx + len].to_string()),
        ),
        None => (None, None),
    };

    RepoUrls {
        base,
        root,
        current: Some(url),
    }
}
