use std::path::Path;

use crate::backend::CommitContext;
use crate::backend::TagInfo;
use crate::backend::Vcs;
use crate::backend::commit_with;
use crate::error::VcsError;
use crate::run;

// -----------------------------------------------------------------------------
// Mercurial

/// Mercurial backend, driven through the `hg` CLI.
///
/// Commits operate on the whole working copy and tags cannot be signed;
/// there is no lightweight tag-description query either.
pub struct Mercurial;

impl Mercurial {
    const USABLE_COMMAND: &'static [&'static str] = &["hg", "root"];
    const COMMIT_COMMAND: &'static [&'static str] = &["hg", "commit", "--logfile"];
}

impl Vcs for Mercurial {
    fn name(&self) -> &'static str {
        "Mercurial"
    }

    fn is_usable(&self) -> Result<bool, VcsError> {
        run::probe(Self::USABLE_COMMAND)
    }

    fn assert_nondirty(&self) -> Result<(), VcsError> {
        // -mard restricts status to modified/added/removed/deleted, which
        // already excludes untracked and ignored files.
        let output = run::run(&["hg", "status", "-mard"], &[], None)?;
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
        // The logfile must be read as UTF-8 regardless of the host locale.
        commit_with(
            Self::COMMIT_COMMAND,
            message,
            context,
            extra_args,
            &[("HGENCODING", "utf-8")],
        )
    }

    fn tag(&self, sign: bool, name: &str, message: &str) -> Result<(), VcsError> {
        if sign {
            return Err(VcsError::SignedTagsUnsupported(self.name()));
        }
        let mut argv = vec!["hg", "tag", name];
        if !message.is_empty() {
            argv.push("--message");
            argv.push(message);
        }
        run::run(&argv, &[], None)?;
        Ok(())
    }

    fn add_path(&self, _path: &Path) -> Result<(), VcsError> {
        // Commits cover the whole working copy; nothing to stage.
        Ok(())
    }
}
