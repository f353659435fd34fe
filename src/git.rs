use std::path::Path;

use tracing::debug;

use crate::backend::CommitContext;
use crate::backend::TagInfo;
use crate::backend::Vcs;
use crate::backend::commit_with;
use crate::error::VcsError;
use crate::run;

// -----------------------------------------------------------------------------
// Git

/// Git backend, driven through the `git` CLI.
pub struct Git;

impl Git {
    const USABLE_COMMAND: &'static [&'static str] = &["git", "rev-parse", "--git-dir"];
    const COMMIT_COMMAND: &'static [&'static str] = &["git", "commit", "-F"];
}

impl Vcs for Git {
    fn name(&self) -> &'static str {
        "Git"
    }

    fn is_usable(&self) -> Result<bool, VcsError> {
        run::probe(Self::USABLE_COMMAND)
    }

    fn assert_nondirty(&self) -> Result<(), VcsError> {
        let output = run::run(&["git", "status", "--porcelain"], &[], None)?;
        let changes: Vec<String> = String::from_utf8_lossy(&output)
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with("??"))
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
        // git-describe doesn't refresh the git index, so do that first.
        if let Err(err) = run::run(&["git", "update-index", "--refresh"], &[], None) {
            debug!("error refreshing the git index: {err}");
            return TagInfo::default();
        }

        match run::run(
            &[
                "git",
                "describe",
                "--dirty",
                "--tags",
                "--long",
                "--abbrev=40",
                "--match=v*",
            ],
            &[],
            None,
        ) {
            Ok(output) => parse_describe(&String::from_utf8_lossy(&output)),
            Err(err) => {
                // Expected on a fresh repository without any matching tag.
                debug!("error when running git describe: {err}");
                TagInfo::default()
            }
        }
    }

    fn commit(
        &self,
        message: &str,
        context: &CommitContext,
        extra_args: &[String],
    ) -> Result<(), VcsError> {
        commit_with(Self::COMMIT_COMMAND, message, context, extra_args, &[])
    }

    fn tag(&self, sign: bool, name: &str, message: &str) -> Result<(), VcsError> {
        let mut argv = vec!["git", "tag", name];
        if sign {
            argv.push("--sign");
        }
        if !message.is_empty() {
            argv.push("--message");
            argv.push(message);
        }
        run::run(&argv, &[], None)?;
        Ok(())
    }

    fn add_path(&self, path: &Path) -> Result<(), VcsError> {
        // --update stages tracked changes only; untracked files under the
        // path are left alone.
        let path = path.to_string_lossy();
        run::run(&["git", "add", "--update", path.as_ref()], &[], None)?;
        Ok(())
    }
}

// -----------------------------------------------------------------------------
// Describe parsing

/// Parse `git describe --dirty --tags --long --abbrev=40 --match=v*` output
/// of the shape `v<version>-<distance>-g<sha>[-dirty]`.
///
/// The version may itself contain `-`, so the string is consumed from the
/// right: dirty marker, commit id, distance, and whatever remains is the
/// tag name. Output that does not follow the shape yields no information.
pub(crate) fn parse_describe(describe: &str) -> TagInfo {
    let mut parts: Vec<&str> = describe.trim().split('-').collect();

    let dirty = if parts.last() == Some(&"dirty") {
        parts.pop();
        Some(true)
    } else {
        None
    };

    let commit_sha = parts
        .pop()
        .map(|sha| sha.strip_prefix('g').unwrap_or(sha).to_string());
    let distance = parts.pop().and_then(|raw| raw.parse::<u64>().ok());

    let (Some(commit_sha), Some(distance)) = (commit_sha, distance) else {
        debug!("unparseable git describe output: {describe:?}");
        return TagInfo::default();
    };
    if parts.is_empty() {
        debug!("git describe output has no tag name: {describe:?}");
        return TagInfo::default();
    }

    let tag = parts.join("-");
    TagInfo {
        dirty,
        commit_sha: Some(commit_sha),
        distance_to_latest_tag: Some(distance),
        current_version: Some(tag.strip_prefix('v').unwrap_or(&tag).to_string()),
    }
}
