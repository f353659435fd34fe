use std::io::Write as _;
use std::path::Path;

#[cfg(test)]
use mockall::automock;
use serde::Serialize;
use tempfile::NamedTempFile;
use tracing::debug;
use tracing::error;

use crate::error::VcsError;
use crate::git::Git;
use crate::mercurial::Mercurial;
use crate::run;
use crate::subversion::Subversion;

// -----------------------------------------------------------------------------
// Types

/// Information about the most recent tag reachable from the current
/// position. Every field is optional: `None` means the backend could not
/// determine the value, not that it is zero or false.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TagInfo {
    /// Whether the working copy has uncommitted changes on top of the
    /// described commit.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dirty: Option<bool>,
    /// Full commit id of the current position.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commit_sha: Option<String>,
    /// Number of commits between the tag and the current position.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance_to_latest_tag: Option<u64>,
    /// Version encoded in the tag name, without the `v` prefix.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_version: Option<String>,
}

impl TagInfo {
    /// True when the query produced no information at all. Fresh
    /// repositories and backends without a tag query end up here.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Caller-owned version strings exported to hook scripts run by the VCS
/// commit subprocess.
#[derive(Debug, Clone)]
pub struct CommitContext {
    pub current_version: String,
    pub new_version: String,
}

// -----------------------------------------------------------------------------
// Vcs trait

/// Capability contract shared by every version control backend.
///
/// Backends are stateless: every operation is a pure function of its
/// arguments plus the ambient working directory. Exactly one backend is
/// active per invocation of the calling tool; see [`detect`](crate::detect).
#[cfg_attr(test, automock)]
pub trait Vcs: Send + Sync {
    /// Backend label used in errors and logs.
    fn name(&self) -> &'static str;

    /// Cheap, side-effect-free check for whether this backend applies to
    /// the current working directory. A missing executable or a directory
    /// the tool does not recognize reports `Ok(false)`; only unexpected OS
    /// failures surface as errors.
    fn is_usable(&self) -> Result<bool, VcsError>;

    /// Fail with [`VcsError::WorkingDirectoryDirty`] if the working copy
    /// has uncommitted local changes. Untracked files do not count.
    fn assert_nondirty(&self) -> Result<(), VcsError>;

    /// Best-effort query of the most recent reachable tag. Backends without
    /// the concept, and repositories without tags, yield
    /// [`TagInfo::default`] rather than an error.
    fn latest_tag_info(&self) -> TagInfo;

    /// Commit with `message`, exporting `BUMPVERSION_CURRENT_VERSION` and
    /// `BUMPVERSION_NEW_VERSION` from `context` to the commit subprocess.
    /// `extra_args` are appended to the backend's commit command, e.g. to
    /// scope the commit to specific paths.
    fn commit(
        &self,
        message: &str,
        context: &CommitContext,
        extra_args: &[String],
    ) -> Result<(), VcsError>;

    /// Create tag `name` at the current position. `sign` requests a signed
    /// tag and fails with [`VcsError::SignedTagsUnsupported`] where the
    /// backend cannot sign; a non-empty `message` requests an annotated tag
    /// where the backend distinguishes annotated from lightweight.
    fn tag(&self, sign: bool, name: &str, message: &str) -> Result<(), VcsError>;

    /// Stage `path` for the next commit. A no-op on backends that commit
    /// the whole working copy implicitly.
    fn add_path(&self, path: &Path) -> Result<(), VcsError>;
}

// -----------------------------------------------------------------------------
// Shared commit plumbing

/// Run a backend's commit command against a transient log-message file.
///
/// The message is written UTF-8 encoded to a [`NamedTempFile`], whose path
/// becomes the first argument after `command`. The file is removed on every
/// exit path; deletion rides on the drop of the handle.
pub(crate) fn commit_with(
    command: &[&str],
    message: &str,
    context: &CommitContext,
    extra_args: &[String],
    extra_env: &[(&str, &str)],
) -> Result<(), VcsError> {
    let mut logfile = NamedTempFile::new()?;
    logfile.write_all(message.as_bytes())?;
    logfile.flush()?;
    let logfile_path = logfile.path().to_string_lossy().into_owned();

    let mut argv: Vec<&str> = command.to_vec();
    argv.push(&logfile_path);
    for arg in extra_args {
        argv.push(arg);
    }

    let mut env: Vec<(&str, &str)> = vec![
        ("BUMPVERSION_CURRENT_VERSION", context.current_version.as_str()),
        ("BUMPVERSION_NEW_VERSION", context.new_version.as_str()),
    ];
    env.extend_from_slice(extra_env);

    if let Err(err) = run::run(&argv, &env, None) {
        error!("{err}");
        return Err(err);
    }
    Ok(())
}

// -----------------------------------------------------------------------------
// Backend selection

/// Backends in preference order.
pub static BACKENDS: [&dyn Vcs; 3] = [&Git, &Mercurial, &Subversion];

/// First backend in `backends` that reports itself usable.
///
/// `Ok(false)` probes move on to the next candidate; probe errors are
/// unexpected OS failures and propagate.
pub fn first_usable<'a>(backends: &[&'a dyn Vcs]) -> Result<Option<&'a dyn Vcs>, VcsError> {
    for backend in backends {
        if backend.is_usable()? {
            debug!("selected {} backend", backend.name());
            return Ok(Some(*backend));
        }
    }
    Ok(None)
}

/// The active backend for the current working directory, if any.
pub fn detect() -> Result<Option<&'static dyn Vcs>, VcsError> {
    first_usable(&BACKENDS)
}
