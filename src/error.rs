use thiserror::Error;

/// Failure conditions surfaced by the VCS backends.
///
/// Expected-absence conditions (tool not installed, not a repository) never
/// show up here: usability probes fold them into `Ok(false)` and tag queries
/// fold them into an empty [`TagInfo`](crate::TagInfo).
#[derive(Debug, Error)]
pub enum VcsError {
    /// An external VCS command exited nonzero. Carries the full command
    /// line and captured output so the failure can be diagnosed from the
    /// message alone.
    #[error("failed to run {command}: return code {}, output: {output}", .code.map_or_else(|| String::from("none"), |code| code.to_string()))]
    CommandFailed {
        /// Space-joined argument vector.
        command: String,
        /// Exit code; `None` if the process was killed by a signal.
        code: Option<i32>,
        /// Captured stdout and stderr, merged.
        output: String,
    },

    /// The working copy has uncommitted local changes. Untracked files do
    /// not count.
    #[error("{name} working directory is not clean:\n{}", .changes.join("\n"))]
    WorkingDirectoryDirty {
        /// Backend label, e.g. `Git`.
        name: &'static str,
        /// Status lines for every modified/added/removed/deleted path.
        changes: Vec<String>,
    },

    /// A signed tag was requested from a backend that cannot sign tags.
    #[error("{0} does not support signed tags")]
    SignedTagsUnsupported(&'static str),

    /// Unexpected OS-level failure (spawning a process, temp file I/O).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_failed_display() {
        let err = VcsError::CommandFailed {
            command: "git commit -F /tmp/msg".to_string(),
            code: Some(1),
            output: "nothing to commit".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "failed to run git commit -F /tmp/msg: return code 1, output: nothing to commit"
        );
    }

    #[test]
    fn test_dirty_display_lists_every_path() {
        let err = VcsError::WorkingDirectoryDirty {
            name: "Git",
            changes: vec!["M setup.py".to_string(), "D old.cfg".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "Git working directory is not clean:\nM setup.py\nD old.cfg"
        );
    }

    #[test]
    fn test_signed_tags_unsupported_display() {
        let err = VcsError::SignedTagsUnsupported("Mercurial");
        assert_eq!(err.to_string(), "Mercurial does not support signed tags");
    }
}
