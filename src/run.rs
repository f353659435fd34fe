use std::io;
use std::io::Write as _;
use std::process::Command;
use std::process::Stdio;

use tracing::debug;

use crate::error::VcsError;

// -----------------------------------------------------------------------------
// Process runner

/// Run an external command synchronously in the current working directory.
///
/// `env` is overlaid on the inherited environment. `input`, if given, is
/// piped into the child's stdin. Returns captured stdout on exit 0; a
/// nonzero exit becomes [`VcsError::CommandFailed`] carrying the command
/// line, exit code and merged stdout/stderr.
pub(crate) fn run(
    argv: &[&str],
    env: &[(&str, &str)],
    input: Option<&[u8]>,
) -> Result<Vec<u8>, VcsError> {
    let mut command = Command::new(argv[0]);
    command.args(&argv[1..]);
    for (key, value) in env {
        command.env(key, value);
    }

    let output = match input {
        Some(bytes) => {
            command
                .stdin(Stdio::piped())
                .stdout(Stdio::piped())
                .stderr(Stdio::piped());
            let mut child = command.spawn()?;
            if let Some(mut stdin) = child.stdin.take() {
                stdin.write_all(bytes)?;
            }
            child.wait_with_output()?
        }
        None => command.output()?,
    };

    if !output.status.success() {
        let mut combined = output.stdout;
        combined.extend_from_slice(&output.stderr);
        return Err(VcsError::CommandFailed {
            command: argv.join(" "),
            code: output.status.code(),
            output: String::from_utf8_lossy(&combined).trim().to_string(),
        });
    }

    Ok(output.stdout)
}

/// Run a usability probe with all output suppressed.
///
/// `Ok(true)` on exit 0, `Ok(false)` on nonzero exit or when the tool is
/// absent from the environment; any other OS error propagates.
pub(crate) fn probe(argv: &[&str]) -> Result<bool, VcsError> {
    let mut command = Command::new(argv[0]);
    command
        .args(&argv[1..])
        .stdout(Stdio::null())
        .stderr(Stdio::null());

    match command.status() {
        Ok(status) => Ok(status.success()),
        Err(err) if is_expected_absence(&err) => {
            debug!("{} is not available here: {err}", argv[0]);
            Ok(false)
        }
        Err(err) => Err(VcsError::Io(err)),
    }
}

/// OS errors that mean "this tool/directory is simply not here", as opposed
/// to a failure worth reporting.
pub(crate) fn is_expected_absence(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::NotFound | io::ErrorKind::PermissionDenied | io::ErrorKind::NotADirectory
    )
}
