use std::path::Path;
use std::process::Command;
use std::process::Stdio;

use tracing::level_filters::LevelFilter;
use tracing_subscriber::Layer as _;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt as _;
use tracing_subscriber::util::SubscriberInitExt as _;

/// True if `tool` can be spawned at all. Suites for optional VCS tools
/// bail out early (and loudly) instead of failing on machines without them.
pub fn tool_available(tool: &str) -> bool {
    Command::new(tool)
        .arg("--version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .is_ok()
}

/// Run a fixture command in `dir`, discarding output.
pub fn run_tool(dir: &Path, tool: &str, args: &[&str]) -> anyhow::Result<()> {
    let status = Command::new(tool)
        .args(args)
        .current_dir(dir)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()?;
    anyhow::ensure!(status.success(), "{tool} {args:?} failed");
    Ok(())
}

/// Run a fixture command in `dir` and capture stdout.
pub fn tool_output(dir: &Path, tool: &str, args: &[&str]) -> anyhow::Result<String> {
    let output = Command::new(tool)
        .args(args)
        .current_dir(dir)
        .stderr(Stdio::null())
        .output()?;
    anyhow::ensure!(output.status.success(), "{tool} {args:?} failed");
    Ok(String::from_utf8(output.stdout)?)
}

/// Creates a git repository in the given directory.
///
/// This initializes the repo and sets basic git config needed for commits
/// and tags. The directory should already exist.
pub fn create_git_repo(dir: &Path) -> anyhow::Result<()> {
    run_tool(dir, "git", &["init"])?;
    run_tool(dir, "git", &["config", "user.name", "Test User"])?;
    run_tool(dir, "git", &["config", "user.email", "test@example.com"])?;
    run_tool(dir, "git", &["config", "commit.gpgsign", "false"])?;
    run_tool(dir, "git", &["config", "tag.gpgsign", "false"])?;
    Ok(())
}

/// Writes a file and commits it, giving the repo a tracked baseline.
pub fn commit_file(dir: &Path, name: &str, contents: &str, message: &str) -> anyhow::Result<()> {
    std::fs::write(dir.join(name), contents)?;
    run_tool(dir, "git", &["add", name])?;
    run_tool(dir, "git", &["commit", "-m", message])?;
    Ok(())
}

/// Creates a Mercurial repository with the identity commits require.
pub fn create_hg_repo(dir: &Path) -> anyhow::Result<()> {
    run_tool(dir, "hg", &["init"])?;
    std::fs::write(
        dir.join(".hg").join("hgrc"),
        "[ui]\nusername = Test User <test@example.com>\n",
    )?;
    Ok(())
}

/// Creates a Subversion repository with a trunk/tags layout and checks out
/// trunk into `wc`. Returns the repository's file:// URL.
pub fn create_svn_checkout(repo: &Path, wc: &Path) -> anyhow::Result<String> {
    let repo_url = format!("file://{}", repo.display());
    let status = Command::new("svnadmin")
        .args(["create"])
        .arg(repo)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()?;
    anyhow::ensure!(status.success(), "svnadmin create failed");

    let trunk = format!("{repo_url}/trunk");
    let tags = format!("{repo_url}/tags");
    let status = Command::new("svn")
        .args(["mkdir", "--parents", &trunk, &tags, "-m", "repository layout"])
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()?;
    anyhow::ensure!(status.success(), "svn mkdir failed");

    let status = Command::new("svn")
        .args(["checkout", &trunk])
        .arg(wc)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()?;
    anyhow::ensure!(status.success(), "svn checkout failed");

    Ok(repo_url)
}

pub fn setup_logging() -> anyhow::Result<()> {
    let timer = tracing_subscriber::fmt::time::ChronoLocal::new("%H:%M:%S%.3f".into());
    let format = tracing_subscriber::fmt::format().with_timer(timer);
    let filter = tracing_subscriber::EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env()?;
    let subscriber = tracing_subscriber::fmt::layer()
        .event_format(format)
        .with_span_events(FmtSpan::NEW | FmtSpan::CLOSE)
        .with_filter(filter);
    tracing_subscriber::registry().with(subscriber).init();
    Ok(())
}

pub enum TestDir {
    Temp(tempfile::TempDir),
    Kept(std::path::PathBuf),
}

impl TestDir {
    pub fn new() -> std::io::Result<Self> {
        let temp_dir = tempfile::tempdir()?;

        if std::env::var("DEBUG_TESTS").is_ok() {
            let path = temp_dir.keep();
            eprintln!("Test directory kept at: {}", path.display());
            Ok(TestDir::Kept(path))
        } else {
            Ok(TestDir::Temp(temp_dir))
        }
    }

    pub fn path(&self) -> &std::path::Path {
        match self {
            TestDir::Temp(t) => t.path(),
            TestDir::Kept(p) => p.as_path(),
        }
    }
}
