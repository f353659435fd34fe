//! Version control plumbing for version-bump tooling.
//!
//! One [`Vcs`] contract, three backends ([`Git`], [`Mercurial`],
//! [`Subversion`]) that drive the corresponding CLI tools as external
//! processes, and a selector ([`detect`]) that picks the first backend
//! usable in the current working directory.

pub mod backend;
pub mod error;
pub mod git;
pub mod mercurial;
mod run;
pub mod subversion;

// Re-export the contract and backends at the crate root
pub use backend::BACKENDS;
pub use backend::CommitContext;
pub use backend::TagInfo;
pub use backend::Vcs;
pub use backend::detect;
pub use backend::first_usable;
pub use error::VcsError;
pub use git::Git;
pub use mercurial::Mercurial;
pub use subversion::RepoUrls;
pub use subversion::Subversion;

// Quiet tracing output for all unit tests; RUST_LOG still overrides
#[cfg(test)]
#[ctor::ctor]
fn init_tests() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
