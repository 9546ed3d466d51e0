//! Line-level history queries and their porcelain output.

mod porcelain;

use std::ffi::OsString;
use std::path::Path;

pub use porcelain::parse_porcelain;

use crate::commit::CommitRecord;
use crate::error::QueryError;
use crate::location::LineRange;

/// Raw output of one blame invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlameOutput {
    /// The command line as it would be typed in a shell.
    pub command: String,
    /// Captured standard output.
    pub stdout: String,
}

/// A source of line-level history.
///
/// One call covers every range of one file. Implementations report a failed
/// or non-zero invocation as [`QueryError::BlameInvocation`].
pub trait LineHistory: Send + Sync + 'static {
    /// Blames `ranges` of `path` in porcelain format.
    fn blame(&self, path: &Path, ranges: &[LineRange]) -> impl Future<Output = Result<BlameOutput, QueryError>> + Send;
}

/// Arguments for `blame <file> -L s,e [-L s,e ...] --porcelain`.
#[must_use]
pub fn blame_args(path: &Path, ranges: &[LineRange]) -> Vec<OsString> {
    let mut args = Vec::with_capacity(ranges.len() * 2 + 3);
    args.push(OsString::from("blame"));
    args.push(path.as_os_str().to_os_string());
    for range in ranges {
        args.push(OsString::from("-L"));
        args.push(OsString::from(range.to_string()));
    }
    args.push(OsString::from("--porcelain"));
    args
}

/// Blames one file and parses the result into commit records.
pub async fn blame_file<H: LineHistory>(
    history: &H,
    path: &Path,
    ranges: &[LineRange],
) -> Result<Vec<CommitRecord>, QueryError> {
    let output = history.blame(path, ranges).await?;
    parse_porcelain(&output.stdout, path, &output.command)
}
