//! Querying the bazel dependency graph for external Go libraries.
//!
//! `bazel query "deps(<target>)" --output=label` prints one label per line;
//! external go_default_library targets are translated into synthetic
//! package records via the repository mapping table. Everything else in the
//! query output is ignored.

use std::process::{Command, ExitStatus};

use camino::Utf8PathBuf;
use thiserror::Error;

use crate::mapping::RepoMap;
use crate::model::PackageRecord;

#[derive(Debug, Error)]
pub enum QueryError {
    #[error("launching bazel binary \"{binary}\": {source}")]
    Launch {
        binary: String,
        source: std::io::Error,
    },
    #[error("bazel query exited with {status}: {stderr}")]
    Failed { status: ExitStatus, stderr: String },
}

#[derive(Default, Builder, Debug, Clone)]
#[builder(setter(into))]
pub struct BazelCmd {
    #[builder(default = "\"bazel\".into()")]
    binary: String,

    #[builder(default = "\"//src/main:main\".into()")]
    target: String,

    #[builder(default = "\".\".into()")]
    workdir: Utf8PathBuf,

    #[builder(default)]
    extra_args: Vec<String>,
}

impl BazelCmd {
    /// Run the transitive-deps query and return its raw label output.
    /// Blocks until bazel exits; no timeout is applied.
    pub fn query_deps(&self) -> Result<String, QueryError> {
        let mut cmd = Command::new(&self.binary);
        cmd.arg("query")
            .arg(format!("deps({})", self.target))
            .arg("--output=label")
            .args(&self.extra_args)
            .current_dir(&self.workdir);

        let output = cmd.output().map_err(|source| QueryError::Launch {
            binary: self.binary.clone(),
            source,
        })?;

        if !output.status.success() {
            return Err(QueryError::Failed {
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

#[derive(Debug, Default)]
pub struct Extraction {
    pub packages: Vec<PackageRecord>,
    /// Repository identifiers that matched the label filter but had no
    /// mapping entry, in query-output order.
    pub skipped: Vec<String>,
}

/// Filter query output for external go_default_library labels and translate
/// them into synthetic package records. Unknown repositories are skipped,
/// not errors; strictness is the caller's call.
pub fn extract_from_labels(output: &str, map: &RepoMap) -> Extraction {
    let mut extraction = Extraction::default();

    for line in output.lines() {
        let line = line.trim();
        if !line.starts_with('@') || !line.contains("go_default_library") {
            continue;
        }

        // @com_github_google_uuid//:go_default_library
        let Some((prefix, _)) = line.split_once("//") else {
            continue;
        };
        let repo = &prefix[1..];

        match map.lookup(repo) {
            Some(import_path) => extraction
                .packages
                .push(PackageRecord::synthetic(import_path, line)),
            None => extraction.skipped.push(repo.to_string()),
        }
    }

    extraction
}
