//! Translation of bazel external-repository identifiers to Go import paths.
//!
//! There is no general algorithm here on purpose. The mapping is a curated
//! table: the built-in entries cover the repositories the analysis pipeline
//! is known to pull in, and a project's `pkgmerge.yml` can extend or
//! override them.

use indexmap::IndexMap;

const BUILTIN: &[(&str, &str)] = &[
    ("com_github_google_uuid", "github.com/google/uuid"),
    ("com_github_gorilla_mux", "github.com/gorilla/mux"),
    ("com_github_sirupsen_logrus", "github.com/sirupsen/logrus"),
    ("org_golang_x_time", "golang.org/x/time/rate"),
    ("com_github_gin_gonic_gin", "github.com/gin-gonic/gin"),
    ("com_github_go_redis_redis_v8", "github.com/go-redis/redis/v8"),
    ("com_github_golang_jwt_jwt_v4", "github.com/golang-jwt/jwt/v4"),
    (
        "com_github_prometheus_client_golang",
        "github.com/prometheus/client_golang",
    ),
    ("org_golang_x_crypto", "golang.org/x/crypto"),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoMap {
    table: IndexMap<String, String>,
}

impl Default for RepoMap {
    fn default() -> RepoMap {
        RepoMap {
            table: BUILTIN
                .iter()
                .map(|(repo, import_path)| (repo.to_string(), import_path.to_string()))
                .collect(),
        }
    }
}

impl RepoMap {
    pub fn lookup(&self, repo: &str) -> Option<&str> {
        self.table.get(repo).map(String::as_str)
    }

    /// Add entries, overriding built-ins on key collision.
    pub fn extend<I>(&mut self, entries: I)
    where
        I: IntoIterator<Item = (String, String)>,
    {
        self.table.extend(entries);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.table
            .iter()
            .map(|(repo, import_path)| (repo.as_str(), import_path.as_str()))
    }
}

/// Last segment of an import path, e.g. "github.com/gorilla/mux" -> "mux".
pub fn package_name(import_path: &str) -> &str {
    import_path.rsplit('/').next().unwrap_or(import_path)
}
