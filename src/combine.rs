//! Merging the stdlib document with externally discovered packages, and
//! writing the combined result.

use std::collections::HashSet;
use std::fs::File;
use std::io::{BufWriter, Write as _};

use anyhow::{Context as _, Result};
use camino::Utf8Path;

use crate::model::{AnalysisDocument, PackageRecord, Summary};

#[derive(Debug)]
pub struct Combined {
    pub document: AnalysisDocument,
    /// External package IDs dropped because a stdlib package already
    /// claimed the same ID. Combined `Packages` stays unique per ID.
    pub duplicates: Vec<String>,
}

/// Merge stdlib packages with the external list. Stdlib entries keep their
/// original order, external entries follow in extraction order; roots and
/// the summary are recomputed accordingly. Pure: same inputs, same output.
pub fn combine(stdlib: AnalysisDocument, external: Vec<PackageRecord>) -> Combined {
    let stdlib_count = stdlib.packages.len();
    let stdlib_ids: HashSet<String> = stdlib.packages.iter().map(|p| p.id.clone()).collect();

    let mut duplicates = Vec::new();
    let mut kept = Vec::new();
    for pkg in external {
        if stdlib_ids.contains(&pkg.id) {
            duplicates.push(pkg.id);
        } else {
            kept.push(pkg);
        }
    }

    let mut roots = stdlib.roots;
    roots.extend(kept.iter().map(|pkg| pkg.id.clone()));

    let external_list: Vec<String> = kept.iter().map(|pkg| pkg.pkg_path.clone()).collect();

    let mut packages = stdlib.packages;
    packages.extend(kept);

    let document = AnalysisDocument {
        not_handled: false,
        compiler: stdlib.compiler,
        arch: stdlib.arch,
        roots,
        go_version: stdlib.go_version,
        summary: Some(Summary {
            total_packages: packages.len(),
            stdlib_packages: stdlib_count,
            external_packages: external_list.len(),
            external_packages_list: external_list,
        }),
        packages,
    };

    Combined {
        document,
        duplicates,
    }
}

pub fn write(document: &AnalysisDocument, path: &Utf8Path) -> Result<()> {
    let mut buffer = BufWriter::new(
        File::create(path).with_context(|| format!("creating output file \"{path}\""))?,
    );
    serde_json::to_writer_pretty(&mut buffer, document)
        .with_context(|| format!("serializing combined analysis to \"{path}\""))?;
    buffer
        .flush()
        .with_context(|| format!("writing \"{path}\""))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stdlib_doc(ids: &[&str]) -> AnalysisDocument {
        let packages = ids
            .iter()
            .map(|id| {
                serde_json::from_value(serde_json::json!({
                    "ID": id,
                    "Name": id,
                    "PkgPath": id,
                    "GoFiles": [format!("/go/src/{id}/{id}.go")],
                }))
                .unwrap()
            })
            .collect();
        AnalysisDocument {
            not_handled: false,
            compiler: "gc".to_string(),
            arch: "arm64".to_string(),
            roots: ids.iter().map(|id| id.to_string()).collect(),
            packages,
            go_version: 21,
            summary: None,
        }
    }

    #[test]
    fn empty_external_list_passes_stdlib_through() {
        let stdlib = stdlib_doc(&["fmt", "os"]);
        let expected = stdlib.packages.clone();

        let combined = combine(stdlib, Vec::new());
        let doc = combined.document;

        assert_eq!(doc.packages, expected);
        assert_eq!(doc.roots, vec!["fmt", "os"]);
        let summary = doc.summary.unwrap();
        assert_eq!(summary.total_packages, 2);
        assert_eq!(summary.stdlib_packages, 2);
        assert_eq!(summary.external_packages, 0);
        assert!(summary.external_packages_list.is_empty());
    }

    #[test]
    fn uuid_scenario() {
        let stdlib = stdlib_doc(&["fmt"]);
        let external = vec![PackageRecord::synthetic(
            "github.com/google/uuid",
            "@com_github_google_uuid//:go_default_library",
        )];

        let combined = combine(stdlib, external);
        let doc = combined.document;

        assert_eq!(doc.packages.len(), 2);
        assert_eq!(doc.packages[1].id, "github.com/google/uuid");
        assert_eq!(doc.roots, vec!["fmt", "github.com/google/uuid"]);

        let summary = doc.summary.unwrap();
        assert_eq!(summary.external_packages, 1);
        assert_eq!(
            summary.external_packages_list,
            vec!["github.com/google/uuid"]
        );
        assert!(combined.duplicates.is_empty());
    }

    #[test]
    fn metadata_passes_through() {
        let mut stdlib = stdlib_doc(&["fmt"]);
        stdlib.compiler = "gccgo".to_string();
        stdlib.arch = "amd64".to_string();
        stdlib.go_version = 22;

        let doc = combine(stdlib, Vec::new()).document;
        assert_eq!(doc.compiler, "gccgo");
        assert_eq!(doc.arch, "amd64");
        assert_eq!(doc.go_version, 22);
        assert!(!doc.not_handled);
    }

    #[test]
    fn duplicate_external_id_is_dropped_with_note() {
        let stdlib = stdlib_doc(&["fmt", "github.com/google/uuid"]);
        let external = vec![
            PackageRecord::synthetic(
                "github.com/google/uuid",
                "@com_github_google_uuid//:go_default_library",
            ),
            PackageRecord::synthetic(
                "github.com/gorilla/mux",
                "@com_github_gorilla_mux//:go_default_library",
            ),
        ];

        let combined = combine(stdlib, external);
        assert_eq!(combined.duplicates, vec!["github.com/google/uuid"]);

        let doc = combined.document;
        assert_eq!(doc.packages.len(), 3);
        let summary = doc.summary.unwrap();
        assert_eq!(summary.external_packages, 1);
        assert_eq!(summary.external_packages_list, vec!["github.com/gorilla/mux"]);
    }

    #[test]
    fn combine_is_deterministic() {
        let external = vec![PackageRecord::synthetic(
            "github.com/gorilla/mux",
            "@com_github_gorilla_mux//:go_default_library",
        )];
        let a = combine(stdlib_doc(&["fmt"]), external.clone()).document;
        let b = combine(stdlib_doc(&["fmt"]), external).document;
        assert_eq!(
            serde_json::to_string(&a).unwrap(),
            serde_json::to_string(&b).unwrap()
        );
    }

    #[test]
    fn write_produces_indented_json() {
        let doc = combine(stdlib_doc(&["fmt"]), Vec::new()).document;
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("combined.json");
        let path = Utf8Path::new(path.to_str().unwrap());

        write(&doc, path).unwrap();

        let content = std::fs::read_to_string(path).unwrap();
        assert!(content.starts_with("{\n  \"NotHandled\": false"));
        let reparsed: AnalysisDocument = serde_json::from_str(&content).unwrap();
        assert_eq!(reparsed, doc);
    }
}
