//! The package-graph document shapes shared by the driver output and the
//! combined result. Field names follow the Go side of the fence, so the
//! serialized form is what gopackagesdriver consumers already expect.

use indexmap::IndexMap;
use serde_json::Value;

use crate::mapping;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct PackageRecord {
    #[serde(rename = "ID")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub pkg_path: String,
    #[serde(default)]
    pub go_files: Vec<String>,
    #[serde(default)]
    pub compiled_go_files: Vec<String>,
    #[serde(default)]
    pub imports: IndexMap<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bazel_target: Option<String>,
    // whatever else the driver put in the record passes through untouched
    #[serde(flatten)]
    pub extra: IndexMap<String, Value>,
}

impl PackageRecord {
    /// A synthetic record for an external dependency discovered via the
    /// build graph. No file data is available for these, only the import
    /// path and the bazel label it came from.
    pub fn synthetic(import_path: &str, label: &str) -> PackageRecord {
        PackageRecord {
            id: import_path.to_string(),
            name: mapping::package_name(import_path).to_string(),
            pkg_path: import_path.to_string(),
            go_files: Vec::new(),
            compiled_go_files: Vec::new(),
            imports: IndexMap::new(),
            bazel_target: Some(label.to_string()),
            extra: IndexMap::new(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct AnalysisDocument {
    #[serde(default)]
    pub not_handled: bool,
    #[serde(default = "default_compiler")]
    pub compiler: String,
    #[serde(default = "default_arch")]
    pub arch: String,
    #[serde(default)]
    pub roots: Vec<String>,
    #[serde(default)]
    pub packages: Vec<PackageRecord>,
    #[serde(default)]
    pub go_version: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<Summary>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct Summary {
    pub total_packages: usize,
    pub stdlib_packages: usize,
    pub external_packages: usize,
    pub external_packages_list: Vec<String>,
}

fn default_compiler() -> String {
    "gc".to_string()
}

fn default_arch() -> String {
    "arm64".to_string()
}
