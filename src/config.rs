//! Merge tool configuration.
//!
//! Precedence: built-in defaults, then `pkgmerge.yml` (if present), then
//! CLI flags. The config file is optional unless the user pointed at one
//! explicitly.

use std::fs::read_to_string;

use anyhow::{Context as _, Result};
use camino::{Utf8Path, Utf8PathBuf};
use clap::ArgMatches;
use indexmap::IndexMap;

use crate::mapping::RepoMap;

#[derive(Debug, Deserialize)]
struct ConfigFile {
    input: Option<Utf8PathBuf>,
    output: Option<Utf8PathBuf>,
    target: Option<String>,
    workdir: Option<Utf8PathBuf>,
    bazel: Option<String>,
    bazel_args: Option<String>,
    repositories: Option<IndexMap<String, String>>,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub input: Utf8PathBuf,
    pub output: Utf8PathBuf,
    pub target: String,
    pub workdir: Utf8PathBuf,
    pub bazel: String,
    pub bazel_args: Vec<String>,
    pub repositories: RepoMap,
}

impl Default for Config {
    fn default() -> Config {
        Config {
            input: "gopackages_analysis_output.json".into(),
            output: "combined_packages_analysis.json".into(),
            target: "//src/main:main".into(),
            workdir: ".".into(),
            bazel: "bazel".into(),
            bazel_args: Vec::new(),
            repositories: RepoMap::default(),
        }
    }
}

impl Config {
    pub fn load(file: &Utf8Path, required: bool) -> Result<Config> {
        let mut config = Config::default();

        if file.exists() {
            let content =
                read_to_string(file).with_context(|| format!("reading config \"{file}\""))?;
            let parsed: ConfigFile = serde_yaml::from_str(&content)
                .with_context(|| format!("while parsing \"{file}\""))?;
            config.apply_file(parsed)?;
        } else if required {
            bail!("config file \"{file}\" not found");
        }

        Ok(config)
    }

    fn apply_file(&mut self, file: ConfigFile) -> Result<()> {
        if let Some(input) = file.input {
            self.input = input;
        }
        if let Some(output) = file.output {
            self.output = output;
        }
        if let Some(target) = file.target {
            self.target = target;
        }
        if let Some(workdir) = file.workdir {
            self.workdir = workdir;
        }
        if let Some(bazel) = file.bazel {
            self.bazel = bazel;
        }
        if let Some(args) = file.bazel_args {
            self.bazel_args =
                shell_words::split(&args).context("splitting configured bazel_args")?;
        }
        if let Some(repositories) = file.repositories {
            self.repositories.extend(repositories);
        }
        Ok(())
    }

    /// CLI flags win over anything the config file set.
    pub fn apply_matches(&mut self, matches: &ArgMatches) -> Result<()> {
        if let Some(input) = matches.get_one::<Utf8PathBuf>("input") {
            self.input = input.clone();
        }
        if let Some(output) = matches.get_one::<Utf8PathBuf>("output") {
            self.output = output.clone();
        }
        if let Some(target) = matches.get_one::<String>("target") {
            self.target = target.clone();
        }
        if let Some(workdir) = matches.get_one::<Utf8PathBuf>("workdir") {
            self.workdir = workdir.clone();
        }
        if let Some(bazel) = matches.get_one::<String>("bazel") {
            self.bazel = bazel.clone();
        }
        if let Some(args) = matches.get_one::<String>("bazel-args") {
            self.bazel_args = shell_words::split(args).context("splitting --bazel-args")?;
        }
        Ok(())
    }
}
