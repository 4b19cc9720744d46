#[macro_use]
extern crate anyhow;
extern crate clap;

#[macro_use]
extern crate derive_builder;

#[macro_use]
extern crate serde_derive;

use std::env;
use std::thread;

use anyhow::{Context as _, Result};
use camino::Utf8PathBuf;
use itertools::Itertools;
use signal_hook::{consts::SIGINT, iterator::Signals};

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

mod bazel;
mod cli;
mod combine;
mod config;
mod driver;
mod mapping;
mod model;

use bazel::BazelCmdBuilder;
use config::Config;
use model::PackageRecord;

fn main() {
    let result = try_main();
    match result {
        Err(e) => {
            eprintln!("pkgmerge: error: {e:#}");
            std::process::exit(1);
        }
        Ok(code) => std::process::exit(code),
    };
}

fn try_main() -> Result<i32> {
    let mut signals = Signals::new([SIGINT])?;

    thread::spawn(move || {
        for sig in signals.forever() {
            if sig == SIGINT {
                std::process::exit(130);
            }
        }
    });

    let matches = cli::clap().get_matches();

    // handle completion subcommand here, so the config loading is skipped
    if let Some(("completion", matches)) = matches.subcommand() {
        fn print_completions<G: clap_complete::Generator>(gen: G, cmd: &mut clap::Command) {
            clap_complete::generate(gen, cmd, cmd.get_name().to_string(), &mut std::io::stdout());
        }
        if let Some(generator) = matches
            .get_one::<clap_complete::Shell>("generator")
            .copied()
        {
            let mut cmd = cli::clap();
            eprintln!("Generating completion file for {}...", generator);
            print_completions(generator, &mut cmd);
        }
        return Ok(0);
    }

    if let Some(dir) = matches.get_one::<Utf8PathBuf>("chdir") {
        env::set_current_dir(dir).context(format!("cannot change to directory \"{dir}\""))?;
    }

    // an explicitly given config file must exist; the default one may not
    let (config_file, config_required) = match matches.get_one::<Utf8PathBuf>("config") {
        Some(file) => (file.clone(), true),
        None => (Utf8PathBuf::from("pkgmerge.yml"), false),
    };
    let mut config = Config::load(&config_file, config_required)?;

    match matches.subcommand() {
        Some(("merge", merge_matches)) => {
            config.apply_matches(merge_matches)?;

            let options = MergeOptions {
                verbose: merge_matches.get_count("verbose"),
                quiet: merge_matches.get_flag("quiet"),
                strict: merge_matches.get_flag("strict"),
                stdlib_only: merge_matches.get_flag("stdlib-only"),
            };

            run_merge(&config, &options)
        }
        Some(("mappings", _)) => {
            for (repo, import_path) in config.repositories.iter() {
                println!("{repo} {import_path}");
            }
            Ok(0)
        }
        _ => Ok(0),
    }
}

struct MergeOptions {
    verbose: u8,
    quiet: bool,
    strict: bool,
    stdlib_only: bool,
}

fn run_merge(config: &Config, options: &MergeOptions) -> Result<i32> {
    if !options.quiet {
        println!("pkgmerge: loading driver output from \"{}\"", config.input);
    }
    let stdlib = driver::load(&config.input)?;
    if !options.quiet {
        println!("pkgmerge: loaded {} stdlib packages", stdlib.packages.len());
    }

    let external = if options.stdlib_only {
        Vec::new()
    } else {
        query_external(config, options)?
    };

    let combined = combine::combine(stdlib, external);
    for id in &combined.duplicates {
        eprintln!("pkgmerge: warning: dropping external package \"{id}\" already present in stdlib set");
    }

    combine::write(&combined.document, &config.output)?;

    if !options.quiet {
        println!("pkgmerge: combined analysis saved to \"{}\"", config.output);
        if let Some(summary) = &combined.document.summary {
            println!("pkgmerge: total packages: {}", summary.total_packages);
            println!("pkgmerge: stdlib packages: {}", summary.stdlib_packages);
            println!("pkgmerge: external packages: {}", summary.external_packages);
            if !summary.external_packages_list.is_empty() {
                println!("pkgmerge: external packages found:");
                for pkg_path in &summary.external_packages_list {
                    println!("  - {pkg_path}");
                }
            }
        }
    }

    Ok(0)
}

fn query_external(config: &Config, options: &MergeOptions) -> Result<Vec<PackageRecord>> {
    if !options.quiet {
        println!(
            "pkgmerge: querying \"deps({})\" via \"{}\"",
            config.target, config.bazel
        );
    }

    let bazel_cmd = BazelCmdBuilder::default()
        .binary(config.bazel.clone())
        .target(config.target.clone())
        .workdir(config.workdir.clone())
        .extra_args(config.bazel_args.clone())
        .build()
        .unwrap();

    let labels = match bazel_cmd.query_deps() {
        Ok(labels) => labels,
        Err(e) => {
            if options.strict {
                return Err(e).context("bazel query failed");
            }
            eprintln!("pkgmerge: warning: {e}");
            eprintln!("pkgmerge: warning: continuing with stdlib packages only");
            return Ok(Vec::new());
        }
    };

    let extraction = bazel::extract_from_labels(&labels, &config.repositories);

    if !extraction.skipped.is_empty() {
        if options.strict {
            bail!(
                "no import path mapping for bazel repositories: {}",
                extraction.skipped.iter().join(", ")
            );
        }
        if options.verbose > 0 {
            for repo in &extraction.skipped {
                eprintln!("pkgmerge: skipping unmapped bazel repository \"{repo}\"");
            }
        }
    }

    if !options.quiet {
        if extraction.packages.is_empty() {
            println!("pkgmerge: no external packages found");
        } else {
            println!(
                "pkgmerge: found {} external packages",
                extraction.packages.len()
            );
        }
    }

    Ok(extraction.packages)
}

#[cfg(test)]
mod test {
    use camino::Utf8PathBuf;

    use crate::config::Config;
    use crate::model::AnalysisDocument;
    use crate::{query_external, run_merge, MergeOptions};

    #[test]
    fn test_clap() {
        crate::cli::clap().debug_assert();
    }

    fn options(strict: bool) -> MergeOptions {
        MergeOptions {
            verbose: 0,
            quiet: true,
            strict,
            stdlib_only: false,
        }
    }

    #[test]
    fn failed_query_degrades_to_empty_list_unless_strict() {
        let mut config = Config::default();
        config.bazel = "false".to_string();

        let external = query_external(&config, &options(false)).unwrap();
        assert!(external.is_empty());

        assert!(query_external(&config, &options(true)).is_err());
    }

    #[test]
    fn failed_query_still_writes_stdlib_only_output() {
        let dir = tempfile::tempdir().unwrap();
        let dir = Utf8PathBuf::from(dir.path().to_str().unwrap());

        let input = dir.join("driver.json");
        std::fs::write(
            &input,
            "{\"NotHandled\":false,\"Roots\":[\"fmt\"],\"Packages\":[{\"ID\":\"fmt\"}]}",
        )
        .unwrap();

        let mut config = Config::default();
        config.input = input;
        config.output = dir.join("combined.json");
        config.bazel = "false".to_string();

        assert_eq!(run_merge(&config, &options(false)).unwrap(), 0);

        let content = std::fs::read_to_string(&config.output).unwrap();
        let document: AnalysisDocument = serde_json::from_str(&content).unwrap();
        let summary = document.summary.unwrap();
        assert_eq!(summary.stdlib_packages, 1);
        assert_eq!(summary.external_packages, 0);
        assert!(summary.external_packages_list.is_empty());
        assert_eq!(document.packages.len(), 1);
    }
}
