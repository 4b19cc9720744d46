use camino::Utf8PathBuf;

use clap::{crate_version, value_parser, Arg, ArgAction, Command, ValueHint};

pub fn clap() -> clap::Command {
    fn input() -> Arg {
        Arg::new("input")
            .help("driver analysis file to load [default: gopackages_analysis_output.json]")
            .short('i')
            .long("input")
            .env("PKGMERGE_INPUT")
            .num_args(1)
            .value_name("FILE")
            .value_parser(clap::value_parser!(Utf8PathBuf))
            .value_hint(ValueHint::FilePath)
    }

    fn output() -> Arg {
        Arg::new("output")
            .help("combined analysis file to write [default: combined_packages_analysis.json]")
            .short('o')
            .long("output")
            .env("PKGMERGE_OUTPUT")
            .num_args(1)
            .value_name("FILE")
            .value_parser(clap::value_parser!(Utf8PathBuf))
            .value_hint(ValueHint::FilePath)
    }

    fn target() -> Arg {
        Arg::new("target")
            .help("bazel target whose deps to query [default: //src/main:main]")
            .short('t')
            .long("target")
            .env("PKGMERGE_TARGET")
            .num_args(1)
            .value_name("LABEL")
    }

    fn workdir() -> Arg {
        Arg::new("workdir")
            .help("directory to run bazel in [default: .]")
            .short('w')
            .long("workdir")
            .num_args(1)
            .value_name("DIR")
            .value_parser(clap::value_parser!(Utf8PathBuf))
            .value_hint(ValueHint::DirPath)
    }

    fn bazel() -> Arg {
        Arg::new("bazel")
            .help("bazel binary to invoke [default: bazel]")
            .long("bazel")
            .env("PKGMERGE_BAZEL")
            .num_args(1)
            .value_name("BIN")
            .value_hint(ValueHint::CommandName)
    }

    fn bazel_args() -> Arg {
        Arg::new("bazel-args")
            .help("extra arguments passed to bazel query (shell-quoted string)")
            .long("bazel-args")
            .num_args(1)
            .value_name("ARGS")
    }

    fn verbose() -> Arg {
        Arg::new("verbose")
            .help("be verbose (e.g., list skipped repositories)")
            .short('v')
            .long("verbose")
            .action(ArgAction::Count)
    }

    fn quiet() -> Arg {
        Arg::new("quiet")
            .help("suppress progress and summary output")
            .short('q')
            .long("quiet")
            .action(ArgAction::SetTrue)
    }

    Command::new("pkgmerge")
        .version(crate_version!())
        .about("Merge gopackagesdriver output with external Go packages from the bazel graph")
        .infer_subcommands(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("chdir")
                .short('C')
                .long("chdir")
                .help("change working directory before doing anything else")
                .global(true)
                .required(false)
                .value_parser(clap::value_parser!(Utf8PathBuf))
                .value_hint(ValueHint::DirPath)
                .num_args(1),
        )
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .help("configuration file [default: pkgmerge.yml, if present]")
                .global(true)
                .required(false)
                .value_name("FILE")
                .value_parser(clap::value_parser!(Utf8PathBuf))
                .value_hint(ValueHint::FilePath)
                .num_args(1),
        )
        .subcommand(
            Command::new("merge")
                .about("combine stdlib and external package lists into one document")
                .next_help_heading("Input/output")
                .arg(input())
                .arg(output())
                .next_help_heading("Bazel query")
                .arg(target())
                .arg(workdir())
                .arg(bazel())
                .arg(bazel_args())
                .arg(
                    Arg::new("stdlib-only")
                        .long("stdlib-only")
                        .help("skip the bazel query, merge stdlib packages only")
                        .action(ArgAction::SetTrue),
                )
                .next_help_heading("Behavior")
                .arg(
                    Arg::new("strict")
                        .long("strict")
                        .help("fail on query errors and unknown repositories instead of degrading")
                        .action(ArgAction::SetTrue),
                )
                .arg(verbose())
                .arg(quiet()),
        )
        .subcommand(
            Command::new("mappings")
                .about("print the effective repository-to-import-path table"),
        )
        .subcommand(
            Command::new("completion")
                .about("Generate pkgmerge shell completions.")
                .arg(
                    Arg::new("generator")
                        .help("shell to generate completions for")
                        .long("generate")
                        .value_parser(value_parser!(clap_complete::Shell)),
                )
                .hide(true),
        )
}
