use std::path::PathBuf;

use clap::{command, value_parser, Arg, ArgAction, Command};

pub fn command_builder() -> Command {
    command!()
        .max_term_width(100)
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .help("Read configuration from this file")
                .long_help("Read configuration from this file instead of /etc/sdesk/update.toml. Unlike the default location, the file must exist")
                .value_parser(value_parser!(PathBuf))
                .num_args(1),
        )
        .arg(
            Arg::new("lock_file")
                .long("lock-file")
                .help("Pacman database lock to wait for")
                .value_parser(value_parser!(PathBuf))
                .num_args(1),
        )
        .arg(
            Arg::new("directives")
                .long("directives")
                .help("Base package list to apply")
                .value_parser(value_parser!(PathBuf))
                .num_args(1),
        )
        .arg(
            Arg::new("dbpath")
                .long("dbpath")
                .help("Pacman database root, the directory holding `local/'")
                .value_parser(value_parser!(PathBuf))
                .num_args(1),
        )
        .arg(
            Arg::new("timeout")
                .long("timeout")
                .help("Seconds to wait for the pacman lock before giving up")
                .value_parser(value_parser!(u64))
                .num_args(1),
        )
        .arg(
            Arg::new("dry_run")
                .long("dry-run")
                .help("Print planned package changes without running pacman")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("strict")
                .long("strict")
                .help("Exit with an error if any pacman invocation failed")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("debug")
                .long("debug")
                .help("Run with debug output")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("no_color")
                .long("no-color")
                .help("No color output")
                .action(ArgAction::SetTrue),
        )
}
