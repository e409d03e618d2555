use clap::{Arg, ArgAction, Command};

pub fn build_cli() -> Command {
    Command::new("person-enricher")
        .about("Person record service with name-based attribute lookup (stdio JSON-RPC)")
        .arg(
            Arg::new("log-level")
                .long("log-level")
                .num_args(1)
                .help("Override RUST_LOG level (e.g., info, debug)"),
        )
        .arg(
            Arg::new("version")
                .long("version")
                .help("Print version and exit")
                .action(ArgAction::SetTrue),
        )
}

/// Explicit level wins, then RUST_LOG, then `info`. Output goes to stderr.
pub fn init_logging(level: Option<&str>) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if let Some(lvl) = level {
        builder.parse_filters(lvl);
    }
    builder.target(env_logger::Target::Stderr).init();
}
