use anyhow::Result;
use env_logger::{Builder, Env};
use log::error;

mod cli;
mod util;
mod cmd_detect;
mod cmd_snapshot;
mod cmd_restore;
mod cmd_reset;
mod cmd_list;
mod cmd_delete;
mod cmd_tag;
mod cmd_cleanup;
mod cmd_size;
mod cmd_init_config;

fn init_logger(quiet: bool, verbose: bool) {
    // RUST_LOG wins; otherwise info (warn with --quiet, debug with --verbose).
    let default = if verbose {
        "debug"
    } else if quiet {
        "warn"
    } else {
        "info"
    };
    Builder::from_env(Env::default().default_filter_or(default))
        .format_timestamp_millis()
        .init();
}

fn main() {
    let cli = cli::Cli::parse();
    init_logger(cli.global.quiet, cli.global.verbose);

    if let Err(e) = run(cli) {
        error!("{:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: cli::Cli) -> Result<()> {
    let ctx = util::Ctx::load(&cli.global)?;
    match cli.cmd {
        cli::Cmd::Detect { json } =>
            cmd_detect::exec(ctx, json),

        cli::Cmd::Snapshot { name, tags, description, meta, filter } =>
            cmd_snapshot::exec(ctx.with_filter(&filter), name, tags, description, meta),

        cli::Cmd::Restore { name } =>
            cmd_restore::exec(ctx, name),

        cli::Cmd::Reset { filter } =>
            cmd_reset::exec(ctx.with_filter(&filter)),

        cli::Cmd::List { tag, json } =>
            cmd_list::exec_list(ctx, tag, json),

        cli::Cmd::Show { name, json } =>
            cmd_list::exec_show(ctx, name, json),

        cli::Cmd::Delete { name } =>
            cmd_delete::exec(ctx, name),

        cli::Cmd::Tag { op } =>
            cmd_tag::exec_tag(ctx, op),

        cli::Cmd::Describe { name, text } =>
            cmd_tag::exec_describe(ctx, name, text),

        cli::Cmd::Annotate { name, entries } =>
            cmd_tag::exec_annotate(ctx, name, entries),

        cli::Cmd::Cleanup { json } =>
            cmd_cleanup::exec(ctx, json),

        cli::Cmd::Size { json } =>
            cmd_size::exec(ctx, json),

        cli::Cmd::InitConfig { out } =>
            cmd_init_config::exec(ctx, out),
    }
}
