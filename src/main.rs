use anyhow::{Context, Result};
use cairn::build::build_site;
use cairn::config::Config;
use cairn::release::{release_one, Outcome};
use clap::{crate_version, App, AppSettings, Arg, SubCommand};
use env_logger::{Builder, Env};
use log::info;
use std::io::Write;
use std::path::PathBuf;

fn init_logging() {
    Builder::from_env(Env::default().filter_or("RUST_LOG", "info"))
        .format(|buf, record| {
            writeln!(
                buf,
                "{} {:<5} {}",
                chrono::Local::now().format("%H:%M:%S"),
                record.level(),
                record.args()
            )
        })
        .init();
}

fn main() -> Result<()> {
    init_logging();

    let matches = App::new("cairn")
        .version(crate_version!())
        .about("Builds the insights pages, pillar pages, sitemap and llms.txt")
        .setting(AppSettings::SubcommandRequiredElseHelp)
        .arg(
            Arg::with_name("project")
                .long("project")
                .short("p")
                .takes_value(true)
                .global(true)
                .help("The project directory (or any directory below it)"),
        )
        .subcommand(SubCommand::with_name("build").about("Generates the site"))
        .subcommand(
            SubCommand::with_name("release")
                .about("Moves the oldest draft into the content directory"),
        )
        .get_matches();

    let (name, sub_matches) = matches.subcommand();
    let project = sub_matches
        .and_then(|m| m.value_of("project"))
        .or_else(|| matches.value_of("project"))
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));
    let project = std::fs::canonicalize(&project)
        .with_context(|| format!("Resolving project directory `{}`", project.display()))?;
    let config = Config::from_directory(&project)?;

    match name {
        "build" => {
            let summary = build_site(&config)?;
            info!("Built insights: {} posts", summary.posts);
        }
        "release" => {
            let release = release_one(&config.drafts_directory, &config.content_directory)?;
            info!("{} draft(s) available", release.available);
            match release.outcome {
                Outcome::NoDrafts => info!("No drafts to release."),
                Outcome::Released { from, to, renamed } => info!(
                    "Released{}: {} -> {}",
                    if renamed { " (collision)" } else { "" },
                    from.display(),
                    to.display()
                ),
            }
        }
        _ => unreachable!("clap requires a known subcommand"),
    }
    Ok(())
}
