use clap::{value_t, App, AppSettings, Arg};
use std::error::Error;
use std::path::Path;
use std::process::ExitCode;
use tinyblog::build::build_site;
use tinyblog::config::Config;
use tinyblog::{init, serve};

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp(None)
        .format_target(false)
        .init();

    let matches = App::new("tinyblog")
        .version(env!("CARGO_PKG_VERSION"))
        .about(env!("CARGO_PKG_DESCRIPTION"))
        .setting(AppSettings::ColoredHelp)
        .arg(
            Arg::with_name("command")
                .possible_values(&["build", "serve", "init"])
                .default_value("build")
                .help("build: generate the site. serve: preview it locally. init: create an example post and build."),
        )
        .arg(
            Arg::with_name("port")
                .short("p")
                .long("port")
                .takes_value(true)
                .default_value("8000")
                .help("The port for `serve`"),
        )
        .arg(
            Arg::with_name("threads")
                .long("threads")
                .takes_value(true)
                .help("The number of threads used to parse posts (defaults to the number of CPUs)"),
        )
        .arg(
            Arg::with_name("project")
                .long("project")
                .takes_value(true)
                .default_value(".")
                .help("The blog directory, or any directory beneath it"),
        )
        .get_matches();

    let result = (|| -> Result<(), Box<dyn Error>> {
        let threads = match matches.is_present("threads") {
            true => Some(value_t!(matches, "threads", usize)?),
            false => None,
        };
        let project = Path::new(matches.value_of("project").unwrap_or("."));
        let config = Config::from_directory(project, threads)?;
        match matches.value_of("command").unwrap_or("build") {
            "init" => {
                match init::create_example_post(&config.posts_directory)? {
                    Some(path) => log::info!("Created example post: {}", path.display()),
                    None => log::info!("Example post already exists; leaving it alone"),
                }
                run_build(&config)
            }
            "serve" => {
                let port = value_t!(matches, "port", u16)?;
                prepare_serve(&config)?;
                serve::serve(&config.output_directory, port)?;
                Ok(())
            }
            _ => run_build(&config),
        }
    })();

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{}", err);
            ExitCode::FAILURE
        }
    }
}

fn run_build(config: &Config) -> Result<(), Box<dyn Error>> {
    match build_and_report(config)? {
        0 => Ok(()),
        failures => Err(format!("{} post(s) failed", failures).into()),
    }
}

/// Builds the site if it hasn't been built yet. Broken posts are reported but
/// don't keep the server from starting.
fn prepare_serve(config: &Config) -> Result<(), Box<dyn Error>> {
    if !config.output_directory.is_dir() {
        let failures = build_and_report(config)?;
        if failures > 0 {
            log::warn!("{} post(s) failed; serving the rest", failures);
        }
    }
    Ok(())
}

/// Builds the site and returns the number of failed posts.
fn build_and_report(config: &Config) -> Result<usize, Box<dyn Error>> {
    let summary = build_site(config)?;
    log::info!("{} post(s) generated", summary.posts);
    Ok(summary.failures)
}
