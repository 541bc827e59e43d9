use clap::{Arg, ArgAction, ArgMatches, Command};
use colored::Colorize;
use log::info;
use pacrestore::{
    backend::CliBackend, cache::CacheIndex, config::Config, install::Installer, report,
    resolver::Resolver, RestoreResult, PACRESTORE_VERSION,
};
use std::path::PathBuf;

fn main() {
    env_logger::init();
    let matches = build_cli().get_matches();
    if matches.get_flag("no-color") {
        colored::control::set_override(false);
    }

    match run(&matches) {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("{}: {}", "Error".red().bold(), e);
            std::process::exit(1);
        }
    }
}

fn build_cli() -> Command {
    Command::new("pacrestore")
        .version(PACRESTORE_VERSION)
        .about("Install locally cached pacman packages together with their dependencies")
        .arg(
            Arg::new("use-cache-only")
                .short('u')
                .long("use-cache-only")
                .action(ArgAction::SetTrue)
                .help("Install packages only from the local cache"),
        )
        .arg(
            Arg::new("cachedir")
                .short('c')
                .long("cachedir")
                .value_name("DIR")
                .help("Path of pacman's package cache"),
        )
        .arg(
            Arg::new("force")
                .short('f')
                .long("force")
                .action(ArgAction::SetTrue)
                .help("Force installation of already installed packages"),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .value_name("FILE")
                .help("Path of the configuration file"),
        )
        .arg(
            Arg::new("no-color")
                .long("no-color")
                .action(ArgAction::SetTrue)
                .help("Disable colored output"),
        )
        .arg(
            Arg::new("package_names")
                .required(true)
                .num_args(1..)
                .help("Names of the packages to install"),
        )
}

fn run(matches: &ArgMatches) -> RestoreResult<bool> {
    if !is_root_user() {
        eprintln!("{}", "pacrestore needs to be run as root".red());
        return Ok(false);
    }

    let mut config = Config::load(matches.get_one::<String>("config").map(|s| s.as_str()))?;
    if let Some(dir) = matches.get_one::<String>("cachedir") {
        config.cache_dir = PathBuf::from(dir);
    }
    if matches.get_flag("use-cache-only") {
        config.use_cache_only = true;
    }
    if matches.get_flag("force") {
        config.force = true;
    }
    if !config.color {
        colored::control::set_override(false);
    }

    let package_names: Vec<String> = matches
        .get_many::<String>("package_names")
        .unwrap_or_default()
        .map(|name| name.to_lowercase())
        .collect();

    let cache = CacheIndex::scan(&config.cache_dir)?;
    info!(
        "indexed {} cached archives in {}",
        cache.len(),
        config.cache_dir.display()
    );

    let backend = CliBackend::new(config.cache_dir.clone());
    let mut graph = Resolver::new(&cache, &backend).resolve_all(&package_names);
    Installer::new(&mut graph, &backend, &config).install_all(&package_names);

    println!("\n{}", "Installation Statistics:".cyan());
    let mut all_ok = true;
    for name in &package_names {
        let (ok, lines) = report::render(&graph, name);
        for line in &lines {
            if ok {
                println!("{}", line.green());
            } else {
                println!("{}", line.red());
            }
        }
        all_ok &= ok;
    }
    Ok(all_ok)
}

fn is_root_user() -> bool {
    unsafe { libc::geteuid() == 0 }
}
