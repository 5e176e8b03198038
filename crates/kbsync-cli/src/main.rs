//! kbsync: knowledge-base sync between authoring spreadsheets and a helpdesk

#![warn(unreachable_pub)]

mod commands;
mod config;

use anyhow::{bail, Context};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use config::{SyncConfig, DEFAULT_CONFIG_FILE};
use kbsync_api::{HelpdeskClient, HttpTransport, HydrateOptions};
use kbsync_engine::{CreateOptions, SyncEngine};
use kbsync_model::Portal;
use kbsync_sheet::{CellStore, JsonWorkbookFile, ParseError, ParseOptions, SheetsClient};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

fn cli() -> Command {
    let snapshot = || {
        Arg::new("snapshot")
            .required(true)
            .value_parser(value_parser!(PathBuf))
            .help("Portal snapshot file")
    };
    let output = || {
        Arg::new("output")
            .long("output")
            .short('o')
            .required(true)
            .value_parser(value_parser!(PathBuf))
            .help("File to write")
    };
    let categories = || {
        Arg::new("category")
            .long("category")
            .action(ArgAction::Append)
            .value_parser(value_parser!(usize))
            .help("Category index to include (repeatable; default: all)")
    };

    Command::new("kbsync")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Sync knowledge-base content between spreadsheets and a helpdesk")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .global(true)
                .default_value(DEFAULT_CONFIG_FILE)
                .value_parser(value_parser!(PathBuf))
                .help("Configuration file"),
        )
        .arg(
            Arg::new("log-json")
                .long("log-json")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Emit logs as JSON lines"),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .global(true)
                .action(ArgAction::Count)
                .help("More diagnostics (repeatable)"),
        )
        .subcommand(
            Command::new("parse")
                .about("Read a JSON workbook into a portal snapshot")
                .arg(
                    Arg::new("workbook")
                        .required(true)
                        .value_parser(value_parser!(PathBuf))
                        .help("Workbook JSON file"),
                )
                .arg(output())
                .arg(
                    Arg::new("portal-name")
                        .long("portal-name")
                        .help("Portal name (default: workbook title)"),
                )
                .arg(
                    Arg::new("exclude-sheet")
                        .long("exclude-sheet")
                        .action(ArgAction::Append)
                        .help("Sheet name to skip (repeatable)"),
                )
                .arg(
                    Arg::new("exclude-index")
                        .long("exclude-index")
                        .action(ArgAction::Append)
                        .value_parser(value_parser!(usize))
                        .help("Sheet position to skip (repeatable)"),
                ),
        )
        .subcommand(
            Command::new("show")
                .about("Print a snapshot's tree and counts")
                .arg(snapshot()),
        )
        .subcommand(
            Command::new("push")
                .about("Create the snapshot's categories on the helpdesk")
                .arg(snapshot())
                .arg(categories())
                .arg(
                    Arg::new("translations")
                        .long("translations")
                        .action(ArgAction::SetTrue)
                        .help("Also create translations"),
                )
                .arg(
                    Arg::new("children")
                        .long("children")
                        .action(ArgAction::SetTrue)
                        .help("Also create folders and articles"),
                )
                .arg(
                    Arg::new("suffix")
                        .long("suffix")
                        .help("Suffix appended to category names"),
                )
                .arg(
                    Arg::new("write-back")
                        .long("write-back")
                        .action(ArgAction::SetTrue)
                        .help("Write category IDs into the source spreadsheet"),
                )
                .arg(
                    Arg::new("workbook")
                        .long("workbook")
                        .value_parser(value_parser!(PathBuf))
                        .help("Local workbook JSON for write-back (default: [sheets] service)"),
                ),
        )
        .subcommand(
            Command::new("pull")
                .about("Read the helpdesk tree into a portal snapshot")
                .arg(
                    Arg::new("name")
                        .required(true)
                        .help("Portal name"),
                )
                .arg(output())
                .arg(categories()),
        )
        .subcommand(
            Command::new("preview")
                .about("Render a snapshot as an HTML page")
                .arg(snapshot())
                .arg(output())
                .arg(
                    Arg::new("stylesheet")
                        .long("stylesheet")
                        .help("Stylesheet URL"),
                ),
        )
        .subcommand(
            Command::new("delete")
                .about("Delete one node from the helpdesk")
                .arg(snapshot())
                .arg(
                    Arg::new("path")
                        .required(true)
                        .help("category[/folder[/article]] list indices, e.g. 0/2/1"),
                ),
        )
}

fn init_logging(json: bool, verbosity: u8) -> anyhow::Result<()> {
    let default = match verbosity {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(default))?;
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    let installed = if json {
        subscriber.json().try_init()
    } else {
        subscriber.try_init()
    };
    installed.map_err(|e| anyhow::anyhow!("failed to install log subscriber: {e}"))
}

fn path_arg(args: &ArgMatches, id: &str) -> anyhow::Result<PathBuf> {
    args.get_one::<PathBuf>(id)
        .cloned()
        .with_context(|| format!("missing <{id}>"))
}

fn indices(args: &ArgMatches, id: &str) -> Vec<usize> {
    args.get_many::<usize>(id)
        .map(|values| values.copied().collect())
        .unwrap_or_default()
}

fn load_snapshot(args: &ArgMatches) -> anyhow::Result<(PathBuf, Portal)> {
    let path = path_arg(args, "snapshot")?;
    let portal =
        Portal::load(&path).with_context(|| format!("failed to load {}", path.display()))?;
    Ok((path, portal))
}

fn connect(config: &SyncConfig) -> anyhow::Result<HelpdeskClient<HttpTransport>> {
    config.helpdesk.validate()?;
    let transport = HttpTransport::new(&config.helpdesk)?;
    tracing::info!(base_url = transport.base_url(), "connecting to helpdesk");
    Ok(HelpdeskClient::connect(transport, &config.helpdesk))
}

fn run_parse(args: &ArgMatches) -> anyhow::Result<ExitCode> {
    let workbook = path_arg(args, "workbook")?;
    let output = path_arg(args, "output")?;

    let mut options = ParseOptions::default();
    if let Some(name) = args.get_one::<String>("portal-name") {
        options = options.with_portal_name(name);
    }
    for name in args.get_many::<String>("exclude-sheet").into_iter().flatten() {
        options = options.exclude_sheet(name);
    }
    for index in indices(args, "exclude-index") {
        options = options.exclude_index(index);
    }

    let report = commands::parse_workbook_file(&workbook, &options)?;
    report.portal.save(&output)?;
    println!("{}", commands::summary(&report.portal));

    let malformed = report
        .issues
        .iter()
        .filter(|issue| matches!(issue, ParseError::MalformedGrid { .. }))
        .count();
    if malformed > 0 {
        tracing::error!(malformed, "some sheets were only partially read");
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}

fn run_push(args: &ArgMatches, config: &SyncConfig) -> anyhow::Result<ExitCode> {
    let (path, mut portal) = load_snapshot(args)?;
    let categories = commands::select_categories(&portal, &indices(args, "category"))?;

    let mut options = CreateOptions::default()
        .with_translations(args.get_flag("translations"))
        .with_children(args.get_flag("children"));
    if let Some(suffix) = args.get_one::<String>("suffix") {
        options = options.with_suffix(suffix);
    }

    let store: Option<Box<dyn CellStore>> = if !args.get_flag("write-back") {
        None
    } else if let Some(workbook) = args.get_one::<PathBuf>("workbook") {
        Some(Box::new(JsonWorkbookFile::new(workbook)))
    } else if let Some(sheets) = &config.sheets {
        Some(Box::new(SheetsClient::new(sheets)?))
    } else {
        bail!("--write-back needs --workbook or a [sheets] section in the configuration");
    };

    let client = connect(config)?;
    let mut engine =
        SyncEngine::new(client).with_portal_scope(config.helpdesk.portal_scope_ids.clone());
    let summary = commands::push(
        &mut engine,
        &mut portal,
        &categories,
        &options,
        store.as_deref(),
    );
    portal.save(&path)?;

    println!("{}", summary.report);
    if store.is_some() {
        println!("wrote back {} category id(s)", summary.written_back);
    }
    Ok(if summary.report.is_clean() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn run_pull(args: &ArgMatches, config: &SyncConfig) -> anyhow::Result<ExitCode> {
    let output = path_arg(args, "output")?;
    let name = args
        .get_one::<String>("name")
        .context("missing <name>")?;
    let mut options = HydrateOptions::default().with_verbosity(args.get_count("verbose"));
    let subset = indices(args, "category");
    if !subset.is_empty() {
        options = options.with_categories(subset);
    }

    let client = connect(config)?;
    let report = commands::pull(&client, name, options)?;
    report.portal.save(&output)?;
    println!("{}", commands::summary(&report.portal));
    if report.is_complete() {
        Ok(ExitCode::SUCCESS)
    } else {
        eprintln!("{} subtree(s) could not be read:", report.issues.len());
        for issue in &report.issues {
            eprintln!("  {issue}");
        }
        Ok(ExitCode::FAILURE)
    }
}

fn run_preview(args: &ArgMatches, config: &SyncConfig) -> anyhow::Result<ExitCode> {
    let (_, portal) = load_snapshot(args)?;
    let output = path_arg(args, "output")?;
    let mut options = config.preview.clone();
    if let Some(url) = args.get_one::<String>("stylesheet") {
        options = options.with_stylesheet(url);
    }
    commands::write_preview_file(&portal, &options, &output)?;
    tracing::info!(path = %output.display(), "preview written");
    Ok(ExitCode::SUCCESS)
}

fn run_delete(args: &ArgMatches, config: &SyncConfig) -> anyhow::Result<ExitCode> {
    let (path, mut portal) = load_snapshot(args)?;
    let node_path = args.get_one::<String>("path").context("missing <path>")?;
    let node = commands::resolve_node(&portal, node_path)?;

    let mut engine = SyncEngine::new(connect(config)?);
    let outcome = engine.delete(&mut portal, node)?;
    portal.save(&path)?;
    println!("{node}: {outcome:?}");
    Ok(ExitCode::SUCCESS)
}

fn main() -> anyhow::Result<ExitCode> {
    let matches = cli().get_matches();
    let Some((name, args)) = matches.subcommand() else {
        return Ok(ExitCode::FAILURE);
    };

    init_logging(args.get_flag("log-json"), args.get_count("verbose"))?;
    let config_path = path_arg(args, "config")?;
    let config = SyncConfig::load(&config_path)?.with_env();

    match name {
        "parse" => run_parse(args),
        "show" => {
            let (_, portal) = load_snapshot(args)?;
            println!("{}", commands::summary(&portal));
            Ok(ExitCode::SUCCESS)
        }
        "push" => run_push(args, &config),
        "pull" => run_pull(args, &config),
        "preview" => run_preview(args, &config),
        "delete" => run_delete(args, &config),
        other => bail!("unknown command '{other}'"),
    }
}
