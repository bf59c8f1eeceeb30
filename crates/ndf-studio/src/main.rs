//! `ndf-studio` command line

use anyhow::{Context, Result};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use ndf_graph::DeleteOutcome;
use ndf_studio::{Session, Studio, StudioConfig};
use serde::Serialize;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

fn session_args(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("user")
            .long("user")
            .short('u')
            .required(true)
            .help("User owning the graph"),
    )
    .arg(
        Arg::new("graph")
            .long("graph")
            .short('g')
            .required(true)
            .help("Graph id"),
    )
}

fn cli() -> Command {
    Command::new("ndf-studio")
        .version(ndf_studio::VERSION)
        .about("Compose polymorphic knowledge graphs from controlled natural language")
        .subcommand_required(true)
        .arg(
            Arg::new("config")
                .long("config")
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("TOML configuration file"),
        )
        .arg(
            Arg::new("data-dir")
                .long("data-dir")
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("Override the data directory"),
        )
        .subcommand(
            Command::new("parse")
                .about("Parse a CNL document and print facts and diagnostics")
                .arg(
                    Arg::new("file")
                        .required(true)
                        .value_parser(value_parser!(PathBuf))
                        .help("Document to parse"),
                ),
        )
        .subcommand(session_args(
            Command::new("ingest")
                .about("Ingest a CNL document into a graph, creating the graph if needed")
                .arg(
                    Arg::new("file")
                        .required(true)
                        .value_parser(value_parser!(PathBuf))
                        .help("Document to ingest"),
                )
                .arg(
                    Arg::new("description")
                        .long("description")
                        .default_value("")
                        .help("Description used when the graph is created"),
                ),
        ))
        .subcommand(session_args(
            Command::new("compose")
                .about("Print the flat view of a graph")
                .arg(
                    Arg::new("polymorphic")
                        .long("polymorphic")
                        .action(ArgAction::SetTrue)
                        .help("Print the morph-preserving view instead"),
                ),
        ))
        .subcommand(session_args(
            Command::new("delete-node")
                .about("Delete a node unless relations reference it")
                .arg(Arg::new("node").required(true).help("Node id")),
        ))
        .subcommand(session_args(
            Command::new("morph")
                .about("Create a morph on a node")
                .arg(Arg::new("node").required(true).help("Node id"))
                .arg(Arg::new("name").required(true).help("Morph name"))
                .arg(
                    Arg::new("copy-from")
                        .long("copy-from")
                        .help("Morph id whose members are copied"),
                )
                .arg(
                    Arg::new("activate")
                        .long("activate")
                        .action(ArgAction::SetTrue)
                        .help("Make the new morph active"),
                ),
        ))
}

fn load_config(matches: &ArgMatches) -> Result<StudioConfig> {
    let mut config = match matches.get_one::<PathBuf>("config") {
        Some(path) => StudioConfig::load(path)?,
        None => StudioConfig::default(),
    };
    if let Some(dir) = matches.get_one::<PathBuf>("data-dir") {
        config = config.with_data_dir(dir);
    }
    Ok(config)
}

fn init_tracing(config: &StudioConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn session(args: &ArgMatches) -> Result<Session> {
    let user = args.get_one::<String>("user").context("missing --user")?;
    let graph = args.get_one::<String>("graph").context("missing --graph")?;
    Ok(Session::new(user, graph))
}

fn required<'a>(args: &'a ArgMatches, name: &str) -> Result<&'a String> {
    args.get_one::<String>(name)
        .with_context(|| format!("missing <{name}>"))
}

fn print_json(value: &impl Serialize) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn read_file(args: &ArgMatches) -> Result<String> {
    let path = args.get_one::<PathBuf>("file").context("missing <file>")?;
    std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
}

fn main() -> Result<()> {
    let matches = cli().get_matches();
    let config = load_config(&matches)?;
    init_tracing(&config);

    match matches.subcommand() {
        Some(("parse", args)) => {
            let doc = ndf_cnl::read_document(&read_file(args)?);
            print_json(&doc)?;
        }
        Some(("ingest", args)) => {
            let text = read_file(args)?;
            let session = session(args)?;
            let description = required(args, "description")?;
            let studio = Studio::open(config);
            studio.create_graph(&session, description)?;
            let report = studio.ingest(&session, &text)?;
            print_json(&report)?;
        }
        Some(("compose", args)) => {
            let session = session(args)?;
            let views = Studio::open(config).views(&session)?;
            if args.get_flag("polymorphic") {
                print_json(&views.polymorphic)?;
            } else {
                print_json(&views.flat)?;
            }
        }
        Some(("delete-node", args)) => {
            let session = session(args)?;
            let node = required(args, "node")?;
            let outcome = Studio::open(config).delete_node(&session, node)?;
            print_json(&outcome)?;
            if let DeleteOutcome::Blocked(_) = outcome {
                std::process::exit(2);
            }
        }
        Some(("morph", args)) => {
            let session = session(args)?;
            let node = required(args, "node")?;
            let name = required(args, "name")?;
            let copy_from = args.get_one::<String>("copy-from").map(String::as_str);

            let studio = Studio::open(config);
            let morph_id = studio.create_morph(&session, node, name, copy_from)?;
            if args.get_flag("activate") {
                studio.set_active_morph(&session, node, &morph_id)?;
            }
            println!("{morph_id}");
        }
        _ => unreachable!("subcommand_required"),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_valid() {
        cli().debug_assert();
    }

    #[test]
    fn global_flags_after_subcommand() {
        let matches = cli()
            .try_get_matches_from([
                "ndf-studio",
                "compose",
                "--user",
                "ann",
                "--graph",
                "maths",
                "--data-dir",
                "/tmp/ndf",
                "--polymorphic",
            ])
            .unwrap();
        let config = load_config(&matches).unwrap();
        assert_eq!(config.data_dir, PathBuf::from("/tmp/ndf"));
        let (_, args) = matches.subcommand().unwrap();
        assert_eq!(session(args).unwrap(), Session::new("ann", "maths"));
    }
}
