// CLI entry point for the MCG navigation graph tools.
//
// Reads navmeshes (and graphs) as JSON, runs one library operation, and
// prints or writes the result. Log output goes to stderr through
// `env_logger`; set `RUST_LOG=debug` for per-node detail.
//
// Usage:
//   mcg build    <navmeshes.json> [--config <cfg.json>] [--out <graph.json>]
//   mcg path     <navmeshes.json> <navmesh> <start> <end> [--config <cfg.json>]
//   mcg cost     <navmeshes.json> <navmesh> <start> <end> [--config <cfg.json>]
//   mcg rename   <navmeshes.json> <graph.json> [--out <graph.json>]
//   mcg validate <navmeshes.json> <graph.json>
//
// The navmesh file is a JSON list of
// `{ name, world_offset, vertices, faces, flags?, obstacle_counts? }`.

use std::path::{Path, PathBuf};

use log::info;
use mcg_nav::error::{NavGraphError, Result};
use mcg_nav::maintenance::{normalize_names, validate_graph};
use mcg_nav::types::TriIndex;
use mcg_nav::{Graph, NavGraphConfig, NavmeshRegistry, build_graph, find_best_cost, find_path};

enum Command {
    Build,
    Path,
    Cost,
    Rename,
    Validate,
}

struct Args {
    command: Command,
    positional: Vec<String>,
    config: Option<PathBuf>,
    out: Option<PathBuf>,
}

fn main() {
    env_logger::init();
    let args = parse_args();
    if let Err(e) = run(&args) {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

/// Parse command-line arguments. Uses simple `std::env::args()` matching.
fn parse_args() -> Args {
    let argv: Vec<String> = std::env::args().collect();
    let command = match argv.get(1).map(String::as_str) {
        Some("build") => Command::Build,
        Some("path") => Command::Path,
        Some("cost") => Command::Cost,
        Some("rename") => Command::Rename,
        Some("validate") => Command::Validate,
        Some("--help" | "-h") => {
            print_usage();
            std::process::exit(0);
        }
        Some(other) => {
            eprintln!("Unknown command: {other}");
            print_usage();
            std::process::exit(1);
        }
        None => {
            print_usage();
            std::process::exit(1);
        }
    };

    let mut args = Args {
        command,
        positional: Vec::new(),
        config: None,
        out: None,
    };
    let mut i = 2;
    while i < argv.len() {
        match argv[i].as_str() {
            "--config" => {
                i += 1;
                args.config = Some(path_value(&argv, i, "--config"));
            }
            "--out" => {
                i += 1;
                args.out = Some(path_value(&argv, i, "--out"));
            }
            "--help" | "-h" => {
                print_usage();
                std::process::exit(0);
            }
            other if other.starts_with("--") => {
                eprintln!("Unknown argument: {other}");
                print_usage();
                std::process::exit(1);
            }
            other => args.positional.push(other.to_string()),
        }
        i += 1;
    }

    let expected = match args.command {
        Command::Build => 1,
        Command::Path | Command::Cost => 4,
        Command::Rename | Command::Validate => 2,
    };
    if args.positional.len() != expected {
        eprintln!(
            "Expected {expected} positional arguments, got {}",
            args.positional.len()
        );
        print_usage();
        std::process::exit(1);
    }
    args
}

fn path_value(argv: &[String], i: usize, flag: &str) -> PathBuf {
    argv.get(i).map(PathBuf::from).unwrap_or_else(|| {
        eprintln!("{flag} requires a path");
        std::process::exit(1);
    })
}

fn triangle_arg(value: &str) -> TriIndex {
    value.parse().unwrap_or_else(|_| {
        eprintln!("'{value}' is not a triangle index");
        std::process::exit(1);
    })
}

fn print_usage() {
    println!("Usage: mcg <COMMAND> [ARGS] [OPTIONS]");
    println!();
    println!("Commands:");
    println!("  build    <navmeshes.json>                        Build a graph");
    println!("  path     <navmeshes.json> <navmesh> <start> <end> Find a triangle path");
    println!("  cost     <navmeshes.json> <navmesh> <start> <end> Best cost between triangles");
    println!("  rename   <navmeshes.json> <graph.json>           Normalize node/edge names");
    println!("  validate <navmeshes.json> <graph.json>           Check graph structure");
    println!();
    println!("Options:");
    println!("  --config <FILE>   NavGraphConfig JSON (default: built-in defaults)");
    println!("  --out <FILE>      Write the resulting graph here instead of stdout");
    println!("  --help, -h        Show this help");
}

fn run(args: &Args) -> Result<()> {
    let config = match &args.config {
        Some(path) => NavGraphConfig::from_json_file(path)?,
        None => NavGraphConfig::default(),
    };
    let registry = NavmeshRegistry::from_json_file(Path::new(&args.positional[0]))?;
    info!("loaded {} navmeshes", registry.len());

    match args.command {
        Command::Build => {
            let graph = build_graph(&registry, &config)?;
            write_graph(&graph, args.out.as_deref())
        }
        Command::Path => {
            let (_, navmesh) = registry.by_name(&args.positional[1])?;
            let start = triangle_arg(&args.positional[2]);
            let end = triangle_arg(&args.positional[3]);
            let outcome = find_path(start, end, &navmesh.mesh, false, &config.cost)?;
            match &outcome.path {
                Some(path) => {
                    let tris: Vec<String> = path.iter().map(|t| t.to_string()).collect();
                    println!("path: {}", tris.join(" -> "));
                    println!("cost: {}", outcome.total_cost);
                    if outcome.used_all_passable {
                        println!("(all flags treated as passable)");
                    }
                }
                None => println!("no path"),
            }
            Ok(())
        }
        Command::Cost => {
            let (_, navmesh) = registry.by_name(&args.positional[1])?;
            let start = triangle_arg(&args.positional[2]);
            let end = triangle_arg(&args.positional[3]);
            let cost = find_best_cost(&navmesh.mesh, start, end, &config)?;
            println!("{cost}");
            Ok(())
        }
        Command::Rename => {
            let mut graph = read_graph(Path::new(&args.positional[1]))?;
            normalize_names(&mut graph, &registry)?;
            write_graph(&graph, args.out.as_deref())
        }
        Command::Validate => {
            let graph = read_graph(Path::new(&args.positional[1]))?;
            validate_graph(&graph, &registry)?;
            println!(
                "ok: {} nodes, {} edges",
                graph.node_count(),
                graph.edge_count()
            );
            Ok(())
        }
    }
}

fn read_graph(path: &Path) -> Result<Graph> {
    let text = std::fs::read_to_string(path).map_err(|source| NavGraphError::Io {
        path: path.display().to_string(),
        source,
    })?;
    Ok(serde_json::from_str(&text)?)
}

fn write_graph(graph: &Graph, out: Option<&Path>) -> Result<()> {
    let json = serde_json::to_string_pretty(graph)?;
    match out {
        Some(path) => {
            std::fs::write(path, json).map_err(|source| NavGraphError::Io {
                path: path.display().to_string(),
                source,
            })?;
            info!("wrote graph to {}", path.display());
        }
        None => println!("{json}"),
    }
    Ok(())
}
