//! repolens - fingerprint and blame a set of git repositories
//!
//! This is the main entry point for the repolens command-line interface.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use serde_json::json;
use tracing_subscriber::EnvFilter;

use repolens::config::PoolConfig;
use repolens::executor::{Blame, Column, DataType, GeneratorOperator, Operator, Row, ScanOperator, Session};
use repolens::pool::RepositoryPool;
use repolens::storage::RepositoryId;

enum Command {
    Checksum,
    Repos,
    Blame {
        repo: String,
        revision: String,
        limit: Option<usize>,
    },
}

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().collect();

    let mut config = PoolConfig::new();
    let mut positional: Vec<String> = Vec::new();
    let mut limit: Option<usize> = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "-r" | "--repo" => {
                i += 1;
                if i < args.len() {
                    config = config.repository(PathBuf::from(&args[i]));
                }
            }
            "--repo-id" => {
                i += 1;
                if i < args.len() {
                    match parse_repo_id(&args[i]) {
                        Ok((id, path)) => config = config.repository_with_id(id, path),
                        Err(e) => {
                            eprintln!("Invalid --repo-id '{}': {}", args[i], e);
                            return ExitCode::FAILURE;
                        }
                    }
                }
            }
            "--limit" => {
                i += 1;
                match args.get(i).map(|s| s.parse::<usize>()) {
                    Some(Ok(n)) => limit = Some(n),
                    _ => {
                        eprintln!("--limit expects a number");
                        return ExitCode::FAILURE;
                    }
                }
            }
            "-v" | "--verbose" => {
                config = config.verbose(true);
            }
            "-h" | "--help" => {
                print_help();
                return ExitCode::SUCCESS;
            }
            "--version" => {
                println!("repolens v{}", env!("CARGO_PKG_VERSION"));
                return ExitCode::SUCCESS;
            }
            arg => {
                if !arg.starts_with('-') {
                    positional.push(arg.to_string());
                } else {
                    eprintln!("Unknown option: {}", arg);
                    return ExitCode::FAILURE;
                }
            }
        }
        i += 1;
    }

    init_logging(&config);

    let command = match parse_command(positional, limit) {
        Ok(command) => command,
        Err(message) => {
            eprintln!("{}", message);
            print_help();
            return ExitCode::FAILURE;
        }
    };

    let pool = match RepositoryPool::from_config(&config) {
        Ok(pool) => Arc::new(pool),
        Err(e) => {
            eprintln!("Error opening repositories: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let result = match command {
        Command::Checksum => run_checksum(&pool),
        Command::Repos => run_repos(&pool),
        Command::Blame { repo, revision, limit } => run_blame(pool, &repo, &revision, limit),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn init_logging(config: &PoolConfig) {
    let filter = if config.verbose {
        EnvFilter::new(config.log_filter())
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(config.log_filter()))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn parse_repo_id(arg: &str) -> Result<(RepositoryId, PathBuf), Box<dyn std::error::Error>> {
    let (id, path) = arg.split_once('=').ok_or("expected ID=PATH")?;
    Ok((RepositoryId::new(id)?, PathBuf::from(path)))
}

fn parse_command(positional: Vec<String>, limit: Option<usize>) -> Result<Command, String> {
    let mut positional = positional.into_iter();
    match positional.next().as_deref() {
        None | Some("checksum") => Ok(Command::Checksum),
        Some("repos") => Ok(Command::Repos),
        Some("blame") => match (positional.next(), positional.next()) {
            (Some(repo), Some(revision)) => Ok(Command::Blame { repo, revision, limit }),
            _ => Err("blame needs <REPO_ID> <REVISION>".to_string()),
        },
        Some(other) => Err(format!("Unknown command: {}", other)),
    }
}

fn print_help() {
    println!("repolens - fingerprint and blame a set of git repositories");
    println!();
    println!("Usage: repolens [OPTIONS] [COMMAND]");
    println!();
    println!("Commands:");
    println!("  checksum                      Print the pool fingerprint (default)");
    println!("  repos                         List repositories in pool order");
    println!("  blame <REPO_ID> <REVISION>    Attribute every line of every file");
    println!();
    println!("Options:");
    println!("  -r, --repo PATH        Add a repository; id is the directory name");
    println!("  --repo-id ID=PATH      Add a repository under an explicit id");
    println!("  --limit N              Stop blame output after N lines");
    println!("  -v, --verbose          Enable debug logging");
    println!("  -h, --help             Show this help message");
    println!("  --version              Show version");
    println!();
    println!("Examples:");
    println!("  repolens -r ./linux -r ./git checksum");
    println!("  repolens -r ./linux blame linux HEAD --limit 20");
}

fn run_checksum(pool: &RepositoryPool) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", pool.checksum()?);
    Ok(())
}

fn run_repos(pool: &RepositoryPool) -> Result<(), Box<dyn std::error::Error>> {
    for (id, repo) in pool.iter() {
        println!("{}\t{}", id, repo.path().display());
    }
    Ok(())
}

fn run_blame(
    pool: Arc<RepositoryPool>,
    repo: &str,
    revision: &str,
    limit: Option<usize>,
) -> Result<(), Box<dyn std::error::Error>> {
    let session = Arc::new(Session::new(pool));

    let mut row = Row::new();
    row.insert("repository_id".to_string(), json!(repo));
    row.insert("revision".to_string(), json!(revision));

    let expr = Blame::new(
        Column::new("repository_id", DataType::Text, false),
        Column::new("revision", DataType::Text, false),
    );
    let mut op = GeneratorOperator::new(Box::new(ScanOperator::new(vec![row])), expr, "blame", session.clone());

    let mut emitted = 0;
    while limit.map_or(true, |n| emitted < n) {
        let Some(mut out) = op.next_row()? else {
            break;
        };
        if let Some(line) = out.remove("blame") {
            println!("{}", line);
            emitted += 1;
        }
    }
    drop(op);

    for warning in session.take_warnings() {
        eprintln!("warning: {}", warning.message);
    }
    Ok(())
}
