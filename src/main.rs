//! ghdrive CLI - thin consumer of the GitHub contents client.

use anyhow::{anyhow, Context, Result};
use std::env;
use std::path::PathBuf;
use tracing::{debug, error, info, Level};
use tracing_subscriber::FmtSubscriber;

use ghdrive::{Credentials, GitHubClient};

/// CLI command
#[derive(Debug)]
enum Command {
    /// List the user's repositories
    Repos,
    /// Create a repository
    CreateRepo { name: String, private: bool },
    /// List files under a path
    List { repo: String, path: String },
    /// Download a file
    Get {
        repo: String,
        path: String,
        dest: Option<PathBuf>,
    },
    /// Upload a local file
    Put {
        repo: String,
        path: String,
        source: PathBuf,
    },
    /// Delete a file (requires its current revision hash)
    Rm {
        repo: String,
        path: String,
        sha: String,
    },
    /// Show help
    Help,
}

fn print_help() {
    eprintln!(
        r#"ghdrive - use GitHub repositories as a cloud drive

USAGE:
    ghdrive repos
    ghdrive mkrepo <name> [--private]
    ghdrive ls <repo> [path]
    ghdrive get <repo> <path> [dest]
    ghdrive put <repo> <path> <local-file>
    ghdrive rm <repo> <path> <sha>
    ghdrive help

COMMANDS:
    repos   List your repositories
    mkrepo  Create a repository (reuses it if it already exists)
    ls      List files under a path (default: repository root)
    get     Download a file (to stdout unless dest is given)
    put     Create or update a file from a local file
    rm      Delete a file; <sha> is its current revision hash (see ls)
    help    Show this help message

ENVIRONMENT:
    GITHUB_TOKEN   Personal access token (required)
    GITHUB_USER    Account name (required)
    RUST_LOG       Log level (trace, debug, info, warn, error)
"#
    );
}

fn parse_args() -> Result<Command> {
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        return Ok(Command::Help);
    }

    match args[1].as_str() {
        "repos" => Ok(Command::Repos),
        "mkrepo" => {
            if args.len() < 3 {
                return Err(anyhow!("Usage: ghdrive mkrepo <name> [--private]"));
            }
            Ok(Command::CreateRepo {
                name: args[2].clone(),
                private: args.iter().any(|a| a == "--private"),
            })
        }
        "ls" => {
            if args.len() < 3 {
                return Err(anyhow!("Usage: ghdrive ls <repo> [path]"));
            }
            Ok(Command::List {
                repo: args[2].clone(),
                path: args.get(3).cloned().unwrap_or_default(),
            })
        }
        "get" => {
            if args.len() < 4 {
                return Err(anyhow!("Usage: ghdrive get <repo> <path> [dest]"));
            }
            Ok(Command::Get {
                repo: args[2].clone(),
                path: args[3].clone(),
                dest: args.get(4).map(PathBuf::from),
            })
        }
        "put" => {
            if args.len() < 5 {
                return Err(anyhow!("Usage: ghdrive put <repo> <path> <local-file>"));
            }
            Ok(Command::Put {
                repo: args[2].clone(),
                path: args[3].clone(),
                source: PathBuf::from(&args[4]),
            })
        }
        "rm" => {
            if args.len() < 5 {
                return Err(anyhow!("Usage: ghdrive rm <repo> <path> <sha>"));
            }
            Ok(Command::Rm {
                repo: args[2].clone(),
                path: args[3].clone(),
                sha: args[4].clone(),
            })
        }
        "help" | "--help" | "-h" => Ok(Command::Help),
        _ => {
            eprintln!("Unknown command: {}", args[1]);
            Ok(Command::Help)
        }
    }
}

fn credentials_from_env() -> Result<Credentials> {
    let token = env::var("GITHUB_TOKEN").context("GITHUB_TOKEN is not set")?;
    let username = env::var("GITHUB_USER").context("GITHUB_USER is not set")?;
    Ok(Credentials::new(token, username))
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let log_level = env::var("RUST_LOG")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(Level::INFO);

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let command = match parse_args() {
        Ok(cmd) => cmd,
        Err(e) => {
            eprintln!("Error: {}", e);
            print_help();
            std::process::exit(1);
        }
    };

    if matches!(command, Command::Help) {
        print_help();
        return Ok(());
    }

    let client = GitHubClient::new(credentials_from_env()?)
        .map_err(|e| anyhow!("failed to create client: {e}"))?;

    match command {
        Command::Repos => {
            let repos = client.list_repos().await?;
            for repo in &repos {
                let visibility = if repo.private { "private" } else { "public" };
                println!(
                    "{}  ({}, branch: {})",
                    repo.full_name, visibility, repo.default_branch
                );
            }
            info!(count = repos.len(), "listed repositories");
        }
        Command::CreateRepo { name, private } => {
            let repo = client.create_repo(&name, private).await?;
            println!("{}", repo.full_name);
        }
        Command::List { repo, path } => {
            let entries = client.list_files(&repo, &path).await?;
            for entry in &entries {
                println!(
                    "{:>9}  {:7}  {}  {}",
                    entry.size, entry.kind, entry.sha, entry.path
                );
            }
        }
        Command::Get { repo, path, dest } => {
            let bytes = client.download_file(&repo, &path).await?;
            match dest {
                Some(dest) => {
                    std::fs::write(&dest, &bytes)
                        .with_context(|| format!("failed to write {}", dest.display()))?;
                    info!(path = %dest.display(), bytes = bytes.len(), "file saved");
                }
                None => {
                    use std::io::Write;
                    std::io::stdout().write_all(&bytes)?;
                }
            }
        }
        Command::Put { repo, path, source } => {
            let content = std::fs::read(&source)
                .with_context(|| format!("failed to read {}", source.display()))?;
            let message = format!("Upload {}", path);
            match client.upload_file(&repo, &path, &content, &message).await {
                Ok(response) => {
                    println!("{}", response.commit.sha);
                }
                Err(e) => {
                    error!(error = %e, "upload failed");
                    return Err(e.into());
                }
            }
        }
        Command::Rm { repo, path, sha } => {
            let message = format!("Delete {}", path);
            client.delete_file(&repo, &path, &sha, &message).await?;
            println!("deleted {}", path);
        }
        Command::Help => unreachable!(),
    }

    let usage = client.usage();
    debug!(
        total = usage.total_requests,
        cached = usage.cached_requests,
        hit_rate = usage.hit_rate,
        "API usage"
    );

    Ok(())
}
