//! Command-line surface.

use std::env;
use std::io;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{ArgAction, CommandFactory, Parser, Subcommand};
use clap_complete::Shell;

use crate::app::actions::{Placement, Satchels};
use crate::app::scope::{ScopeContext, absolutize};
use crate::app::store::SatchelStore;
use crate::domain::model::{Entry, Satchel};
use crate::infra::config::Config;
use crate::infra::git::GitResolver;
use crate::infra::opener::Opener;
use crate::ui::prompt;

#[derive(Parser)]
#[command(
    name = "satchel",
    author,
    version,
    about = "Keep a short, ordered list of important files per project and branch"
)]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Directory holding persisted satchels
    #[arg(long, value_name = "DIR", global = true)]
    storage_dir: Option<PathBuf>,

    /// Use this directory as the project root instead of discovering it
    #[arg(long, value_name = "DIR", global = true)]
    root: Option<PathBuf>,

    /// Use this branch name instead of the checked-out branch
    #[arg(long, value_name = "NAME", global = true)]
    branch: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Add files to the end of the satchel
    Place {
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },
    /// Show the satchel, front first
    List {
        #[arg(long)]
        json: bool,
    },
    /// Open an entry chosen by index or path (prompts when omitted)
    Pick {
        selector: Option<String>,
        /// Print the path instead of opening it
        #[arg(long)]
        print: bool,
    },
    /// Open the front entry
    #[command(visible_alias = "feeling-lucky")]
    Lucky {
        /// Print the path instead of opening it
        #[arg(long)]
        print: bool,
    },
    /// Delete the satchel for the current scope
    Burn,
    /// Remove an entry
    Drop { selector: Option<String> },
    /// Move an entry to the front
    Promote { selector: Option<String> },
    /// Move an entry to the back
    Demote { selector: Option<String> },
    /// Scope satchels to a fixed directory, or back to the discovered project root
    SetDefaultDirectory {
        #[arg(required_unless_present = "project_root", conflicts_with = "project_root")]
        path: Option<PathBuf>,
        #[arg(long)]
        project_root: bool,
    },
    /// Print the resolved scope and its storage file
    Scope,
    /// Generate shell completions
    Completions { shell: Shell },
}

/// Parse arguments and run the requested command.
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    crate::init(cli.verbose);
    execute(cli)
}

fn execute(cli: Cli) -> Result<()> {
    if let Commands::Completions { shell } = cli.command {
        clap_complete::generate(shell, &mut Cli::command(), "satchel", &mut io::stdout());
        return Ok(());
    }

    let cwd = env::current_dir().context("unable to determine working directory")?;
    let config = Config::load(&cwd)?;
    let storage_dir = match cli.storage_dir {
        Some(dir) => absolutize(&cwd, &dir),
        None => config.storage.directory()?,
    };
    let store = SatchelStore::new(storage_dir);

    if let Commands::SetDefaultDirectory { path, .. } = &cli.command {
        return set_default_directory(&store, path.as_ref().map(|path| absolutize(&cwd, path)));
    }

    let root_override = match cli.root {
        Some(root) => Some(root),
        None => store
            .default_directory()?
            .or_else(|| config.scope.default_directory.clone()),
    };
    let context = ScopeContext {
        cwd: cwd.clone(),
        root_override,
        branch_override: cli.branch,
        fallback_branch: config.scope.fallback_branch(),
    };
    let scope = context.resolve(&GitResolver, &GitResolver)?;
    // storage and scope settings come from the cwd layers; the rest follows the resolved root
    let config = Config::load(&scope.root)?;
    let satchels = Satchels::new(store, scope, cwd);
    let opener = Opener::new(config.open.command);

    match cli.command {
        Commands::Place { paths } => {
            for placement in satchels.place(&paths)? {
                match placement {
                    Placement::Added(entry) => println!("placed {entry}"),
                    Placement::AlreadyPresent(entry) => println!("already in satchel: {entry}"),
                }
            }
        }
        Commands::List { json } => list(&satchels, json)?,
        Commands::Pick { selector, print } => {
            if let Some(entry) = satchels.pick(chooser(selector, "pick"))? {
                open_or_print(&opener, &entry, print)?;
            }
        }
        Commands::Lucky { print } => open_or_print(&opener, &satchels.lucky()?, print)?,
        Commands::Burn => {
            satchels.burn()?;
            println!("burned satchel for {}", satchels.scope().branch);
        }
        Commands::Drop { selector } => {
            if let Some(entry) = satchels.drop_entry(chooser(selector, "drop"))? {
                println!("dropped {entry}");
            }
        }
        Commands::Promote { selector } => {
            if let Some(entry) = satchels.promote(chooser(selector, "promote"))? {
                println!("promoted {entry}");
            }
        }
        Commands::Demote { selector } => {
            if let Some(entry) = satchels.demote(chooser(selector, "demote"))? {
                println!("demoted {entry}");
            }
        }
        Commands::Scope => {
            let scope = satchels.scope();
            println!("root: {}", scope.root.display());
            println!("branch: {}", scope.branch);
            println!("key: {}", scope.key);
            println!("file: {}", satchels.store().path_for(&scope.key).display());
        }
        Commands::SetDefaultDirectory { .. } | Commands::Completions { .. } => {}
    }

    Ok(())
}

fn set_default_directory(store: &SatchelStore, directory: Option<PathBuf>) -> Result<()> {
    store.set_default_directory(directory.as_deref())?;
    match directory {
        Some(directory) => println!("default directory set to {}", directory.display()),
        None => println!("default directory reset to project root"),
    }
    Ok(())
}

fn list(satchels: &Satchels, json: bool) -> Result<()> {
    let satchel = satchels.current()?;
    if json {
        let scope = satchels.scope();
        let payload = serde_json::json!({
            "root": scope.root,
            "branch": scope.branch,
            "key": scope.key,
            "entries": satchel,
        });
        let rendered =
            serde_json::to_string_pretty(&payload).context("failed to serialize satchel")?;
        println!("{rendered}");
        return Ok(());
    }

    for entry in &satchel {
        println!("{entry}");
    }
    Ok(())
}

fn chooser(
    selector: Option<String>,
    label: &'static str,
) -> impl FnOnce(&Satchel) -> Result<Option<String>> {
    move |satchel| match selector {
        Some(selector) => Ok(Some(selector)),
        None => prompt::choose(satchel, label, io::stdin().lock(), io::stderr()),
    }
}

fn open_or_print(opener: &Opener, entry: &Entry, print: bool) -> Result<()> {
    if print {
        println!("{entry}");
        Ok(())
    } else {
        opener.open(entry.as_path())
    }
}
