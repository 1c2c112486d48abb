mod demo;
mod logging;

use std::fs;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use cmdtree_server::{Client, Server, ServerConfig};
use tracing::info;

/// Tree output format.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum TreeFormat {
    Json,
    Yaml,
}

#[derive(Debug, Parser)]
#[command(name = "cmdtree")]
#[command(about = "Hierarchical command interpreter with a Unix control socket")]
struct Cli {
    /// Log level used when RUST_LOG is unset (overrides the config file).
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Serve the demo command tree on a Unix socket.
    Serve(ServeArgs),
    /// Interactive line client for a running server.
    Ctl(CtlArgs),
    /// Dispatch one line against the demo tree and print the response.
    Exec(ExecArgs),
    /// Print the demo command tree.
    Tree(TreeArgs),
    /// Write a default server configuration file.
    InitConfig(InitConfigArgs),
}

#[derive(Debug, Args)]
struct ServeArgs {
    /// YAML configuration file.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Socket path (overrides the config file).
    #[arg(long)]
    socket: Option<PathBuf>,
}

#[derive(Debug, Args)]
struct CtlArgs {
    /// YAML configuration file.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Socket path (overrides the config file).
    #[arg(long)]
    socket: Option<PathBuf>,
    /// Prompt (overrides the config file).
    #[arg(long)]
    prompt: Option<String>,
}

#[derive(Debug, Args)]
struct ExecArgs {
    /// Command line words, joined with single spaces.
    #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
    line: Vec<String>,
}

#[derive(Debug, Args)]
struct TreeArgs {
    /// Output format.
    #[arg(long, value_enum, default_value = "json")]
    format: TreeFormat,
}

#[derive(Debug, Args)]
struct InitConfigArgs {
    /// Destination file.
    path: PathBuf,
    /// Overwrite an existing file.
    #[arg(long)]
    force: bool,
}

fn main() {
    let cli = Cli::parse();
    let log_level = cli.log_level;

    let result = match cli.command {
        Command::Serve(args) => run_serve(args, log_level),
        Command::Ctl(args) => run_ctl(args, log_level),
        Command::Exec(args) => run_exec(args, log_level),
        Command::Tree(args) => run_tree(args),
        Command::InitConfig(args) => run_init_config(args),
    };

    if let Err(err) = result {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn load_config(path: Option<&PathBuf>) -> Result<ServerConfig, String> {
    match path {
        Some(path) => ServerConfig::load(path)
            .map_err(|err| format!("Failed to load config '{}': {err}", path.display())),
        None => Ok(ServerConfig::default()),
    }
}

fn run_serve(args: ServeArgs, log_level: Option<String>) -> Result<(), String> {
    let mut config = load_config(args.config.as_ref())?;
    if let Some(socket) = args.socket {
        config.socket_path = socket;
    }
    logging::init(log_level.as_deref().unwrap_or(&config.log_level));

    let table = demo::demo_table().map_err(|err| format!("Failed to build commands: {err}"))?;
    info!(commands = table.len() - 1, "Command table ready");

    let server = Server::bind(&config, table).map_err(|err| {
        format!(
            "Failed to bind '{}': {err}",
            config.socket_path.display()
        )
    })?;
    server.run().map_err(|err| err.to_string())
}

fn run_ctl(args: CtlArgs, log_level: Option<String>) -> Result<(), String> {
    let mut config = load_config(args.config.as_ref())?;
    if let Some(socket) = args.socket {
        config.socket_path = socket;
    }
    if let Some(prompt) = args.prompt {
        config.prompt = prompt;
    }
    logging::init(log_level.as_deref().unwrap_or("warn"));

    let mut client = Client::connect(&config.socket_path).map_err(|err| {
        format!(
            "Failed to connect to '{}': {err}",
            config.socket_path.display()
        )
    })?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let write_err = |err: io::Error| format!("Failed to write to stdout: {err}");
    writeln!(out, "Connected to server. Type 'quit' to exit.").map_err(write_err)?;
    write!(out, "{}", config.prompt).map_err(write_err)?;
    out.flush().map_err(write_err)?;

    for line in io::stdin().lock().lines() {
        let line = line.map_err(|err| format!("Failed to read stdin: {err}"))?;
        let line = line.trim();
        if line == "quit" {
            break;
        }
        if !line.is_empty() {
            let reply = client
                .send_line(line)
                .map_err(|err| format!("Server request failed: {err}"))?;
            if !reply.is_empty() {
                writeln!(out, "{reply}").map_err(write_err)?;
            }
        }
        write!(out, "{}", config.prompt).map_err(write_err)?;
        out.flush().map_err(write_err)?;
    }
    writeln!(out).map_err(write_err)?;
    Ok(())
}

fn run_exec(args: ExecArgs, log_level: Option<String>) -> Result<(), String> {
    logging::init(log_level.as_deref().unwrap_or("warn"));

    let table = demo::demo_table().map_err(|err| format!("Failed to build commands: {err}"))?;
    let line = args.line.join(" ");
    let response = table.submit(line.as_bytes());
    if !response.text().is_empty() {
        println!("{}", response.text());
    }
    response.outcome().clone().map_err(|err| err.to_string())
}

fn run_tree(args: TreeArgs) -> Result<(), String> {
    let table = demo::demo_table().map_err(|err| format!("Failed to build commands: {err}"))?;
    let tree = table.describe();
    let rendered = match args.format {
        TreeFormat::Json => serde_json::to_string_pretty(&tree)
            .map_err(|err| format!("Failed to serialize tree: {err}"))?,
        TreeFormat::Yaml => serde_yaml::to_string(&tree)
            .map_err(|err| format!("Failed to serialize tree: {err}"))?,
    };
    println!("{}", rendered.trim_end());
    Ok(())
}

fn run_init_config(args: InitConfigArgs) -> Result<(), String> {
    if args.path.exists() && !args.force {
        return Err(format!(
            "'{}' already exists (use --force to overwrite)",
            args.path.display()
        ));
    }
    if let Some(parent) = args.path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|err| {
            format!("Failed to create directory '{}': {err}", parent.display())
        })?;
    }
    ServerConfig::default()
        .save(&args.path)
        .map_err(|err| format!("Failed to write '{}': {err}", args.path.display()))?;
    println!("Wrote {}", args.path.display());
    Ok(())
}
