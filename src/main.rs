use std::net::IpAddr;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use jumptocode::commands::{self, EXIT_ERROR};
use jumptocode::config::Config;
use jumptocode::logging::{self, LogFormat};
use jumptocode::resolution::ProbeVariant;
use jumptocode::{diagnostics, info};

#[derive(Parser)]
#[command(name = "jumptocode", version, about = "Jump from a rendered UI element to the source line that declared it")]
struct Cli {
    /// Subcommand to run.
    #[command(subcommand)]
    command: Commands,
    /// Log format, overriding the config file.
    #[arg(long, global = true, value_enum)]
    log_format: Option<LogFormat>,
    /// Log level, overriding the config file. `RUST_LOG` still wins.
    #[arg(long, global = true)]
    log_level: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Ask a running helper server whether it is up
    Health {
        /// Helper base URL; defaults to the configured port on localhost.
        #[arg(long)]
        url: Option<String>,
    },
    /// Print a reference document: handle keys, budgets, endpoints, config
    Info {
        /// Machine-readable output.
        #[arg(long)]
        json: bool,
    },
    /// Resolve an element of a captured page to its source location
    Resolve {
        // Positionals keep declaration order: <snapshot> <element>.
        /// Page snapshot (JSON).
        snapshot: PathBuf,
        /// Index of the target element in the snapshot.
        element: usize,
        /// Print the report as JSON.
        #[arg(long)]
        json: bool,
        /// Send the location to the helper server to open it.
        #[arg(long)]
        open: bool,
        /// Helper base URL used with `--open`.
        #[arg(long)]
        url: Option<String>,
        /// Which heuristics to use.
        #[arg(long, value_enum, default_value_t = ProbeVariant::Rich)]
        variant: ProbeVariant,
    },
    /// Run the local helper that opens files in the editor
    Serve {
        /// Address to bind.
        #[arg(long)]
        bind: Option<IpAddr>,
        /// Editor executable.
        #[arg(long)]
        editor: Option<String>,
        /// Port to listen on.
        #[arg(long)]
        port: Option<u16>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let mut config = match Config::load(Path::new(".")) {
        Ok(c) => c,
        Err(e) => {
            diagnostics::print_error(&e);
            return ExitCode::from(EXIT_ERROR);
        },
    };
    if let Some(format) = cli.log_format {
        config.log_format = format;
    }
    if let Some(level) = cli.log_level {
        config.log_level = level;
    }
    logging::init(&config.log_level, config.log_format);

    let result = match cli.command {
        Commands::Health { url } => {
            let url = url.unwrap_or_else(|| return local_url(&config));
            commands::health(&url).await
        },
        Commands::Info { json } => {
            info::run(Path::new("."), json);
            Ok(ExitCode::SUCCESS)
        },
        Commands::Resolve { snapshot, element, json, open, url, variant } => {
            let helper = open.then(|| return url.unwrap_or_else(|| return local_url(&config)));
            commands::resolve(&snapshot, element, variant, &config, helper.as_deref(), json).await
        },
        Commands::Serve { bind, editor, port } => {
            if let Some(bind) = bind {
                config.bind = bind;
            }
            if let Some(editor) = editor {
                config.editor = editor;
            }
            if let Some(port) = port {
                config.port = port;
            }
            commands::serve(&config).await
        },
    };

    return match result {
        Ok(code) => code,
        Err(e) => {
            diagnostics::print_error(&e);
            ExitCode::from(EXIT_ERROR)
        },
    };
}

/// Helper URL on localhost at the configured port.
fn local_url(config: &Config) -> String {
    return format!("http://localhost:{}", config.port);
}
