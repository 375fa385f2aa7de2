use std::path::PathBuf;

use clap::Parser;

use compiler_lsp::config::{
    DEFAULT_CONFIG_SECTION, DEFAULT_MAX_NUMBER_OF_PROBLEMS, DEFAULT_NUM_REQUEST_THREADS,
    DEFAULT_NUM_WORKER_THREADS, ServerConfig, ServerOptions,
};
use compiler_lsp::lsp::server::run_server;

/// Language server for a compiler front-end, speaking LSP over stdio
#[derive(Debug, Parser)]
#[command(name = "compiler-lsp", version, about)]
struct Cli {
    /// Workspace configuration section requested from the client
    #[arg(long, default_value = DEFAULT_CONFIG_SECTION)]
    config_section: String,

    /// Compiler executable used for analysis
    #[arg(long, default_value = "lfortran")]
    compiler_path: PathBuf,

    /// Default compiler flag, may be repeated
    #[arg(long = "compiler-flag", value_name = "FLAG", allow_hyphen_values = true)]
    compiler_flags: Vec<String>,

    /// Default cap on diagnostics published per document
    #[arg(long, default_value_t = DEFAULT_MAX_NUMBER_OF_PROBLEMS)]
    max_number_of_problems: usize,

    /// Concurrent feature requests allowed to call into the compiler
    #[arg(long, default_value_t = DEFAULT_NUM_REQUEST_THREADS)]
    num_request_threads: usize,

    /// Validation workers
    #[arg(long, default_value_t = DEFAULT_NUM_WORKER_THREADS)]
    num_worker_threads: usize,

    /// Log level used when RUST_LOG is unset
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Log file, defaults to the data directory
    #[arg(long)]
    log_path: Option<PathBuf>,
}

impl Cli {
    fn server_options(&self) -> ServerOptions {
        let mut defaults = ServerConfig {
            max_number_of_problems: self.max_number_of_problems,
            ..Default::default()
        };
        defaults.compiler.flags = self.compiler_flags.clone();

        ServerOptions {
            config_section: self.config_section.clone(),
            defaults,
            num_request_threads: self.num_request_threads.max(1),
            num_worker_threads: self.num_worker_threads.max(1),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let _guard = compiler_lsp::log::init(&cli.log_level, cli.log_path.as_deref())?;
    run_server(cli.compiler_path.clone(), cli.server_options()).await
}
