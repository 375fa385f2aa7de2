use std::path::PathBuf;

use tower_lsp::{LspService, Server};
use tracing::info;

use crate::config::ServerOptions;
use crate::lsp::backend::Backend;

pub async fn run_server(compiler: PathBuf, options: ServerOptions) -> anyhow::Result<()> {
    info!(compiler = %compiler.display(), "Starting compiler-lsp server");

    let stdin = tokio::io::stdin();
    let stdout = tokio::io::stdout();

    let (service, socket) = LspService::build(move |client| Backend::new(client, compiler, options))
        .custom_method("$/setTrace", Backend::set_trace)
        .finish();
    Server::new(stdin, stdout, socket).serve(service).await;

    info!("compiler-lsp server stopped");
    Ok(())
}
