//! `cuke-glue-lsp`: keeps Gherkin steps glued to their step definitions.
//!
//! The server runs a full build once the client is initialised, an
//! incremental build on every save, and exposes the
//! `cuke-glue.recalculateSteps` command for rebuilding a single feature on
//! demand. Results reach the editor as published diagnostics.

use std::ops::ControlFlow;
use std::process::ExitCode;

use async_lsp::ClientSocket;
use async_lsp::concurrency::ConcurrencyLayer;
use async_lsp::panic::CatchUnwindLayer;
use async_lsp::router::Router;
use async_lsp::server::LifecycleLayer;
use async_lsp::tracing::TracingLayer;
use clap::Parser;
use lsp_types::{notification, request};
use tower::ServiceBuilder;
use tracing::{error, info};

use cuke_glue_server::config::{LogLevel, ServerConfig};
use cuke_glue_server::handlers::{
    handle_did_save_text_document, handle_execute_command, handle_initialise, handle_initialised,
    handle_shutdown,
};
use cuke_glue_server::logging::init_logging;
use cuke_glue_server::server::ServerState;

/// Language server gluing Gherkin steps to Cucumber step definitions.
#[derive(Parser, Debug)]
#[command(name = "cuke-glue-lsp", version, about)]
struct Args {
    /// Log level (trace, debug, info, warn, error). Overrides
    /// `CUKE_GLUE_LSP_LOG_LEVEL`.
    #[arg(long)]
    log_level: Option<LogLevel>,
}

fn main() -> ExitCode {
    let args = Args::parse();
    let config = match ServerConfig::from_env() {
        Ok(config) => config.apply_overrides(args.log_level),
        Err(err) => {
            init_logging(&ServerConfig::default().apply_overrides(args.log_level));
            error!(error = %err, "invalid CUKE_GLUE_LSP_* configuration");
            return ExitCode::from(2);
        }
    };
    init_logging(&config);
    info!(
        version = env!("CARGO_PKG_VERSION"),
        report_matches = config.report_matches,
        "starting cuke-glue-lsp"
    );

    let served = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .and_then(|runtime| runtime.block_on(serve_stdio(config)));
    match served {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(error = %err, "cuke-glue-lsp stopped");
            ExitCode::FAILURE
        }
    }
}

/// Routes the handful of LSP messages the server acts on. Open, change and
/// close are accepted and ignored: builds only follow saves.
fn router(config: ServerConfig, client: ClientSocket) -> Router<ServerState> {
    let mut router = Router::new(ServerState::new(config).with_client(client));
    router
        .request::<request::Initialize, _>(|state, params| {
            std::future::ready(handle_initialise(state, params))
        })
        .request::<request::ExecuteCommand, _>(|state, params| {
            std::future::ready(handle_execute_command(state, params))
        })
        .request::<request::Shutdown, _>(|state, ()| std::future::ready(handle_shutdown(state)))
        .notification::<notification::Initialized>(|state, params| {
            handle_initialised(state, params);
            ControlFlow::Continue(())
        })
        .notification::<notification::DidSaveTextDocument>(|state, params| {
            handle_did_save_text_document(state, params);
            ControlFlow::Continue(())
        })
        .notification::<notification::DidOpenTextDocument>(|_, _| ControlFlow::Continue(()))
        .notification::<notification::DidChangeTextDocument>(|_, _| ControlFlow::Continue(()))
        .notification::<notification::DidCloseTextDocument>(|_, _| ControlFlow::Continue(()))
        .notification::<notification::Exit>(|_, ()| ControlFlow::Break(Ok(())));
    router
}

async fn serve_stdio(config: ServerConfig) -> std::io::Result<()> {
    let (server, _client) = async_lsp::MainLoop::new_server(|client| {
        ServiceBuilder::new()
            .layer(TracingLayer::default())
            .layer(LifecycleLayer::default())
            .layer(CatchUnwindLayer::default())
            .layer(ConcurrencyLayer::default())
            .service(router(config.clone(), client))
    });

    #[cfg(unix)]
    let (stdin, stdout) = (
        async_lsp::stdio::PipeStdin::lock_tokio()?,
        async_lsp::stdio::PipeStdout::lock_tokio()?,
    );
    #[cfg(not(unix))]
    let (stdin, stdout) = {
        use tokio_util::compat::{TokioAsyncReadCompatExt, TokioAsyncWriteCompatExt};
        (
            tokio::io::stdin().compat(),
            tokio::io::stdout().compat_write(),
        )
    };

    server
        .run_buffered(stdin, stdout)
        .await
        .map_err(std::io::Error::other)?;
    info!("client closed the session");
    Ok(())
}
