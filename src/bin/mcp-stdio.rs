use blok_mcp::mcp::stdio;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();

    // MCP hosts may probe stdio servers with `--version`/`--help` before
    // starting a JSON-RPC session. If we ignore args and start the transport
    // instead, the host can fail compatibility detection and cancel the
    // session.
    let args: Vec<String> = std::env::args().collect();
    if args.iter().any(|a| a == "--version" || a == "-V") {
        tracing::info!("version={}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }
    if args.iter().any(|a| a == "--help" || a == "-h") {
        tracing::info!("blok-mcp-stdio (MCP stdio server); usage: blok-mcp-stdio [--version|--help]");
        return Ok(());
    }
    stdio::run().await
}
