#[tokio::main]
async fn main() {
    flux_lsp::run_server().await;
}
