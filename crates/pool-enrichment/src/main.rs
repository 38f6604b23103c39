#[tokio::main]
async fn main() {
    pool_enrichment::start(std::env::args()).await;
}
