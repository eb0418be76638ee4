#[tokio::main]
async fn main() {
    ecocarbon::run::deploy(std::env::args()).await;
}
