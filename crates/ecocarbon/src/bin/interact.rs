#[tokio::main]
async fn main() {
    ecocarbon::run::interact(std::env::args()).await;
}
