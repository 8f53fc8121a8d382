#[tokio::main(flavor = "current_thread")]
async fn main() {
    if let Err(e) = partner::run().await {
        log::error!("{e}");
        eprintln!("{e}");
        std::process::exit(1);
    }
}
