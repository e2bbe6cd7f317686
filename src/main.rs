use std::env;

use tracing::error;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt().init();

    let raw_args: Vec<String> = env::args().collect();
    if raw_args.get(1).map(|s| s.as_str()) == Some("serve") {
        let port = raw_args
            .get(2)
            .and_then(|s| s.parse::<u16>().ok())
            .unwrap_or(8080);
        if let Err(e) = bucketplan::api::run_http_server(port).await {
            error!("server error: {e}");
            std::process::exit(1);
        }
        return;
    }

    if let Err(msg) = bucketplan::api::run_once() {
        eprintln!("{msg}");
        std::process::exit(1);
    }
}
