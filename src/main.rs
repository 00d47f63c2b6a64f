use std::env;

use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let raw_args: Vec<String> = env::args().collect();
    match raw_args.get(1).map(|s| s.as_str()) {
        Some("serve") => {
            let port = raw_args
                .get(2)
                .and_then(|s| s.parse::<u16>().ok())
                .unwrap_or(8080);
            if let Err(e) = fire_projection::api::run_http_server(port).await {
                eprintln!("Server error: {e}");
                std::process::exit(1);
            }
        }
        Some("simulate") => match fire_projection::api::run_cli(raw_args.into_iter().skip(1)) {
            Ok(json) => println!("{json}"),
            Err(fire_projection::api::CliError::Args(e)) => e.exit(),
            Err(e) => {
                eprintln!("Error: {e}");
                std::process::exit(2);
            }
        },
        _ => {
            eprintln!("Usage: fire-projection serve [port] | fire-projection simulate [options]");
            std::process::exit(1);
        }
    }
}
