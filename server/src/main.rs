use clap::Parser;
use log::info;
use server::network::Server;
use shared::TICK_INTERVAL;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Address to bind to
    #[arg(short = 'H', long, default_value = "0.0.0.0")]
    host: String,

    /// Port to listen on
    #[arg(short, long, env = "PORT", default_value_t = 3000)]
    port: u16,

    /// Physics tick interval in milliseconds
    #[arg(
        short,
        long,
        default_value_t = (TICK_INTERVAL.as_millis() as u64),
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    tick_ms: u64,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    if std::env::var("RUST_LOG").is_err() {
        eprintln!("Set RUST_LOG=info for detailed logging");
    }

    let args = Args::parse();

    let address = format!("{}:{}", args.host, args.port);
    let mut server = Server::new(&address, Duration::from_millis(args.tick_ms)).await?;

    tokio::select! {
        result = server.run() => result?,
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C, shutting down gracefully...");
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_args() {
        let args = Args::try_parse_from(["server"]).unwrap();
        assert_eq!(args.host, "0.0.0.0");
        assert_eq!(args.tick_ms, TICK_INTERVAL.as_millis() as u64);
    }

    #[test]
    fn test_zero_tick_ms_rejected() {
        assert!(Args::try_parse_from(["server", "--tick-ms", "0"]).is_err());
        let args = Args::try_parse_from(["server", "--tick-ms", "1"]).unwrap();
        assert_eq!(args.tick_ms, 1);
    }
}
