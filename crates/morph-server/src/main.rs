mod response;
mod routes;
mod static_files;

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;

use anyhow::{anyhow, Result};
use clap::Parser;
use morph_engine::config::{load_default_dotenv, load_dotenv};
use morph_engine::MorphConfig;
use tiny_http::Server;

use routes::{handle_request, AppState};

#[derive(Debug, Parser)]
#[command(
    name = "morph-server",
    version,
    about = "MorphLab HTTP relay: POST /api/transform plus the front-end bundle"
)]
struct Args {
    /// Port to listen on instead of PORT
    #[arg(long)]
    port: Option<u16>,
    /// Address to bind
    #[arg(long, default_value_t = IpAddr::V4(Ipv4Addr::UNSPECIFIED))]
    host: IpAddr,
    /// Front-end bundle directory instead of MORPH_STATIC_DIR
    #[arg(long)]
    static_dir: Option<PathBuf>,
    /// Dotenv file to load instead of ./.env or ../.env
    #[arg(long)]
    env_file: Option<PathBuf>,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    if let Err(err) = run() {
        log::error!("morph-server error: {err:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let args = Args::parse();
    match args.env_file.as_deref() {
        Some(path) => {
            load_dotenv(path)?;
        }
        None => {
            if let Some(path) = load_default_dotenv() {
                log::info!("loaded environment from {}", path.display());
            }
        }
    }

    let mut config = MorphConfig::from_env();
    if let Some(port) = args.port {
        config.port = port;
    }
    if let Some(static_dir) = args.static_dir {
        config.static_dir = static_dir;
    }

    let state = Arc::new(AppState::from_config(&config)?);
    let addr = SocketAddr::new(args.host, config.port);
    let server = Server::http(addr).map_err(|err| anyhow!("failed binding {addr}: {err}"))?;
    log::info!(
        "server starting on http://localhost:{} (model {}, static files from {})",
        config.port,
        config.model,
        config.static_dir.display()
    );

    for request in server.incoming_requests() {
        let state = Arc::clone(&state);
        thread::spawn(move || {
            let url = request.url().to_string();
            if let Err(err) = handle_request(request, &state) {
                log::error!("error handling {url}: {err:#}");
            }
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::net::{IpAddr, Ipv4Addr};
    use std::path::PathBuf;

    use clap::{CommandFactory, Parser};

    use super::Args;

    #[test]
    fn args_definition_is_consistent() {
        Args::command().debug_assert();
    }

    #[test]
    fn args_default_to_environment() -> anyhow::Result<()> {
        let args = Args::try_parse_from(["morph-server"])?;
        assert_eq!(args.port, None);
        assert_eq!(args.host, IpAddr::V4(Ipv4Addr::UNSPECIFIED));
        assert!(args.static_dir.is_none());

        let args = Args::try_parse_from([
            "morph-server",
            "--port",
            "9090",
            "--host",
            "127.0.0.1",
            "--static-dir",
            "web/dist",
        ])?;
        assert_eq!(args.port, Some(9090));
        assert_eq!(args.host, IpAddr::V4(Ipv4Addr::LOCALHOST));
        assert_eq!(args.static_dir, Some(PathBuf::from("web/dist")));
        Ok(())
    }
}
