use axum_server::tls_rustls::RustlsConfig;
use clap::Parser;
use forecast_host::app::create_app;
use forecast_host::config::{Environment, HostConfig};
use forecast_host::routes::https_redirect::redirect_routes;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::process;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long, env = "PORT", default_value_t = 3000)]
    port: u16,

    #[arg(short, long, env = "APP_ENVIRONMENT", value_enum, default_value_t = Environment::Production)]
    environment: Environment,

    #[arg(long, env = "FORECAST_HOST_CONFIG", default_value = "forecast_host.toml")]
    config: PathBuf,

    #[arg(short, long, env = "KEY_FILE_PATH", requires = "cert_file_path")]
    key_file_path: Option<String>,

    #[arg(short, long, env = "CERT_FILE_PATH", requires = "key_file_path")]
    cert_file_path: Option<String>,

    /// Plain http port that permanently redirects to the https listener.
    #[arg(long, env = "REDIRECT_PORT", requires = "cert_file_path")]
    redirect_port: Option<u16>,
}

fn exit_with(message: String) -> ! {
    log::error!("{}", message);
    process::exit(1);
}

async fn serve_redirects(redirect_port: u16, https_port: u16) {
    let addr = SocketAddr::from(([0, 0, 0, 0], redirect_port));
    log::info!("redirecting http on {} to https port {}", addr, https_port);
    if let Err(err) = axum_server::bind(addr)
        .serve(redirect_routes(https_port).into_make_service())
        .await
    {
        exit_with(format!("redirect listener stopped: {err}"));
    }
}

#[tokio::main]
async fn main() {
    env_logger::init();

    let args = Args::parse();

    let config = HostConfig::load(&args.config)
        .unwrap_or_else(|err| exit_with(format!("failed to load config: {err}")));

    let app = create_app(args.environment, &config)
        .unwrap_or_else(|err| exit_with(format!("failed to create app: {err}")));

    let addr = SocketAddr::from(([0, 0, 0, 0], args.port));
    log::info!("listening on {} ({:?})", addr, args.environment);

    let served = if let (Some(key_file_path), Some(cert_file_path)) =
        (args.key_file_path, args.cert_file_path)
    {
        log::info!(
            "using tls with key file {} and cert file {}",
            key_file_path,
            cert_file_path
        );
        let tls = RustlsConfig::from_pem_file(cert_file_path, key_file_path)
            .await
            .unwrap_or_else(|err| exit_with(format!("failed to load tls files: {err}")));
        if let Some(redirect_port) = args.redirect_port {
            tokio::spawn(serve_redirects(redirect_port, args.port));
        }
        axum_server::bind_rustls(addr, tls)
            .serve(app.into_make_service())
            .await
    } else {
        axum_server::bind(addr)
            .serve(app.into_make_service())
            .await
    };

    if let Err(err) = served {
        exit_with(format!("server stopped: {err}"));
    }
}
