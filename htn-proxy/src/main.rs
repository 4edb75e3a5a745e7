mod cache;
mod cli;
mod routes;

use std::{env, io, process, sync::Arc};

use htn_schedule::{session::FileStore, source::HttpEventSource};
use log::info;
use tokio::{net::TcpListener, signal};

use crate::cli::Parsed;

fn setup_logging() {
    if env::var("LOG").is_err() {
        env::set_var("LOG", "htn_proxy=info,htn_schedule=info");
    }

    pretty_env_logger::init_custom_env("LOG");
}

#[tokio::main]
async fn main() -> io::Result<()> {
    let args = match cli::parse(env::args().skip(1)) {
        Ok(Parsed::Run(args)) => args,
        Ok(Parsed::Help(usage)) => {
            println!("{usage}");
            return Ok(());
        }
        Err(err) => {
            eprintln!("{err}");
            process::exit(1);
        }
    };

    setup_logging();

    let source = HttpEventSource::new(&args.upstream, args.timeout)
        .map_err(|err| io::Error::new(io::ErrorKind::Other, err))?;

    let state = routes::AppState::new(
        source,
        Box::new(FileStore::new(&args.session_file)),
        cache::Config {
            refresh: args.refresh,
            ttl: args.refresh_ttl,
        },
    );

    let listener = TcpListener::bind(args.address).await?;
    info!("Listening at http://{}", args.address);
    info!("Proxying events from {}", args.upstream);

    axum::serve(listener, routes::router(Arc::new(state)))
        .with_graceful_shutdown(async {
            signal::ctrl_c().await.ok();
            info!("Shutting down");
        })
        .await
}
