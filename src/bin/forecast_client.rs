use std::process;
use std::sync::Arc;

use clap::Parser;
use forecast_host::client::{
    DEFAULT_FORECAST_URL, FetchOutcome, ForecastDisplay, HttpForecastSource, PendingFetch,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc::{UnboundedSender, unbounded_channel};

#[derive(Parser, Debug)]
#[command(author, version, about = "Shows the weather forecast in the terminal", long_about = None)]
struct Args {
    #[arg(short, long, env = "FORECAST_URL", default_value = DEFAULT_FORECAST_URL)]
    url: String,
}

fn spawn_fetch(pending: PendingFetch<HttpForecastSource>, outcomes: UnboundedSender<FetchOutcome>) {
    tokio::spawn(async move {
        // The receiver only goes away when we are shutting down.
        let _ = outcomes.send(pending.run().await);
    });
}

fn show(display: &ForecastDisplay<HttpForecastSource>) {
    println!("\n{}", display.render());
}

#[tokio::main]
async fn main() {
    env_logger::init();

    let args = Args::parse();

    let source = match HttpForecastSource::new(args.url) {
        Ok(source) => source,
        Err(err) => {
            log::error!("Failed to create http client: {}", err);
            process::exit(1);
        }
    };

    let mut display = ForecastDisplay::new(Arc::new(source));
    let (outcome_tx, mut outcome_rx) = unbounded_channel();

    spawn_fetch(display.mount(), outcome_tx.clone());
    show(&display);

    let mut commands = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            Some(outcome) = outcome_rx.recv() => {
                if display.apply(outcome) {
                    show(&display);
                }
            }
            line = commands.next_line() => {
                match line {
                    Ok(Some(line)) => match line.trim() {
                        "r" => match display.refresh() {
                            Some(pending) => {
                                spawn_fetch(pending, outcome_tx.clone());
                                show(&display);
                            }
                            None => println!("Still loading, try again in a moment."),
                        },
                        "q" => break,
                        "" => {}
                        other => {
                            println!("Unknown command '{}', use r to refresh or q to quit.", other)
                        }
                    },
                    Ok(None) => break,
                    Err(err) => {
                        log::error!("Failed to read command: {}", err);
                        break;
                    }
                }
            }
        }
    }
}
