use std::sync::Arc;

use askama::Template;

use crate::client::source::{FetchError, ForecastDay, ForecastSource};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisplayState {
    Loading,
    Success(Vec<ForecastDay>),
    Failure(String),
}

/// Result of one fetch, tagged with the generation it was issued under.
#[derive(Debug)]
pub struct FetchOutcome {
    pub generation: u64,
    pub result: Result<Vec<ForecastDay>, FetchError>,
}

/// A fetch that has been issued but not yet run. Running it does not touch
/// the display; hand the outcome back with [`ForecastDisplay::apply`].
pub struct PendingFetch<S> {
    generation: u64,
    source: Arc<S>,
}

impl<S: ForecastSource> PendingFetch<S> {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub async fn run(self) -> FetchOutcome {
        FetchOutcome {
            generation: self.generation,
            result: self.source.fetch().await,
        }
    }
}

#[derive(Template)]
#[template(path = "forecast_display.txt")]
struct ForecastDisplayTemplate<'a> {
    state: &'a DisplayState,
}

/// Loading/success/failure view over a forecast source.
///
/// Every fetch bumps the generation counter and only the outcome of the
/// latest fetch is committed, so a slow earlier response can never overwrite
/// a newer one.
pub struct ForecastDisplay<S> {
    source: Arc<S>,
    state: DisplayState,
    generation: u64,
}

impl<S: ForecastSource> ForecastDisplay<S> {
    pub fn new(source: Arc<S>) -> ForecastDisplay<S> {
        ForecastDisplay {
            source,
            state: DisplayState::Loading,
            generation: 0,
        }
    }

    pub fn state(&self) -> &DisplayState {
        &self.state
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    fn begin_fetch(&mut self) -> PendingFetch<S> {
        self.generation += 1;
        self.state = DisplayState::Loading;
        PendingFetch {
            generation: self.generation,
            source: self.source.clone(),
        }
    }

    pub fn mount(&mut self) -> PendingFetch<S> {
        self.begin_fetch()
    }

    /// Refresh is only offered once the previous fetch has settled.
    pub fn refresh(&mut self) -> Option<PendingFetch<S>> {
        match self.state {
            DisplayState::Loading => None,
            DisplayState::Success(_) | DisplayState::Failure(_) => Some(self.begin_fetch()),
        }
    }

    /// Commits `outcome` unless a newer fetch has been issued since. Returns
    /// whether the state changed.
    pub fn apply(&mut self, outcome: FetchOutcome) -> bool {
        if outcome.generation != self.generation {
            log::debug!(
                "discarding stale forecast fetch {} (current is {})",
                outcome.generation,
                self.generation
            );
            return false;
        }
        self.state = match outcome.result {
            Ok(days) => DisplayState::Success(days),
            Err(err) => {
                log::error!("Failed to fetch weather forecast: {}", err);
                DisplayState::Failure(err.to_string())
            }
        };
        true
    }

    /// Mounts and waits for the first fetch to settle.
    pub async fn load(&mut self) {
        let outcome = self.mount().run().await;
        self.apply(outcome);
    }

    /// Refreshes and waits for the result. Does nothing while loading.
    pub async fn reload(&mut self) -> bool {
        match self.refresh() {
            Some(pending) => {
                let outcome = pending.run().await;
                self.apply(outcome)
            }
            None => false,
        }
    }

    pub fn render(&self) -> String {
        ForecastDisplayTemplate { state: &self.state }
            .render()
            .expect("Template rendering should always succeed")
    }
}
