//! Concurrent per-city fetching.
//!
//! Each configured city gets its own task. Whenever one finishes, a fresh
//! [`BoardSnapshot`] is published on a watch channel, so consumers can render
//! the cities that have resolved while the rest are still in flight.

use std::sync::Arc;

use tokio::{sync::watch, task::JoinSet};
use tracing::{debug, info, warn};

use crate::{
    FetchError, ForecastRequest, ForecastResponse, ForecastViewModel,
    model::CityQuery,
    presenter::build_view_model,
    provider::ForecastProvider,
};

#[derive(Debug, Clone, PartialEq)]
pub enum CityState {
    Pending,
    Ready(Box<ForecastResponse>),
    Failed(FetchError),
}

#[derive(Debug, Clone, PartialEq)]
pub struct CitySlot {
    pub query: CityQuery,
    pub state: CityState,
}

/// Point-in-time view of every city on the board, in configured order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoardSnapshot {
    slots: Vec<CitySlot>,
}

impl BoardSnapshot {
    fn pending(cities: &[CityQuery]) -> Self {
        let slots = cities
            .iter()
            .cloned()
            .map(|query| CitySlot { query, state: CityState::Pending })
            .collect();
        Self { slots }
    }

    pub fn slots(&self) -> &[CitySlot] {
        &self.slots
    }

    /// View models for the cities that have resolved. Pending and failed
    /// cities are left out.
    pub fn view_models(&self) -> Vec<ForecastViewModel> {
        self.slots
            .iter()
            .filter_map(|slot| match &slot.state {
                CityState::Ready(response) => Some(build_view_model(response)),
                _ => None,
            })
            .collect()
    }

    pub fn failures(&self) -> impl Iterator<Item = (&CityQuery, &FetchError)> {
        self.slots.iter().filter_map(|slot| match &slot.state {
            CityState::Failed(err) => Some((&slot.query, err)),
            _ => None,
        })
    }

    pub fn pending_count(&self) -> usize {
        self.slots.iter().filter(|s| s.state == CityState::Pending).count()
    }

    pub fn is_settled(&self) -> bool {
        self.pending_count() == 0
    }
}

/// A set of in-flight forecast fetches. Dropping the board aborts whatever is
/// still running.
#[derive(Debug)]
pub struct ForecastBoard {
    rx: watch::Receiver<BoardSnapshot>,
    tasks: JoinSet<()>,
}

impl ForecastBoard {
    pub fn spawn(provider: Arc<dyn ForecastProvider>, cities: &[CityQuery], days: u8) -> Self {
        let (tx, rx) = watch::channel(BoardSnapshot::pending(cities));
        let tx = Arc::new(tx);
        let mut tasks = JoinSet::new();

        for (index, city) in cities.iter().cloned().enumerate() {
            let provider = Arc::clone(&provider);
            let tx = Arc::clone(&tx);

            tasks.spawn(async move {
                let state = match ForecastRequest::for_city(&city, days) {
                    Ok(request) => match provider.get_forecast(&request).await {
                        Ok(response) => CityState::Ready(Box::new(response)),
                        Err(err) => CityState::Failed(err),
                    },
                    Err(err) => CityState::Failed(err),
                };

                match &state {
                    CityState::Failed(err) => {
                        warn!(city = %city.city, error = %err, "city forecast unavailable")
                    }
                    _ => debug!(city = %city.city, "city forecast resolved"),
                }

                tx.send_modify(|snapshot| {
                    if let Some(slot) = snapshot.slots.get_mut(index) {
                        slot.state = state;
                    }
                });
            });
        }

        Self { rx, tasks }
    }

    /// Receiver that is notified after every completed fetch. It reports
    /// closed once all fetches are done.
    pub fn subscribe(&self) -> watch::Receiver<BoardSnapshot> {
        self.rx.clone()
    }

    pub fn snapshot(&self) -> BoardSnapshot {
        self.rx.borrow().clone()
    }

    /// Wait for every fetch to finish and return the final snapshot.
    pub async fn wait(mut self) -> BoardSnapshot {
        while let Some(joined) = self.tasks.join_next().await {
            if let Err(err) = joined {
                warn!(error = %err, "forecast task did not complete");
            }
        }

        let snapshot = self.snapshot();
        info!(
            resolved = snapshot.view_models().len(),
            failed = snapshot.failures().count(),
            "forecast board settled"
        );
        snapshot
    }
}

/// Fetch every city concurrently and wait for all of them.
pub async fn fetch_all(
    provider: Arc<dyn ForecastProvider>,
    cities: &[CityQuery],
    days: u8,
) -> BoardSnapshot {
    ForecastBoard::spawn(provider, cities, days).wait().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Condition, CurrentConditions, Forecast, Location};
    use async_trait::async_trait;
    use std::{collections::HashMap, time::Duration};

    #[derive(Debug, Clone)]
    enum Outcome {
        Ok { delay_ms: u64 },
        Fail,
        Hang,
    }

    /// Answers by latitude; the location name echoes the latitude.
    #[derive(Debug, Default)]
    struct ScriptedProvider {
        outcomes: HashMap<String, Outcome>,
    }

    impl ScriptedProvider {
        fn with(mut self, latitude: &str, outcome: Outcome) -> Self {
            self.outcomes.insert(latitude.to_string(), outcome);
            self
        }
    }

    fn response(name: &str) -> ForecastResponse {
        ForecastResponse {
            location: Location {
                name: name.to_string(),
                region: None,
                country: None,
                localtime: None,
            },
            current: CurrentConditions {
                temp_c: 20.0,
                condition: Condition { text: "Sunny".into(), icon: "//x/sun.png".into() },
                wind_kph: 5.0,
                wind_mph: 3.1,
                wind_dir: "N".into(),
                humidity: 50,
                vis_km: 10.0,
                feelslike_c: None,
            },
            forecast: Forecast::default(),
        }
    }

    #[async_trait]
    impl ForecastProvider for ScriptedProvider {
        async fn get_forecast(
            &self,
            request: &ForecastRequest,
        ) -> Result<ForecastResponse, FetchError> {
            match self.outcomes.get(&request.latitude) {
                Some(Outcome::Ok { delay_ms }) => {
                    tokio::time::sleep(Duration::from_millis(*delay_ms)).await;
                    Ok(response(&request.latitude))
                }
                Some(Outcome::Hang) => std::future::pending().await,
                Some(Outcome::Fail) | None => Err(FetchError::new("status 500")),
            }
        }
    }

    fn cities() -> Vec<CityQuery> {
        vec![
            CityQuery::new("New York", "40.71", "-74.01"),
            CityQuery::new("London", "51.52", "-0.11"),
            CityQuery::new("Sydney", "-33.88", "151.22"),
        ]
    }

    #[tokio::test]
    async fn view_models_follow_configured_order_not_completion_order() {
        let provider = ScriptedProvider::default()
            .with("40.71", Outcome::Ok { delay_ms: 60 })
            .with("51.52", Outcome::Ok { delay_ms: 30 })
            .with("-33.88", Outcome::Ok { delay_ms: 0 });

        let snapshot = fetch_all(Arc::new(provider), &cities(), 4).await;

        let names: Vec<_> = snapshot.view_models().into_iter().map(|vm| vm.city).collect();
        assert_eq!(names, ["40.71", "51.52", "-33.88"]);
        assert!(snapshot.is_settled());
    }

    #[tokio::test]
    async fn failed_city_is_dropped_and_reported() {
        let provider = ScriptedProvider::default()
            .with("40.71", Outcome::Ok { delay_ms: 0 })
            .with("51.52", Outcome::Fail)
            .with("-33.88", Outcome::Ok { delay_ms: 0 });

        let snapshot = fetch_all(Arc::new(provider), &cities(), 4).await;

        assert_eq!(snapshot.view_models().len(), 2);
        let failed: Vec<_> = snapshot.failures().map(|(q, _)| q.city.clone()).collect();
        assert_eq!(failed, ["London"]);
    }

    #[tokio::test]
    async fn invalid_city_fails_without_a_request() {
        let provider = ScriptedProvider::default().with("", Outcome::Ok { delay_ms: 0 });
        let cities = vec![CityQuery::new("Nowhere", "", "")];

        let snapshot = fetch_all(Arc::new(provider), &cities, 4).await;

        assert!(snapshot.view_models().is_empty());
        assert_eq!(snapshot.failures().count(), 1);
    }

    #[tokio::test]
    async fn hung_city_does_not_block_the_others() {
        let provider = ScriptedProvider::default()
            .with("40.71", Outcome::Ok { delay_ms: 0 })
            .with("51.52", Outcome::Hang)
            .with("-33.88", Outcome::Ok { delay_ms: 10 });

        let board = ForecastBoard::spawn(Arc::new(provider), &cities(), 4);
        let mut rx = board.subscribe();

        let snapshot = tokio::time::timeout(Duration::from_secs(5), async {
            loop {
                {
                    let snapshot = rx.borrow_and_update();
                    if snapshot.pending_count() == 1 {
                        return snapshot.clone();
                    }
                }
                rx.changed().await.expect("board still running");
            }
        })
        .await
        .expect("two cities resolve");

        let names: Vec<_> = snapshot.view_models().into_iter().map(|vm| vm.city).collect();
        assert_eq!(names, ["40.71", "-33.88"]);
        assert_eq!(snapshot.slots()[1].state, CityState::Pending);
        assert!(!snapshot.is_settled());
    }

    #[tokio::test]
    async fn snapshot_starts_all_pending() {
        let provider = ScriptedProvider::default().with("40.71", Outcome::Hang);
        let cities = vec![CityQuery::new("New York", "40.71", "-74.01")];

        let board = ForecastBoard::spawn(Arc::new(provider), &cities, 4);

        let snapshot = board.snapshot();
        assert_eq!(snapshot.pending_count(), 1);
        assert!(snapshot.view_models().is_empty());
    }
}
