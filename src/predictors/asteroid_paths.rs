use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{error, info};

use crate::collectors::neo_fetcher::AsteroidSource;
use crate::core::asteroid::TransitionPath;
use crate::predictors::transitions::extract_transitions;

#[derive(Clone)]
pub struct AsteroidPathResolver {
    source: Arc<dyn AsteroidSource>,
}

impl AsteroidPathResolver {
    pub fn new(source: Arc<dyn AsteroidSource>) -> Self {
        Self { source }
    }

    /// Orbiting-body transitions for one asteroid. Provider and date errors yield an empty list.
    pub async fn paths(&self, asteroid_id: &str, from: NaiveDate, to: NaiveDate) -> Vec<TransitionPath> {
        info!(asteroid_id, %from, %to, "Fetching asteroid paths");

        let observations = match self.source.close_approaches(asteroid_id).await {
            Ok(obs) => obs,
            Err(e) => {
                error!(asteroid_id, error = %e, "Error fetching asteroid data");
                return Vec::new();
            }
        };

        match extract_transitions(&observations, from, to) {
            Ok(paths) => {
                info!(asteroid_id, observations = observations.len(), transitions = paths.len(), "Extracted transitions");
                paths
            }
            Err(e) => {
                error!(asteroid_id, error = %e, "Error processing asteroid data");
                Vec::new()
            }
        }
    }
}
