//! Reconciliation engine.
//!
//! The engine is built with its providers in priority order (primary
//! first). Each call awaits the primary, then issues every secondary
//! concurrently and waits for all of them to settle; completion order never
//! affects the merge, only declared priority does.

use std::sync::Arc;
use std::time::Duration;

use common::{Coordinates, Error};
use futures::future::join_all;
use tracing::{debug, info, warn};
use weather_providers::{fetch_partial, try_fetch, ForecastProvider};

use crate::merge::{merge, Reconciliation};
use crate::validate::{clamp_vector, ensure_complete};

/// Engine tuning.
#[derive(Debug, Clone)]
pub struct ReconcilerOptions {
    /// Budget for each provider call.
    pub provider_timeout: Duration,
    /// Fail the reconciliation when the primary provider fails.
    pub primary_required: bool,
}

impl Default for ReconcilerOptions {
    fn default() -> Self {
        Self {
            provider_timeout: Duration::from_secs(10),
            primary_required: false,
        }
    }
}

/// Stateless reconciliation service over an injected provider list.
#[derive(Clone)]
pub struct Reconciler {
    primary: Arc<dyn ForecastProvider>,
    secondaries: Vec<Arc<dyn ForecastProvider>>,
    options: ReconcilerOptions,
}

impl Reconciler {
    /// `secondaries` are listed in descending priority.
    pub fn new(
        primary: Arc<dyn ForecastProvider>,
        secondaries: Vec<Arc<dyn ForecastProvider>>,
        options: ReconcilerOptions,
    ) -> Self {
        Self {
            primary,
            secondaries,
            options,
        }
    }

    /// Provider names in priority order.
    pub fn provider_names(&self) -> Vec<&str> {
        std::iter::once(self.primary.name())
            .chain(self.secondaries.iter().map(|p| p.name()))
            .collect()
    }

    /// Produce a complete, clamped feature vector for `coords`.
    pub async fn reconcile(&self, coords: Coordinates) -> Result<Reconciliation, Error> {
        let budget = self.options.provider_timeout;
        info!("Reconciling forecast for {} from {:?}", coords, self.provider_names());

        let primary = if self.options.primary_required {
            try_fetch(self.primary.as_ref(), coords, budget)
                .await
                .map_err(|e| Error::PrimaryProviderFatal(e.to_string()))?
        } else {
            fetch_partial(self.primary.as_ref(), coords, budget).await
        };

        let secondaries = join_all(
            self.secondaries
                .iter()
                .map(|p| fetch_partial(p.as_ref(), coords, budget)),
        )
        .await;

        let mut sources = Vec::with_capacity(1 + secondaries.len());
        sources.push((self.primary.name(), &primary));
        sources.extend(
            self.secondaries
                .iter()
                .map(|p| p.name())
                .zip(secondaries.iter()),
        );

        let (mut vector, provenance) = merge(&sources);
        let clamped = clamp_vector(&mut vector);
        if !clamped.is_empty() {
            debug!("Clamped out-of-range fields: {:?}", clamped);
        }
        ensure_complete(&vector)?;

        let reconciliation = Reconciliation { vector, provenance };

        if reconciliation.all_sources_exhausted() {
            warn!(
                "No provider supplied data for {}; using static defaults for every field",
                coords
            );
        } else {
            let defaulted = reconciliation.defaulted_fields();
            if !defaulted.is_empty() {
                debug!("Defaulted fields for {}: {:?}", coords, defaulted);
            }
        }

        info!(
            "Forecast for {}: precip={:.2}mm t2m={:.1}°C gwetroot={:.2} evptrns={:.2}mm radiation={:.2} ws10m={:.1}m/s sources={:?}",
            coords,
            vector.prectotcorr,
            vector.t2m,
            vector.gwetroot,
            vector.evptrns,
            vector.allsky_sfc_sw_dwn,
            vector.ws10m,
            reconciliation.provenance.provider_counts(),
        );

        Ok(reconciliation)
    }
}
