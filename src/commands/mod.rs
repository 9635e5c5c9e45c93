pub mod auth;
pub mod clear_cache;
pub mod month;
pub mod range;
pub mod today;
pub mod year;

use std::sync::Arc;

use anyhow::{Context as _, Result};
use panchang_core::config::PanchangConfig;
use panchang_core::{DateRange, Location, PanchangResult, PanchangService, RangeResult};
use panchang_provider_prokerala::{AppConfig, PrimaryFetcher};

use crate::render;
use crate::utils::tui::create_spinner;

/// Everything a data command needs, built once per invocation.
pub struct Context {
    pub service: PanchangService,
    pub location: Location,
    pub json: bool,
}

impl Context {
    pub fn load(lat: Option<f64>, lon: Option<f64>, json: bool) -> Result<Self> {
        let config = PanchangConfig::load()?;
        let location = resolve_location(lat, lon, &config)?;
        let service = build_service(&config)?;

        Ok(Context {
            service,
            location,
            json,
        })
    }

    /// Await `request` behind a spinner and print its result.
    pub async fn show<F>(&self, message: String, request: F) -> Result<RangeResult>
    where
        F: Future<Output = PanchangResult<RangeResult>>,
    {
        let spinner = (!self.json).then(|| create_spinner(message));
        let result = request.await;
        if let Some(spinner) = spinner {
            spinner.finish_and_clear();
        }
        let result = result?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&result)?);
        } else {
            render::print_range(&result);
        }

        Ok(result)
    }

    pub async fn show_range(&self, range: &DateRange, force_refresh: bool) -> Result<RangeResult> {
        let message = format!("Fetching {} to {}", range.start_iso(), range.end_iso());
        self.show(message, async {
            Ok(self
                .service
                .get_range(range, &self.location, force_refresh)
                .await)
        })
        .await
    }
}

/// Wire the service: cache always, fallback always, primary only when the
/// provider has been configured.
pub fn build_service(config: &PanchangConfig) -> Result<PanchangService> {
    let cache = config.calendar_cache()?;
    let mut service = PanchangService::new(cache);

    if AppConfig::exists() {
        let app_config = AppConfig::load()?;
        let fetcher =
            PrimaryFetcher::from_config(&app_config, Arc::new(config.credential_store()));
        service = service.with_primary(Arc::new(fetcher));
    } else {
        tracing::warn!(
            path = %AppConfig::path().map(|p| p.display().to_string()).unwrap_or_default(),
            "no provider config, using local calculation only (run `panchang auth` for setup)"
        );
    }

    Ok(service)
}

/// Command-line coordinates win over the configured default location.
pub fn resolve_location(
    lat: Option<f64>,
    lon: Option<f64>,
    config: &PanchangConfig,
) -> Result<Location> {
    if let (Some(lat), Some(lon)) = (lat, lon) {
        return Location::new(lat, lon).context("Invalid --lat/--lon");
    }

    match config.default_location()? {
        Some(location) => Ok(location),
        None => {
            let path = PanchangConfig::config_path()?;
            anyhow::bail!(
                "No location given.\n\n\
                Pass one on the command line:\n  \
                panchang --lat 19.076 --lon 72.8777 today\n\n\
                Or set a default in {}:\n  \
                [location]\n  \
                latitude = 19.076\n  \
                longitude = 72.8777",
                path.display()
            )
        }
    }
}
