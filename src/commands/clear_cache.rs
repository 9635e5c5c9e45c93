use anyhow::Result;
use owo_colors::OwoColorize;
use panchang_core::PanchangService;
use panchang_core::config::PanchangConfig;

pub async fn run() -> Result<()> {
    let config = PanchangConfig::load()?;
    let service = PanchangService::new(config.calendar_cache()?);

    service.clear_cache().await;

    println!(
        "{} {}",
        "Cleared".green(),
        config.cache_store().dir().display().dimmed()
    );
    Ok(())
}
