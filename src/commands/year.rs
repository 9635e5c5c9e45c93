use anyhow::Result;

use super::Context;

pub async fn run(ctx: &Context, year: i32) -> Result<()> {
    let request = ctx.service.get_year(year, &ctx.location);
    ctx.show(format!("Fetching {}", year), request).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use panchang_core::cache::CalendarCache;
    use panchang_core::store::MemoryStore;
    use panchang_core::{DataSource, Location, PanchangService};

    #[tokio::test]
    async fn test_year_command_fills_the_service_year_window() {
        let ctx = Context {
            service: PanchangService::new(CalendarCache::new(Arc::new(MemoryStore::new()))),
            location: Location::new(19.076, 72.8777).unwrap(),
            json: true,
        };
        run(&ctx, 2023).await.unwrap();

        let cached = ctx.service.get_year(2023, &ctx.location).await.unwrap();
        assert_eq!(cached.source, DataSource::Cache);
        assert_eq!(cached.entries.len(), 365);
    }
}
