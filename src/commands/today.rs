use anyhow::Result;
use chrono::Local;
use panchang_core::DateRange;

use super::Context;
use crate::render;

pub async fn run(ctx: &Context, refresh: bool) -> Result<()> {
    let today = Local::now().date_naive();
    let range = DateRange::new(today, today)?;

    if ctx.json {
        ctx.show_range(&range, refresh).await?;
        return Ok(());
    }

    let result = ctx.service.get_range(&range, &ctx.location, refresh).await;
    render::print_day_detail(&result);
    Ok(())
}
