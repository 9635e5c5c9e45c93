use anyhow::Result;
use panchang_core::DateRange;

use super::Context;

pub async fn run(ctx: &Context, from: &str, to: Option<&str>, refresh: bool) -> Result<()> {
    let range = DateRange::from_args(from, to)?;
    ctx.show_range(&range, refresh).await?;
    Ok(())
}
