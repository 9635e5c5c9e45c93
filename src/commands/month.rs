use anyhow::{Result, anyhow};
use chrono::Month;

use super::Context;

pub async fn run(ctx: &Context, year: i32, month: &str) -> Result<()> {
    let month = parse_month(month)?;
    let request = ctx.service.get_month(year, month, &ctx.location);
    ctx.show(format!("Fetching {} {}", month.name(), year), request).await?;
    Ok(())
}

/// Accepts "3", "03", "mar" or "March".
fn parse_month(s: &str) -> Result<Month> {
    if let Ok(n) = s.parse::<u8>() {
        return Month::try_from(n).map_err(|_| anyhow!("Month must be 1-12, got {}", n));
    }
    s.parse::<Month>()
        .map_err(|_| anyhow!("Unknown month '{}'. Use a number (1-12) or a name like 'march'", s))
}
