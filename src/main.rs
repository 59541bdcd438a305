use anyhow::{Context, Result};
use cn_market_calendar::{
    config::Config,
    events::{dividend, earnings, index_rebalance, ipo, macro_econ, nbs, templates, unlock},
    fetch,
    ics::CalendarSink,
};
use std::fs;
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder().with_env_filter(env).init();
    info!("startup");

    // ─── 2) config + output dir ──────────────────────────────────────
    let cfg = Config::from_env();
    info!(
        days_forward = cfg.days_forward,
        unlock_mv_min_yi = cfg.unlock_mv_min_yi,
        max_events_per_day = cfg.max_events_per_day,
        out_dir = %cfg.out_dir.display(),
        "configured"
    );
    fs::create_dir_all(&cfg.out_dir)
        .with_context(|| format!("creating {}", cfg.out_dir.display()))?;

    let client = fetch::client()?;

    // The combined calendar every category also registers into; one
    // subscription link covers everything.
    let mut cal_all = CalendarSink::new("中国市场投资日历（全量）", cfg.max_events_per_day);

    // ─── 3) run categories sequentially ──────────────────────────────
    ipo::generate(&client, &cfg, &mut cal_all).await?;
    unlock::generate(&client, &cfg, &mut cal_all).await?;
    earnings::generate(&client, &cfg, &mut cal_all).await?;
    dividend::generate(&client, &cfg, &mut cal_all).await?;
    index_rebalance::generate(&cfg, &mut cal_all)?;
    macro_econ::generate(&client, &cfg, &mut cal_all).await?;
    templates::generate_report_deadlines(&cfg, &mut cal_all)?;
    templates::generate_macro_windows(&cfg, &mut cal_all)?;

    // The NBS page breaks often enough that its failure must not take the
    // other calendars down with it.
    if let Err(e) = nbs::generate(&client, &cfg, &mut cal_all).await {
        error!(error = %format!("{:#}", e), "NBS calendar skipped");
    }

    // ─── 4) write the combined calendar ──────────────────────────────
    cal_all.write(&cfg.out_dir, "00_all.ics")?;
    info!("all done");
    Ok(())
}
