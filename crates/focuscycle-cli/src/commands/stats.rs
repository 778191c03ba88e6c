use clap::Args;
use focuscycle_core::Database;

#[derive(Args)]
pub struct StatsArgs {
    /// Only count focus time completed today (UTC)
    #[arg(long)]
    today: bool,
    /// Also list the N most recent focus sessions
    #[arg(long, value_name = "N")]
    recent: Option<usize>,
}

pub fn run(args: StatsArgs) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;
    let mut out = if args.today {
        serde_json::to_value(db.stats_today()?)?
    } else {
        serde_json::to_value(db.stats_all()?)?
    };
    if let Some(limit) = args.recent {
        out["recent"] = serde_json::to_value(db.recent(limit)?)?;
    }
    println!("{}", serde_json::to_string_pretty(&out)?);
    Ok(())
}
