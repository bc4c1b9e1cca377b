use chrono::{Duration, Utc};
use clap::Args;
use mindflow_core::task::PriorityInput;
use mindflow_core::{PriorityScorer, PriorityTier};

use super::{print_json, CommandResult};

#[derive(Args)]
pub struct ScoreArgs {
    /// Declared tier: high, medium, low or ai
    #[arg(long)]
    tier: String,
    /// Due date as whole days from now (0 = today, negative = overdue)
    #[arg(long, allow_hyphen_values = true)]
    due_in_days: Option<i64>,
    #[arg(long)]
    description: Option<String>,
    #[arg(long)]
    mindful: bool,
}

pub fn run(args: ScoreArgs) -> CommandResult {
    let tier: PriorityTier = args.tier.parse()?;
    let now = Utc::now();
    let input = PriorityInput {
        due_date: args.due_in_days.map(|days| now + Duration::days(days)),
        description: args.description.as_deref(),
        is_mindful: args.mindful,
        tier,
    };
    print_json(&PriorityScorer::at(now).breakdown(&input))
}
