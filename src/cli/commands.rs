use clap::Subcommand;

use super::classify::ClassifyArgs;
use super::plan::PlanArgs;
use super::truncate::TruncateArgs;

#[derive(Subcommand, Clone)]
pub enum Commands {
    /// Truncate an HTML fragment to a bounded length
    Truncate(TruncateArgs),

    /// Classify a form control by tag and type attribute
    Classify(ClassifyArgs),

    /// Validate a form plan and list its fields
    Plan(PlanArgs),

    /// Print the effective configuration
    Config,
}
