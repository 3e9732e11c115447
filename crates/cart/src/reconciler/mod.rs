//! Stock reconciliation

mod plan;
mod sweep;

pub use plan::{MutationPlan, plan_mutation, plan_set_quantity};
pub use sweep::{StockSweeper, SweepOutcome, SweepReport, SweepTask};
