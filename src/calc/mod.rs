pub mod constants;
pub mod format;
pub mod input;
pub mod r_multiple;
pub mod recompute;
pub mod sizing;

pub use r_multiple::{calculate_r_multiple, RiskReward};
pub use recompute::{recompute_derived, DerivedFields};
pub use sizing::{
    calculate_forward, calculate_reverse, margin_requirement, CalcOutcome, CalculationInputs,
    CalculationResult, ForwardInputs, ReverseInputs,
};
