//! Proof-of-work difficulty engine: acceptance check, retargeting and
//! next-target selection

pub mod retarget;
pub mod selector;
pub mod validation;

pub use retarget::{
    bounded_timespan, calculate_next_target, scale_target, RetargetError, MAX_ADJUST_DOWN,
    MAX_ADJUST_UP, TIMESPAN_DAMPING,
};
pub use selector::select_next_target;
pub use validation::{check_proof_of_work, validate_proof_of_work, PowError, TargetFault};
