pub mod machine;
pub mod states;

pub use machine::{HiringLifecycle, TransitionError};
pub use states::{ClaimOutcome, HiringEvent, LifecycleAction, TransitionOutcome};
