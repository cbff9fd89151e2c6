pub mod clock;
pub mod machine;
pub mod phase;

pub use clock::{Elapsed, ElapsedTimeClock};
pub use machine::SessionStateMachine;
pub use phase::{SessionPhase, derive_phase};
