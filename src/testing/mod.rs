//! Test support: a hand-driven scheduler and an inspectable leaf binding.
//!
//! Use [`ManualScheduler`] to control throttle timers and asynchronous
//! validations deterministically, and [`ProbeBinding`] to observe exactly what
//! a decorator forwards and when it reads from below.

pub mod probe;
pub mod scheduler;

pub use probe::ProbeBinding;
pub use scheduler::ManualScheduler;
