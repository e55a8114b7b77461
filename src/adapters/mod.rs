//! Driven adapters: implementations of the app port traits.
//!
//! The hardware adapter exists only for the real target; host builds and
//! tests use mock adapters implementing the same traits.

pub mod log_sink;

#[cfg(all(feature = "espidf", target_os = "espidf"))]
pub mod hardware;
