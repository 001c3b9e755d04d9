/// Pointer state machine.
pub mod controller;
