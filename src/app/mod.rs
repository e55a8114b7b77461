//! Hexagonal application layer: the control service, its port traits, and
//! the inbound/outbound message types.

pub mod commands;
pub mod events;
pub mod ports;
pub mod service;
