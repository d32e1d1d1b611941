//! Business logic services

pub mod civil_time;
pub mod clock;
pub mod engine;
pub mod geo;
pub mod geocoding;
pub mod reservation;
pub mod route_order;
pub mod route_sequencer;
pub mod slot_search;
pub mod store;

#[cfg(test)]
pub mod testing;
