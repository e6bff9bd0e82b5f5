//! Types shared by every plugin: collision layers, the round state and tunables.

pub mod layers;
pub mod state;
pub mod tunables;

#[cfg(test)]
pub mod test_utils;
