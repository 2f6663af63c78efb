//! Game domain: cards, match state and the mode engines.

pub mod cards;
pub mod dealing;
pub mod engine;
pub mod snapshot;
pub mod state;

#[cfg(test)]
mod tests_engine_1v1;
#[cfg(test)]
mod tests_engine_2v2;
#[cfg(test)]
mod tests_props_engine;
#[cfg(test)]
mod tests_scoring;
#[cfg(test)]
pub mod testutil;
