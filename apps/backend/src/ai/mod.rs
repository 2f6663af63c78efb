//! Bot decision making.

mod strategy;

pub use strategy::BotStrategy;
