#![forbid(unsafe_code)]

pub mod error;
pub mod navigation;
pub mod rules;
pub mod session;
pub mod tracker;

pub use greeting_core::Clock;

pub use error::NavigationError;
pub use navigation::{EnterHandler, NavigationController};
pub use rules::{CANDLE_COUNT, DERIVED_RULES, DerivedRule, MiniGame, ParseMiniGameError};
pub use session::GreetingSession;
pub use tracker::{CANDLES_INTERACTION, ProgressTracker};
