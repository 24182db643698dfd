pub mod engine;

pub use engine::{AiEngine, HeuristicAi};
