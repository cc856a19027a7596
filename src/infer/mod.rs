mod knowledge;
mod sentence;

pub use knowledge::{KnowledgeBase, Move};
pub use sentence::Sentence;
