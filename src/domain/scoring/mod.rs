pub mod similarity;

pub use similarity::{levenshtein, normalize, ScoreResult, SimilarityScorer};
