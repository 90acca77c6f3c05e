//! Topic classification for claims

pub mod classifier;

pub use classifier::{TopicClassifier, TopicConfig, TopicRule};
