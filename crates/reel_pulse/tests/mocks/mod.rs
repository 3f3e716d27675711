pub mod analyst;
pub mod catalog;
pub mod matcher;
pub mod provider;
pub mod recognizer;
pub mod renderer;
pub mod synthesizer;
