pub mod dialogue;
pub mod practice;
pub mod scoring;
pub mod settings;
pub mod synthesis;
