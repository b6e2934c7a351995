pub mod catalog;
pub mod errors;
pub mod evaluator;
pub mod fingerprint;
pub mod guard;
pub mod model;
pub mod parser;
pub mod prompt;
pub mod providers;
pub mod storage;
