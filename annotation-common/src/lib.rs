pub mod document;
pub mod engine;
pub mod outputters;
pub mod properties;
pub mod rules;
pub mod serialization;
