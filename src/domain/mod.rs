// Domain layer - Core business types and rules

pub mod errors;
pub mod model;
pub mod rules;
