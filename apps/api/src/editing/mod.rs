// In-place editing: bullet addressing and the external rewrite round trip.

pub mod controller;
pub mod prompts;
pub mod rewrite;
