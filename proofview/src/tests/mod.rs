mod support;


// Proof state tests
mod goals;
mod tacticals;

// Engine tests
mod engine;
