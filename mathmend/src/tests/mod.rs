// Normalization and classification
mod cleaner;

// Corruption gate
mod gate;
mod validator;

// Repair stages
mod reconstruct;

// Compilation and tree handling
mod adapter;
mod mathml;
