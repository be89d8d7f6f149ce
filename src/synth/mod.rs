// Purpose: the FM voice itself and the plumbing that feeds it note events.
// This layer sits above the DSP primitives and owns the two update rates.

pub mod engine;
pub mod message;
pub mod voice;
