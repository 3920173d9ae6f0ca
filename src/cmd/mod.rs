pub mod rank;
pub mod search;
pub mod synth;
