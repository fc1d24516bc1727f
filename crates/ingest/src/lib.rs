pub mod dialogue;
pub mod transcript;

pub use dialogue::{patient_dialogue, SAMPLE_TRANSCRIPT};
pub use transcript::Transcript;
