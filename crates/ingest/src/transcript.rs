use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transcript {
    pub transcript_id: String,
    pub text: String,
    pub source: String,
}

impl Transcript {
    pub fn new(text: String, source: String) -> Self {
        // Content-derived so identical transcripts share an id
        let transcript_id = Self::generate_transcript_id(&text);

        Self {
            transcript_id,
            text,
            source,
        }
    }

    /// Transcript submitted inline with a request.
    pub fn inline(text: String) -> Self {
        Self::new(text, "inline".to_string())
    }

    fn generate_transcript_id(text: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(text.as_bytes());
        let result = hasher.finalize();
        hex::encode(&result[..16]) // First 16 bytes (32 hex chars)
    }
}
