use thiserror::Error;

#[derive(Error, Debug)]
pub enum PopArtError {
    /// A required request field was missing or the body could not be parsed.
    #[error("{0}")]
    ClientInput(String),

    #[error("{0}")]
    Config(String),

    /// The image generator answered with a non-success status.
    #[error("Image generator returned HTTP {status}: {body}")]
    UpstreamGeneration { status: u16, body: String },

    #[error("Image generator unreachable: {0}")]
    GeneratorUnreachable(String),

    /// Object store failure, or the upload payload could not be decoded.
    #[error("Upload failed: {0}")]
    UpstreamUpload(String),

    /// A proxy endpoint answered the client with a non-success status.
    #[error("Proxy returned HTTP {status}: {body}")]
    ProxyRejected { status: u16, body: String },

    #[error("{context}: {source}")]
    Transport {
        context: String,
        source: reqwest::Error,
    },

    #[error("Encoding error: {0}")]
    Encoding(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl PopArtError {
    pub fn transport(context: impl Into<String>, source: reqwest::Error) -> Self {
        PopArtError::Transport {
            context: context.into(),
            source,
        }
    }

    /// Message safe to hand back to an HTTP caller. Upstream details stay in the logs.
    pub fn public_message(&self) -> String {
        match self {
            PopArtError::ClientInput(msg) | PopArtError::Config(msg) => msg.clone(),
            PopArtError::UpstreamGeneration { .. } | PopArtError::GeneratorUnreachable(_) => {
                "Failed to generate image".to_string()
            }
            PopArtError::UpstreamUpload(_) => "Failed to upload image".to_string(),
            _ => "Internal server error".to_string(),
        }
    }

    pub fn is_client_error(&self) -> bool {
        matches!(self, PopArtError::ClientInput(_))
    }
}

pub type Result<T> = std::result::Result<T, PopArtError>;
