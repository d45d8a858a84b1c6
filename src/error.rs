use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Unsupported file format for {} (use .toml, .yaml, .yml or .json)", .path.display())]
    UnsupportedFormat { path: PathBuf },

    #[error("Failed to parse {format}: {message}")]
    Parse {
        format: &'static str,
        message: String,
    },

    #[error("Malformed {variant} for event type '{event_type}': {message}")]
    MalformedGlyph {
        event_type: String,
        variant: &'static str,
        message: String,
    },

    #[error("Render error: {0}")]
    Render(String),
}
