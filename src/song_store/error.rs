use thiserror::Error;

#[derive(Debug, Error)]
pub enum SongStoreError {
    #[error("song not found")]
    NotFound { artist: String, title: String },

    #[error("song already exists")]
    AlreadyExists { artist: String, title: String },

    #[error("nothing to change")]
    NoChange,

    #[error("invalid filter: {0}")]
    InvalidFilter(String),

    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

impl SongStoreError {
    pub fn not_found(artist: &str, title: &str) -> Self {
        SongStoreError::NotFound {
            artist: artist.to_string(),
            title: title.to_string(),
        }
    }
}

impl From<rusqlite::Error> for SongStoreError {
    fn from(err: rusqlite::Error) -> Self {
        SongStoreError::Store(err.into())
    }
}

pub type SongStoreResult<T> = std::result::Result<T, SongStoreError>;
