mod extinf;
mod models;
mod parser;
mod writer;

use std::path::PathBuf;

use thiserror::Error;

pub use extinf::ExtinfBuilder;
pub use models::{PlaylistEntry, PLAYLIST_HEADER};
pub use parser::{parse_playlist, read_playlist};
pub use writer::{render_playlist, validated_output_path, write_playlist};

#[derive(Debug, Error)]
pub enum PlaylistError {
    #[error("failed to read playlist {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write playlist {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
