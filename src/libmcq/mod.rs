use std::io;
use std::path::PathBuf;
use thiserror::Error;

pub mod data;
pub mod eval;
pub mod model;
pub mod output;
pub mod parse;
pub mod resolve;

#[derive(Debug, Error)]
pub enum Error {
    #[error("cannot read MCQ data from {path:?}: {source}")]
    ReadData { path: PathBuf, source: io::Error },
    #[error("malformed JSON in {path:?}: {source}")]
    MalformedJson {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("cannot read recorded responses from {path:?}: {source}")]
    ReadResponses { path: PathBuf, source: io::Error },
    #[error("cannot create output directory {path:?}: {source}")]
    CreateOutputDir { path: PathBuf, source: io::Error },
    #[error("cannot write results to {path:?}: {source}")]
    WriteResults { path: PathBuf, source: io::Error },
}
