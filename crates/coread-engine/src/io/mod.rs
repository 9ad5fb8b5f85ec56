//! Reading offline pipeline output.
//!
//! The generation pipeline can dump a parsed document together with its full
//! threads as one JSON file (`{"document": ..., "threads": [...]}`). Loading
//! that file opens a session without any backend.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::models::{Document, Thread};

#[derive(Debug, thiserror::Error)]
pub enum IoError {
    #[error("File not found: {0}")]
    NotFound(PathBuf),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid pipeline output: {0}")]
    Parse(#[from] serde_json::Error),
}

/// A document with every thread generated for it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineOutput {
    pub document: Document,
    #[serde(default)]
    pub threads: Vec<Thread>,
}

impl PipelineOutput {
    pub fn from_json(json: &str) -> Result<Self, IoError> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Read pipeline output from a JSON file
pub fn read_pipeline_output(path: &Path) -> Result<PipelineOutput, IoError> {
    if !path.exists() {
        return Err(IoError::NotFound(path.to_path_buf()));
    }
    let json = fs::read_to_string(path)?;
    PipelineOutput::from_json(&json)
}
