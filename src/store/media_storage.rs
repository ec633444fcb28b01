use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Subdirectory of the media root holding generated images
const UPLOAD_DIR: &str = "images";

/// Durable file storage under a media root, published at a url prefix
#[derive(Debug, Clone)]
pub struct MediaStorage {
    root: PathBuf,
    url_prefix: String,
}

impl MediaStorage {
    pub fn new(root: impl Into<PathBuf>, url_prefix: impl Into<String>) -> Self {
        let mut url_prefix = url_prefix.into();
        if !url_prefix.ends_with('/') {
            url_prefix.push('/');
        }
        MediaStorage {
            root: root.into(),
            url_prefix,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn url_prefix(&self) -> &str {
        &self.url_prefix
    }

    /// Relative location a file named `name` is stored at
    pub fn location(&self, name: &str) -> String {
        format!("{}/{}", UPLOAD_DIR, name)
    }

    /// Copy `source` into storage as `name`, replacing any leftover file, and
    /// return its relative location
    pub fn save(&self, source: &Path, name: &str) -> io::Result<String> {
        let location = self.location(name);
        fs::create_dir_all(self.root.join(UPLOAD_DIR))?;
        fs::copy(source, self.path(&location))?;
        Ok(location)
    }

    pub fn path(&self, location: &str) -> PathBuf {
        self.root.join(location)
    }

    pub fn url(&self, location: &str) -> String {
        format!("{}{}", self.url_prefix, location)
    }
}
