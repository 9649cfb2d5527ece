use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::{Path, PathBuf};

static INDEX_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\d+)\.").unwrap());

/// First `dir/image_name` that exists, searching `image_dirs` in order.
pub fn find_image_path<P: AsRef<Path>>(image_name: &str, image_dirs: &[P]) -> Option<PathBuf> {
    image_dirs.iter().find_map(|dir| {
        let path = dir.as_ref().join(image_name);
        if path.exists() {
            Some(path)
        } else {
            debug!("[Resolve] {:?} not found", path);
            None
        }
    })
}

/// Leading digits before the first dot, e.g. `"123.png"` -> `123`.
pub fn extract_index(image_name: &str) -> Option<u64> {
    INDEX_RE
        .captures(image_name)
        .and_then(|caps| caps[1].parse::<u64>().ok())
}
