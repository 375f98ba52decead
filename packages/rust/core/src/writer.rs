//! Collection file writer.

use std::path::Path;

use tracing::{debug, info, instrument};

use routeman_shared::{Collection, Result, RoutemanError};

use crate::document::{PostmanCollection, render_pretty};

/// Render a collection as Postman v2.1 JSON text.
pub fn render_collection(collection: &Collection) -> Result<String> {
    let document = PostmanCollection::from_collection(collection)?;
    render_pretty(&document)
}

/// Write a collection to `path`, creating parent directories.
///
/// The file is written to a temp sibling and renamed into place, so an
/// existing collection is never left half-written.
#[instrument(skip_all, fields(path = %path.display()))]
pub fn write_collection(collection: &Collection, path: &Path) -> Result<usize> {
    let content = render_collection(collection)?;

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir).map_err(|e| RoutemanError::io(dir, e))?;

    let file_name = path
        .file_name()
        .ok_or_else(|| {
            RoutemanError::output(format!("output path {} has no file name", path.display()))
        })?
        .to_string_lossy();
    let temp = dir.join(format!(".{file_name}.tmp"));

    std::fs::write(&temp, &content).map_err(|e| {
        let _ = std::fs::remove_file(&temp);
        RoutemanError::io(&temp, e)
    })?;
    debug!(temp = %temp.display(), size = content.len(), "wrote temp collection");

    std::fs::rename(&temp, path).map_err(|e| {
        let _ = std::fs::remove_file(&temp);
        RoutemanError::io(path, e)
    })?;

    info!(
        folders = collection.folders.len(),
        requests = collection.request_count(),
        "collection written"
    );

    Ok(content.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::{BuildOptions, build_collection};
    use routeman_shared::RouteDescriptor;

    fn sample() -> Collection {
        let routes = vec![
            RouteDescriptor::new("api/users", "GET|HEAD").unwrap(),
            RouteDescriptor::new("api/login", "POST").unwrap(),
        ];
        build_collection(&routes, &BuildOptions::default()).collection
    }

    #[test]
    fn writes_into_new_directory() {
        let dir = std::env::temp_dir().join(format!("routeman-writer-{}", uuid::Uuid::now_v7()));
        let path = dir.join("nested").join("collection.json");

        let size = write_collection(&sample(), &path).expect("write");
        let content = std::fs::read_to_string(&path).expect("read back");
        assert_eq!(content.len(), size);
        assert!(content.starts_with("{\n    \"info\": {"));

        let parsed: serde_json::Value = serde_json::from_str(&content).expect("valid json");
        assert_eq!(parsed["item"][0]["name"], "Login");
        assert_eq!(parsed["item"][1]["name"], "Users");

        // No temp file left behind.
        assert!(!path.with_file_name(".collection.json.tmp").exists());

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn overwrites_existing_file() {
        let dir = std::env::temp_dir().join(format!("routeman-overwrite-{}", uuid::Uuid::now_v7()));
        std::fs::create_dir_all(&dir).expect("mkdir");
        let path = dir.join("collection.json");
        std::fs::write(&path, "stale").expect("seed");

        write_collection(&sample(), &path).expect("write");
        let content = std::fs::read_to_string(&path).expect("read back");
        assert!(content.contains("CRM Travel API"));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn failed_write_removes_temp_file() {
        let dir = std::env::temp_dir().join(format!("routeman-full-{}", uuid::Uuid::now_v7()));
        std::fs::create_dir_all(&dir).expect("mkdir");
        let path = dir.join("collection.json");
        let temp = dir.join(".collection.json.tmp");
        // Writes through this link fail with ENOSPC after opening.
        std::os::unix::fs::symlink("/dev/full", &temp).expect("symlink");

        let err = write_collection(&sample(), &path).unwrap_err();
        assert!(matches!(err, RoutemanError::Io { .. }));
        assert!(std::fs::symlink_metadata(&temp).is_err());
        assert!(!path.exists());

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn render_matches_written_shape() {
        let text = render_collection(&sample()).expect("render");
        let parsed: PostmanCollection = serde_json::from_str(&text).expect("parse back");
        assert_eq!(parsed.item.len(), 2);
        assert_eq!(parsed.variable.len(), 2);
    }
}
