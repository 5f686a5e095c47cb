use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// Create a temporary source tree from `(relative path, contents)` pairs.
pub fn source_tree(files: &[(&str, &str)]) -> TempDir {
    let temp = TempDir::new().unwrap();
    for (rel, contents) in files {
        write_file(temp.path(), rel, contents.as_bytes());
    }
    temp
}

pub fn write_file(root: &Path, rel: &str, contents: &[u8]) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}
