use std::fs;
use std::path::Path;

use crate::error::Result;
use crate::Catalog;

/// Builds a catalog from the input paths, in the order given by the caller.
/// A directory argument is walked pre-order (the directory's entry is
/// appended strictly before any entry underneath it); anything else is
/// appended as a single file entry under the name exactly as given.
///
/// Symbolic links are followed: a link to a file archives the target's
/// bytes, a link to a directory is walked like a directory.
pub fn catalog_from_paths(paths: &[String]) -> Result<Catalog> {
    let mut catalog = Catalog::new();
    for name in paths {
        let path = Path::new(name);
        if path.is_dir() {
            append_tree(&mut catalog, path)?;
        } else {
            catalog.add_file(name.clone());
        }
    }
    Ok(catalog)
}

/// Appends `dir` and, recursively, everything underneath it. Entry names
/// are the paths as encountered, so they carry the root argument as a
/// prefix. Sibling order is whatever the filesystem reports; the only
/// ordering promise is directory-before-descendants.
pub fn append_tree(catalog: &mut Catalog, dir: &Path) -> Result<()> {
    catalog.add_directory(dir.to_string_lossy().into_owned());
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        // metadata() follows symlinks; a dangling link aborts the walk.
        if path.metadata()?.is_dir() {
            append_tree(catalog, &path)?;
        } else {
            catalog.add_file(path.to_string_lossy().into_owned());
        }
    }
    Ok(())
}
