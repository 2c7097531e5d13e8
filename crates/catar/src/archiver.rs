use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use crate::error::Result;
use crate::{codec, walk, Catalog};

/// Builds a catalog from `paths` and writes the archive to `archive_name`,
/// creating or truncating it. Any failure leaves a corrupt artifact behind;
/// the caller retries from scratch rather than repairing.
pub fn pack(archive_name: &Path, paths: &[String]) -> Result<()> {
    let catalog = walk::catalog_from_paths(paths)?;
    let mut w = BufWriter::new(File::create(archive_name)?);
    codec::encode(&mut w, &catalog)?;
    w.flush()?;
    Ok(())
}

/// Recreates the archived tree under `directory`, which must already exist.
pub fn unpack(archive_name: &Path, directory: &Path) -> Result<()> {
    let mut r = BufReader::new(File::open(archive_name)?);
    let catalog = codec::read_catalog(&mut r)?;
    codec::extract(&mut r, &catalog, directory)
}

/// Reads only the catalog header and returns it; the payload blocks are
/// never touched and nothing is created on the filesystem.
pub fn list(archive_name: &Path) -> Result<Catalog> {
    let mut r = BufReader::new(File::open(archive_name)?);
    codec::read_catalog(&mut r)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::fs;
    use tempfile::tempdir;

    // The only test that relies on the working directory; everything else
    // in the crate uses absolute paths.
    #[test]
    fn round_trip_preserves_names_nesting_and_bytes() {
        let src = tempdir().unwrap();
        fs::write(src.path().join("a.txt"), b"abc").unwrap();
        fs::create_dir(src.path().join("d")).unwrap();
        fs::write(src.path().join("d/b.txt"), b"x").unwrap();
        fs::create_dir(src.path().join("d/e")).unwrap();
        fs::write(src.path().join("d/e/c.bin"), vec![0u8; 20_000]).unwrap();

        let scratch = tempdir().unwrap();
        let archive = scratch.path().join("tree.catar");
        let out = scratch.path().join("out");
        fs::create_dir(&out).unwrap();

        env::set_current_dir(src.path()).unwrap();
        pack(&archive, &["a.txt".to_string(), "d".to_string()]).unwrap();
        unpack(&archive, &out).unwrap();

        assert_eq!(fs::read(out.join("a.txt")).unwrap(), b"abc");
        assert_eq!(fs::read(out.join("d/b.txt")).unwrap(), b"x");
        assert_eq!(fs::read(out.join("d/e/c.bin")).unwrap(), vec![0u8; 20_000]);

        let catalog = list(&archive).unwrap();
        let names: Vec<&str> = catalog.entries().iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names[0], "a.txt");
        let d = names.iter().position(|n| *n == "d").unwrap();
        assert!(d < names.iter().position(|n| *n == "d/b.txt").unwrap());
        assert!(d < names.iter().position(|n| *n == "d/e").unwrap());
    }

    #[test]
    fn list_is_read_only_and_in_catalog_order() {
        let src = tempdir().unwrap();
        let one = src.path().join("one.txt");
        let two = src.path().join("two.txt");
        fs::write(&one, b"1").unwrap();
        fs::write(&two, b"22").unwrap();

        let archive = src.path().join("files.catar");
        let names = vec![
            one.to_string_lossy().into_owned(),
            two.to_string_lossy().into_owned(),
        ];
        pack(&archive, &names).unwrap();

        let before: Vec<_> = fs::read_dir(src.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();

        let catalog = list(&archive).unwrap();
        let listed: Vec<&str> = catalog.entries().iter().map(|e| e.name.as_str()).collect();
        assert_eq!(listed, names.iter().map(String::as_str).collect::<Vec<_>>());

        let after: Vec<_> = fs::read_dir(src.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(before, after);
        assert_eq!(fs::read(&one).unwrap(), b"1");
    }

    #[test]
    fn unpacking_twice_into_the_same_target_fails() {
        let src = tempdir().unwrap();
        let file = src.path().join("once.txt");
        fs::write(&file, b"once").unwrap();

        let archive = src.path().join("once.catar");
        pack(&archive, &[file.to_string_lossy().into_owned()]).unwrap();

        let out = tempdir().unwrap();
        unpack(&archive, out.path()).unwrap();
        assert!(unpack(&archive, out.path()).is_err());
    }

    #[test]
    fn packing_a_missing_input_fails() {
        let scratch = tempdir().unwrap();
        let archive = scratch.path().join("x.catar");
        let gone = scratch.path().join("gone.txt");
        assert!(pack(&archive, &[gone.to_string_lossy().into_owned()]).is_err());
    }
}
