use byteorder::{BigEndian, LittleEndian, ReadBytesExt, WriteBytesExt};
use std::fs::{self, File, OpenOptions};
use std::io::{self, Read, Write};
use std::path::{Component, Path, PathBuf};

use crate::error::{ArchiveError, Result};
use crate::Catalog;

/// Writes the self-delimiting catalog header: a little-endian u32 byte
/// length followed by the bitcode encoding of the catalog.
pub fn write_catalog<W: Write>(w: &mut W, catalog: &Catalog) -> Result<()> {
    let buf = bitcode::encode(catalog);
    w.write_u32::<LittleEndian>(buf.len() as u32)?;
    w.write_all(&buf)?;
    Ok(())
}

/// Reads the catalog header back, leaving the stream positioned at the
/// first payload byte. A stream that ends inside the header is a decode
/// failure, not an io failure.
pub fn read_catalog<R: Read>(r: &mut R) -> Result<Catalog> {
    let len = r.read_u32::<LittleEndian>().map_err(header_err)?;
    let mut buf = vec![0u8; len as usize];
    r.read_exact(&mut buf).map_err(header_err)?;
    bitcode::decode(&buf).map_err(|e| ArchiveError::Decode(e.to_string()))
}

fn header_err(e: io::Error) -> ArchiveError {
    if e.kind() == io::ErrorKind::UnexpectedEof {
        ArchiveError::Decode("truncated catalog header".to_string())
    } else {
        ArchiveError::Io(e)
    }
}

/// Serializes the catalog header followed by one length-prefixed payload
/// block per file entry, in catalog order. Directory entries contribute no
/// block. Each file's length is sampled from the open handle immediately
/// before its bytes are copied, so a source that changes size under us is
/// caught as a mismatch rather than silently framed wrong.
pub fn encode<W: Write>(w: &mut W, catalog: &Catalog) -> Result<()> {
    write_catalog(w, catalog)?;
    for entry in catalog.files() {
        let mut f = File::open(&entry.name)?;
        let size = f.metadata()?.len();
        write_block(w, &mut f, &entry.name, size)?;
    }
    Ok(())
}

/// One payload block: an 8-byte big-endian length, flushed, then exactly
/// `size` bytes copied from the source. A copy that moves any other number
/// of bytes leaves the archive corrupt and fails the whole operation.
fn write_block<W: Write, R: Read>(w: &mut W, r: &mut R, name: &str, size: u64) -> Result<()> {
    w.write_u64::<BigEndian>(size)?;
    w.flush()?;
    let copied = io::copy(r, w)?;
    if copied != size {
        return Err(ArchiveError::SizeMismatch {
            name: name.to_string(),
            expected: size,
            actual: copied,
        });
    }
    Ok(())
}

/// Recreates the catalog's entries under `target`, consuming the payload
/// stream strictly sequentially. Directory creation is non-recursive and
/// refuses an already existing directory; files are created with
/// `create_new` and never overwrite. A stream that ends before a declared
/// payload length is a size mismatch; entries extracted before the failure
/// stay in place.
pub fn extract<R: Read>(r: &mut R, catalog: &Catalog, target: &Path) -> Result<()> {
    for entry in catalog.entries() {
        let path = join_under(target, &entry.name);
        if entry.is_directory() {
            fs::create_dir(&path)?;
        } else {
            let size = r.read_u64::<BigEndian>()?;
            let mut out = OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)?;
            let copied = io::copy(&mut r.by_ref().take(size), &mut out)?;
            if copied != size {
                return Err(ArchiveError::SizeMismatch {
                    name: entry.name.clone(),
                    expected: size,
                    actual: copied,
                });
            }
        }
    }
    Ok(())
}

/// Joins an entry name under the extraction target keeping only normal
/// path components, so a stored root or `..` cannot escape the target.
pub(crate) fn join_under(target: &Path, name: &str) -> PathBuf {
    let mut path = target.to_path_buf();
    for comp in Path::new(name).components() {
        if let Component::Normal(part) = comp {
            path.push(part);
        }
    }
    path
}
