//! Whole-portal snapshots
//!
//! A snapshot is a gzip stream holding a short format header followed by the
//! bincode encoding of the [`Portal`]. The format is private to this crate
//! and only meant for offline backup between runs.

use crate::error::SnapshotError;
use crate::portal::Portal;
use bincode::{deserialize_from, serialize_into};
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

const MAGIC: &[u8; 6] = b"KBSNAP";
const FORMAT_VERSION: u8 = 1;

impl Portal {
    /// Encode the portal into a snapshot blob
    pub fn to_snapshot_bytes(&self) -> Result<Vec<u8>, SnapshotError> {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        write_snapshot(&mut encoder, self)?;
        encoder.finish().map_err(|e| SnapshotError::Encoding(e.into()))
    }

    /// Decode a portal from a snapshot blob
    pub fn from_snapshot_bytes(bytes: &[u8]) -> Result<Self, SnapshotError> {
        read_snapshot(GzDecoder::new(bytes))
    }

    /// Save a snapshot to `path`
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), SnapshotError> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|e| SnapshotError::io_error(path, e))?;
        let mut writer = BufWriter::new(GzEncoder::new(file, Compression::default()));
        write_snapshot(&mut writer, self)?;
        let encoder = writer
            .into_inner()
            .map_err(|e| SnapshotError::io_error(path, e.into_error()))?;
        encoder
            .finish()
            .map_err(|e| SnapshotError::io_error(path, e))?;
        tracing::debug!(path = %path.display(), portal = %self.name, "snapshot saved");
        Ok(())
    }

    /// Load a snapshot from `path`
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SnapshotError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| SnapshotError::io_error(path, e))?;
        let portal = read_snapshot(BufReader::new(GzDecoder::new(file)))?;
        tracing::debug!(path = %path.display(), portal = %portal.name, "snapshot loaded");
        Ok(portal)
    }
}

fn write_snapshot<W: Write>(writer: &mut W, portal: &Portal) -> Result<(), SnapshotError> {
    writer
        .write_all(MAGIC)
        .and_then(|()| writer.write_all(&[FORMAT_VERSION]))
        .map_err(|e| SnapshotError::Encoding(e.into()))?;
    serialize_into(writer, portal)?;
    Ok(())
}

fn read_snapshot<R: Read>(mut reader: R) -> Result<Portal, SnapshotError> {
    let mut header = [0u8; 7];
    reader
        .read_exact(&mut header)
        .map_err(|_| SnapshotError::BadHeader)?;
    if &header[..6] != MAGIC || header[6] != FORMAT_VERSION {
        return Err(SnapshotError::BadHeader);
    }
    Ok(deserialize_from(reader)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::language::Language;
    use crate::node::{Article, Category, Folder, RemoteId};
    use crate::origin::{CellRef, Origin};
    use pretty_assertions::assert_eq;

    fn portal() -> Portal {
        let mut portal = Portal::new("Help").with_workbook("wb").with_suffix("EU");
        let cat = portal.add_category(
            Category::new("Billing")
                .with_description("All about money")
                .with_origin(Origin::new(None, "Billing", Some(3), CellRef::new(1, 0)))
                .with_remote_id(RemoteId(40)),
        );
        portal
            .add_category_translation(cat, Language::Fr, Category::new("Facturation"))
            .unwrap();
        let folder = portal.add_folder(cat, Folder::new("Invoices")).unwrap();
        portal
            .add_article(folder, Article::from_markdown("Download", "Click *Download*."))
            .unwrap();
        portal
    }

    #[test]
    fn file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("help.kbs");
        let original = portal();
        original.save(&path).unwrap();
        assert_eq!(Portal::load(&path).unwrap(), original);
    }

    #[test]
    fn bytes_round_trip() {
        let original = portal();
        let bytes = original.to_snapshot_bytes().unwrap();
        assert_eq!(Portal::from_snapshot_bytes(&bytes).unwrap(), original);
    }

    #[test]
    fn rejects_foreign_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("junk.kbs");
        std::fs::write(&path, b"definitely not gzip").unwrap();
        assert!(matches!(Portal::load(&path), Err(SnapshotError::BadHeader)));

        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(b"OTHER!\x01rest").unwrap();
        let bytes = encoder.finish().unwrap();
        assert!(matches!(
            Portal::from_snapshot_bytes(&bytes),
            Err(SnapshotError::BadHeader)
        ));
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = Portal::load(dir.path().join("absent.kbs")).unwrap_err();
        assert!(matches!(err, SnapshotError::Io { .. }));
    }
}
