//! Binary snapshots of a [`NodeStore`].
//!
//! A snapshot is a 4-byte little-endian header length, a bincode header
//! (magic bytes, format version, payload checksum) and the bincode-encoded
//! store. The lookup cache is not saved; a restored store starts cold with
//! caching enabled.

use crate::error::{IrError, IrResult};
use crate::store::NodeStore;
use arbor_common::ContentHash;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Magic bytes opening every snapshot header.
const SNAPSHOT_MAGIC: [u8; 4] = *b"ARBR";

/// Bump on any change to the header or to the serialized store layout.
const SNAPSHOT_FORMAT_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct SnapshotHeader {
    magic: [u8; 4],
    format_version: u32,
    checksum: ContentHash,
}

fn encode<T: Serialize>(value: &T) -> IrResult<Vec<u8>> {
    bincode::serde::encode_to_vec(value, bincode::config::standard())
        .map_err(|e| IrError::Snapshot(e.to_string()))
}

/// Encodes `store` into snapshot bytes.
pub fn to_bytes(store: &NodeStore) -> IrResult<Vec<u8>> {
    let payload = encode(store)?;
    let header = encode(&SnapshotHeader {
        magic: SNAPSHOT_MAGIC,
        format_version: SNAPSHOT_FORMAT_VERSION,
        checksum: ContentHash::from_bytes(&payload),
    })?;

    let header_len = u32::try_from(header.len())
        .map_err(|_| IrError::Snapshot("header too large".to_string()))?;
    let mut out = Vec::with_capacity(4 + header.len() + payload.len());
    out.extend_from_slice(&header_len.to_le_bytes());
    out.extend_from_slice(&header);
    out.extend_from_slice(&payload);
    Ok(out)
}

/// Decodes a store from snapshot bytes, validating the header.
pub fn from_bytes(bytes: &[u8]) -> IrResult<NodeStore> {
    let Some((len, rest)) = bytes.split_first_chunk::<4>() else {
        return Err(IrError::Snapshot("truncated header length".to_string()));
    };
    let header_len = u32::from_le_bytes(*len) as usize;
    if rest.len() < header_len {
        return Err(IrError::Snapshot("truncated header".to_string()));
    }
    let (header, payload) = rest.split_at(header_len);

    let header: SnapshotHeader =
        bincode::serde::decode_from_slice(header, bincode::config::standard())
            .map_err(|e| IrError::Snapshot(e.to_string()))?
            .0;
    if header.magic != SNAPSHOT_MAGIC {
        return Err(IrError::Snapshot("not an arbor snapshot".to_string()));
    }
    if header.format_version != SNAPSHOT_FORMAT_VERSION {
        return Err(IrError::Snapshot(format!(
            "format version {} is not supported (expected {SNAPSHOT_FORMAT_VERSION})",
            header.format_version
        )));
    }
    if ContentHash::from_bytes(payload) != header.checksum {
        return Err(IrError::Snapshot("checksum mismatch".to_string()));
    }

    let store = bincode::serde::decode_from_slice(payload, bincode::config::standard())
        .map_err(|e| IrError::Snapshot(e.to_string()))?
        .0;
    Ok(store)
}

/// Writes a snapshot of `store` to `path`.
pub fn write_to(store: &NodeStore, path: &Path) -> IrResult<()> {
    let bytes = to_bytes(store)?;
    std::fs::write(path, bytes)?;
    log::debug!("saved {} nodes to {}", store.len(), path.display());
    Ok(())
}

/// Reads a snapshot from `path`.
pub fn read_from(path: &Path) -> IrResult<NodeStore> {
    let bytes = std::fs::read(path)?;
    from_bytes(&bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::SchemaBuilder;
    use crate::ids::NodeId;
    use crate::kind::NodeKind;
    use crate::schema::Schema;
    use crate::tag::Tag;
    use crate::writer::Serializer;

    fn sample() -> NodeStore {
        let mut store = NodeStore::new();
        let name = store.intern_identifier("total").unwrap();
        let schema = Schema::new()
            .with(Tag::Name, name.as_raw().to_string())
            .with(Tag::Srcp, "sum.c:4:12")
            .with(Tag::Static, "1");
        SchemaBuilder::new(&mut store)
            .build(NodeId::from_raw(7), NodeKind::VarDecl, &schema)
            .unwrap();
        store
    }

    #[test]
    fn restored_store_renders_identically() {
        let store = sample();
        let restored = from_bytes(&to_bytes(&store).unwrap()).unwrap();
        assert_eq!(
            Serializer::new(&restored).to_text().unwrap(),
            Serializer::new(&store).to_text().unwrap()
        );
        assert_eq!(restored.next_id(), store.next_id());
        assert_eq!(restored.find_identifier("total"), store.find_identifier("total"));
    }

    #[test]
    fn corrupted_payload_is_rejected() {
        let mut bytes = to_bytes(&sample()).unwrap();
        let last = bytes.len() - 1;
        bytes[last] ^= 0xff;
        assert!(matches!(from_bytes(&bytes), Err(IrError::Snapshot(msg)) if msg.contains("checksum")));
    }

    #[test]
    fn foreign_bytes_are_rejected() {
        assert!(matches!(from_bytes(&[1, 0]), Err(IrError::Snapshot(_))));
        assert!(matches!(from_bytes(&[200, 0, 0, 0, 1]), Err(IrError::Snapshot(_))));
    }

    #[test]
    fn file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("unit.arbr");
        write_to(&sample(), &path).unwrap();
        let restored = read_from(&path).unwrap();
        assert_eq!(restored.len(), 2);
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_from(&dir.path().join("absent.arbr")).unwrap_err();
        assert!(matches!(err, IrError::Io(_)));
    }
}
