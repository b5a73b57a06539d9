use std::fs::File;
use std::io::{self, BufWriter, Read, Write};
use std::path::Path;
use std::time::Instant;

use crate::engine::{ShardedPool, SizeHasher};
use crate::error::Result;
use crate::types::Block;

/// Write the readable bytes of a block to `path`, creating or truncating it.
///
/// The file holds raw bytes only: no header, no checksum.
pub fn persist_block(path: impl AsRef<Path>, block: &Block) -> Result<()> {
    let path = path.as_ref();
    let start = Instant::now();

    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    writer.write_all(block)?;
    writer.flush()?;
    writer.get_ref().sync_all()?;

    tracing::debug!(
        "Persisted {} bytes to {:?} in {:?}",
        block.len(),
        path,
        start.elapsed()
    );
    Ok(())
}

/// Read a file back into a block taken from `pool`.
///
/// The block size is the file length. On a read failure the block goes back
/// to the pool before the error is returned.
pub fn restore_block<H: SizeHasher>(path: impl AsRef<Path>, pool: &ShardedPool<H>) -> Result<Block> {
    let path = path.as_ref();
    let mut file = File::open(path)?;

    let len = usize::try_from(file.metadata()?.len())
        .map_err(|_| io::Error::new(io::ErrorKind::InvalidData, "file too large for a block"))?;

    let mut block = pool.get(len);
    if let Err(e) = file.read_exact(&mut block) {
        pool.put(block);
        return Err(e.into());
    }

    tracing::debug!("Restored {} bytes from {:?}", len, path);
    Ok(block)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn test_persist_writes_raw_bytes() {
        let dir = std::env::temp_dir().join("blockpool-test-persist-raw");
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();

        let pool = ShardedPool::new(&[512]);
        let mut block = pool.get(512);
        block[..5].copy_from_slice(b"hello");

        let path = dir.join("block.bin");
        persist_block(&path, &block).unwrap();

        let data = std::fs::read(&path).unwrap();
        assert_eq!(data.len(), 512);
        assert_eq!(&data[..5], b"hello");
        assert!(data[5..].iter().all(|&b| b == 0));

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_persist_truncates_existing_file() {
        let dir = std::env::temp_dir().join("blockpool-test-persist-truncate");
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();

        let path = dir.join("block.bin");
        std::fs::write(&path, vec![0xffu8; 4096]).unwrap();

        let pool = ShardedPool::new(&[]);
        persist_block(&path, &pool.get(16)).unwrap();
        assert_eq!(std::fs::metadata(&path).unwrap().len(), 16);

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_persist_missing_directory_fails() {
        let path = std::env::temp_dir()
            .join("blockpool-test-persist-missing")
            .join("nested")
            .join("block.bin");
        let _ = std::fs::remove_dir_all(std::env::temp_dir().join("blockpool-test-persist-missing"));

        let pool = ShardedPool::new(&[]);
        let result = persist_block(&path, &pool.get(8));
        assert!(matches!(result, Err(Error::Io(_))));
    }

    #[test]
    fn test_restore_roundtrip_uses_pool() {
        let dir = std::env::temp_dir().join("blockpool-test-restore");
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();

        let pool = ShardedPool::new(&[1024]);
        let mut block = pool.get(1024);
        block[1000..1004].copy_from_slice(b"tail");
        let path = dir.join("block.bin");
        persist_block(&path, &block).unwrap();
        pool.put(block);

        let restored = restore_block(&path, &pool).unwrap();
        assert_eq!(restored.len(), 1024);
        assert_eq!(&restored[1000..1004], b"tail");
        assert_eq!(pool.sub_pool_stats(1024).unwrap().hits, 1);

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_restore_missing_file() {
        let pool = ShardedPool::new(&[]);
        let path = std::env::temp_dir().join("blockpool-test-restore-missing.bin");
        let _ = std::fs::remove_file(&path);

        assert!(matches!(restore_block(&path, &pool), Err(Error::Io(_))));
        assert_eq!(pool.metrics().snapshot().allocations, 0);
    }
}
