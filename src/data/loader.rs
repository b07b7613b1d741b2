// ============================================================
// Layer 4 — CIFAR-10 Archive Loader
// ============================================================
// Makes sure the CIFAR-10 binary release is present on disk and
// hands back the raw bytes of each split.
//
// On-disk layout after unpacking:
//   <root>/cifar-10-batches-bin/
//     data_batch_1.bin … data_batch_5.bin   ← 50 000 training records
//     test_batch.bin                        ← 10 000 test records
//     batches.meta.txt                      ← class names (unused)
//
// If any batch file is missing, the whole .tar.gz is downloaded
// through Burn's dataset downloader and unpacked in place. The
// downloader panics on network errors; `fetch_archive` turns that
// panic into an error so the CLI exits with a message.

use anyhow::{Context, Result};
use burn::data::network::downloader::download_file_as_bytes;
use flate2::read::GzDecoder;
use std::{
    fs,
    io::Read,
    path::{Path, PathBuf},
};

const URL: &str = "https://www.cs.toronto.edu/~kriz/cifar-10-binary.tar.gz";
const ARCHIVE_NAME: &str = "cifar-10-binary.tar.gz";
const BATCHES_DIR: &str = "cifar-10-batches-bin";

/// Which half of the dataset to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CifarSplit {
    Train,
    Test,
}

impl CifarSplit {
    /// Batch files making up this split, in reading order
    pub fn files(self) -> &'static [&'static str] {
        match self {
            CifarSplit::Train => &[
                "data_batch_1.bin",
                "data_batch_2.bin",
                "data_batch_3.bin",
                "data_batch_4.bin",
                "data_batch_5.bin",
            ],
            CifarSplit::Test => &["test_batch.bin"],
        }
    }
}

impl std::fmt::Display for CifarSplit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CifarSplit::Train => write!(f, "train"),
            CifarSplit::Test  => write!(f, "test"),
        }
    }
}

/// Locates (and if needed fetches) the CIFAR-10 batch files under a root directory.
pub struct CifarLoader {
    root: PathBuf,
}

impl CifarLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Directory holding the *.bin batch files
    pub fn batches_dir(&self) -> PathBuf {
        self.root.join(BATCHES_DIR)
    }

    /// True when every batch file of both splits is on disk
    pub fn is_complete(&self) -> bool {
        let dir = self.batches_dir();
        [CifarSplit::Train, CifarSplit::Test]
            .iter()
            .flat_map(|s| s.files())
            .all(|f| dir.join(f).is_file())
    }

    /// Download and unpack the archive unless it is already there.
    pub fn ensure(&self) -> Result<()> {
        if self.is_complete() {
            tracing::debug!("CIFAR-10 found in '{}'", self.batches_dir().display());
            return Ok(());
        }

        fs::create_dir_all(&self.root)
            .with_context(|| format!("Cannot create data directory '{}'", self.root.display()))?;

        tracing::info!("CIFAR-10 not found in '{}', downloading {}", self.root.display(), URL);
        let bytes = fetch_archive(URL, || download_file_as_bytes(URL, ARCHIVE_NAME))?;
        tracing::info!("Downloaded {} bytes, unpacking", bytes.len());

        unpack(&bytes[..], &self.root)?;

        if !self.is_complete() {
            anyhow::bail!(
                "Archive unpacked into '{}' but batch files are still missing",
                self.root.display()
            );
        }
        Ok(())
    }

    /// Read the raw record bytes of every file in a split, concatenated.
    pub fn read_split(&self, split: CifarSplit) -> Result<Vec<u8>> {
        let dir       = self.batches_dir();
        let mut bytes = Vec::new();

        for name in split.files() {
            let path = dir.join(name);
            let mut chunk = fs::read(&path)
                .with_context(|| format!("Cannot read CIFAR-10 batch '{}'", path.display()))?;
            tracing::debug!("Read {} bytes from '{}'", chunk.len(), path.display());
            bytes.append(&mut chunk);
        }

        Ok(bytes)
    }
}

/// Run a downloader that panics on failure and report the panic as an error.
pub fn fetch_archive<F>(url: &str, download: F) -> Result<Vec<u8>>
where
    F: FnOnce() -> Vec<u8> + std::panic::UnwindSafe,
{
    std::panic::catch_unwind(download).map_err(|cause| {
        let reason = cause
            .downcast_ref::<String>()
            .map(String::as_str)
            .or_else(|| cause.downcast_ref::<&str>().copied())
            .unwrap_or("unknown error");
        anyhow::anyhow!("Download of {url} failed: {reason}")
    })
}

/// Unpack a gzip-compressed tar stream into `dest`.
pub fn unpack<R: Read>(reader: R, dest: &Path) -> Result<()> {
    let mut archive = tar::Archive::new(GzDecoder::new(reader));
    archive
        .unpack(dest)
        .with_context(|| format!("Cannot unpack CIFAR-10 archive into '{}'", dest.display()))
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use flate2::{write::GzEncoder, Compression};

    /// Build a .tar.gz holding a batches dir with the given files.
    fn fake_archive(files: &[(&str, &[u8])]) -> Vec<u8> {
        let enc         = GzEncoder::new(Vec::new(), Compression::fast());
        let mut builder = tar::Builder::new(enc);
        for (name, data) in files {
            let mut header = tar::Header::new_gnu();
            header.set_size(data.len() as u64);
            header.set_mode(0o644);
            header.set_cksum();
            builder
                .append_data(&mut header, format!("{BATCHES_DIR}/{name}"), *data)
                .unwrap();
        }
        builder.into_inner().unwrap().finish().unwrap()
    }

    fn all_files() -> Vec<&'static str> {
        [CifarSplit::Train, CifarSplit::Test]
            .iter()
            .flat_map(|s| s.files().iter().copied())
            .collect()
    }

    #[test]
    fn test_split_file_counts() {
        assert_eq!(CifarSplit::Train.files().len(), 5);
        assert_eq!(CifarSplit::Test.files(), &["test_batch.bin"]);
    }

    #[test]
    fn test_empty_root_is_incomplete() {
        let dir = tempfile::tempdir().unwrap();
        assert!(!CifarLoader::new(dir.path()).is_complete());
    }

    #[test]
    fn test_unpack_makes_loader_complete() {
        let dir   = tempfile::tempdir().unwrap();
        let files: Vec<(&str, &[u8])> = all_files().into_iter().map(|f| (f, &b"x"[..])).collect();
        let tgz   = fake_archive(&files);

        unpack(&tgz[..], dir.path()).unwrap();

        let loader = CifarLoader::new(dir.path());
        assert!(loader.is_complete());
        // ensure() must not try the network once everything is there
        loader.ensure().unwrap();
    }

    #[test]
    fn test_read_split_concatenates_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let files: Vec<(String, Vec<u8>)> = all_files()
            .into_iter()
            .enumerate()
            .map(|(i, f)| (f.to_string(), vec![i as u8; 2]))
            .collect();
        let borrowed: Vec<(&str, &[u8])> =
            files.iter().map(|(n, d)| (n.as_str(), d.as_slice())).collect();
        unpack(&fake_archive(&borrowed)[..], dir.path()).unwrap();

        let loader = CifarLoader::new(dir.path());
        let train  = loader.read_split(CifarSplit::Train).unwrap();
        assert_eq!(train, vec![0, 0, 1, 1, 2, 2, 3, 3, 4, 4]);
        let test = loader.read_split(CifarSplit::Test).unwrap();
        assert_eq!(test, vec![5, 5]);
    }

    #[test]
    fn test_garbage_archive_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(unpack(&b"not a gzip stream"[..], dir.path()).is_err());
    }

    #[test]
    fn test_failed_download_is_an_error() {
        let err = fetch_archive("http://unreachable", || panic!("connection refused")).unwrap_err();
        assert!(err.to_string().contains("connection refused"));

        let bytes = fetch_archive("http://local", || vec![1, 2, 3]).unwrap();
        assert_eq!(bytes, vec![1, 2, 3]);
    }
}
