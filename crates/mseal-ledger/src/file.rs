use std::collections::HashMap;
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;
use tracing::{debug, warn};

use mseal_types::{ContentDigest, RecordId};

use crate::entry::{LedgerEntry, SealedEntry, TransactionRef};
use crate::error::{LedgerError, LedgerResult};
use crate::memory::now_secs;
use crate::traits::Ledger;

/// Header size: 4 bytes length + 4 bytes CRC.
const HEADER_SIZE: usize = 8;

/// Internal mutable state for the segment writer.
struct SegmentState {
    writer: BufWriter<File>,
    /// Read index over the segment, rebuilt on open.
    index: HashMap<RecordId, SealedEntry>,
    /// Seal of the most recent entry; all zeros at genesis.
    head: [u8; 32],
    seq: u64,
    /// File offset just past the last confirmed frame. Bytes beyond this are
    /// a torn frame from an interrupted append and get cut before the next
    /// write.
    committed: u64,
    /// Set when a failed append could not be rolled back; further appends
    /// are refused rather than risk confirming an entry a reopen would drop.
    poisoned: bool,
}

/// Append-only, hash-chained file ledger.
///
/// Entries are serialized with bincode, framed with a length prefix and a
/// CRC32 checksum, and appended to a single segment file:
///
/// ```text
/// [4 bytes: entry length (little-endian u32)]
/// [4 bytes: CRC32 of payload (little-endian u32)]
/// [N bytes: payload (bincode-serialized SealedEntry)]
/// ```
///
/// Every append is flushed and fsynced before the confirmation is returned:
/// registrations are rare and each one must be durable. On open the segment
/// is read front-to-back to rebuild the id index; a torn entry at the tail
/// (incomplete write from a crash) is skipped with a warning, anything
/// corrupt before the tail fails the open.
pub struct FileLedger {
    path: PathBuf,
    state: Mutex<SegmentState>,
}

impl FileLedger {
    /// Open (or create) the ledger segment at the given path.
    pub fn open(path: impl Into<PathBuf>) -> LedgerResult<Self> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(&path)?;

        let (entries, committed) = read_segment(&path)?;
        let file_len = file.metadata()?.len();
        if committed < file_len {
            // Drop the torn tail now so later appends never land after it.
            warn!(
                path = %path.display(),
                torn_bytes = file_len - committed,
                "truncating torn frame at segment tail"
            );
            file.set_len(committed)?;
            file.sync_all()?;
        }

        let mut index = HashMap::with_capacity(entries.len());
        let mut head = [0u8; 32];
        let mut seq = 0;
        for sealed in entries {
            head = *sealed.seal().as_bytes();
            seq = sealed.seq;
            index.insert(sealed.id, sealed);
        }
        debug!(path = %path.display(), records = index.len(), "ledger segment opened");

        Ok(Self {
            path,
            state: Mutex::new(SegmentState {
                writer: BufWriter::new(file),
                index,
                head,
                seq,
                committed,
                poisoned: false,
            }),
        })
    }

    /// Path of the backing segment file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of registered records.
    pub fn len(&self) -> usize {
        self.state.lock().expect("ledger mutex poisoned").index.len()
    }

    /// Returns `true` if nothing has been registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Re-read the segment and verify the full hash chain.
    ///
    /// Checks sequence monotonicity and that every entry's `prev` equals the
    /// seal of its predecessor. Any out-of-band edit to the file surfaces
    /// here as [`LedgerError::CorruptEntry`]. Returns the number of entries
    /// verified.
    pub fn validate(&self) -> LedgerResult<u64> {
        // Flush buffered appends so the re-read sees them.
        {
            let mut state = self.state.lock().expect("ledger mutex poisoned");
            state.writer.flush()?;
        }
        let (entries, _) = read_segment(&self.path)?;
        let mut prev = [0u8; 32];
        for (index, sealed) in entries.iter().enumerate() {
            let expected_seq = (index + 1) as u64;
            if sealed.seq != expected_seq {
                return Err(LedgerError::CorruptEntry {
                    seq: sealed.seq,
                    reason: format!("expected seq {expected_seq}"),
                });
            }
            if sealed.prev != prev {
                return Err(LedgerError::CorruptEntry {
                    seq: sealed.seq,
                    reason: "previous seal link mismatch".into(),
                });
            }
            prev = *sealed.seal().as_bytes();
        }
        Ok(entries.len() as u64)
    }

    fn append(&self, id: &RecordId, digest: &ContentDigest) -> LedgerResult<TransactionRef> {
        let mut state = self.state.lock().expect("ledger mutex poisoned");
        if state.poisoned {
            return Err(LedgerError::Unavailable(
                "segment writer failed and could not be rolled back".into(),
            ));
        }
        if state.index.contains_key(id) {
            return Err(LedgerError::DuplicateRecord(*id));
        }

        // Any bytes past the committed offset are a torn frame left by an
        // interrupted append. Never write after them: a reopen would read
        // them as the tail and drop everything behind.
        let file_len = state.writer.get_ref().metadata()?.len();
        if file_len != state.committed {
            warn!(
                file_len,
                committed = state.committed,
                "torn frame past last confirmed entry; truncating before append"
            );
            state.writer.get_ref().set_len(state.committed)?;
            state.writer.get_ref().sync_all()?;
        }

        let sealed = SealedEntry {
            seq: state.seq + 1,
            prev: state.head,
            id: *id,
            digest: *digest,
            registered_at: now_secs(),
        };
        let payload = bincode::serialize(&sealed)
            .map_err(|e| LedgerError::Serialization(e.to_string()))?;
        let crc = crc32fast::hash(&payload);

        // Durable before confirmed: the TransactionRef is the caller's proof
        // that the entry exists.
        let written = write_frame(&mut state.writer, crc, &payload);
        if let Err(err) = written {
            self.discard_partial_frame(&mut state);
            return Err(err.into());
        }
        state.committed += (HEADER_SIZE + payload.len()) as u64;

        let seal = sealed.seal();
        state.seq = sealed.seq;
        state.head = *seal.as_bytes();
        state.index.insert(*id, sealed);

        debug!(record = %id, seq = sealed.seq, tx = %seal.short_hex(), "ledger append");
        Ok(seal)
    }

    /// Roll the segment back to the last confirmed frame after a failed
    /// append.
    ///
    /// The writer is replaced outright so no half-written bytes survive in
    /// its buffer. If the rollback itself fails the ledger is poisoned and
    /// refuses further appends; reads stay available.
    fn discard_partial_frame(&self, state: &mut SegmentState) {
        let restored = OpenOptions::new()
            .read(true)
            .append(true)
            .open(&self.path)
            .and_then(|file| {
                file.set_len(state.committed)?;
                file.sync_all()?;
                Ok(file)
            });
        match restored {
            Ok(file) => state.writer = BufWriter::new(file),
            Err(err) => {
                warn!(
                    path = %self.path.display(),
                    error = %err,
                    "cannot roll back torn frame; refusing further appends"
                );
                state.poisoned = true;
            }
        }
    }
}

fn write_frame(writer: &mut BufWriter<File>, crc: u32, payload: &[u8]) -> io::Result<()> {
    writer.write_all(&(payload.len() as u32).to_le_bytes())?;
    writer.write_all(&crc.to_le_bytes())?;
    writer.write_all(payload)?;
    writer.flush()?;
    writer.get_ref().sync_all()
}

#[async_trait]
impl Ledger for FileLedger {
    async fn register(
        &self,
        id: &RecordId,
        digest: &ContentDigest,
    ) -> LedgerResult<TransactionRef> {
        self.append(id, digest)
    }

    async fn read(&self, id: &RecordId) -> LedgerResult<Option<LedgerEntry>> {
        let state = self.state.lock().expect("ledger mutex poisoned");
        Ok(state.index.get(id).map(SealedEntry::entry))
    }
}

impl std::fmt::Debug for FileLedger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileLedger")
            .field("path", &self.path)
            .field("record_count", &self.len())
            .finish()
    }
}

/// Read all entries from a segment file front-to-back.
///
/// Returns the entries and the offset just past the last valid frame. A
/// short or CRC-failing entry at the tail is treated as a torn write and
/// skipped; the same condition anywhere before the tail means the file was
/// edited and fails the read.
fn read_segment(path: &Path) -> LedgerResult<(Vec<SealedEntry>, u64)> {
    let mut reader = BufReader::new(File::open(path)?);
    let file_len = reader.get_ref().metadata()?.len();
    let mut entries = Vec::new();
    let mut offset: u64 = 0;

    while offset + HEADER_SIZE as u64 <= file_len {
        let mut header = [0u8; HEADER_SIZE];
        match reader.read_exact(&mut header) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => break,
            Err(e) => return Err(e.into()),
        }
        let length = u32::from_le_bytes([header[0], header[1], header[2], header[3]]);
        let expected_crc = u32::from_le_bytes([header[4], header[5], header[6], header[7]]);

        let end = offset + HEADER_SIZE as u64 + length as u64;
        if length == 0 || end > file_len {
            warn!(offset, length, file_len, "torn ledger entry at tail; skipping");
            break;
        }

        let mut payload = vec![0u8; length as usize];
        match reader.read_exact(&mut payload) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => {
                warn!(offset, "truncated ledger entry at tail; skipping");
                break;
            }
            Err(e) => return Err(e.into()),
        }

        if crc32fast::hash(&payload) != expected_crc {
            if end == file_len {
                warn!(offset, "CRC mismatch in tail entry; skipping torn write");
                break;
            }
            return Err(LedgerError::CorruptEntry {
                seq: (entries.len() + 1) as u64,
                reason: format!("CRC mismatch at offset {offset}"),
            });
        }

        let sealed: SealedEntry = bincode::deserialize(&payload)
            .map_err(|e| LedgerError::Serialization(e.to_string()))?;
        entries.push(sealed);
        offset = end;
    }

    Ok((entries, offset))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn digest(byte: u8) -> ContentDigest {
        ContentDigest::from_hash([byte; 32])
    }

    fn temp_ledger() -> (tempfile::TempDir, FileLedger) {
        let dir = tempfile::tempdir().expect("tempdir");
        let ledger = FileLedger::open(dir.path().join("ledger.seg")).unwrap();
        (dir, ledger)
    }

    // -----------------------------------------------------------------------
    // Register / Read
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn register_then_read() {
        let (_dir, ledger) = temp_ledger();
        let id = RecordId::generate();
        ledger.register(&id, &digest(0x42)).await.unwrap();

        let entry = ledger.read(&id).await.unwrap().expect("entry should exist");
        assert_eq!(entry.digest, digest(0x42));
    }

    #[tokio::test]
    async fn read_unknown_id_returns_none() {
        let (_dir, ledger) = temp_ledger();
        assert!(ledger.read(&RecordId::generate()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn duplicate_register_is_rejected() {
        let (_dir, ledger) = temp_ledger();
        let id = RecordId::generate();
        ledger.register(&id, &digest(0x01)).await.unwrap();

        let err = ledger.register(&id, &digest(0x02)).await.unwrap_err();
        assert!(matches!(err, LedgerError::DuplicateRecord(dup) if dup == id));
    }

    // -----------------------------------------------------------------------
    // Durability across reopen
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn entries_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledger.seg");
        let id = RecordId::generate();
        let tx = {
            let ledger = FileLedger::open(&path).unwrap();
            ledger.register(&id, &digest(0x07)).await.unwrap()
        };

        let reopened = FileLedger::open(&path).unwrap();
        assert_eq!(reopened.len(), 1);
        let entry = reopened.read(&id).await.unwrap().unwrap();
        assert_eq!(entry.digest, digest(0x07));

        // Appends after reopen continue the same chain.
        let id2 = RecordId::generate();
        let tx2 = reopened.register(&id2, &digest(0x08)).await.unwrap();
        assert_ne!(tx, tx2);
        assert_eq!(reopened.validate().unwrap(), 2);
    }

    #[tokio::test]
    async fn duplicate_rejection_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledger.seg");
        let id = RecordId::generate();
        {
            let ledger = FileLedger::open(&path).unwrap();
            ledger.register(&id, &digest(0x01)).await.unwrap();
        }

        let reopened = FileLedger::open(&path).unwrap();
        assert!(matches!(
            reopened.register(&id, &digest(0x02)).await.unwrap_err(),
            LedgerError::DuplicateRecord(_)
        ));
    }

    #[tokio::test]
    async fn confirmed_entry_survives_reopen_after_torn_frame() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledger.seg");
        let ledger = FileLedger::open(&path).unwrap();
        let id1 = RecordId::generate();
        ledger.register(&id1, &digest(0x01)).await.unwrap();

        // Strand a torn frame at the tail of the live segment, as an append
        // interrupted mid-write would: a header claiming more payload than
        // follows.
        {
            let mut file = OpenOptions::new().append(true).open(&path).unwrap();
            file.write_all(&100u32.to_le_bytes()).unwrap();
            file.write_all(&0xdead_beefu32.to_le_bytes()).unwrap();
            file.write_all(&[0xaa; 20]).unwrap();
        }

        // The next append must not land after the garbage: once confirmed,
        // the entry has to be readable across every future reopen.
        let id2 = RecordId::generate();
        ledger.register(&id2, &digest(0x02)).await.unwrap();
        drop(ledger);

        let reopened = FileLedger::open(&path).unwrap();
        assert_eq!(reopened.len(), 2);
        assert_eq!(
            reopened.read(&id2).await.unwrap().unwrap().digest,
            digest(0x02)
        );
        assert_eq!(reopened.validate().unwrap(), 2);
    }

    // -----------------------------------------------------------------------
    // Chain validation
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn validate_clean_chain() {
        let (_dir, ledger) = temp_ledger();
        for i in 0..5u8 {
            ledger
                .register(&RecordId::generate(), &digest(i))
                .await
                .unwrap();
        }
        assert_eq!(ledger.validate().unwrap(), 5);
    }

    #[tokio::test]
    async fn validate_detects_edited_segment() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledger.seg");
        {
            let ledger = FileLedger::open(&path).unwrap();
            ledger
                .register(&RecordId::generate(), &digest(0x01))
                .await
                .unwrap();
            ledger
                .register(&RecordId::generate(), &digest(0x02))
                .await
                .unwrap();
        }

        // Flip a byte inside the first entry's payload. The CRC no longer
        // matches and the entry is not at the tail, so the read fails.
        let mut bytes = std::fs::read(&path).unwrap();
        bytes[HEADER_SIZE + 4] ^= 0xff;
        std::fs::write(&path, bytes).unwrap();

        let ledger = FileLedger::open(&path);
        assert!(matches!(ledger, Err(LedgerError::CorruptEntry { .. })));
    }

    #[tokio::test]
    async fn torn_tail_entry_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledger.seg");
        let id = RecordId::generate();
        {
            let ledger = FileLedger::open(&path).unwrap();
            ledger.register(&id, &digest(0x01)).await.unwrap();
            ledger
                .register(&RecordId::generate(), &digest(0x02))
                .await
                .unwrap();
        }

        // Chop the last entry mid-payload, as a crash during append would.
        let bytes = std::fs::read(&path).unwrap();
        std::fs::write(&path, &bytes[..bytes.len() - 10]).unwrap();

        let ledger = FileLedger::open(&path).unwrap();
        assert_eq!(ledger.len(), 1);
        assert!(ledger.read(&id).await.unwrap().is_some());

        // Open cut the torn bytes, so appends continue on a clean tail and
        // survive another reopen.
        let id2 = RecordId::generate();
        ledger.register(&id2, &digest(0x03)).await.unwrap();
        drop(ledger);

        let reopened = FileLedger::open(&path).unwrap();
        assert_eq!(reopened.len(), 2);
        assert!(reopened.read(&id2).await.unwrap().is_some());
        assert_eq!(reopened.validate().unwrap(), 2);
    }
}
