//! Durable centroid checkpoints.
//!
//! A checkpoint is a directory of partition files `part-NNNNN`, each written
//! whole by exactly one aggregation task. A partition is a sequence of
//! `(centroid, placeholder)` records in host byte order, the same convention
//! as `.fvecs` files:
//!
//! ```text
//! "RGCK" | version: u32 | count: u32
//! count x ( id: u32 | dim: u32 | dim x f32 | placeholder: u32 )
//! ```

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use bytemuck::{Pod, Zeroable};
use log::{debug, warn};

use crate::error::{Error, Result};
use crate::point::{Centroid, ClusterId, Tolerance};
use crate::vector::Vector;

const MAGIC: [u8; 4] = *b"RGCK";
const VERSION: u32 = 1;
const PLACEHOLDER: u32 = 0;
const PART_PREFIX: &str = "part-";

#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
struct FileHeader {
    magic: [u8; 4],
    version: u32,
    count: u32,
}

#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
struct RecordHeader {
    id: u32,
    dim: u32,
}

/// Partition that owns the centroid `id` when a round runs `partitions` tasks.
pub fn partition_of(id: ClusterId, partitions: usize) -> usize {
    id as usize % partitions
}

/// Path of one partition file inside a checkpoint directory.
pub fn partition_path(dir: &Path, partition: usize) -> PathBuf {
    dir.join(format!("{}{:05}", PART_PREFIX, partition))
}

fn parse_partition(path: &Path) -> Option<usize> {
    path.file_name()?
        .to_str()?
        .strip_prefix(PART_PREFIX)?
        .parse()
        .ok()
}

fn remove_if_exists(path: &Path) -> io::Result<()> {
    match fs::remove_file(path) {
        Err(err) if err.kind() != io::ErrorKind::NotFound => Err(err),
        _ => Ok(()),
    }
}

fn remove_dir_if_exists(path: &Path) -> io::Result<()> {
    match fs::remove_dir_all(path) {
        Err(err) if err.kind() != io::ErrorKind::NotFound => Err(err),
        _ => Ok(()),
    }
}

/// Make renames and deletions inside `dir` durable.
fn sync_dir(dir: &Path) -> io::Result<()> {
    #[cfg(unix)]
    File::open(dir)?.sync_all()?;
    #[cfg(not(unix))]
    let _ = dir;
    Ok(())
}

fn parent_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}

/// `dir` with `suffix` appended to its last component.
fn sibling(dir: &Path, suffix: &str) -> Result<PathBuf> {
    let mut name = dir
        .file_name()
        .ok_or_else(|| {
            Error::InvalidConfig(format!("checkpoint path {} has no name", dir.display()))
        })?
        .to_os_string();
    name.push(suffix);
    Ok(dir.with_file_name(name))
}

/// Directory a round writes its partitions to before they replace `dir`.
pub fn staging_path(dir: &Path) -> Result<PathBuf> {
    sibling(dir, ".next")
}

/// Where the replaced checkpoint sits while a new one is swapped in.
fn retired_path(dir: &Path) -> Result<PathBuf> {
    sibling(dir, ".old")
}

fn encode_len(len: usize, what: &str) -> Result<u32> {
    u32::try_from(len).map_err(|_| Error::InvalidConfig(format!("too many {}: {}", what, len)))
}

/// A new checkpoint being written next to the current one.
///
/// Partitions go to [`Staging::path`]; [`Staging::commit`] swaps the whole
/// directory in place of the checkpoint. Dropping an uncommitted staging
/// directory deletes it, leaving the current checkpoint untouched.
#[derive(Debug)]
pub struct Staging {
    dir: PathBuf,
    path: PathBuf,
    armed: bool,
}

impl Staging {
    /// Directory the partitions of the new checkpoint go to.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Replace the checkpoint with the staged partitions.
    pub fn commit(mut self) -> Result<()> {
        let retired = retired_path(&self.dir)?;
        if self.dir.exists() {
            remove_dir_if_exists(&retired)?;
            fs::rename(&self.dir, &retired)?;
        }
        fs::rename(&self.path, &self.dir)?;
        self.armed = false;
        remove_dir_if_exists(&retired)?;
        sync_dir(parent_dir(&self.dir))?;
        debug!("checkpoint: committed {}", self.dir.display());
        Ok(())
    }
}

impl Drop for Staging {
    fn drop(&mut self) {
        if self.armed {
            if let Err(err) = remove_dir_if_exists(&self.path) {
                warn!("failed to remove {}: {}", self.path.display(), err);
            }
        }
    }
}

/// Removes the file on drop unless disarmed.
struct TempFile {
    path: PathBuf,
    armed: bool,
}

impl TempFile {
    fn new(path: PathBuf) -> Self {
        Self { path, armed: true }
    }

    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for TempFile {
    fn drop(&mut self) {
        if self.armed {
            if let Err(err) = remove_if_exists(&self.path) {
                warn!("failed to remove {}: {}", self.path.display(), err);
            }
        }
    }
}

fn encode<W: Write>(out: &mut W, centroids: &[Centroid]) -> Result<()> {
    let count = encode_len(centroids.len(), "centroids")?;
    let header = FileHeader {
        magic: MAGIC,
        version: VERSION,
        count,
    };
    out.write_all(bytemuck::bytes_of(&header))?;
    for centroid in centroids {
        let record = RecordHeader {
            id: centroid.id(),
            dim: encode_len(centroid.dim(), "dimensions")?,
        };
        out.write_all(bytemuck::bytes_of(&record))?;
        out.write_all(bytemuck::cast_slice(centroid.position().as_slice()))?;
        out.write_all(bytemuck::bytes_of(&PLACEHOLDER))?;
    }
    Ok(())
}

fn take<'a>(bytes: &mut &'a [u8], n: usize) -> Option<&'a [u8]> {
    if bytes.len() < n {
        return None;
    }
    let (head, tail) = bytes.split_at(n);
    *bytes = tail;
    Some(head)
}

fn decode(path: &Path, mut bytes: &[u8]) -> Result<Vec<Centroid>> {
    let corrupt = |message: String| Error::CorruptCheckpoint {
        path: path.to_path_buf(),
        message,
    };

    let header: FileHeader = take(&mut bytes, size_of::<FileHeader>())
        .map(bytemuck::pod_read_unaligned)
        .ok_or_else(|| corrupt("truncated header".to_string()))?;
    if header.magic != MAGIC {
        return Err(corrupt("bad magic".to_string()));
    }
    if header.version != VERSION {
        return Err(corrupt(format!("unsupported version {}", header.version)));
    }

    // the count is untrusted, so never reserve more records than the bytes can hold
    let min_record = size_of::<RecordHeader>() + size_of::<u32>();
    let mut centroids = Vec::with_capacity((header.count as usize).min(bytes.len() / min_record));
    for i in 0..header.count {
        let record: RecordHeader = take(&mut bytes, size_of::<RecordHeader>())
            .map(bytemuck::pod_read_unaligned)
            .ok_or_else(|| corrupt(format!("truncated record {}", i)))?;
        let values = (record.dim as usize)
            .checked_mul(size_of::<f32>())
            .and_then(|len| take(&mut bytes, len))
            .ok_or_else(|| corrupt(format!("truncated vector of centroid {}", record.id)))?;
        let position: Vec<f32> = values
            .chunks_exact(size_of::<f32>())
            .map(bytemuck::pod_read_unaligned)
            .collect();
        let placeholder: u32 = take(&mut bytes, size_of::<u32>())
            .map(bytemuck::pod_read_unaligned)
            .ok_or_else(|| corrupt(format!("truncated value of centroid {}", record.id)))?;
        if placeholder != PLACEHOLDER {
            return Err(corrupt(format!(
                "unexpected value {} for centroid {}",
                placeholder, record.id
            )));
        }
        centroids.push(Centroid::new(record.id, Vector::new(position)));
    }
    if !bytes.is_empty() {
        return Err(corrupt(format!("{} trailing bytes", bytes.len())));
    }
    Ok(centroids)
}

fn check_same_dim(centroids: &[Centroid]) -> Result<()> {
    if let Some(first) = centroids.first() {
        if let Some(other) = centroids.iter().find(|c| c.dim() != first.dim()) {
            return Err(Error::DimensionMismatch {
                expected: first.dim(),
                found: other.dim(),
            });
        }
    }
    Ok(())
}

/// Writes one partition of a checkpoint.
#[derive(Debug, Clone)]
pub struct CheckpointWriter {
    dir: PathBuf,
    partition: usize,
}

impl CheckpointWriter {
    /// Writer for partition `partition` of the checkpoint in `dir`.
    pub fn new(dir: impl Into<PathBuf>, partition: usize) -> Self {
        Self {
            dir: dir.into(),
            partition,
        }
    }

    /// Target partition file.
    pub fn path(&self) -> PathBuf {
        partition_path(&self.dir, self.partition)
    }

    /// Replace the partition with `centroids`.
    ///
    /// The old partition is deleted first. The new content goes to a temporary
    /// file that is synced and renamed into place, so readers never see a
    /// half-written partition; the temporary file is removed if anything fails.
    /// Other partitions are left alone.
    pub fn write(&self, centroids: &[Centroid]) -> Result<PathBuf> {
        check_same_dim(centroids)?;
        fs::create_dir_all(&self.dir)?;

        let path = self.path();
        remove_if_exists(&path)?;

        let tmp = self
            .dir
            .join(format!(".{}{:05}.tmp", PART_PREFIX, self.partition));
        let guard = TempFile::new(tmp.clone());
        {
            let mut out = BufWriter::new(File::create(&tmp)?);
            encode(&mut out, centroids)?;
            let file = out.into_inner().map_err(|err| err.into_error())?;
            file.sync_all()?;
        }
        fs::rename(&tmp, &path)?;
        guard.disarm();
        sync_dir(&self.dir)?;

        debug!(
            "checkpoint: wrote {} centroids to {}",
            centroids.len(),
            path.display()
        );
        Ok(path)
    }
}

/// Per-centroid movement between two checkpoints.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Shift {
    /// Cluster identity.
    pub id: ClusterId,
    /// Euclidean distance travelled.
    pub distance: f32,
    /// Whether the move is within the tolerance used for the comparison.
    pub converged: bool,
}

/// Movement of every centroid from one round to the next.
#[derive(Debug, Clone, Default)]
pub struct Movement {
    shifts: Vec<Shift>,
}

impl Movement {
    /// Shifts ordered by cluster identity.
    pub fn shifts(&self) -> &[Shift] {
        &self.shifts
    }

    /// Number of centroids within tolerance.
    pub fn converged_count(&self) -> usize {
        self.shifts.iter().filter(|s| s.converged).count()
    }

    /// True if every centroid is within tolerance.
    pub fn is_converged(&self) -> bool {
        self.shifts.iter().all(|s| s.converged)
    }

    /// Largest distance travelled by any centroid.
    pub fn max_shift(&self) -> f32 {
        self.shifts.iter().map(|s| s.distance).fold(0.0, f32::max)
    }
}

/// The full centroid set of one round, ordered by identity.
#[derive(Debug, Clone, Default)]
pub struct Checkpoint {
    centroids: Vec<Centroid>,
}

impl Checkpoint {
    /// Build a checkpoint from centroids in any order.
    ///
    /// Identities must be unique and all positions must share one dimension.
    pub fn new(mut centroids: Vec<Centroid>) -> Result<Self> {
        centroids.sort_unstable();
        if let Some(pair) = centroids.windows(2).find(|w| w[0].id() == w[1].id()) {
            return Err(Error::DuplicateKey { id: pair[0].id() });
        }
        check_same_dim(&centroids)?;
        Ok(Self { centroids })
    }

    /// Existing partition files of the checkpoint in `dir`, ordered by index.
    pub fn partitions(dir: &Path) -> Result<Vec<(usize, PathBuf)>> {
        let mut parts = Vec::new();
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            if let Some(index) = parse_partition(&path) {
                parts.push((index, path));
            }
        }
        parts.sort_unstable_by_key(|(index, _)| *index);
        Ok(parts)
    }

    /// Read every partition of the checkpoint in `dir`.
    ///
    /// If `dir` is missing but the checkpoint it replaced is still retired
    /// next to it (a commit interrupted between its two renames), that one is
    /// read instead.
    pub fn read(dir: &Path) -> Result<Self> {
        let parts = match Self::partitions(dir) {
            Err(Error::Io(err)) if err.kind() == io::ErrorKind::NotFound => {
                let retired = retired_path(dir)?;
                if !retired.is_dir() {
                    return Err(Error::Io(err));
                }
                warn!(
                    "checkpoint: {} is missing, reading {}",
                    dir.display(),
                    retired.display()
                );
                Self::partitions(&retired)?
            }
            parts => parts?,
        };
        let mut centroids = Vec::new();
        for (_, path) in parts {
            let bytes = fs::read(&path)?;
            centroids.extend(decode(&path, &bytes)?);
        }
        let checkpoint = Self::new(centroids)?;
        debug!(
            "checkpoint: read {} centroids from {}",
            checkpoint.len(),
            dir.display()
        );
        Ok(checkpoint)
    }

    /// Start a new checkpoint that will replace the one in `dir`.
    ///
    /// Leftovers of an earlier uncommitted staging directory are removed.
    pub fn stage(dir: &Path) -> Result<Staging> {
        let path = staging_path(dir)?;
        remove_dir_if_exists(&path)?;
        fs::create_dir_all(&path)?;
        Ok(Staging {
            dir: dir.to_path_buf(),
            path,
            armed: true,
        })
    }

    /// Replace the checkpoint in `dir` with `centroids` split into `partitions`.
    ///
    /// The partitions are staged and swapped in together, so partitions of
    /// the old checkpoint never mix with the new ones.
    pub fn write_all(dir: &Path, centroids: &[Centroid], partitions: usize) -> Result<Self> {
        if partitions == 0 {
            return Err(Error::InvalidConfig(
                "partitions must be greater than 0".to_string(),
            ));
        }
        let checkpoint = Self::new(centroids.to_vec())?;
        let mut shards = vec![Vec::new(); partitions];
        for centroid in checkpoint.centroids.iter() {
            shards[partition_of(centroid.id(), partitions)].push(centroid.clone());
        }
        let staging = Self::stage(dir)?;
        for (partition, shard) in shards.iter().enumerate() {
            CheckpointWriter::new(staging.path(), partition).write(shard)?;
        }
        staging.commit()?;
        Ok(checkpoint)
    }

    /// Centroids ordered by identity.
    pub fn centroids(&self) -> &[Centroid] {
        &self.centroids
    }

    /// Take the centroids out of the checkpoint.
    pub fn into_centroids(self) -> Vec<Centroid> {
        self.centroids
    }

    /// Number of centroids.
    pub fn len(&self) -> usize {
        self.centroids.len()
    }

    /// True if the checkpoint holds no centroid.
    pub fn is_empty(&self) -> bool {
        self.centroids.is_empty()
    }

    /// Dimensionality of the positions, if any centroid exists.
    pub fn dim(&self) -> Option<usize> {
        self.centroids.first().map(Centroid::dim)
    }

    /// Look up a centroid by identity.
    pub fn get(&self, id: ClusterId) -> Option<&Centroid> {
        self.centroids
            .binary_search_by_key(&id, Centroid::id)
            .ok()
            .map(|i| &self.centroids[i])
    }

    /// Compare against the checkpoint of the previous round.
    ///
    /// The convergence tally of a round can over-count when tasks are
    /// retried; this comparison is the authoritative check. Both checkpoints
    /// must hold the same identities.
    pub fn compare(&self, previous: &Checkpoint, tolerance: Tolerance) -> Result<Movement> {
        if let Some(missing) = previous.centroids.iter().find(|c| self.get(c.id()).is_none()) {
            return Err(Error::UnknownCentroid { id: missing.id() });
        }
        let mut shifts = Vec::with_capacity(self.len());
        for current in self.centroids.iter() {
            let before = previous
                .get(current.id())
                .ok_or(Error::UnknownCentroid { id: current.id() })?;
            shifts.push(Shift {
                id: current.id(),
                distance: current.position().distance(before.position())?,
                converged: tolerance.within(current.position(), before.position())?,
            });
        }
        Ok(Movement { shifts })
    }
}

#[cfg(test)]
mod test {
    use std::fs;

    use tempfile::tempdir;

    use super::{
        Checkpoint, CheckpointWriter, encode_len, partition_path, retired_path, staging_path,
    };
    use crate::error::Error;
    use crate::point::{Centroid, Tolerance};
    use crate::vector::Vector;

    fn centroids(n: u32, dim: usize, offset: f32) -> Vec<Centroid> {
        (0..n)
            .map(|id| Centroid::new(id, Vector::new(vec![id as f32 + offset; dim])))
            .collect()
    }

    fn assert_same(lhs: &[Centroid], rhs: &[Centroid]) {
        assert_eq!(lhs.len(), rhs.len());
        for (l, r) in lhs.iter().zip(rhs.iter()) {
            assert_eq!(l.id(), r.id());
            assert!(l.position().bit_eq(r.position()));
        }
    }

    #[test]
    fn test_round_trip_replaces_old_content() {
        let dir = tempdir().unwrap();
        let writer = CheckpointWriter::new(dir.path(), 0);

        writer.write(&centroids(5, 3, 0.5)).unwrap();
        let fresh = centroids(3, 3, -1.25);
        let path = writer.write(&fresh).unwrap();
        assert_eq!(path, partition_path(dir.path(), 0));

        let checkpoint = Checkpoint::read(dir.path()).unwrap();
        assert_same(checkpoint.centroids(), &fresh);
        assert_eq!(checkpoint.dim(), Some(3));

        // no temporary file is left behind
        let names: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(names.len(), 1);
    }

    #[test]
    fn test_writer_keeps_other_partitions() {
        let dir = tempdir().unwrap();
        let all = centroids(6, 2, 0.0);
        CheckpointWriter::new(dir.path(), 0)
            .write(&all[..3])
            .unwrap();
        CheckpointWriter::new(dir.path(), 1)
            .write(&all[3..])
            .unwrap();
        // rewriting partition 0 must not touch partition 1
        CheckpointWriter::new(dir.path(), 0)
            .write(&all[..3])
            .unwrap();

        let checkpoint = Checkpoint::read(dir.path()).unwrap();
        assert_same(checkpoint.centroids(), &all);
    }

    #[test]
    fn test_write_all_replaces_partitions() {
        let root = tempdir().unwrap();
        let dir = root.path().join("ckpt");
        let all = centroids(10, 4, 0.0);
        Checkpoint::write_all(&dir, &all, 4).unwrap();
        assert_eq!(Checkpoint::partitions(&dir).unwrap().len(), 4);

        Checkpoint::write_all(&dir, &all, 2).unwrap();
        assert_eq!(Checkpoint::partitions(&dir).unwrap().len(), 2);
        let checkpoint = Checkpoint::read(&dir).unwrap();
        assert_same(checkpoint.centroids(), &all);

        // only the checkpoint itself remains next to it
        let names: Vec<_> = fs::read_dir(root.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(names, vec!["ckpt"]);

        assert!(matches!(
            Checkpoint::write_all(&dir, &all, 0),
            Err(Error::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_uncommitted_staging_is_discarded() {
        let root = tempdir().unwrap();
        let dir = root.path().join("ckpt");
        let all = centroids(4, 2, 0.0);
        Checkpoint::write_all(&dir, &all, 2).unwrap();

        let staging = Checkpoint::stage(&dir).unwrap();
        assert_eq!(staging.path(), staging_path(&dir).unwrap());
        CheckpointWriter::new(staging.path(), 0)
            .write(&centroids(1, 2, 7.0))
            .unwrap();
        drop(staging);

        assert!(!staging_path(&dir).unwrap().exists());
        assert_same(Checkpoint::read(&dir).unwrap().centroids(), &all);
    }

    #[test]
    fn test_read_falls_back_to_retired_checkpoint() {
        let root = tempdir().unwrap();
        let dir = root.path().join("ckpt");
        let all = centroids(3, 2, 0.5);
        Checkpoint::write_all(&dir, &all, 2).unwrap();

        // a commit stopped after retiring the old checkpoint
        fs::rename(&dir, retired_path(&dir).unwrap()).unwrap();
        assert_same(Checkpoint::read(&dir).unwrap().centroids(), &all);

        fs::remove_dir_all(retired_path(&dir).unwrap()).unwrap();
        assert!(matches!(Checkpoint::read(&dir), Err(Error::Io(_))));
    }

    #[test]
    fn test_empty_partition() {
        let dir = tempdir().unwrap();
        CheckpointWriter::new(dir.path(), 0).write(&[]).unwrap();
        assert!(Checkpoint::read(dir.path()).unwrap().is_empty());
    }

    #[test]
    fn test_corrupt_partition() {
        let dir = tempdir().unwrap();
        let path = CheckpointWriter::new(dir.path(), 0)
            .write(&centroids(2, 3, 0.0))
            .unwrap();
        let bytes = fs::read(&path).unwrap();

        fs::write(&path, &bytes[..bytes.len() - 1]).unwrap();
        assert!(matches!(
            Checkpoint::read(dir.path()),
            Err(Error::CorruptCheckpoint { .. })
        ));

        let mut bad_magic = bytes.clone();
        bad_magic[0] = b'X';
        fs::write(&path, &bad_magic).unwrap();
        assert!(matches!(
            Checkpoint::read(dir.path()),
            Err(Error::CorruptCheckpoint { .. })
        ));

        let mut trailing = bytes.clone();
        trailing.push(0);
        fs::write(&path, &trailing).unwrap();
        assert!(matches!(
            Checkpoint::read(dir.path()),
            Err(Error::CorruptCheckpoint { .. })
        ));

        // a huge record count on an empty partition must fail, not allocate
        let empty = CheckpointWriter::new(dir.path(), 0).write(&[]).unwrap();
        let mut huge_count = fs::read(&empty).unwrap();
        assert_eq!(huge_count.len(), 12);
        huge_count[8..12].copy_from_slice(&u32::MAX.to_ne_bytes());
        fs::write(&empty, &huge_count).unwrap();
        assert!(matches!(
            Checkpoint::read(dir.path()),
            Err(Error::CorruptCheckpoint { .. })
        ));

        // same for a huge dimension
        let mut huge_dim = bytes.clone();
        huge_dim[16..20].copy_from_slice(&u32::MAX.to_ne_bytes());
        fs::write(&path, &huge_dim).unwrap();
        assert!(matches!(
            Checkpoint::read(dir.path()),
            Err(Error::CorruptCheckpoint { .. })
        ));
    }

    #[test]
    fn test_encode_len_bounds() {
        assert_eq!(encode_len(3, "dimensions").unwrap(), 3);
        assert_eq!(encode_len(u32::MAX as usize, "centroids").unwrap(), u32::MAX);
        #[cfg(target_pointer_width = "64")]
        assert!(matches!(
            encode_len(u32::MAX as usize + 1, "dimensions"),
            Err(Error::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_duplicate_ids_across_partitions() {
        let dir = tempdir().unwrap();
        let all = centroids(2, 2, 0.0);
        CheckpointWriter::new(dir.path(), 0).write(&all).unwrap();
        CheckpointWriter::new(dir.path(), 1).write(&all[1..]).unwrap();
        assert!(matches!(
            Checkpoint::read(dir.path()),
            Err(Error::DuplicateKey { id: 1 })
        ));
    }

    #[test]
    fn test_mixed_dimensions() {
        let dir = tempdir().unwrap();
        let mixed = vec![
            Centroid::new(0, Vector::from([0.0, 0.0])),
            Centroid::new(1, Vector::from([0.0])),
        ];
        assert!(matches!(
            CheckpointWriter::new(dir.path(), 0).write(&mixed),
            Err(Error::DimensionMismatch { .. })
        ));
        assert!(Checkpoint::partitions(dir.path()).unwrap().is_empty());
    }

    #[test]
    fn test_compare() {
        let previous = Checkpoint::new(centroids(3, 2, 0.0)).unwrap();
        let mut moved = centroids(3, 2, 0.0);
        moved[1] = Centroid::new(1, Vector::from([4.0, 5.0]));
        let current = Checkpoint::new(moved).unwrap();

        let movement = current.compare(&previous, Tolerance::Exact).unwrap();
        assert_eq!(movement.converged_count(), 2);
        assert!(!movement.is_converged());
        assert_eq!(movement.max_shift(), 5.0);

        let movement = current
            .compare(&previous, Tolerance::new(5.0).unwrap())
            .unwrap();
        assert!(movement.is_converged());

        let fewer = Checkpoint::new(centroids(2, 2, 0.0)).unwrap();
        assert!(matches!(
            fewer.compare(&previous, Tolerance::Exact),
            Err(Error::UnknownCentroid { id: 2 })
        ));
    }
}
