//! Communication abstraction for the partitioned refinement driver.
//!
//! Wire format conventions: all records crossing rank boundaries are
//! `#[repr(C)]`, bytemuck-`Pod` structs with little-endian integer fields.
//! Receivers size their buffers from a preceding count exchange, so no
//! message is ever truncated.
//!
//! Three backends: [`NoComm`] for single-process runs, [`RayonComm`] for
//! thread-backed multi-part runs and tests, and `MpiComm` (feature
//! `mpi-support`) for real distributed execution.

use bytemuck::Zeroable;
use once_cell::sync::Lazy;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Condvar, Mutex};

/// Anything that can be waited on.
pub trait Wait {
    /// Wait for completion and return the received data (if any).
    fn wait(self) -> Option<Vec<u8>>;
}

/// Minimal non-blocking communication interface.
pub trait Communicator: Send + Sync {
    type SendHandle: Wait;
    type RecvHandle: Wait;

    fn isend(&self, peer: usize, tag: u16, buf: &[u8]) -> Self::SendHandle;
    fn irecv(&self, peer: usize, tag: u16, len: usize) -> Self::RecvHandle;

    /// Rank of this process (0..size-1).
    fn rank(&self) -> usize;
    /// Total number of ranks.
    fn size(&self) -> usize;

    /// Synchronization barrier (default: no-op for single-process comms).
    fn barrier(&self) {}
}

/// Tag newtype for safer tag arithmetic.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct CommTag(u16);

impl CommTag {
    #[inline]
    pub const fn new(tag: u16) -> Self {
        Self(tag)
    }

    #[inline]
    pub const fn as_u16(self) -> u16 {
        self.0
    }

    #[inline]
    pub const fn offset(self, dx: u16) -> Self {
        Self(self.0.wrapping_add(dx))
    }
}

/// Tags for the four-collective reconciliation sequence.
#[derive(Copy, Clone, Debug)]
pub struct ReconcileCommTags {
    /// Count gather.
    pub counts: CommTag,
    /// Record gather.
    pub records: CommTag,
    /// Deduplicated size broadcast.
    pub size: CommTag,
    /// Deduplicated record broadcast.
    pub data: CommTag,
}

impl ReconcileCommTags {
    #[inline]
    pub const fn from_base(base: CommTag) -> Self {
        Self {
            counts: base,
            records: base.offset(1),
            size: base.offset(2),
            data: base.offset(3),
        }
    }
}

/// Compile-time no-op comm for pure serial runs.
#[derive(Clone, Debug, Default)]
pub struct NoComm;

impl Wait for () {
    fn wait(self) -> Option<Vec<u8>> {
        None
    }
}

impl Communicator for NoComm {
    type SendHandle = ();
    type RecvHandle = ();

    fn isend(&self, _peer: usize, _tag: u16, _buf: &[u8]) {}

    fn irecv(&self, _peer: usize, _tag: u16, _len: usize) {}

    fn rank(&self) -> usize {
        0
    }

    fn size(&self) -> usize {
        1
    }
}

// --- RayonComm: intra-process / multi-thread ---

type Key = (usize, usize, u16); // (src, dst, tag)

#[derive(Default)]
struct Slot {
    q: VecDeque<Vec<u8>>,
}

struct Mailbox {
    map: Mutex<HashMap<Key, Arc<(Mutex<Slot>, Condvar)>>>,
}

static MAILBOX: Lazy<Mailbox> = Lazy::new(|| Mailbox {
    map: Mutex::new(HashMap::new()),
});

fn mailbox_entry(key: Key) -> Arc<(Mutex<Slot>, Condvar)> {
    let mut guard = MAILBOX.map.lock().expect("MAILBOX poisoned");
    guard
        .entry(key)
        .or_insert_with(|| Arc::new((Mutex::new(Slot::default()), Condvar::new())))
        .clone()
}

pub struct LocalSendHandle;

impl Wait for LocalSendHandle {
    fn wait(self) -> Option<Vec<u8>> {
        None
    }
}

pub struct LocalRecvHandle {
    cell: Arc<(Mutex<Slot>, Condvar)>,
    want_len: usize,
}

impl Wait for LocalRecvHandle {
    fn wait(self) -> Option<Vec<u8>> {
        let (lock, cv) = &*self.cell;
        let mut slot = lock.lock().expect("Slot poisoned");
        while slot.q.is_empty() {
            slot = cv.wait(slot).expect("Condvar poisoned");
        }
        let mut msg = slot.q.pop_front().expect("q non-empty");
        msg.truncate(self.want_len.min(msg.len()));
        Some(msg)
    }
}

/// Thread-backed communicator: ranks are threads of one process sharing a
/// global mailbox. Messages between a (src, dst, tag) triple are FIFO.
#[derive(Clone, Debug)]
pub struct RayonComm {
    rank: usize,
    size: usize,
}

impl RayonComm {
    pub fn new(rank: usize, size: usize) -> Self {
        Self { rank, size }
    }
}

impl Communicator for RayonComm {
    type SendHandle = LocalSendHandle;
    type RecvHandle = LocalRecvHandle;

    fn isend(&self, peer: usize, tag: u16, buf: &[u8]) -> Self::SendHandle {
        let entry = mailbox_entry((self.rank, peer, tag));
        let (lock, cv) = &*entry;
        {
            let mut slot = lock.lock().expect("Slot poisoned");
            slot.q.push_back(buf.to_vec());
        }
        cv.notify_all();
        LocalSendHandle
    }

    fn irecv(&self, peer: usize, tag: u16, len: usize) -> Self::RecvHandle {
        LocalRecvHandle {
            cell: mailbox_entry((peer, self.rank, tag)),
            want_len: len,
        }
    }

    fn rank(&self) -> usize {
        self.rank
    }

    fn size(&self) -> usize {
        self.size
    }
}

// --- MPI backend ---
#[cfg(feature = "mpi-support")]
mod mpi_backend {
    use super::*;
    use mpi::collective::CommunicatorCollectives;
    use mpi::environment::Universe;
    use mpi::point_to_point::{Destination, Source};
    use mpi::topology::{Communicator as _, SimpleCommunicator};

    pub struct MpiComm {
        _universe: Universe,
        pub world: SimpleCommunicator,
        rank: usize,
        size: usize,
    }

    unsafe impl Send for MpiComm {}
    unsafe impl Sync for MpiComm {}

    impl Default for MpiComm {
        fn default() -> Self {
            let uni = mpi::initialize().expect("MPI init failed");
            let world = uni.world();
            let rank = world.rank() as usize;
            let size = world.size() as usize;
            Self {
                _universe: uni,
                world,
                rank,
                size,
            }
        }
    }

    pub struct MpiSendHandle;

    impl Wait for MpiSendHandle {
        fn wait(self) -> Option<Vec<u8>> {
            None
        }
    }

    pub struct MpiRecvHandle {
        peer: usize,
        tag: u16,
        len: usize,
        world: SimpleCommunicator,
    }

    impl Wait for MpiRecvHandle {
        fn wait(self) -> Option<Vec<u8>> {
            let mut buf = vec![0u8; self.len];
            self.world
                .process_at_rank(self.peer as i32)
                .receive_into_with_tag(&mut buf[..], self.tag as i32);
            Some(buf)
        }
    }

    impl Communicator for MpiComm {
        type SendHandle = MpiSendHandle;
        type RecvHandle = MpiRecvHandle;

        fn isend(&self, peer: usize, tag: u16, buf: &[u8]) -> Self::SendHandle {
            self.world
                .process_at_rank(peer as i32)
                .send_with_tag(buf, tag as i32);
            MpiSendHandle
        }

        fn irecv(&self, peer: usize, tag: u16, len: usize) -> Self::RecvHandle {
            MpiRecvHandle {
                peer,
                tag,
                len,
                world: self.world.duplicate(),
            }
        }

        fn rank(&self) -> usize {
            self.rank
        }

        fn size(&self) -> usize {
            self.size
        }

        fn barrier(&self) {
            self.world.barrier();
        }
    }
}

#[cfg(feature = "mpi-support")]
pub use mpi_backend::MpiComm;

// --- Collectives over the point-to-point interface ---

/// Gather each rank's `count` at `root`. Returns `Some(counts)` in rank
/// order at the root, `None` elsewhere.
pub fn gather_counts<C: Communicator>(comm: &C, root: usize, count: u64, tag: CommTag) -> Option<Vec<u64>> {
    if comm.rank() == root {
        let mut counts = vec![0u64; comm.size()];
        counts[root] = count;
        for peer in 0..comm.size() {
            if peer != root {
                let bytes = comm
                    .irecv(peer, tag.as_u16(), 8)
                    .wait()
                    .expect("count gather recv failed");
                counts[peer] = u64::from_le_bytes(bytes.try_into().expect("bad count length"));
            }
        }
        Some(counts)
    } else {
        let _ = comm.isend(root, tag.as_u16(), &count.to_le_bytes()).wait();
        None
    }
}

/// Gather variable-length record slices at `root`, concatenated in rank
/// order. `counts` must be the result of [`gather_counts`] at the root.
pub fn gather_records<C: Communicator, T: bytemuck::Pod>(
    comm: &C,
    root: usize,
    records: &[T],
    counts: Option<&[u64]>,
    tag: CommTag,
) -> Option<Vec<T>> {
    if comm.rank() == root {
        let counts = counts.expect("root must pass gathered counts");
        let total: u64 = counts.iter().sum();
        let mut buffer: Vec<T> = Vec::with_capacity(total as usize);
        for (peer, &n) in counts.iter().enumerate() {
            if peer == root {
                buffer.extend_from_slice(records);
            } else if n > 0 {
                let bytes = comm
                    .irecv(peer, tag.as_u16(), n as usize * std::mem::size_of::<T>())
                    .wait()
                    .expect("record gather recv failed");
                // Copy through a typed buffer; the raw byte vector has no
                // alignment guarantee for T.
                let mut chunk = vec![T::zeroed(); n as usize];
                bytemuck::cast_slice_mut(&mut chunk).copy_from_slice(&bytes);
                buffer.extend_from_slice(&chunk);
            }
        }
        Some(buffer)
    } else {
        if !records.is_empty() {
            let _ = comm
                .isend(root, tag.as_u16(), bytemuck::cast_slice(records))
                .wait();
        }
        None
    }
}

/// Broadcast a record vector from `root` to every rank (size first, then
/// payload).
pub fn broadcast_records<C: Communicator, T: bytemuck::Pod>(
    comm: &C,
    root: usize,
    records: Option<Vec<T>>,
    tags: (CommTag, CommTag),
) -> Vec<T> {
    if comm.rank() == root {
        let records = records.expect("root must pass the records to broadcast");
        let count = records.len() as u64;
        for peer in 0..comm.size() {
            if peer != root {
                let _ = comm.isend(peer, tags.0.as_u16(), &count.to_le_bytes()).wait();
                if count > 0 {
                    let _ = comm
                        .isend(peer, tags.1.as_u16(), bytemuck::cast_slice(&records))
                        .wait();
                }
            }
        }
        records
    } else {
        let bytes = comm
            .irecv(root, tags.0.as_u16(), 8)
            .wait()
            .expect("broadcast size recv failed");
        let count = u64::from_le_bytes(bytes.try_into().expect("bad size length")) as usize;
        if count == 0 {
            return Vec::new();
        }
        let bytes = comm
            .irecv(root, tags.1.as_u16(), count * std::mem::size_of::<T>())
            .wait()
            .expect("broadcast data recv failed");
        let mut out = vec![T::zeroed(); count];
        bytemuck::cast_slice_mut(&mut out).copy_from_slice(&bytes);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_comm_is_rank_zero_of_one() {
        let comm = NoComm;
        assert_eq!(comm.rank(), 0);
        assert_eq!(comm.size(), 1);
        let counts = gather_counts(&comm, 0, 5, CommTag::new(900)).unwrap();
        assert_eq!(counts, vec![5]);
        let gathered = gather_records(&comm, 0, &[1u32, 2, 3], Some(&counts), CommTag::new(901));
        assert_eq!(gathered.unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn rayon_comm_collectives_round_trip() {
        let size = 3;
        let results: Vec<Vec<u32>> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..size)
                .map(|rank| {
                    scope.spawn(move || {
                        let comm = RayonComm::new(rank, size);
                        let mine = vec![rank as u32; rank + 1];
                        let tags = ReconcileCommTags::from_base(CommTag::new(700));
                        let counts = gather_counts(&comm, 0, mine.len() as u64, tags.counts);
                        let gathered = gather_records(
                            &comm,
                            0,
                            &mine,
                            counts.as_deref(),
                            tags.records,
                        );
                        broadcast_records(&comm, 0, gathered, (tags.size, tags.data))
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });
        let expected = vec![0u32, 1, 1, 2, 2, 2];
        for got in results {
            assert_eq!(got, expected);
        }
    }
}
