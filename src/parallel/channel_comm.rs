// In-process communication: one thread per worker, bounded channels between neighbors

use std::sync::mpsc::{self, Receiver, RecvTimeoutError, SyncSender};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread;
use std::time::Duration;

use crate::domain::Side;
use crate::error::OdeError;

/// Both directions of the chain edge shared with one neighbor.
struct Link {
    peer: usize,
    tx: SyncSender<f64>,
    rx: Receiver<f64>,
}

/// Rendezvous state for collectives. A collective completes when all
/// `size` workers have arrived; it fails once any worker has left.
struct Collective {
    generation: u64,
    arrived: usize,
    slots: Vec<f64>,
    result: f64,
    /// First rank whose handle was dropped.
    departed: Option<usize>,
}

struct Shared {
    size: usize,
    state: Mutex<Collective>,
    cond: Condvar,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, Collective> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Worker handle for a group of threads arranged in a chain.
///
/// Every directed neighbor edge is a `sync_channel` of capacity 1, so a
/// sender can run at most one message ahead of its receiver. Dropping a
/// handle (normal exit, error return or panic) closes its channels and
/// makes every pending and later collective of the group fail, so no
/// worker is left waiting on one that is gone.
pub struct ChannelComm {
    rank: usize,
    size: usize,
    left: Option<Link>,
    right: Option<Link>,
    shared: Arc<Shared>,
    timeout: Option<Duration>,
}

impl ChannelComm {
    /// Handles for a chain of `size` workers, in rank order.
    pub fn group(size: usize) -> Vec<ChannelComm> {
        let shared = Arc::new(Shared {
            size,
            state: Mutex::new(Collective {
                generation: 0,
                arrived: 0,
                slots: vec![0.0; size],
                result: 0.0,
                departed: None,
            }),
            cond: Condvar::new(),
        });
        let mut lefts: Vec<Option<Link>> = (0..size).map(|_| None).collect();
        let mut rights: Vec<Option<Link>> = (0..size).map(|_| None).collect();
        for k in 1..size {
            let (to_right, from_left) = mpsc::sync_channel(1);
            let (to_left, from_right) = mpsc::sync_channel(1);
            rights[k - 1] = Some(Link { peer: k, tx: to_right, rx: from_right });
            lefts[k] = Some(Link { peer: k - 1, tx: to_left, rx: from_left });
        }
        lefts
            .into_iter()
            .zip(rights)
            .enumerate()
            .map(|(rank, (left, right))| ChannelComm {
                rank,
                size,
                left,
                right,
                shared: Arc::clone(&shared),
                timeout: None,
            })
            .collect()
    }

    /// Give up on a receive or a collective after `timeout` instead of
    /// blocking forever.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    fn link(&self, peer: usize) -> Result<(Side, &Link), OdeError> {
        let found = [(Side::Left, &self.left), (Side::Right, &self.right)]
            .into_iter()
            .find_map(|(side, link)| link.as_ref().filter(|l| l.peer == peer).map(|l| (side, l)));
        found.ok_or_else(|| OdeError::Runtime(format!(
            "rank {} has no channel to rank {peer}",
            self.rank
        )))
    }

    fn left_group(&self, departed: usize) -> OdeError {
        OdeError::Runtime(format!(
            "rank {}: collective abandoned, rank {departed} left the group",
            self.rank
        ))
    }

    /// Contribute `x` and wait for the sum over the group.
    fn collective(&self, x: f64) -> Result<f64, OdeError> {
        let mut st = self.shared.lock();
        if let Some(departed) = st.departed {
            return Err(self.left_group(departed));
        }
        st.slots[self.rank] = x;
        st.arrived += 1;
        let generation = st.generation;
        if st.arrived == self.shared.size {
            // summed in rank order so every worker gets the same bits
            st.result = st.slots.iter().sum();
            st.arrived = 0;
            st.generation += 1;
            self.shared.cond.notify_all();
            return Ok(st.result);
        }

        let pending = |s: &mut Collective| s.generation == generation && s.departed.is_none();
        let st = match self.timeout {
            None => self
                .shared
                .cond
                .wait_while(st, pending)
                .unwrap_or_else(PoisonError::into_inner),
            Some(t) => {
                let (st, _) = self
                    .shared
                    .cond
                    .wait_timeout_while(st, t, pending)
                    .unwrap_or_else(PoisonError::into_inner);
                if st.generation == generation && st.departed.is_none() {
                    return Err(OdeError::Runtime(format!(
                        "rank {}: collective incomplete after {t:?}",
                        self.rank
                    )));
                }
                st
            }
        };
        match st.departed {
            _ if st.generation != generation => Ok(st.result),
            Some(departed) => Err(self.left_group(departed)),
            None => Err(OdeError::InvalidState("collective woke without completing")),
        }
    }
}

impl super::Comm for ChannelComm {
    fn rank(&self) -> usize { self.rank }
    fn size(&self) -> usize { self.size }

    fn barrier(&self) -> Result<(), OdeError> {
        self.collective(0.0).map(|_| ())
    }

    fn sendrecv(&self, value: f64, peer: usize) -> Result<f64, OdeError> {
        let (side, link) = self.link(peer)?;
        let fail = |reason: String| OdeError::Exchange { side, rank: self.rank, peer, reason };

        link.tx.send(value).map_err(|_| fail("peer hung up before receiving".into()))?;
        match self.timeout {
            None => link.rx.recv().map_err(|_| fail("peer hung up before sending".into())),
            Some(t) => link.rx.recv_timeout(t).map_err(|e| match e {
                RecvTimeoutError::Timeout => fail(format!("no message after {t:?}")),
                RecvTimeoutError::Disconnected => fail("peer hung up before sending".into()),
            }),
        }
    }

    fn all_reduce(&self, x: f64) -> Result<f64, OdeError> {
        self.collective(x)
    }
}

impl Drop for ChannelComm {
    fn drop(&mut self) {
        let mut st = self.shared.lock();
        st.departed.get_or_insert(self.rank);
        self.shared.cond.notify_all();
    }
}

/// Run `work` on `workers` scoped threads, one `ChannelComm` each, and
/// collect the results in rank order. The first error (by rank) wins.
///
/// A worker that returns an error or panics drops its handle, which
/// unblocks its neighbors and every collective, so the call always
/// returns once the surviving workers notice.
pub fn run_workers<F, R>(workers: usize, timeout: Option<Duration>, work: F) -> Result<Vec<R>, OdeError>
where
    F: Fn(ChannelComm) -> Result<R, OdeError> + Sync,
    R: Send,
{
    if workers == 0 {
        return Err(OdeError::Config("worker count must be at least 1".into()));
    }
    let comms = ChannelComm::group(workers);
    let work = &work;
    thread::scope(|scope| {
        let handles: Vec<_> = comms
            .into_iter()
            .map(|comm| {
                let comm = match timeout {
                    Some(t) => comm.with_timeout(t),
                    None => comm,
                };
                scope.spawn(move || work(comm))
            })
            .collect();
        handles
            .into_iter()
            .enumerate()
            .map(|(rank, h)| {
                h.join()
                    .map_err(|_| OdeError::Runtime(format!("worker {rank} panicked")))?
            })
            .collect()
    })
}
