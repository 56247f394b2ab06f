use std::fmt;

use rustix::process::{ sched_getaffinity, sched_setaffinity, CpuSet, Pid };

use crate::{ error::{ Error, Result }, CoreId };

/// The thread an affinity request is addressed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Thread {
    /// The thread issuing the request.
    #[default]
    Current,
    /// Any thread of any process, by kernel thread id.
    Tid(Pid),
}

impl Thread {
    /// Kernel thread id of the calling thread, usable from other threads.
    pub fn current_tid() -> Self {
        Thread::Tid(rustix::thread::gettid())
    }

    fn pid(self) -> Option<Pid> {
        match self {
            Thread::Current => None,
            Thread::Tid(pid) => Some(pid),
        }
    }
}

/// Set of cores a thread may be scheduled on.
#[derive(Clone, Copy)]
pub struct AffinityMask {
    set: CpuSet,
}

impl AffinityMask {
    pub fn empty() -> Self {
        Self { set: CpuSet::new() }
    }

    pub fn single(core: CoreId) -> Result<Self> {
        let mut mask = Self::empty();
        mask.insert(core)?;
        Ok(mask)
    }

    /// Adds `core`; `CpuSet` itself panics on indices past `CpuSet::MAX_CPU`.
    pub fn insert(&mut self, core: CoreId) -> Result<()> {
        if core >= CpuSet::MAX_CPU {
            return Err(Error::CoreOutOfRange { core });
        }
        self.set.set(core);
        Ok(())
    }

    pub fn contains(&self, core: CoreId) -> bool {
        core < CpuSet::MAX_CPU && self.set.is_set(core)
    }

    pub fn cores(&self) -> impl Iterator<Item = CoreId> + '_ {
        (0..CpuSet::MAX_CPU).filter(move |&core| self.set.is_set(core))
    }

    pub fn len(&self) -> usize {
        self.set.count() as usize
    }

    pub fn is_empty(&self) -> bool {
        self.set.count() == 0
    }
}

impl Default for AffinityMask {
    fn default() -> Self {
        Self::empty()
    }
}

impl PartialEq for AffinityMask {
    fn eq(&self, other: &Self) -> bool {
        self.cores().eq(other.cores())
    }
}

impl Eq for AffinityMask {}

impl fmt::Debug for AffinityMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.cores()).finish()
    }
}

pub fn set_thread_affinity(thread: Thread, mask: &AffinityMask) -> Result<()> {
    sched_setaffinity(thread.pid(), &mask.set).map_err(|errno| Error::AffinityRejected {
        source: errno.into(),
    })
}

pub fn thread_affinity(thread: Thread) -> Result<AffinityMask> {
    sched_getaffinity(thread.pid())
        .map(|set| AffinityMask { set })
        .map_err(|errno| Error::AffinityUnavailable {
            source: errno.into(),
        })
}
