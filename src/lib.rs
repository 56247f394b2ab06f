//! Pin a thread to the CPU core with the highest maximum clock frequency.
//!
//! Cores are discovered through the Linux sysfs tree (see [`Topology`]) and
//! the pin is a single `sched_setaffinity` call. Binding is a best-effort
//! tuning step: [`bind_calling_thread_to_fastest_core`] never fails, it only
//! logs.

pub mod error;
pub mod sys;
pub mod topology;

pub use error::{ Error, Result };
pub use sys::{ set_thread_affinity, thread_affinity, AffinityMask, Thread };
pub use topology::{ is_core_entry, FastestCore, Topology, SYSFS_CPU_ROOT };

/// Index of a logical core, as numbered by the kernel.
pub type CoreId = usize;

/// Number of cores the system exposes under [`SYSFS_CPU_ROOT`].
pub fn count_cores() -> usize {
    Topology::default().count_cores()
}

/// Core of the system with the highest `cpuinfo_max_freq`, if any could be read.
pub fn max_frequency_core() -> Option<CoreId> {
    Topology::default().max_frequency_core()
}

/// Pin the calling thread to the fastest core of the system.
///
/// Meant to be called once, early, from the main thread. Failures are logged
/// and otherwise ignored; the thread then keeps its current affinity.
pub fn bind_calling_thread_to_fastest_core() {
    bind_to_fastest_core(&Topology::default(), Thread::Current);
}

/// Pin `thread` to the fastest core of `topology`, logging any failure.
pub fn bind_to_fastest_core(topology: &Topology, thread: Thread) {
    match try_bind_to_fastest_core(topology, thread) {
        Ok(core) => log::info!("Bound {:?} to cpu{}", thread, core),
        Err(err) => log::warn!("bind core fail: {}", err),
    }
}

/// Pin `thread` to the fastest core of `topology` and return that core.
///
/// When no frequency could be read the mask handed to the kernel is empty,
/// which it rejects with [`Error::AffinityRejected`].
pub fn try_bind_to_fastest_core(topology: &Topology, thread: Thread) -> Result<CoreId> {
    let fastest = topology.fastest();

    let mut mask = AffinityMask::empty();
    if let Some(fastest) = fastest {
        log::trace!(
            "Fastest core is cpu{} at {} kHz",
            fastest.core,
            fastest.max_freq_khz
        );
        mask.insert(fastest.core)?;
    }

    set_thread_affinity(thread, &mask)?;

    match fastest {
        Some(fastest) => Ok(fastest.core),
        // the kernel accepted an empty mask, which Linux never does
        None => Err(Error::AffinityRejected {
            source: std::io::Error::from(std::io::ErrorKind::InvalidInput),
        }),
    }
}
