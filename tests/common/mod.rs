#![allow(dead_code)]

use std::{ fs, path::Path };

use fastpin::{ thread_affinity, CoreId, Thread, Topology };
use tempfile::TempDir;

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// A throwaway cpu topology tree, removed on drop.
pub struct FakeSysfs {
    dir: TempDir,
}

impl FakeSysfs {
    pub fn new() -> Self {
        Self { dir: TempDir::new().unwrap() }
    }

    fn root(&self) -> &Path {
        self.dir.path()
    }

    /// One core per entry, `cpu<i>` reading `freqs[i]`.
    pub fn with_frequencies(freqs: &[u64]) -> Self {
        let sysfs = Self::new();
        for (core, freq) in freqs.iter().enumerate() {
            sysfs.core(core, &format!("{}\n", freq));
        }
        sysfs
    }

    pub fn topology(&self) -> Topology {
        Topology::new(Some(self.root().to_path_buf()))
    }

    pub fn dir(&self, name: &str) -> &Self {
        fs::create_dir_all(self.root().join(name)).unwrap();
        self
    }

    pub fn file(&self, name: &str) -> &Self {
        fs::write(self.root().join(name), "0-3\n").unwrap();
        self
    }

    /// `cpu<core>` with `contents` as its `cpuinfo_max_freq`.
    pub fn core(&self, core: CoreId, contents: &str) -> &Self {
        let cpufreq = self.root().join(format!("cpu{}", core)).join("cpufreq");
        fs::create_dir_all(&cpufreq).unwrap();
        fs::write(cpufreq.join("cpuinfo_max_freq"), contents).unwrap();
        self
    }

    /// `cpu<core>` with no cpufreq node, as for an offline core.
    pub fn bare_core(&self, core: CoreId) -> &Self {
        self.dir(&format!("cpu{}", core))
    }
}

pub fn allowed_cores() -> Vec<CoreId> {
    thread_affinity(Thread::Current).unwrap().cores().collect()
}

/// Topology whose fastest core is `target`, every lower core being slower.
pub fn fastest_at(target: CoreId) -> FakeSysfs {
    let freqs = (0..=target)
        .map(|core| if core == target { 3_000_000 } else { 1_000_000 + core as u64 })
        .collect::<Vec<_>>();
    FakeSysfs::with_frequencies(&freqs)
}
