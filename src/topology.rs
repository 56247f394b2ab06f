use std::{ fs::{ self, File }, io::{ BufRead, BufReader }, path::{ Path, PathBuf } };

use crate::{ error::{ Error, Result }, CoreId };

/// Where Linux exposes one `cpu<N>` directory per logical core.
pub const SYSFS_CPU_ROOT: &str = "/sys/devices/system/cpu";

/// The winner of a frequency scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FastestCore {
    pub core: CoreId,
    /// Value of `cpuinfo_max_freq`, in kHz.
    pub max_freq_khz: u64,
}

/// Reader over a sysfs cpu topology tree.
///
/// Nothing is cached: every call lists the tree again, since cores can go
/// online or offline between calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Topology {
    root: PathBuf,
}

impl Topology {
    /// Create a reader rooted at `root`.
    ///
    /// If `root` is `None` then [`SYSFS_CPU_ROOT`] is used.
    pub fn new(root: Option<PathBuf>) -> Self {
        Self {
            root: root.unwrap_or_else(|| PathBuf::from(SYSFS_CPU_ROOT)),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Number of `cpu<N>` entries under the root, or 0 if the root can't be listed.
    pub fn count_cores(&self) -> usize {
        self.try_count_cores().unwrap_or_else(|err| {
            log::debug!("{}", err);
            0
        })
    }

    /// Like [`Topology::count_cores`] but reports an unreadable root.
    ///
    /// Entries that fail to read mid-listing are skipped.
    pub fn try_count_cores(&self) -> Result<usize> {
        let entries = fs::read_dir(&self.root).map_err(|source| Error::DirectoryUnavailable {
            path: self.root.clone(),
            source,
        })?;

        let count = entries
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_name().to_str().map_or(false, is_core_entry))
            .count();

        log::trace!("{} cores under {}", count, self.root.display());
        Ok(count)
    }

    pub fn max_freq_path(&self, core: CoreId) -> PathBuf {
        self.root.join(format!("cpu{}", core)).join("cpufreq").join("cpuinfo_max_freq")
    }

    /// Read `cpuinfo_max_freq` of a single core.
    ///
    /// Only the first line is looked at. It is parsed the way C's `stoi`
    /// does: leading whitespace and an optional sign are skipped, and anything
    /// after the leading digits is ignored. Negative values other than `-0`
    /// are malformed.
    pub fn max_frequency(&self, core: CoreId) -> Result<u64> {
        let path = self.max_freq_path(core);
        let file = File::open(&path).map_err(|source| Error::FileUnavailable {
            core,
            path,
            source,
        })?;

        let mut line = String::new();
        match BufReader::new(file).read_line(&mut line) {
            Ok(0) | Err(_) => {
                return Err(Error::MalformedReading { core, line });
            }
            Ok(_) => {}
        }

        parse_khz(&line).ok_or_else(|| Error::MalformedReading {
            core,
            line: line.trim_end().to_owned(),
        })
    }

    /// Per-core readings for indices `0..count_cores()`.
    pub fn readings(&self) -> impl Iterator<Item = (CoreId, Result<u64>)> + '_ {
        (0..self.count_cores()).map(move |core| (core, self.max_frequency(core)))
    }

    /// Core with the highest max frequency, `None` if no reading succeeded.
    ///
    /// Failed readings are dropped and the scan goes on. A core only takes
    /// over when strictly faster, so ties go to the lowest index.
    pub fn fastest(&self) -> Option<FastestCore> {
        let mut best: Option<FastestCore> = None;

        for (core, reading) in self.readings() {
            let max_freq_khz = match reading {
                Ok(khz) => khz,
                Err(err) => {
                    log::debug!("skipping cpu{}: {}", core, err);
                    continue;
                }
            };

            log::trace!("cpu{} max frequency {} kHz", core, max_freq_khz);
            if best.map_or(true, |best| max_freq_khz > best.max_freq_khz) {
                best = Some(FastestCore { core, max_freq_khz });
            }
        }

        best
    }

    pub fn max_frequency_core(&self) -> Option<CoreId> {
        self.fastest().map(|fastest| fastest.core)
    }
}

impl Default for Topology {
    fn default() -> Self {
        Self::new(None)
    }
}

/// Whether a directory entry name describes a core: `cpu` followed by digits only.
///
/// A bare `cpu` passes as well, the digit check being vacuous for an empty
/// suffix. Sysfs has no such entry, so it is left as is.
pub fn is_core_entry(name: &str) -> bool {
    name.strip_prefix("cpu")
        .map_or(false, |suffix| suffix.bytes().all(|b| b.is_ascii_digit()))
}

fn parse_khz(line: &str) -> Option<u64> {
    let line = line.trim_start();
    let (negative, digits) = match line.strip_prefix('-') {
        Some(digits) => (true, digits),
        None => (false, line.strip_prefix('+').unwrap_or(line)),
    };
    let end = digits
        .bytes()
        .position(|b| !b.is_ascii_digit())
        .unwrap_or(digits.len());
    let khz = digits[..end].parse().ok()?;

    // `-0` is still zero; any other negative value is not a frequency
    if negative && khz != 0 {
        return None;
    }
    Some(khz)
}
