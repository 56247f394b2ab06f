use std::{ io, path::PathBuf };

use thiserror::Error;

use crate::CoreId;

#[derive(Debug, Error)]
pub enum Error {
    /// The topology root could not be listed.
    #[error("cannot open cpu topology directory {path}: {source}")]
    DirectoryUnavailable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// `cpuinfo_max_freq` is absent, usually an offline core or one without cpufreq.
    #[error("cannot open max frequency of cpu{core} at {path}: {source}")]
    FileUnavailable {
        core: CoreId,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("malformed max frequency for cpu{core}: {line:?}")]
    MalformedReading {
        core: CoreId,
        line: String,
    },

    #[error("cpu{core} does not fit in an affinity mask")]
    CoreOutOfRange {
        core: CoreId,
    },

    #[error("affinity request rejected: {source}")]
    AffinityRejected {
        #[source]
        source: io::Error,
    },

    #[error("cannot query thread affinity: {source}")]
    AffinityUnavailable {
        #[source]
        source: io::Error,
    },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
