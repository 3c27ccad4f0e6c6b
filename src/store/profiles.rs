use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub(crate) enum ProfileError {
    #[error("could not determine home directory")]
    NoHome,
    #[error("failed to read {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("no profile listed in {} has a calendar cache", path.display())]
    NoCache { path: PathBuf },
}

/// Finds the calendar cache of the first Thunderbird profile that has one
pub(crate) fn locate_cache() -> Result<PathBuf, ProfileError> {
    let home = dirs::home_dir().ok_or(ProfileError::NoHome)?;
    find_cache(&home.join(".thunderbird"))
}

fn find_cache(base: &Path) -> Result<PathBuf, ProfileError> {
    let ini = base.join("profiles.ini");
    let content = fs::read_to_string(&ini).map_err(|source| ProfileError::Read {
        path: ini.clone(),
        source,
    })?;
    profile_paths(&content)
        .into_iter()
        // Joining an absolute profile path replaces `base` entirely
        .map(|p| base.join(p).join("calendar-data").join("cache.sqlite"))
        .find(|p| p.exists())
        .ok_or(ProfileError::NoCache { path: ini })
}

/// Returns the `Path` value of each section of `profiles.ini`, in file order
fn profile_paths(ini: &str) -> Vec<&str> {
    let mut paths = Vec::new();
    // Keys before the first section header don't belong to a profile
    let mut want_path = false;
    for line in ini.lines().map(str::trim) {
        if line.is_empty() || line.starts_with([';', '#']) {
            continue;
        }
        if line.starts_with('[') {
            want_path = true;
        } else if want_path {
            if let Some((key, value)) = line.split_once(['=', ':']) {
                if key.trim().eq_ignore_ascii_case("path") {
                    paths.push(value.trim());
                    want_path = false;
                }
            }
        }
    }
    paths
}
