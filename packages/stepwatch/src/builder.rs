use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::Error;
use crate::pal::PlatformFacade;
use crate::{ClockSource, Registry};

/// Setting this environment variable to `1` makes [`RegistryBuilder::from_env()`] disable timing.
pub const DISABLED_ENV_VAR: &str = "STEPWATCH_DISABLED";

/// Folder that [`RegistryBuilder::from_env()`] writes step logs to. Empty means no step logs.
pub const OUTPUT_FOLDER_ENV_VAR: &str = "STEPWATCH_OUTPUT_FOLDER";

/// Builder for creating an instance of [`Registry`].
///
/// # Examples
///
/// ```
/// use stepwatch::{ClockSource, Registry};
///
/// // Default registry: enabled, monotonic clock, no step logs.
/// let registry = Registry::builder().build();
///
/// // Measuring processor time instead of wall time.
/// let registry = Registry::builder()
///     .clock_source(ClockSource::ProcessCpu)
///     .build();
/// assert_eq!(registry.clock_source(), ClockSource::ProcessCpu);
///
/// // Instrumentation compiled in but switched off.
/// let registry = Registry::builder().enabled(false).build();
/// assert!(!registry.is_enabled());
/// ```
#[derive(Debug)]
#[must_use]
pub struct RegistryBuilder {
    enabled: bool,
    output_folder: Option<PathBuf>,
    clock_source: ClockSource,
    platform: PlatformFacade,
}

impl RegistryBuilder {
    pub(crate) fn new() -> Self {
        Self {
            enabled: true,
            output_folder: None,
            clock_source: ClockSource::default(),
            platform: PlatformFacade::real(),
        }
    }

    /// Turns measurement on or off. A disabled registry hands out timers that do nothing.
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Sets the folder that each timer writes its step log to.
    ///
    /// The folder is created when the registry is built. An empty path turns step logging off.
    pub fn output_folder(mut self, folder: impl AsRef<Path>) -> Self {
        let folder = folder.as_ref();

        self.output_folder = if folder.as_os_str().is_empty() {
            None
        } else {
            Some(folder.to_path_buf())
        };

        self
    }

    /// Selects the clock that timers sample.
    pub fn clock_source(mut self, clock_source: ClockSource) -> Self {
        self.clock_source = clock_source;
        self
    }

    /// Applies overrides from the process environment.
    ///
    /// * [`DISABLED_ENV_VAR`] set to `1` disables the registry.
    /// * [`OUTPUT_FOLDER_ENV_VAR`] sets the output folder (an empty value turns step logs off).
    ///
    /// Variables that are not set leave the current configuration unchanged.
    pub fn from_env(self) -> Self {
        self.apply_env(|key| std::env::var(key).ok())
    }

    fn apply_env(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if lookup(DISABLED_ENV_VAR).as_deref() == Some("1") {
            self.enabled = false;
        }

        if let Some(folder) = lookup(OUTPUT_FOLDER_ENV_VAR) {
            self = self.output_folder(folder);
        }

        self
    }

    #[cfg(test)]
    pub(crate) fn platform(mut self, platform: PlatformFacade) -> Self {
        self.platform = platform;
        self
    }

    /// Builds the registry with the specified configuration.
    ///
    /// If the output folder cannot be created, a warning is logged and the registry runs
    /// without step logs.
    #[must_use]
    pub fn build(self) -> Registry {
        let output_folder = if self.enabled {
            self.output_folder.and_then(prepare_output_folder)
        } else {
            None
        };

        Registry::from_parts(self.platform, self.clock_source, output_folder, self.enabled)
    }
}

fn prepare_output_folder(folder: PathBuf) -> Option<PathBuf> {
    match fs::create_dir_all(&folder) {
        Ok(()) => {
            debug!(folder = %folder.display(), "timing output folder ready");
            Some(folder)
        }
        Err(source) => {
            let error = Error::CreateOutputFolder {
                path: folder,
                source,
            };

            warn!(%error, "step logs disabled");
            None
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use std::collections::HashMap;
    use std::fs;

    use super::*;

    fn apply(vars: &[(&str, &str)]) -> RegistryBuilder {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();

        RegistryBuilder::new().apply_env(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults() {
        let builder = RegistryBuilder::new();

        assert!(builder.enabled);
        assert!(builder.output_folder.is_none());
        assert_eq!(builder.clock_source, ClockSource::Monotonic);
    }

    #[test]
    fn empty_output_folder_means_none() {
        let builder = RegistryBuilder::new()
            .output_folder("somewhere")
            .output_folder("");

        assert!(builder.output_folder.is_none());
    }

    #[test]
    fn env_disables() {
        assert!(!apply(&[(DISABLED_ENV_VAR, "1")]).enabled);
        assert!(apply(&[(DISABLED_ENV_VAR, "0")]).enabled);
        assert!(apply(&[]).enabled);
    }

    #[test]
    fn env_sets_output_folder() {
        let builder = apply(&[(OUTPUT_FOLDER_ENV_VAR, "timings")]);
        assert_eq!(builder.output_folder, Some(PathBuf::from("timings")));

        let builder = apply(&[(OUTPUT_FOLDER_ENV_VAR, "")]);
        assert!(builder.output_folder.is_none());
    }

    #[test]
    fn build_creates_output_folder() {
        let root = tempfile::tempdir().unwrap();
        let folder = root.path().join("nested").join("timings");

        let registry = Registry::builder().output_folder(&folder).build();

        assert!(folder.is_dir());
        assert_eq!(registry.output_folder(), Some(folder.as_path()));
    }

    #[test]
    fn uncreatable_output_folder_disables_step_logs() {
        let root = tempfile::tempdir().unwrap();
        let blocker = root.path().join("file");
        fs::write(&blocker, b"not a folder").unwrap();

        let registry = Registry::builder()
            .output_folder(blocker.join("timings"))
            .build();

        assert!(registry.is_enabled());
        assert_eq!(registry.output_folder(), None);
    }

    #[test]
    fn disabled_registry_creates_no_folder() {
        let root = tempfile::tempdir().unwrap();
        let folder = root.path().join("timings");

        let registry = Registry::builder()
            .enabled(false)
            .output_folder(&folder)
            .build();

        assert!(!folder.exists());
        assert_eq!(registry.output_folder(), None);
    }
}
