//! Ambient environment context
//!
//! Everything the compiler would otherwise read from the process (user
//! identity, show, environment overrides) is captured here once and passed
//! in explicitly.

/// Environment variable holding the OS tag override
pub const OS_OVERRIDE_VAR: &str = "OL_OS";

/// Environment variable holding the tag override applied to every layer
pub const TAG_OVERRIDE_VAR: &str = "OL_TAG_OVERRIDE";

/// Ambient identity and overrides for a launch
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvContext {
    pub user: String,
    pub uid: u32,
    pub show: Option<String>,
    pub os_override: Option<String>,
    pub tag_override: Option<String>,
}

impl EnvContext {
    pub fn new(user: impl Into<String>, uid: u32) -> Self {
        Self {
            user: user.into(),
            uid,
            ..Default::default()
        }
    }

    pub fn with_show(mut self, show: impl Into<String>) -> Self {
        self.show = Some(show.into());
        self
    }

    /// Captures the context of the current process
    ///
    /// Reads:
    /// - USER (or USERNAME) for the ambient user
    /// - SHOW for the show name
    /// - OL_OS and OL_TAG_OVERRIDE for the overrides
    ///
    /// The uid is the real uid of the process.
    pub fn from_process() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok(), process_uid())
    }

    /// Builds the context from a variable lookup and a uid
    ///
    /// Empty values are treated as unset.
    pub fn from_lookup<F>(lookup: F, uid: u32) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.is_empty());

        Self {
            user: var("USER")
                .or_else(|| var("USERNAME"))
                .unwrap_or_else(|| "unknown".to_string()),
            uid,
            show: var("SHOW"),
            os_override: var(OS_OVERRIDE_VAR),
            tag_override: var(TAG_OVERRIDE_VAR),
        }
    }
}

#[cfg(unix)]
fn process_uid() -> u32 {
    unsafe { libc::getuid() }
}

#[cfg(not(unix))]
fn process_uid() -> u32 {
    0
}
