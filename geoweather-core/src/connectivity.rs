use async_trait::async_trait;
use std::{
    fmt::Debug,
    fs,
    path::{Path, PathBuf},
};

/// Answers whether any network transport is currently active.
#[async_trait]
pub trait ConnectivityChecker: Send + Sync + Debug {
    async fn is_online(&self) -> bool;
}

/// Treats the machine as always online.
#[derive(Debug, Clone, Copy, Default)]
pub struct AssumeOnline;

#[async_trait]
impl ConnectivityChecker for AssumeOnline {
    async fn is_online(&self) -> bool {
        true
    }
}

/// Checks the kernel's view of network interfaces under `/sys/class/net`.
///
/// Online means at least one non-loopback interface reports an operational
/// state of `up`. Without that directory (non-Linux hosts) the check cannot
/// tell and answers online, leaving the HTTP call to surface real failures.
#[derive(Debug, Clone)]
pub struct SystemConnectivity {
    root: PathBuf,
}

impl Default for SystemConnectivity {
    fn default() -> Self {
        Self { root: PathBuf::from("/sys/class/net") }
    }
}

impl SystemConnectivity {
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn interface_states(root: &Path) -> std::io::Result<Vec<(String, String)>> {
        let mut states = Vec::new();
        for entry in fs::read_dir(root)? {
            let entry = entry?;
            let name = entry.file_name().to_string_lossy().into_owned();
            let state = fs::read_to_string(entry.path().join("operstate")).unwrap_or_default();
            states.push((name, state.trim().to_string()));
        }
        Ok(states)
    }
}

/// True if any interface other than loopback is `up`.
pub fn any_transport_up<'a>(interfaces: impl IntoIterator<Item = (&'a str, &'a str)>) -> bool {
    interfaces.into_iter().any(|(name, state)| name != "lo" && state == "up")
}

#[async_trait]
impl ConnectivityChecker for SystemConnectivity {
    async fn is_online(&self) -> bool {
        match Self::interface_states(&self.root) {
            Ok(states) => {
                let online =
                    any_transport_up(states.iter().map(|(n, s)| (n.as_str(), s.as_str())));
                tracing::debug!(interfaces = states.len(), online, "checked network interfaces");
                online
            }
            Err(e) => {
                tracing::debug!(
                    "Cannot read {}: {e}; assuming network is available",
                    self.root.display()
                );
                true
            }
        }
    }
}
