use std::sync::atomic::{AtomicU64, Ordering};

/// Per-surface configuration.
#[derive(Debug, Clone)]
pub struct SurfaceInit {
    /// Whether the page is composited with alpha. Reported to the host so it
    /// can enable blending when drawing the texture.
    pub transparent: bool,

    /// Namespace of the host texture identifier.
    pub namespace: String,

    /// GPU debug label prefix.
    pub label: String,
}

impl Default for SurfaceInit {
    fn default() -> Self {
        Self {
            transparent: false,
            namespace: "webtex".to_owned(),
            label: "webtex browser texture".to_owned(),
        }
    }
}

static NEXT_SURFACE: AtomicU64 = AtomicU64::new(1);

impl SurfaceInit {
    /// A fresh, process-unique host identifier: `<namespace>:browser_<n>`.
    pub(crate) fn next_identifier(&self) -> String {
        let n = NEXT_SURFACE.fetch_add(1, Ordering::Relaxed);
        format!("{}:browser_{n}", self.namespace)
    }
}
