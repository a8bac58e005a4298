//! Host platform tag.

/// Operating system + architecture pair the embedding runs on.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Platform {
    LinuxAmd64,
    LinuxArm64,
    WindowsAmd64,
    WindowsArm64,
    MacosAmd64,
    MacosArm64,
}

impl Platform {
    /// Platform of the compile target, or `None` for combinations the browser
    /// engine does not ship for.
    pub fn current() -> Option<Self> {
        let arm = cfg!(target_arch = "aarch64");
        let amd64 = cfg!(target_arch = "x86_64");

        let platform = if cfg!(target_os = "linux") {
            pick(amd64, arm, Self::LinuxAmd64, Self::LinuxArm64)
        } else if cfg!(target_os = "windows") {
            pick(amd64, arm, Self::WindowsAmd64, Self::WindowsArm64)
        } else if cfg!(target_os = "macos") {
            pick(amd64, arm, Self::MacosAmd64, Self::MacosArm64)
        } else {
            None
        };

        if let Some(p) = platform {
            log::debug!("platform: {}", p.normalized_name());
        }
        platform
    }

    pub fn normalized_name(self) -> &'static str {
        match self {
            Self::LinuxAmd64 => "linux_amd64",
            Self::LinuxArm64 => "linux_arm64",
            Self::WindowsAmd64 => "windows_amd64",
            Self::WindowsArm64 => "windows_arm64",
            Self::MacosAmd64 => "macos_amd64",
            Self::MacosArm64 => "macos_arm64",
        }
    }

    pub fn is_linux(self) -> bool {
        matches!(self, Self::LinuxAmd64 | Self::LinuxArm64)
    }

    pub fn is_windows(self) -> bool {
        matches!(self, Self::WindowsAmd64 | Self::WindowsArm64)
    }

    pub fn is_macos(self) -> bool {
        matches!(self, Self::MacosAmd64 | Self::MacosArm64)
    }
}

fn pick(amd64: bool, arm: bool, a: Platform, b: Platform) -> Option<Platform> {
    if amd64 {
        Some(a)
    } else if arm {
        Some(b)
    } else {
        None
    }
}
