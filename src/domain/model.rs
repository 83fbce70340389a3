use std::path::PathBuf;

/// Raw progress event from a transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TransferProgress {
    pub written_bytes: u64,
    pub total_expected_bytes: u64,
}

impl TransferProgress {
    pub fn new(written_bytes: u64, total_expected_bytes: u64) -> Self {
        Self {
            written_bytes,
            total_expected_bytes,
        }
    }

    /// Completed fraction in `[0, 1]`; exactly `0.0` when the total is unknown.
    pub fn fraction(&self) -> f32 {
        if self.total_expected_bytes > 0 {
            (self.written_bytes as f64 / self.total_expected_bytes as f64).clamp(0.0, 1.0) as f32
        } else {
            0.0
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchOutcome {
    pub final_path: PathBuf,
    pub status_code: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DownloadState {
    pub is_active: bool,
    pub fraction_complete: f32,
}

impl DownloadState {
    pub fn start(&mut self) {
        self.is_active = true;
        self.fraction_complete = 0.0;
    }

    pub fn advance(&mut self, progress: TransferProgress) {
        self.fraction_complete = progress.fraction();
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Whole percent shown in the UI.
    pub fn percent(&self) -> u32 {
        (self.fraction_complete * 100.0).round() as u32
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewerTarget {
    pub uri: String,
    pub is_remote_proxy: bool,
}

/// Whether the platform's native surface can render a local PDF in place.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderCapability {
    LocalFile,
    RemoteProxy,
}

impl RenderCapability {
    pub fn detect() -> Self {
        if cfg!(any(target_os = "macos", target_os = "ios")) {
            RenderCapability::LocalFile
        } else {
            RenderCapability::RemoteProxy
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PresenterState {
    #[default]
    Loading,
    Loaded,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fraction_of_known_total() {
        let progress = TransferProgress::new(50, 200);
        assert_eq!(progress.fraction(), 0.25);
    }

    #[test]
    fn test_fraction_without_total_is_zero() {
        let progress = TransferProgress::new(4096, 0);
        assert_eq!(progress.fraction(), 0.0);
        assert!(!progress.fraction().is_nan());
    }

    #[test]
    fn test_fraction_is_clamped() {
        for (written, total) in [(0, 10), (10, 10), (15, 10), (1, 3)] {
            let f = TransferProgress::new(written, total).fraction();
            assert!((0.0..=1.0).contains(&f), "{written}/{total} gave {f}");
        }
    }

    #[test]
    fn test_download_state_percent() {
        let mut state = DownloadState::default();
        state.start();
        state.advance(TransferProgress::new(50, 200));
        assert!(state.is_active);
        assert_eq!(state.percent(), 25);

        state.reset();
        assert!(!state.is_active);
        assert_eq!(state.fraction_complete, 0.0);
    }
}
