//! Channel type definitions for rate fallback advisories

use tokio::sync::mpsc;

use super::types::RateWarning;

/// Default channel buffer size
pub const DEFAULT_CHANNEL_SIZE: usize = 64;

/// Create a new warning channel with the default buffer size
pub fn create_warning_channel() -> (mpsc::Sender<RateWarning>, mpsc::Receiver<RateWarning>) {
    mpsc::channel(DEFAULT_CHANNEL_SIZE)
}

/// Create a new warning channel with a custom buffer size
pub fn create_warning_channel_with_size(
    size: usize,
) -> (mpsc::Sender<RateWarning>, mpsc::Receiver<RateWarning>) {
    mpsc::channel(size)
}

/// Drain every warning currently buffered without waiting for more
pub fn drain_warnings(receiver: &mut mpsc::Receiver<RateWarning>) -> Vec<RateWarning> {
    let mut warnings = Vec::new();
    while let Ok(warning) = receiver.try_recv() {
        warnings.push(warning);
    }
    warnings
}
