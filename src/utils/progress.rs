//! Build progress reporting that becomes no-op when the `progress` feature is disabled

use std::time::Duration;

#[cfg(feature = "progress")]
pub use indicatif::ProgressBar;

#[cfg(not(feature = "progress"))]
pub use self::noop::ProgressBar;

/// Spinner shown while a build phase runs
pub fn spinner(message: &'static str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    style::spinner(&pb);
    pb.set_message(message);
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Byte counter for reading input records
pub fn byte_bar(total: u64) -> ProgressBar {
    let pb = ProgressBar::new(total);
    style::bytes(&pb);
    pb
}

#[cfg(feature = "progress")]
mod style {
    use indicatif::{ProgressBar, ProgressStyle};

    pub fn spinner(pb: &ProgressBar) {
        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg} [{elapsed}]") {
            pb.set_style(style);
        }
    }

    pub fn bytes(pb: &ProgressBar) {
        if let Ok(style) =
            ProgressStyle::default_bar().template("{bar:40.cyan/blue} {bytes}/{total_bytes} {msg}")
        {
            pb.set_style(style.progress_chars("=> "));
        }
    }
}

#[cfg(not(feature = "progress"))]
mod style {
    use super::ProgressBar;

    pub fn spinner(_pb: &ProgressBar) {}
    pub fn bytes(_pb: &ProgressBar) {}
}

#[cfg(not(feature = "progress"))]
mod noop {
    use std::time::Duration;

    /// No-op progress bar when `progress` feature is disabled
    #[derive(Clone)]
    pub struct ProgressBar;

    impl ProgressBar {
        pub fn new(_len: u64) -> Self {
            ProgressBar
        }

        pub fn new_spinner() -> Self {
            ProgressBar
        }

        pub fn set_message(&self, _msg: impl Into<std::borrow::Cow<'static, str>>) {}
        pub fn enable_steady_tick(&self, _interval: Duration) {}
        pub fn inc(&self, _delta: u64) {}
        pub fn finish_and_clear(&self) {}
    }
}
