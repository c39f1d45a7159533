//! Shared CLI helpers, grounded on `util.rs`'s `progress_bar`.

use indicatif::{ProgressBar, ProgressStyle};

/// A `--progress` bar for a known-length unit of work (components, chunks).
pub fn progress_bar(len: usize, enabled: bool) -> ProgressBar {
    if !enabled {
        return ProgressBar::hidden();
    }
    let bar = ProgressBar::new(len as u64);
    bar.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:80} {pos:>7}/{len:7}")
            .progress_chars("##-"),
    );
    bar
}
