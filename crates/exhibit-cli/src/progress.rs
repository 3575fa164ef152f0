//! Progress bar for multi-file scans.

use console::Term;
use indicatif::ProgressBar;
use indicatif::ProgressDrawTarget;
use indicatif::ProgressState;
use indicatif::ProgressStyle;
use std::fmt::Write;
use std::path::Path;

const TEMPLATE: &str = "Scanning [{bar:40.cyan/blue}] {pos}/{len} files ({prefix}, {eta}) {msg}";

/// Progress bar over the files of a scan, drawn on stderr.
///
/// Cleared on drop so the report that follows starts on a clean line.
pub struct ScanProgress {
    bar: ProgressBar,
    bytes_read: u64,
}

impl ScanProgress {
    /// Creates a bar for `total` files.
    #[must_use]
    pub fn new(total: usize) -> Self {
        let target = ProgressDrawTarget::stderr();
        let bar = ProgressBar::with_draw_target(Some(total as u64), target);

        // Renders as "Scanning [████░░] 42/100 files (15.2 MB, 12s) invoice.zip"
        bar.set_style(
            ProgressStyle::default_bar()
                .template(TEMPLATE)
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .with_key("eta", |state: &ProgressState, w: &mut dyn Write| {
                    write!(w, "{}", humanize_duration(state.eta())).unwrap_or(());
                })
                .progress_chars("█▓░"),
        );

        bar.set_prefix(humanize_bytes(0));
        Self { bar, bytes_read: 0 }
    }

    /// Checks if we should show progress (TTY detection).
    #[must_use]
    pub fn should_show() -> bool {
        Term::stderr().is_term()
    }

    /// Announces the file about to be read.
    pub fn on_file_start(&self, path: &Path) {
        let name = match path.file_name() {
            Some(name) => name.to_string_lossy().into_owned(),
            None => path.display().to_string(),
        };
        self.bar.set_message(name);
    }

    /// Marks a file as analysed.
    pub fn on_file_complete(&mut self, size: u64) {
        self.bytes_read = self.bytes_read.saturating_add(size);
        self.bar.set_prefix(humanize_bytes(self.bytes_read));
        self.bar.inc(1);
    }
}

impl Drop for ScanProgress {
    fn drop(&mut self) {
        self.bar.finish_and_clear();
    }
}

/// Converts bytes to human-readable format (KB, MB, GB, TB).
pub fn humanize_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;
    const TB: u64 = GB * 1024;

    if bytes >= TB {
        format!("{:.1} TB", bytes as f64 / TB as f64)
    } else if bytes >= GB {
        format!("{:.1} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{bytes} B")
    }
}

/// Converts duration to human-readable format.
fn humanize_duration(duration: std::time::Duration) -> String {
    let secs = duration.as_secs();
    if secs >= 3600 {
        format!("{}h{}m", secs / 3600, (secs % 3600) / 60)
    } else if secs >= 60 {
        format!("{}m{}s", secs / 60, secs % 60)
    } else {
        format!("{secs}s")
    }
}
