use tracing::warn;
use webbrowser::Browser;

use crate::session::FinalStats;

const SHARE_INTENT: &str = "https://twitter.com/intent/tweet?text=";

pub fn share_text(results: &FinalStats) -> String {
    format!(
        "I just typed at {} WPM with {}% accuracy in {}s on TypeMaster!",
        results.net_wpm, results.accuracy, results.elapsed_seconds
    )
}

pub fn share_url(results: &FinalStats) -> String {
    format!("{SHARE_INTENT}{}", urlencoding::encode(&share_text(results)))
}

pub fn can_share() -> bool {
    Browser::is_available()
}

/// Open the share link in a browser. Returns false when no browser is
/// available or it failed to launch.
pub fn open_share(results: &FinalStats) -> bool {
    if !can_share() {
        return false;
    }
    match webbrowser::open(&share_url(results)) {
        Ok(()) => true,
        Err(e) => {
            warn!(error = %e, "could not open browser");
            false
        }
    }
}
