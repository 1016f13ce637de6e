use lazy_static::lazy_static;
use regex::Regex;

const DRIVE_HOST: &str = "drive.google.com";

lazy_static! {
    static ref DRIVE_FILE_ID: Regex = Regex::new(r"/file/d/([^/?#]+)").unwrap();
}

/// Rewrite a Google Drive sharing link (`https://drive.google.com/file/d/<ID>/view`) into a
/// direct-download link.  Any other string is returned unchanged.
pub fn normalize_url(url: &str) -> String {
    if url.contains(DRIVE_HOST) {
        if let Some(caps) = DRIVE_FILE_ID.captures(url) {
            let direct = format!(
                "https://{}/uc?export=download&id={}",
                DRIVE_HOST, &caps[1]
            );
            log::info!("Converted Google Drive URL to: {}", direct);
            return direct;
        }
    }
    url.to_owned()
}
