//! Report serialization to local files

pub mod json;
pub mod text;

use chrono::Local;

/// Builds the conventional timestamped report file name:
/// `<subject>_<kind>_<YYYYMMDD_HHMMSS>.<ext>`
pub fn timestamped_name(subject: &str, kind: &str, ext: &str) -> String {
    format!(
        "{}_{}_{}.{}",
        subject,
        kind,
        Local::now().format("%Y%m%d_%H%M%S"),
        ext
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timestamped_name_shape() {
        let name = timestamped_name("example.com", "nmap", "txt");
        assert!(name.starts_with("example.com_nmap_"));
        assert!(name.ends_with(".txt"));
        // subject + kind + 15-char timestamp + separators + extension
        assert_eq!(name.len(), "example.com_nmap_".len() + 15 + 4);
    }
}
