//! Torrent metainfo inspection.
//!
//! Uses librqbit-core to parse bencoded .torrent data and extract the
//! identity and archive layout of the payload without downloading anything.

use librqbit_core::torrent_metainfo::{torrent_from_bytes, TorrentMetaV1Owned};
use regex_lite::Regex;
use thiserror::Error;

/// Errors that can occur when parsing torrent metainfo.
#[derive(Debug, Error)]
pub enum MetainfoError {
    #[error("Failed to parse torrent: {0}")]
    ParseError(String),

    #[error("Empty torrent (no files)")]
    EmptyTorrent,
}

/// What the engine needs to know about a .torrent descriptor.
#[derive(Debug, Clone)]
pub struct TorrentSummary {
    /// Lowercase hex info hash; the attempt identity.
    pub info_hash: String,
    /// Suggested name from the metainfo dictionary.
    pub name: String,
    /// The archive file to extract after the transfer completes, if the
    /// payload is packaged as a compressed archive.
    pub archive_member: Option<String>,
}

/// Parse a .torrent descriptor and summarize it.
pub fn parse_summary(bytes: &[u8]) -> Result<TorrentSummary, MetainfoError> {
    let torrent: TorrentMetaV1Owned =
        torrent_from_bytes(bytes).map_err(|e| MetainfoError::ParseError(e.to_string()))?;

    let info = &torrent.info;
    let name = info
        .name
        .as_ref()
        .map(|b| String::from_utf8_lossy(b.as_ref()).into_owned())
        .unwrap_or_else(|| "unknown".to_string());

    let paths = if let Some(ref files) = info.files {
        let mut paths = Vec::with_capacity(files.len());
        for file in files {
            let mut parts = vec![name.clone()];
            for part in &file.path {
                parts.push(String::from_utf8_lossy(part.as_ref()).into_owned());
            }
            paths.push(parts.join("/"));
        }
        if paths.is_empty() {
            return Err(MetainfoError::EmptyTorrent);
        }
        paths
    } else if info.length.is_some() {
        vec![name.clone()]
    } else {
        return Err(MetainfoError::EmptyTorrent);
    };

    Ok(TorrentSummary {
        info_hash: torrent.info_hash.as_string(),
        name,
        archive_member: find_archive_member(&paths),
    })
}

/// Find the archive to extract among the payload files, if any.
///
/// A whole-archive extension (rar, zip, 7z) wins immediately. Otherwise
/// split volumes named `.r00`/`.001` style are collected and the
/// lowest-numbered part is the one to hand to the extractor.
pub fn find_archive_member(paths: &[String]) -> Option<String> {
    // Split-volume extensions are an optional 'r' followed by digits only
    let split_re = Regex::new(r"^r?[0-9]+$").unwrap();

    let mut best_split: Option<(u32, &str)> = None;

    for path in paths {
        let ext = match path.rsplit_once('.') {
            Some((_, ext)) => ext.to_ascii_lowercase(),
            None => continue,
        };

        if ext == "rar" || ext == "zip" || ext == "7z" {
            return Some(path.clone());
        }

        if split_re.is_match(&ext) {
            let digits = ext.trim_start_matches('r');
            if let Ok(part) = digits.parse::<u32>() {
                if best_split.is_none_or(|(min, _)| part < min) {
                    best_split = Some((part, path));
                }
            }
        }
    }

    best_split.map(|(_, path)| path.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_invalid_torrent() {
        assert!(parse_summary(b"not a valid torrent").is_err());
    }

    #[test]
    fn test_parse_empty_data() {
        assert!(parse_summary(b"").is_err());
    }

    #[test]
    fn test_parse_single_file_torrent() {
        let bytes = b"d4:infod6:lengthi12345e4:name11:episode.mkv\
12:piece lengthi16384e6:pieces20:AAAAAAAAAAAAAAAAAAAAee";
        let summary = parse_summary(bytes.as_slice()).unwrap();
        assert_eq!(summary.name, "episode.mkv");
        assert!(summary.archive_member.is_none());
        assert_eq!(summary.info_hash.len(), 40);
    }

    #[test]
    fn test_whole_archive_detected() {
        let paths = vec![
            "Release/readme.nfo".to_string(),
            "Release/content.rar".to_string(),
        ];
        assert_eq!(
            find_archive_member(&paths),
            Some("Release/content.rar".to_string())
        );
    }

    #[test]
    fn test_split_volume_picks_lowest_part() {
        let paths = vec![
            "Release/content.r03".to_string(),
            "Release/content.r00".to_string(),
            "Release/content.r01".to_string(),
        ];
        assert_eq!(
            find_archive_member(&paths),
            Some("Release/content.r00".to_string())
        );
    }

    #[test]
    fn test_numeric_split_volume() {
        let paths = vec![
            "Release/content.002".to_string(),
            "Release/content.001".to_string(),
        ];
        assert_eq!(
            find_archive_member(&paths),
            Some("Release/content.001".to_string())
        );
    }

    #[test]
    fn test_media_file_is_not_a_split_part() {
        // "mp4" must not be read as split part 4
        let paths = vec!["Release/episode.mp4".to_string()];
        assert_eq!(find_archive_member(&paths), None);
    }

    #[test]
    fn test_plain_media_files() {
        let paths = vec![
            "Release/episode.mkv".to_string(),
            "Release/sample/sample.mkv".to_string(),
        ];
        assert_eq!(find_archive_member(&paths), None);
    }
}
