//! Hand-built bencoded .torrent payloads.

fn push_str(out: &mut Vec<u8>, s: &str) {
    out.extend_from_slice(format!("{}:{}", s.len(), s).as_bytes());
}

/// A minimal single-file torrent whose payload is `name`.
pub fn single_file_torrent(name: &str, length: u64) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(b"d4:infod");
    out.extend_from_slice(format!("6:lengthi{}e", length).as_bytes());
    out.extend_from_slice(b"4:name");
    push_str(&mut out, name);
    out.extend_from_slice(b"12:piece lengthi16384e");
    out.extend_from_slice(b"6:pieces20:AAAAAAAAAAAAAAAAAAAA");
    out.extend_from_slice(b"ee");
    out
}

/// A minimal multi-file torrent rooted at `root`.
pub fn multi_file_torrent(root: &str, files: &[(&str, u64)]) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(b"d4:infod5:filesl");
    for (path, length) in files {
        out.extend_from_slice(format!("d6:lengthi{}e4:pathl", length).as_bytes());
        push_str(&mut out, path);
        out.extend_from_slice(b"ee");
    }
    out.extend_from_slice(b"e4:name");
    push_str(&mut out, root);
    out.extend_from_slice(b"12:piece lengthi16384e");
    out.extend_from_slice(b"6:pieces20:AAAAAAAAAAAAAAAAAAAA");
    out.extend_from_slice(b"ee");
    out
}
