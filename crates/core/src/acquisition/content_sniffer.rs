//! Magic-number content-type detection over the leading bytes of a payload.

const SNIFF_LEN: usize = 512;

pub const OCTET_STREAM: &str = "application/octet-stream";
pub const TEXT_PLAIN: &str = "text/plain; charset=utf-8";

/// Byte-prefix signatures, `0xFF` mask bytes compare exactly.
struct Signature {
    mask: &'static [u8],
    pattern: &'static [u8],
    content_type: &'static str,
}

const fn exact(pattern: &'static [u8], content_type: &'static str) -> Signature {
    Signature {
        mask: &[],
        pattern,
        content_type,
    }
}

const SIGNATURES: &[Signature] = &[
    exact(b"\xFF\xD8\xFF", "image/jpeg"),
    exact(b"\x89PNG\x0D\x0A\x1A\x0A", "image/png"),
    exact(b"GIF87a", "image/gif"),
    exact(b"GIF89a", "image/gif"),
    exact(b"BM", "image/bmp"),
    exact(b"\x00\x00\x01\x00", "image/x-icon"),
    exact(b"\x00\x00\x02\x00", "image/x-icon"),
    Signature {
        mask: b"\xFF\xFF\xFF\xFF\x00\x00\x00\x00\xFF\xFF\xFF\xFF\xFF\xFF",
        pattern: b"RIFF\x00\x00\x00\x00WEBPVP",
        content_type: "image/webp",
    },
    exact(b"%PDF-", "application/pdf"),
    exact(b"PK\x03\x04", "application/zip"),
    exact(b"\x1F\x8B\x08", "application/x-gzip"),
];

impl Signature {
    fn matches(&self, data: &[u8]) -> bool {
        if data.len() < self.pattern.len() {
            return false;
        }
        if self.mask.is_empty() {
            return data.starts_with(self.pattern);
        }
        self.pattern
            .iter()
            .zip(self.mask)
            .zip(data)
            .all(|((p, m), d)| d & m == p & m)
    }
}

/// Returns the MIME type the payload looks like.
///
/// Empty input is reported as `application/octet-stream`.
pub fn sniff_content_type(data: &[u8]) -> &'static str {
    if data.is_empty() {
        return OCTET_STREAM;
    }
    let head = &data[..data.len().min(SNIFF_LEN)];

    if let Some(sig) = SIGNATURES.iter().find(|sig| sig.matches(head)) {
        return sig.content_type;
    }
    if head.iter().any(|&b| is_binary_byte(b)) {
        OCTET_STREAM
    } else {
        TEXT_PLAIN
    }
}

fn is_binary_byte(b: u8) -> bool {
    matches!(b, 0x00..=0x08 | 0x0B | 0x0E..=0x1A | 0x1C..=0x1F)
}
