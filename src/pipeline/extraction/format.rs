use std::path::Path;

use serde::{Deserialize, Serialize};

/// Broad document categories we handle
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DocumentCategory {
    Pdf,
    Image,
    PlainText,
    Unsupported,
}

impl DocumentCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Image => "image",
            Self::PlainText => "plain_text",
            Self::Unsupported => "unsupported",
        }
    }

    /// PDFs and images need an OCR or text-layer reader.
    pub fn needs_reader(&self) -> bool {
        matches!(self, Self::Pdf | Self::Image)
    }

    pub fn is_supported(&self) -> bool {
        !matches!(self, Self::Unsupported)
    }

    fn from_extension(ext: &str) -> Self {
        match ext {
            "pdf" => Self::Pdf,
            "png" | "jpg" | "jpeg" | "tif" | "tiff" => Self::Image,
            "txt" | "text" => Self::PlainText,
            _ => Self::Unsupported,
        }
    }
}

/// Result of format detection
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormatDetection {
    pub mime_type: &'static str,
    pub category: DocumentCategory,
}

impl FormatDetection {
    fn unsupported() -> Self {
        Self {
            mime_type: "application/octet-stream",
            category: DocumentCategory::Unsupported,
        }
    }
}

/// Detect document format from magic bytes, cross-checked against the extension.
///
/// An extension outside the known set, or one that disagrees with the content,
/// is unsupported. Without an extension the content decides.
pub fn detect_format(name: &str, bytes: &[u8]) -> FormatDetection {
    let sniffed = sniff_content(bytes);

    let ext = Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);

    match ext {
        None => sniffed,
        Some(ext) => {
            let claimed = DocumentCategory::from_extension(&ext);
            if claimed.is_supported() && claimed == sniffed.category {
                sniffed
            } else {
                tracing::debug!(
                    extension = %ext,
                    sniffed = sniffed.category.as_str(),
                    "Extension rejected or does not match content"
                );
                FormatDetection::unsupported()
            }
        }
    }
}

fn sniff_content(bytes: &[u8]) -> FormatDetection {
    let (mime_type, category) = match bytes {
        // PDF: starts with %PDF
        [0x25, 0x50, 0x44, 0x46, ..] => ("application/pdf", DocumentCategory::Pdf),
        // JPEG: starts with FF D8 FF
        [0xFF, 0xD8, 0xFF, ..] => ("image/jpeg", DocumentCategory::Image),
        // PNG: starts with 89 50 4E 47
        [0x89, 0x50, 0x4E, 0x47, ..] => ("image/png", DocumentCategory::Image),
        // TIFF: little-endian (49 49 2A 00) or big-endian (4D 4D 00 2A)
        [0x49, 0x49, 0x2A, 0x00, ..] | [0x4D, 0x4D, 0x00, 0x2A, ..] => {
            ("image/tiff", DocumentCategory::Image)
        }
        _ if is_likely_text(bytes) => ("text/plain", DocumentCategory::PlainText),
        _ => return FormatDetection::unsupported(),
    };

    FormatDetection {
        mime_type,
        category,
    }
}

/// Valid UTF-8 in the first 4KB and mostly printable.
fn is_likely_text(bytes: &[u8]) -> bool {
    if bytes.is_empty() {
        return false;
    }

    let head = &bytes[..bytes.len().min(4096)];
    let text = match std::str::from_utf8(head) {
        Ok(t) => t,
        // A multi-byte char cut at the 4KB boundary is still text
        Err(e) if e.error_len().is_none() && e.valid_up_to() > 0 => {
            match std::str::from_utf8(&head[..e.valid_up_to()]) {
                Ok(t) => t,
                Err(_) => return false,
            }
        }
        Err(_) => return false,
    };

    let total = text.chars().count().max(1);
    let printable = text
        .chars()
        .filter(|c| !c.is_control() || c.is_whitespace())
        .count();
    printable as f64 / total as f64 > 0.95
}
