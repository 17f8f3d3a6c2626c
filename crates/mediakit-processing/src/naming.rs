//! Naming stage
//!
//! Each style gets a random 16 hex digit token as its file stem. The
//! extension comes from the bytes that were actually produced, never from
//! the upload's file name.

use std::path::Path;

use mediakit_core::CodecError;

use crate::codec::Container;

const TOKEN_BYTES: usize = 8;

/// Content type and extension of produced bytes, checked against what the
/// style was expected to produce.
pub fn resolve_container(data: &[u8], expected: Option<Container>) -> Result<Container, CodecError> {
    let sniffed = Container::sniff(data).ok_or_else(|| {
        CodecError::UnexpectedOutput("produced bytes are not a known container".to_string())
    })?;

    match expected {
        Some(expected) if expected != sniffed => Err(CodecError::UnexpectedOutput(format!(
            "expected {} output, got {}",
            expected.content_type(),
            sniffed.content_type()
        ))),
        _ => Ok(sniffed),
    }
}

/// Generate `<token>.<extension>`. The token is random hex and is redrawn
/// until it does not start with the upload's file stem.
pub fn generate_file_name(original_file_name: Option<&str>, container: Container) -> String {
    let stem = original_stem(original_file_name);

    loop {
        let token = hex::encode(rand::random::<[u8; TOKEN_BYTES]>());
        if stem.is_some_and(|stem| token.starts_with(stem)) {
            continue;
        }
        return format!("{}.{}", token, container.extension());
    }
}

/// Stem of the upload name, or `None` when there is nothing to avoid.
fn original_stem(original_file_name: Option<&str>) -> Option<&str> {
    let original = original_file_name.map(str::trim).filter(|o| !o.is_empty())?;
    Path::new(original)
        .file_stem()
        .and_then(|stem| stem.to_str())
        .filter(|stem| !stem.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_MAGIC: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR";

    #[test]
    fn test_generated_name_shape() {
        let name = generate_file_name(Some("600x400.png"), Container::Png);
        assert_eq!(name.len(), 16 + ".png".len());
        assert!(name.ends_with(".png"));
        assert!(!name.starts_with("600x400"));
        assert!(name[..16].chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_names_are_unique() {
        let a = generate_file_name(None, Container::Mp4);
        let b = generate_file_name(None, Container::Mp4);
        assert_ne!(a, b);
    }

    #[test]
    fn test_short_upload_names_never_prefix_the_token() {
        for original in ["a", "0", "f.png", "png", "p", ".", "ab.jpeg"] {
            let stem = original_stem(Some(original));
            for _ in 0..200 {
                let name = generate_file_name(Some(original), Container::Png);
                assert!(name.ends_with(".png"));
                if let Some(stem) = stem {
                    assert!(!name.starts_with(stem), "{} starts with {}", name, stem);
                }
                assert_ne!(name, original);
            }
        }
    }

    #[test]
    fn test_original_stem() {
        assert_eq!(original_stem(Some("600x400.png")), Some("600x400"));
        assert_eq!(original_stem(Some("png")), Some("png"));
        assert_eq!(original_stem(Some("  ")), None);
        assert_eq!(original_stem(None), None);
    }

    #[test]
    fn test_resolve_container() {
        assert_eq!(resolve_container(PNG_MAGIC, None).unwrap(), Container::Png);
        assert_eq!(
            resolve_container(PNG_MAGIC, Some(Container::Png)).unwrap(),
            Container::Png
        );
        assert!(matches!(
            resolve_container(PNG_MAGIC, Some(Container::Mp4)),
            Err(CodecError::UnexpectedOutput(_))
        ));
        assert!(resolve_container(b"garbage", None).is_err());
    }
}
