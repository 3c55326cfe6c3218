//! Plugin metadata blocks
//!
//! Every Lua plugin declares itself in a comment block:
//!
//! ```lua
//! --[[ rune-meta
//! name: Python
//! ext: [py, pyw]
//! ]]
//! ```
//!
//! The block may appear anywhere in the file and span any number of lines.
//! Its body is YAML. Only the block itself has to be UTF-8; the rest of the
//! source is raw Lua bytes.

use once_cell::sync::Lazy;
use regex::bytes::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

static META_BLOCK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)--\[\[\s*rune-meta(.*?)\]\]").expect("metadata block pattern is valid")
});

#[derive(Debug, Error)]
pub enum MetaError {
    #[error("missing rune-meta block")]
    MissingBlock,

    #[error("invalid rune-meta block: {0}")]
    Decode(#[from] serde_yaml::Error),

    #[error("rune-meta block declares no extensions")]
    NoExtensions,
}

/// Metadata declared by a plugin
///
/// Extensions are kept exactly as written; the registry normalizes them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginMeta {
    pub name: String,

    #[serde(rename = "ext")]
    pub extensions: Vec<String>,
}

/// Extracts the first `rune-meta` block from a plugin's source text
pub fn extract_metadata(source: impl AsRef<[u8]>) -> Result<PluginMeta, MetaError> {
    let body = META_BLOCK
        .captures(source.as_ref())
        .and_then(|caps| caps.get(1))
        .ok_or(MetaError::MissingBlock)?
        .as_bytes();

    let meta: PluginMeta = serde_yaml::from_slice(body)?;

    if meta.extensions.is_empty() {
        return Err(MetaError::NoExtensions);
    }

    Ok(meta)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn parses_flow_list() {
        let src = "--[[ rune-meta\nname: Py\next: [py]\n]]\nprint(target)\n";
        let meta = extract_metadata(src).unwrap();

        assert_eq!(meta.name, "Py");
        assert_eq!(meta.extensions, vec!["py"]);
    }

    #[test]
    fn parses_block_list() {
        let src = "--[[ rune-meta\nname: Python Plugin\next:\n  - py\n  - pyw\n]]";
        let meta = extract_metadata(src).unwrap();

        assert_eq!(meta.name, "Python Plugin");
        assert_eq!(meta.extensions, vec!["py", "pyw"]);
    }

    #[test]
    fn block_can_follow_code() {
        let src = "local x = 1\n-- leading comment\n--[[rune-meta\nname: Late\next: [txt]\n]]\n";
        let meta = extract_metadata(src).unwrap();

        assert_eq!(meta.name, "Late");
    }

    #[test]
    fn extensions_are_not_normalized() {
        let src = "--[[ rune-meta\nname: Mixed\next: [.PY, Lua]\n]]";
        let meta = extract_metadata(src).unwrap();

        assert_eq!(meta.extensions, vec![".PY", "Lua"]);
    }

    #[test]
    fn first_block_wins() {
        let src = "--[[ rune-meta\nname: One\next: [a]\n]]\n--[[ rune-meta\nname: Two\next: [b]\n]]";
        let meta = extract_metadata(src).unwrap();

        assert_eq!(meta.name, "One");
    }

    #[test]
    fn missing_block() {
        let err = extract_metadata("print('no metadata here')").unwrap_err();
        assert!(matches!(err, MetaError::MissingBlock));
    }

    #[test]
    fn plain_lua_block_comment_is_not_metadata() {
        let err = extract_metadata("--[[ just a comment\nname: x\n]]").unwrap_err();
        assert!(matches!(err, MetaError::MissingBlock));
    }

    #[test]
    fn malformed_yaml() {
        let err = extract_metadata("--[[ rune-meta\nname: [unclosed\n]]").unwrap_err();
        assert!(matches!(err, MetaError::Decode(_)));
    }

    #[test]
    fn missing_name_field() {
        let err = extract_metadata("--[[ rune-meta\next: [py]\n]]").unwrap_err();
        assert!(matches!(err, MetaError::Decode(_)));
    }

    #[test]
    fn empty_extension_list() {
        let err = extract_metadata("--[[ rune-meta\nname: Empty\next: []\n]]").unwrap_err();
        assert!(matches!(err, MetaError::NoExtensions));
    }

    #[test]
    fn non_utf8_bytes_outside_the_block() {
        let src = b"-- caf\xE9\n--[[ rune-meta\nname: Latin\next: [lat]\n]]\n-- na\xEFve\n";
        let meta = extract_metadata(&src[..]).unwrap();
        assert_eq!(meta.name, "Latin");
        assert_eq!(meta.extensions, vec!["lat"]);
    }

    #[test]
    fn non_utf8_bytes_inside_the_block() {
        let err = extract_metadata(&b"--[[ rune-meta\nname: caf\xE9\next: [x]\n]]"[..]).unwrap_err();
        assert!(matches!(err, MetaError::Decode(_)));
    }

    #[test]
    fn error_messages() {
        assert_eq!(MetaError::MissingBlock.to_string(), "missing rune-meta block");
        assert_eq!(
            MetaError::NoExtensions.to_string(),
            "rune-meta block declares no extensions"
        );
    }

    proptest! {
        #[test]
        fn extracts_from_any_surroundings(
            prefix in "[a-z0-9 =()\n]{0,40}",
            suffix in "[a-z0-9 =()\n\\]]{0,40}",
            name in "P[a-z0-9 ]{0,14}[a-z0-9]",
            exts in proptest::collection::vec("[a-z]{1,2}[0-9]{0,3}", 1..4),
        ) {
            let block = format!(
                "--[[ rune-meta\nname: {}\next:\n{}\n]]",
                name,
                exts.iter().map(|e| format!("  - {}", e)).collect::<Vec<_>>().join("\n"),
            );
            let source = format!("{}{}{}", prefix, block, suffix);

            let meta = extract_metadata(&source).unwrap();
            prop_assert_eq!(meta.name, name);
            prop_assert_eq!(meta.extensions, exts);
        }
    }
}
