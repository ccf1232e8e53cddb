//! Path and URI classification.
//!
//! Classification is a pure prefix/scheme inspection. Resolution turns the
//! operable categories into a host path; every other category fails before a
//! backend call is made.

use std::path::Path;

use crate::backend::Backend;
use crate::flags::AccessMode;
use crate::{FileIoConfig, FileIoError, FileIoErrorKind, FileIoResult};

const SCHEME_SEPARATOR: &str = "://";
const SCHEME_FILE: &str = "file";
const SCHEME_DATASHARE: &str = "datashare";
const SCHEME_CONTENT: &str = "content";
const AUTHORITY_MEDIA: &str = "media";
const AUTHORITY_DOCS: &str = "docs";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PathCategory {
    LocalPath,
    SandboxPath,
    MediaUri,
    DocsUri,
    DataShareUri,
    UnsupportedUri,
}

impl PathCategory {
    /// Whether general operations may act on this category.
    pub fn is_operable(self) -> bool {
        matches!(
            self,
            PathCategory::LocalPath | PathCategory::SandboxPath | PathCategory::DocsUri
        )
    }
}

/// A classified input together with the host path it resolves to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPath {
    pub category: PathCategory,
    pub real_path: String,
    /// The original URI, when the input was one.
    pub uri: Option<String>,
}

struct UriParts<'a> {
    scheme: &'a str,
    authority: &'a str,
    path: &'a str,
}

fn split_uri(input: &str) -> Option<UriParts<'_>> {
    let (scheme, rest) = input.split_once(SCHEME_SEPARATOR)?;
    let (authority, path) = match rest.find('/') {
        Some(idx) => rest.split_at(idx),
        None => (rest, ""),
    };
    Some(UriParts {
        scheme,
        authority,
        path,
    })
}

/// Classify an input. Total and deterministic.
pub fn classify(input: &str, config: &FileIoConfig) -> PathCategory {
    if let Some(uri) = split_uri(input) {
        return match uri.scheme {
            SCHEME_FILE => match uri.authority {
                AUTHORITY_MEDIA => PathCategory::MediaUri,
                AUTHORITY_DOCS => PathCategory::DocsUri,
                "" => PathCategory::UnsupportedUri,
                _ => PathCategory::SandboxPath,
            },
            SCHEME_DATASHARE => PathCategory::DataShareUri,
            SCHEME_CONTENT => PathCategory::UnsupportedUri,
            _ => PathCategory::UnsupportedUri,
        };
    }
    if Path::new(input).starts_with(&config.sandbox_root) {
        PathCategory::SandboxPath
    } else {
        PathCategory::LocalPath
    }
}

fn decode(path: &str) -> FileIoResult<String> {
    urlencoding::decode(path)
        .map(|decoded| decoded.into_owned())
        .map_err(|_| FileIoError::invalid_argument("path.decode"))
}

/// Resolve an input to a host path.
///
/// Docs URIs are checked for existence through the backend; a failed check
/// reports [`FileIoErrorKind::NotFound`] with context `path.docs_access`.
pub fn resolve(
    input: &str,
    config: &FileIoConfig,
    backend: &dyn Backend,
) -> FileIoResult<ResolvedPath> {
    let category = classify(input, config);
    if !category.is_operable() {
        tracing::debug!(input, ?category, "rejecting unsupported path category");
        return Err(FileIoError::new(
            FileIoErrorKind::Unsupported,
            "path.resolve",
        ));
    }

    let Some(uri) = split_uri(input) else {
        return Ok(ResolvedPath {
            category,
            real_path: input.to_string(),
            uri: None,
        });
    };

    let decoded = decode(uri.path)?;
    let real_path = match category {
        PathCategory::DocsUri => {
            if let Err(code) = backend.access(&decoded, AccessMode::EXISTS) {
                tracing::debug!(path = %decoded, %code, "docs uri target is not accessible");
                return Err(FileIoError::new(
                    FileIoErrorKind::NotFound,
                    "path.docs_access",
                ));
            }
            decoded
        }
        _ => match config.bundle_name.as_deref() {
            Some(own) if own != uri.authority => format!(
                "{}/r/{}{}",
                config.share_root.display(),
                uri.authority,
                decoded
            ),
            _ => decoded,
        },
    };

    Ok(ResolvedPath {
        category,
        real_path,
        uri: Some(input.to_string()),
    })
}

/// Final path component, as used for names of URIs and host paths alike.
pub fn file_name(path: &str) -> Option<&str> {
    let trimmed = path.trim_end_matches('/');
    let (_, name) = trimmed.rsplit_once('/')?;
    Some(name)
}

/// Everything before the final `/`.
pub fn parent(path: &str) -> Option<&str> {
    let (parent, _) = path.rsplit_once('/')?;
    Some(parent)
}
