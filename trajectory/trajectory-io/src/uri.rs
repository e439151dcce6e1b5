//! URI parsing and local-file resolution for trajectory references.
//!
//! URIs take the form `scheme:path#fragment`. The fragment starts at the
//! last `#`, the scheme ends at the first `:`. Only `file:` and a
//! configurable set of alias schemes resolve, against a search path of
//! directories; everything else resolves to nothing.

use std::path::{Path, PathBuf};

/// A URI split into scheme, path, and fragment. All parts may be empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParsedUri<'a> {
    /// Scheme before the first `:`, or empty.
    pub scheme: &'a str,
    /// Path between scheme and fragment.
    pub path: &'a str,
    /// Fragment after the last `#`, or empty.
    pub fragment: &'a str,
}

/// Splits a URI into scheme, path, and fragment.
///
/// # Example
///
/// ```
/// use trajectory_io::parse_uri;
///
/// let uri = parse_uri("file:traj/grasp.traj#arm");
/// assert_eq!(uri.scheme, "file");
/// assert_eq!(uri.path, "traj/grasp.traj");
/// assert_eq!(uri.fragment, "arm");
/// ```
#[must_use]
pub fn parse_uri(uri: &str) -> ParsedUri<'_> {
    let (rest, fragment) = match uri.rsplit_once('#') {
        Some((rest, fragment)) => (rest, fragment),
        None => (uri, ""),
    };
    let (scheme, path) = match rest.split_once(':') {
        Some((scheme, path)) => (scheme, path),
        None => ("", rest),
    };
    ParsedUri {
        scheme,
        path,
        fragment,
    }
}

/// Resolves `file:`-like URIs against a search path.
///
/// # Example
///
/// ```no_run
/// use trajectory_io::UriResolver;
///
/// let resolver = UriResolver::new()
///     .with_search_path("/var/robots/trajectories")
///     .with_scheme_alias("robot");
///
/// let path = resolver.resolve("robot:grasp.traj").unwrap();
/// ```
#[derive(Debug, Clone, Default)]
pub struct UriResolver {
    search_paths: Vec<PathBuf>,
    scheme_aliases: Vec<String>,
}

impl UriResolver {
    /// Creates a resolver with no search paths and no aliases.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a directory to resolve relative paths against, builder style.
    #[must_use]
    pub fn with_search_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.search_paths.push(path.into());
        self
    }

    /// Adds a scheme treated like `file:`, builder style.
    #[must_use]
    pub fn with_scheme_alias(mut self, alias: impl Into<String>) -> Self {
        self.scheme_aliases.push(alias.into());
        self
    }

    /// Resolves a URI to an existing local file.
    ///
    /// `file:` and alias schemes look the path up; an empty scheme with an
    /// empty path and unknown schemes resolve to `None`.
    #[must_use]
    pub fn resolve(&self, uri: &str) -> Option<PathBuf> {
        let parsed = parse_uri(uri);
        if parsed.scheme.is_empty() && parsed.path.is_empty() {
            return None;
        }
        if parsed.scheme == "file" || self.scheme_aliases.iter().any(|a| a == parsed.scheme) {
            return self.find_local_file(parsed.path);
        }
        None
    }

    fn find_local_file(&self, path: &str) -> Option<PathBuf> {
        let candidate = Path::new(path);
        if candidate.is_absolute() {
            return candidate.is_file().then(|| candidate.to_path_buf());
        }
        self.search_paths
            .iter()
            .map(|dir| dir.join(candidate))
            .find(|joined| joined.is_file())
    }
}
