//! Discovery of archives contributing to the process module path.
//!
//! Each configured entry is either a single `.jar`/`.zip` archive, a
//! directory root whose archives are collected (recursively unless disabled),
//! or a wildcard `dir/*` that collects only the archives directly under
//! `dir`. Directory listings are sorted by file name so the resulting
//! [`ModulePath`] is deterministic.

use std::fmt;

use camino::{Utf8Path, Utf8PathBuf};
use walkdir::{DirEntry, WalkDir};

/// Default module path entries when no override is given.
pub const DEFAULT_MODULE_PATH: &[&str] = &["./config/", "./lib/"];

/// Directory holding bootstrap configuration in the default layout.
const DEFAULT_CONFIG_ENTRY: &str = "config/";

/// Version-control metadata directories never searched for archives.
pub const SKIPPED_DIRECTORIES: &[&str] = &[".git", ".svn", ".hg", ".bzr", "CVS"];

const ARCHIVE_EXTENSIONS: &[&str] = &["jar", "zip"];

/// One module path element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArchivePathEntry {
    /// A directory added as a root.
    Directory(Utf8PathBuf),
    /// A single packaged archive.
    Archive(Utf8PathBuf),
}

impl ArchivePathEntry {
    /// Path of the entry.
    #[must_use]
    pub fn path(&self) -> &Utf8Path {
        match self {
            Self::Directory(path) | Self::Archive(path) => path,
        }
    }
}

/// Ordered module path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModulePath {
    entries: Vec<ArchivePathEntry>,
}

impl ModulePath {
    /// Entries in discovery order.
    #[must_use]
    pub fn entries(&self) -> &[ArchivePathEntry] {
        &self.entries
    }

    /// Archive entries in discovery order.
    pub fn archives(&self) -> impl Iterator<Item = &Utf8Path> {
        self.entries.iter().filter_map(|entry| match entry {
            ArchivePathEntry::Archive(path) => Some(path.as_path()),
            ArchivePathEntry::Directory(_) => None,
        })
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` when nothing was discovered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn push(&mut self, entry: ArchivePathEntry) {
        if !self.entries.contains(&entry) {
            self.entries.push(entry);
        }
    }
}

impl fmt::Display for ModulePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for entry in &self.entries {
            if !first {
                f.write_str(":")?;
            }
            first = false;
            f.write_str(entry.path().as_str())?;
        }
        Ok(())
    }
}

/// A normalised configured entry.
#[derive(Debug, Clone, PartialEq, Eq)]
enum PathSpec {
    /// `dir/*`: archives directly under `dir`.
    Wildcard(Utf8PathBuf),
    /// A file or directory.
    Plain(Utf8PathBuf),
}

fn normalise(raw: &str) -> PathSpec {
    let trimmed = raw.trim();
    let relative = trimmed.strip_prefix("./").unwrap_or(trimmed);
    if let Some(dir) = relative
        .strip_suffix("/*")
        .or_else(|| relative.strip_suffix("\\*"))
    {
        return PathSpec::Wildcard(Utf8PathBuf::from(dir));
    }
    PathSpec::Plain(Utf8PathBuf::from(relative))
}

fn with_trailing_separator(path: &Utf8Path) -> Utf8PathBuf {
    let text = path.as_str();
    if text.ends_with('/') || text.ends_with(std::path::MAIN_SEPARATOR) {
        path.to_path_buf()
    } else {
        Utf8PathBuf::from(format!("{text}{}", std::path::MAIN_SEPARATOR))
    }
}

fn is_archive_name(name: &str) -> bool {
    Utf8Path::new(name).extension().is_some_and(|extension| {
        ARCHIVE_EXTENSIONS
            .iter()
            .any(|known| extension.eq_ignore_ascii_case(known))
    })
}

/// Builds a [`ModulePath`] from configured entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModulePathBuilder {
    entries: Vec<String>,
    using_defaults: bool,
    recursive: bool,
}

impl ModulePathBuilder {
    /// Builder over explicit entries.
    #[must_use]
    pub const fn new(entries: Vec<String>) -> Self {
        Self {
            entries,
            using_defaults: false,
            recursive: true,
        }
    }

    /// Builder over [`DEFAULT_MODULE_PATH`].
    #[must_use]
    pub fn with_defaults() -> Self {
        Self {
            entries: DEFAULT_MODULE_PATH.iter().map(|entry| (*entry).to_owned()).collect(),
            using_defaults: true,
            recursive: true,
        }
    }

    /// Enables or disables recursion into subdirectories.
    #[must_use]
    pub const fn recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    /// Resolves every entry relative to the current directory.
    #[must_use]
    pub fn build(&self) -> ModulePath {
        self.build_in(Utf8Path::new(""))
    }

    /// Resolves every entry relative to `base`.
    ///
    /// Entries that do not exist, or that are neither a directory nor an
    /// archive, are skipped with a debug log line.
    #[must_use]
    pub fn build_in(&self, base: &Utf8Path) -> ModulePath {
        let mut module_path = ModulePath::default();
        for raw in &self.entries {
            match normalise(raw) {
                PathSpec::Wildcard(dir) => {
                    collect_archives(&mut module_path, &base.join(&dir), false);
                }
                PathSpec::Plain(path) => self.add_plain(&mut module_path, base, &path),
            }
        }
        tracing::debug!(
            target: crate::LAUNCHER_TARGET,
            entries = module_path.len(),
            recursive = self.recursive,
            "module path built"
        );
        module_path
    }

    fn add_plain(&self, module_path: &mut ModulePath, base: &Utf8Path, path: &Utf8Path) {
        let resolved = base.join(path);
        if resolved.is_file() {
            if path.file_name().is_some_and(is_archive_name) {
                module_path.push(ArchivePathEntry::Archive(resolved));
            } else {
                tracing::debug!(target: crate::LAUNCHER_TARGET, path = %resolved, "not an archive; skipped");
            }
            return;
        }
        if !resolved.is_dir() {
            tracing::debug!(target: crate::LAUNCHER_TARGET, path = %resolved, "module path entry missing; skipped");
            return;
        }

        let root = with_trailing_separator(&resolved);
        module_path.push(ArchivePathEntry::Directory(root));
        let is_default_config = self.using_defaults
            && with_trailing_separator(path).as_str() == DEFAULT_CONFIG_ENTRY;
        if !is_default_config {
            collect_archives(module_path, &resolved, self.recursive);
        }
    }
}

/// Adds the archives under `dir`, descending into subdirectories when
/// `recurse` is set.
///
/// Within each directory the archives come first, sorted by file name, then
/// each searchable subdirectory in name order.
fn collect_archives(module_path: &mut ModulePath, dir: &Utf8Path, recurse: bool) {
    let walker = WalkDir::new(dir)
        .follow_links(false)
        .min_depth(1)
        .max_depth(if recurse { usize::MAX } else { 1 })
        .sort_by(|left, right| {
            left.file_type()
                .is_dir()
                .cmp(&right.file_type().is_dir())
                .then_with(|| left.file_name().cmp(right.file_name()))
        });
    for walked in walker.into_iter().filter_entry(|entry| !is_skipped_directory(entry)) {
        match walked {
            Ok(entry) => {
                if let Some(archive) = archive_path(&entry) {
                    module_path.push(ArchivePathEntry::Archive(archive));
                }
            }
            Err(error) => tracing::warn!(
                target: crate::LAUNCHER_TARGET,
                path = %dir,
                %error,
                "directory unreadable; skipped"
            ),
        }
    }
}

fn is_skipped_directory(entry: &DirEntry) -> bool {
    entry.file_type().is_dir()
        && entry
            .file_name()
            .to_str()
            .is_some_and(|name| SKIPPED_DIRECTORIES.contains(&name))
}

/// The entry's path when it is a visible, non-empty archive file.
fn archive_path(entry: &DirEntry) -> Option<Utf8PathBuf> {
    if !entry.file_type().is_file() {
        return None;
    }
    let name = entry.file_name().to_str()?;
    if name.starts_with('.') || !is_archive_name(name) {
        return None;
    }
    if entry.metadata().ok()?.len() == 0 {
        return None;
    }
    Utf8Path::from_path(entry.path()).map(Utf8Path::to_path_buf)
}
