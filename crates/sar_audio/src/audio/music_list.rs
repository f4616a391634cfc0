//! Music list
//!
//! Parses the music list file into [`MusicReference`] records and looks them
//! up by music id. A file looks like:
//!
//! ```text
//! # Background music
//! Version = 2 1 0
//!
//! MusicAdd = 100
//! MusicFileName = music/ground.ogg
//! MusicFlags = repeating fade_in
//! ```
//!
//! Directive names are case-insensitive and the `=` is optional. Values that
//! do not parse degrade to zero or empty rather than failing the load.

use bitflags::bitflags;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::assets::DataDirs;
use crate::audio::music::MusicId;
use crate::core::config::MusicConfig;

bitflags! {
    /// Per-track playback flags
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct MusicFlags: u32 {
        /// Loop until replaced
        const REPEAT = 1 << 1;
        /// Fade in when started, carried as metadata only
        const FADE_IN = 1 << 2;
        /// Fade out when replaced, carried as metadata only
        const FADE_OUT = 1 << 3;
    }
}

impl MusicFlags {
    /// Flag named by a music list token, matched by case-insensitive prefix
    fn from_token(token: &str) -> Option<Self> {
        let token = token.to_ascii_lowercase();
        if token.starts_with("repeating") {
            Some(Self::REPEAT)
        } else if token.starts_with("fade_in") || token.starts_with("fadein") {
            Some(Self::FADE_IN)
        } else if token.starts_with("fade_out") || token.starts_with("fadeout") {
            Some(Self::FADE_OUT)
        } else {
            None
        }
    }
}

/// One music track entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MusicReference {
    /// Music id this track plays for
    pub id: MusicId,
    /// Asset path relative to the data directories
    pub file_path: String,
    /// Playback flags
    pub flags: MusicFlags,
}

impl MusicReference {
    /// Create a reference with no file and no flags
    pub fn new(id: MusicId) -> Self {
        Self { id, file_path: String::new(), flags: MusicFlags::empty() }
    }

    /// Whether the track loops
    pub fn is_repeating(&self) -> bool {
        self.flags.contains(MusicFlags::REPEAT)
    }
}

/// Errors loading the music list
#[derive(Error, Debug)]
pub enum LoadError {
    /// The music list file does not exist
    #[error("{}: no such file", .0.display())]
    NotFound(PathBuf),

    /// The music list path names a directory
    #[error("{}: is a directory", .0.display())]
    IsDirectory(PathBuf),

    /// The music list could not be read
    #[error("{}: unable to open the file for reading: {source}", path.display())]
    Io {
        /// Music list path
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },
}

/// Ordered set of music references, in file order
#[derive(Debug, Clone, Default)]
pub struct MusicRegistry {
    refs: Vec<MusicReference>,
    version: Option<[f32; 3]>,
}

impl MusicRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the contents with the music list at `path`
    ///
    /// The previous contents are discarded first, a failed load leaves the
    /// registry empty.
    pub fn load(&mut self, path: impl AsRef<Path>) -> Result<(), LoadError> {
        let path = path.as_ref();
        self.clear();

        let result = Self::read(path);
        let contents = match result {
            Ok(contents) => contents,
            Err(e) => {
                log::error!("{e}");
                return Err(e);
            }
        };

        self.parse_into(&contents, path);
        log::info!("Loaded {} music reference(s) from {}", self.refs.len(), path.display());
        Ok(())
    }

    /// Load the music list named by the configuration from the global data root
    pub fn load_from_config(&mut self, config: &MusicConfig, dirs: &DataDirs) -> Result<(), LoadError> {
        self.load(dirs.global_file(&config.list_file))
    }

    /// Build a registry from music list text
    ///
    /// `origin` only labels diagnostics.
    pub fn parse_str(contents: &str, origin: impl AsRef<Path>) -> Self {
        let mut registry = Self::new();
        registry.parse_into(contents, origin.as_ref());
        registry
    }

    fn read(path: &Path) -> Result<String, LoadError> {
        let metadata = std::fs::metadata(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => LoadError::NotFound(path.to_path_buf()),
            _ => LoadError::Io { path: path.to_path_buf(), source: e },
        })?;
        if metadata.is_dir() {
            return Err(LoadError::IsDirectory(path.to_path_buf()));
        }

        let bytes = std::fs::read(path)
            .map_err(|source| LoadError::Io { path: path.to_path_buf(), source })?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    fn parse_into(&mut self, contents: &str, origin: &Path) {
        for (line_num, line) in logical_lines(contents) {
            let line = line.trim();

            // Skip empty lines and comments
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let (directive, value) = split_directive(line);

            if directive.eq_ignore_ascii_case("Version") {
                let mut numbers = value.split_whitespace().map(parse_float);
                self.version = Some([
                    numbers.next().unwrap_or(0.0),
                    numbers.next().unwrap_or(0.0),
                    numbers.next().unwrap_or(0.0),
                ]);
            } else if directive.eq_ignore_ascii_case("MusicAdd") {
                self.refs.push(MusicReference::new(parse_int(value)));
            } else if directive.eq_ignore_ascii_case("MusicFileName") {
                match self.refs.last_mut() {
                    Some(reference) => reference.file_path = value.to_string(),
                    None => log::warn!(
                        "{}: line {}: MusicFileName before any MusicAdd",
                        origin.display(),
                        line_num
                    ),
                }
            } else if directive.eq_ignore_ascii_case("MusicFlags") {
                match self.refs.last_mut() {
                    Some(reference) => {
                        for flag in value.split_whitespace().filter_map(MusicFlags::from_token) {
                            reference.flags |= flag;
                        }
                    }
                    None => log::warn!(
                        "{}: line {}: MusicFlags before any MusicAdd",
                        origin.display(),
                        line_num
                    ),
                }
            } else {
                log::warn!(
                    "{}: line {}: unsupported parameter \"{}\"",
                    origin.display(),
                    line_num,
                    directive
                );
            }
        }
    }

    /// Find the first reference with `id`, with its position
    ///
    /// Negative ids never match.
    pub fn find_by_id(&self, id: MusicId) -> Option<(&MusicReference, usize)> {
        if id < 0 {
            return None;
        }
        self.refs
            .iter()
            .enumerate()
            .find(|(_, reference)| reference.id == id)
            .map(|(index, reference)| (reference, index))
    }

    /// Remove every reference
    pub fn clear(&mut self) {
        self.refs.clear();
        self.version = None;
    }

    /// Number of references
    pub fn len(&self) -> usize {
        self.refs.len()
    }

    /// Whether the registry holds no references
    pub fn is_empty(&self) -> bool {
        self.refs.is_empty()
    }

    /// References in file order
    pub fn iter(&self) -> impl Iterator<Item = &MusicReference> {
        self.refs.iter()
    }

    /// Version triple from the last loaded file, if it declared one
    pub fn version(&self) -> Option<[f32; 3]> {
        self.version
    }
}

/// Lines with trailing backslash continuations joined, tagged with the
/// 1-based number of the line they started on
fn logical_lines(contents: &str) -> Vec<(usize, String)> {
    let mut lines = Vec::new();
    let mut pending: Option<(usize, String)> = None;

    for (index, raw) in contents.lines().enumerate() {
        let raw = raw.trim_end();
        let (text, continues) = match raw.strip_suffix('\\') {
            Some(text) => (text, true),
            None => (raw, false),
        };

        let (start, mut line) = pending.take().unwrap_or_else(|| (index + 1, String::new()));
        line.push_str(text);

        if continues {
            pending = Some((start, line));
        } else {
            lines.push((start, line));
        }
    }

    if let Some(line) = pending {
        lines.push(line);
    }
    lines
}

/// Split `Name = value` or `Name value` into its two halves
fn split_directive(line: &str) -> (&str, &str) {
    let end = line
        .find(|c: char| c.is_whitespace() || c == '=')
        .unwrap_or(line.len());
    let (name, rest) = line.split_at(end);

    let rest = rest.trim_start();
    let rest = rest.strip_prefix('=').unwrap_or(rest);
    (name, rest.trim())
}

/// Leading integer of a value, 0 when there is none
fn parse_int(value: &str) -> MusicId {
    let value = value.trim_start();
    let digits_end = value
        .char_indices()
        .find(|&(i, c)| !(c.is_ascii_digit() || (i == 0 && (c == '-' || c == '+'))))
        .map_or(value.len(), |(i, _)| i);
    value[..digits_end].parse().unwrap_or(0)
}

/// Leading decimal number of a value, 0.0 when there is none
fn parse_float(token: &str) -> f32 {
    let end = token
        .char_indices()
        .find(|&(i, c)| !(c.is_ascii_digit() || c == '.' || (i == 0 && (c == '-' || c == '+'))))
        .map_or(token.len(), |(i, _)| i);
    token[..end].parse().unwrap_or(0.0)
}
