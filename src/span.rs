use rustc_hash::FxHashMap;
use std::{
    ops::Range,
    path::{Path, PathBuf},
    sync::atomic::{AtomicUsize, Ordering},
};
use ustr::Ustr;

/// Identifies a source text: a module file, or a snippet given on the
/// command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SourceId(Ustr);

impl SourceId {
    pub fn new(name: &str) -> Self {
        Self(Ustr::from(name))
    }

    pub fn new_snippet() -> Self {
        static NEXT_NUM: AtomicUsize = AtomicUsize::new(0);
        let num = NEXT_NUM.fetch_add(1, Ordering::SeqCst);
        Self::new(&format!("#snippet.{num}"))
    }

    pub fn name(&self) -> Ustr {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Span {
    source: SourceId,
    start: usize,
    end: usize,
}

impl Span {
    pub fn new(source: SourceId, start: usize, end: usize) -> Self {
        assert!(start <= end);
        Self { source, start, end }
    }

    pub fn from_range(source: SourceId, range: Range<usize>) -> Self {
        Self::new(source, range.start, range.end)
    }

    pub fn source(&self) -> SourceId {
        self.source
    }

    pub fn start(&self) -> usize {
        self.start
    }

    pub fn end(&self) -> usize {
        self.end
    }

    pub fn bytes(&self) -> Range<usize> {
        self.start..self.end
    }

    /// Moves the span right by `offset` bytes, for spans measured inside a
    /// piece of a larger text.
    pub fn shifted(&self, offset: usize) -> Self {
        Self::new(self.source, self.start + offset, self.end + offset)
    }
}

/// Stores the text of all the loaded sources.
pub struct SourceCache {
    root_dir: PathBuf,
    sources: FxHashMap<SourceId, String>,
}

impl SourceCache {
    pub fn new(root_dir: PathBuf) -> Self {
        Self {
            root_dir,
            sources: FxHashMap::default(),
        }
    }

    /// The id of a file, relative to the root directory when possible.
    pub fn id_for_path(&self, path: &Path) -> SourceId {
        let relative = path.strip_prefix(&self.root_dir).unwrap_or(path);
        SourceId::new(&relative.to_string_lossy())
    }

    /// Adds a source. Re-adding an id replaces its text.
    pub fn add(&mut self, id: SourceId, text: String) {
        self.sources.insert(id, text);
    }

    pub fn get_text(&self, id: SourceId) -> Option<&str> {
        self.sources.get(&id).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_relative_to_the_root() {
        let cache = SourceCache::new(PathBuf::from("/project"));
        let id = cache.id_for_path(Path::new("/project/sets.toml"));
        assert_eq!(id.name().as_str(), "sets.toml");

        let id = cache.id_for_path(Path::new("/elsewhere/logic.toml"));
        assert_eq!(id.name().as_str(), "/elsewhere/logic.toml");
    }

    #[test]
    fn snippets_get_fresh_ids() {
        assert_ne!(SourceId::new_snippet(), SourceId::new_snippet());
    }

    #[test]
    fn shifted_spans() {
        let id = SourceId::new("m");
        let span = Span::from_range(id, 2..5).shifted(10);
        assert_eq!(span.bytes(), 12..15);
        assert_eq!(span.source(), id);
    }
}
