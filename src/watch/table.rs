// src/watch/table.rs

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use tracing::{debug, trace};

use crate::fs::FileSystem;
use crate::types::{AssetFamily, Lang};
use crate::watch::patterns::ExcludeSet;

/// Languages whose sources changed since the previous poll.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeSet {
    changed: BTreeSet<Lang>,
}

impl ChangeSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mark(&mut self, lang: Lang) {
        self.changed.insert(lang);
    }

    pub fn contains(&self, lang: Lang) -> bool {
        self.changed.contains(&lang)
    }

    pub fn is_empty(&self) -> bool {
        self.changed.is_empty()
    }

    /// Whether any language of `family` changed.
    pub fn touches(&self, family: AssetFamily) -> bool {
        self.changed.iter().any(|lang| lang.family() == family)
    }
}

impl FromIterator<Lang> for ChangeSet {
    fn from_iter<T: IntoIterator<Item = Lang>>(iter: T) -> Self {
        Self {
            changed: iter.into_iter().collect(),
        }
    }
}

/// Last observed modification time of every watched source file, per
/// language.
///
/// Timestamps only move forward: recording an older time than the one
/// already stored is a no-op. Paths matching the exclude set are never
/// stored, which is what keeps a freshly written bundle from triggering its
/// own rebuild.
#[derive(Debug, Clone)]
pub struct WatchTable {
    tables: BTreeMap<Lang, BTreeMap<PathBuf, SystemTime>>,
    exclude: ExcludeSet,
}

impl Default for WatchTable {
    fn default() -> Self {
        Self::new(ExcludeSet::empty())
    }
}

impl WatchTable {
    pub fn new(exclude: ExcludeSet) -> Self {
        Self {
            tables: BTreeMap::new(),
            exclude,
        }
    }

    /// Record `mtime` for `path`. Returns true if the table changed.
    pub fn record(&mut self, lang: Lang, path: &Path, mtime: SystemTime) -> bool {
        if self.exclude.is_excluded(path) {
            trace!(?path, "not watching excluded path");
            return false;
        }

        let table = self.tables.entry(lang).or_default();
        match table.get_mut(path) {
            Some(seen) if *seen >= mtime => false,
            Some(seen) => {
                *seen = mtime;
                true
            }
            None => {
                table.insert(path.to_path_buf(), mtime);
                true
            }
        }
    }

    /// Record a file by reading its modification time from `fs`. Files that
    /// aren't JS, Less or Stylus are ignored.
    pub fn record_from_fs(&mut self, fs: &dyn FileSystem, path: &Path) -> anyhow::Result<bool> {
        let Some(lang) = Lang::from_path(path) else {
            return Ok(false);
        };
        let mtime = fs.modified(path)?;
        Ok(self.record(lang, path, mtime))
    }

    pub fn last_seen(&self, lang: Lang, path: &Path) -> Option<SystemTime> {
        self.tables.get(&lang).and_then(|t| t.get(path)).copied()
    }

    pub fn len(&self, lang: Lang) -> usize {
        self.tables.get(&lang).map_or(0, BTreeMap::len)
    }

    pub fn total_len(&self) -> usize {
        self.tables.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.total_len() == 0
    }

    /// Compare every watched path against the filesystem.
    ///
    /// Newer timestamps are stored and mark their language as changed.
    /// Files that disappeared are dropped from the table.
    pub fn poll(&mut self, fs: &dyn FileSystem) -> ChangeSet {
        let mut changes = ChangeSet::new();

        for (lang, table) in self.tables.iter_mut() {
            let mut vanished = Vec::new();

            for (path, seen) in table.iter_mut() {
                match fs.modified(path) {
                    Ok(current) if current > *seen => {
                        debug!(?path, %lang, "source changed");
                        *seen = current;
                        changes.mark(*lang);
                    }
                    Ok(_) => {}
                    Err(err) => {
                        debug!(?path, error = %err, "watched file vanished; forgetting it");
                        vanished.push(path.clone());
                    }
                }
            }

            for path in vanished {
                table.remove(&path);
            }
        }

        changes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn t(secs: u64) -> SystemTime {
        SystemTime::UNIX_EPOCH + Duration::from_secs(secs)
    }

    #[test]
    fn older_timestamps_never_replace_newer_ones() {
        let mut table = WatchTable::default();
        let path = Path::new("/p/a.js");

        assert!(table.record(Lang::Js, path, t(10)));
        assert!(!table.record(Lang::Js, path, t(5)));
        assert!(!table.record(Lang::Js, path, t(10)));
        assert_eq!(table.last_seen(Lang::Js, path), Some(t(10)));
        assert!(table.record(Lang::Js, path, t(11)));
        assert_eq!(table.last_seen(Lang::Js, path), Some(t(11)));
    }

    #[test]
    fn change_set_families() {
        let changes: ChangeSet = [Lang::Styl].into_iter().collect();
        assert!(changes.touches(AssetFamily::Css));
        assert!(!changes.touches(AssetFamily::Js));
    }
}
