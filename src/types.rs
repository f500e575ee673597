use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::Deserialize;

/// Frontend source language an installed package or the project can ship.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Lang {
    Js,
    Less,
    Styl,
}

impl Lang {
    pub const ALL: [Lang; 3] = [Lang::Js, Lang::Less, Lang::Styl];

    /// Short tag, which is also the file extension (`js`, `less`, `styl`).
    pub fn tag(self) -> &'static str {
        match self {
            Lang::Js => "js",
            Lang::Less => "less",
            Lang::Styl => "styl",
        }
    }

    /// Directory name under `static/` where packages keep this language.
    pub fn static_dir_name(self) -> &'static str {
        match self {
            Lang::Js => "js",
            Lang::Less => "less",
            Lang::Styl => "stylus",
        }
    }

    /// `index.<ext>`
    pub fn index_file_name(self) -> String {
        format!("index.{}", self.tag())
    }

    /// `<root>/static/<dir>`: the asset directory a package would expose.
    pub fn asset_dir(self, package_root: &Path) -> PathBuf {
        package_root.join("static").join(self.static_dir_name())
    }

    /// `<root>/static/<dir>/index.<ext>`: the asset marker.
    pub fn marker(self, package_root: &Path) -> PathBuf {
        self.asset_dir(package_root).join(self.index_file_name())
    }

    pub fn family(self) -> AssetFamily {
        match self {
            Lang::Js => AssetFamily::Js,
            Lang::Less | Lang::Styl => AssetFamily::Css,
        }
    }

    /// Language a source file belongs to, judged by its extension.
    pub fn from_path(path: &Path) -> Option<Lang> {
        let ext = path.extension()?.to_str()?;
        Lang::ALL.into_iter().find(|lang| lang.tag() == ext)
    }
}

impl fmt::Display for Lang {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Class of bundle produced by the build step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetFamily {
    Css,
    Js,
}

impl AssetFamily {
    pub fn bundle_file_name(self) -> &'static str {
        match self {
            AssetFamily::Css => "bundle.css",
            AssetFamily::Js => "bundle.js",
        }
    }

    /// Trailing path components that mark an output directory.
    pub fn output_dir_suffix(self) -> &'static str {
        match self {
            AssetFamily::Css => "static/css",
            AssetFamily::Js => "static/js",
        }
    }
}

/// What to do when a project has both an `index.less` and an `index.styl`.
///
/// - `Combine`: build Less first, then append Stylus output to the same
///   `bundle.css` (default).
/// - `Exclusive`: refuse to build, the project must pick one preprocessor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StylesheetMode {
    #[default]
    Combine,
    Exclusive,
}

impl FromStr for StylesheetMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "combine" => Ok(StylesheetMode::Combine),
            "exclusive" => Ok(StylesheetMode::Exclusive),
            other => Err(format!(
                "invalid stylesheet_mode: {other} (expected \"combine\" or \"exclusive\")"
            )),
        }
    }
}
