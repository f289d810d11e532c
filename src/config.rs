use std::fmt;
use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::data::loader::DEFAULT_DATA_FILE;

// ---------------------------------------------------------------------------
// Layout – how the dashboard sections are arranged
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Layout {
    /// One section at a time, switched with tabs.
    #[default]
    Tabs,
    /// Every section stacked in a single scrolling page.
    Sections,
    /// Headline figures, production charts and the data table only.
    Minimal,
}

impl Layout {
    pub const ALL: [Layout; 3] = [Layout::Tabs, Layout::Sections, Layout::Minimal];

    pub fn label(self) -> &'static str {
        match self {
            Layout::Tabs => "Tabs",
            Layout::Sections => "Sections",
            Layout::Minimal => "Minimal",
        }
    }
}

impl fmt::Display for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// Command line
// ---------------------------------------------------------------------------

/// Startup options. Every flag can also come from the environment.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "libros-latam",
    version,
    about = "Latin American publishing market dashboard (2000-2025)"
)]
pub struct Config {
    /// Dataset opened at startup (.csv, .json or .parquet).
    #[arg(short, long, env = "LIBROS_DATA", default_value = DEFAULT_DATA_FILE)]
    pub data: PathBuf,

    /// Initial arrangement of the dashboard sections.
    #[arg(short, long, env = "LIBROS_LAYOUT", value_enum, default_value_t = Layout::Tabs)]
    pub layout: Layout,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_definition_is_consistent() {
        Config::command().debug_assert();
    }

    #[test]
    fn parses_flags() {
        let cfg =
            Config::try_parse_from(["libros-latam", "--data", "x.parquet", "--layout", "minimal"])
                .unwrap();
        assert_eq!(cfg.data, PathBuf::from("x.parquet"));
        assert_eq!(cfg.layout, Layout::Minimal);
    }

    #[test]
    fn rejects_unknown_layout() {
        assert!(Config::try_parse_from(["libros-latam", "--layout", "grid"]).is_err());
    }
}
