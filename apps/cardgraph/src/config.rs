//! # Configuration
//!
//! `cardgraph.toml` layout, page presets and option resolution.
//!
//! Every graph option is resolved with the precedence
//! CLI flag > config file (view, then `[graph]`) > preset > built-in default.

use cardgraph_core::primitives::{DEFAULT_DELIMITER, DEFAULT_ID_COLUMN, DEFAULT_MIN_SHARED_FEATURES};
use cardgraph_core::{
    BuildConfig, CardGraphError, ColorBy, FeatureColumn, LayoutSettings, PairStrategy,
    RenderSettings,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Default figure title when no preset names one.
pub const DEFAULT_TITLE: &str = "Knowledge Graph";

/// Default static figure size in pixels.
pub const DEFAULT_FIGURE_SIZE: (u32, u32) = (1200, 800);

// =============================================================================
// PRESETS
// =============================================================================

/// Graph settings of the three catalogue pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Preset {
    Datasets,
    Publications,
    Code,
}

impl FromStr for Preset {
    type Err = CardGraphError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "datasets" => Ok(Preset::Datasets),
            "publications" => Ok(Preset::Publications),
            "code" => Ok(Preset::Code),
            other => Err(CardGraphError::InvalidConfig(format!(
                "Unknown preset '{}'. Use: datasets, publications, code",
                other
            ))),
        }
    }
}

impl Preset {
    /// The preset's graph options, fully populated.
    #[must_use]
    pub fn options(self) -> GraphOptions {
        let (id, delimiter, features, color_by, title): (&str, &str, &[&str], ColorBy, &str) =
            match self {
                Preset::Datasets => (
                    "Study Name",
                    ";",
                    &["Coarse Data Types", "Granular Data Types", "Diseases Included"],
                    ColorBy::FairCompliance,
                    "Dataset Knowledge Graph",
                ),
                Preset::Publications => (
                    "Publication ID",
                    ";",
                    &["Study Name", "Diseases Included"],
                    ColorBy::Completeness,
                    "Publication Network",
                ),
                Preset::Code => (
                    "Repo ID",
                    ",",
                    &["Languages", "Data Types", "Tooling", "FAIR Issues", "Diseases Included"],
                    ColorBy::FairCompliance,
                    "Code Repository Network",
                ),
            };

        GraphOptions {
            preset: Some(self),
            id_column: Some(id.to_string()),
            delimiter: Some(delimiter.to_string()),
            features: Some(features.iter().map(|f| FeatureColumn::new(*f)).collect()),
            color_by: Some(color_by),
            title: Some(title.to_string()),
            ..GraphOptions::default()
        }
    }
}

// =============================================================================
// FILE LAYOUT
// =============================================================================

/// Partially specified graph options. Every layer (CLI, file, view,
/// preset) produces one of these; `or` stacks them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphOptions {
    pub preset: Option<Preset>,
    pub id_column: Option<String>,
    pub delimiter: Option<String>,
    pub min_shared_features: Option<usize>,
    pub min_degree: Option<usize>,
    pub max_nodes: Option<usize>,
    pub strategy: Option<PairStrategy>,
    pub features: Option<Vec<FeatureColumn>>,
    pub color_by: Option<ColorBy>,
    pub title: Option<String>,
}

impl GraphOptions {
    /// Fill every unset field of `self` from `lower`.
    #[must_use]
    pub fn or(self, lower: GraphOptions) -> GraphOptions {
        GraphOptions {
            preset: self.preset.or(lower.preset),
            id_column: self.id_column.or(lower.id_column),
            delimiter: self.delimiter.or(lower.delimiter),
            min_shared_features: self.min_shared_features.or(lower.min_shared_features),
            min_degree: self.min_degree.or(lower.min_degree),
            max_nodes: self.max_nodes.or(lower.max_nodes),
            strategy: self.strategy.or(lower.strategy),
            features: self.features.or(lower.features),
            color_by: self.color_by.or(lower.color_by),
            title: self.title.or(lower.title),
        }
    }
}

/// `[render]` section.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderSection {
    pub title: Option<String>,
    pub color_by: Option<ColorBy>,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

impl RenderSection {
    /// Static figure `(width, height)`, defaults filled in.
    #[must_use]
    pub fn figure_size(&self) -> (u32, u32) {
        (
            self.width.unwrap_or(DEFAULT_FIGURE_SIZE.0),
            self.height.unwrap_or(DEFAULT_FIGURE_SIZE.1),
        )
    }
}

/// One `[[views]]` entry of a batch run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewSection {
    pub name: String,
    pub table: PathBuf,
    #[serde(flatten)]
    pub graph: GraphOptions,
}

/// The whole `cardgraph.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigFile {
    pub graph: GraphOptions,
    pub layout: LayoutSettings,
    pub render: RenderSection,
    pub views: Vec<ViewSection>,
}

impl ConfigFile {
    /// Parse TOML text.
    pub fn parse(text: &str) -> Result<Self, CardGraphError> {
        toml::from_str(text).map_err(|e| CardGraphError::InvalidConfig(format!("Invalid TOML: {}", e)))
    }

    /// Read and parse a config file.
    ///
    /// Relative view table paths are resolved against the file's directory.
    pub fn load(path: &Path) -> Result<Self, CardGraphError> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| CardGraphError::Io(format!("Cannot read config '{}': {}", path.display(), e)))?;
        let mut config = Self::parse(&text)?;

        let base = path.parent().unwrap_or(Path::new("."));
        for view in &mut config.views {
            if view.table.is_relative() {
                view.table = base.join(&view.table);
            }
        }
        Ok(config)
    }

    /// The file layer for a view: its own keys over `[graph]` and `[render]`.
    #[must_use]
    pub fn layer(&self, view: Option<&ViewSection>) -> GraphOptions {
        let render = GraphOptions {
            color_by: self.render.color_by,
            title: self.render.title.clone(),
            ..GraphOptions::default()
        };
        let base = self.graph.clone().or(render);
        match view {
            Some(v) => v.graph.clone().or(base),
            None => base,
        }
    }
}

// =============================================================================
// RESOLUTION
// =============================================================================

/// Fully resolved options for one graph.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedOptions {
    pub build: BuildConfig,
    pub min_degree: usize,
    pub max_nodes: usize,
    pub color_by: ColorBy,
    pub title: String,
    pub render: RenderSettings,
}

/// Stack `cli` over `file`, then the preset either names, then defaults.
pub fn resolve(
    cli: GraphOptions,
    file: GraphOptions,
    layout: LayoutSettings,
) -> Result<ResolvedOptions, CardGraphError> {
    let stacked = cli.or(file);
    let preset = stacked.preset.map(Preset::options).unwrap_or_default();
    let options = stacked.or(preset);

    let build = BuildConfig {
        id_column: options
            .id_column
            .unwrap_or_else(|| DEFAULT_ID_COLUMN.to_string()),
        feature_columns: options.features.unwrap_or_default(),
        delimiter: options
            .delimiter
            .unwrap_or_else(|| DEFAULT_DELIMITER.to_string()),
        min_shared_features: options
            .min_shared_features
            .unwrap_or(DEFAULT_MIN_SHARED_FEATURES),
        strategy: options.strategy.unwrap_or_default(),
    };
    build.validate()?;

    Ok(ResolvedOptions {
        build,
        min_degree: options.min_degree.unwrap_or(0),
        max_nodes: options.max_nodes.unwrap_or(0),
        color_by: options.color_by.unwrap_or_default(),
        title: options.title.unwrap_or_else(|| DEFAULT_TITLE.to_string()),
        render: RenderSettings {
            layout,
            ..RenderSettings::default()
        },
    })
}

// =============================================================================
// TESTS
// =============================================================================
