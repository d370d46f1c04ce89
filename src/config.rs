use serde::{Deserialize, Serialize};
use std::f32::consts::PI;
use std::path::Path;

/// Box profile for one tree level.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DimensionProfile {
    pub char_width: f32,
    pub padding: f32,
    pub min_width: f32,
    pub max_width: f32,
    pub height: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DimensionConfig {
    pub root_width: f32,
    pub root_height: f32,
    /// Profiles for levels 1, 2, 3...; deeper levels reuse the last entry.
    pub profiles: Vec<DimensionProfile>,
}

impl Default for DimensionConfig {
    fn default() -> Self {
        Self {
            root_width: 360.0,
            root_height: 140.0,
            profiles: vec![
                DimensionProfile {
                    char_width: 9.0,
                    padding: 48.0,
                    min_width: 180.0,
                    max_width: 320.0,
                    height: 90.0,
                },
                DimensionProfile {
                    char_width: 7.5,
                    padding: 40.0,
                    min_width: 160.0,
                    max_width: 280.0,
                    height: 70.0,
                },
                DimensionProfile {
                    char_width: 7.0,
                    padding: 32.0,
                    min_width: 140.0,
                    max_width: 240.0,
                    height: 60.0,
                },
            ],
        }
    }
}

/// How the circle is shared between top-level branches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectorWeighting {
    /// Every branch weighs 1.
    Uniform,
    /// Branches weigh 1 + their descendant count.
    SubtreeSize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RadialConfig {
    /// Ring radius of the theme tier (R1).
    pub theme_radius: f32,
    /// Angular gap between neighbouring sectors, in radians.
    pub sector_gap: f32,
    pub min_sector_span: f32,
    pub weighting: SectorWeighting,
    /// Mid angle of the first sector, in radians.
    pub start_angle: f32,
    /// Branches with more direct children are split into pseudo-branches.
    pub max_children_per_branch: usize,
    /// Linear gap between packed siblings.
    pub child_gap: f32,
    pub base_utilization: f32,
    pub utilization_per_child: f32,
    pub min_utilization: f32,
    pub max_utilization: f32,
    /// Extra clearance between a parent box and its children's ring.
    pub ring_margin: f32,
    /// Cap on how far past the clearance radius a packed ring may grow.
    pub max_ring_growth: f32,
}

impl Default for RadialConfig {
    fn default() -> Self {
        Self {
            theme_radius: 600.0,
            sector_gap: 0.06,
            min_sector_span: 0.35,
            weighting: SectorWeighting::Uniform,
            start_angle: 0.0,
            max_children_per_branch: 12,
            child_gap: 28.0,
            base_utilization: 0.3,
            utilization_per_child: 0.08,
            min_utilization: 0.45,
            max_utilization: 0.85,
            ring_margin: 60.0,
            max_ring_growth: 1200.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollisionConfig {
    /// Minimum clearance kept between same-level boxes.
    pub margin: f32,
    /// Radial distance a node is pushed per detected overlap.
    pub step: f32,
    pub max_iterations: usize,
}

impl Default for CollisionConfig {
    fn default() -> Self {
        Self {
            margin: 12.0,
            step: 24.0,
            max_iterations: 400,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JitterConfig {
    /// Maximum angular offset either side, in radians.
    pub angular: f32,
    /// Maximum outward radial offset.
    pub radial: f32,
}

impl Default for JitterConfig {
    fn default() -> Self {
        Self {
            angular: 0.015,
            radial: 10.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForceConfig {
    /// Trees of a few hundred nodes settle within the default budget. Larger
    /// ones may need more iterations or a looser threshold.
    pub max_iterations: usize,
    /// Largest per-node force magnitude at which the simulation counts as settled.
    /// At the default spring and hierarchy strengths a residual of 0.5 leaves
    /// nodes within a few pixels of equilibrium.
    pub convergence_threshold: f32,
    pub repulsion: f32,
    pub spring: f32,
    pub ideal_link_length: f32,
    /// Ring radius per level used by the hierarchy force and initial placement.
    pub level_spacing: f32,
    pub hierarchy: f32,
    pub centering: f32,
    /// Fraction of velocity kept between steps.
    pub damping: f32,
    pub time_step: f32,
    pub max_displacement: f32,
    /// Distances below this are clamped before computing repulsion.
    pub min_distance: f32,
    pub mass_per_child: f32,
    /// Initial angular jitter as a fraction of each node's ring slot.
    pub initial_jitter: f32,
    pub resolve_collisions: bool,
    pub route_edges: bool,
}

impl Default for ForceConfig {
    fn default() -> Self {
        Self {
            max_iterations: 1000,
            convergence_threshold: 0.5,
            repulsion: 20_000.0,
            spring: 0.05,
            ideal_link_length: 220.0,
            level_spacing: 220.0,
            hierarchy: 0.03,
            centering: 0.0005,
            damping: 0.6,
            time_step: 1.0,
            max_displacement: 60.0,
            min_distance: 10.0,
            mass_per_child: 0.5,
            initial_jitter: 0.15,
            resolve_collisions: true,
            route_edges: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoutingConfig {
    /// Intermediate points sampled per edge.
    pub samples: usize,
    pub clearance: f32,
    pub max_push_steps: usize,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            samples: 4,
            clearance: 16.0,
            max_push_steps: 8,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub dimensions: DimensionConfig,
    pub radial: RadialConfig,
    pub collision: CollisionConfig,
    pub jitter: JitterConfig,
    pub force: ForceConfig,
    pub routing: RoutingConfig,
    pub bounds_padding: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            dimensions: DimensionConfig::default(),
            radial: RadialConfig::default(),
            collision: CollisionConfig::default(),
            jitter: JitterConfig::default(),
            force: ForceConfig::default(),
            routing: RoutingConfig::default(),
            bounds_padding: 80.0,
        }
    }
}

impl LayoutConfig {
    /// Full circle available to sectors once every inter-sector gap is taken out.
    pub fn available_sweep(&self, branches: usize) -> f32 {
        (2.0 * PI - self.radial.sector_gap * branches as f32).max(0.0)
    }
}

/// Loads a partial JSON/JSON5 config on top of the defaults. `None` returns
/// the defaults unchanged.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<LayoutConfig> {
    let Some(path) = path else {
        return Ok(LayoutConfig::default());
    };
    let contents = std::fs::read_to_string(path)?;
    parse_config(&contents)
}

pub fn parse_config(contents: &str) -> anyhow::Result<LayoutConfig> {
    let config: LayoutConfig = json5::from_str(contents)?;
    Ok(config)
}
