// src/config.rs
//! Algorithm dispatch and configuration (spec §4.1). Grounded in the
//! teacher's `DagreLayoutOptions`/`ForceLayoutOptions` + `presets.rs` shape:
//! plain option structs with a `Default` impl, plus named preset
//! constructors layered on top.

use crate::sugiyama::crossing::ReducerSpec;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layering {
    LongestPath,
    NetworkSimplex,
    NetworkSimplexFast,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Positioning {
    Compact,
    Barycentric,
    BrandesKopf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeRouting {
    Direct,
    Spline,
}

#[derive(Debug, Clone)]
pub struct SugiyamaOptions {
    pub layering: Layering,
    pub crossing_reducers: Vec<ReducerSpec>,
    pub positioning: Positioning,
    pub routing: EdgeRouting,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrVariant {
    Exact,
    BarnesHut,
}

#[derive(Debug, Clone, Copy)]
pub struct FrParams {
    pub max_iterations: u32,
    /// Ideal spring length `k`, in grid cells.
    pub k: u32,
    pub decay_percent: u32,
    /// `min_displacement` threshold, expressed as a Q16.16-friendly
    /// thousandths value (10 == 0.010) so the struct stays pure-integer at
    /// the config layer; the simulation converts it to `Fixed` once.
    pub min_displacement_milli: u32,
    pub theta_percent: u32,
    pub gravity: Option<GravityKind>,
    pub lin_log_attraction: bool,
    pub seed: u64,
}

#[derive(Debug, Clone, Copy)]
pub enum GravityKind {
    Linear { strength_percent: u32 },
    Strong { strength_percent: u32 },
}

impl Default for FrParams {
    fn default() -> Self {
        FrParams {
            max_iterations: 300,
            k: 10,
            decay_percent: 95,
            min_displacement_milli: 10,
            theta_percent: 80,
            gravity: None,
            lin_log_attraction: false,
            seed: 42,
        }
    }
}

#[derive(Debug, Clone)]
pub enum Algorithm {
    Sugiyama(SugiyamaOptions),
    FruchtermanReingold {
        variant: FrVariant,
        params: FrParams,
    },
}

/// Common parameters shared by both engines (spec §4.1).
#[derive(Debug, Clone)]
pub struct Config {
    pub algorithm: Algorithm,
    /// Horizontal gap, in cells.
    pub node_spacing: u32,
    /// Vertical gap, in cells.
    pub level_spacing: u32,
    pub skip_validation: bool,
}

/// What a preset (or caller) requires of the input graph before running
/// (spec §4.1 "Requirements set").
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Requirements {
    pub non_empty: bool,
    pub acyclic: bool,
    pub all_directed: bool,
    /// None of the named presets set this (spec §8 scenario 5: disconnected
    /// input succeeds under `sugiyama.standard`); it exists for callers that
    /// build a custom `Requirements` for an algorithm that does need one
    /// component (spec §7 `E.Graph.Component.003`).
    pub requires_connected: bool,
}

impl Requirements {
    pub const NONE: Requirements = Requirements {
        non_empty: false,
        acyclic: false,
        all_directed: false,
        requires_connected: false,
    };
}

/// Named configurations (spec §4.1: `sugiyama.standard / fast / quality`,
/// `fdg.standard / fast`), each paired with the `Requirements` its algorithm
/// needs. Grounded in the teacher's `presets.rs` (named constructors
/// returning fully-populated option structs).
pub mod presets {
    use super::*;
    use crate::sugiyama::crossing;

    pub fn sugiyama_standard() -> (Config, Requirements) {
        (
            Config {
                algorithm: Algorithm::Sugiyama(SugiyamaOptions {
                    layering: Layering::LongestPath,
                    crossing_reducers: crossing::preset_balanced(),
                    positioning: Positioning::Barycentric,
                    routing: EdgeRouting::Direct,
                }),
                node_spacing: 2,
                level_spacing: 1,
                skip_validation: false,
            },
            Requirements {
                non_empty: true,
                acyclic: true,
                all_directed: false,
                requires_connected: false,
            },
        )
    }

    pub fn sugiyama_fast() -> (Config, Requirements) {
        (
            Config {
                algorithm: Algorithm::Sugiyama(SugiyamaOptions {
                    layering: Layering::LongestPath,
                    crossing_reducers: crossing::preset_fast(),
                    positioning: Positioning::Compact,
                    routing: EdgeRouting::Direct,
                }),
                node_spacing: 2,
                level_spacing: 1,
                skip_validation: false,
            },
            Requirements {
                non_empty: true,
                acyclic: true,
                all_directed: false,
                requires_connected: false,
            },
        )
    }

    pub fn sugiyama_quality() -> (Config, Requirements) {
        (
            Config {
                algorithm: Algorithm::Sugiyama(SugiyamaOptions {
                    layering: Layering::NetworkSimplexFast,
                    crossing_reducers: crossing::preset_quality(),
                    positioning: Positioning::BrandesKopf,
                    routing: EdgeRouting::Spline,
                }),
                node_spacing: 2,
                level_spacing: 1,
                skip_validation: false,
            },
            Requirements {
                non_empty: true,
                acyclic: true,
                all_directed: false,
                requires_connected: false,
            },
        )
    }

    pub fn fdg_standard() -> (Config, Requirements) {
        (
            Config {
                algorithm: Algorithm::FruchtermanReingold {
                    variant: FrVariant::BarnesHut,
                    params: FrParams::default(),
                },
                node_spacing: 2,
                level_spacing: 1,
                skip_validation: false,
            },
            Requirements {
                non_empty: true,
                acyclic: false,
                all_directed: false,
                requires_connected: false,
            },
        )
    }

    pub fn fdg_fast() -> (Config, Requirements) {
        (
            Config {
                algorithm: Algorithm::FruchtermanReingold {
                    variant: FrVariant::BarnesHut,
                    params: FrParams {
                        max_iterations: 100,
                        ..FrParams::default()
                    },
                },
                node_spacing: 2,
                level_spacing: 1,
                skip_validation: false,
            },
            Requirements {
                non_empty: true,
                acyclic: false,
                all_directed: false,
                requires_connected: false,
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sugiyama_standard_requires_acyclic_non_empty() {
        let (_, reqs) = presets::sugiyama_standard();
        assert!(reqs.non_empty);
        assert!(reqs.acyclic);
        assert!(!reqs.all_directed);
    }

    #[test]
    fn fdg_standard_does_not_require_acyclic() {
        let (_, reqs) = presets::fdg_standard();
        assert!(!reqs.acyclic);
    }
}
