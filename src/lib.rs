// src/lib.rs
//! `layout_core`: a deterministic, renderer-agnostic graph layout engine.
//!
//! Two independent algorithm families share one [`GraphQuery`] input and one
//! [`LayoutIr`] output (spec §2): a hierarchical Sugiyama pipeline for
//! directed acyclic graphs (cycle-break, layering, dummy-node inflation,
//! crossing reduction, positioning, edge routing — `sugiyama`), and a
//! Fruchterman-Reingold force-directed engine with optional Barnes-Hut
//! acceleration for general graphs (`force`). Both converge on IR assembly
//! (spec §4.9).
//!
//! The one entry point is [`layout`]: it validates the input against the
//! selected [`Requirements`], then dispatches to whichever engine
//! `config.algorithm` names.

pub mod config;
pub mod error;
pub mod fixed;
pub mod force;
pub mod graph;
pub mod ir;
pub mod sugiyama;
pub mod validation;

#[cfg(test)]
mod tests;

pub use config::{Algorithm, Config, Requirements};
pub use error::{LayoutCoreError, Result, ValidationFailures};
pub use graph::{Graph, GraphQuery};
pub use ir::{EdgePath, LayoutEdge, LayoutIr, LayoutNode, NodeKind};

/// Run one layout call end to end (spec §4.1 "one entry point `layout(graph,
/// config) -> IR | Error`"). Unless `config.skip_validation` is set, the
/// input is checked against `requirements` first and every failing
/// precondition is reported together (spec §7 "Propagation").
pub fn layout(
    graph: &impl GraphQuery,
    config: &Config,
    requirements: Requirements,
) -> Result<LayoutIr> {
    if !config.skip_validation {
        let failures = validation::validate(graph, requirements);
        if !failures.is_empty() {
            if failures.contains(ValidationFailures::EMPTY) {
                return Err(LayoutCoreError::EmptyGraph);
            }
            if failures.contains(ValidationFailures::HAS_CYCLE) {
                return Err(LayoutCoreError::CycleDetected);
            }
            if failures.contains(ValidationFailures::HAS_UNDIRECTED_EDGES)
                || failures.contains(ValidationFailures::HAS_DIRECTED_EDGES)
            {
                return Err(LayoutCoreError::EdgeDirectionMismatch);
            }
            if failures.contains(ValidationFailures::DISCONNECTED) {
                return Err(LayoutCoreError::DisconnectedGraph {
                    count: validation::connected_components(graph),
                });
            }
            return Err(LayoutCoreError::Validation(failures));
        }
    }

    match &config.algorithm {
        Algorithm::Sugiyama(options) => {
            sugiyama::run(graph, options, config.node_spacing, config.level_spacing)
        }
        Algorithm::FruchtermanReingold { variant, params } => {
            let routing = match options_routing(config) {
                Some(r) => r,
                None => config::EdgeRouting::Direct,
            };
            force::run(graph, *variant, params, routing)
        }
    }
}

/// FDG has no dedicated routing field on `Config` today (spec only
/// specifies routing as a Sugiyama concern, §4.1), but §4.8's last
/// paragraph allows callers to request spline routing for FDG edges too.
/// `Config` doesn't carry that knob yet, so this always resolves to
/// `Direct`; kept as a seam so a future `Config::fdg_routing` can plug in
/// without changing `layout`'s signature.
fn options_routing(_config: &Config) -> Option<config::EdgeRouting> {
    None
}
