//! Solver core for a two-dimensional guillotine cutting-stock problem with
//! plate defects and ordered item stacks.
//!
//! A cutting plan is built incrementally: [`solution::Solution`] holds one
//! partial plan as an append-only cut tree plus its four-level cut front,
//! [`insertion`] enumerates every legal next move from it, and
//! [`dominance`] provides the partial order used to prune search branches.
//! [`solver::Solver`] is a beam-search driver over those primitives;
//! [`export`] and [`render`] are read-only projections of a finished plan.

pub mod dominance;
pub mod export;
pub mod geometry;
pub mod insertion;
pub mod instance;
pub mod params;
pub mod render;
pub mod solution;
pub mod solver;
pub mod types;
