//! Outer search driver: iterative-widening beam search over partial
//! solutions, consuming the insertion generator and pruning dominated
//! fronts. Branch forking is whole-value cloning; the core stays
//! single-threaded and checks the deadline between generation calls.

use crate::dominance::{Front, SolutionCompare, dominates};
use crate::instance::Instance;
use crate::params::Params;
use crate::solution::Solution;
use crate::types::Area;
use std::time::Instant;

#[derive(Debug, Clone)]
pub struct SolverConfig {
    /// Beam width of the first round; later rounds double it while time
    /// remains.
    pub beam_width: usize,
    /// `SolutionCompare` id used to rank partial solutions.
    pub comparator: u8,
    pub break_symmetries: bool,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            beam_width: 64,
            comparator: 2,
            break_symmetries: true,
        }
    }
}

pub struct Solver<'a> {
    instance: &'a Instance,
    params: Params,
    config: SolverConfig,
}

impl<'a> Solver<'a> {
    pub fn new(instance: &'a Instance, params: Params, config: SolverConfig) -> Self {
        Self {
            instance,
            params,
            config,
        }
    }

    /// Best complete plan found, or `None` when every branch dead-ends.
    /// Without a time limit a single beam round runs; with one, rounds of
    /// doubling width run until the budget expires.
    pub fn solve(&self) -> Option<Solution<'a>> {
        let start = Instant::now();
        let deadline = self.params.deadline_from(start);
        let mut best: Option<Solution<'a>> = None;
        let mut width = self.config.beam_width.max(1);
        loop {
            self.beam_round(width, deadline, &mut best);
            tracing::debug!(
                width,
                complete = best.is_some(),
                elapsed_ms = start.elapsed().as_millis() as u64,
                "beam round finished"
            );
            if deadline.is_none_or(|d| Instant::now() >= d) {
                break;
            }
            width = width.saturating_mul(2);
        }
        best
    }

    fn beam_round(&self, width: usize, deadline: Option<Instant>, best: &mut Option<Solution<'a>>) {
        let cmp = SolutionCompare::new(self.config.comparator);
        let mut layer = vec![Solution::new(self.instance)];

        while !layer.is_empty() {
            let mut next: Vec<Solution<'a>> = Vec::new();
            let mut fronts: Vec<(usize, Front, Area)> = Vec::new();

            for sol in &layer {
                if deadline.is_some_and(|d| Instant::now() >= d) {
                    return;
                }
                for ins in sol.all_valid_insertions(&self.params, self.config.break_symmetries) {
                    let front = sol.front_after(&ins);
                    let items_after = sol.item_number() + ins.item_count();
                    // A sibling with the same progress, no more waste and a
                    // front at least as open makes this branch redundant.
                    let dominated = fronts.iter().any(|(n, g, w)| {
                        *n == items_after && *w <= sol.waste() && dominates(g, &front, &self.params)
                    });
                    if dominated {
                        continue;
                    }

                    let mut child = sol.clone();
                    child.add_item(&ins);
                    if child.is_complete() {
                        self.offer(child, best);
                    } else {
                        fronts.push((items_after, front, child.waste()));
                        next.push(child);
                    }
                }
            }

            next.sort_by(|a, b| cmp.ordering(a, b));
            next.truncate(width);
            layer = next;
        }
    }

    fn offer(&self, candidate: Solution<'a>, best: &mut Option<Solution<'a>>) {
        let better = best.as_ref().is_none_or(|b| {
            (candidate.final_waste(), candidate.used_width())
                < (b.final_waste(), b.used_width())
        });
        if better {
            tracing::info!(
                waste = candidate.final_waste(),
                plates = candidate.plate_number(),
                used_width = candidate.used_width(),
                "improved complete plan"
            );
            *best = Some(candidate);
        }
    }
}
