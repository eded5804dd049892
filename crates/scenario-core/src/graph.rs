//! Validated scenario graph.
//!
//! A [`Scenario`] owns the authored [`ScenarioGraph`] as an arena of steps,
//! an id → index map, and every `next_step_id` pre-resolved to an arena
//! index. Construction is the single point where authored content is checked;
//! the engine never looks up ids that might not exist.

use std::collections::{HashMap, HashSet, VecDeque};

use crate::error::ConfigurationError;
use crate::model::{ScenarioGraph, Step};
use crate::scoring::validate_pass_ratio;

/// A structurally valid scenario, ready to be traversed.
#[derive(Debug, Clone)]
pub struct Scenario {
    graph: ScenarioGraph,
    index: HashMap<String, usize>,
    /// `edges[step][option]` is the arena index of the option's next step.
    edges: Vec<Vec<Option<usize>>>,
    start: usize,
}

impl Scenario {
    /// Validate authored content.
    ///
    /// Rejects a missing start step, dangling `next_step_id`s, steps without
    /// options, duplicate step or option ids, cycles, out-of-range pass
    /// ratios, and option scores whose sum could overflow a running total.
    pub fn new(graph: ScenarioGraph) -> Result<Self, ConfigurationError> {
        if let Some(ratio) = graph.pass_ratio {
            validate_pass_ratio(ratio)?;
        }

        let mut index = HashMap::with_capacity(graph.steps.len());
        for (i, step) in graph.steps.iter().enumerate() {
            if index.insert(step.id.clone(), i).is_some() {
                return Err(ConfigurationError::DuplicateStep(step.id.clone()));
            }
        }

        let start = *index
            .get(&graph.start_step_id)
            .ok_or_else(|| ConfigurationError::MissingStartStep(graph.start_step_id.clone()))?;

        let mut edges = Vec::with_capacity(graph.steps.len());
        for step in &graph.steps {
            if step.options.is_empty() {
                return Err(ConfigurationError::DeadEndStep(step.id.clone()));
            }

            let mut seen = HashSet::with_capacity(step.options.len());
            let mut targets = Vec::with_capacity(step.options.len());
            for option in &step.options {
                if !seen.insert(option.id.as_str()) {
                    return Err(ConfigurationError::DuplicateOption {
                        step_id: step.id.clone(),
                        option_id: option.id.clone(),
                    });
                }
                let target = match &option.next_step_id {
                    Some(next) => Some(*index.get(next).ok_or_else(|| {
                        ConfigurationError::DanglingStepReference {
                            step_id: step.id.clone(),
                            option_id: option.id.clone(),
                            target: next.clone(),
                        }
                    })?),
                    None => None,
                };
                targets.push(target);
            }
            edges.push(targets);
        }

        check_score_range(&graph)?;

        if let Some(cycle) = find_cycle(&edges) {
            let ids = cycle
                .into_iter()
                .map(|i| graph.steps[i].id.clone())
                .collect();
            return Err(ConfigurationError::Cycle(ids));
        }

        let scenario = Self {
            graph,
            index,
            edges,
            start,
        };

        for step in scenario.unreachable_steps() {
            tracing::warn!(
                scenario = %scenario.graph.title,
                step = %step.id,
                "step is not reachable from the start step"
            );
        }

        tracing::debug!(
            scenario = %scenario.graph.title,
            steps = scenario.graph.steps.len(),
            "scenario validated"
        );

        Ok(scenario)
    }

    /// The authored content.
    pub fn graph(&self) -> &ScenarioGraph {
        &self.graph
    }

    pub fn title(&self) -> &str {
        &self.graph.title
    }

    pub fn perfect_score(&self) -> i64 {
        self.graph.perfect_score
    }

    /// Per-scenario pass ratio, if the author set one.
    pub fn pass_ratio(&self) -> Option<f64> {
        self.graph.pass_ratio
    }

    pub fn step_count(&self) -> usize {
        self.graph.steps.len()
    }

    /// Arena index of the start step.
    pub fn start_index(&self) -> usize {
        self.start
    }

    /// Step at an arena index.
    ///
    /// Indices handed out by this scenario are always in bounds.
    pub fn step(&self, index: usize) -> &Step {
        &self.graph.steps[index]
    }

    /// Arena index of a step id.
    pub fn step_index(&self, step_id: &str) -> Option<usize> {
        self.index.get(step_id).copied()
    }

    /// Look up a step by id.
    pub fn find_step(&self, step_id: &str) -> Option<&Step> {
        self.step_index(step_id).map(|i| self.step(i))
    }

    /// Arena index of the step reached by picking `option` at `step`, or
    /// `None` when that option ends the scenario.
    pub fn next_index(&self, step: usize, option: usize) -> Option<usize> {
        self.edges[step][option]
    }

    /// Steps that no path from the start step ever reaches.
    pub fn unreachable_steps(&self) -> Vec<&Step> {
        let mut reached = vec![false; self.edges.len()];
        let mut queue = VecDeque::from([self.start]);
        reached[self.start] = true;
        while let Some(step) = queue.pop_front() {
            for next in self.edges[step].iter().flatten() {
                if !reached[*next] {
                    reached[*next] = true;
                    queue.push_back(*next);
                }
            }
        }
        reached
            .iter()
            .enumerate()
            .filter(|(_, r)| !**r)
            .map(|(i, _)| self.step(i))
            .collect()
    }
}

/// An acyclic path records at most one option per step, so its total is
/// bounded by the sum of every option's absolute score. Keeping that sum
/// within `i64::MAX` rules out overflow on every route.
fn check_score_range(graph: &ScenarioGraph) -> Result<(), ConfigurationError> {
    let limit = i64::MAX.unsigned_abs();
    let mut budget: u64 = 0;
    for step in &graph.steps {
        for option in &step.options {
            budget = budget
                .checked_add(option.score.unsigned_abs())
                .filter(|b| *b <= limit)
                .ok_or_else(|| ConfigurationError::ScoreOverflow(step.id.clone()))?;
        }
    }
    Ok(())
}

/// Find a loop in the step graph, returned as arena indices with the first
/// step repeated at the end.
fn find_cycle(edges: &[Vec<Option<usize>>]) -> Option<Vec<usize>> {
    #[derive(Clone, Copy, PartialEq)]
    enum Mark {
        Unvisited,
        OnPath,
        Done,
    }

    let mut marks = vec![Mark::Unvisited; edges.len()];

    for root in 0..edges.len() {
        if marks[root] != Mark::Unvisited {
            continue;
        }
        marks[root] = Mark::OnPath;
        // (step, next option to explore)
        let mut stack: Vec<(usize, usize)> = vec![(root, 0)];

        while let Some(frame) = stack.last_mut() {
            let (step, cursor) = *frame;
            if cursor == edges[step].len() {
                marks[step] = Mark::Done;
                stack.pop();
                continue;
            }
            frame.1 += 1;

            let Some(next) = edges[step][cursor] else {
                continue;
            };
            match marks[next] {
                Mark::Unvisited => {
                    marks[next] = Mark::OnPath;
                    stack.push((next, 0));
                }
                Mark::OnPath => {
                    let from = stack.iter().position(|&(s, _)| s == next).unwrap_or(0);
                    let mut cycle: Vec<usize> = stack[from..].iter().map(|&(s, _)| s).collect();
                    cycle.push(next);
                    return Some(cycle);
                }
                Mark::Done => {}
            }
        }
    }

    None
}
