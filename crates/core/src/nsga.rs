//! Elitist multi-objective search framework (NSGA-II style).
//!
//! This module provides the (μ+λ) evolutionary loop used by the packing
//! pipeline: fast non-dominated sorting, crowding distance and
//! crowding-ranked truncation over a fixed set of three objectives.
//!
//! # Architecture
//!
//! Crossover and mutation are defined on the individual itself
//! ([`NsgaIndividual`]), while evaluation and population seeding live on the
//! problem ([`NsgaProblem`]). The runner owns the loop: every generation it
//! selects μ survivors, breeds λ offspring (each child takes exactly one of
//! two exclusive branches: a crossover of two parents with
//! `crossover_rate` probability, otherwise a mutated clone of one parent),
//! and carries the union forward. Rank and crowding are bookkeeping internal
//! to the runner; individuals only expose their objective values and a
//! feasibility flag.

use rand::Rng;
use std::cmp::Ordering;
use std::sync::atomic::{AtomicBool, Ordering as AtomicOrdering};
use std::sync::Arc;
use std::time::{Duration, Instant};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Number of objectives the framework optimizes.
pub const NUM_OBJECTIVES: usize = 3;

/// Optimization direction of one objective axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Sense {
    /// Lower values are better.
    Minimize,
    /// Higher values are better.
    Maximize,
}

impl Sense {
    /// Maps a raw objective value to a signed value where lower is better.
    #[inline]
    pub fn signed(self, value: f64) -> f64 {
        match self {
            Sense::Minimize => value,
            Sense::Maximize => -value,
        }
    }
}

/// Configuration for the multi-objective search.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct NsgaConfig {
    /// Initial population size.
    pub population_size: usize,
    /// Survivors kept each generation (μ).
    pub survivor_count: usize,
    /// Offspring bred each generation (λ).
    pub offspring_count: usize,
    /// Probability of the crossover branch when breeding a child.
    pub crossover_rate: f64,
    /// Probability of the mutated-clone branch; the complement of
    /// `crossover_rate` (the two branches are exclusive).
    pub mutation_rate: f64,
    /// Maximum number of generations.
    pub max_generations: u32,
    /// Consecutive non-improving generations before early stop.
    pub stagnation_limit: u32,
    /// Minimum composite improvement that resets the stagnation counter.
    pub improvement_epsilon: f64,
    /// Optional wall-clock budget, checked between generations.
    #[cfg_attr(feature = "serde", serde(skip))]
    pub time_limit: Option<Duration>,
}

impl Default for NsgaConfig {
    fn default() -> Self {
        Self {
            population_size: 100,
            survivor_count: 15,
            offspring_count: 30,
            crossover_rate: 0.7,
            mutation_rate: 0.3,
            max_generations: 30,
            stagnation_limit: 8,
            improvement_epsilon: 1e-4,
            time_limit: None,
        }
    }
}

impl NsgaConfig {
    /// Creates a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the initial population size.
    pub fn with_population_size(mut self, size: usize) -> Self {
        self.population_size = size.max(2);
        self
    }

    /// Sets the survivor count (μ).
    pub fn with_survivor_count(mut self, count: usize) -> Self {
        self.survivor_count = count.max(1);
        self
    }

    /// Sets the offspring count (λ).
    pub fn with_offspring_count(mut self, count: usize) -> Self {
        self.offspring_count = count;
        self
    }

    /// Sets the crossover branch probability.
    pub fn with_crossover_rate(mut self, rate: f64) -> Self {
        self.crossover_rate = rate.clamp(0.0, 1.0);
        self.mutation_rate = 1.0 - self.crossover_rate;
        self
    }

    /// Sets the maximum generations.
    pub fn with_max_generations(mut self, generations: u32) -> Self {
        self.max_generations = generations;
        self
    }

    /// Sets the stagnation limit.
    pub fn with_stagnation_limit(mut self, limit: u32) -> Self {
        self.stagnation_limit = limit;
        self
    }

    /// Sets the wall-clock budget.
    pub fn with_time_limit(mut self, duration: Duration) -> Self {
        self.time_limit = Some(duration);
        self
    }
}

/// Trait for individuals in the multi-objective search.
pub trait NsgaIndividual: Clone + Send + Sync {
    /// Returns the objective values of this individual.
    fn objectives(&self) -> [f64; NUM_OBJECTIVES];

    /// Returns true if this individual satisfies the problem's hard
    /// constraints. Infeasible individuals sort into a terminal front that
    /// any feasible individual dominates.
    fn is_feasible(&self) -> bool;

    /// Returns true if the objectives have been computed.
    fn is_evaluated(&self) -> bool;

    /// Performs crossover with another individual.
    fn crossover<R: Rng>(&self, other: &Self, rng: &mut R) -> Self;

    /// Mutates this individual in place.
    fn mutate<R: Rng>(&mut self, rng: &mut R);
}

/// Trait for problem-specific search operations.
pub trait NsgaProblem: Send + Sync {
    /// The individual type for this problem.
    type Individual: NsgaIndividual;

    /// Optimization direction of each objective axis.
    fn senses(&self) -> [Sense; NUM_OBJECTIVES];

    /// Evaluates the objectives of an individual.
    fn evaluate(&self, individual: &mut Self::Individual);

    /// Creates the initial population.
    fn initialize_population<R: Rng>(&self, size: usize, rng: &mut R) -> Vec<Self::Individual>;

    /// Called after each generation (for progress reporting).
    fn on_generation(
        &self,
        _generation: u32,
        _incumbent: Option<&Self::Individual>,
        _population: &[Self::Individual],
    ) {
    }
}

/// Result of a search run.
#[derive(Debug, Clone)]
pub struct NsgaResult<I> {
    /// Best feasible individual found, if any was ever feasible.
    pub incumbent: Option<I>,
    /// Generations executed.
    pub generations: u32,
    /// Total elapsed time.
    pub elapsed: Duration,
    /// Best composite value after each generation (lower is better).
    pub history: Vec<f64>,
}

/// Compares two objective vectors lexicographically from the last axis to
/// the first, each per its sense. Lower is better.
pub fn compare_lexicographic(
    a: [f64; NUM_OBJECTIVES],
    b: [f64; NUM_OBJECTIVES],
    senses: [Sense; NUM_OBJECTIVES],
) -> Ordering {
    for axis in (0..NUM_OBJECTIVES).rev() {
        let sa = senses[axis].signed(a[axis]);
        let sb = senses[axis].signed(b[axis]);
        match sa.partial_cmp(&sb).unwrap_or(Ordering::Equal) {
            Ordering::Equal => continue,
            other => return other,
        }
    }
    Ordering::Equal
}

/// Signed sum of the objectives (lower is better): minimized axes are added,
/// maximized axes subtracted.
pub fn composite(objectives: [f64; NUM_OBJECTIVES], senses: [Sense; NUM_OBJECTIVES]) -> f64 {
    objectives
        .iter()
        .zip(senses.iter())
        .map(|(&value, sense)| sense.signed(value))
        .sum()
}

/// Pareto dominance: `a` dominates `b` iff it is weakly better on all axes
/// and strictly better on at least one.
pub fn dominates(
    a: [f64; NUM_OBJECTIVES],
    b: [f64; NUM_OBJECTIVES],
    senses: [Sense; NUM_OBJECTIVES],
) -> bool {
    let mut strictly_better = false;
    for axis in 0..NUM_OBJECTIVES {
        let sa = senses[axis].signed(a[axis]);
        let sb = senses[axis].signed(b[axis]);
        if sa > sb {
            return false;
        }
        if sa < sb {
            strictly_better = true;
        }
    }
    strictly_better
}

/// Partitions population indices into Pareto fronts.
///
/// Classical O(M·N²) front partition over the feasible individuals;
/// infeasible individuals form one terminal front after all feasible ones.
pub fn non_dominated_sort(
    objectives: &[[f64; NUM_OBJECTIVES]],
    feasible: &[bool],
    senses: [Sense; NUM_OBJECTIVES],
) -> Vec<Vec<usize>> {
    let candidates: Vec<usize> = (0..objectives.len()).filter(|&i| feasible[i]).collect();
    let infeasible: Vec<usize> = (0..objectives.len()).filter(|&i| !feasible[i]).collect();

    let n = candidates.len();
    let mut dominated_by: Vec<Vec<usize>> = vec![Vec::new(); n];
    let mut domination_count = vec![0usize; n];
    let mut fronts: Vec<Vec<usize>> = Vec::new();
    let mut current: Vec<usize> = Vec::new();

    for p in 0..n {
        for q in 0..n {
            if p == q {
                continue;
            }
            if dominates(objectives[candidates[p]], objectives[candidates[q]], senses) {
                dominated_by[p].push(q);
            } else if dominates(objectives[candidates[q]], objectives[candidates[p]], senses) {
                domination_count[p] += 1;
            }
        }
        if domination_count[p] == 0 {
            current.push(p);
        }
    }

    while !current.is_empty() {
        let mut next = Vec::new();
        for &p in &current {
            for &q in &dominated_by[p] {
                domination_count[q] -= 1;
                if domination_count[q] == 0 {
                    next.push(q);
                }
            }
        }
        fronts.push(current.iter().map(|&p| candidates[p]).collect());
        current = next;
    }

    if !infeasible.is_empty() {
        fronts.push(infeasible);
    }

    fronts
}

/// Crowding distance of every member of one front, aligned with `front`.
///
/// Boundary individuals on each objective axis receive infinity; interior
/// individuals accumulate the normalized gap to their neighbors.
pub fn crowding_distance(front: &[usize], objectives: &[[f64; NUM_OBJECTIVES]]) -> Vec<f64> {
    let n = front.len();
    let mut distance = vec![0.0f64; n];
    if n <= 2 {
        return vec![f64::INFINITY; n];
    }

    for axis in 0..NUM_OBJECTIVES {
        let mut order: Vec<usize> = (0..n).collect();
        order.sort_by(|&a, &b| {
            objectives[front[a]][axis]
                .partial_cmp(&objectives[front[b]][axis])
                .unwrap_or(Ordering::Equal)
        });

        distance[order[0]] = f64::INFINITY;
        distance[order[n - 1]] = f64::INFINITY;

        let range = objectives[front[order[n - 1]]][axis] - objectives[front[order[0]]][axis];
        if range > 0.0 && range.is_finite() {
            for k in 1..n - 1 {
                let gap = objectives[front[order[k + 1]]][axis]
                    - objectives[front[order[k - 1]]][axis];
                distance[order[k]] += gap / range;
            }
        }
    }

    distance
}

/// Multi-objective search runner.
pub struct NsgaRunner<P: NsgaProblem> {
    config: NsgaConfig,
    problem: P,
    cancelled: Arc<AtomicBool>,
}

impl<P: NsgaProblem> NsgaRunner<P> {
    /// Creates a new runner.
    pub fn new(config: NsgaConfig, problem: P) -> Self {
        Self {
            config,
            problem,
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Returns a handle to cancel the search; checked between generations.
    pub fn cancel_handle(&self) -> Arc<AtomicBool> {
        self.cancelled.clone()
    }

    /// Returns the problem driven by this runner.
    pub fn problem(&self) -> &P {
        &self.problem
    }

    /// Runs the search with the given RNG.
    pub fn run_with_rng<R: Rng>(&self, rng: &mut R) -> NsgaResult<P::Individual> {
        let start = Instant::now();
        let senses = self.problem.senses();
        let mut history = Vec::new();

        let mut population = self
            .problem
            .initialize_population(self.config.population_size, rng);
        self.evaluate_pending(&mut population);

        let mut incumbent: Option<P::Individual> =
            Self::best_feasible(&population, senses).cloned();
        let mut best_composite = incumbent
            .as_ref()
            .map(|ind| composite(ind.objectives(), senses))
            .unwrap_or(f64::INFINITY);

        let mut generation = 0u32;
        let mut stagnation = 0u32;

        while generation < self.config.max_generations {
            if self.cancelled.load(AtomicOrdering::Relaxed) {
                break;
            }
            if let Some(limit) = self.config.time_limit {
                if start.elapsed() > limit {
                    break;
                }
            }

            let survivors = self.select_survivors(&population, senses);

            let mut next = survivors.clone();
            next.reserve(self.config.offspring_count);
            while next.len() < survivors.len() + self.config.offspring_count {
                let parent1 = &survivors[rng.gen_range(0..survivors.len())];
                let parent2 = &survivors[rng.gen_range(0..survivors.len())];

                let child = if rng.gen::<f64>() < self.config.crossover_rate {
                    parent1.crossover(parent2, rng)
                } else {
                    let mut clone = parent1.clone();
                    clone.mutate(rng);
                    clone
                };
                next.push(child);
            }

            self.evaluate_pending(&mut next);
            population = next;

            if let Some(best) = Self::best_feasible(&population, senses) {
                let replace = match &incumbent {
                    None => true,
                    Some(current) => {
                        compare_lexicographic(best.objectives(), current.objectives(), senses)
                            == Ordering::Less
                    }
                };
                if replace {
                    incumbent = Some(best.clone());
                }
            }

            let current_best = incumbent
                .as_ref()
                .map(|ind| composite(ind.objectives(), senses))
                .unwrap_or(f64::INFINITY);
            if current_best < best_composite - self.config.improvement_epsilon {
                best_composite = current_best;
                stagnation = 0;
            } else {
                stagnation += 1;
            }
            history.push(best_composite);

            self.problem
                .on_generation(generation, incumbent.as_ref(), &population);

            generation += 1;

            if stagnation >= self.config.stagnation_limit {
                log::debug!(
                    "search stopped after {} stagnant generations (gen {})",
                    stagnation,
                    generation
                );
                break;
            }
        }

        NsgaResult {
            incumbent,
            generations: generation,
            elapsed: start.elapsed(),
            history,
        }
    }

    fn evaluate_pending(&self, population: &mut [P::Individual]) {
        for individual in population.iter_mut() {
            if !individual.is_evaluated() {
                self.problem.evaluate(individual);
            }
        }
    }

    /// Best feasible individual of the population: lexicographically best
    /// from the last objective axis to the first.
    fn best_feasible(
        population: &[P::Individual],
        senses: [Sense; NUM_OBJECTIVES],
    ) -> Option<&P::Individual> {
        population
            .iter()
            .filter(|ind| ind.is_feasible())
            .min_by(|a, b| compare_lexicographic(a.objectives(), b.objectives(), senses))
    }

    /// Selects μ survivors: whole fronts while they fit, then the overflow
    /// front by descending crowding distance.
    fn select_survivors(
        &self,
        population: &[P::Individual],
        senses: [Sense; NUM_OBJECTIVES],
    ) -> Vec<P::Individual> {
        let target = self.config.survivor_count.min(population.len());
        let objectives: Vec<[f64; NUM_OBJECTIVES]> =
            population.iter().map(|ind| ind.objectives()).collect();
        let feasible: Vec<bool> = population.iter().map(|ind| ind.is_feasible()).collect();

        let fronts = non_dominated_sort(&objectives, &feasible, senses);
        let mut survivors = Vec::with_capacity(target);

        for front in fronts {
            if survivors.len() + front.len() <= target {
                survivors.extend(front.iter().map(|&i| population[i].clone()));
            } else {
                let distance = crowding_distance(&front, &objectives);
                let mut ranked: Vec<usize> = (0..front.len()).collect();
                ranked.sort_by(|&a, &b| {
                    distance[b].partial_cmp(&distance[a]).unwrap_or(Ordering::Equal)
                });
                for &k in ranked.iter().take(target - survivors.len()) {
                    survivors.push(population[front[k]].clone());
                }
            }
            if survivors.len() >= target {
                break;
            }
        }

        survivors
    }
}
