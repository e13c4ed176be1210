//! Individual evaluation: decoding a product-type permutation into a stack
//! of pallets and scoring the result.
//!
//! An individual is a permutation of the order's distinct product ids.
//! Decoding feeds every item of each product, in permutation order, through
//! the placement engine across a budget of fresh pallets; a permutation is
//! feasible only when every item found a spot. Feasible permutations score
//! three objectives: heterogeneity (minimize), compactness (maximize) and
//! volume utilization (maximize).

use crate::config::PackConfig;
use crate::item::Item;
use crate::order::Order;
use crate::pallet::Pallet;
use crate::placement::{PlacementEngine, RotationPolicy};
use crate::seeds::seed_orderings;
use palletize_core::nsga::{NsgaIndividual, NsgaProblem, Sense, NUM_OBJECTIVES};
use palletize_core::{interval_overlap, EPSILON};
use rand::seq::SliceRandom;
use rand::Rng;

/// A candidate product-type ordering with its cached scores.
#[derive(Debug, Clone)]
pub struct ProductOrdering {
    /// Permutation of the order's distinct product ids.
    pub genes: Vec<String>,
    objectives: [f64; NUM_OBJECTIVES],
    feasible: bool,
    evaluated: bool,
}

impl ProductOrdering {
    /// Creates an unevaluated ordering.
    pub fn new(genes: Vec<String>) -> Self {
        Self {
            genes,
            objectives: [0.0; NUM_OBJECTIVES],
            feasible: false,
            evaluated: false,
        }
    }

    /// Mean fraction of the order's product types present per pallet.
    pub fn heterogeneity(&self) -> f64 {
        self.objectives[0]
    }

    /// Mean per-item contact ratio across pallets.
    pub fn compactness(&self) -> f64 {
        self.objectives[1]
    }

    /// Mean volume utilization across pallets.
    pub fn volume_utilization(&self) -> f64 {
        self.objectives[2]
    }

    fn set_scores(&mut self, objectives: [f64; NUM_OBJECTIVES], feasible: bool) {
        self.objectives = objectives;
        self.feasible = feasible;
        self.evaluated = true;
    }
}

impl NsgaIndividual for ProductOrdering {
    fn objectives(&self) -> [f64; NUM_OBJECTIVES] {
        self.objectives
    }

    fn is_feasible(&self) -> bool {
        self.feasible
    }

    fn is_evaluated(&self) -> bool {
        self.evaluated
    }

    /// Single-point crossover: the child keeps this parent's prefix and
    /// appends the other parent's remaining genes in their order.
    fn crossover<R: Rng>(&self, other: &Self, rng: &mut R) -> Self {
        let k = self.genes.len();
        if k < 2 {
            return self.clone();
        }

        let point = rng.gen_range(1..k);
        let prefix: Vec<String> = self.genes[..point].to_vec();
        let mut genes = prefix.clone();
        genes.extend(
            other
                .genes
                .iter()
                .filter(|gene| !prefix.contains(*gene))
                .cloned(),
        );

        Self::new(genes)
    }

    /// Swap mutation of two uniformly random positions.
    fn mutate<R: Rng>(&mut self, rng: &mut R) {
        if self.genes.len() < 2 {
            return;
        }
        let i = rng.gen_range(0..self.genes.len());
        let j = rng.gen_range(0..self.genes.len());
        self.genes.swap(i, j);
        self.evaluated = false;
    }
}

/// Contact ratio of one placed item: in-contact surface area over total
/// surface area.
///
/// Bottom contact is the full footprint for floor items, otherwise the
/// footprint overlap with every flush item below. Side contact adds the
/// face overlap with every laterally touching neighbor. Corner touches may
/// contribute to both adjacent faces; the measure tolerates that.
pub fn contact_ratio(item: &Item, pallet: &Pallet) -> f64 {
    let aabb = item.aabb();
    let max = aabb.max();
    let mut contact = 0.0;

    if item.on_floor() {
        contact += item.base_area();
    } else {
        for other in pallet.items() {
            if other.item_id == item.item_id {
                continue;
            }
            if (item.position.z - other.top_z()).abs() < EPSILON {
                contact += aabb.xy_overlap_area(&other.aabb());
            }
        }
    }

    for other in pallet.items() {
        if other.item_id == item.item_id {
            continue;
        }
        let other_aabb = other.aabb();
        let other_max = other_aabb.max();

        let y_overlap =
            interval_overlap(aabb.min.y, max.y, other_aabb.min.y, other_max.y);
        let z_overlap =
            interval_overlap(aabb.min.z, max.z, other_aabb.min.z, other_max.z);
        let x_overlap =
            interval_overlap(aabb.min.x, max.x, other_aabb.min.x, other_max.x);

        if (max.x - other_aabb.min.x).abs() < EPSILON || (other_max.x - aabb.min.x).abs() < EPSILON
        {
            contact += y_overlap * z_overlap;
        }
        if (max.y - other_aabb.min.y).abs() < EPSILON || (other_max.y - aabb.min.y).abs() < EPSILON
        {
            contact += x_overlap * z_overlap;
        }
    }

    contact / item.surface_area()
}

/// Mean per-item contact ratio of one pallet; zero when empty.
pub fn pallet_compactness(pallet: &Pallet) -> f64 {
    if pallet.is_empty() {
        return 0.0;
    }
    pallet
        .items()
        .iter()
        .map(|item| contact_ratio(item, pallet))
        .sum::<f64>()
        / pallet.len() as f64
}

/// The packing problem one order poses to the evolutionary search.
pub struct PackingProblem {
    products: Vec<(String, Vec<Item>)>,
    seeds: Vec<Vec<String>>,
    pallet_budget: usize,
    config: PackConfig,
}

impl PackingProblem {
    /// Builds the problem for an order with the given pallet budget.
    pub fn new(order: &Order, config: PackConfig, pallet_budget: usize) -> Self {
        let mut products: Vec<(String, Vec<Item>)> = Vec::new();
        for item in order.items() {
            match products.iter_mut().find(|(id, _)| *id == item.product_id) {
                Some((_, items)) => items.push(item.clone()),
                None => products.push((item.product_id.clone(), vec![item.clone()])),
            }
        }

        Self {
            products,
            seeds: seed_orderings(order),
            pallet_budget,
            config,
        }
    }

    /// Number of distinct product types.
    pub fn product_count(&self) -> usize {
        self.products.len()
    }

    /// Total number of items.
    pub fn item_count(&self) -> usize {
        self.products.iter().map(|(_, items)| items.len()).sum()
    }

    /// The distinct product ids in first-appearance order.
    pub fn product_ids(&self) -> Vec<String> {
        self.products.iter().map(|(id, _)| id.clone()).collect()
    }

    fn fresh_engines(&self) -> Vec<PlacementEngine> {
        (0..self.pallet_budget)
            .map(|index| {
                PlacementEngine::new(Pallet::new(
                    index + 1,
                    self.config.pallet_length,
                    self.config.pallet_width,
                    self.config.pallet_max_height,
                ))
            })
            .collect()
    }

    /// Decodes a permutation into the pallets it fills.
    ///
    /// Items are fed product by product in permutation order, each product's
    /// items in input order. The cursor only moves forward: when a placement
    /// fails on the current pallet the next one is opened, and failing on
    /// the last pallet makes the permutation infeasible (`None`).
    pub fn decode(&self, genes: &[String]) -> Option<Vec<Pallet>> {
        if self.item_count() == 0 {
            return Some(Vec::new());
        }

        let mut engines = self.fresh_engines();
        if engines.is_empty() {
            return None;
        }

        let mut cursor = 0;
        for gene in genes {
            let Some((_, items)) = self.products.iter().find(|(id, _)| id == gene) else {
                continue;
            };
            for item in items {
                loop {
                    if engines[cursor].try_place(item, self.config.rotation) {
                        break;
                    }
                    cursor += 1;
                    if cursor >= engines.len() {
                        return None;
                    }
                }
            }
        }

        Some(
            engines
                .into_iter()
                .take(cursor + 1)
                .map(PlacementEngine::into_pallet)
                .collect(),
        )
    }

    /// Scores a decoded pallet stack as `[heterogeneity, compactness,
    /// volume utilization]`.
    pub fn score(&self, pallets: &[Pallet]) -> [f64; NUM_OBJECTIVES] {
        if pallets.is_empty() {
            return [0.0, 0.0, 0.0];
        }
        let k = self.product_count().max(1) as f64;
        let n = pallets.len() as f64;

        let heterogeneity = pallets
            .iter()
            .map(|p| p.product_type_count() as f64 / k)
            .sum::<f64>()
            / n;
        let compactness = pallets.iter().map(pallet_compactness).sum::<f64>() / n;
        let volume = pallets.iter().map(Pallet::volume_utilization).sum::<f64>() / n;

        [heterogeneity, compactness, volume]
    }
}

impl NsgaProblem for PackingProblem {
    type Individual = ProductOrdering;

    fn senses(&self) -> [Sense; NUM_OBJECTIVES] {
        [Sense::Minimize, Sense::Maximize, Sense::Maximize]
    }

    fn evaluate(&self, individual: &mut Self::Individual) {
        match self.decode(&individual.genes) {
            Some(pallets) => {
                let scores = self.score(&pallets);
                individual.set_scores(scores, true);
            }
            None => {
                individual.set_scores([1.0, 0.0, 0.0], false);
            }
        }
    }

    fn initialize_population<R: Rng>(&self, size: usize, rng: &mut R) -> Vec<Self::Individual> {
        let mut population: Vec<ProductOrdering> = self
            .seeds
            .iter()
            .take(size)
            .map(|genes| ProductOrdering::new(genes.clone()))
            .collect();

        let ids = self.product_ids();
        while population.len() < size {
            let mut genes = ids.clone();
            genes.shuffle(rng);
            population.push(ProductOrdering::new(genes));
        }

        population
    }

    fn on_generation(
        &self,
        generation: u32,
        incumbent: Option<&Self::Individual>,
        _population: &[Self::Individual],
    ) {
        if let Some(best) = incumbent {
            log::debug!(
                "gen {}: vol={:.4}, comp={:.4}, het={:.4}",
                generation,
                best.volume_utilization(),
                best.compactness(),
                best.heterogeneity()
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::Point3;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn small_order() -> Order {
        let mut items = Vec::new();
        let mut id = 1;
        for product in ["A", "B", "C"] {
            for _ in 0..3 {
                items.push(Item::new(product, id, 300.0, 200.0, 150.0, 2.0));
                id += 1;
            }
        }
        Order::new("O1", items)
    }

    #[test]
    fn test_decode_places_every_item() {
        let order = small_order();
        let problem = PackingProblem::new(&order, PackConfig::default(), 2);

        let genes = problem.product_ids();
        let pallets = problem.decode(&genes).expect("feasible");

        let placed: usize = pallets.iter().map(Pallet::len).sum();
        assert_eq!(placed, 9);

        // No item id appears twice across pallets.
        let mut ids: Vec<usize> = pallets
            .iter()
            .flat_map(|p| p.items().iter().map(|i| i.item_id))
            .collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 9);
    }

    #[test]
    fn test_decode_infeasible_when_item_oversized() {
        let items = vec![Item::new("A", 1, 1300.0, 200.0, 150.0, 2.0)];
        let order = Order::new("O1", items);
        let problem = PackingProblem::new(&order, PackConfig::default(), 3);

        assert!(problem.decode(&problem.product_ids()).is_none());
    }

    #[test]
    fn test_decode_empty_order() {
        let order = Order::new("O1", Vec::new());
        let problem = PackingProblem::new(&order, PackConfig::default(), 2);
        let pallets = problem.decode(&[]).expect("trivially feasible");
        assert!(pallets.is_empty());
    }

    #[test]
    fn test_homogeneous_order_heterogeneity_is_one() {
        let items = (1..=4)
            .map(|id| Item::new("A", id, 300.0, 200.0, 150.0, 2.0))
            .collect();
        let order = Order::new("O1", items);
        let problem = PackingProblem::new(&order, PackConfig::default(), 2);

        let mut individual = ProductOrdering::new(problem.product_ids());
        problem.evaluate(&mut individual);

        assert!(individual.is_feasible());
        assert_relative_eq!(individual.heterogeneity(), 1.0);
    }

    #[test]
    fn test_contact_ratio_floor_item() {
        let mut pallet = Pallet::new(1, 1200.0, 800.0, 1400.0);
        let mut item = Item::new("A", 1, 100.0, 80.0, 150.0, 1.0);
        item.place_at(Point3::origin(), false);
        pallet.push(item.clone());

        // Only the floor face touches anything.
        let expected = item.base_area() / item.surface_area();
        assert_relative_eq!(contact_ratio(&item, &pallet), expected, epsilon = 1e-9);
    }

    #[test]
    fn test_contact_ratio_counts_side_faces() {
        let mut pallet = Pallet::new(1, 1200.0, 800.0, 1400.0);
        let mut a = Item::new("A", 1, 100.0, 80.0, 150.0, 1.0);
        let mut b = Item::new("A", 2, 100.0, 80.0, 150.0, 1.0);
        a.place_at(Point3::origin(), false);
        b.place_at(Point3::new(100.0, 0.0, 0.0), false);
        pallet.push(a.clone());
        pallet.push(b);

        // Floor plus the shared 80×150 face.
        let expected = (a.base_area() + 80.0 * 150.0) / a.surface_area();
        assert_relative_eq!(contact_ratio(&a, &pallet), expected, epsilon = 1e-9);
    }

    #[test]
    fn test_contact_ratio_counts_resting_area() {
        let mut pallet = Pallet::new(1, 1200.0, 800.0, 1400.0);
        let mut bottom = Item::new("A", 1, 200.0, 200.0, 100.0, 1.0);
        let mut top = Item::new("A", 2, 100.0, 100.0, 100.0, 1.0);
        bottom.place_at(Point3::origin(), false);
        top.place_at(Point3::new(0.0, 0.0, 100.0), false);
        pallet.push(bottom);
        pallet.push(top.clone());

        let expected = (100.0 * 100.0) / top.surface_area();
        assert_relative_eq!(contact_ratio(&top, &pallet), expected, epsilon = 1e-9);
    }

    #[test]
    fn test_crossover_yields_permutation() {
        let order = small_order();
        let problem = PackingProblem::new(&order, PackConfig::default(), 2);
        let mut rng = StdRng::seed_from_u64(42);

        let population = problem.initialize_population(20, &mut rng);
        let child = population[0].crossover(&population[15], &mut rng);

        let mut genes = child.genes.clone();
        genes.sort();
        assert_eq!(genes, vec!["A", "B", "C"]);
    }

    #[test]
    fn test_mutation_preserves_permutation() {
        let mut individual =
            ProductOrdering::new(vec!["A".into(), "B".into(), "C".into(), "D".into()]);
        let mut rng = StdRng::seed_from_u64(42);
        individual.mutate(&mut rng);

        let mut genes = individual.genes.clone();
        genes.sort();
        assert_eq!(genes, vec!["A", "B", "C", "D"]);
        assert!(!individual.is_evaluated());
    }

    #[test]
    fn test_initial_population_has_seeds_and_random() {
        let order = small_order();
        let problem = PackingProblem::new(&order, PackConfig::default(), 2);
        let mut rng = StdRng::seed_from_u64(42);

        let population = problem.initialize_population(100, &mut rng);
        assert_eq!(population.len(), 100);
        for individual in &population {
            let mut genes = individual.genes.clone();
            genes.sort();
            assert_eq!(genes, vec!["A", "B", "C"]);
        }
    }
}
