//! Plan generation and the static partition across workers.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::action::{Action, ActionSet};
use crate::error::GenerationExhausted;
use crate::text::{MIN_BODY_LEN, TextGenerator};

/// Ordered sequence of actions for one run.
///
/// Generated once up front and then sliced across workers — never
/// regenerated — so the partition is a pure function of (length, worker
/// count) and cannot depend on scheduling order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionPlan {
    actions: Vec<Action>,
}

impl ActionPlan {
    /// Draw `iterations` actions: kind uniform over the set's registered
    /// kinds, body text from `generator` (at least [`MIN_BODY_LEN`] chars),
    /// plus one unit fraction of reserved entropy each. Deterministic for a
    /// fixed `rng` seed.
    ///
    /// # Panics
    ///
    /// If `iterations > 0` and the action set has no registered kinds.
    pub fn generate<R: Rng + ?Sized>(
        iterations: usize,
        set: &ActionSet,
        generator: &TextGenerator,
        rng: &mut R,
    ) -> Result<Self, GenerationExhausted> {
        assert!(
            iterations == 0 || !set.is_empty(),
            "cannot generate a plan from an empty action set"
        );
        let kinds = set.kinds();

        let mut actions = Vec::with_capacity(iterations);
        for _ in 0..iterations {
            let kind = kinds[rng.random_range(0..kinds.len())];
            let text = generator.passage(MIN_BODY_LEN, rng)?;
            let fraction = rng.random::<f64>();
            actions.push(Action {
                kind,
                text,
                fraction,
            });
        }
        Ok(Self { actions })
    }

    /// Wrap an existing action sequence.
    pub fn from_actions(actions: Vec<Action>) -> Self {
        Self { actions }
    }

    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Actions per worker: `ceil(len / workers)`.
    ///
    /// # Panics
    ///
    /// If `workers == 0`.
    pub fn chunk_size(&self, workers: usize) -> usize {
        self.actions.len().div_ceil(workers)
    }

    /// The contiguous chunk worker `worker` of `workers` owns. Slices past
    /// the end of the plan are empty: surplus workers simply get no work.
    pub fn slice(&self, worker: usize, workers: usize) -> &[Action] {
        let chunk = self.chunk_size(workers);
        let start = (worker * chunk).min(self.actions.len());
        let end = ((worker + 1) * chunk).min(self.actions.len());
        &self.actions[start..end]
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;
    use crate::action::ActionKind;

    const CORPUS: &str = "One sentence about load. Another sentence about latency. \
        A third sentence about sessions and cookies. A fourth about tokens. \
        The fifth sentence mentions workers and slices of work.";

    fn plan_of(len: usize) -> ActionPlan {
        ActionPlan::from_actions(
            (0..len)
                .map(|i| Action {
                    kind: ActionKind::FetchLatest,
                    text: format!("body {i}"),
                    fraction: 0.0,
                })
                .collect(),
        )
    }

    #[test]
    fn ten_actions_over_three_workers_slice_as_4_4_2() {
        let plan = plan_of(10);
        assert_eq!(plan.chunk_size(3), 4);
        let sizes: Vec<usize> = (0..3).map(|w| plan.slice(w, 3).len()).collect();
        assert_eq!(sizes, vec![4, 4, 2]);
    }

    #[test]
    fn slices_partition_the_plan_without_gaps_or_overlaps() {
        for (len, workers) in [(10, 3), (0, 4), (7, 1), (12, 5), (3, 8)] {
            let plan = plan_of(len);
            let rejoined: Vec<Action> = (0..workers)
                .flat_map(|w| plan.slice(w, workers).to_vec())
                .collect();
            assert_eq!(rejoined, plan.actions(), "len={len} workers={workers}");
        }
    }

    #[test]
    fn surplus_workers_get_empty_slices() {
        let plan = plan_of(3);
        assert_eq!(plan.chunk_size(8), 1);
        for worker in 3..8 {
            assert!(plan.slice(worker, 8).is_empty());
        }
    }

    #[test]
    fn generation_is_reproducible_for_a_fixed_seed() {
        let set = ActionSet::standard();
        let generator = TextGenerator::learn(CORPUS);

        let mut a = StdRng::seed_from_u64(42);
        let mut b = StdRng::seed_from_u64(42);
        let first = ActionPlan::generate(9, &set, &generator, &mut a).unwrap();
        let second = ActionPlan::generate(9, &set, &generator, &mut b).unwrap();

        assert_eq!(first, second);
        assert_eq!(first.len(), 9);
        assert!(first.actions().iter().all(|a| (0.0..1.0).contains(&a.fraction)));
    }

    #[test]
    fn zero_iterations_make_an_empty_plan() {
        let set = ActionSet::standard();
        let generator = TextGenerator::learn(CORPUS);
        let mut rng = StdRng::seed_from_u64(1);

        let plan = ActionPlan::generate(0, &set, &generator, &mut rng).unwrap();
        assert!(plan.is_empty());
    }

    #[test]
    #[should_panic(expected = "empty action set")]
    fn generating_from_an_empty_set_panics() {
        let generator = TextGenerator::learn(CORPUS);
        let mut rng = StdRng::seed_from_u64(1);
        let _ = ActionPlan::generate(1, &ActionSet::empty(), &generator, &mut rng);
    }
}
