use rand::seq::SliceRandom;
use rand::Rng;

/// Picks an item with probability proportional to its weight.
///
/// Non-positive (and non-finite) weights count as zero. When nothing carries weight the pick is
/// uniform. Returns `None` only for an empty slice.
pub fn weighted_random<'a, T, R: Rng>(
    items: &'a [T],
    weights: &[f64],
    rng: &mut R,
) -> Option<&'a T> {
    debug_assert_eq!(items.len(), weights.len());
    let usable = |w: f64| if w.is_finite() && w > 0.0 { w } else { 0.0 };

    let total: f64 = weights.iter().map(|&w| usable(w)).sum();
    if total <= 0.0 {
        return items.choose(rng);
    }

    let r = rng.gen_range(0.0..total);
    let mut cumulative = 0.0;
    for (item, &w) in items.iter().zip(weights) {
        cumulative += usable(w);
        if cumulative > r {
            return Some(item);
        }
    }
    // Rounding can leave `r` a hair above the final sum.
    items
        .iter()
        .zip(weights)
        .rev()
        .find(|(_, w)| usable(**w) > 0.0)
        .map(|(item, _)| item)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::mock::StepRng;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const N: usize = 20_000;

    #[test]
    fn empty_slice_gives_none() {
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(weighted_random::<u8, _>(&[], &[], &mut rng), None);
    }

    #[test]
    fn zero_weights_are_uniform() {
        let mut rng = StdRng::seed_from_u64(7);
        let items = ["a", "b", "c", "d"];
        let mut counts = [0usize; 4];
        for _ in 0..N {
            let chosen = weighted_random(&items, &[0.0; 4], &mut rng).unwrap();
            counts[items.iter().position(|i| i == chosen).unwrap()] += 1;
        }
        let expected = N / items.len();
        for count in counts {
            assert!(
                count.abs_diff(expected) < expected / 10,
                "counts not uniform: {counts:?}"
            );
        }
    }

    #[test]
    fn sole_positive_weight_always_wins() {
        let mut rng = StdRng::seed_from_u64(3);
        let items = ["x", "y", "z"];
        for _ in 0..1000 {
            let chosen = weighted_random(&items, &[0.0, 5.0, -2.0], &mut rng);
            assert_eq!(chosen, Some(&"y"));
        }
    }

    #[test]
    fn draw_walks_cumulative_weights() {
        let items = ["x", "y", "z"];
        let weights = [0.0, 2.0, 3.0];
        // The lowest possible draw lands on the first weighted item...
        let mut low = StepRng::new(0, 0);
        assert_eq!(weighted_random(&items, &weights, &mut low), Some(&"y"));
        // ...and the highest on the last one.
        let mut high = StepRng::new(u64::MAX, 0);
        assert_eq!(weighted_random(&items, &weights, &mut high), Some(&"z"));
    }

    #[test]
    fn proportional_to_weights() {
        let mut rng = StdRng::seed_from_u64(11);
        let items = [0usize, 1];
        let mut counts = [0usize; 2];
        for _ in 0..N {
            counts[*weighted_random(&items, &[1.0, 3.0], &mut rng).unwrap()] += 1;
        }
        let share = counts[1] as f64 / N as f64;
        assert!((share - 0.75).abs() < 0.02, "share was {share}");
    }
}
