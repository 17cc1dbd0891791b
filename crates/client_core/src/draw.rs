use rand::Rng;
use shared::domain::Card;

pub const REVERSED_PROBABILITY: f64 = 0.3;

/// Local stand-in draw shown while the backend produces the real one.
/// Each card is reversed independently with [`REVERSED_PROBABILITY`].
pub fn placeholder_draw<R: Rng + ?Sized>(rng: &mut R, card_count: u32) -> Vec<Card> {
    (1..=card_count)
        .map(|position| {
            Card::new(
                format!("Card {position}"),
                position,
                rng.gen_bool(REVERSED_PROBABILITY),
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use rand::{rngs::StdRng, SeedableRng};
    use shared::domain::Orientation;

    use super::*;

    #[test]
    fn draws_requested_count_with_sequential_positions() {
        let mut rng = StdRng::seed_from_u64(7);
        let cards = placeholder_draw(&mut rng, 10);
        assert_eq!(cards.len(), 10);
        assert_eq!(
            cards.iter().map(|card| card.position).collect::<Vec<_>>(),
            (1..=10).collect::<Vec<_>>()
        );
    }

    #[test]
    fn orientation_matches_reversed_flag() {
        let mut rng = StdRng::seed_from_u64(42);
        for card in placeholder_draw(&mut rng, 64) {
            assert_eq!(card.orientation, Orientation::from_reversed(card.reversed));
        }
    }

    #[test]
    fn same_seed_gives_same_draw() {
        let first = placeholder_draw(&mut StdRng::seed_from_u64(3), 6);
        let second = placeholder_draw(&mut StdRng::seed_from_u64(3), 6);
        assert_eq!(first, second);
    }

    #[test]
    fn reversal_rate_is_roughly_thirty_percent() {
        let mut rng = StdRng::seed_from_u64(11);
        let cards = placeholder_draw(&mut rng, 10_000);
        let reversed = cards.iter().filter(|card| card.reversed).count();
        assert!((2_500..3_500).contains(&reversed), "reversed={reversed}");
    }

    #[test]
    fn zero_count_draws_nothing() {
        let mut rng = StdRng::seed_from_u64(1);
        assert!(placeholder_draw(&mut rng, 0).is_empty());
    }
}
