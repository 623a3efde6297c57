/// Starting Elo rating for a phrase that has never been voted on
pub const INITIAL_ELO: i32 = 1000;

/// K-factor for Elo calculation
pub const K_FACTOR: f64 = 32.0;

/// Expected score for a player rated `rating_a` against `rating_b`.
pub fn expected_score(rating_a: i32, rating_b: i32) -> f64 {
    1.0 / (1.0 + 10f64.powf((rating_b - rating_a) as f64 / 400.0))
}

/// Compute new ratings after a duel, winner first.
///
/// Zero-sum before rounding; each side is rounded half away from zero
/// (`f64::round`), so the rounded pair can drift by at most one point.
/// Ratings are not clamped, so a long losing streak can drift arbitrarily low.
pub fn update_elo(winner_elo: i32, loser_elo: i32) -> (i32, i32) {
    update_elo_with_k(winner_elo, loser_elo, K_FACTOR)
}

/// Same as [`update_elo`] with an explicit K-factor.
pub fn update_elo_with_k(winner_elo: i32, loser_elo: i32, k: f64) -> (i32, i32) {
    let expected_winner = expected_score(winner_elo, loser_elo);
    let expected_loser = expected_score(loser_elo, winner_elo);
    let new_winner = winner_elo as f64 + k * (1.0 - expected_winner);
    let new_loser = loser_elo as f64 + k * (0.0 - expected_loser);
    (new_winner.round() as i32, new_loser.round() as i32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equal_ratings() {
        assert_eq!(update_elo(1000, 1000), (1016, 984));
    }

    #[test]
    fn underdog_wins_bigger_swing() {
        let (favorite_new, _) = update_elo(1200, 1000);
        let (underdog_new, _) = update_elo(1000, 1200);
        assert!(underdog_new - 1000 > favorite_new - 1200);
    }

    #[test]
    fn winner_never_loses_points_against_equal_or_better() {
        for loser in [1000, 1100, 1500, 2400] {
            let (new_winner, _) = update_elo(1000, loser);
            assert!(new_winner >= 1000);
        }
    }

    #[test]
    fn near_zero_sum_after_rounding() {
        for (w, l) in [(1000, 1000), (1234, 987), (800, 1600), (1001, 1000)] {
            let (nw, nl) = update_elo(w, l);
            assert!(((nw + nl) - (w + l)).abs() <= 1);
        }
    }

    #[test]
    fn custom_k_scales_exchange() {
        let (nw, nl) = update_elo_with_k(1000, 1000, 16.0);
        assert_eq!((nw, nl), (1008, 992));
    }
}
