//! Candidate ranking, deduplication and capping.
//!
//! Ordering is a pure function of candidate data so results do not depend
//! on the order concurrent provider calls completed in.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

use super::candidate::{Candidate, Tier};
use super::config::TieBreak;

/// Weighted drive cost used to break savings ties; lower is better.
pub fn tie_break_cost(candidate: &Candidate, weights: &TieBreak) -> f64 {
    candidate.drive.distance_m / 1000.0 * weights.per_km
        + candidate.drive.duration_s / 60.0 * weights.per_minute
}

/// Total order over candidates.
///
/// Strict and Relaxed candidates sort together by descending savings, then
/// ascending tie-break cost. Fallback candidates come after them, nearest to
/// the destination first. Tier, coordinates, source route and drive settle
/// anything left.
fn compare(a: &Candidate, b: &Candidate, weights: &TieBreak) -> Ordering {
    let is_fallback = |c: &Candidate| c.tier == Tier::Fallback;

    is_fallback(a)
        .cmp(&is_fallback(b))
        .then_with(|| {
            if is_fallback(a) {
                a.radial_m.total_cmp(&b.radial_m)
            } else {
                b.savings_usd
                    .total_cmp(&a.savings_usd)
                    .then_with(|| tie_break_cost(a, weights).total_cmp(&tie_break_cost(b, weights)))
            }
        })
        .then_with(|| a.tier.cmp(&b.tier))
        .then_with(|| a.drop_point.lat.total_cmp(&b.drop_point.lat))
        .then_with(|| a.drop_point.lng.total_cmp(&b.drop_point.lng))
        .then_with(|| a.source_route.cmp(&b.source_route))
        .then_with(|| b.savings_usd.total_cmp(&a.savings_usd))
        .then_with(|| a.drive.distance_m.total_cmp(&b.drive.distance_m))
}

/// Sort candidates best-first.
pub fn rank_candidates(mut candidates: Vec<Candidate>, weights: &TieBreak) -> Vec<Candidate> {
    candidates.sort_by(|a, b| compare(a, b, weights));
    candidates
}

/// Drop candidates whose rounded coordinates repeat an earlier one.
///
/// Keeps the first of each group, so rank before calling.
pub fn deduplicate(candidates: Vec<Candidate>, decimals: u32) -> Vec<Candidate> {
    let mut seen = HashSet::with_capacity(candidates.len());
    candidates
        .into_iter()
        .filter(|c| seen.insert(c.key(decimals)))
        .collect()
}

/// Keep at most `per_route` candidates for each source route label.
///
/// Keeps the first ones seen, so rank before calling.
pub fn cap_per_route(candidates: Vec<Candidate>, per_route: usize) -> Vec<Candidate> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    candidates
        .into_iter()
        .filter(|c| {
            let count = counts.entry(c.source_route.clone()).or_default();
            *count += 1;
            *count <= per_route
        })
        .collect()
}

/// Rank, deduplicate and cap one tier's accepted candidates.
pub fn finalize_tier(
    candidates: Vec<Candidate>,
    weights: &TieBreak,
    decimals: u32,
    per_route: usize,
) -> Vec<Candidate> {
    let ranked = rank_candidates(candidates, weights);
    cap_per_route(deduplicate(ranked, decimals), per_route)
}

/// Rank and deduplicate merged tier output and apply the total cap.
pub fn finalize(
    candidates: Vec<Candidate>,
    weights: &TieBreak,
    decimals: u32,
    max: usize,
) -> Vec<Candidate> {
    let mut out = deduplicate(rank_candidates(candidates, weights), decimals);
    out.truncate(max);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::discovery::candidate::{DriveStats, WalkStats};
    use crate::domain::GeoPoint;
    use crate::fare::FareQuote;

    fn candidate(lat: f64, savings: f64, drive_m: f64, route: &str, tier: Tier) -> Candidate {
        Candidate {
            drop_point: GeoPoint::new(lat, -74.0).unwrap(),
            radial_m: (40.75 - lat).abs() * 111_000.0,
            walk: WalkStats {
                distance_m: 300.0,
                duration_s: 240.0,
                estimated: false,
            },
            drive: DriveStats {
                distance_m: drive_m,
                duration_s: drive_m / 10.0,
            },
            fare: FareQuote {
                low: 9.0,
                center: 10.0,
                high: 11.0,
            },
            savings_usd: savings,
            source_route: route.to_string(),
            tier,
            label: String::new(),
        }
    }

    #[test]
    fn rank_by_savings_then_cost() {
        let weights = TieBreak::default();
        let a = candidate(40.745, 2.0, 5_000.0, "Route 1", Tier::Strict);
        let b = candidate(40.744, 3.0, 5_500.0, "Route 1", Tier::Strict);
        let c = candidate(40.743, 3.0, 4_000.0, "Route 1", Tier::Strict);

        let ranked = rank_candidates(vec![a, b, c], &weights);
        let lats: Vec<f64> = ranked.iter().map(|c| c.drop_point.lat).collect();
        assert_eq!(lats, vec![40.743, 40.744, 40.745]);
    }

    #[test]
    fn savings_outrank_tier() {
        let weights = TieBreak::default();
        let strict = candidate(40.745, 1.2, 5_000.0, "Route 1", Tier::Strict);
        let relaxed = candidate(40.744, 4.0, 5_000.0, "Alt 1", Tier::Relaxed);

        let out = finalize(vec![strict, relaxed], &weights, 6, 4);
        let savings: Vec<f64> = out.iter().map(|c| c.savings_usd).collect();
        assert_eq!(savings, vec![4.0, 1.2]);
    }

    #[test]
    fn equal_savings_prefer_cheaper_drive_across_tiers() {
        let weights = TieBreak::default();
        let strict = candidate(40.745, 2.0, 5_000.0, "Route 1", Tier::Strict);
        let relaxed = candidate(40.744, 2.0, 4_000.0, "Alt 1", Tier::Relaxed);

        let ranked = rank_candidates(vec![strict, relaxed], &weights);
        assert_eq!(ranked[0].tier, Tier::Relaxed);
    }

    #[test]
    fn fallback_sorts_last() {
        let weights = TieBreak::default();
        let fallback = candidate(40.749, 9.0, 3_000.0, "Route 1", Tier::Fallback);
        let relaxed = candidate(40.744, 0.5, 5_000.0, "Route 1", Tier::Relaxed);

        let ranked = rank_candidates(vec![fallback, relaxed], &weights);
        assert_eq!(ranked[0].tier, Tier::Relaxed);
        assert_eq!(ranked[1].tier, Tier::Fallback);
    }

    #[test]
    fn fallback_ranks_by_proximity() {
        let weights = TieBreak::default();
        let far = candidate(40.744, 5.0, 5_000.0, "Route 1", Tier::Fallback);
        let near = candidate(40.748, 0.0, 5_000.0, "Route 1", Tier::Fallback);

        let ranked = rank_candidates(vec![far, near], &weights);
        assert_eq!(ranked[0].drop_point.lat, 40.748);
    }

    #[test]
    fn deduplicate_keeps_first() {
        let a = candidate(40.7450001, 3.0, 5_000.0, "Route 1", Tier::Strict);
        let b = candidate(40.7450002, 2.0, 5_000.0, "Alt 1", Tier::Strict);

        let out = deduplicate(vec![a, b], 6);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].source_route, "Route 1");
    }

    #[test]
    fn cap_per_route_limits_each_label() {
        let out = cap_per_route(
            vec![
                candidate(40.741, 3.0, 5_000.0, "Route 1", Tier::Strict),
                candidate(40.742, 3.0, 5_000.0, "Route 1", Tier::Strict),
                candidate(40.743, 3.0, 5_000.0, "Route 1", Tier::Strict),
                candidate(40.744, 3.0, 5_000.0, "Alt 1", Tier::Strict),
            ],
            2,
        );
        assert_eq!(out.len(), 3);
        assert_eq!(
            out.iter().filter(|c| c.source_route == "Route 1").count(),
            2
        );
    }

    #[test]
    fn finalize_truncates() {
        let weights = TieBreak::default();
        let all: Vec<_> = (0..6)
            .map(|i| candidate(40.740 + i as f64 * 0.001, i as f64, 5_000.0, "Route 1", Tier::Relaxed))
            .collect();

        let out = finalize(all, &weights, 6, 4);
        assert_eq!(out.len(), 4);
        assert_eq!(out[0].savings_usd, 5.0);
    }

    #[test]
    fn empty_input() {
        let weights = TieBreak::default();
        assert!(rank_candidates(vec![], &weights).is_empty());
        assert!(deduplicate(vec![], 6).is_empty());
        assert!(cap_per_route(vec![], 2).is_empty());
        assert!(finalize(vec![], &weights, 6, 4).is_empty());
    }
}
