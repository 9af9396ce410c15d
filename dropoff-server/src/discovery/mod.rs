//! Alternate drop-off discovery.
//!
//! Given a pickup and a destination, finds drop-off points near the end of
//! the drive that are within walking distance of the destination and
//! cheaper than riding all the way:
//! - [`build_route_set`] fetches Regular and Alternate routes
//! - [`sample_tail`] draws candidate points from each route's tail
//! - [`probe`] and [`classify`] evaluate a point under a [`Tier`]
//! - [`Discovery`] relaxes Strict, Relaxed and Fallback until enough
//!   suggestions are found, then ranks and caps them

mod candidate;
mod config;
mod error;
mod evaluate;
mod fanout;
mod generation;
mod pipeline;
mod rank;
mod route_set;
mod sample;

pub use candidate::{Candidate, DriveStats, Tier, WalkStats};
pub use config::{
    CapsConfig, DiscoveryConfig, PriceGate, SamplingConfig, SurgeConfig, SyntheticAlternates,
    TieBreak, TierFactors,
};
pub use error::DiscoveryError;
pub use evaluate::{Baseline, PointStats, Rejection, TripContext, classify, evaluate, probe};
pub use fanout::bounded_map;
pub use generation::{GenerationToken, Generations};
pub use pipeline::{
    Discovery, DiscoveryRequest, DiscoveryResult, VisibleRoutes, describe_candidates, discover,
};
pub use rank::{cap_per_route, deduplicate, finalize, rank_candidates, tie_break_cost};
pub use route_set::{RouteSet, RouteSummary, baseline_fare, build_route_set, summarize};
pub use sample::sample_tail;
