//! Plan matching: premium resolution, budget filtering, scoring, ranking,
//! optional cover adjustment, and report assembly
//!
//! Data flows one way:
//! query + catalog → filter → scorer → ranker → report.
//! Every call takes the catalog snapshot explicitly; nothing here holds
//! shared mutable state.

mod covers;
mod engine;
mod filter;
mod premium;
mod query;
mod ranker;
mod report;
mod scorer;

pub use covers::{adjusted_premium, AdjustedPremium, CoverLine, CoverState};
pub use engine::{build_report, EngineConfig, MatchEngine, DEFAULT_MAX_CANDIDATES};
pub use filter::filter_by_budget;
pub use premium::{
    format_amount, listing_label, minimum_premium, premium_span, query_premium, resolve_premium,
    Premium, PremiumSpan, AGE_BASED, CONTACT_FOR_PRICING,
};
pub use query::{ApplicantAge, CoverageLevel, RoomType, UserQuery};
pub(crate) use query::{lenient_age, lenient_covers};
pub use ranker::{rank, MatchResult, ScoredPlan};
pub use report::{MatchReport, ReportEntry};
pub use scorer::{
    budget_term, coverage_term, room_term, score_plan, score_with_draw, ConstantJitter, JitterSource,
    NoJitter, ScoreBreakdown,
};
