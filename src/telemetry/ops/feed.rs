use tracing::Span;
use tracing::info_span;

use crate::telemetry::ctx::{OpMarker, PhaseSpan};

#[derive(Copy, Clone, Debug)]
pub struct Feed;

#[derive(Copy, Clone, Debug)]
pub enum Phase { Prepare, Fetch, Resolve, Range }

impl PhaseSpan for Phase {
    fn name(&self) -> &'static str { match self {
        Phase::Prepare => "prepare",
        Phase::Fetch => "fetch",
        Phase::Resolve => "resolve",
        Phase::Range => "range",
    }}
    fn span(&self) -> Span { match self {
        Phase::Prepare => info_span!("prepare"),
        Phase::Fetch => info_span!("fetch"),
        Phase::Resolve => info_span!("resolve"),
        Phase::Range => info_span!("range"),
    }}
}

impl OpMarker for Feed {
    const NAME: &'static str = "feed";
    type Phase = Phase;
    fn root_span() -> Span { info_span!("feed") }
}
