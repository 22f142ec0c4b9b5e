use tracing::{info_span, Span};

use crate::telemetry::ctx::{OpMarker, PhaseSpan};

#[derive(Copy, Clone, Debug)]
pub struct Run;

#[derive(Copy, Clone, Debug)]
pub enum Phase {
    Prepare,
    FetchFeed,
    Resolve,
    Prompt,
    CallLlm,
    Render,
    Notify,
}

impl PhaseSpan for Phase {
    fn name(&self) -> &'static str {
        match self {
            Phase::Prepare => "prepare",
            Phase::FetchFeed => "fetch_feed",
            Phase::Resolve => "resolve",
            Phase::Prompt => "prompt",
            Phase::CallLlm => "call_llm",
            Phase::Render => "render",
            Phase::Notify => "notify",
        }
    }

    fn span(&self) -> Span {
        match self {
            Phase::Prepare => info_span!("prepare"),
            Phase::FetchFeed => info_span!("fetch_feed"),
            Phase::Resolve => info_span!("resolve"),
            Phase::Prompt => info_span!("prompt"),
            Phase::CallLlm => info_span!("call_llm"),
            Phase::Render => info_span!("render"),
            Phase::Notify => info_span!("notify"),
        }
    }
}

impl OpMarker for Run {
    const NAME: &'static str = "run";
    type Phase = Phase;

    fn root_span() -> Span {
        info_span!("run")
    }
}
