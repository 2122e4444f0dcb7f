use lazy_static::lazy_static;
use prometheus::{
    exponential_buckets, Histogram, HistogramOpts, IntCounter, IntGauge, Opts, Registry,
};

lazy_static! {
    pub static ref FLUSH_TIME_HIST: Histogram = Histogram::with_opts(
        HistogramOpts::new("flush_time", "Complete time to write a funnel batch")
            .namespace("levtree")
            .buckets(exponential_buckets(0.00001, 2.0, 17).unwrap()),
    )
    .unwrap();
    pub static ref FLUSH_SIZE_HIST: Histogram = Histogram::with_opts(
        HistogramOpts::new("flush_size", "Number of nodes per funnel batch")
            .namespace("levtree")
            .buckets(exponential_buckets(1.0, 2.0, 16).unwrap()),
    )
    .unwrap();
    pub static ref FLUSHED_NODES: IntCounter = IntCounter::with_opts(
        Opts::new("flushed_nodes", "Nodes written by funnel flushes").namespace("levtree"),
    )
    .unwrap();
    pub static ref FLUSH_FAILURES: IntCounter = IntCounter::with_opts(
        Opts::new("flush_failures", "Funnel flushes whose batch write failed").namespace("levtree"),
    )
    .unwrap();
    pub static ref STAGED_NODES: IntGauge = IntGauge::with_opts(
        Opts::new("staged_nodes", "Nodes currently staged in the funnel").namespace("levtree"),
    )
    .unwrap();
}

pub(crate) fn register(registry: &Registry) -> anyhow::Result<()> {
    registry.register(Box::new(FLUSH_TIME_HIST.clone()))?;
    registry.register(Box::new(FLUSH_SIZE_HIST.clone()))?;
    registry.register(Box::new(FLUSHED_NODES.clone()))?;
    registry.register(Box::new(FLUSH_FAILURES.clone()))?;
    registry.register(Box::new(STAGED_NODES.clone()))?;
    Ok(())
}
