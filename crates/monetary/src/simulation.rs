//! Epoch simulation loop
//!
//! Per epoch, in order: signals, governor, fund and inflation, controller,
//! record. State is threaded by value; nothing is shared between runs.

use crate::config::{SimulationConfig, MAX_EPOCHS};
use crate::controller::{Controller, ControllerKind, ParameterController};
use crate::errors::MonetaryError;
use crate::feed::EpochSink;
use crate::governor;
use crate::signals::{SignalSource, SyntheticSignals};
use crate::types::{EpochRecord, EpochState, PolicyParams};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Records of one completed run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationRun {
    pub controller: ControllerKind,
    /// Gains the run started from (before any clamping)
    pub initial_params: PolicyParams,
    pub records: Vec<EpochRecord>,
}

impl SimulationRun {
    pub fn last(&self) -> Option<&EpochRecord> {
        self.records.last()
    }

    pub fn final_supply(&self) -> Option<f64> {
        self.last().map(|r| r.supply)
    }
}

/// Configured run, consumed by [`Simulation::run`]
pub struct Simulation<'a> {
    config: &'a SimulationConfig,
    controller: Controller,
    initial: PolicyParams,
    sink: Option<&'a mut dyn EpochSink>,
}

impl<'a> Simulation<'a> {
    pub fn new(config: &'a SimulationConfig, kind: ControllerKind) -> Self {
        Self {
            config,
            controller: Controller::from_config(kind, config),
            initial: config.control.initial,
            sink: None,
        }
    }

    /// Start from gains other than `config.control.initial`.
    pub fn with_initial_params(mut self, params: PolicyParams) -> Self {
        self.initial = params;
        self
    }

    /// Stream every `feed.stream_interval`-th record to `sink`.
    pub fn with_sink(mut self, sink: &'a mut dyn EpochSink) -> Self {
        self.sink = Some(sink);
        self
    }

    pub fn run(mut self, signals: &mut dyn SignalSource) -> SimulationRun {
        let config = self.config;
        let interval = config.feed.stream_interval.max(1);
        let mut state = EpochState {
            supply: config.supply.initial_supply,
            fund: config.supply.initial_fund,
            params: self.initial,
        };
        let mut records = Vec::with_capacity(record_capacity(config.epochs));

        for epoch in 0..config.epochs {
            let sig = signals.next_epoch(epoch);

            let step = governor::step(sig.fees, state.supply, state.params, sig.eco_index, config);
            let fund = governor::update_fund(state.fund, sig.fees, step.mint, config);
            let inflation = governor::inflation_rate(step.mint, step.burn, step.new_supply);
            let params = self.controller.adjust(state.params, inflation, sig.eco_index);

            state = EpochState {
                supply: step.new_supply,
                fund,
                params,
            };

            let record = EpochRecord {
                epoch,
                fees: sig.fees,
                eco_index: sig.eco_index,
                eco_source: sig.eco_source,
                mint: step.mint,
                burn: step.burn,
                supply: state.supply,
                fund: state.fund,
                inflation_rate: inflation,
                alpha: params.alpha,
                beta: params.beta,
            };

            debug!(
                target: "monetary",
                "Epoch {}: fees {:.0} eco {:.4} mint {:.0} burn {:.0} supply {:.0} infl {:.6}",
                epoch,
                record.fees,
                record.eco_index,
                record.mint,
                record.burn,
                record.supply,
                inflation
            );

            if epoch % interval == 0 {
                if let Some(sink) = self.sink.as_deref_mut() {
                    if let Err(e) = sink.push(&record) {
                        warn!(target: "feed", "Epoch {}: dashboard push failed: {}", epoch, e);
                    }
                }
            }

            records.push(record);
        }

        info!(
            target: "monetary",
            "{} run complete: {} epochs, final supply {:.0}, final fund {:.0}",
            self.controller.kind(), records.len(), state.supply, state.fund
        );

        SimulationRun {
            controller: self.controller.kind(),
            initial_params: self.initial,
            records,
        }
    }
}

/// Synthetic signals for `config`, attaching the live feed when configured.
pub fn default_signals(config: &SimulationConfig) -> SyntheticSignals {
    let signals = SyntheticSignals::new(config.signals.clone(), config.seed);
    if !config.feed.use_live_feed {
        return signals;
    }
    attach_live_feed(signals, config)
}

#[cfg(feature = "live-feed")]
fn attach_live_feed(signals: SyntheticSignals, config: &SimulationConfig) -> SyntheticSignals {
    match crate::feed::HttpEcoFeed::new(config.feed.eco_url.clone(), config.feed.timeout_secs) {
        Ok(feed) => signals.with_feed(Box::new(feed)),
        Err(e) => {
            warn!(target: "feed", "Live feed unavailable ({}), running synthetic", e);
            signals
        }
    }
}

#[cfg(not(feature = "live-feed"))]
fn attach_live_feed(signals: SyntheticSignals, _config: &SimulationConfig) -> SyntheticSignals {
    warn!(
        target: "feed",
        "use_live_feed set but built without the live-feed feature; running synthetic"
    );
    signals
}

/// Dashboard sink for `config` when streaming is enabled and available.
pub fn default_sink(config: &SimulationConfig) -> Option<Box<dyn EpochSink>> {
    if !config.feed.enable_streaming {
        return None;
    }
    dashboard_sink(config)
}

#[cfg(feature = "live-feed")]
fn dashboard_sink(config: &SimulationConfig) -> Option<Box<dyn EpochSink>> {
    let url = config.feed.dashboard_url.clone();
    match crate::feed::HttpDashboardSink::new(url, config.feed.timeout_secs) {
        Ok(sink) => Some(Box::new(sink)),
        Err(e) => {
            warn!(target: "feed", "Dashboard streaming disabled: {}", e);
            None
        }
    }
}

#[cfg(not(feature = "live-feed"))]
fn dashboard_sink(_config: &SimulationConfig) -> Option<Box<dyn EpochSink>> {
    warn!(target: "feed", "enable_streaming set but built without the live-feed feature");
    None
}

/// Upfront record reservation, bounded for configs that skipped validation
pub(crate) fn record_capacity(epochs: u64) -> usize {
    usize::try_from(epochs.min(MAX_EPOCHS)).unwrap_or(0)
}

/// Validate `config`, then run `kind` over the configured signals, feed and sink.
pub fn run_simulation(
    config: &SimulationConfig,
    kind: ControllerKind,
) -> Result<SimulationRun, MonetaryError> {
    config.validate()?;
    let mut signals = default_signals(config);
    let mut sink = default_sink(config);

    let mut simulation = Simulation::new(config, kind);
    if let Some(sink) = sink.as_deref_mut() {
        simulation = simulation.with_sink(sink);
    }
    Ok(simulation.run(&mut signals))
}
