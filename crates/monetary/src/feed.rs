//! External ecological feed and dashboard streaming boundary
//!
//! Feed failures never escape: [`read_or_fallback`] turns every fetch into a
//! [`FeedReading`], and sink errors are logged by the epoch loop and dropped.
//! HTTP implementations live behind the `live-feed` cargo feature.

use crate::errors::FeedError;
use crate::types::{EcoSource, EpochIndex, EpochRecord};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Lower clamp of a live ecological index
pub const LIVE_ECO_MIN: f64 = 0.8;
/// Upper clamp of a live ecological index
pub const LIVE_ECO_MAX: f64 = 1.5;

/// Source of a live ecological index
pub trait EcologicalFeed {
    fn fetch(&mut self, epoch: EpochIndex) -> Result<f64, FeedError>;
}

/// Receives streamed epoch records
pub trait EpochSink {
    fn push(&mut self, record: &EpochRecord) -> Result<(), FeedError>;
}

/// Eco index consumed by the loop, tagged with its origin
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FeedReading {
    Live(f64),
    Fallback(f64),
}

impl FeedReading {
    pub fn value(&self) -> f64 {
        match self {
            FeedReading::Live(v) | FeedReading::Fallback(v) => *v,
        }
    }

    pub fn source(&self) -> EcoSource {
        match self {
            FeedReading::Live(_) => EcoSource::Live,
            FeedReading::Fallback(_) => EcoSource::Fallback,
        }
    }
}

/// Fetch from `feed`, substituting `fallback` on any failure.
pub fn read_or_fallback(
    feed: &mut dyn EcologicalFeed,
    epoch: EpochIndex,
    fallback: f64,
) -> FeedReading {
    match feed.fetch(epoch) {
        Ok(value) if value.is_finite() => FeedReading::Live(value),
        Ok(value) => {
            warn!(
                target: "feed",
                "Epoch {}: feed returned non-finite index {}, using synthetic",
                epoch, value
            );
            FeedReading::Fallback(fallback)
        }
        Err(e) => {
            warn!(target: "feed", "Epoch {}: {}, using synthetic", epoch, e);
            FeedReading::Fallback(fallback)
        }
    }
}

/// Ecological metrics document served by the feed endpoint
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EcoMetricsPayload {
    #[serde(default)]
    pub co2_tonnes: f64,
    #[serde(default)]
    pub biodiversity_index: f64,
    #[serde(default)]
    pub hectares_restored: f64,
}

impl EcoMetricsPayload {
    /// Combine raw metrics into an index clamped to `[0.8, 1.5]`.
    pub fn eco_index(&self) -> f64 {
        let raw = 1.0
            + 0.001 * self.co2_tonnes
            + 0.01 * self.biodiversity_index
            + 0.0001 * self.hectares_restored;
        if raw.is_nan() {
            return 1.0;
        }
        raw.clamp(LIVE_ECO_MIN, LIVE_ECO_MAX)
    }
}

/// Sink collecting streamed records in memory
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    pub records: Vec<EpochRecord>,
}

impl EpochSink for MemorySink {
    fn push(&mut self, record: &EpochRecord) -> Result<(), FeedError> {
        self.records.push(record.clone());
        Ok(())
    }
}

#[cfg(feature = "live-feed")]
mod http {
    use super::{EcoMetricsPayload, EcologicalFeed, EpochSink};
    use crate::errors::FeedError;
    use crate::types::{EpochIndex, EpochRecord};
    use reqwest::blocking::Client;
    use std::time::Duration;
    use tracing::debug;

    fn client(timeout_secs: u64) -> Result<Client, FeedError> {
        Ok(Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?)
    }

    /// Blocking HTTP ecological feed
    pub struct HttpEcoFeed {
        client: Client,
        url: String,
    }

    impl HttpEcoFeed {
        pub fn new(url: impl Into<String>, timeout_secs: u64) -> Result<Self, FeedError> {
            Ok(Self {
                client: client(timeout_secs)?,
                url: url.into(),
            })
        }
    }

    impl EcologicalFeed for HttpEcoFeed {
        fn fetch(&mut self, epoch: EpochIndex) -> Result<f64, FeedError> {
            let payload: EcoMetricsPayload = self
                .client
                .get(&self.url)
                .send()?
                .error_for_status()?
                .json()?;
            let index = payload.eco_index();
            debug!(target: "feed", "Epoch {}: live eco index {:.4}", epoch, index);
            Ok(index)
        }
    }

    /// Blocking HTTP dashboard push
    pub struct HttpDashboardSink {
        client: Client,
        url: String,
    }

    impl HttpDashboardSink {
        pub fn new(url: impl Into<String>, timeout_secs: u64) -> Result<Self, FeedError> {
            Ok(Self {
                client: client(timeout_secs)?,
                url: url.into(),
            })
        }
    }

    impl EpochSink for HttpDashboardSink {
        fn push(&mut self, record: &EpochRecord) -> Result<(), FeedError> {
            self.client
                .post(&self.url)
                .json(record)
                .send()?
                .error_for_status()?;
            Ok(())
        }
    }
}

#[cfg(feature = "live-feed")]
pub use http::{HttpDashboardSink, HttpEcoFeed};

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedFeed(Result<f64, ()>);

    impl EcologicalFeed for FixedFeed {
        fn fetch(&mut self, _epoch: EpochIndex) -> Result<f64, FeedError> {
            self.0
                .map_err(|_| FeedError::Unavailable("status 503".into()))
        }
    }

    #[test]
    fn test_live_reading() {
        let mut feed = FixedFeed(Ok(1.2));
        let reading = read_or_fallback(&mut feed, 3, 0.9);
        assert_eq!(reading, FeedReading::Live(1.2));
        assert_eq!(reading.source(), EcoSource::Live);
    }

    #[test]
    fn test_failure_falls_back() {
        let mut feed = FixedFeed(Err(()));
        let reading = read_or_fallback(&mut feed, 3, 0.9);
        assert_eq!(reading, FeedReading::Fallback(0.9));
        assert_eq!(reading.value(), 0.9);
    }

    #[test]
    fn test_non_finite_falls_back() {
        let mut feed = FixedFeed(Ok(f64::INFINITY));
        assert_eq!(read_or_fallback(&mut feed, 0, 1.0).source(), EcoSource::Fallback);
    }

    #[test]
    fn test_payload_index_and_clamp() {
        let payload: EcoMetricsPayload =
            serde_json::from_str(r#"{"co2_tonnes": 100, "biodiversity_index": 5}"#).unwrap();
        assert!((payload.eco_index() - 1.15).abs() < 1e-12);

        let huge = EcoMetricsPayload {
            hectares_restored: 1e9,
            ..Default::default()
        };
        assert_eq!(huge.eco_index(), LIVE_ECO_MAX);

        let negative = EcoMetricsPayload {
            co2_tonnes: -1e6,
            ..Default::default()
        };
        assert_eq!(negative.eco_index(), LIVE_ECO_MIN);

        assert_eq!(EcoMetricsPayload::default().eco_index(), 1.0);
    }
}
