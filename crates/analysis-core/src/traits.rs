use async_trait::async_trait;
use crate::{AnalysisError, FinancialSnapshot, PriceSeries, ReferenceUniverse};

/// Supplies raw inputs for one security. Implementations own all network,
/// caching and rate-limiting concerns; missing fields must come back as `None`.
#[async_trait]
pub trait DataProvider: Send + Sync {
    async fn fetch(&self, symbol: &str) -> Result<(FinancialSnapshot, PriceSeries), AnalysisError>;
}

/// Supplies the peer set used for relative-strength ranking.
#[async_trait]
pub trait ReferenceUniverseProvider: Send + Sync {
    async fn universe(&self) -> Result<ReferenceUniverse, AnalysisError>;
}
