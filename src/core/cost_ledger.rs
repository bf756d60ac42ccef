//! Running session cost tracking

use rust_decimal::Decimal;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

use crate::core::models::{SessionTotals, TranslationOutcome};

/// Accumulates the cost of every successful translation.
///
/// Totals only grow; they are dropped with the owning orchestrator.
#[derive(Debug, Clone, Default)]
pub struct CostLedger {
    totals: Arc<Mutex<SessionTotals>>,
}

impl CostLedger {
    /// Ledger with zero totals
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one outcome into the totals, returning the new total cost
    pub async fn record(&self, outcome: &TranslationOutcome) -> Decimal {
        let mut totals = self.totals.lock().await;
        totals.add(outcome);
        debug!(
            "Recorded {} via {}, session total {} over {} translations",
            outcome.cost, outcome.provider_used, totals.total_cost, totals.translations
        );
        totals.total_cost
    }

    /// Current total cost
    pub async fn total_cost(&self) -> Decimal {
        self.totals.lock().await.total_cost
    }

    /// Snapshot of the current totals
    pub async fn snapshot(&self) -> SessionTotals {
        self.totals.lock().await.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::ProviderId;

    fn outcome(cost: Decimal) -> TranslationOutcome {
        TranslationOutcome {
            translation: "t".to_string(),
            provider_used: ProviderId::Gemini,
            model: "m".to_string(),
            cost,
            tokens_in: 10,
            tokens_out: 5,
        }
    }

    #[tokio::test]
    async fn test_record_accumulates() {
        let ledger = CostLedger::new();
        assert_eq!(ledger.total_cost().await, Decimal::ZERO);

        ledger.record(&outcome(Decimal::new(25, 2))).await;
        let total = ledger.record(&outcome(Decimal::new(75, 2))).await;

        assert_eq!(total, Decimal::ONE);
        let snapshot = ledger.snapshot().await;
        assert_eq!(snapshot.translations, 2);
        assert_eq!(snapshot.tokens_in, 20);
    }

    #[tokio::test]
    async fn test_concurrent_records_are_not_lost() {
        let ledger = CostLedger::new();
        let handles: Vec<_> = (0..64)
            .map(|_| {
                let ledger = ledger.clone();
                tokio::spawn(async move {
                    ledger.record(&outcome(Decimal::new(1, 3))).await;
                })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(ledger.total_cost().await, Decimal::new(64, 3));
        assert_eq!(ledger.snapshot().await.translations, 64);
    }
}
