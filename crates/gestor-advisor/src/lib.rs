//! Gestor Advisor - spending advice from a text-generation API
//!
//! Errors never leave this crate: every failure becomes a fixed
//! user-facing message and a log line.

pub mod error;
pub mod prompt;
pub mod provider;

use gestor_config::AdvisorConfig;
use gestor_core::Transaction;
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

pub use error::{AdvisorError, AdvisorErrorCode, AdvisorResult};
pub use prompt::{build_prompt, digest};
pub use provider::{AdviceProvider, HttpAdviceProvider};

pub const NO_TRANSACTIONS_MESSAGE: &str =
    "Adicione algumas transações para que eu possa analisar sua saúde financeira!";
pub const EMPTY_RESPONSE_MESSAGE: &str = "Não foi possível gerar insights no momento.";
pub const FAILURE_MESSAGE: &str =
    "Ocorreu um erro ao consultar a inteligência artificial. Tente novamente mais tarde.";
pub const BUSY_MESSAGE: &str = "Já estamos analisando suas finanças. Aguarde a resposta atual.";
pub const DISABLED_MESSAGE: &str = "Os insights estão desativados nas configurações.";

/// How an advice request ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AdviceStatus {
    Ready,
    NoTransactions,
    EmptyResponse,
    Failed,
    Busy,
    Disabled,
}

/// Text to show plus how it was obtained
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Advice {
    pub status: AdviceStatus,
    pub text: String,
}

impl Advice {
    fn fallback(status: AdviceStatus, text: &str) -> Self {
        Self {
            status,
            text: text.to_string(),
        }
    }

    pub fn is_ready(&self) -> bool {
        self.status == AdviceStatus::Ready
    }
}

/// Clears the in-flight flag when dropped
struct InFlight<'a>(&'a AtomicBool);

impl<'a> InFlight<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| InFlight(flag))
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Advice front door shared by all requests
///
/// At most one provider call is outstanding; concurrent callers get
/// `AdviceStatus::Busy` immediately.
pub struct Advisor {
    provider: Arc<dyn AdviceProvider>,
    enabled: bool,
    in_flight: AtomicBool,
}

impl Advisor {
    pub fn new(provider: Arc<dyn AdviceProvider>, enabled: bool) -> Self {
        Self {
            provider,
            enabled,
            in_flight: AtomicBool::new(false),
        }
    }

    /// HTTP provider configured from the `advisor` section
    pub fn from_config(config: &AdvisorConfig) -> AdvisorResult<Self> {
        let provider = HttpAdviceProvider::from_config(config)?;
        Ok(Self::new(Arc::new(provider), config.enabled))
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Whether a request is outstanding right now
    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Ask for advice on `transactions`
    pub async fn advise(&self, transactions: &[Transaction]) -> Advice {
        if !self.enabled {
            return Advice::fallback(AdviceStatus::Disabled, DISABLED_MESSAGE);
        }
        if transactions.is_empty() {
            return Advice::fallback(AdviceStatus::NoTransactions, NO_TRANSACTIONS_MESSAGE);
        }

        let _guard = match InFlight::acquire(&self.in_flight) {
            Some(guard) => guard,
            None => {
                log::info!("Advice request rejected: another one is in flight");
                return Advice::fallback(AdviceStatus::Busy, BUSY_MESSAGE);
            }
        };

        let prompt = build_prompt(&digest(transactions));
        log::info!(
            "Requesting advice from {} for {} transactions",
            self.provider.name(),
            transactions.len()
        );

        match self.provider.generate(&prompt).await {
            Ok(text) if text.trim().is_empty() => {
                log::warn!("Advice provider returned no text");
                Advice::fallback(AdviceStatus::EmptyResponse, EMPTY_RESPONSE_MESSAGE)
            }
            Ok(text) => Advice {
                status: AdviceStatus::Ready,
                text,
            },
            Err(e) => {
                log::error!(target: "gestor::error", "[{}] advise: {}", e.code(), e);
                Advice::fallback(AdviceStatus::Failed, FAILURE_MESSAGE)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use gestor_core::{Category, TransactionType};
    use rust_decimal::Decimal;
    use std::sync::Mutex;
    use tokio::sync::Notify;

    struct FakeProvider {
        reply: Result<String, ()>,
        prompts: Mutex<Vec<String>>,
    }

    impl FakeProvider {
        fn replying(reply: Result<&str, ()>) -> Arc<Self> {
            Arc::new(Self {
                reply: reply.map(str::to_string),
                prompts: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl AdviceProvider for FakeProvider {
        async fn generate(&self, prompt: &str) -> AdvisorResult<String> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            self.reply.clone().map_err(|_| AdvisorError::Request {
                message: "connection refused".to_string(),
            })
        }

        fn name(&self) -> String {
            "fake".to_string()
        }
    }

    /// Blocks until released, to hold the gate open
    struct SlowProvider {
        started: Notify,
        release: Notify,
    }

    #[async_trait]
    impl AdviceProvider for SlowProvider {
        async fn generate(&self, _prompt: &str) -> AdvisorResult<String> {
            self.started.notify_one();
            self.release.notified().await;
            Ok("- poupe".to_string())
        }

        fn name(&self) -> String {
            "slow".to_string()
        }
    }

    fn sample() -> Vec<Transaction> {
        vec![Transaction {
            id: "1".to_string(),
            description: "Mercado".to_string(),
            amount: Decimal::from(80),
            kind: TransactionType::Expense,
            category: Category::Food,
            date: NaiveDate::from_ymd_opt(2024, 5, 3).unwrap(),
            observations: None,
            is_fixed: false,
            fixed_expense_id: None,
        }]
    }

    #[tokio::test]
    async fn test_ready_advice_sends_digest() {
        let provider = FakeProvider::replying(Ok("- Dica"));
        let advisor = Advisor::new(provider.clone(), true);
        let advice = advisor.advise(&sample()).await;
        assert!(advice.is_ready());
        assert_eq!(advice.text, "- Dica");

        let prompts = provider.prompts.lock().unwrap();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("2024-05-03: Mercado (Despesa) - R$ 80.00 [Cat: food]"));
    }

    #[tokio::test]
    async fn test_fallbacks() {
        let provider = FakeProvider::replying(Ok("   "));
        let advisor = Advisor::new(provider.clone(), true);

        let advice = advisor.advise(&[]).await;
        assert_eq!(advice.status, AdviceStatus::NoTransactions);
        assert_eq!(advice.text, NO_TRANSACTIONS_MESSAGE);
        assert!(provider.prompts.lock().unwrap().is_empty());

        let advice = advisor.advise(&sample()).await;
        assert_eq!(advice.status, AdviceStatus::EmptyResponse);
        assert_eq!(advice.text, EMPTY_RESPONSE_MESSAGE);

        let failing = Advisor::new(FakeProvider::replying(Err(())), true);
        let advice = failing.advise(&sample()).await;
        assert_eq!(advice.status, AdviceStatus::Failed);
        assert_eq!(advice.text, FAILURE_MESSAGE);
        assert!(!failing.is_busy());
    }

    #[tokio::test]
    async fn test_disabled_never_calls_provider() {
        let provider = FakeProvider::replying(Ok("x"));
        let advisor = Advisor::new(provider.clone(), false);
        assert_eq!(advisor.advise(&sample()).await.status, AdviceStatus::Disabled);
        assert!(provider.prompts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_second_request_while_in_flight_is_busy() {
        let provider = Arc::new(SlowProvider {
            started: Notify::new(),
            release: Notify::new(),
        });
        let advisor = Arc::new(Advisor::new(provider.clone(), true));

        let first = {
            let advisor = advisor.clone();
            tokio::spawn(async move { advisor.advise(&sample()).await })
        };
        provider.started.notified().await;
        assert!(advisor.is_busy());

        let second = advisor.advise(&sample()).await;
        assert_eq!(second.status, AdviceStatus::Busy);

        provider.release.notify_one();
        let first = first.await.unwrap();
        assert!(first.is_ready());
        assert!(!advisor.is_busy());
    }
}
