//! Domain events and the receivers that react to them.
//!
//! Receivers are registered once at start-up and run synchronously inside the
//! operation that sent the event. A failing receiver is logged and skipped;
//! the triggering operation has already been committed and is never rolled
//! back or retried.

mod notifications;
mod surveys;

use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::entities::turno;
use crate::error::AppResult;

pub use notifications::NotificationReceiver;
pub use surveys::SurveyReceiver;

#[derive(Debug, Clone)]
pub enum DomainEvent {
    TurnoCreado(turno::Model),
    TurnoConfirmado(turno::Model),
    TurnoCompletado(turno::Model),
    TurnoCancelado(turno::Model),
    TurnoReasignado {
        turno: turno::Model,
        anterior: sea_orm::prelude::DateTimeWithTimeZone,
    },
}

impl DomainEvent {
    pub fn name(&self) -> &'static str {
        match self {
            DomainEvent::TurnoCreado(_) => "turno_creado",
            DomainEvent::TurnoConfirmado(_) => "turno_confirmado",
            DomainEvent::TurnoCompletado(_) => "turno_completado",
            DomainEvent::TurnoCancelado(_) => "turno_cancelado",
            DomainEvent::TurnoReasignado { .. } => "turno_reasignado",
        }
    }

    pub fn turno(&self) -> &turno::Model {
        match self {
            DomainEvent::TurnoCreado(t)
            | DomainEvent::TurnoConfirmado(t)
            | DomainEvent::TurnoCompletado(t)
            | DomainEvent::TurnoCancelado(t) => t,
            DomainEvent::TurnoReasignado { turno, .. } => turno,
        }
    }
}

#[async_trait::async_trait]
pub trait Receiver: Send + Sync {
    fn name(&self) -> &'static str;

    async fn receive(&self, db: &DatabaseConnection, event: &DomainEvent) -> AppResult<()>;
}

#[derive(Clone, Default)]
pub struct SignalRegistry {
    receivers: Vec<Arc<dyn Receiver>>,
}

impl SignalRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the notification and survey receivers connected.
    pub fn with_default_receivers() -> Self {
        let mut registry = Self::new();
        registry.connect(NotificationReceiver);
        registry.connect(SurveyReceiver);
        registry
    }

    pub fn connect<R: Receiver + 'static>(&mut self, receiver: R) {
        tracing::debug!(receiver = receiver.name(), "Signal receiver connected");
        self.receivers.push(Arc::new(receiver));
    }

    pub fn len(&self) -> usize {
        self.receivers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.receivers.is_empty()
    }

    /// Deliver `event` to every receiver in registration order.
    /// Returns how many receivers handled it without error.
    pub async fn send(&self, db: &DatabaseConnection, event: &DomainEvent) -> usize {
        let mut delivered = 0;
        for receiver in &self.receivers {
            match receiver.receive(db, event).await {
                Ok(()) => delivered += 1,
                Err(e) => tracing::warn!(
                    receiver = receiver.name(),
                    event = event.name(),
                    turno_id = event.turno().id,
                    error = %e,
                    "Signal receiver failed"
                ),
            }
        }
        delivered
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Counting(Arc<AtomicUsize>);

    #[async_trait::async_trait]
    impl Receiver for Counting {
        fn name(&self) -> &'static str {
            "counting"
        }

        async fn receive(&self, _db: &DatabaseConnection, _event: &DomainEvent) -> AppResult<()> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    struct Failing;

    #[async_trait::async_trait]
    impl Receiver for Failing {
        fn name(&self) -> &'static str {
            "failing"
        }

        async fn receive(&self, _db: &DatabaseConnection, _event: &DomainEvent) -> AppResult<()> {
            Err(AppError::Internal("receiver down".to_string()))
        }
    }

    fn sample_turno() -> turno::Model {
        let now: sea_orm::prelude::DateTimeWithTimeZone = chrono::Utc::now().into();
        turno::Model {
            id: 7,
            cliente_id: 1,
            empleado_id: 1,
            servicio_id: 1,
            fecha_hora: now,
            estado: turno::EstadoTurno::Pendiente,
            precio_final: rust_decimal::Decimal::new(1500, 0),
            notas_cliente: None,
            created_at: now,
        }
    }

    #[tokio::test]
    async fn test_failing_receiver_does_not_stop_the_rest() {
        let db = crate::db::connect_in_memory().await.unwrap();
        let hits = Arc::new(AtomicUsize::new(0));

        let mut registry = SignalRegistry::new();
        registry.connect(Failing);
        registry.connect(Counting(hits.clone()));

        let delivered = registry
            .send(&db, &DomainEvent::TurnoCreado(sample_turno()))
            .await;

        assert_eq!(delivered, 1);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_default_registry_has_both_receivers() {
        assert_eq!(SignalRegistry::with_default_receivers().len(), 2);
    }
}
