// src/services/events.rs

use tokio::sync::broadcast;
use tokio_stream::{wrappers::BroadcastStream, Stream, StreamExt};
use uuid::Uuid;

use crate::models::events::ChangeEvent;

const DEFAULT_CAPACITY: usize = 256;

/// Barramento de mudanças em memória. Publicar sem ouvintes não é erro.
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<ChangeEvent>,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn publish(&self, event: ChangeEvent) {
        let name = event.event_name();
        match self.sender.send(event) {
            Ok(listeners) => tracing::debug!("📣 {} entregue a {} ouvinte(s)", name, listeners),
            Err(_) => tracing::trace!("📣 {} sem ouvintes", name),
        }
    }

    /// A inscrição é um valor: soltá-la (drop) cancela.
    pub fn subscribe(&self, tenant_id: Uuid) -> Subscription {
        Subscription {
            tenant_id,
            receiver: self.sender.subscribe(),
        }
    }

    #[cfg(test)]
    pub fn listener_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

pub struct Subscription {
    tenant_id: Uuid,
    receiver: broadcast::Receiver<ChangeEvent>,
}

impl Subscription {
    /// Eventos da agência; atrasos descartam o excedente e seguem.
    pub fn into_stream(self) -> impl Stream<Item = ChangeEvent> + Send + 'static {
        let tenant_id = self.tenant_id;
        BroadcastStream::new(self.receiver).filter_map(move |item| match item {
            Ok(event) if event.tenant_id == tenant_id => Some(event),
            Ok(_) => None,
            Err(lagged) => {
                tracing::warn!("⚠️ Stream SSE atrasado: {}", lagged);
                None
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::events::EntityKind;

    #[tokio::test]
    async fn subscribers_only_see_their_tenant() {
        let bus = EventBus::new(16);
        let (mine, other) = (Uuid::new_v4(), Uuid::new_v4());
        let mut stream = Box::pin(bus.subscribe(mine).into_stream());

        bus.publish(ChangeEvent::created(other, EntityKind::Ticket, Uuid::new_v4()));
        let wanted = ChangeEvent::updated(mine, EntityKind::Coupon, Uuid::new_v4());
        bus.publish(wanted.clone());

        assert_eq!(stream.next().await, Some(wanted));
    }

    #[tokio::test]
    async fn dropping_the_subscription_unsubscribes() {
        let bus = EventBus::new(16);
        let sub = bus.subscribe(Uuid::new_v4());
        assert_eq!(bus.listener_count(), 1);

        drop(sub);
        assert_eq!(bus.listener_count(), 0);
        // Sem ouvintes, publicar continua ok
        bus.publish(ChangeEvent::deleted(Uuid::new_v4(), EntityKind::Todo, Uuid::new_v4()));
    }

    #[tokio::test]
    async fn stream_filters_by_tenant() {
        let bus = EventBus::new(16);
        let tenant = Uuid::new_v4();
        let mut stream = Box::pin(bus.subscribe(tenant).into_stream());

        bus.publish(ChangeEvent::created(Uuid::new_v4(), EntityKind::Task, Uuid::new_v4()));
        bus.publish(ChangeEvent::created(tenant, EntityKind::Task, Uuid::nil()));

        let first = stream.next().await.unwrap();
        assert_eq!(first.tenant_id, tenant);
        assert_eq!(first.id, Uuid::nil());
    }
}
