// src/services/order_service.rs

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::{broadcast, mpsc};
use tokio_stream::wrappers::ReceiverStream;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{ListingStore, OrderStore},
    models::{
        auth::User,
        booking::{BookingQuote, Order, OrderDraft, OrderStatus},
    },
    services::booking,
};

// Capacidade do canal de avisos; assinante atrasado recarrega a lista inteira
const ORDER_EVENTS_CAPACITY: usize = 64;
const WATCH_BUFFER: usize = 8;

// Dados que o hóspede preenche na tela de pagamento
#[derive(Debug, Clone)]
pub struct BookingRequest {
    pub hotel_id: Uuid,
    pub room_type: String,
    pub room_count: i32,
    pub check_in_date: DateTime<Utc>,
    pub check_out_date: DateTime<Utc>,
    pub guest_name: String,
    pub guest_phone: String,
}

#[derive(Clone)]
pub struct OrderService {
    order_repo: Arc<dyn OrderStore>,
    listing_repo: Arc<dyn ListingStore>,
    // Avisa os assinantes de qual usuário teve a lista de pedidos alterada
    events: broadcast::Sender<Uuid>,
}

impl OrderService {
    pub fn new(order_repo: Arc<dyn OrderStore>, listing_repo: Arc<dyn ListingStore>) -> Self {
        let (events, _) = broadcast::channel(ORDER_EVENTS_CAPACITY);
        Self {
            order_repo,
            listing_repo,
            events,
        }
    }

    /// Cotação sobre o estoque atual, sem reservar nada.
    pub async fn quote(
        &self,
        hotel_id: Uuid,
        room_type: &str,
        room_count: i32,
        check_in: DateTime<Utc>,
        check_out: DateTime<Utc>,
    ) -> Result<BookingQuote, AppError> {
        let listing = self
            .listing_repo
            .find_by_id(hotel_id)
            .await?
            .ok_or(AppError::ListingNotFound)?;

        let room = listing
            .room(room_type)
            .ok_or_else(|| AppError::RoomNotFound(room_type.to_string()))?;

        Ok(booking::quote(room, room_count, check_in, check_out)?)
    }

    pub async fn submit_order(&self, user: &User, request: BookingRequest) -> Result<Order, AppError> {
        if request.guest_name.trim().is_empty() || request.guest_phone.trim().is_empty() {
            let mut errors = validator::ValidationErrors::new();
            let mut err = validator::ValidationError::new("blank");
            err.message = Some("Vui lòng nhập đầy đủ họ tên và số điện thoại!".into());
            errors.add("userName", err);
            return Err(AppError::ValidationError(errors));
        }

        let draft = OrderDraft {
            hotel_id: request.hotel_id,
            user_id: user.id,
            user_name: request.guest_name,
            phone_number: request.guest_phone,
            email: user.email.clone(),
            check_in_date: request.check_in_date,
            check_out_date: request.check_out_date,
            room_type: request.room_type,
            room_count: request.room_count,
        };

        let order = self.order_repo.place_order(draft).await?;

        tracing::info!(
            order_id = %order.id,
            hotel_id = %order.hotel_id,
            total = order.total_price,
            "🛏️ Pedido criado (pendente)"
        );
        self.notify(user.id);

        Ok(order)
    }

    pub async fn list_orders(&self, user_id: Uuid) -> Result<Vec<Order>, AppError> {
        self.order_repo.list_for_user(user_id).await
    }

    /// Cancelar = apagar o pedido, e só enquanto está pendente.
    pub async fn cancel_order(&self, user_id: Uuid, order_id: Uuid) -> Result<Order, AppError> {
        let order = self
            .order_repo
            .find_by_id(order_id)
            .await?
            .filter(|o| o.user_id == user_id)
            .ok_or(AppError::OrderNotFound)?;

        if order.status != OrderStatus::Pending {
            return Err(AppError::OrderNotCancellable(order.status));
        }

        // O status pode mudar entre a leitura e o DELETE; o store refaz o filtro
        let deleted = self
            .order_repo
            .delete_pending(order_id, user_id)
            .await?
            .ok_or(AppError::OrderNotCancellable(order.status))?;

        tracing::info!(order_id = %deleted.id, "🗑️ Pedido cancelado");
        self.notify(user_id);

        Ok(deleted)
    }

    /// Visão "ao vivo": entrega a lista completa agora e de novo a cada alteração.
    /// A task termina quando o receptor é descartado (cliente desconectou).
    pub fn watch_orders(&self, user_id: Uuid) -> ReceiverStream<Vec<Order>> {
        let (tx, rx) = mpsc::channel(WATCH_BUFFER);
        let mut events = self.events.subscribe();
        let repo = self.order_repo.clone();

        tokio::spawn(async move {
            loop {
                match repo.list_for_user(user_id).await {
                    Ok(orders) => {
                        if tx.send(orders).await.is_err() {
                            break;
                        }
                    }
                    Err(e) => tracing::error!("Falha ao recarregar pedidos do usuário {}: {}", user_id, e),
                }

                // Espera por uma alteração deste usuário
                loop {
                    let event = tokio::select! {
                        event = events.recv() => event,
                        _ = tx.closed() => {
                            tracing::debug!("Assinatura de pedidos encerrada para {}", user_id);
                            return;
                        }
                    };
                    match event {
                        Ok(changed) if changed == user_id => break,
                        Ok(_) => continue,
                        Err(broadcast::error::RecvError::Lagged(_)) => break,
                        Err(broadcast::error::RecvError::Closed) => return,
                    }
                }
            }
            tracing::debug!("Assinatura de pedidos encerrada para {}", user_id);
        });

        ReceiverStream::new(rx)
    }

    fn notify(&self, user_id: Uuid) {
        // Sem assinantes o send falha, e tudo bem
        let _ = self.events.send(user_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        db::memory::MemoryStore,
        models::catalog::{Listing, ListingType, Room},
        services::booking::BookingError,
    };
    use chrono::TimeZone;
    use std::time::Duration;
    use tokio_stream::StreamExt;

    fn date(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
    }

    fn guest() -> User {
        User {
            id: Uuid::new_v4(),
            username: "lan".into(),
            email: "lan@example.com".into(),
            password_hash: String::new(),
            created_at: Utc::now(),
        }
    }

    fn hotel(owner: Uuid) -> Listing {
        Listing {
            id: Uuid::new_v4(),
            city: "Nha Trang".into(),
            hotel_name: "Sunrise".into(),
            address: None,
            kind: ListingType::Hotel,
            amenities: vec![],
            rating: Some(4.5),
            main_image: None,
            sub_images: vec![],
            owner_id: Some(owner),
            rooms: vec![Room { room_type: "Deluxe".into(), price: 500_000, available: 2 }],
        }
    }

    fn setup() -> (Arc<MemoryStore>, OrderService, Listing) {
        let listing = hotel(Uuid::new_v4());
        let store = Arc::new(MemoryStore::with_listings(vec![listing.clone()]));
        let service = OrderService::new(store.clone(), store.clone());
        (store, service, listing)
    }

    fn request(listing: &Listing, room_count: i32) -> BookingRequest {
        BookingRequest {
            hotel_id: listing.id,
            room_type: "Deluxe".into(),
            room_count,
            check_in_date: date(2024, 1, 1),
            check_out_date: date(2024, 1, 3),
            guest_name: " Nguyễn Lan ".into(),
            guest_phone: "0901234567".into(),
        }
    }

    #[tokio::test]
    async fn submit_creates_pending_order_stamped_with_owner() {
        let (store, service, listing) = setup();
        let user = guest();

        let order = service.submit_order(&user, request(&listing, 2)).await.unwrap();

        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.total_price, 2_000_000);
        assert_eq!(order.hotel_owner_id, listing.owner_id);
        assert_eq!(order.hotel_name, "Sunrise");
        assert_eq!(order.user_name, "Nguyễn Lan");
        assert_eq!(order.email, "lan@example.com");
        assert_eq!(order.nights(), 2);

        // Estoque baixado na mesma operação
        assert_eq!(store.listing(listing.id).unwrap().rooms[0].available, 0);
    }

    #[tokio::test]
    async fn submit_rejects_blank_guest_details() {
        let (store, service, listing) = setup();
        let mut req = request(&listing, 1);
        req.guest_phone = "   ".into();

        let err = service.submit_order(&guest(), req).await.unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));
        assert_eq!(store.listing(listing.id).unwrap().rooms[0].available, 2);
    }

    #[tokio::test]
    async fn submit_rejects_overbooking_without_writing() {
        let (store, service, listing) = setup();
        let user = guest();

        let err = service.submit_order(&user, request(&listing, 3)).await.unwrap_err();
        assert!(matches!(
            err,
            AppError::Booking(BookingError::InsufficientInventory { available: 2 })
        ));
        assert!(service.list_orders(user.id).await.unwrap().is_empty());
        assert_eq!(store.listing(listing.id).unwrap().rooms[0].available, 2);
    }

    #[tokio::test]
    async fn submit_rejects_bad_dates() {
        let (_, service, listing) = setup();
        let mut req = request(&listing, 1);
        req.check_out_date = req.check_in_date;

        let err = service.submit_order(&guest(), req).await.unwrap_err();
        assert!(matches!(err, AppError::Booking(BookingError::InvalidDateRange)));
    }

    #[tokio::test]
    async fn submit_fails_when_listing_disappeared() {
        let (store, service, listing) = setup();
        store.remove_listing(listing.id);

        let err = service.submit_order(&guest(), request(&listing, 1)).await.unwrap_err();
        assert!(matches!(err, AppError::ListingNotFound));
    }

    #[tokio::test]
    async fn unknown_room_type_is_reported() {
        let (_, service, listing) = setup();
        let mut req = request(&listing, 1);
        req.room_type = "Suite".into();

        let err = service.submit_order(&guest(), req).await.unwrap_err();
        assert!(matches!(err, AppError::RoomNotFound(room) if room == "Suite"));
    }

    #[tokio::test]
    async fn cancel_pending_deletes_and_restores_inventory() {
        let (store, service, listing) = setup();
        let user = guest();
        let order = service.submit_order(&user, request(&listing, 2)).await.unwrap();

        let cancelled = service.cancel_order(user.id, order.id).await.unwrap();
        assert_eq!(cancelled.id, order.id);
        assert!(service.list_orders(user.id).await.unwrap().is_empty());
        assert_eq!(store.listing(listing.id).unwrap().rooms[0].available, 2);
    }

    #[tokio::test]
    async fn cancel_non_pending_is_rejected_and_keeps_record() {
        let (store, service, listing) = setup();
        let user = guest();
        let order = service.submit_order(&user, request(&listing, 1)).await.unwrap();
        store.set_status(order.id, OrderStatus::Approved);

        let err = service.cancel_order(user.id, order.id).await.unwrap_err();
        assert!(matches!(err, AppError::OrderNotCancellable(OrderStatus::Approved)));

        let orders = service.list_orders(user.id).await.unwrap();
        assert_eq!(orders.len(), 1);
        assert_eq!(orders[0].status, OrderStatus::Approved);
    }

    #[tokio::test]
    async fn cannot_cancel_someone_elses_order() {
        let (_, service, listing) = setup();
        let owner = guest();
        let order = service.submit_order(&owner, request(&listing, 1)).await.unwrap();

        let err = service.cancel_order(Uuid::new_v4(), order.id).await.unwrap_err();
        assert!(matches!(err, AppError::OrderNotFound));
    }

    #[tokio::test]
    async fn quote_uses_current_inventory() {
        let (_, service, listing) = setup();
        let q = service
            .quote(listing.id, "Deluxe", 2, date(2024, 1, 1), date(2024, 1, 3))
            .await
            .unwrap();
        assert_eq!(q.total_price, 2_000_000);
        assert_eq!(q.nights, 2);
    }

    #[tokio::test]
    async fn watch_redelivers_full_list_on_change() {
        let (_, service, listing) = setup();
        let user = guest();

        let mut stream = service.watch_orders(user.id);
        let first = tokio::time::timeout(Duration::from_secs(2), stream.next())
            .await
            .unwrap()
            .unwrap();
        assert!(first.is_empty());

        let order = service.submit_order(&user, request(&listing, 1)).await.unwrap();
        let second = tokio::time::timeout(Duration::from_secs(2), stream.next())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(second.len(), 1);
        assert_eq!(second[0].id, order.id);

        service.cancel_order(user.id, order.id).await.unwrap();
        let third = tokio::time::timeout(Duration::from_secs(2), stream.next())
            .await
            .unwrap()
            .unwrap();
        assert!(third.is_empty());
    }

    #[tokio::test]
    async fn dropping_the_stream_ends_the_watch_task() {
        let (_, service, _) = setup();
        let user = guest();

        let mut stream = service.watch_orders(user.id);
        tokio::time::timeout(Duration::from_secs(2), stream.next())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(service.events.receiver_count(), 1);

        drop(stream);

        // Sem nenhum evento novo: a task percebe o fechamento sozinha
        tokio::time::timeout(Duration::from_secs(2), async {
            while service.events.receiver_count() > 0 {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .unwrap();
    }
}
