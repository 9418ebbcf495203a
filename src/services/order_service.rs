// src/services/order_service.rs

use std::{collections::HashMap, sync::Arc};

use chrono::Utc;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::{
    common::{
        error::AppError,
        pagination::{Page, Pagination},
    },
    db::{CartRepository, OrderRepository, ProductRepository},
    models::{
        auth::User,
        cart::CartLine,
        orders::{Address, Order, OrderDetail, OrderItem, OrderStatus, PlacedOrder},
    },
    services::{
        checkout::{build_order, format_order_number, CheckoutSettings},
        mailer::{self, spawn_email, Mailer},
        payment_webhook::{payment_effect, PaymentEvent, PaymentEventKind},
    },
};

#[derive(Clone)]
pub struct OrderService {
    pool: PgPool,
    orders: OrderRepository,
    products: ProductRepository,
    carts: CartRepository,
    checkout: CheckoutSettings,
    mailer: Arc<dyn Mailer>,
    public_base_url: String,
}

impl OrderService {
    pub fn new(
        pool: PgPool,
        orders: OrderRepository,
        products: ProductRepository,
        carts: CartRepository,
        checkout: CheckoutSettings,
        mailer: Arc<dyn Mailer>,
        public_base_url: String,
    ) -> Self {
        Self {
            pool,
            orders,
            products,
            carts,
            checkout,
            mailer,
            public_base_url,
        }
    }

    pub fn tracking_url(&self, order_id: Uuid) -> String {
        format!("{}/orders/{}", self.public_base_url.trim_end_matches('/'), order_id)
    }

    // =========================================================================
    //  CHECKOUT
    // =========================================================================

    /// Fecha o carrinho do usuário em um pedido, tudo na mesma transação.
    ///
    /// Erros de domínio (carrinho vazio, estoque, produto inativo) voltam como estão.
    /// Qualquer erro de banco vira `OrderPlacementFailed` e o detalhe fica só no log.
    pub async fn place_order(
        &self,
        user: &User,
        shipping_address: Address,
        billing_address: Option<Address>,
        customer_notes: Option<String>,
    ) -> Result<PlacedOrder, AppError> {
        let placed = async {
            let mut tx = self.pool.begin().await?;
            let order = self
                .place_order_in_tx(&mut tx, user, shipping_address, billing_address, customer_notes)
                .await?;
            tx.commit().await?;
            Ok::<Order, AppError>(order)
        }
        .await
        .map_err(|e| match e {
            AppError::DatabaseError(db) => AppError::OrderPlacementFailed(db),
            other => other,
        });

        let order = match placed {
            Ok(order) => order,
            Err(e) => {
                tracing::warn!(user_id = %user.id, code = e.code(), "❌ Checkout recusado: {}", e);
                return Err(e);
            }
        };

        tracing::info!(
            order_number = %order.order_number,
            total = %order.total_amount,
            "🛒 Pedido criado"
        );

        spawn_email(
            self.mailer.clone(),
            mailer::order_confirmation(&order, &self.tracking_url(order.id)),
        );

        Ok(PlacedOrder {
            order_id: order.id,
            order_number: order.order_number,
            total_amount: order.total_amount,
        })
    }

    async fn place_order_in_tx(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user: &User,
        shipping_address: Address,
        billing_address: Option<Address>,
        customer_notes: Option<String>,
    ) -> Result<Order, AppError> {
        // 1. Carrinho + produtos travados (FOR UPDATE, em ordem de id)
        let cart = self.carts.list_items(&mut **tx, user.id).await?;
        if cart.is_empty() {
            return Err(AppError::EmptyCart);
        }

        let ids: Vec<Uuid> = cart.iter().map(|item| item.product_id).collect();
        let mut products: HashMap<Uuid, _> = self
            .products
            .find_many(&mut **tx, &ids, true)
            .await?
            .into_iter()
            .map(|p| (p.id, p))
            .collect();

        let mut lines = Vec::with_capacity(cart.len());
        for item in &cart {
            let product = products
                .remove(&item.product_id)
                .ok_or(AppError::ProductUnavailable { product_id: item.product_id })?;
            lines.push(CartLine { product, quantity: item.quantity });
        }

        // 2. Rascunho (estoque, preço, totais)
        let draft = build_order(
            &lines,
            user,
            shipping_address,
            billing_address,
            customer_notes,
            &self.checkout,
        )?;

        // 3. Número do pedido vindo da sequence
        let sequence = self.orders.next_order_sequence(&mut **tx).await?;
        let order_number = format_order_number(Utc::now().date_naive(), sequence);

        // 4. Cabeçalho + itens
        let order = self.orders.insert_order(&mut **tx, &order_number, &draft).await?;
        for item in &draft.items {
            self.orders.insert_item(&mut **tx, order.id, item).await?;
        }

        // 5. Baixa condicional: se alguém levou o saldo antes, desfaz tudo
        for item in &draft.items {
            let remaining = self
                .products
                .decrement_stock(&mut **tx, item.product_id, item.quantity)
                .await?;
            if remaining.is_none() {
                let available = self
                    .products
                    .current_stock(&mut **tx, item.product_id)
                    .await?
                    .unwrap_or(0);
                return Err(AppError::InsufficientStock {
                    product_id: item.product_id,
                    available,
                });
            }
        }

        // 6. Esvazia o carrinho
        self.carts.clear(&mut **tx, user.id).await?;

        Ok(order)
    }

    // =========================================================================
    //  CONSULTAS
    // =========================================================================

    pub async fn list_user_orders(
        &self,
        user_id: Uuid,
        pagination: Pagination,
    ) -> Result<Page<Order>, AppError> {
        let items = self.orders.list_for_user(user_id, pagination).await?;
        let total = self.orders.count_for_user(user_id).await?;
        Ok(Page::new(items, pagination, total))
    }

    /// Pedido com itens. Sem `owner`, qualquer pedido (uso do admin).
    /// Pedido de outro usuário responde 404, não 403.
    pub async fn get_order_detail(
        &self,
        order_id: Uuid,
        owner: Option<Uuid>,
    ) -> Result<OrderDetail, AppError> {
        let order = self
            .orders
            .find_by_id(order_id)
            .await?
            .filter(|o| owner.is_none_or(|uid| o.user_id == uid))
            .ok_or(AppError::NotFound("Pedido"))?;
        let items = self.orders.list_items(&self.pool, order.id).await?;
        Ok(OrderDetail { order, items })
    }

    pub async fn get_order_for_user(&self, order_id: Uuid, user: &User) -> Result<OrderDetail, AppError> {
        self.get_order_detail(order_id, Some(user.id)).await
    }

    // =========================================================================
    //  STATUS
    // =========================================================================

    /// Transição pedida pelo admin. Cancelar devolve as quantidades ao estoque
    /// na mesma transação.
    pub async fn update_status(&self, order_id: Uuid, next: OrderStatus) -> Result<Order, AppError> {
        let mut tx = self.pool.begin().await?;

        let order = self
            .orders
            .find_by_id_for_update(&mut *tx, order_id)
            .await?
            .ok_or(AppError::NotFound("Pedido"))?;

        let previous = order.status;
        if !previous.check_transition(next)? {
            return Ok(order);
        }

        if next == OrderStatus::Cancelled {
            let items = self.orders.list_items(&mut *tx, order.id).await?;
            for (product_id, quantity) in restock_plan(&items) {
                self.products.adjust_stock(&mut *tx, product_id, quantity).await?;
            }
        }

        let updated = self
            .orders
            .update_status(&mut *tx, order.id, next, order.payment_status)
            .await?;
        tx.commit().await?;

        tracing::info!(
            order_number = %updated.order_number,
            "📦 Status do pedido: {} -> {}",
            previous,
            next
        );
        spawn_email(self.mailer.clone(), mailer::order_status_changed(&updated, previous));

        Ok(updated)
    }

    /// Aplica um evento de pagamento já autenticado.
    /// Tipos desconhecidos são aceitos e ignorados (`Ok(None)`).
    pub async fn apply_payment_event(&self, event: &PaymentEvent) -> Result<Option<Order>, AppError> {
        let Some(kind) = PaymentEventKind::from_type(&event.event_type) else {
            tracing::info!(event_id = %event.id, "Evento de pagamento ignorado: {}", event.event_type);
            return Ok(None);
        };

        let mut tx = self.pool.begin().await?;
        let order = self
            .orders
            .find_by_id_for_update(&mut *tx, event.data.order_id)
            .await?
            .ok_or(AppError::NotFound("Pedido"))?;

        let effect = payment_effect(kind, order.status, order.payment_status);
        if effect.status == order.status && effect.payment_status == order.payment_status {
            tx.commit().await?;
            return Ok(Some(order));
        }

        let updated = self
            .orders
            .update_status(&mut *tx, order.id, effect.status, effect.payment_status)
            .await?;
        tx.commit().await?;

        tracing::info!(
            event_id = %event.id,
            order_number = %updated.order_number,
            "💳 Pagamento {:?}: pedido {}",
            updated.payment_status,
            updated.status
        );
        if updated.status != order.status {
            spawn_email(self.mailer.clone(), mailer::order_status_changed(&updated, order.status));
        }

        Ok(Some(updated))
    }
}

/// Devoluções por produto, na mesma ordem de travamento do checkout (por id).
fn restock_plan(items: &[OrderItem]) -> Vec<(Uuid, i32)> {
    let mut plan: Vec<(Uuid, i32)> = items.iter().map(|i| (i.product_id, i.quantity)).collect();
    plan.sort_by_key(|(product_id, _)| *product_id);
    plan
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        services::mailer::LogMailer,
        test_support::{address, dec, order_item},
    };

    #[test]
    fn restock_follows_product_id_order() {
        let order_id = Uuid::new_v4();
        let items = vec![
            order_item(order_id, "Tela", 2, "90.00"),
            order_item(order_id, "Bateria", 1, "40.00"),
            order_item(order_id, "Conector", 5, "8.00"),
        ];

        let plan = restock_plan(&items);

        let mut expected: Vec<(Uuid, i32)> = items.iter().map(|i| (i.product_id, i.quantity)).collect();
        expected.sort();
        assert_eq!(plan, expected);
        assert!(plan.windows(2).all(|w| w[0].0 < w[1].0));
    }

    fn service(pool: &PgPool) -> OrderService {
        OrderService::new(
            pool.clone(),
            OrderRepository::new(pool.clone()),
            ProductRepository::new(pool.clone()),
            CartRepository::new(pool.clone()),
            CheckoutSettings::default(),
            Arc::new(LogMailer),
            "http://localhost:3000".into(),
        )
    }

    async fn seed_user(pool: &PgPool) -> User {
        sqlx::query_as::<_, User>(
            "INSERT INTO users (email, name, phone, role) VALUES ($1, $2, $3, 'RETAIL') RETURNING *",
        )
        .bind(format!("{}@example.com", Uuid::new_v4().simple()))
        .bind("Ana Souza")
        .bind("+55 41 98888-1111")
        .fetch_one(pool)
        .await
        .unwrap()
    }

    async fn seed_product(pool: &PgPool, price: &str, stock: i32) -> Uuid {
        let code = Uuid::new_v4().simple().to_string();
        sqlx::query_scalar(
            r#"
            INSERT INTO products (sku, slug, name, base_price, total_stock)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(format!("SKU-{}", &code[..8]))
        .bind(format!("peca-{}", &code[..8]))
        .bind("Tela OLED")
        .bind(dec(price))
        .bind(stock)
        .fetch_one(pool)
        .await
        .unwrap()
    }

    async fn put_in_cart(pool: &PgPool, user_id: Uuid, product_id: Uuid, quantity: i32) {
        CartRepository::new(pool.clone())
            .add_quantity(pool, user_id, product_id, quantity)
            .await
            .unwrap();
    }

    async fn stock_of(pool: &PgPool, product_id: Uuid) -> i32 {
        ProductRepository::new(pool.clone())
            .current_stock(pool, product_id)
            .await
            .unwrap()
            .unwrap()
    }

    async fn count(pool: &PgPool, table: &str) -> i64 {
        let sql = format!("SELECT COUNT(*) FROM {}", table);
        sqlx::query_scalar(&sql)
            .fetch_one(pool)
            .await
            .unwrap()
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn commit_moves_cart_into_order_and_stock(pool: PgPool) {
        let orders = service(&pool);
        let user = seed_user(&pool).await;
        let screen = seed_product(&pool, "45.00", 10).await;
        let battery = seed_product(&pool, "30.00", 3).await;
        put_in_cart(&pool, user.id, screen, 2).await;
        put_in_cart(&pool, user.id, battery, 1).await;

        let placed = orders.place_order(&user, address(), None, None).await.unwrap();

        // 2 × 45 + 30 = 120, acima do frete grátis
        assert_eq!(placed.total_amount, dec("120.00"));
        assert!(placed.order_number.starts_with("ORD-"));
        assert_eq!(stock_of(&pool, screen).await, 8);
        assert_eq!(stock_of(&pool, battery).await, 2);
        assert_eq!(count(&pool, "cart_items").await, 0);

        let detail = orders.get_order_detail(placed.order_id, Some(user.id)).await.unwrap();
        assert_eq!(detail.items.len(), 2);
        assert_eq!(detail.order.status, OrderStatus::Pending);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn second_commit_finds_an_empty_cart(pool: PgPool) {
        let orders = service(&pool);
        let user = seed_user(&pool).await;
        let product = seed_product(&pool, "20.00", 5).await;
        put_in_cart(&pool, user.id, product, 1).await;

        orders.place_order(&user, address(), None, None).await.unwrap();
        let again = orders.place_order(&user, address(), None, None).await;

        assert!(matches!(again, Err(AppError::EmptyCart)));
        assert_eq!(count(&pool, "orders").await, 1);
        assert_eq!(stock_of(&pool, product).await, 4);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn stock_taken_before_decrement_rolls_everything_back(pool: PgPool) {
        let orders = service(&pool);
        let user = seed_user(&pool).await;
        let product = seed_product(&pool, "50.00", 5).await;
        put_in_cart(&pool, user.id, product, 2).await;

        // Outra venda leva o saldo entre a checagem e a baixa
        sqlx::query(
            r#"
            CREATE FUNCTION drain_stock() RETURNS trigger AS $$
            BEGIN
                UPDATE products SET total_stock = 1 WHERE id = NEW.product_id;
                RETURN NEW;
            END;
            $$ LANGUAGE plpgsql
            "#,
        )
        .execute(&pool)
        .await
        .unwrap();
        sqlx::query(
            "CREATE TRIGGER drain_stock_on_item AFTER INSERT ON order_items \
             FOR EACH ROW EXECUTE FUNCTION drain_stock()",
        )
        .execute(&pool)
        .await
        .unwrap();

        let result = orders.place_order(&user, address(), None, None).await;

        match result {
            Err(AppError::InsufficientStock { product_id, available }) => {
                assert_eq!(product_id, product);
                assert_eq!(available, 1);
            }
            other => panic!("esperava estoque insuficiente, veio {:?}", other),
        }
        assert_eq!(count(&pool, "orders").await, 0);
        assert_eq!(count(&pool, "order_items").await, 0);
        assert_eq!(count(&pool, "cart_items").await, 1);
        assert_eq!(stock_of(&pool, product).await, 5);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn cancelling_returns_quantities_to_stock(pool: PgPool) {
        let orders = service(&pool);
        let user = seed_user(&pool).await;
        let first = seed_product(&pool, "60.00", 10).await;
        let second = seed_product(&pool, "15.00", 4).await;
        put_in_cart(&pool, user.id, first, 3).await;
        put_in_cart(&pool, user.id, second, 4).await;

        let placed = orders.place_order(&user, address(), None, None).await.unwrap();
        assert_eq!(stock_of(&pool, first).await, 7);
        assert_eq!(stock_of(&pool, second).await, 0);

        let cancelled = orders.update_status(placed.order_id, OrderStatus::Cancelled).await.unwrap();
        assert_eq!(cancelled.status, OrderStatus::Cancelled);
        assert_eq!(stock_of(&pool, first).await, 10);
        assert_eq!(stock_of(&pool, second).await, 4);

        // Mesmo estado: nada muda, nem o estoque
        orders.update_status(placed.order_id, OrderStatus::Cancelled).await.unwrap();
        assert_eq!(stock_of(&pool, first).await, 10);

        let reopen = orders.update_status(placed.order_id, OrderStatus::Processing).await;
        assert!(matches!(reopen, Err(AppError::InvalidStatusTransition { .. })));
    }
}
