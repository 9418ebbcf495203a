// src/test_support.rs
//
// Construtores usados pelos testes de unidade dos serviços.

use chrono::Utc;
use rust_decimal::Decimal;
use std::str::FromStr;
use uuid::Uuid;

use crate::models::{
    auth::{User, UserRole},
    cart::CartLine,
    catalog::Product,
    orders::{Address, Order, OrderItem, OrderStatus, PaymentStatus},
};
use sqlx::types::Json;

pub fn dec(value: &str) -> Decimal {
    Decimal::from_str(value).expect("decimal de teste inválido")
}

pub fn product(base: &str, t1: &str, t2: &str, t3: &str, stock: i32) -> Product {
    let id = Uuid::new_v4();
    Product {
        id,
        sku: format!("SKU-{}", &id.simple().to_string()[..8]),
        slug: format!("produto-{}", &id.simple().to_string()[..8]),
        name: "Tela OLED iPhone 13".into(),
        brand: Some("Apple".into()),
        device_model: Some("iPhone 13".into()),
        images: vec!["https://cdn.example.com/p1.jpg".into()],
        base_price: dec(base),
        tier1_discount: dec(t1),
        tier2_discount: dec(t2),
        tier3_discount: dec(t3),
        total_stock: stock,
        is_active: true,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

pub fn priced(base: &str, stock: i32) -> Product {
    product(base, "0", "0", "0", stock)
}

pub fn user(role: UserRole, tier: Option<&str>) -> User {
    User {
        id: Uuid::new_v4(),
        email: "cliente@example.com".into(),
        name: Some("Cliente Teste".into()),
        phone: Some("+55 41 99999-0000".into()),
        role,
        wholesale_tier: tier.map(str::to_string),
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

pub fn line(product: Product, quantity: i32) -> CartLine {
    CartLine { product, quantity }
}

pub fn address() -> Address {
    Address {
        full_name: "Ana Souza".into(),
        phone: Some("+55 41 98888-1111".into()),
        line1: "Rua das Flores, 100".into(),
        line2: None,
        city: "Curitiba".into(),
        state: Some("PR".into()),
        postal_code: "80000-000".into(),
        country: "BR".into(),
    }
}

pub fn order(status: OrderStatus, payment_status: PaymentStatus) -> Order {
    Order {
        id: Uuid::new_v4(),
        order_number: "ORD-20260118-000042".into(),
        user_id: Uuid::new_v4(),
        customer_name: "Ana Souza".into(),
        customer_email: "ana@example.com".into(),
        customer_phone: None,
        subtotal: dec("90.00"),
        tax_amount: Decimal::ZERO,
        shipping_cost: dec("10.00"),
        total_amount: dec("100.00"),
        is_wholesale: false,
        wholesale_tier: None,
        shipping_address: Json(address()),
        billing_address: Json(address()),
        customer_notes: None,
        status,
        payment_status,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

pub fn order_item(order_id: Uuid, name: &str, quantity: i32, unit_price: &str) -> OrderItem {
    let unit_price = dec(unit_price);
    OrderItem {
        id: Uuid::new_v4(),
        order_id,
        product_id: Uuid::new_v4(),
        product_name: name.into(),
        product_sku: "SKU-TESTE".into(),
        product_image: None,
        quantity,
        unit_price,
        discount_percent: Decimal::ZERO,
        subtotal: unit_price * Decimal::from(quantity),
        created_at: Utc::now(),
    }
}
