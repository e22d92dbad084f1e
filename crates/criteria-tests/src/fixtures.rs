//! Record types and sample data shared by the integration tests.

use bigdecimal::BigDecimal;
use chrono::{NaiveDate, NaiveDateTime};
use criteria_engine::{Record, Schema};
use lazy_static::lazy_static;
use model::core::{data_type::DataType, value::Value};
use std::str::FromStr;

#[derive(Debug, Clone)]
pub struct Customer {
    pub id: i64,
    pub name: String,
    pub email: Option<String>,
    pub age: Option<i64>,
    pub active: bool,
    pub balance: BigDecimal,
    pub joined: NaiveDate,
    pub last_seen: Option<NaiveDateTime>,
    pub address: Option<Address>,
    pub orders: Vec<Order>,
}

#[derive(Debug, Clone)]
pub struct Address {
    pub city: String,
    pub country: String,
}

#[derive(Debug, Clone)]
pub struct Order {
    pub id: i64,
    pub customer_id: i64,
    pub total: f64,
    pub status: String,
    pub placed: NaiveDateTime,
    pub lines: Vec<LineItem>,
}

#[derive(Debug, Clone)]
pub struct LineItem {
    pub order_id: i64,
    pub sku: String,
    pub qty: i64,
}

lazy_static! {
    static ref CUSTOMER: Schema<Customer> = Schema::<Customer>::new("Customer")
        .scalar("id", DataType::Int, |c| Value::Int(c.id))
        .scalar("name", DataType::String, |c| Value::from(c.name.as_str()))
        .scalar("email", DataType::String, |c| Value::from(c.email.clone()))
        .scalar("age", DataType::Int, |c| Value::from(c.age))
        .scalar("active", DataType::Boolean, |c| Value::Boolean(c.active))
        .scalar("balance", DataType::Decimal, |c| Value::Decimal(c.balance.clone()))
        .scalar("joined", DataType::Date, |c| Value::Date(c.joined))
        .scalar("lastSeen", DataType::TimestampNaive, |c| Value::from(c.last_seen))
        .nested::<Address>("address", |c| c.address.as_ref())
        .linked_collection::<Order>("orders", |c| c.orders.as_slice(), "customerId", "id");
    static ref ADDRESS: Schema<Address> = Schema::<Address>::new("Address")
        .scalar("city", DataType::String, |a| Value::from(a.city.as_str()))
        .scalar("country", DataType::String, |a| Value::from(a.country.as_str()));
    static ref ORDER: Schema<Order> = Schema::<Order>::new("Order")
        .scalar("id", DataType::Int, |o| Value::Int(o.id))
        .scalar("customerId", DataType::Int, |o| Value::Int(o.customer_id))
        .scalar("total", DataType::Float, |o| Value::Float(o.total))
        .scalar("status", DataType::String, |o| Value::from(o.status.as_str()))
        .scalar("placed", DataType::TimestampNaive, |o| Value::TimestampNaive(o.placed))
        .linked_collection::<LineItem>("lines", |o| o.lines.as_slice(), "orderId", "id");
    static ref LINE_ITEM: Schema<LineItem> = Schema::<LineItem>::new("LineItem")
        .scalar("orderId", DataType::Int, |l| Value::Int(l.order_id))
        .scalar("sku", DataType::String, |l| Value::from(l.sku.as_str()))
        .scalar("qty", DataType::Int, |l| Value::Int(l.qty));
}

impl Record for Customer {
    fn schema() -> &'static Schema<Self> {
        &CUSTOMER
    }
}

impl Record for Address {
    fn schema() -> &'static Schema<Self> {
        &ADDRESS
    }
}

impl Record for Order {
    fn schema() -> &'static Schema<Self> {
        &ORDER
    }
}

impl Record for LineItem {
    fn schema() -> &'static Schema<Self> {
        &LINE_ITEM
    }
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default()
}

fn at(date: NaiveDate, h: u32, min: u32) -> NaiveDateTime {
    date.and_hms_opt(h, min, 0).unwrap_or_default()
}

fn line(order_id: i64, sku: &str, qty: i64) -> LineItem {
    LineItem {
        order_id,
        sku: sku.to_string(),
        qty,
    }
}

/// Four customers:
/// - Ada (Oslo, two orders, one of them above 100)
/// - Grace (Bergen, no email, one small order)
/// - Linus (no address, no orders, unknown age)
/// - Margaret (Oslo, inactive, one cancelled order)
pub fn customers() -> Vec<Customer> {
    vec![
        Customer {
            id: 1,
            name: "Ada".into(),
            email: Some("ada@example.com".into()),
            age: Some(36),
            active: true,
            balance: BigDecimal::from_str("120.50").unwrap_or_default(),
            joined: date(2020, 1, 15),
            last_seen: Some(at(date(2024, 3, 1), 9, 30)),
            address: Some(Address {
                city: "Oslo".into(),
                country: "NO".into(),
            }),
            orders: vec![
                Order {
                    id: 10,
                    customer_id: 1,
                    total: 250.0,
                    status: "shipped".into(),
                    placed: at(date(2024, 2, 20), 14, 0),
                    lines: vec![line(10, "BOOK-1", 2), line(10, "PEN-9", 10)],
                },
                Order {
                    id: 11,
                    customer_id: 1,
                    total: 40.0,
                    status: "open".into(),
                    placed: at(date(2024, 2, 28), 8, 15),
                    lines: vec![line(11, "INK-3", 1)],
                },
            ],
        },
        Customer {
            id: 2,
            name: "Grace".into(),
            email: None,
            age: Some(41),
            active: true,
            balance: BigDecimal::from(0),
            joined: date(2021, 6, 1),
            last_seen: Some(at(date(2024, 2, 29), 23, 59)),
            address: Some(Address {
                city: "Bergen".into(),
                country: "NO".into(),
            }),
            orders: vec![Order {
                id: 20,
                customer_id: 2,
                total: 15.5,
                status: "shipped".into(),
                placed: at(date(2024, 1, 5), 10, 0),
                lines: vec![line(20, "PEN-9", 1)],
            }],
        },
        Customer {
            id: 3,
            name: "Linus".into(),
            email: Some("linus@example.org".into()),
            age: None,
            active: true,
            balance: BigDecimal::from(-5),
            joined: date(2023, 11, 30),
            last_seen: None,
            address: None,
            orders: Vec::new(),
        },
        Customer {
            id: 4,
            name: "Margaret".into(),
            email: Some("margaret@example.com".into()),
            age: Some(30),
            active: false,
            balance: BigDecimal::from_str("99.99").unwrap_or_default(),
            joined: date(2019, 3, 10),
            last_seen: Some(at(date(2023, 12, 24), 12, 0)),
            address: Some(Address {
                city: "Oslo".into(),
                country: "NO".into(),
            }),
            orders: vec![Order {
                id: 40,
                customer_id: 4,
                total: 500.0,
                status: "cancelled".into(),
                placed: at(date(2023, 12, 1), 16, 45),
                lines: vec![line(40, "DESK-2", 1)],
            }],
        },
    ]
}
