//! CSV export of an account's order history.

use std::io::Write;

use csv::Writer;
use engine::Order;
use serde::Serialize;

#[derive(Serialize)]
struct OrderRow<'a> {
    order_id: String,
    created_at: String,
    size: &'a str,
    delivery: &'a str,
    ingredients: String,
    original_cost: String,
    discount: &'a str,
    total_cost: String,
    points_earned: i64,
}

impl<'a> From<&'a Order> for OrderRow<'a> {
    fn from(order: &'a Order) -> Self {
        Self {
            order_id: order.id.to_string(),
            created_at: order.created_at.to_rfc3339(),
            size: order.size.as_str(),
            delivery: order.delivery.as_str(),
            ingredients: order
                .ingredients
                .iter()
                .map(|item| item.name())
                .collect::<Vec<_>>()
                .join("; "),
            original_cost: order.original_cost.to_string(),
            discount: order.discount_kind.map_or("", |kind| kind.as_str()),
            total_cost: order.total_cost.to_string(),
            points_earned: order.points_earned,
        }
    }
}

/// Write one CSV row per order, header first.
pub fn write_orders<W: Write>(out: W, orders: &[Order]) -> Result<(), csv::Error> {
    let mut writer = Writer::from_writer(out);
    for order in orders {
        writer.serialize(OrderRow::from(order))?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use engine::{DeliveryOption, DiscountKind, Money, Size};
    use uuid::Uuid;

    #[test]
    fn writes_header_and_rows() {
        let order = Order {
            id: Uuid::nil(),
            account_id: Some("a".to_string()),
            ingredients: Vec::new(),
            size: Size::Large,
            delivery: DeliveryOption::Delivery,
            total_cost: Money::ZERO,
            original_cost: Money::from_cents(750),
            discount_amount: Some(Money::from_cents(750)),
            discount_kind: Some(DiscountKind::Redemption),
            points_earned: 0,
            created_at: Utc.with_ymd_and_hms(2026, 5, 1, 9, 30, 0).unwrap(),
        };

        let mut buf = Vec::new();
        write_orders(&mut buf, &[order]).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next(),
            Some(
                "order_id,created_at,size,delivery,ingredients,original_cost,discount,total_cost,points_earned"
            )
        );
        assert_eq!(
            lines.next(),
            Some(
                "00000000-0000-0000-0000-000000000000,2026-05-01T09:30:00+00:00,large,delivery,,$7.50,redemption,$0.00,0"
            )
        );
    }
}
