//! Mapping between the checkout payloads and the engine types.

use api_types::{
    DiscountType,
    checkout::{CheckoutRequest, CheckoutResponse, IngredientIn, PriceIn},
    order::{IngredientView, OrderView},
};
use engine::{Checkout, DiscountKind, Money, Order, OrderResult, RawIngredient};

const GUEST_MESSAGE: &str = "Order placed! Create an account to start earning loyalty points!";
const MEMBER_MESSAGE: &str = "Order placed and points updated!";
const BIRTHDAY_MESSAGE: &str = "Happy Birthday! Enjoy your FREE drink!";
const REDEMPTION_MESSAGE: &str = "Enjoy your FREE redeemed drink!";

/// Read a price sent as JSON number or decimal string.
///
/// A missing price counts as zero; an unreadable one, or one with more than
/// four decimals, makes the ingredient invalid.
fn parse_price(price: Option<&PriceIn>) -> Option<Money> {
    match price {
        None => Some(Money::ZERO),
        Some(PriceIn::Number(value)) if value.is_finite() => value.to_string().parse().ok(),
        Some(PriceIn::Number(_)) => None,
        Some(PriceIn::Text(text)) => text.parse().ok(),
    }
}

fn raw_ingredient(item: IngredientIn) -> RawIngredient {
    RawIngredient {
        price: parse_price(item.price.as_ref()),
        name: item.name,
        kind: item.kind,
    }
}

pub fn to_checkout(request: CheckoutRequest, redemption: Option<String>) -> Checkout {
    let body = request.into_body();
    Checkout {
        ingredients: body
            .ingredients
            .map(|items| items.into_iter().map(raw_ingredient).collect()),
        size: body.size,
        delivery: body.delivery_option,
        redemption,
    }
}

fn map_discount(kind: DiscountKind) -> DiscountType {
    match kind {
        DiscountKind::Birthday => DiscountType::Birthday,
        DiscountKind::Redemption => DiscountType::Redemption,
    }
}

pub fn message_for(result: &OrderResult) -> &'static str {
    match (result.is_guest, result.discount_kind) {
        (true, _) => GUEST_MESSAGE,
        (false, Some(DiscountKind::Birthday)) => BIRTHDAY_MESSAGE,
        (false, Some(DiscountKind::Redemption)) => REDEMPTION_MESSAGE,
        (false, None) => MEMBER_MESSAGE,
    }
}

pub fn to_response(result: &OrderResult) -> CheckoutResponse {
    let message = message_for(result).to_string();
    if result.is_guest {
        return CheckoutResponse {
            message,
            order_id: result.order_id,
            total_cost: result.total_cost.to_string(),
            original_cost: None,
            new_points: 0,
            points_earned: None,
            money_spent: Money::ZERO.to_string(),
            is_logged_in: false,
            is_birthday: false,
            has_discount: false,
            discount_type: None,
            discount_amount: None,
        };
    }

    CheckoutResponse {
        message,
        order_id: result.order_id,
        total_cost: result.total_cost.to_string(),
        original_cost: Some(result.original_cost.to_string()),
        new_points: result.loyalty_points,
        points_earned: Some(result.points_earned),
        money_spent: result.money_spent.to_string(),
        is_logged_in: true,
        is_birthday: result.discount_kind == Some(DiscountKind::Birthday),
        has_discount: result.discount_kind.is_some(),
        discount_type: result.discount_kind.map(map_discount),
        discount_amount: Some(result.discount_amount.to_string()),
    }
}

pub fn to_order_view(order: &Order) -> OrderView {
    OrderView {
        id: order.id,
        created_at: order.created_at,
        size: order.size.as_str().to_string(),
        delivery_option: order.delivery.as_str().to_string(),
        total_cost: order.total_cost.to_string(),
        original_cost: order.original_cost.to_string(),
        discount_type: order.discount_kind.map(map_discount),
        discount_amount: order.discount_amount.map(|amount| amount.to_string()),
        points_earned: order.points_earned,
        ingredients: order
            .ingredients
            .iter()
            .map(|item| IngredientView {
                name: item.name().to_string(),
                kind: item.kind().to_string(),
                price: item.price().to_string(),
            })
            .collect(),
    }
}
