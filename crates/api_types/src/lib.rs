use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Discount reason as exposed to clients.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscountType {
    Birthday,
    Redemption,
}

pub mod checkout {
    use super::*;

    /// An ingredient price as sent by the drink builder.
    ///
    /// Browsers send plain JSON numbers, other clients may send decimal
    /// strings; both are accepted.
    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    #[serde(untagged)]
    pub enum PriceIn {
        Number(f64),
        Text(String),
    }

    /// One candidate ingredient. Every field is optional here; the engine
    /// decides what is valid.
    #[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
    pub struct IngredientIn {
        #[serde(default, alias = "Name")]
        pub name: Option<String>,
        #[serde(rename = "type", default, alias = "Type")]
        pub kind: Option<String>,
        #[serde(default, alias = "Price")]
        pub price: Option<PriceIn>,
    }

    #[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct CheckoutBody {
        #[serde(default, alias = "Ingredients")]
        pub ingredients: Option<Vec<IngredientIn>>,
        #[serde(default)]
        pub size: Option<String>,
        #[serde(default)]
        pub delivery_option: Option<String>,
    }

    /// Body of a checkout request.
    ///
    /// Either a bare array of ingredients (medium, pickup) or an object with
    /// `ingredients`, `size` and `deliveryOption`.
    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    #[serde(untagged)]
    pub enum CheckoutRequest {
        Items(Vec<IngredientIn>),
        Order(CheckoutBody),
    }

    impl CheckoutRequest {
        pub fn into_body(self) -> CheckoutBody {
            match self {
                Self::Items(items) => CheckoutBody {
                    ingredients: Some(items),
                    ..CheckoutBody::default()
                },
                Self::Order(body) => body,
            }
        }
    }

    /// Result of a checkout, with amounts already formatted for display.
    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct CheckoutResponse {
        pub message: String,
        pub order_id: Uuid,
        /// What was actually charged.
        pub total_cost: String,
        /// Price before discounts (members only).
        #[serde(skip_serializing_if = "Option::is_none")]
        pub original_cost: Option<String>,
        /// Account balance after the order.
        pub new_points: i64,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub points_earned: Option<i64>,
        pub money_spent: String,
        pub is_logged_in: bool,
        #[serde(default)]
        pub is_birthday: bool,
        #[serde(default)]
        pub has_discount: bool,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub discount_type: Option<DiscountType>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub discount_amount: Option<String>,
    }

    /// Error body for a rejected checkout.
    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct CheckoutError {
        pub message: String,
    }
}

pub mod account {
    use super::*;

    /// Points and spend of the signed-in customer.
    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct CurrentAccount {
        pub is_logged_in: bool,
        pub points: i64,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub money_spent: Option<String>,
    }
}

pub mod order {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct IngredientView {
        pub name: String,
        #[serde(rename = "type")]
        pub kind: String,
        pub price: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct OrderView {
        pub id: Uuid,
        pub created_at: DateTime<Utc>,
        pub size: String,
        pub delivery_option: String,
        pub total_cost: String,
        pub original_cost: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub discount_type: Option<DiscountType>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub discount_amount: Option<String>,
        pub points_earned: i64,
        pub ingredients: Vec<IngredientView>,
    }
}

#[cfg(test)]
mod tests {
    use super::checkout::*;

    #[test]
    fn bare_array_is_a_medium_pickup_order() {
        let raw = r#"[{"name":"Espresso","type":"base","price":2.5}]"#;
        let body = serde_json::from_str::<CheckoutRequest>(raw)
            .unwrap()
            .into_body();
        assert_eq!(body.size, None);
        assert_eq!(body.delivery_option, None);
        let items = body.ingredients.unwrap();
        assert_eq!(items[0].kind.as_deref(), Some("base"));
        assert_eq!(items[0].price, Some(PriceIn::Number(2.5)));
    }

    #[test]
    fn object_body_carries_size_and_delivery() {
        let raw = r#"{
            "ingredients": [{"Name":"Mocha","Type":"base","Price":"4.10"}],
            "size": "Large",
            "deliveryOption": "delivery"
        }"#;
        let body = serde_json::from_str::<CheckoutRequest>(raw)
            .unwrap()
            .into_body();
        assert_eq!(body.size.as_deref(), Some("Large"));
        assert_eq!(body.delivery_option.as_deref(), Some("delivery"));
        let items = body.ingredients.unwrap();
        assert_eq!(items[0].name.as_deref(), Some("Mocha"));
        assert_eq!(items[0].price, Some(PriceIn::Text("4.10".to_string())));
    }

    #[test]
    fn object_without_ingredients_deserializes_to_none() {
        let body = serde_json::from_str::<CheckoutRequest>(r#"{"size":"small"}"#)
            .unwrap()
            .into_body();
        assert!(body.ingredients.is_none());
    }
}
