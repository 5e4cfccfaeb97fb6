//! Order primitives.
//!
//! An `Order` is the record of one checkout: the drink's line items, how it was
//! priced and which discount, if any, made it free. Orders are written once and
//! never updated.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, Ingredient, Money, RawIngredient, ResultEngine};

/// Drink size.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Size {
    Small,
    #[default]
    Medium,
    Large,
}

impl Size {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Small => "small",
            Self::Medium => "medium",
            Self::Large => "large",
        }
    }

    /// Price multiplier as a percentage of the base cost.
    pub const fn multiplier_percent(self) -> i64 {
        match self {
            Self::Small => 85,
            Self::Medium => 100,
            Self::Large => 125,
        }
    }

    /// Lenient parse used for the requested order size: case-insensitive, and
    /// anything missing or unknown is a medium drink.
    pub fn from_request(value: Option<&str>) -> Self {
        value
            .and_then(|v| Self::try_from(v).ok())
            .unwrap_or_default()
    }
}

impl core::fmt::Display for Size {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for Size {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "small" => Ok(Self::Small),
            "medium" => Ok(Self::Medium),
            "large" => Ok(Self::Large),
            other => Err(EngineError::InvalidData(format!("invalid size: {other}"))),
        }
    }
}

/// How the drink reaches the customer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryOption {
    #[default]
    Pickup,
    Delivery,
}

impl DeliveryOption {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pickup => "pickup",
            Self::Delivery => "delivery",
        }
    }

    /// Lenient parse: only `delivery` (any case) selects delivery.
    pub fn from_request(value: Option<&str>) -> Self {
        value
            .and_then(|v| Self::try_from(v).ok())
            .unwrap_or_default()
    }
}

impl TryFrom<&str> for DeliveryOption {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "pickup" => Ok(Self::Pickup),
            "delivery" => Ok(Self::Delivery),
            other => Err(EngineError::InvalidData(format!(
                "invalid delivery option: {other}"
            ))),
        }
    }
}

/// The reason an order was made free.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscountKind {
    Birthday,
    Redemption,
}

impl DiscountKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Birthday => "birthday",
            Self::Redemption => "redemption",
        }
    }
}

impl TryFrom<&str> for DiscountKind {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "birthday" => Ok(Self::Birthday),
            "redemption" => Ok(Self::Redemption),
            other => Err(EngineError::InvalidData(format!(
                "invalid discount kind: {other}"
            ))),
        }
    }
}

/// A checkout request after it crossed the request boundary.
///
/// Sizes and delivery options stay raw strings here; the engine applies its
/// own lenient parsing so every caller gets the same defaults.
#[derive(Clone, Debug, Default)]
pub struct Checkout {
    pub ingredients: Option<Vec<RawIngredient>>,
    pub size: Option<String>,
    pub delivery: Option<String>,
    /// Size named by a point-redemption token, if one was presented.
    pub redemption: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Order {
    pub id: Uuid,
    /// `None` for guest orders.
    pub account_id: Option<String>,
    pub ingredients: Vec<Ingredient>,
    pub size: Size,
    pub delivery: DeliveryOption,
    /// What the customer actually pays.
    pub total_cost: Money,
    /// Price before any discount.
    pub original_cost: Money,
    pub discount_amount: Option<Money>,
    pub discount_kind: Option<DiscountKind>,
    pub points_earned: i64,
    pub created_at: DateTime<Utc>,
}

impl Order {
    pub fn is_guest(&self) -> bool {
        self.account_id.is_none()
    }
}

/// What a checkout returns to the caller.
///
/// Amounts stay numeric; turning them into currency strings is up to the
/// presentation layer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OrderResult {
    pub order_id: Uuid,
    pub total_cost: Money,
    pub original_cost: Money,
    /// `Money::ZERO` when no discount applied.
    pub discount_amount: Money,
    pub discount_kind: Option<DiscountKind>,
    pub points_earned: i64,
    /// Account balance after the order (0 for guests).
    pub loyalty_points: i64,
    /// Account lifetime spend after the order (0 for guests).
    pub money_spent: Money,
    pub is_guest: bool,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "orders")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub account_id: Option<String>,
    pub size: String,
    pub delivery: String,
    pub total_minor: i64,
    pub original_minor: i64,
    pub discount_minor: Option<i64>,
    pub discount_kind: Option<String>,
    pub points_earned: i64,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::ingredients::Entity")]
    Ingredients,
    #[sea_orm(
        belongs_to = "super::accounts::Entity",
        from = "Column::AccountId",
        to = "super::accounts::Column::Id"
    )]
    Account,
}

impl Related<super::ingredients::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Ingredients.def()
    }
}

impl Related<super::accounts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Account.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Order> for ActiveModel {
    fn from(order: &Order) -> Self {
        Self {
            id: ActiveValue::Set(order.id.to_string()),
            account_id: ActiveValue::Set(order.account_id.clone()),
            size: ActiveValue::Set(order.size.as_str().to_string()),
            delivery: ActiveValue::Set(order.delivery.as_str().to_string()),
            total_minor: ActiveValue::Set(order.total_cost.minor()),
            original_minor: ActiveValue::Set(order.original_cost.minor()),
            discount_minor: ActiveValue::Set(order.discount_amount.map(Money::minor)),
            discount_kind: ActiveValue::Set(
                order.discount_kind.map(|kind| kind.as_str().to_string()),
            ),
            points_earned: ActiveValue::Set(order.points_earned),
            created_at: ActiveValue::Set(order.created_at),
        }
    }
}

/// Rebuilds an order header; ingredients are loaded separately.
impl TryFrom<Model> for Order {
    type Error = EngineError;

    fn try_from(model: Model) -> ResultEngine<Self> {
        Ok(Self {
            id: crate::util::parse_uuid(&model.id, "order")?,
            account_id: model.account_id,
            ingredients: Vec::new(),
            size: Size::try_from(model.size.as_str())?,
            delivery: DeliveryOption::try_from(model.delivery.as_str())?,
            total_cost: Money::new(model.total_minor),
            original_cost: Money::new(model.original_minor),
            discount_amount: model.discount_minor.map(Money::new),
            discount_kind: model
                .discount_kind
                .as_deref()
                .map(DiscountKind::try_from)
                .transpose()?,
            points_earned: model.points_earned,
            created_at: model.created_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn size_request_parsing_is_lenient() {
        assert_eq!(Size::from_request(Some("SMALL")), Size::Small);
        assert_eq!(Size::from_request(Some(" large ")), Size::Large);
        assert_eq!(Size::from_request(Some("venti")), Size::Medium);
        assert_eq!(Size::from_request(None), Size::Medium);
    }

    #[test]
    fn size_strict_parsing_rejects_unknown() {
        assert!(Size::try_from("venti").is_err());
        assert_eq!(Size::try_from("Medium").unwrap(), Size::Medium);
    }

    #[test]
    fn only_delivery_selects_delivery() {
        assert_eq!(
            DeliveryOption::from_request(Some("Delivery")),
            DeliveryOption::Delivery
        );
        assert_eq!(
            DeliveryOption::from_request(Some("drone")),
            DeliveryOption::Pickup
        );
        assert_eq!(DeliveryOption::from_request(None), DeliveryOption::Pickup);
    }
}
