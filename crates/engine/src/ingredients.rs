//! Ingredient line items and their validation.
//!
//! A drink is built from a list of candidate ingredients coming from the
//! request boundary. [`validate_ingredients`] keeps the usable ones and turns
//! them into priced, immutable [`Ingredient`] line items.

use sea_orm::{ActiveValue, entity::prelude::*};
use unicode_normalization::UnicodeNormalization;
use uuid::Uuid;

use crate::{EngineError, Money, ResultEngine};

/// A candidate ingredient as received from the caller.
///
/// `price` is `None` when the boundary could not read a price at all; such a
/// candidate is dropped like any other invalid one.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RawIngredient {
    pub name: Option<String>,
    pub kind: Option<String>,
    pub price: Option<Money>,
}

impl RawIngredient {
    pub fn new(name: &str, kind: &str, price: Money) -> Self {
        Self {
            name: Some(name.to_string()),
            kind: Some(kind.to_string()),
            price: Some(price),
        }
    }
}

/// A validated, priced line item. Owned by the order that contains it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Ingredient {
    name: String,
    kind: String,
    price: Money,
}

impl Ingredient {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn price(&self) -> Money {
        self.price
    }
}

fn normalize_label(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.nfc().collect())
}

impl TryFrom<RawIngredient> for Ingredient {
    type Error = RawIngredient;

    fn try_from(raw: RawIngredient) -> Result<Self, Self::Error> {
        let name = normalize_label(raw.name.as_deref());
        let kind = normalize_label(raw.kind.as_deref());
        match (name, kind, raw.price) {
            (Some(name), Some(kind), Some(price))
                if !price.is_negative() && price.is_price_precision() =>
            {
                Ok(Self { name, kind, price })
            }
            _ => Err(raw),
        }
    }
}

/// Filters a raw ingredient list down to valid line items, keeping input order.
///
/// A candidate survives when its price is present, `>= 0` and carries at most
/// [`Money::PRICE_DECIMALS`] decimals, and both name and kind are non-empty
/// after trimming. Everything else is dropped silently.
///
/// Errors:
/// - [`EngineError::NoIngredients`] if `raw` is `None` or empty;
/// - [`EngineError::NoValidIngredients`] if nothing survives.
pub fn validate_ingredients(raw: Option<Vec<RawIngredient>>) -> ResultEngine<Vec<Ingredient>> {
    let raw = match raw {
        Some(raw) if !raw.is_empty() => raw,
        _ => return Err(EngineError::NoIngredients),
    };

    let submitted = raw.len();
    let valid: Vec<Ingredient> = raw
        .into_iter()
        .filter_map(|candidate| Ingredient::try_from(candidate).ok())
        .collect();

    if valid.len() < submitted {
        tracing::debug!(
            submitted,
            kept = valid.len(),
            "dropped invalid ingredient candidates"
        );
    }

    if valid.is_empty() {
        return Err(EngineError::NoValidIngredients);
    }
    Ok(valid)
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "order_ingredients")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub order_id: String,
    pub position: i32,
    pub name: String,
    pub kind: String,
    pub price_minor: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::orders::Entity",
        from = "Column::OrderId",
        to = "super::orders::Column::Id"
    )]
    Order,
}

impl Related<super::orders::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Order.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl ActiveModel {
    pub(crate) fn for_order(
        order_id: Uuid,
        position: usize,
        item: &Ingredient,
    ) -> ResultEngine<Self> {
        let position = i32::try_from(position)
            .map_err(|_| EngineError::InvalidAmount("too many ingredients".to_string()))?;
        Ok(Self {
            id: ActiveValue::Set(Uuid::new_v4().to_string()),
            order_id: ActiveValue::Set(order_id.to_string()),
            position: ActiveValue::Set(position),
            name: ActiveValue::Set(item.name.clone()),
            kind: ActiveValue::Set(item.kind.clone()),
            price_minor: ActiveValue::Set(item.price.minor()),
        })
    }
}

impl TryFrom<Model> for Ingredient {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        let price = Money::new(model.price_minor);
        if price.is_negative()
            || !price.is_price_precision()
            || model.name.is_empty()
            || model.kind.is_empty()
        {
            return Err(EngineError::InvalidData(format!(
                "invalid ingredient {}",
                model.id
            )));
        }
        Ok(Self {
            name: model.name,
            kind: model.kind,
            price,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(name: Option<&str>, kind: Option<&str>, cents: Option<i64>) -> RawIngredient {
        RawIngredient {
            name: name.map(str::to_string),
            kind: kind.map(str::to_string),
            price: cents.map(Money::from_cents),
        }
    }

    #[test]
    fn missing_or_empty_input_is_no_ingredients() {
        assert_eq!(validate_ingredients(None), Err(EngineError::NoIngredients));
        assert_eq!(
            validate_ingredients(Some(Vec::new())),
            Err(EngineError::NoIngredients)
        );
    }

    #[test]
    fn drops_every_rule_violation_and_keeps_order() {
        let input = vec![
            raw(Some("Espresso"), Some("base"), Some(250)),
            raw(Some(""), Some("syrup"), Some(50)),
            raw(Some("Caramel"), None, Some(50)),
            raw(Some("Oat milk"), Some("milk"), Some(-10)),
            raw(Some("Mystery"), Some("extra"), None),
            raw(Some("Water"), Some("base"), Some(0)),
            raw(Some("   "), Some("syrup"), Some(50)),
        ];

        let valid = validate_ingredients(Some(input)).unwrap();
        let names: Vec<&str> = valid.iter().map(Ingredient::name).collect();
        assert_eq!(names, vec!["Espresso", "Water"]);
        assert_eq!(valid[1].price(), Money::ZERO);
    }

    #[test]
    fn all_invalid_is_no_valid_ingredients() {
        let input = vec![
            raw(None, Some("base"), Some(100)),
            raw(Some("Latte"), Some("base"), Some(-1)),
        ];
        assert_eq!(
            validate_ingredients(Some(input)),
            Err(EngineError::NoValidIngredients)
        );
    }

    #[test]
    fn sub_cent_prices_survive_up_to_four_decimals() {
        let fine = RawIngredient::new("Espresso", "base", "1.255".parse().unwrap());
        let too_fine = RawIngredient::new("Ristretto", "base", Money::new(1_255_001));

        let valid = validate_ingredients(Some(vec![fine, too_fine])).unwrap();
        assert_eq!(valid.len(), 1);
        assert_eq!(valid[0].name(), "Espresso");
        assert_eq!(valid[0].price(), Money::new(1_255_000));
    }

    #[test]
    fn labels_are_trimmed_and_nfc_normalized() {
        let decomposed = "Cre\u{0301}me";
        let valid =
            validate_ingredients(Some(vec![raw(Some(decomposed), Some(" topping "), Some(75))]))
                .unwrap();
        assert_eq!(valid[0].name(), "Cr\u{e9}me");
        assert_eq!(valid[0].kind(), "topping");
    }
}
