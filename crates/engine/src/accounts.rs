//! Loyalty accounts.
//!
//! The engine only ever reads an [`Account`] as an immutable snapshot. Changes
//! produced by a checkout travel as an [`AccountDelta`](crate::AccountDelta)
//! and are written back in the same DB transaction as the order.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use uuid::Uuid;

use crate::{EngineError, Money};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Account {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub loyalty_points: i64,
    /// Lifetime spend, always a whole number of cents.
    pub money_spent: Money,
    pub birth_date: Option<NaiveDate>,
    pub last_birthday_discount_used: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
}

impl Account {
    pub fn new(
        first_name: String,
        last_name: String,
        birth_date: Option<NaiveDate>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            first_name,
            last_name,
            loyalty_points: 0,
            money_spent: Money::ZERO,
            birth_date,
            last_birthday_discount_used: None,
            created_at,
        }
    }

    /// Whether `today` is this account's birthday (month and day).
    ///
    /// A Feb 29 birthday is celebrated on Feb 28 in non-leap years.
    pub fn is_birthday_on(&self, today: NaiveDate) -> bool {
        let Some(birth) = self.birth_date else {
            return false;
        };
        if birth.month() == today.month() && birth.day() == today.day() {
            return true;
        }
        birth.month() == 2
            && birth.day() == 29
            && today.month() == 2
            && today.day() == 28
            && NaiveDate::from_ymd_opt(today.year(), 2, 29).is_none()
    }

    /// Whether the birthday discount was already used on `today`.
    pub fn has_used_birthday_discount_on(&self, today: NaiveDate) -> bool {
        self.last_birthday_discount_used == Some(today)
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "accounts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub loyalty_points: i64,
    pub money_spent_minor: i64,
    pub birth_date: Option<Date>,
    pub last_birthday_discount_used: Option<Date>,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::orders::Entity")]
    Orders,
}

impl Related<super::orders::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Orders.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Account> for ActiveModel {
    fn from(account: &Account) -> Self {
        Self {
            id: ActiveValue::Set(account.id.clone()),
            first_name: ActiveValue::Set(account.first_name.clone()),
            last_name: ActiveValue::Set(account.last_name.clone()),
            loyalty_points: ActiveValue::Set(account.loyalty_points),
            money_spent_minor: ActiveValue::Set(account.money_spent.minor()),
            birth_date: ActiveValue::Set(account.birth_date),
            last_birthday_discount_used: ActiveValue::Set(account.last_birthday_discount_used),
            created_at: ActiveValue::Set(account.created_at),
        }
    }
}

impl TryFrom<Model> for Account {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        if model.loyalty_points < 0 || model.money_spent_minor < 0 {
            return Err(EngineError::InvalidData(format!(
                "negative balance on account {}",
                model.id
            )));
        }
        Ok(Self {
            id: model.id,
            first_name: model.first_name,
            last_name: model.last_name,
            loyalty_points: model.loyalty_points,
            money_spent: Money::new(model.money_spent_minor),
            birth_date: model.birth_date,
            last_birthday_discount_used: model.last_birthday_discount_used,
            created_at: model.created_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn account_born(birth: Option<NaiveDate>) -> Account {
        Account::new("Ada".to_string(), "L".to_string(), birth, Utc::now())
    }

    #[test]
    fn birthday_matches_month_and_day_only() {
        let account = account_born(Some(date(1990, 6, 15)));
        assert!(account.is_birthday_on(date(2026, 6, 15)));
        assert!(!account.is_birthday_on(date(2026, 6, 16)));
        assert!(!account.is_birthday_on(date(2026, 7, 15)));
    }

    #[test]
    fn no_birth_date_is_never_a_birthday() {
        assert!(!account_born(None).is_birthday_on(date(2026, 1, 1)));
    }

    #[test]
    fn leap_day_birthday_moves_to_feb_28() {
        let account = account_born(Some(date(2000, 2, 29)));
        assert!(account.is_birthday_on(date(2027, 2, 28)));
        assert!(!account.is_birthday_on(date(2028, 2, 28)));
        assert!(account.is_birthday_on(date(2028, 2, 29)));
    }

    #[test]
    fn usage_check_compares_dates_not_instants() {
        let mut account = account_born(Some(date(1990, 6, 15)));
        account.last_birthday_discount_used = Some(date(2026, 6, 15));
        assert!(account.has_used_birthday_discount_on(date(2026, 6, 15)));
        assert!(!account.has_used_birthday_discount_on(date(2027, 6, 15)));
    }
}
