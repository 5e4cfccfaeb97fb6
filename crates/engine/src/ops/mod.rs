use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use sea_orm::{ConnectionTrait, DatabaseConnection, EntityTrait};

use crate::{Account, EngineError, Money, PricingRules, ResultEngine};

mod accounts;
mod orders;

/// Run a block inside a DB transaction, committing on success and rolling back on error.
macro_rules! with_tx {
    ($self:expr, |$tx:ident| $body:expr) => {{
        let $tx = $self.database.begin().await?;
        let result = $body;
        match result {
            Ok(value) => {
                $tx.commit().await?;
                Ok(value)
            }
            Err(err) => Err(err),
        }
    }};
}

pub(crate) use with_tx;

#[derive(Debug)]
pub struct Engine {
    database: DatabaseConnection,
    rules: PricingRules,
    timezone: Tz,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    /// Shop-local calendar date of an instant.
    ///
    /// Birthdays and "already used today" are decided on this date.
    pub fn local_date(&self, at: DateTime<Utc>) -> NaiveDate {
        at.with_timezone(&self.timezone).date_naive()
    }

    async fn require_account<C: ConnectionTrait>(
        &self,
        db: &C,
        account_id: &str,
    ) -> ResultEngine<Account> {
        let model = crate::accounts::Entity::find_by_id(account_id.to_string())
            .one(db)
            .await?
            .ok_or_else(|| EngineError::AccountNotFound(account_id.to_string()))?;
        Account::try_from(model)
    }
}

/// The builder for `Engine`
#[derive(Default)]
pub struct EngineBuilder {
    database: DatabaseConnection,
    delivery_fee: Option<Money>,
    timezone: Option<Tz>,
}

impl EngineBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = db;
        self
    }

    /// Flat delivery surcharge (default `2.50`).
    pub fn delivery_fee(mut self, fee: Money) -> EngineBuilder {
        self.delivery_fee = Some(fee);
        self
    }

    /// Shop timezone used to decide "today" (default UTC).
    pub fn timezone(mut self, timezone: Tz) -> EngineBuilder {
        self.timezone = Some(timezone);
        self
    }

    /// Construct `Engine`
    pub async fn build(self) -> ResultEngine<Engine> {
        let mut rules = PricingRules::default();
        if let Some(fee) = self.delivery_fee {
            if fee.is_negative() {
                return Err(EngineError::InvalidAmount(
                    "delivery fee must be >= 0".to_string(),
                ));
            }
            rules.delivery_fee = fee;
        }
        Ok(Engine {
            database: self.database,
            rules,
            timezone: self.timezone.unwrap_or(chrono_tz::UTC),
        })
    }
}
