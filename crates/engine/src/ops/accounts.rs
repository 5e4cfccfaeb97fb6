use chrono::{NaiveDate, Utc};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, sea_query::Expr};

use crate::{Account, EngineError, ResultEngine, accounts, util::normalize_text};

use super::Engine;

impl Engine {
    /// Register a new loyalty account with a zero balance.
    pub async fn new_account(
        &self,
        first_name: &str,
        last_name: &str,
        birth_date: Option<NaiveDate>,
    ) -> ResultEngine<String> {
        let account = Account::new(
            normalize_text(first_name),
            normalize_text(last_name),
            birth_date,
            Utc::now(),
        );
        accounts::ActiveModel::from(&account)
            .insert(&self.database)
            .await?;
        tracing::info!(account_id = %account.id, "account created");
        Ok(account.id)
    }

    /// Return an account snapshot from DB.
    pub async fn account(&self, account_id: &str) -> ResultEngine<Account> {
        self.require_account(&self.database, account_id).await
    }

    /// Set or clear the birth date used for the birthday discount.
    pub async fn set_birth_date(
        &self,
        account_id: &str,
        birth_date: Option<NaiveDate>,
    ) -> ResultEngine<()> {
        let res = accounts::Entity::update_many()
            .col_expr(accounts::Column::BirthDate, Expr::value(birth_date))
            .filter(accounts::Column::Id.eq(account_id))
            .exec(&self.database)
            .await?;
        if res.rows_affected == 0 {
            return Err(EngineError::AccountNotFound(account_id.to_string()));
        }
        Ok(())
    }
}
