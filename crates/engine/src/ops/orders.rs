use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseTransaction, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect, TransactionTrait, sea_query::Expr,
};
use uuid::Uuid;

use crate::{
    AccountDelta, Checkout, DeliveryOption, EngineError, Ingredient, Order, OrderPlan,
    OrderResult, ResultEngine, Size, accounts, ingredients, orders,
    pricing::{PlanInput, plan_order},
    validate_ingredients,
};

use super::{Engine, with_tx};

impl Engine {
    /// Prices a drink, applies at most one discount, records the order and
    /// updates the loyalty account.
    ///
    /// `account_id` is the authenticated account, `None` for a guest.
    /// `now` is the order timestamp; the shop-local date of `now` decides
    /// birthday eligibility.
    ///
    /// Nothing is written unless the whole checkout succeeds: the order, its
    /// ingredients and the account change commit together.
    pub async fn price_and_record_order(
        &self,
        checkout: Checkout,
        account_id: Option<&str>,
        now: DateTime<Utc>,
    ) -> ResultEngine<OrderResult> {
        let plan = self.plan_checkout(checkout, account_id, now).await?;
        self.commit_order(&plan).await
    }

    /// Computes what a checkout would persist without writing anything.
    ///
    /// Validation and discount errors surface here, before any I/O other than
    /// the account lookup.
    pub async fn plan_checkout(
        &self,
        checkout: Checkout,
        account_id: Option<&str>,
        now: DateTime<Utc>,
    ) -> ResultEngine<OrderPlan> {
        let items = validate_ingredients(checkout.ingredients)?;
        let size = Size::from_request(checkout.size.as_deref());
        let delivery = DeliveryOption::from_request(checkout.delivery.as_deref());

        let account = match account_id {
            Some(id) => Some(self.require_account(&self.database, id).await?),
            None => None,
        };

        plan_order(PlanInput {
            items,
            size,
            delivery,
            redemption: checkout.redemption.as_deref(),
            account: account.as_ref(),
            rules: &self.rules,
            now,
            today: self.local_date(now),
        })
    }

    /// Persists a plan produced by [`Engine::plan_checkout`].
    ///
    /// The account row is only updated if it still holds the values the plan
    /// was computed from; otherwise the whole commit is rolled back with
    /// [`EngineError::Persistence`].
    pub async fn commit_order(&self, plan: &OrderPlan) -> ResultEngine<OrderResult> {
        with_tx!(self, |db_tx| {
            insert_order(&db_tx, &plan.order).await?;
            if let Some(delta) = &plan.account {
                apply_account_delta(&db_tx, delta).await?;
            }
            Ok::<_, EngineError>(())
        })?;

        let result = plan.result();
        tracing::info!(
            order_id = %result.order_id,
            guest = result.is_guest,
            total = %result.total_cost,
            discount = ?result.discount_kind,
            points_earned = result.points_earned,
            "order recorded"
        );
        Ok(result)
    }

    /// Return an order with its ingredients.
    pub async fn order(&self, order_id: Uuid) -> ResultEngine<Order> {
        let model = orders::Entity::find_by_id(order_id.to_string())
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("order not exists".to_string()))?;
        let mut loaded = load_with_ingredients(&self.database, vec![model]).await?;
        loaded
            .pop()
            .ok_or_else(|| EngineError::KeyNotFound("order not exists".to_string()))
    }

    /// Order history of an account, newest first.
    pub async fn orders_for_account(
        &self,
        account_id: &str,
        limit: u64,
    ) -> ResultEngine<Vec<Order>> {
        self.require_account(&self.database, account_id).await?;
        let models = orders::Entity::find()
            .filter(orders::Column::AccountId.eq(account_id))
            .order_by_desc(orders::Column::CreatedAt)
            .order_by_desc(orders::Column::Id)
            .limit(limit)
            .all(&self.database)
            .await?;
        load_with_ingredients(&self.database, models).await
    }
}

async fn insert_order(db_tx: &DatabaseTransaction, order: &Order) -> ResultEngine<()> {
    orders::ActiveModel::from(order).insert(db_tx).await?;
    for (position, item) in order.ingredients.iter().enumerate() {
        ingredients::ActiveModel::for_order(order.id, position, item)?
            .insert(db_tx)
            .await?;
    }
    Ok(())
}

/// Compare-and-set update of the loyalty fields.
async fn apply_account_delta(
    db_tx: &DatabaseTransaction,
    delta: &AccountDelta,
) -> ResultEngine<()> {
    let before = delta.before;
    let after = delta.after;

    let mut update = accounts::Entity::update_many()
        .col_expr(
            accounts::Column::LoyaltyPoints,
            Expr::value(after.loyalty_points),
        )
        .col_expr(
            accounts::Column::MoneySpentMinor,
            Expr::value(after.money_spent.minor()),
        )
        .col_expr(
            accounts::Column::LastBirthdayDiscountUsed,
            Expr::value(after.last_birthday_discount_used),
        )
        .filter(accounts::Column::Id.eq(delta.account_id.as_str()))
        .filter(accounts::Column::LoyaltyPoints.eq(before.loyalty_points))
        .filter(accounts::Column::MoneySpentMinor.eq(before.money_spent.minor()));
    update = match before.last_birthday_discount_used {
        Some(date) => update.filter(accounts::Column::LastBirthdayDiscountUsed.eq(date)),
        None => update.filter(accounts::Column::LastBirthdayDiscountUsed.is_null()),
    };

    let res = update.exec(db_tx).await?;
    if res.rows_affected != 1 {
        tracing::warn!(
            account_id = %delta.account_id,
            "account changed since the order was priced"
        );
        return Err(EngineError::Persistence(
            "account was modified concurrently".to_string(),
        ));
    }
    Ok(())
}

async fn load_with_ingredients<C: ConnectionTrait>(
    db: &C,
    models: Vec<orders::Model>,
) -> ResultEngine<Vec<Order>> {
    if models.is_empty() {
        return Ok(Vec::new());
    }
    let ids: Vec<String> = models.iter().map(|m| m.id.clone()).collect();
    let rows = ingredients::Entity::find()
        .filter(ingredients::Column::OrderId.is_in(ids))
        .order_by_asc(ingredients::Column::OrderId)
        .order_by_asc(ingredients::Column::Position)
        .all(db)
        .await?;

    let mut by_order: HashMap<String, Vec<Ingredient>> = HashMap::new();
    for row in rows {
        let order_id = row.order_id.clone();
        by_order
            .entry(order_id)
            .or_default()
            .push(Ingredient::try_from(row)?);
    }

    models
        .into_iter()
        .map(|model| {
            let items = by_order.remove(&model.id).unwrap_or_default();
            let mut order = Order::try_from(model)?;
            order.ingredients = items;
            Ok(order)
        })
        .collect()
}
