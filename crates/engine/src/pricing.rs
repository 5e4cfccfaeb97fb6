//! Pure pricing, discount and point-accrual rules.
//!
//! Nothing in this module touches the database. [`plan_order`] takes validated
//! line items and an immutable account snapshot and returns an [`OrderPlan`]:
//! the order to insert plus the [`AccountDelta`] to apply. The engine commits
//! both in one DB transaction.
//!
//! Rules:
//! - base cost is the sum of positive unit prices;
//! - size multiplies the base cost (small 0.85, medium 1.00, large 1.25);
//! - delivery adds a flat fee;
//! - a redemption token (for the ordered size) or a birthday makes the order
//!   free, redemption first, never both;
//! - undiscounted paid orders earn `floor(total x 5)` points and add the total
//!   (rounded to the cent) to lifetime spend; free orders earn nothing.

use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use crate::{
    Account, DeliveryOption, DiscountKind, EngineError, Ingredient, Money, Order, OrderResult,
    ResultEngine, Size,
};

/// Loyalty points earned per whole currency unit paid.
pub const POINTS_PER_UNIT: i64 = 5;

fn overflow() -> EngineError {
    EngineError::InvalidAmount("amount too large".to_string())
}

fn inexact(amount: Money, size: Size) -> EngineError {
    EngineError::InvalidAmount(format!("cannot price {amount} as {size} exactly"))
}

/// Shop-level pricing parameters.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PricingRules {
    /// Flat surcharge for `DeliveryOption::Delivery`.
    pub delivery_fee: Money,
}

impl Default for PricingRules {
    fn default() -> Self {
        Self {
            delivery_fee: Money::from_cents(250),
        }
    }
}

/// Breakdown of the pre-discount price.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Quote {
    pub base: Money,
    pub subtotal: Money,
    pub delivery_fee: Money,
    /// `subtotal + delivery_fee`, reported as the original cost.
    pub original: Money,
}

/// Sum of unit prices over items priced above zero.
pub fn base_cost(items: &[Ingredient]) -> ResultEngine<Money> {
    items
        .iter()
        .map(Ingredient::price)
        .filter(|price| price.is_positive())
        .try_fold(Money::ZERO, |acc, price| acc.checked_add(price))
        .ok_or_else(overflow)
}

pub fn quote(
    items: &[Ingredient],
    size: Size,
    delivery: DeliveryOption,
    rules: &PricingRules,
) -> ResultEngine<Quote> {
    let base = base_cost(items)?;
    let subtotal = base
        .checked_mul_percent(size.multiplier_percent())
        .ok_or_else(|| inexact(base, size))?;
    let delivery_fee = match delivery {
        DeliveryOption::Delivery => rules.delivery_fee,
        DeliveryOption::Pickup => Money::ZERO,
    };
    let original = subtotal.checked_add(delivery_fee).ok_or_else(overflow)?;
    Ok(Quote {
        base,
        subtotal,
        delivery_fee,
        original,
    })
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Discount {
    pub kind: DiscountKind,
    pub amount: Money,
}

/// Outcome of discount resolution.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DiscountDecision {
    pub discount: Option<Discount>,
    /// Final charge after the discount.
    pub total: Money,
    /// Set when a birthday discount was consumed on that date.
    pub birthday_used_on: Option<NaiveDate>,
}

impl DiscountDecision {
    fn none(total: Money) -> Self {
        Self {
            discount: None,
            total,
            birthday_used_on: None,
        }
    }
}

fn normalize_token(token: Option<&str>) -> Option<&str> {
    token.map(str::trim).filter(|t| !t.is_empty())
}

/// Decides which discount, if any, applies to an order.
///
/// Guests never get a discount and their redemption tokens are ignored. For
/// an account, a redemption token must name the ordered size (else
/// [`EngineError::SizeMismatch`]) and wins over a birthday. A birthday counts
/// once per calendar day. An eligible order that already costs nothing gets no
/// discount record and does not consume the birthday.
pub fn resolve_discount(
    original: Money,
    size: Size,
    redemption: Option<&str>,
    account: Option<&Account>,
    today: NaiveDate,
) -> ResultEngine<DiscountDecision> {
    let Some(account) = account else {
        if normalize_token(redemption).is_some() {
            tracing::debug!("ignoring redemption token on guest checkout");
        }
        return Ok(DiscountDecision::none(original));
    };

    let kind = if let Some(token) = normalize_token(redemption) {
        match Size::try_from(token) {
            Ok(redeemable) if redeemable == size => Some(DiscountKind::Redemption),
            _ => {
                return Err(EngineError::SizeMismatch {
                    requested: size.as_str().to_string(),
                    redeemable: token.to_ascii_lowercase(),
                });
            }
        }
    } else if account.is_birthday_on(today) && !account.has_used_birthday_discount_on(today) {
        Some(DiscountKind::Birthday)
    } else {
        None
    };

    match kind {
        Some(kind) if original.is_positive() => {
            tracing::debug!(account_id = %account.id, kind = kind.as_str(), "discount applied");
            Ok(DiscountDecision {
                discount: Some(Discount {
                    kind,
                    amount: original,
                }),
                total: Money::ZERO,
                birthday_used_on: (kind == DiscountKind::Birthday).then_some(today),
            })
        }
        _ => Ok(DiscountDecision::none(original)),
    }
}

/// Points and spend produced by one order.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Accrual {
    pub points: i64,
    pub spend: Money,
}

/// Points accrue only on orders that were paid for without a discount.
pub fn accrue(total: Money, discount: Option<&Discount>) -> ResultEngine<Accrual> {
    if discount.is_some() || !total.is_positive() {
        return Ok(Accrual::default());
    }
    let points = total
        .floor_units_times(POINTS_PER_UNIT)
        .ok_or_else(overflow)?;
    Ok(Accrual {
        points,
        spend: total.round_to_cents(),
    })
}

/// Account fields a checkout reads and writes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AccountState {
    pub loyalty_points: i64,
    pub money_spent: Money,
    pub last_birthday_discount_used: Option<NaiveDate>,
}

impl From<&Account> for AccountState {
    fn from(account: &Account) -> Self {
        Self {
            loyalty_points: account.loyalty_points,
            money_spent: account.money_spent,
            last_birthday_discount_used: account.last_birthday_discount_used,
        }
    }
}

/// Change to apply to an account when an order commits.
///
/// `before` is the snapshot the plan was computed from; the commit only
/// succeeds if the stored account still matches it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AccountDelta {
    pub account_id: String,
    pub before: AccountState,
    pub after: AccountState,
}

impl AccountDelta {
    fn new(
        account: &Account,
        accrual: Accrual,
        birthday_used_on: Option<NaiveDate>,
    ) -> ResultEngine<Self> {
        let before = AccountState::from(account);
        let after = AccountState {
            loyalty_points: before
                .loyalty_points
                .checked_add(accrual.points)
                .ok_or_else(overflow)?,
            money_spent: before
                .money_spent
                .checked_add(accrual.spend)
                .ok_or_else(overflow)?,
            last_birthday_discount_used: birthday_used_on.or(before.last_birthday_discount_used),
        };
        Ok(Self {
            account_id: account.id.clone(),
            before,
            after,
        })
    }
}

/// Everything a checkout will persist, computed up front.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OrderPlan {
    pub order: Order,
    /// `None` for guest orders.
    pub account: Option<AccountDelta>,
}

impl OrderPlan {
    pub fn result(&self) -> OrderResult {
        let after = self.account.as_ref().map(|delta| delta.after);
        OrderResult {
            order_id: self.order.id,
            total_cost: self.order.total_cost,
            original_cost: self.order.original_cost,
            discount_amount: self.order.discount_amount.unwrap_or(Money::ZERO),
            discount_kind: self.order.discount_kind,
            points_earned: self.order.points_earned,
            loyalty_points: after.map_or(0, |state| state.loyalty_points),
            money_spent: after.map_or(Money::ZERO, |state| state.money_spent),
            is_guest: self.order.is_guest(),
        }
    }
}

/// Input of [`plan_order`].
#[derive(Clone, Debug)]
pub struct PlanInput<'a> {
    pub items: Vec<Ingredient>,
    pub size: Size,
    pub delivery: DeliveryOption,
    pub redemption: Option<&'a str>,
    pub account: Option<&'a Account>,
    pub rules: &'a PricingRules,
    pub now: DateTime<Utc>,
    /// Shop-local calendar date of `now`.
    pub today: NaiveDate,
}

/// Prices an order, resolves its discount and computes the account delta.
pub fn plan_order(input: PlanInput<'_>) -> ResultEngine<OrderPlan> {
    let quote = quote(&input.items, input.size, input.delivery, input.rules)?;
    tracing::debug!(
        base = %quote.base,
        subtotal = %quote.subtotal,
        delivery_fee = %quote.delivery_fee,
        size = input.size.as_str(),
        "order priced"
    );
    let decision = resolve_discount(
        quote.original,
        input.size,
        input.redemption,
        input.account,
        input.today,
    )?;

    let accrual = match input.account {
        Some(_) => accrue(decision.total, decision.discount.as_ref())?,
        None => Accrual::default(),
    };
    let account = input
        .account
        .map(|account| AccountDelta::new(account, accrual, decision.birthday_used_on))
        .transpose()?;

    let order = Order {
        id: Uuid::new_v4(),
        account_id: input.account.map(|account| account.id.clone()),
        ingredients: input.items,
        size: input.size,
        delivery: input.delivery,
        total_cost: decision.total,
        original_cost: quote.original,
        discount_amount: decision.discount.map(|d| d.amount),
        discount_kind: decision.discount.map(|d| d.kind),
        points_earned: accrual.points,
        created_at: input.now,
    };

    Ok(OrderPlan { order, account })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RawIngredient;

    fn item(name: &str, cents: i64) -> Ingredient {
        Ingredient::try_from(RawIngredient::new(name, "base", Money::from_cents(cents))).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn account(points: i64, spent_cents: i64, birth: Option<NaiveDate>) -> Account {
        let mut account = Account::new("Ada".to_string(), "L".to_string(), birth, Utc::now());
        account.loyalty_points = points;
        account.money_spent = Money::from_cents(spent_cents);
        account
    }

    fn plan(
        items: Vec<Ingredient>,
        size: Size,
        redemption: Option<&str>,
        account: Option<&Account>,
        today: NaiveDate,
    ) -> ResultEngine<OrderPlan> {
        plan_order(PlanInput {
            items,
            size,
            delivery: DeliveryOption::Pickup,
            redemption,
            account,
            rules: &PricingRules::default(),
            now: Utc::now(),
            today,
        })
    }

    #[test]
    fn zero_priced_items_do_not_contribute() {
        let items = vec![item("Water", 0), item("Espresso", 250), item("Syrup", 75)];
        assert_eq!(base_cost(&items).unwrap(), Money::from_cents(325));
    }

    #[test]
    fn original_cost_is_base_times_multiplier_plus_fee() {
        let items = vec![item("Espresso", 250), item("Oat milk", 149)];
        let rules = PricingRules::default();
        let cases = [
            (Size::Small, DeliveryOption::Pickup, Money::new(3_391_500)),
            (Size::Medium, DeliveryOption::Pickup, Money::from_cents(399)),
            (Size::Large, DeliveryOption::Pickup, Money::new(4_987_500)),
            (Size::Small, DeliveryOption::Delivery, Money::new(5_891_500)),
            (Size::Large, DeliveryOption::Delivery, Money::new(7_487_500)),
        ];
        for (size, delivery, expected) in cases {
            let quote = quote(&items, size, delivery, &rules).unwrap();
            assert_eq!(quote.original, expected, "{size} {delivery:?}");
        }
    }

    #[test]
    fn sub_cent_prices_are_priced_exactly() {
        let espresso: Money = "1.255".parse().unwrap();
        let items = vec![
            Ingredient::try_from(RawIngredient::new("Espresso", "base", espresso)).unwrap(),
        ];
        let rules = PricingRules::default();

        let small = quote(&items, Size::Small, DeliveryOption::Pickup, &rules).unwrap();
        assert_eq!(small.base, espresso);
        // 1.255 x 0.85 = 1.06675
        assert_eq!(small.subtotal, Money::new(1_066_750));
        assert_eq!(small.original, Money::new(1_066_750));

        let large = quote(&items, Size::Large, DeliveryOption::Delivery, &rules).unwrap();
        // 1.255 x 1.25 + 2.50 = 4.06875
        assert_eq!(large.subtotal, Money::new(1_568_750));
        assert_eq!(large.delivery_fee, Money::from_cents(250));
        assert_eq!(large.original, Money::new(4_068_750));
    }

    #[test]
    fn sub_cent_total_floors_points_and_rounds_spend() {
        let acc = account(0, 0, None);
        let price: Money = "2.0075".parse().unwrap();
        let items = vec![Ingredient::try_from(RawIngredient::new("Mocha", "base", price)).unwrap()];
        let plan = plan(items, Size::Medium, None, Some(&acc), date(2026, 3, 3)).unwrap();
        assert_eq!(plan.order.original_cost, price);
        assert_eq!(plan.order.points_earned, 10);
        assert_eq!(plan.account.unwrap().after.money_spent, Money::from_cents(201));
    }

    #[test]
    fn quote_ignores_item_order() {
        let rules = PricingRules::default();
        let a = vec![item("A", 199), item("B", 301), item("C", 0)];
        let b = vec![item("C", 0), item("B", 301), item("A", 199)];
        assert_eq!(
            quote(&a, Size::Large, DeliveryOption::Delivery, &rules).unwrap(),
            quote(&b, Size::Large, DeliveryOption::Delivery, &rules).unwrap()
        );
    }

    #[test]
    fn one_unit_order_earns_five_points() {
        let acc = account(10, 1000, None);
        let plan = plan(vec![item("Drip", 100)], Size::Medium, None, Some(&acc), date(2026, 3, 3))
            .unwrap();
        assert_eq!(plan.order.total_cost, Money::from_cents(100));
        assert_eq!(plan.order.points_earned, 5);
        let delta = plan.account.unwrap();
        assert_eq!(delta.after.loyalty_points, 15);
        assert_eq!(delta.after.money_spent, Money::from_cents(1100));
    }

    #[test]
    fn fractional_totals_floor_points_and_round_spend() {
        let acc = account(0, 0, None);
        let plan = plan(vec![item("Latte", 399)], Size::Small, None, Some(&acc), date(2026, 3, 3))
            .unwrap();
        assert_eq!(plan.order.total_cost, Money::new(3_391_500));
        assert_eq!(plan.order.points_earned, 16);
        assert_eq!(plan.account.unwrap().after.money_spent, Money::from_cents(339));
    }

    #[test]
    fn birthday_makes_the_order_free_and_is_marked_used() {
        let today = date(2026, 10, 18);
        let acc = account(40, 500, Some(date(1995, 10, 18)));
        let plan = plan(vec![item("Mocha", 450)], Size::Large, None, Some(&acc), today).unwrap();

        assert_eq!(plan.order.discount_kind, Some(DiscountKind::Birthday));
        assert_eq!(plan.order.total_cost, Money::ZERO);
        assert_eq!(plan.order.discount_amount, Some(plan.order.original_cost));
        assert_eq!(plan.order.points_earned, 0);
        let delta = plan.account.unwrap();
        assert_eq!(delta.after.loyalty_points, 40);
        assert_eq!(delta.after.money_spent, Money::from_cents(500));
        assert_eq!(delta.after.last_birthday_discount_used, Some(today));
    }

    #[test]
    fn birthday_is_not_reused_the_same_day() {
        let today = date(2026, 10, 18);
        let mut acc = account(0, 0, Some(date(1995, 10, 18)));
        acc.last_birthday_discount_used = Some(today);
        let plan = plan(vec![item("Mocha", 400)], Size::Medium, None, Some(&acc), today).unwrap();
        assert_eq!(plan.order.discount_kind, None);
        assert_eq!(plan.order.total_cost, Money::from_cents(400));
        assert_eq!(plan.order.points_earned, 20);
    }

    #[test]
    fn redemption_wins_over_birthday() {
        let today = date(2026, 10, 18);
        let acc = account(0, 0, Some(date(1995, 10, 18)));
        let plan = plan(
            vec![item("Mocha", 400)],
            Size::Large,
            Some("LARGE"),
            Some(&acc),
            today,
        )
        .unwrap();
        assert_eq!(plan.order.discount_kind, Some(DiscountKind::Redemption));
        assert_eq!(plan.account.unwrap().after.last_birthday_discount_used, None);
    }

    #[test]
    fn redemption_for_another_size_is_rejected() {
        let acc = account(100, 0, None);
        let err = plan(
            vec![item("Mocha", 400)],
            Size::Small,
            Some("large"),
            Some(&acc),
            date(2026, 1, 1),
        )
        .unwrap_err();
        assert_eq!(
            err,
            EngineError::SizeMismatch {
                requested: "small".to_string(),
                redeemable: "large".to_string(),
            }
        );
    }

    #[test]
    fn unknown_redemption_size_is_a_mismatch() {
        let acc = account(100, 0, None);
        let err = plan(
            vec![item("Mocha", 400)],
            Size::Medium,
            Some("venti"),
            Some(&acc),
            date(2026, 1, 1),
        )
        .unwrap_err();
        assert!(matches!(err, EngineError::SizeMismatch { .. }));
    }

    #[test]
    fn free_order_gets_no_discount_record() {
        let today = date(2026, 10, 18);
        let acc = account(0, 0, Some(date(1995, 10, 18)));
        let plan = plan(vec![item("Water", 0)], Size::Medium, None, Some(&acc), today).unwrap();
        assert_eq!(plan.order.discount_kind, None);
        assert_eq!(plan.order.discount_amount, None);
        assert_eq!(plan.order.points_earned, 0);
        assert_eq!(plan.account.unwrap().after.last_birthday_discount_used, None);
    }

    #[test]
    fn guests_never_earn_or_discount() {
        let plan = plan(
            vec![item("Latte", 500)],
            Size::Medium,
            Some("medium"),
            None,
            date(2026, 1, 1),
        )
        .unwrap();
        assert!(plan.account.is_none());
        assert_eq!(plan.order.discount_kind, None);
        assert_eq!(plan.order.total_cost, Money::from_cents(500));
        let result = plan.result();
        assert_eq!(result.points_earned, 0);
        assert_eq!(result.money_spent, Money::ZERO);
        assert!(result.is_guest);
    }

    #[test]
    fn empty_redemption_token_counts_as_absent() {
        let acc = account(0, 0, None);
        let plan = plan(
            vec![item("Latte", 200)],
            Size::Small,
            Some("  "),
            Some(&acc),
            date(2026, 1, 1),
        )
        .unwrap();
        assert_eq!(plan.order.discount_kind, None);
        assert_eq!(plan.order.points_earned, 8);
    }
}
