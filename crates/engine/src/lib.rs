//! Pricing and loyalty bookkeeping for the coffee shop.
//!
//! The crate is split in two layers:
//!
//! - pure rules ([`validate_ingredients`], [`pricing`]) that price a drink,
//!   pick a discount and compute the loyalty delta without any I/O;
//! - the [`Engine`], which loads account snapshots, runs the rules and commits
//!   the resulting order and account change in a single DB transaction.

pub use accounts::Account;
pub use error::EngineError;
pub use ingredients::{Ingredient, RawIngredient, validate_ingredients};
pub use money::Money;
pub use ops::{Engine, EngineBuilder};
pub use orders::{Checkout, DeliveryOption, DiscountKind, Order, OrderResult, Size};
pub use pricing::{AccountDelta, AccountState, OrderPlan, POINTS_PER_UNIT, PricingRules};

mod accounts;
mod error;
mod ingredients;
mod money;
mod ops;
mod orders;
pub mod pricing;
mod util;

type ResultEngine<T> = Result<T, EngineError>;
