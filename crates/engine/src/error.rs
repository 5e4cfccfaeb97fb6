//! The module contains the errors the engine can throw.
//!
//! The errors fall in two groups:
//!
//! - input errors ([`NoIngredients`], [`NoValidIngredients`], [`SizeMismatch`],
//!   [`InvalidAmount`]) that the caller can fix by correcting the request;
//! - state errors ([`AccountNotFound`], [`KeyNotFound`], [`InvalidData`],
//!   [`Persistence`], [`Database`]) that are reported as server-side failures.
//!
//!  [`NoIngredients`]: EngineError::NoIngredients
//!  [`NoValidIngredients`]: EngineError::NoValidIngredients
//!  [`SizeMismatch`]: EngineError::SizeMismatch
//!  [`InvalidAmount`]: EngineError::InvalidAmount
//!  [`AccountNotFound`]: EngineError::AccountNotFound
//!  [`KeyNotFound`]: EngineError::KeyNotFound
//!  [`InvalidData`]: EngineError::InvalidData
//!  [`Persistence`]: EngineError::Persistence
//!  [`Database`]: EngineError::Database
use sea_orm::DbErr;
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("No ingredients provided. Please add ingredients to your drink.")]
    NoIngredients,
    #[error(
        "Invalid ingredients provided. Please ensure all ingredients have valid names and prices."
    )]
    NoValidIngredients,
    #[error("You can only redeem a {redeemable} size drink, but a {requested} drink was ordered.")]
    SizeMismatch {
        requested: String,
        redeemable: String,
    },
    #[error("\"{0}\" account not found!")]
    AccountNotFound(String),
    #[error("\"{0}\" key not found!")]
    KeyNotFound(String),
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("Invalid stored data: {0}")]
    InvalidData(String),
    #[error("Persistence failure: {0}")]
    Persistence(String),
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl EngineError {
    /// `true` for errors the caller caused and can correct by resubmitting a
    /// different request.
    #[must_use]
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            Self::NoIngredients
                | Self::NoValidIngredients
                | Self::SizeMismatch { .. }
                | Self::InvalidAmount(_)
        )
    }

    /// `true` when the store did not accept a write.
    #[must_use]
    pub fn is_persistence_failure(&self) -> bool {
        matches!(self, Self::Persistence(_) | Self::Database(_))
    }

    /// Message safe to hand to an end user.
    ///
    /// State errors collapse to a generic text; details stay in the logs.
    #[must_use]
    pub fn public_message(&self) -> String {
        match self {
            Self::AccountNotFound(_) => "Loyalty account not found.".to_string(),
            Self::KeyNotFound(_) => "Not found.".to_string(),
            Self::InvalidData(_) | Self::Persistence(_) | Self::Database(_) => {
                "An error occurred while processing your order.".to_string()
            }
            other => other.to_string(),
        }
    }
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::NoIngredients, Self::NoIngredients) => true,
            (Self::NoValidIngredients, Self::NoValidIngredients) => true,
            (
                Self::SizeMismatch {
                    requested: a,
                    redeemable: b,
                },
                Self::SizeMismatch {
                    requested: c,
                    redeemable: d,
                },
            ) => a == c && b == d,
            (Self::AccountNotFound(a), Self::AccountNotFound(b)) => a == b,
            (Self::KeyNotFound(a), Self::KeyNotFound(b)) => a == b,
            (Self::InvalidAmount(a), Self::InvalidAmount(b)) => a == b,
            (Self::InvalidData(a), Self::InvalidData(b)) => a == b,
            (Self::Persistence(a), Self::Persistence(b)) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
