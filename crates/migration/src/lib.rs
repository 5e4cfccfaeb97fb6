pub use sea_orm_migration::prelude::*;

mod m20251124_000000_init;
mod m20251130_070000_birthday_discounts;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20251124_000000_init::Migration),
            Box::new(m20251130_070000_birthday_discounts::Migration),
        ]
    }
}
