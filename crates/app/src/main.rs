use std::{error::Error, io::Read};

use api_types::{
    account::CurrentAccount,
    checkout::{CheckoutError, CheckoutRequest},
};
use chrono::{NaiveDate, Utc};
use chrono_tz::Tz;
use clap::{Args, Parser, Subcommand};
use engine::{Engine, EngineError, Money};
use migration::{Migrator, MigratorTrait};
use serde::Serialize;
use uuid::Uuid;

mod checkout;
mod export;
mod settings;

type AppResult<T> = Result<T, Box<dyn Error + Send + Sync>>;

#[derive(Parser, Debug)]
#[command(name = "coffee_loyalty")]
#[command(about = "Coffee shop checkout and loyalty bookkeeping")]
struct Cli {
    /// Settings file (TOML, optional).
    #[arg(long, default_value = "settings")]
    config: String,

    /// Database connection string, overrides the settings file.
    #[arg(long, env = "DATABASE_URL")]
    database_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    Account(Account),
    Order(Order),
}

#[derive(Args, Debug)]
struct Account {
    #[command(subcommand)]
    command: AccountCommand,
}

#[derive(Subcommand, Debug)]
enum AccountCommand {
    /// Register a loyalty account.
    Create(AccountCreateArgs),
    /// Show points and lifetime spend.
    Show(AccountIdArgs),
    /// Set or clear the birth date.
    Birthday(BirthdayArgs),
}

#[derive(Args, Debug)]
struct AccountCreateArgs {
    #[arg(long)]
    first_name: String,
    #[arg(long)]
    last_name: String,
    /// Birth date as YYYY-MM-DD.
    #[arg(long)]
    birth_date: Option<NaiveDate>,
}

#[derive(Args, Debug)]
struct AccountIdArgs {
    #[arg(long)]
    id: String,
}

#[derive(Args, Debug)]
struct BirthdayArgs {
    #[arg(long)]
    id: String,
    #[arg(long, conflicts_with = "clear", required_unless_present = "clear")]
    date: Option<NaiveDate>,
    #[arg(long)]
    clear: bool,
}

#[derive(Args, Debug)]
struct Order {
    #[command(subcommand)]
    command: OrderCommand,
}

#[derive(Subcommand, Debug)]
enum OrderCommand {
    /// Price and record a drink order.
    Place(PlaceArgs),
    /// Show one order with its ingredients.
    Show(OrderIdArgs),
    /// List an account's orders, newest first.
    History(HistoryArgs),
    /// Write an account's orders as CSV.
    Export(ExportArgs),
}

#[derive(Args, Debug)]
struct PlaceArgs {
    /// JSON checkout body file, `-` for stdin.
    #[arg(long, default_value = "-")]
    request: String,
    /// Signed-in account; omit for a guest order.
    #[arg(long)]
    account: Option<String>,
    /// Size named by a redemption token.
    #[arg(long)]
    redeem: Option<String>,
}

#[derive(Args, Debug)]
struct OrderIdArgs {
    #[arg(long)]
    id: Uuid,
}

#[derive(Args, Debug)]
struct HistoryArgs {
    #[arg(long)]
    account: String,
    #[arg(long, default_value_t = 20)]
    limit: u64,
}

#[derive(Args, Debug)]
struct ExportArgs {
    #[arg(long)]
    account: String,
    /// Output file; stdout when omitted.
    #[arg(long)]
    output: Option<String>,
    #[arg(long, default_value_t = 1000)]
    limit: u64,
}

fn print_json<T: Serialize>(value: &T) -> AppResult<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn read_request(path: &str) -> AppResult<CheckoutRequest> {
    let raw = if path == "-" {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        buf
    } else {
        std::fs::read_to_string(path)?
    };
    Ok(serde_json::from_str(&raw)?)
}

/// Report an engine error the way the request boundary would and exit.
///
/// Input errors keep their detail, state errors are logged and shown as a
/// generic message.
fn exit_with(err: EngineError) -> ! {
    let code = if err.is_input_error() {
        2
    } else {
        tracing::error!("request failed: {err}");
        1
    };
    let body = CheckoutError {
        message: err.public_message(),
    };
    match serde_json::to_string_pretty(&body) {
        Ok(text) => eprintln!("{text}"),
        Err(_) => eprintln!("{}", body.message),
    }
    std::process::exit(code);
}

async fn build_engine(settings: &settings::Settings, database_url: &str) -> AppResult<Engine> {
    let db = sea_orm::Database::connect(database_url).await?;
    Migrator::up(&db, None).await?;

    let timezone: Tz = settings
        .shop
        .timezone
        .parse()
        .map_err(|err| format!("invalid shop timezone: {err}"))?;
    let delivery_fee: Money = settings.shop.delivery_fee.parse()?;

    Ok(Engine::builder()
        .database(db)
        .delivery_fee(delivery_fee)
        .timezone(timezone)
        .build()
        .await?)
}

#[tokio::main]
async fn main() -> AppResult<()> {
    let cli = Cli::parse();
    let settings = settings::Settings::new(&cli.config)?;

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(format!(
            "coffee_loyalty={level},engine={level}",
            level = settings.app.level
        ))
        .init();

    let database_url = cli
        .database_url
        .clone()
        .unwrap_or_else(|| settings.database_url());
    let engine = build_engine(&settings, &database_url).await?;

    match cli.command {
        Command::Account(Account { command }) => match command {
            AccountCommand::Create(args) => {
                let id = engine
                    .new_account(&args.first_name, &args.last_name, args.birth_date)
                    .await
                    .unwrap_or_else(|err| exit_with(err));
                println!("created account: {id}");
            }
            AccountCommand::Show(args) => {
                let account = engine
                    .account(&args.id)
                    .await
                    .unwrap_or_else(|err| exit_with(err));
                print_json(&CurrentAccount {
                    is_logged_in: true,
                    points: account.loyalty_points,
                    money_spent: Some(account.money_spent.to_string()),
                })?;
            }
            AccountCommand::Birthday(args) => {
                let date = if args.clear { None } else { args.date };
                engine
                    .set_birth_date(&args.id, date)
                    .await
                    .unwrap_or_else(|err| exit_with(err));
                println!("updated birth date for account: {}", args.id);
            }
        },
        Command::Order(Order { command }) => match command {
            OrderCommand::Place(args) => {
                let request = read_request(&args.request)?;
                let order = checkout::to_checkout(request, args.redeem);
                let result = engine
                    .price_and_record_order(order, args.account.as_deref(), Utc::now())
                    .await
                    .unwrap_or_else(|err| exit_with(err));
                print_json(&checkout::to_response(&result))?;
            }
            OrderCommand::Show(args) => {
                let order = engine
                    .order(args.id)
                    .await
                    .unwrap_or_else(|err| exit_with(err));
                print_json(&checkout::to_order_view(&order))?;
            }
            OrderCommand::History(args) => {
                let orders = engine
                    .orders_for_account(&args.account, args.limit)
                    .await
                    .unwrap_or_else(|err| exit_with(err));
                let views: Vec<_> = orders.iter().map(checkout::to_order_view).collect();
                print_json(&views)?;
            }
            OrderCommand::Export(args) => {
                let orders = engine
                    .orders_for_account(&args.account, args.limit)
                    .await
                    .unwrap_or_else(|err| exit_with(err));
                match args.output {
                    Some(path) => export::write_orders(std::fs::File::create(path)?, &orders)?,
                    None => export::write_orders(std::io::stdout().lock(), &orders)?,
                }
            }
        },
    }

    Ok(())
}
