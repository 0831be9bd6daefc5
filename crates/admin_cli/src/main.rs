use std::error::Error;

use api_types::Amount;
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use engine::{Engine, NewClient, NewProduct, Sex};
use migration::MigratorTrait;
use sea_orm::{Database, DatabaseConnection};
use uuid::Uuid;

#[derive(Parser, Debug)]
#[command(name = "previdencia_admin")]
#[command(about = "Back-office utilities for Previdência (products, clients, plans)")]
struct Cli {
    /// Database connection string (also read from `DATABASE_URL`).
    #[arg(
        long,
        env = "DATABASE_URL",
        default_value = "sqlite:./previdencia.db?mode=rwc"
    )]
    database_url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    Product(Product),
    Client(Client),
    Plan(Plan),
}

#[derive(Args, Debug)]
struct Product {
    #[command(subcommand)]
    command: ProductCommand,
}

#[derive(Subcommand, Debug)]
enum ProductCommand {
    Create(ProductArgs),
    /// Replace the fields of an existing product.
    Update(ProductUpdateArgs),
    List(SearchArgs),
}

#[derive(Args, Debug)]
struct ProductUpdateArgs {
    #[arg(long)]
    id: Uuid,
    #[command(flatten)]
    product: ProductArgs,
}

#[derive(Args, Debug)]
struct ProductArgs {
    #[arg(long)]
    name: String,
    #[arg(long)]
    susep: String,
    /// Last day of sale, `YYYY-MM-DD`.
    #[arg(long)]
    sale_expiration: NaiveDate,
    #[arg(long)]
    min_initial_contribution: Amount,
    #[arg(long)]
    min_extra_contribution: Amount,
    #[arg(long)]
    min_entry_age: i32,
    #[arg(long)]
    max_exit_age: i32,
    #[arg(long)]
    initial_withdrawal_cooldown_days: i32,
    #[arg(long)]
    between_withdrawals_cooldown_days: i32,
}

#[derive(Args, Debug)]
struct Client {
    #[command(subcommand)]
    command: ClientCommand,
}

#[derive(Subcommand, Debug)]
enum ClientCommand {
    Create(ClientCreateArgs),
    List(SearchArgs),
}

#[derive(Args, Debug)]
struct ClientCreateArgs {
    #[arg(long)]
    cpf: String,
    #[arg(long)]
    name: String,
    #[arg(long)]
    email: String,
    /// `YYYY-MM-DD`.
    #[arg(long)]
    birth_date: NaiveDate,
    /// `M` or `F`.
    #[arg(long, value_parser = parse_sex)]
    sex: Sex,
    #[arg(long)]
    monthly_income: Amount,
}

#[derive(Args, Debug)]
struct Plan {
    #[command(subcommand)]
    command: PlanCommand,
}

#[derive(Subcommand, Debug)]
enum PlanCommand {
    List,
}

#[derive(Args, Debug)]
struct SearchArgs {
    /// Case-insensitive substring filter.
    #[arg(long)]
    search: Option<String>,
}

fn parse_sex(raw: &str) -> Result<Sex, String> {
    Sex::try_from(raw.to_uppercase().as_str()).map_err(|err| err.to_string())
}

impl From<ProductArgs> for NewProduct {
    fn from(args: ProductArgs) -> Self {
        NewProduct {
            name: args.name,
            susep: args.susep,
            sale_expiration: args.sale_expiration,
            min_initial_contribution: args.min_initial_contribution.into(),
            min_extra_contribution: args.min_extra_contribution.into(),
            min_entry_age: args.min_entry_age,
            max_exit_age: args.max_exit_age,
            initial_withdrawal_cooldown_days: args.initial_withdrawal_cooldown_days,
            between_withdrawals_cooldown_days: args.between_withdrawals_cooldown_days,
        }
    }
}

async fn connect_db(
    database_url: &str,
) -> Result<DatabaseConnection, Box<dyn Error + Send + Sync>> {
    let db = Database::connect(database_url).await?;
    migration::Migrator::up(&db, None).await?;
    Ok(db)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    let cli = Cli::parse();

    let db = connect_db(&cli.database_url).await?;
    let engine = Engine::builder().database(db).build().await?;

    match cli.command {
        Command::Product(Product {
            command: ProductCommand::Create(args),
        }) => {
            let product = engine.new_product(args.into()).await?;
            println!("created product: {} ({})", product.name, product.id);
        }
        Command::Product(Product {
            command: ProductCommand::Update(args),
        }) => {
            let product = engine.update_product(args.id, args.product.into()).await?;
            println!("updated product: {} ({})", product.name, product.id);
        }
        Command::Product(Product {
            command: ProductCommand::List(args),
        }) => {
            for product in engine.products(args.search.as_deref()).await? {
                let last = product
                    .last_withdrawal_on
                    .map_or_else(|| "-".to_string(), |d| d.to_string());
                println!(
                    "{}\t{}\t{}\tvenda até {}\túltimo resgate {}",
                    product.id, product.name, product.susep, product.sale_expiration, last
                );
            }
        }
        Command::Client(Client {
            command: ClientCommand::Create(args),
        }) => {
            let client = engine
                .new_client(NewClient {
                    cpf: args.cpf,
                    name: args.name,
                    email: args.email,
                    birth_date: args.birth_date,
                    sex: args.sex,
                    monthly_income: args.monthly_income.into(),
                })
                .await?;
            println!("created client: {} ({})", client.name, client.id);
        }
        Command::Client(Client {
            command: ClientCommand::List(args),
        }) => {
            for client in engine.clients(args.search.as_deref()).await? {
                println!(
                    "{}\t{}\t{}\t{}",
                    client.id, client.cpf, client.name, client.email
                );
            }
        }
        Command::Plan(Plan {
            command: PlanCommand::List,
        }) => {
            for plan in engine.plans().await? {
                println!(
                    "{}\tcliente {}\tproduto {}\tsaldo {}\tcontratado em {}",
                    plan.id, plan.client_id, plan.product_id, plan.balance, plan.contracted_on
                );
            }
        }
    }

    Ok(())
}
