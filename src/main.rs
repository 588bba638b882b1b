use bookflow::application::payments::PaymentService;
use bookflow::application::reservations::ReservationService;
use bookflow::application::webhooks::WebhookProcessor;
use bookflow::domain::ports::{
    ConfirmationNotifierBox, PaymentGatewayBox, ReservationStoreBox, RoomCatalogBox,
};
use bookflow::domain::room::RoomType;
use bookflow::error::BookingError;
use bookflow::infrastructure::in_memory::{InMemoryReservationStore, InMemoryRoomCatalog};
use bookflow::infrastructure::notify::TracingNotifier;
use bookflow::infrastructure::sandbox::SandboxGateway;
use bookflow::infrastructure::stripe::{StripeConfig, StripeGateway};
use bookflow::interfaces::jsonl::command_reader::{Command, CommandReader};
use bookflow::interfaces::jsonl::report_writer::{Outcome, ReportWriter};
use bookflow::interfaces::stripe::signature::WebhookVerifier;
use clap::Parser;
use miette::{IntoDiagnostic, Result};
use std::fs::File;
use std::io;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Input commands file, one JSON command per line
    input: PathBuf,

    /// Room catalog JSON file (array of room types)
    #[arg(long)]
    rooms: PathBuf,

    /// Path to persistent database (optional). If provided, uses RocksDB.
    #[arg(long)]
    db_path: Option<PathBuf>,

    /// Shared secret for webhook signature verification
    #[arg(long, default_value = "whsec_dev")]
    webhook_secret: String,

    /// Processor secret key; falls back to STRIPE_SECRET_KEY, and without
    /// either the offline sandbox gateway is wired
    #[arg(long)]
    stripe_key: Option<String>,
}

struct Services {
    reservations: ReservationService,
    payments: PaymentService,
    webhooks: WebhookProcessor,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    let catalog_file = File::open(&cli.rooms).into_diagnostic()?;
    let rooms: Vec<RoomType> = serde_json::from_reader(catalog_file).into_diagnostic()?;
    let catalog = InMemoryRoomCatalog::new(rooms);

    let stripe_key = cli
        .stripe_key
        .clone()
        .or_else(|| std::env::var("STRIPE_SECRET_KEY").ok());
    let gateway: PaymentGatewayBox = match stripe_key {
        Some(key) => Box::new(StripeGateway::new(StripeConfig::new(key)).into_diagnostic()?),
        None => Box::new(SandboxGateway::new()),
    };
    let notifier: ConfirmationNotifierBox = Box::new(TracingNotifier::new());
    let verifier = WebhookVerifier::new(cli.webhook_secret.clone());

    let services = match &cli.db_path {
        Some(db_path) => {
            #[cfg(feature = "storage-rocksdb")]
            {
                use bookflow::infrastructure::rocksdb::RocksDbReservationStore;
                let store = RocksDbReservationStore::open(db_path).into_diagnostic()?;
                build_services(store, catalog, gateway, notifier, verifier)
            }
            #[cfg(not(feature = "storage-rocksdb"))]
            {
                let _ = db_path;
                eprintln!(
                    "WARNING: Persistent storage requested via --db-path, but 'storage-rocksdb' feature is not enabled. Falling back to In-Memory storage."
                );
                build_services(
                    InMemoryReservationStore::new(),
                    catalog,
                    gateway,
                    notifier,
                    verifier,
                )
            }
        }
        None => build_services(
            InMemoryReservationStore::new(),
            catalog,
            gateway,
            notifier,
            verifier,
        ),
    };

    let input = File::open(&cli.input).into_diagnostic()?;
    let reader = CommandReader::new(input);

    let stdout = io::stdout();
    let mut writer = ReportWriter::new(stdout.lock());
    for command in reader.commands() {
        let outcome = match command {
            Ok(command) => execute(&services, command).await,
            Err(e) => Outcome::failure("parse", &e),
        };
        writer.write(&outcome).into_diagnostic()?;
    }
    writer.flush().into_diagnostic()?;

    Ok(())
}

fn build_services<S>(
    store: S,
    catalog: InMemoryRoomCatalog,
    gateway: PaymentGatewayBox,
    notifier: ConfirmationNotifierBox,
    verifier: WebhookVerifier,
) -> Services
where
    S: bookflow::domain::ports::ReservationStore + Clone + 'static,
{
    // One underlying store behind three boxed ports
    let reservation_store: ReservationStoreBox = Box::new(store.clone());
    let payment_store: ReservationStoreBox = Box::new(store.clone());
    let webhook_store: ReservationStoreBox = Box::new(store);
    let catalog: RoomCatalogBox = Box::new(catalog);

    Services {
        reservations: ReservationService::new(reservation_store, catalog),
        payments: PaymentService::new(payment_store, gateway),
        webhooks: WebhookProcessor::new(verifier, webhook_store, notifier),
    }
}

async fn execute(services: &Services, command: Command) -> Outcome {
    let op = command.op();
    let result = match command {
        Command::Create { principal, request } => services
            .reservations
            .create(&principal, request)
            .await
            .and_then(to_value),
        Command::Update {
            principal,
            id,
            request,
        } => services
            .reservations
            .update(&principal, id, request)
            .await
            .and_then(to_value),
        Command::Cancel { principal, id } => services
            .reservations
            .cancel(&principal, id)
            .await
            .and_then(to_value),
        Command::Delete { principal, id } => services
            .reservations
            .delete(&principal, id)
            .await
            .map(|()| serde_json::json!({ "deleted": id })),
        Command::Get { principal, id } => services
            .reservations
            .get(&principal, id)
            .await
            .and_then(to_value),
        Command::List { principal } => services
            .reservations
            .list(&principal)
            .await
            .and_then(to_value),
        Command::Intent { id } => services.payments.create_intent(id).await.and_then(to_value),
        Command::Webhook { body, signature } => services
            .webhooks
            .process(body.as_bytes(), &signature)
            .await
            .and_then(to_value),
    };

    match result {
        Ok(value) => Outcome::success(op, value),
        Err(e) => Outcome::failure(op, &e),
    }
}

fn to_value<T: serde::Serialize>(value: T) -> bookflow::error::Result<serde_json::Value> {
    serde_json::to_value(value)
        .map_err(|e| BookingError::Internal(format!("failed to encode result: {e}")))
}
