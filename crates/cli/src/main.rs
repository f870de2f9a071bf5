//! The `medledger` command-line client.
//!
//! One subcommand per interactive surface: registration, dashboards, the
//! doctor directory, the approver inbox, document delivery and status
//! watching. Role-scoped commands are gated through the static view table in
//! `medledger_core::nav`.
//!
//! Configuration is resolved from the environment once at startup:
//! - `MEDLEDGER_GATEWAY_ADDR`: ledger gateway endpoint (default `http://localhost:50051`)
//! - `MEDLEDGER_DEPLOYMENTS`: `network=address` pairs, comma separated
//! - `MEDLEDGER_ACCOUNT`: the signing provider's account (absent = no wallet)
//! - `MEDLEDGER_ROLE`: default acting role (`patient` or `doctor`)
//! - `MEDLEDGER_POLL_SECS`: watch interval in seconds (default 10)

use clap::{Parser, Subcommand};
use ledger_grpc::{GrpcContentStore, GrpcLedger};
use medledger_content::OutboundDocument;
use medledger_core::{
    is_allowed, parse_deployments, CallError, ClientConfig, Decision, DeliveryFailure,
    DeliveryReceipt, DocumentDelivery, DocumentKind, DoctorProfile, LedgerError, PatientProfile,
    Registry, RequestLifecycleClient, StatusPoller, StatusSweep, View, Wallet, WalletProvider,
    WalletSession, DEFAULT_POLL_INTERVAL,
};
use medledger_types::{Address, Role};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "medledger")]
#[command(about = "MedLedger patient/doctor medical-records client")]
struct Cli {
    /// Acting role (patient or doctor); defaults to MEDLEDGER_ROLE
    #[arg(long, global = true)]
    role: Option<Role>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Register the connected account as a patient
    RegisterPatient {
        #[arg(long)]
        first_name: String,
        #[arg(long)]
        last_name: String,
        #[arg(long, default_value = "")]
        date_of_birth: String,
        #[arg(long, default_value = "")]
        email: String,
        #[arg(long, default_value = "")]
        gender: String,
        #[arg(long, default_value = "")]
        home_address: String,
        #[arg(long, default_value = "")]
        phone_number: String,
        #[arg(long, default_value = "")]
        blood_group: String,
        #[arg(long, default_value = "")]
        insurance_provider: String,
        #[arg(long, default_value = "")]
        policy_number: String,
    },
    /// Register the connected account as a doctor
    RegisterDoctor {
        #[arg(long)]
        first_name: String,
        #[arg(long)]
        last_name: String,
        #[arg(long, default_value = "")]
        specialization: String,
        #[arg(long, default_value = "")]
        email: String,
        #[arg(long, default_value = "")]
        phone_number: String,
        #[arg(long, default_value = "")]
        license_number: String,
        #[arg(long, default_value = "")]
        experience_years: String,
        #[arg(long, default_value = "")]
        clinic_address: String,
        #[arg(long, default_value = "")]
        date_of_birth: String,
    },
    /// Show the connected account's own profile
    Dashboard,
    /// List registered doctors with consultation status
    Doctors,
    /// List pending consultation requests
    Requests,
    /// Send a consultation request to a doctor
    Request { doctor: Address },
    /// Accept a pending consultation request
    Approve { patient: Address },
    /// Reject a pending consultation request
    Reject { patient: Address },
    /// Upload report files and record them for an approved doctor
    SendReports {
        doctor: Address,
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Upload prescription files and record them for an approved patient
    SendPrescriptions {
        patient: Address,
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Poll consultation statuses until interrupted
    Watch,
}

/// Signing provider backed by the configured account.
///
/// Stands in for a browser wallet: the gateway owns actual signing, the
/// client only needs the authenticated party handle.
struct EnvProvider {
    account: Address,
}

impl WalletProvider for EnvProvider {
    async fn request_accounts(&self) -> Result<Vec<Address>, CallError> {
        Ok(vec![self.account])
    }
}

/// Configuration resolved from the environment once at startup.
struct Settings {
    config: ClientConfig,
    account: Option<Address>,
    role: Option<Role>,
}

impl Settings {
    fn from_env() -> Result<Self, LedgerError> {
        let gateway = std::env::var("MEDLEDGER_GATEWAY_ADDR")
            .unwrap_or_else(|_| "http://localhost:50051".into());

        let deployments = match std::env::var("MEDLEDGER_DEPLOYMENTS") {
            Ok(value) => parse_deployments(&value)?,
            Err(_) => Default::default(),
        };

        let poll_interval = match std::env::var("MEDLEDGER_POLL_SECS") {
            Ok(value) => Duration::from_secs(value.trim().parse().map_err(|_| {
                LedgerError::InvalidInput(format!("MEDLEDGER_POLL_SECS '{value}' is not a number"))
            })?),
            Err(_) => DEFAULT_POLL_INTERVAL,
        };

        let account = match std::env::var("MEDLEDGER_ACCOUNT") {
            Ok(value) => Some(
                Address::parse(&value)
                    .map_err(|e| LedgerError::InvalidInput(format!("MEDLEDGER_ACCOUNT: {e}")))?,
            ),
            Err(_) => None,
        };

        let role = match std::env::var("MEDLEDGER_ROLE") {
            Ok(value) => Some(
                value
                    .parse::<Role>()
                    .map_err(|e| LedgerError::InvalidInput(format!("MEDLEDGER_ROLE: {e}")))?,
            ),
            Err(_) => None,
        };

        Ok(Self {
            config: ClientConfig::new(gateway, deployments, poll_interval)?,
            account,
            role,
        })
    }
}

/// A connected gateway plus the authenticated session.
struct Context {
    ledger: Arc<GrpcLedger>,
    store: Arc<GrpcContentStore>,
    session: WalletSession,
}

async fn connect_context(settings: &Settings) -> Result<Context, LedgerError> {
    let (ledger, store) = ledger_grpc::connect(&settings.config).await?;

    let mut wallet = Wallet::new(settings.account.map(|account| EnvProvider { account }));
    let session = wallet.connect().await?;

    Ok(Context {
        ledger: Arc::new(ledger),
        store: Arc::new(store),
        session,
    })
}

fn require_role(cli_role: Option<Role>, settings: &Settings) -> Result<Role, LedgerError> {
    cli_role.or(settings.role).ok_or_else(|| {
        LedgerError::InvalidInput("no role selected (use --role or MEDLEDGER_ROLE)".into())
    })
}

fn ensure_allowed(role: Role, view: View) -> Result<(), LedgerError> {
    if !is_allowed(role, view) {
        return Err(LedgerError::InvalidInput(format!(
            "the {role} role cannot use this command"
        )));
    }
    Ok(())
}

/// Surfaces what a partially failed delivery did land before propagating the
/// failure; documents before the failed one stay delivered by design.
fn report_delivery(
    result: Result<Vec<DeliveryReceipt>, DeliveryFailure>,
) -> Result<Vec<DeliveryReceipt>, DeliveryFailure> {
    if let Err(failure) = &result {
        for receipt in &failure.delivered {
            println!("Sent '{}' as {}.", receipt.filename, receipt.handle);
        }
    }
    result
}

fn stage_documents(files: &[PathBuf]) -> Result<Vec<OutboundDocument>, LedgerError> {
    files
        .iter()
        .map(|path| OutboundDocument::from_path(path).map_err(LedgerError::UploadFailed))
        .collect()
}

fn print_patient(profile: &PatientProfile) {
    println!("Name:           {} {}", profile.first_name, profile.last_name);
    println!("Date of birth:  {}", profile.date_of_birth);
    println!("Email:          {}", profile.email);
    println!("Gender:         {}", profile.gender);
    println!("Address:        {}", profile.home_address);
    println!("Phone:          {}", profile.phone_number);
    println!("Blood group:    {}", profile.blood_group);
    println!("Insurance:      {}", profile.insurance_provider);
    println!("Policy number:  {}", profile.policy_number);
}

fn print_doctor(profile: &DoctorProfile) {
    println!(
        "Name:           Dr. {} {}",
        profile.first_name, profile.last_name
    );
    println!("Specialization: {}", profile.specialization);
    println!("Email:          {}", profile.email);
    println!("Phone:          {}", profile.phone_number);
    println!("License no:     {}", profile.license_number);
    println!("Experience:     {} years", profile.experience_years);
    println!("Clinic:         {}", profile.clinic_address);
}

fn print_sweep(sweep: &StatusSweep) {
    if sweep.statuses.is_empty() {
        println!("(no counterparties)");
        return;
    }
    for (party, status) in &sweep.statuses {
        println!("{party}  {status}");
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("medledger_core=info".parse().expect("static directive"))
                .add_directive("ledger_grpc=info".parse().expect("static directive")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("error: {error}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let settings = Settings::from_env()?;

    match cli.command {
        Commands::RegisterPatient {
            first_name,
            last_name,
            date_of_birth,
            email,
            gender,
            home_address,
            phone_number,
            blood_group,
            insurance_provider,
            policy_number,
        } => {
            let ctx = connect_context(&settings).await?;
            let profile = PatientProfile {
                first_name,
                last_name,
                date_of_birth,
                email,
                gender,
                home_address,
                phone_number,
                blood_group,
                insurance_provider,
                policy_number,
            };
            let registry = Registry::new(Arc::clone(&ctx.ledger));
            registry
                .register_patient(ctx.session.party(), &profile)
                .await?;
            println!("Registered patient profile for {}.", ctx.session.party());
        }

        Commands::RegisterDoctor {
            first_name,
            last_name,
            specialization,
            email,
            phone_number,
            license_number,
            experience_years,
            clinic_address,
            date_of_birth,
        } => {
            let ctx = connect_context(&settings).await?;
            let profile = DoctorProfile {
                first_name,
                last_name,
                specialization,
                email,
                phone_number,
                license_number,
                experience_years,
                clinic_address,
                date_of_birth,
            };
            let registry = Registry::new(Arc::clone(&ctx.ledger));
            registry
                .register_doctor(ctx.session.party(), &profile)
                .await?;
            println!("Registered doctor profile for {}.", ctx.session.party());
        }

        Commands::Dashboard => {
            let role = require_role(cli.role, &settings)?;
            ensure_allowed(role, View::Dashboard)?;
            let ctx = connect_context(&settings).await?;
            let registry = Registry::new(Arc::clone(&ctx.ledger));
            match role {
                Role::Patient => {
                    let profile = registry.patient_dashboard(ctx.session.party()).await?;
                    print_patient(&profile);
                }
                Role::Doctor => {
                    let profile = registry.doctor_dashboard(ctx.session.party()).await?;
                    print_doctor(&profile);
                }
            }
        }

        Commands::Doctors => {
            let role = require_role(cli.role, &settings)?;
            ensure_allowed(role, View::DoctorDirectory)?;
            let ctx = connect_context(&settings).await?;
            let registry = Registry::new(Arc::clone(&ctx.ledger));
            let listings = registry.doctor_directory(ctx.session.party()).await?;

            if listings.is_empty() {
                println!("No doctors available.");
            }
            for listing in listings {
                let status = if listing.status.is_pending() {
                    "applied (waiting for doctor)"
                } else {
                    "available"
                };
                println!(
                    "Dr. {} {} ({}) {} [{}]",
                    listing.profile.first_name,
                    listing.profile.last_name,
                    listing.profile.specialization,
                    listing.party,
                    status
                );
            }
        }

        Commands::Requests => {
            let role = require_role(cli.role, &settings)?;
            ensure_allowed(role, View::RequestInbox)?;
            let ctx = connect_context(&settings).await?;
            let registry = Registry::new(Arc::clone(&ctx.ledger));
            let inbox = registry.inbox(ctx.session.party()).await?;

            if inbox.is_empty() {
                println!("No pending requests.");
            }
            for entry in inbox.entries() {
                println!(
                    "{} {} ({})",
                    entry.profile.first_name, entry.profile.last_name, entry.party
                );
            }
        }

        Commands::Request { doctor } => {
            let role = require_role(cli.role, &settings)?;
            ensure_allowed(role, View::DoctorDirectory)?;
            let ctx = connect_context(&settings).await?;
            let lifecycle = RequestLifecycleClient::new(Arc::clone(&ctx.ledger), ctx.session);
            lifecycle.submit_request(doctor).await?;
            println!("Consultation request sent to {doctor}.");
        }

        Commands::Approve { patient } => {
            resolve_command(&settings, cli.role, patient, Decision::Accept).await?;
            println!("Request accepted.");
        }

        Commands::Reject { patient } => {
            resolve_command(&settings, cli.role, patient, Decision::Reject).await?;
            println!("Request rejected.");
        }

        Commands::SendReports { doctor, files } => {
            let role = require_role(cli.role, &settings)?;
            ensure_allowed(role, View::SendReports)?;
            let ctx = connect_context(&settings).await?;
            let registry = Registry::new(Arc::clone(&ctx.ledger));

            let approved = registry.approved_doctors(ctx.session.party()).await?;
            if !approved.iter().any(|(party, _)| *party == doctor) {
                return Err(LedgerError::InvalidInput(format!(
                    "doctor {doctor} has not approved a consultation"
                ))
                .into());
            }

            let documents = stage_documents(&files)?;
            let delivery =
                DocumentDelivery::new(Arc::clone(&ctx.ledger), ctx.store, ctx.session);
            let receipts =
                report_delivery(delivery.deliver(DocumentKind::Report, doctor, &documents).await)?;
            for receipt in &receipts {
                println!("Sent '{}' as {}.", receipt.filename, receipt.handle);
            }
            println!("All reports sent successfully.");
        }

        Commands::SendPrescriptions { patient, files } => {
            let role = require_role(cli.role, &settings)?;
            ensure_allowed(role, View::SendPrescriptions)?;
            let ctx = connect_context(&settings).await?;
            let registry = Registry::new(Arc::clone(&ctx.ledger));

            let approved = registry.approved_patients(ctx.session.party()).await?;
            if !approved.iter().any(|(party, _)| *party == patient) {
                return Err(LedgerError::InvalidInput(format!(
                    "patient {patient} is not an approved consultation partner"
                ))
                .into());
            }

            let documents = stage_documents(&files)?;
            let delivery =
                DocumentDelivery::new(Arc::clone(&ctx.ledger), ctx.store, ctx.session);
            let receipts = report_delivery(
                delivery
                    .deliver(DocumentKind::Prescription, patient, &documents)
                    .await,
            )?;
            for receipt in &receipts {
                println!("Sent '{}' as {}.", receipt.filename, receipt.handle);
            }
            println!("All prescriptions sent successfully.");
        }

        Commands::Watch => {
            let role = require_role(cli.role, &settings)?;
            let ctx = connect_context(&settings).await?;
            let registry = Registry::new(Arc::clone(&ctx.ledger));
            let party = ctx.session.party();
            let interval = settings.config.poll_interval();

            let (poller, rx) = match role {
                Role::Patient => {
                    let registry = registry.clone();
                    StatusPoller::spawn(interval, move || {
                        let registry = registry.clone();
                        async move { registry.requester_sweep(party).await }
                    })
                }
                Role::Doctor => {
                    let registry = registry.clone();
                    StatusPoller::spawn(interval, move || {
                        let registry = registry.clone();
                        async move { registry.approver_sweep(party).await }
                    })
                }
            };

            println!("Watching consultation status as {role} (Ctrl-C to stop)…");
            watch_loop(rx).await;
            poller.stop();
        }
    }

    Ok(())
}

async fn resolve_command(
    settings: &Settings,
    cli_role: Option<Role>,
    patient: Address,
    decision: Decision,
) -> Result<(), Box<dyn std::error::Error>> {
    let role = require_role(cli_role, settings)?;
    ensure_allowed(role, View::RequestInbox)?;
    let ctx = connect_context(settings).await?;
    let registry = Registry::new(Arc::clone(&ctx.ledger));
    let lifecycle = RequestLifecycleClient::new(Arc::clone(&ctx.ledger), ctx.session);

    let mut inbox = registry.inbox(ctx.session.party()).await?;
    inbox.resolve(&lifecycle, patient, decision).await?;
    Ok(())
}

async fn watch_loop(mut rx: watch::Receiver<Option<StatusSweep>>) {
    loop {
        tokio::select! {
            changed = rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = rx.borrow_and_update().clone();
                if let Some(sweep) = snapshot {
                    print_sweep(&sweep);
                    println!("---");
                }
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }
}
