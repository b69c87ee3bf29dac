use crate::config;
use crate::controller::{InitPhase, PredictionController, SubmitPhase};
use crate::form::{FUEL_TYPES, Field, FormState, TRANSMISSIONS};
use crate::gateway::PriceService;
use crate::http::{HttpClient, ReqwestClient};
use crate::render;
use anyhow::{Result, bail};
use clap::builder::PossibleValuesParser;
use clap::{Args, Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader};

#[derive(Parser)]
#[clap(name = "carprice")]
#[clap(about = "Used car price prediction client")]
#[clap(version)]
pub struct Cli {
    /// Overrides BACKEND_BASE_URL and the config file.
    #[clap(long, global = true)]
    pub backend_url: Option<String>,

    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Health check and model metrics.
    Overview,
    /// Submit one vehicle for a price prediction.
    Predict(PredictArgs),
    /// Interactive session over stdin.
    Session,
}

#[derive(Args, Debug, Default)]
pub struct PredictArgs {
    #[clap(long, allow_hyphen_values = true)]
    pub year: Option<String>,
    /// Kilometers.
    #[clap(long, allow_hyphen_values = true)]
    pub mileage: Option<String>,
    #[clap(long)]
    pub brand: Option<String>,
    #[clap(long)]
    pub model: Option<String>,
    #[clap(long, value_parser = PossibleValuesParser::new(FUEL_TYPES.iter().copied()))]
    pub fuel_type: Option<String>,
    #[clap(long, value_parser = PossibleValuesParser::new(TRANSMISSIONS.iter().copied()))]
    pub transmission: Option<String>,
    #[clap(long, allow_hyphen_values = true)]
    pub owner_count: Option<String>,
    /// Liters.
    #[clap(long, allow_hyphen_values = true)]
    pub engine_size: Option<String>,
    #[clap(long, allow_hyphen_values = true)]
    pub seats: Option<String>,
}

impl PredictArgs {
    pub fn to_form(&self) -> FormState {
        let entries = [
            (Field::Year, &self.year),
            (Field::Mileage, &self.mileage),
            (Field::Brand, &self.brand),
            (Field::Model, &self.model),
            (Field::FuelType, &self.fuel_type),
            (Field::Transmission, &self.transmission),
            (Field::OwnerCount, &self.owner_count),
            (Field::EngineSize, &self.engine_size),
            (Field::Seats, &self.seats),
        ];
        let mut form = FormState::new();
        for (field, value) in entries {
            if let Some(value) = value {
                form.set(field, value.clone());
            }
        }
        form
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SessionCommand {
    Set(Field, String),
    Show,
    Submit,
    Overview,
    Help,
    Quit,
    Empty,
}

pub fn parse_command(line: &str) -> std::result::Result<SessionCommand, String> {
    let line = line.trim();
    let (verb, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
    match verb.to_ascii_lowercase().as_str() {
        "" => Ok(SessionCommand::Empty),
        "set" => {
            let rest = rest.trim_start();
            let (field, value) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
            if field.is_empty() {
                return Err("usage: set <field> <value>".to_string());
            }
            Ok(SessionCommand::Set(field.parse()?, value.trim().to_string()))
        }
        "show" => Ok(SessionCommand::Show),
        "submit" | "predict" => Ok(SessionCommand::Submit),
        "overview" | "metrics" => Ok(SessionCommand::Overview),
        "help" | "?" => Ok(SessionCommand::Help),
        "quit" | "exit" => Ok(SessionCommand::Quit),
        other => Err(format!("unknown command: {}", other)),
    }
}

const SESSION_HELP: &str = "\
commands:
  set <field> <value>   fields: year mileage brand model fuel_type transmission
                                owner_count engine_size seats
  show                  current form and field errors
  submit                validate and request a prediction
  overview              model status and metrics
  quit";

fn service(backend_url: Option<String>) -> Result<PriceService> {
    match backend_url {
        Some(url) => {
            let timeout = config::request_timeout()?;
            Ok(PriceService::with_client(ReqwestClient::new(timeout), url))
        }
        None => Ok(PriceService::from_config()?),
    }
}

async fn run_overview(mut controller: PredictionController) -> Result<()> {
    let teardown = controller.teardown_handle();
    let interrupt = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            teardown.cancel();
        }
    });

    println!("Backend: {}", controller.service().base_url());
    let phase = controller.initialize().await;
    interrupt.abort();
    if phase == InitPhase::Idle {
        bail!("cancelled");
    }
    print!("{}", render::render_overview(controller.overview()));
    Ok(())
}

async fn run_predict(mut controller: PredictionController) -> Result<()> {
    match controller.submit().await {
        SubmitPhase::Invalid => {
            eprint!("{}", render::render_errors(controller.errors()));
            bail!("invalid input")
        }
        SubmitPhase::Succeeded => {
            if let Some(outcome) = controller.outcome() {
                println!("{}", render::render_outcome(outcome));
            }
            Ok(())
        }
        _ => match controller.outcome().and_then(|o| o.error()) {
            Some(err) => bail!(err.clone()),
            None => bail!("prediction failed"),
        },
    }
}

/// Line-oriented session that keeps one form for its whole lifetime.
pub async fn run_session<C: HttpClient>(controller: &mut PredictionController<C>) -> Result<()> {
    controller.initialize().await;
    print!("{}", render::render_overview(controller.overview()));
    println!("{}", SESSION_HELP);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match parse_command(&line) {
            Ok(SessionCommand::Set(field, value)) => controller.set_field(field, value),
            Ok(SessionCommand::Show) => {
                print!("{}", render::render_form(controller.form(), controller.errors()))
            }
            Ok(SessionCommand::Submit) => match controller.submit().await {
                SubmitPhase::Invalid => print!("{}", render::render_errors(controller.errors())),
                _ => {
                    if let Some(outcome) = controller.outcome() {
                        println!("{}", render::render_outcome(outcome));
                    }
                }
            },
            Ok(SessionCommand::Overview) => {
                print!("{}", render::render_overview(controller.overview()))
            }
            Ok(SessionCommand::Help) => println!("{}", SESSION_HELP),
            Ok(SessionCommand::Quit) => break,
            Ok(SessionCommand::Empty) => {}
            Err(message) => println!("{}", message),
        }
    }
    Ok(())
}

pub async fn run(cli: Cli) -> Result<()> {
    let service = service(cli.backend_url)?;
    match cli.command {
        Commands::Overview => run_overview(PredictionController::new(service)).await,
        Commands::Predict(args) => {
            run_predict(PredictionController::with_form(service, args.to_form())).await
        }
        Commands::Session => run_session(&mut PredictionController::new(service)).await,
    }
}
