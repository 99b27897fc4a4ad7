use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use tracing::info;

use kitchen_roster::display::{
    parse_week_start, print_schedule, print_verification, write_schedules_to_file,
};
use kitchen_roster::schedule::{
    try_generate, verify_schedule, DayIndex, GenerationRequest, DEFAULT_TOP_N,
};
use kitchen_roster::web::{self, MIN_MEMBERS_FOR_GENERATION};
use kitchen_roster::{logging, Member, MemberRegistry, SkillTier};

#[derive(Parser)]
#[command(name = "kitchen-roster", version, about = "Weekly kitchen shift schedule generator")]
struct Cli {
    /// Member registry CSV file
    #[arg(long, env = "KITCHEN_MEMBERS", default_value = "members.csv", global = true)]
    members: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate ranked weekly schedules for the registered members
    Generate(GenerateArgs),
    /// Manage the member registry
    Members {
        #[command(subcommand)]
        action: MemberAction,
    },
    /// Start the web front end
    Web {
        #[arg(long, default_value_t = 8080)]
        port: u16,
        #[arg(long, env = "ADMIN_PASSWORD", default_value = "admin123", hide_env_values = true)]
        password: String,
    },
}

#[derive(clap::Args)]
struct GenerateArgs {
    /// Days off for one member as NAME=DAYS, e.g. "Jisoo=mon,thu" (repeatable)
    #[arg(long = "off", value_parser = parse_off_days)]
    off: Vec<(String, Vec<DayIndex>)>,

    /// Weekday public holidays, e.g. "wed" or "2"
    #[arg(long, value_delimiter = ',', value_parser = parse_day)]
    holidays: Vec<DayIndex>,

    /// Days the external dishwasher is absent
    #[arg(long, value_delimiter = ',', value_parser = parse_day)]
    no_dishwasher: Vec<DayIndex>,

    #[arg(long, default_value_t = DEFAULT_TOP_N)]
    top_n: usize,

    /// Monday of the scheduled week, used to print dates (YYYY-MM-DD)
    #[arg(long, value_parser = parse_week_start)]
    week_start: Option<NaiveDate>,

    /// Also write the schedules to this text file
    #[arg(long)]
    output: Option<String>,

    /// Print the result as JSON instead of tables
    #[arg(long)]
    json: bool,
}

#[derive(Subcommand)]
enum MemberAction {
    /// List registered members
    List,
    /// Register a new member
    Add {
        name: String,
        #[arg(long, value_parser = parse_tier)]
        tier: SkillTier,
        #[arg(long)]
        dishwash: bool,
    },
    /// Remove a member
    Remove { name: String },
}

fn parse_day(value: &str) -> Result<DayIndex, String> {
    value.parse().map_err(|e: kitchen_roster::ScheduleError| e.to_string())
}

fn parse_tier(value: &str) -> Result<SkillTier, String> {
    value.parse().map_err(|e: kitchen_roster::RegistryError| e.to_string())
}

fn parse_off_days(value: &str) -> Result<(String, Vec<DayIndex>), String> {
    let (name, days) = value
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=DAYS, got '{}'", value))?;
    let days = days
        .split(',')
        .filter(|d| !d.trim().is_empty())
        .map(parse_day)
        .collect::<Result<Vec<_>, _>>()?;
    Ok((name.trim().to_string(), days))
}

fn run_generate(registry: &MemberRegistry, args: GenerateArgs) -> Result<(), Box<dyn std::error::Error>> {
    if registry.members().len() < MIN_MEMBERS_FOR_GENERATION {
        return Err(format!(
            "at least {} members are needed to generate a schedule ({} registered)",
            MIN_MEMBERS_FOR_GENERATION,
            registry.members().len()
        )
        .into());
    }

    let mut request = GenerationRequest::new(registry.members().to_vec())
        .with_public_holidays(args.holidays)
        .with_no_dishwasher_days(args.no_dishwasher)
        .with_top_n(args.top_n);
    for (name, days) in args.off {
        request = request.with_off_days(name, days);
    }

    info!(members = request.members.len(), "searching for schedules that meet every target shift count");
    let generated = try_generate(&request)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&generated.schedules)?);
    } else {
        println!("{}", generated.message());
        for (i, ranked) in generated.schedules.iter().enumerate() {
            print_schedule(i + 1, ranked, args.week_start);
            print_verification(&verify_schedule(&request, &ranked.schedule));
        }
    }

    if let Some(path) = args.output {
        write_schedules_to_file(&generated.schedules, args.week_start, &path)?;
        println!("\nSchedules saved to {}", path);
    }

    Ok(())
}

fn run_members(registry: &mut MemberRegistry, action: MemberAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        MemberAction::List => {
            if registry.members().is_empty() {
                println!("No members registered in {}.", registry.path().display());
            }
            for m in registry.members() {
                println!(
                    "{:<16} {:<9} dishwash: {}  score: {}",
                    m.name,
                    m.top_tier,
                    if m.can_dishwash { "O" } else { "X" },
                    m.score()
                );
            }
        }
        MemberAction::Add { name, tier, dishwash } => {
            registry.add_and_save(Member::new(name.clone(), tier, dishwash))?;
            println!("Added '{}' ({}).", name, tier);
        }
        MemberAction::Remove { name } => {
            registry.remove_and_save(&name)?;
            println!("Removed '{}'.", name);
        }
    }
    Ok(())
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let mut registry = MemberRegistry::open(&cli.members)?;

    match cli.command {
        Command::Generate(args) => run_generate(&registry, args)?,
        Command::Members { action } => run_members(&mut registry, action)?,
        Command::Web { port, password } => {
            info!(port, "starting web server at http://localhost:{}", port);
            web::start_server(port, password, registry).await?;
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    logging::init();
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
