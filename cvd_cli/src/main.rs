use clap::{Args, Parser, Subcommand, ValueEnum};
use cvd_core::*;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "cvdrisk")]
#[command(about = "Cardiovascular risk scoring (Framingham and SCORE2)", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Override the SCORE2 coefficient file
    #[arg(long, global = true)]
    coefficients: Option<PathBuf>,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Args)]
struct ProfileArgs {
    /// Age in years
    #[arg(long)]
    age: Option<i32>,

    /// Sex (male, female)
    #[arg(long)]
    sex: Sex,

    /// Systolic blood pressure (mmHg)
    #[arg(long)]
    sbp: Option<i32>,

    /// Total cholesterol
    #[arg(long)]
    total_chol: Option<f64>,

    /// HDL cholesterol
    #[arg(long)]
    hdl: Option<f64>,

    /// Current smoker
    #[arg(long)]
    smoker: bool,

    /// Unit of the cholesterol values
    #[arg(long, value_enum, default_value_t = UnitArg::Mmol)]
    unit: UnitArg,
}

#[derive(Clone, Copy, ValueEnum)]
enum UnitArg {
    Mmol,
    Mgdl,
}

#[derive(Subcommand)]
enum Commands {
    /// Framingham point score
    Framingham {
        #[command(flatten)]
        profile: ProfileArgs,

        /// Blood pressure is treated
        #[arg(long)]
        treated: bool,
    },

    /// SCORE2 10-year risk
    Score2 {
        #[command(flatten)]
        profile: ProfileArgs,

        /// Calibration region (low, moderate, high, very_high)
        #[arg(long)]
        region: Option<String>,
    },

    /// List calibration regions available for a sex
    Calibrations {
        #[arg(long)]
        sex: Sex,
    },

    /// Run the Low / Moderate / High calibration examples
    Examples,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load()?;
    cvd_core::logging::init_with_level(&config.logging.level);

    if let Some(path) = cli.coefficients {
        tracing::debug!("Coefficient file overridden: {:?}", path);
        config.coefficients.path = path;
    }
    let engine = RiskEngine::from_config(&config);

    match cli.command {
        Commands::Framingham { profile, treated } => {
            let mut raw = to_raw(profile);
            raw.bp_treated = treated;
            let result = check(engine.calculate(Method::Framingham, &raw));
            print_result(&result, cli.json)
        }
        Commands::Score2 { profile, region } => {
            let mut raw = to_raw(profile);
            raw.region = region;
            let result = check(engine.calculate(Method::Score2, &raw));
            print_result(&result, cli.json)
        }
        Commands::Calibrations { sex } => cmd_calibrations(&engine, sex),
        Commands::Examples => cmd_examples(&engine, cli.json),
    }
}

fn to_raw(args: ProfileArgs) -> RawProfile {
    RawProfile {
        age: args.age,
        sex: args.sex,
        systolic_bp: args.sbp,
        total_cholesterol: args.total_chol,
        hdl_cholesterol: args.hdl,
        smoker: args.smoker,
        bp_treated: false,
        region: None,
        cholesterol_unit: match args.unit {
            UnitArg::Mmol => CholesterolUnit::MmolPerL,
            UnitArg::Mgdl => CholesterolUnit::MgPerDl,
        },
    }
}

/// Report a validation failure once and exit non-zero
fn check(outcome: std::result::Result<CalculationResult, ValidationFailure>) -> CalculationResult {
    outcome.unwrap_or_else(|failure| {
        eprintln!("Validation failed [{}]: {}", failure.code(), failure);
        std::process::exit(1);
    })
}

fn print_result(result: &CalculationResult, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(result)?);
        return Ok(());
    }

    match &result.breakdown {
        Breakdown::Framingham {
            points,
            ten_year_risk,
        } => {
            print_header("FRAMINGHAM");
            println!("  Points: {}", points.total());
            println!("  10-year risk: {}", ten_year_risk);
            println!(
                "  Age {} | Total chol {} | HDL {} | SBP {} | Smoking {}",
                points.age, points.total_cholesterol, points.hdl, points.systolic_bp, points.smoking
            );
        }
        Breakdown::Score2(details) => {
            print_header("SCORE2");
            if let Score::Percent(risk) = result.score {
                println!("  Risk: {:.1}%", risk);
            }
            println!("  Region: {}", details.region);
            println!("  LP: {:.4}", details.linear_predictor);
            println!("  {}", contribution_summary(details));
            let p = &details.points;
            println!(
                "  Points: age {} | non-HDL {} | SBP {} | smoking {} (total {})",
                p.age,
                p.non_hdl,
                p.systolic_bp,
                p.smoking,
                p.total()
            );
            if details.is_fallback {
                println!("  ⚠ Approximate: banded fallback replaced the calibrated risk");
            }
        }
    }

    println!("  Category: {}", result.category);
    println!("  Advice: {}", result.advice.key());
    println!();
    Ok(())
}

fn print_header(title: &str) {
    println!("\n╭─────────────────────────────────────────╮");
    println!("│  {} RISK", title);
    println!("╰─────────────────────────────────────────╯");
    println!();
}

fn contribution_summary(details: &Score2Details) -> String {
    let c = &details.contributions;
    format!(
        "Contributions: age={:.3}; non-HDL={:.3}; SBP={:.3}; smoking={:.3}",
        c.age, c.non_hdl, c.systolic_bp, c.smoking
    )
}

fn cmd_calibrations(engine: &RiskEngine, sex: Sex) -> Result<()> {
    let repository = engine.repository();
    let regions: Vec<String> = repository
        .available_regions(sex)
        .iter()
        .map(Region::to_string)
        .collect();

    println!("{}: {}", sex, regions.join(", "));
    println!("Data: {}", repository.data_version());
    Ok(())
}

fn cmd_examples(engine: &RiskEngine, json: bool) -> Result<()> {
    for example in engine.calibration_examples() {
        let p = &example.profile;
        println!("── {} ──", example.title);
        println!(
            "  Sex: {} | Age: {} | SBP: {} | Total chol: {:.2} | HDL: {:.2} | Smoking: {}",
            p.sex,
            p.age.map_or("-".into(), |v| v.to_string()),
            p.systolic_bp.map_or("-".into(), |v| v.to_string()),
            p.total_cholesterol.unwrap_or(f64::NAN),
            p.hdl_cholesterol.unwrap_or(f64::NAN),
            if p.smoker { "yes" } else { "no" }
        );

        match &example.outcome {
            Ok(result) if json => println!("{}", serde_json::to_string_pretty(result)?),
            Ok(result) => {
                if let (Score::Percent(risk), Breakdown::Score2(details)) =
                    (result.score, &result.breakdown)
                {
                    println!("  Risk: {:.1}% ({})", risk, result.category);
                    println!("  {}", contribution_summary(details));
                }
            }
            Err(failure) => println!("  Invalid [{}]: {}", failure.code(), failure),
        }
        println!();
    }
    Ok(())
}
