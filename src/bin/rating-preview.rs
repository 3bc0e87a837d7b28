//! Rating preview CLI
//!
//! Computes the rating changes a match would produce before it is
//! submitted, using the same engine and precision as the server.
//!
//! Usage:
//!   cargo run --bin rating-preview -- --home-win 0.4 --draw 0.3 --away-win 0.3 --home-score 2 --away-score 1
//!   cargo run --bin rating-preview -- --home-win 0.4 --draw 0.3 --away-win 0.3 --home-score 2 --away-score 1 --json

use anyhow::Result;
use clap::Parser;
use touchline::config::RatingSettings;
use touchline::rating::{OddsRatingCalculator, RatingCalculator, SideRating};
use touchline::reconcile::validation::check_odds;
use touchline::types::Odds;

#[derive(Parser)]
#[command(name = "rating-preview")]
#[command(about = "Preview the rating changes of a match from its odds and final score")]
struct Cli {
    /// Probability of a home win
    #[arg(long)]
    home_win: f64,

    /// Probability of a draw
    #[arg(long)]
    draw: f64,

    /// Probability of an away win
    #[arg(long)]
    away_win: f64,

    /// Goals scored by the home side
    #[arg(long, default_value = "0")]
    home_score: u32,

    /// Goals scored by the away side
    #[arg(long, default_value = "0")]
    away_score: u32,

    /// Decimal places kept on the deltas
    #[arg(long, default_value = "4")]
    decimal_places: u32,

    /// Print the result as JSON
    #[arg(long)]
    json: bool,
}

fn print_side(label: &str, rating: &SideRating) {
    println!("  {}", label);
    println!("    Expected points: {:.4}", rating.expected_points);
    println!("    Actual points:   {}", rating.actual_points);
    println!("    Rating change:   {:+}", rating.rating_change);
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let settings = RatingSettings {
        decimal_places: cli.decimal_places,
        ..RatingSettings::default()
    };
    settings.validate()?;

    let odds = Odds {
        home_win: cli.home_win,
        draw: cli.draw,
        away_win: cli.away_win,
    };
    if let Err(e) = check_odds(&odds, &settings) {
        eprintln!("❌ {}", e);
        std::process::exit(2);
    }

    let calculator = OddsRatingCalculator::from_settings(&settings);
    let outcome = calculator.rate_match(&odds, cli.home_score, cli.away_score);

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
        return Ok(());
    }

    println!(
        "📊 Rating preview for {} - {} (odds {:.2} / {:.2} / {:.2})",
        cli.home_score, cli.away_score, odds.home_win, odds.draw, odds.away_win
    );
    print_side("Home", &outcome.home);
    print_side("Away", &outcome.away);

    Ok(())
}
