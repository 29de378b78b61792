//! # Wagerbook CLI
//!
//! Command-line driver for the wagerbook prediction-market ledger. The
//! book's durable state and the in-process treasury are persisted as a
//! JSON snapshot between invocations.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use wagerbook_core::{
    format_bps, format_timestamp, BookState, CashTreasury, MarketBook, MarketEvent, MarketId,
    SystemClock,
};

#[derive(Parser)]
#[command(name = "wagerbook")]
#[command(about = "Binary-outcome prediction-market ledger")]
#[command(version)]
struct Cli {
    /// Path to the book snapshot file
    #[arg(long, default_value = "wagerbook.json", global = true)]
    book: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new book owned by the given operator
    Init {
        /// Operator account that may create/resolve markets and manage fees
        #[arg(long)]
        operator: String,
    },
    /// Create a new market (operator only)
    Create {
        /// Calling account
        #[arg(long = "as")]
        caller: String,
        /// Market title
        #[arg(short, long)]
        title: String,
        /// Market description
        #[arg(short, long)]
        description: String,
        /// Staking deadline (Unix timestamp)
        #[arg(short, long)]
        end_time: u64,
    },
    /// Stake value on a predicted outcome
    Stake {
        /// Calling account
        #[arg(long = "as")]
        caller: String,
        /// Market ID
        market_id: MarketId,
        /// Predicted outcome value
        #[arg(short, long)]
        prediction: u64,
        /// Value to stake
        #[arg(short, long)]
        value: u64,
    },
    /// Resolve a market with its true outcome (operator only)
    Resolve {
        /// Calling account
        #[arg(long = "as")]
        caller: String,
        /// Market ID
        market_id: MarketId,
        /// True outcome value
        #[arg(short, long)]
        outcome: u64,
    },
    /// Claim winnings from a resolved market
    Claim {
        /// Calling account
        #[arg(long = "as")]
        caller: String,
        /// Market ID
        market_id: MarketId,
    },
    /// Set the global platform fee in basis points (operator only)
    SetFee {
        /// Calling account
        #[arg(long = "as")]
        caller: String,
        /// Fee in basis points (max 300)
        fee_bps: u16,
    },
    /// Withdraw all accrued fees to the operator (operator only)
    WithdrawFees {
        /// Calling account
        #[arg(long = "as")]
        caller: String,
    },
    /// Show one market, or all markets when no id is given
    Info {
        /// Market ID
        market_id: Option<MarketId>,
    },
    /// Show amounts credited out of the book per account
    Balances,
}

/// On-disk snapshot: the durable book state plus the treasury it pays into
#[derive(Serialize, Deserialize)]
struct BookFile {
    state: BookState,
    treasury: CashTreasury,
}

type Book = MarketBook<SystemClock, CashTreasury>;

fn load_book(path: &Path) -> Result<Book> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("No book at {} (run `wagerbook init` first)", path.display()))?;
    let file: BookFile =
        serde_json::from_str(&raw).with_context(|| format!("Corrupt book file {}", path.display()))?;
    Ok(MarketBook::from_parts(file.state, SystemClock, file.treasury))
}

fn save_book(path: &Path, book: Book) -> Result<()> {
    let (state, _clock, treasury) = book.into_parts();
    let json = serde_json::to_string_pretty(&BookFile { state, treasury })?;
    fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

fn print_events(book: &mut Book) {
    for event in book.drain_events() {
        match event {
            MarketEvent::Created {
                market_id,
                title,
                end_time,
            } => println!(
                "{} market {} {:?}, staking until {}",
                "created".green().bold(),
                market_id.to_string().cyan(),
                title,
                format_timestamp(end_time).yellow()
            ),
            MarketEvent::StakePlaced {
                market_id,
                account,
                prediction,
                value,
                total_staked,
            } => println!(
                "{} {} staked {} on {} in market {} (total staked {})",
                "stake".green().bold(),
                account.cyan(),
                value.to_string().yellow(),
                prediction.to_string().yellow(),
                market_id,
                total_staked
            ),
            MarketEvent::Resolved { market_id, outcome } => println!(
                "{} market {} with outcome {}",
                "resolved".green().bold(),
                market_id.to_string().cyan(),
                outcome.to_string().yellow()
            ),
            MarketEvent::WinningsClaimed {
                market_id,
                account,
                winnings,
            } => println!(
                "{} {} paid {} from market {}",
                "claimed".green().bold(),
                account.cyan(),
                winnings.to_string().yellow(),
                market_id
            ),
            MarketEvent::FeeUpdated { fee_bps } => println!(
                "{} platform fee is now {}",
                "fee".green().bold(),
                format_bps(fee_bps).yellow()
            ),
            MarketEvent::FeesWithdrawn { to, amount } => println!(
                "{} {} paid to {}",
                "fees withdrawn".green().bold(),
                amount.to_string().yellow(),
                to.cyan()
            ),
        }
    }
}

fn print_market(book: &Book, id: MarketId) -> Result<()> {
    let market = book.market(id)?;
    let now = book.now();

    println!("{}", "═".repeat(50).bright_black());
    println!("{}: {}", "Market".yellow().bold(), id.to_string().cyan());
    println!("{}: {}", "Title".yellow().bold(), market.title);
    println!("{}: {}", "Description".yellow().bold(), market.description);
    println!(
        "{}: {}",
        "Deadline".yellow().bold(),
        format_timestamp(market.end_time)
    );
    println!("{}: {}", "Total staked".yellow().bold(), market.total_staked);
    println!("{}: {}", "Status".yellow().bold(), market.status(now));
    if market.resolved {
        println!(
            "{}: {}",
            "Winner pool".yellow().bold(),
            book.winner_pool(id)?
        );
    }
    for (account, position) in &market.positions {
        let claimed = if position.claimed { " (claimed)" } else { "" };
        println!(
            "  {} staked {} on {}{}",
            account.cyan(),
            position.amount.to_string().yellow(),
            position.prediction,
            claimed.bright_black()
        );
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Init { operator } => {
            let book = MarketBook::new(operator.clone(), SystemClock, CashTreasury::new());
            save_book(&cli.book, book)?;
            println!(
                "{} book at {} with operator {}",
                "initialized".green().bold(),
                cli.book.display(),
                operator.cyan()
            );
        }

        Commands::Create {
            caller,
            title,
            description,
            end_time,
        } => {
            let mut book = load_book(&cli.book)?;
            book.create_market(&caller, title, description, end_time)?;
            print_events(&mut book);
            save_book(&cli.book, book)?;
        }

        Commands::Stake {
            caller,
            market_id,
            prediction,
            value,
        } => {
            let mut book = load_book(&cli.book)?;
            book.stake(&caller, market_id, prediction, value)?;
            print_events(&mut book);
            save_book(&cli.book, book)?;
        }

        Commands::Resolve {
            caller,
            market_id,
            outcome,
        } => {
            let mut book = load_book(&cli.book)?;
            book.resolve_market(&caller, market_id, outcome)?;
            print_events(&mut book);
            save_book(&cli.book, book)?;
        }

        Commands::Claim { caller, market_id } => {
            let mut book = load_book(&cli.book)?;
            let winnings = book.claim_winnings(&caller, market_id)?;
            print_events(&mut book);
            println!(
                "{}: {} units to {}",
                "Payout".green().bold(),
                winnings.to_string().yellow(),
                caller.cyan()
            );
            save_book(&cli.book, book)?;
        }

        Commands::SetFee { caller, fee_bps } => {
            let mut book = load_book(&cli.book)?;
            book.set_fee(&caller, fee_bps)?;
            print_events(&mut book);
            save_book(&cli.book, book)?;
        }

        Commands::WithdrawFees { caller } => {
            let mut book = load_book(&cli.book)?;
            let amount = book.withdraw_fees(&caller)?;
            print_events(&mut book);
            println!(
                "{}: {} units to {}",
                "Fees".green().bold(),
                amount.to_string().yellow(),
                book.operator().cyan()
            );
            save_book(&cli.book, book)?;
        }

        Commands::Info { market_id } => {
            let book = load_book(&cli.book)?;
            match market_id {
                Some(id) => print_market(&book, id)?,
                None => {
                    println!(
                        "{}: {} markets, fee {}, holding {} ({} accrued fees)",
                        "Book".green().bold(),
                        book.market_count(),
                        format_bps(book.fee_bps()).yellow(),
                        book.balance().to_string().yellow(),
                        book.accrued_fees()
                    );
                    for (id, _) in book.markets() {
                        print_market(&book, id)?;
                    }
                }
            }
        }

        Commands::Balances => {
            let book = load_book(&cli.book)?;
            println!("{}", "Credited balances".green().bold());
            for (account, balance) in book.treasury().balances() {
                println!("  {}: {}", account.cyan(), balance.to_string().yellow());
            }
        }
    }

    Ok(())
}
