use crate::config::Config;
use clap::{Parser, Subcommand};
use lane_scout_db::DbHandler;
use lane_scout_evaluation::performance::Period;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;

mod report;
mod sync;

#[derive(Debug, Parser)]
#[command(name = "lane-scout")]
#[command(about = "Ranked match ingestion and player reports for League of Legends")]
#[command(version)]
pub struct Cli {
    /// Path to a TOML configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Sync every linked player on the configured interval until interrupted
    Run,
    /// Sync one user's matches now, ignoring the cooldown
    Sync { user_id: String },
    /// Show the sync status of a user's linked account
    Status { user_id: String },
    /// Link a Riot account to a user, creating the user if needed
    Link {
        user_id: String,
        puuid: String,
        /// Platform the account plays on, e.g. EUW1
        platform: String,
        #[arg(long)]
        summoner_name: Option<String>,
    },
    /// Print a report built from stored matches
    Report {
        #[command(subcommand)]
        report: Report,
    },
}

#[derive(Debug, Subcommand)]
pub enum Report {
    /// Tilt risk over the most recent games
    Tilt { puuid: String },
    /// Smurf likelihood from the earliest games
    Smurf { puuid: String },
    /// Comparison against high-elo benchmarks
    Performance {
        puuid: String,
        /// last20, last50 or season
        #[arg(long, default_value = "last20")]
        period: Period,
    },
    /// Analysis of a champion pick in champion select
    Draft {
        puuid: String,
        champion: String,
        /// Enemy champions, lane opponent first
        #[arg(long = "enemy")]
        enemies: Vec<String>,
        #[arg(long = "ally")]
        allies: Vec<String>,
        /// Patch to compute the patch win rate for, e.g. 14.10
        #[arg(long)]
        patch: Option<String>,
    },
}

pub async fn execute(command: Command, config: Config, db: Arc<DbHandler>) -> anyhow::Result<()> {
    match command {
        Command::Run => sync::run(&config, db).await,
        Command::Sync { user_id } => sync::sync(&config, db, &user_id).await,
        Command::Status { user_id } => sync::status(&config, db, &user_id).await,
        Command::Link {
            user_id,
            puuid,
            platform,
            summoner_name,
        } => sync::link(&db, user_id, puuid, platform, summoner_name).await,
        Command::Report { report } => report::print(&db, report).await,
    }
}

fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_draft_report() {
        let cli = Cli::try_parse_from([
            "lane-scout",
            "--config",
            "scout.toml",
            "report",
            "draft",
            "puuid-1",
            "Ahri",
            "--enemy",
            "Zed",
            "--enemy",
            "Lux",
            "--ally",
            "Jinx",
        ])
        .unwrap();

        assert_eq!(cli.config, Some(PathBuf::from("scout.toml")));
        let Command::Report {
            report:
                Report::Draft {
                    puuid,
                    champion,
                    enemies,
                    allies,
                    patch,
                },
        } = cli.command
        else {
            panic!("expected a draft report");
        };
        assert_eq!(puuid, "puuid-1");
        assert_eq!(champion, "Ahri");
        assert_eq!(enemies, vec!["Zed", "Lux"]);
        assert_eq!(allies, vec!["Jinx"]);
        assert_eq!(patch, None);
    }

    #[test]
    fn test_parse_performance_period() {
        let cli = Cli::try_parse_from(["lane-scout", "report", "performance", "p", "--period", "season"])
            .unwrap();
        assert!(matches!(
            cli.command,
            Command::Report {
                report: Report::Performance {
                    period: Period::Season,
                    ..
                }
            }
        ));

        let cli = Cli::try_parse_from(["lane-scout", "report", "performance", "p"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Report {
                report: Report::Performance {
                    period: Period::Last20,
                    ..
                }
            }
        ));

        assert!(Cli::try_parse_from(["lane-scout", "report", "performance", "p", "--period", "week"]).is_err());
    }

    #[test]
    fn test_parse_link() {
        let cli = Cli::try_parse_from(["lane-scout", "link", "user-1", "puuid-1", "EUW1"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Link { ref platform, summoner_name: None, .. } if platform == "EUW1"
        ));
    }
}
