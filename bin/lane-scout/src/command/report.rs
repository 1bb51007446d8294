use super::{print_json, Report};
use chrono::Utc;
use lane_scout_db::DbHandler;
use lane_scout_evaluation::draft::{analyze_draft_session, ChampionHistory};
use lane_scout_evaluation::{performance, smurf, tilt};
use tracing::debug;

pub async fn print(db: &DbHandler, report: Report) -> anyhow::Result<()> {
    let now = Utc::now();
    match report {
        Report::Tilt { puuid } => {
            let matches = db.get_recent_matches(&puuid, tilt::LOOKBACK_GAMES).await?;
            debug!("Tilt report over {} games", matches.len());
            print_json(&tilt::tilt_report(&puuid, &matches, now))
        }
        Report::Smurf { puuid } => {
            let matches = db.get_earliest_matches(&puuid, smurf::MAX_GAMES).await?;
            debug!("Smurf report over {} games", matches.len());
            print_json(&smurf::smurf_report(&puuid, &matches))
        }
        Report::Performance { puuid, period } => {
            let matches = db.get_recent_matches(&puuid, period.game_limit()).await?;
            debug!("Performance report over {} games", matches.len());
            print_json(&performance::performance_report(&puuid, period, &matches))
        }
        Report::Draft {
            puuid,
            champion,
            enemies,
            allies,
            patch,
        } => {
            let aggregate = db
                .get_champion_aggregate_by_name(&puuid, &champion, None)
                .await?;
            let matches = db.get_champion_matches(&puuid, &champion).await?;
            let history = ChampionHistory {
                aggregate: aggregate.as_ref(),
                matches: &matches,
            };
            print_json(&analyze_draft_session(
                &puuid,
                &champion,
                &allies,
                &enemies,
                patch.as_deref(),
                history,
                now,
            ))
        }
    }
}
