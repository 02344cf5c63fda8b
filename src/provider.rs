use std::sync::mpsc::{Receiver, RecvTimeoutError, Sender};
use std::thread;
use std::time::{Duration, Instant};

use crate::config::AppConfig;
use crate::predict;
use crate::state::{Delta, ProviderCommand};
use crate::team_search::TeamSearcher;

const SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// Spawns the single background worker. Both network calls are blocking and
/// run here so the interaction thread never stalls; commands are serialized
/// in arrival order.
pub fn spawn_provider(config: AppConfig, tx: Sender<Delta>, cmd_rx: Receiver<ProviderCommand>) {
    thread::spawn(move || {
        let mut searcher = TeamSearcher::new(&config);
        let mut last_sweep = Instant::now();

        if config.football_api_key.is_none() {
            let _ = tx.send(Delta::Log(
                "[INFO] FOOTBALL_API_KEY not set; team search uses the local catalog".to_string(),
            ));
        }

        loop {
            let cmd = match cmd_rx.recv_timeout(Duration::from_secs(1)) {
                Ok(cmd) => Some(cmd),
                Err(RecvTimeoutError::Timeout) => None,
                Err(RecvTimeoutError::Disconnected) => return,
            };

            if last_sweep.elapsed() >= SWEEP_INTERVAL {
                searcher.sweep_cache(Instant::now());
                last_sweep = Instant::now();
            }

            match cmd {
                Some(ProviderCommand::Search { field, seq, query }) => {
                    let outcome = searcher.lookup(&query, Instant::now());
                    if let Some(err) = outcome.degraded {
                        let _ = tx.send(Delta::Log(format!(
                            "[WARN] Team search fell back to local catalog: {err}"
                        )));
                    }
                    if tx
                        .send(Delta::SearchResults {
                            field,
                            seq,
                            teams: outcome.teams,
                        })
                        .is_err()
                    {
                        return;
                    }
                }
                Some(ProviderCommand::Predict(request)) => {
                    let _ = tx.send(Delta::Log(format!(
                        "[INFO] Predicting {} vs {}",
                        request.home_team, request.away_team
                    )));
                    let result = predict::predict(&config, &request)
                        .map_err(|err| err.to_string());
                    if tx.send(Delta::Prediction(result)).is_err() {
                        return;
                    }
                }
                None => {}
            }
        }
    });
}
