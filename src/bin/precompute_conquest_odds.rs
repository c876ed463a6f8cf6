use rayon::prelude::*;
use risk_game_engine::odds::{ConquestOdds, OddsError, OddsTable, DEFAULT_TABLE_FILE};
use std::collections::HashMap;
use std::time::Instant;
use tracing::info;
use tracing_subscriber::EnvFilter;

const DEFAULT_MAX_ARMIES: u32 = 100;

struct Args {
    max_attack_armies: u32,
    max_defend_armies: u32,
    output: String,
}

// precompute_conquest_odds [max_attack] [max_defend] [output]
fn parse_args() -> Args {
    let args: Vec<String> = std::env::args().collect();
    let number = |i: usize| {
        args.get(i)
            .and_then(|a| a.parse().ok())
            .unwrap_or(DEFAULT_MAX_ARMIES)
    };
    Args {
        max_attack_armies: number(1),
        max_defend_armies: number(2),
        output: args
            .get(3)
            .cloned()
            .unwrap_or_else(|| DEFAULT_TABLE_FILE.to_string()),
    }
}

fn main() -> Result<(), OddsError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .compact()
        .init();

    let args = parse_args();
    let start = Instant::now();

    let pairs: Vec<(u32, u32)> = (2..=args.max_attack_armies)
        .flat_map(|attackers| (1..=args.max_defend_armies).map(move |defenders| (attackers, defenders)))
        .collect();
    info!(
        pairs = pairs.len(),
        max_attack = args.max_attack_armies,
        max_defend = args.max_defend_armies,
        "computing conquest odds"
    );

    // Each worker keeps its own table; later pairs reuse what earlier ones filled.
    let entries: HashMap<(u32, u32), f64> = pairs
        .par_iter()
        .map_init(ConquestOdds::new, |odds, &(attackers, defenders)| {
            ((attackers, defenders), odds.exact(attackers, defenders))
        })
        .collect();

    let table = OddsTable { entries };
    table.save(&args.output)?;
    info!(
        file = %args.output,
        entries = table.entries.len(),
        elapsed = ?start.elapsed(),
        "odds table written"
    );
    Ok(())
}
