use std::collections::HashMap;
use std::path::PathBuf;

use anyhow::{anyhow, bail, Context, Result};
use clap::Parser;
use rand::{rngs::StdRng, seq::index::sample, SeedableRng};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use veiled_poker::cards::{Card, DealtHand, PlayerSecretKey, RevealKey};
use veiled_poker::collaborators::{DealerGate, InMemoryToken};
use veiled_poker::config::EngineConfig;
use veiled_poker::encrypted::{ClearBackend, Handle};
use veiled_poker::engine::round::{BetAction, Seating};
use veiled_poker::game::{GameManager, HandProgress};
use veiled_poker::ledger::serialization::encode_state_hash;
use veiled_poker::ledger::types::{PlayerId, TableId};
use veiled_poker::showdown::NativeRanker;
use veiled_poker::table::TableConfig;

const LOG_TARGET: &str = "bin::table_demo";

type Manager = GameManager<ClearBackend, InMemoryToken<Handle>, NativeRanker, DealerGate>;

#[derive(Debug, Parser)]
#[command(name = "table_demo")]
#[command(about = "Play two confidential hands against the in-memory backend", long_about = None)]
struct Args {
    /// Number of seated players
    #[arg(long, env = "DEMO_PLAYERS", default_value_t = 3)]
    players: u64,

    /// Big blind for the first hand; the second hand is played without blinds
    #[arg(long, env = "DEMO_BIG_BLIND", default_value_t = 10)]
    big_blind: u32,

    /// Minimum (and actual) buy-in per player
    #[arg(long, env = "DEMO_BUY_IN", default_value_t = 100)]
    buy_in: u32,

    /// RNG seed for keys, cards and the board
    #[arg(long, env = "DEMO_SEED")]
    seed: Option<u64>,

    /// Optional engine config (JSON)
    #[arg(long, env = "DEMO_CONFIG")]
    config: Option<PathBuf>,

    /// Toggle structured (JSON) logs
    #[arg(long, env = "DEMO_LOG_JSON", default_value_t = false)]
    json: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.json)?;
    if args.players < 2 {
        bail!("at least two players are needed, got {}", args.players);
    }

    let mut config = match &args.config {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::default(),
    };
    if args.seed.is_some() {
        config.rng_seed = args.seed;
    }

    let dealer = config.dealer;
    let mut rng = match config.rng_seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let mut gm: Manager = GameManager::new(
        config.clone(),
        ClearBackend::new(config.rng_seed),
        InMemoryToken::new(),
        NativeRanker,
        DealerGate::new(dealer),
    )?;

    let players: Vec<PlayerId> = (1..=args.players).map(|i| dealer + i).collect();
    let mut secrets = HashMap::new();
    for player in &players {
        let secret = PlayerSecretKey::generate(&mut rng);
        gm.set_public_key(*player, &secret.public_key().to_bytes())?;
        secrets.insert(*player, secret);
    }

    let blinds = open_table(&mut gm, &players, args.buy_in, args.big_blind)?;
    play_fold_out(&mut gm, &secrets, dealer, blinds)?;

    let free = open_table(&mut gm, &players, args.buy_in, 0)?;
    play_check_down(&mut gm, &secrets, dealer, free, &mut rng)?;

    for entry in gm.journal().entries() {
        println!("{}", serde_json::to_string(&entry.message)?);
    }
    gm.journal()
        .verify()
        .map_err(|err| anyhow!("journal failed verification: {err}"))?;
    println!("journal head: {}", encode_state_hash(gm.state_hash()));
    Ok(())
}

fn init_tracing(json: bool) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = fmt::fmt().with_env_filter(filter).with_target(false);

    if json {
        builder.json().flatten_event(true).init();
    } else {
        builder.compact().init();
    }

    Ok(())
}

fn open_table(
    gm: &mut Manager,
    players: &[PlayerId],
    buy_in: u32,
    big_blind: u32,
) -> Result<TableId> {
    let table_id = gm.create_table(TableConfig {
        buy_in,
        max_players: players.len(),
        big_blind,
        token_ref: "demo-chips".into(),
    })?;
    for player in players {
        let amount = gm.backend().encrypt(buy_in);
        gm.buy_in(*player, table_id, &amount)
            .with_context(|| format!("player {player} could not buy in"))?;
    }
    Ok(table_id)
}

fn deal(
    gm: &mut Manager,
    secrets: &HashMap<PlayerId, PlayerSecretKey>,
    dealer: PlayerId,
    table_id: TableId,
) -> Result<Vec<(PlayerId, RevealKey, [Card; 2])>> {
    let keys = gm
        .table(table_id)?
        .players
        .iter()
        .map(|player| {
            secrets
                .get(player)
                .map(PlayerSecretKey::public_key)
                .ok_or_else(|| anyhow!("no key for player {player}"))
        })
        .collect::<Result<Vec<_>>>()?;
    let hands: Vec<DealtHand> = gm.deal_cards(dealer, table_id, &keys)?;

    let deck_size = gm.config().deck_size;
    hands
        .iter()
        .map(|hand| {
            let secret = secrets
                .get(&hand.player)
                .ok_or_else(|| anyhow!("no key for player {}", hand.player))?;
            let (reveal_key, cards) = hand
                .open(secret, deck_size)
                .ok_or_else(|| anyhow!("player {} could not open their cards", hand.player))?;
            println!("table {table_id}: player {} holds {} {}", hand.player, cards[0], cards[1]);
            Ok((hand.player, reveal_key, cards))
        })
        .collect()
}

fn next_to_act(gm: &Manager, table_id: TableId) -> Result<PlayerId> {
    gm.current_round(table_id)
        .and_then(|round| round.current_actor())
        .ok_or_else(|| anyhow!("table {table_id} has no player to act"))
}

/// The first player raises to twice the big blind and everybody else folds.
fn play_fold_out(
    gm: &mut Manager,
    secrets: &HashMap<PlayerId, PlayerSecretKey>,
    dealer: PlayerId,
    table_id: TableId,
) -> Result<()> {
    deal(gm, secrets, dealer, table_id)?;
    let big_blind = gm.table(table_id)?.config.big_blind;

    let raiser = next_to_act(gm, table_id)?;
    let raise = gm.backend().encrypt(big_blind * 2);
    let mut progress = gm.play_hand(raiser, table_id, BetAction::Raise, Some(&raise))?;
    info!(target: LOG_TARGET, table_id, raiser, "opening raise");

    loop {
        match progress {
            HandProgress::Continued { next_to_act } => {
                progress = gm.play_hand(next_to_act, table_id, BetAction::Fold, None)?;
            }
            HandProgress::WonByFold { winner } => {
                println!("table {table_id}: player {winner} wins uncontested");
                return Ok(());
            }
            other => bail!("unexpected progress during fold-out: {other:?}"),
        }
    }
}

/// Everybody checks every street; the dealer draws a board and settles the showdown.
fn play_check_down(
    gm: &mut Manager,
    secrets: &HashMap<PlayerId, PlayerSecretKey>,
    dealer: PlayerId,
    table_id: TableId,
    rng: &mut StdRng,
) -> Result<()> {
    let openings = deal(gm, secrets, dealer, table_id)?;
    let deck_size = usize::from(gm.config().deck_size);
    let board_size = gm.config().board_size;
    let board: Vec<Card> = sample(rng, deck_size, board_size)
        .into_iter()
        .map(|code| Card(code as u8))
        .collect();

    loop {
        let player = next_to_act(gm, table_id)?;
        match gm.play_hand(player, table_id, BetAction::Check, None)? {
            HandProgress::Continued { .. } => {}
            HandProgress::StreetClosed { next, .. } => {
                let cards = match next {
                    1 => &board[..3],
                    2 => &board[3..4],
                    _ => &board[4..],
                };
                gm.deal_community_cards(dealer, table_id, next, cards)?;
                let shown: Vec<String> = cards.iter().map(Card::to_string).collect();
                println!("table {table_id}: street {next} board {}", shown.join(" "));
            }
            HandProgress::ShowdownEntered => break,
            other => bail!("unexpected progress during check-down: {other:?}"),
        }
    }

    let order = gm
        .current_round(table_id)
        .map(|round| round.players.clone())
        .ok_or_else(|| anyhow!("table {table_id} has no river round"))?;
    let mut keys = Vec::with_capacity(order.len());
    let mut holes = Vec::with_capacity(order.len());
    for player in &order {
        let (_, key, cards) = openings
            .iter()
            .find(|(owner, _, _)| owner == player)
            .ok_or_else(|| anyhow!("player {player} was not dealt in"))?;
        keys.push(key.clone());
        holes.push(*cards);
    }

    let winner = gm.showdown(dealer, table_id, &keys, &holes)?;
    println!("table {table_id}: player {winner} wins at showdown");
    Ok(())
}
