//! Randomized full-table driver: whatever sequence of legal actions the
//! players take, chips are neither created nor destroyed.

use rand::prelude::*;
use rand::rngs::StdRng;

use draw_poker::game::{Chips, Username};
use draw_poker::table::{GamePhase, Table, TableConfig};

fn total_in_play(table: &Table, players: usize) -> Chips {
    (0..players)
        .map(|id| table.player_view(id).unwrap().chips)
        .sum::<Chips>()
        + table.pot_total()
}

/// Drive one hand to completion with random (mostly legal) actions.
fn play_random_hand(table: &Table, rng: &mut StdRng, players: usize, bankroll: Chips) {
    let mut steps = 0;
    while table.phase() != GamePhase::Finished {
        steps += 1;
        assert!(steps < 1000, "hand failed to terminate");

        let actor = table.current_player().expect("someone must be up");
        match table.phase() {
            GamePhase::FirstBetting | GamePhase::SecondBetting => {
                let outcome = match rng.random_range(0..6u8) {
                    0 => table.player_check(actor),
                    1 | 2 => table.player_call(actor),
                    3 => table.player_raise(actor, rng.random_range(10..=60)),
                    4 => table.player_fold(actor),
                    // An occasional oversized raise drives stacks apart
                    // across hands so later hands build real side pots.
                    _ => table.player_raise(actor, rng.random_range(200..=900)),
                };
                // Illegal choices (check facing a bet, raise without the
                // chips) fall back to a call, which is always legal in turn.
                if outcome.is_err() {
                    table.player_call(actor).unwrap();
                }
            }
            GamePhase::Drawing => {
                let count = rng.random_range(0..=3usize);
                let mut indexes: Vec<usize> = (0..5).collect();
                indexes.shuffle(rng);
                indexes.truncate(count);
                table.player_exchange_cards(actor, &indexes).unwrap();
            }
            phase => panic!("unexpected phase {phase} with a player up"),
        }

        assert_eq!(total_in_play(table, players), bankroll);
    }
    assert_eq!(table.pot_total(), 0);
    assert_eq!(total_in_play(table, players), bankroll);
}

#[test]
fn test_random_hands_conserve_chips() {
    for seed in 0..8u64 {
        let mut rng = StdRng::seed_from_u64(seed);
        let players = rng.random_range(2..=5usize);
        let table = Table::new(TableConfig::default()).unwrap();
        for i in 0..players {
            table.add_player(Username::new(&format!("player{i}"))).unwrap();
        }
        let bankroll = players as Chips * 1000;

        table.start_game().unwrap();
        play_random_hand(&table, &mut rng, players, bankroll);

        // Keep dealing until the table can't field a hand or we've seen
        // enough.
        for _ in 0..20 {
            if table.start_next_hand().is_err() {
                break;
            }
            play_random_hand(&table, &mut rng, players, bankroll);
        }
        assert_eq!(total_in_play(&table, players), bankroll);
    }
}

#[test]
fn test_random_disconnects_conserve_chips() {
    let mut rng = StdRng::seed_from_u64(42);
    let players = 4;
    let table = Table::new(TableConfig::default()).unwrap();
    for i in 0..players {
        table.add_player(Username::new(&format!("player{i}"))).unwrap();
    }
    let bankroll = players as Chips * 1000;
    table.start_game().unwrap();

    let mut steps = 0;
    while table.phase() != GamePhase::Finished {
        steps += 1;
        assert!(steps < 1000, "hand failed to terminate");

        // Occasionally yank a random player, in or out of turn.
        if rng.random_bool(0.2) {
            table.player_disconnect(rng.random_range(0..players)).unwrap();
            assert_eq!(total_in_play(&table, players), bankroll);
            continue;
        }
        let Some(actor) = table.current_player() else {
            continue;
        };
        match table.phase() {
            GamePhase::Drawing => {
                table.player_exchange_cards(actor, &[0]).unwrap();
            }
            GamePhase::FirstBetting | GamePhase::SecondBetting => {
                if table.player_check(actor).is_err() {
                    table.player_call(actor).unwrap();
                }
            }
            _ => {}
        }
        assert_eq!(total_in_play(&table, players), bankroll);
    }
    assert_eq!(total_in_play(&table, players), bankroll);
}
