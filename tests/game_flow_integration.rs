//! End-to-end hand flows through the public table API.

use std::sync::{Arc, Mutex};

use draw_poker::game::{Chips, PlayerStatus, Username};
use draw_poker::table::{
    GamePhase, Table, TableConfig, TableError, TableEvent, TableObserver,
};

fn new_table(names: &[&str]) -> Table {
    let table = Table::new(TableConfig::default()).unwrap();
    for name in names {
        table.add_player(Username::new(name)).unwrap();
    }
    table
}

fn total_chips(table: &Table, players: usize) -> Chips {
    (0..players)
        .map(|id| table.player_view(id).unwrap().chips)
        .sum::<Chips>()
        + table.pot_total()
}

struct Recorder(Arc<Mutex<Vec<TableEvent>>>);

impl TableObserver for Recorder {
    fn on_event(&self, event: &TableEvent) {
        self.0.lock().unwrap().push(event.clone());
    }
}

#[test]
fn test_two_player_hand_start() {
    let table = new_table(&["alice", "bob"]);
    table.start_game().unwrap();

    assert_eq!(table.phase(), GamePhase::FirstBetting);
    assert_eq!(table.pot_total(), 20);
    for id in 0..2 {
        let view = table.player_view(id).unwrap();
        assert_eq!(view.chips, 990);
        assert_eq!(view.hand.len(), 5);
        assert_eq!(view.status, PlayerStatus::Active);
    }
}

#[test]
fn test_full_hand_to_showdown() {
    let table = new_table(&["alice", "bob"]);
    table.start_game().unwrap();

    // First betting: both check.
    table.player_check(table.current_player().unwrap()).unwrap();
    table.player_check(table.current_player().unwrap()).unwrap();
    assert_eq!(table.phase(), GamePhase::Drawing);

    // Draw: one stands pat, the other exchanges two.
    table
        .player_exchange_cards(table.current_player().unwrap(), &[])
        .unwrap();
    assert_eq!(table.phase(), GamePhase::Drawing);
    table
        .player_exchange_cards(table.current_player().unwrap(), &[0, 1])
        .unwrap();
    assert_eq!(table.phase(), GamePhase::SecondBetting);

    // Second betting: raise 50, call.
    table
        .player_raise(table.current_player().unwrap(), 50)
        .unwrap();
    table.player_call(table.current_player().unwrap()).unwrap();

    assert_eq!(table.phase(), GamePhase::Finished);
    assert_eq!(table.pot_total(), 0);
    assert_eq!(total_chips(&table, 2), 2000);

    // 120 in the pot: a single winner ends 1060/940, a tie splits back
    // to 1000/1000.
    let mut stacks: Vec<Chips> = (0..2)
        .map(|id| table.player_view(id).unwrap().chips)
        .collect();
    stacks.sort_unstable();
    assert!(stacks == [940, 1060] || stacks == [1000, 1000]);
}

#[test]
fn test_turn_exclusivity() {
    let table = new_table(&["alice", "bob", "carol"]);
    table.start_game().unwrap();

    let actor = table.current_player().unwrap();
    for other in (0..3).filter(|&id| id != actor) {
        assert_eq!(table.player_check(other).unwrap_err(), TableError::OutOfTurn);
        assert_eq!(table.player_call(other).unwrap_err(), TableError::OutOfTurn);
        assert_eq!(
            table.player_raise(other, 20).unwrap_err(),
            TableError::OutOfTurn
        );
        assert_eq!(table.player_fold(other).unwrap_err(), TableError::OutOfTurn);
    }
    // Nothing moved.
    assert_eq!(table.current_player(), Some(actor));
    assert_eq!(table.pot_total(), 30);
    assert_eq!(total_chips(&table, 3), 3000);
}

#[test]
fn test_betting_round_completion_counts_actions() {
    let table = new_table(&["alice", "bob", "carol"]);
    table.start_game().unwrap();

    // Two checks leave the round open; the third closes it.
    table.player_check(table.current_player().unwrap()).unwrap();
    assert_eq!(table.phase(), GamePhase::FirstBetting);
    table.player_check(table.current_player().unwrap()).unwrap();
    assert_eq!(table.phase(), GamePhase::FirstBetting);
    table.player_check(table.current_player().unwrap()).unwrap();
    assert_eq!(table.phase(), GamePhase::Drawing);
}

#[test]
fn test_raise_reopens_the_round() {
    let table = new_table(&["alice", "bob", "carol"]);
    table.start_game().unwrap();

    table.player_check(table.current_player().unwrap()).unwrap();
    table
        .player_raise(table.current_player().unwrap(), 25)
        .unwrap();
    // The earlier checker and the third player both still owe an answer.
    assert_eq!(table.phase(), GamePhase::FirstBetting);
    table.player_call(table.current_player().unwrap()).unwrap();
    assert_eq!(table.phase(), GamePhase::FirstBetting);
    table.player_fold(table.current_player().unwrap()).unwrap();
    assert_eq!(table.phase(), GamePhase::Drawing);
}

#[test]
fn test_draw_count_boundary() {
    let table = new_table(&["alice", "bob"]);
    table.start_game().unwrap();
    table.player_check(table.current_player().unwrap()).unwrap();
    table.player_check(table.current_player().unwrap()).unwrap();

    let actor = table.current_player().unwrap();
    assert_eq!(
        table
            .player_exchange_cards(actor, &[0, 1, 2, 3])
            .unwrap_err(),
        TableError::IllegalDraw { max: 3 }
    );
    table.player_exchange_cards(actor, &[0, 1, 2]).unwrap();
    let view = table.player_view(actor).unwrap();
    assert_eq!(view.hand.len(), 5);
}

#[test]
fn test_draw_beyond_deck_reports_shortage() {
    let config = TableConfig {
        max_players: 8,
        ..TableConfig::default()
    };
    let table = Table::new(config).unwrap();
    for i in 0..8 {
        table.add_player(Username::new(&format!("player{i}"))).unwrap();
    }
    table.start_game().unwrap();
    for _ in 0..8 {
        table.player_check(table.current_player().unwrap()).unwrap();
    }
    assert_eq!(table.phase(), GamePhase::Drawing);

    // Eight hands took 40 cards; the first four drawers use up the
    // remaining 12.
    for _ in 0..4 {
        table
            .player_exchange_cards(table.current_player().unwrap(), &[0, 1, 2])
            .unwrap();
    }
    let actor = table.current_player().unwrap();
    assert_eq!(
        table.player_exchange_cards(actor, &[0]).unwrap_err(),
        TableError::DrawExceedsDeck { remaining: 0 }
    );
    // Standing pat needs no cards; the hand still completes.
    for _ in 0..4 {
        table
            .player_exchange_cards(table.current_player().unwrap(), &[])
            .unwrap();
    }
    assert_eq!(table.phase(), GamePhase::SecondBetting);
}

#[test]
fn test_premature_end_on_folds() {
    let table = new_table(&["alice", "bob", "carol"]);
    table.start_game().unwrap();

    let first = table.current_player().unwrap();
    table.player_fold(first).unwrap();
    assert_eq!(table.phase(), GamePhase::FirstBetting);

    let second = table.current_player().unwrap();
    table.player_fold(second).unwrap();
    assert_eq!(table.phase(), GamePhase::Finished);

    let survivor = (0..3).find(|&id| id != first && id != second).unwrap();
    assert_eq!(table.player_view(survivor).unwrap().chips, 1020);
    assert_eq!(total_chips(&table, 3), 3000);
}

#[test]
fn test_disconnect_does_not_double_deduct() {
    let table = new_table(&["alice", "bob", "carol"]);
    table.start_game().unwrap();
    let before = total_chips(&table, 3);

    let leaver = table.current_player().unwrap();
    table.player_disconnect(leaver).unwrap();
    table.player_disconnect(leaver).unwrap();

    assert_eq!(total_chips(&table, 3), before);
    assert_eq!(
        table.player_view(leaver).unwrap().status,
        PlayerStatus::SittingOut
    );
    // The hand goes on for the other two.
    assert_eq!(table.phase(), GamePhase::FirstBetting);
    assert_ne!(table.current_player(), Some(leaver));
}

#[test]
fn test_disconnect_mid_hand_ends_for_survivor() {
    let table = new_table(&["alice", "bob"]);
    table.start_game().unwrap();
    table.player_disconnect(1).unwrap();

    assert_eq!(table.phase(), GamePhase::Finished);
    assert_eq!(table.player_view(0).unwrap().chips, 1010);
    assert_eq!(total_chips(&table, 2), 2000);
}

#[test]
fn test_sitting_out_player_skipped_next_hand() {
    let table = new_table(&["alice", "bob", "carol"]);
    table.start_game().unwrap();
    let leaver = table.current_player().unwrap();
    table.player_disconnect(leaver).unwrap();

    // Finish the hand between the remaining two.
    let folder = table.current_player().unwrap();
    table.player_fold(folder).unwrap();
    assert_eq!(table.phase(), GamePhase::Finished);

    table.start_next_hand().unwrap();
    assert_eq!(table.phase(), GamePhase::FirstBetting);
    let view = table.player_view(leaver).unwrap();
    assert_eq!(view.status, PlayerStatus::SittingOut);
    assert!(view.hand.is_empty());
    assert_eq!(table.pot_total(), 20);
}

#[test]
fn test_rejected_actions_leave_state_unchanged() {
    let table = new_table(&["alice", "bob"]);
    table.start_game().unwrap();
    let actor = table.current_player().unwrap();

    assert_eq!(
        table.player_raise(actor, 3).unwrap_err(),
        TableError::RaiseBelowMinimum { min: 10 }
    );
    assert_eq!(
        table.player_raise(actor, 10_000).unwrap_err(),
        TableError::InsufficientChips { needed: 9010 }
    );
    assert_eq!(
        table.player_exchange_cards(actor, &[0]).unwrap_err(),
        TableError::InvalidMove
    );

    assert_eq!(table.current_player(), Some(actor));
    assert_eq!(table.phase(), GamePhase::FirstBetting);
    assert_eq!(table.player_view(actor).unwrap().chips, 990);
    assert_eq!(table.pot_total(), 20);
}

#[test]
fn test_event_order_for_a_folded_hand() {
    let events = Arc::new(Mutex::new(Vec::new()));
    let table = new_table(&["alice", "bob"]);
    table.add_observer(Box::new(Recorder(Arc::clone(&events))));
    table.start_game().unwrap();
    table.player_fold(table.current_player().unwrap()).unwrap();

    let events = events.lock().unwrap();
    let finish = events
        .iter()
        .position(|e| matches!(e, TableEvent::GameFinished { .. }))
        .unwrap();
    let fold = events
        .iter()
        .position(
            |e| matches!(e, TableEvent::PlayerAction { .. }),
        )
        .unwrap();
    assert!(fold < finish);
    let Some(TableEvent::GameFinished {
        pot_amount,
        hand_rank,
        cards,
        ..
    }) = events.get(finish)
    else {
        panic!("missing GameFinished");
    };
    // Uncontested wins reveal nothing.
    assert_eq!(*pot_amount, 20);
    assert!(hand_rank.is_none());
    assert!(cards.is_empty());
    assert!(matches!(
        events.last(),
        Some(TableEvent::StateChanged {
            new_phase: GamePhase::Finished
        })
    ));
}

/// Play one scripted hand among four 1000-chip stacks so the next hand
/// starts with seats 0 and 1 short (60 chips) and seat 2 deep (2890).
/// Seat 1 opens with a 930 raise, seats 2 and 0 call, seat 3 folds; in the
/// second round seat 2 takes the pot uncontested.
fn play_setup_hand(table: &Table) {
    table.start_game().unwrap();
    assert_eq!(table.current_player(), Some(1));
    table.player_raise(1, 930).unwrap();
    table.player_call(2).unwrap();
    table.player_fold(3).unwrap();
    table.player_call(0).unwrap();
    assert_eq!(table.phase(), GamePhase::Drawing);
    for _ in 0..3 {
        table
            .player_exchange_cards(table.current_player().unwrap(), &[])
            .unwrap();
    }
    assert_eq!(table.phase(), GamePhase::SecondBetting);
    table.player_fold(1).unwrap();
    table.player_check(2).unwrap();
    table.player_fold(0).unwrap();
    assert_eq!(table.phase(), GamePhase::Finished);
    assert_eq!(table.player_view(0).unwrap().chips, 60);
    assert_eq!(table.player_view(1).unwrap().chips, 60);
    assert_eq!(table.player_view(2).unwrap().chips, 2890);
    assert_eq!(table.player_view(3).unwrap().chips, 990);
}

/// Drive the short stacks all-in behind a 100 raise so the betting round
/// builds a main pot open to everyone and a side pot only seats 2 and 3
/// can win, then bring the hand through the draw to the second betting
/// round. Seat 2 opens both rounds (the button sits at seat 1).
fn build_side_pot_hand(table: &Table) {
    table.start_next_hand().unwrap();
    assert_eq!(table.current_player(), Some(2));
    table.player_raise(2, 100).unwrap();
    table.player_call(3).unwrap();
    table.player_call(0).unwrap();
    table.player_call(1).unwrap();
    assert_eq!(table.phase(), GamePhase::Drawing);
    assert_eq!(table.player_view(0).unwrap().status, PlayerStatus::AllIn);
    assert_eq!(table.player_view(1).unwrap().status, PlayerStatus::AllIn);
    assert_eq!(table.pot_count(), 2);
    assert_eq!(table.pot_total(), 340);
    for _ in 0..4 {
        table
            .player_exchange_cards(table.current_player().unwrap(), &[])
            .unwrap();
    }
    assert_eq!(table.phase(), GamePhase::SecondBetting);
}

#[test]
fn test_side_pot_paid_out_when_every_eligible_player_folds() {
    let table = new_table(&["alice", "bob", "carol", "dan"]);
    play_setup_hand(&table);
    build_side_pot_hand(&table);

    // Both deep stacks abandon the hand. The all-in seats 0 and 1 are still
    // contending, so the hand goes to showdown, where the side pot has no
    // eligible player left.
    table.player_fold(2).unwrap();
    table.player_fold(3).unwrap();
    table.player_check(0).unwrap();
    table.player_check(1).unwrap();

    assert_eq!(table.phase(), GamePhase::Finished);
    // Every pot is paid: the main pot and the abandoned side pot both go
    // to the best remaining hand (or split on a tie).
    assert_eq!(table.pot_total(), 0);
    assert_eq!(table.player_view(2).unwrap().chips, 2780);
    assert_eq!(table.player_view(3).unwrap().chips, 880);
    let short_stacks =
        table.player_view(0).unwrap().chips + table.player_view(1).unwrap().chips;
    assert_eq!(short_stacks, 340);
    assert_eq!(total_chips(&table, 4), 4000);

    // Nothing is destroyed when the next hand sweeps the pots.
    table.start_next_hand().unwrap();
    assert_eq!(total_chips(&table, 4), 4000);
}

#[test]
fn test_contested_showdown_with_live_side_pot() {
    let table = new_table(&["alice", "bob", "carol", "dan"]);
    play_setup_hand(&table);
    build_side_pot_hand(&table);

    // Everyone checks the hand down to a four-way showdown.
    table.player_check(2).unwrap();
    table.player_check(3).unwrap();
    table.player_check(0).unwrap();
    table.player_check(1).unwrap();

    assert_eq!(table.phase(), GamePhase::Finished);
    assert_eq!(table.pot_total(), 0);
    assert_eq!(total_chips(&table, 4), 4000);
    // The all-in seats can win at most the 240-chip main pot; the 100-chip
    // side pot stays between the two deep stacks.
    let short_stacks =
        table.player_view(0).unwrap().chips + table.player_view(1).unwrap().chips;
    assert!(short_stacks <= 240);
    let deep_stacks =
        table.player_view(2).unwrap().chips + table.player_view(3).unwrap().chips;
    assert!(deep_stacks >= 2780 + 880 + 100);
}

#[test]
fn test_audit_seed_changes_between_hands() {
    let table = new_table(&["alice", "bob"]);
    table.start_game().unwrap();
    let first_seed = table.audit_seed();
    assert_eq!(first_seed.len(), 64);

    table.player_fold(table.current_player().unwrap()).unwrap();
    table.start_next_hand().unwrap();
    assert_ne!(table.audit_seed(), first_seed);
}
