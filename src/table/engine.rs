//! The table orchestrator and its phase state machine.
//!
//! One table is one unit of mutable state behind one [`Mutex`]. Every public
//! method locks for its full duration, so each action is applied atomically
//! and a getter never observes a torn intermediate state. The engine has no
//! suspension points and performs no I/O; concurrency exists only across
//! independent tables. Events go out synchronously inside the lock, in the
//! order the corresponding state changes happened.

use log::{debug, error, info};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::{Mutex, MutexGuard, PoisonError};
use uuid::Uuid;

use super::config::TableConfig;
use super::errors::TableError;
use super::events::{ActionKind, TableEvent, TableObserver};
use crate::game::dealer::Dealer;
use crate::game::entities::{
    Card, Chips, Player, PlayerId, PlayerStatus, Round, Username,
};
use crate::game::evaluator::{self, HandValue};
use crate::game::pot::PotManager;
use crate::game::turns::TurnOrder;

/// Hand lifecycle. Transitions are strictly forward; `Finished` loops back
/// to `Ante` when the next hand starts. `Ante`, `Dealing`, and `Showdown`
/// are transient: the engine passes through them within a single call, but
/// they are still announced via [`TableEvent::StateChanged`].
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum GamePhase {
    Lobby,
    Ante,
    Dealing,
    FirstBetting,
    Drawing,
    SecondBetting,
    Showdown,
    Finished,
}

impl GamePhase {
    fn is_betting(self) -> bool {
        matches!(self, Self::FirstBetting | Self::SecondBetting)
    }
}

impl fmt::Display for GamePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            Self::Lobby => "lobby",
            Self::Ante => "ante",
            Self::Dealing => "dealing",
            Self::FirstBetting => "first betting",
            Self::Drawing => "drawing",
            Self::SecondBetting => "second betting",
            Self::Showdown => "showdown",
            Self::Finished => "finished",
        };
        write!(f, "{repr}")
    }
}

/// Read-only snapshot of one seat, safe to hand to the protocol layer.
#[derive(Clone, Debug, Serialize)]
pub struct PlayerView {
    pub id: PlayerId,
    pub name: String,
    pub chips: Chips,
    pub round_bet: Chips,
    pub status: PlayerStatus,
    pub hand: Vec<Card>,
    pub is_turn: bool,
}

struct TableInner {
    config: TableConfig,
    game_id: Uuid,
    phase: GamePhase,
    players: Vec<Player>,
    round: Round,
    turns: TurnOrder,
    dealer: Dealer,
    pots: PotManager,
    /// Per-seat flag: has this player taken their draw this hand?
    drawn: Vec<bool>,
    observers: Vec<Box<dyn TableObserver>>,
}

impl TableInner {
    fn emit(&self, event: TableEvent) {
        debug!("table event: {event}");
        for observer in &self.observers {
            observer.on_event(&event);
        }
    }

    fn set_phase(&mut self, phase: GamePhase) {
        self.phase = phase;
        self.emit(TableEvent::StateChanged { new_phase: phase });
    }

    fn seat(&self, player: PlayerId) -> Result<&Player, TableError> {
        self.players.get(player).ok_or(TableError::UnknownPlayer(player))
    }

    fn ensure_turn(&self, player: PlayerId) -> Result<usize, TableError> {
        self.seat(player)?;
        if self.turns.turn_index() != player {
            return Err(TableError::OutOfTurn);
        }
        Ok(player)
    }

    fn emit_turn_changed(&self) {
        let seat = self.turns.turn_index();
        let player = &self.players[seat];
        let owed = self.round.current_bet.saturating_sub(player.round_bet);
        self.emit(TableEvent::TurnChanged {
            player_id: player.id,
            phase: self.phase,
            // Clipped to the stack: a short stack's real cost to continue.
            amount_to_call: owed.min(player.chips),
            min_raise: self.config.min_raise(),
        });
    }

    /// Seed a fresh hand: reset players, take antes, deal, open first
    /// betting. Only called with at least two active players seated.
    fn begin_hand(&mut self) -> Result<(), TableError> {
        self.game_id = Uuid::new_v4();
        for player in &mut self.players {
            player.clear_hand();
        }
        self.pots.clear();
        self.drawn = vec![false; self.players.len()];
        self.emit(TableEvent::GameStarted { game_id: self.game_id });

        self.set_phase(GamePhase::Ante);
        self.turns.rotate_dealer(self.players.len());
        for seat in 0..self.players.len() {
            if self.players[seat].status != PlayerStatus::Active {
                continue;
            }
            let ante = self.config.ante;
            let paid = self.players[seat].bet(ante);
            self.players[seat].reset_round_bet();
            let id = self.players[seat].id;
            self.pots.add_ante(id, paid);
        }
        self.emit(TableEvent::RoundInfo {
            pot_amount: self.pots.total(),
            highest_bet: 0,
        });

        self.set_phase(GamePhase::Dealing);
        self.dealer.setup_new_deck();
        self.dealer.deal_initial_hands(&mut self.players)?;
        info!(
            "hand {} dealt, shuffle seed {}",
            self.game_id,
            self.dealer.audit_seed()
        );
        for player in &self.players {
            if player.is_in_hand() {
                self.emit(TableEvent::CardsDealt {
                    player_id: player.id,
                    cards: player.hand.clone(),
                });
            }
        }

        self.set_phase(GamePhase::FirstBetting);
        self.round = Round::new();
        if !self.turns.start_from_left_of_dealer(&self.players) {
            self.abort_hand("no active player to open the betting");
            return Ok(());
        }
        self.emit_turn_changed();
        Ok(())
    }

    /// Post-action bookkeeping for the betting phases: close the round when
    /// everyone has answered the current bet, otherwise pass the turn.
    fn advance_after_action(&mut self) {
        let active = self.turns.count_active(&self.players);
        if self.round.is_complete(active) {
            self.close_betting_round();
        } else if self.turns.next_player(&self.players) {
            self.emit_turn_changed();
        } else {
            self.abort_hand("no next player in an incomplete round");
        }
    }

    fn close_betting_round(&mut self) {
        let highest = self.round.current_bet;
        self.pots.distribute_bets(&mut self.players);
        self.emit(TableEvent::RoundInfo {
            pot_amount: self.pots.total(),
            highest_bet: highest,
        });
        match self.phase {
            GamePhase::FirstBetting => self.enter_drawing(),
            GamePhase::SecondBetting => self.showdown(),
            phase => self.abort_hand(&format!("betting round closed in {phase}")),
        }
    }

    fn enter_drawing(&mut self) {
        self.set_phase(GamePhase::Drawing);
        self.drawn = vec![false; self.players.len()];
        if !self.turns.start_from_left_of_dealer(&self.players) {
            self.abort_hand("no active player to open the draw");
            return;
        }
        self.round = Round::new();
        self.emit_turn_changed();
    }

    fn enter_second_betting(&mut self) {
        self.set_phase(GamePhase::SecondBetting);
        self.round = Round::new();
        if !self.turns.start_from_left_of_dealer(&self.players) {
            self.abort_hand("no active player to open the betting");
            return;
        }
        self.emit_turn_changed();
    }

    /// Reveal, rank, and pay out every pot, main pot first. Ties split
    /// evenly with the remainder going one chip at a time to the earliest
    /// eligible seats.
    fn showdown(&mut self) {
        self.set_phase(GamePhase::Showdown);

        let mut ranked: Vec<(PlayerId, HandValue)> = Vec::new();
        for player in &self.players {
            if !player.is_in_hand() {
                continue;
            }
            match evaluator::evaluate(&player.hand) {
                Ok(value) => ranked.push((player.id, value)),
                Err(err) => {
                    self.abort_hand(&format!(
                        "unrankable hand for player {}: {err}",
                        player.id
                    ));
                    return;
                }
            }
        }
        if ranked.is_empty() {
            self.abort_hand("showdown with no contenders");
            return;
        }
        for (id, value) in &ranked {
            self.emit(TableEvent::CardsDealt {
                player_id: *id,
                cards: self.players[*id].hand.clone(),
            });
            debug!("player {id} shows {value}");
        }

        for index in 0..self.pots.pot_count() {
            let mut contenders: Vec<&(PlayerId, HandValue)> = ranked
                .iter()
                .filter(|(id, _)| self.pots.pots()[index].eligible.contains(id))
                .collect();
            // A side pot can outlive its eligible players when they all fold
            // before showdown; the chips still have to be paid out, so the
            // best remaining hand takes the orphaned pot.
            let orphaned = contenders.is_empty();
            if orphaned {
                debug!("pot {index} has no eligible contender left; paying best remaining hand");
                contenders = ranked.iter().collect();
            }
            let Some(best) = contenders.iter().map(|(_, v)| v).max() else {
                continue;
            };
            let best = (*best).clone();
            let winners: Vec<PlayerId> = contenders
                .iter()
                .filter(|(_, v)| *v == best)
                .map(|(id, _)| *id)
                .collect();

            let inner = &mut *self;
            if winners.len() == 1 && !orphaned {
                let winner = winners[0];
                let paid = inner.pots.award_pot(index, &mut inner.players, winner);
                if paid > 0 {
                    inner.emit(TableEvent::GameFinished {
                        winner_id: winner,
                        pot_amount: paid,
                        hand_rank: Some(best.rank),
                        cards: inner.players[winner].hand.clone(),
                    });
                }
            } else {
                // split_pot skips the eligibility check, which also covers
                // the orphaned single-winner case.
                let total = inner.pots.split_pot(index, &mut inner.players, &winners);
                let share = total / winners.len() as Chips;
                let remainder = total % winners.len() as Chips;
                for (i, &winner) in winners.iter().enumerate() {
                    let extra = Chips::from((i as Chips) < remainder);
                    inner.emit(TableEvent::GameFinished {
                        winner_id: winner,
                        pot_amount: share + extra,
                        hand_rank: Some(best.rank),
                        cards: inner.players[winner].hand.clone(),
                    });
                }
            }
        }

        self.set_phase(GamePhase::Finished);
    }

    /// End the hand in favor of the sole remaining contender without
    /// running any later phase. Outstanding bets are collected first; every
    /// pot goes to the survivor regardless of per-pot eligibility.
    fn premature_end(&mut self, survivor: PlayerId) {
        let inner = &mut *self;
        inner.pots.distribute_bets(&mut inner.players);
        let paid = inner.pots.award_all(&mut inner.players, survivor);
        inner.emit(TableEvent::GameFinished {
            winner_id: survivor,
            pot_amount: paid,
            hand_rank: None,
            cards: vec![],
        });
        self.set_phase(GamePhase::Finished);
    }

    /// Structural invariant break: log it and terminate the hand instead of
    /// crashing. The first in-hand seat (or seat 0) inherits the pot so no
    /// chips leave the table.
    fn abort_hand(&mut self, reason: &str) {
        error!("aborting hand {}: {reason}", self.game_id);
        let survivor = self
            .players
            .iter()
            .find(|p| p.is_in_hand())
            .map_or(0, |p| p.id);
        self.premature_end(survivor);
    }

    fn sole_survivor(&self) -> Option<PlayerId> {
        let mut in_hand = self.players.iter().filter(|p| p.is_in_hand());
        let survivor = in_hand.next()?;
        in_hand.next().is_none().then_some(survivor.id)
    }

    fn all_drawn(&self) -> bool {
        self.players
            .iter()
            .filter(|p| p.is_in_hand())
            .all(|p| self.drawn[p.id])
    }
}

pub struct Table {
    id: Uuid,
    inner: Mutex<TableInner>,
}

impl Table {
    pub fn new(config: TableConfig) -> Result<Self, TableError> {
        config.validate()?;
        Ok(Self {
            id: Uuid::new_v4(),
            inner: Mutex::new(TableInner {
                config,
                game_id: Uuid::nil(),
                phase: GamePhase::Lobby,
                players: Vec::new(),
                round: Round::new(),
                turns: TurnOrder::new(),
                dealer: Dealer::new(),
                pots: PotManager::new(),
                drawn: Vec::new(),
                observers: Vec::new(),
            }),
        })
    }

    #[must_use]
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// A poisoned lock means a panic elsewhere; the state itself is still
    /// the last consistent snapshot, so we keep serving it.
    fn lock(&self) -> MutexGuard<'_, TableInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Every event from this point forward, in emission order.
    pub fn add_observer(&self, observer: Box<dyn TableObserver>) {
        self.lock().observers.push(observer);
    }

    /// Seat a new player with the configured buy-in. Lobby only.
    pub fn add_player(&self, name: Username) -> Result<PlayerId, TableError> {
        let mut inner = self.lock();
        if inner.phase != GamePhase::Lobby {
            return Err(TableError::WrongState);
        }
        if inner.players.len() >= inner.config.max_players {
            return Err(TableError::TooManyPlayers);
        }
        let id = inner.players.len();
        let player = Player::new(id, name, inner.config.buy_in);
        inner.emit(TableEvent::PlayerJoined {
            id,
            name: player.name.to_string(),
            chips: player.chips,
        });
        inner.players.push(player);
        Ok(id)
    }

    /// Leave the lobby and play the first hand.
    pub fn start_game(&self) -> Result<(), TableError> {
        let mut inner = self.lock();
        if inner.phase != GamePhase::Lobby {
            return Err(TableError::WrongState);
        }
        if inner.players.len() < inner.config.min_players {
            return Err(TableError::TooFewPlayers {
                min: inner.config.min_players,
            });
        }
        inner.begin_hand()
    }

    /// Deal the next hand after a finished one. Busted players sit out; the
    /// hand needs at least two players who can still post an ante.
    pub fn start_next_hand(&self) -> Result<(), TableError> {
        let mut inner = self.lock();
        if inner.phase != GamePhase::Finished {
            return Err(TableError::WrongState);
        }
        let able = inner
            .players
            .iter()
            .filter(|p| p.status != PlayerStatus::SittingOut && p.chips > 0)
            .count();
        if able < 2 {
            return Err(TableError::TooFewPlayers { min: 2 });
        }
        inner.begin_hand()
    }

    /// Check: pass without betting. Legal only when nothing is owed, except
    /// for an all-in player who has no chips left to owe.
    pub fn player_check(&self, player: PlayerId) -> Result<(), TableError> {
        let mut inner = self.lock();
        if !inner.phase.is_betting() {
            return Err(TableError::InvalidMove);
        }
        let seat = inner.ensure_turn(player)?;
        let actor = &inner.players[seat];
        if actor.round_bet != inner.round.current_bet && actor.status != PlayerStatus::AllIn {
            return Err(TableError::InvalidMove);
        }
        inner.round.record_action();
        inner.emit(TableEvent::PlayerAction {
            player_id: player,
            action: ActionKind::Check,
            amount: 0,
            message: String::new(),
        });
        inner.advance_after_action();
        Ok(())
    }

    /// Call the current bet, clipped to the player's stack (a short call is
    /// an all-in). A zero-amount call degrades to a check.
    pub fn player_call(&self, player: PlayerId) -> Result<(), TableError> {
        let mut inner = self.lock();
        if !inner.phase.is_betting() {
            return Err(TableError::InvalidMove);
        }
        let seat = inner.ensure_turn(player)?;
        let owed = inner.round.current_bet.saturating_sub(inner.players[seat].round_bet);
        let paid = inner.players[seat].bet(owed);
        inner.round.record_action();

        let all_in = inner.players[seat].status == PlayerStatus::AllIn;
        let (action, message) = if paid == 0 {
            (ActionKind::Check, String::new())
        } else if all_in {
            (ActionKind::Call, "all-in".to_string())
        } else {
            (ActionKind::Call, String::new())
        };
        inner.emit(TableEvent::PlayerAction {
            player_id: player,
            action,
            amount: paid,
            message,
        });
        inner.advance_after_action();
        Ok(())
    }

    /// Raise by `amount` on top of the call. The raise must meet the table
    /// minimum and the player must cover call + raise in full; a short
    /// stack wanting to commit everything should call instead.
    pub fn player_raise(&self, player: PlayerId, amount: Chips) -> Result<(), TableError> {
        let mut inner = self.lock();
        if !inner.phase.is_betting() {
            return Err(TableError::InvalidMove);
        }
        let seat = inner.ensure_turn(player)?;
        let min = inner.config.min_raise();
        if amount < min {
            return Err(TableError::RaiseBelowMinimum { min });
        }
        let owed = inner.round.current_bet.saturating_sub(inner.players[seat].round_bet);
        // `amount` comes off the wire; call + raise can exceed Chips::MAX,
        // so saturate and let the stack check reject it.
        let committed = owed.saturating_add(amount);
        if inner.players[seat].chips < committed {
            return Err(TableError::InsufficientChips {
                needed: committed - inner.players[seat].chips,
            });
        }
        inner.players[seat].bet(committed);
        let new_bet = inner.players[seat].round_bet;
        inner.round.record_raise(new_bet, seat);
        inner.emit(TableEvent::PlayerAction {
            player_id: player,
            action: ActionKind::Raise,
            amount,
            message: String::new(),
        });
        inner.advance_after_action();
        Ok(())
    }

    /// Fold. If that leaves fewer than two contenders the hand ends at once
    /// in favor of the survivor.
    pub fn player_fold(&self, player: PlayerId) -> Result<(), TableError> {
        let mut inner = self.lock();
        if !inner.phase.is_betting() {
            return Err(TableError::InvalidMove);
        }
        let seat = inner.ensure_turn(player)?;
        inner.players[seat].fold();
        inner.emit(TableEvent::PlayerAction {
            player_id: player,
            action: ActionKind::Fold,
            amount: 0,
            message: String::new(),
        });
        match inner.sole_survivor() {
            Some(survivor) => inner.premature_end(survivor),
            None => inner.advance_after_action(),
        }
        Ok(())
    }

    /// Discard the cards at `discard_indexes` and draw replacements. An
    /// empty index list stands pat. Once every contender has drawn, the
    /// second betting round opens.
    pub fn player_exchange_cards(
        &self,
        player: PlayerId,
        discard_indexes: &[usize],
    ) -> Result<(), TableError> {
        let mut inner = self.lock();
        let inner = &mut *inner;
        if inner.phase != GamePhase::Drawing {
            return Err(TableError::InvalidMove);
        }
        let seat = inner.ensure_turn(player)?;
        let max = inner.config.max_draw;
        if discard_indexes.len() > max {
            return Err(TableError::IllegalDraw { max });
        }
        if !inner.dealer.has_enough_cards(discard_indexes.len()) {
            return Err(TableError::DrawExceedsDeck {
                remaining: inner.dealer.remaining(),
            });
        }

        let drawn = inner
            .dealer
            .exchange_cards(&mut inner.players[seat], discard_indexes)?
            .len();
        inner.drawn[seat] = true;
        inner.emit(TableEvent::CardsDealt {
            player_id: player,
            cards: inner.players[seat].hand.clone(),
        });
        inner.emit(TableEvent::PlayerAction {
            player_id: player,
            action: ActionKind::Draw,
            amount: drawn as Chips,
            message: if drawn == 0 {
                "stands pat".to_string()
            } else {
                format!("exchanges {drawn}")
            },
        });

        if inner.all_drawn() {
            inner.enter_second_betting();
        } else if inner.turns.next_player(&inner.players) {
            inner.emit_turn_changed();
        } else {
            inner.abort_hand("no next player in an unfinished draw");
        }
        Ok(())
    }

    /// Remove a departing player. In the lobby the seat is vacated; mid-hand
    /// the player is auto-folded and sits out from the next hand on. Ending
    /// up with one contender ends the hand prematurely.
    pub fn player_disconnect(&self, player: PlayerId) -> Result<(), TableError> {
        let mut inner = self.lock();
        let inner = &mut *inner;
        inner.seat(player)?;

        if inner.phase == GamePhase::Lobby {
            inner.players.remove(player);
            for (seat, p) in inner.players.iter_mut().enumerate() {
                p.id = seat;
            }
            return Ok(());
        }

        let was_turn = inner.turns.turn_index() == player
            && matches!(
                inner.phase,
                GamePhase::FirstBetting | GamePhase::SecondBetting | GamePhase::Drawing
            );
        let was_in_hand = inner.players[player].is_in_hand();
        inner.players[player].status = PlayerStatus::SittingOut;
        if !was_in_hand {
            return Ok(());
        }
        inner.emit(TableEvent::PlayerAction {
            player_id: player,
            action: ActionKind::Fold,
            amount: 0,
            message: "disconnected".to_string(),
        });

        if let Some(survivor) = inner.sole_survivor() {
            if inner.phase != GamePhase::Finished {
                inner.premature_end(survivor);
            }
            return Ok(());
        }

        match inner.phase {
            GamePhase::FirstBetting | GamePhase::SecondBetting => {
                if was_turn {
                    inner.advance_after_action();
                } else if inner
                    .round
                    .is_complete(inner.turns.count_active(&inner.players))
                {
                    inner.close_betting_round();
                }
            }
            GamePhase::Drawing => {
                if inner.all_drawn() {
                    inner.enter_second_betting();
                } else if was_turn {
                    if inner.turns.next_player(&inner.players) {
                        inner.emit_turn_changed();
                    } else {
                        inner.abort_hand("no next player in an unfinished draw");
                    }
                }
            }
            _ => {}
        }
        Ok(())
    }

    #[must_use]
    pub fn phase(&self) -> GamePhase {
        self.lock().phase
    }

    #[must_use]
    pub fn player_count(&self) -> usize {
        self.lock().players.len()
    }

    #[must_use]
    pub fn pot_total(&self) -> Chips {
        self.lock().pots.total()
    }

    #[must_use]
    pub fn pot_count(&self) -> usize {
        self.lock().pots.pot_count()
    }

    /// The player whose action is awaited, when one is.
    #[must_use]
    pub fn current_player(&self) -> Option<PlayerId> {
        let inner = self.lock();
        matches!(
            inner.phase,
            GamePhase::FirstBetting | GamePhase::SecondBetting | GamePhase::Drawing
        )
        .then(|| inner.players[inner.turns.turn_index()].id)
    }

    #[must_use]
    pub fn player_view(&self, player: PlayerId) -> Option<PlayerView> {
        let inner = self.lock();
        let p = inner.players.get(player)?;
        Some(PlayerView {
            id: p.id,
            name: p.name.to_string(),
            chips: p.chips,
            round_bet: p.round_bet,
            status: p.status,
            hand: p.hand.clone(),
            is_turn: inner.phase != GamePhase::Lobby
                && inner.phase != GamePhase::Finished
                && inner.turns.turn_index() == player,
        })
    }

    /// Hex audit token for the current hand's shuffle.
    #[must_use]
    pub fn audit_seed(&self) -> String {
        self.lock().dealer.audit_seed().to_string()
    }
}
