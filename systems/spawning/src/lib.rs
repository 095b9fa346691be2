#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic spawning system responsible for queueing the next unit.
//!
//! The system consumes board events and emits one [`Command::SpawnUnit`] at
//! the start of every turn: once when the table is instantiated and once
//! after each board rotation. Column, cost, and travel distance are drawn
//! from a seeded linear congruential generator, so a replay with the same
//! seed and event stream produces the same spawns.

use turntable_core::{Command, Event, TableInfo};

const RNG_MULTIPLIER: u64 = 6_364_136_223_846_793_005;
const RNG_INCREMENT: u64 = 1;

/// Configuration parameters required to construct the spawning system.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    rng_seed: u64,
}

impl Config {
    /// Creates a new configuration using the provided seed.
    #[must_use]
    pub const fn new(rng_seed: u64) -> Self {
        Self { rng_seed }
    }
}

/// Pure system that deterministically emits unit spawn commands.
#[derive(Debug)]
pub struct Spawning {
    rng_state: u64,
    active: Option<TableInfo>,
}

impl Spawning {
    /// Creates a new spawning system using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            rng_state: config.rng_seed,
            active: None,
        }
    }

    /// Consumes board events and emits spawn commands for each turn start.
    pub fn handle(&mut self, events: &[Event], out: &mut Vec<Command>) {
        for event in events {
            match event {
                Event::TableInstantiated { info } => {
                    self.active = Some(*info);
                    self.emit_spawn(out);
                }
                Event::BoardRotated { .. } => self.emit_spawn(out),
                Event::GameOver | Event::GameWon => self.active = None,
                _ => {}
            }
        }
    }

    fn emit_spawn(&mut self, out: &mut Vec<Command>) {
        let Some(info) = self.active else {
            return;
        };

        let margin = (info.table_size() - info.field_size()) / 2;
        let column = margin + self.roll_i32(info.field_size());

        let cost_span = info.max_cost().saturating_sub(info.min_cost()) + 1;
        let cost = info.min_cost() + self.roll_u32(cost_span);

        // The longest draw lands the unit's top cell on the highest playfield
        // row; one step more would settle it in the overflow zone.
        let distance_span = info.table_size() - info.field_size() - margin;
        let distance = margin + self.roll_i32(distance_span);
        let distance = u32::try_from(distance).unwrap_or(0);

        out.push(Command::SpawnUnit {
            column,
            cost,
            distance,
        });
    }

    fn roll_i32(&mut self, span: i32) -> i32 {
        if span <= 0 {
            return 0;
        }
        let value = self.advance_rng() % span as u64;
        value as i32
    }

    fn roll_u32(&mut self, span: u32) -> u32 {
        if span == 0 {
            return 0;
        }
        let value = self.advance_rng() % u64::from(span);
        value as u32
    }

    fn advance_rng(&mut self) -> u64 {
        self.rng_state = self
            .rng_state
            .wrapping_mul(RNG_MULTIPLIER)
            .wrapping_add(RNG_INCREMENT);
        self.rng_state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use turntable_core::{Direction, WinCosts};

    fn info() -> TableInfo {
        TableInfo::new(0, 2, WinCosts::new(9, 10, 11), 25, 6)
    }

    #[test]
    fn emits_nothing_without_an_active_table() {
        let mut spawning = Spawning::new(Config::new(7));
        let mut commands = Vec::new();
        spawning.handle(
            &[Event::BoardRotated {
                facing: Direction::Right,
            }],
            &mut commands,
        );
        assert!(commands.is_empty());
    }

    #[test]
    fn spawn_parameters_stay_inside_their_bands() {
        let mut spawning = Spawning::new(Config::new(0x4d59_5df4_d0f3_3173));
        let mut commands = Vec::new();
        spawning.handle(&[Event::TableInstantiated { info: info() }], &mut commands);
        for _ in 0..64 {
            spawning.handle(
                &[Event::BoardRotated {
                    facing: Direction::Right,
                }],
                &mut commands,
            );
        }

        let table = info();
        let margin = (table.table_size() - table.field_size()) / 2;
        assert_eq!(commands.len(), 65);
        for command in &commands {
            match command {
                Command::SpawnUnit {
                    column,
                    cost,
                    distance,
                } => {
                    assert!(*column >= margin && *column < margin + table.field_size());
                    assert!(*cost >= table.min_cost() && *cost <= table.max_cost());
                    let distance = i32::try_from(*distance).unwrap_or(i32::MAX);
                    assert!(distance >= margin);
                    assert!(distance < table.table_size() - table.field_size());
                }
                other => panic!("unexpected command emitted: {other:?}"),
            }
        }
    }

    #[test]
    fn identical_seeds_produce_identical_spawns() {
        let events = [Event::TableInstantiated { info: info() }];
        let mut first = Vec::new();
        let mut second = Vec::new();
        Spawning::new(Config::new(99)).handle(&events, &mut first);
        Spawning::new(Config::new(99)).handle(&events, &mut second);
        assert_eq!(first, second);
    }

    #[test]
    fn game_end_stops_further_spawns() {
        let mut spawning = Spawning::new(Config::new(3));
        let mut commands = Vec::new();
        spawning.handle(&[Event::TableInstantiated { info: info() }], &mut commands);
        spawning.handle(&[Event::GameOver], &mut commands);
        spawning.handle(
            &[Event::BoardRotated {
                facing: Direction::Right,
            }],
            &mut commands,
        );
        assert_eq!(commands.len(), 1, "no spawns after the game ended");
    }
}
