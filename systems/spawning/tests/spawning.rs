use std::{
    collections::hash_map::DefaultHasher,
    hash::{Hash, Hasher},
};

use turntable_board::{self as board, query, Board};
use turntable_core::{Command, Event, Phase, Point, TableInfo, UnitId, WinCosts};
use turntable_system_spawning::{Config, Spawning};

const SEED: u64 = 0x4d59_5df4_d0f3_3173;
const TURNS: usize = 40;

#[test]
fn table_instantiation_triggers_the_first_spawn() {
    let mut board = Board::new();
    let mut spawning = Spawning::new(Config::new(SEED));

    let mut events = Vec::new();
    apply(&mut board, Command::InitTable { info: table() }, &mut events);

    let mut commands = Vec::new();
    spawning.handle(&events, &mut commands);
    assert_eq!(commands.len(), 1, "one unit queued per turn");

    let command = commands[0];
    events.clear();
    apply(&mut board, command, &mut events);
    assert!(matches!(events[0], Event::UnitInstantiated { .. }));
    assert!(query::pending_unit(&board).is_some());
}

#[test]
fn deterministic_replay_produces_identical_outcomes() {
    let first = replay(SEED);
    let second = replay(SEED);

    assert_eq!(first, second, "replay diverged between runs");
    assert!(
        first.spawns.len() > 1,
        "expected the loop to progress past the opening turn"
    );

    let mut hasher = DefaultHasher::new();
    first.hash(&mut hasher);
    let mut other = DefaultHasher::new();
    second.hash(&mut other);
    assert_eq!(hasher.finish(), other.finish());
}

#[test]
fn spawned_units_always_fit_the_board() {
    let outcome = replay(SEED);
    let margin = (table().table_size() - table().field_size()) / 2;
    let margin_rows = table().table_size() - table().field_size();
    for spawn in &outcome.spawns {
        assert!(spawn.column >= margin);
        assert!(spawn.column < margin + table().field_size());
        assert!(spawn.cost <= table().max_cost());
        let distance = i32::try_from(spawn.distance).unwrap_or(i32::MAX);
        assert!(
            distance < margin_rows,
            "a longer draw would overshoot the playfield from the spawn rows"
        );
    }
}

fn table() -> TableInfo {
    TableInfo::new(0, 2, WinCosts::new(9, 10, 11), 25, 6)
}

fn replay(seed: u64) -> ReplayOutcome {
    let mut board = Board::new();
    let mut spawning = Spawning::new(Config::new(seed));
    let mut spawns = Vec::new();

    let mut events = Vec::new();
    apply(&mut board, Command::InitTable { info: table() }, &mut events);

    for _ in 0..TURNS {
        let mut commands = Vec::new();
        spawning.handle(&events, &mut commands);
        events.clear();

        let mut launch_column = None;
        for command in commands {
            if let Command::SpawnUnit {
                column,
                cost,
                distance,
            } = command
            {
                spawns.push(SpawnRecord {
                    column,
                    cost,
                    distance,
                });
                launch_column = Some(column);
            }
            apply(&mut board, command, &mut events);
        }

        let Some(column) = launch_column else {
            break;
        };
        apply(&mut board, Command::Launch { column }, &mut events);
    }

    let units = query::unit_view(&board)
        .into_vec()
        .into_iter()
        .map(|snapshot| UnitState {
            id: snapshot.id,
            cost: snapshot.cost,
            first: snapshot.first,
            second: snapshot.second,
        })
        .collect();

    ReplayOutcome {
        phase: query::phase(&board),
        units,
        spawns,
    }
}

fn apply(board: &mut Board, command: Command, out_events: &mut Vec<Event>) {
    board::apply(board, command, out_events)
        .unwrap_or_else(|error| panic!("command rejected: {error}"));
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
struct SpawnRecord {
    column: i32,
    cost: u32,
    distance: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
struct UnitState {
    id: UnitId,
    cost: u32,
    first: Point,
    second: Point,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct ReplayOutcome {
    phase: Phase,
    units: Vec<UnitState>,
    spawns: Vec<SpawnRecord>,
}
