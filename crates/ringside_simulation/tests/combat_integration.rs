//! Combat integration tests
//!
//! Full SimulationPlugin, headless, fixed 60 Hz ticks:
//! - Two controller-driven opponents box for 1000 ticks
//! - Defeat fires exactly once and hands the opponent off
//! - Tracked hand motion → contact → resolved strike → health
//! - Defensive paths: guard break, dodge, knockdown, stun, evasive expiry

use bevy::prelude::*;
use ringside_simulation::ai::{
    ControllerDisabled, FighterAttacking, OpponentBrain, OpponentTarget, OpponentTraits, TargetSignals,
};
use ringside_simulation::combat::ComboState;
use ringside_simulation::*;

/// Events seen in FixedPostUpdate (after every simulation set ran).
#[derive(Resource, Default)]
struct Seen {
    attacks: usize,
    resolved: Vec<StrikeResolved>,
    defeated: Vec<FighterDefeated>,
}

fn record(
    mut seen: ResMut<Seen>,
    mut attacking: EventReader<FighterAttacking>,
    mut resolved: EventReader<StrikeResolved>,
    mut defeated: EventReader<FighterDefeated>,
) {
    seen.attacks += attacking.read().count();
    seen.resolved.extend(resolved.read().cloned());
    seen.defeated.extend(defeated.read().copied());
}

fn create_combat_app(seed: u64) -> App {
    let mut app = create_headless_app(seed);
    app.add_plugins(SimulationPlugin)
        .init_resource::<Seen>()
        .add_systems(FixedPostUpdate, record);
    app
}

fn spawn_opponent_pair(app: &mut App) -> (Entity, Entity) {
    let config = MatchConfig::default();
    let red = app
        .world_mut()
        .spawn(opponent_bundle(&config, Vec3::new(0.0, 0.0, 0.7), None))
        .id();
    let blue = app
        .world_mut()
        .spawn(opponent_bundle(&config, Vec3::new(0.0, 0.0, -0.7), Some(red)))
        .id();
    app.world_mut()
        .entity_mut(red)
        .insert(OpponentTarget { target: Some(blue) });
    (red, blue)
}

fn check_invariants(app: &App, fighter: Entity, tick: usize) {
    let world = app.world();
    let health = world.get::<Health>(fighter).expect("fighter has Health");
    let stamina = world.get::<Stamina>(fighter).expect("fighter has Stamina");

    assert!(health.current <= health.max, "tick {}: health {:?}", tick, health);
    assert!(stamina.current <= stamina.max, "tick {}: stamina {:?}", tick, stamina);

    let state = world.get::<OpponentState>(fighter).expect("fighter has OpponentState");
    if health.current == 0 {
        assert_eq!(*state, OpponentState::Defeated, "tick {}", tick);
    }
}

#[test]
fn test_two_opponents_box_1000_ticks() {
    let mut app = create_combat_app(42);
    let (red, blue) = spawn_opponent_pair(&mut app);

    for tick in 0..1000 {
        run_ticks(&mut app, 1);
        if tick % 50 == 0 {
            check_invariants(&app, red, tick);
            check_invariants(&app, blue, tick);
        }
    }

    let seen = app.world().resource::<Seen>();
    assert!(seen.attacks > 0, "nobody threw a punch in 1000 ticks");

    for event in &seen.resolved {
        assert!(event.target == red || event.target == blue);
        assert_ne!(event.target, event.source);
    }

    // Each fighter is defeated at most once
    for fighter in [red, blue] {
        let count = seen.defeated.iter().filter(|d| d.fighter == fighter).count();
        assert!(count <= 1, "{:?} defeated {} times", fighter, count);
    }
}

#[test]
fn test_defeat_fires_once_and_hands_off() {
    let mut app = create_combat_app(7);
    let config = MatchConfig::default();
    let opponent = app
        .world_mut()
        .spawn(opponent_bundle(&config, Vec3::ZERO, None))
        .id();

    run_ticks(&mut app, 1);

    let blow = TakeDamage {
        target: opponent,
        attacker: None,
        amount: 60,
        direction: Vec3::Z,
        is_counter: false,
        pre_mitigated: true,
        guard_broken: false,
    };

    // Two lethal-enough blows in one tick, a third one later
    app.world_mut().send_event(blow.clone());
    app.world_mut().send_event(blow.clone());
    run_ticks(&mut app, 1);
    app.world_mut().send_event(blow);
    run_ticks(&mut app, 1);

    {
        let world = app.world();
        assert_eq!(world.get::<Health>(opponent).map(|h| h.current), Some(0));
        assert_eq!(world.get::<OpponentState>(opponent), Some(&OpponentState::Defeated));
        assert!(world.get::<Defeated>(opponent).is_some());
        assert!(world.get::<ControllerDisabled>(opponent).is_none());
        assert_eq!(world.resource::<Seen>().defeated.len(), 1);
    }

    // Hand-off after the configured delay
    let handoff_ticks = (config.opponent.defeat_handoff_delay * TICK_HZ as f32).ceil() as usize;
    run_ticks(&mut app, handoff_ticks + 2);

    let world = app.world();
    assert!(world.get::<ControllerDisabled>(opponent).is_some());
    assert_eq!(world.get::<OpponentState>(opponent), Some(&OpponentState::Defeated));
    assert_eq!(world.resource::<Seen>().defeated.len(), 1);
}

/// Hand swinging along +Z at 6 m/s toward a fighter standing at the origin.
struct HandDrill {
    app: App,
    target: Entity,
    hand: Entity,
    position: Vec3,
}

impl HandDrill {
    const STEP: f32 = 0.1;

    fn new() -> Self {
        let mut app = create_combat_app(3);
        let config = MatchConfig::default();

        // Facing -Z, toward the incoming hand
        let target = app
            .world_mut()
            .spawn(player_bundle(&config, Transform::default()))
            .id();
        let striker = app
            .world_mut()
            .spawn(player_bundle(&config, Transform::from_xyz(0.0, 0.0, -1.5)))
            .id();

        let position = Vec3::new(0.0, 1.65, -1.0);
        let hand = app.world_mut().spawn(hand_bundle(&config, striker, position)).id();

        run_ticks(&mut app, 1);
        Self {
            app,
            target,
            hand,
            position,
        }
    }

    fn advance(&mut self, ticks: usize) {
        for _ in 0..ticks {
            self.position.z += Self::STEP;
            let position = self.position;
            if let Some(mut transform) = self.app.world_mut().get_mut::<Transform>(self.hand) {
                transform.translation = position;
            }
            run_ticks(&mut self.app, 1);
        }
    }

    fn contact(&mut self) {
        let event = HandContact {
            hand: self.hand,
            target: self.target,
            point: Vec3::new(0.0, 1.65, -0.2),
        };
        self.app.world_mut().send_event(event);
        self.advance(1);
    }
}

#[test]
fn test_hand_swing_lands_on_head() {
    let mut drill = HandDrill::new();
    drill.advance(6);

    let detector = drill.app.world().get::<StrikeDetector>(drill.hand).expect("hand");
    assert!(detector.average_speed() > 5.5);

    drill.contact();

    let world = drill.app.world();
    let seen = world.resource::<Seen>();
    assert_eq!(seen.resolved.len(), 1);

    let resolved = &seen.resolved[0];
    assert_eq!(resolved.source, drill.hand);
    assert_eq!(resolved.outcome.zone, "head");
    // 6 m/s → force ≈ 7.2, heavy tier, head ×1.5
    assert_eq!(resolved.outcome.kind, HitKind::Clean(SeverityTier::Heavy));
    assert_eq!(resolved.outcome.damage, 11);
    assert_eq!(resolved.outcome.combo_count, 1);

    assert_eq!(world.get::<Health>(drill.target).map(|h| h.current), Some(89));
}

#[test]
fn test_contact_without_swing_is_ignored() {
    let mut drill = HandDrill::new();

    // Hand at rest
    drill.contact();

    let world = drill.app.world();
    assert!(world.resource::<Seen>().resolved.is_empty());
    assert_eq!(world.get::<Health>(drill.target).map(|h| h.current), Some(100));
}

#[test]
fn test_one_strike_per_swing() {
    let mut drill = HandDrill::new();
    drill.advance(6);

    drill.contact();
    drill.contact();
    drill.contact();

    let world = drill.app.world();
    assert_eq!(world.resource::<Seen>().resolved.len(), 1);
    assert_eq!(world.get::<Health>(drill.target).map(|h| h.current), Some(89));
}

// ============================================================================
// Defensive paths
// ============================================================================

/// In front of the face of a fighter at the origin facing -Z
const HEAD_FRONT: Vec3 = Vec3::new(0.0, 1.65, -0.2);

fn ticks_for(seconds: f32) -> usize {
    (seconds * TICK_HZ as f32).ceil() as usize
}

fn strike_head(app: &mut App, target: Entity, source: Entity, force: f32) {
    app.world_mut().send_event(StrikeRegistered {
        target,
        source,
        point: HEAD_FRONT,
        direction: Vec3::Z,
        force,
        base_damage: None,
    });
}

/// Opponent at the origin facing -Z, with no target of its own.
fn spawn_lone_opponent(app: &mut App) -> Entity {
    let config = app.world().resource::<MatchConfig>().clone();
    app.world_mut()
        .spawn(opponent_bundle(&config, Vec3::ZERO, None))
        .id()
}

/// Put `opponent` in a held block, as a Block decision does.
fn raise_guard(app: &mut App, opponent: Entity, hold: f32) {
    let mut tasks = TimedTasks::default();
    tasks.schedule(TaskKind::BlockEnd, hold);
    app.world_mut().entity_mut(opponent).insert((
        OpponentState::Blocking,
        DefenseState {
            blocking: true,
            ..Default::default()
        },
        tasks,
    ));
}

fn state_of(app: &App, entity: Entity) -> OpponentState {
    app.world()
        .get::<OpponentState>(entity)
        .copied()
        .expect("opponent has OpponentState")
}

fn defense_of(app: &App, entity: Entity) -> DefenseState {
    app.world()
        .get::<DefenseState>(entity)
        .copied()
        .expect("fighter has DefenseState")
}

#[test]
fn test_guard_break_releases_the_blocker() {
    let mut app = create_combat_app(11);
    let blocker = spawn_lone_opponent(&mut app);
    let striker = app.world_mut().spawn_empty().id();
    run_ticks(&mut app, 1);

    raise_guard(&mut app, blocker, 5.0);
    run_ticks(&mut app, 1);

    strike_head(&mut app, blocker, striker, 8.0);
    run_ticks(&mut app, 1);

    let seen = app.world().resource::<Seen>();
    assert_eq!(seen.resolved.len(), 1);
    assert_eq!(seen.resolved[0].outcome.kind, HitKind::GuardBreak);

    // Guard dropped and the opponent is free to decide again
    let defense = defense_of(&app, blocker);
    assert!(!defense.blocking);
    assert!(defense.vulnerable);
    assert!(!defense.stunned); // A broken guard is not an open guard
    assert_eq!(state_of(&app, blocker), OpponentState::Circling);
    assert!(!state_of(&app, blocker).is_busy());

    // 8 × 1.5 × 0.2
    assert_eq!(app.world().get::<Health>(blocker).map(|h| h.current), Some(98));

    // Vulnerability window closes on its own
    run_ticks(&mut app, ticks_for(1.5) + 2);
    assert!(!defense_of(&app, blocker).vulnerable);
    assert_eq!(state_of(&app, blocker), OpponentState::Circling);
}

#[test]
fn test_guard_break_invites_a_counter_attack() {
    let mut app = create_combat_app(12);
    let config = MatchConfig::default();

    let blocker = app
        .world_mut()
        .spawn(opponent_bundle(&config, Vec3::ZERO, None))
        .id();
    let counter_puncher = app
        .world_mut()
        .spawn(opponent_bundle(&config, Vec3::new(0.0, 0.0, -1.4), Some(blocker)))
        .id();

    // Blocker faces its puncher and never acts on its own
    app.world_mut().entity_mut(blocker).insert((
        OpponentTarget {
            target: Some(counter_puncher),
        },
        ControllerDisabled,
    ));

    // Counter-puncher only ever attacks through the counter-attack branch
    let counter_config = OpponentConfig {
        difficulty: 1.0,
        ..config.opponent.clone()
    };
    app.world_mut().entity_mut(counter_puncher).insert((
        counter_config,
        OpponentTraits::fixed(0.0, 0.5),
        OpponentBrain {
            decision_timer: 1000.0,
            ..Default::default()
        },
    ));

    run_ticks(&mut app, 1);
    raise_guard(&mut app, blocker, 5.0);
    run_ticks(&mut app, 1);

    strike_head(&mut app, blocker, counter_puncher, 8.0);
    run_ticks(&mut app, 2);

    // VulnerabilityOpened → TargetVulnerable
    let signals = *app
        .world()
        .get::<TargetSignals>(counter_puncher)
        .expect("opponent has TargetSignals");
    assert!(signals.target_vulnerable);
    assert!(!signals.target_attacking);
    assert_eq!(state_of(&app, counter_puncher), OpponentState::Circling);

    if let Some(mut brain) = app.world_mut().get_mut::<OpponentBrain>(counter_puncher) {
        brain.decision_timer = 0.0;
    }
    run_ticks(&mut app, 1);

    assert_eq!(state_of(&app, counter_puncher), OpponentState::Attacking);
    assert!(app.world().resource::<Seen>().attacks >= 1);
}

#[test]
fn test_dodged_strike_has_no_effect() {
    let mut app = create_combat_app(13);
    let mut config = MatchConfig::default();
    config.thresholds.knockdown_chance = 1.0;
    app.insert_resource(config);

    let dodger = spawn_lone_opponent(&mut app);
    let striker = app.world_mut().spawn_empty().id();
    run_ticks(&mut app, 1);

    let mut tasks = TimedTasks::default();
    tasks.schedule(TaskKind::DodgeEnd, 0.4);
    app.world_mut().entity_mut(dodger).insert((
        OpponentState::Dodging,
        DefenseState {
            dodging: true,
            ..Default::default()
        },
        tasks,
    ));

    strike_head(&mut app, dodger, striker, 12.0);
    run_ticks(&mut app, 1);

    let world = app.world();
    assert!(world.resource::<Seen>().resolved.is_empty());
    assert!(world.get::<KnockedDown>(dodger).is_none());
    assert_eq!(world.get::<Health>(dodger).map(|h| h.current), Some(100));
    assert_eq!(world.get::<ComboState>(dodger).map(|c| c.count), Some(0));

    // The zone cooldown was not spent: the same blow lands once the dodge is over
    run_ticks(&mut app, ticks_for(0.4) + 1);
    assert_eq!(state_of(&app, dodger), OpponentState::Circling);
    strike_head(&mut app, dodger, striker, 12.0);
    run_ticks(&mut app, 1);

    let world = app.world();
    assert_eq!(world.resource::<Seen>().resolved.len(), 1);
    assert!(world.get::<KnockedDown>(dodger).is_some());
}

#[test]
fn test_knockdown_recovery_ends_in_retreat() {
    let mut app = create_combat_app(14);
    let mut config = MatchConfig::default();
    config.thresholds.knockdown_chance = 1.0;
    let knockdown_duration = config.thresholds.knockdown_duration;
    app.insert_resource(config);

    let opponent = spawn_lone_opponent(&mut app);
    let striker = app.world_mut().spawn_empty().id();
    run_ticks(&mut app, 1);

    strike_head(&mut app, opponent, striker, 12.0);
    run_ticks(&mut app, 1);

    {
        let world = app.world();
        let resolved = &world.resource::<Seen>().resolved;
        assert_eq!(resolved.len(), 1);
        assert!(resolved[0].outcome.knockdown);
        assert!(world.get::<KnockedDown>(opponent).is_some());
        assert_eq!(world.get::<MovementCommand>(opponent), Some(&MovementCommand::Stop));
        assert_eq!(world.get::<Health>(opponent).map(|h| h.current), Some(82));
    }

    // Still down just before the recovery
    run_ticks(&mut app, ticks_for(knockdown_duration) - 10);
    assert!(app.world().get::<KnockedDown>(opponent).is_some());

    // KnockdownEnd → ForceRetreat → Retreating
    run_ticks(&mut app, 12);
    assert!(app.world().get::<KnockedDown>(opponent).is_none());
    assert_eq!(state_of(&app, opponent), OpponentState::Retreating);
    assert!(!defense_of(&app, opponent).stunned);
}

#[test]
fn test_stun_wears_off_into_retreat() {
    let mut app = create_combat_app(15);
    let opponent = spawn_lone_opponent(&mut app);
    run_ticks(&mut app, 1);

    // Counter hit of 70: stun chance 0.7 × 1.5, capped at certain
    app.world_mut().send_event(TakeDamage {
        target: opponent,
        attacker: None,
        amount: 70,
        direction: Vec3::Z,
        is_counter: true,
        pre_mitigated: false,
        guard_broken: false,
    });
    run_ticks(&mut app, 1);

    assert_eq!(state_of(&app, opponent), OpponentState::Stunned);
    assert!(defense_of(&app, opponent).stunned);
    assert_eq!(app.world().get::<Health>(opponent).map(|h| h.current), Some(30));

    let stun = app
        .world()
        .get::<TimedTasks>(opponent)
        .and_then(|tasks| tasks.remaining(TaskKind::StunEnd))
        .expect("stun recovery scheduled");
    run_ticks(&mut app, ticks_for(stun) + 2);

    assert_eq!(state_of(&app, opponent), OpponentState::Retreating);
    assert!(!defense_of(&app, opponent).stunned);
}

#[test]
fn test_guard_break_blow_never_stuns() {
    let mut app = create_combat_app(18);
    let opponent = spawn_lone_opponent(&mut app);
    run_ticks(&mut app, 1);

    // A certain stun on an open guard
    app.world_mut().send_event(TakeDamage {
        target: opponent,
        attacker: None,
        amount: 70,
        direction: Vec3::Z,
        is_counter: true,
        pre_mitigated: true,
        guard_broken: true,
    });
    run_ticks(&mut app, 1);

    assert_eq!(app.world().get::<Health>(opponent).map(|h| h.current), Some(30));
    assert!(!defense_of(&app, opponent).stunned);
    assert_eq!(state_of(&app, opponent), OpponentState::Circling);
}

/// Opponent watching a sparring partner, reacting to every swing it is told about.
fn spawn_evasive_opponent(app: &mut App, block_weight: f32) -> Entity {
    let config = MatchConfig::default();
    let partner = app
        .world_mut()
        .spawn(player_bundle(&config, Transform::from_xyz(0.0, 0.0, -1.4)))
        .id();
    let opponent = app
        .world_mut()
        .spawn(opponent_bundle(&config, Vec3::ZERO, Some(partner)))
        .id();

    // No attacks, no approaches: a free decision always circles
    let tuning = OpponentConfig {
        difficulty: 1.0,
        block_weight,
        approach_band: 0.0,
        target_attacking_window: 0.2,
        ..config.opponent.clone()
    };
    app.world_mut().entity_mut(opponent).insert((
        tuning,
        OpponentTraits::fixed(0.0, 0.5),
        OpponentBrain {
            decision_timer: 1000.0,
            ..Default::default()
        },
    ));

    run_ticks(app, 1);
    app.world_mut()
        .send_event(OpponentNotification::TargetAttacking { opponent });
    if let Some(mut brain) = app.world_mut().get_mut::<OpponentBrain>(opponent) {
        brain.decision_timer = 0.0;
    }
    run_ticks(app, 1);
    opponent
}

#[test]
fn test_evasive_block_expires_into_circling() {
    let mut app = create_combat_app(16);
    let opponent = spawn_evasive_opponent(&mut app, 1.0);

    assert_eq!(state_of(&app, opponent), OpponentState::Blocking);
    assert!(defense_of(&app, opponent).blocking);

    // Hold time at defensiveness 0.5
    let hold = OpponentConfig::default().block_hold_time(0.5);
    run_ticks(&mut app, ticks_for(hold) + 2);

    assert!(!defense_of(&app, opponent).blocking);
    assert_eq!(state_of(&app, opponent), OpponentState::Circling);
}

#[test]
fn test_evasive_dodge_expires_into_circling() {
    let mut app = create_combat_app(17);
    let opponent = spawn_evasive_opponent(&mut app, 0.0);

    assert_eq!(state_of(&app, opponent), OpponentState::Dodging);
    assert!(defense_of(&app, opponent).dodging);
    let stamina = app.world().get::<Stamina>(opponent).map(|s| s.current);
    assert!(stamina.is_some_and(|s| s < 100), "dodge is paid for: {:?}", stamina);

    run_ticks(&mut app, ticks_for(OpponentConfig::default().dodge_duration) + 2);

    assert!(!defense_of(&app, opponent).dodging);
    assert_eq!(state_of(&app, opponent), OpponentState::Circling);
}
