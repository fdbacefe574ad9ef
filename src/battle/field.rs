//! The battlefield: one battle session and its visual playback

use std::collections::HashMap;
use std::sync::Arc;

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::report::{BattleNotice, BattleReport, CasualtySummary, roll_item_loot};
use super::timeline::{Timeline, interpolate_army};
use super::{BattleOutcome, BattlePhase, BattleType, WorldHooks};
use crate::army::{ArmyStack, Side, StackId, StackIdAllocator, prune_dead, total_count};
use crate::consts::{ARENA_HEIGHT, ARENA_WIDTH, FRAME_DT, MAX_SUBSTEPS};
use crate::error::{BattleError, Result};
use crate::factions::{FactionId, TerritoryRef};
use crate::settings::Settings;
use crate::sim::{CombatLogEntry, Resolution, generate_enemy_garrison, resolve};
use crate::units::UnitRegistry;
use crate::visual::{TeamColors, VisualSim};

/// Player deployment band (normalized)
pub const PLAYER_DEPLOY_MIN: Vec2 = Vec2::new(0.05, 0.55);
pub const PLAYER_DEPLOY_MAX: Vec2 = Vec2::new(0.95, 0.95);

/// Salt separating the visual rng stream from the battle rng
const VISUAL_SEED_SALT: u64 = 0x9e37_79b9_7f4a_7c15;

/// State of the battle currently on the field
#[derive(Debug)]
pub struct BattleSession {
    pub territory: TerritoryRef,
    pub battle_type: BattleType,
    pub phase: BattlePhase,
    pub outcome: BattleOutcome,
    pub initial_player: Vec<ArmyStack>,
    pub initial_enemy: Vec<ArmyStack>,
    /// Visible armies; interpolated while the timeline plays
    pub player: Vec<ArmyStack>,
    pub enemy: Vec<ArmyStack>,
    /// Normalized deployment coordinates per stack
    pub positions: HashMap<StackId, Vec2>,
    pub timeline: Timeline,
    pub log: Vec<CombatLogEntry>,
    pub report: Option<BattleReport>,
    resolution: Option<Resolution>,
    rng: Pcg32,
}

impl BattleSession {
    pub fn resolution(&self) -> Option<&Resolution> {
        self.resolution.as_ref()
    }

    pub fn position(&self, id: StackId) -> Option<Vec2> {
        self.positions.get(&id).copied()
    }
}

/// Owner of the battle lifecycle.
///
/// All mutation goes through `&mut self`, so a session can never be touched
/// by two callers at once.
pub struct Battlefield {
    registry: Arc<UnitRegistry>,
    settings: Settings,
    session: Option<BattleSession>,
    visual: VisualSim,
    paused: bool,
    accumulator: f32,
}

impl Battlefield {
    pub fn new(registry: Arc<UnitRegistry>, settings: Settings) -> Self {
        let colors = TeamColors {
            player: FactionId::Player.color(),
            enemy: FactionId::PeasantVillages.color(),
        };
        let mut visual = VisualSim::new(ARENA_WIDTH, ARENA_HEIGHT, colors, 0);
        visual.configure(&settings);
        Self {
            registry,
            settings,
            session: None,
            visual,
            paused: false,
            accumulator: 0.0,
        }
    }

    pub fn registry(&self) -> &UnitRegistry {
        &self.registry
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn set_settings(&mut self, settings: Settings) {
        self.visual.configure(&settings);
        self.settings = settings;
    }

    pub fn session(&self) -> Option<&BattleSession> {
        self.session.as_ref()
    }

    pub fn phase(&self) -> Option<BattlePhase> {
        self.session.as_ref().map(|s| s.phase)
    }

    pub fn visual(&self) -> &VisualSim {
        &self.visual
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Freeze or resume both the timeline and the visual simulation
    pub fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
        self.accumulator = 0.0;
    }

    /// Open a battle over `territory` with a copy of the player's roster.
    ///
    /// Generates the defending garrison and default deployment positions.
    pub fn init_battle(
        &mut self,
        roster: &[ArmyStack],
        territory: TerritoryRef,
        battle_type: BattleType,
        seed: u64,
    ) -> Result<()> {
        if self
            .session
            .as_ref()
            .is_some_and(|s| s.phase != BattlePhase::Results)
        {
            return Err(BattleError::BattleInProgress);
        }

        let mut player = roster.to_vec();
        prune_dead(&mut player);
        if player.is_empty() {
            return Err(BattleError::NoPlayerArmy);
        }
        if let Some(unknown) = player.iter().find(|s| !self.registry.contains(&s.def_id)) {
            return Err(BattleError::UnknownUnit(unknown.def_id.clone()));
        }

        let mut rng = Pcg32::seed_from_u64(seed);
        let mut ids = StackIdAllocator::after(&player);
        let enemy = generate_enemy_garrison(territory.faction, territory.tier, &self.registry, &mut ids, &mut rng);

        let mut positions = HashMap::new();
        default_deployment(&player, 0.65, &mut positions, &mut rng);
        default_deployment(&enemy, 0.1, &mut positions, &mut rng);

        log::info!(
            "Battle at {} ({:?}): {} player units vs {} defenders",
            territory.name,
            battle_type,
            total_count(&player),
            total_count(&enemy)
        );

        let colors = TeamColors {
            player: FactionId::Player.color(),
            enemy: territory.faction.color(),
        };
        self.visual = VisualSim::new(ARENA_WIDTH, ARENA_HEIGHT, colors, seed ^ VISUAL_SEED_SALT);
        self.visual.configure(&self.settings);
        self.paused = false;
        self.accumulator = 0.0;

        let log = vec![CombatLogEntry::info(
            0,
            format!("Battle started at {}! Deploy your forces.", territory.name),
        )];
        self.session = Some(BattleSession {
            territory,
            battle_type,
            phase: BattlePhase::Deployment,
            outcome: BattleOutcome::None,
            initial_player: player.clone(),
            initial_enemy: enemy.clone(),
            player,
            enemy,
            positions,
            timeline: Timeline::default(),
            log,
            report: None,
            resolution: None,
            rng,
        });
        Ok(())
    }

    /// Move a player stack during deployment. Coordinates are clamped to the
    /// player's band.
    pub fn update_deployment_position(&mut self, id: StackId, x: f32, y: f32) -> Result<()> {
        let session = self.session.as_mut().ok_or(BattleError::NoActiveBattle)?;
        require_phase(session, BattlePhase::Deployment)?;
        if !session.player.iter().any(|s| s.id == id) {
            log::warn!("Ignoring deployment move for unknown stack {}", id);
            return Err(BattleError::UnknownStack(id));
        }
        let pos = Vec2::new(x, y).clamp(PLAYER_DEPLOY_MIN, PLAYER_DEPLOY_MAX);
        session.positions.insert(id, pos);
        Ok(())
    }

    /// Resolve the battle and start the playback.
    pub fn start_battle(&mut self) -> Result<()> {
        let session = self.session.as_mut().ok_or(BattleError::NoActiveBattle)?;
        require_phase(session, BattlePhase::Deployment)?;

        let resolution = resolve(&session.player, &session.enemy, &self.registry, &mut session.rng)?;
        log::info!(
            "Battle resolved in {} rounds ({:?}); {:?} wins",
            resolution.rounds,
            resolution.termination,
            resolution.winner
        );

        self.visual
            .seed(&session.player, &session.enemy, &session.positions, &self.registry);
        session.log.extend(resolution.log.iter().cloned());
        session.resolution = Some(resolution);
        session.phase = BattlePhase::Combat;
        session.timeline = Timeline::default();
        self.accumulator = 0.0;
        Ok(())
    }

    /// Advance playback by `dt` seconds in fixed frames.
    ///
    /// Returns the report on the frame the timeline completes. Does nothing
    /// while paused or during deployment.
    pub fn advance(&mut self, dt: f32, hooks: &mut dyn WorldHooks) -> Option<BattleReport> {
        if self.paused {
            return None;
        }
        let phase = self.phase()?;
        if phase == BattlePhase::Deployment {
            return None;
        }

        self.accumulator += dt.clamp(0.0, 0.1);
        let mut finished = None;
        let mut substeps = 0;
        while self.accumulator >= FRAME_DT && substeps < MAX_SUBSTEPS {
            self.accumulator -= FRAME_DT;
            substeps += 1;
            if let Some(report) = self.step_frame(hooks) {
                finished = Some(report);
            }
        }
        finished
    }

    fn step_frame(&mut self, hooks: &mut dyn WorldHooks) -> Option<BattleReport> {
        let session = self.session.as_mut()?;

        let mut report = None;
        if session.phase == BattlePhase::Combat {
            session.timeline.advance(FRAME_DT);
            if !session.timeline.in_march() {
                if let Some(resolution) = &session.resolution {
                    let progress = session.timeline.progress();
                    session.player = interpolate_army(&session.initial_player, &resolution.player, progress, &self.registry);
                    session.enemy = interpolate_army(&session.initial_enemy, &resolution.enemy, progress, &self.registry);
                }
            }
            if session.timeline.is_complete() {
                report = finish_battle(session, hooks);
            }
        }

        self.visual.step(&session.player, &session.enemy);
        report
    }

    /// Leave the field before the timeline completes.
    ///
    /// The roster keeps the casualties taken so far. The session is removed.
    pub fn retreat(&mut self) -> Result<BattleReport> {
        let session = self.session.as_ref().ok_or(BattleError::NoActiveBattle)?;
        if session.phase == BattlePhase::Results {
            return Err(BattleError::WrongPhase {
                expected: BattlePhase::Combat,
                actual: session.phase,
            });
        }

        let mut roster = session.player.clone();
        prune_dead(&mut roster);
        let report = BattleReport {
            outcome: BattleOutcome::Retreat,
            battle_type: session.battle_type,
            territory_id: session.territory.id.clone(),
            player_casualties: CasualtySummary::between(&session.initial_player, &roster),
            enemy_casualties: CasualtySummary::between(&session.initial_enemy, &session.enemy),
            roster,
            loot: Vec::new(),
            items: Vec::new(),
            notice: BattleNotice::Retreated,
            rounds: 0,
            log: session.log.clone(),
        };
        log::info!("{} ({} units kept)", report.notice.message(), total_count(&report.roster));

        self.session = None;
        self.visual.clear();
        self.paused = false;
        Ok(report)
    }

    /// Tear down the session, returning its report if the battle finished.
    ///
    /// Refused during combat; `retreat` is the only way off a running field.
    pub fn close_battle(&mut self) -> Result<Option<BattleReport>> {
        if let Some(session) = &self.session {
            if session.phase == BattlePhase::Combat {
                return Err(BattleError::WrongPhase {
                    expected: BattlePhase::Results,
                    actual: session.phase,
                });
            }
        }
        self.visual.clear();
        self.paused = false;
        self.accumulator = 0.0;
        Ok(self.session.take().and_then(|s| s.report))
    }
}

fn require_phase(session: &BattleSession, expected: BattlePhase) -> Result<()> {
    if session.phase == expected {
        Ok(())
    } else {
        Err(BattleError::WrongPhase {
            expected,
            actual: session.phase,
        })
    }
}

/// Spread stacks across the width; `base_y` is the top of the side's band
fn default_deployment<R: Rng + ?Sized>(
    army: &[ArmyStack],
    base_y: f32,
    positions: &mut HashMap<StackId, Vec2>,
    rng: &mut R,
) {
    let n = army.len().max(1) as f32;
    for (i, stack) in army.iter().enumerate() {
        let x = 0.1 + (i as f32 / n) * 0.8 + rng.random_range(0.0..0.05);
        let y = base_y + rng.random_range(0.0..0.2);
        positions.insert(stack.id, Vec2::new(x, y));
    }
}

/// Swap in the resolved armies and build the report
fn finish_battle(session: &mut BattleSession, hooks: &mut dyn WorldHooks) -> Option<BattleReport> {
    let resolution = session.resolution.as_ref()?;
    session.player = resolution.player.clone();
    session.enemy = resolution.enemy.clone();
    session.phase = BattlePhase::Results;

    let mut loot = Vec::new();
    let mut items = Vec::new();
    let (outcome, notice, roster) = match resolution.winner {
        Side::Player => {
            loot.push(match session.battle_type {
                BattleType::Conquer => hooks.conquer(&session.territory.id),
                BattleType::Raid => hooks.raid(&session.territory.id),
            });
            if let Some(item) = roll_item_loot(&mut session.rng) {
                loot.push(format!("Looted Item: {item}"));
                items.push(item.to_string());
            }
            (BattleOutcome::Victory, BattleNotice::Victory, resolution.player.clone())
        }
        Side::Enemy => (BattleOutcome::Defeat, BattleNotice::ArmyAnnihilated, Vec::new()),
    };
    session.outcome = outcome;

    let report = BattleReport {
        outcome,
        battle_type: session.battle_type,
        territory_id: session.territory.id.clone(),
        player_casualties: CasualtySummary::between(&session.initial_player, &resolution.player),
        enemy_casualties: CasualtySummary::between(&session.initial_enemy, &resolution.enemy),
        roster,
        loot,
        items,
        notice,
        rounds: resolution.rounds,
        log: session.log.clone(),
    };
    log::info!(
        "Battle at {} ended: {:?}, {} player losses, {} enemy losses",
        session.territory.name,
        outcome,
        report.player_casualties.lost,
        report.enemy_casualties.lost
    );
    session.report = Some(report.clone());
    Some(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::factions::TerritoryTier;
    use crate::settings::QualityPreset;
    use crate::sim::Termination;

    #[derive(Default)]
    struct RecordingWorld {
        conquered: Vec<String>,
        raided: Vec<String>,
    }

    impl WorldHooks for RecordingWorld {
        fn conquer(&mut self, territory_id: &str) -> String {
            self.conquered.push(territory_id.to_string());
            format!("Claimed {territory_id}")
        }

        fn raid(&mut self, territory_id: &str) -> String {
            self.raided.push(territory_id.to_string());
            format!("Raided {territory_id}")
        }
    }

    fn field() -> Battlefield {
        Battlefield::new(
            Arc::new(UnitRegistry::standard()),
            Settings::from_preset(QualityPreset::Low),
        )
    }

    fn territory(faction: FactionId, tier: TerritoryTier) -> TerritoryRef {
        TerritoryRef {
            id: "t-7".into(),
            name: "Ashfall".into(),
            faction,
            tier,
        }
    }

    fn strong_roster(registry: &UnitRegistry) -> Vec<ArmyStack> {
        vec![
            ArmyStack::from_registry(StackId(1), "bone_dragon", 3, registry).unwrap(),
            ArmyStack::from_registry(StackId(2), "skeleton_warrior", 200, registry).unwrap(),
        ]
    }

    /// Run the timeline to completion in 0.1 s slices
    fn play_out(field: &mut Battlefield, world: &mut RecordingWorld) -> BattleReport {
        for _ in 0..400 {
            if let Some(report) = field.advance(0.1, world) {
                return report;
            }
        }
        panic!("timeline never completed");
    }

    #[test]
    fn test_init_rejects_empty_roster() {
        let mut field = field();
        let err = field.init_battle(&[], territory(FactionId::PeasantVillages, TerritoryTier::Outpost), BattleType::Raid, 1);
        assert_eq!(err, Err(BattleError::NoPlayerArmy));
        assert_eq!(err.unwrap_err().to_string(), "No army to command.");
        assert!(field.session().is_none());

        let dead = vec![ArmyStack::new(StackId(1), "zombie", 0, 18.0)];
        assert_eq!(
            field.init_battle(&dead, territory(FactionId::PeasantVillages, TerritoryTier::Outpost), BattleType::Raid, 1),
            Err(BattleError::NoPlayerArmy)
        );
    }

    #[test]
    fn test_init_builds_garrison_and_positions() {
        let mut field = field();
        let roster = strong_roster(field.registry());
        field
            .init_battle(&roster, territory(FactionId::HouseNecros, TerritoryTier::Established), BattleType::Conquer, 3)
            .unwrap();
        let session = field.session().unwrap();
        assert_eq!(session.phase, BattlePhase::Deployment);
        assert_eq!(session.player, roster);
        assert!(!session.enemy.is_empty());
        assert!(session.enemy.iter().all(|s| s.id.0 > 2));
        for s in &session.player {
            let p = session.position(s.id).unwrap();
            assert!((0.1..=0.95).contains(&p.x));
            assert!((0.65..=0.85).contains(&p.y));
        }
        for s in &session.enemy {
            let p = session.position(s.id).unwrap();
            assert!((0.1..=0.3).contains(&p.y));
        }
        assert!(session.log[0].message.contains("Ashfall"));

        assert_eq!(
            field.init_battle(&roster, territory(FactionId::HouseNecros, TerritoryTier::Established), BattleType::Raid, 4),
            Err(BattleError::BattleInProgress)
        );
    }

    #[test]
    fn test_deployment_moves_are_clamped_and_player_only() {
        let mut field = field();
        let roster = strong_roster(field.registry());
        field
            .init_battle(&roster, territory(FactionId::PeasantVillages, TerritoryTier::Outpost), BattleType::Raid, 5)
            .unwrap();

        field.update_deployment_position(StackId(1), -1.0, 0.1).unwrap();
        assert_eq!(field.session().unwrap().position(StackId(1)), Some(Vec2::new(0.05, 0.55)));
        field.update_deployment_position(StackId(2), 0.5, 2.0).unwrap();
        assert_eq!(field.session().unwrap().position(StackId(2)), Some(Vec2::new(0.5, 0.95)));

        let enemy_id = field.session().unwrap().enemy[0].id;
        assert_eq!(
            field.update_deployment_position(enemy_id, 0.5, 0.7),
            Err(BattleError::UnknownStack(enemy_id))
        );

        field.start_battle().unwrap();
        assert_eq!(
            field.update_deployment_position(StackId(1), 0.5, 0.7),
            Err(BattleError::WrongPhase {
                expected: BattlePhase::Deployment,
                actual: BattlePhase::Combat
            })
        );
    }

    #[test]
    fn test_victory_playback_and_report() {
        let mut field = field();
        let mut world = RecordingWorld::default();
        let roster = strong_roster(field.registry());
        field
            .init_battle(&roster, territory(FactionId::PeasantVillages, TerritoryTier::Outpost), BattleType::Conquer, 9)
            .unwrap();
        field.start_battle().unwrap();
        assert!(matches!(field.start_battle(), Err(BattleError::WrongPhase { .. })));
        assert!(field.visual().live_count(Side::Player) > 0);

        let report = play_out(&mut field, &mut world);
        assert_eq!(report.outcome, BattleOutcome::Victory);
        assert_eq!(report.notice, BattleNotice::Victory);
        assert_eq!(world.conquered, vec!["t-7".to_string()]);
        assert!(world.raided.is_empty());
        assert_eq!(report.loot[0], "Claimed t-7");
        assert_eq!(report.loot.len(), 1 + report.items.len());

        // Winner conservation
        let c = report.player_casualties;
        assert_eq!(c.lost + c.remaining, c.initial);
        assert_eq!(c.remaining, total_count(&report.roster));
        assert_eq!(report.enemy_casualties.remaining, 0);

        let session = field.session().unwrap();
        assert_eq!(session.phase, BattlePhase::Results);
        assert_eq!(session.player, report.roster);
        // Every defender particle has been killed by death sync
        assert_eq!(field.visual().live_count(Side::Enemy), 0);

        // Results keep animating without firing hooks again
        assert!(field.advance(0.1, &mut world).is_none());
        assert_eq!(world.conquered.len(), 1);

        let closed = field.close_battle().unwrap();
        assert_eq!(closed, Some(report));
        assert!(field.session().is_none());
        assert!(field.visual().particles.is_empty());
    }

    #[test]
    fn test_defeat_clears_roster() {
        let mut field = field();
        let mut world = RecordingWorld::default();
        let roster = vec![ArmyStack::from_registry(StackId(1), "zombie", 1, field.registry()).unwrap()];
        field
            .init_battle(&roster, territory(FactionId::VampireHunters, TerritoryTier::Dominion), BattleType::Raid, 2)
            .unwrap();
        field.start_battle().unwrap();
        let report = play_out(&mut field, &mut world);
        assert_eq!(report.outcome, BattleOutcome::Defeat);
        assert_eq!(report.notice.message(), "Army annihilated.");
        assert!(report.roster.is_empty());
        assert!(report.loot.is_empty());
        assert!(world.raided.is_empty() && world.conquered.is_empty());
    }

    #[test]
    fn test_retreat_keeps_current_casualties() {
        let mut field = field();
        let mut world = RecordingWorld::default();
        let roster = vec![ArmyStack::from_registry(StackId(1), "zombie", 500, field.registry()).unwrap()];
        field
            .init_battle(&roster, territory(FactionId::VampireHunters, TerritoryTier::Established), BattleType::Raid, 6)
            .unwrap();
        field.start_battle().unwrap();
        let resolution_winner = field.session().unwrap().resolution().unwrap().winner;
        assert_eq!(resolution_winner, Side::Enemy);

        // March (2 s) plus part of the engagement
        for _ in 0..100 {
            assert!(field.advance(0.1, &mut world).is_none());
        }
        let current = total_count(&field.session().unwrap().player);
        assert!(current < 500);

        let report = field.retreat().unwrap();
        assert_eq!(report.outcome, BattleOutcome::Retreat);
        assert_eq!(report.notice.message(), "You fled the battlefield.");
        assert_eq!(total_count(&report.roster), current);
        assert!(report.roster.iter().all(|s| s.count > 0));
        assert!(field.session().is_none());
        assert!(field.visual().particles.is_empty());
        assert!(field.advance(0.1, &mut world).is_none());
        assert_eq!(field.retreat().unwrap_err(), BattleError::NoActiveBattle);
    }

    #[test]
    fn test_close_is_refused_mid_combat() {
        let mut field = field();
        let mut world = RecordingWorld::default();
        let roster = vec![ArmyStack::from_registry(StackId(1), "zombie", 500, field.registry()).unwrap()];
        field
            .init_battle(&roster, territory(FactionId::VampireHunters, TerritoryTier::Established), BattleType::Raid, 6)
            .unwrap();
        field.start_battle().unwrap();
        for _ in 0..100 {
            assert!(field.advance(0.1, &mut world).is_none());
        }
        let current = total_count(&field.session().unwrap().player);
        assert!(current < 500);

        assert_eq!(
            field.close_battle(),
            Err(BattleError::WrongPhase {
                expected: BattlePhase::Results,
                actual: BattlePhase::Combat
            })
        );
        // Session and casualties survive; retreat still reports them
        assert_eq!(field.phase(), Some(BattlePhase::Combat));
        assert!(!field.visual().particles.is_empty());
        let report = field.retreat().unwrap();
        assert_eq!(total_count(&report.roster), current);
    }

    #[test]
    fn test_close_during_deployment_or_without_battle() {
        let mut field = field();
        assert_eq!(field.close_battle(), Ok(None));

        let roster = strong_roster(field.registry());
        field
            .init_battle(&roster, territory(FactionId::PeasantVillages, TerritoryTier::Outpost), BattleType::Raid, 2)
            .unwrap();
        assert_eq!(field.close_battle(), Ok(None));
        assert!(field.session().is_none());
    }

    #[test]
    fn test_pause_freezes_timeline_and_visuals() {
        let mut field = field();
        let mut world = RecordingWorld::default();
        let roster = strong_roster(field.registry());
        field
            .init_battle(&roster, territory(FactionId::PeasantVillages, TerritoryTier::Outpost), BattleType::Raid, 8)
            .unwrap();
        field.start_battle().unwrap();
        field.advance(0.1, &mut world);

        let elapsed = field.session().unwrap().timeline.elapsed();
        let frames = field.visual().frames();
        field.set_paused(true);
        for _ in 0..50 {
            assert!(field.advance(0.1, &mut world).is_none());
        }
        assert_eq!(field.session().unwrap().timeline.elapsed(), elapsed);
        assert_eq!(field.visual().frames(), frames);

        field.set_paused(false);
        field.advance(0.1, &mut world);
        assert!(field.session().unwrap().timeline.elapsed() > elapsed);
    }

    #[test]
    fn test_same_seed_same_report() {
        let run = || {
            let mut field = field();
            let mut world = RecordingWorld::default();
            let roster = strong_roster(field.registry());
            field
                .init_battle(&roster, territory(FactionId::ChurchInquisition, TerritoryTier::Outpost), BattleType::Raid, 21)
                .unwrap();
            field.start_battle().unwrap();
            play_out(&mut field, &mut world)
        };
        let a = run();
        assert_eq!(a, run());
        assert_ne!(a.rounds, 0);
    }

    #[test]
    fn test_unopposed_resolution_is_not_reachable_from_init() {
        let mut field = field();
        let roster = strong_roster(field.registry());
        field
            .init_battle(&roster, territory(FactionId::MerchantGuild, TerritoryTier::Outpost), BattleType::Raid, 13)
            .unwrap();
        field.start_battle().unwrap();
        let resolution = field.session().unwrap().resolution().unwrap();
        assert_ne!(resolution.termination, Termination::Unopposed);
    }
}
