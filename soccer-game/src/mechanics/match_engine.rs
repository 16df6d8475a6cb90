use std::f32::consts::FRAC_PI_2;
use std::rc::Rc;

use anyhow::Result;
use ql::prelude::{QlError, StateVector};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::algebra_2d::{direction, heading_degrees, min_distance, rotate, step_towards, Vec2};
use crate::config::MatchParameter;
use crate::mechanics::action::{DefenderAction, GoalkeeperAction, OutfieldAction, PlayerAction};
use crate::mechanics::ball::Ball;
use crate::mechanics::pass_tracker::{PassEvent, PassTracker, PassType, PendingPass};
use crate::mechanics::pitch::{Pitch, Side};
use crate::mechanics::player::{Player, PlayerId};
use crate::mechanics::reward::reward;
use crate::mechanics::role::Role;
use crate::mechanics::state_encoder::{encode_state, Observation};
use crate::mechanics::team::Team;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MatchMode {
    /// countdowns, rounds and a final whistle
    Match,
    /// one headless episode of `tick_budget` ticks
    Training { tick_budget: u64 },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Countdown { remaining: u64 },
    Active,
    Finished,
}

/// What a call to [SoccerMatch::step] did
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepEvent {
    Countdown,
    Played,
    /// A goal on the last tick of a round or episode reports `RoundEnd` or `Finished` instead
    Goal(Side),
    RoundEnd { next_round: u32 },
    Finished,
}

/// Picks the action of a player instead of its policy
pub type ActionSelector<'a> = dyn FnMut(&Player) -> PlayerAction + 'a;

/// Two teams, a ball and the tick state machine around them
pub struct SoccerMatch {
    param: MatchParameter,
    pitch: Pitch,
    teams: [Team; 2],
    ball: Ball,
    mode: MatchMode,
    phase: Phase,
    round: u32,
    round_tick: u64,
    episode_tick: u64,
    learning: bool,
    rng: StdRng,
    pass_tracker: PassTracker,
}

impl SoccerMatch {
    /// `seed` makes policy initialisation, exploration and kick deviations reproducible
    pub fn new(
        param: MatchParameter,
        mode: MatchMode,
        seed: Option<u64>,
    ) -> Self {
        let mut rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let pitch = Pitch::new(&param);
        let teams = [
            Team::new(&param.teams[0], Side::Left, &pitch, &param.learning, &mut rng),
            Team::new(&param.teams[1], Side::Right, &pitch, &param.learning, &mut rng),
        ];
        let ball = Ball::new(pitch.center(), param.ball_radius);
        let mut soccer_match = Self {
            param,
            pitch,
            teams,
            ball,
            mode,
            phase: Phase::Active,
            round: 1,
            round_tick: 0,
            episode_tick: 0,
            learning: true,
            rng,
            pass_tracker: PassTracker::new(),
        };
        soccer_match.phase = soccer_match.kickoff_phase();
        soccer_match
    }

    pub fn param(&self) -> &MatchParameter { &self.param }

    pub fn pitch(&self) -> &Pitch { &self.pitch }

    pub fn teams(&self) -> &[Team; 2] { &self.teams }

    pub fn teams_mut(&mut self) -> &mut [Team; 2] { &mut self.teams }

    pub fn team(
        &self,
        side: Side,
    ) -> &Team {
        &self.teams[side.index()]
    }

    pub fn team_mut(
        &mut self,
        side: Side,
    ) -> &mut Team {
        &mut self.teams[side.index()]
    }

    pub fn player(
        &self,
        id: PlayerId,
    ) -> &Player {
        &self.teams[id.team].players[id.index]
    }

    pub fn player_mut(
        &mut self,
        id: PlayerId,
    ) -> &mut Player {
        &mut self.teams[id.team].players[id.index]
    }

    pub fn players(&self) -> impl Iterator<Item = &Player> { self.teams.iter().flat_map(|t| t.players.iter()) }

    pub fn ball(&self) -> &Ball { &self.ball }

    pub fn ball_mut(&mut self) -> &mut Ball { &mut self.ball }

    pub fn mode(&self) -> MatchMode { self.mode }

    pub fn phase(&self) -> Phase { self.phase }

    pub fn round(&self) -> u32 { self.round }

    pub fn round_tick(&self) -> u64 { self.round_tick }

    pub fn episode_tick(&self) -> u64 { self.episode_tick }

    pub fn is_finished(&self) -> bool { self.phase == Phase::Finished }

    /// (left score, right score)
    pub fn score(&self) -> (u32, u32) { (self.teams[0].score, self.teams[1].score) }

    pub fn learning(&self) -> bool { self.learning }

    /// switches experience collection and training of all players
    pub fn set_learning(
        &mut self,
        learning: bool,
    ) {
        if !learning {
            self.forget_transitions();
        }
        self.learning = learning;
    }

    pub fn take_pass_events(&mut self) -> Vec<PassEvent> { self.pass_tracker.take_events() }

    /// Starts a new episode or match. Scores are cleared, learned policies are kept.
    pub fn restart(&mut self) {
        for team in self.teams.iter_mut() {
            team.score = 0;
        }
        self.round = 1;
        self.round_tick = 0;
        self.episode_tick = 0;
        self.kickoff();
        self.phase = self.kickoff_phase();
    }

    /// Advances one tick with every player acting on its policy
    pub fn step(&mut self) -> Result<StepEvent> { self.tick(None) }

    /// Advances one tick with `selector` choosing each player's action
    pub fn step_with<F>(
        &mut self,
        mut selector: F,
    ) -> Result<StepEvent>
    where
        F: FnMut(&Player) -> PlayerAction,
    {
        let selector: &mut ActionSelector = &mut selector;
        self.tick(Some(selector))
    }

    fn kickoff_phase(&self) -> Phase {
        match self.mode {
            MatchMode::Match if self.param.countdown_ticks() > 0 => Phase::Countdown {
                remaining: self.param.countdown_ticks(),
            },
            _ => Phase::Active,
        }
    }

    fn tick(
        &mut self,
        mut selector: Option<&mut ActionSelector>,
    ) -> Result<StepEvent> {
        match self.phase {
            Phase::Finished => return Ok(StepEvent::Finished),
            Phase::Countdown { remaining } => {
                self.phase = if remaining > 1 {
                    Phase::Countdown { remaining: remaining - 1 }
                } else {
                    Phase::Active
                };
                return Ok(StepEvent::Countdown);
            }
            Phase::Active => {}
        }

        self.round_tick += 1;
        self.episode_tick += 1;

        let mut ball_touched = false;
        for team in 0..self.teams.len() {
            for index in 0..self.teams[team].players.len() {
                let id = PlayerId { team, index };
                let observation = self.observe(id);
                let state: StateVector = Rc::from(encode_state(&observation, &self.pitch, &self.param));

                if self.learning {
                    let step_reward = reward(&observation, &self.pitch, self.param.contact_range(), None);
                    let player = self.player_mut(id);
                    if let Some((last_state, last_action)) = player.last_transition.take() {
                        player.policy.remember(last_state, last_action, step_reward, Rc::clone(&state), false)?;
                        player.policy.replay()?;
                    }
                }

                let player = &mut self.teams[team].players[index];
                let action = match selector.as_deref_mut() {
                    Some(select) => select(&*player),
                    None => player.policy.choose_action(&state)?,
                };
                if !action.fits(player.role) {
                    return Err(QlError(format!("action {} is not available to {}", action, player.name)).into());
                }
                log::trace!("{}: {}", player.name, action);
                if self.learning {
                    player.last_transition = Some((state, action));
                }

                ball_touched |= self.apply_action(id, action, !ball_touched);
            }
        }

        self.separate_teammates();

        let scorer = self.ball.proceed(&self.pitch, &self.param);
        match scorer {
            Some(side) => self.goal(side)?,
            None => self.resolve_pass(),
        }

        // a goal on the last tick still ends the round or episode
        let time_is_up = match self.mode {
            MatchMode::Training { tick_budget } => self.episode_tick >= tick_budget,
            MatchMode::Match => self.round_tick >= self.param.round_ticks(),
        };
        if !time_is_up {
            return Ok(scorer.map_or(StepEvent::Played, StepEvent::Goal));
        }

        self.close_transitions(None)?;
        if self.mode == MatchMode::Match && self.round < self.param.rounds {
            self.round += 1;
            self.round_tick = 0;
            self.kickoff();
            self.phase = self.kickoff_phase();
            log::info!("round {} starts at {}", self.round, self.score_line());
            Ok(StepEvent::RoundEnd { next_round: self.round })
        } else {
            self.finish();
            Ok(StepEvent::Finished)
        }
    }

    fn observe(
        &self,
        id: PlayerId,
    ) -> Observation {
        let team = &self.teams[id.team];
        let player = &team.players[id.index];
        Observation {
            side: player.side,
            role: player.role,
            position: player.position,
            ball_position: self.ball.position,
            ball_velocity: self.ball.velocity,
            teammates: team
                .players
                .iter()
                .enumerate()
                .filter(|(i, _)| *i != id.index)
                .map(|(_, p)| (p.role, p.position))
                .collect(),
            opponents: self.teams[1 - id.team].players.iter().map(|p| p.position).collect(),
        }
    }

    /// Applies `action` of player `id`.
    /// Ball actions only take effect when `may_touch_ball` and the ball is in contact range.
    ///
    /// # Returns
    ///   whether the player touched the ball
    fn apply_action(
        &mut self,
        id: PlayerId,
        action: PlayerAction,
        may_touch_ball: bool,
    ) -> bool {
        let in_contact = may_touch_ball && self.player(id).can_reach(&self.ball, self.param.contact_range());
        match action {
            PlayerAction::Goalkeeper(a) => self.apply_goalkeeper_action(id, a, in_contact),
            PlayerAction::Defender(a) => self.apply_defender_action(id, a, in_contact),
            PlayerAction::Outfield(a) => self.apply_outfield_action(id, a, in_contact),
        }
    }

    fn apply_goalkeeper_action(
        &mut self,
        id: PlayerId,
        action: GoalkeeperAction,
        in_contact: bool,
    ) -> bool {
        match action {
            GoalkeeperAction::Intercept => {
                let (min_x, max_x) = Role::Goalkeeper.zone(self.player(id).side, &self.pitch);
                let (upper, lower) = self.pitch.goal_mouth();
                let target = Vec2::new(
                    self.ball.position.x.clamp(min_x, max_x),
                    self.ball.position.y.clamp(upper, lower),
                );
                self.move_towards(id, target, self.param.goalkeeper_max_speed);
                false
            }
            GoalkeeperAction::Block => {
                self.player_mut(id).stand();
                if in_contact {
                    let skill = self.player(id).skill;
                    self.ball.velocity *= 1.0 - skill;
                }
                in_contact
            }
            GoalkeeperAction::ClearKick => {
                self.player_mut(id).stand();
                if in_contact {
                    self.clear_kick(id);
                }
                in_contact
            }
        }
    }

    /// Passes to the nearest defender, or the nearest midfielder, or punts towards the center
    fn clear_kick(
        &mut self,
        id: PlayerId,
    ) {
        let team = &self.teams[id.team];
        let passer = &team.players[id.index];
        let nearest_with_role = |role: Role| {
            team.players
                .iter()
                .enumerate()
                .filter(|(_, p)| p.role == role)
                .min_by(|(_, a), (_, b)| passer.distance_to(a.position).total_cmp(&passer.distance_to(b.position)))
                .map(|(i, _)| i)
        };

        match nearest_with_role(Role::Defender).or_else(|| nearest_with_role(Role::Midfielder)) {
            Some(target_index) => {
                let target = &team.players[target_index];
                let line = target.position - passer.position;
                let distance = line.norm();
                let pass = PendingPass {
                    passer: id,
                    target: PlayerId {
                        team: id.team,
                        index: target_index,
                    },
                    passer_name: passer.name.clone(),
                    target_name: target.name.clone(),
                    passer_role: passer.role,
                    target_role: target.role,
                    distance,
                    angle: heading_degrees(line),
                    defender_proximity: min_distance(
                        target.position,
                        self.teams[1 - id.team].players.iter().map(|p| p.position),
                    ),
                    passer_speed: passer.velocity.norm(),
                    target_speed: target.velocity.norm(),
                    passer_skill: passer.skill,
                    pass_type: PassType::classify(distance, self.param.short_pass_distance),
                };
                let aim = target.position - self.ball.position;
                self.kick_ball(id, aim, self.param.clear_pass_power);
                self.pass_tracker.open(pass);
            }
            None => {
                let aim = self.pitch.center() - self.ball.position;
                self.kick_ball(id, aim, self.param.punt_power);
            }
        }
    }

    fn apply_defender_action(
        &mut self,
        id: PlayerId,
        action: DefenderAction,
        in_contact: bool,
    ) -> bool {
        let side = self.player(id).side;
        let max_speed = self.param.defender_max_speed;
        match action {
            DefenderAction::TackleClear => {
                self.player_mut(id).stand();
                if in_contact {
                    let lane_y = self.rng.gen_range(self.pitch.margin..=self.pitch.height - self.pitch.margin);
                    let target = Vec2::new(self.pitch.mirror_x(0.6 * self.pitch.width, side), lane_y);
                    let aim = target - self.ball.position;
                    self.kick_ball(id, aim, self.param.tackle_power);
                }
                in_contact
            }
            DefenderAction::InterceptApproach => {
                let target = (self.ball.position + self.pitch.goal_center(side)) / 2.0;
                self.move_towards(id, target, max_speed);
                false
            }
            DefenderAction::MoveToBall => {
                let target = self.ball.position;
                self.move_towards(id, target, max_speed);
                false
            }
            DefenderAction::HoldPosition => {
                let target = Vec2::new(self.pitch.mirror_x(self.pitch.width / 4.0, side), self.ball.position.y);
                self.move_towards(id, target, self.param.defender_hold_speed);
                false
            }
        }
    }

    fn apply_outfield_action(
        &mut self,
        id: PlayerId,
        action: OutfieldAction,
        in_contact: bool,
    ) -> bool {
        if let Some(dir) = action.direction() {
            let max_speed = self.param.max_speed(self.player(id).role);
            let displacement = dir * self.param.outfield_move_speed;
            self.player_mut(id).move_by(displacement, max_speed);
            return false;
        }

        self.player_mut(id).stand();
        if action == OutfieldAction::Kick && in_contact {
            let aim = self.pitch.goal_center(self.player(id).side.opponent()) - self.ball.position;
            self.kick_ball(id, aim, self.param.shot_power);
            return true;
        }
        false
    }

    fn move_towards(
        &mut self,
        id: PlayerId,
        target: Vec2,
        max_speed: f32,
    ) {
        let player = self.player_mut(id);
        let displacement = step_towards(player.position, target, max_speed);
        player.move_by(displacement, max_speed);
    }

    /// kicks the ball along `aim`, deviated by the player's kick inaccuracy
    fn kick_ball(
        &mut self,
        id: PlayerId,
        aim: Vec2,
        power: f32,
    ) {
        let max_deviation = (1.0 - self.player(id).kick_accuracy).clamp(0.0, 1.0) * FRAC_PI_2;
        let deviation = if max_deviation > 0.0 {
            self.rng.gen_range(-max_deviation..=max_deviation)
        } else {
            0.0
        };
        self.ball.kick(rotate(aim, deviation), power, self.param.ball_max_speed);
        log::trace!("{} kicks the ball, velocity {:?}", self.player(id).name, self.ball.velocity);
    }

    /// Pushes players away from teammates that are too close, then clamps everybody into their zone
    fn separate_teammates(&mut self) {
        let param = &self.param;
        let pitch = &self.pitch;
        for team in self.teams.iter_mut() {
            let positions: Vec<(Role, Vec2)> = team.players.iter().map(|p| (p.role, p.position)).collect();
            for (i, player) in team.players.iter_mut().enumerate() {
                let (range, strength) = match player.role {
                    Role::Midfielder => (param.midfielder_separation_distance, param.midfielder_separation_strength),
                    _ => (param.teammate_separation_distance, param.teammate_separation_strength),
                };
                let own = positions[i].1;
                let push: Vec2 = positions
                    .iter()
                    .enumerate()
                    .filter(|(j, (role, _))| *j != i && (player.role != Role::Midfielder || *role == Role::Midfielder))
                    .filter(|(_, (_, pos))| (own - pos).norm() < range)
                    .map(|(_, (_, pos))| direction(*pos, own) * strength)
                    .sum();
                player.position = pitch.clamp_into(own + push, player.role.zone(player.side, pitch));
            }
        }
    }

    fn resolve_pass(&mut self) {
        let Some(passer) = self.pass_tracker.passer() else {
            return;
        };
        let contact_range = self.param.contact_range();
        let receiver = self
            .teams
            .iter()
            .enumerate()
            .flat_map(|(team, t)| t.players.iter().enumerate().map(move |(index, p)| (PlayerId { team, index }, p)))
            .find(|(id, p)| *id != passer && p.can_reach(&self.ball, contact_range))
            .map(|(id, p)| (id, p.name.clone()));
        if let Some((id, name)) = receiver {
            self.pass_tracker.resolve(id, &name);
        }
    }

    fn goal(
        &mut self,
        scorer: Side,
    ) -> Result<()> {
        self.teams[scorer.index()].score += 1;
        log::info!("GOAL for {}! {}", self.teams[scorer.index()].name, self.score_line());
        self.close_transitions(Some(scorer))?;
        self.kickoff();
        self.phase = self.kickoff_phase();
        Ok(())
    }

    /// Closes every player's pending transition as terminal, followed by a training step
    fn close_transitions(
        &mut self,
        goal_for: Option<Side>,
    ) -> Result<()> {
        if !self.learning {
            self.forget_transitions();
            return Ok(());
        }
        for team in 0..self.teams.len() {
            for index in 0..self.teams[team].players.len() {
                let id = PlayerId { team, index };
                let Some((state, action)) = self.player_mut(id).last_transition.take() else {
                    continue;
                };
                let observation = self.observe(id);
                let next_state: StateVector = Rc::from(encode_state(&observation, &self.pitch, &self.param));
                let final_reward = reward(&observation, &self.pitch, self.param.contact_range(), goal_for);
                let policy = &mut self.player_mut(id).policy;
                policy.remember(state, action, final_reward, next_state, true)?;
                policy.replay()?;
            }
        }
        Ok(())
    }

    fn forget_transitions(&mut self) { self.teams.iter_mut().for_each(|t| t.forget_transitions()); }

    /// ball and players back to their start positions
    fn kickoff(&mut self) {
        self.ball.reset(self.pitch.center());
        self.teams.iter_mut().for_each(|t| t.reset_positions());
        self.pass_tracker.reset();
        self.forget_transitions();
    }

    fn finish(&mut self) {
        self.phase = Phase::Finished;
        if self.learning {
            for player in self.teams.iter_mut().flat_map(|t| t.players.iter_mut()) {
                player.policy.end_episode();
            }
        }
        log::debug!("final whistle after {} ticks: {}", self.episode_tick, self.score_line());
    }

    pub fn score_line(&self) -> String {
        format!(
            "{} {} : {} {}",
            self.teams[0].name, self.teams[0].score, self.teams[1].score, self.teams[1].name
        )
    }
}
