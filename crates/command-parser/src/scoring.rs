//! World- and robot-conditioned command prior.
//!
//! Penalties are additive and keyed on the command name. A property the
//! world or robot does not report is score-neutral.

use tracing::debug;

use crate::command::Command;
use crate::config::{ScoringConfig, Vocabulary};
use crate::grammar::Grammar;
use crate::numbers;
use crate::world::{GripperState, Robot, SidePair, WorldObject};

pub struct PriorScorer<'a> {
    grammar: &'a Grammar,
    scoring: &'a ScoringConfig,
    vocab: &'a Vocabulary,
}

impl<'a> PriorScorer<'a> {
    pub fn new(grammar: &'a Grammar, scoring: &'a ScoringConfig, vocab: &'a Vocabulary) -> Self {
        Self {
            grammar,
            scoring,
            vocab,
        }
    }

    /// Resets, penalises and normalises every command's prior.
    pub fn rescore(&self, commands: &mut [Command], objects: &[WorldObject], robot: &Robot) {
        for cmd in commands.iter_mut() {
            cmd.score = self.scoring.start_score;
            self.apply_world(cmd, objects);
            self.apply_robot(cmd, robot);
        }
        let mut scores: Vec<f64> = commands.iter().map(|c| c.score).collect();
        numbers::normalize(&mut scores, self.scoring.min_score);
        for (cmd, score) in commands.iter_mut().zip(scores) {
            cmd.score = score;
        }
        debug!(commands = commands.len(), "rescored command prior");
    }

    /// Penalises commands whose object cannot be reached as requested.
    pub fn apply_world(&self, cmd: &mut Command, objects: &[WorldObject]) {
        let Some(obj_option) = cmd.binding(&self.vocab.object_param) else {
            return;
        };
        let obj_name = self.grammar.option_name(obj_option);
        let Some(obj) = objects.iter().find(|o| o.name.as_deref() == Some(obj_name)) else {
            return;
        };
        let penalties = &self.scoring.penalties;

        match cmd.name.as_str() {
            "move_rel" | "place" | "move_rel_dir" => {
                let relation = cmd.binding("rel_pos").or_else(|| cmd.binding("rel_dir"));
                let reach = relation.and_then(|r| obj.reachability(self.grammar.option_name(r)));
                if self.side_allows(cmd, reach) == Some(false) {
                    cmd.score += penalties.location_unreachable;
                }
            }
            "pick_up" => {
                if self.side_allows(cmd, obj.is_pickupable) == Some(false) {
                    cmd.score += penalties.object_unreachable;
                }
            }
            _ => {}
        }
    }

    /// Penalises commands that make no sense for the robot's state.
    pub fn apply_robot(&self, cmd: &mut Command, robot: &Robot) {
        let penalties = &self.scoring.penalties;

        if let Some(executing) = robot.is_executing {
            match cmd.name.as_str() {
                "stop" if !executing => cmd.score += penalties.stop_not_executing,
                "execute" if executing => cmd.score += penalties.execute_while_executing,
                _ => {}
            }
        }

        if let (Some(last), Some(obj)) = (
            robot.last_referred_obj_name.as_deref(),
            cmd.binding(&self.vocab.object_param),
        ) {
            if !last.is_empty() && self.grammar.option_name(obj) != last {
                cmd.score += penalties.not_last_referred_object;
            }
        }

        // Everything below needs a side.
        let Some(side_option) = cmd.binding(&self.vocab.side_param) else {
            return;
        };
        let side = self.grammar.option_name(side_option);

        if let Some(last) = robot.last_cmd_side.as_deref() {
            if last != self.vocab.no_side && last != side {
                cmd.score += penalties.not_last_side;
            }
        }

        let Some(side_idx) = self.grammar.side_index(side) else {
            return;
        };

        if let Some(states) = robot.gripper_states {
            let penalty =
                for_side(states, side_idx).find_map(|gs| self.gripper_penalty(&cmd.name, gs));
            if let Some(penalty) = penalty {
                cmd.score += penalty;
            }
        }

        if cmd.name == "move_abs" {
            let free = cmd
                .binding("abs_dir")
                .and_then(|d| robot.can_move(self.grammar.option_name(d)));
            if let Some(pair) = free {
                if !for_side(pair, side_idx).all(|ok| ok) {
                    cmd.score += penalties.location_unreachable;
                }
            }
        }
    }

    fn gripper_penalty(&self, command: &str, state: GripperState) -> Option<f64> {
        let penalties = &self.scoring.penalties;
        match (command, state) {
            ("open", GripperState::Open)
            | ("close", GripperState::ClosedEmpty | GripperState::HasObj) => {
                Some(penalties.gripper_state)
            }
            ("pick_up", GripperState::HasObj)
            | ("place", GripperState::Open | GripperState::ClosedEmpty) => {
                Some(penalties.bad_pick_place)
            }
            _ => None,
        }
    }

    /// Evaluates a per-side pair for the command's side. A side without a
    /// slot in the pair means both hands. `None` when nothing is known.
    fn side_allows(&self, cmd: &Command, pair: Option<SidePair<bool>>) -> Option<bool> {
        let pair = pair?;
        let side = cmd
            .binding(&self.vocab.side_param)
            .and_then(|s| self.grammar.side_index(self.grammar.option_name(s)));
        Some(match side {
            Some(idx) => for_side(pair, idx).all(|ok| ok),
            None => pair[0] && pair[1],
        })
    }
}

/// The pair values that apply to the side at `idx`: its own slot, or both
/// slots for a side past the end of the pair (e.g. `both`).
fn for_side<T: Copy>(pair: SidePair<T>, idx: usize) -> impl Iterator<Item = T> {
    let both = idx >= pair.len();
    pair.into_iter()
        .enumerate()
        .filter(move |(i, _)| both || *i == idx)
        .map(|(_, v)| v)
}
