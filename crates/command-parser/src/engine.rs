//! The parsing engine: owns world and robot state, regenerates the command
//! space when the objects change identity, and answers utterances.

use parking_lot::Mutex;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::command::{compute_sentence_scores, Command, Sentence};
use crate::config::ParserConfig;
use crate::definition::GrammarDefinition;
use crate::describe::{self, Grounding, ObjectDescription};
use crate::error::{ParserError, Result};
use crate::grammar::Grammar;
use crate::loader::WorldSnapshot;
use crate::matchers::Utterance;
use crate::numbers;
use crate::ranking;
use crate::robot_command::RobotCommand;
use crate::scoring::PriorScorer;
use crate::world::{objects_match, Robot, WorldObject};

/// A ranked command with both of its scores.
#[derive(Debug, Clone, Serialize)]
pub struct RankedCommand {
    pub command: RobotCommand,
    pub lang_score: f64,
    pub score: f64,
}

/// A command and the first sentence generated for it.
#[derive(Debug, Clone, Serialize)]
pub struct CanonicalSentence {
    pub command: RobotCommand,
    pub sentence: String,
}

/// Generated grammar, commands and sentences for one object set.
struct Model {
    grammar: Grammar,
    commands: Vec<Command>,
    sentences: Vec<Sentence>,
}

impl Model {
    fn generate(
        def: &GrammarDefinition,
        objects: &[WorldObject],
        config: &ParserConfig,
    ) -> Result<Self> {
        let grammar = Grammar::compile(def, objects, &config.vocabulary)?;
        let mut commands: Vec<Command> = grammar
            .templates()
            .iter()
            .enumerate()
            .flat_map(|(i, t)| t.generate_commands(i))
            .collect();

        let mut sentences = Vec::new();
        for (ci, cmd) in commands.iter_mut().enumerate() {
            let start = sentences.len();
            sentences.extend(
                cmd.generate_sentences(&grammar)
                    .into_iter()
                    .map(|phrases| Sentence::new(phrases, ci)),
            );
            cmd.sentences = start..sentences.len();
            cmd.score_sentences();
        }
        info!(
            commands = commands.len(),
            sentences = sentences.len(),
            "generated command space"
        );
        Ok(Self {
            grammar,
            commands,
            sentences,
        })
    }

    fn rescore(&mut self, objects: &[WorldObject], robot: &Robot, config: &ParserConfig) {
        PriorScorer::new(&self.grammar, &config.scoring, &config.vocabulary).rescore(
            &mut self.commands,
            objects,
            robot,
        );
    }

    /// Scores sentences and commands for an utterance; returns which
    /// phrases were found and the command ranking.
    fn score_utterance(&mut self, text: &str, config: &ParserConfig) -> (Vec<bool>, Vec<usize>) {
        let utterance = Utterance::new(text);
        let found: Vec<bool> = self
            .grammar
            .phrases()
            .iter()
            .map(|p| p.found_in(&utterance))
            .collect();
        debug!(
            utterance = utterance.text(),
            phrases = ?self.found_words(&found),
            "utterance phrases"
        );

        compute_sentence_scores(
            &mut self.sentences,
            &found,
            &self.grammar,
            &config.matchers,
            config.scoring.length_exp,
        );
        for cmd in self.commands.iter_mut() {
            cmd.apply_language(&self.sentences);
        }
        let mut lang: Vec<f64> = self.commands.iter().map(|c| c.lang_score).collect();
        numbers::normalize(&mut lang, 0.0);
        for (cmd, l) in self.commands.iter_mut().zip(lang) {
            cmd.lang_score = l;
        }

        let order = ranking::rank(&self.commands);
        (found, order)
    }

    fn found_words(&self, found: &[bool]) -> Vec<&str> {
        self.grammar
            .phrases()
            .iter()
            .zip(found)
            .filter(|(_, f)| **f)
            .map(|(p, _)| p.words())
            .collect()
    }

    fn parse(&mut self, text: &str, config: &ParserConfig) -> RobotCommand {
        let (found, order) = self.score_utterance(text, config);
        let ties = ranking::top_ties(&self.commands, &order);
        for &i in &ties {
            debug!(command = %self.commands[i].display(&self.grammar), "top command");
        }
        let rc = match ties.as_slice() {
            [only] => RobotCommand::from_command(
                &self.commands[*only],
                &self.grammar,
                &found,
                &config.matchers,
            ),
            _ => ranking::clarification(&self.commands, &ties, &self.grammar),
        };
        info!(utterance = text, result = %rc, "parsed");
        rc
    }

    fn ranked(&mut self, text: &str, limit: usize, config: &ParserConfig) -> Vec<RankedCommand> {
        let (found, order) = self.score_utterance(text, config);
        order
            .into_iter()
            .take(limit)
            .map(|i| {
                let cmd = &self.commands[i];
                RankedCommand {
                    command: RobotCommand::from_command(
                        cmd,
                        &self.grammar,
                        &found,
                        &config.matchers,
                    ),
                    lang_score: cmd.lang_score,
                    score: cmd.score,
                }
            })
            .collect()
    }
}

#[derive(Default)]
struct EngineState {
    objects: Option<Vec<WorldObject>>,
    robot: Option<Robot>,
    /// Objects the current model was generated from.
    generated_for: Option<Vec<WorldObject>>,
    model: Option<Model>,
    compile_count: usize,
}

/// Parses utterances against the current world and robot.
///
/// One lock guards all state; every operation holds it for its full
/// duration, so concurrent callers are serialised.
pub struct Engine {
    definition: GrammarDefinition,
    config: ParserConfig,
    state: Mutex<EngineState>,
}

impl Engine {
    pub fn new(definition: GrammarDefinition, config: ParserConfig) -> Self {
        Self {
            definition,
            config,
            state: Mutex::new(EngineState::default()),
        }
    }

    /// Engine over the built-in grammar with default configuration.
    pub fn builtin() -> Result<Self> {
        Ok(Self::new(GrammarDefinition::builtin()?, ParserConfig::default()))
    }

    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    pub fn definition(&self) -> &GrammarDefinition {
        &self.definition
    }

    /// Updates whichever of objects and robot is given.
    ///
    /// Once both are known the command space is regenerated if the objects
    /// changed identity, and the prior is recomputed either way. A grammar
    /// error leaves the previous state untouched.
    pub fn set_world(&self, objects: Option<Vec<WorldObject>>, robot: Option<Robot>) -> Result<()> {
        let mut guard = self.state.lock();
        let state = &mut *guard;

        let objects_now = objects.as_ref().or(state.objects.as_ref());
        let robot_now = robot.as_ref().or(state.robot.as_ref());
        if let (Some(objs), Some(robot_now)) = (objects_now, robot_now) {
            if objects_match(Some(objs.as_slice()), state.generated_for.as_deref()) {
                debug!("objects match; not regenerating");
            } else {
                info!(objects = objs.len(), "objects changed; regenerating");
                let model = Model::generate(&self.definition, objs, &self.config)?;
                state.model = Some(model);
                state.generated_for = Some(objs.clone());
                state.compile_count += 1;
            }
            if let Some(model) = state.model.as_mut() {
                model.rescore(objs, robot_now, &self.config);
            }
        }

        if let Some(objects) = objects {
            state.objects = Some(objects);
        }
        if let Some(robot) = robot {
            state.robot = Some(robot);
        }
        Ok(())
    }

    pub fn update_objects(&self, objects: Vec<WorldObject>) -> Result<()> {
        self.set_world(Some(objects), None)
    }

    pub fn update_robot(&self, robot: Robot) -> Result<()> {
        self.set_world(None, Some(robot))
    }

    pub fn set_snapshot(&self, snapshot: WorldSnapshot) -> Result<()> {
        self.set_world(Some(snapshot.objects), Some(snapshot.robot))
    }

    /// Loads the world shipped with the crate.
    pub fn set_default_world(&self) -> Result<()> {
        self.set_snapshot(WorldSnapshot::builtin()?)
    }

    /// The best command for an utterance, or a clarification request.
    pub fn parse(&self, utterance: &str) -> Result<RobotCommand> {
        let mut state = self.state.lock();
        let model = ready(&mut state, "parse")?;
        Ok(model.parse(utterance, &self.config))
    }

    /// The `limit` best commands with their scores.
    pub fn ranked(&self, utterance: &str, limit: usize) -> Result<Vec<RankedCommand>> {
        let mut state = self.state.lock();
        let model = ready(&mut state, "ranking")?;
        Ok(model.ranked(utterance, limit, &self.config))
    }

    pub fn describe(&self) -> Result<Vec<ObjectDescription>> {
        let mut state = self.state.lock();
        let model = ready(&mut state, "describe")?;
        Ok(describe::describe(&model.grammar))
    }

    pub fn ground(&self, query: &str) -> Result<Vec<Grounding>> {
        let mut state = self.state.lock();
        let model = ready(&mut state, "ground")?;
        Ok(describe::ground(&model.grammar, query, &self.config.matchers))
    }

    /// Each command with its first generated sentence.
    pub fn canonical_sentences(&self) -> Result<Vec<CanonicalSentence>> {
        let mut state = self.state.lock();
        let model = ready(&mut state, "listing sentences")?;
        let no_phrases = vec![false; model.grammar.phrases().len()];
        Ok(model
            .commands
            .iter()
            .filter_map(|cmd| {
                let first = model.sentences.get(cmd.sentences.start)?;
                Some(CanonicalSentence {
                    command: RobotCommand::from_command(
                        cmd,
                        &model.grammar,
                        &no_phrases,
                        &self.config.matchers,
                    ),
                    sentence: model.grammar.render(&first.phrases),
                })
            })
            .collect())
    }

    /// How many times the command space has been generated.
    pub fn compile_count(&self) -> usize {
        self.state.lock().compile_count
    }

    pub fn command_count(&self) -> usize {
        self.state.lock().model.as_ref().map_or(0, |m| m.commands.len())
    }

    pub fn sentence_count(&self) -> usize {
        self.state.lock().model.as_ref().map_or(0, |m| m.sentences.len())
    }
}

fn ready<'a>(state: &'a mut EngineState, operation: &'static str) -> Result<&'a mut Model> {
    match state.model.as_mut() {
        Some(model) if state.objects.is_some() && state.robot.is_some() => Ok(model),
        _ => {
            warn!(operation, "world objects and robot must be set first");
            Err(ParserError::NotReady(operation))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::GripperState;
    use rstest::rstest;

    fn obj(name: &str, color: &str, kind: &str) -> WorldObject {
        WorldObject {
            color: Some(color.to_string()),
            kind: Some(kind.to_string()),
            ..WorldObject::named(name)
        }
        .with_reachability([true, true])
    }

    fn red_box() -> WorldObject {
        obj("obj0", "red", "box")
    }

    fn blue_cup() -> WorldObject {
        obj("obj1", "blue", "cup")
    }

    /// Red box only the right hand reaches: rightmost and smallest.
    fn right_possible() -> WorldObject {
        WorldObject {
            is_rightmost: Some(true),
            is_smallest: Some(true),
            ..obj("obj0", "red", "box").with_reachability([true, false])
        }
    }

    /// Red box only the left hand reaches: leftmost and biggest.
    fn left_possible() -> WorldObject {
        WorldObject {
            is_leftmost: Some(true),
            is_biggest: Some(true),
            ..obj("obj1", "red", "box").with_reachability([false, true])
        }
    }

    fn engine_with(objects: Vec<WorldObject>, robot: Robot) -> Engine {
        let engine = Engine::builtin().unwrap();
        engine.set_world(Some(objects), Some(robot)).unwrap();
        engine
    }

    fn side(name: &str) -> Robot {
        Robot {
            last_cmd_side: Some(name.to_string()),
            ..Robot::default()
        }
    }

    fn rc(name: &str, args: &[&str]) -> RobotCommand {
        RobotCommand::new(name, args)
    }

    #[test]
    fn test_parse_requires_world_and_robot() {
        let engine = Engine::builtin().unwrap();
        assert!(matches!(engine.parse("open"), Err(ParserError::NotReady("parse"))));
        engine.update_objects(vec![red_box()]).unwrap();
        assert!(matches!(engine.parse("open"), Err(ParserError::NotReady(_))));
        assert!(matches!(engine.describe(), Err(ParserError::NotReady(_))));
        assert_eq!(engine.compile_count(), 0);
        engine.update_robot(Robot::default()).unwrap();
        assert_eq!(engine.compile_count(), 1);
        assert!(engine.parse("open").is_ok());
    }

    #[test]
    fn test_open_named_hand() {
        let engine = engine_with(vec![], Robot::default());
        assert_eq!(engine.parse("open left-hand").unwrap(), rc("open", &["left_hand"]));
    }

    #[test]
    fn test_open_infers_closed_hand() {
        let engine = engine_with(
            vec![],
            Robot {
                gripper_states: Some([GripperState::ClosedEmpty, GripperState::Open]),
                last_cmd_side: Some("left_hand".to_string()),
                ..Robot::default()
            },
        );
        assert_eq!(engine.parse("open").unwrap(), rc("open", &["right_hand"]));
    }

    #[test]
    fn test_infer_open_close_from_grippers() {
        let engine = engine_with(
            vec![],
            Robot {
                gripper_states: Some([GripperState::Open, GripperState::HasObj]),
                last_cmd_side: Some("right_hand".to_string()),
                ..Robot::default()
            },
        );
        assert_eq!(engine.parse("release").unwrap(), rc("open", &["left_hand"]));

        engine
            .update_robot(Robot {
                gripper_states: Some([GripperState::ClosedEmpty, GripperState::Open]),
                last_cmd_side: Some("right_hand".to_string()),
                ..Robot::default()
            })
            .unwrap();
        assert_eq!(engine.parse("close").unwrap(), rc("close", &["left_hand"]));
    }

    #[test]
    fn test_tie_asks_for_side() {
        let engine = engine_with(vec![red_box()], Robot::default());
        assert_eq!(
            engine.parse("move above the red box").unwrap(),
            rc("clarify", &["side"])
        );
    }

    #[test]
    fn test_pick_named_object() {
        let engine = engine_with(vec![red_box(), blue_cup()], Robot::default());
        assert_eq!(
            engine.parse("pick-up the blue cup with right-hand").unwrap(),
            rc("pick_up", &["obj1", "right_hand"])
        );
    }

    #[test]
    fn test_impossible_request_still_returned() {
        let engine = engine_with(
            vec![],
            Robot {
                can_move_up: Some([false, false]),
                ..Robot::default()
            },
        );
        assert_eq!(
            engine.parse("move left-hand up").unwrap(),
            rc("move_abs", &["left_hand", "up"])
        );

        let stuck = Robot {
            can_move_up: Some([false, false]),
            can_move_down: Some([false, false]),
            can_move_toleft: Some([false, false]),
            can_move_toright: Some([false, false]),
            can_move_forward: Some([false, false]),
            can_move_backward: Some([false, false]),
            ..Robot::default()
        };
        engine.update_robot(stuck).unwrap();
        assert_eq!(
            engine.parse("move right-hand backwards").unwrap(),
            rc("move_abs", &["right_hand", "backward"])
        );
    }

    #[test]
    fn test_impossible_object_commands_still_returned() {
        let unreachable = obj("obj0", "red", "box").with_reachability([false, false]);
        let engine = engine_with(vec![unreachable], Robot::default());
        assert_eq!(
            engine.parse("pick-up the red box with your left-hand").unwrap(),
            rc("pick_up", &["obj0", "left_hand"])
        );
        assert_eq!(
            engine
                .parse("place behind the red box with your right-hand")
                .unwrap(),
            rc("place", &["behind", "obj0", "right_hand"])
        );
    }

    #[rstest]
    #[case("pick the red block up left-hand", rc("pick_up", &["obj0", "left_hand"]))]
    #[case("pick the red block up right-arm", rc("pick_up", &["obj0", "right_hand"]))]
    #[case("open left-gripper", rc("open", &["left_hand"]))]
    #[case("close right-gripper", rc("close", &["right_hand"]))]
    #[case("move left-arm higher", rc("move_abs", &["left_hand", "up"]))]
    #[case("move right-gripper to-the-left", rc("move_abs", &["right_hand", "to_left"]))]
    #[case("move right-gripper away", rc("move_abs", &["right_hand", "forward"]))]
    #[case("move left-gripper closer", rc("move_abs", &["left_hand", "backward"]))]
    #[case("lower left-gripper", rc("move_abs", &["left_hand", "down"]))]
    #[case("raise right-gripper", rc("move_abs", &["right_hand", "up"]))]
    #[case("pick-up that thing left-hand", rc("pick_up", &["obj0", "left_hand"]))]
    #[case("pick-up the box right-hand", rc("pick_up", &["obj0", "right_hand"]))]
    #[case("pick-up the red thing right-hand", rc("pick_up", &["obj0", "right_hand"]))]
    #[case("look at the red box", rc("look_at", &["obj0"]))]
    #[case("Hey robot, could you move right-hand to-the-side? Thanks.", rc("move_abs_pos", &["right_hand", "to_side"]))]
    fn test_one_object_synonyms(#[case] utterance: &str, #[case] expected: RobotCommand) {
        let engine = engine_with(vec![red_box()], Robot::default());
        assert_eq!(engine.parse(utterance).unwrap(), expected);
    }

    #[rstest]
    #[case("right_hand")]
    #[case("left_hand")]
    fn test_side_preference(#[case] preferred: &str) {
        let engine = engine_with(vec![red_box()], side(preferred));
        for (utterance, name, args) in [
            ("open", "open", vec![preferred]),
            ("close", "close", vec![preferred]),
            ("move up", "move_abs", vec![preferred, "up"]),
            ("move left", "move_abs", vec![preferred, "to_left"]),
            ("move backwards", "move_abs", vec![preferred, "backward"]),
            ("move to-the-side", "move_abs_pos", vec![preferred, "to_side"]),
            ("move near the box", "move_rel", vec![preferred, "near", "obj0"]),
            ("move towards the box", "move_rel_dir", vec![preferred, "towards", "obj0"]),
            ("pick-up", "pick_up", vec!["obj0", preferred]),
            ("place next-to the box", "place", vec!["next_to", "obj0", preferred]),
            ("place on-top-of the box", "place", vec!["on_top_of", "obj0", preferred]),
        ] {
            assert_eq!(engine.parse(utterance).unwrap(), rc(name, &args), "{utterance}");
        }
    }

    #[rstest]
    #[case("right_hand", "left_hand", "left-hand")]
    #[case("left_hand", "right_hand", "right-hand")]
    fn test_requested_side_beats_preference(
        #[case] preferred: &str,
        #[case] requested: &str,
        #[case] said: &str,
    ) {
        let engine = engine_with(vec![red_box()], side(preferred));
        let cases = [
            (format!("open {said}"), rc("open", &[requested])),
            (format!("move {said} left"), rc("move_abs", &[requested, "to_left"])),
            (format!("move {said} above the box"), rc("move_rel", &[requested, "above", "obj0"])),
            (format!("pick-up with {said}"), rc("pick_up", &["obj0", requested])),
            (format!("place near the box with {said}"), rc("place", &["near", "obj0", requested])),
        ];
        for (utterance, expected) in cases {
            assert_eq!(engine.parse(&utterance).unwrap(), expected, "{utterance}");
        }
    }

    #[rstest]
    #[case([true, false], "right_hand")]
    #[case([false, true], "left_hand")]
    fn test_robot_one_side_free(#[case] pair: [bool; 2], #[case] expected: &str) {
        let robot = Robot {
            can_move_up: Some(pair),
            can_move_toleft: Some(pair),
            ..Robot::default()
        };
        let engine = engine_with(vec![], robot);
        assert_eq!(engine.parse("move up").unwrap(), rc("move_abs", &[expected, "up"]));
        assert_eq!(
            engine.parse("move left").unwrap(),
            rc("move_abs", &[expected, "to_left"])
        );
    }

    #[test]
    fn test_reachability_picks_hand() {
        let engine = engine_with(vec![right_possible(), left_possible()], Robot::default());
        assert_eq!(
            engine.parse("move above the smallest red box").unwrap(),
            rc("move_rel", &["right_hand", "above", "obj0"])
        );
        assert_eq!(
            engine.parse("place near the left-most thing").unwrap(),
            rc("place", &["near", "obj1", "left_hand"])
        );
        assert_eq!(
            engine.parse("pick-up the biggest box").unwrap(),
            rc("pick_up", &["obj1", "left_hand"])
        );
        for desc in [
            "smallest red box",
            "right-most red box",
            "smallest thing",
            "right-most thing",
        ] {
            assert_eq!(
                engine.parse(&format!("place above the {desc}")).unwrap(),
                rc("place", &["above", "obj0", "right_hand"]),
                "{desc}"
            );
        }

        let engine = engine_with(vec![right_possible()], Robot::default());
        assert_eq!(
            engine.parse("move away-from the box").unwrap(),
            rc("move_rel_dir", &["right_hand", "away", "obj0"])
        );
    }

    #[rstest]
    #[case("obj0", &["red box", "red thing", "red object", "box", "crimson box"])]
    #[case("obj1", &["blue cup", "blue thing", "blue object", "cup"])]
    fn test_select_object(#[case] target: &str, #[case] descriptions: &[&str]) {
        let engine = engine_with(vec![red_box(), blue_cup()], Robot::default());
        for (hand, said) in [("right_hand", "right-hand"), ("left_hand", "left-hand")] {
            for desc in descriptions {
                assert_eq!(
                    engine.parse(&format!("move {said} behind the {desc}")).unwrap(),
                    rc("move_rel", &[hand, "behind", target])
                );
                assert_eq!(
                    engine.parse(&format!("pick-up the {desc} with {said}")).unwrap(),
                    rc("pick_up", &[target, hand])
                );
                assert_eq!(
                    engine.parse(&format!("place next-to the {desc} with {said}")).unwrap(),
                    rc("place", &["next_to", target, hand])
                );
            }
        }
    }

    #[test]
    fn test_stop_and_execute() {
        let engine = engine_with(
            vec![],
            Robot {
                is_executing: Some(false),
                ..Robot::default()
            },
        );
        assert_eq!(engine.parse("stop").unwrap(), rc("stop", &[]));
        engine
            .update_robot(Robot {
                is_executing: Some(true),
                ..Robot::default()
            })
            .unwrap();
        assert_eq!(engine.parse("execute").unwrap(), rc("execute", &[]));
        assert_eq!(engine.parse("halt").unwrap(), rc("stop", &[]));
    }

    #[test]
    fn test_nothing_matched_is_template_clarify() {
        let engine = engine_with(vec![red_box()], Robot::default());
        assert_eq!(engine.parse("hello there").unwrap(), RobotCommand::clarify(vec![]));
    }

    #[test]
    fn test_scores_are_distributions() {
        let engine = engine_with(
            vec![right_possible(), left_possible()],
            Robot {
                gripper_states: Some([GripperState::Open, GripperState::HasObj]),
                is_executing: Some(false),
                ..Robot::default()
            },
        );
        for utterance in ["place near the left-most thing", "open", "hello there"] {
            let all = engine.ranked(utterance, usize::MAX).unwrap();
            assert_eq!(all.len(), engine.command_count());
            let prior: f64 = all.iter().map(|r| r.score).sum();
            let lang: f64 = all.iter().map(|r| r.lang_score).sum();
            assert!((prior - 1.0).abs() < 1e-6);
            assert!((lang - 1.0).abs() < 1e-6);
            assert!(all.iter().all(|r| r.score > 0.0));
        }
    }

    #[test]
    fn test_ranked_order_and_phrases() {
        let engine = engine_with(vec![red_box()], Robot::default());
        let top = engine.ranked("release the left-arm", 3).unwrap();
        assert_eq!(top.len(), 3);
        assert_eq!(top[0].command, rc("open", &["left_hand"]));
        assert_eq!(top[0].command.phrases, vec!["release", "left-arm"]);
        assert!(top[0].lang_score >= top[1].lang_score);
    }

    #[test]
    fn test_reachability_only_change_skips_regeneration() {
        let engine = engine_with(vec![red_box(), blue_cup()], Robot::default());
        assert_eq!(engine.compile_count(), 1);
        let sentences = engine.sentence_count();

        // same identities, different order and reachability
        let moved = vec![
            blue_cup().with_reachability([false, false]),
            red_box().with_reachability([true, false]),
        ];
        engine.update_objects(moved).unwrap();
        engine.update_robot(side("left_hand")).unwrap();
        engine.set_world(None, None).unwrap();
        assert_eq!(engine.compile_count(), 1);
        assert_eq!(engine.sentence_count(), sentences);

        // the new reachability still feeds the prior
        assert_eq!(
            engine.parse("pick-up the red box").unwrap(),
            rc("pick_up", &["obj0", "right_hand"])
        );

        let mut recolored = red_box();
        recolored.color = Some("green".to_string());
        engine.update_objects(vec![recolored, blue_cup()]).unwrap();
        assert_eq!(engine.compile_count(), 2);
        assert_eq!(
            engine.parse("look at the green box").unwrap(),
            rc("look_at", &["obj0"])
        );
    }

    #[test]
    fn test_bad_objects_keep_previous_state() {
        let engine = engine_with(vec![red_box()], Robot::default());
        let err = engine.update_objects(vec![red_box(), red_box()]);
        assert!(matches!(err, Err(ParserError::DuplicateObject(_))));
        assert_eq!(engine.compile_count(), 1);
        assert_eq!(
            engine.parse("look at the red box").unwrap(),
            rc("look_at", &["obj0"])
        );
    }

    #[test]
    fn test_describe_and_ground() {
        let engine = Engine::builtin().unwrap();
        engine.set_default_world().unwrap();
        let descs = engine.describe().unwrap();
        assert_eq!(descs[0].name, "obj0");
        assert_eq!(descs[0].description, "the box");
        assert_eq!(descs[1].description, "the cup");
        let grounding = engine.ground("the blue one").unwrap();
        assert_eq!(grounding[1].name, "obj1");
        assert!(grounding[1].probability > grounding[0].probability);
    }

    fn assert_round_trip(objects: Vec<WorldObject>) {
        let engine = engine_with(objects, Robot::default());
        let canonical = engine.canonical_sentences().unwrap();
        assert_eq!(canonical.len(), engine.command_count());
        for c in canonical {
            assert_eq!(engine.parse(&c.sentence).unwrap(), c.command, "{}", c.sentence);
        }
    }

    #[test]
    fn test_round_trip_without_objects() {
        assert_round_trip(vec![]);
    }

    #[test]
    fn test_round_trip_two_objects() {
        assert_round_trip(vec![red_box(), blue_cup()]);
    }

    #[test]
    fn test_shared_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Engine>();

        let engine = engine_with(vec![red_box(), blue_cup()], Robot::default());
        std::thread::scope(|s| {
            for i in 0..4 {
                let engine = &engine;
                s.spawn(move || {
                    if i % 2 == 0 {
                        engine.update_robot(side("left_hand")).unwrap();
                    }
                    let got = engine.parse("pick-up the blue cup with right-hand").unwrap();
                    assert_eq!(got, rc("pick_up", &["obj1", "right_hand"]));
                });
            }
        });
        assert_eq!(engine.compile_count(), 1);
    }

    #[test]
    fn test_command_without_parameters() {
        let def = GrammarDefinition::from_yaml_str(
            "options:\n  stop: {phrases: [stop, halt], strategy: verb}\n  open: {phrases: [open], strategy: verb}\n  right_hand: {phrases: [right-hand]}\n  left_hand: {phrases: [left-hand]}\nparameters:\n  side: [right_hand, left_hand]\ncommands:\n  noop: []\n  stop: [stop]\n  open: [open, side]\n",
        )
        .unwrap();
        let engine = Engine::new(def, ParserConfig::default());
        engine.set_world(Some(vec![]), Some(Robot::default())).unwrap();
        assert_eq!(engine.command_count(), 4);
        assert_eq!(engine.sentence_count(), 1 + 2 + 2);

        let all = engine.ranked("hello there", usize::MAX).unwrap();
        let noop = all.iter().find(|r| r.command.name == "noop").unwrap();
        assert!(noop.command.args.is_empty());
        assert!(noop.command.phrases.is_empty());

        assert_eq!(engine.parse("hello there").unwrap(), RobotCommand::clarify(vec![]));
        assert_eq!(engine.parse("halt").unwrap(), rc("stop", &[]));
        assert_eq!(engine.parse("open left-hand").unwrap(), rc("open", &["left_hand"]));
    }

    #[test]
    fn test_grammar_with_both_hands_side() {
        let raw = crate::definition::BUILTIN_GRAMMAR
            .replace(
                "  left_hand: {phrases: [left-hand, left-arm, left-gripper]}\n",
                "  left_hand: {phrases: [left-hand, left-arm, left-gripper]}\n  both_hands: {phrases: [both-hands]}\n",
            )
            .replace(
                "  side: [right_hand, left_hand]\n",
                "  side: [right_hand, left_hand, both_hands]\n",
            );
        let def = GrammarDefinition::from_yaml_str(&raw).unwrap();
        let engine = Engine::new(def, ParserConfig::default());
        let robot = Robot {
            gripper_states: Some([GripperState::Open, GripperState::ClosedEmpty]),
            can_move_up: Some([true, false]),
            ..Robot::default()
        };
        engine
            .set_world(
                Some(vec![red_box().with_reachability([true, false])]),
                Some(robot),
            )
            .unwrap();

        let all = engine.ranked("open", usize::MAX).unwrap();
        let prior: f64 = all.iter().map(|r| r.score).sum();
        assert!((prior - 1.0).abs() < 1e-6);

        assert_eq!(
            engine.parse("open both-hands").unwrap(),
            rc("open", &["both_hands"])
        );
        assert_eq!(engine.parse("close").unwrap(), rc("close", &["right_hand"]));
        assert_eq!(
            engine.parse("pick-up the red box").unwrap(),
            rc("pick_up", &["obj0", "right_hand"])
        );
        assert_eq!(
            engine.parse("move both-hands up").unwrap(),
            rc("move_abs", &["both_hands", "up"])
        );
    }

    #[test]
    fn test_engines_are_independent() {
        let strict = ParserConfig {
            scoring: crate::config::ScoringConfig {
                penalties: crate::config::Penalties {
                    not_last_side: -20.0,
                    ..Default::default()
                },
                ..Default::default()
            },
            ..Default::default()
        };
        let a = Engine::new(GrammarDefinition::builtin().unwrap(), strict);
        let b = Engine::builtin().unwrap();
        let robot = Robot {
            gripper_states: Some([GripperState::ClosedEmpty, GripperState::Open]),
            last_cmd_side: Some("left_hand".to_string()),
            ..Robot::default()
        };
        a.set_world(Some(vec![]), Some(robot.clone())).unwrap();
        b.set_world(Some(vec![]), Some(robot)).unwrap();
        // a large side penalty outweighs the gripper state
        assert_eq!(a.parse("open").unwrap(), rc("open", &["left_hand"]));
        assert_eq!(b.parse("open").unwrap(), rc("open", &["right_hand"]));
    }
}
