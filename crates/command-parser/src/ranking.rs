//! Ranking and tie-break over scored commands

use std::cmp::Ordering;

use crate::command::Command;
use crate::grammar::Grammar;
use crate::robot_command::RobotCommand;

/// Language score first, prior second, both descending.
pub fn compare(a: &Command, b: &Command) -> Ordering {
    b.lang_score
        .total_cmp(&a.lang_score)
        .then_with(|| b.score.total_cmp(&a.score))
}

/// Command indices best first. Stable, so equal commands keep generation order.
pub fn rank(commands: &[Command]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..commands.len()).collect();
    order.sort_by(|&a, &b| compare(&commands[a], &commands[b]));
    order
}

/// Indices of every command whose scores exactly equal the best one's.
pub fn top_ties(commands: &[Command], order: &[usize]) -> Vec<usize> {
    let Some(&first) = order.first() else {
        return Vec::new();
    };
    let top = &commands[first];
    order
        .iter()
        .copied()
        .take_while(|&i| {
            commands[i].lang_score == top.lang_score && commands[i].score == top.score
        })
        .collect()
}

/// The clarification for several equally ranked commands.
///
/// Different templates need the command itself clarified (no args). One
/// shared template names the parameters whose options differ, in template
/// order.
pub fn clarification(commands: &[Command], ties: &[usize], grammar: &Grammar) -> RobotCommand {
    let Some(&first) = ties.first() else {
        return RobotCommand::clarify(Vec::new());
    };
    let lead = &commands[first];
    if ties.iter().any(|&i| commands[i].template != lead.template) {
        return RobotCommand::clarify(Vec::new());
    }
    let params = grammar.templates()[lead.template]
        .params
        .iter()
        .filter(|p| {
            let chosen = lead.binding(&p.name);
            ties.iter().any(|&i| commands[i].binding(&p.name) != chosen)
        })
        .map(|p| p.name.clone())
        .collect();
    RobotCommand::clarify(params)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Vocabulary;
    use crate::definition::GrammarDefinition;

    fn commands_with(scores: &[(f64, f64)], g: &Grammar) -> Vec<Command> {
        let (idx, t) = g
            .templates()
            .iter()
            .enumerate()
            .find(|(_, t)| t.name == "move_abs")
            .unwrap();
        let mut cmds = t.generate_commands(idx);
        cmds.truncate(scores.len());
        for (c, &(lang, score)) in cmds.iter_mut().zip(scores) {
            c.lang_score = lang;
            c.score = score;
        }
        cmds
    }

    fn grammar() -> Grammar {
        Grammar::compile(
            &GrammarDefinition::builtin().unwrap(),
            &[],
            &Vocabulary::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_rank_lang_then_prior() {
        let g = grammar();
        let cmds = commands_with(&[(0.2, 0.9), (0.5, 0.1), (0.5, 0.3), (0.2, 0.9)], &g);
        let order = rank(&cmds);
        assert_eq!(order, vec![2, 1, 0, 3]);
        assert_eq!(top_ties(&cmds, &order), vec![2]);
    }

    #[test]
    fn test_exact_ties_only() {
        let g = grammar();
        let cmds = commands_with(&[(0.5, 0.3), (0.5 + 1e-12, 0.3), (0.5, 0.3)], &g);
        let order = rank(&cmds);
        assert_eq!(order, vec![1, 0, 2]);
        assert_eq!(top_ties(&cmds, &order), vec![1]);
    }

    #[test]
    fn test_clarify_differing_params() {
        let g = grammar();
        // move_abs(right_hand, up) and move_abs(left_hand, up) are 0 and 6
        let mut cmds = commands_with(&[(0.0, 0.0); 12], &g);
        cmds[0].lang_score = 0.5;
        cmds[6].lang_score = 0.5;
        let order = rank(&cmds);
        let ties = top_ties(&cmds, &order);
        assert_eq!(ties, vec![0, 6]);
        assert_eq!(
            clarification(&cmds, &ties, &g),
            RobotCommand::new("clarify", &["side"])
        );

        cmds[1].lang_score = 0.5;
        let ties = top_ties(&cmds, &rank(&cmds));
        assert_eq!(
            clarification(&cmds, &ties, &g),
            RobotCommand::new("clarify", &["side", "abs_dir"])
        );
    }

    #[test]
    fn test_clarify_across_templates() {
        let g = grammar();
        let mut cmds = commands_with(&[(0.5, 0.5)], &g);
        let mut other = cmds[0].clone();
        other.template += 1;
        other.name = "move_abs_pos".to_string();
        cmds.push(other);
        let ties = top_ties(&cmds, &rank(&cmds));
        assert_eq!(ties.len(), 2);
        assert_eq!(clarification(&cmds, &ties, &g), RobotCommand::clarify(Vec::new()));
    }
}
