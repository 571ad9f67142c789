//! World objects and robot state as seen by the parser.
//!
//! Every field is optional: an absent property means "no information" and
//! never counts as false when scoring.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::combinatorics::product;
use crate::definition::GrammarDefinition;

/// A per-side pair, indexed by the order of the grammar's side options.
pub type SidePair<T> = [T; 2];

/// Unique-descriptor options in description priority order.
pub const UNIQUE_DESCRIPTORS: [&str; 9] = [
    "left_most",
    "right_most",
    "middle",
    "farthest",
    "nearest",
    "biggest",
    "smallest",
    "tallest",
    "shortest",
];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldObject {
    pub name: Option<String>,
    pub color: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_leftmost: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_rightmost: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_middle: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_farthest: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_nearest: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_biggest: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_smallest: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_tallest: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_shortest: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_pickupable: Option<SidePair<bool>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_above_reachable: Option<SidePair<bool>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_nextto_reachable: Option<SidePair<bool>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_leftof_reachable: Option<SidePair<bool>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_rightof_reachable: Option<SidePair<bool>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_frontof_reachable: Option<SidePair<bool>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_behind_reachable: Option<SidePair<bool>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_topof_reachable: Option<SidePair<bool>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_near_reachable: Option<SidePair<bool>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_towards_reachable: Option<SidePair<bool>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_away_reachable: Option<SidePair<bool>>,
}

impl WorldObject {
    pub fn named(name: &str) -> Self {
        Self {
            name: Some(name.to_string()),
            ..Self::default()
        }
    }

    /// Flag for a unique-descriptor option such as `left_most`.
    pub fn unique_flag(&self, option: &str) -> Option<bool> {
        match option {
            "left_most" => self.is_leftmost,
            "right_most" => self.is_rightmost,
            "middle" => self.is_middle,
            "farthest" => self.is_farthest,
            "nearest" => self.is_nearest,
            "biggest" => self.is_biggest,
            "smallest" => self.is_smallest,
            "tallest" => self.is_tallest,
            "shortest" => self.is_shortest,
            _ => None,
        }
    }

    fn unique_flag_mut(&mut self, option: &str) -> Option<&mut Option<bool>> {
        let field = match option {
            "left_most" => &mut self.is_leftmost,
            "right_most" => &mut self.is_rightmost,
            "middle" => &mut self.is_middle,
            "farthest" => &mut self.is_farthest,
            "nearest" => &mut self.is_nearest,
            "biggest" => &mut self.is_biggest,
            "smallest" => &mut self.is_smallest,
            "tallest" => &mut self.is_tallest,
            "shortest" => &mut self.is_shortest,
            _ => return None,
        };
        Some(field)
    }

    /// Reachability for a spatial-relation option such as `above`.
    pub fn reachability(&self, relation: &str) -> Option<SidePair<bool>> {
        match relation {
            "above" => self.is_above_reachable,
            "next_to" => self.is_nextto_reachable,
            "to_left_of" => self.is_leftof_reachable,
            "to_right_of" => self.is_rightof_reachable,
            "in_front_of" => self.is_frontof_reachable,
            "behind" => self.is_behind_reachable,
            "on_top_of" => self.is_topof_reachable,
            "near" => self.is_near_reachable,
            "towards" => self.is_towards_reachable,
            "away" => self.is_away_reachable,
            _ => None,
        }
    }

    /// Same name, color and type: the grammar built for one serves the other.
    ///
    /// An absent property matches an absent one, so two uncolored objects
    /// with the same name and type never force a recompile.
    pub fn matches_for_generation(&self, other: &WorldObject) -> bool {
        self.name == other.name && self.color == other.color && self.kind == other.kind
    }

    /// Marks every reachability pair and pickupability with one value.
    pub fn with_reachability(mut self, pair: SidePair<bool>) -> Self {
        for field in [
            &mut self.is_pickupable,
            &mut self.is_above_reachable,
            &mut self.is_nextto_reachable,
            &mut self.is_leftof_reachable,
            &mut self.is_rightof_reachable,
            &mut self.is_frontof_reachable,
            &mut self.is_behind_reachable,
            &mut self.is_topof_reachable,
            &mut self.is_near_reachable,
            &mut self.is_towards_reachable,
            &mut self.is_away_reachable,
        ] {
            *field = Some(pair);
        }
        self
    }
}

/// Whether two object lists would generate the same grammar.
///
/// Lists match when they have the same length and every object of each
/// finds an identity match in the other. `None` only matches `None`.
pub fn objects_match(a: Option<&[WorldObject]>, b: Option<&[WorldObject]>) -> bool {
    match (a, b) {
        (None, None) => true,
        (Some(a), Some(b)) => {
            a.len() == b.len() && all_found_in(a, b) && all_found_in(b, a)
        }
        _ => false,
    }
}

fn all_found_in(needles: &[WorldObject], haystack: &[WorldObject]) -> bool {
    needles
        .iter()
        .all(|n| haystack.iter().any(|h| n.matches_for_generation(h)))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GripperState {
    Open,
    ClosedEmpty,
    HasObj,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Robot {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_cmd_side: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_referred_obj_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_executing: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gripper_states: Option<SidePair<GripperState>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub can_move_up: Option<SidePair<bool>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub can_move_down: Option<SidePair<bool>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub can_move_toleft: Option<SidePair<bool>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub can_move_toright: Option<SidePair<bool>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub can_move_forward: Option<SidePair<bool>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub can_move_backward: Option<SidePair<bool>>,
}

impl Robot {
    /// Movement freedom for an absolute-direction option such as `up`.
    pub fn can_move(&self, direction: &str) -> Option<SidePair<bool>> {
        match direction {
            "up" => self.can_move_up,
            "down" => self.can_move_down,
            "to_left" => self.can_move_toleft,
            "to_right" => self.can_move_toright,
            "forward" => self.can_move_forward,
            "backward" => self.can_move_backward,
            _ => None,
        }
    }
}

/// One object per combination of descriptor values, named `obj0`, `obj1`, ...
///
/// Used to enumerate every way an object can be referred to.
pub fn synthetic_objects(def: &GrammarDefinition) -> Vec<WorldObject> {
    if def.descriptors.is_empty() {
        return Vec::new();
    }
    let axes: Vec<Vec<(&str, &str)>> = def
        .descriptors
        .iter()
        .map(|(key, d)| d.options.iter().map(|o| (key.as_str(), o.as_str())).collect())
        .collect();

    product(&axes)
        .into_iter()
        .enumerate()
        .map(|(idx, combo)| {
            let mut obj = WorldObject::named(&format!("obj{idx}"));
            for (key, value) in combo {
                if let Some(flag) = obj.unique_flag_mut(value) {
                    *flag = Some(true);
                    continue;
                }
                match key {
                    "color" => obj.color = Some(value.to_string()),
                    "type" => obj.kind = Some(value.to_string()),
                    _ => warn!(descriptor = key, value, "no object field for descriptor value"),
                }
            }
            obj
        })
        .collect()
}
