use crate::config::LocationSource;
use ant_core::{ArrowDirection, CueType, FlankerType, Layout, Location, Point, Shape, TrialCondition};

/// Everything a trial draws once the condition is known.
#[derive(Debug, Clone, PartialEq)]
pub struct StimulusSet {
    pub target: Shape,
    pub flanker: Shape,
    pub target_position: Point,
    pub flanker_positions: [Point; 4],
    pub cue_positions: Vec<Point>,
}

/// Target arrow and the shape used for all four flankers.
pub fn select_arrows(direction: ArrowDirection, flanker_type: FlankerType) -> (Shape, Shape) {
    let target = Shape::arrow(direction);
    let flanker = match flanker_type {
        FlankerType::Congruent => target,
        FlankerType::Incongruent => Shape::arrow(direction.opposite()),
        FlankerType::Neutral => Shape::NeutralLine,
    };
    (target, flanker)
}

pub fn resolve_cue_location(condition: &TrialCondition, source: LocationSource) -> Location {
    match source {
        LocationSource::CueLocation => condition.cue_location,
        LocationSource::TargetLocation => condition.target_location,
    }
}

pub fn cue_positions(cue_type: CueType, location: Location, layout: &Layout) -> Vec<Point> {
    match cue_type {
        CueType::None => Vec::new(),
        CueType::Central => vec![layout.center],
        CueType::Double => vec![layout.above, layout.below],
        CueType::Spatial => vec![layout.row(location)],
    }
}

pub fn select_stimuli(
    condition: &TrialCondition,
    source: LocationSource,
    layout: &Layout,
) -> StimulusSet {
    let (target, flanker) = select_arrows(condition.target_direction, condition.flanker_type);
    let cue_location = resolve_cue_location(condition, source);
    StimulusSet {
        target,
        flanker,
        target_position: layout.row(condition.target_location),
        flanker_positions: layout.flanker_positions(condition.target_location),
        cue_positions: cue_positions(condition.cue_type, cue_location, layout),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout() -> Layout {
        Layout::new((1280, 720), 40.0)
    }

    #[test]
    fn target_always_matches_direction() {
        for &direction in ArrowDirection::ALL {
            for &flanker_type in FlankerType::ALL {
                let (target, flanker) = select_arrows(direction, flanker_type);
                assert_eq!(target, Shape::arrow(direction));
                assert!(target.is_flanker_shape() && flanker.is_flanker_shape());
            }
        }
    }

    #[test]
    fn flanker_rule() {
        use ArrowDirection::*;
        assert_eq!(
            select_arrows(Left, FlankerType::Congruent),
            (Shape::LeftArrow, Shape::LeftArrow)
        );
        assert_eq!(
            select_arrows(Left, FlankerType::Incongruent),
            (Shape::LeftArrow, Shape::RightArrow)
        );
        assert_eq!(
            select_arrows(Right, FlankerType::Incongruent),
            (Shape::RightArrow, Shape::LeftArrow)
        );
        assert_eq!(
            select_arrows(Right, FlankerType::Neutral),
            (Shape::RightArrow, Shape::NeutralLine)
        );
    }

    #[test]
    fn cue_positions_per_type() {
        let layout = layout();
        assert!(cue_positions(CueType::None, Location::Above, &layout).is_empty());
        assert_eq!(
            cue_positions(CueType::Central, Location::Below, &layout),
            vec![layout.center]
        );
        assert_eq!(
            cue_positions(CueType::Double, Location::Below, &layout),
            vec![layout.above, layout.below]
        );
        assert_eq!(
            cue_positions(CueType::Spatial, Location::Below, &layout),
            vec![layout.below]
        );
    }

    #[test]
    fn spatial_cue_follows_the_configured_source() {
        let condition = TrialCondition {
            cue_type: CueType::Spatial,
            cue_location: Location::Below,
            target_location: Location::Above,
            target_direction: ArrowDirection::Left,
            flanker_type: FlankerType::Neutral,
        };
        let layout = layout();

        let by_cue = select_stimuli(&condition, LocationSource::CueLocation, &layout);
        assert_eq!(by_cue.cue_positions, vec![layout.below]);

        let by_target = select_stimuli(&condition, LocationSource::TargetLocation, &layout);
        assert_eq!(by_target.cue_positions, vec![layout.above]);
        assert_eq!(by_target.target_position, layout.above);
        assert_eq!(by_target.flanker_positions, layout.flanker_positions(Location::Above));
    }
}
