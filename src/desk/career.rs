//! Career: three chapters of sequential objectives. Completing a chapter
//! grants career points, which feed the career multiplier.

use tracing::{debug, info};

use super::catalog::{BuildingKind, UpgradeId};
use super::config::scale_target;
use super::logic::{format_number, production_rate};
use super::milestones::Progress;
use super::state::{CareerState, DeskState};

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum StepGoal {
    Clicks(f64),
    Capital(f64),
    Production(f64),
    Buildings(BuildingKind, f64),
    /// Not scaled by difficulty.
    OwnUpgrade(UpgradeId),
}

#[derive(Debug)]
pub struct CareerStep {
    pub name: &'static str,
    pub goal: StepGoal,
}

#[derive(Debug)]
pub struct Chapter {
    pub name: &'static str,
    pub description: &'static str,
    pub points: u32,
    pub steps: &'static [CareerStep],
}

pub static CHAPTERS: [Chapter; 3] = [
    Chapter {
        name: "Onboarding",
        description: "Learn manual trading and make the first investments.",
        points: 1,
        steps: &[
            CareerStep {
                name: "Manual trades",
                goal: StepGoal::Clicks(50.0),
            },
            CareerStep {
                name: "Cash on hand",
                goal: StepGoal::Capital(500.0),
            },
            CareerStep {
                name: "Hire interns",
                goal: StepGoal::Buildings(BuildingKind::Intern, 10.0),
            },
        ],
    },
    Chapter {
        name: "Desk Setup",
        description: "Structure a desk: research, data pipeline, first boosts.",
        points: 2,
        steps: &[
            CareerStep {
                name: "Passive income",
                goal: StepGoal::Production(100.0),
            },
            CareerStep {
                name: "Hire analysts",
                goal: StepGoal::Buildings(BuildingKind::Analyst, 5.0),
            },
            CareerStep {
                name: "Build the data pipeline",
                goal: StepGoal::OwnUpgrade(UpgradeId::DataPipeline),
            },
        ],
    },
    Chapter {
        name: "Automation",
        description: "Move from manual to automated execution.",
        points: 3,
        steps: &[
            CareerStep {
                name: "Signal engines",
                goal: StepGoal::Buildings(BuildingKind::SignalEngine, 5.0),
            },
            CareerStep {
                name: "Trading bots",
                goal: StepGoal::Buildings(BuildingKind::TradingBot, 3.0),
            },
            CareerStep {
                name: "Scale production",
                goal: StepGoal::Production(5_000.0),
            },
        ],
    },
];

/// `None` once every chapter is complete.
pub fn current_chapter(state: &DeskState) -> Option<&'static Chapter> {
    CHAPTERS.get(state.career.chapter)
}

pub fn current_step(state: &DeskState) -> Option<&'static CareerStep> {
    current_chapter(state).and_then(|c| c.steps.get(state.career.step))
}

pub fn is_finished(state: &DeskState) -> bool {
    current_chapter(state).is_none()
}

/// Pull a restored position back onto the chapter list. A step past the
/// chapter's end restarts that chapter; a chapter past the end is finished.
pub fn clamp_position(career: &mut CareerState) {
    match CHAPTERS.get(career.chapter) {
        Some(chapter) if career.step >= chapter.steps.len() => career.step = 0,
        Some(_) => {}
        None => {
            career.chapter = CHAPTERS.len();
            career.step = 0;
        }
    }
}

/// Evaluate a step goal against the state.
pub fn check_step(step: &CareerStep, state: &DeskState) -> Progress {
    let mult = state.config.difficulty.career_target_mult;
    let (current, target, label) = match step.goal {
        StepGoal::Clicks(n) => {
            let (cur, tgt) = (state.stats.clicks as f64, scale_target(n, mult));
            (cur, tgt, format!("{}/{}", cur, tgt))
        }
        StepGoal::Capital(n) => {
            let (cur, tgt) = (state.capital.floor(), scale_target(n, mult));
            (cur, tgt, format!("{} / {}", format_number(cur), format_number(tgt)))
        }
        StepGoal::Production(n) => {
            let (cur, tgt) = (production_rate(state), scale_target(n, mult));
            (
                cur,
                tgt,
                format!("{}/s / {}/s", format_number(cur), format_number(tgt)),
            )
        }
        StepGoal::Buildings(kind, n) => {
            let (cur, tgt) = (state.buildings[kind.index()] as f64, scale_target(n, mult));
            (cur, tgt, format!("{}/{}", cur, tgt))
        }
        StepGoal::OwnUpgrade(id) => {
            let owned = state.has_upgrade(id);
            (
                if owned { 1.0 } else { 0.0 },
                1.0,
                String::from(if owned { "OK" } else { "Not bought" }),
            )
        }
    };
    Progress {
        done: current >= target,
        current,
        target,
        label,
    }
}

/// Validate the active step. Finishing a chapter's last step moves to the
/// next chapter and grants its points. No-op once the career is finished.
pub fn claim_career_step(state: &mut DeskState) -> bool {
    let Some(chapter) = current_chapter(state) else {
        return false;
    };
    let Some(step) = current_step(state) else {
        return false;
    };
    if !check_step(step, state).done {
        return false;
    }

    state.career.step += 1;
    if state.career.step >= chapter.steps.len() {
        state.career.chapter += 1;
        state.career.step = 0;
        state.career.completed += 1;
        state.career.points += chapter.points;
        info!(
            chapter = chapter.name,
            points = state.career.points,
            "career chapter complete"
        );
    } else {
        debug!(step = step.name, "career step validated");
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::desk::logic::career_multiplier;

    fn finish_chapter_one(state: &mut DeskState) {
        state.stats.clicks = 150;
        state.capital = 1_500.0;
        state.buildings[BuildingKind::Intern.index()] = 30;
        for _ in 0..3 {
            assert!(claim_career_step(state));
        }
    }

    #[test]
    fn starts_at_first_step() {
        let state = DeskState::new();
        assert_eq!(current_chapter(&state).unwrap().name, "Onboarding");
        assert_eq!(current_step(&state).unwrap().name, "Manual trades");
    }

    #[test]
    fn targets_scale_by_difficulty() {
        let state = DeskState::new();
        let p = check_step(current_step(&state).unwrap(), &state);
        assert_eq!(p.target, 150.0);
        assert!(!p.done);
        assert_eq!(p.label, "0/150");
    }

    #[test]
    fn steps_gate_in_order() {
        let mut state = DeskState::new();
        state.buildings[BuildingKind::Intern.index()] = 30;
        // Interns are step three; step one is still pending.
        assert!(!claim_career_step(&mut state));
        state.stats.clicks = 150;
        assert!(claim_career_step(&mut state));
        assert_eq!(state.career.step, 1);
        assert!(!claim_career_step(&mut state));
    }

    #[test]
    fn chapter_completion_grants_points() {
        let mut state = DeskState::new();
        finish_chapter_one(&mut state);
        assert_eq!(state.career.chapter, 1);
        assert_eq!(state.career.step, 0);
        assert_eq!(state.career.points, 1);
        assert_eq!(state.career.completed, 1);
        assert!((career_multiplier(&state) - 1.03).abs() < 1e-12);
    }

    #[test]
    fn upgrade_step_does_not_scale() {
        let mut state = DeskState::new();
        state.career.chapter = 1;
        state.career.step = 2;
        let p = check_step(current_step(&state).unwrap(), &state);
        assert_eq!(p.target, 1.0);
        state.upgrades.insert(UpgradeId::DataPipeline);
        assert!(claim_career_step(&mut state));
        assert_eq!(state.career.points, 2);
    }

    #[test]
    fn clamp_restarts_overrun_step() {
        let mut career = CareerState {
            chapter: 0,
            step: 7,
            points: 2,
            completed: 0,
        };
        clamp_position(&mut career);
        assert_eq!((career.chapter, career.step, career.points), (0, 0, 2));

        career.chapter = 1;
        career.step = 2;
        clamp_position(&mut career);
        assert_eq!((career.chapter, career.step), (1, 2));

        career.chapter = 40;
        career.step = 5;
        clamp_position(&mut career);
        assert_eq!((career.chapter, career.step), (CHAPTERS.len(), 0));
    }

    #[test]
    fn terminal_after_last_chapter() {
        let mut state = DeskState::new();
        state.career.chapter = CHAPTERS.len();
        assert!(is_finished(&state));
        assert!(current_step(&state).is_none());
        assert!(!claim_career_step(&mut state));
        assert_eq!(state.career.points, 0);
    }
}
