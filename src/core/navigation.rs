//! Wizard routes and the guards that gate them

use std::collections::BTreeSet;
use std::fmt;

use crate::core::notify::Toast;
use crate::entities::Group;

/// One of the three data-entry steps
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Step {
    Student = 1,
    Academic = 2,
    AddressGuardian = 3,
}

impl Step {
    pub const ALL: [Step; 3] = [Step::Student, Step::Academic, Step::AddressGuardian];

    pub fn number(self) -> u8 {
        self as u8
    }

    pub fn from_number(n: u8) -> Option<Step> {
        match n {
            1 => Some(Step::Student),
            2 => Some(Step::Academic),
            3 => Some(Step::AddressGuardian),
            _ => None,
        }
    }

    /// Group of data this step edits
    pub fn group(self) -> Group {
        match self {
            Step::Student => Group::Student,
            Step::Academic => Group::Academic,
            Step::AddressGuardian => Group::AddressGuardian,
        }
    }

    pub fn for_group(group: Group) -> Step {
        match group {
            Group::Student => Step::Student,
            Group::Academic => Step::Academic,
            Group::AddressGuardian => Step::AddressGuardian,
        }
    }

    pub fn title(self) -> &'static str {
        self.group().title()
    }

    pub fn route(self) -> Route {
        Route::Step(self)
    }

    /// Where "Next" leads once this step is complete
    pub fn next(self) -> Route {
        match self {
            Step::Student => Route::Step(Step::Academic),
            Step::Academic => Route::Step(Step::AddressGuardian),
            Step::AddressGuardian => Route::Review,
        }
    }

    /// Where "Back" leads
    pub fn previous(self) -> Route {
        match self {
            Step::Student => Route::Home,
            Step::Academic => Route::Step(Step::Student),
            Step::AddressGuardian => Route::Step(Step::Academic),
        }
    }

    /// The step that must be completed before this one opens
    pub fn prerequisite(self) -> Option<Step> {
        match self {
            Step::Student => None,
            Step::Academic => Some(Step::Student),
            Step::AddressGuardian => Some(Step::Academic),
        }
    }

    /// Description shown after this step completes
    pub fn completion_message(self) -> &'static str {
        match self {
            Step::Student => "Moving to academic details.",
            Step::Academic => "Moving to address and guardian details.",
            Step::AddressGuardian => "Moving to review and submit.",
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Step {}", self.number())
    }
}

impl std::str::FromStr for Step {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        let number = lower.strip_prefix("step-").unwrap_or(&lower);
        if let Some(step) = number.parse::<u8>().ok().and_then(Step::from_number) {
            return Ok(step);
        }
        lower
            .parse::<Group>()
            .map(Step::for_group)
            .map_err(|_| format!("Unknown step: {} (expected 1, 2 or 3)", s))
    }
}

/// A navigable location in the wizard
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Home,
    Step(Step),
    Review,
    NotFound(String),
}

impl Route {
    pub fn path(&self) -> &str {
        match self {
            Route::Home => "/",
            Route::Step(Step::Student) => "/enroll/step-1",
            Route::Step(Step::Academic) => "/enroll/step-2",
            Route::Step(Step::AddressGuardian) => "/enroll/step-3",
            Route::Review => "/enroll/review",
            Route::NotFound(path) => path,
        }
    }

    /// Exact path match; anything unrecognised is `NotFound`
    pub fn from_path(path: &str) -> Route {
        match path {
            "/" => Route::Home,
            "/enroll/step-1" => Route::Step(Step::Student),
            "/enroll/step-2" => Route::Step(Step::Academic),
            "/enroll/step-3" => Route::Step(Step::AddressGuardian),
            "/enroll/review" => Route::Review,
            other => Route::NotFound(other.to_string()),
        }
    }

    /// Accepts a path or a short name (`home`, `1`, `step-2`, `academic`,
    /// `review`)
    pub fn parse(input: &str) -> Route {
        let trimmed = input.trim();
        if trimmed.starts_with('/') {
            return Route::from_path(trimmed);
        }
        match trimmed.to_lowercase().as_str() {
            "home" | "" => Route::Home,
            "review" | "submit" => Route::Review,
            _ => trimmed
                .parse::<Step>()
                .map(Route::Step)
                .unwrap_or_else(|_| Route::NotFound(trimmed.to_string())),
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// Outcome of asking to open a route
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Allowed(Route),
    Redirect { to: Route, notice: Toast },
}

impl Resolution {
    /// The route the user actually ends up on
    pub fn route(&self) -> &Route {
        match self {
            Resolution::Allowed(route) => route,
            Resolution::Redirect { to, .. } => to,
        }
    }

    pub fn is_allowed(&self) -> bool {
        matches!(self, Resolution::Allowed(_))
    }
}

/// First data step not yet completed, or `None` when all three are done
pub fn first_incomplete(completed: &BTreeSet<u8>) -> Option<Step> {
    Step::ALL
        .into_iter()
        .find(|step| !completed.contains(&step.number()))
}

/// Check whether `route` may be opened given the completed steps.
///
/// A data step needs its predecessor completed and otherwise redirects to the
/// first incomplete step. Review needs all three steps and otherwise
/// redirects to step 1.
pub fn guard(route: &Route, completed: &BTreeSet<u8>) -> Resolution {
    match route {
        Route::Step(step) => {
            let Some(prerequisite) = step.prerequisite() else {
                return Resolution::Allowed(route.clone());
            };
            if completed.contains(&prerequisite.number()) {
                return Resolution::Allowed(route.clone());
            }
            let notice = match step {
                Step::Academic => Toast::destructive(
                    "Please complete Step 1 first",
                    "You need to fill in your student details before proceeding.",
                ),
                _ => Toast::destructive(
                    "Please complete previous steps first",
                    "You need to complete Steps 1 and 2 before proceeding.",
                ),
            };
            let to = first_incomplete(completed).unwrap_or(Step::Student).route();
            tracing::debug!("Guard redirected {} to {}", route, to);
            Resolution::Redirect { to, notice }
        }
        Route::Review => {
            if Step::ALL.iter().all(|s| completed.contains(&s.number())) {
                Resolution::Allowed(Route::Review)
            } else {
                tracing::debug!("Guard redirected {} to step 1", route);
                Resolution::Redirect {
                    to: Route::Step(Step::Student),
                    notice: Toast::destructive(
                        "Please complete all previous steps first",
                        "You need to complete Steps 1, 2, and 3 before reviewing.",
                    ),
                }
            }
        }
        Route::Home | Route::NotFound(_) => Resolution::Allowed(route.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn done(steps: &[u8]) -> BTreeSet<u8> {
        steps.iter().copied().collect()
    }

    #[test]
    fn test_paths() {
        for route in [
            Route::Home,
            Route::Step(Step::Student),
            Route::Step(Step::Academic),
            Route::Step(Step::AddressGuardian),
            Route::Review,
        ] {
            assert_eq!(Route::from_path(route.path()), route);
        }
        assert_eq!(
            Route::from_path("/enroll/step-4"),
            Route::NotFound("/enroll/step-4".to_string())
        );
    }

    #[test]
    fn test_parse_aliases() {
        assert_eq!(Route::parse("2"), Route::Step(Step::Academic));
        assert_eq!(Route::parse("step-3"), Route::Step(Step::AddressGuardian));
        assert_eq!(Route::parse("student"), Route::Step(Step::Student));
        assert_eq!(Route::parse("Review"), Route::Review);
        assert_eq!(Route::parse("home"), Route::Home);
        assert!(matches!(Route::parse("payments"), Route::NotFound(_)));
    }

    #[test]
    fn test_step_navigation() {
        assert_eq!(Step::Student.previous(), Route::Home);
        assert_eq!(Step::AddressGuardian.next(), Route::Review);
        assert_eq!(Step::Academic.prerequisite(), Some(Step::Student));
    }

    #[test]
    fn test_review_guard_redirects_to_step_one() {
        let resolution = guard(&Route::Review, &done(&[1, 2]));
        match resolution {
            Resolution::Redirect { to, notice } => {
                assert_eq!(to, Route::Step(Step::Student));
                assert_eq!(notice.title, "Please complete all previous steps first");
            }
            other => panic!("expected redirect, got {:?}", other),
        }
        assert!(guard(&Route::Review, &done(&[1, 2, 3])).is_allowed());
    }

    #[test]
    fn test_step_guard_redirects_to_first_incomplete() {
        let resolution = guard(&Route::Step(Step::AddressGuardian), &done(&[1]));
        assert_eq!(resolution.route(), &Route::Step(Step::Academic));

        let resolution = guard(&Route::Step(Step::Academic), &done(&[]));
        assert_eq!(resolution.route(), &Route::Step(Step::Student));
        match resolution {
            Resolution::Redirect { notice, .. } => {
                assert_eq!(notice.title, "Please complete Step 1 first")
            }
            other => panic!("expected redirect, got {:?}", other),
        }

        assert!(guard(&Route::Step(Step::Student), &done(&[])).is_allowed());
        assert!(guard(&Route::Step(Step::Academic), &done(&[1])).is_allowed());
    }

    #[test]
    fn test_first_incomplete() {
        assert_eq!(first_incomplete(&done(&[1, 3])), Some(Step::Academic));
        assert_eq!(first_incomplete(&done(&[1, 2, 3])), None);
    }
}
