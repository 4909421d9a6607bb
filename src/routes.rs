//! Static route classification. Each application path prefix maps to a
//! visibility, a role requirement, and whether the route is exempt from the
//! onboarding gate. Onboarding, assessment, and analysis-status routes are
//! exempt because they are the mechanism by which onboarding completes.

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Visibility {
    Public,
    Protected,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RoleRequirement {
    None,
    JobSeeker,
    Employer,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RouteClassification {
    pub visibility: Visibility,
    pub role_requirement: RoleRequirement,
    pub onboarding_exempt: bool,
    /// Public routes that must never be redirected away from, so their own
    /// completion handler gets the chance to navigate first (sign-up).
    pub intercept_exempt: bool,
}

const fn public() -> RouteClassification {
    RouteClassification {
        visibility: Visibility::Public,
        role_requirement: RoleRequirement::None,
        onboarding_exempt: true,
        intercept_exempt: false,
    }
}

const fn public_no_intercept() -> RouteClassification {
    RouteClassification {
        visibility: Visibility::Public,
        role_requirement: RoleRequirement::None,
        onboarding_exempt: true,
        intercept_exempt: true,
    }
}

const fn protected(role_requirement: RoleRequirement, onboarding_exempt: bool) -> RouteClassification {
    RouteClassification {
        visibility: Visibility::Protected,
        role_requirement,
        onboarding_exempt,
        intercept_exempt: false,
    }
}

/// Prefix table; [`classify`] picks the longest matching prefix on a path
/// segment boundary, so `/employer-signin` never matches `/employer`.
const ROUTES: &[(&str, RouteClassification)] = &[
    ("/signin", public()),
    ("/employer-signin", public()),
    ("/forgot-password", public()),
    ("/reset-password", public()),
    ("/signup", public_no_intercept()),
    ("/employer-signup", public_no_intercept()),
    ("/onboarding", protected(RoleRequirement::JobSeeker, true)),
    ("/assessments", protected(RoleRequirement::JobSeeker, true)),
    ("/analysis", protected(RoleRequirement::JobSeeker, true)),
    ("/employer-onboarding", protected(RoleRequirement::Employer, true)),
    ("/employer-dashboard", protected(RoleRequirement::Employer, false)),
    ("/employer", protected(RoleRequirement::Employer, false)),
];

const DEFAULT_PROTECTED: RouteClassification = protected(RoleRequirement::JobSeeker, false);

fn prefix_matches(path: &str, prefix: &str) -> bool {
    match path.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}

/// Classify a request path (no query string). Unlisted paths are protected
/// job-seeker routes subject to the onboarding gate.
#[must_use]
pub fn classify(path: &str) -> RouteClassification {
    let mut best: Option<(&str, RouteClassification)> = None;
    for (prefix, classification) in ROUTES {
        if prefix_matches(path, prefix) {
            let longer = best.is_none_or(|(current, _)| prefix.len() > current.len());
            if longer {
                best = Some((prefix, *classification));
            }
        }
    }
    best.map_or(DEFAULT_PROTECTED, |(_, classification)| classification)
}
