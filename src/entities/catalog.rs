//! Fixed option lists: subjects offered per class and the states/UTs accepted
//! for an address.

use crate::entities::ClassLevel;

/// Subjects offered to classes 9 and 10
pub const SECONDARY_SUBJECTS: &[&str] = &[
    "English",
    "Mathematics",
    "Science",
    "Social Science",
    "Hindi",
    "Sanskrit",
];

/// Subjects offered to classes 11 and 12
pub const SENIOR_SECONDARY_SUBJECTS: &[&str] = &[
    "English",
    "Mathematics",
    "Physics",
    "Chemistry",
    "Biology",
    "Computer Science",
    "Economics",
    "Business Studies",
    "Accountancy",
    "Political Science",
    "History",
    "Geography",
];

/// Indian states and union territories
pub const INDIAN_STATES: &[&str] = &[
    "Andhra Pradesh",
    "Arunachal Pradesh",
    "Assam",
    "Bihar",
    "Chhattisgarh",
    "Goa",
    "Gujarat",
    "Haryana",
    "Himachal Pradesh",
    "Jharkhand",
    "Karnataka",
    "Kerala",
    "Madhya Pradesh",
    "Maharashtra",
    "Manipur",
    "Meghalaya",
    "Mizoram",
    "Nagaland",
    "Odisha",
    "Punjab",
    "Rajasthan",
    "Sikkim",
    "Tamil Nadu",
    "Telangana",
    "Tripura",
    "Uttar Pradesh",
    "Uttarakhand",
    "West Bengal",
    "Andaman and Nicobar Islands",
    "Chandigarh",
    "Dadra and Nagar Haveli and Daman and Diu",
    "Delhi",
    "Jammu and Kashmir",
    "Ladakh",
    "Lakshadweep",
    "Puducherry",
];

/// Subjects a student in `class` may pick from. Unknown class offers nothing.
pub fn subjects_for(class: Option<ClassLevel>) -> &'static [&'static str] {
    match class {
        Some(ClassLevel::Nine) | Some(ClassLevel::Ten) => SECONDARY_SUBJECTS,
        Some(ClassLevel::Eleven) | Some(ClassLevel::Twelve) => SENIOR_SECONDARY_SUBJECTS,
        None => &[],
    }
}

/// Minimum number of subjects for `class` (3 for senior secondary, otherwise 2)
pub fn min_subjects(class: Option<ClassLevel>) -> usize {
    match class {
        Some(ClassLevel::Eleven) | Some(ClassLevel::Twelve) => 3,
        _ => 2,
    }
}

/// Resolve a state name to its canonical spelling (case-insensitive)
pub fn canonical_state(name: &str) -> Option<&'static str> {
    let wanted = name.trim();
    INDIAN_STATES
        .iter()
        .copied()
        .find(|s| s.eq_ignore_ascii_case(wanted))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_list_has_all_states_and_uts() {
        assert_eq!(INDIAN_STATES.len(), 36);
    }

    #[test]
    fn test_subjects_depend_on_class() {
        assert_eq!(subjects_for(Some(ClassLevel::Ten)).len(), 6);
        assert_eq!(subjects_for(Some(ClassLevel::Twelve)).len(), 12);
        assert!(subjects_for(None).is_empty());
        assert!(subjects_for(Some(ClassLevel::Eleven)).contains(&"Physics"));
        assert!(!subjects_for(Some(ClassLevel::Nine)).contains(&"Physics"));
    }

    #[test]
    fn test_min_subjects() {
        assert_eq!(min_subjects(Some(ClassLevel::Nine)), 2);
        assert_eq!(min_subjects(Some(ClassLevel::Ten)), 2);
        assert_eq!(min_subjects(Some(ClassLevel::Eleven)), 3);
        assert_eq!(min_subjects(Some(ClassLevel::Twelve)), 3);
        assert_eq!(min_subjects(None), 2);
    }

    #[test]
    fn test_canonical_state() {
        assert_eq!(canonical_state("tamil nadu"), Some("Tamil Nadu"));
        assert_eq!(canonical_state(" Delhi "), Some("Delhi"));
        assert_eq!(canonical_state("Atlantis"), None);
    }
}
