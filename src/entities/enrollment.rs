//! The merged enrollment record

use serde::{Deserialize, Serialize};

use crate::entities::{
    AcademicDetails, AcademicDraft, AddressGuardian, AddressGuardianDraft, StudentDetails,
    StudentDraft,
};

/// Every group's draft merged into one object, in group order.
///
/// Field names are disjoint across groups, so the flattened JSON has no
/// collisions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EnrollmentDraft {
    #[serde(flatten)]
    pub student: StudentDraft,

    #[serde(flatten)]
    pub academic: AcademicDraft,

    #[serde(flatten)]
    pub address: AddressGuardianDraft,
}

/// A fully validated enrollment, ready for submission
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrollmentRecord {
    #[serde(flatten)]
    pub student: StudentDetails,

    #[serde(flatten)]
    pub academic: AcademicDetails,

    #[serde(flatten)]
    pub address: AddressGuardian,
}
