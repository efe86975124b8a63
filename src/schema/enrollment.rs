//! Full-record rules used at submission time
//!
//! The three step schemas merged structurally, with the scholarship refinement
//! applied again over the merged record. The subject minimum is taken from the
//! record's own class rather than from the caller's context.

use crate::entities::{EnrollmentDraft, EnrollmentRecord};
use crate::schema::academic::{academic_fields, scholarship_rule};
use crate::schema::address::address_fields;
use crate::schema::student::student_fields;
use crate::schema::validator::{Checks, FieldErrors, Schema, SchemaContext};

impl Schema for EnrollmentDraft {
    type Output = EnrollmentRecord;

    fn validate(&self, _ctx: &SchemaContext) -> Result<EnrollmentRecord, FieldErrors> {
        let ctx = SchemaContext::with_class(self.student.class_level());
        let mut checks = Checks::default();

        let student = student_fields(&self.student, &mut checks);
        let academic = academic_fields(&self.academic, &ctx, &mut checks);
        let address = address_fields(&self.address, &mut checks);
        scholarship_rule(&self.academic, &mut checks);
        checks.finish()?;

        let (Some(student), Some(academic), Some(address)) = (student, academic, address) else {
            return Err(FieldErrors::new());
        };
        Ok(EnrollmentRecord {
            student,
            academic,
            address,
        })
    }
}
