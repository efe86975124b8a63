//! Step 3 rules

use crate::entities::catalog;
use crate::entities::{AddressGuardian, AddressGuardianDraft, PaymentMode, PaymentPlan};
use crate::schema::rules::{self, LengthMessages};
use crate::schema::validator::{Checks, FieldErrors, Schema, SchemaContext};

const ADDRESS_LINE: LengthMessages<'static> = LengthMessages {
    too_short: "Address must be at least 10 characters",
    too_long: "Address must not exceed 120 characters",
};

const GUARDIAN_NAME: LengthMessages<'static> = LengthMessages {
    too_short: "Guardian name must be at least 2 characters",
    too_long: "",
};

const CITY: LengthMessages<'static> = LengthMessages {
    too_short: "Please enter your city",
    too_long: "",
};

fn state_or_ut(value: Option<&str>) -> Result<String, String> {
    let name = value.map(str::trim).unwrap_or_default();
    if name.is_empty() {
        return Err("Please select your state".to_string());
    }
    catalog::canonical_state(name)
        .map(String::from)
        .ok_or_else(|| "Please select a valid state or union territory".to_string())
}

/// Field rules for step 3; `None` if any field failed
pub(crate) fn address_fields(
    draft: &AddressGuardianDraft,
    checks: &mut Checks,
) -> Option<AddressGuardian> {
    let pin_code = checks.field("pinCode", rules::pin_code(draft.pin_code.as_deref()));
    let state = checks.field("state", state_or_ut(draft.state.as_deref()));
    let city = checks.field(
        "city",
        rules::trimmed_length(draft.city.as_deref(), 1, None, &CITY),
    );
    let address_line = checks.field(
        "addressLine",
        rules::trimmed_length(draft.address_line.as_deref(), 10, Some(120), &ADDRESS_LINE),
    );
    let guardian_name = checks.field(
        "guardianName",
        rules::person_name(draft.guardian_name.as_deref(), 2, None, &GUARDIAN_NAME),
    );
    let guardian_mobile = checks.field(
        "guardianMobile",
        rules::mobile(draft.guardian_mobile.as_deref()),
    );
    let payment_plan = checks.field(
        "paymentPlan",
        rules::selection::<PaymentPlan>(
            draft.payment_plan.as_deref(),
            "Please select a payment plan",
        ),
    );
    let payment_mode = checks.field(
        "paymentMode",
        rules::selection::<PaymentMode>(
            draft.payment_mode.as_deref(),
            "Please select a payment mode",
        ),
    );

    let (
        Some(pin_code),
        Some(state),
        Some(city),
        Some(address_line),
        Some(guardian_name),
        Some(guardian_mobile),
        Some(payment_plan),
        Some(payment_mode),
    ) = (
        pin_code,
        state,
        city,
        address_line,
        guardian_name,
        guardian_mobile,
        payment_plan,
        payment_mode,
    )
    else {
        return None;
    };

    Some(AddressGuardian {
        pin_code,
        state,
        city,
        address_line,
        guardian_name,
        guardian_mobile,
        payment_plan,
        payment_mode,
    })
}

impl Schema for AddressGuardianDraft {
    type Output = AddressGuardian;

    fn validate(&self, _ctx: &SchemaContext) -> Result<AddressGuardian, FieldErrors> {
        let mut checks = Checks::default();
        let details = address_fields(self, &mut checks);
        checks.finish()?;
        details.ok_or_else(FieldErrors::new)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_draft() -> AddressGuardianDraft {
        AddressGuardianDraft {
            pin_code: Some("400001".to_string()),
            state: Some("Maharashtra".to_string()),
            city: Some("Mumbai".to_string()),
            address_line: Some("12 Marine Drive, Churchgate".to_string()),
            guardian_name: Some("Ravi Rao".to_string()),
            guardian_mobile: Some("9123456780".to_string()),
            payment_plan: Some("Half-Yearly".to_string()),
            payment_mode: Some("UPI".to_string()),
        }
    }

    #[test]
    fn test_valid_address() {
        let details = valid_draft().validate(&SchemaContext::default()).unwrap();
        assert_eq!(details.payment_plan, PaymentPlan::HalfYearly);
        assert_eq!(details.payment_mode, PaymentMode::Upi);
    }

    #[test]
    fn test_state_must_be_listed() {
        let mut draft = valid_draft();
        draft.state = Some("maharashtra".to_string());
        assert_eq!(
            draft.validate(&SchemaContext::default()).unwrap().state,
            "Maharashtra"
        );

        draft.state = Some("Gotham".to_string());
        let errors = draft.validate(&SchemaContext::default()).unwrap_err();
        assert_eq!(
            errors.get("state"),
            Some("Please select a valid state or union territory")
        );

        draft.state = Some(String::new());
        let errors = draft.validate(&SchemaContext::default()).unwrap_err();
        assert_eq!(errors.get("state"), Some("Please select your state"));
    }

    #[test]
    fn test_address_line_bounds() {
        let mut draft = valid_draft();
        draft.address_line = Some("Short".to_string());
        let errors = draft.validate(&SchemaContext::default()).unwrap_err();
        assert_eq!(errors.get("addressLine"), Some("Address must be at least 10 characters"));

        draft.address_line = Some("x".repeat(121));
        let errors = draft.validate(&SchemaContext::default()).unwrap_err();
        assert_eq!(errors.get("addressLine"), Some("Address must not exceed 120 characters"));
    }

    #[test]
    fn test_pin_and_guardian_checks() {
        let mut draft = valid_draft();
        draft.pin_code = Some("4000".to_string());
        draft.guardian_name = Some("R".to_string());
        draft.guardian_mobile = Some("5123456780".to_string());
        let errors = draft.validate(&SchemaContext::default()).unwrap_err();
        assert_eq!(errors.paths(), vec!["pinCode", "guardianName", "guardianMobile"]);
    }
}
